//! Language stacks that add their own files to a new project.

use crate::context::TemplateContext;
use crate::error::{Error, Result};
use crate::file;
use crate::renderer::TemplateRenderer;
use std::path::Path;

/// A language stack. Runs last, after every common file is written.
pub trait Stack {
    fn name(&self) -> &'static str;

    fn scaffold(
        &self,
        dir: &Path,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<()>;
}

/// Writes nothing.
pub struct NoStack;

impl Stack for NoStack {
    fn name(&self) -> &'static str {
        "none"
    }

    fn scaffold(&self, _: &Path, _: &TemplateContext, _: &dyn TemplateRenderer) -> Result<()> {
        Ok(())
    }
}

pub struct Go;

impl Stack for Go {
    fn name(&self) -> &'static str {
        "go"
    }

    fn scaffold(
        &self,
        dir: &Path,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<()> {
        file::write_templated(dir, "go.mod", GO_MOD, context, renderer)?;
        file::write_templated(dir, "main.go", GO_MAIN, context, renderer)?;
        file::write_templated(dir, "Dockerfile", GO_DOCKERFILE, context, renderer)
    }
}

pub struct Scala;

impl Stack for Scala {
    fn name(&self) -> &'static str {
        "scala"
    }

    fn scaffold(
        &self,
        dir: &Path,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<()> {
        file::write_templated(dir, "build.sbt", SCALA_BUILD, context, renderer)?;
        file::write_templated(dir, "src/main/scala/Main.scala", SCALA_MAIN, context, renderer)?;
        file::write_templated(dir, "Dockerfile", SCALA_DOCKERFILE, context, renderer)
    }
}

/// Names accepted by [`lookup`], in display order.
pub const STACKS: [&str; 3] = ["go", "none", "scala"];

/// Returns the stack registered under `name`.
pub fn lookup(name: &str) -> Result<Box<dyn Stack>> {
    match name {
        "none" => Ok(Box::new(NoStack)),
        "go" => Ok(Box::new(Go)),
        "scala" => Ok(Box::new(Scala)),
        _ => Err(Error::UnknownStackError {
            name: name.to_string(),
            available: STACKS.join(", "),
        }),
    }
}

const GO_MOD: &str = r#"module {{ repository_host }}{{ repository_path }}

go 1.22
"#;

const GO_MAIN: &str = r#"package main

import (
	"fmt"
	"net/http"
)

func main() {
	http.HandleFunc("/", func(w http.ResponseWriter, r *http.Request) {
		fmt.Fprintln(w, "{{ project_name }}")
	})
	_ = http.ListenAndServe(":80", nil)
}
"#;

const GO_DOCKERFILE: &str = r#"FROM golang:1.22 as build
WORKDIR /build
COPY . .
RUN CGO_ENABLED=0 go build -o /{{ project_name }} .

FROM scratch
COPY --from=build /{{ project_name }} /{{ project_name }}
EXPOSE 80
ENTRYPOINT ["/{{ project_name }}"]
"#;

const SCALA_BUILD: &str = r#"name := "{{ project_name }}"
organization := "{{ organisation }}"
scalaVersion := "2.13.14"
"#;

const SCALA_MAIN: &str = r#"object Main extends App {
  println("{{ project_name }}")
}
"#;

const SCALA_DOCKERFILE: &str = r#"FROM sbtscala/scala-sbt:eclipse-temurin-17.0.4_1.7.1_2.13.10 as build
WORKDIR /build
COPY . .
RUN sbt stage

FROM eclipse-temurin:17-jre
COPY --from=build /build/target/universal/stage /app
EXPOSE 80
ENTRYPOINT ["/app/bin/{{ project_name }}"]
"#;
