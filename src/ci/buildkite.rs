use crate::ci::Ci;
use crate::config::{bind, fill, redact, EnvSource, Layer};
use crate::constants::BUILDKITE_API_URL;
use crate::context::{Badge, TemplateContext};
use crate::error::{Error, Result};
use crate::file;
use crate::http::RestClient;
use crate::renderer::TemplateRenderer;
use log::debug;
use reqwest::header::AUTHORIZATION;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

const TOKEN_ENV: &str = "BUILDKITE_TOKEN";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildkiteProvider {
    pub webhook_url: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct BuildkitePipeline {
    pub slug: String,
    pub web_url: String,
    pub badge_url: String,
    pub provider: BuildkiteProvider,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewPipeline {
    pub name: String,
    pub repository: String,
    pub configuration: String,
}

/// The parts of the Buildkite REST API used by the provider.
pub trait BuildkiteApi {
    /// Fails unless the token is accepted.
    fn verify_token(&self) -> Result<()>;

    /// `None` when the pipeline does not exist.
    fn pipeline(&self, organisation: &str, slug: &str) -> Result<Option<BuildkitePipeline>>;

    fn create_pipeline(&self, organisation: &str, pipeline: &NewPipeline) -> Result<BuildkitePipeline>;
}

pub struct BuildkiteClient {
    rest: RestClient,
}

impl BuildkiteClient {
    pub fn new(token: &str) -> Result<Self> {
        let rest = RestClient::new(BUILDKITE_API_URL, AUTHORIZATION, &format!("Bearer {token}"))?;
        Ok(Self { rest })
    }
}

impl BuildkiteApi for BuildkiteClient {
    fn verify_token(&self) -> Result<()> {
        self.rest.get(&["access-token"])?.success("failed to authenticate with Buildkite")?;
        Ok(())
    }

    fn pipeline(&self, organisation: &str, slug: &str) -> Result<Option<BuildkitePipeline>> {
        let reply = self.rest.get(&["organizations", organisation, "pipelines", slug])?;
        if reply.is(StatusCode::NOT_FOUND) {
            return Ok(None);
        }
        reply.success(&format!("failed to look up pipeline {organisation}/{slug}"))?.json().map(Some)
    }

    fn create_pipeline(&self, organisation: &str, pipeline: &NewPipeline) -> Result<BuildkitePipeline> {
        self.rest
            .post(&["organizations", organisation, "pipelines"], pipeline)?
            .expect(StatusCode::CREATED, &format!("failed to create pipeline {}", pipeline.name))?
            .json()
    }
}

/// Buildkite as continuous integration provider.
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Buildkite {
    pub organisation: String,
    pub token: String,
    #[serde(skip)]
    api: Option<Box<dyn BuildkiteApi>>,
}

impl Buildkite {
    /// Uses `api` instead of the client created by [`Ci::configure`].
    pub fn with_api(mut self, api: Box<dyn BuildkiteApi>) -> Self {
        self.api = Some(api);
        self
    }

    fn api(&self) -> Result<&dyn BuildkiteApi> {
        self.api
            .as_deref()
            .ok_or_else(|| Error::RemoteOperationError("Buildkite client not configured".to_string()))
    }
}

impl fmt::Debug for Buildkite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Buildkite")
            .field("organisation", &self.organisation)
            .field("token", &redact(&self.token))
            .finish_non_exhaustive()
    }
}

impl Layer for Buildkite {
    fn merge(&mut self, other: Self) {
        fill(&mut self.organisation, other.organisation);
        fill(&mut self.token, other.token);
    }

    fn apply_env(&mut self, env: &dyn EnvSource) {
        bind(&mut self.token, env, TOKEN_ENV);
    }
}

/// Buildkite pipeline slug: lowercase, runs of other characters become `-`.
pub fn slug(name: &str) -> String {
    let mut slug = String::with_capacity(name.len());
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c.to_ascii_lowercase());
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    slug.trim_matches('-').to_string()
}

impl Ci for Buildkite {
    fn name(&self) -> &'static str {
        "Buildkite"
    }

    fn validate_config(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::ProviderCredentialError(
                "token for Buildkite not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<()> {
        if self.api.is_none() {
            self.api = Some(Box::new(BuildkiteClient::new(&self.token)?));
        }
        Ok(())
    }

    fn validate(&self, name: &str) -> Result<()> {
        let api = self.api()?;
        api.verify_token()?;
        let slug = slug(name);
        if api.pipeline(&self.organisation, &slug)?.is_some() {
            return Err(Error::RemoteConflictError(format!(
                "pipeline named '{}/{}' already exists at Buildkite",
                self.organisation, slug
            )));
        }
        Ok(())
    }

    fn scaffold(
        &self,
        dir: &Path,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Option<String>> {
        file::write_templated(dir, ".buildkite/pipeline.yml", PIPELINE_YML, context, renderer)?;

        let request = NewPipeline {
            name: context.project_name.clone(),
            repository: context.repository_url.clone(),
            configuration: UPLOAD_STEP.to_string(),
        };
        let pipeline = self.api()?.create_pipeline(&self.organisation, &request)?;
        debug!("Created Buildkite pipeline {}", pipeline.web_url);

        let webhook = pipeline.provider.webhook_url;
        Ok((!webhook.is_empty()).then_some(webhook))
    }

    /// Buildkite badges belong to a pipeline, which is only created by
    /// [`Ci::scaffold`]; there is nothing to report before that.
    fn badges(&self, name: &str) -> Result<Vec<Badge>> {
        debug!("No Buildkite badges available yet for {}", name);
        Ok(Vec::new())
    }
}

const UPLOAD_STEP: &str = r#"steps:
  - label: ":pipeline:"
    command: "buildkite-agent pipeline upload"
"#;

const PIPELINE_YML: &str = r#"steps:
  - label: ":docker: build"
    command: |-
      build
      push

  - wait

  - label: ":rocket: deploy {{ project_name }} to staging"
    command: deploy staging
    branches: "master"

  - block: ":rocket: release {{ project_name }}"
    branches: "master"

  - label: ":rocket: deploy {{ project_name }} to prod"
    command: deploy prod
    branches: "master"
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::MiniJinjaRenderer;
    use std::cell::RefCell;
    use std::fs;
    use std::rc::Rc;
    use tempfile::TempDir;

    #[derive(Default)]
    struct FakeBuildkite {
        calls: Rc<RefCell<Vec<String>>>,
        token_error: Option<String>,
        existing: bool,
        webhook_url: String,
    }

    impl BuildkiteApi for FakeBuildkite {
        fn verify_token(&self) -> Result<()> {
            match &self.token_error {
                Some(m) => Err(Error::RemoteOperationError(m.clone())),
                None => Ok(()),
            }
        }

        fn pipeline(&self, organisation: &str, slug: &str) -> Result<Option<BuildkitePipeline>> {
            self.calls.borrow_mut().push(format!("get {organisation}/{slug}"));
            Ok(self.existing.then(BuildkitePipeline::default))
        }

        fn create_pipeline(&self, organisation: &str, pipeline: &NewPipeline) -> Result<BuildkitePipeline> {
            self.calls
                .borrow_mut()
                .push(format!("create {organisation} {} {}", pipeline.name, pipeline.repository));
            Ok(BuildkitePipeline {
                provider: BuildkiteProvider { webhook_url: self.webhook_url.clone() },
                ..Default::default()
            })
        }
    }

    fn buildkite(fake: FakeBuildkite) -> Buildkite {
        Buildkite { organisation: "org".to_string(), token: "token".to_string(), api: None }
            .with_api(Box::new(fake))
    }

    #[test]
    fn test_slug() {
        assert_eq!(slug("My Project"), "my-project");
        assert_eq!(slug("my_project--x"), "my-project-x");
        assert_eq!(slug("-edge-"), "edge");
    }

    #[test]
    fn test_validate_config() {
        let ci = Buildkite::default();
        assert_eq!(
            ci.validate_config().unwrap_err().to_string(),
            "token for Buildkite not configured"
        );
        assert_eq!(ci.name(), "Buildkite");
    }

    #[test]
    fn test_validate() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let ci = buildkite(FakeBuildkite { calls: calls.clone(), ..Default::default() });
        ci.validate("My Project").unwrap();
        assert_eq!(*calls.borrow(), vec!["get org/my-project"]);
    }

    #[test]
    fn test_validate_pipeline_exists() {
        let ci = buildkite(FakeBuildkite { existing: true, ..Default::default() });
        let err = ci.validate("project").unwrap_err();
        assert!(matches!(err, Error::RemoteConflictError(_)));
        assert_eq!(err.to_string(), "pipeline named 'org/project' already exists at Buildkite");
    }

    #[test]
    fn test_validate_token_error() {
        let ci = buildkite(FakeBuildkite { token_error: Some("unauthorized".to_string()), ..Default::default() });
        assert_eq!(ci.validate("project").unwrap_err().to_string(), "unauthorized");
    }

    #[test]
    fn test_scaffold_returns_webhook() {
        let temp_dir = TempDir::new().unwrap();
        let calls = Rc::new(RefCell::new(Vec::new()));
        let ci = buildkite(FakeBuildkite {
            calls: calls.clone(),
            webhook_url: "https://webhook.buildbox.io/deliver/abc".to_string(),
            ..Default::default()
        });
        let context = TemplateContext {
            project_name: "project".to_string(),
            repository_url: "git@github.com:org/project.git".to_string(),
            ..Default::default()
        };

        let webhook = ci.scaffold(temp_dir.path(), &context, &MiniJinjaRenderer::new()).unwrap();

        assert_eq!(webhook.as_deref(), Some("https://webhook.buildbox.io/deliver/abc"));
        assert_eq!(*calls.borrow(), vec!["create org project git@github.com:org/project.git"]);
        let written = fs::read_to_string(temp_dir.path().join(".buildkite/pipeline.yml")).unwrap();
        assert!(written.contains("deploy project to staging"));
    }

    #[test]
    fn test_scaffold_without_webhook() {
        let temp_dir = TempDir::new().unwrap();
        let ci = buildkite(FakeBuildkite::default());
        let webhook = ci
            .scaffold(temp_dir.path(), &TemplateContext::default(), &MiniJinjaRenderer::new())
            .unwrap();
        assert_eq!(webhook, None);
    }

    #[test]
    fn test_badges_empty() {
        assert!(Buildkite::default().badges("project").unwrap().is_empty());
    }
}
