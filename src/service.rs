//! Entry point tying configuration, stack selection and the pipeline together.

use crate::cli::Args;
use crate::config::{AbsolutePaths, ConfigLoader, EnvSource, PathResolver, ProcessEnv};
use crate::error::{Error, Result};
use crate::pipeline::{fail, Pipeline, Step};
use crate::renderer::MiniJinjaRenderer;
use crate::stack;
use log::debug;
use std::io::Write;
use std::path::Path;

/// Scaffolds the project named in `args` inside `dir` and returns the exit
/// status: `0` on success, the negative code of the failed step otherwise.
pub fn setup(dir: &Path, out: &mut dyn Write, args: &Args) -> i32 {
    setup_with(&AbsolutePaths, &ProcessEnv, dir, out, args)
}

/// [`setup`] with explicit path resolution and environment.
pub fn setup_with(
    paths: &dyn PathResolver,
    env: &dyn EnvSource,
    dir: &Path,
    out: &mut dyn Write,
    args: &Args,
) -> i32 {
    if let Err(err) = validate_name(&args.name) {
        return fail(out, Step::ValidateArgs, &err);
    }

    let mut config = match ConfigLoader::new(paths, env).load(dir, out) {
        Ok(config) => config,
        Err(err) => return fail(out, Step::LoadConfig, &err),
    };
    debug!("Loaded configuration: {:?}", config);

    let providers = match config.resolve() {
        Ok(providers) => providers,
        Err(err) => return fail(out, Step::ValidateConfig, &err),
    };

    let stack = match stack::lookup(&args.stack) {
        Ok(stack) => stack,
        Err(err) => return fail(out, Step::SelectStack, &err),
    };

    let renderer = MiniJinjaRenderer::new();
    Pipeline::new(providers, stack.as_ref(), &renderer, out).run(dir, &args.name)
}

/// The project name becomes a directory below the working directory.
fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." || name.contains(['/', '\\']) {
        return Err(Error::InvalidNameError(name.to_string()));
    }
    Ok(())
}
