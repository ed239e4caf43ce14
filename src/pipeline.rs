//! The ordered scaffolding steps and their status codes.
//!
//! Steps run strictly in order and the first failure stops the run. Nothing
//! that already happened is rolled back: a repository created before a later
//! failure stays where it is.

use crate::config::ActiveProviders;
use crate::context::TemplateContext;
use crate::error::Result;
use crate::generate;
use crate::output;
use crate::renderer::TemplateRenderer;
use crate::stack::Stack;
use log::{debug, error};
use std::fmt;
use std::io::Write;
use std::path::Path;

/// Status code of a successful run.
pub const SUCCESS: i32 = 0;

/// A step that can fail, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    ValidateArgs,
    LoadConfig,
    ValidateConfig,
    SelectStack,
    Configure,
    ValidateName,
    CreateRepository,
    CloneRepository,
    FetchBadges,
    BuildContext,
    ScaffoldCi,
    RegisterWebhook,
    WriteDotfiles,
    WriteReadme,
    WriteDeployment,
    ScaffoldStack,
}

impl Step {
    pub const ALL: [Step; 16] = [
        Step::ValidateArgs,
        Step::LoadConfig,
        Step::ValidateConfig,
        Step::SelectStack,
        Step::Configure,
        Step::ValidateName,
        Step::CreateRepository,
        Step::CloneRepository,
        Step::FetchBadges,
        Step::BuildContext,
        Step::ScaffoldCi,
        Step::RegisterWebhook,
        Step::WriteDotfiles,
        Step::WriteReadme,
        Step::WriteDeployment,
        Step::ScaffoldStack,
    ];

    /// Process exit status reported when this step fails.
    pub fn code(self) -> i32 {
        match self {
            Step::ValidateArgs => -1,
            Step::LoadConfig => -2,
            Step::ValidateConfig => -3,
            Step::SelectStack => -4,
            Step::Configure => -5,
            Step::ValidateName => -6,
            Step::CreateRepository => -7,
            Step::CloneRepository => -8,
            Step::FetchBadges => -9,
            Step::BuildContext => -10,
            Step::ScaffoldCi => -11,
            Step::RegisterWebhook => -12,
            Step::WriteDotfiles => -13,
            Step::WriteReadme => -14,
            Step::WriteDeployment => -15,
            Step::ScaffoldStack => -16,
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Step::ValidateArgs => "validate arguments",
            Step::LoadConfig => "load configuration",
            Step::ValidateConfig => "validate configuration",
            Step::SelectStack => "select stack",
            Step::Configure => "configure providers",
            Step::ValidateName => "validate project name",
            Step::CreateRepository => "create repository",
            Step::CloneRepository => "clone repository",
            Step::FetchBadges => "fetch badges",
            Step::BuildContext => "build template context",
            Step::ScaffoldCi => "scaffold CI",
            Step::RegisterWebhook => "register webhook",
            Step::WriteDotfiles => "write dotfiles",
            Step::WriteReadme => "write README",
            Step::WriteDeployment => "write deployment",
            Step::ScaffoldStack => "scaffold stack",
        };
        write!(f, "{name}")
    }
}

/// Prints `err` in red and returns the status code of `step`.
pub fn fail(out: &mut dyn Write, step: Step, err: &dyn fmt::Display) -> i32 {
    error!("{} failed: {}", step, err);
    output::failure(out, err);
    step.code()
}

/// Runs the remote and local steps for one project against the resolved
/// providers.
pub struct Pipeline<'a> {
    providers: ActiveProviders<'a>,
    stack: &'a dyn Stack,
    renderer: &'a dyn TemplateRenderer,
    out: &'a mut dyn Write,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        providers: ActiveProviders<'a>,
        stack: &'a dyn Stack,
        renderer: &'a dyn TemplateRenderer,
        out: &'a mut dyn Write,
    ) -> Self {
        Self { providers, stack, renderer, out }
    }

    /// Checks with both providers that `name` is still free, VCS first.
    pub fn validate(&self, name: &str) -> Result<()> {
        self.providers.vcs.validate(name)?;
        self.providers.ci.validate(name)
    }

    /// Runs every step for `name` inside `dir` and returns the status code.
    pub fn run(mut self, dir: &Path, name: &str) -> i32 {
        match self.execute(dir, name) {
            Ok(()) => {
                debug!("Scaffolding of '{}' completed", name);
                SUCCESS
            }
            Err(code) => code,
        }
    }

    fn check<T>(&mut self, step: Step, result: Result<T>) -> std::result::Result<T, i32> {
        result.map_err(|err| fail(self.out, step, &err))
    }

    fn execute(&mut self, dir: &Path, name: &str) -> std::result::Result<(), i32> {
        output::progress(
            self.out,
            "Creating new service",
            &format!("{name}' using stack '{}", self.stack.name()),
        );

        let configured = self
            .providers
            .vcs
            .configure()
            .and_then(|_| self.providers.ci.configure());
        self.check(Step::Configure, configured)?;

        let validated = self.validate(name);
        self.check(Step::ValidateName, validated)?;

        output::progress(self.out, "Creating repository at", self.providers.vcs.name());
        let created = self.providers.vcs.scaffold(name);
        let repository = self.check(Step::CreateRepository, created)?;
        output::success(self.out, "Created repository", &repository.ssh_url);

        let cloned = self.providers.vcs.clone_repository(dir, name, &repository.ssh_url);
        self.check(Step::CloneRepository, cloned)?;
        let project_dir = dir.join(name);

        output::progress(self.out, "Creating build pipeline for", name);
        let badges = self.providers.ci.badges(name);
        let badges = self.check(Step::FetchBadges, badges)?;

        let context = TemplateContext::build(
            name,
            self.providers.organisation,
            self.providers.registry_url,
            &repository,
            badges,
        );
        let context = self.check(Step::BuildContext, context)?;

        let scaffolded = self.providers.ci.scaffold(&project_dir, &context, self.renderer);
        let webhook = self.check(Step::ScaffoldCi, scaffolded)?;

        if let Some(url) = webhook {
            debug!("Registering webhook {}", url);
            let registered = self.providers.vcs.webhook(name, &url);
            self.check(Step::RegisterWebhook, registered)?;
        }

        let written = generate::create_dotfiles(&project_dir);
        self.check(Step::WriteDotfiles, written)?;

        let written = generate::create_readme(&project_dir, &context, self.renderer);
        self.check(Step::WriteReadme, written)?;

        let written = generate::create_deployment(&project_dir, &context, self.renderer);
        self.check(Step::WriteDeployment, written)?;

        let written = self.stack.scaffold(&project_dir, &context, self.renderer);
        self.check(Step::ScaffoldStack, written)?;

        Ok(())
    }
}
