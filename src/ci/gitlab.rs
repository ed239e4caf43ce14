use crate::ci::{badge_title, Ci};
use crate::config::{bind, fill, redact, EnvSource, Layer};
use crate::context::{Badge, TemplateContext};
use crate::error::{Error, Result};
use crate::file;
use crate::gitlab::{ensure_available, resolve_project_path, GitlabApi, GitlabClient};
use crate::renderer::TemplateRenderer;
use serde::Deserialize;
use std::fmt;
use std::path::Path;

const TOKEN_ENV: &str = "GITLAB_TOKEN";
const GROUP_ENV: &str = "GITLAB_GROUP";

/// GitLab CI as continuous integration provider.
#[derive(Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Gitlab {
    pub group: String,
    pub token: String,
    #[serde(skip)]
    api: Option<Box<dyn GitlabApi>>,
}

impl Gitlab {
    /// Uses `api` instead of the client created by [`Ci::configure`].
    pub fn with_api(mut self, api: Box<dyn GitlabApi>) -> Self {
        self.api = Some(api);
        self
    }

    fn api(&self) -> Result<&dyn GitlabApi> {
        self.api
            .as_deref()
            .ok_or_else(|| Error::RemoteOperationError("Gitlab client not configured".to_string()))
    }
}

impl fmt::Debug for Gitlab {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gitlab")
            .field("group", &self.group)
            .field("token", &redact(&self.token))
            .finish_non_exhaustive()
    }
}

impl Layer for Gitlab {
    fn merge(&mut self, other: Self) {
        fill(&mut self.group, other.group);
        fill(&mut self.token, other.token);
    }

    fn apply_env(&mut self, env: &dyn EnvSource) {
        bind(&mut self.group, env, GROUP_ENV);
        bind(&mut self.token, env, TOKEN_ENV);
    }
}

impl Ci for Gitlab {
    fn name(&self) -> &'static str {
        "Gitlab"
    }

    fn validate_config(&self) -> Result<()> {
        if self.token.is_empty() {
            return Err(Error::ProviderCredentialError(
                "token for Gitlab not configured".to_string(),
            ));
        }
        Ok(())
    }

    fn configure(&mut self) -> Result<()> {
        if self.api.is_none() {
            self.api = Some(Box::new(GitlabClient::new(&self.token)?));
        }
        Ok(())
    }

    fn validate(&self, name: &str) -> Result<()> {
        ensure_available(self.api()?, &self.group, name)
    }

    fn scaffold(
        &self,
        dir: &Path,
        context: &TemplateContext,
        renderer: &dyn TemplateRenderer,
    ) -> Result<Option<String>> {
        file::write_templated(dir, ".gitlab-ci.yml", GITLAB_CI_YML, context, renderer)?;
        Ok(None)
    }

    fn badges(&self, name: &str) -> Result<Vec<Badge>> {
        let api = self.api()?;
        let badges = api.project_badges(&resolve_project_path(api, &self.group, name)?)?;
        Ok(badges
            .into_iter()
            .map(|badge| Badge {
                title: badge_title(&badge.image_url).to_string(),
                image_url: badge.rendered_image_url,
                link_url: badge.rendered_link_url,
            })
            .collect())
    }
}

const GITLAB_CI_YML: &str = r#"stages:
  - build
  - deploy-staging
  - deploy-prod

variables:
  DOCKER_HOST: tcp://docker:2375/

image: buildtool/build-tools

build:
  stage: build
  services:
    - docker:dind
  script:
  - build
  - push

deploy-to-staging:
  stage: deploy-staging
  when: on_success
  script:
    - echo Deploy {{ project_name }} to staging.
    - deploy staging
  environment:
    name: staging

deploy-to-prod:
  stage: deploy-prod
  when: on_success
  script:
    - echo Deploy {{ project_name }} to prod.
    - deploy prod
  environment:
    name: prod
  only:
    - master
"#;
