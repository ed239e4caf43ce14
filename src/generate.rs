//! Files written into every new project regardless of stack or provider.

use crate::context::TemplateContext;
use crate::error::Result;
use crate::file;
use crate::renderer::TemplateRenderer;
use std::path::Path;

const EDITORCONFIG: &str = r#"root = true

[*]
end_of_line = lf
insert_final_newline = true
charset = utf-8
trim_trailing_whitespace = true
"#;

const DOCKERIGNORE: &str = r#".git
.editorconfig
Dockerfile
README.md
"#;

const README: &str = r#"# {{ project_name }}
{% for badge in badges %}[![{{ badge.title }}]({{ badge.image_url }})]({{ badge.link_url }}){% endfor %}
"#;

const DEPLOYMENT: &str = r#"apiVersion: apps/v1
kind: Deployment
metadata:
 labels:
   app: {{ project_name }}
 name: {{ project_name }}
 annotations:
   kubernetes.io/change-cause: "${TIMESTAMP} Deployed commit id: ${COMMIT}"
spec:
 replicas: 2
 selector:
   matchLabels:
     app: {{ project_name }}
 strategy:
   rollingUpdate:
     maxSurge: 1
     maxUnavailable: 1
   type: RollingUpdate
 template:
   metadata:
     labels:
       app: {{ project_name }}
   spec:
     affinity:
       podAntiAffinity:
         preferredDuringSchedulingIgnoredDuringExecution:
         - weight: 100
           podAffinityTerm:
             labelSelector:
               matchExpressions:
               - key: "app"
                 operator: In
                 values:
                 - {{ project_name }}
             topologyKey: kubernetes.io/hostname
     containers:
     - name: {{ project_name }}
       readinessProbe:
         httpGet:
           path: /
           port: 80
         initialDelaySeconds: 5
         periodSeconds: 5
         timeoutSeconds: 5
       imagePullPolicy: Always
       image: {{ registry_url }}/{{ project_name }}:${COMMIT}
       ports:
       - containerPort: 80
     restartPolicy: Always
---

apiVersion: v1
kind: Service
metadata:
 name: {{ project_name }}
spec:
 ports:
 - port: 80
   protocol: TCP
   targetPort: 80
 selector:
   app: {{ project_name }}
 type: ClusterIP
"#;

/// Writes `.gitignore` (empty), `.editorconfig` and `.dockerignore`.
pub fn create_dotfiles(dir: &Path) -> Result<()> {
    file::write(dir, ".gitignore", "")?;
    file::write(dir, ".editorconfig", EDITORCONFIG)?;
    file::write(dir, ".dockerignore", DOCKERIGNORE)
}

/// Renders `README.md` with the project name and one link per badge.
pub fn create_readme(
    dir: &Path,
    context: &TemplateContext,
    renderer: &dyn TemplateRenderer,
) -> Result<()> {
    file::write_templated(dir, "README.md", README, context, renderer)
}

/// Renders the Kubernetes manifest to `k8s/deploy.yaml`.
///
/// `${COMMIT}` and `${TIMESTAMP}` are left for the deploy tooling to fill in.
pub fn create_deployment(
    dir: &Path,
    context: &TemplateContext,
    renderer: &dyn TemplateRenderer,
) -> Result<()> {
    file::write_templated(dir, Path::new("k8s").join("deploy.yaml"), DEPLOYMENT, context, renderer)
}
