//! Writing generated files into the project directory.

use crate::context::TemplateContext;
use crate::error::Result;
use crate::renderer::TemplateRenderer;
use log::debug;
use std::fs;
use std::path::Path;

/// Writes `content` to `dir/name`, creating missing parent directories.
pub fn write<P: AsRef<Path>>(dir: &Path, name: P, content: &str) -> Result<()> {
    let target = dir.join(name);
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    debug!("Writing file: {}", target.display());
    fs::write(&target, content)?;
    Ok(())
}

/// Renders `template` with `context` and writes the result to `dir/name`.
pub fn write_templated<P: AsRef<Path>>(
    dir: &Path,
    name: P,
    template: &str,
    context: &TemplateContext,
    renderer: &dyn TemplateRenderer,
) -> Result<()> {
    let content = renderer.render(template, context)?;
    write(dir, name, &content)
}
