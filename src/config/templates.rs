//! Bootstrap script templates and the default container config

use std::fs;
use std::path::Path;

use crate::error::Result;

pub const BOOTSTRAP_ROOT_TEMPLATE: &str = include_str!("../../templates/bootstrap-root.sh");
pub const BOOTSTRAP_USER_TEMPLATE: &str = include_str!("../../templates/bootstrap-user.sh");

/// Contents of a bootstrap template, preferring a user override in `templates_dir`
pub fn bootstrap_template(templates_dir: &Path, file_name: &str) -> Result<String> {
    let override_path = templates_dir.join(file_name);
    if override_path.is_file() {
        return Ok(fs::read_to_string(override_path)?);
    }

    Ok(match file_name {
        super::BOOTSTRAP_ROOT => BOOTSTRAP_ROOT_TEMPLATE,
        _ => BOOTSTRAP_USER_TEMPLATE,
    }
    .to_string())
}

/// Render the initial `config.toml` for a project rooted at `project`
pub fn default_config(project: &Path, mount_target: &Path) -> String {
    let project = toml_string(project);
    format!(
        "# Host directory this container belongs to. Running nook anywhere\n\
         # below it selects this container.\n\
         project-path = {project}\n\
         \n\
         # Host directory = directory inside the container.\n\
         [mounts]\n\
         {project} = {target}\n",
        target = toml_string(mount_target),
    )
}

fn toml_string(path: &Path) -> String {
    toml::Value::String(path.to_string_lossy().into_owned()).to_string()
}
