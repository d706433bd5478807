//! `init`: create a container definition for the current project

use std::fs;
use std::path::Path;

use tracing::info;

use crate::config::{self, templates};
use crate::container::{validate_name, PendingDefinition};
use crate::engine::actions::ProvisionOptions;
use crate::engine::executor::{Orchestrator, Outcome};
use crate::error::Result;
use crate::prompt::Prompter;
use crate::runtime::editor_command;

/// Files offered for editing, in order
const EDITABLE: [&str; 3] = [config::CONFIG_FILE, config::BOOTSTRAP_ROOT, config::BOOTSTRAP_USER];

impl Orchestrator<'_> {
    /// Create `<root>/containers/<name>/` seeded from the working directory.
    ///
    /// The directory only survives if every interactive step completes.
    pub fn init(&self, explicit: Option<&str>, prompter: &dyn Prompter) -> Result<Outcome> {
        let name = match explicit {
            Some(name) => name.to_string(),
            None => match prompter.container_name(self.suggested_name().as_deref())? {
                Some(name) => name,
                None => return Ok(Outcome::Cancelled),
            },
        };
        validate_name(&name)?;

        let pending = PendingDefinition::create(&self.ctx.layout.container_dir(&name))?;
        self.write_definition(pending.path())?;

        for file in EDITABLE {
            let path = pending.path().join(file);
            match prompter.confirm(&format!("Edit {file}?"), false)? {
                Some(true) => self
                    .launcher
                    .run_checked(&editor_command(&self.ctx.editor, &path))?,
                Some(false) => {}
                None => return Ok(Outcome::Cancelled),
            }
        }

        let dir = pending.commit();
        info!(container = %name, dir = %dir.display(), "created container definition");

        if prompter.confirm(&format!("Provision `{name}` now?"), true)? != Some(true) {
            return Ok(Outcome::Completed);
        }
        let login = prompter.confirm("Log in once provisioned?", true)? == Some(true);
        self.provision(Some(&name), ProvisionOptions { login })
    }

    /// Base name of the working directory, unless that is the home directory
    fn suggested_name(&self) -> Option<String> {
        let cwd = &self.ctx.cwd;
        if self.ctx.home.as_deref() == Some(cwd.as_path()) {
            return None;
        }
        cwd.file_name()
            .and_then(|n| n.to_str())
            .map(str::to_string)
    }

    fn write_definition(&self, dir: &Path) -> Result<()> {
        let settings = &self.ctx.settings;
        fs::write(
            dir.join(config::CONFIG_FILE),
            templates::default_config(&self.ctx.cwd, &settings.mount_target),
        )?;

        let templates_dir = self.ctx.layout.templates_dir();
        for script in [config::BOOTSTRAP_ROOT, config::BOOTSTRAP_USER] {
            fs::write(
                dir.join(script),
                templates::bootstrap_template(&templates_dir, script)?,
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::config::ConfigLayout;
    use crate::container::ContainerRecord;
    use crate::engine::executor::testing::*;
    use crate::engine::executor::{Orchestrator, Outcome};
    use crate::error::NookError;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    #[test]
    fn test_suggests_directory_name() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/home/tester/projects/web");
        let (api, launcher) = (FakeApi::default(), FakeLauncher::default());
        let prompter = FakePrompter::answering(Some("web"), &[Some(false); 4]);

        let outcome = Orchestrator::new(&ctx, &api, &launcher)
            .init(None, &prompter)
            .unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert_eq!(*prompter.suggested.borrow(), Some(Some("web".to_string())));

        let dir = ConfigLayout::new(temp.path()).container_dir("web");
        let record = ContainerRecord::load("web", &dir, None).unwrap();
        assert_eq!(record.project_path, PathBuf::from("/home/tester/projects/web"));
        assert_eq!(
            record.container_path(Path::new("/home/tester/projects/web/src")),
            Some(PathBuf::from("/workspace/src"))
        );
        assert!(record.bootstrap_root().is_file());
        assert!(record.bootstrap_user().is_file());
        assert!(launcher.commands().is_empty());
    }

    #[test]
    fn test_no_suggestion_in_home() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/home/tester");
        let (api, launcher) = (FakeApi::default(), FakeLauncher::default());
        let prompter = FakePrompter::answering(None, &[]);

        let outcome = Orchestrator::new(&ctx, &api, &launcher)
            .init(None, &prompter)
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(*prompter.suggested.borrow(), Some(None));
        assert!(!ConfigLayout::new(temp.path()).containers_dir().join("tester").exists());
    }

    #[test]
    fn test_cancel_after_creation_removes_directory() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/home/tester/web");
        let (api, launcher) = (FakeApi::default(), FakeLauncher::default());
        // Decline the first edit, then cancel the second prompt
        let prompter = FakePrompter::answering(Some("web"), &[Some(false), None]);

        let outcome = Orchestrator::new(&ctx, &api, &launcher)
            .init(None, &prompter)
            .unwrap();
        assert_eq!(outcome, Outcome::Cancelled);
        assert_eq!(prompter.questions.borrow().len(), 2);
        assert!(!ConfigLayout::new(temp.path()).container_dir("web").exists());
    }

    #[test]
    fn test_failed_editor_removes_directory() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/home/tester/web");
        let api = FakeApi::default();
        let launcher = FakeLauncher::failing_on("config.toml", 1);
        let prompter = FakePrompter::answering(Some("web"), &[Some(true)]);

        let err = Orchestrator::new(&ctx, &api, &launcher)
            .init(None, &prompter)
            .unwrap_err();
        assert!(matches!(err, NookError::ProcessFailed { .. }));
        assert!(!ConfigLayout::new(temp.path()).container_dir("web").exists());
    }

    #[test]
    fn test_edit_opens_editor_on_each_file() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/home/tester/web");
        let (api, launcher) = (FakeApi::default(), FakeLauncher::default());
        let prompter =
            FakePrompter::answering(None, &[Some(true), Some(false), Some(true), Some(false)]);

        let outcome = Orchestrator::new(&ctx, &api, &launcher)
            .init(Some("web"), &prompter)
            .unwrap();
        assert_eq!(outcome, Outcome::Completed);
        // Explicit names skip the name prompt
        assert!(prompter.suggested.borrow().is_none());

        let edited: Vec<String> = launcher
            .commands()
            .iter()
            .map(|c| {
                assert_eq!(c.program, "vi");
                c.args[0].clone()
            })
            .collect();
        assert_eq!(edited.len(), 2);
        assert!(edited[0].ends_with("config.toml"));
        assert!(edited[1].ends_with("bootstrap-user.sh"));
    }

    #[test]
    fn test_existing_definition_untouched() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "web", "project-path = \"/keep\"\n");
        let ctx = context(temp.path(), "/home/tester/web");
        let (api, launcher) = (FakeApi::default(), FakeLauncher::default());
        let prompter = FakePrompter::answering(None, &[]);

        let err = Orchestrator::new(&ctx, &api, &launcher)
            .init(Some("web"), &prompter)
            .unwrap_err();
        assert!(matches!(err, NookError::AlreadyExists(_)));
        let config = ConfigLayout::new(temp.path()).container_dir("web").join("config.toml");
        assert_eq!(fs::read_to_string(config).unwrap(), "project-path = \"/keep\"\n");
    }

    #[test]
    fn test_invalid_prompted_name() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/home/tester/my_proj");
        let (api, launcher) = (FakeApi::default(), FakeLauncher::default());
        let prompter = FakePrompter::answering(Some("my_proj"), &[]);

        let err = Orchestrator::new(&ctx, &api, &launcher)
            .init(None, &prompter)
            .unwrap_err();
        assert!(matches!(err, NookError::InvalidName { .. }));
        assert!(!ConfigLayout::new(temp.path()).containers_dir().exists());
    }

    #[test]
    fn test_chains_into_provision() {
        let temp = TempDir::new().unwrap();
        let ctx = context(temp.path(), "/home/tester/web");
        let api = FakeApi::default();
        let launcher = FakeLauncher::backed_by(&api);
        // three edit prompts declined, provision yes, login no
        let prompter = FakePrompter::answering(
            Some("web"),
            &[Some(false), Some(false), Some(false), Some(true), Some(false)],
        );

        let outcome = Orchestrator::new(&ctx, &api, &launcher)
            .init(None, &prompter)
            .unwrap();
        assert_eq!(outcome, Outcome::Completed);
        assert!(api.calls().contains(&"start web".to_string()));
        assert!(launcher.commands()[0].has_arg("init"));
    }
}
