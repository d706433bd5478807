//! `login`: attach an interactive shell to the resolved container

use tracing::{debug, info};

use crate::engine::executor::{Orchestrator, Outcome};
use crate::error::Result;

impl Orchestrator<'_> {
    /// Start the container if needed and run a login shell inside it.
    ///
    /// The session's exit code becomes the outcome.
    pub fn login(&self, explicit: Option<&str>) -> Result<Outcome> {
        let Some(record) = self.resolve_record(explicit)? else {
            return Ok(Outcome::NoContainer);
        };
        self.ensure_running(&record.name)?;

        let workdir = record.container_path(&self.ctx.cwd);
        match &workdir {
            Some(dir) => debug!(container = %record.name, workdir = %dir.display(), "starting directory"),
            None => debug!(container = %record.name, "working directory is not mounted"),
        }

        let command = self
            .ctx
            .lxc()
            .login(&record.name, &self.ctx.settings.user, workdir.as_deref());
        info!(container = %record.name, "logging in");
        let exit = self.launcher.run(&command)?;
        debug!(container = %record.name, %exit, "session ended");
        Ok(Outcome::Session(exit))
    }
}

#[cfg(test)]
mod tests {
    use crate::engine::executor::testing::*;
    use crate::engine::executor::{Orchestrator, Outcome};
    use crate::error::NookError;
    use crate::runtime::{ExitOutcome, InstanceStatus};
    use tempfile::TempDir;

    const WEB: &str = "project-path = \"/home/tester/web\"\n[mounts]\n\"/home/tester/web\" = \"/workspace\"\n";

    #[test]
    fn test_login_passes_starting_directory() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "web", WEB);
        let ctx = context(temp.path(), "/home/tester/web/src");
        let api = FakeApi::with("web", InstanceStatus::Running);
        let launcher = FakeLauncher::default();

        let outcome = Orchestrator::new(&ctx, &api, &launcher).login(None).unwrap();
        assert_eq!(outcome, Outcome::Session(ExitOutcome::success()));

        let commands = launcher.commands();
        assert_eq!(commands.len(), 1);
        assert!(commands[0].has_arg("NOOK_WORKDIR=/workspace/src"));
        assert_eq!(commands[0].args.last().unwrap(), "ubuntu");
        assert_eq!(api.calls(), vec!["get web"]);
    }

    #[test]
    fn test_explicit_name_without_mount_omits_hint() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "web", WEB);
        let ctx = context(temp.path(), "/srv/elsewhere");
        let api = FakeApi::with("web", InstanceStatus::Running);
        let launcher = FakeLauncher::default();

        Orchestrator::new(&ctx, &api, &launcher)
            .login(Some("web"))
            .unwrap();
        let command = &launcher.commands()[0];
        assert!(!command.has_arg("--env"));
        assert!(!command.args.iter().any(|a| a.contains("NOOK_WORKDIR")));
    }

    #[test]
    fn test_login_starts_stopped_container() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "web", WEB);
        let ctx = context(temp.path(), "/home/tester/web");
        let api = FakeApi::with("web", InstanceStatus::Stopped);
        let launcher = FakeLauncher::default();

        Orchestrator::new(&ctx, &api, &launcher).login(None).unwrap();
        assert_eq!(api.calls(), vec!["get web", "start web"]);
        assert!(launcher.commands()[0].has_arg("NOOK_WORKDIR=/workspace"));
    }

    #[test]
    fn test_session_exit_code_propagates() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "web", WEB);
        let ctx = context(temp.path(), "/home/tester/web");
        let api = FakeApi::with("web", InstanceStatus::Running);
        let launcher = FakeLauncher::failing_on("su", 3);

        let outcome = Orchestrator::new(&ctx, &api, &launcher).login(None).unwrap();
        assert_eq!(outcome, Outcome::Session(ExitOutcome { code: Some(3) }));
    }

    #[test]
    fn test_no_container_for_directory() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "web", WEB);
        let ctx = context(temp.path(), "/srv");
        let (api, launcher) = (FakeApi::default(), FakeLauncher::default());

        let outcome = Orchestrator::new(&ctx, &api, &launcher).login(None).unwrap();
        assert_eq!(outcome, Outcome::NoContainer);
        assert!(api.calls().is_empty());
        assert!(launcher.commands().is_empty());
    }

    #[test]
    fn test_login_before_provision() {
        let temp = TempDir::new().unwrap();
        write_record(temp.path(), "web", WEB);
        let ctx = context(temp.path(), "/home/tester/web");
        let (api, launcher) = (FakeApi::default(), FakeLauncher::default());

        let err = Orchestrator::new(&ctx, &api, &launcher)
            .login(None)
            .unwrap_err();
        assert!(matches!(err, NookError::InstanceMissing(_)));
        assert!(launcher.commands().is_empty());
    }
}
