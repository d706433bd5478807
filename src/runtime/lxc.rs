//! `lxc` command lines used during provisioning and login

use std::path::Path;

use super::launcher::CommandSpec;

/// Environment variable carrying the starting directory into login shells
pub const WORKDIR_ENV: &str = "NOOK_WORKDIR";

/// Where bootstrap scripts are pushed inside the instance
pub const BOOTSTRAP_DIR: &str = "/tmp/nook-bootstrap";

/// Profile fragment that honors [`WORKDIR_ENV`] on login
pub const PROFILE_FILE: &str = "/etc/profile.d/nook-workdir.sh";
pub const PROFILE_SNIPPET: &str =
    r#"[ -n "$NOOK_WORKDIR" ] && [ -d "$NOOK_WORKDIR" ] && cd "$NOOK_WORKDIR" || true"#;

/// Prefix for disk devices created from mounts
pub const MOUNT_DEVICE_PREFIX: &str = "nook-mount-";

/// Options for `lxc exec`
#[derive(Debug, Clone, Default)]
pub struct ExecOptions<'a> {
    pub cwd: Option<&'a Path>,
    pub env: Vec<(&'a str, String)>,
}

/// Builds `lxc` invocations
#[derive(Debug, Clone)]
pub struct Lxc {
    program: String,
}

impl Lxc {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn command(&self) -> CommandSpec {
        CommandSpec::new(self.program.clone())
    }

    /// `lxc init <image> <name> -p <profile>...`
    pub fn create(&self, name: &str, image: &str, profiles: &[String]) -> CommandSpec {
        let mut command = self.command().args(["init", image, name]);
        for profile in profiles {
            command = command.arg("-p").arg(profile.as_str());
        }
        command
    }

    /// `lxc config device add <name> <device> disk source=<host> path=<guest>`
    pub fn add_disk(&self, name: &str, device: &str, source: &Path, path: &Path) -> CommandSpec {
        self.command()
            .args(["config", "device", "add", name, device, "disk"])
            .arg(format!("source={}", source.display()))
            .arg(format!("path={}", path.display()))
    }

    /// Push `file` into [`BOOTSTRAP_DIR`] of a running instance
    pub fn push(&self, name: &str, file: &Path) -> CommandSpec {
        let file_name = file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.command()
            .args(["file", "push", "--create-dirs", "--mode", "0755"])
            .arg(file.to_string_lossy().into_owned())
            .arg(format!("{name}{BOOTSTRAP_DIR}/{file_name}"))
    }

    /// `lxc exec <name> [--cwd dir] [--env K=V]... -- <argv>`
    pub fn exec<S: AsRef<str>>(&self, name: &str, options: &ExecOptions<'_>, argv: &[S]) -> CommandSpec {
        let mut command = self.command().args(["exec", name]);
        if let Some(cwd) = options.cwd {
            command = command.arg("--cwd").arg(cwd.to_string_lossy().into_owned());
        }
        for (key, value) in &options.env {
            command = command.arg("--env").arg(format!("{key}={value}"));
        }
        command.arg("--").args(argv.iter().map(|a| a.as_ref().to_string()))
    }

    /// Run `script` in the instance as `user` through a login shell
    pub fn exec_as(&self, name: &str, user: &str, script: &str) -> CommandSpec {
        self.exec(name, &ExecOptions::default(), &["su", "-l", user, "-c", script])
    }

    /// Interactive login shell for `user`, starting in `workdir` when known
    pub fn login(&self, name: &str, user: &str, workdir: Option<&Path>) -> CommandSpec {
        match workdir {
            Some(dir) => {
                let options = ExecOptions {
                    cwd: None,
                    env: vec![(WORKDIR_ENV, dir.to_string_lossy().into_owned())],
                };
                self.exec(name, &options, &["su", "-l", "-w", WORKDIR_ENV, user])
            }
            None => self.exec(name, &ExecOptions::default(), &["su", "-l", user]),
        }
    }

    /// In-container loop that returns once `host` resolves
    pub fn wait_for_network(&self, name: &str, host: &str, timeout_secs: Option<u64>) -> CommandSpec {
        let mut argv: Vec<String> = Vec::new();
        if let Some(secs) = timeout_secs {
            argv.extend(["timeout".to_string(), secs.to_string()]);
        }
        // `host` is a positional parameter, never part of the script text
        argv.extend(
            [
                "sh",
                "-c",
                r#"until getent hosts "$1" >/dev/null 2>&1; do sleep 1; done"#,
                "sh",
                host,
            ]
            .map(str::to_string),
        );
        self.exec(name, &ExecOptions::default(), &argv)
    }

    /// Append [`PROFILE_SNIPPET`] to [`PROFILE_FILE`] unless already present
    pub fn install_profile_snippet(&self, name: &str) -> CommandSpec {
        self.exec(
            name,
            &ExecOptions::default(),
            &[
                "sh",
                "-c",
                r#"grep -qsxF "$1" "$2" || printf '%s\n' "$1" >> "$2""#,
                "sh",
                PROFILE_SNIPPET,
                PROFILE_FILE,
            ],
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn lxc() -> Lxc {
        Lxc::new("lxc")
    }

    #[test]
    fn test_create_with_profiles() {
        let command = lxc().create("web", "ubuntu:24.04", &["default".into(), "gpu".into()]);
        assert_eq!(
            command.args,
            vec!["init", "ubuntu:24.04", "web", "-p", "default", "-p", "gpu"]
        );
    }

    #[test]
    fn test_add_disk() {
        let command = lxc().add_disk(
            "web",
            "nook-mount-0",
            Path::new("/home/u/web"),
            Path::new("/workspace"),
        );
        assert_eq!(
            command.args,
            vec![
                "config",
                "device",
                "add",
                "web",
                "nook-mount-0",
                "disk",
                "source=/home/u/web",
                "path=/workspace"
            ]
        );
    }

    #[test]
    fn test_push_target() {
        let command = lxc().push("web", Path::new("/cfg/containers/web/bootstrap-root.sh"));
        assert_eq!(
            command.args.last().unwrap(),
            "web/tmp/nook-bootstrap/bootstrap-root.sh"
        );
    }

    #[test]
    fn test_exec_with_cwd_and_env() {
        let options = ExecOptions {
            cwd: Some(Path::new("/tmp")),
            env: vec![("A", "1".to_string())],
        };
        let command = lxc().exec("web", &options, &["ls"]);
        assert_eq!(
            command.args,
            vec!["exec", "web", "--cwd", "/tmp", "--env", "A=1", "--", "ls"]
        );
    }

    #[test]
    fn test_login_with_and_without_workdir() {
        let dir = PathBuf::from("/workspace/src");
        let with = lxc().login("web", "ubuntu", Some(&dir));
        assert!(with.has_arg("NOOK_WORKDIR=/workspace/src"));
        assert!(with.has_arg("-w"));

        let without = lxc().login("web", "ubuntu", None);
        assert!(!without.has_arg("--env"));
        assert!(!without.args.iter().any(|a| a.contains(WORKDIR_ENV)));
        assert_eq!(without.args, vec!["exec", "web", "--", "su", "-l", "ubuntu"]);
    }

    #[test]
    fn test_network_wait_timeout_is_optional() {
        let unbounded = lxc().wait_for_network("web", "archive.ubuntu.com", None);
        assert!(!unbounded.has_arg("timeout"));

        let bounded = lxc().wait_for_network("web", "archive.ubuntu.com", Some(60));
        assert!(bounded.has_arg("timeout"));
        assert!(bounded.has_arg("60"));
    }

    #[test]
    fn test_network_host_is_positional_arg() {
        let command = lxc().wait_for_network("web", "example.com; reboot", None);
        let script = &command.args[command.args.len() - 3];
        assert!(script.contains(r#"getent hosts "$1""#));
        assert!(!script.contains("reboot"));
        assert_eq!(command.args.last().unwrap(), "example.com; reboot");
    }
}
