//! `provision`: bring an instance from definition to a ready login target
//!
//! Safe to re-run. The instance is only created when absent and mounts that
//! are already attached are left alone; the bootstrap scripts run every time.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, info};

use crate::config;
use crate::container::ContainerRecord;
use crate::engine::actions::ProvisionOptions;
use crate::engine::executor::{Orchestrator, Outcome};
use crate::error::{NookError, Result};
use crate::runtime::lxc::{ExecOptions, BOOTSTRAP_DIR, MOUNT_DEVICE_PREFIX};
use crate::runtime::InstanceState;

impl Orchestrator<'_> {
    pub fn provision(&self, explicit: Option<&str>, options: ProvisionOptions) -> Result<Outcome> {
        let Some(record) = self.resolve_record(explicit)? else {
            return Ok(Outcome::NoContainer);
        };
        check_bootstrap(&record)?;

        let name = record.name.as_str();
        let settings = &self.ctx.settings;
        let lxc = self.ctx.lxc();

        let state = match self.api.instance(name)? {
            Some(state) => {
                debug!(container = name, status = %state.status, "instance exists, skipping create");
                state
            }
            None => {
                info!(container = name, image = %settings.image, "creating instance");
                self.launcher
                    .run_checked(&lxc.create(name, &settings.image, &settings.profiles))?;
                self.api
                    .instance(name)?
                    .ok_or_else(|| NookError::InstanceMissing(name.to_string()))?
            }
        };

        self.attach_mounts(&record, &state)?;
        self.ensure_running(name)?;

        for script in [record.bootstrap_root(), record.bootstrap_user()] {
            self.launcher.run_checked(&lxc.push(name, &script))?;
        }

        info!(container = name, host = %settings.probe_host, "waiting for network");
        let timeout = settings.network_timeout().map(|d| d.as_secs());
        let waited = self
            .launcher
            .run(&lxc.wait_for_network(name, &settings.probe_host, timeout))?;
        if !waited.is_success() {
            return Err(NookError::NetworkUnreachable(name.to_string()));
        }

        info!(container = name, "running root bootstrap");
        let root_options = ExecOptions {
            cwd: Some(Path::new(BOOTSTRAP_DIR)),
            env: Vec::new(),
        };
        // Scripts are pushed executable and run through their own shebang
        let root_script = format!("./{}", config::BOOTSTRAP_ROOT);
        self.launcher
            .run_checked(&lxc.exec(name, &root_options, &[root_script]))?;

        info!(container = name, user = %settings.user, "running user bootstrap");
        let user_script = format!("{BOOTSTRAP_DIR}/{}", config::BOOTSTRAP_USER);
        self.launcher
            .run_checked(&lxc.exec_as(name, &settings.user, &user_script))?;

        self.launcher.run_checked(&lxc.install_profile_snippet(name))?;
        info!(container = name, "provisioned");

        if options.login {
            return self.login(Some(name));
        }
        Ok(Outcome::Completed)
    }

    /// Add a disk device for every mount not already attached
    fn attach_mounts(&self, record: &ContainerRecord, state: &InstanceState) -> Result<()> {
        let lxc = self.ctx.lxc();
        let mut used: BTreeSet<String> = state.devices.keys().cloned().collect();

        for (source, target) in &record.mounts {
            if state.has_disk(source, target) {
                debug!(container = %record.name, source = %source.display(), "mount already attached");
                continue;
            }
            let device = next_device_name(&used);
            info!(
                container = %record.name,
                source = %source.display(),
                target = %target.display(),
                device = %device,
                "attaching mount"
            );
            self.launcher
                .run_checked(&lxc.add_disk(&record.name, &device, source, target))?;
            used.insert(device);
        }
        Ok(())
    }
}

fn check_bootstrap(record: &ContainerRecord) -> Result<()> {
    for script in [record.bootstrap_root(), record.bootstrap_user()] {
        if !script.is_file() {
            return Err(NookError::MissingBootstrap(script));
        }
    }
    Ok(())
}

/// First `nook-mount-<n>` not in `used`
fn next_device_name(used: &BTreeSet<String>) -> String {
    (0..)
        .map(|n| format!("{MOUNT_DEVICE_PREFIX}{n}"))
        .find(|candidate| !used.contains(candidate))
        .unwrap_or_else(|| MOUNT_DEVICE_PREFIX.to_string())
}
