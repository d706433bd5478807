//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::CONFIG_DIR_ENV;

#[derive(Parser, Debug)]
#[command(name = "nook")]
#[command(author, version, about = "Per-project LXD development containers", long_about = None)]
#[command(after_help = "With no operation, `nook` logs in to the container for the current directory.")]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<SubCommand>,

    /// Use this container instead of resolving one from the working directory
    #[arg(short = 'c', long = "container", value_name = "NAME", global = true)]
    pub container: Option<String>,

    /// Configuration directory (default: ~/.config/nook)
    #[arg(long, value_name = "DIR", env = CONFIG_DIR_ENV, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Output format as JSON (status, list)
    #[arg(long, global = true)]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum SubCommand {
    /// Create a container definition for the current directory
    Init {
        /// Container name (prompted for when omitted)
        name: Option<String>,
    },

    /// Open a shell in the container, starting it if needed
    Login,

    /// Create the instance, attach mounts and run the bootstrap scripts
    Provision {
        /// Log in once provisioning finishes
        #[arg(long)]
        login: bool,
    },

    /// Stop the container
    Stop,

    /// Show the resolved container and its live status
    Status,

    /// List all container definitions
    List,

    #[command(external_subcommand)]
    Unknown(Vec<String>),
}

impl Args {
    /// Name for `init`: positional first, then `--container`
    pub fn init_name(&self) -> Option<&str> {
        match &self.command {
            Some(SubCommand::Init { name: Some(name) }) => Some(name),
            _ => self.container.as_deref(),
        }
    }
}
