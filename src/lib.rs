//! Nook - per-project LXD development containers
//!
//! Nook maps the current working directory to a registered container by
//! nearest-ancestor matching over project roots, then drives that
//! container's lifecycle (provision, start, stop, login) against LXD.
//!
//! # Example
//!
//! ```no_run
//! use nook::config::{ConfigLayout, Settings};
//! use nook::engine::{ExecutionContext, Orchestrator};
//! use nook::runtime::{LxdClient, SystemLauncher};
//!
//! let layout = ConfigLayout::new("/home/me/.config/nook");
//! let settings = Settings::load(&layout.settings_file()).unwrap();
//! let ctx = ExecutionContext {
//!     editor: settings.editor_command(),
//!     layout,
//!     settings,
//!     cwd: std::env::current_dir().unwrap(),
//!     home: dirs::home_dir(),
//! };
//! let api = LxdClient::new(ctx.settings.socket_path());
//! let outcome = Orchestrator::new(&ctx, &api, &SystemLauncher).status(None).unwrap();
//! println!("{:?}", outcome);
//! ```

pub mod cli;
pub mod config;
pub mod container;
pub mod engine;
pub mod error;
pub mod output;
pub mod prompt;
pub mod resolver;
pub mod runtime;

pub use engine::{ExecutionContext, Orchestrator, Outcome};
pub use error::{NookError, Result};
pub use output::{format_report, OutputFormat};
