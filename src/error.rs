//! Error types for Nook

use std::io;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum NookError {
    #[error("Failed to read `{path}`: {source}")]
    ReadConfig {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse `{path}`: {source}")]
    ParseConfig {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration in `{path}`: {message}")]
    InvalidConfig { path: PathBuf, message: String },

    #[error("Containers `{first}` and `{second}` both claim project path `{path}`")]
    DuplicateProject {
        path: PathBuf,
        first: String,
        second: String,
    },

    #[error("Container `{name}` is not defined (looked in `{dir}`)")]
    ContainerNotFound { name: String, dir: PathBuf },

    #[error("Container definition `{0}` already exists")]
    AlreadyExists(PathBuf),

    #[error("Invalid container name `{name}`: {reason}")]
    InvalidName { name: String, reason: &'static str },

    #[error("Bootstrap script `{0}` is missing")]
    MissingBootstrap(PathBuf),

    #[error("Instance `{0}` does not exist yet. Run `nook provision` first")]
    InstanceMissing(String),

    #[error("LXD request `{operation}` could not reach `{socket}`: {message}")]
    ApiTransport {
        operation: &'static str,
        socket: PathBuf,
        message: String,
    },

    #[error("LXD request `{operation}` failed with status {status}: {message}")]
    ApiStatus {
        operation: &'static str,
        status: u16,
        message: String,
    },

    #[error("LXD request `{operation}` returned a malformed response: {message}")]
    ApiResponse {
        operation: &'static str,
        message: String,
    },

    #[error("LXD operation `{operation}` failed: {message}")]
    OperationFailed { operation: String, message: String },

    #[error("Failed to initialize async runtime: {0}")]
    AsyncRuntime(#[source] io::Error),

    #[error("Failed to launch `{program}`: {source}")]
    Launch {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("`{command}` exited with {status}")]
    ProcessFailed { command: String, status: String },

    #[error("Container `{0}` never reached the network")]
    NetworkUnreachable(String),

    #[error("Prompt failed: {0}")]
    Prompt(String),

    #[error("Failed to install Ctrl+C handler: {0}")]
    Signal(String),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, NookError>;
