//! Error types for move_group_launch

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AssemblyError {
    #[error("Package '{0}' not found. Ensure the package is installed and sourced.")]
    PackageNotFound(String),

    #[error("YAML parsing error in {}: {source}", .path.display())]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("Invalid parameter document {}: expected a mapping, found {found}", .path.display())]
    InvalidDocument { path: PathBuf, found: &'static str },

    #[error("Configuration error in {}: {message}", .path.display())]
    Config { path: PathBuf, message: String },

    #[error(transparent)]
    Macro(#[from] MacroError),

    #[error("Dependency cycle between processes: {0}")]
    DependencyCycle(String),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Error, Debug)]
pub enum MacroError {
    #[error("Undefined substitution argument '{0}'. Pass it in the mappings or declare it with <xacro:arg>.")]
    UndefinedArgument(String),

    #[error("Unterminated substitution starting at byte {0}")]
    Unterminated(usize),

    #[error("Macro processor '{program}' failed: {message}")]
    ProcessFailed { program: String, message: String },

    #[error("Robot description template is not well-formed XML: {0}")]
    MalformedTemplate(roxmltree::Error),

    #[error("Expanded robot description is not well-formed XML: {0}")]
    MalformedOutput(#[from] roxmltree::Error),

    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, AssemblyError>;
