//! Error types for pve-template-rs

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for template provisioning operations
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Invalid size '{0}': expected 'small' or 'medium'")]
    InvalidSize(String),

    #[error("SSH public key not found or unreadable: {0}")]
    MissingSshKey(PathBuf),

    #[error("Home directory not found: {0}")]
    MissingHomeDir(PathBuf),

    #[error("Required tool '{0}' not found in PATH")]
    MissingTool(String),

    #[error("Root privileges required: {0}")]
    NotRoot(String),

    #[error("Download of {url} failed: {message}")]
    Download { url: String, message: String },

    #[error("Disk import for VM {vm_id} did not report a volume: {message}")]
    DiskImport { vm_id: u32, message: String },

    #[error("Hypervisor command failed: {0}")]
    Hypervisor(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TemplateError {
    /// Create a hypervisor error from a failed command invocation
    pub fn hypervisor(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Hypervisor(format!("{}: {}", command.into(), detail.into()))
    }
}
