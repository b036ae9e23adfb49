//! Preflight checks
//!
//! Tool and privilege checks run before any side effect, so a misconfigured
//! host fails the run without leaving a partial VM behind.

use rustix::process::getuid;
use tracing::debug;

use crate::TemplateError;

/// Hypervisor CLI the provisioner drives
pub const HYPERVISOR_TOOL: &str = "qm";

/// Verify a tool is resolvable on PATH
pub fn check_tool(tool: &str) -> Result<(), TemplateError> {
    match which::which(tool) {
        Ok(path) => {
            debug!("Found {} at {}", tool, path.display());
            Ok(())
        }
        Err(_) => Err(TemplateError::MissingTool(tool.to_string())),
    }
}

/// Verify the process runs as root.
///
/// Required when a home-directory payload is requested: reading another
/// account's home and writing into the snippets directory both need it.
pub fn check_root(reason: &str) -> Result<(), TemplateError> {
    if getuid().is_root() {
        Ok(())
    } else {
        Err(TemplateError::NotRoot(reason.to_string()))
    }
}
