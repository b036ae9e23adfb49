//! Provision request and size profiles
//!
//! A request is immutable once built and is threaded through the whole
//! workflow; all validation happens before any side effect.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::TemplateError;
use crate::distro::Distro;

/// VM size class selecting a fixed resource profile
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmSize {
    Small,
    Medium,
}

impl FromStr for VmSize {
    type Err = TemplateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "small" => Ok(VmSize::Small),
            "medium" => Ok(VmSize::Medium),
            other => Err(TemplateError::InvalidSize(other.to_string())),
        }
    }
}

impl std::fmt::Display for VmSize {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmSize::Small => write!(f, "small"),
            VmSize::Medium => write!(f, "medium"),
        }
    }
}

/// Fixed resource profile for a size class
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeProfile {
    /// VM memory in megabytes
    pub memory_mb: u32,
    /// Number of CPU cores
    pub cores: u32,
    /// Boot disk target size, in `qm resize` notation (e.g. "10G")
    pub disk_size: &'static str,
}

impl VmSize {
    /// Resolve the fixed profile for this size class
    pub fn profile(self) -> SizeProfile {
        match self {
            VmSize::Small => SizeProfile {
                memory_mb: 2048,
                cores: 2,
                disk_size: "10G",
            },
            VmSize::Medium => SizeProfile {
                memory_mb: 4096,
                cores: 4,
                disk_size: "20G",
            },
        }
    }
}

/// Immutable description of one template provisioning run
#[derive(Debug, Clone)]
pub struct ProvisionRequest {
    /// Distribution whose cloud image seeds the template
    pub distro: Distro,
    /// Size class resolved against the profile table
    pub size: VmSize,
    /// Hypervisor VM id the template will be created under
    pub vm_id: u32,
    /// Account created in the guest at first boot
    pub username: String,
    /// Public key installed for that account
    pub ssh_key_path: PathBuf,
    /// Optional directory archived into the guest's home
    pub home_dir: Option<PathBuf>,
}

impl ProvisionRequest {
    pub fn new(
        distro: Distro,
        size: VmSize,
        vm_id: u32,
        username: impl Into<String>,
        ssh_key_path: impl AsRef<Path>,
        home_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            distro,
            size,
            vm_id,
            username: username.into(),
            ssh_key_path: ssh_key_path.as_ref().to_path_buf(),
            home_dir,
        }
    }

    /// Check filesystem preconditions.
    ///
    /// Runs before any hypervisor call or download, so a failing request
    /// leaves no partial VM behind.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if !self.ssh_key_path.is_file() {
            return Err(TemplateError::MissingSshKey(self.ssh_key_path.clone()));
        }

        if let Some(home) = &self.home_dir {
            if !home.is_dir() {
                return Err(TemplateError::MissingHomeDir(home.clone()));
            }
        }

        Ok(())
    }

    /// Generated VM name, e.g. `ubuntu-cloud-small`
    pub fn vm_name(&self) -> String {
        format!("{}-cloud-{}", self.distro, self.size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_size_from_str() {
        assert_eq!("small".parse::<VmSize>().unwrap(), VmSize::Small);
        assert_eq!("medium".parse::<VmSize>().unwrap(), VmSize::Medium);
    }

    #[test]
    fn test_size_rejects_unknown() {
        let err = "large".parse::<VmSize>().unwrap_err();
        assert!(matches!(err, TemplateError::InvalidSize(ref s) if s == "large"));
    }

    #[test]
    fn test_profile_table() {
        let small = VmSize::Small.profile();
        assert_eq!(small.memory_mb, 2048);
        assert_eq!(small.cores, 2);
        assert_eq!(small.disk_size, "10G");

        let medium = VmSize::Medium.profile();
        assert_eq!(medium.memory_mb, 4096);
        assert_eq!(medium.cores, 4);
        assert_eq!(medium.disk_size, "20G");
    }

    #[test]
    fn test_validate_missing_ssh_key() {
        let request = ProvisionRequest::new(
            Distro::Ubuntu,
            VmSize::Small,
            9000,
            "alice",
            "/nonexistent/id_ed25519.pub",
            None,
        );

        let err = request.validate().unwrap_err();
        assert!(matches!(err, TemplateError::MissingSshKey(_)));
    }

    #[test]
    fn test_validate_missing_home_dir() {
        let temp = TempDir::new().unwrap();
        let key = temp.path().join("id_ed25519.pub");
        std::fs::write(&key, "ssh-ed25519 AAAA alice@host").unwrap();

        let request = ProvisionRequest::new(
            Distro::Ubuntu,
            VmSize::Small,
            9000,
            "alice",
            &key,
            Some(PathBuf::from("/nonexistent/home")),
        );

        let err = request.validate().unwrap_err();
        assert!(matches!(err, TemplateError::MissingHomeDir(_)));
    }

    #[test]
    fn test_validate_ok() {
        let temp = TempDir::new().unwrap();
        let key = temp.path().join("id_ed25519.pub");
        std::fs::write(&key, "ssh-ed25519 AAAA alice@host").unwrap();

        let request = ProvisionRequest::new(
            Distro::Fedora,
            VmSize::Medium,
            9001,
            "alice",
            &key,
            Some(temp.path().to_path_buf()),
        );

        request.validate().unwrap();
        assert_eq!(request.vm_name(), "fedora-cloud-medium");
    }
}
