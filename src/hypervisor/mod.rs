//! Hypervisor client abstraction
//!
//! The provisioning workflow only ever talks to this trait; the `qm`
//! command-line client is one implementation, the mock used in tests is
//! another. Disk import reports the created volume id explicitly instead of
//! leaving callers to guess it from naming conventions.

pub mod mock;
pub mod qm;

use async_trait::async_trait;
use std::path::Path;

use crate::TemplateError;

/// Parameters for VM creation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmSpec {
    pub name: String,
    pub memory_mb: u32,
    pub cores: u32,
    /// First NIC definition, e.g. `virtio,bridge=vmbr0`
    pub net0: String,
}

/// Commands the workflow issues against the hypervisor
#[async_trait]
pub trait Hypervisor: Send + Sync {
    /// Name of this client (e.g. "qm", "mock")
    fn name(&self) -> &'static str;

    /// Verify this client can run on the current host.
    ///
    /// Called once before the first command; a CLI-backed client checks its
    /// tool is on PATH here.
    async fn preflight(&self) -> Result<(), TemplateError> {
        Ok(())
    }

    /// Create a stopped VM with the given resources
    async fn create_vm(&self, vm_id: u32, spec: &VmSpec) -> Result<(), TemplateError>;

    /// Import a disk image into a storage pool and return the volume id
    /// the hypervisor assigned (e.g. `local-lvm:vm-9000-disk-0`)
    async fn import_disk(
        &self,
        vm_id: u32,
        image: &Path,
        storage: &str,
    ) -> Result<String, TemplateError>;

    /// Set arbitrary VM properties in one invocation
    async fn set_options(
        &self,
        vm_id: u32,
        options: &[(String, String)],
    ) -> Result<(), TemplateError>;

    /// Grow a disk to the given target size (e.g. "10G")
    async fn resize_disk(
        &self,
        vm_id: u32,
        disk: &str,
        size: &str,
    ) -> Result<(), TemplateError>;

    /// Convert the VM into a template; irreversible
    async fn convert_to_template(&self, vm_id: u32) -> Result<(), TemplateError>;
}
