//! pve-template-rs library
//!
//! Builds Proxmox VM templates from distro cloud images with cloud-init.
//!
//! # Design Principles
//!
//! - **Safety First**: No unsafe code (`#![forbid(unsafe_code)]`)
//! - **One workflow**: a single parameterized sequence covers every
//!   distro/size combination
//! - **Fail fast**: all validation before the first side effect, no rollback
//!   of hypervisor state afterwards
//! - **Typed documents**: the cloud-init user-data is serialized, never
//!   string-templated

pub mod cloudinit;
pub mod distro;
pub mod fetcher;
pub mod hypervisor;
pub mod preflight;
pub mod provision;
pub mod request;
pub mod settings;

mod error;

pub use error::TemplateError;
pub use provision::provision;
pub use request::{ProvisionRequest, SizeProfile, VmSize};
pub use settings::Settings;

/// States a VM passes through on its way to becoming a template.
///
/// The hypervisor owns the VM; the workflow only issues commands and logs
/// which state each completed step leaves it in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VmState {
    /// VM object exists with memory/cores/NIC set
    Created,
    /// Imported cloud image attached as the boot disk
    DiskAttached,
    /// Cloud-init drive, user-data and boot settings in place
    Configured,
    /// Converted; can only be cloned from now on
    Templated,
}

impl std::fmt::Display for VmState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmState::Created => write!(f, "created"),
            VmState::DiskAttached => write!(f, "disk-attached"),
            VmState::Configured => write!(f, "configured"),
            VmState::Templated => write!(f, "templated"),
        }
    }
}
