//! Mock hypervisor for testing
//!
//! Records every call the workflow makes so tests can assert ordering and
//! absence of calls on failed validation.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::{Hypervisor, VmSpec};
use crate::TemplateError;

/// One recorded hypervisor invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateVm {
        vm_id: u32,
        spec: VmSpec,
    },
    ImportDisk {
        vm_id: u32,
        image: PathBuf,
        storage: String,
    },
    SetOptions {
        vm_id: u32,
        options: Vec<(String, String)>,
    },
    ResizeDisk {
        vm_id: u32,
        disk: String,
        size: String,
    },
    ConvertToTemplate {
        vm_id: u32,
    },
}

impl Call {
    /// Short operation name, for failure injection matching
    fn op(&self) -> &'static str {
        match self {
            Call::CreateVm { .. } => "create_vm",
            Call::ImportDisk { .. } => "import_disk",
            Call::SetOptions { .. } => "set_options",
            Call::ResizeDisk { .. } => "resize_disk",
            Call::ConvertToTemplate { .. } => "convert_to_template",
        }
    }
}

/// Recording hypervisor double
///
/// # Example
/// ```
/// use pve_template_rs::hypervisor::mock::MockHypervisor;
///
/// let mock = MockHypervisor::new().with_fail_on("resize_disk");
/// ```
pub struct MockHypervisor {
    calls: Mutex<Vec<Call>>,
    fail_on: Option<&'static str>,
}

impl MockHypervisor {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_on: None,
        }
    }

    /// Make the named operation fail after being recorded
    pub fn with_fail_on(mut self, op: &'static str) -> Self {
        self.fail_on = Some(op);
        self
    }

    /// Snapshot of all recorded calls, in order
    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().expect("mock lock poisoned").clone()
    }

    /// Number of recorded calls
    pub fn call_count(&self) -> usize {
        self.calls.lock().expect("mock lock poisoned").len()
    }

    fn record(&self, call: Call) -> Result<(), TemplateError> {
        let op = call.op();
        self.calls.lock().expect("mock lock poisoned").push(call);

        if self.fail_on == Some(op) {
            return Err(TemplateError::hypervisor(op, "injected failure"));
        }
        Ok(())
    }
}

impl Default for MockHypervisor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Hypervisor for MockHypervisor {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn create_vm(&self, vm_id: u32, spec: &VmSpec) -> Result<(), TemplateError> {
        self.record(Call::CreateVm {
            vm_id,
            spec: spec.clone(),
        })
    }

    async fn import_disk(
        &self,
        vm_id: u32,
        image: &Path,
        storage: &str,
    ) -> Result<String, TemplateError> {
        self.record(Call::ImportDisk {
            vm_id,
            image: image.to_path_buf(),
            storage: storage.to_string(),
        })?;

        Ok(format!("{}:vm-{}-disk-0", storage, vm_id))
    }

    async fn set_options(
        &self,
        vm_id: u32,
        options: &[(String, String)],
    ) -> Result<(), TemplateError> {
        self.record(Call::SetOptions {
            vm_id,
            options: options.to_vec(),
        })
    }

    async fn resize_disk(
        &self,
        vm_id: u32,
        disk: &str,
        size: &str,
    ) -> Result<(), TemplateError> {
        self.record(Call::ResizeDisk {
            vm_id,
            disk: disk.to_string(),
            size: size.to_string(),
        })
    }

    async fn convert_to_template(&self, vm_id: u32) -> Result<(), TemplateError> {
        self.record(Call::ConvertToTemplate { vm_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_records_in_order() {
        let mock = MockHypervisor::new();

        mock.create_vm(
            9000,
            &VmSpec {
                name: "t".into(),
                memory_mb: 2048,
                cores: 2,
                net0: "virtio,bridge=vmbr0".into(),
            },
        )
        .await
        .unwrap();
        mock.convert_to_template(9000).await.unwrap();

        let calls = mock.calls();
        assert_eq!(calls.len(), 2);
        assert!(matches!(calls[0], Call::CreateVm { vm_id: 9000, .. }));
        assert!(matches!(calls[1], Call::ConvertToTemplate { vm_id: 9000 }));
    }

    #[tokio::test]
    async fn test_mock_import_reports_volume() {
        let mock = MockHypervisor::new();
        let volume = mock
            .import_disk(9000, Path::new("/img.qcow2"), "local-lvm")
            .await
            .unwrap();
        assert_eq!(volume, "local-lvm:vm-9000-disk-0");
    }

    #[tokio::test]
    async fn test_mock_failure_injection() {
        let mock = MockHypervisor::new().with_fail_on("resize_disk");

        let err = mock.resize_disk(9000, "scsi0", "10G").await.unwrap_err();
        assert!(matches!(err, TemplateError::Hypervisor(_)));
        // The call is still recorded before it fails
        assert_eq!(mock.call_count(), 1);
    }
}
