//! Proxmox `qm` command-line client

use async_trait::async_trait;
use std::path::Path;
use tracing::{debug, info};

use super::{Hypervisor, VmSpec};
use crate::TemplateError;

/// Hypervisor client backed by the `qm` CLI
#[derive(Debug, Default)]
pub struct QmCli;

impl QmCli {
    pub fn new() -> Self {
        Self
    }

    /// Run `qm` with the given arguments, capturing output.
    ///
    /// Blocks until the command finishes; any non-zero exit is fatal and
    /// carries the captured stderr.
    async fn run_qm(&self, args: &[String]) -> Result<std::process::Output, TemplateError> {
        debug!("qm {}", args.join(" "));

        let output = tokio::process::Command::new("qm")
            .args(args)
            .output()
            .await
            .map_err(|e| TemplateError::hypervisor("qm", e.to_string()))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let verb = args.first().map(String::as_str).unwrap_or("qm");
            return Err(TemplateError::hypervisor(
                format!("qm {}", verb),
                stderr.trim().to_string(),
            ));
        }

        Ok(output)
    }
}

/// Extract the volume id `qm importdisk` reports, e.g.
/// `Successfully imported disk as 'unused0:local-lvm:vm-9000-disk-0'`
/// yields `local-lvm:vm-9000-disk-0`.
pub fn parse_imported_volume(stdout: &str) -> Option<String> {
    let line = stdout
        .lines()
        .find(|l| l.to_ascii_lowercase().contains("successfully imported disk as"))?;
    let quoted = line.split('\'').nth(1)?;
    let volume = quoted.strip_prefix("unused0:").unwrap_or(quoted);
    Some(volume.to_string())
}

#[async_trait]
impl Hypervisor for QmCli {
    fn name(&self) -> &'static str {
        "qm"
    }

    async fn preflight(&self) -> Result<(), TemplateError> {
        crate::preflight::check_tool(crate::preflight::HYPERVISOR_TOOL)
    }

    async fn create_vm(&self, vm_id: u32, spec: &VmSpec) -> Result<(), TemplateError> {
        info!("Creating VM {} ({})", vm_id, spec.name);

        self.run_qm(&[
            "create".to_string(),
            vm_id.to_string(),
            "--name".to_string(),
            spec.name.clone(),
            "--memory".to_string(),
            spec.memory_mb.to_string(),
            "--cores".to_string(),
            spec.cores.to_string(),
            "--net0".to_string(),
            spec.net0.clone(),
        ])
        .await?;

        Ok(())
    }

    async fn import_disk(
        &self,
        vm_id: u32,
        image: &Path,
        storage: &str,
    ) -> Result<String, TemplateError> {
        info!("Importing {} into {}", image.display(), storage);

        let output = self
            .run_qm(&[
                "importdisk".to_string(),
                vm_id.to_string(),
                image.to_string_lossy().into_owned(),
                storage.to_string(),
            ])
            .await?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        parse_imported_volume(&stdout).ok_or_else(|| TemplateError::DiskImport {
            vm_id,
            message: "no 'successfully imported disk' line in qm output".to_string(),
        })
    }

    async fn set_options(
        &self,
        vm_id: u32,
        options: &[(String, String)],
    ) -> Result<(), TemplateError> {
        let mut args = vec!["set".to_string(), vm_id.to_string()];
        for (key, value) in options {
            args.push(format!("--{}", key));
            args.push(value.clone());
        }

        self.run_qm(&args).await?;
        Ok(())
    }

    async fn resize_disk(
        &self,
        vm_id: u32,
        disk: &str,
        size: &str,
    ) -> Result<(), TemplateError> {
        info!("Resizing {} of VM {} to {}", disk, vm_id, size);

        self.run_qm(&[
            "resize".to_string(),
            vm_id.to_string(),
            disk.to_string(),
            size.to_string(),
        ])
        .await?;

        Ok(())
    }

    async fn convert_to_template(&self, vm_id: u32) -> Result<(), TemplateError> {
        info!("Converting VM {} to template", vm_id);

        self.run_qm(&["template".to_string(), vm_id.to_string()])
            .await?;

        Ok(())
    }
}
