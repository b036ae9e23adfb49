//! Template provisioning workflow
//!
//! One strictly ordered sequence: fetch image, create VM, import and attach
//! the disk, configure cloud-init, convert to template. Fail-fast with no
//! rollback; a step failure leaves already-created hypervisor resources in
//! place for manual cleanup.

use tokio::fs;
use tracing::info;

use crate::VmState;
use crate::cloudinit::{UserData, homedir};
use crate::error::TemplateError;
use crate::fetcher;
use crate::hypervisor::{Hypervisor, VmSpec};
use crate::request::ProvisionRequest;
use crate::settings::Settings;

/// Drive one provisioning run to completion and return the template's VM id.
///
/// All validation happens before the first hypervisor call; once the VM
/// exists any failure halts the sequence where it stands.
pub async fn provision(
    hypervisor: &dyn Hypervisor,
    settings: &Settings,
    request: &ProvisionRequest,
) -> Result<u32, TemplateError> {
    request.validate()?;
    hypervisor.preflight().await?;

    let profile = request.size.profile();
    let distro = request.distro.profile();
    let vm_id = request.vm_id;

    info!(
        "Provisioning {} template (VM {}, {} MB, {} cores, {})",
        request.vm_name(),
        vm_id,
        profile.memory_mb,
        profile.cores,
        profile.disk_size
    );

    // The disk import below depends on this image being present
    let image = fetcher::ensure_image(
        &settings.images_dir,
        distro.download_url,
        distro.filename,
    )
    .await?;

    hypervisor
        .create_vm(
            vm_id,
            &VmSpec {
                name: request.vm_name(),
                memory_mb: profile.memory_mb,
                cores: profile.cores,
                net0: settings.net0(),
            },
        )
        .await?;
    info!("VM {}: {}", vm_id, VmState::Created);

    let volume = hypervisor
        .import_disk(vm_id, &image, &settings.storage)
        .await?;

    hypervisor
        .set_options(
            vm_id,
            &[
                ("scsihw".to_string(), "virtio-scsi-pci".to_string()),
                ("scsi0".to_string(), volume),
                (
                    "ide2".to_string(),
                    format!("{}:cloudinit", settings.storage),
                ),
                ("boot".to_string(), "c".to_string()),
                ("bootdisk".to_string(), "scsi0".to_string()),
                ("serial0".to_string(), "socket".to_string()),
                ("vga".to_string(), "serial0".to_string()),
                ("agent".to_string(), "enabled=1".to_string()),
            ],
        )
        .await?;
    info!("VM {}: {}", vm_id, VmState::DiskAttached);

    hypervisor
        .resize_disk(vm_id, "scsi0", profile.disk_size)
        .await?;

    hypervisor
        .set_options(
            vm_id,
            &[
                ("ciuser".to_string(), request.username.clone()),
                (
                    "sshkeys".to_string(),
                    request.ssh_key_path.to_string_lossy().into_owned(),
                ),
                ("ipconfig0".to_string(), "ip=dhcp".to_string()),
            ],
        )
        .await?;

    let snippet = render_user_data(settings, request).await?;
    fs::create_dir_all(&settings.snippets_dir).await?;
    let snippet_path = settings.snippet_path(vm_id);
    fs::write(&snippet_path, &snippet).await?;
    info!("Wrote user-data snippet {}", snippet_path.display());

    hypervisor
        .set_options(
            vm_id,
            &[("cicustom".to_string(), settings.cicustom_value(vm_id))],
        )
        .await?;
    info!("VM {}: {}", vm_id, VmState::Configured);

    hypervisor.convert_to_template(vm_id).await?;
    info!("VM {}: {}", vm_id, VmState::Templated);

    Ok(vm_id)
}

/// Build and render the cloud-init document for a request
async fn render_user_data(
    settings: &Settings,
    request: &ProvisionRequest,
) -> Result<String, TemplateError> {
    let ssh_key = fs::read_to_string(&request.ssh_key_path)
        .await
        .map_err(|_| TemplateError::MissingSshKey(request.ssh_key_path.clone()))?;

    let home_payload = match &request.home_dir {
        Some(dir) => Some(homedir::build_payload(&request.username, dir)?),
        None => None,
    };

    let document = UserData::for_template(
        &request.username,
        &ssh_key,
        request.distro.profile().packages,
        &settings.timezone,
        home_payload,
        request.distro.first_boot_commands(),
    );

    document.render()
}
