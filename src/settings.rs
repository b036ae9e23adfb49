//! Site settings and standard Proxmox paths

use std::path::{Path, PathBuf};

/// Storage pool VM disks are imported into
pub const DEFAULT_STORAGE: &str = "local-lvm";

/// Directory the generated user-data snippets are written to
pub const DEFAULT_SNIPPETS_DIR: &str = "/var/lib/vz/snippets";

/// Storage volume that backs the snippets directory
pub const DEFAULT_SNIPPETS_VOLUME: &str = "local";

/// Local cache directory for downloaded cloud images
pub const DEFAULT_IMAGES_DIR: &str = "/var/lib/vz/template/cache";

/// Bridge the first NIC attaches to
pub const DEFAULT_BRIDGE: &str = "vmbr0";

/// Timezone configured in every template
pub const DEFAULT_TIMEZONE: &str = "Etc/UTC";

/// Where images, snippets and VM disks live on this host
#[derive(Debug, Clone)]
pub struct Settings {
    pub storage: String,
    pub bridge: String,
    pub timezone: String,
    pub images_dir: PathBuf,
    pub snippets_dir: PathBuf,
    pub snippets_volume: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self::new()
    }
}

impl Settings {
    /// Create with standard Proxmox defaults
    pub fn new() -> Self {
        Self {
            storage: DEFAULT_STORAGE.to_string(),
            bridge: DEFAULT_BRIDGE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            images_dir: PathBuf::from(DEFAULT_IMAGES_DIR),
            snippets_dir: PathBuf::from(DEFAULT_SNIPPETS_DIR),
            snippets_volume: DEFAULT_SNIPPETS_VOLUME.to_string(),
        }
    }

    /// Create with custom cache and snippets directories (useful for testing)
    pub fn with_dirs(images_dir: impl AsRef<Path>, snippets_dir: impl AsRef<Path>) -> Self {
        Self {
            images_dir: images_dir.as_ref().to_path_buf(),
            snippets_dir: snippets_dir.as_ref().to_path_buf(),
            ..Self::new()
        }
    }

    /// Snippet filename for a VM, keyed by id
    pub fn snippet_filename(&self, vm_id: u32) -> String {
        format!("user-data-{}.yaml", vm_id)
    }

    /// Full path the user-data snippet is written to
    pub fn snippet_path(&self, vm_id: u32) -> PathBuf {
        self.snippets_dir.join(self.snippet_filename(vm_id))
    }

    /// `cicustom` value binding the snippet as the VM's user-data source
    pub fn cicustom_value(&self, vm_id: u32) -> String {
        format!(
            "user={}:snippets/{}",
            self.snippets_volume,
            self.snippet_filename(vm_id)
        )
    }

    /// First NIC definition for created VMs
    pub fn net0(&self) -> String {
        format!("virtio,bridge={}", self.bridge)
    }
}
