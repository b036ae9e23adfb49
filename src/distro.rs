//! Distribution profiles
//!
//! Each supported distro maps to a fixed cloud image and the package-manager
//! commands its family uses at first boot. The profile is selected by the
//! caller, never auto-detected from the image.

use crate::cloudinit::RunCmd;

/// Supported distributions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Distro {
    Ubuntu,
    Fedora,
}

impl std::fmt::Display for Distro {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Distro::Ubuntu => write!(f, "ubuntu"),
            Distro::Fedora => write!(f, "fedora"),
        }
    }
}

/// Fixed image and package metadata for one distribution
#[derive(Debug, Clone)]
pub struct DistroProfile {
    /// Release the image tracks (e.g. "24.04")
    pub version: &'static str,
    /// Image filename in the local cache directory
    pub filename: &'static str,
    /// Mirror URL the image is fetched from
    pub download_url: &'static str,
    /// Packages installed at first boot
    pub packages: &'static [&'static str],
}

impl Distro {
    /// Resolve the fixed profile for this distribution
    pub fn profile(self) -> DistroProfile {
        match self {
            Distro::Ubuntu => DistroProfile {
                version: "24.04",
                filename: "noble-server-cloudimg-amd64.img",
                download_url:
                    "https://cloud-images.ubuntu.com/noble/current/noble-server-cloudimg-amd64.img",
                packages: &["qemu-guest-agent"],
            },
            Distro::Fedora => DistroProfile {
                version: "41",
                filename: "Fedora-Cloud-Base-Generic-41-1.4.x86_64.qcow2",
                download_url:
                    "https://download.fedoraproject.org/pub/fedora/linux/releases/41/Cloud/x86_64/images/Fedora-Cloud-Base-Generic-41-1.4.x86_64.qcow2",
                packages: &["qemu-guest-agent"],
            },
        }
    }

    /// First-boot commands common to every template plus the distro
    /// family's package-manager cleanup (apt vs dnf).
    pub fn first_boot_commands(self) -> Vec<RunCmd> {
        let mut commands = vec![RunCmd::args([
            "systemctl",
            "enable",
            "--now",
            "qemu-guest-agent",
        ])];

        match self {
            Distro::Ubuntu => {
                commands.push(RunCmd::shell("apt-get -y autoremove --purge"));
                commands.push(RunCmd::shell("apt-get clean"));
            }
            Distro::Fedora => {
                commands.push(RunCmd::shell("dnf -y clean all"));
            }
        }

        commands
    }
}
