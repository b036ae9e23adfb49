//! Cloud-init user-data document model
//!
//! Typed serde model of the cloud-config subset a template needs: `users`,
//! `packages`, `write_files`, `runcmd`, `timezone` and `power_state`.
//! Rendering goes through the serializer, so usernames and key material are
//! always quoted correctly and field order (and therefore output) is stable.

pub mod homedir;

use serde::{Deserialize, Serialize};

use crate::TemplateError;

/// Sudo rule granted to the template user
pub const SUDO_NOPASSWD: &str = "ALL=(ALL) NOPASSWD:ALL";

/// Shell set for the template user
pub const DEFAULT_SHELL: &str = "/bin/bash";

/// Supplementary groups for the template user
pub const DEFAULT_GROUPS: &str = "users, admin";

/// Seconds cloud-init waits for the final reboot before giving up
pub const REBOOT_TIMEOUT_SECS: u32 = 1800;

/// Complete user-data document written for one template
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserData {
    pub users: Vec<UserSpec>,
    pub package_update: bool,
    pub package_upgrade: bool,
    pub packages: Vec<String>,
    pub timezone: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub write_files: Vec<WriteFile>,
    pub runcmd: Vec<RunCmd>,
    pub power_state: PowerState,
}

/// Single guest account entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserSpec {
    pub name: String,
    pub groups: String,
    pub shell: String,
    pub sudo: String,
    pub ssh_authorized_keys: Vec<String>,
}

/// File materialized by cloud-init before runcmd executes
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WriteFile {
    pub path: String,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub permissions: Option<String>,
}

/// Command to run at first boot (shell string or argv list)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RunCmd {
    Shell(String),
    Args(Vec<String>),
}

impl RunCmd {
    /// Shell-interpreted command line. Only for fixed strings; anything
    /// carrying user input goes through [`RunCmd::args`].
    pub fn shell(cmd: impl Into<String>) -> Self {
        RunCmd::Shell(cmd.into())
    }

    /// Argv-form command, immune to word splitting
    pub fn args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        RunCmd::Args(args.into_iter().map(Into::into).collect())
    }
}

/// Forced reboot once provisioning finishes, so package installs and the
/// timezone take effect before the template is considered ready
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerState {
    pub mode: String,
    pub timeout: u32,
    pub condition: bool,
}

impl Default for PowerState {
    fn default() -> Self {
        Self {
            mode: "reboot".to_string(),
            timeout: REBOOT_TIMEOUT_SECS,
            condition: true,
        }
    }
}

impl UserData {
    /// Assemble the document for one template user.
    ///
    /// `home_payload`, when present, contributes a `write_files` entry with
    /// the staged tarball and the commands that unpack it; those run before
    /// the distro's own first-boot commands.
    pub fn for_template(
        username: &str,
        ssh_key: &str,
        packages: &[&str],
        timezone: &str,
        home_payload: Option<homedir::HomePayload>,
        distro_commands: Vec<RunCmd>,
    ) -> Self {
        let user = UserSpec {
            name: username.to_string(),
            groups: DEFAULT_GROUPS.to_string(),
            shell: DEFAULT_SHELL.to_string(),
            sudo: SUDO_NOPASSWD.to_string(),
            ssh_authorized_keys: vec![ssh_key.trim_end().to_string()],
        };

        let mut write_files = Vec::new();
        let mut runcmd = Vec::new();

        if let Some(payload) = home_payload {
            write_files.push(payload.write_file);
            runcmd.extend(payload.extract_commands);
        }
        runcmd.extend(distro_commands);

        Self {
            users: vec![user],
            package_update: true,
            package_upgrade: true,
            packages: packages.iter().map(|p| p.to_string()).collect(),
            timezone: timezone.to_string(),
            write_files,
            runcmd,
            power_state: PowerState::default(),
        }
    }

    /// Render the document as `#cloud-config` YAML text
    pub fn render(&self) -> Result<String, TemplateError> {
        let yaml = serde_yaml::to_string(self)?;
        Ok(format!("#cloud-config\n{}", yaml))
    }

    /// Parse a rendered document back (used by tests and snippets inspection)
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        let yaml = yaml
            .strip_prefix("#cloud-config")
            .map(|s| s.trim_start())
            .unwrap_or(yaml);

        serde_yaml::from_str(yaml)
    }
}
