//! Tests for the generated cloud-init user-data document

use base64::Engine;
use std::fs;
use tempfile::TempDir;

use pve_template_rs::cloudinit::{RunCmd, UserData, homedir};
use pve_template_rs::distro::Distro;

const KEY: &str = "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAA ataylor@laptop";

fn render_plain() -> String {
    UserData::for_template(
        "ataylor",
        KEY,
        Distro::Ubuntu.profile().packages,
        "Etc/UTC",
        None,
        Distro::Ubuntu.first_boot_commands(),
    )
    .render()
    .unwrap()
}

/// Fixed inputs produce byte-for-byte identical documents
#[test]
fn test_document_is_byte_for_byte_deterministic() {
    assert_eq!(render_plain(), render_plain());
}

#[test]
fn test_document_sections_present() {
    let doc = render_plain();

    assert!(doc.starts_with("#cloud-config\n"));
    assert!(doc.contains("package_update: true"));
    assert!(doc.contains("package_upgrade: true"));
    assert!(doc.contains("qemu-guest-agent"));
    assert!(doc.contains("timezone: Etc/UTC"));
    assert!(doc.contains("mode: reboot"));
    assert!(doc.contains("timeout: 1800"));
}

#[test]
fn test_user_block_fields() {
    let doc = UserData::from_yaml(&render_plain()).unwrap();
    let user = &doc.users[0];

    assert_eq!(user.name, "ataylor");
    assert_eq!(user.sudo, "ALL=(ALL) NOPASSWD:ALL");
    assert_eq!(user.shell, "/bin/bash");
    assert_eq!(user.groups, "users, admin");
    assert_eq!(user.ssh_authorized_keys, vec![KEY]);
}

/// Archiving then extracting reproduces identical contents and relative paths
#[test]
fn test_home_payload_round_trip() {
    let home = TempDir::new().unwrap();
    fs::create_dir_all(home.path().join("projects/notes")).unwrap();
    fs::write(home.path().join(".profile"), "export EDITOR=vim\n").unwrap();
    fs::write(home.path().join("projects/notes/todo.md"), "- ship it\n").unwrap();

    let doc = UserData::for_template(
        "ataylor",
        KEY,
        &[],
        "Etc/UTC",
        Some(homedir::build_payload("ataylor", home.path()).unwrap()),
        vec![],
    );
    let rendered = doc.render().unwrap();

    // Pull the payload back out of the rendered document
    let parsed = UserData::from_yaml(&rendered).unwrap();
    let raw = base64::engine::general_purpose::STANDARD
        .decode(&parsed.write_files[0].content)
        .unwrap();

    let out = TempDir::new().unwrap();
    let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(raw.as_slice()));
    archive.unpack(out.path()).unwrap();

    assert_eq!(
        fs::read_to_string(out.path().join(".profile")).unwrap(),
        "export EDITOR=vim\n"
    );
    assert_eq!(
        fs::read_to_string(out.path().join("projects/notes/todo.md")).unwrap(),
        "- ship it\n"
    );
}

#[test]
fn test_home_payload_extraction_commands() {
    let home = TempDir::new().unwrap();
    fs::write(home.path().join(".bashrc"), "export PS1='$ '\n").unwrap();

    let doc = UserData::for_template(
        "ataylor",
        KEY,
        &[],
        "Etc/UTC",
        Some(homedir::build_payload("ataylor", home.path()).unwrap()),
        vec![],
    );

    let argv: Vec<&Vec<String>> = doc
        .runcmd
        .iter()
        .filter_map(|c| match c {
            RunCmd::Args(a) => Some(a),
            RunCmd::Shell(_) => None,
        })
        .collect();

    assert_eq!(argv[0][0], "mkdir");
    assert_eq!(argv[1][0], "tar");
    assert!(argv[1].contains(&"/home/ataylor".to_string()));
    assert_eq!(argv[2][0], "chown");
    assert!(argv[2].contains(&"ataylor:ataylor".to_string()));
    assert_eq!(argv[3][0], "rm");
}

/// The key file's trailing newline never leaks into the YAML list entry
#[test]
fn test_key_content_trimmed() {
    let doc = UserData::for_template(
        "ataylor",
        "ssh-ed25519 AAAA x@y\n",
        &[],
        "Etc/UTC",
        None,
        vec![],
    );

    assert_eq!(doc.users[0].ssh_authorized_keys[0], "ssh-ed25519 AAAA x@y");
}
