//! Home-directory payload
//!
//! Ships a pre-populated home directory inside the user-data document: the
//! directory is archived (tar + gzip), base64-encoded into a `write_files`
//! entry, and unpacked by first-boot commands that then fix ownership and
//! remove the staged tarball. Payload size is bounded only by what the
//! hypervisor accepts as a snippet; nothing is chunked.

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use flate2::Compression;
use flate2::write::GzEncoder;
use std::path::Path;
use tracing::debug;

use super::{RunCmd, WriteFile};
use crate::TemplateError;

/// Write-files entry plus the commands that consume it
#[derive(Debug, Clone)]
pub struct HomePayload {
    pub write_file: WriteFile,
    pub extract_commands: Vec<RunCmd>,
}

/// Guest path the tarball is staged at before extraction
pub fn staged_path(username: &str) -> String {
    format!("/var/tmp/{}-home.tar.gz", username)
}

/// Archive `home_dir` for `username` into an inline payload
pub fn build_payload(username: &str, home_dir: &Path) -> Result<HomePayload, TemplateError> {
    let archive = archive_dir(home_dir)?;
    debug!(
        "Archived {} into {} gzip bytes",
        home_dir.display(),
        archive.len()
    );

    let staged = staged_path(username);
    let home = format!("/home/{}", username);

    let write_file = WriteFile {
        path: staged.clone(),
        content: BASE64.encode(&archive),
        encoding: Some("b64".to_string()),
        owner: Some("root:root".to_string()),
        permissions: Some("0600".to_string()),
    };

    // Argv form throughout: the username feeds into every path here
    let owner = format!("{0}:{0}", username);
    let extract_commands = vec![
        RunCmd::args(["mkdir", "-p", home.as_str()]),
        RunCmd::args(["tar", "-xzf", staged.as_str(), "-C", home.as_str()]),
        RunCmd::args(["chown", "-R", owner.as_str(), home.as_str()]),
        RunCmd::args(["rm", "-f", staged.as_str()]),
    ];

    Ok(HomePayload {
        write_file,
        extract_commands,
    })
}

/// Tar + gzip a directory tree, rooted at `.` so extraction lands directly
/// in the target home
fn archive_dir(dir: &Path) -> Result<Vec<u8>, TemplateError> {
    let encoder = GzEncoder::new(Vec::new(), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    builder.follow_symlinks(false);
    builder.append_dir_all(".", dir)?;

    let encoder = builder.into_inner()?;
    Ok(encoder.finish()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_staged_path_keyed_by_username() {
        assert_eq!(staged_path("ataylor"), "/var/tmp/ataylor-home.tar.gz");
    }

    #[test]
    fn test_payload_round_trip() {
        let home = TempDir::new().unwrap();
        fs::create_dir_all(home.path().join(".config/app")).unwrap();
        fs::write(home.path().join(".bashrc"), "alias ll='ls -la'\n").unwrap();
        fs::write(home.path().join(".config/app/settings"), "x=1\n").unwrap();

        let payload = build_payload("ataylor", home.path()).unwrap();

        // Decode the write_files entry the way the guest agent would
        let raw = BASE64.decode(&payload.write_file.content).unwrap();
        let out = TempDir::new().unwrap();
        let mut archive = tar::Archive::new(flate2::read::GzDecoder::new(raw.as_slice()));
        archive.unpack(out.path()).unwrap();

        assert_eq!(
            fs::read_to_string(out.path().join(".bashrc")).unwrap(),
            "alias ll='ls -la'\n"
        );
        assert_eq!(
            fs::read_to_string(out.path().join(".config/app/settings")).unwrap(),
            "x=1\n"
        );
    }

    #[test]
    fn test_extract_commands_cleanup_last() {
        let home = TempDir::new().unwrap();
        let payload = build_payload("ataylor", home.path()).unwrap();

        let last = payload.extract_commands.last().unwrap();
        match last {
            RunCmd::Args(args) => {
                assert_eq!(args[0], "rm");
                assert!(args.contains(&staged_path("ataylor")));
            }
            RunCmd::Shell(_) => panic!("cleanup must use argv form"),
        }
    }

    #[test]
    fn test_commands_use_argv_form() {
        let home = TempDir::new().unwrap();
        let payload = build_payload("odd name", home.path()).unwrap();

        for cmd in &payload.extract_commands {
            assert!(matches!(cmd, RunCmd::Args(_)));
        }
    }
}
