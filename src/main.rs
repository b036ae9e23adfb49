//! pve-template-rs - Proxmox VM template builder
//!
//! Turns a distro cloud image into a reusable Proxmox template in one
//! command: download, `qm` provisioning, cloud-init user-data, convert.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::{Level, error, info};
use tracing_subscriber::FmtSubscriber;

use pve_template_rs::distro::Distro;
use pve_template_rs::hypervisor::qm::QmCli;
use pve_template_rs::settings::{
    DEFAULT_BRIDGE, DEFAULT_IMAGES_DIR, DEFAULT_SNIPPETS_DIR, DEFAULT_SNIPPETS_VOLUME,
    DEFAULT_STORAGE, DEFAULT_TIMEZONE,
};
use pve_template_rs::{ProvisionRequest, Settings, TemplateError, preflight, provision};

#[derive(Parser)]
#[command(name = "pve-template-rs")]
#[command(author, version, about = "Build Proxmox VM templates from cloud images", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an Ubuntu cloud-image template
    Ubuntu(ProvisionArgs),
    /// Build a Fedora cloud-image template
    Fedora(ProvisionArgs),
}

#[derive(Args)]
struct ProvisionArgs {
    /// Size class: small or medium
    size: String,

    /// VM id the template is created under
    vm_id: u32,

    /// Guest account created at first boot
    username: String,

    /// SSH public key installed for the account
    ssh_key_path: PathBuf,

    /// Directory archived into the account's home (requires root)
    home_dir: Option<PathBuf>,

    /// Storage pool the boot disk is imported into
    #[arg(long, env = "PVE_STORAGE", default_value = DEFAULT_STORAGE)]
    storage: String,

    /// Bridge for the first NIC
    #[arg(long, env = "PVE_BRIDGE", default_value = DEFAULT_BRIDGE)]
    bridge: String,

    /// Timezone configured in the template
    #[arg(long, env = "PVE_TIMEZONE", default_value = DEFAULT_TIMEZONE)]
    timezone: String,

    /// Local cache directory for downloaded cloud images
    #[arg(long, env = "PVE_IMAGES_DIR", default_value = DEFAULT_IMAGES_DIR)]
    images_dir: PathBuf,

    /// Directory the user-data snippet is written to
    #[arg(long, env = "PVE_SNIPPETS_DIR", default_value = DEFAULT_SNIPPETS_DIR)]
    snippets_dir: PathBuf,

    /// Storage volume backing the snippets directory
    #[arg(long, env = "PVE_SNIPPETS_VOLUME", default_value = DEFAULT_SNIPPETS_VOLUME)]
    snippets_volume: String,
}

fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

async fn run(distro: Distro, args: ProvisionArgs) -> Result<(), TemplateError> {
    let size = args.size.parse()?;

    if args.home_dir.is_some() {
        preflight::check_root("a home-directory payload reads and stages files as root")?;
    }

    let settings = Settings {
        storage: args.storage,
        bridge: args.bridge,
        timezone: args.timezone,
        images_dir: args.images_dir,
        snippets_dir: args.snippets_dir,
        snippets_volume: args.snippets_volume,
    };

    let request = ProvisionRequest::new(
        distro,
        size,
        args.vm_id,
        args.username,
        args.ssh_key_path,
        args.home_dir,
    );

    let hypervisor = QmCli::new();
    let template_id = provision(&hypervisor, &settings, &request).await?;
    info!("Template {} ready: clone it with 'qm clone {} <new-id>'", template_id, template_id);

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Ubuntu(args) => run(Distro::Ubuntu, args).await,
        Commands::Fedora(args) => run(Distro::Fedora, args).await,
    };

    if let Err(e) = result {
        error!("{}", e);
        std::process::exit(1);
    }
}
