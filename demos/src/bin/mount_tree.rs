//! Mount Tree Demo
//!
//! Boots a registry, publishes a couple of services, attaches an in-memory
//! disk, mounts a directory of that disk into the namespace and stats a file
//! through it. The resulting mount tree is logged at the end.
//!
//! ```bash
//! cargo run -p kestrel-demos --bin mount_tree -- \
//!     --file etc/hosts:128 --file etc/net/resolv.conf:64 --remote /etc --stat net/resolv.conf
//! ```

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use kestrel_vfs::{MemoryDevice, MemoryFs, Registry, VfsResult};
use parking_lot::RwLock;

/// Publish services and an in-memory disk, then print the mount tree.
#[derive(Parser, Debug)]
#[command(name = "mount_tree", version)]
struct Args {
    /// Name of the in-memory disk.
    #[arg(long, default_value = "vblk0")]
    disk: String,

    /// Number of 512-byte blocks on the disk.
    #[arg(long, default_value = "2048")]
    blocks: u64,

    /// Directory on the disk to mount into the namespace.
    #[arg(long, default_value = "/etc")]
    remote: String,

    /// Where the remote directory is mounted.
    #[arg(long, default_value = "/mnt/etc")]
    local: String,

    /// File to create on the disk, as `path:size` (repeatable).
    #[arg(long = "file", value_parser = parse_seed_file)]
    files: Vec<(String, u64)>,

    /// Path to stat, relative to the local mount point.
    #[arg(long, default_value = "hosts")]
    stat: String,
}

fn parse_seed_file(value: &str) -> Result<(String, u64), String> {
    match value.rsplit_once(':') {
        Some((path, size)) => size
            .parse()
            .map(|size| (path.to_owned(), size))
            .map_err(|err| format!("invalid size in {value:?}: {err}")),
        None => Ok((value.to_owned(), 0)),
    }
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("mount_tree failed: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> VfsResult<()> {
    let registry = Registry::new();

    // Services stay alive for the whole run; the tree only borrows them.
    let hostname = Arc::new(String::from("kestrel"));
    let uptime = Arc::new(RwLock::new(0u64));
    registry.mount("/sys/hostname", &hostname, "Host name")?;
    registry.mount_mut("/sys/uptime_ticks", &uptime, "Ticks since boot")?;
    *registry.get_mut::<u64>("/sys/uptime_ticks")?.write() += 1;

    let fs = MemoryFs::new("initfs");
    if args.files.is_empty() {
        fs.insert("etc/hosts", 128)?;
        fs.insert("etc/net/resolv.conf", 64)?;
    }
    for (path, size) in &args.files {
        fs.insert(path, *size)?;
    }

    let device = Arc::new(MemoryDevice::new(args.disk.clone(), args.blocks));
    let disk = registry.mount_device(&format!("/dev/{}", args.disk), device, "Boot disk")?;
    disk.mount_fs(Arc::new(fs));

    pollster::block_on(registry.mount_remote(&args.local, &args.disk, &args.remote, "Config"))?;

    let target = format!("{}/{}", args.local.trim_end_matches('/'), args.stat);
    let dirent = pollster::block_on(registry.stat(&target)?)?;
    log::info!(
        "{target}: {:?}, {} bytes on {}",
        dirent.kind(),
        dirent.size(),
        dirent.fs_name().unwrap_or("-")
    );
    log::info!(
        "Hostname {}, uptime {} ticks",
        *registry.get::<String>("/sys/hostname")?.read(),
        *registry.get::<u64>("/sys/uptime_ticks")?.read()
    );

    registry.log_tree();
    Ok(())
}
