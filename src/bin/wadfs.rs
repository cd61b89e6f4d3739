//! wadfs mount tool.
//!
//! Loads a WAD container and mounts it as a FUSE filesystem:
//!
//! ```bash
//! wadfs archive.wad /mnt/wad
//!
//! ls /mnt/wad
//! cat /mnt/wad/MAPS/E1M1/THINGS
//!
//! fusermount -u /mnt/wad
//! ```

use std::path::PathBuf;
use std::process;

use clap::Parser;
use fuser::MountOption;

use wadfs::fuse::WadFs;
use wadfs::Wad;

#[derive(Parser)]
#[command(name = "wadfs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Mount a WAD container as a filesystem")]
struct Cli {
    /// WAD container file
    wad: PathBuf,

    /// Mount point
    mountpoint: PathBuf,

    /// Allow other users to access the mount
    #[arg(long)]
    allow_other: bool,
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let wad = Wad::load(&cli.wad)?;

    let mut options = vec![MountOption::FSName("wadfs".to_string())];
    if cli.allow_other {
        options.push(MountOption::AllowOther);
    }

    fuser::mount2(WadFs::new(wad), &cli.mountpoint, &options)?;
    Ok(())
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("wadfs: {}", e);
        process::exit(1);
    }
}
