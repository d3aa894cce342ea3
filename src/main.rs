//! # Media Shrinker - Main Entry Point
//!
//! Questo è il punto di ingresso principale dell'applicazione.
//!
//! ## Responsabilità:
//! - Parsing degli argomenti della command line con `clap`
//! - Inizializzazione del sistema di logging con `tracing`
//! - Costruzione della configurazione: flag CLI > file JSON > default
//! - Dispatch verso `compress`, `mirror` o `archive`
//!
//! ## Esempio di utilizzo:
//! ```bash
//! media-shrink compress ~/Pictures --ratio 70 --min-size-mb 5 --dry-run
//! media-shrink mirror /media/usb-drive
//! media-shrink archive ~/Documents/thesis --dest /tmp
//! ```

use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

use media_shrinker::{Archiver, Config, FileManager, MediaOptimizer, Mirror};

#[derive(Parser)]
#[command(name = "media-shrink")]
#[command(about = "Shrink large photos, videos and audio files in place")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// JSON config file (flags override its values)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Command {
    /// Recompress every large media file under a directory, replacing it only when smaller
    Compress(CompressArgs),

    /// Copy every file from a drive into one folder (default: Desktop)
    Mirror {
        /// Root of the source tree
        source: PathBuf,

        /// Destination folder
        #[arg(long)]
        dest: Option<PathBuf>,
    },

    /// Zip a folder into <dest>/<folder>.zip (default dest: Desktop)
    Archive {
        /// Folder to archive
        folder: PathBuf,

        /// Destination folder for the archive
        #[arg(long)]
        dest: Option<PathBuf>,
    },
}

#[derive(ClapArgs)]
struct CompressArgs {
    /// Directory containing media files to compress
    directory: PathBuf,

    /// Keep a compressed file only if it is at most this percent of the original
    #[arg(short, long)]
    ratio: Option<f64>,

    /// Only consider files of at least this many MB
    #[arg(short, long)]
    min_size_mb: Option<f64>,

    /// JPEG quality (1-95)
    #[arg(short, long)]
    quality: Option<u8>,

    /// Video CRF value (0-51, lower = better quality)
    #[arg(short, long)]
    crf: Option<u8>,

    /// x264 encoder preset
    #[arg(long)]
    preset: Option<String>,

    /// Audio bitrate for video and audio output
    #[arg(short, long)]
    audio_bitrate: Option<String>,

    /// Dry run - compress and report, but don't replace files
    #[arg(long)]
    dry_run: bool,

    /// Show a progress bar
    #[arg(long)]
    progress: bool,
}

impl CompressArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(ratio) = self.ratio {
            config.compression_ratio = ratio;
        }
        if let Some(min_size_mb) = self.min_size_mb {
            config.min_size_mb = min_size_mb;
        }
        if let Some(quality) = self.quality {
            config.jpeg_quality = quality;
        }
        if let Some(crf) = self.crf {
            config.video_crf = crf;
        }
        if let Some(preset) = &self.preset {
            config.video_preset = preset.clone();
        }
        if let Some(bitrate) = &self.audio_bitrate {
            config.audio_bitrate = bitrate.clone();
        }
        config.dry_run |= self.dry_run;
        config.show_progress |= self.progress;
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging, RUST_LOG wins over --verbose
    let default_level = if args.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    match args.command {
        Command::Compress(compress) => {
            let mut config = load_config(args.config.as_deref()).await?;
            compress.apply(&mut config);

            let optimizer = MediaOptimizer::new(config)?;
            optimizer.run(&compress.directory).await?;
        }
        Command::Mirror { source, dest } => {
            let destination = destination_or_desktop(dest)?;
            Mirror::new(destination).run(&source).await?;
        }
        Command::Archive { folder, dest } => {
            let destination = destination_or_desktop(dest)?;
            let summary = Archiver::create(&folder, &destination).await?;
            info!("📦 {} ({} files)", summary.path.display(), summary.entries);
        }
    }

    Ok(())
}

async fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            Config::from_file(path).await
        }
        None => Ok(Config::default()),
    }
}

fn destination_or_desktop(dest: Option<PathBuf>) -> Result<PathBuf> {
    match dest {
        Some(dest) => Ok(dest),
        None => Ok(FileManager::desktop_dir()?),
    }
}
