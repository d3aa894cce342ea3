//! # Transcoder Module
//!
//! Wrapper sottile attorno all'eseguibile `ffmpeg`, condiviso dai processori
//! video e audio.
//!
//! ## Responsabilità:
//! - Costruzione della riga di comando `ffmpeg -i <in> <codec args> -y <out>`
//! - Esecuzione asincrona con `tokio::process::Command`
//! - Conversione di exit status non-zero in `ShrinkError::FFmpeg` con stderr
//! - Verifica della presenza di ffmpeg nel PATH

use crate::error::{ShrinkError, ShrinkResult};
use crate::platform::PlatformCommands;
use std::path::Path;
use tokio::process::Command;
use tracing::debug;

/// Converts a list of string-like items into owned arguments
pub(crate) fn to_args<T, I>(items: I) -> Vec<String>
where
    T: ToString,
    I: IntoIterator<Item = T>,
{
    items.into_iter().map(|item| item.to_string()).collect()
}

pub struct Transcoder;

impl Transcoder {
    /// Full argument list for a transcode of `input` into `output`
    pub fn command_args(input: &Path, output: &Path, codec_args: &[String]) -> Vec<String> {
        let mut args = to_args(["-hide_banner", "-nostdin", "-i"]);
        args.push(input.to_string_lossy().into_owned());
        args.extend(codec_args.iter().cloned());

        // Suppress FFmpeg output unless in debug mode
        if tracing::enabled!(tracing::Level::DEBUG) {
            args.extend(to_args(["-loglevel", "info"]));
        } else {
            args.extend(to_args(["-loglevel", "error"]));
        }

        args.push("-y".to_string());
        args.push(output.to_string_lossy().into_owned());
        args
    }

    /// Run ffmpeg, failing with its stderr when it exits unsuccessfully
    pub async fn run(input: &Path, output: &Path, codec_args: &[String]) -> ShrinkResult<()> {
        let platform = PlatformCommands::instance();
        let ffmpeg_cmd = platform.get_command("ffmpeg");
        let args = Self::command_args(input, output, codec_args);
        debug!("Running {} {:?}", ffmpeg_cmd, args);

        let start_time = std::time::Instant::now();
        let result = Command::new(ffmpeg_cmd).args(&args).output().await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ShrinkError::MissingDependency(format!("{} is required for audio/video compression", ffmpeg_cmd))
            } else {
                ShrinkError::Io(e)
            }
        })?;
        let elapsed = start_time.elapsed();

        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            let message = stderr.trim();
            return Err(ShrinkError::FFmpeg(if message.is_empty() {
                format!("ffmpeg exited with {}", result.status)
            } else {
                message.to_string()
            }));
        }

        debug!("ffmpeg finished {} in {:.1}s", input.display(), elapsed.as_secs_f64());
        Ok(())
    }

    /// Check that ffmpeg can be found
    pub async fn check_dependencies() -> ShrinkResult<()> {
        let platform = PlatformCommands::instance();
        if !platform.is_command_available("ffmpeg").await {
            return Err(ShrinkError::MissingDependency(
                "ffmpeg is required for audio/video compression".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_args_mixed_types() {
        let crf = 28;
        let args = to_args(["-crf", &crf.to_string(), "-y"]);
        assert_eq!(args, vec!["-crf".to_string(), "28".to_string(), "-y".to_string()]);
    }

    #[test]
    fn test_command_args_layout() {
        let codec = to_args(["-c:a", "libmp3lame"]);
        let args = Transcoder::command_args(Path::new("/in/a.wav"), Path::new("/tmp/out.mp3"), &codec);

        assert_eq!(&args[..4], &["-hide_banner", "-nostdin", "-i", "/in/a.wav"]);
        assert_eq!(&args[4..6], &["-c:a", "libmp3lame"]);
        assert_eq!(args[args.len() - 2], "-y");
        assert_eq!(args[args.len() - 1], "/tmp/out.mp3");
        assert!(args.iter().any(|a| a == "-loglevel"));
    }
}
