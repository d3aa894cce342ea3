//! # Image Processing Module
//!
//! Questo modulo gestisce la compressione di tutti i formati immagine supportati
//! usando la libreria `image` in-process.
//!
//! ## Formati Supportati
//!
//! | Formato | Input | Output |
//! |---------|-------|--------|
//! | JPEG    | ✅    | JPEG   |
//! | PNG     | ✅    | JPEG   |
//! | TIFF    | ✅    | JPEG   |
//! | BMP     | ✅    | JPEG   |
//! | WebP    | ✅    | JPEG   |
//!
//! ## Pipeline di Compressione
//!
//! 1. **Snapshot timestamp**: atime/mtime del sorgente prima di leggerlo
//! 2. **Decodifica**: formato rilevato dal contenuto, non dall'estensione
//! 3. **Conversione colore**: RGB 8 bit (alpha scartato)
//! 4. **Codifica JPEG**: qualità `config.jpeg_quality` (1-95)
//! 5. **EXIF**: se presente nel sorgente viene reinserito come APP1
//! 6. **Size gate**: il temporaneo viene accettato o scartato
//!
//! La decodifica e la codifica girano su `spawn_blocking` per non bloccare
//! il runtime tokio.
//!
//! ## Esempio
//!
//! ```rust,ignore
//! let processor = ImageProcessor::new(config);
//! let candidate = processor.compress(Path::new("/photos/IMG_001.png"), &gate).await?;
//! // candidate == "/photos/IMG_001.compressed.jpg" oppure il path originale
//! ```

use crate::config::Config;
use crate::error::{ShrinkError, ShrinkResult};
use crate::file_manager::{display_name, FileStamp};
use crate::size_gate::SizeGate;
use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageDecoder, ImageEncoder, ImageError, ImageReader};
use std::io::Cursor;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const OUTPUT_EXTENSION: &str = "jpg";

/// APP1 payload limit: 65533 bytes minus the `Exif\0\0` header
const MAX_EXIF_LEN: usize = 65_527;

/// Re-encodes still images as JPEG
pub struct ImageProcessor {
    /// Quality and ratio settings
    config: Config,
}

impl ImageProcessor {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    /// Compresses a single image.
    ///
    /// # Returns
    /// * the accepted `<stem>.compressed.jpg` sibling when the re-encoded image
    ///   meets the size gate
    /// * `input_path` unchanged otherwise
    ///
    /// # Errors
    /// A `ShrinkError::Transcode` naming `input_path` when the source cannot be
    /// read or decoded, or the candidate cannot be written.
    pub async fn compress(&self, input_path: &Path, gate: &SizeGate) -> ShrinkResult<PathBuf> {
        self.compress_internal(input_path, gate)
            .await
            .map_err(|e| ShrinkError::transcode(input_path, e))
    }

    async fn compress_internal(&self, input_path: &Path, gate: &SizeGate) -> ShrinkResult<PathBuf> {
        debug!(
            "🖼️ Compressing image: {} (quality: {})",
            display_name(input_path),
            self.config.jpeg_quality
        );

        let stamp = FileStamp::capture(input_path)?;
        let source = tokio::fs::read(input_path).await?;
        let original_size = source.len() as u64;
        let quality = self.config.jpeg_quality;

        let encoded = tokio::task::spawn_blocking(move || Self::encode_jpeg(&source, quality))
            .await
            .map_err(|e| ShrinkError::Io(std::io::Error::other(e)))??;

        let temp = SizeGate::temp_output(OUTPUT_EXTENSION)?;
        tokio::fs::write(temp.path(), &encoded).await?;

        gate.settle(input_path, original_size, &stamp, temp, OUTPUT_EXTENSION).await
    }

    /// Decode `source`, convert to RGB and encode as JPEG at `quality`,
    /// carrying over the EXIF block when the source has one.
    pub fn encode_jpeg(source: &[u8], quality: u8) -> ShrinkResult<Vec<u8>> {
        let mut decoder = ImageReader::new(Cursor::new(source))
            .with_guessed_format()?
            .into_decoder()?;
        let exif = decoder.exif_metadata().unwrap_or_else(|e| {
            debug!("Unreadable EXIF block, dropping it: {}", e);
            None
        });
        let rgb = DynamicImage::from_decoder(decoder)?.to_rgb8();

        let mut encoded = Vec::new();
        {
            let mut encoder = JpegEncoder::new_with_quality(&mut encoded, quality);
            match exif {
                Some(block) if block.len() > MAX_EXIF_LEN => {
                    warn!("EXIF block of {} bytes does not fit in one APP1 segment, dropping it", block.len());
                }
                Some(block) => encoder
                    .set_exif_metadata(block)
                    .map_err(ImageError::Unsupported)?,
                None => {}
            }
            encoder.encode_image(&rgb)?;
        }

        Ok(encoded)
    }
}
