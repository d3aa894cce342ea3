//! # Media Shrinker Library
//!
//! Questo è il modulo principale della libreria che espone tutte le API pubbliche.
//!
//! ## Responsabilità:
//! - Definisce la struttura modulare dell'applicazione
//! - Espone i tipi e le funzioni principali tramite re-exports
//! - Fornisce un'interfaccia pulita per il main.rs e per altri consumatori
//!
//! ## Architettura dei moduli:
//! - `config`: Gestione configurazione e validazione parametri
//! - `error`: Tipi di errore custom per diverse operazioni
//! - `media_kind`: Classificazione per estensione (immagine/video/audio)
//! - `file_manager`: Selezione dei file sopra soglia, timestamp, copie
//! - `size_gate`: Soglia di dimensione e accettazione dei candidati
//! - `platform` / `transcoder`: Invocazione di ffmpeg
//! - `image_processor` / `video_processor` / `audio_processor`: Strategie di compressione
//! - `replacer`: Sostituzione in-place solo se strettamente più piccolo
//! - `optimizer`: Orchestratore del comando `compress`
//! - `progress`: Progress tracking e statistiche
//! - `mirror` / `archive`: Copia piatta di un disco e zip di una cartella
//!
//! ## Utilizzo:
//! ```rust,ignore
//! use media_shrinker::{Config, MediaOptimizer};
//!
//! let optimizer = MediaOptimizer::new(Config::default())?;
//! let stats = optimizer.run(&path).await?;
//! ```

pub mod archive;
pub mod audio_processor;
pub mod config;
pub mod error;
pub mod file_manager;
pub mod image_processor;
pub mod media_kind;
pub mod mirror;
pub mod optimizer;
pub mod platform;
pub mod progress;
pub mod replacer;
pub mod size_gate;
pub mod transcoder;
pub mod video_processor;

pub use archive::{ArchiveSummary, Archiver};
pub use config::Config;
pub use error::{ShrinkError, ShrinkResult};
pub use file_manager::{FileCandidate, FileManager};
pub use media_kind::MediaKind;
pub use mirror::{Mirror, MirrorStats};
pub use optimizer::MediaOptimizer;
pub use progress::OptimizationStats;
pub use replacer::CompressionOutcome;
