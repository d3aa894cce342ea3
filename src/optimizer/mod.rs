//! # Optimizer Module
//!
//! Separa le responsabilità della pipeline `compress` in sottomoduli:
//! - `media_optimizer`: Orchestratore principale (selezione, loop, statistiche)
//! - `task_optimizer`: Worker per il singolo file (dispatch, compressione, sostituzione)

pub mod media_optimizer;
pub mod task_optimizer;

pub use media_optimizer::MediaOptimizer;
pub use task_optimizer::{CompressionJob, TaskOptimizer};
