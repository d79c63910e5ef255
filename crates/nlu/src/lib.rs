//! Text understanding for the call-flow engine
//!
//! Deterministic, pattern-based classification:
//! - A priority-ordered intent ladder (first match wins, no score blending)
//! - An independent entity extraction pass over the same utterance
//!
//! No model inference anywhere; behavior is reproducible by construction.

pub mod entities;
pub mod intent;

pub use entities::extract_entities;
pub use intent::{is_explicit_opt_out, IntentDetector};
