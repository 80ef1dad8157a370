pub mod config;
pub mod diagnostics;
pub mod engine;
pub mod error;
pub mod hidden;
pub mod message;
pub mod models;
pub mod proofs;
pub mod tracker;
pub mod wire;

pub use config::ViewConfig;
pub use error::CoreError;
pub use message::{clamp_attachment_preview_size, ui_message_to_message};
pub use proofs::{overall_status, OverallStatus, ProofCheck};
pub use tracker::{reduce, TrackerEvent, TrackerState};
