// SYNOID Clipper Modules
// Copyright (c) 2026 Xing_The_Creator | SYNOID

pub mod audio;
pub mod candidates;
pub mod classifier;
pub mod error;
pub mod pipeline;
pub mod scoring;
pub mod selector;
pub mod strategy;
pub mod transcription;

pub use error::ClipError;
pub use pipeline::{clip_report, ClipInfo, MomentFinder};
pub use selector::SelectionResult;
