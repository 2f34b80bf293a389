//! Zero-shot commit classification.
//!
//! Ranks each commit against the fixed category labels and the
//! `Severity 1`..`Severity 5` labels through a pluggable
//! [`ZeroShotClassifier`](ranking::ZeroShotClassifier): a Hugging Face
//! inference endpoint or an OpenAI-compatible chat model.

pub mod backend;
pub mod completion;
pub mod huggingface;
pub mod labeler;
pub mod llm;
pub mod output;
pub mod ranking;
