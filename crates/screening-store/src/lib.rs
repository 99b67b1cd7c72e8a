//! screening-store — Persistence backends for the assessment engine.
//!
//! Two implementations of [`AssessmentStore`](screening_core::traits::AssessmentStore):
//! an in-memory store for tests and demos, and a directory-backed store that
//! reads its catalog from a TOML bank and appends results and events to
//! JSON Lines files.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;
