//! screening-core — Assessment engine, traits, and scoring.
//!
//! This crate defines the data model, the store and notifier traits, and the
//! pure pieces the engine composes: stratified selection, scoring, the
//! reapply lock and anti-cheat recording. The concrete store and notifier
//! backends live in `screening-store` and `screening-providers`.

pub mod anticheat;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod model;
pub mod parser;
pub mod policy;
pub mod scoring;
pub mod selector;
pub mod traits;
