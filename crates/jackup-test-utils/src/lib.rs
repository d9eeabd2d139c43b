//! Shared test utilities for the jackup workspace.
//!
//! This crate provides standardised test fixtures to eliminate duplication
//! across crate test suites. It is a dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`profiles`]: [`TestProfiles`], a temporary config directory with
//!   profiles whose task endpoints exist on disk
//! - [`backend`]: [`RecordingBackend`], a scripted stand-in for rsync

pub mod backend;
pub mod profiles;

pub use backend::{Invocation, RecordingBackend};
pub use profiles::TestProfiles;
