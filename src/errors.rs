//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`KilnError`] covers programmer-misuse failures the
//! engine refuses to absorb:
//! - Unbalanced stack operations on buckets and enforced render states
//! - Use of a render context that was never registered
//! - Invalid queue or state configuration
//!
//! Expected runtime anomalies (a missing steady-state name, a duplicate
//! registration) are *not* errors; they are logged and absorbed at the call
//! site so a single bad frame input cannot take the application down.
//!
//! # Usage
//!
//! Fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, KilnError>`.

use thiserror::Error;

use crate::queue::BucketKind;
use crate::renderer::ContextId;

/// The main error type for the kiln engine.
#[derive(Error, Debug)]
pub enum KilnError {
    /// `pop_enforced_states` was called without a matching push.
    #[error("enforced state stack underflow: pop without matching push")]
    EnforcedStackUnderflow,

    /// `pop_bucket` was called without a matching push.
    #[error("bucket stack underflow: pop without matching push")]
    BucketStackUnderflow,

    /// A render context id was used before being registered.
    #[error("unknown render context: {0:?}")]
    UnknownContext(ContextId),

    /// A spatial was enqueued into a bucket kind that cannot hold items.
    #[error("bucket kind {0:?} cannot be queued directly")]
    UnqueueableBucket(BucketKind),

    /// A configuration value was rejected at the call site.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Alias for `Result<T, KilnError>`.
pub type Result<T> = std::result::Result<T, KilnError>;
