//! A thread-safe weak-value cache: a map from keys to `Arc`'d values that
//! never keeps a value alive by itself.
//!
//! # Features
//! - **Weak values**: the cache holds `Weak<V>` handles, so a value lives
//!   exactly as long as callers outside the cache hold strong references.
//! - **Purge on access**: every public operation first unlinks mappings
//!   whose value has been dropped, so a dead key is observably absent by
//!   the next call.
//! - **Removal notifications**: a customizable [`RemovalListener`] fires
//!   exactly once per removed mapping, with the cause, always outside the
//!   cache's internal lock.
//! - **Two variants**: an unordered cache and an insertion-ordered cache
//!   with deterministic full-eviction order, sharing one contract.
//! - **Observability**: lock-free counters exposed as a [`MetricsSnapshot`].

// Public modules that form the API
pub mod builder;
pub mod cache;
pub mod listener;
pub mod metrics;
pub mod ordered;

// Internal, crate-only modules
mod entry;

// Re-export the primary user-facing types for convenience
pub use builder::WeakCacheBuilder;
pub use cache::WeakValueCache;
pub use listener::{RemovalCause, RemovalListener};
pub use metrics::MetricsSnapshot;
pub use ordered::OrderedWeakValueCache;
