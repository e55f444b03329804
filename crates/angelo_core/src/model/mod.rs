//! Lifecycle models for the two registry-managed resources.
//!
//! # Responsibility
//! - Hold per-resource state and enforce legal lifecycle transitions.
//! - Expose serializable read-only snapshots.
//!
//! # Invariants
//! - An application owns every window created against it.
//! - A window keeps only a back-reference (handle) to its owner.

pub mod application;
pub mod window;
