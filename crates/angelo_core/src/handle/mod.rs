//! Opaque, kind-tagged resource handles.
//!
//! # Responsibility
//! - Define the two handle kinds exposed to callers.
//! - Convert handles to and from the raw integer carried across the boundary.
//!
//! # Invariants
//! - Raw value `0` never decodes to a handle.
//! - A raw value decodes only if it is exactly the encoding of some key;
//!   forged values with a non-canonical generation are rejected, not repaired.
//! - Application and window handles share one key space, so two live handles
//!   never carry the same raw value.

use serde::{Deserialize, Serialize};
use slotmap::{Key, KeyData};
use std::fmt::{Display, Formatter};

mod registry;

pub use registry::{HandleRegistry, Registered, Resource};

slotmap::new_key_type! {
    /// Arena slot plus generation. Never handed out directly.
    pub struct ResourceKey;
}

/// The two disjoint resource kinds managed by the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Application,
    Window,
}

impl ResourceKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Application => "application",
            Self::Window => "window",
        }
    }
}

impl Display for ResourceKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common surface of the typed handles.
pub trait TypedHandle: Copy {
    const KIND: ResourceKind;

    fn key(self) -> ResourceKey;
    fn from_key(key: ResourceKey) -> Self;

    /// Raw boundary value. Never `0`.
    fn to_raw(self) -> u64 {
        self.key().data().as_ffi()
    }

    /// Decodes a raw boundary value. Returns `None` for `0` and for values
    /// that are not a canonical key encoding.
    fn from_raw(raw: u64) -> Option<Self> {
        decode_key(raw).map(Self::from_key)
    }
}

/// Handle to a live (or terminated but not yet destroyed) application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ApplicationHandle(ResourceKey);

/// Handle to an open window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(ResourceKey);

impl TypedHandle for ApplicationHandle {
    const KIND: ResourceKind = ResourceKind::Application;

    fn key(self) -> ResourceKey {
        self.0
    }

    fn from_key(key: ResourceKey) -> Self {
        Self(key)
    }
}

impl TypedHandle for WindowHandle {
    const KIND: ResourceKind = ResourceKind::Window;

    fn key(self) -> ResourceKey {
        self.0
    }

    fn from_key(key: ResourceKey) -> Self {
        Self(key)
    }
}

fn decode_key(raw: u64) -> Option<ResourceKey> {
    if raw == 0 {
        return None;
    }
    let data = KeyData::from_ffi(raw);
    // from_ffi forces the generation odd; an even generation is a forgery.
    if data.as_ffi() != raw {
        return None;
    }
    Some(ResourceKey::from(data))
}

#[cfg(test)]
mod tests {
    use super::{ApplicationHandle, TypedHandle, WindowHandle};

    #[test]
    fn zero_never_decodes() {
        assert!(ApplicationHandle::from_raw(0).is_none());
        assert!(WindowHandle::from_raw(0).is_none());
    }

    #[test]
    fn non_canonical_generation_is_rejected() {
        // Generation 2 (even) in the high half, slot 0 in the low half.
        assert!(ApplicationHandle::from_raw(2 << 32).is_none());
        // Generation 0 with a non-zero slot index.
        assert!(WindowHandle::from_raw(7).is_none());
    }

    #[test]
    fn canonical_encoding_decodes() {
        let raw = (1_u64 << 32) | 3;
        let handle = ApplicationHandle::from_raw(raw).expect("canonical key");
        assert_eq!(handle.to_raw(), raw);
    }
}
