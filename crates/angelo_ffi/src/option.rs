//! Presence-tagged handle results for the C boundary.
//!
//! # Invariants
//! - `is_some == false` always pairs with `value == 0`, and `0` never
//!   resolves, so a caller that skips the flag check still gets
//!   `InvalidHandle` instead of touching another resource.

use angelo_core::{CoreError, CoreResult, TypedHandle};

/// `struct { uintptr_t value; bool is_some; }`
#[repr(C)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleOpt {
    pub value: usize,
    pub is_some: bool,
}

/// `AppHandle_opt` in `angelo.h`.
pub type AppHandleOpt = HandleOpt;
/// `WindowHandle_opt` in `angelo.h`.
pub type WindowHandleOpt = HandleOpt;

impl HandleOpt {
    pub const NONE: Self = Self {
        value: 0,
        is_some: false,
    };

    pub fn some<H: TypedHandle>(handle: H) -> Self {
        Self {
            value: encode(handle),
            is_some: true,
        }
    }

    /// Flattens an internal result. Errors collapse to `NONE`.
    pub fn from_result<H: TypedHandle>(result: CoreResult<H>) -> Self {
        match result {
            Ok(handle) => Self::some(handle),
            Err(_) => Self::NONE,
        }
    }

    /// Lifts the flat form back into an `Option`.
    pub fn get<H: TypedHandle>(self) -> Option<H> {
        if !self.is_some {
            return None;
        }
        decode(self.value).ok()
    }
}

pub(crate) fn encode<H: TypedHandle>(handle: H) -> usize {
    // Lossless: the crate only builds for 64-bit pointers.
    handle.to_raw() as usize
}

pub(crate) fn decode<H: TypedHandle>(value: usize) -> CoreResult<H> {
    H::from_raw(value as u64).ok_or(CoreError::InvalidHandle { expected: H::KIND })
}
