// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! User-supplied one-shot callbacks with explicit fault reporting.
//!
//! Tween completion handlers and timeouts run arbitrary application code.
//! A [`Callback`] returns `Result<(), CallbackFault>`; the caller that owns
//! the callback logs a fault and discards the callback so it cannot fault
//! again. Faults never propagate past the owning timer or tween.

use alloc::boxed::Box;
use alloc::string::String;
use core::fmt;

/// An error reported by a user callback.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CallbackFault {
    message: String,
}

impl CallbackFault {
    /// Creates a fault with a description.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    /// Returns the description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CallbackFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl core::error::Error for CallbackFault {}

/// A boxed, repeatable callback that may report a fault.
pub struct Callback {
    f: Box<dyn FnMut() -> Result<(), CallbackFault>>,
}

impl fmt::Debug for Callback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Callback").finish_non_exhaustive()
    }
}

impl Callback {
    /// Wraps an infallible closure.
    pub fn new(mut f: impl FnMut() + 'static) -> Self {
        Self {
            f: Box::new(move || {
                f();
                Ok(())
            }),
        }
    }

    /// Wraps a closure that may fail.
    pub fn fallible(f: impl FnMut() -> Result<(), CallbackFault> + 'static) -> Self {
        Self { f: Box::new(f) }
    }

    /// Runs the callback.
    pub fn invoke(&mut self) -> Result<(), CallbackFault> {
        (self.f)()
    }
}

impl<F: FnMut() + 'static> From<F> for Callback {
    fn from(f: F) -> Self {
        Self::new(f)
    }
}
