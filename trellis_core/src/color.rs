// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Linear RGBA color.

use core::ops::Mul;

/// An RGBA color with `f32` channels, nominally in `[0, 1]`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red.
    pub r: f32,
    /// Green.
    pub g: f32,
    /// Blue.
    pub b: f32,
    /// Alpha.
    pub a: f32,
}

impl Color {
    /// Opaque white; the identity for [`Mul`].
    pub const WHITE: Self = Self::new(1.0, 1.0, 1.0, 1.0);
    /// Opaque black.
    pub const BLACK: Self = Self::new(0.0, 0.0, 0.0, 1.0);
    /// Fully transparent black.
    pub const TRANSPARENT: Self = Self::new(0.0, 0.0, 0.0, 0.0);

    /// Creates a color from its channels.
    #[must_use]
    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates an opaque grey with every color channel set to `v`.
    #[must_use]
    pub const fn grey(v: f32) -> Self {
        Self::new(v, v, v, 1.0)
    }

    /// Returns the same color with a different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::new(self.r, self.g, self.b, a)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

impl Mul for Color {
    type Output = Self;

    /// Channel-wise product, used to stack tints.
    fn mul(self, rhs: Self) -> Self {
        Self::new(
            self.r * rhs.r,
            self.g * rhs.g,
            self.b * rhs.b,
            self.a * rhs.a,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn white_is_multiplicative_identity() {
        let c = Color::new(0.2, 0.4, 0.6, 0.8);
        assert_eq!(c * Color::WHITE, c);
        assert_eq!(Color::default(), Color::WHITE);
    }

    #[test]
    fn tints_compose_channel_wise() {
        let half = Color::grey(0.5).with_alpha(0.5);
        let c = half * half;
        assert_eq!(c, Color::new(0.25, 0.25, 0.25, 0.25));
    }
}
