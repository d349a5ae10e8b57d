// Copyright 2026 the Trellis Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Easing curves and interpolation.
//!
//! An easing function maps elapsed-time percent `t` (0 to 1) to eased
//! progress `p`. [`EaseType`] names the built-in curves; [`Easing`] pairs a
//! curve with its kind so a tween can report which one it uses.
//! [`Interpolate`] is implemented for the value types a tween can animate.

use alloc::rc::Rc;
use core::fmt;

use glam::{Quat, Vec2, Vec3, Vec4};
#[cfg(not(feature = "std"))]
use kurbo::common::FloatFuncs as _;

use crate::color::Color;

/// Exponential ease-in.
#[must_use]
pub fn expo_in(t: f32) -> f32 {
    if t == 0.0 {
        0.0
    } else {
        2.0_f32.powf(10.0 * (t - 1.0))
    }
}

/// Exponential ease-out.
#[must_use]
pub fn expo_out(t: f32) -> f32 {
    if t == 1.0 {
        1.0
    } else {
        1.0 - 2.0_f32.powf(-10.0 * t)
    }
}

/// Exponential ease-in-out.
#[must_use]
pub fn expo_in_out(t: f32) -> f32 {
    if t == 0.0 {
        return 0.0;
    }
    if t == 1.0 {
        return 1.0;
    }
    let t = t * 2.0;
    if t < 1.0 {
        0.5 * 2.0_f32.powf(10.0 * (t - 1.0))
    } else {
        0.5 * (2.0 - 2.0_f32.powf(-10.0 * (t - 1.0)))
    }
}

/// Cubic ease-in for the first half, quadratic ease-out for the second.
#[must_use]
pub fn cube_in_quad_out(t: f32) -> f32 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        -2.0 * t * t + 4.0 * t - 1.0
    }
}

/// Material "standard" curve.
#[must_use]
pub fn material(t: f32) -> f32 {
    cubic_bezier(t, 0.4, 0.0, 0.2, 1.0)
}

/// Material "decelerate" curve, for elements entering the screen.
#[must_use]
pub fn material_enter(t: f32) -> f32 {
    cubic_bezier(t, 0.0, 0.0, 0.2, 1.0)
}

/// Material "accelerate" curve, for elements leaving the screen.
#[must_use]
pub fn material_exit(t: f32) -> f32 {
    cubic_bezier(t, 0.4, 0.0, 1.0, 1.0)
}

/// Evaluates a unit cubic Bézier `(0,0) (x1,y1) (x2,y2) (1,1)` at `x`.
///
/// Solves for the curve parameter with five Newton-Raphson steps starting
/// from `t = x`, then returns the matching `y`.
#[must_use]
pub fn cubic_bezier(x: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> f32 {
    if x == 0.0 {
        return 0.0;
    }
    if x == 1.0 {
        return 1.0;
    }

    let a = 1.0 - 3.0 * x2 + 3.0 * x1;
    let b = 3.0 * x2 - 6.0 * x1;
    let c = 3.0 * x1;

    let e = 1.0 - 3.0 * y2 + 3.0 * y1;
    let f = 3.0 * y2 - 6.0 * y1;
    let g = 3.0 * y1;

    let mut t = x;
    for _ in 0..5 {
        let current_x = a * t * t * t + b * t * t + c * t;
        let slope = 3.0 * a * t * t + 2.0 * b * t + c;
        if slope == 0.0 {
            break;
        }
        t = (t - (current_x - x) / slope).clamp(0.0, 1.0);
    }

    e * t * t * t + f * t * t + g * t
}

/// The built-in easing curves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum EaseType {
    /// `p = t`.
    #[default]
    Linear,
    /// See [`expo_in`].
    ExpoIn,
    /// See [`expo_out`].
    ExpoOut,
    /// See [`expo_in_out`].
    ExpoInOut,
    /// See [`cube_in_quad_out`].
    CubeInQuadOut,
    /// See [`material`].
    Material,
    /// See [`material_enter`].
    MaterialEnter,
    /// See [`material_exit`].
    MaterialExit,
    /// A user-supplied function.
    Custom,
}

impl EaseType {
    /// Every named curve, in declaration order.
    pub const BUILT_IN: [Self; 8] = [
        Self::Linear,
        Self::ExpoIn,
        Self::ExpoOut,
        Self::ExpoInOut,
        Self::CubeInQuadOut,
        Self::Material,
        Self::MaterialEnter,
        Self::MaterialExit,
    ];

    /// Returns the function for this curve. `Custom` maps to linear.
    #[must_use]
    pub fn function(self) -> fn(f32) -> f32 {
        match self {
            Self::ExpoIn => expo_in,
            Self::ExpoOut => expo_out,
            Self::ExpoInOut => expo_in_out,
            Self::CubeInQuadOut => cube_in_quad_out,
            Self::Material => material,
            Self::MaterialEnter => material_enter,
            Self::MaterialExit => material_exit,
            Self::Linear | Self::Custom => linear,
        }
    }
}

fn linear(t: f32) -> f32 {
    t
}

/// An easing curve together with its [`EaseType`].
#[derive(Clone)]
pub struct Easing {
    kind: EaseType,
    func: Rc<dyn Fn(f32) -> f32>,
}

impl Easing {
    /// Wraps a user-supplied curve; its kind reports [`EaseType::Custom`].
    pub fn custom(f: impl Fn(f32) -> f32 + 'static) -> Self {
        Self {
            kind: EaseType::Custom,
            func: Rc::new(f),
        }
    }

    /// Returns the curve's kind.
    #[must_use]
    pub fn kind(&self) -> EaseType {
        self.kind
    }

    /// Evaluates the curve.
    #[must_use]
    pub fn apply(&self, t: f32) -> f32 {
        (self.func)(t)
    }
}

impl From<EaseType> for Easing {
    fn from(kind: EaseType) -> Self {
        Self {
            kind,
            func: Rc::new(kind.function()),
        }
    }
}

impl Default for Easing {
    fn default() -> Self {
        EaseType::Linear.into()
    }
}

impl fmt::Debug for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Easing").field(&self.kind).finish()
    }
}

/// A value that can be blended linearly between two endpoints.
pub trait Interpolate: Clone {
    /// Returns `a` at `t = 0` and `b` at `t = 1`.
    #[must_use]
    fn lerp(a: &Self, b: &Self, t: f32) -> Self;
}

impl Interpolate for f32 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a + (b - a) * t
    }
}

impl Interpolate for f64 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a + (b - a) * f64::from(t)
    }
}

impl Interpolate for Vec2 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a.lerp(*b, t)
    }
}

impl Interpolate for Vec3 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a.lerp(*b, t)
    }
}

impl Interpolate for Vec4 {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a.lerp(*b, t)
    }
}

impl Interpolate for Quat {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a.slerp(*b, t)
    }
}

impl Interpolate for kurbo::Point {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        a.lerp(*b, f64::from(t))
    }
}

impl Interpolate for Color {
    fn lerp(a: &Self, b: &Self, t: f32) -> Self {
        Self::new(
            <f32 as Interpolate>::lerp(&a.r, &b.r, t),
            <f32 as Interpolate>::lerp(&a.g, &b.g, t),
            <f32 as Interpolate>::lerp(&a.b, &b.b, t),
            <f32 as Interpolate>::lerp(&a.a, &b.a, t),
        )
    }
}

/// Eases `pct` and blends from `a` to `b`.
///
/// When `clamp` is set the eased value is clamped to `[0, 1]` before
/// blending, so overshooting curves stay inside the endpoints.
#[must_use]
pub fn interpolate<T: Interpolate>(a: &T, b: &T, pct: f32, easing: &Easing, clamp: bool) -> T {
    let eased = easing.apply(pct);
    let eased = if clamp { eased.clamp(0.0, 1.0) } else { eased };
    T::lerp(a, b, eased)
}
