//! Guarded scalar math.
//!
//! Every function here validates that its argument is finite and that its
//! result is finite, raising a [`MathError`] otherwise. The bounded-domain
//! inverse functions ([`asin`], [`acos`], [`atanh`]) clamp their argument into
//! `[-1, 1]` first and log the adjustment.
//!
//! The `safe_div` helper is the one place where a non-finite result is
//! *replaced* rather than reported: dividing by exactly zero yields zero.

use core::f64::consts::{PI, TAU};

use crate::MathError;

#[inline]
fn check_input(function: &'static str, input: f64) -> Result<f64, MathError> {
    if input.is_finite() {
        Ok(input)
    } else {
        Err(MathError::NonFiniteInput { function, input })
    }
}

#[inline]
fn check_result(function: &'static str, input: f64, result: f64) -> Result<f64, MathError> {
    if result.is_finite() {
        Ok(result)
    } else {
        Err(MathError::NonFiniteResult { function, input })
    }
}

macro_rules! guarded {
    ( $( $fname:ident $( : $arity:tt )? ),* $(,)? ) => {
        $(
            guarded!(@make fn $fname $( : $arity )?);
        )*
    };

    (@make fn $fname:ident) => {
        #[doc = concat!("Guarded `f64::", stringify!($fname), "`.")]
        #[inline]
        pub fn $fname(x: f64) -> Result<f64, MathError> {
            let x = check_input(stringify!($fname), x)?;
            check_result(stringify!($fname), x, x.$fname())
        }
    };

    (@make fn $fname:ident : 2) => {
        #[doc = concat!("Guarded `f64::", stringify!($fname), "`.")]
        #[inline]
        pub fn $fname(x: f64, y: f64) -> Result<f64, MathError> {
            let x = check_input(stringify!($fname), x)?;
            let y = check_input(stringify!($fname), y)?;
            check_result(stringify!($fname), x, x.$fname(y))
        }
    };
}

guarded!(
    sin,
    cos,
    tan,
    atan,
    sinh,
    cosh,
    tanh,
    acosh,
    asinh,
    sqrt,
    atan2: 2,
    powf: 2,
);

/// Clamps `x` into `[-1, 1]`, logging when an adjustment was needed.
fn clamp_unit(function: &'static str, x: f64) -> Result<f64, MathError> {
    let x = check_input(function, x)?;
    if (-1.0..=1.0).contains(&x) {
        return Ok(x);
    }

    let clamped = x.clamp(-1.0, 1.0);
    tracing::debug!(function, input = x, clamped, "argument clamped into [-1, 1]");
    Ok(clamped)
}

/// Guarded `f64::asin`. Out-of-range arguments are clamped into `[-1, 1]`.
pub fn asin(x: f64) -> Result<f64, MathError> {
    let x = clamp_unit("asin", x)?;
    check_result("asin", x, x.asin())
}

/// Guarded `f64::acos`. Out-of-range arguments are clamped into `[-1, 1]`.
pub fn acos(x: f64) -> Result<f64, MathError> {
    let x = clamp_unit("acos", x)?;
    check_result("acos", x, x.acos())
}

/// Guarded `f64::atanh`. Out-of-range arguments are clamped into `[-1, 1]`.
///
/// `atanh(±1)` is infinite, so a clamped argument still faults with
/// [`MathError::NonFiniteResult`].
pub fn atanh(x: f64) -> Result<f64, MathError> {
    let x = clamp_unit("atanh", x)?;
    check_result("atanh", x, x.atanh())
}

/// Guarded integer power.
#[inline]
pub fn powi(x: f64, n: i32) -> Result<f64, MathError> {
    let x = check_input("powi", x)?;
    check_result("powi", x, x.powi(n))
}

/// Divides `numerator` by `denominator`, returning zero instead of an
/// infinity or NaN when the denominator is exactly zero.
///
/// # Example
/// ```
/// use patched_conics::math::safe_div;
///
/// assert_eq!(safe_div(3.0, 2.0), 1.5);
/// assert_eq!(safe_div(3.0, 0.0), 0.0);
/// assert_eq!(safe_div(-3.0, -0.0), 0.0);
/// ```
#[inline]
pub fn safe_div(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

/// Normalizes an angle into `[0, 2π)`.
///
/// # Example
/// ```
/// use patched_conics::math::normalize_angle;
/// use std::f64::consts::{PI, TAU};
///
/// assert_eq!(normalize_angle(-PI), PI);
/// assert_eq!(normalize_angle(TAU), 0.0);
/// ```
#[inline]
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(TAU);
    // rem_euclid can round up to exactly TAU for tiny negative inputs
    if wrapped >= TAU {
        0.0
    } else {
        wrapped
    }
}

/// Wraps an angle into `(-π, π]`.
#[inline]
pub fn wrap_angle(angle: f64) -> f64 {
    let normalized = normalize_angle(angle);
    if normalized > PI {
        normalized - TAU
    } else {
        normalized
    }
}
