//! Iterative root finders.
//!
//! Both solvers are capped by a [`SolverConfig`]. Running out of iterations
//! is not an error: the last estimate is returned and a `trace` event is
//! emitted.

use crate::{math, MathError, SolverConfig};

/// Solves `f(x) = 0` with the Newton-Raphson method, starting from `seed`.
///
/// Iteration stops once two consecutive estimates are closer than
/// [`newton_tolerance`][SolverConfig::newton_tolerance], or after
/// [`newton_max_iterations`][SolverConfig::newton_max_iterations].
///
/// A vanishing derivative is safe-divided, which ends the iteration at the
/// current estimate.
///
/// # Example
/// ```
/// use patched_conics::{solvers::newton_raphson, SolverConfig};
///
/// let root = newton_raphson(
///     1.0,
///     |x| Ok(x * x - 2.0),
///     |x| Ok(2.0 * x),
///     &SolverConfig::default(),
/// ).unwrap();
///
/// assert!((root - 2f64.sqrt()).abs() < 1e-6);
/// ```
pub fn newton_raphson<F, D>(
    seed: f64,
    mut f: F,
    mut derivative: D,
    config: &SolverConfig,
) -> Result<f64, MathError>
where
    F: FnMut(f64) -> Result<f64, MathError>,
    D: FnMut(f64) -> Result<f64, MathError>,
{
    let mut x0 = seed;

    for _ in 0..config.newton_max_iterations {
        let x1 = x0 - math::safe_div(f(x0)?, derivative(x0)?);

        if (x1 - x0).abs() < config.newton_tolerance {
            return Ok(x1);
        }

        x0 = x1;
    }

    tracing::trace!(
        seed,
        estimate = x0,
        iterations = config.newton_max_iterations,
        "newton-raphson hit its iteration cap"
    );
    Ok(x0)
}

/// Finds where `f` changes sign between `from` and `to` by bisection.
///
/// The bracket is narrowed by keeping whichever half still starts with the
/// sign `f(from)` had. Iteration stops once a midpoint on the far side of the
/// root has `|f|` below
/// [`bisection_tolerance`][SolverConfig::bisection_tolerance], or after
/// [`bisection_max_iterations`][SolverConfig::bisection_max_iterations].
///
/// The returned time is always on the far side of the root from `from`:
/// `f` there has the sign `f(to)` had, even when the iteration cap is hit.
///
/// Callers must seed the bracket with one end on each side of the root.
///
/// # Example
/// ```
/// use patched_conics::{solvers::bisection, SolverConfig};
///
/// // Where does t^2 cross 50?
/// let t = bisection(0.0, 10.0, |t| Ok::<_, ()>(t * t - 50.0), &SolverConfig::default())
///     .unwrap();
///
/// assert!(t * t > 50.0);
/// assert!(t * t - 50.0 < 0.5);
/// ```
pub fn bisection<F, E>(from: f64, to: f64, mut f: F, config: &SolverConfig) -> Result<f64, E>
where
    F: FnMut(f64) -> Result<f64, E>,
{
    let from_is_positive = f(from)? > 0.0;

    // `low` keeps the sign of f(from), `high` is across the root
    let (mut low, mut high) = (from, to);

    for _ in 0..config.bisection_max_iterations {
        let mid = 0.5 * (low + high);
        let value = f(mid)?;

        if (value > 0.0) == from_is_positive {
            low = mid;
        } else {
            high = mid;
            if value.abs() < config.bisection_tolerance {
                return Ok(high);
            }
        }
    }

    tracing::trace!(
        from,
        to,
        estimate = high,
        iterations = config.bisection_max_iterations,
        "bisection hit its iteration cap"
    );
    Ok(high)
}
