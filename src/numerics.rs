//! Numerical helpers: interpolation, grids, root finding.
//!
//! Pure functions on slices; nothing here allocates more than its result.

use crate::error::{GroundhogError, Result};

/// Default absolute tolerance for [`brentq`].
pub const XTOL: f64 = 2e-12;
/// Default relative tolerance for [`brentq`].
pub const RTOL: f64 = 4.0 * f64::EPSILON;
/// Default iteration cap for [`brentq`].
pub const MAXITER: usize = 100;

/// Piecewise-linear interpolation of `x` on the table (`xp`, `fp`).
///
/// `xp` must be increasing. Outside the table the end values are returned.
/// An empty table or a NaN `x` yields NaN.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> f64 {
    let n = xp.len().min(fp.len());
    if n == 0 || x.is_nan() {
        return f64::NAN;
    }
    if x <= xp[0] {
        return fp[0];
    }
    if x >= xp[n - 1] {
        return fp[n - 1];
    }
    let upper = xp[..n].partition_point(|&v| v <= x);
    let lower = upper - 1;
    let (x0, x1) = (xp[lower], xp[upper]);
    let (f0, f1) = (fp[lower], fp[upper]);
    if x1 == x0 {
        return f1;
    }
    f0 + (f1 - f0) * (x - x0) / (x1 - x0)
}

/// `n` evenly spaced values from `start` to `stop`, both included.
pub fn linspace(start: f64, stop: f64, n: usize) -> Vec<f64> {
    match n {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (n - 1) as f64;
            (0..n).map(|i| start + step * i as f64).collect()
        }
    }
}

/// Values from `start` up to but excluding `stop` with the given step.
pub fn arange(start: f64, stop: f64, step: f64) -> Vec<f64> {
    if step <= 0.0 || stop <= start {
        return Vec::new();
    }
    let n = ((stop - start) / step).ceil() as usize;
    (0..n).map(|i| start + step * i as f64).collect()
}

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

/// Find a root of `f` in `[a, b]` with Brent's method.
///
/// `f(a)` and `f(b)` must differ in sign; a zero at either end is returned
/// directly.
pub fn brentq<F>(f: F, a: f64, b: f64) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    brentq_with(f, a, b, XTOL, RTOL, MAXITER)
}

pub fn brentq_with<F>(f: F, a: f64, b: f64, xtol: f64, rtol: f64, maxiter: usize) -> Result<f64>
where
    F: Fn(f64) -> f64,
{
    let mut xpre = a;
    let mut xcur = b;
    let mut fpre = f(xpre);
    let mut fcur = f(xcur);

    if fpre.is_nan() || fcur.is_nan() || fpre * fcur > 0.0 {
        return Err(GroundhogError::RootNotBracketed { a, b });
    }
    if fpre == 0.0 {
        return Ok(xpre);
    }
    if fcur == 0.0 {
        return Ok(xcur);
    }

    let mut xblk = 0.0;
    let mut fblk = 0.0;
    let mut spre = 0.0;
    let mut scur = 0.0;

    for _ in 0..maxiter {
        if fpre != 0.0 && fcur != 0.0 && fpre.is_sign_negative() != fcur.is_sign_negative() {
            xblk = xpre;
            fblk = fpre;
            spre = xcur - xpre;
            scur = spre;
        }
        if fblk.abs() < fcur.abs() {
            xpre = xcur;
            xcur = xblk;
            xblk = xpre;

            fpre = fcur;
            fcur = fblk;
            fblk = fpre;
        }

        let delta = (xtol + rtol * xcur.abs()) / 2.0;
        let sbis = (xblk - xcur) / 2.0;
        if fcur == 0.0 || sbis.abs() < delta {
            return Ok(xcur);
        }

        if spre.abs() > delta && fcur.abs() < fpre.abs() {
            let stry = if xpre == xblk {
                // secant
                -fcur * (xcur - xpre) / (fcur - fpre)
            } else {
                // inverse quadratic
                let dpre = (fpre - fcur) / (xpre - xcur);
                let dblk = (fblk - fcur) / (xblk - xcur);
                -fcur * (fblk * dblk - fpre * dpre) / (dblk * dpre * (fblk - fpre))
            };
            if 2.0 * stry.abs() < spre.abs().min(3.0 * sbis.abs() - delta) {
                spre = scur;
                scur = stry;
            } else {
                spre = sbis;
                scur = sbis;
            }
        } else {
            spre = sbis;
            scur = sbis;
        }

        xpre = xcur;
        fpre = fcur;
        if scur.abs() > delta {
            xcur += scur;
        } else {
            xcur += if sbis > 0.0 { delta } else { -delta };
        }
        fcur = f(xcur);
    }

    Err(GroundhogError::NoConvergence(maxiter))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64, tol: f64) {
        assert!(
            (actual - expected).abs() <= tol,
            "expected {} but got {}",
            expected,
            actual
        );
    }

    #[test]
    fn test_interp_inside_table() {
        let xp = [0.0, 1.0, 3.0];
        let fp = [0.0, 10.0, 30.0];
        assert_close(interp(0.5, &xp, &fp), 5.0, 1e-12);
        assert_close(interp(2.0, &xp, &fp), 20.0, 1e-12);
        assert_close(interp(1.0, &xp, &fp), 10.0, 1e-12);
    }

    #[test]
    fn test_interp_clamps_outside_table() {
        let xp = [1.0, 2.0];
        let fp = [5.0, 7.0];
        assert_eq!(interp(-3.0, &xp, &fp), 5.0);
        assert_eq!(interp(10.0, &xp, &fp), 7.0);
    }

    #[test]
    fn test_interp_degenerate_inputs() {
        assert!(interp(1.0, &[], &[]).is_nan());
        assert!(interp(f64::NAN, &[0.0, 1.0], &[0.0, 1.0]).is_nan());
        // Two-point table with equal abscissae uses the upper value
        assert_eq!(interp(0.5, &[0.0, 0.0, 1.0], &[1.0, 2.0, 3.0]), 2.5);
    }

    #[test]
    fn test_linspace() {
        let values = linspace(0.0, 1.0, 5);
        assert_eq!(values.len(), 5);
        assert_close(values[1], 0.25, 1e-12);
        assert_close(values[4], 1.0, 1e-12);
        assert_eq!(linspace(3.0, 4.0, 1), vec![3.0]);
        assert!(linspace(3.0, 4.0, 0).is_empty());
    }

    #[test]
    fn test_arange_excludes_stop() {
        let values = arange(0.0, 1.0, 0.2);
        assert_eq!(values.len(), 5);
        assert_close(values[4], 0.8, 1e-12);

        let values = arange(0.0, 1.1, 0.2);
        assert_eq!(values.len(), 6);
        assert_close(values[5], 1.0, 1e-12);
    }

    #[test]
    fn test_arange_empty_cases() {
        assert!(arange(1.0, 1.0, 0.2).is_empty());
        assert!(arange(2.0, 1.0, 0.2).is_empty());
        assert!(arange(0.0, 1.0, 0.0).is_empty());
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[1.0, 2.0, 6.0]), Some(3.0));
    }

    #[test]
    fn test_brentq_polynomial() {
        let root = brentq(|x| x * x - 2.0, 0.0, 2.0).unwrap();
        assert_close(root, 2f64.sqrt(), 1e-10);
    }

    #[test]
    fn test_brentq_transcendental() {
        let root = brentq(|x| x.cos() - x, 0.0, 1.0).unwrap();
        assert_close(root, 0.739_085_133_215_160_6, 1e-10);
    }

    #[test]
    fn test_brentq_root_at_endpoint() {
        assert_eq!(brentq(|x| x, 0.0, 1.0).unwrap(), 0.0);
        assert_eq!(brentq(|x| x - 1.0, 0.0, 1.0).unwrap(), 1.0);
    }

    #[test]
    fn test_brentq_not_bracketed() {
        let err = brentq(|x| x * x + 1.0, -1.0, 1.0).unwrap_err();
        assert!(matches!(err, GroundhogError::RootNotBracketed { .. }));
    }

    #[test]
    fn test_brentq_nan_is_not_bracketed() {
        assert!(brentq(|_| f64::NAN, 0.0, 1.0).is_err());
    }
}
