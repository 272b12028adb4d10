use crate::float_trait::Float;
use crate::uncertain::UncertainValue;

use itertools::izip;

pub(crate) struct StraightLineFitResult<T>
where
    T: Float,
{
    pub slope: UncertainValue<T>,
    pub intercept: UncertainValue<T>,
}

/// Weighted least squares fit of `y = slope * x + intercept`
///
/// Weights are `1 / sigma^2` when y-errors are supplied, unity otherwise. Parameter sigmas
/// come from the diagonal of the normal-equation covariance under the absolute-sigma
/// convention: supplied errors are taken in y units and the covariance is not rescaled by
/// the residual scatter, for unweighted fits this means unit sigma.
///
/// Returns `None` for fewer than two points or a degenerate design (all x equal), callers
/// degrade to a null fit.
pub(crate) fn fit_straight_line<T>(
    x: &[T],
    y: &[T],
    y_err: Option<&[T]>,
) -> Option<StraightLineFitResult<T>>
where
    T: Float,
{
    debug_assert_eq!(x.len(), y.len());
    if x.len() < 2 {
        return None;
    }

    let weights = |i: usize| match y_err {
        Some(err) => err[i].powi(-2),
        None => T::one(),
    };

    let mut s = T::zero();
    let mut sx = T::zero();
    let mut sy = T::zero();
    let mut sxx = T::zero();
    let mut sxy = T::zero();
    for (i, (&xi, &yi)) in izip!(x, y).enumerate() {
        let w = weights(i);
        s += w;
        sx += w * xi;
        sy += w * yi;
        sxx += w * xi * xi;
        sxy += w * xi * yi;
    }

    let delta = s * sxx - sx.powi(2);
    if !delta.is_finite() || delta <= T::zero() {
        return None;
    }

    let slope = (s * sxy - sx * sy) / delta;
    let intercept = (sxx * sy - sx * sxy) / delta;
    Some(StraightLineFitResult {
        slope: UncertainValue::new(slope, (s / delta).sqrt()),
        intercept: UncertainValue::new(intercept, (sxx / delta).sqrt()),
    })
}
