use crate::error::FitError;
use crate::float_trait::Float;
use crate::uncertain::UncertainValue;

use enum_dispatch::enum_dispatch;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

mod interpolated;
mod null;
mod straight_line;
mod straight_line_log_log;
mod straight_line_log_x;

pub use interpolated::InterpolatedFit;
pub use null::NullFit;
pub use straight_line::StraightLineFit;
pub use straight_line_log_log::StraightLineLogLogFit;
pub use straight_line_log_x::StraightLineLogXFit;

/// Queries shared by every fit over one range of a light curve
///
/// `range_from`/`range_to` and all query arguments/results live in the linear, user-facing
/// x domain, whatever internal representation the concrete fit works in.
#[enum_dispatch]
pub trait FitTrait<T>
where
    T: Float,
{
    fn id(&self) -> usize;

    fn range_from(&self) -> T;

    fn range_to(&self) -> T;

    /// Whether this instance represents a valid fit or a null/non fit
    fn has_fit(&self) -> bool;

    fn is_in_range(&self, x: T) -> bool;

    /// The y value the fit predicts at `x`, `None` outside the range or without a fit
    fn find_y_value(&self, x: T) -> Option<UncertainValue<T>>;

    /// The x value matching the nominal of `y`, `None` if it falls outside the range
    ///
    /// No uncertainty is propagated into x, it is a lookup coordinate.
    fn find_x_value(&self, y: UncertainValue<T>) -> Option<T>;

    /// The more extreme of the fit's two endpoint values, with the x where it occurs
    fn find_peak_y_value(&self, is_minimum: bool) -> Option<(T, UncertainValue<T>)>;

    /// Residuals `y - predicted(x)` for the points inside this fit's range
    ///
    /// Nominal parameters only, residuals carry no uncertainty. Mismatched input lengths
    /// are a caller bug and fail fast.
    fn calculate_residuals(&self, x: &[T], y: &[T]) -> Result<(Vec<T>, Vec<T>), FitError>;

    /// An independent copy translated by `x_shift`/`y_shift`, optionally re-labelled
    fn shifted(&self, x_shift: T, y_shift: T, new_id: Option<usize>) -> Fit<T>;

    /// Linear-domain endpoint pair for rendering, `None` when there is nothing to draw
    fn plot_points(&self) -> Option<(Vec<T>, Vec<T>)>;
}

/// All fit variants are available as variants of this enum
#[enum_dispatch(FitTrait<T>)]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
#[non_exhaustive]
pub enum Fit<T>
where
    T: Float,
{
    NullFit(NullFit<T>),
    StraightLineFit(StraightLineFit<T>),
    StraightLineLogXFit(StraightLineLogXFit<T>),
    StraightLineLogLogFit(StraightLineLogLogFit<T>),
    InterpolatedFit(InterpolatedFit<T>),
}

impl<T> fmt::Display for Fit<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Fit::NullFit(fit) => fit.fmt(f),
            Fit::StraightLineFit(fit) => fit.fmt(f),
            Fit::StraightLineLogXFit(fit) => fit.fmt(f),
            Fit::StraightLineLogLogFit(fit) => fit.fmt(f),
            Fit::InterpolatedFit(fit) => fit.fmt(f),
        }
    }
}

/// `y = m x + c` with uncertainty from the parameters, x taken as exact
pub(crate) fn line_y<T>(x: T, slope: UncertainValue<T>, intercept: UncertainValue<T>) -> UncertainValue<T>
where
    T: Float,
{
    slope * x + intercept
}

/// Inverse of the straight line, nominal parameters only: `x = (y - c) / m`
pub(crate) fn line_x<T>(y: T, slope: UncertainValue<T>, intercept: UncertainValue<T>) -> T
where
    T: Float,
{
    (y - intercept.nominal()) / slope.nominal()
}

/// `c = y - m x` for a known point and slope
pub(crate) fn line_intercept<T>(x: T, y: T, slope: UncertainValue<T>) -> UncertainValue<T>
where
    T: Float,
{
    UncertainValue::exact(y) - slope * x
}

pub(crate) fn check_shapes<T>(x: &[T], y: &[T]) -> Result<(), FitError>
where
    T: Float,
{
    if x.len() == y.len() {
        Ok(())
    } else {
        Err(FitError::ShapeMismatch {
            x: x.len(),
            y: y.len(),
        })
    }
}

/// Endpoint comparison shared by the peak searches
pub(crate) fn more_extreme<T>(
    best: Option<(T, UncertainValue<T>)>,
    candidate: (T, UncertainValue<T>),
    is_minimum: bool,
) -> Option<(T, UncertainValue<T>)>
where
    T: Float,
{
    match best {
        Some((_, y))
            if (is_minimum && candidate.1.nominal() < y.nominal())
                || (!is_minimum && candidate.1.nominal() > y.nominal()) =>
        {
            Some(candidate)
        }
        None => Some(candidate),
        keep => keep,
    }
}
