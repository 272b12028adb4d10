use crate::breaks::{Break, RangeKind, ranges_from_breaks};
use crate::error::FitError;
use crate::fit::{
    Fit, FitTrait, InterpolatedFit, NullFit, StraightLineFit, StraightLineLogLogFit,
    StraightLineLogXFit, more_extreme,
};
use crate::float_trait::Float;
use crate::uncertain::UncertainValue;

use itertools::izip;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// The fit model applied to every [RangeKind::Default] range of a set
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum FitKind {
    /// [StraightLineFit], both axes linear
    StraightLine,
    /// [StraightLineLogXFit], magnitudes against log10 time
    StraightLineLogX,
    /// [StraightLineLogLogFit], log10 rates against log10 time
    StraightLineLogLog,
}

impl FitKind {
    /// Construct the matching fit variant over one range of data
    pub fn create_fit<T>(
        self,
        id: usize,
        x: &[T],
        y: &[T],
        y_err: Option<&[T]>,
        range_from: T,
        range_to: T,
    ) -> Fit<T>
    where
        T: Float,
    {
        match self {
            Self::StraightLine => StraightLineFit::fit_to_data(id, x, y, y_err, range_from, range_to),
            Self::StraightLineLogX => {
                StraightLineLogXFit::fit_to_data(id, x, y, y_err, range_from, range_to)
            }
            Self::StraightLineLogLog => {
                StraightLineLogLogFit::fit_to_data(id, x, y, y_err, range_from, range_to)
            }
        }
    }
}

impl fmt::Display for FitKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::StraightLine => "StraightLine",
            Self::StraightLineLogX => "StraightLineLogX",
            Self::StraightLineLogLog => "StraightLineLogLog",
        };
        f.write_str(name)
    }
}

/// One drawable polyline of a fitted set, interpolated bridges already resolved
#[derive(Clone, Debug, PartialEq, Serialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct PlotSegment<T>
where
    T: Float,
{
    pub id: usize,
    pub x: Vec<T>,
    pub y: Vec<T>,
}

/// A piecewise fit of one light curve: an ordered list of [Fit]s, one per break range
///
/// Fitting a sparse or skipped range never fails, it yields a [NullFit] and the remaining
/// ranges still carry values. Queries walk the fits in ascending x order and answer from the
/// first fit able to; a boundary x shared by two ranges resolves to the earlier one.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct FitSet<T>
where
    T: Float,
{
    kind: FitKind,
    fits: Vec<Fit<T>>,
    breaks: Vec<Break<T>>,
}

impl<T> FitSet<T>
where
    T: Float,
{
    /// Partition the data at `breaks` and fit a `kind` model over each default range
    ///
    /// Fit ids are assigned sequentially from `start_id`. `x` need not be sorted, each
    /// range's points are gathered and ordered before fitting. Shape errors are caller bugs
    /// and fail fast; an empty input has no extent to partition and is rejected too.
    pub fn fit_to_data(
        kind: FitKind,
        x: &[T],
        y: &[T],
        y_err: Option<&[T]>,
        breaks: &[Break<T>],
        start_id: usize,
    ) -> Result<Self, FitError> {
        if x.len() != y.len() {
            return Err(FitError::ShapeMismatch {
                x: x.len(),
                y: y.len(),
            });
        }
        if let Some(y_err) = y_err {
            if y_err.len() != y.len() {
                return Err(FitError::MismatchedErrors {
                    y: y.len(),
                    y_err: y_err.len(),
                });
            }
        }
        if x.is_empty() {
            return Err(FitError::EmptyLightcurve);
        }

        let min_x = x.iter().copied().fold(T::infinity(), T::min);
        let max_x = x.iter().copied().fold(T::neg_infinity(), T::max);

        let mut fits: Vec<Fit<T>> = Vec::new();
        for (offset, range) in ranges_from_breaks(min_x, max_x, breaks).iter().enumerate() {
            let id = start_id + offset;
            let fit = match range.kind {
                RangeKind::Skip => NullFit::new(id, range.from, range.to).into(),
                RangeKind::Interpolate => {
                    let prior = fits.len().checked_sub(1);
                    InterpolatedFit::new(id, range.from, range.to, prior).into()
                }
                RangeKind::Default => {
                    let (range_x, range_y, range_err) =
                        gather_range(x, y, y_err, range.from, range.to);
                    if range_x.len() >= 2 {
                        kind.create_fit(
                            id,
                            &range_x,
                            &range_y,
                            range_err.as_deref(),
                            range.from,
                            range.to,
                        )
                    } else {
                        NullFit::new(id, range.from, range.to).into()
                    }
                }
            };
            // A pending bridge learns its following fit as soon as that fit exists
            if !matches!(fit, Fit::InterpolatedFit(_)) {
                let next = fits.len();
                if let Some(Fit::InterpolatedFit(bridge)) = fits.last_mut() {
                    bridge.set_next(next);
                }
            }
            fits.push(fit);
        }

        Ok(Self {
            kind,
            fits,
            breaks: breaks.to_vec(),
        })
    }

    pub fn kind(&self) -> FitKind {
        self.kind
    }

    pub fn fits(&self) -> &[Fit<T>] {
        &self.fits
    }

    pub fn breaks(&self) -> &[Break<T>] {
        &self.breaks
    }

    /// The y value at `x` from the first fit covering it, `None` when none does
    pub fn find_y_value(&self, x: T) -> Option<UncertainValue<T>> {
        self.fits.iter().find_map(|fit| fit.find_y_value(x))
    }

    /// The x value where the set first reaches the nominal of `y`
    pub fn find_x_value(&self, y: UncertainValue<T>) -> Option<T> {
        self.fits.iter().find_map(|fit| fit.find_x_value(y))
    }

    /// The most extreme endpoint value across all fits, with the x where it occurs
    pub fn find_peak_y_value(&self, is_minimum: bool) -> Option<(T, UncertainValue<T>)> {
        let mut peak = None;
        for fit in &self.fits {
            if let Some(candidate) = fit.find_peak_y_value(is_minimum) {
                peak = more_extreme(peak, candidate, is_minimum);
            }
        }
        peak
    }

    /// Residuals of the passed points against the fit covering each of them
    pub fn calculate_residuals(&self, x: &[T], y: &[T]) -> Result<(Vec<T>, Vec<T>), FitError> {
        let mut res_x = Vec::new();
        let mut res_y = Vec::new();
        for fit in &self.fits {
            let (fit_x, fit_y) = fit.calculate_residuals(x, y)?;
            res_x.extend(fit_x);
            res_y.extend(fit_y);
        }
        Ok((res_x, res_y))
    }

    /// An independent copy with every fit and every numeric break translated
    pub fn shifted(&self, x_shift: T, y_shift: T) -> Self {
        Self {
            kind: self.kind,
            fits: self
                .fits
                .iter()
                .map(|fit| fit.shifted(x_shift, y_shift, None))
                .collect(),
            breaks: self
                .breaks
                .iter()
                .map(|brk| brk.shifted(x_shift))
                .collect(),
        }
    }

    /// Drawable polylines for the whole set
    ///
    /// Fits contribute their own plot points; an interpolated bridge becomes the segment
    /// joining its prior fit's value at the bridge start to its next fit's value at the
    /// bridge end. Bridges with an unfittable neighbour have nothing to join and are
    /// omitted, as are null fits.
    pub fn plot_segments(&self) -> Vec<PlotSegment<T>> {
        self.fits
            .iter()
            .filter_map(|fit| {
                let (x, y) = match fit {
                    Fit::InterpolatedFit(bridge) => self.bridge_points(bridge)?,
                    other => other.plot_points()?,
                };
                Some(PlotSegment {
                    id: fit.id(),
                    x,
                    y,
                })
            })
            .collect()
    }

    fn bridge_points(&self, bridge: &InterpolatedFit<T>) -> Option<(Vec<T>, Vec<T>)> {
        let prior = self.fits.get(bridge.prior()?)?;
        let next = self.fits.get(bridge.next()?)?;
        let from_y = prior.find_y_value(bridge.range_from())?;
        let to_y = next.find_y_value(bridge.range_to())?;
        Some((
            vec![bridge.range_from(), bridge.range_to()],
            vec![from_y.nominal(), to_y.nominal()],
        ))
    }
}

/// Points inside `[from, to]`, ordered in ascending x
fn gather_range<T>(
    x: &[T],
    y: &[T],
    y_err: Option<&[T]>,
    from: T,
    to: T,
) -> (Vec<T>, Vec<T>, Option<Vec<T>>)
where
    T: Float,
{
    let mut rows: Vec<(T, T, Option<T>)> = match y_err {
        Some(err) => izip!(x, y, err)
            .filter(|&(&xi, _, _)| xi >= from && xi <= to)
            .map(|(&xi, &yi, &ei)| (xi, yi, Some(ei)))
            .collect(),
        None => izip!(x, y)
            .filter(|&(&xi, _)| xi >= from && xi <= to)
            .map(|(&xi, &yi)| (xi, yi, None))
            .collect(),
    };
    rows.sort_unstable_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let range_x = rows.iter().map(|row| row.0).collect();
    let range_y = rows.iter().map(|row| row.1).collect();
    let range_err = y_err.map(|_| rows.iter().filter_map(|row| row.2).collect());
    (range_x, range_y, range_err)
}

impl<T> fmt::Display for FitSet<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "FitSet of {} {} fit(s):", self.fits.len(), self.kind)?;
        for fit in &self.fits {
            writeln!(f, "  {fit}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    /// Three joined linear segments: up 5 -> 10, down 10 -> 2, up 2 -> 8
    fn three_segment_set() -> FitSet<f64> {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let y = [5.0, 7.5, 10.0, 6.0, 2.0, 5.0, 8.0];
        let breaks = [Break::Numeric(2.0), Break::Numeric(4.0)];
        FitSet::fit_to_data(FitKind::StraightLine, &x, &y, None, &breaks, 0).unwrap()
    }

    #[test]
    fn one_fit_per_range_with_sequential_ids() {
        let set = three_segment_set();
        assert_eq!(set.fits().len(), 3);
        for (ix, fit) in set.fits().iter().enumerate() {
            assert_eq!(fit.id(), ix);
            assert!(fit.has_fit());
        }
    }

    #[test]
    fn global_peak_and_minimum() {
        let set = three_segment_set();
        let (x, y) = set.find_peak_y_value(false).unwrap();
        assert_relative_eq!(x, 2.0, epsilon = 1e-9);
        assert_relative_eq!(y.nominal(), 10.0, epsilon = 1e-9);
        let (x, y) = set.find_peak_y_value(true).unwrap();
        assert_relative_eq!(x, 4.0, epsilon = 1e-9);
        assert_relative_eq!(y.nominal(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn boundary_x_resolves_to_the_earlier_fit() {
        let set = three_segment_set();
        // x = 2 lies on the boundary of the rising and falling segments, both predict 10
        // here but the query must be answered by the earlier fit
        let y = set.find_y_value(2.0).unwrap();
        assert_relative_eq!(y.nominal(), 10.0, epsilon = 1e-9);
        let Fit::StraightLineFit(first) = &set.fits()[0] else {
            panic!("expected a straight line fit");
        };
        assert_relative_eq!(first.slope().nominal(), 2.5, epsilon = 1e-9);
    }

    #[test]
    fn sparse_range_degrades_without_aborting_the_set() {
        let x = [0.0, 1.0, 2.0, 5.0];
        let y = [0.0, 1.0, 2.0, 9.0];
        let breaks = [Break::Numeric(3.0)];
        let set = FitSet::fit_to_data(FitKind::StraightLine, &x, &y, None, &breaks, 0).unwrap();
        assert!(set.fits()[0].has_fit());
        assert!(!set.fits()[1].has_fit());
        assert_relative_eq!(set.find_y_value(1.5).unwrap().nominal(), 1.5, epsilon = 1e-9);
        assert!(set.find_y_value(4.0).is_none());
    }

    #[test]
    fn skip_range_is_a_null_fit() {
        let x = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0];
        let y = [0.0, 1.0, 5.0, -3.0, 4.0, 5.0];
        let breaks = [Break::Numeric(1.0), Break::Skip, Break::Numeric(4.0)];
        let set = FitSet::fit_to_data(FitKind::StraightLine, &x, &y, None, &breaks, 0).unwrap();
        assert_eq!(set.fits().len(), 3);
        assert!(!set.fits()[1].has_fit());
        assert!(set.find_y_value(2.5).is_none());
    }

    #[test]
    fn interpolated_bridge_joins_its_neighbours() {
        let x = [0.0, 1.0, 2.0, 6.0, 7.0, 8.0];
        let y = [0.0, 1.0, 2.0, 12.0, 14.0, 16.0];
        let breaks = [Break::Numeric(2.0), Break::Interpolate, Break::Numeric(6.0)];
        let set = FitSet::fit_to_data(FitKind::StraightLine, &x, &y, None, &breaks, 0).unwrap();
        assert_eq!(set.fits().len(), 3);
        let Fit::InterpolatedFit(bridge) = &set.fits()[1] else {
            panic!("expected an interpolated fit");
        };
        assert!(bridge.has_fit());
        assert_eq!(bridge.prior(), Some(0));
        assert_eq!(bridge.next(), Some(2));

        let segments = set.plot_segments();
        assert_eq!(segments.len(), 3);
        assert_eq!(segments[1].x, vec![2.0, 6.0]);
        assert_relative_eq!(segments[1].y[0], 2.0, epsilon = 1e-9);
        assert_relative_eq!(segments[1].y[1], 12.0, epsilon = 1e-9);
    }

    #[test]
    fn bridge_next_to_a_null_fit_is_not_drawn() {
        let x = [0.0, 1.0, 2.0, 7.0];
        let y = [0.0, 1.0, 2.0, 9.0];
        let breaks = [Break::Numeric(2.0), Break::Interpolate, Break::Numeric(6.0)];
        let set = FitSet::fit_to_data(FitKind::StraightLine, &x, &y, None, &breaks, 0).unwrap();
        // The trailing range holds a single point, so the bridge has no right-hand value
        assert!(!set.fits()[2].has_fit());
        let segments = set.plot_segments();
        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].id, 0);
    }

    #[test]
    fn shape_errors_fail_fast() {
        assert_eq!(
            FitSet::<f64>::fit_to_data(FitKind::StraightLine, &[1.0; 3], &[1.0; 2], None, &[], 0),
            Err(FitError::ShapeMismatch { x: 3, y: 2 })
        );
        assert_eq!(
            FitSet::<f64>::fit_to_data(
                FitKind::StraightLine,
                &[1.0; 3],
                &[1.0; 3],
                Some(&[0.1; 2]),
                &[],
                0
            ),
            Err(FitError::MismatchedErrors { y: 3, y_err: 2 })
        );
        assert_eq!(
            FitSet::<f64>::fit_to_data(FitKind::StraightLine, &[], &[], None, &[], 0),
            Err(FitError::EmptyLightcurve)
        );
    }

    #[test]
    fn unsorted_input_is_gathered_and_ordered_per_range() {
        let x = [5.0, 0.0, 3.0, 1.0, 4.0, 2.0];
        let y: Vec<_> = x.iter().map(|&x| 2.0 * x + 1.0).collect();
        let set = FitSet::fit_to_data(FitKind::StraightLine, &x, &y, None, &[], 0).unwrap();
        assert_relative_eq!(set.find_y_value(2.5).unwrap().nominal(), 6.0, epsilon = 1e-9);
    }

    #[test]
    fn shifted_translates_fits_and_breaks() {
        let set = three_segment_set();
        let shifted = set.shifted(10.0, -1.0);
        assert_eq!(shifted.breaks()[0], Break::Numeric(12.0));
        let y0 = set.find_y_value(1.0).unwrap();
        let y1 = shifted.find_y_value(11.0).unwrap();
        assert_relative_eq!(y1.nominal(), y0.nominal() - 1.0, epsilon = 1e-9);
    }

    #[test]
    fn residuals_concatenate_across_fits() {
        let set = three_segment_set();
        let x = [1.0, 3.0, 5.0];
        let y = [8.0, 6.5, 5.5];
        let (res_x, res_y) = set.calculate_residuals(&x, &y).unwrap();
        assert_eq!(res_x.len(), res_y.len());
        assert!(res_x.contains(&1.0) && res_x.contains(&3.0) && res_x.contains(&5.0));
        // x = 1 predicts 7.5 on the first segment
        let ix = res_x.iter().position(|&x| x == 1.0).unwrap();
        assert_relative_eq!(res_y[ix], 0.5, epsilon = 1e-9);
    }

    #[test]
    fn serde_round_trip() {
        let set = three_segment_set();
        let json = serde_json::to_string(&set).unwrap();
        let parsed: FitSet<f64> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, set);
    }
}
