use crate::breaks::Break;
use crate::data::FilterChain;
use crate::error::FitError;
use crate::fit_set::{FitKind, FitSet};
use crate::float_trait::Float;

use ndarray::{Array1, ArrayView1};
use ndarray_stats::QuantileExt;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One photometric measurement as a data source reports it
///
/// `day` is the offset from the eruption epoch and is (re)derived from `jd` when rows are
/// loaded into a [Lightcurve]. Flagged rows (`is_null` for unreported values,
/// `is_saturated` for detector saturation) are carried through so a
/// [RowFilter::ValidObservations](crate::RowFilter::ValidObservations) can drop them.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct Observation<T>
where
    T: Float,
{
    pub jd: T,
    pub day: T,
    pub value: T,
    pub error: Option<T>,
    pub band: Option<String>,
    pub observer: Option<String>,
    #[serde(default)]
    pub is_null: bool,
    #[serde(default)]
    pub is_saturated: bool,
}

/// What the y column of a light curve measures
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum ValueKind {
    /// Magnitudes, brighter is numerically smaller
    Magnitude,
    /// Count rates, brighter is numerically larger
    Rate,
}

impl ValueKind {
    /// Whether the curve's brightest point is its numeric minimum
    pub fn peak_is_minimum(self) -> bool {
        matches!(self, Self::Magnitude)
    }
}

/// A named, day-sorted light curve ready for piecewise fitting
///
/// Columns are `ndarray` arrays; either every surviving row carried a reported error
/// (errors stored) or per-row errors are dropped entirely, mixing the two would bias the
/// fit weights.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct Lightcurve<T>
where
    T: Float,
{
    name: String,
    kind: ValueKind,
    label: Option<String>,
    color: Option<String>,
    #[schemars(with = "Vec<T>")]
    days: Array1<T>,
    #[schemars(with = "Vec<T>")]
    values: Array1<T>,
    #[schemars(with = "Option<Vec<T>>")]
    errors: Option<Array1<T>>,
}

impl<T> Lightcurve<T>
where
    T: Float,
{
    /// Filter, day-sort and columnize raw rows
    ///
    /// `day` is rederived as `jd - eruption_jd` before the filters run, so
    /// [RowFilter::DayRange](crate::RowFilter::DayRange) sees eruption-relative offsets.
    pub fn from_observations(
        name: impl Into<String>,
        kind: ValueKind,
        eruption_jd: T,
        observations: impl IntoIterator<Item = Observation<T>>,
        filters: &FilterChain<T>,
    ) -> Self {
        let mut rows: Vec<Observation<T>> = observations
            .into_iter()
            .map(|mut row| {
                row.day = row.jd - eruption_jd;
                row
            })
            .filter(|row| filters.accepts(row))
            .collect();
        rows.sort_unstable_by(|a, b| {
            a.day
                .partial_cmp(&b.day)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        let days = rows.iter().map(|row| row.day).collect();
        let values = rows.iter().map(|row| row.value).collect();
        let errors = if !rows.is_empty() && rows.iter().all(|row| row.error.is_some()) {
            Some(rows.iter().filter_map(|row| row.error).collect())
        } else {
            None
        };

        Self {
            name: name.into(),
            kind,
            label: None,
            color: None,
            days: Array1::from_vec(days),
            values: Array1::from_vec(values),
            errors: errors.map(Array1::from_vec),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    pub fn days(&self) -> ArrayView1<'_, T> {
        self.days.view()
    }

    pub fn values(&self) -> ArrayView1<'_, T> {
        self.values.view()
    }

    pub fn errors(&self) -> Option<ArrayView1<'_, T>> {
        self.errors.as_ref().map(Array1::view)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// The `[min, max]` day span of the curve, `None` when it holds no rows
    pub fn day_extent(&self) -> Option<(T, T)> {
        let min = self.days.min().ok().copied()?;
        let max = self.days.max().ok().copied()?;
        Some((min, max))
    }

    /// The x/y/y_err columns restricted to `[from, to]`, the shape the fitting layer eats
    pub fn points_in_range(&self, from: T, to: T) -> (Vec<T>, Vec<T>, Option<Vec<T>>) {
        let keep: Vec<usize> = self
            .days
            .iter()
            .enumerate()
            .filter(|&(_, &day)| day >= from && day <= to)
            .map(|(ix, _)| ix)
            .collect();
        let days = keep.iter().map(|&ix| self.days[ix]).collect();
        let values = keep.iter().map(|&ix| self.values[ix]).collect();
        let errors = self
            .errors
            .as_ref()
            .map(|errors| keep.iter().map(|&ix| errors[ix]).collect());
        (days, values, errors)
    }

    /// Piecewise-fit this curve at the passed break points
    pub fn fit(
        &self,
        kind: FitKind,
        breaks: &[Break<T>],
        start_id: usize,
    ) -> Result<FitSet<T>, FitError> {
        // Arrays built from vecs are contiguous, the slice views cannot fail
        FitSet::fit_to_data(
            kind,
            self.days.as_slice().unwrap_or(&[]),
            self.values.as_slice().unwrap_or(&[]),
            self.errors.as_ref().and_then(|errors| errors.as_slice()),
            breaks,
            start_id,
        )
    }
}

impl<T> fmt::Display for Lightcurve<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Lightcurve {:?} ({:?}) with {} observation(s)",
            self.name,
            self.kind,
            self.len()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::data::RowFilter;
    use approx::assert_relative_eq;
    use light_curve_common::all_close;

    const ERUPTION_JD: f64 = 2_458_723.0;

    fn observation(day: f64, value: f64, band: &str) -> Observation<f64> {
        Observation {
            jd: ERUPTION_JD + day,
            day: 0.0,
            value,
            error: Some(0.05),
            band: Some(band.to_owned()),
            observer: Some("ABC".to_owned()),
            is_null: false,
            is_saturated: false,
        }
    }

    #[test]
    fn rows_are_day_derived_sorted_and_columnized() {
        let rows = vec![
            observation(3.0, 7.0, "V"),
            observation(1.0, 6.0, "V"),
            observation(2.0, 6.5, "V"),
        ];
        let lc = Lightcurve::from_observations(
            "V band",
            ValueKind::Magnitude,
            ERUPTION_JD,
            rows,
            &FilterChain::new(),
        );
        all_close(lc.days().as_slice().unwrap(), &[1.0, 2.0, 3.0], 1e-12);
        all_close(lc.values().as_slice().unwrap(), &[6.0, 6.5, 7.0], 1e-12);
        assert!(lc.errors().is_some());
        assert_eq!(lc.day_extent(), Some((1.0, 3.0)));
    }

    #[test]
    fn filters_run_against_derived_days() {
        let rows = vec![
            observation(1.0, 6.0, "V"),
            observation(5.0, 7.0, "V"),
            observation(9.0, 8.0, "B"),
        ];
        let chain = FilterChain::new()
            .with(RowFilter::Band("V".to_owned()))
            .with(RowFilter::DayRange { from: 0.0, to: 4.0 });
        let lc =
            Lightcurve::from_observations("V band", ValueKind::Magnitude, ERUPTION_JD, rows, &chain);
        assert_eq!(lc.len(), 1);
        assert_relative_eq!(lc.days()[0], 1.0);
    }

    #[test]
    fn partial_errors_drop_the_error_column() {
        let mut rows = vec![observation(1.0, 6.0, "V"), observation(2.0, 7.0, "V")];
        rows[1].error = None;
        let lc = Lightcurve::from_observations(
            "V band",
            ValueKind::Magnitude,
            ERUPTION_JD,
            rows,
            &FilterChain::new(),
        );
        assert!(lc.errors().is_none());
    }

    #[test]
    fn points_in_range_restricts_all_columns() {
        let rows = vec![
            observation(1.0, 6.0, "V"),
            observation(2.0, 6.5, "V"),
            observation(3.0, 7.0, "V"),
        ];
        let lc = Lightcurve::from_observations(
            "V band",
            ValueKind::Magnitude,
            ERUPTION_JD,
            rows,
            &FilterChain::new(),
        );
        let (days, values, errors) = lc.points_in_range(1.5, 3.0);
        assert_eq!(days, vec![2.0, 3.0]);
        assert_eq!(values, vec![6.5, 7.0]);
        assert_eq!(errors.unwrap().len(), 2);
    }

    #[test]
    fn fit_runs_the_piecewise_engine() {
        let rows: Vec<_> = (0..10)
            .map(|ix| observation(ix as f64, 6.0 + 0.5 * ix as f64, "V"))
            .collect();
        let lc = Lightcurve::from_observations(
            "V band",
            ValueKind::Magnitude,
            ERUPTION_JD,
            rows,
            &FilterChain::new(),
        );
        let set = lc.fit(FitKind::StraightLine, &[], 0).unwrap();
        assert_relative_eq!(set.find_y_value(4.0).unwrap().nominal(), 8.0, epsilon = 1e-9);
    }

    #[test]
    fn empty_curve_cannot_be_fitted() {
        let lc = Lightcurve::<f64>::from_observations(
            "empty",
            ValueKind::Rate,
            ERUPTION_JD,
            vec![],
            &FilterChain::new(),
        );
        assert!(lc.is_empty());
        assert!(lc.day_extent().is_none());
        assert_eq!(
            lc.fit(FitKind::StraightLineLogLog, &[], 0),
            Err(FitError::EmptyLightcurve)
        );
    }

    #[test]
    fn magnitude_peaks_are_minima() {
        assert!(ValueKind::Magnitude.peak_is_minimum());
        assert!(!ValueKind::Rate.peak_is_minimum());
    }
}
