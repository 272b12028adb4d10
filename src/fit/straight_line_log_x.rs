use crate::error::FitError;
use crate::fit::{Fit, FitTrait, NullFit, check_shapes, line_intercept, line_x, line_y, more_extreme};
use crate::float_trait::Float;
use crate::straight_line_fit::fit_straight_line;
use crate::uncertain::UncertainValue;

use itertools::izip;
use macro_const::macro_const;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

macro_const! {
    const DOC: &str = r"
A straight line, weighted least squares fit with the x values on a log10 scale

The slope is defined and managed in the $y$ vs $\log_{10} x$ domain while the public range
and every query stay in the linear x domain: x arguments are transformed to log10 on entry
and x results back to linear on exit. For magnitudes against log time the slope restates as
a flux power law $F \propto t^\alpha$ with $\alpha = -m / 2.5$.
";
}

#[doc = DOC!()]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct StraightLineLogXFit<T>
where
    T: Float,
{
    id: usize,
    range_from: T,
    range_to: T,
    /// log10 of the public range boundaries, the domain the parameters live in
    log_x_endpoints: [T; 2],
    y_endpoints: [T; 2],
    slope: UncertainValue<T>,
    intercept: UncertainValue<T>,
}

impl<T> StraightLineLogXFit<T>
where
    T: Float,
{
    pub const fn doc() -> &'static str {
        DOC
    }

    /// Fit `y = m log10(x) + c` to the passed data over the requested linear range
    pub fn fit_to_data(
        id: usize,
        x: &[T],
        y: &[T],
        y_err: Option<&[T]>,
        range_from: T,
        range_to: T,
    ) -> Fit<T> {
        let log_x: Vec<_> = x.iter().map(|&x| x.log10()).collect();
        match fit_straight_line(&log_x, y, y_err) {
            Some(result) => {
                let log_x_endpoints = [range_from.log10(), range_to.log10()];
                let y_endpoints =
                    log_x_endpoints.map(|lx| line_y(lx, result.slope, result.intercept).nominal());
                Self {
                    id,
                    range_from,
                    range_to,
                    log_x_endpoints,
                    y_endpoints,
                    slope: result.slope,
                    intercept: result.intercept,
                }
                .into()
            }
            None => NullFit::new(id, range_from, range_to).into(),
        }
    }

    pub fn slope(&self) -> UncertainValue<T> {
        self.slope
    }

    pub fn intercept(&self) -> UncertainValue<T> {
        self.intercept
    }

    /// Restate the slope as a flux power-law index, assuming y values are magnitudes
    pub fn power_law_index(&self) -> UncertainValue<T> {
        self.slope / -(T::two() + T::half())
    }

    /// Un-log, shift, re-log data encoded as log10 values
    pub(crate) fn shift_on_log10_values(log_value: T, shift: T) -> T {
        (T::ten().powf(log_value) + shift).log10()
    }
}

impl<T> FitTrait<T> for StraightLineLogXFit<T>
where
    T: Float,
{
    fn id(&self) -> usize {
        self.id
    }

    fn range_from(&self) -> T {
        self.range_from
    }

    fn range_to(&self) -> T {
        self.range_to
    }

    fn has_fit(&self) -> bool {
        true
    }

    fn is_in_range(&self, x: T) -> bool {
        x >= self.range_from && x <= self.range_to
    }

    fn find_y_value(&self, x: T) -> Option<UncertainValue<T>> {
        self.is_in_range(x)
            .then(|| line_y(x.log10(), self.slope, self.intercept))
    }

    fn find_x_value(&self, y: UncertainValue<T>) -> Option<T> {
        let log_x = line_x(y.nominal(), self.slope, self.intercept);
        let x = T::ten().powf(log_x);
        self.is_in_range(x).then_some(x)
    }

    fn find_peak_y_value(&self, is_minimum: bool) -> Option<(T, UncertainValue<T>)> {
        let mut peak = None;
        for log_x in self.log_x_endpoints {
            let y = line_y(log_x, self.slope, self.intercept);
            peak = more_extreme(peak, (T::ten().powf(log_x), y), is_minimum);
        }
        peak
    }

    fn calculate_residuals(&self, x: &[T], y: &[T]) -> Result<(Vec<T>, Vec<T>), FitError> {
        check_shapes(x, y)?;
        let (res_x, res_y) = izip!(x, y)
            .filter(|&(&xi, _)| self.is_in_range(xi))
            .map(|(&xi, &yi)| {
                (
                    xi,
                    yi - (self.slope.nominal() * xi.log10() + self.intercept.nominal()),
                )
            })
            .unzip();
        Ok((res_x, res_y))
    }

    fn shifted(&self, x_shift: T, y_shift: T, new_id: Option<usize>) -> Fit<T> {
        // Shifting is not linear in the stored log10(x) representation: un-log, shift and
        // re-log the endpoints, then recompute the parameters from the shifted points. The
        // slope keeps its fitted uncertainty.
        let log_x_endpoints = self
            .log_x_endpoints
            .map(|lx| Self::shift_on_log10_values(lx, x_shift));
        let y_endpoints = self.y_endpoints.map(|y| y + y_shift);
        let slope = UncertainValue::new(
            (y_endpoints[1] - y_endpoints[0]) / (log_x_endpoints[1] - log_x_endpoints[0]),
            self.slope.sigma(),
        );
        let intercept = line_intercept(log_x_endpoints[0], y_endpoints[0], slope);
        Self {
            id: new_id.unwrap_or(self.id),
            range_from: self.range_from + x_shift,
            range_to: self.range_to + x_shift,
            log_x_endpoints,
            y_endpoints,
            slope,
            intercept,
        }
        .into()
    }

    fn plot_points(&self) -> Option<(Vec<T>, Vec<T>)> {
        Some((
            self.log_x_endpoints
                .iter()
                .map(|&lx| T::ten().powf(lx))
                .collect(),
            self.y_endpoints.to_vec(),
        ))
    }
}

impl<T> fmt::Display for StraightLineLogXFit<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StraightLineLogXFit[{}] covering x in ({}, {}): y = ({}) * log10(x) + ({}), \
             power law F \u{221d} t^\u{3b1} with \u{3b1} = {}",
            self.id,
            self.range_from,
            self.range_to,
            self.slope,
            self.intercept,
            self.power_law_index()
        )
    }
}
