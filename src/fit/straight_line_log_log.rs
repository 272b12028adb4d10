use crate::error::FitError;
use crate::fit::{Fit, FitTrait, NullFit, StraightLineLogXFit, check_shapes, line_intercept, line_x, line_y, more_extreme};
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
A straight line, weighted least squares fit with both axes on a log10 scale

Used for count rates against time where the decline follows a power law: the model is
$\log_{10} y = m \log_{10} x + c$, so the slope is directly the power-law index
$y \propto x^m$. The public range and the x/y of every query stay in the linear domain,
except residuals which are differences of $\log_{10} y$ and are reported as such.
";
}

#[doc = DOC!()]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct StraightLineLogLogFit<T>
where
    T: Float,
{
    id: usize,
    range_from: T,
    range_to: T,
    log_x_endpoints: [T; 2],
    log_y_endpoints: [T; 2],
    slope: UncertainValue<T>,
    intercept: UncertainValue<T>,
}

impl<T> StraightLineLogLogFit<T>
where
    T: Float,
{
    pub const fn doc() -> &'static str {
        DOC
    }

    /// Fit `log10(y) = m log10(x) + c` over the requested linear range
    ///
    /// Supplied y-errors are transformed to the log domain as `dy / (y ln 10)`.
    pub fn fit_to_data(
        id: usize,
        x: &[T],
        y: &[T],
        y_err: Option<&[T]>,
        range_from: T,
        range_to: T,
    ) -> Fit<T> {
        let log_x: Vec<_> = x.iter().map(|&x| x.log10()).collect();
        let log_y: Vec<_> = y.iter().map(|&y| y.log10()).collect();
        let log_y_err: Option<Vec<_>> = y_err.map(|err| {
            izip!(err, y)
                .map(|(&e, &y)| e / (y * T::LN_10()))
                .collect()
        });
        match fit_straight_line(&log_x, &log_y, log_y_err.as_deref()) {
            Some(result) => {
                let log_x_endpoints = [range_from.log10(), range_to.log10()];
                let log_y_endpoints =
                    log_x_endpoints.map(|lx| line_y(lx, result.slope, result.intercept).nominal());
                Self {
                    id,
                    range_from,
                    range_to,
                    log_x_endpoints,
                    log_y_endpoints,
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

    /// In the log-log domain the slope is the power-law index itself, `y ∝ x^m`
    pub fn power_law_index(&self) -> UncertainValue<T> {
        self.slope
    }

    /// `10^v` with the uncertainty of `v` propagated through the exponentiation
    fn unlog(value: UncertainValue<T>) -> UncertainValue<T> {
        UncertainValue::exact(T::ten()).powf(value)
    }
}

impl<T> FitTrait<T> for StraightLineLogLogFit<T>
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
            .then(|| Self::unlog(line_y(x.log10(), self.slope, self.intercept)))
    }

    fn find_x_value(&self, y: UncertainValue<T>) -> Option<T> {
        let log_x = line_x(y.nominal().log10(), self.slope, self.intercept);
        let x = T::ten().powf(log_x);
        self.is_in_range(x).then_some(x)
    }

    fn find_peak_y_value(&self, is_minimum: bool) -> Option<(T, UncertainValue<T>)> {
        let mut peak = None;
        for log_x in self.log_x_endpoints {
            // Monotonic un-log keeps the comparison valid in either domain
            let y = Self::unlog(line_y(log_x, self.slope, self.intercept));
            peak = more_extreme(peak, (T::ten().powf(log_x), y), is_minimum);
        }
        peak
    }

    /// Residuals are `log10(y) - predicted log10(y)`, suitable for a linear axis marked up
    /// as log(y)
    fn calculate_residuals(&self, x: &[T], y: &[T]) -> Result<(Vec<T>, Vec<T>), FitError> {
        check_shapes(x, y)?;
        let (res_x, res_y) = izip!(x, y)
            .filter(|&(&xi, _)| self.is_in_range(xi))
            .map(|(&xi, &yi)| {
                (
                    xi,
                    yi.log10() - (self.slope.nominal() * xi.log10() + self.intercept.nominal()),
                )
            })
            .unzip();
        Ok((res_x, res_y))
    }

    fn shifted(&self, x_shift: T, y_shift: T, new_id: Option<usize>) -> Fit<T> {
        // Both axes are stored as log10 values, so both shifts take the
        // un-log/shift/re-log path before the parameters are recomputed
        let log_x_endpoints = self
            .log_x_endpoints
            .map(|lx| StraightLineLogXFit::shift_on_log10_values(lx, x_shift));
        let log_y_endpoints = self
            .log_y_endpoints
            .map(|ly| StraightLineLogXFit::shift_on_log10_values(ly, y_shift));
        let slope = UncertainValue::new(
            (log_y_endpoints[1] - log_y_endpoints[0]) / (log_x_endpoints[1] - log_x_endpoints[0]),
            self.slope.sigma(),
        );
        let intercept = line_intercept(log_x_endpoints[0], log_y_endpoints[0], slope);
        Self {
            id: new_id.unwrap_or(self.id),
            range_from: self.range_from + x_shift,
            range_to: self.range_to + x_shift,
            log_x_endpoints,
            log_y_endpoints,
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
            self.log_y_endpoints
                .iter()
                .map(|&ly| T::ten().powf(ly))
                .collect(),
        ))
    }
}

impl<T> fmt::Display for StraightLineLogLogFit<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StraightLineLogLogFit[{}] covering x in ({}, {}): log10(y) = ({}) * log10(x) + ({}), \
             power law y \u{221d} x^\u{3b1} with \u{3b1} = {}",
            self.id,
            self.range_from,
            self.range_to,
            self.slope,
            self.intercept,
            self.power_law_index()
        )
    }
}
