use crate::error::FitError;
use crate::fit::{Fit, FitTrait, NullFit, check_shapes, line_x, line_y, more_extreme};
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
A straight line, weighted least squares fit to a range of data

The model is $y = m x + c$ with $m$ and $c$ carrying the parameter uncertainties from the
covariance diagonal. The stored endpoint pair marks the fitted segment at the range
boundaries and is used for plotting and the peak search, it is not independent data.
";
}

#[doc = DOC!()]
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct StraightLineFit<T>
where
    T: Float,
{
    id: usize,
    range_from: T,
    range_to: T,
    x_endpoints: [T; 2],
    y_endpoints: [T; 2],
    slope: UncertainValue<T>,
    intercept: UncertainValue<T>,
}

impl<T> StraightLineFit<T>
where
    T: Float,
{
    pub const fn doc() -> &'static str {
        DOC
    }

    /// Fit the passed data over the requested range
    ///
    /// Degrades to a [NullFit] when fewer than two points are available or the design is
    /// degenerate, callers check [FitTrait::has_fit] before trusting parameters.
    pub fn fit_to_data(
        id: usize,
        x: &[T],
        y: &[T],
        y_err: Option<&[T]>,
        range_from: T,
        range_to: T,
    ) -> Fit<T> {
        match fit_straight_line(x, y, y_err) {
            Some(result) => {
                let x_endpoints = [range_from, range_to];
                let y_endpoints =
                    x_endpoints.map(|x| line_y(x, result.slope, result.intercept).nominal());
                Self {
                    id,
                    range_from,
                    range_to,
                    x_endpoints,
                    y_endpoints,
                    slope: result.slope,
                    intercept: result.intercept,
                }
                .into()
            }
            None => NullFit::new(id, range_from, range_to).into(),
        }
    }

    /// The slope of the fitted line
    pub fn slope(&self) -> UncertainValue<T> {
        self.slope
    }

    /// The y value of the fitted line at x = 0
    pub fn intercept(&self) -> UncertainValue<T> {
        self.intercept
    }
}

impl<T> FitTrait<T> for StraightLineFit<T>
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
            .then(|| line_y(x, self.slope, self.intercept))
    }

    fn find_x_value(&self, y: UncertainValue<T>) -> Option<T> {
        let x = line_x(y.nominal(), self.slope, self.intercept);
        self.is_in_range(x).then_some(x)
    }

    fn find_peak_y_value(&self, is_minimum: bool) -> Option<(T, UncertainValue<T>)> {
        let mut peak = None;
        for x in self.x_endpoints {
            let y = line_y(x, self.slope, self.intercept);
            peak = more_extreme(peak, (x, y), is_minimum);
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
                    yi - (self.slope.nominal() * xi + self.intercept.nominal()),
                )
            })
            .unzip();
        Ok((res_x, res_y))
    }

    fn shifted(&self, x_shift: T, y_shift: T, new_id: Option<usize>) -> Fit<T> {
        // The slope is unchanged, moving the line right by +dx gives the intercept the value
        // the line previously held at x = -dx, then the y shift raises it directly
        let intercept = line_y(-x_shift, self.slope, self.intercept + y_shift);
        Self {
            id: new_id.unwrap_or(self.id),
            range_from: self.range_from + x_shift,
            range_to: self.range_to + x_shift,
            x_endpoints: self.x_endpoints.map(|x| x + x_shift),
            y_endpoints: self.y_endpoints.map(|y| y + y_shift),
            slope: self.slope,
            intercept,
        }
        .into()
    }

    fn plot_points(&self) -> Option<(Vec<T>, Vec<T>)> {
        Some((self.x_endpoints.to_vec(), self.y_endpoints.to_vec()))
    }
}

impl<T> fmt::Display for StraightLineFit<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "StraightLineFit[{}] covering x in ({}, {}): y = ({}) * x + ({})",
            self.id, self.range_from, self.range_to, self.slope, self.intercept
        )
    }
}
