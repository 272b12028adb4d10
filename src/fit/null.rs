use crate::error::FitError;
use crate::fit::{Fit, FitTrait, check_shapes};
use crate::float_trait::Float;
use crate::uncertain::UncertainValue;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A fit indicating that no data was fitted over its range
///
/// Produced for ranges a break list skips and for ranges with fewer than two points, so one
/// sparse segment never aborts a whole fit set. Every query answers "no value".
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct NullFit<T>
where
    T: Float,
{
    id: usize,
    range_from: T,
    range_to: T,
}

impl<T> NullFit<T>
where
    T: Float,
{
    pub fn new(id: usize, range_from: T, range_to: T) -> Self {
        Self {
            id,
            range_from,
            range_to,
        }
    }
}

impl<T> FitTrait<T> for NullFit<T>
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
        false
    }

    fn is_in_range(&self, x: T) -> bool {
        x >= self.range_from && x <= self.range_to
    }

    fn find_y_value(&self, _x: T) -> Option<UncertainValue<T>> {
        None
    }

    fn find_x_value(&self, _y: UncertainValue<T>) -> Option<T> {
        None
    }

    fn find_peak_y_value(&self, _is_minimum: bool) -> Option<(T, UncertainValue<T>)> {
        None
    }

    fn calculate_residuals(&self, x: &[T], y: &[T]) -> Result<(Vec<T>, Vec<T>), FitError> {
        check_shapes(x, y)?;
        Ok((vec![], vec![]))
    }

    fn shifted(&self, x_shift: T, _y_shift: T, new_id: Option<usize>) -> Fit<T> {
        Self::new(
            new_id.unwrap_or(self.id),
            self.range_from + x_shift,
            self.range_to + x_shift,
        )
        .into()
    }

    fn plot_points(&self) -> Option<(Vec<T>, Vec<T>)> {
        None
    }
}

impl<T> fmt::Display for NullFit<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "NullFit[{}] covering x in ({}, {}): <no fit>",
            self.id, self.range_from, self.range_to
        )
    }
}
