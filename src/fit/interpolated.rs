use crate::error::FitError;
use crate::fit::{Fit, FitTrait, check_shapes};
use crate::float_trait::Float;
use crate::uncertain::UncertainValue;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A placeholder fit bridging the gap between its two neighbouring fits
///
/// Stores the indices of the prior and next fit within the owning
/// [FitSet](crate::FitSet); the set resolves those into a drawn segment when it assembles
/// plot data. Until both neighbours exist the bridge is incomplete and [FitTrait::has_fit]
/// answers false. Value queries always answer "no value", interpolation only contributes to
/// plotting.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct InterpolatedFit<T>
where
    T: Float,
{
    id: usize,
    range_from: T,
    range_to: T,
    prior: Option<usize>,
    next: Option<usize>,
}

impl<T> InterpolatedFit<T>
where
    T: Float,
{
    pub fn new(id: usize, range_from: T, range_to: T, prior: Option<usize>) -> Self {
        Self {
            id,
            range_from,
            range_to,
            prior,
            next: None,
        }
    }

    /// Index of the fit preceding this bridge in its set
    pub fn prior(&self) -> Option<usize> {
        self.prior
    }

    /// Index of the fit following this bridge in its set
    pub fn next(&self) -> Option<usize> {
        self.next
    }

    /// Wired up by the owning set once the following fit has been created
    pub(crate) fn set_next(&mut self, next: usize) {
        self.next = Some(next);
    }
}

impl<T> FitTrait<T> for InterpolatedFit<T>
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
        self.prior.is_some() && self.next.is_some()
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
        // Neighbour indices are positions within the set and survive translation unchanged
        Self {
            id: new_id.unwrap_or(self.id),
            range_from: self.range_from + x_shift,
            range_to: self.range_to + x_shift,
            prior: self.prior,
            next: self.next,
        }
        .into()
    }

    fn plot_points(&self) -> Option<(Vec<T>, Vec<T>)> {
        // Resolved by the owning set, which knows the neighbouring fits
        None
    }
}

impl<T> fmt::Display for InterpolatedFit<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "InterpolatedFit[{}] covering x in ({}, {}): interpolated between neighbouring fits",
            self.id, self.range_from, self.range_to
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_until_both_neighbours_are_wired() {
        let mut fit = InterpolatedFit::new(1, 2.0_f64, 5.0, Some(0));
        assert!(!fit.has_fit());
        fit.set_next(2);
        assert!(fit.has_fit());
        assert_eq!(fit.prior(), Some(0));
        assert_eq!(fit.next(), Some(2));
    }

    #[test]
    fn value_queries_answer_nothing() {
        let mut fit = InterpolatedFit::new(1, 2.0_f64, 5.0, Some(0));
        fit.set_next(2);
        assert!(fit.find_y_value(3.0).is_none());
        assert!(fit.find_x_value(UncertainValue::exact(1.0)).is_none());
        assert!(fit.find_peak_y_value(false).is_none());
        assert!(fit.plot_points().is_none());
    }

    #[test]
    fn shift_keeps_the_neighbour_links() {
        let mut fit = InterpolatedFit::new(1, 2.0_f64, 5.0, Some(0));
        fit.set_next(2);
        let Fit::InterpolatedFit(shifted) = fit.shifted(3.0, -1.0, None) else {
            panic!("expected an interpolated fit");
        };
        assert_eq!(shifted.range_from(), 5.0);
        assert_eq!(shifted.range_to(), 8.0);
        assert_eq!(shifted.prior(), Some(0));
        assert_eq!(shifted.next(), Some(2));
    }
}
