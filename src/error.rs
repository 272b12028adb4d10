/// Error returned from the fitting layer
///
/// Sparse data never produces an error: a range with fewer than two points degrades to a
/// [crate::NullFit]. These variants all indicate caller bugs and are surfaced fail-fast.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FitError {
    #[error("x has {x} element(s) while y has {y}, equal lengths are required")]
    ShapeMismatch { x: usize, y: usize },

    #[error("y has {y} element(s) while y_err has {y_err}, equal lengths are required")]
    MismatchedErrors { y: usize, y_err: usize },

    #[error("the light curve contains no observations")]
    EmptyLightcurve,
}
