#![doc = include_str!("../README.md")]

mod breaks;
pub use breaks::{Break, FitRange, RangeKind, ranges_from_breaks};

mod data;
pub use data::{FilterChain, Lightcurve, Observation, RowFilter, ValueKind};

mod error;
pub use error::FitError;

mod fit;
pub use fit::{
    Fit, FitTrait, InterpolatedFit, NullFit, StraightLineFit, StraightLineLogLogFit,
    StraightLineLogXFit,
};

mod fit_set;
pub use fit_set::{FitKind, FitSet, PlotSegment};

mod float_trait;
pub use float_trait::Float;

pub mod nova;

mod straight_line_fit;

mod uncertain;
pub use uncertain::UncertainValue;

pub use ndarray;
