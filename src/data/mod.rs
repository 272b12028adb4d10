//! The boundary between raw photometry tables and the fitting layer
//!
//! Collaborating readers (AAVSO downloads, XRT products and the like) produce
//! [Observation] rows; a [Lightcurve] filters, day-sorts and columnizes them into the
//! x/y/y_err triple the fitting layer consumes.

mod filter;
mod lightcurve;

pub use filter::{FilterChain, RowFilter};
pub use lightcurve::{Lightcurve, Observation, ValueKind};
