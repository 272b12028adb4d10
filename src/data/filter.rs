use crate::data::Observation;
use crate::float_trait::Float;

/// One row-level selection criterion applied to [Observation]s
///
/// The typed counterpart of the ad-hoc query strings data sources are usually trimmed
/// with: a chain of these is built once per analysis and every row either passes the whole
/// chain or is dropped.
#[derive(Clone, Debug)]
pub enum RowFilter<T>
where
    T: Float,
{
    /// Keep rows whose day offset falls inside `[from, to]`
    DayRange { from: T, to: T },
    /// Keep rows taken through the named band
    Band(String),
    /// Drop rows reported by any of the listed observers
    ExcludeObservers(Vec<String>),
    /// Drop null, saturated and non-finite rows
    ValidObservations,
    /// Keep rows whose reported error does not exceed the bound, rows without a
    /// reported error pass
    MaxError(T),
    /// An arbitrary row predicate
    Custom(fn(&Observation<T>) -> bool),
}

impl<T> RowFilter<T>
where
    T: Float,
{
    pub fn accepts(&self, row: &Observation<T>) -> bool {
        match self {
            Self::DayRange { from, to } => row.day >= *from && row.day <= *to,
            Self::Band(band) => row.band.as_deref() == Some(band.as_str()),
            Self::ExcludeObservers(observers) => row
                .observer
                .as_deref()
                .is_none_or(|observer| !observers.iter().any(|excluded| excluded == observer)),
            Self::ValidObservations => {
                !row.is_null && !row.is_saturated && row.value.is_finite() && row.day.is_finite()
            }
            Self::MaxError(bound) => row.error.is_none_or(|error| error <= *bound),
            Self::Custom(predicate) => predicate(row),
        }
    }
}

/// An all-must-pass conjunction of [RowFilter]s
#[derive(Clone, Debug, Default)]
pub struct FilterChain<T>
where
    T: Float,
{
    filters: Vec<RowFilter<T>>,
}

impl<T> FilterChain<T>
where
    T: Float,
{
    pub fn new() -> Self {
        Self { filters: vec![] }
    }

    pub fn with(mut self, filter: RowFilter<T>) -> Self {
        self.filters.push(filter);
        self
    }

    pub fn accepts(&self, row: &Observation<T>) -> bool {
        self.filters.iter().all(|filter| filter.accepts(row))
    }
}
