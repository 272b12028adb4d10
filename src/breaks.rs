use crate::float_trait::Float;

use conv::prelude::*;
use schemars::JsonSchema;
use schemars::r#gen::SchemaGenerator;
use schemars::schema::Schema;
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// A break-point marker partitioning a time series into fit ranges
///
/// A break list is ordered in ascending x. Numeric entries are cut points, the two symbolic
/// markers instruct what to do with the gap between their numeric neighbours: [Break::Skip]
/// leaves it unfitted, [Break::Interpolate] bridges it with a straight segment between the
/// adjoining fits.
///
/// Serialized the same way the analysis configuration spells breaks: numbers for cuts,
/// `"skip"` (also blank or `"null"`) and `"interp"` (also `"..."`) for the markers.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Break<T>
where
    T: Float,
{
    Numeric(T),
    Skip,
    Interpolate,
}

impl<T> Break<T>
where
    T: Float,
{
    pub fn as_numeric(&self) -> Option<T> {
        match self {
            Self::Numeric(x) => Some(*x),
            _ => None,
        }
    }

    /// Translate a numeric break along x, markers pass through unchanged
    pub fn shifted(&self, x_shift: T) -> Self {
        match self {
            Self::Numeric(x) => Self::Numeric(*x + x_shift),
            other => *other,
        }
    }
}

impl<T> Serialize for Break<T>
where
    T: Float,
{
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            Self::Numeric(x) => serializer.serialize_f64(
                (*x).approx_into()
                    .map_err(|_| serde::ser::Error::custom("break is not representable as f64"))?,
            ),
            Self::Skip => serializer.serialize_str("skip"),
            Self::Interpolate => serializer.serialize_str("interp"),
        }
    }
}

impl<'de, T> Deserialize<'de> for Break<T>
where
    T: Float,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct BreakVisitor<T>(std::marker::PhantomData<T>);

        impl<T> BreakVisitor<T>
        where
            T: Float,
        {
            fn numeric<E>(value: f64) -> Result<Break<T>, E>
            where
                E: de::Error,
            {
                value
                    .approx_into()
                    .map(Break::Numeric)
                    .map_err(|_| E::custom("numeric break out of range"))
            }
        }

        impl<'de, T> Visitor<'de> for BreakVisitor<T>
        where
            T: Float,
        {
            type Value = Break<T>;

            fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
                formatter.write_str("a number, \"skip\"/blank or \"interp\"/\"...\"")
            }

            fn visit_f64<E>(self, value: f64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Self::numeric(value)
            }

            fn visit_i64<E>(self, value: i64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Self::numeric(value as f64)
            }

            fn visit_u64<E>(self, value: u64) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                Self::numeric(value as f64)
            }

            fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
            where
                E: de::Error,
            {
                let token = value.trim().to_lowercase();
                match token.as_str() {
                    "" | "skip" | "null" => Ok(Break::Skip),
                    "..." | "interp" => Ok(Break::Interpolate),
                    _ => Err(E::custom(format!("unknown break instruction {value:?}"))),
                }
            }
        }

        deserializer.deserialize_any(BreakVisitor(std::marker::PhantomData))
    }
}

impl<T> JsonSchema for Break<T>
where
    T: Float,
{
    fn schema_name() -> String {
        "Break".to_owned()
    }

    fn json_schema(generator: &mut SchemaGenerator) -> Schema {
        let mut schema = schemars::schema::SchemaObject::default();
        schema.subschemas().any_of = Some(vec![
            generator.subschema_for::<f64>(),
            generator.subschema_for::<String>(),
        ]);
        Schema::Object(schema)
    }
}

/// What to do with a [FitRange]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum RangeKind {
    /// Fit a model if at least two points are present
    Default,
    /// Leave the range unfitted
    Skip,
    /// Bridge the neighbouring fits with a straight segment
    Interpolate,
}

/// A contiguous x-interval with its fit instruction, `from <= to`
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct FitRange<T>
where
    T: Float,
{
    pub kind: RangeKind,
    pub from: T,
    pub to: T,
}

impl<T> FitRange<T>
where
    T: Float,
{
    fn new(kind: RangeKind, from: T, to: T) -> Self {
        Self { kind, from, to }
    }
}

/// Turn break points into the ordered ranges over which fits are calculated
///
/// `min_x`/`max_x` give the extent of the data. Numeric breaks adjacent in the list bound a
/// [RangeKind::Default] range; a symbolic marker claims the whole gap between its nearest
/// numeric neighbours (or the data extent where it has none). Data before the first or after
/// the last numeric break gets its own leading/trailing Default range, and an empty break
/// list produces a single range covering the full extent.
///
/// The returned ranges are in ascending x order and cover `[min_x, max_x]` without gaps,
/// provided the breaks are ordered and no two markers share a gap.
pub fn ranges_from_breaks<T>(min_x: T, max_x: T, breaks: &[Break<T>]) -> Vec<FitRange<T>>
where
    T: Float,
{
    if breaks.is_empty() {
        return vec![FitRange::new(RangeKind::Default, min_x, max_x)];
    }

    let mut ranges = Vec::with_capacity(breaks.len() + 1);
    for (ix, brk) in breaks.iter().enumerate() {
        match brk {
            Break::Skip => {
                let (from, to) = instruction_range(ix, breaks, min_x, max_x);
                ranges.push(FitRange::new(RangeKind::Skip, from, to));
            }
            Break::Interpolate => {
                let (from, to) = instruction_range(ix, breaks, min_x, max_x);
                ranges.push(FitRange::new(RangeKind::Interpolate, from, to));
            }
            Break::Numeric(brk) => {
                if ix == 0 && min_x < *brk {
                    ranges.push(FitRange::new(RangeKind::Default, min_x, *brk));
                }
                if let Some(next) = breaks.get(ix + 1) {
                    // A marker in between claims the gap instead
                    if let Some(next) = next.as_numeric() {
                        ranges.push(FitRange::new(RangeKind::Default, *brk, next));
                    }
                } else if max_x > *brk {
                    ranges.push(FitRange::new(RangeKind::Default, *brk, max_x));
                }
            }
        }
    }
    ranges
}

/// Resolve the range a symbolic marker claims by scanning to its numeric neighbours
fn instruction_range<T>(ix: usize, breaks: &[Break<T>], min_x: T, max_x: T) -> (T, T)
where
    T: Float,
{
    let mut from = min_x;
    let mut to = max_x;

    if let Some(prior) = breaks[..ix].iter().rev().find_map(Break::as_numeric) {
        from = prior;
        // Safety clamp keeping from <= to when the breaks are badly ordered
        if to < from {
            to = from;
        }
    }

    if let Some(next) = breaks[ix + 1..].iter().find_map(Break::as_numeric) {
        to = next;
        if from > to {
            from = to;
        }
    }

    (from, to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_covers(ranges: &[FitRange<f64>], min_x: f64, max_x: f64) {
        assert!(!ranges.is_empty());
        assert_eq!(ranges[0].from, min_x);
        assert_eq!(ranges.last().unwrap().to, max_x);
        for pair in ranges.windows(2) {
            assert_eq!(
                pair[0].to, pair[1].from,
                "ranges must be contiguous: {pair:?}"
            );
        }
        for range in ranges {
            assert!(range.from <= range.to);
        }
    }

    #[test]
    fn numeric_breaks_partition_the_extent() {
        let breaks = [Break::Numeric(3.0), Break::Numeric(7.0)];
        let ranges = ranges_from_breaks(0.0, 10.0, &breaks);
        assert_eq!(
            ranges,
            vec![
                FitRange::new(RangeKind::Default, 0.0, 3.0),
                FitRange::new(RangeKind::Default, 3.0, 7.0),
                FitRange::new(RangeKind::Default, 7.0, 10.0),
            ]
        );
        assert_covers(&ranges, 0.0, 10.0);
    }

    #[test]
    fn empty_breaks_cover_the_full_extent() {
        let ranges = ranges_from_breaks(0.0, 10.0, &[]);
        assert_eq!(ranges, vec![FitRange::new(RangeKind::Default, 0.0, 10.0)]);
    }

    #[test]
    fn at_least_one_more_range_than_interior_numeric_breaks() {
        for breaks in [
            vec![Break::Numeric(5.0)],
            vec![Break::Numeric(2.0), Break::Numeric(5.0)],
            vec![Break::Numeric(2.0), Break::Numeric(5.0), Break::Numeric(8.0)],
        ] {
            let k = breaks.len();
            let ranges = ranges_from_breaks(0.0, 10.0, &breaks);
            assert_eq!(ranges.len(), k + 1);
            assert_covers(&ranges, 0.0, 10.0);
        }
    }

    #[test]
    fn skip_claims_the_gap_between_numeric_neighbours() {
        let breaks = [Break::Numeric(2.0), Break::Skip, Break::Numeric(6.0)];
        let ranges = ranges_from_breaks(0.0, 10.0, &breaks);
        assert_eq!(
            ranges,
            vec![
                FitRange::new(RangeKind::Default, 0.0, 2.0),
                FitRange::new(RangeKind::Skip, 2.0, 6.0),
                FitRange::new(RangeKind::Default, 6.0, 10.0),
            ]
        );
        assert_covers(&ranges, 0.0, 10.0);
    }

    #[test]
    fn interpolate_claims_the_gap_between_numeric_neighbours() {
        let breaks = [
            Break::Numeric(1.0),
            Break::Numeric(4.0),
            Break::Interpolate,
            Break::Numeric(8.0),
        ];
        let ranges = ranges_from_breaks(0.5, 9.0, &breaks);
        assert_eq!(
            ranges,
            vec![
                FitRange::new(RangeKind::Default, 0.5, 1.0),
                FitRange::new(RangeKind::Default, 1.0, 4.0),
                FitRange::new(RangeKind::Interpolate, 4.0, 8.0),
                FitRange::new(RangeKind::Default, 8.0, 9.0),
            ]
        );
        assert_covers(&ranges, 0.5, 9.0);
    }

    #[test]
    fn leading_marker_extends_to_the_data_minimum() {
        let breaks = [Break::Skip, Break::Numeric(4.0)];
        let ranges = ranges_from_breaks(1.0, 10.0, &breaks);
        assert_eq!(ranges[0], FitRange::new(RangeKind::Skip, 1.0, 4.0));
        assert_covers(&ranges, 1.0, 10.0);
    }

    #[test]
    fn trailing_marker_extends_to_the_data_maximum() {
        let breaks = [Break::Numeric(4.0), Break::Interpolate];
        let ranges = ranges_from_breaks(1.0, 10.0, &breaks);
        assert_eq!(
            ranges.last().unwrap(),
            &FitRange::new(RangeKind::Interpolate, 4.0, 10.0)
        );
        assert_covers(&ranges, 1.0, 10.0);
    }

    #[test]
    fn marker_before_data_extent_clamps_to_zero_width() {
        // The only numeric break lies beyond the data, the backward scan clamps to <= ordering
        let breaks = [Break::Skip, Break::Numeric(0.5)];
        let ranges = ranges_from_breaks(1.0, 10.0, &breaks);
        assert_eq!(ranges[0].from, ranges[0].to);
    }

    #[test]
    fn no_leading_range_when_data_starts_at_the_first_break() {
        let breaks = [Break::Numeric(1.0), Break::Numeric(5.0)];
        let ranges = ranges_from_breaks(1.0, 5.0, &breaks);
        assert_eq!(ranges, vec![FitRange::new(RangeKind::Default, 1.0, 5.0)]);
    }

    #[test]
    fn serde_round_trip_matches_config_shape() {
        let breaks: Vec<Break<f64>> = serde_json::from_str(r#"[0.5, " ", 2.0, "...", 7]"#).unwrap();
        assert_eq!(
            breaks,
            vec![
                Break::Numeric(0.5),
                Break::Skip,
                Break::Numeric(2.0),
                Break::Interpolate,
                Break::Numeric(7.0),
            ]
        );
        let json = serde_json::to_string(&breaks).unwrap();
        let parsed: Vec<Break<f64>> = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, breaks);
    }

    #[test]
    fn unknown_instruction_is_rejected() {
        assert!(serde_json::from_str::<Break<f64>>(r#""wiggle""#).is_err());
    }

    #[test]
    fn shifted_moves_numeric_breaks_only() {
        assert_eq!(
            Break::Numeric(2.0_f64).shifted(3.0),
            Break::Numeric(5.0_f64)
        );
        assert_eq!(Break::<f64>::Skip.shifted(3.0), Break::Skip);
    }
}
