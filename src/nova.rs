//! Derived nova quantities computed from a fitted light curve
//!
//! Everything here is a pure function over [FitSet] queries and [UncertainValue]
//! arithmetic: decline times, maximum-magnitude-rate-of-decline luminosities, reddening
//! and the distance ladder they feed.

use crate::fit_set::FitSet;
use crate::float_trait::Float;
use crate::uncertain::UncertainValue;

use conv::prelude::*;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Ratio of total to selective extinction, `A_V = R_V * E(B-V)`, diffuse-ISM value
const R_V: f32 = 3.1;

/// Pan-STARRS `E(g-r) = 0.98 E(B-V)` (Schlafly & Finkbeiner 2011)
const E_GR_PER_E_BV: f32 = 0.98;

/// The peak of a nova eruption and the times to decline 2 and 3 magnitudes from it
///
/// `tp` is the day of peak brightness; `t2`/`t3` are measured from `tp` and are `None`
/// when the fitted curve never reaches the corresponding magnitude.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct DeclineTimes<T>
where
    T: Float,
{
    pub tp: T,
    pub peak: UncertainValue<T>,
    pub t2: Option<T>,
    pub t3: Option<T>,
}

/// Peak and decline times of a fitted magnitude curve
///
/// The peak of a magnitude curve is its numeric minimum. `None` when no range of the set
/// holds a valid fit.
pub fn decline_times<T>(set: &FitSet<T>) -> Option<DeclineTimes<T>>
where
    T: Float,
{
    let (tp, peak) = set.find_peak_y_value(true)?;
    let t2 = set.find_x_value(peak + T::two()).map(|t| t - tp);
    let t3 = set.find_x_value(peak + T::three()).map(|t| t - tp);
    Some(DeclineTimes { tp, peak, t2, t3 })
}

/// A maximum-magnitude-rate-of-decline calibration, `M = c0 + c1 ln t`
///
/// The TDA pairs carry the calibration scatter on their coefficients, the fast-nova pairs
/// (Downes & Duerbeck 2000) are quoted without.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub enum MmrdRelation {
    TdaT2,
    TdaT3,
    FastNovaT2,
    FastNovaT3,
}

impl MmrdRelation {
    fn coefficients<T>(self) -> (UncertainValue<T>, UncertainValue<T>)
    where
        T: Float,
    {
        let uncertain = |nominal: f32, sigma: f32| {
            UncertainValue::new(
                nominal.value_into().unwrap(),
                sigma.value_into().unwrap(),
            )
        };
        match self {
            Self::TdaT2 => (uncertain(-11.32, 0.44), uncertain(2.55, 0.32)),
            Self::TdaT3 => (uncertain(-11.99, 0.56), uncertain(2.54, 0.35)),
            Self::FastNovaT2 => (uncertain(-10.79, 0.0), uncertain(1.53, 0.0)),
            Self::FastNovaT3 => (uncertain(-11.26, 0.0), uncertain(1.58, 0.0)),
        }
    }

    /// Absolute magnitude at peak predicted from a decline time in days
    pub fn absolute_magnitude<T>(self, t: UncertainValue<T>) -> UncertainValue<T>
    where
        T: Float,
    {
        let (c0, c1) = self.coefficients();
        c0 + c1 * t.ln()
    }
}

/// Distance modulus `mu = m - M` from apparent and absolute peak magnitudes
pub fn distance_modulus<T>(
    apparent: UncertainValue<T>,
    absolute: UncertainValue<T>,
) -> UncertainValue<T>
where
    T: Float,
{
    apparent - absolute
}

/// Extinction-corrected distance in parsec, `d = 10^(0.2 (mu + 5 - A_V))`
pub fn distance_pc<T>(mu: UncertainValue<T>, a_v: UncertainValue<T>) -> UncertainValue<T>
where
    T: Float,
{
    let five: T = 5.0_f32.value_into().unwrap();
    let fifth: T = 0.2_f64.approx_into().unwrap();
    UncertainValue::exact(T::ten()).powf((mu + five - a_v) * fifth)
}

/// Visual extinction from a colour excess, `A_V = R_V E(B-V)`
pub fn extinction<T>(e_b_v: UncertainValue<T>) -> UncertainValue<T>
where
    T: Float,
{
    let r_v: T = R_V.value_into().unwrap();
    e_b_v * r_v
}

/// Colour excess from an observed and an intrinsic colour
pub fn color_excess<T>(
    observed: UncertainValue<T>,
    intrinsic: UncertainValue<T>,
) -> UncertainValue<T>
where
    T: Float,
{
    observed - intrinsic
}

/// `E(B-V)` recovered from a Pan-STARRS `E(g-r)` dust-map value
pub fn color_excess_from_e_gr<T>(e_gr: UncertainValue<T>) -> UncertainValue<T>
where
    T: Float,
{
    let scale: T = E_GR_PER_E_BV.value_into().unwrap();
    e_gr / scale
}

/// Intrinsic `(B-V)` of a nova at peak, `0.23 ± 0.16` (van den Bergh & Younger 1987)
pub fn intrinsic_b_v_at_peak<T>() -> UncertainValue<T>
where
    T: Float,
{
    UncertainValue::new(0.23_f32.value_into().unwrap(), 0.16_f32.value_into().unwrap())
}

/// Intrinsic `(B-V)` of a nova at t2, `-0.02 ± 0.12` (van den Bergh & Younger 1987)
pub fn intrinsic_b_v_at_t2<T>() -> UncertainValue<T>
where
    T: Float,
{
    UncertainValue::new(
        (-0.02_f32).value_into().unwrap(),
        0.12_f32.value_into().unwrap(),
    )
}
