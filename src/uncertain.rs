use crate::float_trait::Float;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// A nominal value paired with its standard uncertainty
///
/// Arithmetic propagates errors with the usual first-order formulas for uncorrelated
/// uncertainties. Every operation returns a new value, `sigma` is never negative.
///
/// Two quirks are kept on purpose, matching the analysis this crate reproduces:
/// division by a zero nominal value yields `+inf` rather than an error, and domain
/// violations in [UncertainValue::powf]/[UncertainValue::log10] (zero base with an uncertain
/// exponent, non-positive argument) propagate NaN instead of panicking.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(bound = "T: Float")]
pub struct UncertainValue<T>
where
    T: Float,
{
    nominal: T,
    sigma: T,
}

impl<T> UncertainValue<T>
where
    T: Float,
{
    pub fn new(nominal: T, sigma: T) -> Self {
        Self {
            nominal,
            sigma: sigma.abs(),
        }
    }

    /// A value with zero uncertainty
    pub fn exact(nominal: T) -> Self {
        Self {
            nominal,
            sigma: T::zero(),
        }
    }

    #[inline]
    pub fn nominal(&self) -> T {
        self.nominal
    }

    #[inline]
    pub fn sigma(&self) -> T {
        self.sigma
    }

    /// `z = x^y` with `dz^2 = (y z dx/x)^2 + (dy z ln|x|)^2`
    pub fn powf(self, exp: Self) -> Self {
        let z = self.nominal.powf(exp.nominal);
        let dz_dx = if self.sigma.is_zero() {
            T::zero()
        } else {
            exp.nominal * z * (self.sigma / self.nominal)
        };
        let dz_dy = if exp.sigma.is_zero() {
            T::zero()
        } else {
            exp.sigma * z * self.nominal.abs().ln()
        };
        Self::new(z, quadrature(dz_dx, dz_dy))
    }

    /// `z = log10(x)` with `dz = dx / (x ln 10)`
    pub fn log10(self) -> Self {
        let z = self.nominal.log10();
        let dz = if self.nominal.is_zero() || self.sigma.is_zero() {
            T::zero()
        } else {
            self.sigma / (self.nominal * T::LN_10())
        };
        Self::new(z, dz)
    }

    /// `z = ln(x)` with `dz = dx / x`
    pub fn ln(self) -> Self {
        let z = self.nominal.ln();
        let dz = if self.nominal.is_zero() || self.sigma.is_zero() {
            T::zero()
        } else {
            self.sigma / self.nominal
        };
        Self::new(z, dz)
    }
}

#[inline]
fn quadrature<T>(a: T, b: T) -> T
where
    T: Float,
{
    (a.powi(2) + b.powi(2)).sqrt()
}

/// Relative error term, zero when either the value or its sigma is zero
#[inline]
fn relative<T>(value: T, sigma: T) -> T
where
    T: Float,
{
    if value.is_zero() || sigma.is_zero() {
        T::zero()
    } else {
        sigma / value
    }
}

impl<T> Add for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self::new(self.nominal + rhs.nominal, quadrature(self.sigma, rhs.sigma))
    }
}

impl<T> Sub for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Self::new(self.nominal - rhs.nominal, quadrature(self.sigma, rhs.sigma))
    }
}

impl<T> Mul for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        let z = self.nominal * rhs.nominal;
        let dz = quadrature(
            relative(self.nominal, self.sigma),
            relative(rhs.nominal, rhs.sigma),
        ) * z;
        Self::new(z, dz)
    }
}

impl<T> Div for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn div(self, rhs: Self) -> Self {
        if rhs.nominal.is_zero() {
            // Kept from the source analysis: division by zero is +inf, not an error
            return Self::new(T::infinity(), T::infinity());
        }
        let z = self.nominal / rhs.nominal;
        let dz = quadrature(
            relative(self.nominal, self.sigma),
            relative(rhs.nominal, rhs.sigma),
        ) * z;
        Self::new(z, dz)
    }
}

impl<T> Neg for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn neg(self) -> Self {
        Self::new(-self.nominal, self.sigma)
    }
}

impl<T> Add<T> for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn add(self, rhs: T) -> Self {
        Self::new(self.nominal + rhs, self.sigma)
    }
}

impl<T> Sub<T> for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn sub(self, rhs: T) -> Self {
        Self::new(self.nominal - rhs, self.sigma)
    }
}

impl<T> Mul<T> for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn mul(self, rhs: T) -> Self {
        Self::new(self.nominal * rhs, self.sigma * rhs.abs())
    }
}

impl<T> Div<T> for UncertainValue<T>
where
    T: Float,
{
    type Output = Self;

    fn div(self, rhs: T) -> Self {
        if rhs.is_zero() {
            return Self::new(T::infinity(), T::infinity());
        }
        Self::new(self.nominal / rhs, self.sigma / rhs.abs())
    }
}

impl<T> From<T> for UncertainValue<T>
where
    T: Float,
{
    fn from(nominal: T) -> Self {
        Self::exact(nominal)
    }
}

impl<T> fmt::Display for UncertainValue<T>
where
    T: Float,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} \u{b1} {}", self.nominal, self.sigma)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn add_sub_quadrature() {
        let a = UncertainValue::new(10.0_f64, 0.3);
        let b = UncertainValue::new(4.0, 0.4);
        let sum = a + b;
        assert_relative_eq!(sum.nominal(), 14.0);
        assert_relative_eq!(sum.sigma(), 0.5);
        let diff = a - b;
        assert_relative_eq!(diff.nominal(), 6.0);
        assert_relative_eq!(diff.sigma(), 0.5);
    }

    #[test]
    fn mul_div_relative_errors() {
        let a = UncertainValue::new(6.0_f64, 0.6);
        let b = UncertainValue::new(2.0, 0.1);
        let prod = a * b;
        assert_relative_eq!(prod.nominal(), 12.0);
        // 12 * sqrt(0.1^2 + 0.05^2)
        assert_relative_eq!(prod.sigma(), 1.3416407864998738, epsilon = 1e-12);
        let quot = a / b;
        assert_relative_eq!(quot.nominal(), 3.0);
        assert_relative_eq!(quot.sigma(), 0.33541019662496846, epsilon = 1e-12);
    }

    #[test]
    fn zero_terms_do_not_contribute() {
        let a = UncertainValue::new(0.0_f64, 0.5);
        let b = UncertainValue::new(3.0, 0.0);
        let prod = a * b;
        assert_relative_eq!(prod.nominal(), 0.0);
        assert_relative_eq!(prod.sigma(), 0.0);
    }

    #[test]
    fn division_by_zero_is_infinite() {
        let a = UncertainValue::new(1.0_f64, 0.1);
        let quot = a / UncertainValue::exact(0.0);
        assert!(quot.nominal().is_infinite() && quot.nominal() > 0.0);
        assert!(quot.sigma().is_infinite());
    }

    #[test]
    fn powf_matches_hand_calculation() {
        let x = UncertainValue::new(2.0_f64, 0.1);
        let z = x.powf(UncertainValue::exact(3.0));
        assert_relative_eq!(z.nominal(), 8.0);
        // y z dx / x = 3 * 8 * 0.1 / 2
        assert_relative_eq!(z.sigma(), 1.2, epsilon = 1e-12);
    }

    #[test]
    fn powf_zero_base_with_uncertain_exponent_is_nan() {
        let z = UncertainValue::exact(0.0_f64).powf(UncertainValue::new(2.0, 0.5));
        assert!(z.sigma().is_nan());
    }

    #[test]
    fn log10_error_term() {
        let x = UncertainValue::new(100.0_f64, 1.0);
        let z = x.log10();
        assert_relative_eq!(z.nominal(), 2.0);
        assert_relative_eq!(z.sigma(), 1.0 / (100.0 * std::f64::consts::LN_10));
    }

    #[test]
    fn log10_of_negative_is_nan() {
        let z = UncertainValue::new(-1.0_f64, 0.1).log10();
        assert!(z.nominal().is_nan());
    }

    #[test]
    fn sigma_is_never_negative() {
        let v = UncertainValue::new(1.0_f64, -0.25);
        assert_relative_eq!(v.sigma(), 0.25);
        let scaled = v * -2.0;
        assert_relative_eq!(scaled.sigma(), 0.5);
    }

    #[test]
    fn display() {
        let v = UncertainValue::new(1.5_f64, 0.25);
        assert_eq!(format!("{}", v), "1.5 \u{b1} 0.25");
    }
}
