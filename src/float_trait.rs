use conv::prelude::*;
use ndarray::ScalarOperand;
use schemars::JsonSchema;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display, LowerExp};

/// Floating point number trait, it is implemented for [f32] and [f64] only
pub trait Float:
    num_traits::Float
    + num_traits::FloatConst
    + num_traits::NumAssign
    + ScalarOperand
    + ApproxFrom<usize>
    + ApproxFrom<f32>
    + ApproxFrom<f64>
    + ApproxInto<f32>
    + ApproxInto<f64>
    + ValueFrom<f32>
    + ValueInto<f64>
    + Debug
    + Display
    + LowerExp
    + Serialize
    + DeserializeOwned
    + JsonSchema
    + Send
    + Sync
    + 'static
{
    fn half() -> Self;
    fn two() -> Self;
    fn three() -> Self;
    fn ten() -> Self;
}

impl Float for f32 {
    #[inline]
    fn half() -> Self {
        0.5
    }

    #[inline]
    fn two() -> Self {
        2.0
    }

    #[inline]
    fn three() -> Self {
        3.0
    }

    #[inline]
    fn ten() -> Self {
        10.0
    }
}

impl Float for f64 {
    #[inline]
    fn half() -> Self {
        0.5
    }

    #[inline]
    fn two() -> Self {
        2.0
    }

    #[inline]
    fn three() -> Self {
        3.0
    }

    #[inline]
    fn ten() -> Self {
        10.0
    }
}
