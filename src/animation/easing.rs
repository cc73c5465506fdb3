//! The easing catalogue.
//!
//! Every function maps `t ∈ [0, 1]` to an eased parameter with
//! `f(0) = 0` and `f(1) = 1` exactly; exact endpoints keep an eased
//! segment's last frame byte-identical to the keyframe it lands on.
//! Unknown easing names decode to `Linear`, never an error.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

const BACK_C1: f64 = 1.70158;
const BACK_C3: f64 = BACK_C1 + 1.0;
const BACK_C2: f64 = BACK_C1 * 1.525;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    #[default]
    Linear,
    EaseIn,
    EaseOut,
    EaseInOut,
    CubicIn,
    CubicOut,
    CubicInOut,
    BackIn,
    BackOut,
    BackInOut,
    ElasticOut,
    BounceOut,
}

impl Easing {
    /// Parses a wire name; anything unrecognized falls back to `Linear`.
    #[must_use]
    pub fn from_name(name: &str) -> Self {
        match name {
            "easeIn" => Self::EaseIn,
            "easeOut" => Self::EaseOut,
            "easeInOut" => Self::EaseInOut,
            "cubicIn" => Self::CubicIn,
            "cubicOut" => Self::CubicOut,
            "cubicInOut" => Self::CubicInOut,
            "backIn" => Self::BackIn,
            "backOut" => Self::BackOut,
            "backInOut" => Self::BackInOut,
            "elasticOut" => Self::ElasticOut,
            "bounceOut" => Self::BounceOut,
            _ => Self::Linear,
        }
    }

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseIn => "easeIn",
            Self::EaseOut => "easeOut",
            Self::EaseInOut => "easeInOut",
            Self::CubicIn => "cubicIn",
            Self::CubicOut => "cubicOut",
            Self::CubicInOut => "cubicInOut",
            Self::BackIn => "backIn",
            Self::BackOut => "backOut",
            Self::BackInOut => "backInOut",
            Self::ElasticOut => "elasticOut",
            Self::BounceOut => "bounceOut",
        }
    }

    /// Applies the easing to a raw parameter `t ∈ [0, 1]`.
    #[must_use]
    pub fn eval(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseIn => t * t,
            Self::EaseOut => t * (2.0 - t),
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Self::CubicIn => t * t * t,
            Self::CubicOut => {
                let inv = 1.0 - t;
                1.0 - inv * inv * inv
            }
            Self::CubicInOut => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let inv = -2.0 * t + 2.0;
                    1.0 - inv * inv * inv / 2.0
                }
            }
            Self::BackIn => BACK_C3 * t * t * t - BACK_C1 * t * t,
            Self::BackOut => {
                let shifted = t - 1.0;
                1.0 + BACK_C3 * shifted * shifted * shifted + BACK_C1 * shifted * shifted
            }
            Self::BackInOut => {
                if t < 0.5 {
                    let d = 2.0 * t;
                    (d * d * ((BACK_C2 + 1.0) * d - BACK_C2)) / 2.0
                } else {
                    let d = 2.0 * t - 2.0;
                    (d * d * ((BACK_C2 + 1.0) * d + BACK_C2) + 2.0) / 2.0
                }
            }
            Self::ElasticOut => {
                if t == 0.0 {
                    0.0
                } else if t == 1.0 {
                    1.0
                } else {
                    let c4 = std::f64::consts::TAU / 3.0;
                    2.0_f64.powf(-10.0 * t) * ((10.0 * t - 0.75) * c4).sin() + 1.0
                }
            }
            Self::BounceOut => bounce_out(t),
        }
    }
}

fn bounce_out(t: f64) -> f64 {
    const N1: f64 = 7.5625;
    const D1: f64 = 2.75;
    if t < 1.0 / D1 {
        N1 * t * t
    } else if t < 2.0 / D1 {
        let t = t - 1.5 / D1;
        N1 * t * t + 0.75
    } else if t < 2.5 / D1 {
        let t = t - 2.25 / D1;
        N1 * t * t + 0.9375
    } else if t < 1.0 {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    } else {
        1.0
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Easing {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for Easing {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(Self::from_name(&name))
    }
}

pub const ALL_EASINGS: [Easing; 12] = [
    Easing::Linear,
    Easing::EaseIn,
    Easing::EaseOut,
    Easing::EaseInOut,
    Easing::CubicIn,
    Easing::CubicOut,
    Easing::CubicInOut,
    Easing::BackIn,
    Easing::BackOut,
    Easing::BackInOut,
    Easing::ElasticOut,
    Easing::BounceOut,
];
