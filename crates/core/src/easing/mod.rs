use std::{
    f64::consts::PI,
    fmt,
    str::FromStr,
    sync::Arc,
};

use serde::{Deserialize, Serialize};

const BACK_C1: f64 = 1.70158;
const BACK_C2: f64 = BACK_C1 * 1.525;
const BACK_C3: f64 = BACK_C1 + 1.0;
const ELASTIC_C4: f64 = (2.0 * PI) / 3.0;
const ELASTIC_C5: f64 = (2.0 * PI) / 4.5;
const BOUNCE_N1: f64 = 7.5625;
const BOUNCE_D1: f64 = 2.75;

/// Named easing curves. Every curve maps 0 to 0 and 1 to 1; the `Back` and
/// `Elastic` families overshoot the unit interval in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Easing {
    #[default]
    Linear,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    EaseInOutCubic,
    EaseInQuart,
    EaseOutQuart,
    EaseInOutQuart,
    EaseInQuint,
    EaseOutQuint,
    EaseInOutQuint,
    EaseInSine,
    EaseOutSine,
    EaseInOutSine,
    EaseInExpo,
    EaseOutExpo,
    EaseInOutExpo,
    EaseInCirc,
    EaseOutCirc,
    EaseInOutCirc,
    EaseInBack,
    EaseOutBack,
    EaseInOutBack,
    EaseInElastic,
    EaseOutElastic,
    EaseInOutElastic,
    EaseInBounce,
    EaseOutBounce,
    EaseInOutBounce,
}

impl Easing {
    /// Every named curve, in declaration order.
    pub const ALL: [Easing; 31] = [
        Easing::Linear,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::EaseInOutCubic,
        Easing::EaseInQuart,
        Easing::EaseOutQuart,
        Easing::EaseInOutQuart,
        Easing::EaseInQuint,
        Easing::EaseOutQuint,
        Easing::EaseInOutQuint,
        Easing::EaseInSine,
        Easing::EaseOutSine,
        Easing::EaseInOutSine,
        Easing::EaseInExpo,
        Easing::EaseOutExpo,
        Easing::EaseInOutExpo,
        Easing::EaseInCirc,
        Easing::EaseOutCirc,
        Easing::EaseInOutCirc,
        Easing::EaseInBack,
        Easing::EaseOutBack,
        Easing::EaseInOutBack,
        Easing::EaseInElastic,
        Easing::EaseOutElastic,
        Easing::EaseInOutElastic,
        Easing::EaseInBounce,
        Easing::EaseOutBounce,
        Easing::EaseInOutBounce,
    ];

    /// Canonical camel-case name, matching the serialised form.
    pub fn name(self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::EaseInQuad => "easeInQuad",
            Self::EaseOutQuad => "easeOutQuad",
            Self::EaseInOutQuad => "easeInOutQuad",
            Self::EaseInCubic => "easeInCubic",
            Self::EaseOutCubic => "easeOutCubic",
            Self::EaseInOutCubic => "easeInOutCubic",
            Self::EaseInQuart => "easeInQuart",
            Self::EaseOutQuart => "easeOutQuart",
            Self::EaseInOutQuart => "easeInOutQuart",
            Self::EaseInQuint => "easeInQuint",
            Self::EaseOutQuint => "easeOutQuint",
            Self::EaseInOutQuint => "easeInOutQuint",
            Self::EaseInSine => "easeInSine",
            Self::EaseOutSine => "easeOutSine",
            Self::EaseInOutSine => "easeInOutSine",
            Self::EaseInExpo => "easeInExpo",
            Self::EaseOutExpo => "easeOutExpo",
            Self::EaseInOutExpo => "easeInOutExpo",
            Self::EaseInCirc => "easeInCirc",
            Self::EaseOutCirc => "easeOutCirc",
            Self::EaseInOutCirc => "easeInOutCirc",
            Self::EaseInBack => "easeInBack",
            Self::EaseOutBack => "easeOutBack",
            Self::EaseInOutBack => "easeInOutBack",
            Self::EaseInElastic => "easeInElastic",
            Self::EaseOutElastic => "easeOutElastic",
            Self::EaseInOutElastic => "easeInOutElastic",
            Self::EaseInBounce => "easeInBounce",
            Self::EaseOutBounce => "easeOutBounce",
            Self::EaseInOutBounce => "easeInOutBounce",
        }
    }

    /// Looks a curve up by name. Matching ignores case, `-` and `_`, so
    /// `easeInOutQuad`, `ease-in-out-quad` and `EASE_IN_OUT_QUAD` all resolve
    /// to the same curve.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalise(name);
        Self::ALL
            .into_iter()
            .find(|easing| normalise(easing.name()) == wanted)
    }

    /// Reshapes linear progress `t` into eased progress.
    pub fn apply(self, t: f64) -> f64 {
        match self {
            Self::Linear => t,
            Self::EaseInQuad => t * t,
            Self::EaseOutQuad => 1.0 - (1.0 - t).powi(2),
            Self::EaseInOutQuad => in_out(t, 2),
            Self::EaseInCubic => t.powi(3),
            Self::EaseOutCubic => 1.0 - (1.0 - t).powi(3),
            Self::EaseInOutCubic => in_out(t, 3),
            Self::EaseInQuart => t.powi(4),
            Self::EaseOutQuart => 1.0 - (1.0 - t).powi(4),
            Self::EaseInOutQuart => in_out(t, 4),
            Self::EaseInQuint => t.powi(5),
            Self::EaseOutQuint => 1.0 - (1.0 - t).powi(5),
            Self::EaseInOutQuint => in_out(t, 5),
            Self::EaseInSine => 1.0 - (t * PI / 2.0).cos(),
            Self::EaseOutSine => (t * PI / 2.0).sin(),
            Self::EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,
            Self::EaseInExpo => pinned(t, |t| 2f64.powf(10.0 * t - 10.0)),
            Self::EaseOutExpo => pinned(t, |t| 1.0 - 2f64.powf(-10.0 * t)),
            Self::EaseInOutExpo => pinned(t, |t| {
                if t < 0.5 {
                    2f64.powf(20.0 * t - 10.0) / 2.0
                } else {
                    (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
                }
            }),
            Self::EaseInCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
            Self::EaseOutCirc => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
            Self::EaseInOutCirc => {
                if t < 0.5 {
                    (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) / 2.0
                } else {
                    ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) / 2.0
                }
            }
            Self::EaseInBack => pinned(t, |t| BACK_C3 * t.powi(3) - BACK_C1 * t * t),
            Self::EaseOutBack => pinned(t, |t| {
                1.0 + BACK_C3 * (t - 1.0).powi(3) + BACK_C1 * (t - 1.0).powi(2)
            }),
            Self::EaseInOutBack => pinned(t, |t| {
                if t < 0.5 {
                    ((2.0 * t).powi(2) * ((BACK_C2 + 1.0) * 2.0 * t - BACK_C2)) / 2.0
                } else {
                    ((2.0 * t - 2.0).powi(2) * ((BACK_C2 + 1.0) * (t * 2.0 - 2.0) + BACK_C2)
                        + 2.0)
                        / 2.0
                }
            }),
            Self::EaseInElastic => pinned(t, |t| {
                -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * ELASTIC_C4).sin()
            }),
            Self::EaseOutElastic => pinned(t, |t| {
                2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * ELASTIC_C4).sin() + 1.0
            }),
            Self::EaseInOutElastic => pinned(t, |t| {
                let wave = ((20.0 * t - 11.125) * ELASTIC_C5).sin();
                if t < 0.5 {
                    -(2f64.powf(20.0 * t - 10.0) * wave) / 2.0
                } else {
                    (2f64.powf(-20.0 * t + 10.0) * wave) / 2.0 + 1.0
                }
            }),
            Self::EaseInBounce => 1.0 - bounce_out(1.0 - t),
            Self::EaseOutBounce => bounce_out(t),
            Self::EaseInOutBounce => {
                if t < 0.5 {
                    (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
                } else {
                    (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
                }
            }
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Easing {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| format!("unknown easing curve `{s}`"))
    }
}

fn normalise(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Symmetric polynomial in-out curve of the given degree.
fn in_out(t: f64, degree: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(degree - 1) * t.powi(degree)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(degree) / 2.0
    }
}

/// Forces the exact boundary values for curves whose closed form only
/// approaches them.
fn pinned(t: f64, curve: impl Fn(f64) -> f64) -> f64 {
    if t <= 0.0 {
        0.0
    } else if t >= 1.0 {
        1.0
    } else {
        curve(t)
    }
}

fn bounce_out(t: f64) -> f64 {
    if t < 1.0 / BOUNCE_D1 {
        BOUNCE_N1 * t * t
    } else if t < 2.0 / BOUNCE_D1 {
        let t = t - 1.5 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.75
    } else if t < 2.5 / BOUNCE_D1 {
        let t = t - 2.25 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / BOUNCE_D1;
        BOUNCE_N1 * t * t + 0.984375
    }
}

/// The progress transform an animation applies each tick: either one of the
/// named [`Easing`] curves or a caller supplied function.
#[derive(Clone)]
pub enum TimingFunction {
    Named(Easing),
    Custom(Arc<dyn Fn(f64) -> f64 + Send + Sync>),
}

impl TimingFunction {
    /// Wraps an arbitrary progress transform.
    pub fn custom<F>(curve: F) -> Self
    where
        F: Fn(f64) -> f64 + Send + Sync + 'static,
    {
        Self::Custom(Arc::new(curve))
    }

    pub fn apply(&self, t: f64) -> f64 {
        match self {
            Self::Named(easing) => easing.apply(t),
            Self::Custom(curve) => curve(t),
        }
    }
}

impl Default for TimingFunction {
    fn default() -> Self {
        Self::Named(Easing::Linear)
    }
}

impl From<Easing> for TimingFunction {
    fn from(value: Easing) -> Self {
        Self::Named(value)
    }
}

impl fmt::Debug for TimingFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(easing) => f.debug_tuple("Named").field(easing).finish(),
            Self::Custom(_) => f.debug_tuple("Custom").finish(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn every_curve_preserves_boundaries() {
        for easing in Easing::ALL {
            assert!(easing.apply(0.0).abs() < EPS, "{easing} at 0");
            assert!((easing.apply(1.0) - 1.0).abs() < EPS, "{easing} at 1");
        }
    }

    #[test]
    fn resolves_names_loosely() {
        assert_eq!(Easing::from_name("linear"), Some(Easing::Linear));
        assert_eq!(
            Easing::from_name("ease-in-out-quad"),
            Some(Easing::EaseInOutQuad)
        );
        assert_eq!(Easing::from_name("EASE_OUT_BOUNCE"), Some(Easing::EaseOutBounce));
        assert_eq!(Easing::from_name("wobble"), None);
        assert!("wobble".parse::<Easing>().is_err());
    }

    #[test]
    fn names_round_trip_through_lookup() {
        for easing in Easing::ALL {
            assert_eq!(Easing::from_name(easing.name()), Some(easing));
        }
    }

    #[test]
    fn back_curves_overshoot() {
        assert!(Easing::EaseInBack.apply(0.2) < 0.0);
        assert!(Easing::EaseOutBack.apply(0.8) > 1.0);
    }

    #[test]
    fn in_out_curves_are_symmetric_at_midpoint() {
        for easing in [
            Easing::EaseInOutQuad,
            Easing::EaseInOutCubic,
            Easing::EaseInOutQuart,
            Easing::EaseInOutQuint,
            Easing::EaseInOutSine,
        ] {
            assert!((easing.apply(0.5) - 0.5).abs() < EPS, "{easing}");
        }
    }

    #[test]
    fn custom_timing_function_is_used() {
        let timing = TimingFunction::custom(|t| t * t * t);
        assert!((timing.apply(0.5) - 0.125).abs() < EPS);
        assert_eq!(TimingFunction::default().apply(0.3), 0.3);
    }

    #[test]
    fn serialises_with_camel_case_names() {
        let json = serde_json::to_string(&Easing::EaseInOutCubic).unwrap();
        assert_eq!(json, "\"easeInOutCubic\"");
        let parsed: Easing = serde_json::from_str("\"easeOutExpo\"").unwrap();
        assert_eq!(parsed, Easing::EaseOutExpo);
    }
}
