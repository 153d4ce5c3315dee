//! Easing curves
//!
//! Every curve maps progress `t` in `[0, 1]` to eased progress with
//! `apply(0) == 0` and `apply(1) == 1` exactly. Overshooting curves
//! (`Elastic`) may leave `[0, 1]` in between.

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::str::FromStr;
use thiserror::Error;

/// Period of the elastic oscillation, as a fraction of the animation
const ELASTIC_PERIOD: f64 = 0.4;

/// Easing function applied to animation progress
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    /// CSS `ease-in`, cubic-bezier(0.42, 0, 1, 1)
    EaseIn,
    /// CSS `ease-out`, cubic-bezier(0, 0, 0.58, 1)
    EaseOut,
    /// CSS `ease-in-out`, cubic-bezier(0.42, 0, 0.58, 1)
    EaseInOut,
    EaseInQuad,
    EaseOutQuad,
    EaseInOutQuad,
    EaseInCubic,
    EaseOutCubic,
    /// Symmetric cubic ease-in-out
    Cubic,
    /// Bounces against the end value before settling
    Bounce,
    /// Overshoots and oscillates around the end value
    Elastic,
    /// Custom cubic bezier with control points (x1, y1) and (x2, y2)
    CubicBezier(f64, f64, f64, f64),
}

impl Easing {
    /// Apply the curve to progress `t`, clamped to `[0, 1]`
    pub fn apply(&self, t: f64) -> f64 {
        if t.is_nan() || t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }

        match *self {
            Easing::Linear => t,
            Easing::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Easing::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Easing::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
            Easing::EaseInQuad => t * t,
            Easing::EaseOutQuad => t * (2.0 - t),
            Easing::EaseInOutQuad => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    -1.0 + (4.0 - 2.0 * t) * t
                }
            }
            Easing::EaseInCubic => t * t * t,
            Easing::EaseOutCubic => {
                let u = t - 1.0;
                u * u * u + 1.0
            }
            Easing::Cubic => {
                if t < 0.5 {
                    4.0 * t * t * t
                } else {
                    let u = -2.0 * t + 2.0;
                    1.0 - u * u * u / 2.0
                }
            }
            Easing::Bounce => bounce_out(t),
            Easing::Elastic => {
                let s = ELASTIC_PERIOD / 4.0;
                2f64.powf(-10.0 * t) * ((t - s) * (2.0 * PI) / ELASTIC_PERIOD).sin() + 1.0
            }
            Easing::CubicBezier(x1, y1, x2, y2) => cubic_bezier(x1, y1, x2, y2, t),
        }
    }

    /// Canonical name, as accepted by `FromStr`
    pub fn name(&self) -> &'static str {
        match self {
            Easing::Linear => "linear",
            Easing::EaseIn => "ease-in",
            Easing::EaseOut => "ease-out",
            Easing::EaseInOut => "ease-in-out",
            Easing::EaseInQuad => "ease-in-quad",
            Easing::EaseOutQuad => "ease-out-quad",
            Easing::EaseInOutQuad => "ease-in-out-quad",
            Easing::EaseInCubic => "ease-in-cubic",
            Easing::EaseOutCubic => "ease-out-cubic",
            Easing::Cubic => "cubic",
            Easing::Bounce => "bounce",
            Easing::Elastic => "elastic",
            Easing::CubicBezier(..) => "cubic-bezier",
        }
    }
}

/// An easing name that matches no built-in curve
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown easing mode '{0}'")]
pub struct UnknownEasing(pub String);

impl FromStr for Easing {
    type Err = UnknownEasing;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let easing = match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "linear" => Easing::Linear,
            "ease-in" | "easein" => Easing::EaseIn,
            "ease-out" | "easeout" => Easing::EaseOut,
            "ease-in-out" | "easeinout" => Easing::EaseInOut,
            "ease-in-quad" => Easing::EaseInQuad,
            "ease-out-quad" => Easing::EaseOutQuad,
            "ease-in-out-quad" => Easing::EaseInOutQuad,
            "ease-in-cubic" => Easing::EaseInCubic,
            "ease-out-cubic" => Easing::EaseOutCubic,
            "cubic" | "ease-in-out-cubic" => Easing::Cubic,
            "bounce" | "bounce-out" => Easing::Bounce,
            "elastic" | "elastic-out" => Easing::Elastic,
            _ => return Err(UnknownEasing(s.to_string())),
        };
        Ok(easing)
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
    } else {
        let t = t - 2.625 / D1;
        N1 * t * t + 0.984375
    }
}

/// Evaluate a unit cubic bezier (endpoints (0,0) and (1,1)) at x = `t`
fn cubic_bezier(x1: f64, y1: f64, x2: f64, y2: f64, t: f64) -> f64 {
    let cx = 3.0 * x1;
    let bx = 3.0 * (x2 - x1) - cx;
    let ax = 1.0 - cx - bx;
    let cy = 3.0 * y1;
    let by = 3.0 * (y2 - y1) - cy;
    let ay = 1.0 - cy - by;

    let sample_x = |s: f64| ((ax * s + bx) * s + cx) * s;
    let sample_dx = |s: f64| (3.0 * ax * s + 2.0 * bx) * s + cx;
    let sample_y = |s: f64| ((ay * s + by) * s + cy) * s;

    // Newton-Raphson first, bisection if the slope is too flat
    let mut s = t;
    for _ in 0..8 {
        let err = sample_x(s) - t;
        if err.abs() < 1e-7 {
            return sample_y(s);
        }
        let dx = sample_dx(s);
        if dx.abs() < 1e-6 {
            break;
        }
        s -= err / dx;
    }

    let (mut lo, mut hi) = (0.0, 1.0);
    s = t;
    for _ in 0..64 {
        let x = sample_x(s);
        if (x - t).abs() < 1e-7 {
            break;
        }
        if x < t {
            lo = s;
        } else {
            hi = s;
        }
        s = (lo + hi) / 2.0;
    }
    sample_y(s)
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [Easing; 13] = [
        Easing::Linear,
        Easing::EaseIn,
        Easing::EaseOut,
        Easing::EaseInOut,
        Easing::EaseInQuad,
        Easing::EaseOutQuad,
        Easing::EaseInOutQuad,
        Easing::EaseInCubic,
        Easing::EaseOutCubic,
        Easing::Cubic,
        Easing::Bounce,
        Easing::Elastic,
        Easing::CubicBezier(0.25, 0.1, 0.25, 1.0),
    ];

    #[test]
    fn test_endpoints_are_exact() {
        for easing in ALL {
            assert_eq!(easing.apply(0.0), 0.0, "{:?} at 0", easing);
            assert_eq!(easing.apply(1.0), 1.0, "{:?} at 1", easing);
            assert_eq!(easing.apply(-3.0), 0.0, "{:?} below 0", easing);
            assert_eq!(easing.apply(7.0), 1.0, "{:?} above 1", easing);
            assert_eq!(easing.apply(f64::NAN), 0.0, "{:?} NaN", easing);
        }
    }

    #[test]
    fn test_monotonic_curves_stay_in_range() {
        for easing in ALL.iter().filter(|e| !matches!(e, Easing::Elastic)) {
            for i in 0..=100 {
                let v = easing.apply(i as f64 / 100.0);
                assert!((-1e-9..=1.0 + 1e-9).contains(&v), "{:?} -> {}", easing, v);
            }
        }
    }

    #[test]
    fn test_ease_in_out_is_symmetric() {
        for easing in [Easing::EaseInOut, Easing::Cubic, Easing::EaseInOutQuad] {
            assert!((easing.apply(0.5) - 0.5).abs() < 1e-6, "{:?}", easing);
            let a = easing.apply(0.2);
            let b = easing.apply(0.8);
            assert!((a + b - 1.0).abs() < 1e-6, "{:?}", easing);
        }
    }

    #[test]
    fn test_ease_in_starts_slow() {
        assert!(Easing::EaseIn.apply(0.25) < 0.25);
        assert!(Easing::EaseOut.apply(0.25) > 0.25);
    }

    #[test]
    fn test_elastic_overshoots() {
        let max = (1..100)
            .map(|i| Easing::Elastic.apply(i as f64 / 100.0))
            .fold(f64::MIN, f64::max);
        assert!(max > 1.0);
    }

    #[test]
    fn test_bounce_hits_one_before_end() {
        assert!((Easing::Bounce.apply(1.0 / 2.75) - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_parse_names() {
        assert_eq!("ease-in-out".parse::<Easing>(), Ok(Easing::EaseInOut));
        assert_eq!("EASE_OUT".parse::<Easing>(), Ok(Easing::EaseOut));
        assert_eq!("bounce".parse::<Easing>(), Ok(Easing::Bounce));
        assert!("wobble".parse::<Easing>().is_err());

        for easing in ALL.iter().filter(|e| !matches!(e, Easing::CubicBezier(..))) {
            assert_eq!(easing.name().parse::<Easing>().as_ref(), Ok(easing));
        }
    }
}
