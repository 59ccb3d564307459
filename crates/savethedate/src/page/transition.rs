use std::fmt;
use std::time::{Duration, Instant};

/// CSS timing functions supported by the page transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    Linear,
    #[default]
    Ease,
    EaseIn,
    EaseOut,
    EaseInOut,
}

impl Easing {
    /// Unknown names fall back to `ease`, the CSS initial value.
    pub fn from_name(name: &str) -> Self {
        match name.trim() {
            "linear" => Self::Linear,
            "ease-in" => Self::EaseIn,
            "ease-out" => Self::EaseOut,
            "ease-in-out" => Self::EaseInOut,
            _ => Self::Ease,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Linear => "linear",
            Self::Ease => "ease",
            Self::EaseIn => "ease-in",
            Self::EaseOut => "ease-out",
            Self::EaseInOut => "ease-in-out",
        }
    }

    pub fn apply(&self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::Ease => cubic_bezier(0.25, 0.1, 0.25, 1.0, t),
            Self::EaseIn => cubic_bezier(0.42, 0.0, 1.0, 1.0, t),
            Self::EaseOut => cubic_bezier(0.0, 0.0, 0.58, 1.0, t),
            Self::EaseInOut => cubic_bezier(0.42, 0.0, 0.58, 1.0, t),
        }
    }
}

impl fmt::Display for Easing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Evaluate a CSS `cubic-bezier(x1, y1, x2, y2)` at input progress `x`.
fn cubic_bezier(x1: f32, y1: f32, x2: f32, y2: f32, x: f32) -> f32 {
    fn sample(a: f32, b: f32, t: f32) -> f32 {
        let u = 1.0 - t;
        3.0 * u * u * t * a + 3.0 * u * t * t * b + t * t * t
    }

    // x(t) is monotonic for 0 <= x1, x2 <= 1, so bisection converges.
    let (mut lo, mut hi) = (0.0_f32, 1.0_f32);
    let mut t = x;
    for _ in 0..32 {
        let cx = sample(x1, x2, t);
        if (cx - x).abs() < 1e-5 {
            break;
        }
        if cx < x {
            lo = t;
        } else {
            hi = t;
        }
        t = (lo + hi) / 2.0;
    }
    sample(y1, y2, t)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransitionProperty {
    All,
    Named(String),
}

impl TransitionProperty {
    pub fn covers(&self, property: &str) -> bool {
        match self {
            Self::All => true,
            Self::Named(name) => name == property,
        }
    }
}

/// The `transition` shorthand applied to an element.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTiming {
    pub property: TransitionProperty,
    pub duration: Duration,
    pub easing: Easing,
}

impl TransitionTiming {
    pub fn all(duration: Duration, easing: Easing) -> Self {
        Self {
            property: TransitionProperty::All,
            duration,
            easing,
        }
    }
}

impl fmt::Display for TransitionTiming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let property = match &self.property {
            TransitionProperty::All => "all",
            TransitionProperty::Named(name) => name.as_str(),
        };
        write!(
            f,
            "{property} {}ms {}",
            self.duration.as_millis(),
            self.easing
        )
    }
}

/// A style property animating between two values.
#[derive(Debug, Clone)]
pub struct ActiveTransition {
    pub property: String,
    pub from: Option<String>,
    pub to: String,
    pub start: Instant,
    pub duration: Duration,
    pub easing: Easing,
}

impl ActiveTransition {
    pub fn new(
        property: &str,
        from: Option<String>,
        to: &str,
        timing: &TransitionTiming,
        start: Instant,
    ) -> Self {
        Self {
            property: property.to_string(),
            from,
            to: to.to_string(),
            start,
            duration: timing.duration,
            easing: timing.easing,
        }
    }

    /// Eased progress in `[0, 1]`.
    pub fn progress(&self, now: Instant) -> f32 {
        if self.duration.is_zero() {
            return 1.0;
        }
        let elapsed = now.saturating_duration_since(self.start).as_secs_f32();
        self.easing.apply(elapsed / self.duration.as_secs_f32())
    }

    pub fn is_complete(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.start) >= self.duration
    }

    /// Interpolated numeric value, for properties such as `opacity`.
    pub fn numeric_value(&self, now: Instant) -> Option<f32> {
        let to: f32 = self.to.trim().parse().ok()?;
        let from: f32 = self
            .from
            .as_deref()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(to);
        Some(from + (to - from) * self.progress(now))
    }
}
