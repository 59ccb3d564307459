//! Live countdown to the event date.

use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Local, NaiveDate, NaiveDateTime, TimeZone};
use tracing::{debug, warn};

use crate::env::Clock;
use crate::page::{ElementId, Page};
use crate::timing::Interval;

const MINUTES_PER_DAY: i64 = 24 * 60;
const INVALID_DATE: &str = "Invalid date";

/// The instant counted down to, as read from the site file.
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownTarget {
    At(DateTime<Local>),
    Invalid(String),
}

impl CountdownTarget {
    /// Accepts RFC 3339, `YYYY-MM-DD HH:MM[:SS]` (local time) or a bare
    /// `YYYY-MM-DD` (local midnight). Anything else is kept as `Invalid`.
    pub fn parse(input: &str) -> Self {
        let s = input.trim();
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Self::At(dt.with_timezone(&Local));
        }
        let naive = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"]
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(s, "%Y-%m-%d")
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            });
        match naive.and_then(|n| Local.from_local_datetime(&n).earliest()) {
            Some(dt) => Self::At(dt),
            None => Self::Invalid(s.to_string()),
        }
    }

    pub fn instant(&self) -> Option<DateTime<Local>> {
        match self {
            Self::At(dt) => Some(*dt),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct CountdownOptions {
    pub target_selector: String,
    pub target: CountdownTarget,
    pub end: Option<CountdownTarget>,
    /// 1s by default; 10s for the coarse variant.
    pub tick: Duration,
    /// Rendered once the target has passed. Without it the countdown
    /// clamps at zero and renders nothing.
    pub started_text: Option<String>,
}

impl CountdownOptions {
    pub fn new(target_selector: &str, target: CountdownTarget) -> Self {
        Self {
            target_selector: target_selector.to_string(),
            target,
            end: None,
            tick: Duration::from_secs(1),
            started_text: None,
        }
    }
}

/// Whole units left until the target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Remaining {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

impl Remaining {
    /// Negative totals clamp to zero.
    pub fn from_seconds(total_seconds: i64) -> Self {
        let total = total_seconds.max(0);
        let total_minutes = total / 60;
        let days = total_minutes / MINUTES_PER_DAY;
        let rest = total_minutes - days * MINUTES_PER_DAY;
        Self {
            days,
            hours: rest / 60,
            minutes: rest % 60,
            seconds: total % 60,
        }
    }

    pub fn until(target: DateTime<Local>, now: DateTime<Local>) -> Self {
        Self::from_seconds((target - now).num_seconds())
    }

    /// Non-zero units, largest first, e.g. `2 days 3 hours 15 minutes`.
    pub fn render(&self) -> String {
        [
            (self.days, "day"),
            (self.hours, "hour"),
            (self.minutes, "minute"),
            (self.seconds, "second"),
        ]
        .iter()
        .filter(|(n, _)| *n != 0)
        .map(|(n, unit)| format!("{n} {unit}{}", if *n == 1 { "" } else { "s" }))
        .collect::<Vec<_>>()
        .join(" ")
    }
}

fn ordinal(day: u32) -> String {
    let suffix = match (day % 10, day % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{day}{suffix}")
}

/// Caption such as `(Jul 15th - Jul 18th 2021)`.
pub fn format_date_range(start: NaiveDate, end: NaiveDate) -> String {
    let day = |d: NaiveDate| format!("{} {}", d.format("%b"), ordinal(d.day()));
    if start.year() == end.year() {
        format!("({} - {} {})", day(start), day(end), end.year())
    } else {
        format!(
            "({} {} - {} {})",
            day(start),
            start.year(),
            day(end),
            end.year()
        )
    }
}

pub struct Countdown {
    element: Option<ElementId>,
    target: CountdownTarget,
    started_text: Option<String>,
    interval: Interval,
}

impl Countdown {
    /// Bind to `options.target_selector` and render straight away. A missing
    /// element leaves the countdown inert.
    pub fn create(
        page: &mut Page,
        options: CountdownOptions,
        clock: &dyn Clock,
        now: Instant,
    ) -> Self {
        let element = page.query(&options.target_selector);
        if element.is_none() {
            debug!(selector = %options.target_selector, "countdown element not found");
        }
        if let CountdownTarget::Invalid(raw) = &options.target {
            warn!(date = %raw, "countdown target is not a date");
        }

        let countdown = Self {
            element,
            target: options.target,
            started_text: options.started_text,
            interval: Interval::new(options.tick, now),
        };

        if let (Some(el), Some(end)) = (element, options.end.as_ref()) {
            countdown.append_caption(page, el, end);
        }
        countdown.render(page, clock);
        countdown
    }

    /// Date range caption beside the countdown, when both ends parse.
    fn append_caption(&self, page: &mut Page, el: ElementId, end: &CountdownTarget) {
        let (Some(start), Some(end)) = (self.target.instant(), end.instant()) else {
            return;
        };
        let caption = page.create_element("span");
        page.add_class(caption, "countdown-date-range");
        page.set_text(
            caption,
            &format_date_range(start.date_naive(), end.date_naive()),
        );
        let parent = page
            .element(el)
            .and_then(|e| e.parent)
            .unwrap_or(el);
        page.append_child(parent, caption);
    }

    pub fn text_at(&self, now: DateTime<Local>) -> String {
        let Some(target) = self.target.instant() else {
            return INVALID_DATE.to_string();
        };
        if target <= now {
            if let Some(text) = &self.started_text {
                return text.clone();
            }
        }
        Remaining::until(target, now).render()
    }

    pub fn render(&self, page: &mut Page, clock: &dyn Clock) {
        if let Some(el) = self.element {
            page.set_text(el, &self.text_at(clock.now()));
        }
    }

    pub fn tick(&mut self, page: &mut Page, clock: &dyn Clock, now: Instant) {
        if self.interval.due(now) {
            self.render(page, clock);
        }
    }

    pub fn is_running(&self) -> bool {
        self.element.is_some() && self.interval.is_active()
    }

    pub fn dispose(&mut self) {
        self.interval.cancel();
    }
}
