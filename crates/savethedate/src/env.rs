//! Collaborators the widgets consume but do not own.

use chrono::{DateTime, Local};

/// Wall-clock source for the countdown.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Fire-and-forget image fetch, so later transitions never wait on a load.
pub trait ImageLoader {
    fn preload(&mut self, source: &str);
}

/// Answers whether the viewing device is touch-first.
pub trait DeviceProbe {
    fn is_touch_device(&self) -> bool;
}

impl<F: Fn() -> bool> DeviceProbe for F {
    fn is_touch_device(&self) -> bool {
        self()
    }
}

/// Loader that discards requests.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct NoopLoader;

#[cfg(test)]
impl ImageLoader for NoopLoader {
    fn preload(&mut self, _source: &str) {}
}
