//! Gesture-driven slide deck.
//!
//! Wheel, touch and keyboard input are turned into discrete transitions
//! between full-bleed background images. A transition is in flight from the
//! moment the container's background is rewritten until the container reports
//! the end of its CSS transition. Input arriving in between is dropped.

pub mod gesture;
pub mod sidebar;

use std::time::{Duration, Instant};

use tracing::{debug, trace, warn};

use crate::env::{DeviceProbe, ImageLoader};
use crate::page::{
    Dispatch, Easing, ElementId, InputEvent, Key, Page, PageEvent, TransitionTiming, css_url,
};
use crate::timing::{Debounce, Timeout};

use gesture::{Direction, GestureTracker};
use sidebar::Sidebar;

const BACKGROUND: &str = "background-image";
const TRANSIENT_UI_HIDE: Duration = Duration::from_millis(2000);
const PRELOAD_DELAY: Duration = Duration::from_millis(100);

#[derive(Debug, Clone, PartialEq)]
pub struct Slide {
    pub title: Option<String>,
    pub image_source: String,
    pub content_selector: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DeckOptions {
    pub container_selector: String,
    pub counter_selector: Option<String>,
    pub sidebar_selector: Option<String>,
    pub transition_duration: Duration,
    pub transition_easing: Easing,
    /// Minimum absolute delta (exclusive) for wheel and touch input.
    pub velocity_threshold: f32,
    pub start_index: usize,
}

impl Default for DeckOptions {
    fn default() -> Self {
        Self {
            container_selector: "#app-main".to_string(),
            counter_selector: None,
            sidebar_selector: None,
            transition_duration: Duration::from_millis(1500),
            transition_easing: Easing::Ease,
            velocity_threshold: 5.0,
            start_index: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckPhase {
    Idle,
    Transitioning,
}

/// Observer of transition boundaries, called with the current slide index.
pub type SlideListener = Box<dyn FnMut(&mut Page, usize)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    Start,
    End,
}

pub struct SlideDeck {
    slides: Vec<Slide>,
    options: DeckOptions,
    current: usize,
    phase: DeckPhase,
    container: Option<ElementId>,
    counter: Option<ElementId>,
    sidebar: Option<Sidebar>,
    gesture: GestureTracker,
    counter_hide: Debounce,
    preload: Timeout,
    start_listeners: Vec<SlideListener>,
    end_listeners: Vec<SlideListener>,
    /// Notices from the construction-time entry, delivered on the first
    /// frame so that listeners registered after `create` still see them.
    deferred: Vec<Notice>,
    disposed: bool,
}

impl SlideDeck {
    pub fn create(
        page: &mut Page,
        slides: Vec<Slide>,
        options: DeckOptions,
        device: &dyn DeviceProbe,
        now: Instant,
    ) -> Self {
        let container = page.query(&options.container_selector);
        if container.is_none() {
            warn!(selector = %options.container_selector, "slide deck container not found");
        }
        let counter = options
            .counter_selector
            .as_deref()
            .and_then(|s| page.query(s));

        let timing = TransitionTiming::all(options.transition_duration, options.transition_easing);
        if let Some(el) = container {
            page.set_transition(el, timing.clone());
        }
        for slide in &slides {
            if let Some(el) = slide.content_selector.as_deref().and_then(|s| page.query(s)) {
                page.set_transition(el, timing.clone());
            }
        }

        let sidebar = match options.sidebar_selector.as_deref().and_then(|s| page.query(s)) {
            Some(_) if device.is_touch_device() => {
                debug!("touch device, sidebar suppressed");
                None
            }
            Some(root) => Some(Sidebar::build(page, root, &slides, TRANSIENT_UI_HIDE, now)),
            None => None,
        };

        let current = options.start_index.min(slides.len().saturating_sub(1));
        let mut deck = Self {
            slides,
            options,
            current,
            phase: DeckPhase::Idle,
            container,
            counter,
            sidebar,
            gesture: GestureTracker::default(),
            counter_hide: Debounce::new(TRANSIENT_UI_HIDE),
            preload: Timeout::new(PRELOAD_DELAY, now),
            start_listeners: Vec::new(),
            end_listeners: Vec::new(),
            deferred: Vec::new(),
            disposed: false,
        };
        deck.enter_initial(page, now);
        deck
    }

    pub fn on_transition_start(&mut self, listener: impl FnMut(&mut Page, usize) + 'static) {
        self.start_listeners.push(Box::new(listener));
    }

    pub fn on_transition_end(&mut self, listener: impl FnMut(&mut Page, usize) + 'static) {
        self.end_listeners.push(Box::new(listener));
    }

    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    /// Current slide, clamped into the slide list.
    pub fn current_index(&self) -> usize {
        self.current.min(self.slides.len().saturating_sub(1))
    }

    pub fn current_slide(&self) -> Option<&Slide> {
        self.slides.get(self.current_index())
    }

    pub fn phase(&self) -> DeckPhase {
        self.phase
    }

    pub fn sidebar(&self) -> Option<&Sidebar> {
        self.sidebar.as_ref()
    }

    /// Admission rule for wheel and touch deltas.
    pub fn should_transition(&self, delta: f32) -> bool {
        if self.phase != DeckPhase::Idle || delta.abs() <= self.options.velocity_threshold {
            return false;
        }
        match Direction::of(delta) {
            Direction::Next => self.current + 1 < self.slides.len(),
            Direction::Previous => self.current > 0,
        }
    }

    pub fn handle_input(&mut self, page: &mut Page, dispatch: &mut Dispatch, now: Instant) {
        if self.disposed {
            return;
        }
        match dispatch.event {
            InputEvent::Wheel { delta_y } => {
                dispatch.prevent_default();
                self.gesture.wheel(delta_y);
            }
            InputEvent::TouchStart { y } => self.gesture.touch_start(y),
            InputEvent::TouchMove { y } => {
                dispatch.prevent_default();
                self.gesture.touch_move(y);
            }
            InputEvent::Key(Key::ArrowRight) => {
                self.navigate(page, Direction::Next, now);
            }
            InputEvent::Key(Key::ArrowLeft) => {
                self.navigate(page, Direction::Previous, now);
            }
            InputEvent::Click { target } => {
                let index = self
                    .sidebar
                    .as_ref()
                    .and_then(|s| s.index_of(page, target));
                if let Some(index) = index {
                    self.go_to(page, index, now);
                }
            }
            InputEvent::PointerEnter { target } => {
                if let Some(sidebar) = self.sidebar.as_mut().filter(|s| s.root() == target) {
                    sidebar.pointer_enter(page, now);
                }
            }
            InputEvent::PointerLeave { target } => {
                if let Some(sidebar) = self.sidebar.as_mut().filter(|s| s.root() == target) {
                    sidebar.pointer_leave(now);
                }
            }
        }
    }

    /// Animation-frame callback: flushes at most one pending gesture.
    pub fn frame(&mut self, page: &mut Page, now: Instant) {
        for notice in std::mem::take(&mut self.deferred) {
            match notice {
                Notice::Start => self.notify_start(page),
                Notice::End => self.notify_end(page),
            }
        }
        if self.disposed {
            return;
        }
        if let Some(delta) = self.gesture.take_pending() {
            self.try_transition(page, delta, now);
        }
    }

    /// Timer callback: transient UI hiding and the delayed preload.
    pub fn tick(&mut self, page: &mut Page, loader: &mut dyn ImageLoader, now: Instant) {
        if self.preload.due(now) {
            for slide in &self.slides {
                loader.preload(&slide.image_source);
            }
            debug!(count = self.slides.len(), "slide images preloading");
        }
        if self.counter_hide.fire_due(now) {
            if let Some(counter) = self.counter {
                page.set_style(counter, "opacity", "0", now);
            }
        }
        if let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.tick(page, now);
        }
    }

    pub fn handle_page_event(&mut self, page: &mut Page, event: &PageEvent) {
        let PageEvent::TransitionEnd { target, property } = event;
        if Some(*target) != self.container
            || property != BACKGROUND
            || self.phase != DeckPhase::Transitioning
        {
            return;
        }
        self.finish(page);
    }

    /// Keyboard navigation: wraps around at both ends and ignores the
    /// velocity threshold, but still never overlaps a transition.
    pub fn navigate(&mut self, page: &mut Page, direction: Direction, now: Instant) -> bool {
        let count = self.slides.len();
        if self.disposed || self.phase != DeckPhase::Idle || count == 0 {
            return false;
        }
        let current = self.current_index();
        let target = match direction {
            Direction::Next => (current + 1) % count,
            Direction::Previous => (current + count - 1) % count,
        };
        self.transition_to(page, target, now);
        true
    }

    /// Jump straight to `index` (sidebar click).
    pub fn go_to(&mut self, page: &mut Page, index: usize, now: Instant) -> bool {
        if self.disposed
            || self.phase != DeckPhase::Idle
            || index >= self.slides.len()
            || index == self.current_index()
        {
            trace!(index, phase = ?self.phase, "jump rejected");
            return false;
        }
        self.transition_to(page, index, now);
        true
    }

    fn try_transition(&mut self, page: &mut Page, delta: f32, now: Instant) -> bool {
        if !self.should_transition(delta) {
            trace!(delta, index = self.current, phase = ?self.phase, "gesture rejected");
            return false;
        }
        let target = match Direction::of(delta) {
            Direction::Next => self.current + 1,
            Direction::Previous => self.current - 1,
        };
        self.transition_to(page, target, now);
        true
    }

    fn transition_to(&mut self, page: &mut Page, target: usize, now: Instant) {
        debug!(from = self.current, to = target, "slide transition");
        self.phase = DeckPhase::Transitioning;
        self.set_content_opacity(page, "0", now);
        let previous = self.current_index();
        self.current = target;
        let started = self.set_background(page, now);
        self.notify_start(page);
        self.show_chrome(page, Some(previous), now);
        self.set_content_opacity(page, "1", now);
        if !started {
            self.finish(page);
        }
    }

    fn enter_initial(&mut self, page: &mut Page, now: Instant) {
        if self.slides.is_empty() {
            return;
        }
        self.phase = DeckPhase::Transitioning;
        let started = self.set_background(page, now);
        self.deferred.push(Notice::Start);
        self.show_chrome(page, None, now);
        self.set_content_opacity(page, "1", now);
        if !started {
            self.phase = DeckPhase::Idle;
            self.deferred.push(Notice::End);
        }
    }

    fn finish(&mut self, page: &mut Page) {
        self.phase = DeckPhase::Idle;
        self.notify_end(page);
    }

    fn set_background(&self, page: &mut Page, now: Instant) -> bool {
        match (self.container, self.current_slide()) {
            (Some(container), Some(slide)) => {
                page.set_style(container, BACKGROUND, &css_url(&slide.image_source), now)
            }
            _ => false,
        }
    }

    fn set_content_opacity(&self, page: &mut Page, opacity: &str, now: Instant) {
        let content = self
            .current_slide()
            .and_then(|s| s.content_selector.as_deref())
            .and_then(|s| page.query(s));
        if let Some(el) = content {
            page.set_style(el, "opacity", opacity, now);
        }
    }

    /// Sidebar highlight and counter text, both revealed transiently.
    fn show_chrome(&mut self, page: &mut Page, previous: Option<usize>, now: Instant) {
        let index = self.current_index();
        if let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.highlight(page, previous, index);
            sidebar.reveal(page, now);
        }
        if let Some(counter) = self.counter {
            page.set_style(counter, "opacity", "1", now);
            page.set_text(counter, &format!("{}/{}", index + 1, self.slides.len()));
            self.counter_hide.trigger(now);
        }
    }

    fn notify_start(&mut self, page: &mut Page) {
        let index = self.current_index();
        for listener in &mut self.start_listeners {
            listener(page, index);
        }
    }

    fn notify_end(&mut self, page: &mut Page) {
        let index = self.current_index();
        for listener in &mut self.end_listeners {
            listener(page, index);
        }
    }

    /// Stop reacting to input and timers and drop all listeners.
    pub fn dispose(&mut self) {
        self.disposed = true;
        self.gesture.clear();
        self.counter_hide.cancel();
        self.preload.cancel();
        if let Some(sidebar) = self.sidebar.as_mut() {
            sidebar.cancel_timers();
        }
        self.start_listeners.clear();
        self.end_listeners.clear();
        self.deferred.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const SLIDE_MS: u64 = 1000;

    #[derive(Default)]
    struct RecordingLoader(Vec<String>);

    impl ImageLoader for RecordingLoader {
        fn preload(&mut self, source: &str) {
            self.0.push(source.to_string());
        }
    }

    struct Harness {
        page: Page,
        deck: SlideDeck,
        loader: RecordingLoader,
        now: Instant,
        starts: Rc<RefCell<Vec<usize>>>,
        ends: Rc<RefCell<Vec<usize>>>,
        counter: ElementId,
        sidebar: ElementId,
    }

    impl Harness {
        fn new(count: usize, start_index: usize) -> Self {
            Self::with_device(count, start_index, false)
        }

        fn with_device(count: usize, start_index: usize, touch: bool) -> Self {
            let mut page = Page::new();
            page.create_with_id("main", "app-main");
            let counter = page.create_with_id("span", "counter");
            let sidebar = page.create_with_id("nav", "sidebar");
            let slides = (0..count)
                .map(|i| {
                    page.create_with_id("section", &format!("slide-{i}"));
                    Slide {
                        title: Some(format!("Slide {i}")),
                        image_source: format!("img-{i}.jpg"),
                        content_selector: Some(format!("#slide-{i}")),
                    }
                })
                .collect();
            let options = DeckOptions {
                counter_selector: Some("#counter".into()),
                sidebar_selector: Some("#sidebar".into()),
                transition_duration: Duration::from_millis(SLIDE_MS),
                start_index,
                ..Default::default()
            };
            let now = Instant::now();
            let probe = move || touch;
            let mut deck = SlideDeck::create(&mut page, slides, options, &probe, now);

            let starts = Rc::new(RefCell::new(Vec::new()));
            let ends = Rc::new(RefCell::new(Vec::new()));
            let s = Rc::clone(&starts);
            deck.on_transition_start(move |_, i| s.borrow_mut().push(i));
            let e = Rc::clone(&ends);
            deck.on_transition_end(move |_, i| e.borrow_mut().push(i));

            let mut h = Self {
                page,
                deck,
                loader: RecordingLoader::default(),
                now,
                starts,
                ends,
                counter,
                sidebar,
            };
            h.advance(0);
            h.settle();
            h
        }

        fn send(&mut self, event: InputEvent) -> bool {
            let mut dispatch = Dispatch::new(event);
            self.deck
                .handle_input(&mut self.page, &mut dispatch, self.now);
            dispatch.default_prevented()
        }

        fn wheel(&mut self, delta_y: f32) {
            assert!(self.send(InputEvent::Wheel { delta_y }));
            self.advance(16);
        }

        fn key(&mut self, key: Key) {
            self.send(InputEvent::Key(key));
            self.advance(16);
        }

        fn advance(&mut self, ms: u64) {
            self.now += Duration::from_millis(ms);
            self.deck.frame(&mut self.page, self.now);
            self.deck.tick(&mut self.page, &mut self.loader, self.now);
            for event in self.page.advance(self.now) {
                self.deck.handle_page_event(&mut self.page, &event);
            }
        }

        fn settle(&mut self) {
            self.advance(SLIDE_MS);
        }

        fn background(&self) -> Option<&str> {
            let container = self.page.query("#app-main").unwrap();
            self.page.style(container, BACKGROUND)
        }

        fn opacity_of(&self, selector: &str) -> Option<&str> {
            let el = self.page.query(selector).unwrap();
            self.page.style(el, "opacity")
        }

        fn balanced(&self) -> bool {
            self.starts.borrow().len() == self.ends.borrow().len()
        }
    }

    #[test]
    fn test_initial_entry_without_input() {
        let h = Harness::new(4, 0);
        assert_eq!(h.deck.phase(), DeckPhase::Idle);
        assert_eq!(h.background(), Some("url(\"img-0.jpg\")"));
        assert_eq!(h.page.text(h.counter), "1/4");
        assert_eq!(h.opacity_of("#slide-0"), Some("1"));
        assert_eq!(*h.starts.borrow(), vec![0]);
        assert_eq!(*h.ends.borrow(), vec![0]);
    }

    #[test]
    fn test_start_index_is_clamped() {
        let h = Harness::new(3, 10);
        assert_eq!(h.deck.current_index(), 2);
        assert_eq!(h.page.text(h.counter), "3/3");
    }

    #[test]
    fn test_velocity_threshold_is_strict() {
        let mut h = Harness::new(4, 0);
        h.wheel(5.0);
        assert_eq!(h.deck.phase(), DeckPhase::Idle);
        assert_eq!(h.deck.current_index(), 0);

        h.wheel(6.0);
        assert_eq!(h.deck.phase(), DeckPhase::Transitioning);
        assert_eq!(h.deck.current_index(), 1);
    }

    #[test]
    fn test_transition_sequence() {
        let mut h = Harness::new(4, 0);
        h.wheel(40.0);
        assert_eq!(h.opacity_of("#slide-0"), Some("0"));
        assert_eq!(h.opacity_of("#slide-1"), Some("1"));
        assert_eq!(h.background(), Some("url(\"img-1.jpg\")"));
        assert_eq!(h.page.text(h.counter), "2/4");
        // Start fires on commit, end only after the container transition
        assert_eq!(*h.starts.borrow(), vec![0, 1]);
        assert_eq!(*h.ends.borrow(), vec![0]);

        h.settle();
        assert_eq!(h.deck.phase(), DeckPhase::Idle);
        assert_eq!(*h.ends.borrow(), vec![0, 1]);
    }

    #[test]
    fn test_input_during_transition_is_dropped() {
        let mut h = Harness::new(4, 0);
        h.wheel(40.0);
        for _ in 0..10 {
            h.wheel(40.0);
            h.key(Key::ArrowRight);
            assert_eq!(h.deck.current_index(), 1);
        }
        h.settle();
        assert!(h.balanced());
        assert_eq!(h.starts.borrow().len(), 2);

        h.wheel(40.0);
        assert_eq!(h.deck.current_index(), 2);
    }

    #[test]
    fn test_pending_deltas_coalesce_to_latest() {
        let mut h = Harness::new(4, 1);
        h.send(InputEvent::Wheel { delta_y: 30.0 });
        h.send(InputEvent::Wheel { delta_y: -30.0 });
        h.advance(16);
        assert_eq!(h.deck.current_index(), 0);
        assert_eq!(h.starts.borrow().len(), 2);
    }

    #[test]
    fn test_gestures_stop_at_both_ends() {
        let mut h = Harness::new(3, 0);
        h.wheel(-40.0);
        assert_eq!(h.deck.current_index(), 0);
        assert_eq!(h.deck.phase(), DeckPhase::Idle);

        let mut h = Harness::new(3, 2);
        h.wheel(40.0);
        assert_eq!(h.deck.current_index(), 2);
        assert_eq!(h.deck.phase(), DeckPhase::Idle);
    }

    #[test]
    fn test_keyboard_wraps_at_both_ends() {
        let mut h = Harness::new(3, 2);
        h.key(Key::ArrowRight);
        assert_eq!(h.deck.current_index(), 0);
        h.settle();
        h.key(Key::ArrowLeft);
        assert_eq!(h.deck.current_index(), 2);
        h.settle();
        assert_eq!(h.page.text(h.counter), "3/3");
        assert!(h.balanced());
    }

    #[test]
    fn test_keyboard_ignores_velocity_threshold() {
        let mut h = Harness::new(3, 0);
        h.key(Key::ArrowRight);
        assert_eq!(h.deck.current_index(), 1);
    }

    #[test]
    fn test_counter_tracks_every_commit() {
        let mut h = Harness::new(5, 0);
        for expected in 2..=5 {
            h.wheel(50.0);
            assert_eq!(h.page.text(h.counter), format!("{expected}/5"));
            h.settle();
        }
    }

    #[test]
    fn test_touch_swipe_up_goes_next() {
        let mut h = Harness::new(3, 0);
        h.send(InputEvent::TouchStart { y: 600.0 });
        assert!(h.send(InputEvent::TouchMove { y: 560.0 }));
        h.advance(16);
        assert_eq!(h.deck.current_index(), 1);
        h.settle();

        h.send(InputEvent::TouchStart { y: 200.0 });
        h.send(InputEvent::TouchMove { y: 300.0 });
        h.advance(16);
        assert_eq!(h.deck.current_index(), 0);
    }

    #[test]
    fn test_counter_auto_hides_after_quiet_period() {
        let mut h = Harness::new(4, 0);
        h.wheel(40.0);
        assert_eq!(h.page.style(h.counter, "opacity"), Some("1"));
        h.advance(1500);
        assert_eq!(h.page.style(h.counter, "opacity"), Some("1"));
        h.advance(600);
        assert_eq!(h.page.style(h.counter, "opacity"), Some("0"));
    }

    #[test]
    fn test_new_reveal_reschedules_hide() {
        let mut h = Harness::new(4, 0);
        h.wheel(40.0);
        h.settle();
        h.wheel(40.0);
        // 2s after the first reveal, ~1s after the second
        h.advance(900);
        assert_eq!(h.page.style(h.counter, "opacity"), Some("1"));
        h.advance(1200);
        assert_eq!(h.page.style(h.counter, "opacity"), Some("0"));
    }

    #[test]
    fn test_sidebar_items_and_click() {
        let mut h = Harness::new(4, 0);
        let items = h.deck.sidebar().unwrap().items().to_vec();
        assert_eq!(items.len(), 4);
        assert_eq!(h.page.attribute(items[2], "data-index"), Some("2"));
        assert_eq!(h.page.attribute(items[2], "data-title"), Some("Slide 2"));
        assert!(h.page.has_class(items[0], sidebar::ACTIVE_CLASS));

        h.send(InputEvent::Click { target: items[2] });
        assert_eq!(h.deck.current_index(), 2);
        assert!(!h.page.has_class(items[0], sidebar::ACTIVE_CLASS));
        assert!(h.page.has_class(items[2], sidebar::ACTIVE_CLASS));

        // Click while transitioning is ignored
        h.send(InputEvent::Click { target: items[3] });
        assert_eq!(h.deck.current_index(), 2);
        h.settle();
        h.send(InputEvent::Click { target: items[3] });
        assert_eq!(h.deck.current_index(), 3);
    }

    #[test]
    fn test_sidebar_stays_visible_while_hovered() {
        let mut h = Harness::new(4, 0);
        let root = h.sidebar;
        h.wheel(40.0);
        h.send(InputEvent::PointerEnter { target: root });
        h.advance(5000);
        assert!(h.page.has_class(root, sidebar::VISIBLE_CLASS));

        h.send(InputEvent::PointerLeave { target: root });
        h.advance(1999);
        assert!(h.page.has_class(root, sidebar::VISIBLE_CLASS));
        h.advance(1);
        assert!(!h.page.has_class(root, sidebar::VISIBLE_CLASS));
        let list = h.deck.sidebar().unwrap().list();
        assert_eq!(h.page.style(list, "opacity"), Some("0"));
    }

    #[test]
    fn test_sidebar_icon_survives_auto_hide() {
        let mut h = Harness::new(3, 0);
        let (list, icon) = {
            let sidebar = h.deck.sidebar().unwrap();
            (sidebar.list(), sidebar.icon())
        };
        assert_eq!(h.page.children(h.sidebar), &[list, icon]);
        assert!(h.page.has_class(icon, sidebar::ICON_CLASS));

        h.wheel(40.0);
        h.settle();
        assert_eq!(h.page.style(list, "opacity"), Some("1"));
        h.advance(5000);
        assert_eq!(h.page.style(list, "opacity"), Some("0"));
        assert_eq!(h.page.opacity(list, h.now), 0.0);
        assert_eq!(h.page.opacity(icon, h.now), 1.0);
        assert_eq!(h.page.opacity(h.sidebar, h.now), 1.0);
        // Clicking the icon is not a navigation target
        h.send(InputEvent::Click { target: icon });
        assert_eq!(h.deck.current_index(), 1);
    }

    #[test]
    fn test_touch_device_has_no_sidebar() {
        let h = Harness::with_device(3, 0, true);
        assert!(h.deck.sidebar().is_none());
        assert!(h.page.children(h.sidebar).is_empty());
    }

    #[test]
    fn test_images_preload_after_short_delay() {
        let h = Harness::new(3, 0);
        assert_eq!(h.loader.0, vec!["img-0.jpg", "img-1.jpg", "img-2.jpg"]);
        let content = h.page.query("#slide-2").unwrap();
        assert_eq!(
            h.page.style(content, "transition"),
            Some("all 1000ms ease")
        );
    }

    #[test]
    fn test_missing_optional_elements_degrade_quietly() {
        let mut page = Page::new();
        page.create_with_id("main", "app-main");
        let slides = vec![
            Slide {
                title: None,
                image_source: "a.jpg".into(),
                content_selector: Some("#gone".into()),
            },
            Slide {
                title: None,
                image_source: "b.jpg".into(),
                content_selector: None,
            },
        ];
        let options = DeckOptions {
            counter_selector: Some("#nope".into()),
            sidebar_selector: Some("#nope".into()),
            ..Default::default()
        };
        let now = Instant::now();
        let mut deck = SlideDeck::create(&mut page, slides, options, &|| false, now);
        deck.frame(&mut page, now);
        for event in page.advance(now + Duration::from_secs(2)) {
            deck.handle_page_event(&mut page, &event);
        }
        assert_eq!(deck.phase(), DeckPhase::Idle);
        assert!(deck.navigate(&mut page, Direction::Next, now + Duration::from_secs(2)));
        assert_eq!(deck.current_index(), 1);
    }

    #[test]
    fn test_missing_container_still_balances_events() {
        let mut page = Page::new();
        let slides = vec![
            Slide {
                title: None,
                image_source: "a.jpg".into(),
                content_selector: None,
            },
            Slide {
                title: None,
                image_source: "b.jpg".into(),
                content_selector: None,
            },
        ];
        let now = Instant::now();
        let mut deck =
            SlideDeck::create(&mut page, slides, DeckOptions::default(), &|| false, now);
        let count = Rc::new(RefCell::new((0, 0)));
        let c = Rc::clone(&count);
        deck.on_transition_start(move |_, _| c.borrow_mut().0 += 1);
        let c = Rc::clone(&count);
        deck.on_transition_end(move |_, _| c.borrow_mut().1 += 1);
        deck.frame(&mut page, now);
        assert_eq!(deck.phase(), DeckPhase::Idle);
        assert!(deck.navigate(&mut page, Direction::Next, now));
        assert_eq!(deck.phase(), DeckPhase::Idle);
        assert_eq!(*count.borrow(), (2, 2));
    }

    #[test]
    fn test_listeners_run_in_insertion_order() {
        let mut h = Harness::new(3, 0);
        let order = Rc::new(RefCell::new(Vec::new()));
        for tag in ["a", "b", "c"] {
            let o = Rc::clone(&order);
            h.deck.on_transition_start(move |_, _| o.borrow_mut().push(tag));
        }
        h.wheel(40.0);
        assert_eq!(*order.borrow(), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_unrelated_container_transition_does_not_end_slide() {
        let mut h = Harness::new(3, 0);
        let container = h.page.query("#app-main").unwrap();
        // The opacity fade finishes 16ms before the background does
        h.page.set_style(container, "opacity", "0.5", h.now);
        h.wheel(40.0);
        h.advance(SLIDE_MS - 10);
        assert_eq!(h.deck.phase(), DeckPhase::Transitioning);
        h.advance(10);
        assert_eq!(h.deck.phase(), DeckPhase::Idle);
    }

    #[test]
    fn test_dispose_ignores_further_input() {
        let mut h = Harness::new(3, 0);
        h.deck.dispose();
        assert!(!h.send(InputEvent::Wheel { delta_y: 50.0 }));
        h.advance(16);
        h.key(Key::ArrowRight);
        assert_eq!(h.deck.current_index(), 0);
    }
}
