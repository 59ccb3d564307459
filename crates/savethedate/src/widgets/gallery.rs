//! Scroll-coupled photo gallery.
//!
//! Once the page is scrolled to the bottom, wheel input stops scrolling the
//! page and instead advances a continuous offset that selects the background
//! image. There is no admission gate. The container's CSS transition only
//! holds back redundant background writes while a cross-fade is running.

use std::time::Instant;

use tracing::{debug, warn};

use crate::env::ImageLoader;
use crate::page::{Dispatch, ElementId, InputEvent, Page, PageEvent, css_url};

const BACKGROUND: &str = "background-image";
const CONTENT_OUT: &str = "translateY(-200%)";

#[derive(Debug, Clone)]
pub struct GalleryOptions {
    pub container_selector: String,
    pub content_selector: Option<String>,
    pub counter_selector: Option<String>,
    /// Offset needed to move from one image to the next.
    pub distance_per_image: f32,
    /// Upper bound on the offset added by a single wheel tick.
    pub max_step: f32,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            container_selector: "#app-main".to_string(),
            content_selector: None,
            counter_selector: None,
            distance_per_image: 200.0,
            max_step: 5.0,
        }
    }
}

pub type ActiveListener = Box<dyn FnMut(&mut Page, bool)>;

pub struct PhotoGallery {
    images: Vec<String>,
    options: GalleryOptions,
    container: Option<ElementId>,
    content: Option<ElementId>,
    counter: Option<ElementId>,
    offset: f32,
    active: bool,
    transitioning: bool,
    shown: Option<usize>,
    frame_requested: bool,
    listeners: Vec<ActiveListener>,
    disposed: bool,
}

impl PhotoGallery {
    pub fn create(
        page: &mut Page,
        images: Vec<String>,
        options: GalleryOptions,
        loader: &mut dyn ImageLoader,
    ) -> Self {
        let container = page.query(&options.container_selector);
        if container.is_none() {
            warn!(selector = %options.container_selector, "gallery container not found");
        }
        let content = options
            .content_selector
            .as_deref()
            .and_then(|s| page.query(s));
        let counter = options
            .counter_selector
            .as_deref()
            .and_then(|s| page.query(s));

        for image in &images {
            loader.preload(image);
        }

        let mut gallery = Self {
            images,
            options,
            container,
            content,
            counter,
            offset: 0.0,
            active: false,
            transitioning: false,
            shown: None,
            frame_requested: false,
            listeners: Vec::new(),
            disposed: false,
        };
        gallery.request_image();
        gallery
    }

    pub fn on_active_change(&mut self, listener: impl FnMut(&mut Page, bool) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    pub fn scroll_offset(&self) -> f32 {
        self.offset
    }

    pub fn max_offset(&self) -> f32 {
        self.images.len() as f32 * self.options.distance_per_image
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn current_image_index(&self) -> usize {
        let last = self.images.len().saturating_sub(1);
        if self.options.distance_per_image <= 0.0 {
            return 0;
        }
        let position = (self.offset / self.options.distance_per_image).clamp(0.0, last as f32);
        position.floor() as usize
    }

    /// Engaged at the bottom of the page, except when scrolling up with
    /// nothing left to rewind.
    fn compute_is_active(&self, page: &Page, delta_y: f32) -> bool {
        page.scroll().is_scrolled_to_bottom() && (delta_y > 0.0 || self.offset > 0.0)
    }

    pub fn handle_input(&mut self, page: &mut Page, dispatch: &mut Dispatch, now: Instant) {
        if self.disposed {
            return;
        }
        let InputEvent::Wheel { delta_y } = dispatch.event else {
            return;
        };
        let active = self.compute_is_active(page, delta_y);
        self.set_active(page, active, now);
        if active {
            dispatch.prevent_default();
            let step = delta_y.min(self.options.max_step);
            self.offset = (self.offset + step).clamp(0.0, self.max_offset());
            self.request_image();
        }
    }

    fn request_image(&mut self) {
        if self.shown != Some(self.current_image_index()) && !self.transitioning {
            self.frame_requested = true;
        }
    }

    /// Animation-frame callback: writes the pending background, if any.
    pub fn frame(&mut self, page: &mut Page, now: Instant) {
        if !std::mem::take(&mut self.frame_requested) || self.disposed {
            return;
        }
        let index = self.current_image_index();
        let Some(source) = self.images.get(index) else {
            return;
        };
        self.shown = Some(index);
        if let Some(container) = self.container {
            if page.set_style(container, BACKGROUND, &css_url(source), now) {
                self.transitioning = true;
            }
        }
        if let Some(counter) = self.counter {
            page.set_text(counter, &format!("{}/{}", index + 1, self.images.len()));
        }
        debug!(index, offset = self.offset, "gallery image");
    }

    pub fn handle_page_event(&mut self, event: &PageEvent) {
        let PageEvent::TransitionEnd { target, property } = event;
        if Some(*target) != self.container || property != BACKGROUND {
            return;
        }
        self.transitioning = false;
        self.request_image();
    }

    fn set_active(&mut self, page: &mut Page, active: bool, now: Instant) {
        if self.active == active {
            return;
        }
        self.active = active;
        if let Some(content) = self.content {
            page.set_style(content, "transform", if active { CONTENT_OUT } else { "" }, now);
        }
        if let Some(counter) = self.counter {
            page.set_style(counter, "opacity", if active { "1" } else { "0" }, now);
        }
        for listener in &mut self.listeners {
            listener(page, active);
        }
    }

    pub fn dispose(&mut self) {
        self.disposed = true;
        self.frame_requested = false;
        self.listeners.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::NoopLoader;
    use crate::page::{Easing, TransitionTiming};
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::time::Duration;

    struct Harness {
        page: Page,
        gallery: PhotoGallery,
        now: Instant,
        counter: ElementId,
        content: ElementId,
    }

    impl Harness {
        fn new(images: usize, at_bottom: bool) -> Self {
            let mut page = Page::new();
            let container = page.create_with_id("main", "app-main");
            page.set_transition(
                container,
                TransitionTiming::all(Duration::from_millis(500), Easing::Ease),
            );
            let content = page.create_with_id("section", "content");
            let counter = page.create_with_id("span", "counter");
            page.set_viewport(800.0, if at_bottom { 800.0 } else { 1600.0 });

            let options = GalleryOptions {
                content_selector: Some("#content".into()),
                counter_selector: Some("#counter".into()),
                ..Default::default()
            };
            let images = (0..images).map(|i| format!("img-{i}.jpg")).collect();
            let gallery = PhotoGallery::create(&mut page, images, options, &mut NoopLoader);
            let mut h = Self {
                page,
                gallery,
                now: Instant::now(),
                counter,
                content,
            };
            h.advance(0);
            h
        }

        fn wheel(&mut self, delta_y: f32) -> bool {
            let mut dispatch = Dispatch::new(InputEvent::Wheel { delta_y });
            self.gallery
                .handle_input(&mut self.page, &mut dispatch, self.now);
            self.advance(16);
            dispatch.default_prevented()
        }

        fn advance(&mut self, ms: u64) {
            self.now += Duration::from_millis(ms);
            self.gallery.frame(&mut self.page, self.now);
            for event in self.page.advance(self.now) {
                self.gallery.handle_page_event(&event);
            }
        }

        fn background(&self) -> Option<&str> {
            let container = self.page.query("#app-main").unwrap();
            self.page.style(container, BACKGROUND)
        }
    }

    #[test]
    fn test_per_tick_step_is_capped() {
        let mut h = Harness::new(3, true);
        assert!(h.wheel(100.0));
        assert!(h.wheel(100.0));
        assert_eq!(h.gallery.scroll_offset(), 10.0);
        assert_eq!(h.gallery.current_image_index(), 0);

        for _ in 0..38 {
            h.wheel(100.0);
        }
        assert_eq!(h.gallery.scroll_offset(), 200.0);
        assert_eq!(h.gallery.current_image_index(), 1);
    }

    #[test]
    fn test_offset_clamps_to_last_image() {
        let mut h = Harness::new(3, true);
        for _ in 0..500 {
            h.wheel(100.0);
        }
        assert_eq!(h.gallery.scroll_offset(), h.gallery.max_offset());
        assert_eq!(h.gallery.current_image_index(), 2);
    }

    #[test]
    fn test_inactive_until_scrolled_to_bottom() {
        let mut h = Harness::new(3, false);
        assert!(!h.wheel(100.0));
        assert!(!h.gallery.is_active());
        assert_eq!(h.gallery.scroll_offset(), 0.0);
    }

    #[test]
    fn test_scrolling_up_at_zero_releases_control() {
        let mut h = Harness::new(3, true);
        assert!(h.wheel(20.0));
        assert!(h.gallery.is_active());
        // Upward deltas are not capped
        assert!(h.wheel(-20.0));
        assert_eq!(h.gallery.scroll_offset(), 0.0);
        assert!(!h.wheel(-20.0));
        assert!(!h.gallery.is_active());
    }

    #[test]
    fn test_active_state_moves_content_and_counter() {
        let mut h = Harness::new(3, true);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        h.gallery
            .on_active_change(move |_, active| s.borrow_mut().push(active));

        h.wheel(10.0);
        assert_eq!(h.page.style(h.content, "transform"), Some(CONTENT_OUT));
        assert_eq!(h.page.style(h.counter, "opacity"), Some("1"));

        h.wheel(-10.0);
        h.wheel(-10.0);
        assert_eq!(h.page.style(h.content, "transform"), Some(""));
        assert_eq!(h.page.style(h.counter, "opacity"), Some("0"));
        assert_eq!(*seen.borrow(), vec![true, false]);
    }

    #[test]
    fn test_background_follows_image_index() {
        let mut h = Harness::new(3, true);
        assert_eq!(h.background(), Some("url(\"img-0.jpg\")"));
        assert_eq!(h.page.text(h.counter), "1/3");

        for _ in 0..39 {
            h.wheel(100.0);
        }
        assert_eq!(h.background(), Some("url(\"img-0.jpg\")"));

        h.wheel(100.0);
        assert_eq!(h.gallery.current_image_index(), 1);
        assert_eq!(h.background(), Some("url(\"img-1.jpg\")"));
        assert_eq!(h.page.text(h.counter), "2/3");
    }

    #[test]
    fn test_pending_image_written_after_transition_end() {
        let mut h = Harness::new(3, true);
        for _ in 0..40 {
            h.wheel(100.0);
        }
        // The img-1 fade is still running
        h.gallery.offset = 400.0;
        h.gallery.request_image();
        h.advance(16);
        assert_eq!(h.background(), Some("url(\"img-1.jpg\")"));

        h.advance(500);
        h.advance(16);
        assert_eq!(h.background(), Some("url(\"img-2.jpg\")"));
    }
}
