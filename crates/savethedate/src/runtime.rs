//! Page bootstrap: builds the document for a site file, instantiates the
//! countdown and the deck or gallery, and drives them from the host loop.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::env::{Clock, DeviceProbe, ImageLoader};
use crate::fragment;
use crate::page::{
    Dispatch, Easing, ElementId, InputEvent, Page, TransitionProperty, TransitionTiming,
};
use crate::site::{Layout, SiteFile};
use crate::timing::Timeout;
use crate::widgets::countdown::Countdown;
use crate::widgets::deck::{DeckOptions, DeckPhase, Slide, SlideDeck};
use crate::widgets::gallery::{GalleryOptions, PhotoGallery};

pub const CONTAINER_ID: &str = "app-main";
pub const COUNTER_ID: &str = "app-photo-gallery-counter";
pub const SIDEBAR_ID: &str = "slide-deck-sidebar";
pub const HINT_ID: &str = "scroll-instructions";
pub const TITLE_ID: &str = "site-title";
pub const COUNTDOWN_ID: &str = "countdown-timer-time";
pub const GALLERY_CONTENT_ID: &str = "app-content";

const REVEAL_DELAY: Duration = Duration::from_millis(1000);
const CHROME_FADE: Duration = Duration::from_millis(300);
const HINT_ANIMATION: &str = "bounce 2s infinite";
/// Gallery pages are taller than the window so they can be scrolled to the
/// bottom before the gallery takes over the wheel.
const GALLERY_PAGE_HEIGHT: f32 = 2.0;

pub fn slide_id(index: usize) -> String {
    format!("slide-{index}")
}

/// Collaborators handed to [`Site::mount`].
pub struct MountEnv<'a> {
    pub clock: Box<dyn Clock>,
    pub device: &'a dyn DeviceProbe,
    pub loader: &'a mut dyn ImageLoader,
}

enum Presenter {
    Deck(SlideDeck),
    Gallery(PhotoGallery),
}

enum Signal {
    SlideEntered(usize),
    GalleryActive(bool),
}

/// A mounted save-the-date page.
pub struct Site {
    page: Page,
    presenter: Presenter,
    countdown: Option<Countdown>,
    clock: Box<dyn Clock>,
    layout: Layout,
    container: Option<ElementId>,
    hint: Option<ElementId>,
    hint_hidden: bool,
    reveal: Timeout,
    signals: Rc<RefCell<Vec<Signal>>>,
    shut_down: bool,
}

impl Site {
    /// Build the document into `page` and start every widget. The start
    /// slide comes from the page's location fragment.
    pub fn mount(site: &SiteFile, mut page: Page, env: MountEnv<'_>, now: Instant) -> Self {
        let MountEnv {
            clock,
            device,
            loader,
        } = env;

        let container = page.create_with_id("main", CONTAINER_ID);
        page.set_style(container, "opacity", "0", now);

        let title = page.create_with_id("h1", TITLE_ID);
        page.set_text(title, site.title());
        page.append_child(container, title);

        if site.countdown.is_some() {
            let header = page.create_with_id("header", "countdown");
            let time = page.create_with_id("span", COUNTDOWN_ID);
            page.append_child(header, time);
            page.append_child(container, header);
        }

        let counter = page.create_with_id("span", COUNTER_ID);
        page.set_style(counter, "opacity", "0", now);
        page.set_transition(counter, fade(CHROME_FADE));
        page.append_child(container, counter);

        let hint = page.create_with_id("div", HINT_ID);
        page.set_text(
            hint,
            match site.layout {
                Layout::Deck => "Scroll or swipe to explore",
                Layout::Gallery => "Scroll down for photos",
            },
        );
        page.set_style(hint, "animation", HINT_ANIMATION, now);
        page.append_child(container, hint);

        let signals = Rc::new(RefCell::new(Vec::new()));
        let start_index = fragment::start_index(page.fragment(), site.slides.len());

        let presenter = match site.layout {
            Layout::Deck => {
                let sidebar = page.create_with_id("nav", SIDEBAR_ID);
                page.set_transition(sidebar, fade(CHROME_FADE));
                page.append_child(container, sidebar);

                let slides = build_slide_sections(site, &mut page, container, now);
                let options = DeckOptions {
                    counter_selector: Some(format!("#{COUNTER_ID}")),
                    sidebar_selector: Some(format!("#{SIDEBAR_ID}")),
                    transition_duration: Duration::from_millis(site.deck.transition_ms),
                    transition_easing: Easing::from_name(&site.deck.easing),
                    velocity_threshold: site.deck.velocity_threshold,
                    start_index,
                    ..Default::default()
                };
                let mut deck = SlideDeck::create(&mut page, slides, options, device, now);
                let queue = Rc::clone(&signals);
                deck.on_transition_start(move |_, index| {
                    queue.borrow_mut().push(Signal::SlideEntered(index));
                });
                deck.on_transition_end(|_, index| debug!(index, "slide settled"));
                Presenter::Deck(deck)
            }
            Layout::Gallery => {
                let content = page.create_with_id("section", GALLERY_CONTENT_ID);
                let slide_away = TransitionTiming::all(CHROME_FADE * 2, Easing::Ease);
                page.set_transition(content, slide_away);
                for slide in &site.slides {
                    let (heading, body) = (slide.heading.as_deref(), slide.body.as_deref());
                    append_copy(&mut page, content, heading, body);
                }
                page.append_child(container, content);
                page.set_transition(
                    container,
                    TransitionTiming::all(
                        Duration::from_millis(site.gallery.transition_ms),
                        Easing::Ease,
                    ),
                );

                let options = GalleryOptions {
                    content_selector: Some(format!("#{GALLERY_CONTENT_ID}")),
                    counter_selector: Some(format!("#{COUNTER_ID}")),
                    distance_per_image: site.gallery.distance_per_image,
                    max_step: site.gallery.max_step,
                    ..Default::default()
                };
                let mut gallery =
                    PhotoGallery::create(&mut page, site.image_sources(), options, loader);
                let queue = Rc::clone(&signals);
                gallery.on_active_change(move |_, active| {
                    queue.borrow_mut().push(Signal::GalleryActive(active));
                });
                Presenter::Gallery(gallery)
            }
        };

        let countdown = site
            .countdown_options()
            .map(|options| Countdown::create(&mut page, options, clock.as_ref(), now));

        info!(
            title = site.title(),
            layout = %site.layout,
            slides = site.slides.len(),
            start_index,
            countdown = countdown.as_ref().is_some_and(Countdown::is_running),
            "site mounted"
        );

        let mut mounted = Self {
            page,
            presenter,
            countdown,
            clock,
            layout: site.layout,
            container: Some(container),
            hint: Some(hint),
            hint_hidden: false,
            reveal: Timeout::new(REVEAL_DELAY, now),
            signals,
            shut_down: false,
        };
        mounted.resize(800.0);
        mounted
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn deck(&self) -> Option<&SlideDeck> {
        match &self.presenter {
            Presenter::Deck(deck) => Some(deck),
            Presenter::Gallery(_) => None,
        }
    }

    pub fn gallery(&self) -> Option<&PhotoGallery> {
        match &self.presenter {
            Presenter::Gallery(gallery) => Some(gallery),
            Presenter::Deck(_) => None,
        }
    }

    pub fn hint_hidden(&self) -> bool {
        self.hint_hidden
    }

    /// Window height changed.
    pub fn resize(&mut self, viewport_height: f32) {
        let scroll_height = match self.layout {
            Layout::Deck => viewport_height,
            Layout::Gallery => viewport_height * GALLERY_PAGE_HEIGHT,
        };
        self.page.set_viewport(viewport_height, scroll_height);
    }

    /// Route one input event to the active widget. Wheel input nobody
    /// claimed scrolls the page.
    pub fn handle_input(&mut self, event: InputEvent, now: Instant) -> bool {
        if self.shut_down {
            return false;
        }
        let mut dispatch = Dispatch::new(event);
        match &mut self.presenter {
            Presenter::Deck(deck) => deck.handle_input(&mut self.page, &mut dispatch, now),
            Presenter::Gallery(gallery) => {
                gallery.handle_input(&mut self.page, &mut dispatch, now)
            }
        }
        if let InputEvent::Wheel { delta_y } = event {
            if !dispatch.default_prevented() {
                self.page.scroll_by(delta_y);
            }
        }
        self.drain_signals(now);
        dispatch.default_prevented()
    }

    /// One host frame: animation-frame work, then timers, then transitions
    /// finishing at `now` and their listeners.
    pub fn update(&mut self, now: Instant, loader: &mut dyn ImageLoader) {
        if self.shut_down {
            return;
        }
        match &mut self.presenter {
            Presenter::Deck(deck) => deck.frame(&mut self.page, now),
            Presenter::Gallery(gallery) => gallery.frame(&mut self.page, now),
        }
        self.drain_signals(now);

        if let Presenter::Deck(deck) = &mut self.presenter {
            deck.tick(&mut self.page, loader, now);
        }
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.tick(&mut self.page, self.clock.as_ref(), now);
        }
        if self.reveal.due(now) {
            if let Some(container) = self.container {
                self.page.set_style(container, "opacity", "1", now);
            }
        }

        for event in self.page.advance(now) {
            match &mut self.presenter {
                Presenter::Deck(deck) => deck.handle_page_event(&mut self.page, &event),
                Presenter::Gallery(gallery) => gallery.handle_page_event(&event),
            }
        }
        self.drain_signals(now);
    }

    /// Whether the host has to keep repainting.
    pub fn is_animating(&self) -> bool {
        let sliding = self
            .deck()
            .is_some_and(|deck| deck.phase() == DeckPhase::Transitioning);
        sliding || self.page.has_active_transitions() || self.reveal.is_pending()
    }

    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        match &mut self.presenter {
            Presenter::Deck(deck) => deck.dispose(),
            Presenter::Gallery(gallery) => gallery.dispose(),
        }
        if let Some(countdown) = self.countdown.as_mut() {
            countdown.dispose();
        }
        self.reveal.cancel();
        self.signals.borrow_mut().clear();
        debug!("site shut down");
    }

    fn drain_signals(&mut self, now: Instant) {
        let signals = std::mem::take(&mut *self.signals.borrow_mut());
        for signal in signals {
            match signal {
                Signal::SlideEntered(index) => {
                    self.page.set_fragment(&fragment::for_index(index));
                    if index > 0 {
                        self.hide_hint(now);
                    }
                }
                Signal::GalleryActive(active) => {
                    if let Some(gallery) = self.gallery() {
                        debug!(active, offset = gallery.scroll_offset(), "gallery engagement");
                    }
                    if active {
                        self.hide_hint(now);
                    }
                }
            }
        }
    }

    fn hide_hint(&mut self, now: Instant) {
        if self.hint_hidden {
            return;
        }
        self.hint_hidden = true;
        if let Some(hint) = self.hint {
            self.page.set_style(hint, "opacity", "0", now);
            self.page.set_style(hint, "animation", "", now);
        }
        debug!("scroll hint hidden");
    }
}

fn fade(duration: Duration) -> TransitionTiming {
    TransitionTiming {
        property: TransitionProperty::Named("opacity".to_string()),
        duration,
        easing: Easing::Ease,
    }
}

/// One `#slide-N` section per slide, hidden until the deck shows it.
fn build_slide_sections(
    site: &SiteFile,
    page: &mut Page,
    container: ElementId,
    now: Instant,
) -> Vec<Slide> {
    site.slides
        .iter()
        .enumerate()
        .map(|(i, entry)| {
            let id = slide_id(i);
            let section = page.create_with_id("section", &id);
            page.set_style(section, "opacity", "0", now);
            append_copy(page, section, entry.heading.as_deref(), entry.body.as_deref());
            page.append_child(container, section);
            Slide {
                title: entry.title.clone(),
                image_source: site.resolve_image(&entry.image),
                content_selector: Some(format!("#{id}")),
            }
        })
        .collect()
}

fn append_copy(page: &mut Page, parent: ElementId, heading: Option<&str>, body: Option<&str>) {
    if let Some(text) = heading {
        let h = page.create_element("h2");
        page.set_text(h, text);
        page.append_child(parent, h);
    }
    if let Some(text) = body {
        let p = page.create_element("p");
        page.set_text(p, text);
        page.append_child(parent, p);
    }
}
