//! A small retained document the widgets render into.
//!
//! Elements live in an arena and are addressed by [`ElementId`]. Only the
//! parts of a browser document the widgets rely on are modelled: `#id`
//! lookup, inline styles, text, attributes, classes, the location fragment,
//! scroll metrics and CSS transitions on style writes.

pub mod input;
pub mod transition;

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Instant;

pub use input::{Dispatch, InputEvent, Key};
pub use transition::{ActiveTransition, Easing, TransitionProperty, TransitionTiming};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(usize);

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: BTreeSet<String>,
    pub attributes: BTreeMap<String, String>,
    pub style: BTreeMap<String, String>,
    pub text: String,
    pub children: Vec<ElementId>,
    pub parent: Option<ElementId>,
    pub transition: Option<TransitionTiming>,
    active: Vec<ActiveTransition>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    TransitionEnd { target: ElementId, property: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ScrollMetrics {
    pub top: f32,
    pub viewport_height: f32,
    pub scroll_height: f32,
}

impl ScrollMetrics {
    pub fn max_top(&self) -> f32 {
        (self.scroll_height - self.viewport_height).max(0.0)
    }

    pub fn is_scrolled_to_bottom(&self) -> bool {
        self.top + self.viewport_height >= self.scroll_height
    }
}

#[derive(Debug, Default)]
pub struct Page {
    elements: Vec<Element>,
    ids: HashMap<String, ElementId>,
    fragment: String,
    scroll: ScrollMetrics,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_element(&mut self, tag: &str) -> ElementId {
        let id = ElementId(self.elements.len());
        self.elements.push(Element {
            tag: tag.to_string(),
            ..Default::default()
        });
        id
    }

    /// Create an element and register it under `#id`.
    pub fn create_with_id(&mut self, tag: &str, id: &str) -> ElementId {
        let el = self.create_element(tag);
        self.set_id(el, id);
        el
    }

    pub fn element(&self, el: ElementId) -> Option<&Element> {
        self.elements.get(el.0)
    }

    pub fn set_id(&mut self, el: ElementId, id: &str) {
        let Some(element) = self.elements.get_mut(el.0) else {
            return;
        };
        if let Some(old) = element.id.replace(id.to_string()) {
            self.ids.remove(&old);
        }
        self.ids.insert(id.to_string(), el);
    }

    /// Look up an element by `#id` selector. Any other selector syntax
    /// matches nothing.
    pub fn query(&self, selector: &str) -> Option<ElementId> {
        let id = selector.trim().strip_prefix('#')?;
        self.ids.get(id).copied()
    }

    pub fn append_child(&mut self, parent: ElementId, child: ElementId) {
        if parent == child || parent.0 >= self.elements.len() || child.0 >= self.elements.len() {
            return;
        }
        if let Some(old) = self.elements[child.0].parent.take() {
            self.elements[old.0].children.retain(|c| *c != child);
        }
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
    }

    pub fn children(&self, el: ElementId) -> &[ElementId] {
        self.element(el).map(|e| e.children.as_slice()).unwrap_or(&[])
    }

    pub fn set_text(&mut self, el: ElementId, text: &str) {
        if let Some(element) = self.elements.get_mut(el.0) {
            element.text = text.to_string();
        }
    }

    pub fn text(&self, el: ElementId) -> &str {
        self.element(el).map(|e| e.text.as_str()).unwrap_or("")
    }

    pub fn set_attribute(&mut self, el: ElementId, name: &str, value: &str) {
        if let Some(element) = self.elements.get_mut(el.0) {
            element
                .attributes
                .insert(name.to_string(), value.to_string());
        }
    }

    pub fn attribute(&self, el: ElementId, name: &str) -> Option<&str> {
        self.element(el)?.attributes.get(name).map(String::as_str)
    }

    pub fn add_class(&mut self, el: ElementId, class: &str) {
        if let Some(element) = self.elements.get_mut(el.0) {
            element.classes.insert(class.to_string());
        }
    }

    pub fn remove_class(&mut self, el: ElementId, class: &str) {
        if let Some(element) = self.elements.get_mut(el.0) {
            element.classes.remove(class);
        }
    }

    pub fn has_class(&self, el: ElementId, class: &str) -> bool {
        self.element(el).is_some_and(|e| e.classes.contains(class))
    }

    pub fn style(&self, el: ElementId, property: &str) -> Option<&str> {
        self.element(el)?.style.get(property).map(String::as_str)
    }

    pub fn set_transition(&mut self, el: ElementId, timing: TransitionTiming) {
        if let Some(element) = self.elements.get_mut(el.0) {
            element
                .style
                .insert("transition".to_string(), timing.to_string());
            element.transition = Some(timing);
        }
    }

    pub fn transition(&self, el: ElementId) -> Option<&TransitionTiming> {
        self.element(el)?.transition.as_ref()
    }

    /// Write an inline style property.
    ///
    /// Returns `true` when the write started a CSS transition on `el`. A
    /// transition starts when the element's timing covers `property`, has a
    /// non-zero duration and the value actually changed. A property already
    /// in flight restarts from its current interpolated value.
    pub fn set_style(&mut self, el: ElementId, property: &str, value: &str, now: Instant) -> bool {
        let Some(element) = self.elements.get_mut(el.0) else {
            return false;
        };
        let previous = element
            .style
            .insert(property.to_string(), value.to_string());
        if previous.as_deref() == Some(value) {
            return false;
        }
        let Some(timing) = element
            .transition
            .as_ref()
            .filter(|t| t.property.covers(property) && !t.duration.is_zero())
        else {
            return false;
        };

        let from = match element.active.iter().position(|t| t.property == property) {
            Some(i) => {
                let running = element.active.remove(i);
                running
                    .numeric_value(now)
                    .map(|v| v.to_string())
                    .or(previous)
            }
            None => previous,
        };
        let active = ActiveTransition::new(property, from, value, timing, now);
        element.active.push(active);
        true
    }

    pub fn active_transition(&self, el: ElementId, property: &str) -> Option<&ActiveTransition> {
        self.element(el)?
            .active
            .iter()
            .find(|t| t.property == property)
    }

    pub fn has_active_transitions(&self) -> bool {
        self.elements.iter().any(|e| !e.active.is_empty())
    }

    /// Current opacity of `el`, interpolated while a transition runs.
    pub fn opacity(&self, el: ElementId, now: Instant) -> f32 {
        if let Some(value) = self
            .active_transition(el, "opacity")
            .and_then(|t| t.numeric_value(now))
        {
            return value.clamp(0.0, 1.0);
        }
        self.style(el, "opacity")
            .and_then(|v| v.trim().parse::<f32>().ok())
            .unwrap_or(1.0)
            .clamp(0.0, 1.0)
    }

    /// Finish every transition due at `now`, in completion order.
    pub fn advance(&mut self, now: Instant) -> Vec<PageEvent> {
        let mut finished = Vec::new();
        for (index, element) in self.elements.iter_mut().enumerate() {
            element.active.retain(|t| {
                if t.is_complete(now) {
                    finished.push((t.start + t.duration, ElementId(index), t.property.clone()));
                    false
                } else {
                    true
                }
            });
        }
        finished.sort_by_key(|(end, _, _)| *end);
        finished
            .into_iter()
            .map(|(_, target, property)| PageEvent::TransitionEnd { target, property })
            .collect()
    }

    pub fn fragment(&self) -> &str {
        &self.fragment
    }

    pub fn set_fragment(&mut self, fragment: &str) {
        self.fragment = fragment.to_string();
    }

    pub fn scroll(&self) -> ScrollMetrics {
        self.scroll
    }

    pub fn set_viewport(&mut self, viewport_height: f32, scroll_height: f32) {
        self.scroll.viewport_height = viewport_height;
        self.scroll.scroll_height = scroll_height.max(viewport_height);
        self.scroll.top = self.scroll.top.clamp(0.0, self.scroll.max_top());
    }

    pub fn scroll_by(&mut self, delta: f32) {
        self.scroll.top = (self.scroll.top + delta).clamp(0.0, self.scroll.max_top());
    }
}

/// `url("...")` value for a `background-image` style.
pub fn css_url(source: &str) -> String {
    format!("url(\"{source}\")")
}

pub fn parse_css_url(value: &str) -> Option<&str> {
    let inner = value.trim().strip_prefix("url(")?.strip_suffix(')')?;
    let inner = inner.trim();
    let unquoted = inner
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .or_else(|| inner.strip_prefix('\'').and_then(|s| s.strip_suffix('\'')))
        .unwrap_or(inner);
    Some(unquoted)
}

/// Percentage of a `translateY(...%)` transform, if that is what `value` is.
pub fn parse_translate_y_percent(value: &str) -> Option<f32> {
    value
        .trim()
        .strip_prefix("translateY(")?
        .strip_suffix("%)")?
        .trim()
        .parse()
        .ok()
}
