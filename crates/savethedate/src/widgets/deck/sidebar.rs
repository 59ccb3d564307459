use std::time::{Duration, Instant};

use crate::page::{ElementId, Page};
use crate::timing::Debounce;

use super::Slide;

pub const ITEM_CLASS: &str = "slide-deck-sidebar-item";
pub const ICON_CLASS: &str = "slide-deck-sidebar-icon";
pub const ACTIVE_CLASS: &str = "active";
pub const VISIBLE_CLASS: &str = "visible";

/// Slide navigation list. Shown transiently after each transition and kept
/// open while the pointer is over it. The icon next to the list never fades,
/// so there is always something to point at.
#[derive(Debug)]
pub struct Sidebar {
    root: ElementId,
    list: ElementId,
    icon: ElementId,
    items: Vec<ElementId>,
    hovered: bool,
    hide: Debounce,
}

impl Sidebar {
    pub fn build(
        page: &mut Page,
        root: ElementId,
        slides: &[Slide],
        hide_after: Duration,
        now: Instant,
    ) -> Self {
        let list = page.create_element("ul");
        page.set_style(list, "opacity", "0", now);
        if let Some(timing) = page.transition(root).cloned() {
            page.set_transition(list, timing);
        }
        page.append_child(root, list);

        let icon = page.create_element("span");
        page.add_class(icon, ICON_CLASS);
        page.append_child(root, icon);

        let items = slides
            .iter()
            .enumerate()
            .map(|(index, slide)| {
                let item = page.create_element("li");
                page.add_class(item, ITEM_CLASS);
                page.set_attribute(item, "data-index", &index.to_string());
                if let Some(title) = &slide.title {
                    page.set_attribute(item, "data-title", title);
                }
                page.append_child(list, item);
                item
            })
            .collect();

        Self {
            root,
            list,
            icon,
            items,
            hovered: false,
            hide: Debounce::new(hide_after),
        }
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    /// The element that fades in and out.
    pub fn list(&self) -> ElementId {
        self.list
    }

    pub fn icon(&self) -> ElementId {
        self.icon
    }

    pub fn items(&self) -> &[ElementId] {
        &self.items
    }

    /// Slide index addressed by a click on `target`.
    pub fn index_of(&self, page: &Page, target: ElementId) -> Option<usize> {
        if !self.items.contains(&target) {
            return None;
        }
        page.attribute(target, "data-index")?.parse().ok()
    }

    pub fn highlight(&self, page: &mut Page, previous: Option<usize>, current: usize) {
        if let Some(item) = previous.and_then(|i| self.items.get(i)) {
            page.remove_class(*item, ACTIVE_CLASS);
        }
        if let Some(item) = self.items.get(current) {
            page.add_class(*item, ACTIVE_CLASS);
        }
    }

    pub fn reveal(&mut self, page: &mut Page, now: Instant) {
        page.add_class(self.root, VISIBLE_CLASS);
        page.set_style(self.list, "opacity", "1", now);
        self.hide.trigger(now);
    }

    fn conceal(&mut self, page: &mut Page, now: Instant) {
        page.remove_class(self.root, VISIBLE_CLASS);
        page.set_style(self.list, "opacity", "0", now);
    }

    pub fn pointer_enter(&mut self, page: &mut Page, now: Instant) {
        self.hovered = true;
        self.hide.cancel();
        page.add_class(self.root, VISIBLE_CLASS);
        page.set_style(self.list, "opacity", "1", now);
    }

    pub fn pointer_leave(&mut self, now: Instant) {
        self.hovered = false;
        self.hide.trigger(now);
    }

    pub fn tick(&mut self, page: &mut Page, now: Instant) {
        if self.hide.fire_due(now) && !self.hovered {
            self.conceal(page, now);
        }
    }

    pub fn cancel_timers(&mut self) {
        self.hide.cancel();
    }
}
