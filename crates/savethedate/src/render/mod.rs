pub mod image_cache;

use std::time::Instant;

use eframe::egui::{self, Color32, FontId, Pos2, Rect};

use crate::page::{ElementId, Page, parse_css_url, parse_translate_y_percent};
use crate::runtime::{
    CONTAINER_ID, COUNTDOWN_ID, COUNTER_ID, GALLERY_CONTENT_ID, HINT_ID, Site,
    TITLE_ID, slide_id,
};
use crate::theme::Theme;
use crate::widgets::deck::sidebar::{ACTIVE_CLASS, Sidebar};
use crate::widgets::gallery::PhotoGallery;

use image_cache::ImageCache;

const SIDEBAR_DOT: f32 = 7.0;
const SIDEBAR_SPACING: f32 = 26.0;
const SIDEBAR_ICON: f32 = 4.0;
const PROGRESS_HEIGHT: f32 = 3.0;

/// Hit targets produced by a frame, consumed by the next frame's input.
#[derive(Debug, Default, Clone)]
pub struct HitRects {
    pub sidebar: Option<(ElementId, Rect)>,
    pub sidebar_items: Vec<(ElementId, Rect)>,
}

impl HitRects {
    pub fn sidebar_item_at(&self, pos: Pos2) -> Option<ElementId> {
        self.sidebar_items
            .iter()
            .find(|(_, rect)| rect.contains(pos))
            .map(|(el, _)| *el)
    }
}

/// Background sources to draw with their weights. Two entries while the
/// container cross-fades.
pub fn background_layers(page: &Page, container: ElementId, now: Instant) -> Vec<(String, f32)> {
    if let Some(t) = page.active_transition(container, "background-image") {
        let p = t.progress(now);
        let mut layers = Vec::new();
        if let Some(from) = t.from.as_deref().and_then(parse_css_url) {
            layers.push((from.to_string(), 1.0 - p));
        }
        if let Some(to) = parse_css_url(&t.to) {
            layers.push((to.to_string(), p));
        }
        return layers;
    }
    page.style(container, "background-image")
        .and_then(parse_css_url)
        .map(|s| vec![(s.to_string(), 1.0)])
        .unwrap_or_default()
}

/// Current `translateY` percentage of `el`, interpolated while it animates.
pub fn translate_y_percent(page: &Page, el: ElementId, now: Instant) -> f32 {
    if let Some(t) = page.active_transition(el, "transform") {
        let from = t
            .from
            .as_deref()
            .and_then(parse_translate_y_percent)
            .unwrap_or(0.0);
        let to = parse_translate_y_percent(&t.to).unwrap_or(0.0);
        return from + (to - from) * t.progress(now);
    }
    page.style(el, "transform")
        .and_then(parse_translate_y_percent)
        .unwrap_or(0.0)
}

/// Scale `size` to cover `area`, centered and cropped.
pub fn cover_rect(size: egui::Vec2, area: Rect) -> Rect {
    if size.x <= 0.0 || size.y <= 0.0 {
        return area;
    }
    let scale = (area.width() / size.x).max(area.height() / size.y);
    Rect::from_center_size(area.center(), size * scale)
}

pub fn render_site(
    ui: &egui::Ui,
    site: &Site,
    theme: &Theme,
    images: &ImageCache,
    rect: Rect,
    now: Instant,
) -> HitRects {
    let page = site.page();
    let painter = ui.painter_at(rect);
    painter.rect_filled(rect, 0.0, theme.background);

    let Some(container) = page.query(&format!("#{CONTAINER_ID}")) else {
        return HitRects::default();
    };
    let opacity = page.opacity(container, now);
    let scale = (rect.height() / 1080.0).clamp(0.5, 2.0);

    for (source, weight) in background_layers(page, container, now) {
        if let Some(texture) = images.get(&source) {
            let draw = cover_rect(texture.size_vec2(), rect);
            let uv = Rect::from_min_max(Pos2::ZERO, Pos2::new(1.0, 1.0));
            let tint = Theme::with_opacity(Color32::WHITE, weight * opacity);
            painter.image(texture.id(), draw, uv, tint);
        }
    }
    painter.rect_filled(rect, 0.0, Theme::with_opacity(theme.scrim, opacity));

    let mut y = rect.top() + 60.0 * scale;
    if let Some(title) = page.query(&format!("#{TITLE_ID}")) {
        let size = theme.title_size * scale;
        let color = theme.heading_color;
        y += draw_centered(&painter, page.text(title), size, color, opacity, rect.center().x, y);
        y += 12.0 * scale;
    }
    if let Some(time) = page.query(&format!("#{COUNTDOWN_ID}")) {
        let size = theme.countdown_size * scale;
        let color = theme.accent;
        y += draw_centered(&painter, page.text(time), size, color, opacity, rect.center().x, y);
        let captions = page
            .element(time)
            .and_then(|e| e.parent)
            .map(|header| page.children(header))
            .unwrap_or(&[]);
        let size = theme.caption_size * scale;
        for caption in captions.iter().filter(|c| **c != time) {
            y += 4.0 * scale;
            let text = page.text(*caption);
            y += draw_centered(&painter, text, size, theme.foreground, opacity, rect.center().x, y);
        }
    }

    match site.deck() {
        Some(deck) => {
            for i in 0..deck.slide_count() {
                if let Some(section) = page.query(&format!("#{}", slide_id(i))) {
                    let alpha = page.opacity(section, now) * opacity;
                    if alpha > 0.0 {
                        draw_section(&painter, page, section, theme, alpha, rect, 0.0, scale);
                    }
                }
            }
        }
        None => {
            if let Some(content) = page.query(&format!("#{GALLERY_CONTENT_ID}")) {
                let percent = translate_y_percent(page, content, now);
                let shift = percent / 100.0 * rect.height() * 0.5;
                draw_section(&painter, page, content, theme, opacity, rect, shift, scale);
            }
            if let Some(gallery) = site.gallery() {
                draw_gallery_progress(&painter, gallery, theme, opacity, rect, scale);
            }
        }
    }

    if let Some(counter) = page.query(&format!("#{COUNTER_ID}")) {
        let alpha = page.opacity(counter, now) * opacity;
        draw_counter(&painter, page.text(counter), theme, alpha, rect, scale);
    }

    if let Some(hint) = page.query(&format!("#{HINT_ID}")) {
        let alpha = page.opacity(hint, now) * opacity;
        let bounce = if page.style(hint, "animation").is_some_and(|a| !a.is_empty()) {
            let t = ui.input(|i| i.time) as f32;
            (t * std::f32::consts::PI).sin().abs() * 10.0 * scale
        } else {
            0.0
        };
        let y = rect.bottom() - 70.0 * scale - bounce;
        let size = theme.caption_size * scale;
        let text = page.text(hint);
        draw_centered(&painter, text, size, theme.foreground, alpha, rect.center().x, y);
    }

    let mut hits = HitRects::default();
    if let Some(sidebar) = site.deck().and_then(|deck| deck.sidebar()) {
        let alpha = page.opacity(sidebar.root(), now) * opacity;
        let list_alpha = page.opacity(sidebar.list(), now) * alpha;
        let icon_alpha = page.opacity(sidebar.icon(), now) * alpha;
        draw_sidebar(
            ui, &painter, page, sidebar, theme, list_alpha, icon_alpha, rect, scale, &mut hits,
        );
    }
    hits
}

/// Thin bar along the bottom edge showing how far the gallery has been
/// scrolled, only while it owns the wheel.
fn draw_gallery_progress(
    painter: &egui::Painter,
    gallery: &PhotoGallery,
    theme: &Theme,
    opacity: f32,
    rect: Rect,
    scale: f32,
) {
    if !gallery.is_active() || gallery.max_offset() <= 0.0 {
        return;
    }
    let fraction = (gallery.scroll_offset() / gallery.max_offset()).clamp(0.0, 1.0);
    let height = PROGRESS_HEIGHT * scale;
    let bar = Rect::from_min_size(
        Pos2::new(rect.left(), rect.bottom() - height),
        egui::vec2(rect.width() * fraction, height),
    );
    painter.rect_filled(bar, 0.0, Theme::with_opacity(theme.accent, opacity));
}

fn draw_centered(
    painter: &egui::Painter,
    text: &str,
    size: f32,
    color: Color32,
    opacity: f32,
    center_x: f32,
    top: f32,
) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    let color = Theme::with_opacity(color, opacity);
    let galley = painter.layout_no_wrap(text.to_string(), FontId::proportional(size), color);
    let height = galley.rect.height();
    let pos = Pos2::new(center_x - galley.rect.width() / 2.0, top);
    painter.galley(pos, galley, color);
    height
}

/// Headings and paragraphs of a content block, centered in the lower half.
#[allow(clippy::too_many_arguments)]
fn draw_section(
    painter: &egui::Painter,
    page: &Page,
    section: ElementId,
    theme: &Theme,
    opacity: f32,
    rect: Rect,
    shift: f32,
    scale: f32,
) {
    let width = (rect.width() * 0.7).min(1100.0 * scale);
    let mut y = rect.center().y + shift;
    for child in page.children(section) {
        let Some(element) = page.element(*child) else {
            continue;
        };
        let (size, color) = match element.tag.as_str() {
            "h2" => (theme.heading_size * scale, theme.heading_color),
            _ => (theme.body_size * scale, theme.foreground),
        };
        let color = Theme::with_opacity(color, opacity);
        let font = FontId::proportional(size);
        let galley = painter.layout(element.text.clone(), font, color, width);
        let pos = Pos2::new(rect.center().x - galley.rect.width() / 2.0, y);
        y += galley.rect.height() + 16.0 * scale;
        painter.galley(pos, galley, color);
    }
}

fn draw_counter(
    painter: &egui::Painter,
    text: &str,
    theme: &Theme,
    opacity: f32,
    rect: Rect,
    scale: f32,
) {
    if text.is_empty() || opacity <= 0.0 {
        return;
    }
    let color = Theme::with_opacity(theme.foreground, opacity);
    let font = FontId::monospace(theme.caption_size * scale);
    let galley = painter.layout_no_wrap(text.to_string(), font, color);
    let padding = 10.0 * scale;
    let size = galley.rect.size() + egui::vec2(padding * 2.0, padding);
    let badge = Rect::from_min_size(
        Pos2::new(
            rect.right() - size.x - 24.0 * scale,
            rect.bottom() - size.y - 24.0 * scale,
        ),
        size,
    );
    let fill = Theme::with_opacity(theme.badge_background, opacity);
    painter.rect_filled(badge, 6.0 * scale, fill);
    painter.galley(badge.min + egui::vec2(padding, padding / 2.0), galley, color);
}

/// A column of dots along the right edge, one per slide, with a small bar
/// hugging the edge that stays put while the dots fade.
#[allow(clippy::too_many_arguments)]
fn draw_sidebar(
    ui: &egui::Ui,
    painter: &egui::Painter,
    page: &Page,
    sidebar: &Sidebar,
    theme: &Theme,
    opacity: f32,
    icon_opacity: f32,
    rect: Rect,
    scale: f32,
    hits: &mut HitRects,
) {
    let items = sidebar.items();
    if items.is_empty() {
        return;
    }

    let spacing = SIDEBAR_SPACING * scale;
    let height = spacing * items.len() as f32;
    let x = rect.right() - 36.0 * scale;
    let top = rect.center().y - height / 2.0;
    let area = Rect::from_min_max(
        Pos2::new(x - spacing, top - spacing / 2.0),
        Pos2::new(rect.right(), top + height + spacing / 2.0),
    );
    hits.sidebar = Some((sidebar.root(), area));

    if icon_opacity > 0.0 {
        let icon = Rect::from_center_size(
            Pos2::new(rect.right() - 8.0 * scale, rect.center().y),
            egui::vec2(SIDEBAR_ICON * scale, height.min(120.0 * scale)),
        );
        let fill = Theme::with_opacity(theme.foreground, icon_opacity * 0.6);
        painter.rect_filled(icon, SIDEBAR_ICON * scale / 2.0, fill);
    }

    let hover = ui.input(|i| i.pointer.hover_pos());
    for (i, item) in items.iter().enumerate() {
        let center = Pos2::new(x, top + spacing * (i as f32 + 0.5));
        let hit = Rect::from_center_size(center, egui::vec2(spacing, spacing));
        hits.sidebar_items.push((*item, hit));
        if opacity <= 0.0 {
            continue;
        }

        let active = page.has_class(*item, ACTIVE_CLASS);
        let color = if active { theme.accent } else { theme.foreground };
        let radius = SIDEBAR_DOT * scale * if active { 1.0 } else { 0.7 };
        painter.circle_filled(center, radius, Theme::with_opacity(color, opacity));

        let hovered = hover.is_some_and(|p| hit.contains(p));
        if let (true, Some(title)) = (hovered, page.attribute(*item, "data-title")) {
            let text_color = Theme::with_opacity(theme.foreground, opacity);
            let galley = painter.layout_no_wrap(
                title.to_string(),
                FontId::proportional(theme.caption_size * scale),
                text_color,
            );
            let pos = Pos2::new(
                center.x - spacing - galley.rect.width(),
                center.y - galley.rect.height() / 2.0,
            );
            painter.galley(pos, galley, text_color);
        }
    }
}
