use eframe::egui;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use tracing::{info, trace};

use crate::config::Config;
use crate::env::{DeviceProbe, ImageLoader, SystemClock};
use crate::fragment;
use crate::page::{InputEvent, Key, Page};
use crate::render::{self, HitRects, image_cache::ImageCache};
use crate::runtime::{CONTAINER_ID, MountEnv, Site};
use crate::site::{Layout, SiteFile};
use crate::theme::Theme;

/// Repaint cadence while nothing animates, so timers still fire.
const IDLE_REPAINT: Duration = Duration::from_millis(100);
const TOUCH_ENV: &str = "SAVETHEDATE_TOUCH";

/// Desktop windows have no reliable touch detection up front; the
/// `SAVETHEDATE_TOUCH` environment variable forces touch mode.
struct EnvTouchProbe;

impl DeviceProbe for EnvTouchProbe {
    fn is_touch_device(&self) -> bool {
        std::env::var_os(TOUCH_ENV).is_some()
    }
}

/// Keys the page reacts to. Everything else stays with the host.
fn page_key(key: egui::Key) -> Option<Key> {
    match key {
        egui::Key::ArrowLeft => Some(Key::ArrowLeft),
        egui::Key::ArrowRight => Some(Key::ArrowRight),
        _ => None,
    }
}

struct Toast {
    message: String,
    start: Instant,
}

impl Toast {
    fn new(message: String) -> Self {
        Self {
            message,
            start: Instant::now(),
        }
    }

    fn opacity(&self) -> f32 {
        let elapsed = self.start.elapsed().as_secs_f32();
        let duration = 1.5;
        let fade_start = 1.0;
        if elapsed < fade_start {
            1.0
        } else if elapsed < duration {
            1.0 - (elapsed - fade_start) / (duration - fade_start)
        } else {
            0.0
        }
    }

    fn is_expired(&self) -> bool {
        self.start.elapsed().as_secs_f32() >= 1.5
    }
}

struct SaveTheDateApp {
    site: Site,
    theme: Theme,
    images: ImageCache,
    hits: HitRects,
    sidebar_hovered: bool,
    viewport_height: f32,
    toast: Option<Toast>,
    last_esc: Option<Instant>,
}

impl SaveTheDateApp {
    fn new(site_file: &SiteFile, page: Page, theme: Theme) -> Self {
        let mut images = ImageCache::new();
        let env = MountEnv {
            clock: Box::new(SystemClock),
            device: &EnvTouchProbe,
            loader: &mut images,
        };
        let site = Site::mount(site_file, page, env, Instant::now());
        Self {
            site,
            theme,
            images,
            hits: HitRects::default(),
            sidebar_hovered: false,
            viewport_height: 0.0,
            toast: None,
            last_esc: None,
        }
    }

    fn toggle_theme(&mut self) {
        self.theme = self.theme.toggled();
        self.toast = Some(Toast::new(format!("Theme: {}", self.theme.name)));
    }

    /// Pointer hover and clicks against last frame's sidebar rects.
    fn pointer_events(&mut self, ctx: &egui::Context, events: &mut Vec<InputEvent>) {
        let (hover, clicked) = ctx.input(|i| {
            (
                i.pointer.hover_pos(),
                i.pointer.primary_clicked().then(|| i.pointer.interact_pos()).flatten(),
            )
        });

        if let Some((sidebar, area)) = self.hits.sidebar {
            let inside = hover.is_some_and(|p| area.contains(p));
            if inside && !self.sidebar_hovered {
                events.push(InputEvent::PointerEnter { target: sidebar });
            } else if !inside && self.sidebar_hovered {
                events.push(InputEvent::PointerLeave { target: sidebar });
            }
            self.sidebar_hovered = inside;
        }

        if let Some(target) = clicked.and_then(|p| self.hits.sidebar_item_at(p)) {
            events.push(InputEvent::Click { target });
        }
    }

    fn draw_toast(&self, ui: &egui::Ui, rect: egui::Rect) {
        let Some(toast) = &self.toast else {
            return;
        };
        let opacity = toast.opacity();
        let color = Theme::with_opacity(self.theme.foreground, opacity);
        let galley = ui.painter().layout_no_wrap(
            toast.message.clone(),
            egui::FontId::proportional(18.0),
            color,
        );
        let padding = egui::vec2(16.0, 8.0);
        let size = galley.rect.size() + padding * 2.0;
        let bg = egui::Rect::from_center_size(
            egui::pos2(rect.center().x, rect.top() + 40.0),
            size,
        );
        let fill = Theme::with_opacity(self.theme.badge_background, opacity);
        ui.painter().rect_filled(bg, 8.0, fill);
        ui.painter().galley(bg.min + padding, galley, color);
    }
}

impl eframe::App for SaveTheDateApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        let now = Instant::now();
        self.images.upload_pending(ctx);

        // Collect viewport commands to send AFTER the input closure
        // (sending inside ctx.input() causes RwLock deadlock)
        let mut viewport_cmds: Vec<egui::ViewportCommand> = Vec::new();
        let mut events: Vec<InputEvent> = Vec::new();
        let mut toggle_theme = false;

        ctx.input(|i| {
            if i.key_pressed(egui::Key::Q) {
                viewport_cmds.push(egui::ViewportCommand::Close);
                return;
            }

            // ESC: double-tap to quit
            if i.key_pressed(egui::Key::Escape) {
                if let Some(last) = self.last_esc {
                    if last.elapsed().as_secs_f32() < 1.0 {
                        viewport_cmds.push(egui::ViewportCommand::Close);
                        return;
                    }
                }
                self.last_esc = Some(Instant::now());
                self.toast = Some(Toast::new("Press Esc again to exit".to_string()));
                return;
            }

            if i.key_pressed(egui::Key::F) {
                viewport_cmds.push(egui::ViewportCommand::Fullscreen(
                    !i.viewport().fullscreen.unwrap_or(false),
                ));
            }
            if i.key_pressed(egui::Key::D) {
                toggle_theme = true;
            }

            for key in [egui::Key::ArrowLeft, egui::Key::ArrowRight] {
                if let Some(mapped) = page_key(key).filter(|_| i.key_pressed(key)) {
                    events.push(InputEvent::Key(mapped));
                }
            }

            // egui scrolls content up for a positive delta; pages scroll down
            let scroll = i.raw_scroll_delta.y;
            if scroll != 0.0 {
                events.push(InputEvent::Wheel { delta_y: -scroll });
            }

            for event in &i.events {
                if let egui::Event::Touch { phase, pos, .. } = event {
                    match phase {
                        egui::TouchPhase::Start => {
                            events.push(InputEvent::TouchStart { y: pos.y });
                        }
                        egui::TouchPhase::Move => {
                            events.push(InputEvent::TouchMove { y: pos.y });
                        }
                        _ => {}
                    }
                }
            }
        });

        if toggle_theme {
            self.toggle_theme();
        }
        self.pointer_events(ctx, &mut events);

        for event in events {
            let claimed = self.site.handle_input(event, now);
            trace!(?event, claimed, "input");
        }

        if viewport_cmds
            .iter()
            .any(|cmd| matches!(cmd, egui::ViewportCommand::Close))
        {
            self.site.shutdown();
        }
        for cmd in viewport_cmds {
            ctx.send_viewport_cmd(cmd);
        }

        self.site.update(now, &mut self.images);

        if let Some(container) = self.site.page().query(&format!("#{CONTAINER_ID}")) {
            for (source, _) in render::background_layers(self.site.page(), container, now) {
                self.images.preload(&source);
            }
        }

        let bg = self.theme.background;
        egui::CentralPanel::default()
            .frame(egui::Frame::new().fill(bg).inner_margin(0.0))
            .show(ctx, |ui| {
                let rect = ui.max_rect();
                if (rect.height() - self.viewport_height).abs() > 0.5 {
                    self.viewport_height = rect.height();
                    self.site.resize(rect.height());
                }
                self.hits =
                    render::render_site(ui, &self.site, &self.theme, &self.images, rect, now);
                self.draw_toast(ui, rect);
            });

        if self.toast.as_ref().is_some_and(Toast::is_expired) {
            self.toast = None;
        }

        let hint_bouncing = !self.site.hint_hidden();
        if self.site.is_animating()
            || self.images.is_loading()
            || self.toast.is_some()
            || hint_bouncing
        {
            ctx.request_repaint();
        } else {
            ctx.request_repaint_after(IDLE_REPAINT);
        }
    }
}

/// Resolve settings (CLI flags over config over site file) and open the
/// window.
pub fn run(
    file: PathBuf,
    windowed: bool,
    start_slide: Option<usize>,
    layout: Option<Layout>,
) -> anyhow::Result<()> {
    let mut site_file = SiteFile::load(&file)?;
    let config = Config::load_or_default();

    if let Some(layout) = layout.or_else(|| config.layout()) {
        site_file.layout = layout;
    }
    let theme_name = config
        .theme()
        .or(site_file.theme.as_deref())
        .unwrap_or("dark");
    let theme = Theme::from_name(theme_name);

    let mut page = Page::new();
    if let Some(slide) = start_slide.or_else(|| config.start_slide()) {
        page.set_fragment(&fragment::for_index(slide.saturating_sub(1)));
    }

    let title = site_file.title().to_string();
    info!(
        file = %file.display(),
        layout = %site_file.layout,
        theme = %theme.name,
        "opening site"
    );

    let viewport = if windowed {
        egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 800.0])
            .with_title(&title)
    } else {
        egui::ViewportBuilder::default()
            .with_fullscreen(true)
            .with_title(&title)
    };

    let options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    eframe::run_native(
        &title,
        options,
        Box::new(move |_cc| Ok(Box::new(SaveTheDateApp::new(&site_file, page, theme)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_horizontal_arrows_reach_the_page() {
        assert_eq!(page_key(egui::Key::ArrowLeft), Some(Key::ArrowLeft));
        assert_eq!(page_key(egui::Key::ArrowRight), Some(Key::ArrowRight));
        assert_eq!(page_key(egui::Key::ArrowUp), None);
        assert_eq!(page_key(egui::Key::ArrowDown), None);
        assert_eq!(page_key(egui::Key::F), None);
    }
}
