use eframe::egui::Color32;

/// Colors and sizes for everything drawn over the background photos.
#[derive(Debug, Clone)]
pub struct Theme {
    pub name: String,
    pub background: Color32,
    pub foreground: Color32,
    pub heading_color: Color32,
    pub accent: Color32,
    /// Scrim behind text so it stays readable on any photo.
    pub scrim: Color32,
    pub badge_background: Color32,
    pub title_size: f32,
    pub heading_size: f32,
    pub body_size: f32,
    pub countdown_size: f32,
    pub caption_size: f32,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark".to_string(),
            background: Color32::from_rgb(0x12, 0x12, 0x14),
            foreground: Color32::from_rgb(0xE6, 0xE6, 0xE6),
            heading_color: Color32::WHITE,
            accent: Color32::from_rgb(0xF2, 0xB1, 0x4C),
            scrim: Color32::from_rgba_unmultiplied(0, 0, 0, 110),
            badge_background: Color32::from_rgba_unmultiplied(0, 0, 0, 160),
            title_size: 64.0,
            heading_size: 48.0,
            body_size: 26.0,
            countdown_size: 34.0,
            caption_size: 18.0,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light".to_string(),
            background: Color32::from_rgb(0xF7, 0xF4, 0xEF),
            foreground: Color32::from_rgb(0x1A, 0x1A, 0x2E),
            heading_color: Color32::from_rgb(0x16, 0x21, 0x3E),
            accent: Color32::from_rgb(0xB5, 0x4A, 0x1F),
            scrim: Color32::from_rgba_unmultiplied(255, 255, 255, 130),
            badge_background: Color32::from_rgba_unmultiplied(255, 255, 255, 190),
            title_size: 64.0,
            heading_size: 48.0,
            body_size: 26.0,
            countdown_size: 34.0,
            caption_size: 18.0,
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "light" => Self::light(),
            _ => Self::dark(),
        }
    }

    pub fn toggled(&self) -> Self {
        if self.name == "dark" {
            Self::light()
        } else {
            Self::dark()
        }
    }

    /// Apply opacity to a color
    pub fn with_opacity(color: Color32, opacity: f32) -> Color32 {
        color.gamma_multiply(opacity.clamp(0.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_defaults_to_dark() {
        assert_eq!(Theme::from_name("light").name, "light");
        assert_eq!(Theme::from_name("neon").name, "dark");
    }

    #[test]
    fn test_toggled() {
        assert_eq!(Theme::dark().toggled().name, "light");
        assert_eq!(Theme::light().toggled().name, "dark");
    }

    #[test]
    fn test_with_opacity_scales_alpha() {
        let c = Theme::with_opacity(Color32::WHITE, 0.5);
        assert!((127..=128).contains(&c.a()));
        assert_eq!(Theme::with_opacity(Color32::WHITE, 0.0).a(), 0);
    }
}
