use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::page::Easing;
use crate::widgets::countdown::{CountdownOptions, CountdownTarget};

pub const COUNTDOWN_SELECTOR: &str = "#countdown-timer-time";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Layout {
    #[default]
    Deck,
    Gallery,
}

impl Layout {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "deck" => Some(Self::Deck),
            "gallery" => Some(Self::Gallery),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Deck => "deck",
            Self::Gallery => "gallery",
        }
    }
}

impl std::fmt::Display for Layout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// A save-the-date page as described by its YAML site file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SiteFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default)]
    pub layout: Layout,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countdown: Option<CountdownSection>,

    #[serde(default)]
    pub deck: DeckSection,

    #[serde(default)]
    pub gallery: GallerySection,

    #[serde(default)]
    pub slides: Vec<SlideEntry>,

    /// Directory image paths are resolved against.
    #[serde(skip)]
    pub base_path: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownSection {
    pub target: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,

    #[serde(default = "default_tick_seconds")]
    pub tick_seconds: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub started_text: Option<String>,
}

fn default_tick_seconds() -> u64 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeckSection {
    pub transition_ms: u64,
    pub easing: String,
    pub velocity_threshold: f32,
}

impl Default for DeckSection {
    fn default() -> Self {
        Self {
            transition_ms: 1500,
            easing: "ease".to_string(),
            velocity_threshold: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GallerySection {
    pub transition_ms: u64,
    pub distance_per_image: f32,
    pub max_step: f32,
}

impl Default for GallerySection {
    fn default() -> Self {
        Self {
            transition_ms: 1000,
            distance_per_image: 200.0,
            max_step: 5.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SlideEntry {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    pub image: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub heading: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl SiteFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read site file {}", path.display()))?;
        let base_path = path.parent().unwrap_or(Path::new("."));
        Self::parse(&contents, base_path)
            .with_context(|| format!("Invalid site file {}", path.display()))
    }

    pub fn parse(contents: &str, base_path: &Path) -> Result<Self> {
        let mut site: SiteFile =
            serde_yaml::from_str(contents).context("Failed to parse site YAML")?;
        site.base_path = base_path.to_path_buf();
        site.validate()?;
        Ok(site)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slides.is_empty() {
            anyhow::bail!("A site needs at least one slide");
        }
        for (i, slide) in self.slides.iter().enumerate() {
            if slide.image.trim().is_empty() {
                anyhow::bail!("Slide {} has no image", i + 1);
            }
        }
        if Easing::from_name(&self.deck.easing).name() != self.deck.easing.trim() {
            anyhow::bail!(
                "Invalid easing: {}. Must be 'linear', 'ease', 'ease-in', 'ease-out', or 'ease-in-out'.",
                self.deck.easing
            );
        }
        if self.deck.velocity_threshold < 0.0 {
            anyhow::bail!("deck.velocity_threshold must not be negative");
        }
        if self.gallery.distance_per_image <= 0.0 {
            anyhow::bail!("gallery.distance_per_image must be positive");
        }
        if self.gallery.max_step <= 0.0 {
            anyhow::bail!("gallery.max_step must be positive");
        }
        if let Some(countdown) = &self.countdown {
            if countdown.tick_seconds == 0 {
                anyhow::bail!("countdown.tick_seconds must be at least 1");
            }
        }
        Ok(())
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or("Save the date")
    }

    /// Image path as handed to the image loader.
    pub fn resolve_image(&self, image: &str) -> String {
        let path = Path::new(image);
        if path.is_absolute() {
            image.to_string()
        } else {
            self.base_path.join(path).to_string_lossy().into_owned()
        }
    }

    pub fn image_sources(&self) -> Vec<String> {
        self.slides
            .iter()
            .map(|s| self.resolve_image(&s.image))
            .collect()
    }

    pub fn countdown_options(&self) -> Option<CountdownOptions> {
        let section = self.countdown.as_ref()?;
        let mut options =
            CountdownOptions::new(COUNTDOWN_SELECTOR, CountdownTarget::parse(&section.target));
        options.end = section.end.as_deref().map(CountdownTarget::parse);
        options.tick = Duration::from_secs(section.tick_seconds);
        options.started_text = section.started_text.clone();
        Some(options)
    }
}
