use std::collections::{HashMap, HashSet};
use std::sync::mpsc::{self, Receiver, Sender};

use anyhow::{Context, Result};
use eframe::egui;
use tracing::{debug, trace, warn};

use crate::env::ImageLoader;

struct Decoded {
    source: String,
    result: Result<egui::ColorImage>,
}

/// Background images by source path. Files are decoded on the rayon pool and
/// turned into textures on the UI thread by [`ImageCache::upload_pending`].
pub struct ImageCache {
    textures: HashMap<String, egui::TextureHandle>,
    requested: HashSet<String>,
    failed: HashSet<String>,
    tx: Sender<Decoded>,
    rx: Receiver<Decoded>,
}

impl ImageCache {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            textures: HashMap::new(),
            requested: HashSet::new(),
            failed: HashSet::new(),
            tx,
            rx,
        }
    }

    pub fn get(&self, source: &str) -> Option<&egui::TextureHandle> {
        self.textures.get(source)
    }

    pub fn is_loading(&self) -> bool {
        self.requested.len() > self.textures.len() + self.failed.len()
    }

    /// Upload everything decoded since the last frame. Returns `true` when
    /// a new texture became available.
    pub fn upload_pending(&mut self, ctx: &egui::Context) -> bool {
        let mut uploaded = false;
        while let Ok(decoded) = self.rx.try_recv() {
            match decoded.result {
                Ok(image) => {
                    let texture =
                        ctx.load_texture(&decoded.source, image, egui::TextureOptions::LINEAR);
                    debug!(source = %decoded.source, "image ready");
                    self.textures.insert(decoded.source, texture);
                    uploaded = true;
                }
                Err(e) => {
                    warn!(source = %decoded.source, "failed to load image: {e:#}");
                    self.failed.insert(decoded.source);
                }
            }
        }
        uploaded
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ImageLoader for ImageCache {
    fn preload(&mut self, source: &str) {
        if !self.requested.insert(source.to_string()) {
            return;
        }
        let tx = self.tx.clone();
        let source = source.to_string();
        rayon::spawn(move || {
            let result = decode(&source);
            deliver(&tx, Decoded { source, result });
        });
    }
}

/// Hand a decoded image back to the UI thread. Returns `false` when the
/// cache has already been dropped, which only happens during shutdown.
fn deliver(tx: &Sender<Decoded>, decoded: Decoded) -> bool {
    match tx.send(decoded) {
        Ok(()) => true,
        Err(mpsc::SendError(decoded)) => {
            trace!(source = %decoded.source, "image cache closed, decode discarded");
            false
        }
    }
}

fn decode(path: &str) -> Result<egui::ColorImage> {
    let image = image::open(path)
        .with_context(|| format!("Failed to open {path}"))?
        .into_rgba8();
    let (w, h) = image.dimensions();
    Ok(egui::ColorImage::from_rgba_unmultiplied(
        [w as usize, h as usize],
        image.as_raw(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_png() {
        let name = format!("savethedate-decode-{}.png", std::process::id());
        let path = std::env::temp_dir().join(name);
        let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([10, 20, 30, 255]));
        img.save(&path).unwrap();

        let decoded = decode(path.to_str().unwrap()).unwrap();
        assert_eq!(decoded.size, [3, 2]);
        std::fs::remove_file(&path).unwrap();
    }

    #[test]
    fn test_decode_missing_file_fails() {
        assert!(decode("/nonexistent/photo.jpg").is_err());
    }

    #[test]
    fn test_preload_requests_once() {
        let mut cache = ImageCache::new();
        cache.preload("/nonexistent/a.jpg");
        cache.preload("/nonexistent/a.jpg");
        assert_eq!(cache.requested.len(), 1);
        assert!(cache.get("/nonexistent/a.jpg").is_none());
    }

    #[test]
    fn test_deliver_after_cache_dropped() {
        let (tx, rx) = mpsc::channel();
        let decoded = || Decoded {
            source: "a.jpg".to_string(),
            result: Err(anyhow::anyhow!("unused")),
        };
        assert!(deliver(&tx, decoded()));
        assert_eq!(rx.try_recv().map(|d| d.source).ok().as_deref(), Some("a.jpg"));

        drop(rx);
        assert!(!deliver(&tx, decoded()));
    }
}
