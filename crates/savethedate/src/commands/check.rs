use anyhow::Result;
use colored::Colorize;
use std::path::Path;

use crate::site::SiteFile;
use crate::widgets::countdown::{CountdownTarget, format_date_range};

pub fn run(file: &Path) -> Result<()> {
    let site = SiteFile::load(file)?;

    println!("{} {}", "Site:".bold(), site.title());
    println!("  {:<10} {}", "layout".cyan(), site.layout);
    println!("  {:<10} {}", "slides".cyan(), site.slides.len());

    if let Some(countdown) = &site.countdown {
        let target = CountdownTarget::parse(&countdown.target);
        match target.instant() {
            Some(start) => {
                let range = countdown
                    .end
                    .as_deref()
                    .map(CountdownTarget::parse)
                    .and_then(|end| end.instant())
                    .map(|end| format_date_range(start.date_naive(), end.date_naive()));
                println!(
                    "  {:<10} {} {}",
                    "countdown".cyan(),
                    start.format("%Y-%m-%d %H:%M"),
                    range.unwrap_or_default().dimmed()
                );
            }
            None => println!(
                "  {:<10} {}",
                "countdown".cyan(),
                format!("invalid date '{}'", countdown.target).yellow()
            ),
        }
    }

    let missing = missing_images(&site);
    for (i, slide) in site.slides.iter().enumerate() {
        let label = slide.title.as_deref().unwrap_or(&slide.image);
        let status = if missing.contains(&i) {
            "missing".red()
        } else {
            "ok".green()
        };
        println!("  {:>3}. {label} {status}", i + 1);
    }

    if !missing.is_empty() {
        anyhow::bail!("{} of {} images not found", missing.len(), site.slides.len());
    }
    println!("{}", "Site file is valid".green());
    Ok(())
}

/// Indices of slides whose image file does not exist.
fn missing_images(site: &SiteFile) -> Vec<usize> {
    site.image_sources()
        .iter()
        .enumerate()
        .filter(|(_, source)| !Path::new(source).exists())
        .map(|(i, _)| i)
        .collect()
}
