use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use crate::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => {
            let mut config = Config::load_or_default();
            config.set(&key, &value)?;
            let path = config.save()?;
            println!(
                "{} {key} = {value} ({})",
                "Saved".green(),
                path.display().to_string().dimmed()
            );
            Ok(())
        }
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    println!("{} {}", "Config:".bold(), path.display());

    let defaults = config.defaults.unwrap_or_default();
    let rows = [
        ("defaults.theme", defaults.theme.unwrap_or_else(|| "dark".into())),
        ("defaults.layout", defaults.layout.unwrap_or_else(|| "from site file".into())),
        (
            "defaults.start_slide",
            defaults
                .start_slide
                .map(|n| n.to_string())
                .unwrap_or_else(|| "1".into()),
        ),
    ];
    for (key, value) in rows {
        println!("  {:<22} {}", key.cyan(), value);
    }
    Ok(())
}
