use anyhow::Result;
use colored::Colorize;

use crate::cli::ConfigCommands;
use deckpane::config::Config;

pub fn run(command: ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => show(),
        ConfigCommands::Set { key, value } => set(&key, &value),
    }
}

fn show() -> Result<()> {
    let path = Config::path()?;
    let config = Config::load_or_default();
    let source = if path.exists() {
        path.display().to_string()
    } else {
        format!("{} (not created yet, showing defaults)", path.display())
    };
    println!("{} {}", "Config:".bold(), source.dimmed());
    println!();
    print!("{}", serde_yaml::to_string(&config.effective()?)?);
    Ok(())
}

fn set(key: &str, value: &str) -> Result<()> {
    let mut config = Config::load_or_default();
    config.set(key, value)?;
    let path = config.save()?;
    println!(
        "{} {key} = {value} {}",
        "Set".green().bold(),
        format!("({})", path.display()).dimmed()
    );
    Ok(())
}
