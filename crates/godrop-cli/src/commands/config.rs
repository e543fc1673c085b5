//! Config command implementation.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use godrop_core::config::Config;

use super::{ConfigAction, ConfigArgs};

/// Run the config command.
pub fn run(args: ConfigArgs) -> Result<()> {
    match args.action {
        ConfigAction::Get { key } => {
            let config = Config::load()?;
            match get_config_value(&config, &key) {
                Some(v) => println!("{}: {}", key, v),
                None => println!("Unknown configuration key: {}", key),
            }
        }

        ConfigAction::Set { key, value } => {
            let mut config = Config::load()?;
            if set_config_value(&mut config, &key, &value)? {
                config.validate()?;
                config.save()?;
                println!("Set {} = {}", key, value);
            } else {
                println!("Unknown configuration key: {}", key);
            }
        }

        ConfigAction::Show => {
            let config = Config::load()?;
            println!();
            println!("Godrop Configuration");
            println!("{}", "-".repeat(50));
            println!();
            for (section, keys) in SECTIONS {
                println!("[{section}]");
                for key in *keys {
                    if let Some(value) = get_config_value(&config, key) {
                        println!("  {key} = {value}");
                    }
                }
                println!();
            }
        }

        ConfigAction::Path => {
            println!("{}", Config::config_path().display());
        }

        ConfigAction::Reset => {
            Config::default().save()?;
            println!("Configuration reset to defaults.");
        }
    }

    Ok(())
}

const SECTIONS: &[(&str, &[&str])] = &[
    (
        "session",
        &["port", "download_limit", "timeout_minutes", "save_location"],
    ),
    ("clipboard", &["poll_interval"]),
    ("viewer", &["stats_interval", "tick_interval"]),
    ("browser", &["start_dir"]),
];

fn get_config_value(config: &Config, key: &str) -> Option<String> {
    match key {
        "port" => Some(config.session.port.to_string()),
        "download_limit" => Some(config.session.download_limit.to_string()),
        "timeout_minutes" => Some(config.session.timeout_minutes.to_string()),
        "save_location" => Some(
            config
                .session
                .save_location
                .as_ref()
                .map_or_else(|| "(default)".to_string(), |p| p.display().to_string()),
        ),
        "poll_interval" => Some(format!("{}s", config.clipboard.poll_interval.as_secs())),
        "stats_interval" => Some(format!("{}s", config.viewer.stats_interval.as_secs())),
        "tick_interval" => Some(format!("{}s", config.viewer.tick_interval.as_secs())),
        "start_dir" => Some(
            config
                .browser
                .start_dir
                .as_ref()
                .map_or_else(|| "(home)".to_string(), |p| p.display().to_string()),
        ),
        _ => None,
    }
}

fn set_config_value(config: &mut Config, key: &str, value: &str) -> Result<bool> {
    match key {
        "port" => config.session.port = value.parse()?,
        "download_limit" => config.session.download_limit = value.parse()?,
        "timeout_minutes" => config.session.timeout_minutes = value.parse()?,
        "save_location" => config.session.save_location = optional_path(value),
        "poll_interval" => config.clipboard.poll_interval = parse_seconds(value)?,
        "stats_interval" => config.viewer.stats_interval = parse_seconds(value)?,
        "tick_interval" => config.viewer.tick_interval = parse_seconds(value)?,
        "start_dir" => config.browser.start_dir = optional_path(value),
        _ => return Ok(false),
    }
    Ok(true)
}

fn optional_path(value: &str) -> Option<PathBuf> {
    (!value.is_empty()).then(|| PathBuf::from(value))
}

fn parse_seconds(value: &str) -> Result<Duration> {
    let (digits, scale) = if let Some(mins) = value.strip_suffix('m') {
        (mins, 60)
    } else {
        (value.strip_suffix('s').unwrap_or(value), 1)
    };
    match digits.parse::<u64>() {
        Ok(n) => Ok(Duration::from_secs(n * scale)),
        Err(_) => bail!("invalid duration '{}': use e.g. 2s or 1m", value),
    }
}
