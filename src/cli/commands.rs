//! Handlers for the `config` subcommand.

use std::path::Path;

use super::args::ConfigAction;
use termcam::config::{self, Config, Overrides, RenderConfig, DEFAULT_CONFIG_TOML};
use termcam::terminal::ColorProfile;

/// Handle config subcommand actions.
pub fn handle_config_action(action: ConfigAction, path: Option<&Path>) -> Result<(), String> {
    let config_path = path.map(Path::to_path_buf).unwrap_or_else(config::default_path);

    match action {
        ConfigAction::Show => {
            let file = Config::load(path).map_err(|e| e.to_string())?;
            let cfg = RenderConfig::resolve(
                &file,
                &Overrides::default(),
                crossterm::terminal::size().ok(),
                ColorProfile::detect,
            )
            .map_err(|e| e.to_string())?;

            println!("Current configuration:");
            println!("  Output: {}x{} ({:?})", cfg.width, cfg.height, cfg.mode);
            println!("  Ramp: \"{}\"", cfg.ramp);
            match cfg.forced_color {
                Some(c) => println!("  Color: {}", c),
                None => println!("  Color: per pixel"),
            }
            println!("  Profile: {}", cfg.profile.name());
            println!("  Source: {:?} ({})", cfg.source, cfg.capture.device);
            println!("  Capture: {}", cfg.capture.resolution);
            match cfg.chroma_key {
                Some(t) => println!("  Chroma key: on (threshold {})", t),
                None => println!("  Chroma key: off"),
            }
            println!(
                "  Samples: {} {:?}",
                cfg.background.directory.display(),
                cfg.background.samples
            );
            println!();

            if config_path.exists() {
                println!("Config file: {} (exists)", config_path.display());
            } else {
                println!("Config file: {} (not found)", config_path.display());
            }
            Ok(())
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(format!(
                    "Config file already exists: {}\nUse 'termcam config show' to view current settings.",
                    config_path.display()
                ));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)
                    .map_err(|e| format!("Error creating config directory: {}", e))?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG_TOML)
                .map_err(|e| format!("Error writing config file: {}", e))?;

            println!("Created config file: {}", config_path.display());
            Ok(())
        }
    }
}
