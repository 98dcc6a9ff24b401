//! Server configuration at ~/.config/famcal/config.toml.
//!
//! The config file is the setup path: it registers calendars with their
//! display colors and the optional weather source, and points the proxy
//! at the hub. The registry built from it is never mutated afterwards.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};
use serde::Deserialize;

use famcal_core::registry::{self, CalendarRegistration};

pub const DEFAULT_PORT: u16 = 4098;

fn default_port() -> u16 {
    DEFAULT_PORT
}

#[derive(Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_port")]
    pub listen_port: u16,

    pub hub: HubConfig,

    #[serde(default, rename = "calendar")]
    pub calendars: Vec<CalendarEntry>,
}

#[derive(Deserialize)]
pub struct HubConfig {
    pub url: String,
    pub token: String,
}

/// One `[[calendar]]` block.
#[derive(Deserialize)]
pub struct CalendarEntry {
    pub entity: String,
    pub color: Option<ColorValue>,
    pub name: Option<String>,
    pub weather_entity: Option<String>,
}

/// Colors are either "#rrggbb" strings or [r, g, b] triples.
#[derive(Deserialize)]
#[serde(untagged)]
pub enum ColorValue {
    Hex(String),
    Rgb([u8; 3]),
}

impl CalendarEntry {
    pub fn into_registration(self) -> Result<CalendarRegistration> {
        let color = match self.color {
            Some(ColorValue::Hex(hex)) => {
                if !registry::is_valid_hex_color(&hex) {
                    bail!(
                        "Invalid color '{hex}' for calendar '{}' (expected \"#rrggbb\" or [r, g, b])",
                        self.entity
                    );
                }
                hex
            }
            Some(ColorValue::Rgb(rgb)) => registry::rgb_to_hex(rgb),
            None => registry::random_palette_color().to_string(),
        };

        Ok(CalendarRegistration {
            entity: self.entity,
            color,
            name: self.name.filter(|name| !name.is_empty()),
            weather_entity: self.weather_entity.filter(|entity| !entity.is_empty()),
        })
    }
}

impl ServerConfig {
    /// Config path: $FAMCAL_CONFIG or ~/.config/famcal/config.toml.
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("FAMCAL_CONFIG") {
            return Ok(PathBuf::from(path));
        }
        let config_dir = dirs::config_dir()
            .context("Could not determine config directory")?
            .join("famcal");
        Ok(config_dir.join("config.toml"))
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read config file at {}", path.display()))?;
        let config: ServerConfig =
            toml::from_str(&content).context("Invalid config file")?;
        Ok(config)
    }

    /// Write a commented template config.
    pub fn create_default_config(path: &Path) -> Result<()> {
        let contents = format!(
            "\
# famcal configuration

# Port the proxy listens on:
# listen_port = {DEFAULT_PORT}

[hub]
url = \"http://homeassistant.local:8123\"
token = \"<long-lived access token>\"

# One block per calendar. Color accepts \"#rrggbb\" or [r, g, b];
# omit it for a random palette pick.
# [[calendar]]
# entity = \"calendar.family\"
# color = \"#4FC3F7\"
# name = \"Family\"
# weather_entity = \"weather.home\"
"
        );

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).with_context(|| {
                format!("Could not create config directory {}", parent.display())
            })?;
        }
        std::fs::write(path, contents)
            .with_context(|| format!("Could not write config file {}", path.display()))?;

        Ok(())
    }
}
