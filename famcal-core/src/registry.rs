//! Calendar display configuration served by the /config endpoint.
//!
//! The registry is populated once at setup from the persisted
//! registrations and only read afterwards; request handlers never mutate
//! it.

use std::collections::HashMap;

use serde::Serialize;

/// Bright palette used when a registration does not pick a color.
pub const COLOR_PALETTE: [&str; 15] = [
    "#4FC3F7", // light blue
    "#BA68C8", // light purple
    "#81C784", // light green
    "#FFB74D", // light orange
    "#F06292", // light pink
    "#4DB6AC", // light teal
    "#FF7043", // light red
    "#9575CD", // medium purple
    "#7986CB", // medium indigo
    "#4DD0E1", // light cyan
    "#AED581", // light lime
    "#FFD54F", // light amber
    "#FF8A65", // light deep orange
    "#A1887F", // light brown
    "#90A4AE", // light blue grey
];

pub const DEFAULT_COLOR: &str = "#2196f3";

/// One calendar registration from the setup flow.
#[derive(Debug, Clone)]
pub struct CalendarRegistration {
    pub entity: String,
    /// "#rrggbb" display color.
    pub color: String,
    pub name: Option<String>,
    /// Weather source; global across registrations, last one wins.
    pub weather_entity: Option<String>,
}

/// Registered calendars with their display colors and names, plus the
/// selected weather source. Serializes directly into the /config wire
/// shape.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConfigRegistry {
    calendars: Vec<String>,
    colors: HashMap<String, String>,
    names: HashMap<String, String>,
    weather_entity: Option<String>,
}

impl ConfigRegistry {
    pub fn new() -> Self {
        ConfigRegistry::default()
    }

    /// Upsert by calendar identifier: registering the same calendar twice
    /// replaces its color and name instead of duplicating the entry.
    pub fn register(&mut self, registration: CalendarRegistration) {
        let entity = registration.entity;

        if !self.calendars.contains(&entity) {
            self.calendars.push(entity.clone());
        }
        self.colors.insert(entity.clone(), registration.color);
        match registration.name {
            Some(name) => {
                self.names.insert(entity, name);
            }
            None => {
                self.names.remove(&entity);
            }
        }
        if let Some(weather) = registration.weather_entity {
            self.weather_entity = Some(weather);
        }
    }

    pub fn calendars(&self) -> &[String] {
        &self.calendars
    }

    pub fn color(&self, entity: &str) -> Option<&str> {
        self.colors.get(entity).map(String::as_str)
    }

    pub fn name(&self, entity: &str) -> Option<&str> {
        self.names.get(entity).map(String::as_str)
    }

    pub fn weather_entity(&self) -> Option<&str> {
        self.weather_entity.as_deref()
    }
}

/// True for "#rrggbb" strings.
pub fn is_valid_hex_color(value: &str) -> bool {
    value.len() == 7
        && value.starts_with('#')
        && value[1..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Convert an RGB triple to "#rrggbb".
pub fn rgb_to_hex(rgb: [u8; 3]) -> String {
    format!("#{:02x}{:02x}{:02x}", rgb[0], rgb[1], rgb[2])
}

/// Pick a palette color for registrations that did not choose one.
pub fn random_palette_color() -> &'static str {
    use rand::seq::IndexedRandom;

    COLOR_PALETTE
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(DEFAULT_COLOR)
}
