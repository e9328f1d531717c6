//! Viewer configuration.
//!
//! Defaults reproduce the living-room page; individual values can be
//! overridden by key (canvas `data-*` attributes on the web, environment
//! variables natively).

use glam::Vec3;

#[derive(Debug, Clone, PartialEq)]
pub struct ViewerConfig {
    pub canvas_id: String,
    pub model_url: String,
    pub model_offset: Vec3,
    pub model_scale: f32,
    /// Radians of rotation per pixel of drag.
    pub sensitivity: f32,
    /// Distance from the eye to the look-at point.
    pub look_radius: f32,
    pub eye_height: f32,
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            canvas_id: "threeCanvas".to_string(),
            model_url: "./src/Models/lowPolyLivingRoom.gltf".to_string(),
            model_offset: Vec3::new(0.0, -1.0, 0.0),
            model_scale: 0.25,
            sensitivity: 0.01,
            look_radius: 5.0,
            eye_height: 30.0,
            fov_degrees: 75.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

impl ViewerConfig {
    pub const OVERRIDE_KEYS: [&'static str; 6] = [
        "model",
        "sensitivity",
        "look-radius",
        "eye-height",
        "fov",
        "model-scale",
    ];

    /// Applies every override `lookup` knows about. Values that fail to parse
    /// are logged and leave the default in place.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        for key in Self::OVERRIDE_KEYS {
            let Some(raw) = lookup(key) else { continue };
            let raw = raw.trim();

            if key == "model" {
                if raw.is_empty() {
                    log::warn!("ignoring empty model override");
                } else {
                    self.model_url = raw.to_string();
                }
                continue;
            }

            let value = match raw.parse::<f32>() {
                Ok(v) if v.is_finite() => v,
                _ => {
                    log::warn!("ignoring {} override: {:?} is not a number", key, raw);
                    continue;
                }
            };

            match key {
                "sensitivity" => self.sensitivity = value,
                "look-radius" if value > 0.0 => self.look_radius = value,
                "eye-height" => self.eye_height = value,
                "fov" if value > 0.0 && value < 180.0 => self.fov_degrees = value,
                "model-scale" if value > 0.0 => self.model_scale = value,
                _ => log::warn!("ignoring {} override: {} is out of range", key, value),
            }
        }
    }

    /// Environment variable consulted natively for an override key.
    pub fn env_var_name(key: &str) -> String {
        format!("ROOM_VIEWER_{}", key.to_uppercase().replace('-', "_"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_room_page() {
        let config = ViewerConfig::default();
        assert_eq!(config.sensitivity, 0.01);
        assert_eq!(config.look_radius, 5.0);
        assert_eq!(config.eye_height, 30.0);
        assert_eq!(config.model_offset, Vec3::new(0.0, -1.0, 0.0));
        assert_eq!(config.model_scale, 0.25);
    }

    #[test]
    fn overrides_replace_parsed_values() {
        let mut config = ViewerConfig::default();
        config.apply_overrides(lookup_from(&[
            ("sensitivity", "0.02"),
            ("model", "  ./room.glb "),
            ("fov", "60"),
        ]));
        assert_eq!(config.sensitivity, 0.02);
        assert_eq!(config.model_url, "./room.glb");
        assert_eq!(config.fov_degrees, 60.0);
        assert_eq!(config.look_radius, 5.0);
    }

    #[test]
    fn bad_overrides_keep_defaults() {
        let mut config = ViewerConfig::default();
        config.apply_overrides(lookup_from(&[
            ("sensitivity", "fast"),
            ("look-radius", "-3"),
            ("fov", "NaN"),
            ("model", ""),
        ]));
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn env_names_are_upper_snake_case() {
        assert_eq!(ViewerConfig::env_var_name("look-radius"), "ROOM_VIEWER_LOOK_RADIUS");
    }
}
