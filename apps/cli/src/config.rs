use std::{collections::HashMap, fs, time::Duration};

pub const SETTINGS_FILE: &str = "safe_routes.toml";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub nearby_radius_km: f64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000".into(),
            request_timeout_secs: 10,
            nearby_radius_km: 10.0,
        }
    }
}

impl Settings {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn set(&mut self, key: &str, value: &str) {
        match key {
            "api_base_url" => self.api_base_url = value.trim().to_string(),
            "request_timeout_secs" => {
                if let Ok(parsed) = value.trim().parse::<u64>() {
                    if parsed > 0 {
                        self.request_timeout_secs = parsed;
                    }
                }
            }
            "nearby_radius_km" => {
                if let Ok(parsed) = value.trim().parse::<f64>() {
                    if parsed.is_finite() {
                        self.nearby_radius_km = parsed;
                    }
                }
            }
            _ => {}
        }
    }
}

pub fn load_settings() -> Settings {
    let raw = fs::read_to_string(SETTINGS_FILE).ok();
    settings_from_sources(raw.as_deref(), |key| std::env::var(key).ok())
}

/// Defaults, then the flat settings file, then environment overrides. Values
/// that fail to parse leave the previous layer in place.
pub fn settings_from_sources(
    file_contents: Option<&str>,
    env: impl Fn(&str) -> Option<String>,
) -> Settings {
    let mut settings = Settings::default();

    if let Some(raw) = file_contents {
        if let Ok(file_cfg) = toml::from_str::<HashMap<String, toml::Value>>(raw) {
            for (key, value) in &file_cfg {
                let value = match value {
                    toml::Value::String(text) => text.clone(),
                    toml::Value::Integer(number) => number.to_string(),
                    toml::Value::Float(number) => number.to_string(),
                    _ => continue,
                };
                settings.set(key, &value);
            }
        }
    }

    if let Some(v) = env("SAFE_ROUTES_API_BASE_URL") {
        settings.set("api_base_url", &v);
    }
    if let Some(v) = env("APP__API_BASE_URL") {
        settings.set("api_base_url", &v);
    }
    if let Some(v) = env("APP__REQUEST_TIMEOUT_SECS") {
        settings.set("request_timeout_secs", &v);
    }
    if let Some(v) = env("APP__NEARBY_RADIUS_KM") {
        settings.set("nearby_radius_km", &v);
    }

    settings
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
