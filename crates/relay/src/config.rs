use std::{collections::HashMap, fs, path::Path};

pub const SETTINGS_FILE: &str = "relay.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub server_bind: String,
    /// Spreadsheet endpoint that stores submissions. Checked per request, so a
    /// missing value fails submissions instead of startup.
    pub sheets_url: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server_bind: "127.0.0.1:3000".into(),
            sheets_url: None,
        }
    }
}

pub fn load_settings() -> Settings {
    let mut settings = Settings::default();

    if let Ok(raw) = fs::read_to_string(Path::new(SETTINGS_FILE)) {
        apply_file(&mut settings, &raw);
    }
    apply_env(&mut settings, |key| std::env::var(key).ok());

    settings
}

fn apply_file(settings: &mut Settings, raw: &str) {
    let Ok(file_cfg) = toml::from_str::<HashMap<String, String>>(raw) else {
        tracing::warn!(file = SETTINGS_FILE, "ignoring unparsable settings file");
        return;
    };

    if let Some(v) = non_blank(file_cfg.get("bind_addr").cloned()) {
        settings.server_bind = v;
    }
    if let Some(v) = non_blank(file_cfg.get("sheets_url").cloned()) {
        settings.sheets_url = Some(v);
    }
}

fn apply_env(settings: &mut Settings, lookup: impl Fn(&str) -> Option<String>) {
    for key in ["SERVER_BIND", "APP__BIND_ADDR"] {
        if let Some(v) = non_blank(lookup(key)) {
            settings.server_bind = v;
        }
    }

    for key in ["GOOGLE_SHEETS_URL", "APP__SHEETS_URL"] {
        if let Some(v) = non_blank(lookup(key)) {
            settings.sheets_url = Some(v);
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
