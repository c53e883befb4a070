use super::{apply_env, apply_file, Settings};

use std::collections::HashMap;

fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_leave_destination_unset() {
    let settings = Settings::default();
    assert_eq!(settings.server_bind, "127.0.0.1:3000");
    assert_eq!(settings.sheets_url, None);
}

#[test]
fn settings_file_sets_bind_and_destination() {
    let mut settings = Settings::default();
    apply_file(
        &mut settings,
        r#"
bind_addr = "0.0.0.0:8080"
sheets_url = "https://script.google.com/macros/s/abc/exec"
"#,
    );
    assert_eq!(settings.server_bind, "0.0.0.0:8080");
    assert_eq!(
        settings.sheets_url.as_deref(),
        Some("https://script.google.com/macros/s/abc/exec")
    );
}

#[test]
fn unparsable_settings_file_is_ignored() {
    let mut settings = Settings::default();
    apply_file(&mut settings, "bind_addr = [not toml");
    assert_eq!(settings, Settings::default());
}

#[test]
fn environment_overrides_file_values() {
    let mut settings = Settings::default();
    apply_file(&mut settings, r#"sheets_url = "https://file.example/exec""#);
    apply_env(
        &mut settings,
        env_of(&[
            ("GOOGLE_SHEETS_URL", "https://env.example/exec"),
            ("SERVER_BIND", "127.0.0.1:9000"),
        ]),
    );
    assert_eq!(settings.sheets_url.as_deref(), Some("https://env.example/exec"));
    assert_eq!(settings.server_bind, "127.0.0.1:9000");
}

#[test]
fn prefixed_environment_names_take_precedence() {
    let mut settings = Settings::default();
    apply_env(
        &mut settings,
        env_of(&[
            ("GOOGLE_SHEETS_URL", "https://plain.example/exec"),
            ("APP__SHEETS_URL", "https://prefixed.example/exec"),
            ("SERVER_BIND", "127.0.0.1:9000"),
            ("APP__BIND_ADDR", "127.0.0.1:9001"),
        ]),
    );
    assert_eq!(
        settings.sheets_url.as_deref(),
        Some("https://prefixed.example/exec")
    );
    assert_eq!(settings.server_bind, "127.0.0.1:9001");
}

#[test]
fn blank_destination_counts_as_unset() {
    let mut settings = Settings::default();
    apply_env(&mut settings, env_of(&[("GOOGLE_SHEETS_URL", "   ")]));
    assert_eq!(settings.sheets_url, None);
}
