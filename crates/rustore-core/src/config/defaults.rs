//! Default configuration values

/// Default configuration file name (YAML)
pub const DEFAULT_CONFIG_YAML: &str = "rustore.yaml";

/// Default configuration file name (TOML)
pub const DEFAULT_CONFIG_TOML: &str = "rustore.toml";

/// Alternative configuration file name
pub const ALT_CONFIG_FILE: &str = ".rustore.yaml";

/// Get list of config file names to search for
pub fn config_file_names() -> Vec<&'static str> {
    vec![
        DEFAULT_CONFIG_YAML,
        DEFAULT_CONFIG_TOML,
        ALT_CONFIG_FILE,
        ".rustore.toml",
    ]
}

/// Default configuration template
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# RuStore publishing configuration
#
# Credentials are never read from this file. Pass them with
# --key-id/--timestamp/--signature or RUSTORE_KEY_ID, RUSTORE_TIMESTAMP
# and RUSTORE_SIGNATURE.

[api]
base_url = "https://public-api.rustore.ru"
timeout_secs = 300
max_stale_draft_recoveries = 1

[publish]
# application_id = "ru.example.app"
publish_type = "manual"          # instantly | manual | delayed
# release_time = "2026-10-20T10:00:00+0300"
# release_notes_file = "whatsnew.txt"
mobile_services_type = "Unknown" # Unknown | HMS
priority_update = 0              # 0..5
artifacts = []
"#;
