//! Unit tests for configuration parsing, validation, and feature flags.

use std::io::Write;

use groupme_bridge::config::GlobalConfig;
use groupme_bridge::AppError;

const VALID: &str = r#"
[discord]
channel_id = "123456789"

[groupme]
bot_id = "bot-abc"
"#;

#[test]
fn valid_config_parses_with_defaults() {
    let config = GlobalConfig::from_toml_str(VALID).expect("valid config");
    assert_eq!(config.discord.channel_id, "123456789");
    assert_eq!(config.groupme.bot_id, "bot-abc");
    assert_eq!(config.http_port, 8000);
    assert_eq!(config.groupme.api_base, "https://api.groupme.com/v3");
    assert_eq!(config.groupme.image_base, "https://image.groupme.com");
    assert_eq!(config.discord.api_base, "https://discord.com/api/v10");
    assert!(config.groupme.group_id.is_none());
}

#[test]
fn empty_bot_id_is_rejected() {
    let toml = r#"
[discord]
channel_id = "123"

[groupme]
bot_id = "  "
"#;
    let err = GlobalConfig::from_toml_str(toml).expect_err("should reject");
    assert!(matches!(err, AppError::Config(_)));
    assert!(err.to_string().contains("bot_id"));
}

#[test]
fn empty_channel_id_is_rejected() {
    let toml = r#"
[discord]
channel_id = ""

[groupme]
bot_id = "bot-abc"
"#;
    let err = GlobalConfig::from_toml_str(toml).expect_err("should reject");
    assert!(err.to_string().contains("channel_id"));
}

#[test]
fn missing_section_is_a_config_error() {
    let err = GlobalConfig::from_toml_str("http_port = 9000").expect_err("should reject");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn overridden_bases_and_port_are_kept() {
    let toml = r#"
http_port = 9100

[discord]
channel_id = "123"
api_base = "http://127.0.0.1:4000"

[groupme]
bot_id = "bot-abc"
group_id = "g-77"
api_base = "http://127.0.0.1:4001"
image_base = "http://127.0.0.1:4002"
"#;
    let config = GlobalConfig::from_toml_str(toml).expect("valid config");
    assert_eq!(config.http_port, 9100);
    assert_eq!(config.discord.api_base, "http://127.0.0.1:4000");
    assert_eq!(config.groupme.group_id.as_deref(), Some("g-77"));
}

#[test]
fn load_from_path_reads_file() {
    let mut file = tempfile::NamedTempFile::new().expect("tempfile");
    file.write_all(VALID.as_bytes()).expect("write config");
    let config = GlobalConfig::load_from_path(file.path()).expect("load");
    assert_eq!(config.groupme.bot_id, "bot-abc");
}

#[test]
fn load_from_missing_path_is_a_config_error() {
    let err = GlobalConfig::load_from_path("/nonexistent/config.toml").expect_err("should fail");
    assert!(matches!(err, AppError::Config(_)));
}

#[test]
fn features_disabled_without_access_token() {
    let config = GlobalConfig::from_toml_str(VALID).expect("valid config");
    assert!(!config.image_support());
    assert!(!config.reactions_enabled());
    assert!(!config.context_lookup_enabled());
}

#[test]
fn features_enabled_with_access_token() {
    let mut config = GlobalConfig::from_toml_str(VALID).expect("valid config");
    config.groupme.access_token = "tok".into();
    assert!(config.image_support());
    assert!(config.reactions_enabled());
    // Context lookup additionally needs a group id.
    assert!(!config.context_lookup_enabled());
    config.groupme.group_id = Some("g-1".into());
    assert!(config.context_lookup_enabled());
}
