//! Unit tests for `RelayConfig` parsing, defaults, and validation.

use mcp_relay::RelayConfig;

#[test]
fn empty_toml_yields_defaults() {
    let config = RelayConfig::from_toml_str("").expect("defaults");
    assert_eq!(config.api_url, "http://127.0.0.1:8080");
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 3000);
    assert!(!config.read_only);
    assert_eq!(config.max_sessions, 128);
    assert_eq!(config.keep_alive_seconds, 15);
    assert!(config.access_token.is_empty());
}

#[test]
fn explicit_values_override_defaults() {
    let config = RelayConfig::from_toml_str(
        r#"
api_url = "https://api.example.com"
port = 8443
read_only = true
max_sessions = 4
keep_alive_seconds = 30
"#,
    )
    .expect("config");
    assert_eq!(config.api_url, "https://api.example.com");
    assert_eq!(config.port, 8443);
    assert!(config.read_only);
    assert_eq!(config.max_sessions, 4);
    assert_eq!(config.keep_alive_seconds, 30);
}

#[test]
fn access_token_is_never_read_from_toml() {
    let config = RelayConfig::from_toml_str(r#"api_url = "http://127.0.0.1:9999""#)
        .expect("config");
    assert!(config.access_token.is_empty());
}

#[test]
fn trailing_slashes_are_trimmed_from_api_url() {
    let config =
        RelayConfig::from_toml_str(r#"api_url = "https://api.example.com//""#).expect("config");
    assert_eq!(config.api_url, "https://api.example.com");
}

#[test]
fn zero_max_sessions_is_rejected() {
    let err = RelayConfig::from_toml_str("max_sessions = 0").unwrap_err();
    assert!(err.to_string().contains("max_sessions"));
}

#[test]
fn non_http_api_url_is_rejected() {
    let err = RelayConfig::from_toml_str(r#"api_url = "ftp://files.example.com""#).unwrap_err();
    assert!(err.to_string().contains("api_url"));
}

#[test]
fn invalid_host_is_rejected() {
    let err = RelayConfig::from_toml_str(r#"host = "not-an-ip""#).unwrap_err();
    assert!(err.to_string().contains("host"));
}

#[test]
fn invalid_toml_is_a_config_error() {
    let err = RelayConfig::from_toml_str("port = [ oops").unwrap_err();
    assert!(err.to_string().starts_with("config:"));
}

#[test]
fn socket_addr_combines_host_and_port() {
    let config = RelayConfig::from_toml_str("port = 4100").expect("config");
    let addr = config.socket_addr().expect("addr");
    assert_eq!(addr.to_string(), "127.0.0.1:4100");
}

#[test]
fn cli_overrides_take_precedence() {
    let mut config = RelayConfig::from_toml_str("port = 4100").expect("config");
    config
        .apply_cli(Some("https://cli.example.com".into()), Some(9000), true)
        .expect("overrides");
    assert_eq!(config.api_url, "https://cli.example.com");
    assert_eq!(config.port, 9000);
    assert!(config.read_only);
}

#[test]
fn cli_overrides_are_validated() {
    let mut config = RelayConfig::from_toml_str("").expect("config");
    let err = config
        .apply_cli(Some("gopher://old.example.com".into()), None, false)
        .unwrap_err();
    assert!(err.to_string().contains("api_url"));
}

#[test]
fn read_only_flag_never_unsets_file_value() {
    let mut config = RelayConfig::from_toml_str("read_only = true").expect("config");
    config.apply_cli(None, None, false).expect("overrides");
    assert!(config.read_only);
}

#[test]
fn load_without_path_uses_defaults() {
    let config = RelayConfig::load(None).expect("defaults");
    assert_eq!(config.port, 3000);
}

#[test]
fn load_reads_toml_file() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("relay.toml");
    std::fs::write(&path, "port = 4111\nread_only = true\n").expect("write");

    let config = RelayConfig::load(Some(&path)).expect("config");
    assert_eq!(config.port, 4111);
    assert!(config.read_only);
}

#[test]
fn load_of_missing_file_is_a_config_error() {
    let err = RelayConfig::load(Some(std::path::Path::new("/nonexistent/relay.toml"))).unwrap_err();
    assert!(err.to_string().contains("failed to read config"));
}
