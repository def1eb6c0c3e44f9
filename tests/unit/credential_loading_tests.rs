//! Unit tests for access-token resolution and environment overrides.
//!
//! Tests that touch process environment variables are serialized with
//! `serial_test` to avoid cross-test interference.

use serial_test::serial;

use mcp_relay::RelayConfig;

#[tokio::test]
async fn cli_token_takes_precedence() {
    let mut config = RelayConfig::from_toml_str("").expect("config");
    config
        .load_access_token(Some("cli-token".into()))
        .await
        .expect("token");
    assert_eq!(config.access_token, "cli-token");
}

#[tokio::test]
#[serial]
async fn empty_cli_token_is_ignored() {
    // An empty --access-token falls through to keychain/env resolution;
    // with neither configured this must fail, not silently accept "".
    let mut config = RelayConfig::from_toml_str("").expect("config");
    std::env::remove_var("MCP_RELAY_ACCESS_TOKEN");
    let result = config.load_access_token(Some(String::new())).await;
    assert!(result.is_err());
}

#[tokio::test]
#[serial]
async fn env_var_is_a_fallback_source() {
    std::env::set_var("MCP_RELAY_ACCESS_TOKEN", "env-token");
    let mut config = RelayConfig::from_toml_str("").expect("config");
    config.load_access_token(None).await.expect("token");
    assert_eq!(config.access_token, "env-token");
    std::env::remove_var("MCP_RELAY_ACCESS_TOKEN");
}

#[tokio::test]
#[serial]
async fn missing_token_everywhere_is_a_config_error() {
    std::env::remove_var("MCP_RELAY_ACCESS_TOKEN");
    let mut config = RelayConfig::from_toml_str("").expect("config");
    let err = config.load_access_token(None).await.unwrap_err();
    assert!(err.to_string().contains("MCP_RELAY_ACCESS_TOKEN"));
}

#[test]
#[serial]
fn env_overrides_apply_to_api_url_and_port() {
    std::env::set_var("MCP_RELAY_API_URL", "https://env.example.com");
    std::env::set_var("MCP_RELAY_PORT", "4222");

    let mut config = RelayConfig::from_toml_str("").expect("config");
    config.apply_env().expect("env overrides");
    assert_eq!(config.api_url, "https://env.example.com");
    assert_eq!(config.port, 4222);

    std::env::remove_var("MCP_RELAY_API_URL");
    std::env::remove_var("MCP_RELAY_PORT");
}

#[test]
#[serial]
fn invalid_env_port_is_rejected() {
    std::env::set_var("MCP_RELAY_PORT", "not-a-port");
    let mut config = RelayConfig::from_toml_str("").expect("config");
    let err = config.apply_env().unwrap_err();
    assert!(err.to_string().contains("MCP_RELAY_PORT"));
    std::env::remove_var("MCP_RELAY_PORT");
}
