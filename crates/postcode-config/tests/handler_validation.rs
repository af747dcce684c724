//! Handler section validation tests for postcode-config.
// crates/postcode-config/tests/handler_validation.rs
// =============================================================================
// Module: Handler Config Validation Tests
// Description: Validate handler selection, timeouts, keys, and endpoints.
// Purpose: Ensure handler settings are built only from consistent config.
// =============================================================================

use std::time::Duration;

use postcode_config::ConfigError;
use postcode_config::PostcodeConfig;
use postcode_core::ErrorCode;
use postcode_handlers::HandlerSettings;
use postcode_handlers::HandlerType;

type TestResult = Result<(), String>;

fn assert_invalid(content: &str, needle: &str) -> TestResult {
    match PostcodeConfig::from_toml_str(content) {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

fn settings(content: &str) -> Result<HandlerSettings, String> {
    let config = PostcodeConfig::from_toml_str(content).map_err(|err| err.to_string())?;
    config.handler.handler_settings().map_err(|err| err.to_string())
}

#[test]
fn unknown_handler_type_is_handler_not_found() -> TestResult {
    match PostcodeConfig::from_toml_str("[handler]\ntype = \"http_google\"\n") {
        Err(ConfigError::Handler(error)) => {
            if error.code() != ErrorCode::HandlerNotFoundError {
                return Err(format!("unexpected code {}", error.code().as_str()));
            }
            Ok(())
        }
        Err(other) => Err(format!("unexpected error {other}")),
        Ok(_) => Err("expected unknown handler type to fail".to_string()),
    }
}

#[test]
fn default_config_builds_regex_settings() -> TestResult {
    if settings("")? != HandlerSettings::Regex {
        return Err("expected regex settings".to_string());
    }
    Ok(())
}

#[test]
fn postcodes_io_settings_carry_timeout_and_endpoint() -> TestResult {
    let built = settings(
        "[handler]\ntype = \"http_postcodes_io\"\ntimeout_ms = 750\nendpoint = \
         \"http://127.0.0.1:9/postcodes\"\n",
    )?;
    let HandlerSettings::PostcodesIo(settings) = built else {
        return Err("expected postcodes.io settings".to_string());
    };
    if settings.timeout != Duration::from_millis(750) {
        return Err("timeout not applied".to_string());
    }
    if settings.endpoint != "http://127.0.0.1:9/postcodes" {
        return Err("endpoint not applied".to_string());
    }
    Ok(())
}

#[test]
fn osdatahub_settings_use_inline_key() -> TestResult {
    let built = settings("[handler]\ntype = \"http_osdatahub\"\napi_key = \"secret\"\n")?;
    let HandlerSettings::OsDataHub(settings) = built else {
        return Err("expected os data hub settings".to_string());
    };
    if settings.api_key != "secret" || settings.timeout != Duration::from_millis(500) {
        return Err("inline key or default timeout not applied".to_string());
    }
    Ok(())
}

#[test]
fn osdatahub_rejects_unset_key_variable() -> TestResult {
    let result = settings(
        "[handler]\ntype = \"http_osdatahub\"\napi_key_env = \"POSTCODE_TEST_KEY_THAT_IS_NEVER_SET\"\n",
    );
    match result {
        Err(error) if error.contains("is not set") => Ok(()),
        Err(error) => Err(format!("unexpected error {error}")),
        Ok(_) => Err("expected unset variable to fail".to_string()),
    }
}

#[test]
fn osdatahub_requires_a_key() -> TestResult {
    assert_invalid("[handler]\ntype = \"http_osdatahub\"\n", "is required for http_osdatahub")
}

#[test]
fn inline_and_env_keys_are_exclusive() -> TestResult {
    assert_invalid(
        "[handler]\ntype = \"http_osdatahub\"\napi_key = \"a\"\napi_key_env = \"B\"\n",
        "mutually exclusive",
    )
}

#[test]
fn blank_inline_key_is_rejected() -> TestResult {
    assert_invalid(
        "[handler]\ntype = \"http_osdatahub\"\napi_key = \"  \"\n",
        "handler.api_key must be non-empty",
    )
}

#[test]
fn keys_are_rejected_for_other_handlers() -> TestResult {
    assert_invalid("[handler]\ntype = \"regex\"\napi_key = \"secret\"\n", "not used by the regex")
}

#[test]
fn timeout_bounds_are_enforced() -> TestResult {
    assert_invalid(
        "[handler]\ntype = \"http_postcodes_io\"\ntimeout_ms = 10\n",
        "handler.timeout_ms must be between 50 and 30000",
    )?;
    assert_invalid(
        "[handler]\ntype = \"http_postcodes_io\"\ntimeout_ms = 30001\n",
        "handler.timeout_ms must be between 50 and 30000",
    )?;
    settings("[handler]\ntype = \"http_postcodes_io\"\ntimeout_ms = 50\n")?;
    settings("[handler]\ntype = \"http_postcodes_io\"\ntimeout_ms = 30000\n")?;
    Ok(())
}

#[test]
fn endpoints_must_be_http_urls() -> TestResult {
    assert_invalid(
        "[handler]\ntype = \"http_postcodes_io\"\nendpoint = \"file:///etc/passwd\"\n",
        "must include http:// or https://",
    )?;
    assert_invalid(
        "[handler]\ntype = \"http_postcodes_io\"\nendpoint = \"::\"\n",
        "is not a valid url",
    )?;
    assert_invalid(
        "[handler]\ntype = \"regex\"\nendpoint = \"https://example.com\"\n",
        "handler.endpoint is not used by the regex handler",
    )
}

#[test]
fn parsed_type_matches_identifier() -> TestResult {
    let config = PostcodeConfig::from_toml_str("[handler]\ntype = \"http_postcodes_io\"\n")
        .map_err(|err| err.to_string())?;
    match config.handler.parsed_type() {
        Ok(HandlerType::PostcodesIo) => Ok(()),
        Ok(other) => Err(format!("unexpected type {other}")),
        Err(error) => Err(error.to_string()),
    }
}
