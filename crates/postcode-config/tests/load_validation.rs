//! Config load validation tests for postcode-config.
// crates/postcode-config/tests/load_validation.rs
// =============================================================================
// Module: Config Load Validation Tests
// Description: Validate config loading guards (path, size, encoding).
// Purpose: Ensure config input handling is strict and fail-closed.
// =============================================================================

use std::io::Write;
use std::path::Path;

use postcode_config::ConfigError;
use postcode_config::ConfigSource;
use postcode_config::LogLevel;
use postcode_config::PostcodeConfig;
use tempfile::NamedTempFile;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<PostcodeConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config load".to_string()),
    }
}

fn write_config(content: &[u8]) -> Result<NamedTempFile, String> {
    let mut file = NamedTempFile::new().map_err(|err| err.to_string())?;
    file.write_all(content).map_err(|err| err.to_string())?;
    Ok(file)
}

#[test]
fn load_rejects_path_too_long() -> TestResult {
    let long_path = "a".repeat(5_000);
    let path = Path::new(&long_path);
    assert_invalid(PostcodeConfig::load(Some(path)), "config path exceeds max length")?;
    Ok(())
}

#[test]
fn load_rejects_path_component_too_long() -> TestResult {
    let long_component = "a".repeat(300);
    let path = Path::new(&long_component);
    assert_invalid(PostcodeConfig::load(Some(path)), "config path component too long")?;
    Ok(())
}

#[test]
fn load_rejects_missing_file() -> TestResult {
    let dir = tempfile::tempdir().map_err(|err| err.to_string())?;
    let path = dir.path().join("absent.toml");
    assert_invalid(PostcodeConfig::load(Some(&path)), "config io error")?;
    assert_invalid(PostcodeConfig::load_or_default(Some(&path)), "config io error")?;
    Ok(())
}

#[test]
fn load_with_source_reports_explicit_file() -> TestResult {
    let file = write_config(b"[handler]\ntype = \"http_postcodes_io\"\n")?;
    let (config, source) =
        PostcodeConfig::load_with_source(Some(file.path())).map_err(|err| err.to_string())?;
    if source != ConfigSource::File(file.path().to_path_buf()) {
        return Err(format!("unexpected source {source}"));
    }
    if config.handler.handler_type != "http_postcodes_io" {
        return Err(format!("unexpected handler {}", config.handler.handler_type));
    }
    if ConfigSource::Defaults.to_string() != "defaults" {
        return Err("defaults source should render as defaults".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_oversized_file() -> TestResult {
    let file = write_config(&vec![b'a'; 1_048_577])?;
    assert_invalid(PostcodeConfig::load(Some(file.path())), "config file exceeds size limit")?;
    Ok(())
}

#[test]
fn load_rejects_non_utf8_file() -> TestResult {
    let file = write_config(&[0xFF, 0xFE, 0xFF])?;
    assert_invalid(PostcodeConfig::load(Some(file.path())), "config file must be utf-8")?;
    Ok(())
}

#[test]
fn load_rejects_malformed_toml() -> TestResult {
    let file = write_config(b"[handler\ntype = ")?;
    assert_invalid(PostcodeConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_rejects_unknown_fields() -> TestResult {
    let file = write_config(b"[handler]\ntype = \"regex\"\nretries = 3\n")?;
    assert_invalid(PostcodeConfig::load(Some(file.path())), "config parse error")?;
    let file = write_config(b"[metrics]\nenabled = true\n")?;
    assert_invalid(PostcodeConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_accepts_empty_file_with_defaults() -> TestResult {
    let file = write_config(b"")?;
    let config = PostcodeConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config != PostcodeConfig::default() {
        return Err("empty config should equal defaults".to_string());
    }
    if config.handler.handler_type != "regex" || config.handler.timeout_ms != 500 {
        return Err("unexpected handler defaults".to_string());
    }
    if config.logging.level != LogLevel::Warn || !config.logging.console {
        return Err("unexpected logging defaults".to_string());
    }
    Ok(())
}

#[test]
fn load_reads_full_config() -> TestResult {
    let file = write_config(
        br#"
[handler]
type = "http_postcodes_io"
timeout_ms = 2000
endpoint = "http://127.0.0.1:8080/postcodes"

[logging]
level = "debug"
console = false
file = "logs/postcode.log"
"#,
    )?;
    let config = PostcodeConfig::load(Some(file.path())).map_err(|err| err.to_string())?;
    if config.handler.handler_type != "http_postcodes_io" || config.handler.timeout_ms != 2000 {
        return Err("handler section not read".to_string());
    }
    if config.logging.level != LogLevel::Debug || config.logging.console {
        return Err("logging section not read".to_string());
    }
    if config.logging.file_path().as_deref() != Some(Path::new("logs/postcode.log")) {
        return Err("logging.file not read".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_unknown_log_level() -> TestResult {
    let file = write_config(b"[logging]\nlevel = \"verbose\"\n")?;
    assert_invalid(PostcodeConfig::load(Some(file.path())), "config parse error")?;
    Ok(())
}

#[test]
fn load_rejects_blank_log_file() -> TestResult {
    let file = write_config(b"[logging]\nfile = \"  \"\n")?;
    assert_invalid(PostcodeConfig::load(Some(file.path())), "logging.file must be non-empty")?;
    Ok(())
}
