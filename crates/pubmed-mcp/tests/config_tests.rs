//! Credential resolution, config file and setup flow tests.

use std::io::Cursor;

use proptest::prelude::*;
use tempfile::TempDir;

use pubmed_mcp::config::{ConfigFile, CredentialSources, Credentials};
use pubmed_mcp::error::ConfigError;
use pubmed_mcp::setup::{self, SetupOptions};

fn creds(api_key: Option<&str>, email: Option<&str>) -> Credentials {
    Credentials::new(api_key.map(String::from), email.map(String::from))
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn test_cli_overrides_file_and_env() {
    let resolved = CredentialSources {
        cli: creds(Some("cli-key"), None),
        file: creds(Some("file-key"), Some("file@example.org")),
        env: creds(Some("env-key"), Some("env@example.org")),
    }
    .resolve();

    assert_eq!(resolved.api_key.as_deref(), Some("cli-key"));
    assert_eq!(resolved.email.as_deref(), Some("file@example.org"));
}

#[test]
fn test_env_fills_what_nothing_else_sets() {
    let resolved = CredentialSources {
        cli: Credentials::default(),
        file: Credentials::default(),
        env: creds(Some("env-key"), Some("env@example.org")),
    }
    .resolve();

    assert_eq!(resolved, creds(Some("env-key"), Some("env@example.org")));
    assert!(resolved.require().is_ok());
}

#[test]
fn test_nothing_configured_fails_require() {
    let resolved = CredentialSources::default().resolve();

    assert!(resolved.is_empty());
    assert!(matches!(resolved.require(), Err(ConfigError::MissingCredentials)));
}

#[test]
fn test_blank_cli_value_does_not_shadow_env() {
    let resolved = CredentialSources {
        cli: creds(Some("  "), Some("")),
        file: Credentials::default(),
        env: creds(Some("env-key"), Some("env@example.org")),
    }
    .resolve();

    assert_eq!(resolved.api_key.as_deref(), Some("env-key"));
    assert_eq!(resolved.email.as_deref(), Some("env@example.org"));
}

fn value() -> impl Strategy<Value = Option<String>> {
    proptest::option::of("[a-z0-9]{1,12}")
}

proptest! {
    #[test]
    fn prop_each_field_takes_first_present_source(
        cli_key in value(), cli_email in value(),
        file_key in value(), file_email in value(),
        env_key in value(), env_email in value(),
    ) {
        let resolved = CredentialSources {
            cli: Credentials::new(cli_key.clone(), cli_email.clone()),
            file: Credentials::new(file_key.clone(), file_email.clone()),
            env: Credentials::new(env_key.clone(), env_email.clone()),
        }
        .resolve();

        prop_assert_eq!(resolved.api_key, cli_key.or(file_key).or(env_key));
        prop_assert_eq!(resolved.email, cli_email.or(file_email).or(env_email));
    }
}

// =============================================================================
// Config file
// =============================================================================

#[test]
fn test_config_file_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"api_key": "abc123", "email": "me@example.org"}"#).unwrap();

    let file = ConfigFile::load(&path).unwrap();
    assert_eq!(file.credentials(), creds(Some("abc123"), Some("me@example.org")));
}

#[test]
fn test_config_file_partial() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, r#"{"email": "me@example.org"}"#).unwrap();

    let file = ConfigFile::load_or_default(Some(&path));
    assert_eq!(file.api_key, None);
    assert_eq!(file.email.as_deref(), Some("me@example.org"));
}

#[test]
fn test_invalid_config_file_is_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    std::fs::write(&path, "not json at all").unwrap();

    assert!(matches!(ConfigFile::load(&path), Err(ConfigError::Json { .. })));
    assert_eq!(ConfigFile::load_or_default(Some(&path)), ConfigFile::default());
}

#[test]
fn test_missing_config_file_is_ignored() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("absent.json");

    assert!(matches!(ConfigFile::load(&path), Err(ConfigError::Io { .. })));
    assert_eq!(ConfigFile::load_or_default(Some(&path)), ConfigFile::default());
    assert_eq!(ConfigFile::load_or_default(None), ConfigFile::default());
}

#[test]
fn test_config_file_save_then_load() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let file = ConfigFile {
        api_key: Some("k".into()),
        email: None,
    };

    file.save(&path).unwrap();

    assert_eq!(ConfigFile::load(&path).unwrap(), file);
}

// =============================================================================
// Setup flow
// =============================================================================

#[test]
fn test_setup_with_arguments_writes_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let options = SetupOptions {
        api_key: Some("abc123".into()),
        email: Some("me@example.org".into()),
        config: path.clone(),
        env_only: false,
    };
    let mut out = Vec::new();

    let credentials = setup::run(&options, Cursor::new(""), &mut out).unwrap();

    assert_eq!(credentials, creds(Some("abc123"), Some("me@example.org")));
    assert_eq!(ConfigFile::load(&path).unwrap().credentials(), credentials);

    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Configuration saved to"));
    assert!(printed.contains("NCBI_API_KEY"));
    assert!(!printed.contains("API Key: "));
}

#[test]
fn test_setup_prompts_and_retries_bad_email() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let options = SetupOptions {
        api_key: None,
        email: None,
        config: path,
        env_only: true,
    };
    let input = Cursor::new("my-key\nnot-an-email\nme@example.org\n");
    let mut out = Vec::new();

    let credentials = setup::run(&options, input, &mut out).unwrap();

    assert_eq!(credentials, creds(Some("my-key"), Some("me@example.org")));
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("API Key: "));
    assert!(printed.contains("Invalid email format. Please try again."));
    assert!(!printed.contains("Configuration saved to"));
    assert!(!options.config.exists());
}

#[test]
fn test_setup_with_nothing_entered_warns() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.json");
    let options = SetupOptions {
        api_key: None,
        email: None,
        config: path.clone(),
        env_only: false,
    };
    let mut out = Vec::new();

    let credentials = setup::run(&options, Cursor::new("\n\n"), &mut out).unwrap();

    assert!(credentials.is_empty());
    assert!(!path.exists());
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Warning: No API key provided."));
    assert!(printed.contains("Warning: No email provided."));
}

#[test]
fn test_setup_reports_unwritable_config() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("missing-dir").join("config.json");
    let options = SetupOptions {
        api_key: Some("abc123".into()),
        email: None,
        config: path,
        env_only: false,
    };
    let mut out = Vec::new();

    let credentials = setup::run(&options, Cursor::new("\n"), &mut out).unwrap();

    assert_eq!(credentials.api_key.as_deref(), Some("abc123"));
    let printed = String::from_utf8(out).unwrap();
    assert!(printed.contains("Error saving configuration:"));
}
