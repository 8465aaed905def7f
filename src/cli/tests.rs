//! Unit tests for CLI commands

use crate::cli::{execute, Cli, Commands};
use crate::runtime_config::RuntimeConfig;
use clap::Parser;
use std::io::Write;

const CONFIG: &str = r#"
packages:
  - name: base
    abstract: true
    result-types:
      - { name: dispatcher, class: DispatcherResult }
    default-result-type: dispatcher
  - name: shop
    extends: base
    namespace: /shop
    default-action-ref: index
    actions:
      - name: index
        class: ShopIndex
        results:
          - { name: success }
      - name: edit_*
        class: "{1}Editor"
        allowed-methods: [save]
"#;

fn config_file(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(".yaml").tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

fn run(command: Commands, runtime: &RuntimeConfig) -> (anyhow::Result<()>, String) {
    let mut out = Vec::new();
    let result = execute(&command, runtime, &mut out);
    (result, String::from_utf8(out).unwrap())
}

#[test]
fn test_check_command_parses() {
    let cli =
        Cli::try_parse_from(["actionroute", "check", "--config", "a.yaml", "--strict"]).unwrap();
    match cli.command {
        Commands::Check { config, strict } => {
            assert_eq!(config.to_string_lossy(), "a.yaml");
            assert!(strict);
        }
        _ => panic!("Expected Check command"),
    }
}

#[test]
fn test_resolve_command_parses() {
    let cli = Cli::try_parse_from([
        "actionroute",
        "resolve",
        "-c",
        "a.yaml",
        "/shop/cart.action",
        "--log-level",
        "debug",
    ])
    .unwrap();
    assert_eq!(cli.log_level, "debug");
    match cli.command {
        Commands::Resolve { path, .. } => assert_eq!(path, "/shop/cart.action"),
        _ => panic!("Expected Resolve command"),
    }
}

#[test]
fn test_missing_config_argument_is_rejected() {
    assert!(Cli::try_parse_from(["actionroute", "routes"]).is_err());
}

#[test]
fn test_check_clean_config() {
    let file = config_file(CONFIG);
    let (result, out) = run(
        Commands::Check {
            config: file.path().to_path_buf(),
            strict: false,
        },
        &RuntimeConfig::default(),
    );
    result.unwrap();
    assert!(out.contains("2 package(s), 2 action(s), 0 error(s)"));
}

#[test]
fn test_check_reports_errors() {
    let file = config_file(
        r#"
packages:
  - name: p
    actions:
      - name: a
        results: [ { name: success } ]
"#,
    );
    let (result, out) = run(
        Commands::Check {
            config: file.path().to_path_buf(),
            strict: false,
        },
        &RuntimeConfig::default(),
    );
    assert!(result.is_err());
    assert!(out.contains("error: [p/a]"));
}

#[test]
fn test_routes_dump() {
    let file = config_file(CONFIG);
    let (result, out) = run(
        Commands::Routes {
            config: file.path().to_path_buf(),
        },
        &RuntimeConfig::default(),
    );
    result.unwrap();
    assert!(out.contains("[namespace] /shop (default: index)"));
    assert!(out.contains("[action] index -> ShopIndex.execute() [package shop]"));
}

#[test]
fn test_resolve_wildcard_path() {
    let file = config_file(CONFIG);
    let runtime = RuntimeConfig {
        dynamic_method_invocation: true,
        ..RuntimeConfig::default()
    };
    let (result, out) = run(
        Commands::Resolve {
            config: file.path().to_path_buf(),
            path: "/shop/edit_profile!save.action".to_string(),
        },
        &runtime,
    );
    result.unwrap();
    assert!(out.contains("class:      profileEditor"));
    assert!(out.contains("method:     save (allowed)"));
    assert!(out.contains("1 = profile"));
}

#[test]
fn test_resolve_miss_is_an_error() {
    let file = config_file(CONFIG);
    let (result, _) = run(
        Commands::Resolve {
            config: file.path().to_path_buf(),
            path: "/nowhere/else.png".to_string(),
        },
        &RuntimeConfig::default(),
    );
    assert!(result.is_err());
}
