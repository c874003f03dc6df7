//! Argument parsing and configuration tests for the CLI.

use super::{Cli, CliConfig, Commands};
use clap::Parser;

fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

#[test]
fn test_install_arguments() {
    let cli = parse(&[
        "superface",
        "install",
        "starwars/character-information@1.0.2",
        "--providers",
        "swapi,providers/mock.json",
        "--force",
        "--scan",
        "2",
    ]);

    match cli.command {
        Commands::Install(cmd) => {
            assert_eq!(cmd.profile.as_deref(), Some("starwars/character-information@1.0.2"));
            assert_eq!(cmd.providers, vec!["swapi".to_string(), "providers/mock.json".to_string()]);
            assert!(cmd.force);
            assert!(!cmd.local);
            assert_eq!(cmd.scan, 2);
        }
        other => panic!("Expected install, got {other:?}"),
    }
}

#[test]
fn test_install_without_profile() {
    match parse(&["superface", "install"]).command {
        Commands::Install(cmd) => {
            assert!(cmd.profile.is_none());
            assert!(cmd.providers.is_empty());
            assert_eq!(cmd.scan, 0);
        }
        other => panic!("Expected install, got {other:?}"),
    }
}

#[test]
fn test_local_requires_profile() {
    assert!(Cli::try_parse_from(["superface", "install", "--local"]).is_err());
    assert!(Cli::try_parse_from(["superface", "install", "--local", "a.supr"]).is_ok());
}

#[test]
fn test_check_arguments() {
    let cli = parse(&[
        "superface",
        "check",
        "--profileId",
        "starwars/character-information",
        "--providerName",
        "swapi",
        "--json",
        "--quiet",
    ]);

    assert!(cli.quiet);
    match cli.command {
        Commands::Check(cmd) => {
            assert_eq!(cmd.profile_id.as_deref(), Some("starwars/character-information"));
            assert_eq!(cmd.provider_name.as_deref(), Some("swapi"));
            assert!(cmd.json);
            assert!(cmd.version.is_none());
        }
        other => panic!("Expected check, got {other:?}"),
    }
}

#[test]
fn test_provider_name_requires_profile_id() {
    assert!(Cli::try_parse_from(["superface", "check", "--providerName", "swapi"]).is_err());
}

#[test]
fn test_verbose_conflicts_with_quiet() {
    assert!(Cli::try_parse_from(["superface", "--verbose", "--quiet", "check"]).is_err());
}

#[test]
fn test_build_config() {
    assert_eq!(
        parse(&["superface", "install"]).build_config(),
        CliConfig {
            log_level: "warn".to_string(),
            no_progress: false,
        }
    );
    assert_eq!(parse(&["superface", "-v", "install"]).build_config().log_level, "debug");

    let config = parse(&["superface", "check", "--quiet", "--no-progress"]).build_config();
    assert_eq!(config.log_level, "error");
    assert!(config.no_progress);
}
