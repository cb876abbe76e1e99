use cascade::cli::{Cli, Command};
use clap::Parser;
use std::ffi::OsString;
use std::path::PathBuf;

fn make_args(args: &[&str]) -> Vec<OsString> {
    let mut res = vec![OsString::from("cascade")];
    res.extend(args.iter().map(OsString::from));
    res
}

#[test]
fn test_generate_args() {
    let args = make_args(&["generate", "./site", "./public"]);
    let parsed = Cli::try_parse_from(args).unwrap();

    assert!(!parsed.verbose);
    let Command::Generate(generate) = parsed.command;
    assert_eq!(generate.source_dir, PathBuf::from("./site"));
    assert_eq!(generate.dest_dir, PathBuf::from("./public"));
    assert_eq!(generate.site_config, PathBuf::from("_site_config.yaml"));
}

#[test]
fn test_site_config_flag() {
    let args = make_args(&["generate", "-c", "site.yml", "./site", "./public"]);
    let parsed = Cli::try_parse_from(args).unwrap();

    let Command::Generate(generate) = parsed.command;
    assert_eq!(generate.site_config, PathBuf::from("site.yml"));

    let args = make_args(&["generate", "--site-config", "other.yaml", "./site", "./public"]);
    let parsed = Cli::try_parse_from(args).unwrap();
    let Command::Generate(generate) = parsed.command;
    assert_eq!(generate.site_config, PathBuf::from("other.yaml"));
}

#[test]
fn test_verbose_is_global() {
    let before = Cli::try_parse_from(make_args(&["-v", "generate", "a", "b"])).unwrap();
    assert!(before.verbose);

    let after = Cli::try_parse_from(make_args(&["generate", "--verbose", "a", "b"])).unwrap();
    assert!(after.verbose);
}

#[test]
fn test_missing_args() {
    assert!(Cli::try_parse_from(make_args(&["generate", "./site"])).is_err());
    assert!(Cli::try_parse_from(make_args(&[])).is_err());
}

#[test]
fn test_unknown_command() {
    assert!(Cli::try_parse_from(make_args(&["serve", "./public"])).is_err());
}

#[test]
fn test_too_many_args() {
    let args = make_args(&["generate", "./site", "./public", "extra"]);
    assert!(Cli::try_parse_from(args).is_err());
}
