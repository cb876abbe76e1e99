use std::io;
use std::path::PathBuf;

use cascade::error::Error;

#[test]
fn test_io_error_keeps_path() {
    let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "denied");
    let err = Error::io("out/index.html", io_err);

    match &err {
        Error::Io { path, source } => {
            assert_eq!(path, &PathBuf::from("out/index.html"));
            assert_eq!(source.kind(), io::ErrorKind::PermissionDenied);
        }
        _ => panic!("Expected Io variant"),
    }
    assert_eq!(err.to_string(), "IO error on 'out/index.html': denied.");
}

#[test]
fn test_error_display() {
    let err = Error::MissingRootConfig { path: PathBuf::from("site/_site_config.yaml") };
    assert_eq!(err.to_string(), "Site configuration 'site/_site_config.yaml' does not exist.");

    let err = Error::MalformedConfig {
        path: PathBuf::from("blog/_config.yaml"),
        reason: "top level must be a mapping".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Error processing configuration 'blog/_config.yaml': top level must be a mapping."
    );

    let err = Error::Render { path: PathBuf::from("a.html"), reason: "boom".to_string() };
    assert_eq!(err.to_string(), "Error processing 'a.html': boom");
}

#[test]
fn test_invalid_rename_display() {
    let err = Error::InvalidRename {
        path: PathBuf::from("blog/old.txt"),
        target: "../new.txt".to_string(),
    };
    assert_eq!(
        err.to_string(),
        "Cannot rename 'blog/old.txt' to '../new.txt': target must be a relative path."
    );
}
