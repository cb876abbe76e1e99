use cascade::classify::{classify, should_skip_dir, Disposition};
use cascade::config::{Config, GlobList};
use indexmap::IndexMap;

fn config(process: &[&str], copy: &[&str], rename: &[(&str, &str)]) -> Config {
    Config {
        process: GlobList::new(process.iter().copied()).unwrap(),
        copy: GlobList::new(copy.iter().copied()).unwrap(),
        rename: rename
            .iter()
            .map(|(from, to)| (from.to_string(), to.to_string()))
            .collect::<IndexMap<_, _>>(),
        dirs_to_skip: GlobList::new(["_*", ".git"]).unwrap(),
        ..Config::default()
    }
}

#[test]
fn test_classify_each_disposition() {
    let config = config(&["*.html"], &["*.css"], &[("old.txt", "new.txt")]);

    assert_eq!(classify(&config, "index.html"), Disposition::Process);
    assert_eq!(classify(&config, "style.css"), Disposition::Copy);
    assert_eq!(classify(&config, "old.txt"), Disposition::Rename("new.txt".to_string()));
    assert_eq!(classify(&config, "notes.txt"), Disposition::Skip);
}

#[test]
fn test_process_wins_over_copy_and_rename() {
    let config = config(&["*.html"], &["*.html"], &[("index.html", "home.html")]);
    assert_eq!(classify(&config, "index.html"), Disposition::Process);
}

#[test]
fn test_copy_wins_over_rename() {
    let config = config(&[], &["*.txt"], &[("old.txt", "new.txt")]);
    assert_eq!(classify(&config, "old.txt"), Disposition::Copy);
}

#[test]
fn test_rename_is_exact_match() {
    let config = config(&[], &[], &[("old.txt", "new.txt")]);

    assert_eq!(classify(&config, "old.txt"), Disposition::Rename("new.txt".to_string()));
    assert_eq!(classify(&config, "old.txt.bak"), Disposition::Skip);
    assert_eq!(classify(&config, "OLD.TXT"), Disposition::Skip);
}

#[test]
fn test_glob_wildcards() {
    let config = config(&["page?.html", "[ab]*.txt"], &[], &[]);

    assert_eq!(classify(&config, "page1.html"), Disposition::Process);
    assert_eq!(classify(&config, "page12.html"), Disposition::Skip);
    assert_eq!(classify(&config, "apple.txt"), Disposition::Process);
    assert_eq!(classify(&config, "cherry.txt"), Disposition::Skip);
}

#[test]
fn test_empty_config_skips_everything() {
    assert_eq!(classify(&Config::default(), "index.html"), Disposition::Skip);
    assert!(!should_skip_dir(&Config::default(), "_drafts"));
}

#[test]
fn test_classify_is_deterministic() {
    let config = config(&["*.html"], &["*"], &[("a", "b")]);
    for name in ["x.html", "y.css", "a", "z"] {
        assert_eq!(classify(&config, name), classify(&config, name));
    }
}

#[test]
fn test_should_skip_dir() {
    let config = config(&[], &[], &[]);

    assert!(should_skip_dir(&config, "_drafts"));
    assert!(should_skip_dir(&config, "_templates"));
    assert!(should_skip_dir(&config, ".git"));
    assert!(!should_skip_dir(&config, "blog"));
    assert!(!should_skip_dir(&config, "drafts_"));
}

#[test]
fn test_disposition_display() {
    assert_eq!(Disposition::Process.to_string(), "process");
    assert_eq!(Disposition::Rename("b.txt".to_string()).to_string(), "rename to 'b.txt'");
}
