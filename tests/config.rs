use std::fs;
use std::path::Path;

use koth_terminal::config::{Config, DEFAULT_CLOCK_SECS};

#[test]
fn parses_inline_contestants_with_defaults() {
    let raw = r#"
contestants = ["Alice", " Bob ", "", "Carol"]
"#;
    let cfg = Config::parse(raw, Path::new(".")).expect("config should parse");
    assert_eq!(cfg.contestants, vec!["Alice", "Bob", "Carol"]);
    assert_eq!(cfg.clock_secs, DEFAULT_CLOCK_SECS);
    assert!(!cfg.shuffle);
    assert!(cfg.warnings.is_empty());
    assert_eq!(cfg.seed_order(), cfg.contestants);
}

#[test]
fn rejects_fewer_than_two_names() {
    let err = Config::parse(r#"contestants = ["Alone", "  "]"#, Path::new("."))
        .expect_err("one name is not enough");
    assert!(err.to_string().contains("at least 2"));
}

#[test]
fn warns_on_duplicate_names() {
    let cfg = Config::parse(r#"contestants = ["Ann", "Ben", "Ann"]"#, Path::new("."))
        .expect("duplicates are allowed");
    assert_eq!(cfg.contestants.len(), 3);
    assert_eq!(cfg.warnings.len(), 1);
    assert!(cfg.warnings[0].contains("Ann"));
}

#[test]
fn reads_contestants_file_relative_to_config() {
    let dir = std::env::temp_dir().join(format!("koth-config-{}", std::process::id()));
    fs::create_dir_all(&dir).expect("temp dir");
    fs::write(dir.join("roster.txt"), "# tonight\nAlice\nBob\n\nCarol\n").expect("roster");
    let raw = r#"
clock_secs = 900
shuffle = true
contestants_file = "roster.txt"
"#;
    let cfg = Config::parse(raw, &dir).expect("config should parse");
    assert_eq!(cfg.clock_secs, 900);
    assert_eq!(cfg.contestants, vec!["Alice", "Bob", "Carol"]);

    let mut shuffled = cfg.seed_order();
    shuffled.sort();
    assert_eq!(shuffled, vec!["Alice", "Bob", "Carol"]);
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn env_overrides_apply_and_clamp() {
    let mut cfg = Config::parse(r#"contestants = ["A", "B"]"#, Path::new(".")).expect("parse");
    cfg.apply_overrides(|key| match key {
        "KOTH_CLOCK_SECS" => Some("120".to_string()),
        "KOTH_TICK_MS" => Some("5".to_string()),
        "KOTH_AUDIT_LOG" => Some("audit.jsonl".to_string()),
        _ => None,
    });
    assert_eq!(cfg.clock_secs, 120);
    assert_eq!(cfg.tick_ms, 20);
    assert_eq!(cfg.audit_log.as_deref(), Some(Path::new("audit.jsonl")));
}
