use ytlive_core::config::ApiConfig;
use ytlive_core::CompanionConfig;

fn temp_dir(tag: &str) -> std::path::PathBuf {
    let mut dir = std::env::temp_dir();
    dir.push(format!(
        "ytlive_{}_{}",
        tag,
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    dir
}

#[test]
fn missing_config_writes_defaults() {
    let dir = temp_dir("missing");
    let path = dir.join("config.json");

    let config = CompanionConfig::load_or_default(&path);
    assert_eq!(config, CompanionConfig::default());
    assert!(path.exists(), "defaults should be written back");

    let reloaded = CompanionConfig::load_from_file(&path).unwrap();
    assert_eq!(reloaded, config);

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn partial_config_fills_missing_sections() {
    let dir = temp_dir("partial");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(
        &path,
        r#"{ "refresh": { "feedback_interval_seconds": 5, "reload_after_transition": true } }"#,
    )
    .unwrap();

    let config = CompanionConfig::load_or_default(&path);
    assert_eq!(config.refresh.feedback_interval_seconds, 5);
    assert!(config.refresh.reload_after_transition);
    assert_eq!(config.api, ApiConfig::default());

    let _ = std::fs::remove_dir_all(&dir);
}

#[test]
fn corrupted_config_falls_back_to_defaults() {
    let dir = temp_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("config.json");
    std::fs::write(&path, b"{ this is not json ").unwrap();

    let config = CompanionConfig::load_or_default(&path);
    assert_eq!(config, CompanionConfig::default());

    let _ = std::fs::remove_dir_all(&dir);
}
