use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_commitscope"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "commitscope init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".commitscope.toml");
    assert!(config_path.exists(), ".commitscope.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    for section in ["[history]", "[classifier]", "[charts]", "[output]"] {
        assert!(content.contains(section), "missing {section}");
    }

    // Everything is commented out, so the template parses to the defaults
    let config: commitscope_core::ScopeConfig = toml::from_str(&content).unwrap();
    assert_eq!(config.classifier.provider, "huggingface");
    assert_eq!(config.charts.width, 2400);
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".commitscope.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_commitscope"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
    let content = std::fs::read_to_string(dir.path().join(".commitscope.toml")).unwrap();
    assert_eq!(content, "# existing");
}
