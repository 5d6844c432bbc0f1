use std::process::Command;

#[test]
fn init_creates_valid_toml() {
    let dir = tempfile::tempdir().unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_riskgate"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(
        output.status.success(),
        "riskgate init failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let config_path = dir.path().join(".riskgate.toml");
    assert!(config_path.exists(), ".riskgate.toml should exist");

    let content = std::fs::read_to_string(&config_path).unwrap();
    assert!(content.contains("[classify]"));
    assert!(content.contains("[blast]"));
    assert!(content.contains("[deep]"));

    // Verify it's valid TOML that riskgate-core can parse
    let _config: riskgate_core::RiskgateConfig = toml::from_str(&content).unwrap();
}

#[test]
fn init_refuses_if_exists() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(".riskgate.toml"), "# existing").unwrap();

    let output = Command::new(env!("CARGO_BIN_EXE_riskgate"))
        .arg("init")
        .current_dir(dir.path())
        .output()
        .unwrap();

    assert!(!output.status.success());
}
