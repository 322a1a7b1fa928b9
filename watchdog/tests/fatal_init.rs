//! Startup without an anomaly model must exit non-zero before looping

use std::process::Command;

#[test]
fn test_missing_model_exits_with_failure() {
    let dir = std::env::temp_dir().join("trustai-watchdog-missing-model");
    let model_path = dir.join("anomaly_model.json");

    let output = Command::new(env!("CARGO_BIN_EXE_trustai-watchdog"))
        .env("WATCHDOG_MODEL_PATH", &model_path)
        .env("WEBHOOK_URL", "http://127.0.0.1:9/api/webhook/anomaly")
        .env("RUST_LOG", "info")
        .output()
        .expect("failed to run watchdog binary");

    assert!(!output.status.success());
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("CRITICAL ERROR"), "stderr: {}", stderr);
    assert!(!stderr.contains("Watchdog active"), "loop started: {}", stderr);
    assert!(!stderr.contains("Score:"), "iteration ran: {}", stderr);
}
