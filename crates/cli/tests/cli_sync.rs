//! CLI integration tests for `extsync`.
//!
//! Each test runs the real binary with `HOME` pointed at a fixture so the
//! built-in editor roots resolve inside a temp directory.

use std::fs;
use std::process::{Command, Output};

use anyhow::{Context, Result};
use extsync_test_utils::EditorFixture;
use serde_json::Value;

fn extsync(fx: &EditorFixture, args: &[&str]) -> Result<Output> {
    Command::new(env!("CARGO_BIN_EXE_extsync"))
        .args(args)
        .env("HOME", fx.home_path())
        .env_remove("EXTSYNC_CONFIG")
        .env_remove("EXTSYNC_FORMAT")
        .env_remove("EXTSYNC_CURSOR_DIR")
        .env_remove("EXTSYNC_VSCODE_DIR")
        .output()
        .with_context(|| format!("failed to run extsync {}", args.join(" ")))
}

fn json_stdout(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}):\n{}\nstderr:\n{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        )
    })
}

fn code(output: &Output) -> i32 {
    output.status.code().unwrap_or(-1)
}

#[test]
fn editors_lists_builtin_profiles() -> Result<()> {
    let fx = EditorFixture::new()?;
    let output = extsync(&fx, &["--format", "json", "editors"])?;
    assert_eq!(code(&output), 0);

    let ids: Vec<String> = json_stdout(&output)
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(
        ids,
        vec!["vscode", "vscode-insiders", "vscodium", "windsurf", "cursor", "kiro"]
    );
    Ok(())
}

#[test]
fn sync_run_copies_then_reports_conflict() -> Result<()> {
    let fx = EditorFixture::new()?;
    fx.install_extension(".vscode", "a.b", "1.0")?;
    let args = [
        "-o", "json", "sync", "run", "--from", "vscode", "--to", "cursor", "--ext", "a.b",
    ];

    let first = extsync(&fx, &args)?;
    assert_eq!(code(&first), 0, "stderr: {}", String::from_utf8_lossy(&first.stderr));
    let report = json_stdout(&first);
    assert_eq!(report["total_copied"], 1);
    assert_eq!(report["results"][0]["index_updated"], true);
    assert!(fx
        .extensions_root(".cursor")
        .join("a.b-1.0/package.json")
        .is_file());

    let second = extsync(&fx, &args)?;
    assert_eq!(code(&second), 3);
    let report = json_stdout(&second);
    assert_eq!(report["total_skipped"], 1);
    assert_eq!(report["results"][0]["conflicts"][0], "a.b");
    Ok(())
}

#[test]
fn overwrite_resolves_conflicts() -> Result<()> {
    let fx = EditorFixture::new()?;
    fx.install_extension(".vscode", "a.b", "2.0")?;
    fx.install_extension(".cursor", "a.b", "1.0")?;

    let output = extsync(
        &fx,
        &[
            "sync", "run", "--from", "vscode", "--to", "cursor", "--all", "--overwrite",
        ],
    )?;
    assert_eq!(code(&output), 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Overwritten: 1"), "stdout: {stdout}");
    assert!(!fx.extensions_root(".cursor").join("a.b-1.0").exists());
    assert!(fx.extensions_root(".cursor").join("a.b-2.0").is_dir());
    Ok(())
}

#[test]
fn missing_extension_exits_with_error() -> Result<()> {
    let fx = EditorFixture::new()?;
    fx.install_extension(".vscode", "a.b", "1.0")?;

    let output = extsync(
        &fx,
        &["sync", "run", "--from", "vscode", "--to", "cursor", "--ext", "x.y"],
    )?;
    assert_eq!(code(&output), 1);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Extension x.y not found in source index"));
    Ok(())
}

#[test]
fn unknown_source_is_a_request_error() -> Result<()> {
    let fx = EditorFixture::new()?;
    let output = extsync(
        &fx,
        &["sync", "run", "--from", "emacs", "--to", "cursor", "--all"],
    )?;
    assert_eq!(code(&output), 1);
    assert!(String::from_utf8_lossy(&output.stderr).contains("unknown editor: emacs"));
    Ok(())
}

#[test]
fn unavailable_source_is_a_request_error() -> Result<()> {
    let fx = EditorFixture::new()?;
    let output = extsync(
        &fx,
        &["sync", "run", "--from", "vscode", "--to", "cursor", "--ext", "a.b"],
    )?;
    assert_eq!(code(&output), 1);
    assert!(!fx.extensions_root(".cursor").exists());
    Ok(())
}

#[test]
fn ext_and_all_are_mutually_exclusive() -> Result<()> {
    let fx = EditorFixture::new()?;
    let output = extsync(
        &fx,
        &[
            "sync", "run", "--from", "vscode", "--to", "cursor", "--ext", "a.b", "--all",
        ],
    )?;
    assert_eq!(code(&output), 2);
    Ok(())
}

#[test]
fn preview_writes_nothing() -> Result<()> {
    let fx = EditorFixture::new()?;
    fx.install_extension(".vscode", "a.b", "1.0")?;
    fx.install_extension(".vscode", "c.d", "1.0")?;
    fx.install_extension(".cursor", "c.d", "0.5")?;

    let output = extsync(
        &fx,
        &[
            "-o", "json", "sync", "preview", "--from", "vscode", "--to", "cursor", "--all",
        ],
    )?;
    assert_eq!(code(&output), 3);
    let preview = json_stdout(&output);
    let target = &preview["targets"][0];
    assert_eq!(target["new_count"], 1);
    assert_eq!(target["conflicts"][0], "c.d");
    assert_eq!(target["extensions"][1]["action"], "skip");
    assert!(!fx.extensions_root(".cursor").join("a.b-1.0").exists());
    assert_eq!(fx.index_ids(".cursor"), vec!["c.d"]);
    Ok(())
}

#[test]
fn conflicts_command_lists_existing_ids() -> Result<()> {
    let fx = EditorFixture::new()?;
    fx.install_extension(".vscode", "a.b", "1.0")?;
    fx.install_extension(".vscode", "c.d", "1.0")?;
    fx.install_extension(".kiro", "C.D", "1.0")?;

    let output = extsync(
        &fx,
        &["sync", "conflicts", "--from", "vscode", "--to", "kiro", "--all"],
    )?;
    assert_eq!(code(&output), 3);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("1 conflicts in kiro"));
    assert!(stdout.contains("c.d"));

    let clean = extsync(
        &fx,
        &["sync", "conflicts", "--from", "vscode", "--to", "cursor", "--ext", "a.b"],
    )?;
    assert_eq!(code(&clean), 0);
    assert!(String::from_utf8_lossy(&clean.stdout).contains("No conflicts in cursor"));
    Ok(())
}

#[test]
fn status_reports_extension_count() -> Result<()> {
    let fx = EditorFixture::new()?;
    fx.install_extension(".vscode", "a.b", "1.0")?;
    fx.install_extension(".vscode", "c.d", "1.0")?;

    let output = extsync(&fx, &["-o", "json", "status", "vscode"])?;
    assert_eq!(code(&output), 0);
    let statuses = json_stdout(&output);
    assert_eq!(statuses[0]["available"], true);
    assert_eq!(statuses[0]["index_file_exists"], true);
    assert_eq!(statuses[0]["extension_count"], 2);

    let all = extsync(&fx, &["-o", "json", "status"])?;
    let statuses = json_stdout(&all);
    assert_eq!(statuses.as_array().unwrap().len(), 6);
    assert_eq!(statuses[4]["available"], false);
    Ok(())
}

#[test]
fn extensions_lists_index_entries() -> Result<()> {
    let fx = EditorFixture::new()?;
    let payload = fx.install_extension(".cursor", "a.b", "1.0")?;
    fx.install_extension(".cursor", "c.d", "2.0")?;
    fs::remove_dir_all(payload)?;

    let output = extsync(&fx, &["extensions", "cursor"])?;
    assert_eq!(code(&output), 0);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("a.b 1.0 (payload missing)"), "stdout: {stdout}");
    assert!(stdout.contains("c.d 2.0"));
    Ok(())
}

#[test]
fn config_file_declares_custom_editor() -> Result<()> {
    let fx = EditorFixture::new()?;
    fx.install_extension(".vscode", "a.b", "1.0")?;
    let custom_root = fx.home_path().join("forks/my-fork/extensions");
    let config_dir = fx.home_path().join(".extsync");
    fs::create_dir_all(&config_dir)?;
    fs::write(
        config_dir.join("config.toml"),
        format!(
            "[editors.my-fork]\nname = 'My Fork'\nextensions_dir = '{}'\n",
            custom_root.display()
        ),
    )?;

    let output = extsync(
        &fx,
        &["sync", "run", "--from", "vscode", "--to", "my-fork", "--ext", "a.b"],
    )?;
    assert_eq!(code(&output), 0, "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(custom_root.join("a.b-1.0").is_dir());
    assert!(custom_root.join("extensions.json").is_file());
    Ok(())
}

#[test]
fn env_overrides_extensions_root_and_format() -> Result<()> {
    let fx = EditorFixture::new()?;
    fx.install_extension(".vscode", "a.b", "1.0")?;
    let elsewhere = fx.home_path().join("elsewhere");

    let output = Command::new(env!("CARGO_BIN_EXE_extsync"))
        .args(["sync", "run", "--from", "vscode", "--to", "cursor", "--ext", "a.b"])
        .env("HOME", fx.home_path())
        .env_remove("EXTSYNC_CONFIG")
        .env("EXTSYNC_FORMAT", "json")
        .env("EXTSYNC_CURSOR_DIR", &elsewhere)
        .output()?;
    assert_eq!(code(&output), 0);
    assert_eq!(json_stdout(&output)["total_copied"], 1);
    assert!(elsewhere.join("a.b-1.0").is_dir());
    assert!(!fx.extensions_root(".cursor").exists());
    Ok(())
}
