//! Integration tests for the zkviz CLI
//!
//! Runs the built binary against temporary note folders.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

// ============================================================================
// Test Utilities
// ============================================================================

/// Get the path to the zkviz binary (built by cargo)
fn zkviz_binary() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_zkviz"));
    cmd.env_remove("RUST_LOG").env_remove("ZKVIZ_NOTES_DIR");
    cmd
}

/// Run zkviz with the given args in the specified directory, never opening a viewer
fn run_zkviz(dir: &Path, args: &[&str]) -> Output {
    zkviz_binary()
        .current_dir(dir)
        .arg("--no-view")
        .args(args)
        .output()
        .expect("Failed to execute zkviz")
}

/// Get stdout as string
fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Get stderr as string
fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

fn write_note(dir: &Path, name: &str, content: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, content).expect("Failed to write note");
    path
}

/// Three linked zettels, a stub link, a self-link and a non-zettel file
fn setup_notes(dir: &Path) {
    write_note(dir, "1 Intro.md", "Start at [[2]], see also [[99]].");
    write_note(dir, "2 Body.md", "Back to [[1]] and [[2]], then [[3]].");
    write_note(dir, "3 Outro.md", "Fin.");
    write_note(dir, "README.md", "Not a zettel, links [[1]].");
}

fn summary_json(output: &Output) -> serde_json::Value {
    serde_json::from_str(&stdout(output)).expect("summary is valid JSON")
}

// ============================================================================
// Interactive plot
// ============================================================================

#[test]
fn test_plot_writes_html() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());

    let output = run_zkviz(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let html = fs::read_to_string(dir.path().join("zettel-network.html")).unwrap();
    assert!(html.contains("<svg"));
    assert!(html.contains("1<br>Intro"));
    assert!(stdout(&output).contains("Rendered 3 zettels"));
}

#[test]
fn test_json_summary() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());

    let output = run_zkviz(dir.path(), &["--format", "json", "--output", "net"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let summary = summary_json(&output);
    assert_eq!(summary["renderer"], "plotly");
    assert_eq!(summary["zettel_count"], 3);
    // 1, 2, 3 and the stub 99
    assert_eq!(summary["node_count"], 4);
    // 1-2, 1-99, 2-2, 2-3
    assert_eq!(summary["edge_count"], 4);
    assert_eq!(summary["output_path"], "net.html");
    assert!(dir.path().join("net.html").exists());
}

#[test]
fn test_compact_json_summary() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());

    let output = run_zkviz(dir.path(), &["--format", "json", "--compact"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let out = stdout(&output);
    assert_eq!(out.trim_end().lines().count(), 1, "stdout: {}", out);
    assert_eq!(summary_json(&output)["zettel_count"], 3);
}

#[test]
fn test_plot_title_is_graph_name() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());

    let output = run_zkviz(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let html = fs::read_to_string(dir.path().join("zettel-network.html")).unwrap();
    assert!(html.contains("<title>Zettelkasten</title>"));
}

#[test]
fn test_filter_flags() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());

    let output = run_zkviz(
        dir.path(),
        &["--format", "json", "--only-listed", "--no-self-references"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));

    let summary = summary_json(&output);
    assert_eq!(summary["node_count"], 3);
    assert_eq!(summary["edge_count"], 2);
}

#[test]
fn test_notes_dir_and_patterns() {
    let dir = TempDir::new().unwrap();
    let notes = dir.path().join("notes");
    fs::create_dir(&notes).unwrap();
    write_note(&notes, "1 Intro.md", "[[2]]");
    write_note(&notes, "2 Body.txt", "[[1]]");

    let output = run_zkviz(dir.path(), &["--format", "json", "--notes-dir", "notes"]);
    assert_eq!(summary_json(&output)["zettel_count"], 1);

    let output = run_zkviz(
        dir.path(),
        &["--format", "json", "--notes-dir", "notes", "--pattern", "*.md", "--pattern", "*.txt"],
    );
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(summary_json(&output)["zettel_count"], 2);
}

#[test]
fn test_explicit_paths() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());

    let output = run_zkviz(dir.path(), &["--format", "json", "1 Intro.md", "3 Outro.md"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(summary_json(&output)["zettel_count"], 2);
}

#[test]
fn test_config_file() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());
    write_note(
        dir.path(),
        ".zkvizrc.toml",
        "[filter]\nonly_listed = true\n\n[output]\nname = \"configured\"\nformat = \"json\"\n",
    );

    let output = run_zkviz(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    let summary = summary_json(&output);
    assert_eq!(summary["node_count"], 3);
    assert!(dir.path().join("configured.html").exists());
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_no_zettels_fails() {
    let dir = TempDir::new().unwrap();
    write_note(dir.path(), "README.md", "nothing to see");

    let output = run_zkviz(dir.path(), &[]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("couldn't find any zettels"));
    assert!(!dir.path().join("zettel-network.html").exists());
}

#[test]
fn test_missing_graphviz_engine() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());
    let empty_path = TempDir::new().unwrap();

    let output = zkviz_binary()
        .current_dir(dir.path())
        .env("PATH", empty_path.path())
        .args(["--no-view", "--use-graphviz"])
        .output()
        .expect("Failed to execute zkviz");

    assert!(!output.status.success());
    let err = stderr(&output);
    assert!(err.contains("'sfdp' was not found"), "stderr: {}", err);
    assert!(err.contains("Install Graphviz"));
}

#[test]
fn test_config_selects_graphviz() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());
    write_note(dir.path(), ".zkvizrc.toml", "[output]\nrenderer = \"graphviz\"\n");
    let empty_path = TempDir::new().unwrap();

    let output = zkviz_binary()
        .current_dir(dir.path())
        .env("PATH", empty_path.path())
        .arg("--no-view")
        .output()
        .expect("Failed to execute zkviz");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("'sfdp' was not found"));
}

#[test]
fn test_invalid_config_format_warns() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());
    write_note(dir.path(), ".zkvizrc.toml", "[output]\nformat = \"yaml\"\n");

    let output = run_zkviz(dir.path(), &[]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Ignoring [output] format"));
    assert!(stdout(&output).contains("Rendered 3 zettels"));
}

#[test]
fn test_invalid_pattern_fails() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());

    let output = run_zkviz(dir.path(), &["--pattern", "***.md"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Invalid pattern"));
}

#[test]
fn test_missing_config_file_fails() {
    let dir = TempDir::new().unwrap();
    setup_notes(dir.path());

    let output = run_zkviz(dir.path(), &["--config", "nope.toml"]);
    assert!(!output.status.success());
    assert!(stderr(&output).contains("Failed to read config file"));
}

#[test]
fn test_version_verbose() {
    let dir = TempDir::new().unwrap();
    let output = run_zkviz(dir.path(), &["--version-verbose"]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("zk-core"));
}
