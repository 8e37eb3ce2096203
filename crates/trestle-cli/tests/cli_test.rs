//! End-to-end tests for the `trestle` binary.

use std::{fs, path::PathBuf};

use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use tempfile::tempdir;

fn demos_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../demos")
}

/// Collects all .tre files from the demos directory
fn collect_demo_files() -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = fs::read_dir(demos_dir())
        .map(|entries| {
            entries
                .flatten()
                .map(|entry| entry.path())
                .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("tre"))
                .collect()
        })
        .unwrap_or_default();

    // Sort for consistent test output
    files.sort();
    files
}

fn stream(input: &str) -> Vec<u8> {
    cargo_bin_cmd!("trestle")
        .write_stdin(input)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone()
}

mod stream_mode {
    use super::*;

    #[test]
    fn renders_alice_to_bob() {
        let expected = trestle::render_svg("[Alice]->[Bob]").unwrap();
        cargo_bin_cmd!("trestle")
            .write_stdin("[Alice]->[Bob]")
            .assert()
            .success()
            .stdout(expected);
    }

    #[test]
    fn renders_empty_input() {
        let expected = trestle::render_svg("").unwrap();
        cargo_bin_cmd!("trestle")
            .write_stdin("")
            .assert()
            .success()
            .stdout(expected)
            .stdout(predicate::str::starts_with("<svg"));
    }

    #[test]
    fn output_is_deterministic() {
        let source = "[a]->[b]\n[b]-->[c]\n[c]<:-[a]";
        assert_eq!(stream(source), stream(source));
    }

    #[test]
    fn logs_stay_off_stdout() {
        let expected = trestle::render_svg("[a]").unwrap();
        cargo_bin_cmd!("trestle")
            .env("RUST_LOG", "debug")
            .write_stdin("[a]")
            .assert()
            .success()
            .stdout(expected);
    }

    #[test]
    fn malformed_input_fails_with_diagnostic() {
        cargo_bin_cmd!("trestle")
            .env("NO_COLOR", "1")
            .write_stdin("[Alice]->\n[Bob")
            .assert()
            .code(1)
            .stdout(predicate::str::is_empty())
            .stderr(predicate::str::contains("E102"))
            .stderr(predicate::str::contains("E101"));
    }
}

mod file_mode {
    use super::*;

    #[test]
    fn creates_output_file() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("hello.tre");
        let output = dir.path().join("hello.svg");
        fs::write(&input, "[Alice]->[Bob]").unwrap();

        cargo_bin_cmd!("trestle")
            .arg(&input)
            .arg(&output)
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            trestle::render_svg("[Alice]->[Bob]").unwrap()
        );
    }

    #[test]
    fn overwrites_existing_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.tre");
        let output = dir.path().join("out.svg");
        fs::write(&input, "[a]").unwrap();
        fs::write(&output, "stale content ".repeat(1000)).unwrap();

        cargo_bin_cmd!("trestle")
            .arg(&input)
            .arg(&output)
            .assert()
            .success();

        assert_eq!(
            fs::read_to_string(&output).unwrap(),
            trestle::render_svg("[a]").unwrap()
        );
    }

    #[test]
    fn missing_input_does_not_create_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("missing.tre");
        let output = dir.path().join("out.svg");

        cargo_bin_cmd!("trestle")
            .env("NO_COLOR", "1")
            .arg(&input)
            .arg(&output)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to read"));

        assert!(!output.exists());
    }

    #[test]
    fn malformed_input_keeps_previous_output() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.tre");
        let output = dir.path().join("out.svg");
        fs::write(&input, "[<bogus> a]").unwrap();
        fs::write(&output, "previous").unwrap();

        cargo_bin_cmd!("trestle")
            .env("NO_COLOR", "1")
            .arg(&input)
            .arg(&output)
            .assert()
            .code(1)
            .stderr(predicate::str::contains("E201"));

        assert_eq!(fs::read_to_string(&output).unwrap(), "previous");
    }

    #[test]
    fn unwritable_output_fails() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.tre");
        fs::write(&input, "[a]").unwrap();

        cargo_bin_cmd!("trestle")
            .env("NO_COLOR", "1")
            .arg(&input)
            .arg(dir.path().join("missing-dir").join("out.svg"))
            .assert()
            .code(1)
            .stderr(predicate::str::contains("failed to write"));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_output_updates_link_target() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.tre");
        let real = dir.path().join("real.svg");
        let link = dir.path().join("link.svg");
        fs::write(&input, "[a]").unwrap();
        fs::write(&real, "old").unwrap();
        std::os::unix::fs::symlink(&real, &link).unwrap();

        cargo_bin_cmd!("trestle")
            .arg(&input)
            .arg(&link)
            .assert()
            .success();

        assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
        assert_eq!(
            fs::read_to_string(&real).unwrap(),
            trestle::render_svg("[a]").unwrap()
        );
    }

    #[cfg(unix)]
    #[test]
    fn dev_null_output_succeeds() {
        let dir = tempdir().unwrap();
        let input = dir.path().join("in.tre");
        fs::write(&input, "[a]").unwrap();

        cargo_bin_cmd!("trestle")
            .arg(&input)
            .arg("/dev/null")
            .assert()
            .success()
            .stdout(predicate::str::is_empty());

        assert!(!fs::metadata("/dev/null").unwrap().is_file());
    }

    #[test]
    fn lone_input_is_usage_error() {
        cargo_bin_cmd!("trestle").arg("in.tre").assert().code(2);
    }
}

#[test]
fn help_and_version_succeed() {
    cargo_bin_cmd!("trestle").arg("--help").assert().success();
    cargo_bin_cmd!("trestle").arg("--version").assert().success();
}

#[test]
fn stream_and_file_modes_agree_on_demos() {
    let demos = collect_demo_files();
    assert!(!demos.is_empty(), "No demo diagrams found in demos/");

    let dir = tempdir().unwrap();
    for demo in &demos {
        let source = fs::read_to_string(demo).unwrap();
        let output = dir.path().join(format!(
            "{}.svg",
            demo.file_stem().unwrap().to_string_lossy()
        ));

        cargo_bin_cmd!("trestle")
            .arg(demo)
            .arg(&output)
            .assert()
            .success();

        assert_eq!(
            fs::read(&output).unwrap(),
            stream(&source),
            "modes disagree for {}",
            demo.display()
        );
    }
}
