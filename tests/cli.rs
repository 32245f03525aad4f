use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn ltlf_filter(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("ltlf-filter").unwrap();
    cmd.current_dir(dir)
        .env_remove("LTLF_FILTER_MANIFEST")
        .env_remove("LTLF_FILTER_SOURCE")
        .env_remove("LTLF_FILTER_DEST")
        .env_remove("RUST_LOG")
        .args(["--output-format", "plain"]);
    cmd
}

/// Lays out `syft_1_ok.csv` and `syft_1/` the way a default run expects.
fn workspace(manifest: &str, sources: &[&str]) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("syft_1_ok.csv"), manifest).unwrap();
    fs::create_dir(dir.path().join("syft_1")).unwrap();
    for name in sources {
        fs::write(dir.path().join("syft_1").join(name), format!("contents of {}", name)).unwrap();
    }
    dir
}

#[test]
fn copies_complete_pairs_and_warns_about_the_rest() {
    let dir = workspace("a,7,ok\nb,42,ok\n", &["007.ltlf", "007.part", "042.ltlf"]);

    ltlf_filter(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied files for number 007\n"))
        .stdout(predicate::str::contains("Warning: Files for number 042 not found\n"));

    let dest = dir.path().join("syft_1_filtered");
    assert_eq!(
        fs::read_to_string(dest.join("007.ltlf")).unwrap(),
        "contents of 007.ltlf"
    );
    assert!(dest.join("007.part").exists());
    assert!(!dest.join("042.ltlf").exists());
}

#[test]
fn record_lines_follow_manifest_order() {
    let dir = workspace(
        "a,3,ok\nb,1,ok\nc,2,ok\n",
        &["001.ltlf", "001.part", "003.ltlf", "003.part"],
    );

    let output = ltlf_filter(dir.path()).arg("-q").output().unwrap();
    let stdout = String::from_utf8(output.stdout).unwrap();

    assert_eq!(
        stdout,
        "Copied files for number 003\n\
         Copied files for number 001\n\
         Warning: Files for number 002 not found\n"
    );
}

#[test]
fn missing_manifest_exits_with_code_3() {
    let dir = TempDir::new().unwrap();

    ltlf_filter(dir.path())
        .args(["--manifest", "absent.csv"])
        .assert()
        .code(3)
        .stderr(predicate::str::contains("absent.csv"));
}

#[test]
fn header_line_is_data_unless_skipped() {
    let dir = workspace("folder,number,status\na,7,ok\n", &["007.ltlf", "007.part"]);

    ltlf_filter(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Warning: Invalid number format: number"));

    ltlf_filter(dir.path())
        .arg("--skip-header")
        .assert()
        .success()
        .stdout(predicate::str::contains("Invalid number format").not())
        .stdout(predicate::str::contains("Copied files for number 007"));
}

#[test]
fn strict_mode_exits_2_on_warnings() {
    let dir = workspace("a,5,ok\n", &["005.ltlf"]);

    ltlf_filter(dir.path())
        .arg("--strict")
        .assert()
        .code(2)
        .stdout(predicate::str::contains("Warning: Files for number 005 not found"));
}

#[test]
fn dry_run_leaves_destination_untouched() {
    let dir = workspace("a,7,ok\n", &["007.ltlf", "007.part"]);

    ltlf_filter(dir.path())
        .arg("--dry-run")
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied files for number 007"));

    assert!(!dir.path().join("syft_1_filtered").exists());
}

#[test]
fn status_filter_selects_rows() {
    let dir = workspace(
        "a,1,Realizable\nb,2,Unrealizable\n",
        &["001.ltlf", "001.part", "002.ltlf", "002.part"],
    );

    ltlf_filter(dir.path())
        .args(["--status", "Realizable"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied files for number 001"))
        .stdout(predicate::str::contains("number 002").not());

    let dest = dir.path().join("syft_1_filtered");
    assert!(dest.join("001.part").exists());
    assert!(!dest.join("002.part").exists());
}

#[test]
fn custom_paths_and_report() {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("bench")).unwrap();
    fs::write(dir.path().join("bench/0012.ltlf"), "F(a)").unwrap();
    fs::write(dir.path().join("bench/0012.part"), ".inputs: a").unwrap();
    fs::write(dir.path().join("list.csv"), "x,12,ok\n").unwrap();

    ltlf_filter(dir.path())
        .args(["-m", "list.csv", "-s", "bench", "-d", "out", "--width", "4"])
        .args(["--report", "run.json"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied files for number 0012"));

    assert!(dir.path().join("out/0012.ltlf").exists());
    let report = fs::read_to_string(dir.path().join("run.json")).unwrap();
    assert!(report.contains("\"copied\": 1"));
}

#[test]
fn rerun_overwrites_with_identical_result() {
    let dir = workspace("a,9,ok\n", &["009.ltlf", "009.part"]);

    ltlf_filter(dir.path()).assert().success();
    ltlf_filter(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied files for number 009"));

    let entries = fs::read_dir(dir.path().join("syft_1_filtered")).unwrap().count();
    assert_eq!(entries, 2);
}

#[test]
fn rejects_source_equal_to_dest() {
    let dir = workspace("a,1,ok\n", &[]);

    ltlf_filter(dir.path())
        .args(["-s", "same", "-d", "same"])
        .assert()
        .code(1);
}

#[test]
fn aliased_source_and_dest_leave_sources_intact() {
    let dir = workspace("a,7,ok\n", &["007.ltlf", "007.part"]);

    ltlf_filter(dir.path())
        .args(["-s", "syft_1", "-d", "./syft_1"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Copied files").not())
        .stderr(predicate::str::contains("the same"));

    assert_eq!(
        fs::read_to_string(dir.path().join("syft_1/007.ltlf")).unwrap(),
        "contents of 007.ltlf"
    );
}

#[test]
fn dedupe_removes_later_copies_of_a_formula() {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("syft_1_ok.csv"), "a,1,ok\nb,4,ok\n").unwrap();
    fs::create_dir(dir.path().join("syft_1")).unwrap();
    for id in ["001", "004"] {
        fs::write(dir.path().join(format!("syft_1/{}.ltlf", id)), "G(a)").unwrap();
        fs::write(dir.path().join(format!("syft_1/{}.part", id)), ".inputs: a").unwrap();
    }

    ltlf_filter(dir.path())
        .arg("--dedupe")
        .assert()
        .success()
        .stdout(predicate::str::contains("Copied files for number 004"))
        .stdout(predicate::str::contains("Duplicate group: keeping"))
        .stdout(predicate::str::contains("004.part"));

    let dest = dir.path().join("syft_1_filtered");
    assert!(dest.join("001.ltlf").exists());
    assert!(!dest.join("004.ltlf").exists());
    assert!(!dest.join("004.part").exists());
    assert!(dir.path().join("syft_1_filtered_backup/004.ltlf").exists());
}
