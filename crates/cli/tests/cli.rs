use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::str::contains;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const ROM_LEN: usize = 0x20000;
const CONTENT_LEN: usize = 0x5000;

fn cmd() -> Command {
    cargo_bin_cmd!("nds-trim")
}

/// DS-like image: header end offset at 0x80, content, then 0xFF padding.
fn rom_bytes(len: usize, content: usize, declared: u32) -> Vec<u8> {
    let mut data = vec![0x5A; content];
    data.resize(len, 0xFF);
    data[0x80..0x84].copy_from_slice(&declared.to_le_bytes());
    data
}

fn write_rom(dir: &TempDir, name: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, rom_bytes(ROM_LEN, CONTENT_LEN, CONTENT_LEN as u32)).unwrap();
    path
}

fn len_of(path: &Path) -> u64 {
    fs::metadata(path).unwrap().len()
}

#[test]
fn trims_padded_rom() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(&dir, "game.nds");

    cmd()
        .arg(&rom)
        .assert()
        .success()
        .stdout(contains("Previously: 131072, Now: 20480, Difference: -110592"))
        .stdout(contains("Total difference: -110592"));

    assert_eq!(len_of(&rom), CONTENT_LEN as u64);
}

#[test]
fn second_run_changes_nothing() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(&dir, "game.nds");

    cmd().arg("-p").arg(&rom).assert().success();
    cmd()
        .arg("-p")
        .arg(&rom)
        .assert()
        .success()
        .stdout(contains("Total difference: 0"));
    assert_eq!(len_of(&rom), CONTENT_LEN as u64);
}

#[test]
fn other_extensions_need_flag() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(&dir, "game.bin");

    cmd()
        .arg(&rom)
        .assert()
        .success()
        .stderr(contains("Nothing to trim"));
    assert_eq!(len_of(&rom), ROM_LEN as u64);

    cmd().arg("-e").arg(&rom).assert().success();
    assert_eq!(len_of(&rom), CONTENT_LEN as u64);
}

#[test]
fn missing_and_duplicate_paths_are_dropped() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(&dir, "game.nds");

    cmd()
        .arg(dir.path().join("absent.nds"))
        .arg(&rom)
        .arg(&rom)
        .assert()
        .success()
        .stdout(contains("Total difference: -110592"));
}

#[test]
fn all_padding_is_left_alone() {
    let dir = TempDir::new().unwrap();
    let rom = dir.path().join("blank.nds");
    fs::write(&rom, vec![0xFF; 0x10000]).unwrap();

    for flags in [&[][..], &["-p"][..], &["-pi"][..], &["-pb"][..]] {
        cmd()
            .args(flags)
            .arg(&rom)
            .assert()
            .success()
            .stderr(contains("no content found"))
            .stdout(contains("Total difference: 0"));
        assert_eq!(len_of(&rom), 0x10000);
    }
}

#[test]
fn paranoid_modes_agree() {
    for flags in [&["-p"][..], &["-pi"][..], &["-pb"][..], &["-ib"][..]] {
        let dir = TempDir::new().unwrap();
        let rom = write_rom(&dir, "game.nds");
        cmd().args(flags).arg(&rom).assert().success();
        assert_eq!(len_of(&rom), CONTENT_LEN as u64, "flags {flags:?}");
    }
}

#[test]
fn copy_leaves_original_untouched() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(&dir, "game.nds");

    cmd().arg("--copy").arg(&rom).assert().success();

    assert_eq!(len_of(&rom), ROM_LEN as u64);
    assert_eq!(len_of(&dir.path().join("game trim0.nds")), CONTENT_LEN as u64);
}

#[test]
fn failed_file_fails_the_run_but_others_are_trimmed() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(&dir, "game.nds");
    // 250 bytes is a valid name, but "<stem> trim0.nds" exceeds NAME_MAX.
    let long = write_rom(&dir, &format!("{}.nds", "a".repeat(246)));

    cmd()
        .arg("--copy")
        .arg(&long)
        .arg(&rom)
        .assert()
        .failure()
        .stdout(contains("Total difference: -110592"))
        .stderr(contains("1 file(s) could not be trimmed"));

    assert_eq!(len_of(&dir.path().join("game trim0.nds")), CONTENT_LEN as u64);
    assert_eq!(len_of(&rom), ROM_LEN as u64);
    assert_eq!(len_of(&long), ROM_LEN as u64);
}

#[test]
fn json_report() {
    let dir = TempDir::new().unwrap();
    let rom = write_rom(&dir, "game.nds");
    let blank = dir.path().join("blank.nds");
    fs::write(&blank, vec![0x00; 0x8000]).unwrap();

    let out = cmd()
        .arg("--json")
        .arg(&rom)
        .arg(&blank)
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let json: Value = serde_json::from_slice(&out).expect("valid json output");

    assert_eq!(json["status"], "ok");
    assert_eq!(json["total_difference"], -110592);
    assert_eq!(json["files"][0]["status"], "trimmed");
    assert_eq!(json["files"][0]["new_len"], CONTENT_LEN as u64);
    assert_eq!(json["files"][0]["detection"]["strategy"], "header_only");
    assert_eq!(json["files"][1]["status"], "warning");
    assert_eq!(json["files"][1]["error_kind"], "detection_failed");
}

#[test]
fn short_header_is_reported() {
    let dir = TempDir::new().unwrap();
    let rom = dir.path().join("wifi.nds");
    fs::write(&rom, rom_bytes(ROM_LEN, CONTENT_LEN + 136, CONTENT_LEN as u32)).unwrap();

    cmd()
        .arg(&rom)
        .assert()
        .success()
        .stderr(contains("short by 136"))
        .stderr(contains("wi-fi"));
    assert_eq!(len_of(&rom), (CONTENT_LEN + 136) as u64);
}

#[test]
fn requires_paths() {
    cmd().assert().failure();
}
