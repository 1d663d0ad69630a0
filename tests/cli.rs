//! End-to-end tests for the `make-deb` binary

use assert_cmd::Command;
use predicates::prelude::*;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

/// Lay out `deploy/`, `pro/novile.pro` and `lib/` the way the project tree does
fn project(version_line: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::create_dir(dir.path().join("deploy")).unwrap();
    fs::create_dir(dir.path().join("pro")).unwrap();
    fs::write(
        dir.path().join("pro/novile.pro"),
        format!("TEMPLATE = lib\nTARGET = novile\n{version_line}\n"),
    )
    .unwrap();
    fs::create_dir(dir.path().join("lib")).unwrap();
    fs::write(dir.path().join("lib/libnovile.so.1.0.0"), "ELF").unwrap();
    fs::write(dir.path().join("lib/libnovile.so.1"), "ELF").unwrap();
    dir
}

fn make_deb(cwd: &Path) -> Command {
    let mut cmd = Command::cargo_bin("make-deb").unwrap();
    cmd.current_dir(cwd);
    cmd
}

fn debs(dir: &Path) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.file_name().to_string_lossy().into_owned())
        .filter(|name| name.ends_with(".deb"))
        .collect()
}

#[test]
fn version_prints_package_version() {
    let dir = project("VERSION = 1.2.3+");

    make_deb(&dir.path().join("deploy"))
        .arg("version")
        .assert()
        .success()
        .stdout("1.2.3-1\n");
}

#[test]
fn version_with_explicit_source() {
    let dir = project("VERSION = 1.2.3-");

    make_deb(dir.path())
        .args(["version", "--source", "pro/novile.pro"])
        .assert()
        .success()
        .stdout("1.2.3-2\n");
}

#[test]
fn control_prints_manifest() {
    let dir = project("VERSION = 1.2.3");

    make_deb(&dir.path().join("deploy"))
        .arg("control")
        .assert()
        .success()
        .stdout(
            "Package: libnovile\n\
             Version: 1.2.3-0\n\
             Maintainer: Yury Kapoyko <yury.kapoyko@gmail.com>\n\
             Architecture: amd64\n\
             Section: misc\n\
             Description: Library files for Novile (https://github.com/tucnak/novile)\n\
             Depends: libqt4-core, libqt4-gui, libqt4-webkit\n",
        );
}

#[test]
fn missing_version_fails_without_side_effects() {
    let dir = project("# VERSION missing");
    let deploy = dir.path().join("deploy");

    make_deb(&deploy)
        .args(["build", "--packager", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Version source error"));

    assert_eq!(fs::read_dir(&deploy).unwrap().count(), 0);
}

#[test]
fn existing_package_root_is_fatal_and_kept() {
    let dir = project("VERSION = 1.2.3");
    let deploy = dir.path().join("deploy");
    fs::create_dir(deploy.join("pkg_root")).unwrap();

    make_deb(&deploy)
        .args(["build", "--packager", "true"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));

    assert!(deploy.join("pkg_root").is_dir());
}

#[cfg(unix)]
#[test]
fn build_produces_single_deb_and_cleans_up() {
    let dir = project("VERSION = 0.4.12+");
    let deploy = dir.path().join("deploy");

    make_deb(&deploy)
        .args([
            "build",
            "--packager",
            "sh",
            "--packager-arg",
            "-c",
            "--packager-arg",
            r#"test -f "$1/DEBIAN/control" && test -f "$1/usr/lib/libnovile.so.1" && touch "$2""#,
            "--packager-arg",
            "sh",
        ])
        .assert()
        .success();

    assert!(!deploy.join("pkg_root").exists());
    assert_eq!(debs(&deploy), vec!["libnovile.debian7_0.4.12-1_amd64.deb"]);
    assert!(dir.path().join("lib/libnovile.so.1").exists());
}

#[cfg(unix)]
#[test]
fn failing_packager_cleans_up() {
    let dir = project("VERSION = 0.4.12");
    let deploy = dir.path().join("deploy");

    make_deb(&deploy)
        .args(["build", "--packager", "false"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Process error"));

    assert!(!deploy.join("pkg_root").exists());
    assert!(debs(&deploy).is_empty());
}
