use assert_cmd::Command;

#[test]
fn transmit_dry_run_then_decode() {
    let mut cmd = Command::cargo_bin("remotes").unwrap();

    let assert = cmd
        .args([
            "transmit", "--codec", "nec32", "--address", "0x7F80", "--scancode", "0x13",
            "--repeats", "1", "--dry-run",
        ])
        .assert()
        .success();

    let raw = String::from_utf8_lossy(&assert.get_output().stdout)
        .trim()
        .to_string();

    assert!(raw.starts_with("+9000 -4500 +562"), "{raw}");

    let mut cmd = Command::cargo_bin("remotes").unwrap();

    let assert = cmd
        .args(["decode", "--codec", "nec32", "--raw", &raw])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

    assert_eq!(
        stdout,
        "decoded: nec32 device=0x7F80 scancode=0x13\n\
         decoded: nec32 device=0x7F80 scancode=0x13 repeat\n"
    );
}

#[test]
fn decode_rejects_garbage() {
    let mut cmd = Command::cargo_bin("remotes").unwrap();

    cmd.args(["decode", "--raw", "+100 banana"])
        .assert()
        .failure();
}

#[test]
fn keymap_list() {
    let mut cmd = Command::cargo_bin("remotes").unwrap();

    let assert = cmd
        .args(["keymap", "list", "testdata/tv.toml"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

    assert_eq!(
        stdout,
        "tv codec=nec32 device=0x7F80 keys=2\n  0x13 KEY_POWER\n  0x20 KEY_VOLUMEUP\n"
    );
}

#[test]
fn keymap_lookup() {
    let mut cmd = Command::cargo_bin("remotes").unwrap();

    let assert = cmd
        .args(["keymap", "lookup", "testdata", "KEY_POWER"])
        .assert()
        .success();

    let stdout = String::from_utf8_lossy(&assert.get_output().stdout).to_string();

    assert_eq!(
        stdout,
        "amplifier: codec=sony12 device=0x0001 scancode=0x15\n\
         tv: codec=nec32 device=0x7F80 scancode=0x13\n"
    );

    let mut cmd = Command::cargo_bin("remotes").unwrap();

    cmd.args(["keymap", "lookup", "testdata", "KEY_DOES_NOT_EXIST"])
        .assert()
        .failure();
}

#[test]
fn transmit_from_keymap() {
    let mut cmd = Command::cargo_bin("remotes").unwrap();

    let assert = cmd
        .args([
            "transmit", "--keymap", "testdata/amplifier.toml", "--keycode", "KEY_MUTE",
            "--dry-run",
        ])
        .assert()
        .success();

    let raw = String::from_utf8_lossy(&assert.get_output().stdout)
        .trim()
        .to_string();

    // sony12 header, then the first scancode bit
    assert!(raw.starts_with("+2400 -575"), "{raw}");
}
