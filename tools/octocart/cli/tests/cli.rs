use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use octocart_core::{gif, GifWriter, Rgb};
use serde_json::Value;

fn octocart(args: &[&str], dir: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_octocart"))
        .args(args)
        .current_dir(dir)
        .output()
        .expect("failed to run octocart")
}

fn still(path: &Path, pixels: &[u8]) {
    let mut g = GifWriter::begin(4, 2, &[Rgb(0x000000), Rgb(0xFFCC00)]).unwrap();
    g.frame(pixels, 0, None).unwrap();
    fs::write(path, g.finish()).unwrap();
}

#[test]
fn pack_then_unpack() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("hello.8o"), ": main\n  loop again\n").unwrap();
    fs::write(root.join("hello.ch8"), [0x12, 0x00]).unwrap();
    fs::write(root.join("options.json"), r#"{"tickrate": 200, "enableXO": true}"#).unwrap();

    let out = octocart(
        &["pack", "--program", "hello.8o", "--rom", "hello.ch8", "--options", "options.json", "-o", "hello.gif"],
        root,
    );
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    assert!(fs::read(root.join("hello.gif")).unwrap().starts_with(b"GIF89a"));

    let out = octocart(&["unpack", "hello.gif", "--program", "back.8o", "--rom", "back.ch8"], root);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["program"], ": main\n  loop again\n");
    assert_eq!(json["rom"], serde_json::json!([0x12, 0x00]));
    assert_eq!(json["options"]["tickrate"], 200);
    assert_eq!(json["options"]["maxSize"], 65024);
    assert!(json["options"].get("enableXO").is_none());

    assert_eq!(fs::read_to_string(root.join("back.8o")).unwrap(), ": main\n  loop again\n");
    assert_eq!(fs::read(root.join("back.ch8")).unwrap(), vec![0x12, 0x00]);
}

#[test]
fn unpack_fills_in_default_options() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("p.8o"), "").unwrap();
    assert!(octocart(&["pack", "--program", "p.8o", "--label", "blank", "-o", "p.gif"], root).status.success());

    let out = octocart(&["unpack", "p.gif", "-o", "p.json"], root);
    assert!(out.status.success());
    assert!(out.stdout.is_empty());
    let json: Value = serde_json::from_slice(&fs::read(root.join("p.json")).unwrap()).unwrap();
    assert_eq!(json["options"].as_object().unwrap().len(), octocart_core::OPTION_FLAGS.len());
    assert_eq!(json["options"]["fontStyle"], "octo");
}

#[test]
fn screenshots_can_decorate_a_cartridge() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    fs::write(root.join("p.8o"), "clear").unwrap();
    still(&root.join("shot.gif"), &[0, 1, 0, 1, 1, 0, 1, 0]);

    let out = octocart(&["pack", "--program", "p.8o", "--screenshot", "shot.gif", "-o", "p.gif"], root);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let out = octocart(&["unpack", "p.gif"], root);
    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["program"], "clear");
}

#[test]
fn unpack_reads_standalone_pages() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let page = format!(
        "{}<script>data={{\"program\":\"cls\",\"options\":{{\"displayScale\":4,\"tickrate\":30}},\"rom\":[0,224]}}</script>\n<script>runtime</script>\n",
        octocart_core::standalone::MAGIC
    );
    fs::write(root.join("game.html"), page).unwrap();

    let out = octocart(&["unpack", "game.html"], root);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));
    let json: Value = serde_json::from_slice(&out.stdout).unwrap();
    assert_eq!(json["program"], "cls");
    assert_eq!(json["rom"], serde_json::json!([0, 224]));
    assert_eq!(json["options"]["tickrate"], 30);
    assert!(json["options"].get("displayScale").is_none());
}

#[test]
fn unpacking_a_plain_gif_fails() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    still(&root.join("plain.gif"), &[1; 8]);

    let out = octocart(&["unpack", "plain.gif"], root);
    assert!(!out.status.success());
    assert!(String::from_utf8_lossy(&out.stderr).contains("not a readable cartridge"));
}

#[test]
fn inspect_describes_frames() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    still(&root.join("still.gif"), &[0; 8]);

    let out = octocart(&["inspect", "still.gif"], root);
    assert!(out.status.success());
    let text = String::from_utf8_lossy(&out.stdout);
    assert!(text.starts_with("4x2, 1 frame(s)"), "{text}");
    assert!(text.contains("frame 0: 2 colors, 8 pixels"), "{text}");
}

#[test]
fn record_holds_repeated_frames() {
    let dir = tempfile::tempdir().unwrap();
    let root = dir.path();
    let frames = root.join("frames");
    fs::create_dir(&frames).unwrap();
    still(&frames.join("000.gif"), &[0; 8]);
    still(&frames.join("001.gif"), &[0; 8]);
    still(&frames.join("002.gif"), &[1; 8]);
    fs::write(frames.join("notes.txt"), "ignored").unwrap();

    let out = octocart(&["record", "frames", "-o", "anim.gif", "--comment", "test run"], root);
    assert!(out.status.success(), "{}", String::from_utf8_lossy(&out.stderr));

    let bytes = fs::read(root.join("anim.gif")).unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("test run"));
    let image = gif::decode(&bytes).unwrap();
    assert_eq!(image.frames.len(), 2);
    assert_eq!(image.frames[1].pixels, vec![1; 8]);
}

#[test]
fn record_needs_frames() {
    let dir = tempfile::tempdir().unwrap();
    let out = octocart(&["record", ".", "-o", "anim.gif"], dir.path());
    assert!(!out.status.success());
}
