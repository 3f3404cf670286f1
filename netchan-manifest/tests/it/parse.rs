use std::io::Write as _;

use netchan_manifest::{
    parse, parse_file, BlockDefect, ManifestError, ManifestWarning, ScanState, StreamClass,
};

const MANIFEST: &str = r#"
/*
 * Sensor manifest
 */
#pragma once
#include <netchan.h>

struct sensor {
	uint64_t val;
	uint64_t seqnr;
};

struct channel_attrs nc_channels[] = {
	{
		/* DEFAULT_MCAST */
		.dst       = {0x01, 0x00, 0x5E, 0x01, 0x11, 0x42},
		.stream_id = 42,
		.sc	   = CLASS_A,
		.size      = 16,
		.freq      = 200, /* Hz */
#ifndef __cplusplus
		.name      = "mcast42",
#endif
	},
	{
		.dst       = {0x01, 0x00, 0x5E, 0x01, 0x11, 0x9A},
		.stream_id = 154,
		.sc	   = CLASS_B,
		.size      = 64u,
		.freq      = 50, // 50 Hz
		.name      = "mcast154"
	},
	{
		.stream_id = 17,
		.sc	   = CLASS_A,
		.freq      = 100,
		.name      = "mcast17",
	},
	{
		.stream_id = 18,
		.sc	   = CLASS_B,
		.size      = 8,
		.freq      = 100,
		.name      = "mcast42",
	},
	{
		.stream_id = 19,
		.size      = 8,
		.freq      = 10,
		.name      = "noclass",
	}
};

struct channel_attrs ignored[] = {
	{ .name = "never", .size = 1, .freq = 1 },
};
"#;

#[test]
fn parses_valid_blocks() {
    let manifest = parse(MANIFEST);
    let registry = manifest.registry();

    // mcast17 is incomplete and the second mcast42 is a duplicate.
    assert_eq!(registry.len(), 3);
    assert_eq!(manifest.state(), &ScanState::Done);

    let names: Vec<_> = registry.iter().map(|ch| ch.name()).collect();
    assert_eq!(names, ["mcast42", "mcast154", "noclass"]);

    let first = registry.get("mcast42").unwrap();
    assert_eq!(first.stream_class(), StreamClass::A);
    assert_eq!(first.size_bytes(), 16);
    assert_eq!(first.frequency_hz(), 200);
    assert_eq!(first.stream_id(), Some("42"));
    assert_eq!(first.attribute("dst"), Some("{0x01, 0x00, 0x5E, 0x01, 0x11, 0x42}"));

    let b = registry.get("mcast154").unwrap();
    assert_eq!(b.stream_class(), StreamClass::B);
    assert_eq!(b.size_bytes(), 64);
    assert_eq!(b.frequency_hz(), 50);

    // No `.sc` means the zero value of the enum, CLASS_A.
    assert_eq!(registry.get("noclass").unwrap().stream_class(), StreamClass::A);
}

#[test]
fn reports_incomplete_and_duplicate_blocks() {
    let manifest = parse(MANIFEST);
    let warnings = manifest.warnings();

    assert_eq!(warnings.len(), 2);
    match &warnings[0] {
        ManifestWarning::MalformedChannelBlock { defect, block } => {
            assert_eq!(defect, &BlockDefect::MissingKeys(vec!["size"]));
            assert_eq!(block.get("name").map(String::as_str), Some("mcast17"));
        }
        other => panic!("unexpected warning: {other:?}"),
    }
    assert_eq!(
        warnings[1],
        ManifestWarning::DuplicateChannelName { name: "mcast42".to_string() }
    );
    assert!(warnings[1].to_string().contains("mcast42 seen more than once"));
}

#[test]
fn nothing_before_marker_is_read() {
    let text = "{\n.name = \"x\",\n.size = 1,\n.freq = 1,\n}\n";
    let manifest = parse(text);

    assert!(manifest.registry().is_empty());
    assert!(!manifest.found_struct());
    assert_eq!(manifest.state(), &ScanState::BeforeStruct);
}

#[test]
fn unterminated_struct_drops_pending_block() {
    let text = "struct channel_attrs c[] = {\n{\n.name = \"a\",\n.size = 1,\n.freq = 1,\n},\n{\n.name = \"b\",\n";
    let manifest = parse(text);

    assert_eq!(manifest.registry().len(), 1);
    assert!(manifest.registry().contains("a"));
    assert!(matches!(manifest.state(), ScanState::Scanning { depth: 1, .. }));
}

#[test]
fn array_brace_on_its_own_line() {
    let text = r#"struct channel_attrs nc_channels[] =
{
	{
		.name = "a",
		.size = 8,
		.freq = 10,
	},
	{
		.name = "b",
		.sc   = CLASS_B,
		.size = 16,
		.freq = 20,
	},
};"#;
    let manifest = parse(text);

    let names: Vec<_> = manifest.registry().iter().map(|ch| ch.name()).collect();
    assert_eq!(names, ["a", "b"]);
    assert!(manifest.warnings().is_empty());
    assert_eq!(manifest.state(), &ScanState::Done);

    let a = manifest.registry().get("a").unwrap();
    assert_eq!((a.size_bytes(), a.frequency_hz()), (8, 10));
    assert_eq!(manifest.registry().get("b").unwrap().stream_class(), StreamClass::B);
}

#[test]
fn array_never_opened() {
    let manifest = parse("struct channel_attrs nc_channels[];
");

    assert!(manifest.registry().is_empty());
    assert!(manifest.found_struct());
    assert_eq!(manifest.state(), &ScanState::BeforeArray);
}

#[test]
fn multi_line_comment_is_not_supported() {
    // Each line is cleaned on its own, so the commented-out `.size` still overrides the first.
    let text = r#"struct channel_attrs c[] = {
	{
		.name = "a",
		.size = 8,
		/* old values:
		.size = 999,
		*/
		.freq = 10,
	},
};"#;
    let manifest = parse(text);
    let channel = manifest.registry().get("a").unwrap();

    assert_eq!(channel.size_bytes(), 999);
    assert!(manifest.warnings().is_empty());
}

#[test]
fn invalid_numbers_are_malformed() {
    let text = "struct channel_attrs c[] = {\n{\n.name = \"a\",\n.size = sizeof(struct sensor),\n.freq = 10,\n},\n};";
    let manifest = parse(text);

    assert!(manifest.registry().is_empty());
    assert!(matches!(
        &manifest.warnings()[0],
        ManifestWarning::MalformedChannelBlock {
            defect: BlockDefect::InvalidValue { key: "size", .. },
            ..
        }
    ));
}

#[test]
fn parse_file_reads_manifest() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(MANIFEST.as_bytes()).unwrap();

    let manifest = parse_file(file.path()).unwrap();
    assert_eq!(manifest.registry().len(), 3);
}

#[test]
fn parse_file_missing() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("manifest.h");

    let err = parse_file(&path).unwrap_err();
    assert!(matches!(err, ManifestError::FileNotFound { .. }));
    assert!(err.to_string().contains("manifest.h"));
}
