use netchan_cbs::{
    compute, split_tx_streams,
    tc::{command_line, CbsQdisc},
    units::{Credit, Kbps, DEFAULT_LINK_SPEED},
    ShaperWarning,
};
use netchan_manifest::{parse, StreamClass};

const MANIFEST: &str = r#"
struct channel_attrs nc_channels[] = {
	{
		.stream_id = 1,
		.sc        = CLASS_A,
		.size      = 100,
		.freq      = 8000,
		.name      = "A",
	},
	{
		.stream_id = 2,
		.sc        = CLASS_B,
		.size      = 8,
		.freq      = 100,
		.name      = "B",
	},
	{
		.stream_id = 3,
		.sc        = CLASS_A,
		.size      = 8,
		.freq      = 100,
		.name      = "rx_only",
	},
};
"#;

#[test]
fn manifest_to_cbs_commands() {
    let manifest = parse(MANIFEST);
    let report = compute(manifest.registry(), split_tx_streams("A, B"), DEFAULT_LINK_SPEED);

    assert!(report.warnings.is_empty());
    assert_eq!(report.class_a.idle_slope, Kbps::new(10_624));
    // (8 + 24 -> 46 + 42) * 100 * 8 = 70_400 bps
    assert_eq!(report.class_b.bandwidth, Kbps::new(71));
    assert_eq!(report.class_b.idle_slope, Kbps::new(10_695));
    assert_eq!(report.class_b.max_burst_size, Credit::ZERO);

    let a = command_line(&CbsQdisc::new("eth0", report.class(StreamClass::A)).build());
    assert!(a.ends_with("cbs idleslope 10624 sendslope -989376 hicredit 15 locredit -1484 offload 1"));

    let b = command_line(&CbsQdisc::new("eth0", report.class(StreamClass::B)).build());
    assert!(b.contains(" parent 8003:2 cbs idleslope 10695 sendslope -989305 "));
}

#[test]
fn receive_only_channels_do_not_count() {
    let manifest = parse(MANIFEST);
    let report = compute(manifest.registry(), ["A"], DEFAULT_LINK_SPEED);

    assert_eq!(report.channels.len(), 1);
    assert_eq!(report.class_a.idle_slope, Kbps::new(10_624));
}

#[test]
fn unknown_names_are_advisory() {
    let manifest = parse(MANIFEST);
    let report = compute(manifest.registry(), split_tx_streams("A,nope,B"), DEFAULT_LINK_SPEED);

    assert_eq!(
        report.warnings,
        [ShaperWarning::UnknownTransmitChannel { name: "nope".to_string() }]
    );
    assert_eq!(report.class_b.idle_slope, Kbps::new(10_695));
}

#[test]
fn idle_slope_a_is_never_below_one() {
    let manifest = parse(MANIFEST);

    for tx in ["", "B", "nope", "B,nope"] {
        let report = compute(manifest.registry(), split_tx_streams(tx), DEFAULT_LINK_SPEED);
        assert_eq!(report.class_a.idle_slope, Kbps::new(1), "tx {tx:?}");
    }
}

#[test]
fn slower_link() {
    let manifest = parse(MANIFEST);
    let report = compute(manifest.registry(), ["A"], Kbps::new(100_000));

    // 1500 / 100_000 = 15ms of interference.
    assert!((report.class_a.interference_time.as_millis_f64() - 15.0).abs() < 1e-9);
    assert_eq!(report.class_a.send_slope, Kbps::new(89_376));
    assert_eq!(report.class_a.hi_credit, Credit::new(159));
    assert_eq!(report.class_a.lo_credit, Credit::new(1340));
}

#[test]
fn class_b_on_a_full_link() {
    let manifest = parse(MANIFEST);
    let report = compute(manifest.registry(), ["A", "B"], Kbps::new(10_624));

    assert_eq!(report.class_b.lo_credit, Credit::ZERO);
    assert_eq!(report.warnings.len(), 2);

    let b = command_line(&CbsQdisc::new("eth0", report.class(StreamClass::B)).build());
    assert!(b.ends_with("cbs idleslope 10695 sendslope 71 hicredit 0 locredit 0 offload 1"));
}
