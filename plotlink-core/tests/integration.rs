//! Integration tests: the polling driver end to end over an in-memory
//! transport, plus config-driven construction.

use plotlink_core::{
    DeviceMessage, DriverConfig, Instruction, LineFramer, MemoryTransport, Plotter, PlotError,
    Transform, render,
};

// ── Helpers ──────────────────────────────────────────────────────

fn plotter() -> Plotter<MemoryTransport> {
    Plotter::new(MemoryTransport::new())
}

fn deliver(p: &mut Plotter<MemoryTransport>, bytes: &[u8]) {
    p.transport_mut().expect("attached").inject(bytes);
    p.poll_transport();
}

fn written(p: &Plotter<MemoryTransport>) -> Vec<String> {
    p.transport().expect("attached").written().to_vec()
}

fn square() -> Vec<Instruction> {
    vec![
        Instruction::move_to(0, 0),
        Instruction::line_to(10, 0),
        Instruction::line_to(10, 10),
        Instruction::line_to(0, 10),
        Instruction::line_to(0, 0),
    ]
}

// ── Protocol properties ──────────────────────────────────────────

#[test]
fn test_line_scenario_identity() {
    let mut p = plotter();
    p.set_instructions(vec![Instruction::line_to(0, 0)]);
    p.set_transform(0.0, 0.0, 1.0);

    deliver(&mut p, b"OK\n");

    assert_eq!(written(&p), vec!["L 0 0\r".to_string()]);
    assert!(p.is_finished());
}

#[test]
fn test_ok_with_no_queue() {
    let mut p = plotter();
    deliver(&mut p, b"OK\n");
    assert!(written(&p).is_empty());
    assert!(p.is_finished());
}

#[test]
fn test_each_ack_advances_exactly_one() {
    let mut p = plotter();
    p.set_instructions(square());

    for expected in 1..=5 {
        let before = written(&p).len();
        deliver(&mut p, b"OK\r\n");
        assert_eq!(p.progress(), Some((expected, 5)));
        assert_eq!(written(&p).len(), before + 1);
    }

    // exhausted: further acks change nothing
    deliver(&mut p, b"OK\r\n");
    assert_eq!(p.progress(), Some((5, 5)));
    assert_eq!(written(&p).len(), 5);
    assert!(p.is_complete());
}

#[test]
fn test_diagnostics_and_noise_never_advance() {
    let mut p = plotter();
    p.set_instructions(square());

    deliver(&mut p, b"#anything\n# OK\n\nERROR\nok\n OK\n");
    assert_eq!(p.progress(), Some((0, 5)));
    assert!(written(&p).is_empty());
}

#[test]
fn test_chunked_delivery_matches_whole() {
    let stream: &[u8] = b"# boot\r\nOK\r\n#busy\nOK\nnoise\nOK\n";

    let mut whole = plotter();
    whole.set_instructions(square());
    deliver(&mut whole, stream);

    let mut bytewise = plotter();
    bytewise.set_instructions(square());
    for b in stream {
        deliver(&mut bytewise, std::slice::from_ref(b));
    }

    assert_eq!(written(&whole), written(&bytewise));
    assert_eq!(whole.progress(), bytewise.progress());
}

#[test]
fn test_transform_render_round_trip() {
    assert_eq!(
        render(&Instruction::move_to(10, 20), &Transform::new(5.0, 5.0, 2.0)),
        "M 25 45\r"
    );
}

#[test]
fn test_set_transform_idempotent() {
    let mut a = plotter();
    let mut b = plotter();
    for p in [&mut a, &mut b] {
        p.set_instructions(square());
    }

    a.set_transform(3.0, -2.0, 1.5);
    b.set_transform(3.0, -2.0, 1.5);
    b.set_transform(3.0, -2.0, 1.5);

    for _ in 0..5 {
        deliver(&mut a, b"OK\n");
        deliver(&mut b, b"OK\n");
    }
    assert_eq!(written(&a), written(&b));
    assert_eq!(written(&a)[1], "L 18 -2\r");
}

#[test]
fn test_detached_is_finished_and_silent() {
    let mut p: Plotter<MemoryTransport> = Plotter::detached();
    p.set_instructions(square());
    assert!(p.is_finished());
    assert_eq!(p.poll_transport().bytes_read, 0);
}

// ── Framer / message plumbing ────────────────────────────────────

#[test]
fn test_framer_feeds_classifier() {
    let mut framer = LineFramer::new();
    let messages: Vec<DeviceMessage> = framer
        .feed(b"#t=21C\r\nOK\r\n\r\n?\n")
        .map(DeviceMessage::from)
        .collect();
    assert_eq!(
        messages,
        vec![
            DeviceMessage::Diagnostic("#t=21C".into()),
            DeviceMessage::Ack,
            DeviceMessage::Empty,
            DeviceMessage::Unrecognized("?".into()),
        ]
    );
}

// ── Configuration ────────────────────────────────────────────────

#[test]
fn test_config_drives_transform_and_deadline() {
    let cfg = DriverConfig::from_toml_str(
        r#"
        [transform]
        translate_x = 100.0
        translate_y = 50.0
        scale = 2.0

        [link]
        ack_timeout_ms = 1
        "#,
    )
    .unwrap();

    let mut p = Plotter::with_config(Some(MemoryTransport::new()), &cfg);
    p.set_instructions(vec![Instruction::line_to(1, 2)]);
    deliver(&mut p, b"OK\n");
    assert_eq!(written(&p), vec!["L 102 54\r".to_string()]);

    std::thread::sleep(std::time::Duration::from_millis(5));
    assert!(matches!(
        p.check_ack_deadline(),
        Err(PlotError::AckTimeout { index: 0, .. })
    ));
}

#[test]
fn test_config_line_limit_reaches_framer() {
    let cfg = DriverConfig::from_toml_str(
        r#"
        [link]
        max_line_length = 8
        "#,
    )
    .unwrap();

    let mut p = Plotter::with_config(Some(MemoryTransport::new()), &cfg);
    p.set_instructions(vec![Instruction::move_to(3, 4)]);

    p.transport_mut().expect("attached").inject(b"# firmware banner\r\nOK\r\n");
    let report = p.poll_transport();

    assert_eq!(report.discarded, 1);
    assert_eq!(report.diagnostics, 0);
    assert_eq!(report.acks, 1);
    assert_eq!(written(&p), vec!["M 3 4\r".to_string()]);
}
