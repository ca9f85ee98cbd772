// The reference dashboard driven end to end through the sync scheduler
use approx::assert_relative_eq;
use dashlink_core::network::{ingest_datagram, RecordingSink, TransportStats};
use dashlink_core::{DashboardWidget, InboundPacket, SyncScheduler};
use dashlink_widgets::{
    default_dashboard, encode_f32s, DashboardDefinition, NumericDisplayFloat32, PushButton, Rgb,
    RudderPlot,
};
use parking_lot::Mutex;
use std::sync::Arc;

#[test]
fn test_reference_layout() {
    let scheduler = DashboardDefinition::default().build_scheduler().unwrap();
    let layout = scheduler.datastore().export_layout();

    let inputs: Vec<u32> = layout.iter().map(|r| r.input_offset).collect();
    let outputs: Vec<u32> = layout.iter().map(|r| r.output_offset).collect();
    assert_eq!(inputs, vec![0, 3, 6, 9, 33, 49, 59]);
    assert_eq!(outputs, vec![0, 1, 2, 3, 3, 3, 3]);
    assert_eq!(scheduler.datastore().input_len(), 69);
    assert_eq!(scheduler.output().len(), 3);
}

#[test]
fn test_button_presses_reach_output_buffer() {
    let button = Arc::new(Mutex::new(PushButton::new("Arm")));
    let sink = RecordingSink::new();
    let mut scheduler = SyncScheduler::new(vec![
        Box::new(PushButton::new("Idle")),
        Box::new(Arc::clone(&button)),
    ])
    .unwrap()
    .with_sink(sink.clone());

    scheduler.tick();
    assert_eq!(sink.last().unwrap(), vec![0, 0]);

    {
        let mut button = button.lock();
        button.press();
        button.release();
        button.press();
    }
    scheduler.tick();
    assert_eq!(sink.last().unwrap(), vec![0, 2]);
    assert!(button.lock().is_pressed());
}

#[test]
fn test_inbound_packets_update_widget_state() {
    let button = Arc::new(Mutex::new(PushButton::new("Status")));
    let rudder = Arc::new(Mutex::new(RudderPlot::new()));
    let display = Arc::new(Mutex::new(NumericDisplayFloat32::new(2)));

    let mut scheduler = SyncScheduler::new(vec![
        Box::new(Arc::clone(&button)),
        Box::new(Arc::clone(&rudder)),
        Box::new(Arc::clone(&display)),
    ])
    .unwrap();
    let descriptors = scheduler.descriptors();
    let datastore = scheduler.datastore();
    let stats = TransportStats::default();

    let packets = [
        InboundPacket::encode(descriptors[0].input_offset, &[0xFF, 0xFF, 0xFF]),
        InboundPacket::encode(
            descriptors[1].input_offset,
            &encode_f32s(&[0.2, 0.5, 3.0, 4.0]),
        ),
        InboundPacket::encode(descriptors[2].input_offset, &{
            let mut data = 9.876f32.to_le_bytes().to_vec();
            data.extend_from_slice(&[0, 0, 255, 255, 255, 0]);
            data
        }),
    ];
    for packet in &packets {
        assert!(ingest_datagram(&datastore, packet, &stats));
    }
    scheduler.tick();

    assert_eq!(button.lock().base_color(), Rgb::WHITE);
    assert_eq!(button.lock().text_color(), Rgb::BLACK);

    let rudder = rudder.lock();
    assert_eq!(rudder.throttles(), (0.5, 1.0));
    assert_relative_eq!(rudder.display_angles().1, 35f32.to_radians(), epsilon = 1e-6);

    let display = display.lock();
    assert_eq!(display.text(), "9.88");
    assert_eq!(display.style().foreground, Rgb::new(0, 0, 255));
    assert_eq!(display.style().background, Rgb::new(255, 255, 0));
}

#[test]
fn test_dashboard_file_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dashlink.toml");
    std::fs::write(
        &path,
        r#"
[transport]
group = "239.1.1.1"

[[widgets]]
type = "VectorPlot"

[[widgets]]
type = "PushButton"
label = "Go"
"#,
    )
    .unwrap();

    let definition = DashboardDefinition::discover_in(dir.path()).unwrap();
    assert_eq!(definition.config.transport.group.octets(), [239, 1, 1, 1]);
    let widgets = definition.build_widgets();
    let sizes: Vec<(u32, u32)> = widgets.iter().map(|w| w.required_sizes()).collect();
    assert_eq!(sizes, vec![(24, 0), (3, 1)]);
}

#[test]
fn test_discover_without_file_uses_reference_dashboard() {
    let dir = tempfile::tempdir().unwrap();
    let definition = DashboardDefinition::discover_in(dir.path()).unwrap();
    assert_eq!(definition.widgets, default_dashboard());
}

#[test]
fn test_invalid_dashboard_config_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dash.yaml");
    std::fs::write(&path, "scheduler:\n  rate_hz: 0.0\n").unwrap();
    assert!(DashboardDefinition::from_file(&path).is_err());
}
