//! Tests for `NotificationBus`.

use std::sync::{Arc, Mutex};

use shelf_state::reactive::{Channel, Notification, NotificationBus};
use shelf_state::SortMode;

fn make_log() -> Arc<Mutex<Vec<Notification>>> {
    Arc::new(Mutex::new(Vec::new()))
}

#[test]
fn channel_listener_only_sees_its_channel() {
    let bus = NotificationBus::new();
    let log = make_log();
    let log_clone = Arc::clone(&log);
    bus.on(Channel::FontSize, move |n| log_clone.lock().unwrap().push(n.clone()));

    bus.emit(Notification::WriteModeChanged(1));
    bus.emit(Notification::FontSizeChanged(12));

    assert_eq!(*log.lock().unwrap(), vec![Notification::FontSizeChanged(12)]);
}

#[test]
fn any_listener_sees_everything_in_order() {
    let bus = NotificationBus::new();
    let log = make_log();
    let log_clone = Arc::clone(&log);
    bus.on_any(move |n| log_clone.lock().unwrap().push(n.clone()));

    bus.emit(Notification::LangChanged("en_US".to_string()));
    bus.emit(Notification::SortApplied(SortMode::Natural));

    let channels: Vec<Channel> = log.lock().unwrap().iter().map(|n| n.channel()).collect();
    assert_eq!(channels, vec![Channel::Lang, Channel::SortApplied]);
}

#[test]
fn off_detaches_listener() {
    let bus = NotificationBus::new();
    let log = make_log();
    let log_clone = Arc::clone(&log);
    let id = bus.on(Channel::SelectionStatus, move |n| log_clone.lock().unwrap().push(n.clone()));
    assert_eq!(bus.listener_count(Channel::SelectionStatus), 1);

    assert!(bus.off(Channel::SelectionStatus, id));
    assert!(!bus.off(Channel::SelectionStatus, id));
    bus.emit(Notification::SelectionStatusChanged(0));

    assert!(log.lock().unwrap().is_empty());
    assert_eq!(bus.listener_count(Channel::SelectionStatus), 0);
}

#[test]
fn off_on_the_wrong_channel_does_nothing() {
    let bus = NotificationBus::new();
    let id = bus.on(Channel::FileList, |_| {});
    assert!(!bus.off(Channel::ImageExts, id));
    assert_eq!(bus.listener_count(Channel::FileList), 1);
}

#[test]
fn panicking_listener_does_not_escape_emit() {
    let bus = NotificationBus::new();
    let log = make_log();
    let log_clone = Arc::clone(&log);
    bus.on(Channel::OutputExt, |_| panic!("bad listener"));
    bus.on(Channel::OutputExt, move |n| log_clone.lock().unwrap().push(n.clone()));

    bus.emit(Notification::OutputExtChanged("zip".to_string()));

    assert_eq!(
        *log.lock().unwrap(),
        vec![Notification::OutputExtChanged("zip".to_string())]
    );
}

#[test]
fn from_value_enforces_payload_shape() {
    use serde_json::json;

    assert_eq!(
        Notification::from_value(Channel::FileList, json!(["a", "b"])),
        Some(Notification::FileListChanged(vec!["a".into(), "b".into()]))
    );
    assert_eq!(Notification::from_value(Channel::FileList, json!(["a", 1])), None);
    assert_eq!(Notification::from_value(Channel::FontSize, json!("10")), None);
    assert_eq!(
        Notification::from_value(Channel::FontSize, json!(10.0)),
        Some(Notification::FontSizeChanged(10))
    );
    assert_eq!(Notification::from_value(Channel::WriteMode, json!(0.5)), None);
    assert_eq!(Notification::from_value(Channel::FileMetadataCache, json!([])), None);
    assert_eq!(
        Notification::from_value(Channel::SortApplied, json!(2)),
        Some(Notification::SortApplied(SortMode::MetadataRank))
    );
    assert_eq!(Notification::from_value(Channel::SortApplied, json!(7)), None);
}
