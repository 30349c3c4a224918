use std::rc::Rc;

use serde_json::json;

use super::*;
use crate::controller::{ClickModifiers, GridController};
use crate::filters::{Filter, TextSelection};
use crate::options::GridSettings;
use crate::protocol::SelectAll;
use crate::schedule::ManualClock;
use crate::transport::RecordingTransport;

fn sample() -> DataSet {
    let n = 500;
    DataSet::from_columns(vec![
        (
            "A".to_string(),
            ColumnKind::Number,
            (0..n).map(|i| json!(i as f64 * 0.5)).collect(),
        ),
        (
            "E".to_string(),
            ColumnKind::String,
            (0..n).map(|i| json!(["foo", "bar", "baz", "qux"][i % 4])).collect(),
        ),
        (
            "F".to_string(),
            ColumnKind::Boolean,
            (0..n).map(|i| json!(i % 2 == 0)).collect(),
        ),
        (
            "D".to_string(),
            ColumnKind::Datetime,
            (0..n)
                .map(|i| json!(format!("2013-01-{:02}T00:00:00.000Z", i % 28 + 1)))
                .collect(),
        ),
    ])
    .unwrap()
}

/// Deliver every outbound message to the host and every push back, until quiet
fn pump(ctl: &mut GridController<RecordingTransport>, host: &mut HostDataSource) {
    loop {
        let outbound = ctl.transport().take();
        if outbound.is_empty() {
            return;
        }
        for msg in outbound {
            for push in host.handle(msg) {
                ctl.handle_host_message(push);
            }
        }
    }
}

fn connected() -> (Rc<ManualClock>, GridController<RecordingTransport>, HostDataSource) {
    let clock = Rc::new(ManualClock::new());
    let host = HostDataSource::new(sample());
    let mut ctl = GridController::new(
        RecordingTransport::new(),
        clock.clone(),
        GridSettings::default(),
    );
    for push in host.initial_messages() {
        ctl.handle_host_message(push);
    }
    (clock, ctl, host)
}

#[test]
fn test_initial_page() {
    let (_, ctl, host) = connected();
    let view = ctl.data_view();
    assert_eq!(view.len(), 500);
    assert_eq!(view.range().top, 0);
    assert_eq!(view.range().bottom, 100);
    assert!(view.get_item(99).is_loaded());
    assert!(!view.get_item(100).is_loaded());
    assert_eq!(host.row_count(), 500);
    assert_eq!(ctl.columns()[0].field(), "index");
}

#[test]
fn test_paging_follows_viewport() {
    let (clock, mut ctl, mut host) = connected();
    ctl.transport().take();
    ctl.viewport_changed(300, 315);
    clock.advance_ms(100);
    ctl.tick();
    pump(&mut ctl, &mut host);

    let view = ctl.data_view();
    assert_eq!(view.range().top, 200);
    assert_eq!(view.range().bottom, 400);
    assert_eq!(view.get_item(310).get("index"), Some(&json!(310)));
}

#[test]
fn test_text_filter_round_trip() {
    let (_, mut ctl, mut host) = connected();
    ctl.transport().take();
    ctl.filter_button_clicked("E").unwrap();
    pump(&mut ctl, &mut host);

    match ctl.filter("E") {
        Some(crate::filters::ColumnFilter::Text(f)) => {
            assert_eq!(f.len(), 4);
            assert_eq!(f.visible_values(), vec!["bar", "baz", "foo", "qux"]);
        }
        other => panic!("unexpected {:?}", other),
    }

    ctl.text_value_toggled("E", "foo").unwrap();
    pump(&mut ctl, &mut host);
    assert_eq!(ctl.data_view().len(), 125);
    assert!(!ctl.toolbar().enabled());

    // reopening lists the selection first
    ctl.filter_button_clicked("E").unwrap();
    pump(&mut ctl, &mut host);
    match ctl.filter("E") {
        Some(crate::filters::ColumnFilter::Text(f)) => {
            assert_eq!(f.value_at(0), Some("foo"));
            assert_eq!(f.value_at(1), Some("bar"));
            assert!(matches!(f.selection(), TextSelection::Only(_)));
        }
        other => panic!("unexpected {:?}", other),
    }

    ctl.reset_filter("E").unwrap();
    pump(&mut ctl, &mut host);
    assert_eq!(ctl.data_view().len(), 500);
    assert!(ctl.toolbar().enabled());
}

#[test]
fn test_select_all_then_exclude() {
    let (_, mut ctl, mut host) = connected();
    ctl.filter_button_clicked("E").unwrap();
    pump(&mut ctl, &mut host);
    ctl.text_select_all("E").unwrap();
    pump(&mut ctl, &mut host);
    assert_eq!(ctl.data_view().len(), 500);
    assert!(!ctl.has_active_filter());

    ctl.text_value_toggled("E", "qux").unwrap();
    pump(&mut ctl, &mut host);
    assert_eq!(ctl.data_view().len(), 375);
}

#[test]
fn test_slider_and_date_filters_combine() {
    let (clock, mut ctl, mut host) = connected();
    ctl.filter_button_clicked("A").unwrap();
    pump(&mut ctl, &mut host);
    ctl.slider_moved("A", 100.0, 249.5).unwrap();
    clock.advance_ms(100);
    ctl.tick();
    pump(&mut ctl, &mut host);
    // A = i / 2 >= 100  =>  i >= 200
    assert_eq!(ctl.data_view().len(), 300);

    ctl.filter_button_clicked("D").unwrap();
    pump(&mut ctl, &mut host);
    let day = chrono::NaiveDate::from_ymd_opt(2013, 1, 1).unwrap();
    ctl.date_end_picked("D", day).unwrap();
    pump(&mut ctl, &mut host);
    // day 1 is every 28th row
    let expected = (200..500).filter(|i| i % 28 == 0).count();
    assert_eq!(ctl.data_view().len(), expected);
}

#[test]
fn test_boolean_statistics_and_filter() {
    let (_, mut ctl, mut host) = connected();
    ctl.filter_button_clicked("F").unwrap();
    pump(&mut ctl, &mut host);
    match ctl.filter("F") {
        Some(crate::filters::ColumnFilter::Boolean(f)) => {
            assert_eq!(f.values(), &[true, false]);
        }
        other => panic!("unexpected {:?}", other),
    }
    ctl.boolean_selected("F", Some(false)).unwrap();
    pump(&mut ctl, &mut host);
    assert_eq!(ctl.data_view().len(), 250);
}

#[test]
fn test_sort_round_trip() {
    let (_, mut ctl, mut host) = connected();
    ctl.header_clicked("E");
    pump(&mut ctl, &mut host);
    let view = ctl.data_view();
    assert_eq!(view.get_item(0).get("E"), Some(&json!("bar")));
    assert_eq!(ctl.sort_indicator("E"), crate::controller::SortIndicator::Ascending);

    ctl.header_clicked("E");
    pump(&mut ctl, &mut host);
    assert_eq!(ctl.data_view().get_item(0).get("E"), Some(&json!("qux")));
    // stable: ties keep index order
    assert_eq!(ctl.data_view().get_item(0).get("index"), Some(&json!(3)));
}

#[test]
fn test_add_and_remove_rows() {
    let (_, mut ctl, mut host) = connected();
    ctl.add_row().unwrap();
    pump(&mut ctl, &mut host);
    assert_eq!(host.row_count(), 501);
    assert_eq!(ctl.take_scroll_request(), Some(500));
    let view = ctl.data_view();
    assert_eq!(view.get_item(500).get("index"), Some(&json!(500)));
    assert_eq!(view.get_item(500).get("E"), Some(&json!("qux")));
    assert!(ctl.selection().is_selected(500));

    ctl.row_clicked(500, ClickModifiers::default());
    pump(&mut ctl, &mut host);
    assert_eq!(host.selected_rows(), &[500]);
    ctl.remove_row().unwrap();
    pump(&mut ctl, &mut host);
    assert_eq!(host.row_count(), 500);
    assert_eq!(ctl.data_view().len(), 500);
    assert!(ctl.pending_requests().row_operation.is_none());
}

#[test]
fn test_cell_edit_round_trip() {
    let (_, mut ctl, mut host) = connected();
    ctl.cell_edited(7, "E", "edited").unwrap();
    pump(&mut ctl, &mut host);
    assert_eq!(ctl.data_view().get_item(7).get("E"), Some(&json!("edited")));
    assert_eq!(host.data().value(7, 2), &json!("edited"));
}

#[test]
fn test_host_rejects_mistyped_edit() {
    let mut host = HostDataSource::new(sample());
    let pushes = host.handle(ClientMessage::EditCell {
        row_index: 0,
        column: "A".to_string(),
        unfiltered_index: None,
        value: json!("nope"),
    });
    match &pushes[..] {
        [HostMessage::ShowError { triggered_by, .. }] => {
            assert_eq!(*triggered_by, Some(TriggeredBy::EditCell));
        }
        other => panic!("unexpected {:?}", other),
    }
    let pushes = host.handle(ClientMessage::ChangeSort {
        sort_field: "missing".to_string(),
        sort_ascending: true,
    });
    assert!(matches!(&pushes[..], [HostMessage::ShowError { .. }]));
}

#[test]
fn test_text_search_and_paging() {
    let n = 450;
    let data = DataSet::from_columns(vec![(
        "name".to_string(),
        ColumnKind::String,
        (0..n).map(|i| json!(format!("item{:03}", i))).collect(),
    )])
    .unwrap();
    let mut host = HostDataSource::new(data);

    let pushes = host.handle(ClientMessage::GetColumnMinMax {
        field: "name".to_string(),
        search_val: None,
    });
    let info = match &pushes[..] {
        [HostMessage::ColumnMinMaxUpdated { col_info, .. }] => col_info.clone(),
        other => panic!("unexpected {:?}", other),
    };
    assert_eq!(info.length, Some(450));
    assert_eq!(info.value_range, Some((0, 200)));
    assert_eq!(info.values.as_ref().map(Vec::len), Some(200));

    let pushes = host.handle(ClientMessage::ChangeViewportFilter {
        field: "name".to_string(),
        top: 300,
        bottom: 320,
    });
    match &pushes[..] {
        [HostMessage::UpdateDataViewFilter { col_info, .. }] => {
            assert_eq!(col_info.value_range, Some((200, 400)));
            assert_eq!(
                col_info.values.as_ref().and_then(|v| v.first()),
                Some(&json!("item200"))
            );
        }
        other => panic!("unexpected {:?}", other),
    }

    let pushes = host.handle(ClientMessage::GetColumnMinMax {
        field: "name".to_string(),
        search_val: Some("ITEM44".to_string()),
    });
    match &pushes[..] {
        [HostMessage::UpdateDataViewFilter { col_info, .. }] => {
            assert_eq!(col_info.length, Some(10));
        }
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn test_select_all_descriptor_is_no_condition() {
    let mut host = HostDataSource::new(sample());
    host.handle(ClientMessage::ChangeFilter {
        field: "E".to_string(),
        filter_info: FilterDescriptor::Text {
            field: "E".to_string(),
            selected: Some(TextSelected::All(SelectAll::All)),
            excluded: Some(vec![]),
        },
    });
    assert_eq!(host.row_count(), 500);
}

#[test]
fn test_search_stays_local_to_filter() {
    let (clock, mut ctl, mut host) = connected();
    ctl.filter_button_clicked("E").unwrap();
    pump(&mut ctl, &mut host);
    ctl.text_search_changed("E", "BA").unwrap();
    clock.advance_ms(100);
    ctl.tick();
    pump(&mut ctl, &mut host);
    match ctl.filter("E") {
        Some(crate::filters::ColumnFilter::Text(f)) => {
            assert_eq!(f.visible_values(), vec!["bar", "baz"]);
            assert!(!f.is_active());
        }
        other => panic!("unexpected {:?}", other),
    }
    assert_eq!(ctl.data_view().len(), 500);
}
