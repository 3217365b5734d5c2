mod common;

use common::FakeBackend;
use dtf_ui::api::References;
use dtf_ui::client::{Body, Method};
use dtf_ui::error::ClientError;
use dtf_ui::results::{ReferenceUpdateRequest, ResultsTable, TestResult};
use dtf_ui::toast::{ToastKind, ToastNotifier};
use dtf_ui::value::SourceId;
use serde_json::json;

fn results() -> Vec<TestResult> {
    serde_json::from_value(json!([
        {"name": "boot_time", "status": "successful",
         "value": {"type": "duration", "data": "PT12.5S"}},
        {"name": "heap", "status": "unstable",
         "value": {"type": "integer", "data": 2048},
         "reference": {"type": "integer", "data": 1024}, "reference_source": 40},
        {"name": "crc", "status": "failed",
         "value": {"type": "string", "data": "0xBEEF"}}
    ]))
    .unwrap()
}

fn table() -> ResultsTable {
    let references: References = serde_json::from_value(json!({
        "heap": {"value": {"type": "integer", "data": 1000}, "source": 38}
    }))
    .unwrap();
    ResultsTable::build("fw", "41", results(), &references, true)
}

fn request(reference_set_id: Option<&str>, test_reference_id: Option<&str>) -> ReferenceUpdateRequest {
    ReferenceUpdateRequest {
        test_name: "smoke".into(),
        default_source: SourceId::from(41),
        reference_set_id: reference_set_id.map(str::to_string),
        test_reference_id: test_reference_id.map(str::to_string),
        property_values: json!({"board": "rev-b"}),
    }
}

#[test]
fn update_without_set_creates_it_first() {
    let backend = FakeBackend::new()
        .respond(json!({"id": 12}))
        .respond(json!({
            "id": 99,
            "references": {
                "heap": {"value": {"type": "integer", "data": 2048}, "source": 41}
            }
        }));
    let mut notifier = ToastNotifier::new();
    let mut table = table();
    table.set_selected(1, true);

    let outcome = table
        .submit_reference_update(&backend, &mut notifier, &request(None, None))
        .unwrap();

    assert_eq!(outcome.reference_set_id, "12");
    assert_eq!(outcome.test_reference_id.as_deref(), Some("99"));
    assert_eq!(outcome.updated, 1);

    let requests = backend.requests();
    assert_eq!(requests.len(), 2);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/api/projects/fw/references");
    assert_eq!(
        requests[0].body,
        Body::Json(json!({"property_values": {"board": "rev-b"}}))
    );
    assert_eq!(requests[1].method, Method::Post);
    assert_eq!(requests[1].path, "/api/projects/fw/references/12/tests");
    assert_eq!(
        requests[1].body,
        Body::Json(json!({
            "test_name": "smoke",
            "default_source": 41,
            "references": {"heap": {"value": {"type": "integer", "data": 2048}}}
        }))
    );

    let toast = notifier.iter().next().unwrap();
    assert_eq!(toast.kind, ToastKind::Success);
    assert_eq!(toast.content, "Successfully updated 1 references.");

    assert_eq!(table.selected_count(), 0);
    assert!(!table.all_selected());
    assert_eq!(
        table.rows()[1].global_reference().to_html(),
        r#"<a href="/fw/tests/41">2048</a>"#
    );
}

#[test]
fn update_with_known_test_reference_patches() {
    let backend = FakeBackend::new().respond(json!({"references": {}}));
    let mut notifier = ToastNotifier::new();
    let mut table = table();
    table.toggle_all(true);

    let outcome = table
        .submit_reference_update(&backend, &mut notifier, &request(Some("3"), Some("8")))
        .unwrap();

    assert_eq!(outcome.updated, 3);
    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Patch);
    assert_eq!(requests[0].path, "/api/projects/fw/references/3/tests/8");
    assert_eq!(
        notifier.iter().next().unwrap().content,
        "Successfully updated 3 references."
    );
}

#[test]
fn update_with_known_set_posts_tests() {
    let backend = FakeBackend::new().respond(json!({"id": 5, "references": {}}));
    let mut notifier = ToastNotifier::new();
    let mut table = table();
    table.set_selected(0, true);

    table
        .submit_reference_update(&backend, &mut notifier, &request(Some("3"), None))
        .unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/api/projects/fw/references/3/tests");
}

#[test]
fn failed_set_creation_stops_update() {
    let backend = FakeBackend::new().fail_with_status(400);
    let mut notifier = ToastNotifier::new();
    let mut table = table();
    table.set_selected(2, true);

    let err = table
        .submit_reference_update(&backend, &mut notifier, &request(None, None))
        .unwrap_err();

    assert!(matches!(err, ClientError::Status { code: 400, .. }));
    assert_eq!(backend.requests().len(), 1);
    let toast = notifier.iter().next().unwrap();
    assert_eq!(toast.kind, ToastKind::Danger);
    assert_eq!(toast.content, "Failed to create reference set.");
    assert_eq!(table.selected_count(), 1);
}

#[test]
fn set_response_without_id_is_missing_field() {
    let backend = FakeBackend::new().respond(json!({"name": "unnamed"}));
    let mut notifier = ToastNotifier::new();
    let mut table = table();

    let err = table
        .submit_reference_update(&backend, &mut notifier, &request(None, None))
        .unwrap_err();
    assert!(matches!(err, ClientError::MissingField { ref field, .. } if field == "id"));
}

#[test]
fn failed_update_keeps_selection_and_toasts_count() {
    let backend = FakeBackend::new().fail_with_status(500);
    let mut notifier = ToastNotifier::new();
    let mut table = table();
    table.set_selected(0, true);
    table.set_selected(2, true);

    let result = table.submit_reference_update(&backend, &mut notifier, &request(Some("3"), None));

    assert!(result.is_err());
    assert_eq!(table.selected_count(), 2);
    let toast = notifier.iter().next().unwrap();
    assert_eq!(toast.kind, ToastKind::Danger);
    assert_eq!(toast.content, "Failed to update 2 references.");
    assert_eq!(
        table.rows()[1].global_reference().to_html(),
        r#"<a href="/fw/tests/38">1000</a>"#
    );
}

#[test]
fn toggle_all_then_filter_only_selects_visible() {
    let mut table = table();
    table.filter_status("unstable", false);
    table.toggle_all(true);
    assert_eq!(table.selected_count(), 2);

    let html = table.render();
    let boxes = html.find_all_by_id("updateReferenceCheckbox");
    let checked: Vec<bool> = boxes.iter().map(|b| b.attr("checked").is_some()).collect();
    assert_eq!(checked, vec![true, false, true]);
    assert_eq!(
        html.find_by_id("toggleAllReferencesCheckbox").unwrap().attr("checked"),
        Some("")
    );
}

#[test]
fn render_marks_table_for_sorting() {
    let html = table().render();
    let table_el = html.find_by_id("resultsTable").unwrap();
    assert!(table_el.has_class("tablesorter"));
    assert_eq!(html.find_all_by_tag("tr").len(), 4);
    let value_cells = html.find_all_by_id("tableDataValue");
    assert_eq!(
        dtf_ui::html::Node::Element(value_cells[0].clone()).text_content(),
        "0:00:12.500000"
    );
}
