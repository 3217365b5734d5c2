mod common;

use common::FakeBackend;
use dtf_ui::client::{Body, Method};
use dtf_ui::error::ClientError;
use dtf_ui::form::{
    DynamicForm, FieldInput, FormAction, FormEndpoints, FormField, FormMode, InstanceList,
    SubmitOutcome, Transition, Validation,
};
use dtf_ui::html::Node;
use dtf_ui::toast::{ToastKind, ToastNotifier};
use serde_json::{Value, json};

fn property_form() -> DynamicForm {
    DynamicForm::new(
        "property_",
        "property",
        FormEndpoints {
            instance_base: "/api/projects/demo/properties/".into(),
            submit: "/demo/settings".into(),
        },
        vec![
            FormField::text("name", "Name"),
            FormField::text("description", "Description"),
            FormField::checkbox("required", "Required"),
        ],
    )
}

#[test]
fn invalid_submit_marks_only_reported_fields() {
    let backend = FakeBackend::new().respond(json!({
        "result": "invalid",
        "errors": {"name": [{"message": "This field is required.", "code": "required"}]}
    }));
    let mut notifier = ToastNotifier::new();
    let mut form = property_form();
    let mut called = false;

    let outcome = form
        .submit(&backend, &mut notifier, FormAction::Add, |_| called = true)
        .unwrap();

    assert!(matches!(outcome, SubmitOutcome::Rejected(ref errors) if errors.contains_key("name")));
    assert!(!called);
    assert!(notifier.is_empty());
    let model = form.model();
    assert_eq!(
        model.field("name").unwrap().validation,
        Validation::Invalid("This field is required.".into())
    );
    assert_eq!(model.field("description").unwrap().validation, Validation::Valid);
    assert_eq!(model.field("required").unwrap().validation, Validation::Valid);
}

#[test]
fn valid_submit_hands_scoped_payload_to_callback() {
    let backend = FakeBackend::new().respond(json!({
        "result": "valid",
        "property": {"id": 5, "name": "os"}
    }));
    let mut notifier = ToastNotifier::new();
    let mut form = property_form();
    form.fill(json!({"name": "os", "required": true}).as_object().unwrap());

    let mut received = Value::Null;
    let outcome = form
        .submit(&backend, &mut notifier, FormAction::Add, |payload| {
            received = payload.clone()
        })
        .unwrap();

    assert_eq!(received, json!({"id": 5, "name": "os"}));
    assert_eq!(outcome, SubmitOutcome::Accepted(received.clone()));

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].method, Method::Post);
    assert_eq!(requests[0].path, "/demo/settings");
    assert_eq!(
        requests[0].body,
        Body::Form(vec![
            ("name".into(), "os".into()),
            ("description".into(), String::new()),
            ("required".into(), "on".into()),
            ("scope".into(), "property".into()),
            ("action".into(), "add".into()),
        ])
    );
}

#[test]
fn unrecognized_result_is_ignored() {
    let backend = FakeBackend::new().respond(json!({"result": "pending"}));
    let mut notifier = ToastNotifier::new();
    let mut form = property_form();

    let outcome = form
        .submit(&backend, &mut notifier, FormAction::Edit, |_| {
            panic!("callback must not run")
        })
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Ignored);
    assert_eq!(form.model().field("name").unwrap().validation, Validation::Unset);
}

#[test]
fn submit_failure_toasts_and_returns_error() {
    let backend = FakeBackend::new().fail_with_status(500);
    let mut notifier = ToastNotifier::new();
    let mut form = property_form();

    let err = form
        .submit(&backend, &mut notifier, FormAction::Add, |_| {})
        .unwrap_err();
    assert!(matches!(err, ClientError::Status { code: 500, .. }));
    let toast = notifier.iter().next().unwrap();
    assert_eq!(toast.kind, ToastKind::Danger);
    assert_eq!(toast.content, "Failed to submit form.");
}

#[test]
fn start_edit_fills_form_and_switches_mode() {
    let backend = FakeBackend::new().respond(json!({
        "id": 7, "name": "arch", "description": null, "required": false
    }));
    let mut notifier = ToastNotifier::new();
    let mut form = property_form();

    form.start_edit(&backend, &mut notifier, "7").unwrap();

    assert_eq!(form.mode(), &FormMode::Editing("7".into()));
    assert_eq!(
        form.model().field("name").unwrap().input,
        FieldInput::Text("arch".into())
    );
    assert_eq!(
        form.model().field("required").unwrap().input,
        FieldInput::Checkbox(false)
    );
    assert_eq!(backend.requests()[0].path, "/api/projects/demo/properties/7");
    assert_eq!(backend.requests()[0].method, Method::Get);

    let html = form.render();
    let cancel = html.find_by_id("property_edit_cancel").unwrap();
    assert_eq!(cancel.attr("hidden"), None);

    form.cancel_edit();
    assert_eq!(form.mode(), &FormMode::Idle);
    assert_eq!(
        form.model().field("name").unwrap().input,
        FieldInput::Text(String::new())
    );
}

#[test]
fn start_edit_rejects_non_object_body() {
    let backend = FakeBackend::new().respond(json!([1, 2]));
    let mut notifier = ToastNotifier::new();
    let mut form = property_form();

    let err = form.start_edit(&backend, &mut notifier, "7").unwrap_err();
    assert!(matches!(err, ClientError::Decode { .. }));
    assert_eq!(form.mode(), &FormMode::Idle);
    assert_eq!(notifier.len(), 1);
}

#[test]
fn delete_removes_row_with_fade_out() {
    let backend = FakeBackend::new().respond(Value::Null);
    let mut notifier = ToastNotifier::new();
    let form = property_form();
    let mut rows = InstanceList::default();
    rows.push("property_3", vec![Node::text("os")]);
    rows.push("property_4", vec![Node::text("arch")]);

    let removed = form
        .delete_instance(&backend, &mut notifier, "3", &mut rows)
        .unwrap()
        .unwrap();

    assert_eq!(removed.row.dom_id, "property_3");
    assert_eq!(removed.transition, Transition::FadeOutFast);
    assert_eq!(rows.rows.len(), 1);
    assert_eq!(backend.requests()[0].method, Method::Delete);
    assert_eq!(backend.requests()[0].path, "/api/projects/demo/properties/3");
}

#[test]
fn delete_failure_keeps_row_and_toasts() {
    let backend = FakeBackend::new().fail_with_status(403);
    let mut notifier = ToastNotifier::new();
    let form = property_form();
    let mut rows = InstanceList::default();
    rows.push("property_3", vec![Node::text("os")]);

    let result = form.delete_instance(&backend, &mut notifier, "3", &mut rows);

    assert!(result.is_err());
    assert_eq!(rows.rows.len(), 1);
    let toast = notifier.iter().next().unwrap();
    assert_eq!(toast.kind, ToastKind::Danger);
    assert_eq!(toast.content, "Failed to delete instance 3.");
}
