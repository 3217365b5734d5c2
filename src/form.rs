//! Generic create/edit/delete form controller.
//!
//! A [`DynamicForm`] drives one named form on a settings page: it fills the
//! form from an existing instance for editing, submits it with a
//! `scope`/`action` pair, paints the per-field validation errors returned by
//! the backend, and deletes instances from the accompanying list.
//!
//! The form's state lives in explicit view-model values ([`FormModel`],
//! [`FormMode`], [`InstanceList`]); [`DynamicForm::render`] turns it into
//! markup.
use std::fmt;

use serde_json::{Map, Value};

use crate::api::{FieldErrors, FormResponse, FormResult};
use crate::client::{ApiRequest, Backend};
use crate::error::{ClientError, Result};
use crate::html::Node;
use crate::toast::ToastNotifier;

// ---------------------------------------------------------------------------
// Form view-model
// ---------------------------------------------------------------------------

/// Current input of a field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldInput {
    Text(String),
    Checkbox(bool),
}

/// Validation decoration of a field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Validation {
    #[default]
    Unset,
    Valid,
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub name: String,
    pub label: String,
    pub input: FieldInput,
    /// Input restored by a reset.
    pub initial: FieldInput,
    pub validation: Validation,
    /// Whether the field shows an inline feedback message.
    pub feedback: bool,
}

impl FormField {
    pub fn text(name: &str, label: &str) -> Self {
        Self::with_input(name, label, FieldInput::Text(String::new()), true)
    }

    pub fn checkbox(name: &str, label: &str) -> Self {
        Self::with_input(name, label, FieldInput::Checkbox(false), false)
    }

    fn with_input(name: &str, label: &str, input: FieldInput, feedback: bool) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            initial: input.clone(),
            input,
            validation: Validation::Unset,
            feedback,
        }
    }

    /// Set the input restored on reset (and the current input).
    pub fn with_initial(mut self, input: FieldInput) -> Self {
        self.initial = input.clone();
        self.input = input;
        self
    }

    pub fn without_feedback(mut self) -> Self {
        self.feedback = false;
        self
    }

    fn reset(&mut self) {
        self.input = self.initial.clone();
        self.validation = Validation::Unset;
    }

    fn fill(&mut self, value: &Value) {
        self.input = match self.input {
            FieldInput::Checkbox(_) => FieldInput::Checkbox(is_truthy(value)),
            FieldInput::Text(_) => FieldInput::Text(input_text(value)),
        };
    }
}

/// The fields of one form, in display order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormModel {
    pub fields: Vec<FormField>,
}

impl FormModel {
    pub fn new(fields: Vec<FormField>) -> Self {
        Self { fields }
    }

    pub fn field(&self, name: &str) -> Option<&FormField> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn field_mut(&mut self, name: &str) -> Option<&mut FormField> {
        self.fields.iter_mut().find(|f| f.name == name)
    }

    /// Restore every field's initial input and clear validation.
    pub fn reset(&mut self) {
        self.fields.iter_mut().for_each(FormField::reset);
    }

    /// Populate the fields whose names appear in `data`.
    pub fn fill(&mut self, data: &Map<String, Value>) {
        for field in &mut self.fields {
            if let Some(value) = data.get(&field.name) {
                field.fill(value);
            }
        }
    }

    /// Mark fields named in `errors` invalid with their first message and
    /// every other field valid.
    pub fn paint_errors(&mut self, errors: &FieldErrors) {
        for field in &mut self.fields {
            field.validation = match errors.get(&field.name) {
                Some(messages) => Validation::Invalid(
                    messages
                        .first()
                        .map(|e| e.message.clone())
                        .unwrap_or_default(),
                ),
                None => Validation::Valid,
            };
        }
    }

    /// Successful controls as form-encoded pairs: every text field, and
    /// checked checkboxes as `on`.
    pub fn serialize(&self) -> Vec<(String, String)> {
        self.fields
            .iter()
            .filter_map(|f| match &f.input {
                FieldInput::Text(text) => Some((f.name.clone(), text.clone())),
                FieldInput::Checkbox(true) => Some((f.name.clone(), "on".to_string())),
                FieldInput::Checkbox(false) => None,
            })
            .collect()
    }
}

/// JavaScript-style truthiness of a JSON value.
fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

/// Text shown in an input for a JSON value.
fn input_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// ---------------------------------------------------------------------------
// Instance list
// ---------------------------------------------------------------------------

/// A row in the list of existing instances next to the form.
#[derive(Debug, Clone, PartialEq)]
pub struct InstanceRow {
    pub dom_id: String,
    pub cells: Vec<Node>,
}

/// Presentation hint for a row leaving the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    FadeOutFast,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RemovedRow {
    pub row: InstanceRow,
    pub transition: Transition,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct InstanceList {
    pub rows: Vec<InstanceRow>,
}

impl InstanceList {
    pub fn push(&mut self, dom_id: impl Into<String>, cells: Vec<Node>) {
        self.rows.push(InstanceRow {
            dom_id: dom_id.into(),
            cells,
        });
    }

    pub fn remove(&mut self, dom_id: &str) -> Option<InstanceRow> {
        let pos = self.rows.iter().position(|r| r.dom_id == dom_id)?;
        Some(self.rows.remove(pos))
    }

    pub fn render(&self) -> Node {
        Node::element("tbody").children(self.rows.iter().map(|row| {
            Node::element("tr")
                .id(row.dom_id.as_str())
                .children(row.cells.iter().map(|c| Node::element("td").child(c.clone())))
        }))
    }
}

// ---------------------------------------------------------------------------
// Controller
// ---------------------------------------------------------------------------

/// Whether the form adds a new instance or edits an existing one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormMode {
    #[default]
    Idle,
    Editing(String),
}

/// Operation carried in the `action` field of a submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormAction {
    Add,
    Edit,
}

impl FormAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Edit => "edit",
        }
    }
}

impl fmt::Display for FormAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the backend made of a submission.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Saved; carries the payload stored under the form's scope.
    Accepted(Value),
    /// Validation failed; the errors have been painted onto the form.
    Rejected(FieldErrors),
    /// The backend answered with neither `valid` nor `invalid`.
    Ignored,
}

/// Where a form reads, writes and deletes instances.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormEndpoints {
    /// Prefix of instance URLs; the instance id is appended as-is.
    pub instance_base: String,
    /// Target of form submissions.
    pub submit: String,
}

/// Controller for one named form.
#[derive(Debug, Clone)]
pub struct DynamicForm {
    id_prefix: String,
    scope: String,
    endpoints: FormEndpoints,
    model: FormModel,
    mode: FormMode,
}

impl DynamicForm {
    pub fn new(id_prefix: &str, scope: &str, endpoints: FormEndpoints, fields: Vec<FormField>) -> Self {
        Self {
            id_prefix: id_prefix.to_string(),
            scope: scope.to_string(),
            endpoints,
            model: FormModel::new(fields),
            mode: FormMode::Idle,
        }
    }

    pub fn form_id(&self) -> String {
        format!("{}form_id", self.id_prefix)
    }

    pub fn model(&self) -> &FormModel {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut FormModel {
        &mut self.model
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    fn instance_url(&self, id: &str) -> String {
        format!("{}{id}", self.endpoints.instance_base)
    }

    /// Clear inputs and validation and go back to adding.
    pub fn reset(&mut self) {
        self.model.reset();
        self.mode = FormMode::Idle;
    }

    pub fn fill(&mut self, data: &Map<String, Value>) {
        self.model.fill(data);
    }

    /// Load an instance into the form and switch to editing it.
    pub fn start_edit(
        &mut self,
        backend: &impl Backend,
        notifier: &mut ToastNotifier,
        id: &str,
    ) -> Result<()> {
        let url = self.instance_url(id);
        let data = match backend.send(&ApiRequest::get(url.as_str())) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                let err = ClientError::Decode {
                    url,
                    message: "expected a JSON object".to_string(),
                };
                notifier.report_failure("start_edit", format!("Failed to load instance {id}."), &err);
                return Err(err);
            }
            Err(err) => {
                notifier.report_failure("start_edit", format!("Failed to load instance {id}."), &err);
                return Err(err);
            }
        };

        self.model.reset();
        self.model.fill(&data);
        self.mode = FormMode::Editing(id.to_string());
        Ok(())
    }

    pub fn cancel_edit(&mut self) {
        self.reset();
    }

    /// Submit the form.
    ///
    /// `on_success` receives the payload the backend returned under this
    /// form's scope (`Null` when absent).
    pub fn submit(
        &mut self,
        backend: &impl Backend,
        notifier: &mut ToastNotifier,
        action: FormAction,
        on_success: impl FnOnce(&Value),
    ) -> Result<SubmitOutcome> {
        let mut fields = self.model.serialize();
        fields.push(("scope".to_string(), self.scope.clone()));
        fields.push(("action".to_string(), action.as_str().to_string()));

        let url = self.endpoints.submit.clone();
        let response = backend
            .send(&ApiRequest::post_form(url.as_str(), fields))
            .and_then(|body| {
                serde_json::from_value::<FormResponse>(body).map_err(|e| ClientError::Decode {
                    url: url.clone(),
                    message: e.to_string(),
                })
            });

        let response = match response {
            Ok(r) => r,
            Err(err) => {
                notifier.report_failure("submit_form", "Failed to submit form.", &err);
                return Err(err);
            }
        };

        Ok(match response.result {
            FormResult::Valid => {
                let payload = response
                    .payload
                    .get(&self.scope)
                    .cloned()
                    .unwrap_or(Value::Null);
                on_success(&payload);
                SubmitOutcome::Accepted(payload)
            }
            FormResult::Invalid => {
                self.model.paint_errors(&response.errors);
                SubmitOutcome::Rejected(response.errors)
            }
            FormResult::Unrecognized => SubmitOutcome::Ignored,
        })
    }

    /// Delete an instance and drop its row (`{prefix}{id}`) from `rows`.
    pub fn delete_instance(
        &self,
        backend: &impl Backend,
        notifier: &mut ToastNotifier,
        id: &str,
        rows: &mut InstanceList,
    ) -> Result<Option<RemovedRow>> {
        if let Err(err) = backend.send(&ApiRequest::delete(self.instance_url(id))) {
            notifier.report_failure("delete_instance", format!("Failed to delete instance {id}."), &err);
            return Err(err);
        }

        let dom_id = format!("{}{id}", self.id_prefix);
        Ok(rows.remove(&dom_id).map(|row| RemovedRow {
            row,
            transition: Transition::FadeOutFast,
        }))
    }

    /// Render the form. The add/edit buttons and the cancel button follow
    /// the current mode.
    pub fn render(&self) -> Node {
        let editing = matches!(self.mode, FormMode::Editing(_));

        let buttons = Node::element("div")
            .class("d-flex gap-2")
            .child(
                Node::element("button")
                    .attr("type", "submit")
                    .attr("name", "add")
                    .class("btn btn-primary")
                    .flag("hidden", editing)
                    .with_text("Add"),
            )
            .child(
                Node::element("button")
                    .attr("type", "submit")
                    .attr("name", "edit")
                    .class("btn btn-primary")
                    .flag("hidden", !editing)
                    .with_text("Save"),
            )
            .child(
                Node::element("button")
                    .attr("type", "button")
                    .id(format!("{}edit_cancel", self.id_prefix))
                    .class("btn btn-outline-secondary")
                    .flag("hidden", !editing)
                    .with_text("Cancel"),
            );

        Node::element("form")
            .id(self.form_id())
            .children(self.model.fields.iter().map(|f| self.render_field(f)))
            .child(buttons)
    }

    fn render_field(&self, field: &FormField) -> Node {
        let input_id = format!("{}{}", self.id_prefix, field.name);
        let state = match field.validation {
            Validation::Unset => "",
            Validation::Valid => " is-valid",
            Validation::Invalid(_) => " is-invalid",
        };
        let message = match &field.validation {
            Validation::Invalid(m) => m.as_str(),
            _ => "",
        };
        let feedback = field
            .feedback
            .then(|| Node::element("div").class("invalid-feedback").with_text(message));

        match &field.input {
            FieldInput::Text(text) => Node::element("div")
                .class("mb-3")
                .child(
                    Node::element("label")
                        .attr("for", input_id.as_str())
                        .class("form-label")
                        .with_text(field.label.as_str()),
                )
                .child(
                    Node::element("input")
                        .attr("type", "text")
                        .class(format!("form-control{state}"))
                        .attr("name", field.name.as_str())
                        .id(input_id.as_str())
                        .attr("value", text.as_str()),
                )
                .children(feedback),
            FieldInput::Checkbox(checked) => Node::element("div")
                .class("form-check mb-3")
                .child(
                    Node::element("input")
                        .attr("type", "checkbox")
                        .class(format!("form-check-input{state}"))
                        .attr("name", field.name.as_str())
                        .id(input_id.as_str())
                        .flag("checked", *checked),
                )
                .children(feedback)
                .child(
                    Node::element("label")
                        .attr("for", input_id.as_str())
                        .class("form-check-label")
                        .with_text(field.label.as_str()),
                ),
        }
    }
}
