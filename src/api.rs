//! Backend endpoint paths and JSON wire types.
//!
//! Paths are relative to the backend's base URL; the [`Backend`] joins them.
//!
//! [`Backend`]: crate::client::Backend
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::{SourceId, TypedValue};

// ---------------------------------------------------------------------------
// Paths
// ---------------------------------------------------------------------------

/// `/api/projects/{slug}/references`
pub fn reference_sets_path(project_slug: &str) -> String {
    format!("/api/projects/{project_slug}/references")
}

/// `/api/projects/{slug}/references/{set}/tests[/{test_ref}]`
pub fn test_references_path(
    project_slug: &str,
    reference_set_id: &str,
    test_reference_id: Option<&str>,
) -> String {
    let base = format!("/api/projects/{project_slug}/references/{reference_set_id}/tests");
    match test_reference_id {
        Some(id) => format!("{base}/{id}"),
        None => base,
    }
}

/// `/{slug}/tests/{test_id}/history?measurement_name={name}`, with the
/// name percent-encoded.
pub fn measurement_history_path(project_slug: &str, test_id: &str, measurement: &str) -> String {
    format!(
        "/{project_slug}/tests/{test_id}/history?measurement_name={}",
        urlencoding::encode(measurement)
    )
}

// ---------------------------------------------------------------------------
// Form submissions
// ---------------------------------------------------------------------------

/// Outcome reported by the backend for a form submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormResult {
    Valid,
    Invalid,
    #[serde(other)]
    Unrecognized,
}

/// One validation message for a form field.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FieldError {
    pub message: String,
    #[serde(default)]
    pub code: Option<String>,
}

/// Validation errors keyed by field name.
pub type FieldErrors = BTreeMap<String, Vec<FieldError>>;

/// Response body of a form `POST`. The accepted payload sits under the
/// submission's scope name, so the rest of the body is kept as-is.
#[derive(Debug, Clone, Deserialize)]
pub struct FormResponse {
    pub result: FormResult,
    #[serde(default)]
    pub errors: FieldErrors,
    #[serde(flatten)]
    pub payload: BTreeMap<String, Value>,
}

// ---------------------------------------------------------------------------
// References
// ---------------------------------------------------------------------------

/// A stored reference for one measurement.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    #[serde(default)]
    pub value: Option<TypedValue>,
    #[serde(default)]
    pub source: Option<SourceId>,
}

/// References keyed by measurement name.
pub type References = BTreeMap<String, ReferenceEntry>;

/// `POST /api/projects/{slug}/references` body.
#[derive(Debug, Clone, Serialize)]
pub struct NewReferenceSet<'a> {
    pub property_values: &'a Value,
}

/// Response to creating a reference set.
#[derive(Debug, Clone, Deserialize)]
pub struct ReferenceSetCreated {
    pub id: SourceId,
}

/// New reference value for one measurement.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReferenceValue {
    pub value: Option<TypedValue>,
}

/// Body of a test reference `POST`/`PATCH`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestReferenceUpdate {
    pub test_name: String,
    pub default_source: SourceId,
    pub references: BTreeMap<String, ReferenceValue>,
}

/// Response to a test reference `POST`/`PATCH`.
#[derive(Debug, Clone, Deserialize)]
pub struct TestReferenceSaved {
    #[serde(default)]
    pub id: Option<SourceId>,
    #[serde(default)]
    pub references: References,
}
