//! Results table for one test submission.
//!
//! Each row shows a measurement's status badge, its name with a link to the
//! measurement history, the submitted value, the reference recorded at
//! submission time and the current global reference. Users with update
//! rights can select rows and promote their values to the global reference
//! set in one request.
use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::api::{
    self, ReferenceEntry, ReferenceSetCreated, ReferenceValue, References, TestReferenceSaved,
    TestReferenceUpdate,
};
use crate::badge::{Status, render_status_badge};
use crate::client::{ApiRequest, Backend, Method};
use crate::error::{ClientError, Result};
use crate::html::Node;
use crate::render::render_result_value;
use crate::toast::ToastNotifier;
use crate::value::{SourceId, TypedValue};

/// Id of the per-row selection checkbox.
pub const ROW_CHECKBOX_ID: &str = "updateReferenceCheckbox";

/// Id of the master selection checkbox in the header.
pub const TOGGLE_ALL_CHECKBOX_ID: &str = "toggleAllReferencesCheckbox";

/// A measurement of a submitted test, as sent by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    pub name: String,
    /// Status label as sent; unrecognized labels render with the unknown badge.
    pub status: String,
    #[serde(default)]
    pub value: Option<TypedValue>,
    #[serde(default)]
    pub reference: Option<TypedValue>,
    #[serde(default)]
    pub reference_source: Option<SourceId>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortColumn {
    Name,
    Status,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Ascending,
    Descending,
}

/// One table row. Cells are rendered once at build time; only the global
/// reference cell is ever re-rendered.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    /// Index of the row's result in the table's result list.
    pub result_index: usize,
    pub visible: bool,
    pub selected: bool,
    status: Node,
    name: Node,
    value: Node,
    submission_reference: Node,
    global_reference: Node,
}

impl ResultRow {
    pub fn global_reference(&self) -> &Node {
        &self.global_reference
    }

    pub fn value(&self) -> &Node {
        &self.value
    }
}

/// Parameters of a bulk reference update.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceUpdateRequest {
    pub test_name: String,
    /// Submission the new references are attributed to by default.
    pub default_source: SourceId,
    /// Reference set to write to; created first when `None`.
    pub reference_set_id: Option<String>,
    /// Existing test reference to patch; a new one is posted when `None`.
    pub test_reference_id: Option<String>,
    /// Properties of a newly created reference set.
    pub property_values: Value,
}

/// Where a successful update was written.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceUpdateOutcome {
    pub reference_set_id: String,
    pub test_reference_id: Option<String>,
    /// Number of rows that were selected when the update was sent.
    pub updated: usize,
}

/// View-model and controller of the results table.
#[derive(Debug, Clone)]
pub struct ResultsTable {
    project_slug: String,
    test_id: String,
    results: Vec<TestResult>,
    can_update: bool,
    select_all: bool,
    rows: Vec<ResultRow>,
}

impl ResultsTable {
    /// Build one row per result, joining `references` by result name.
    pub fn build(
        project_slug: &str,
        test_id: &str,
        results: Vec<TestResult>,
        references: &References,
        can_update: bool,
    ) -> Self {
        let empty = ReferenceEntry::default();
        let rows = results
            .iter()
            .enumerate()
            .map(|(index, result)| {
                let reference = references.get(&result.name).unwrap_or(&empty);
                ResultRow {
                    result_index: index,
                    visible: true,
                    selected: false,
                    status: render_status_badge(&result.status),
                    name: render_name_cell(project_slug, test_id, &result.name),
                    value: render_result_value(project_slug, result.value.as_ref(), None),
                    submission_reference: render_result_value(
                        project_slug,
                        result.reference.as_ref(),
                        result.reference_source.as_ref(),
                    ),
                    global_reference: render_result_value(
                        project_slug,
                        reference.value.as_ref(),
                        reference.source.as_ref(),
                    ),
                }
            })
            .collect();

        Self {
            project_slug: project_slug.to_string(),
            test_id: test_id.to_string(),
            results,
            can_update,
            select_all: false,
            rows,
        }
    }

    pub fn rows(&self) -> &[ResultRow] {
        &self.rows
    }

    pub fn results(&self) -> &[TestResult] {
        &self.results
    }

    pub fn can_update(&self) -> bool {
        self.can_update
    }

    pub fn all_selected(&self) -> bool {
        self.select_all
    }

    /// Re-render the global reference cell of every row.
    pub fn refresh_references(&mut self, references: &References) {
        let empty = ReferenceEntry::default();
        for row in &mut self.rows {
            let Some(result) = self.results.get(row.result_index) else {
                continue;
            };
            let reference = references.get(&result.name).unwrap_or(&empty);
            row.global_reference = render_result_value(
                &self.project_slug,
                reference.value.as_ref(),
                reference.source.as_ref(),
            );
        }
    }

    /// Show or hide every row whose status label is `status`.
    pub fn filter_status(&mut self, status: &str, shown: bool) {
        for row in &mut self.rows {
            if self.results[row.result_index].status == status {
                row.visible = shown;
            }
        }
    }

    /// Stable sort of the rows.
    pub fn sort_by(&mut self, column: SortColumn, order: SortOrder) {
        let results = &self.results;
        self.rows.sort_by(|a, b| {
            let (ra, rb) = (&results[a.result_index], &results[b.result_index]);
            let ord = match column {
                SortColumn::Name => ra.name.cmp(&rb.name),
                SortColumn::Status => compare_status(&ra.status, &rb.status),
            };
            match order {
                SortOrder::Ascending => ord,
                SortOrder::Descending => ord.reverse(),
            }
        });
    }

    /// Select or deselect one row. Returns `false` if the table is read-only
    /// or no row has that result index.
    pub fn set_selected(&mut self, result_index: usize, selected: bool) -> bool {
        if !self.can_update {
            return false;
        }
        match self.rows.iter_mut().find(|r| r.result_index == result_index) {
            Some(row) => {
                row.selected = selected;
                true
            }
            None => false,
        }
    }

    /// Set the master checkbox and apply it to every visible row.
    pub fn toggle_all(&mut self, checked: bool) {
        self.select_all = checked;
        if !self.can_update {
            return;
        }
        for row in self.rows.iter_mut().filter(|r| r.visible) {
            row.selected = checked;
        }
    }

    /// Clear the master checkbox and every row, hidden ones included.
    pub fn uncheck_all(&mut self) {
        self.select_all = false;
        for row in &mut self.rows {
            row.selected = false;
        }
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|r| r.selected).count()
    }

    /// Body of a reference update for the selected rows.
    pub fn collect_update(&self, test_name: &str, default_source: &SourceId) -> TestReferenceUpdate {
        let references: BTreeMap<String, ReferenceValue> = self
            .rows
            .iter()
            .filter(|r| r.selected)
            .map(|r| {
                let result = &self.results[r.result_index];
                (
                    result.name.clone(),
                    ReferenceValue {
                        value: result.value.clone(),
                    },
                )
            })
            .collect();

        TestReferenceUpdate {
            test_name: test_name.to_string(),
            default_source: default_source.clone(),
            references,
        }
    }

    /// Promote the selected values to the global references.
    ///
    /// Creates the reference set first when none is known. On success the
    /// global reference cells are refreshed from the response and the
    /// selection is cleared; either way the outcome is announced with a
    /// toast.
    pub fn submit_reference_update(
        &mut self,
        backend: &impl Backend,
        notifier: &mut ToastNotifier,
        request: &ReferenceUpdateRequest,
    ) -> Result<ReferenceUpdateOutcome> {
        let (reference_set_id, test_reference_id) = match &request.reference_set_id {
            Some(id) => (id.clone(), request.test_reference_id.clone()),
            None => match self.create_reference_set(backend, &request.property_values) {
                Ok(id) => (id, None),
                Err(err) => {
                    notifier.report_failure(
                        "create_reference_set",
                        "Failed to create reference set.",
                        &err,
                    );
                    return Err(err);
                }
            },
        };

        let update = self.collect_update(&request.test_name, &request.default_source);
        let updated = update.references.len();

        let path = api::test_references_path(
            &self.project_slug,
            &reference_set_id,
            test_reference_id.as_deref(),
        );
        let method = if test_reference_id.is_some() {
            Method::Patch
        } else {
            Method::Post
        };

        let saved = serde_json::to_value(&update)
            .map_err(|e| ClientError::Decode {
                url: path.clone(),
                message: e.to_string(),
            })
            .and_then(|body| backend.send(&ApiRequest::json(method, path.as_str(), body)))
            .and_then(|body| {
                serde_json::from_value::<TestReferenceSaved>(body).map_err(|e| {
                    ClientError::Decode {
                        url: path.clone(),
                        message: e.to_string(),
                    }
                })
            });

        match saved {
            Ok(saved) => {
                notifier.success(format!("Successfully updated {updated} references."));
                self.refresh_references(&saved.references);
                self.uncheck_all();
                Ok(ReferenceUpdateOutcome {
                    reference_set_id,
                    test_reference_id: test_reference_id.or(saved.id.map(|id| id.to_string())),
                    updated,
                })
            }
            Err(err) => {
                notifier.report_failure(
                    "update_references",
                    format!("Failed to update {updated} references."),
                    &err,
                );
                Err(err)
            }
        }
    }

    fn create_reference_set(&self, backend: &impl Backend, property_values: &Value) -> Result<String> {
        let path = api::reference_sets_path(&self.project_slug);
        let body = serde_json::to_value(api::NewReferenceSet { property_values }).map_err(|e| {
            ClientError::Decode {
                url: path.clone(),
                message: e.to_string(),
            }
        })?;
        let created = backend.send(&ApiRequest::json(Method::Post, path.as_str(), body))?;
        let created: ReferenceSetCreated =
            serde_json::from_value(created).map_err(|_| ClientError::MissingField {
                url: path.clone(),
                field: "id".to_string(),
            })?;
        Ok(created.id.to_string())
    }

    /// Render the table.
    pub fn render(&self) -> Node {
        let mut header = Node::element("tr")
            .child(Node::element("th").with_text("Status"))
            .child(Node::element("th").with_text("Name"))
            .child(Node::element("th").with_text("Value"))
            .child(Node::element("th").with_text("Reference (submission)"))
            .child(Node::element("th").with_text("Reference (global)"));
        if self.can_update {
            header = header.child(
                Node::element("th").child(
                    Node::element("input")
                        .id(TOGGLE_ALL_CHECKBOX_ID)
                        .class("form-check-input ms-2 me-2")
                        .attr("type", "checkbox")
                        .attr("autocomplete", "off")
                        .flag("checked", self.select_all),
                ),
            );
        }

        Node::element("table")
            .id("resultsTable")
            .class("table tablesorter")
            .child(Node::element("thead").child(header))
            .child(Node::element("tbody").children(self.rows.iter().map(|r| self.render_row(r))))
    }

    fn render_row(&self, row: &ResultRow) -> Node {
        let mut tr = Node::element("tr")
            .class("filtered-row")
            .attr("test-result-index", row.result_index.to_string());
        if !row.visible {
            tr = tr.attr("style", "display: none");
        }

        tr = tr
            .child(Node::element("td").class("filter-status").child(row.status.clone()))
            .child(Node::element("td").child(row.name.clone()))
            .child(Node::element("td").id("tableDataValue").child(row.value.clone()))
            .child(
                Node::element("td")
                    .id("tableDataReferenceOnSubmission")
                    .child(row.submission_reference.clone()),
            )
            .child(
                Node::element("td")
                    .id("tableDataGlobalReference")
                    .child(row.global_reference.clone()),
            );

        if self.can_update {
            tr = tr.child(
                Node::element("td").child(
                    Node::element("input")
                        .id(ROW_CHECKBOX_ID)
                        .class("form-check-input ms-2 me-2")
                        .attr("type", "checkbox")
                        .attr("autocomplete", "off")
                        .flag("checked", row.selected),
                ),
            );
        }
        tr
    }
}

/// Order by status, then by raw label so that unrecognized labels still sort
/// deterministically.
fn compare_status(a: &str, b: &str) -> Ordering {
    Status::from_label(a)
        .cmp(&Status::from_label(b))
        .then_with(|| a.cmp(b))
}

fn render_name_cell(project_slug: &str, test_id: &str, name: &str) -> Node {
    Node::element("div")
        .class("d-flex")
        .child(Node::element("span").with_text(name))
        .child(
            Node::element("div").class("ms-auto").child(
                Node::element("a")
                    .class("btn btn-outline-dark dtf-btn-xs me-1")
                    .attr(
                        "href",
                        api::measurement_history_path(project_slug, test_id, name),
                    )
                    .child(Node::element("i").class("bi bi-graph-up")),
            ),
        )
}
