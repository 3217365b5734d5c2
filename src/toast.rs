//! Transient toast notifications.
//!
//! Toast ids are drawn from a single process-wide counter so two notifiers
//! never hand out the same `toast-<n>` id.
//!
//! The notifier is also the single error channel of the controllers: a
//! failed request becomes a danger toast plus, when a diagnostics log is
//! attached, a JSONL entry with the full error.
use std::collections::VecDeque;
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::diagnostics::{self, DiagnosticEvent};
use crate::error::ClientError;
use crate::html::Node;

static NEXT_TOAST_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a queued toast, rendered as `toast-<n>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ToastId(u64);

impl ToastId {
    fn next() -> Self {
        Self(NEXT_TOAST_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ToastId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "toast-{}", self.0)
    }
}

/// Toast colour, mapped to a bootstrap background class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Danger,
    Warning,
    Info,
}

impl ToastKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Danger => "danger",
            Self::Warning => "warning",
            Self::Info => "info",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: ToastId,
    pub kind: ToastKind,
    pub content: String,
}

/// Queue of toasts shown in a page's toast container.
#[derive(Debug, Default)]
pub struct ToastNotifier {
    toasts: VecDeque<Toast>,
    detached: bool,
    diagnostics: Option<PathBuf>,
}

impl ToastNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// A notifier without a container. Every push is dropped.
    pub fn detached() -> Self {
        Self {
            detached: true,
            ..Self::default()
        }
    }

    /// Append failure diagnostics to the JSONL file at `path`.
    pub fn with_diagnostics(mut self, path: PathBuf) -> Self {
        self.diagnostics = Some(path);
        self
    }

    /// Queue a toast. Returns `None` when the notifier has no container.
    pub fn push(&mut self, kind: ToastKind, content: impl Into<String>) -> Option<ToastId> {
        if self.detached {
            return None;
        }
        let id = ToastId::next();
        self.toasts.push_back(Toast {
            id,
            kind,
            content: content.into(),
        });
        Some(id)
    }

    pub fn success(&mut self, content: impl Into<String>) -> Option<ToastId> {
        self.push(ToastKind::Success, content)
    }

    pub fn danger(&mut self, content: impl Into<String>) -> Option<ToastId> {
        self.push(ToastKind::Danger, content)
    }

    /// Surface a failed operation: a danger toast with `message`, and the
    /// error itself in the diagnostics log. Logging is best-effort.
    pub fn report_failure(
        &mut self,
        operation: &str,
        message: impl Into<String>,
        error: &ClientError,
    ) -> Option<ToastId> {
        if let Some(path) = &self.diagnostics {
            let _ = diagnostics::append_event(path, &DiagnosticEvent::from_error(operation, error));
        }
        self.danger(message)
    }

    /// Remove a toast once it has been hidden. Returns whether it was queued.
    pub fn dismiss(&mut self, id: ToastId) -> bool {
        let before = self.toasts.len();
        self.toasts.retain(|t| t.id != id);
        self.toasts.len() != before
    }

    pub fn clear(&mut self) {
        self.toasts.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &Toast> {
        self.toasts.iter()
    }

    pub fn len(&self) -> usize {
        self.toasts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.toasts.is_empty()
    }

    /// Render the toast container with every queued toast.
    pub fn render(&self) -> Node {
        Node::element("div")
            .class("toast-container")
            .children(self.toasts.iter().map(render_toast))
    }
}

fn render_toast(toast: &Toast) -> Node {
    Node::element("div")
        .id(toast.id.to_string())
        .class(format!(
            "toast align-items-center text-white bg-{} border-0",
            toast.kind.as_str()
        ))
        .attr("role", "alert")
        .attr("aria-live", "assertive")
        .attr("aria-atomic", "true")
        .child(
            Node::element("div")
                .class("d-flex")
                .child(
                    Node::element("div")
                        .class("toast-body")
                        .with_text(toast.content.as_str()),
                )
                .child(
                    Node::element("button")
                        .attr("type", "button")
                        .class("btn-close btn-close-white me-2 m-auto")
                        .attr("data-bs-dismiss", "toast")
                        .attr("aria-label", "Close"),
                ),
        )
}
