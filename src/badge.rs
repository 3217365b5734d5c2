/// Status badges for test results.
///
/// Each of the six result statuses maps to a bootstrap border/text colour
/// and a bootstrap-icons glyph. Labels that are not a known status are shown
/// as-is with the `unknown` styling.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::html::Node;

/// Result status as reported by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Successful,
    Unstable,
    Failed,
    Broken,
    Unknown,
    Skip,
}

/// CSS classes for one badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BadgeStyle {
    pub badge_class: &'static str,
    pub icon_class: &'static str,
}

impl Status {
    pub const ALL: [Status; 6] = [
        Self::Successful,
        Self::Unstable,
        Self::Failed,
        Self::Broken,
        Self::Unknown,
        Self::Skip,
    ];

    /// Parse a status label. Anything unrecognized is `Unknown`.
    pub fn from_label(label: &str) -> Self {
        match label {
            "successful" => Self::Successful,
            "unstable" => Self::Unstable,
            "failed" => Self::Failed,
            "broken" => Self::Broken,
            "skip" => Self::Skip,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Successful => "successful",
            Self::Unstable => "unstable",
            Self::Failed => "failed",
            Self::Broken => "broken",
            Self::Unknown => "unknown",
            Self::Skip => "skip",
        }
    }

    pub fn style(self) -> BadgeStyle {
        let (badge_class, icon_class) = match self {
            Self::Successful => ("text-success border-success", "bi-check-circle-fill"),
            Self::Unstable => ("text-warning border-warning", "bi-exclamation-circle-fill"),
            Self::Failed => ("text-danger border-danger", "bi-x-circle-fill"),
            Self::Broken => ("text-danger border-danger", "bi-dash-circle-fill"),
            Self::Unknown => ("text-secondary border-secondary", "bi-question-circle-fill"),
            Self::Skip => ("text-info border-info", "bi-slash-circle-fill"),
        };
        BadgeStyle {
            badge_class,
            icon_class,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Render a badge for a raw status label, keeping the label text as given.
pub fn render_status_badge(label: &str) -> Node {
    let style = Status::from_label(label).style();
    Node::element("span")
        .class(format!("badge border {}", style.badge_class))
        .child(Node::element("i").class(format!("bi {}", style.icon_class)))
        .with_text(format!(" {label}"))
}
