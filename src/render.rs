//! Rendering of typed result values.
//!
//! Scalars render as their literal text, durations through
//! [`Duration::format`](crate::duration::Duration::format), images as
//! embedded PNGs, and ndarrays as one table per slice of the third axis.
//! Rendering never fails: anything that cannot be interpreted is shown as
//! its raw data.
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde_json::{Number, Value};

use crate::duration::Duration;
use crate::html::Node;
use crate::value::{NdArray, SourceId, TypedValue};

/// Text shown for a missing value.
pub const MISSING_VALUE: &str = "N/A";

/// Highest tensor order laid out as nested tables.
const MAX_TABLE_ORDER: usize = 3;

/// Render a value, linking it to the submission it came from when `source`
/// is known.
pub fn render_result_value(
    project_slug: &str,
    value: Option<&TypedValue>,
    source: Option<&SourceId>,
) -> Node {
    let rendered = render_value(value);
    match source {
        Some(source) => Node::element("a")
            .attr("href", format!("/{project_slug}/tests/{source}"))
            .child(rendered),
        None => rendered,
    }
}

/// Render a value without a source link.
pub fn render_value(value: Option<&TypedValue>) -> Node {
    let Some(value) = value else {
        return Node::text(MISSING_VALUE);
    };

    match value {
        TypedValue::String(s) => Node::text(s.as_str()),
        TypedValue::Integer(n) => Node::text(n.to_string()),
        TypedValue::Float(n) => Node::text(float_text(n)),
        TypedValue::Duration(text) => match Duration::parse(text) {
            Ok(d) => Node::text(d.format()),
            Err(_) => Node::text(text.as_str()),
        },
        // TODO: lay out legacy list values one item per line like the
        // flat ndarray fallback; they are shown raw until then.
        TypedValue::List(data) => Node::text(raw_text(data)),
        TypedValue::Ndarray(arr) => render_ndarray(arr),
        TypedValue::Image(data) => render_image(data),
        TypedValue::Other { data, .. } => Node::text(raw_text(data)),
    }
}

/// Lay out an ndarray as up to `shape[2]` tables of `shape[0] x shape[1]`.
///
/// Arrays of order above three, arrays without entries, and arrays whose
/// entry count disagrees with the volume of their shape (an overflowing
/// volume included) are shown as a single column under a
/// `Tensor-<order> [<shape>]:` label.
fn render_ndarray(arr: &NdArray) -> Node {
    let entries: Vec<Node> = arr.entries.iter().map(|e| render_value(Some(e))).collect();
    let order = arr.order();

    let mut out = Vec::new();
    let flat = !arr.is_consistent() || arr.entries.is_empty() || order > MAX_TABLE_ORDER;
    let (size0, size1, size2) = if flat {
        let shape = arr
            .shape
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(",");
        out.push(Node::text(format!("Tensor-{order} [{shape}]:")));
        (entries.len(), 1, 1)
    } else {
        let dim = |axis: usize| arr.shape.get(axis).copied().unwrap_or(1);
        (dim(0), dim(1), dim(2))
    };

    for k in 0..size2 {
        let rows = (0..size0).map(|i| {
            let cells = (0..size1).map(|j| {
                let index = size0
                    .checked_mul(size1)
                    .and_then(|plane| plane.checked_mul(k))
                    .zip(i.checked_mul(size1).and_then(|row| row.checked_add(j)))
                    .and_then(|(offset, within)| offset.checked_add(within));
                let cell = Node::element("td");
                match index.and_then(|ix| entries.get(ix)) {
                    Some(entry) => cell.child(entry.clone()),
                    None => cell,
                }
            });
            Node::element("tr").children(cells)
        });
        out.push(Node::element("table").class("ndarray-value").children(rows));
    }

    Node::fragment(out)
}

fn render_image(data: &str) -> Node {
    if STANDARD.decode(data.trim()).is_err() {
        return Node::text(data);
    }
    Node::element("img").attr("src", format!("data:image/png;base64, {data}"))
}

/// Text of a float value. Integral floats drop the `.0` suffix, as the
/// dashboard has always shown them (`2.0` is `2`).
fn float_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f == 0.0 => "0".to_string(),
        Some(f) if n.is_f64() && f.fract() == 0.0 && f.abs() < 1e21 => format!("{f:.0}"),
        _ => n.to_string(),
    }
}

/// Text form of raw JSON data: strings unquoted, everything else as JSON.
fn raw_text(data: &Value) -> String {
    match data {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
