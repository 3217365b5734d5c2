//! Render tree for dashboard markup.
//!
//! Every renderer in the crate produces a [`Node`] tree instead of writing
//! strings directly. The tree serializes to HTML with [`Node::to_html`] and
//! can be inspected (by id, by text) without re-parsing, which is what the
//! controllers use to locate cells and what the tests assert against.

/// Elements that never carry children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "meta"];

/// Attributes emitted without a value (`<button hidden>`).
const BOOLEAN_ATTRIBUTES: &[&str] = &["checked", "disabled", "hidden"];

/// A node in the render tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// A sequence of sibling nodes without a wrapping element.
    Fragment(Vec<Node>),
}

/// An HTML element with ordered attributes.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attrs: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// Look up an attribute value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Whether the `class` attribute contains `class`.
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|part| part == class))
    }
}

impl Node {
    /// Start a new element.
    pub fn element(tag: &str) -> Self {
        Self::Element(Element {
            tag: tag.to_string(),
            attrs: Vec::new(),
            children: Vec::new(),
        })
    }

    pub fn text(content: impl Into<String>) -> Self {
        Self::Text(content.into())
    }

    pub fn fragment(nodes: Vec<Node>) -> Self {
        Self::Fragment(nodes)
    }

    /// Set an attribute, replacing any previous value.
    ///
    /// Has no effect on text and fragment nodes.
    pub fn attr(mut self, name: &str, value: impl Into<String>) -> Self {
        if let Self::Element(el) = &mut self {
            let value = value.into();
            match el.attrs.iter_mut().find(|(k, _)| k == name) {
                Some(slot) => slot.1 = value,
                None => el.attrs.push((name.to_string(), value)),
            }
        }
        self
    }

    /// Set a boolean attribute when `on` is true.
    pub fn flag(self, name: &str, on: bool) -> Self {
        if on { self.attr(name, "") } else { self }
    }

    pub fn class(self, class: impl Into<String>) -> Self {
        self.attr("class", class)
    }

    pub fn id(self, id: impl Into<String>) -> Self {
        self.attr("id", id)
    }

    /// Append a child node.
    pub fn child(mut self, node: Node) -> Self {
        match &mut self {
            Self::Element(el) => el.children.push(node),
            Self::Fragment(nodes) => nodes.push(node),
            Self::Text(_) => {}
        }
        self
    }

    pub fn children(self, nodes: impl IntoIterator<Item = Node>) -> Self {
        nodes.into_iter().fold(self, Node::child)
    }

    /// Append a text child.
    pub fn with_text(self, content: impl Into<String>) -> Self {
        self.child(Node::text(content))
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// Concatenated text of this node and all descendants.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(t),
            Self::Element(el) => el.children.iter().for_each(|c| c.collect_text(out)),
            Self::Fragment(nodes) => nodes.iter().for_each(|c| c.collect_text(out)),
        }
    }

    /// First element (depth-first) whose `id` attribute equals `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Element> {
        self.find_all_by_id(id).into_iter().next()
    }

    /// Every element whose `id` attribute equals `id`, in document order.
    pub fn find_all_by_id(&self, id: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.walk(&mut |el| {
            if el.attr("id") == Some(id) {
                found.push(el);
            }
        });
        found
    }

    /// Every element with the given tag name, in document order.
    pub fn find_all_by_tag(&self, tag: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.walk(&mut |el| {
            if el.tag == tag {
                found.push(el);
            }
        });
        found
    }

    fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Element)) {
        match self {
            Self::Text(_) => {}
            Self::Element(el) => {
                visit(el);
                el.children.iter().for_each(|c| c.walk(visit));
            }
            Self::Fragment(nodes) => nodes.iter().for_each(|c| c.walk(visit)),
        }
    }

    /// Serialize to HTML.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Text(t) => out.push_str(&escape(t)),
            Self::Fragment(nodes) => nodes.iter().for_each(|n| n.write_html(out)),
            Self::Element(el) => {
                out.push('<');
                out.push_str(&el.tag);
                for (name, value) in &el.attrs {
                    out.push(' ');
                    out.push_str(name);
                    if !(BOOLEAN_ATTRIBUTES.contains(&name.as_str()) && value.is_empty()) {
                        out.push_str("=\"");
                        out.push_str(&escape(value));
                        out.push('"');
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&el.tag.as_str()) {
                    return;
                }
                el.children.iter().for_each(|c| c.write_html(out));
                out.push_str("</");
                out.push_str(&el.tag);
                out.push('>');
            }
        }
    }
}

/// Escape text for use in element content and quoted attribute values.
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for ch in raw.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
