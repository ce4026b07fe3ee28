//! Rendering surface the page controllers draw on.
//!
//! Controllers never touch a browser directly; they are handed something that
//! implements [`Surface`]. [`Document`] is the in-memory implementation used by
//! the host process (which renders it to HTML) and by the tests.

use std::collections::{BTreeMap, HashMap};

pub type NodeId = usize;

/// Blueprint for a node about to be inserted into a surface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Element {
    pub tag: String,
    pub id: Option<String>,
    pub classes: Vec<String>,
    pub data: BTreeMap<String, String>,
    pub attrs: BTreeMap<String, String>,
    pub markup: String,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Accepts a whitespace separated class list, like a `class` attribute.
    pub fn with_class(mut self, classes: &str) -> Self {
        self.classes
            .extend(classes.split_whitespace().map(str::to_string));
        self
    }

    /// `key` is the attribute suffix, so `"test-id"` renders as `data-test-id`.
    pub fn with_data(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_markup(mut self, markup: impl Into<String>) -> Self {
        self.markup = markup.into();
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.markup = escape_html(text);
        self
    }
}

/// DOM-shaped operations the controllers depend on.
///
/// Every mutation on a node that is no longer attached is a silent no-op, which
/// mirrors what happens when a script holds on to an element that has since
/// been removed from the page.
pub trait Surface {
    fn body(&self) -> NodeId;
    fn element_by_id(&self, id: &str) -> Option<NodeId>;
    /// Attached nodes carrying `class`, in document order.
    fn query_class(&self, class: &str) -> Vec<NodeId>;
    fn contains(&self, node: NodeId) -> bool;

    fn data(&self, node: NodeId, key: &str) -> Option<String>;
    fn set_data(&mut self, node: NodeId, key: &str, value: &str);
    fn remove_data(&mut self, node: NodeId, key: &str);

    fn has_class(&self, node: NodeId, class: &str) -> bool;
    fn add_class(&mut self, node: NodeId, class: &str);
    fn remove_class(&mut self, node: NodeId, class: &str);

    fn inner_html(&self, node: NodeId) -> Option<String>;
    /// Replaces the node's content, dropping all of its children.
    fn set_inner_html(&mut self, node: NodeId, markup: &str);
    fn text(&self, node: NodeId) -> Option<String>;
    fn set_text(&mut self, node: NodeId, text: &str);

    fn append_child(&mut self, parent: NodeId, element: Element) -> Option<NodeId>;
    fn prepend_child(&mut self, parent: NodeId, element: Element) -> Option<NodeId>;
    fn remove(&mut self, node: NodeId);

    /// Value of the first form input named `name`.
    fn input_value(&self, name: &str) -> Option<String>;
    fn cookie(&self) -> String;

    fn first_by_class(&self, class: &str) -> Option<NodeId> {
        self.query_class(class).into_iter().next()
    }
}

#[derive(Debug, Clone)]
struct Node {
    element: Element,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

/// Arena-backed document tree.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: HashMap<NodeId, Node>,
    next_id: NodeId,
    body: NodeId,
    cookie: String,
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Document {
    pub fn new() -> Self {
        let mut nodes = HashMap::new();
        nodes.insert(
            0,
            Node {
                element: Element::new("body"),
                parent: None,
                children: Vec::new(),
            },
        );
        Self {
            nodes,
            next_id: 1,
            body: 0,
            cookie: String::new(),
        }
    }

    pub fn set_cookie(&mut self, cookie: impl Into<String>) {
        self.cookie = cookie.into();
    }

    /// Outer HTML of `node`, or an empty string when it is gone.
    pub fn render(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.write_outer(node, &mut out);
        out
    }

    /// Inner HTML of the body.
    pub fn render_body(&self) -> String {
        self.inner_html(self.body).unwrap_or_default()
    }

    fn insert(&mut self, parent: NodeId, element: Element, front: bool) -> Option<NodeId> {
        if !self.nodes.contains_key(&parent) {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        self.nodes.insert(
            id,
            Node {
                element,
                parent: Some(parent),
                children: Vec::new(),
            },
        );
        let siblings = &mut self.nodes.get_mut(&parent)?.children;
        if front {
            siblings.insert(0, id);
        } else {
            siblings.push(id);
        }
        Some(id)
    }

    fn drop_subtree(&mut self, node: NodeId) {
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if let Some(removed) = self.nodes.remove(&current) {
                stack.extend(removed.children);
            }
        }
    }

    fn descendants(&self) -> Vec<NodeId> {
        let mut order = Vec::new();
        let mut stack = vec![self.body];
        while let Some(current) = stack.pop() {
            order.push(current);
            if let Some(node) = self.nodes.get(&current) {
                stack.extend(node.children.iter().rev());
            }
        }
        order
    }

    fn write_outer(&self, node: NodeId, out: &mut String) {
        let Some(entry) = self.nodes.get(&node) else {
            return;
        };
        let element = &entry.element;
        out.push('<');
        out.push_str(&element.tag);
        if let Some(id) = &element.id {
            push_attr(out, "id", id);
        }
        if !element.classes.is_empty() {
            push_attr(out, "class", &element.classes.join(" "));
        }
        for (key, value) in &element.data {
            push_attr(out, &format!("data-{key}"), value);
        }
        for (name, value) in &element.attrs {
            push_attr(out, name, value);
        }
        if is_void(&element.tag) {
            out.push_str(" />");
            return;
        }
        out.push('>');
        self.write_inner(node, out);
        out.push_str("</");
        out.push_str(&element.tag);
        out.push('>');
    }

    fn write_inner(&self, node: NodeId, out: &mut String) {
        let Some(entry) = self.nodes.get(&node) else {
            return;
        };
        out.push_str(&entry.element.markup);
        for child in &entry.children {
            self.write_outer(*child, out);
        }
    }

    fn element_mut(&mut self, node: NodeId) -> Option<&mut Element> {
        self.nodes.get_mut(&node).map(|entry| &mut entry.element)
    }
}

impl Surface for Document {
    fn body(&self) -> NodeId {
        self.body
    }

    fn element_by_id(&self, id: &str) -> Option<NodeId> {
        self.descendants().into_iter().find(|node| {
            self.nodes
                .get(node)
                .and_then(|entry| entry.element.id.as_deref())
                == Some(id)
        })
    }

    fn query_class(&self, class: &str) -> Vec<NodeId> {
        self.descendants()
            .into_iter()
            .filter(|node| self.has_class(*node, class))
            .collect()
    }

    fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains_key(&node)
    }

    fn data(&self, node: NodeId, key: &str) -> Option<String> {
        self.nodes.get(&node)?.element.data.get(key).cloned()
    }

    fn set_data(&mut self, node: NodeId, key: &str, value: &str) {
        if let Some(element) = self.element_mut(node) {
            element.data.insert(key.to_string(), value.to_string());
        }
    }

    fn remove_data(&mut self, node: NodeId, key: &str) {
        if let Some(element) = self.element_mut(node) {
            element.data.remove(key);
        }
    }

    fn has_class(&self, node: NodeId, class: &str) -> bool {
        self.nodes
            .get(&node)
            .is_some_and(|entry| entry.element.classes.iter().any(|c| c == class))
    }

    fn add_class(&mut self, node: NodeId, class: &str) {
        if self.has_class(node, class) {
            return;
        }
        if let Some(element) = self.element_mut(node) {
            element.classes.push(class.to_string());
        }
    }

    fn remove_class(&mut self, node: NodeId, class: &str) {
        if let Some(element) = self.element_mut(node) {
            element.classes.retain(|c| c != class);
        }
    }

    fn inner_html(&self, node: NodeId) -> Option<String> {
        if !self.contains(node) {
            return None;
        }
        let mut out = String::new();
        self.write_inner(node, &mut out);
        Some(out)
    }

    fn set_inner_html(&mut self, node: NodeId, markup: &str) {
        let Some(entry) = self.nodes.get_mut(&node) else {
            return;
        };
        entry.element.markup = markup.to_string();
        let children = std::mem::take(&mut entry.children);
        for child in children {
            self.drop_subtree(child);
        }
    }

    fn text(&self, node: NodeId) -> Option<String> {
        let entry = self.nodes.get(&node)?;
        if is_raw_text(&entry.element.tag) {
            return Some(entry.element.markup.clone());
        }
        self.inner_html(node)
            .map(|markup| unescape_html(&strip_tags(&markup)))
    }

    fn set_text(&mut self, node: NodeId, text: &str) {
        let raw = self
            .nodes
            .get(&node)
            .is_some_and(|entry| is_raw_text(&entry.element.tag));
        if raw {
            self.set_inner_html(node, text);
        } else {
            self.set_inner_html(node, &escape_html(text));
        }
    }

    fn append_child(&mut self, parent: NodeId, element: Element) -> Option<NodeId> {
        self.insert(parent, element, false)
    }

    fn prepend_child(&mut self, parent: NodeId, element: Element) -> Option<NodeId> {
        self.insert(parent, element, true)
    }

    fn remove(&mut self, node: NodeId) {
        if node == self.body {
            return;
        }
        let parent = self.nodes.get(&node).and_then(|entry| entry.parent);
        if let Some(parent) = parent.and_then(|id| self.nodes.get_mut(&id)) {
            parent.children.retain(|child| *child != node);
        }
        self.drop_subtree(node);
    }

    fn input_value(&self, name: &str) -> Option<String> {
        self.descendants().into_iter().find_map(|node| {
            let element = &self.nodes.get(&node)?.element;
            if element.attrs.get("name").map(String::as_str) == Some(name) {
                element.attrs.get("value").cloned()
            } else {
                None
            }
        })
    }

    fn cookie(&self) -> String {
        self.cookie.clone()
    }
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

fn unescape_html(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&")
}

fn strip_tags(markup: &str) -> String {
    let mut out = String::with_capacity(markup.len());
    let mut in_tag = false;
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' if in_tag => in_tag = false,
            other if !in_tag => out.push(other),
            _ => {}
        }
    }
    out
}

fn push_attr(out: &mut String, name: &str, value: &str) {
    out.push(' ');
    out.push_str(name);
    out.push_str("=\"");
    out.push_str(&escape_html(value));
    out.push('"');
}

fn is_void(tag: &str) -> bool {
    matches!(tag, "input" | "br" | "hr" | "img" | "meta")
}

fn is_raw_text(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}
