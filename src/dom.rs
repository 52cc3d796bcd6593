use std::collections::HashMap;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

/// File handed to a file input by the test driver. Only the fields the
/// recorder reports are modeled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockFile {
    pub name: String,
    pub size: u64,
}

impl MockFile {
    pub fn new(name: &str, size: u64) -> Self {
        Self {
            name: name.to_string(),
            size,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) enum NodeType {
    Document,
    Element(Element),
    Text(String),
}

#[derive(Debug, Clone)]
pub(crate) struct Element {
    pub(crate) tag_name: String,
    pub(crate) attrs: HashMap<String, String>,
    pub(crate) value: String,
    pub(crate) checked: bool,
    pub(crate) selected: bool,
    pub(crate) files: Vec<MockFile>,
}

impl Element {
    pub(crate) fn new(tag_name: String, attrs: HashMap<String, String>) -> Self {
        let value = attrs.get("value").cloned().unwrap_or_default();
        let checked = attrs.contains_key("checked");
        let selected = attrs.contains_key("selected");
        Self {
            tag_name,
            attrs,
            value,
            checked,
            selected,
            files: Vec::new(),
        }
    }

    pub(crate) fn input_type(&self) -> Option<String> {
        if !self.tag_name.eq_ignore_ascii_case("input") {
            return None;
        }
        Some(
            self.attrs
                .get("type")
                .map(|kind| kind.to_ascii_lowercase())
                .unwrap_or_else(|| "text".to_string()),
        )
    }
}

#[derive(Debug, Clone)]
pub(crate) struct Node {
    pub(crate) children: Vec<NodeId>,
    pub(crate) node_type: NodeType,
}

/// Arena-backed document tree. Nodes are created once at parse time; the
/// recorder performs a single scan and never observes later insertions.
#[derive(Debug, Clone)]
pub struct Dom {
    nodes: Vec<Node>,
    root: NodeId,
    id_index: HashMap<String, NodeId>,
}

impl Dom {
    pub(crate) fn new() -> Self {
        let root = Node {
            children: Vec::new(),
            node_type: NodeType::Document,
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
            id_index: HashMap::new(),
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        self.root
    }

    pub(crate) fn create_element(
        &mut self,
        parent: NodeId,
        tag_name: String,
        attrs: HashMap<String, String>,
    ) -> NodeId {
        let element = Element::new(tag_name, attrs);
        let id_attr = element.attrs.get("id").cloned();
        let node_id = self.push_node(parent, NodeType::Element(element));
        if let Some(id) = id_attr {
            self.id_index.entry(id).or_insert(node_id);
        }
        node_id
    }

    pub(crate) fn create_text(&mut self, parent: NodeId, text: String) -> NodeId {
        self.push_node(parent, NodeType::Text(text))
    }

    fn push_node(&mut self, parent: NodeId, node_type: NodeType) -> NodeId {
        let node_id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            children: Vec::new(),
            node_type,
        });
        self.nodes[parent.0].children.push(node_id);
        node_id
    }

    pub(crate) fn element(&self, node_id: NodeId) -> Option<&Element> {
        match &self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn element_mut(&mut self, node_id: NodeId) -> Option<&mut Element> {
        match &mut self.nodes[node_id.0].node_type {
            NodeType::Element(element) => Some(element),
            _ => None,
        }
    }

    pub(crate) fn tag_name(&self, node_id: NodeId) -> Option<&str> {
        self.element(node_id).map(|element| element.tag_name.as_str())
    }

    pub(crate) fn attr(&self, node_id: NodeId, key: &str) -> Option<&str> {
        self.element(node_id)
            .and_then(|element| element.attrs.get(key))
            .map(String::as_str)
    }

    /// Element id, when present and non-empty.
    pub(crate) fn id(&self, node_id: NodeId) -> Option<&str> {
        self.attr(node_id, "id").filter(|id| !id.is_empty())
    }

    pub(crate) fn by_id(&self, id: &str) -> Option<NodeId> {
        self.id_index.get(id).copied()
    }

    pub(crate) fn value(&self, node_id: NodeId) -> String {
        self.element(node_id)
            .map(|element| element.value.clone())
            .unwrap_or_default()
    }

    pub(crate) fn checked(&self, node_id: NodeId) -> bool {
        self.element(node_id).is_some_and(|element| element.checked)
    }

    pub(crate) fn files(&self, node_id: NodeId) -> &[MockFile] {
        self.element(node_id)
            .map(|element| element.files.as_slice())
            .unwrap_or(&[])
    }

    /// All element nodes in document (pre-)order.
    pub(crate) fn document_order(&self) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack = vec![self.root];
        while let Some(node_id) = stack.pop() {
            if self.element(node_id).is_some() {
                out.push(node_id);
            }
            for child in self.nodes[node_id.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Element descendants of `node_id` in document order.
    pub(crate) fn descendant_elements(&self, node_id: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = self.nodes[node_id.0]
            .children
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(current) = stack.pop() {
            if self.element(current).is_some() {
                out.push(current);
            }
            for child in self.nodes[current.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out
    }

    /// Concatenated descendant text, trimmed. Used as the fallback value of
    /// an `<option>` without a `value` attribute.
    pub(crate) fn text_content(&self, node_id: NodeId) -> String {
        let mut out = String::new();
        let mut stack: Vec<NodeId> = self.nodes[node_id.0]
            .children
            .iter()
            .rev()
            .copied()
            .collect();
        while let Some(current) = stack.pop() {
            if let NodeType::Text(text) = &self.nodes[current.0].node_type {
                out.push_str(text);
            }
            for child in self.nodes[current.0].children.iter().rev() {
                stack.push(*child);
            }
        }
        out.trim().to_string()
    }

    pub(crate) fn set_value(&mut self, node_id: NodeId, value: &str) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::HtmlParse("set_value on a non-element node".into()))?;
        element.value = value.to_string();
        Ok(())
    }

    pub(crate) fn set_checked(&mut self, node_id: NodeId, checked: bool) -> Result<()> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::HtmlParse("set_checked on a non-element node".into()))?;
        element.checked = checked;
        Ok(())
    }

    pub(crate) fn set_files(&mut self, node_id: NodeId, files: &[MockFile]) -> Result<bool> {
        let element = self
            .element_mut(node_id)
            .ok_or_else(|| Error::HtmlParse("set_files on a non-element node".into()))?;
        if element.files == files {
            return Ok(false);
        }
        element.files = files.to_vec();
        Ok(true)
    }

    /// Option value per the platform rule: the `value` attribute when
    /// present, otherwise the option's text content.
    pub(crate) fn option_value(&self, option_id: NodeId) -> String {
        match self.attr(option_id, "value") {
            Some(value) => value.to_string(),
            None => self.text_content(option_id),
        }
    }

    /// `<option>` children of a `<select>`, in DOM order.
    pub(crate) fn options_of(&self, select_id: NodeId) -> Vec<NodeId> {
        self.descendant_elements(select_id)
            .into_iter()
            .filter(|node_id| {
                self.tag_name(*node_id)
                    .is_some_and(|tag| tag.eq_ignore_ascii_case("option"))
            })
            .collect()
    }

    /// Values of the currently selected options, in DOM order. Never sorted.
    pub(crate) fn selected_option_values(&self, select_id: NodeId) -> Vec<String> {
        self.options_of(select_id)
            .into_iter()
            .filter(|option_id| {
                self.element(*option_id)
                    .is_some_and(|element| element.selected)
            })
            .map(|option_id| self.option_value(option_id))
            .collect()
    }

    pub(crate) fn set_option_selected(&mut self, option_id: NodeId, selected: bool) -> Result<()> {
        let element = self
            .element_mut(option_id)
            .ok_or_else(|| Error::HtmlParse("set_option_selected on a non-element node".into()))?;
        element.selected = selected;
        Ok(())
    }

    /// Radio inputs that share `name` with the given radio, itself included.
    pub(crate) fn radio_group(&self, radio_id: NodeId) -> Vec<NodeId> {
        let Some(name) = self.attr(radio_id, "name") else {
            return vec![radio_id];
        };
        let name = name.to_string();
        self.document_order()
            .into_iter()
            .filter(|node_id| {
                self.element(*node_id).is_some_and(|element| {
                    element.input_type().as_deref() == Some("radio")
                        && element.attrs.get("name") == Some(&name)
                })
            })
            .collect()
    }
}
