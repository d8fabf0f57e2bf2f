use std::collections::VecDeque;

/// Index of a node inside a [`Document`] arena.
///
/// Detached nodes stay in the arena as tombstones; traversal always starts
/// from the root, so they are simply never reached again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone)]
pub enum NodeData {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
    },
    Text(String),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub data: NodeData,
}

/// An XML document held as an indexed arena with explicit parent pointers,
/// so removing a node never requires rediscovering its parent by search.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    pub fn new(root_tag: &str) -> Self {
        let root = Node {
            parent: None,
            children: Vec::new(),
            data: NodeData::Element {
                tag: root_tag.to_string(),
                attributes: Vec::new(),
            },
        };
        Self {
            nodes: vec![root],
            root: NodeId(0),
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    pub fn node_mut(&mut self, id: NodeId) -> &mut Node {
        &mut self.nodes[id.0]
    }

    pub fn new_element(&mut self, tag: &str, attributes: Vec<(String, String)>) -> NodeId {
        self.push_node(NodeData::Element {
            tag: tag.to_string(),
            attributes,
        })
    }

    pub fn new_text(&mut self, text: &str) -> NodeId {
        self.push_node(NodeData::Text(text.to_string()))
    }

    fn push_node(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            parent: None,
            children: Vec::new(),
            data,
        });
        id
    }

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.push(child);
    }

    pub fn insert_first(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[child.0].parent = Some(parent);
        self.nodes[parent.0].children.insert(0, child);
    }

    /// Unlinks a node from its parent. Returns `false` (and leaves the tree
    /// untouched) when the node has no parent, so callers never have to treat
    /// an irregular tree as an error.
    pub fn detach(&mut self, id: NodeId) -> bool {
        let Some(parent) = self.nodes[id.0].parent else {
            return false;
        };
        self.nodes[parent.0].children.retain(|child| *child != id);
        self.nodes[id.0].parent = None;
        true
    }

    /// Moves every child of `from` to the end of `to`'s child list,
    /// preserving order.
    pub fn move_children(&mut self, from: NodeId, to: NodeId) {
        let children = std::mem::take(&mut self.nodes[from.0].children);
        for child in &children {
            self.nodes[child.0].parent = Some(to);
        }
        self.nodes[to.0].children.extend(children);
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.0].children
    }

    pub fn tag(&self, id: NodeId) -> Option<&str> {
        match &self.nodes[id.0].data {
            NodeData::Element { tag, .. } => Some(tag),
            NodeData::Text(_) => None,
        }
    }

    pub fn attributes(&self, id: NodeId) -> &[(String, String)] {
        match &self.nodes[id.0].data {
            NodeData::Element { attributes, .. } => attributes,
            NodeData::Text(_) => &[],
        }
    }

    pub fn set_attributes(&mut self, id: NodeId, new_attributes: Vec<(String, String)>) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[id.0].data {
            *attributes = new_attributes;
        }
    }

    /// Keeps only the attributes for which `keep` returns true. Text nodes
    /// have no attributes and are left alone.
    pub fn retain_attributes(&mut self, id: NodeId, mut keep: impl FnMut(&str, &str) -> bool) {
        if let NodeData::Element { attributes, .. } = &mut self.nodes[id.0].data {
            attributes.retain(|(name, value)| keep(name, value));
        }
    }

    pub fn attribute(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attribute_ci(&self, id: NodeId, name: &str) -> Option<&str> {
        self.attributes(id)
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Descendants of `id` in document order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut queue = VecDeque::new();
        queue.extend(self.nodes[id.0].children.iter().copied());
        while let Some(current) = queue.pop_front() {
            result.push(current);
            for (offset, child) in self.nodes[current.0].children.iter().enumerate() {
                queue.insert(offset, *child);
            }
        }
        result
    }

    /// Concatenated text of `id`'s subtree, in document order.
    pub fn text_content(&self, id: NodeId) -> String {
        let mut buffer = String::new();
        self.collect_text(id, &mut buffer);
        buffer
    }

    fn collect_text(&self, id: NodeId, buffer: &mut String) {
        match &self.nodes[id.0].data {
            NodeData::Text(text) => buffer.push_str(text),
            NodeData::Element { .. } => {
                for child in &self.nodes[id.0].children {
                    self.collect_text(*child, buffer);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId) {
        let mut doc = Document::new("root");
        let outer = doc.new_element("outer", vec![("name".to_string(), "x".to_string())]);
        let inner = doc.new_element("inner", Vec::new());
        let text = doc.new_text("hello");
        doc.append_child(doc.root(), outer);
        doc.append_child(outer, inner);
        doc.append_child(inner, text);
        (doc, outer, inner)
    }

    #[test]
    fn detach_unlinks_node_and_reports_missing_parent() {
        let (mut doc, outer, inner) = sample();
        assert!(doc.detach(inner));
        assert!(doc.children(outer).is_empty());
        assert!(!doc.detach(inner));
    }

    #[test]
    fn insert_first_places_node_before_existing_children() {
        let (mut doc, outer, inner) = sample();
        let title = doc.new_element("title", Vec::new());
        doc.insert_first(outer, title);
        assert_eq!(doc.children(outer), &[title, inner]);
    }

    #[test]
    fn text_content_gathers_nested_text() {
        let (mut doc, outer, inner) = sample();
        let tail = doc.new_text(" world");
        doc.append_child(inner, tail);
        assert_eq!(doc.text_content(outer), "hello world");
    }

    #[test]
    fn descendants_walk_in_document_order() {
        let (doc, outer, inner) = sample();
        let all = doc.descendants(doc.root());
        assert_eq!(all[0], outer);
        assert_eq!(all[1], inner);
        assert_eq!(all.len(), 3);
    }

    #[test]
    fn attribute_lookup_is_case_insensitive_only_when_asked() {
        let (doc, outer, _) = sample();
        assert_eq!(doc.attribute(outer, "name"), Some("x"));
        assert_eq!(doc.attribute(outer, "NAME"), None);
        assert_eq!(doc.attribute_ci(outer, "NAME"), Some("x"));
    }

    #[test]
    fn move_children_reparents_in_order() {
        let (mut doc, outer, inner) = sample();
        let target = doc.new_element("target", Vec::new());
        doc.append_child(doc.root(), target);
        doc.move_children(outer, target);
        assert_eq!(doc.children(target), &[inner]);
        assert_eq!(doc.node(inner).parent, Some(target));
        assert!(doc.children(outer).is_empty());
    }
}
