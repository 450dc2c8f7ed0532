//! RcDom helpers for storage documents
//!
//! Storage markup is parsed as HTML, so namespaced tags such as `ac:structured-macro` and
//! attributes such as `ri:filename` appear with their prefix as part of the local name.

use crate::error::FormatError;
use html5ever::tendril::TendrilSink;
use html5ever::{
    ns, parse_document, serialize, serialize::SerializeOpts, serialize::TraversalScope, Attribute,
    LocalName, QualName,
};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};
use once_cell::sync::Lazy;
use regex::Regex;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

static CDATA: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").unwrap());

/// Parse storage markup into a DOM.
///
/// CDATA sections are turned into escaped text first; the HTML tokenizer would otherwise read
/// them as comments that end at the first `>`.
pub fn parse(html: &str) -> RcDom {
    let prepared = CDATA.replace_all(html, |caps: &regex::Captures| {
        escape_text(caps.get(1).map_or("", |m| m.as_str()))
    });
    parse_document(RcDom::default(), Default::default()).one(&*prepared)
}

/// The `<body>` element of a parsed document.
pub fn body(dom: &RcDom) -> Option<Handle> {
    find_descendant(&dom.document, "body")
}

/// Local name of an element, `None` for other nodes.
pub fn tag(node: &Handle) -> Option<&str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(&*name.local),
        _ => None,
    }
}

pub fn is_element(node: &Handle, name: &str) -> bool {
    tag(node) == Some(name)
}

/// Value of an attribute by its local name.
pub fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|a| &*a.name.local == name)
            .map(|a| a.value.to_string()),
        _ => None,
    }
}

/// Snapshot of a node's children.
pub fn children(node: &Handle) -> Vec<Handle> {
    node.children.borrow().iter().cloned().collect()
}

/// First descendant element with the given name, depth first.
pub fn find_descendant(node: &Handle, name: &str) -> Option<Handle> {
    for child in node.children.borrow().iter() {
        if is_element(child, name) {
            return Some(child.clone());
        }
        if let Some(found) = find_descendant(child, name) {
            return Some(found);
        }
    }
    None
}

/// First direct child element with the given name.
pub fn find_child(node: &Handle, name: &str) -> Option<Handle> {
    node.children
        .borrow()
        .iter()
        .find(|child| is_element(child, name))
        .cloned()
}

/// `<ac:parameter ac:name="...">` value of a macro.
pub fn macro_parameter(node: &Handle, name: &str) -> Option<String> {
    node.children
        .borrow()
        .iter()
        .find(|child| {
            is_element(child, "ac:parameter") && attr(child, "ac:name").as_deref() == Some(name)
        })
        .map(text_content)
}

/// Concatenated text of a subtree.
pub fn text_content(node: &Handle) -> String {
    let mut out = String::new();
    collect_text(node, &mut out);
    out
}

fn collect_text(node: &Handle, out: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        out.push_str(&contents.borrow());
    }
    for child in node.children.borrow().iter() {
        collect_text(child, out);
    }
}

/// Create an HTML element with attributes
pub fn create_element(tag: &str, attrs: Vec<(&str, &str)>) -> Handle {
    let qual_name = QualName::new(None, ns!(html), LocalName::from(tag));
    let attributes = attrs
        .into_iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(name)),
            value: value.to_string().into(),
        })
        .collect();

    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Element {
            name: qual_name,
            attrs: RefCell::new(attributes),
            template_contents: Default::default(),
            mathml_annotation_xml_integration_point: false,
        },
    })
}

/// Create a text node
pub fn create_text(text: &str) -> Handle {
    Rc::new(Node {
        parent: Cell::new(None),
        children: RefCell::new(Vec::new()),
        data: NodeData::Text {
            contents: RefCell::new(text.to_string().into()),
        },
    })
}

/// Put `replacement` where the child at `index` was.
pub fn replace_child(parent: &Handle, index: usize, replacement: Handle) {
    replacement.parent.set(Some(Rc::downgrade(parent)));
    if let Some(slot) = parent.children.borrow_mut().get_mut(index) {
        *slot = replacement;
    }
}

/// Serialize the children of `node` (not the node itself).
pub fn serialize_children(node: &Handle) -> Result<String, FormatError> {
    let mut output = Vec::new();
    let opts = SerializeOpts {
        traversal_scope: TraversalScope::IncludeNode,
        ..Default::default()
    };

    for child in node.children.borrow().iter() {
        let serializable = SerializableHandle::from(child.clone());
        serialize(&mut output, &serializable, opts.clone()).map_err(|e| {
            FormatError::SerializationError(format!("HTML serialization failed: {e}"))
        })?;
    }

    String::from_utf8(output)
        .map_err(|e| FormatError::SerializationError(format!("UTF-8 conversion failed: {e}")))
}

/// Escape text content.
pub fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Escape an attribute value.
pub fn escape_attr(text: &str) -> String {
    escape_text(text).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_namespaced_tags_keep_prefix() {
        let dom = parse(r#"<ac:structured-macro ac:name="code"></ac:structured-macro>"#);
        let found = find_descendant(&dom.document, "ac:structured-macro").unwrap();
        assert_eq!(attr(&found, "ac:name").as_deref(), Some("code"));
    }

    #[test]
    fn test_cdata_becomes_text() {
        let dom = parse("<ac:plain-text-body><![CDATA[if a > b && c]]></ac:plain-text-body>");
        let body = find_descendant(&dom.document, "ac:plain-text-body").unwrap();
        assert_eq!(text_content(&body), "if a > b && c");
    }

    #[test]
    fn test_serialize_body_children() {
        let dom = parse("<p>Simple text</p>");
        let body = body(&dom).unwrap();
        assert_eq!(serialize_children(&body).unwrap(), "<p>Simple text</p>");
    }

    #[test]
    fn test_replace_child() {
        let dom = parse("<p>a</p><p>b</p>");
        let body = body(&dom).unwrap();
        replace_child(&body, 1, create_text("c"));
        assert_eq!(serialize_children(&body).unwrap(), "<p>a</p>c");
    }
}
