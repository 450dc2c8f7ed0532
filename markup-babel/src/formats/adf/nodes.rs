//! Typed rich document tree
//!
//! Serialises to the JSON shape the cloud backend expects: every node is an object tagged by
//! `type`, containers carry a `content` array, and leaves carry `attrs`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use strum::{AsRefStr, EnumString};

/// Root of a rich document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename = "doc")]
pub struct Document {
    pub version: u32,
    #[serde(default)]
    pub content: Vec<Node>,
}

impl Document {
    pub fn new(content: Vec<Node>) -> Self {
        Document {
            version: 1,
            content,
        }
    }

    pub fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl Default for Document {
    fn default() -> Self {
        Document::new(vec![Node::paragraph(Vec::new())])
    }
}

/// A node of the rich document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Node {
    Paragraph {
        #[serde(default)]
        content: Vec<Node>,
    },
    Heading {
        attrs: HeadingAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    Text {
        text: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        marks: Vec<Mark>,
    },
    CodeBlock {
        #[serde(default)]
        attrs: CodeBlockAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    BulletList {
        #[serde(default)]
        content: Vec<Node>,
    },
    OrderedList {
        #[serde(default)]
        content: Vec<Node>,
    },
    ListItem {
        #[serde(default)]
        content: Vec<Node>,
    },
    Blockquote {
        #[serde(default)]
        content: Vec<Node>,
    },
    Rule,
    Table {
        #[serde(default)]
        attrs: TableAttrs,
        #[serde(default)]
        content: Vec<Node>,
    },
    TableRow {
        #[serde(default)]
        content: Vec<Node>,
    },
    TableHeader {
        #[serde(default)]
        content: Vec<Node>,
    },
    TableCell {
        #[serde(default)]
        content: Vec<Node>,
    },
    HardBreak,
    Mention {
        #[serde(default)]
        attrs: Map<String, Value>,
    },
    Emoji {
        #[serde(default)]
        attrs: Map<String, Value>,
    },
    Date {
        #[serde(default)]
        attrs: Map<String, Value>,
    },
    Status {
        #[serde(default)]
        attrs: Map<String, Value>,
    },
    InlineCard {
        #[serde(default)]
        attrs: Map<String, Value>,
    },
}

impl Node {
    pub fn text(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Node::Text {
            text: text.into(),
            marks,
        }
    }

    pub fn paragraph(content: Vec<Node>) -> Self {
        Node::Paragraph { content }
    }

    pub fn heading(level: u8, content: Vec<Node>) -> Self {
        Node::Heading {
            attrs: HeadingAttrs {
                level: level.clamp(1, 6),
            },
            content,
        }
    }

    pub fn code_block(language: Option<String>, body: &str) -> Self {
        let content = if body.is_empty() {
            Vec::new()
        } else {
            vec![Node::text(body, Vec::new())]
        };
        Node::CodeBlock {
            attrs: CodeBlockAttrs { language },
            content,
        }
    }

    pub fn table(rows: Vec<Node>) -> Self {
        Node::Table {
            attrs: TableAttrs::default(),
            content: rows,
        }
    }

    /// The node's `type` tag.
    pub fn node_type(&self) -> NodeType {
        match self {
            Node::Paragraph { .. } => NodeType::Paragraph,
            Node::Heading { .. } => NodeType::Heading,
            Node::Text { .. } => NodeType::Text,
            Node::CodeBlock { .. } => NodeType::CodeBlock,
            Node::BulletList { .. } => NodeType::BulletList,
            Node::OrderedList { .. } => NodeType::OrderedList,
            Node::ListItem { .. } => NodeType::ListItem,
            Node::Blockquote { .. } => NodeType::Blockquote,
            Node::Rule => NodeType::Rule,
            Node::Table { .. } => NodeType::Table,
            Node::TableRow { .. } => NodeType::TableRow,
            Node::TableHeader { .. } => NodeType::TableHeader,
            Node::TableCell { .. } => NodeType::TableCell,
            Node::HardBreak => NodeType::HardBreak,
            Node::Mention { .. } => NodeType::Mention,
            Node::Emoji { .. } => NodeType::Emoji,
            Node::Date { .. } => NodeType::Date,
            Node::Status { .. } => NodeType::Status,
            Node::InlineCard { .. } => NodeType::InlineCard,
        }
    }

    /// Child nodes, empty for leaves.
    pub fn children(&self) -> &[Node] {
        match self {
            Node::Paragraph { content }
            | Node::Heading { content, .. }
            | Node::CodeBlock { content, .. }
            | Node::BulletList { content }
            | Node::OrderedList { content }
            | Node::ListItem { content }
            | Node::Blockquote { content }
            | Node::Table { content, .. }
            | Node::TableRow { content }
            | Node::TableHeader { content }
            | Node::TableCell { content } => content,
            Node::Text { .. }
            | Node::Rule
            | Node::HardBreak
            | Node::Mention { .. }
            | Node::Emoji { .. }
            | Node::Date { .. }
            | Node::Status { .. }
            | Node::InlineCard { .. } => &[],
        }
    }
}

/// The closed set of node type tags, used to dispatch over untyped JSON.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, AsRefStr)]
#[strum(serialize_all = "camelCase")]
pub enum NodeType {
    Doc,
    Paragraph,
    Heading,
    Text,
    CodeBlock,
    BulletList,
    OrderedList,
    ListItem,
    Blockquote,
    Rule,
    Table,
    TableRow,
    TableHeader,
    TableCell,
    HardBreak,
    Mention,
    Emoji,
    Date,
    Status,
    InlineCard,
    Panel,
    Expand,
    MediaSingle,
    MediaGroup,
    Media,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeadingAttrs {
    pub level: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CodeBlockAttrs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TableAttrs {
    pub is_number_column_enabled: bool,
    pub layout: String,
}

impl Default for TableAttrs {
    fn default() -> Self {
        TableAttrs {
            is_number_column_enabled: false,
            layout: "default".to_string(),
        }
    }
}

/// Inline formatting applied to a text node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Mark {
    Strong,
    Em,
    Code,
    Strike,
    Underline,
    Link { attrs: LinkAttrs },
}

impl Mark {
    pub fn link(href: impl Into<String>) -> Self {
        Mark::Link {
            attrs: LinkAttrs { href: href.into() },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkAttrs {
    pub href: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_empty_document_shape() {
        assert_eq!(
            Document::default().to_value(),
            json!({"version": 1, "type": "doc", "content": [{"type": "paragraph", "content": []}]})
        );
    }

    #[test]
    fn test_text_marks_serialize() {
        let node = Node::text("x", vec![Mark::Strong, Mark::link("https://a.b")]);
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "type": "text",
                "text": "x",
                "marks": [{"type": "strong"}, {"type": "link", "attrs": {"href": "https://a.b"}}]
            })
        );
    }

    #[test]
    fn test_code_block_without_language_has_empty_attrs() {
        let node = Node::code_block(None, "x");
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({"type": "codeBlock", "attrs": {}, "content": [{"type": "text", "text": "x"}]})
        );
    }

    #[test]
    fn test_table_attrs() {
        let node = Node::table(Vec::new());
        assert_eq!(
            serde_json::to_value(&node).unwrap(),
            json!({
                "type": "table",
                "attrs": {"isNumberColumnEnabled": false, "layout": "default"},
                "content": []
            })
        );
    }

    #[test]
    fn test_deserialize_round_trip() {
        let value = json!({
            "version": 1,
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "T"}]},
                {"type": "rule"},
                {"type": "mention", "attrs": {"id": "42"}}
            ]
        });
        let doc: Document = serde_json::from_value(value.clone()).unwrap();
        assert_eq!(doc.content.len(), 3);
        assert_eq!(doc.to_value(), value);
    }

    #[test]
    fn test_node_type_strings() {
        assert_eq!(NodeType::from_str("codeBlock"), Ok(NodeType::CodeBlock));
        assert_eq!(NodeType::from_str("inlineCard"), Ok(NodeType::InlineCard));
        assert_eq!(NodeType::HardBreak.as_ref(), "hardBreak");
        assert!(NodeType::from_str("nonsense").is_err());
    }
}
