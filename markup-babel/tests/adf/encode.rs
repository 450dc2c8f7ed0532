use markup_babel::formats::adf::{encode, encode_optional, Mark, Node};
use serde_json::json;

fn first(markdown: &str) -> Node {
    encode(markdown).content.into_iter().next().expect("at least one node")
}

#[test]
fn test_empty_input_is_one_empty_paragraph() {
    let expected = json!({
        "version": 1,
        "type": "doc",
        "content": [{"type": "paragraph", "content": []}]
    });
    assert_eq!(encode("").to_value(), expected);
    assert_eq!(encode_optional(None).to_value(), expected);
}

#[test]
fn test_heading_levels() {
    for level in 1..=6u8 {
        let source = format!("{} H", "#".repeat(level as usize));
        match first(&source) {
            Node::Heading { attrs, .. } => assert_eq!(attrs.level, level),
            other => panic!("expected heading, got {other:?}"),
        }
    }
}

#[test]
fn test_hash_without_space_is_paragraph() {
    for level in 1..=6 {
        let source = format!("{}word", "#".repeat(level));
        assert!(matches!(first(&source), Node::Paragraph { .. }));
    }
}

#[test]
fn test_table_separator_is_consumed() {
    match first("| A |\n|---|\n| B |") {
        Node::Table { content, .. } => {
            assert_eq!(content.len(), 2);
            assert!(matches!(
                &content[0],
                Node::TableRow { content } if matches!(content[0], Node::TableHeader { .. })
            ));
            assert!(matches!(
                &content[1],
                Node::TableRow { content } if matches!(content[0], Node::TableCell { .. })
            ));
        }
        other => panic!("expected table, got {other:?}"),
    }
}

#[test]
fn test_marks() {
    let Node::Paragraph { content } = first("**bold** [site](https://example.com)") else {
        panic!("expected paragraph");
    };
    assert_eq!(
        content[0],
        Node::Text {
            text: "bold".to_string(),
            marks: vec![Mark::Strong],
        }
    );
    assert!(content.iter().any(|node| matches!(
        node,
        Node::Text { text, marks } if text == "site" && marks == &vec![Mark::link("https://example.com")]
    )));
}

#[test]
fn test_code_block_language() {
    let value = encode("```rust\nfn main() {}\n```").to_value();
    assert_eq!(
        value["content"][0],
        json!({
            "type": "codeBlock",
            "attrs": {"language": "rust"},
            "content": [{"type": "text", "text": "fn main() {}"}]
        })
    );
}

#[test]
fn test_mixed_blocks() {
    let doc = encode("# Title\n\n- one\n- two\n\n> quoted\n\n---\n\n1. first");
    let kinds: Vec<String> = doc
        .content
        .iter()
        .map(|node| node.node_type().as_ref().to_string())
        .collect();
    assert_eq!(
        kinds,
        vec!["heading", "bulletList", "blockquote", "rule", "orderedList"]
    );
}

#[test]
fn test_stars_inside_words_are_plain_text() {
    for source in ["a*b*c", "5*3*2 = 30", "glob src/*.rs and lib/*.rs"] {
        let Node::Paragraph { content } = first(source) else {
            panic!("expected paragraph");
        };
        assert_eq!(
            content,
            vec![Node::Text {
                text: source.to_string(),
                marks: vec![],
            }]
        );
    }
}

#[test]
fn test_triple_star_is_strong_and_em() {
    let Node::Paragraph { content } = first("***loud***") else {
        panic!("expected paragraph");
    };
    assert_eq!(
        content,
        vec![Node::Text {
            text: "loud".to_string(),
            marks: vec![Mark::Strong, Mark::Em],
        }]
    );
}
