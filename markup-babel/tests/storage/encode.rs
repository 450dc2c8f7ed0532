use insta::assert_snapshot;
use markup_babel::{markdown_to_storage, StorageOptions};

fn storage(markdown: &str) -> String {
    markdown_to_storage(markdown, &StorageOptions::default())
}

#[test]
fn test_no_automatic_anchors() {
    let result = storage("\n# Main Title\nSome content here.\n\n## Subsection\nMore content.\n\n### Deep Section\nFinal content.\n");
    assert!(!result.to_lowercase().contains(r#"id="main-title""#));
    assert!(!result.to_lowercase().contains(r#"id="subsection""#));
    assert!(!result.to_lowercase().contains(r#"id="deep-section""#));
    assert!(result.contains("<h1>Main Title</h1>"));
    assert!(result.contains("<h2>Subsection</h2>"));
    assert!(result.contains("<h3>Deep Section</h3>"));
}

#[test]
fn test_style_preservation() {
    let source = r#"
# Title with **bold** text

This paragraph has *italic* and **bold** text.

```python
def hello():
    return "world"
```

- Item with **bold**
- Item with *italic*

> Blockquote with **formatting**

[Link text](https://example.com) with description.
"#;
    let result = storage(source);
    assert!(result.contains("<strong>bold</strong>"));
    assert!(result.contains("<em>italic</em>"));
    assert!(result.contains("<blockquote>"));
    assert!(result.contains(r#"<a href="https://example.com">Link text</a>"#));
    assert!(result.contains("ac:structured-macro"));
    assert!(result.contains(r#"ac:name="code""#));
}

#[test]
fn test_code_macro_snapshot() {
    assert_snapshot!(
        storage("```js\nconst a = b && c;\n```"),
        @r#"<ac:structured-macro ac:name="code"><ac:parameter ac:name="language">js</ac:parameter><ac:plain-text-body><![CDATA[const a = b && c;]]></ac:plain-text-body></ac:structured-macro>"#
    );
}

#[test]
fn test_cdata_terminator_in_code_is_split() {
    let result = storage("```\na]]>b\n```");
    assert!(result.contains("<![CDATA[a]]]]><![CDATA[>b]]>"));
}

#[test]
fn test_text_is_escaped() {
    assert_eq!(storage("1 < 2 & 3 > 2"), "<p>1 &lt; 2 &amp; 3 &gt; 2</p>");
}
