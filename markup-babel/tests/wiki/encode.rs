use insta::assert_snapshot;
use markup_babel::{markdown_to_wiki, wiki_to_markdown, WikiOptions};

fn wiki(markdown: &str) -> String {
    markdown_to_wiki(markdown, &WikiOptions::default())
}

#[test]
fn test_headings() {
    assert_eq!(wiki("# Heading 1"), "h1. Heading 1");
    assert_eq!(wiki("## Heading 2"), "h2. Heading 2");
    assert_eq!(wiki("#item"), "#item");
}

#[test]
fn test_inline() {
    assert_eq!(wiki("**bold text**"), "*bold text*");
    assert_eq!(wiki("*italic text*"), "_italic text_");
    assert_eq!(wiki("`code`"), "{{code}}");
}

#[test]
fn test_stars_inside_words_are_kept() {
    assert_eq!(wiki("a*b*c"), "a*b*c");
    assert_eq!(wiki("5*3*2 = 30"), "5*3*2 = 30");
    assert_eq!(wiki("glob src/*.rs and lib/*.rs"), "glob src/*.rs and lib/*.rs");
}

#[test]
fn test_arithmetic_survives_round_trip() {
    let back = wiki_to_markdown(&wiki("5*3*2 = 30"), &WikiOptions::default());
    assert_eq!(back, "5*3*2 = 30");
}

#[test]
fn test_bold_italic() {
    assert_eq!(wiki("a ***loud*** word"), "a *_loud_* word");
    let back = wiki_to_markdown(&wiki("***loud***"), &WikiOptions::default());
    assert_eq!(back, "***loud***");
}

#[test]
fn test_nested_bullets_2space() {
    assert_eq!(
        wiki("- Item 1\n  - Nested 1\n    - Deep 1\n- Item 2"),
        "* Item 1\n** Nested 1\n*** Deep 1\n* Item 2"
    );
}

#[test]
fn test_nested_numbered_2space() {
    assert_eq!(
        wiki("1. First\n  1. Sub\n    1. Deep"),
        "# First\n## Sub\n### Deep"
    );
}

#[test]
fn test_code_language_aliases() {
    assert!(wiki("```dockerfile\nFROM x\n```").starts_with("{code:bash}\n"));
    assert!(wiki("```typescript\nlet x = 1;\n```").starts_with("{code:javascript}\n"));
    assert!(wiki("```rust\nfn x() {}\n```").starts_with("{code}\n"));
}

#[test]
fn test_document() {
    let source = "# Project Overview\n\n## Introduction\n\nWe **improve** things.\n\n- Feature 1\n- Feature 2\n\n```python\nprint('hi')\n```\n\nSee [our website](https://example.com).";
    assert_snapshot!(wiki(source), @r"
    h1. Project Overview

    h2. Introduction

    We *improve* things.

    * Feature 1
    * Feature 2

    {code:python}
    print('hi')
    {code}

    See [our website|https://example.com].
    ");
}

#[test]
fn test_translation_disabled() {
    let options = WikiOptions {
        translate: false,
        ..WikiOptions::default()
    };
    let source = "h1. Jira Heading\n**markdown bold**\n{{jira code}}";
    assert_eq!(markdown_to_wiki(source, &options), source);
}
