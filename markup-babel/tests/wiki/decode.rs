use insta::assert_snapshot;
use markup_babel::{wiki_to_markdown, WikiOptions};
use std::time::{Duration, Instant};

const BASE: &str = "https://example.atlassian.net";

fn markdown(wiki: &str) -> String {
    wiki_to_markdown(wiki, &WikiOptions::default())
}

fn with_base(wiki: &str) -> String {
    let options = WikiOptions {
        base_url: BASE.to_string(),
        ..WikiOptions::default()
    };
    wiki_to_markdown(wiki, &options)
}

#[test]
fn test_code_block_has_no_heading_conversion() {
    let output = markdown("{code}#!/bin/bash\n# comment\n{code}");
    assert!(output.contains("#!/bin/bash"));
    assert!(output.contains("# comment"));
    assert!(!output.contains("1. comment"));
    assert!(!output.contains("h1."));
}

#[test]
fn test_mentions() {
    assert_eq!(markdown("Hello [~accountid:123456]!"), "Hello User:123456!");
    assert_eq!(markdown("ping [~jdoe]"), "ping User:jdoe");
}

#[test]
fn test_smart_links() {
    assert_eq!(
        with_base(&format!("[PROJ-123|{BASE}/browse/PROJ-123|smart-link]")),
        format!("[PROJ-123]({BASE}/browse/PROJ-123)")
    );
    assert_eq!(
        with_base(&format!(
            "[Notes|{BASE}/wiki/spaces/PROJ/pages/987654321/Example+Meeting+Notes|smart-link]"
        )),
        format!("[Example Meeting Notes]({BASE}/wiki/spaces/PROJ/pages/987654321/ExampleMeetingNotes)")
    );
}

#[test]
fn test_foreign_smart_link_keeps_label() {
    assert_eq!(
        with_base("[Elsewhere|https://other.example.org/browse/X-1|smart-link]"),
        "[Elsewhere](https://other.example.org/browse/X-1)"
    );
}

#[test]
fn test_citations() {
    assert_eq!(markdown("??cited text??"), "<cite>cited text</cite>");
    assert!(!markdown("?? not a cite ??").contains("<cite>"));
}

#[test]
fn test_citation_scan_is_linear() {
    let mut source = String::from("* (??) Known limitations: ");
    for i in 0..5_000 {
        source.push_str(&format!("[retry-handler-{i}] "));
    }
    let started = Instant::now();
    let output = markdown(&source);
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(output.contains("Known limitations"));
    assert!(output.contains("retry-handler"));
}

#[test]
fn test_many_markers_on_one_line_scan_linearly() {
    for unit in ["(??) [a] ", "?? (??) [a] _x *y "] {
        let source = unit.repeat(40_000);
        let started = Instant::now();
        let output = markdown(&source);
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "decoding {unit:?} x 40000 took {:?}",
            started.elapsed()
        );
        assert!(!output.contains("<cite>"));
        assert!(output.starts_with(unit.trim_end()));
    }
}

#[test]
fn test_bracketed_marker_leaves_later_citation_intact() {
    assert_eq!(markdown("(??) and ??b??"), "(??) and <cite>b</cite>");
}

#[test]
fn test_document() {
    let source = "h1. Project Overview\nh2. Introduction\nWe *improve* things.\n* Feature 1\n{code:python}\nprint('hi')\n{code}\n[our website|https://example.com]";
    assert_snapshot!(markdown(source), @r"
    # Project Overview
    ## Introduction
    We **improve** things.
    - Feature 1
    ```python
    print('hi')
    ```
    [our website](https://example.com)
    ");
}

#[test]
fn test_panel_and_quote() {
    assert_eq!(
        markdown("{panel:title=Release}\nShip *it*\n{panel}"),
        "**Release**\nShip **it**"
    );
    assert_eq!(markdown("{quote}\nwise words\n{quote}"), "> wise words");
}

#[test]
fn test_code_inside_panel_is_verbatim() {
    assert_eq!(
        markdown("{panel:title=Run}\n{code:bash}\n# not a list\n{code}\n{panel}"),
        "**Run**\n```bash\n# not a list\n```"
    );
}
