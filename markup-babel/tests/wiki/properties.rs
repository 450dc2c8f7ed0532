//! Round trips and totality of the wiki converters.

use markup_babel::{markdown_to_wiki, wiki_to_markdown, WikiOptions};
use proptest::prelude::*;

#[test]
fn test_nested_bullets_round_trip() {
    let options = WikiOptions::default();
    let wiki = "* A\n** B\n*** C";
    let markdown = wiki_to_markdown(wiki, &options);
    assert_eq!(markdown, "- A\n  - B\n    - C");
    assert!(!markdown.contains("**"));
    assert_eq!(markdown_to_wiki(&markdown, &options), wiki);
    assert_eq!(markdown_to_wiki(wiki, &options), wiki);
}

proptest! {
    #[test]
    fn decoding_never_panics(source in "[a-z *_#{}()?|!\\[\\]~^+\n-]{0,160}") {
        let _ = wiki_to_markdown(&source, &WikiOptions::default());
    }

    #[test]
    fn encoding_never_panics(source in "[a-z *_#`>()\\[\\]|~<>\n-]{0,160}") {
        let _ = markdown_to_wiki(&source, &WikiOptions::default());
    }

    #[test]
    fn code_bodies_survive_decoding(body in "[a-z#*_ ]{1,40}") {
        let body = body.trim().to_string();
        prop_assume!(!body.is_empty());
        let output = wiki_to_markdown(&format!("{{code}}\n{body}\n{{code}}"), &WikiOptions::default());
        prop_assert_eq!(output, format!("```\n{body}\n```"));
    }
}
