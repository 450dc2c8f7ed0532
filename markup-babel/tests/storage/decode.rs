use markup_babel::{
    markdown_to_storage, storage_to_markdown, Attachment, LookupFn, StorageContext,
    StorageOptions, UserRef,
};
use std::collections::HashMap;

const PAGE: &str = r#"
<h1>Meeting notes</h1>
<p>Owner: <ac:structured-macro ac:name="profile" ac:schema-version="1"><ac:parameter ac:name="user"><ri:user ri:account-id="user123" /></ac:parameter></ac:structured-macro></p>
<h2>Date</h2>
<p>2024-01-01</p>
<h2>Goals</h2>
<ul><li>Example goal</li></ul>
"#;

fn directory() -> HashMap<String, String> {
    let mut users = HashMap::new();
    users.insert("user123".to_string(), "Test User".to_string());
    users.insert("123456".to_string(), "Test User".to_string());
    users
}

#[test]
fn test_simple_text() {
    let doc = storage_to_markdown("<p>Simple text</p>", &StorageContext::default());
    assert_eq!(doc.html, "<p>Simple text</p>");
    assert_eq!(doc.markdown.trim(), "Simple text");
}

#[test]
fn test_page_with_profile_macro() {
    let users = directory();
    let context = StorageContext::new("https://example.atlassian.net").with_users(&users);
    let doc = storage_to_markdown(PAGE, &context);
    assert!(doc.html.contains("@Test User user123"));
    assert!(doc.markdown.contains("@Test User user123"));
    assert!(doc.markdown.contains("## Date"));
    assert!(doc.markdown.contains("## Goals"));
    assert!(doc.markdown.contains("- Example goal"));
}

#[test]
fn test_user_link_mention() {
    let users = directory();
    let context = StorageContext::default().with_users(&users);
    let html = "\n    <ac:link>\n        <ri:user ri:account-id=\"123456\"/>\n    </ac:link>\n    <p>Some text</p>\n    ";
    let doc = storage_to_markdown(html, &context);
    assert!(doc.html.contains("@Test User 123456"));
    assert!(doc.markdown.contains("@Test User 123456"));
    assert!(doc.markdown.contains("Some text"));
}

#[test]
fn test_multiple_profile_macros() {
    let lookup = LookupFn(|user: &UserRef| match user {
        UserRef::AccountId(id) if id == "test-account-id-123" => Some("Test User One".to_string()),
        UserRef::UserKey(key) if key == "test-userkey-456" => Some("Test User Two".to_string()),
        _ => None,
    });
    let context = StorageContext::default().with_users(&lookup);
    let html = concat!(
        "<p>This page mentions a user via profile macro: ",
        r#"<ac:structured-macro ac:name="profile" ac:schema-version="1">"#,
        r#"<ac:parameter ac:name="user"><ri:user ri:account-id="test-account-id-123" /></ac:parameter>"#,
        "</ac:structured-macro>. And another one: ",
        r#"<ac:structured-macro ac:name="profile" ac:schema-version="1">"#,
        r#"<ac:parameter ac:name="user"><ri:user ri:userkey="test-userkey-456" /></ac:parameter>"#,
        "</ac:structured-macro>.</p>"
    );
    let doc = storage_to_markdown(html, &context);
    for name in ["@Test User One", "@Test User Two"] {
        assert!(doc.html.contains(name));
        assert!(doc.markdown.contains(name));
    }
}

#[test]
fn test_malformed_profile_macro() {
    for html in [
        r#"<ac:structured-macro ac:name="profile"></ac:structured-macro>"#,
        r#"<ac:structured-macro ac:name="profile"><ac:parameter ac:name="user"></ac:parameter></ac:structured-macro>"#,
    ] {
        let doc = storage_to_markdown(html, &StorageContext::default());
        assert!(doc.html.contains("[User Profile Macro (Malformed)]"));
        assert!(doc.markdown.contains("[User Profile Macro (Malformed)]"));
    }
}

#[test]
fn test_profile_fallback_without_lookup() {
    let html = r#"<ac:structured-macro ac:name="profile"><ac:parameter ac:name="user"><ri:user ri:account-id="user999" /></ac:parameter></ac:structured-macro>"#;
    let doc = storage_to_markdown(html, &StorageContext::new("https://example.atlassian.net"));
    assert!(doc.html.contains("[User Profile: user999]"));
    assert!(doc.markdown.contains("[User Profile: user999]"));
}

#[test]
fn test_attachment_image() {
    let context = StorageContext::new("https://example.atlassian.net/wiki")
        .with_content_id("12345")
        .with_attachments(vec![Attachment {
            title: "chart.png".to_string(),
            download_url: "/download/attachments/12345/chart.png".to_string(),
        }]);
    let doc = storage_to_markdown(
        r#"<p><ac:image ac:height="120"><ri:attachment ri:filename="chart.png" /></ac:image></p>"#,
        &context,
    );
    assert_eq!(
        doc.markdown,
        "![chart.png](https://example.atlassian.net/wiki/download/attachments/12345/chart.png)"
    );
    assert!(doc.html.contains(r#"height="120""#));
}

#[test]
fn test_image_without_context_uses_filename() {
    let doc = storage_to_markdown(
        r#"<ac:image><ri:attachment ri:filename="plain.png" /></ac:image>"#,
        &StorageContext::default(),
    );
    assert_eq!(doc.markdown, "![plain.png](plain.png)");
}

#[test]
fn test_unsupported_image() {
    let doc = storage_to_markdown(
        r#"<ac:image><ri:something /></ac:image>"#,
        &StorageContext::default(),
    );
    assert!(doc.markdown.contains("[unsupported image]"));
}

#[test]
fn test_round_trip_through_storage() {
    let source = "# Title\n\nSome **bold** and *soft* text.\n\n- one\n- two\n\n```python\nprint(1 > 0)\n```";
    let html = markdown_to_storage(source, &StorageOptions::default());
    let doc = storage_to_markdown(&html, &StorageContext::default());
    assert_eq!(doc.markdown, source);
}
