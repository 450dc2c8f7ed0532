//! Link helpers shared by the wiki and storage converters.
//!
//! - Smart links (`[text|url|smart-link]`) pointing back at the configured site get friendlier
//!   labels: issue browse URLs use the issue key, wiki page URLs use the page title.
//! - Attachment download URLs are assembled from the site base, content id and filename.

use once_cell::sync::Lazy;
use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, CONTROLS};
use regex::Regex;
use url::Url;

/// Characters escaped in attachment filenames.
const FILENAME: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

static BROWSE_URL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"/browse/([A-Za-z][A-Za-z0-9_]*-\d+)/?(?:[?#].*)?$").unwrap());
static PAGE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(.*/wiki/spaces/[^/]+/pages/\d+)/([^/?#]+)(.*)$").unwrap()
});

/// Whether `url` points at the site rooted at `base_url`.
///
/// An empty base accepts every URL.
pub fn is_same_site(base_url: &str, url: &str) -> bool {
    let base_url = base_url.trim();
    if base_url.is_empty() {
        return true;
    }
    match (Url::parse(base_url), Url::parse(url)) {
        (Ok(base), Ok(target)) => {
            base.scheme() == target.scheme()
                && base.host_str() == target.host_str()
                && base.port_or_known_default() == target.port_or_known_default()
                && target
                    .path()
                    .starts_with(base.path().trim_end_matches('/'))
        }
        _ => url.starts_with(base_url.trim_end_matches('/')),
    }
}

/// Label and target for a smart link.
///
/// Links that are not recognised keep their original label and target.
pub fn rewrite_smart_link(text: &str, url: &str, base_url: &str) -> (String, String) {
    if !is_same_site(base_url, url) {
        return (text.to_string(), url.to_string());
    }
    if let Some(caps) = BROWSE_URL.captures(url) {
        if let Some(key) = caps.get(1) {
            return (key.as_str().to_string(), url.to_string());
        }
    }
    if let Some(caps) = PAGE_URL.captures(url) {
        if let (Some(prefix), Some(slug), Some(rest)) = (caps.get(1), caps.get(2), caps.get(3)) {
            let title = page_title(slug.as_str());
            let compact: String = title.split_whitespace().collect();
            let target = format!("{}/{}{}", prefix.as_str(), compact, rest.as_str());
            return (title, target);
        }
    }
    (text.to_string(), url.to_string())
}

/// Decode a page slug such as `Example+Meeting+Notes` into `Example Meeting Notes`.
fn page_title(slug: &str) -> String {
    let spaced = slug.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8_lossy()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Percent-encode an attachment filename for use in a URL path.
pub fn encode_filename(filename: &str) -> String {
    utf8_percent_encode(filename, FILENAME).to_string()
}

/// `{base}/download/attachments/{content_id}/{filename}`
pub fn attachment_url(base_url: &str, content_id: &str, filename: &str) -> String {
    format!(
        "{}/download/attachments/{}/{}",
        base_url.trim_end_matches('/'),
        content_id,
        encode_filename(filename)
    )
}

/// Make a possibly relative download link absolute against `base_url`.
pub fn absolutize(base_url: &str, link: &str) -> String {
    if link.starts_with("http://") || link.starts_with("https://") || base_url.is_empty() {
        return link.to_string();
    }
    let base = base_url.trim_end_matches('/');
    if link.starts_with('/') {
        format!("{base}{link}")
    } else {
        format!("{base}/{link}")
    }
}
