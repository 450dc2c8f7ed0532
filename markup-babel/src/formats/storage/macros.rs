//! Macro rewriting on the parsed storage DOM
//!
//!     | Storage                                                  | Rewritten to              |
//!     |----------------------------------------------------------|---------------------------|
//!     | `<ac:link><ri:user ri:account-id=".."/></ac:link>`       | `@Name ID` text           |
//!     | `<ac:structured-macro ac:name="profile">` + user param   | `@Name ID` text           |
//!     | profile macro without the user parameter or `ri:user`    | malformed marker          |
//!     | user reference with no lookup, or an unknown user        | `[User Profile: ID]`      |
//!     | `<ac:image><ri:attachment ri:filename=".."/></ac:image>` | `<img src alt>`           |
//!     | `<ac:image><ri:url ri:value=".."/></ac:image>`           | `<img src alt>`           |
//!     | `<ac:image>` with anything else inside                   | `[unsupported image]`     |

use super::dom::{
    attr, children, create_element, create_text, find_child, find_descendant, is_element,
    replace_child,
};
use crate::common::links::{absolutize, attachment_url, encode_filename};
use markup5ever_rcdom::Handle;
use std::collections::HashMap;

pub const MALFORMED_PROFILE: &str = "[User Profile Macro (Malformed)]";
pub const UNSUPPORTED_IMAGE: &str = "[unsupported image]";

/// How a storage document refers to a user.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum UserRef {
    AccountId(String),
    UserKey(String),
}

impl UserRef {
    pub fn id(&self) -> &str {
        match self {
            UserRef::AccountId(id) | UserRef::UserKey(id) => id,
        }
    }

    fn from_element(user: &Handle) -> Option<UserRef> {
        attr(user, "ri:account-id")
            .filter(|id| !id.is_empty())
            .map(UserRef::AccountId)
            .or_else(|| {
                attr(user, "ri:userkey")
                    .filter(|key| !key.is_empty())
                    .map(UserRef::UserKey)
            })
    }
}

/// Resolves user references to display names.
pub trait UserLookup {
    fn display_name(&self, user: &UserRef) -> Option<String>;
}

/// Display names keyed by account id or user key.
impl UserLookup for HashMap<String, String> {
    fn display_name(&self, user: &UserRef) -> Option<String> {
        self.get(user.id()).cloned()
    }
}

/// Adapter for closures.
pub struct LookupFn<F>(pub F);

impl<F> UserLookup for LookupFn<F>
where
    F: Fn(&UserRef) -> Option<String>,
{
    fn display_name(&self, user: &UserRef) -> Option<String> {
        (self.0)(user)
    }
}

/// An attachment of the page being decoded.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Attachment {
    pub title: String,
    pub download_url: String,
}

/// What the decoder knows about the page beyond its markup.
#[derive(Clone, Default)]
pub struct StorageContext<'a> {
    /// Site root used to absolutize links and build attachment URLs.
    pub base_url: String,
    pub content_id: Option<String>,
    pub attachments: Vec<Attachment>,
    pub users: Option<&'a dyn UserLookup>,
}

impl<'a> StorageContext<'a> {
    pub fn new(base_url: impl Into<String>) -> Self {
        StorageContext {
            base_url: base_url.into(),
            ..Default::default()
        }
    }

    pub fn with_content_id(mut self, content_id: impl Into<String>) -> Self {
        self.content_id = Some(content_id.into());
        self
    }

    pub fn with_attachments(mut self, attachments: Vec<Attachment>) -> Self {
        self.attachments = attachments;
        self
    }

    pub fn with_users(mut self, users: &'a dyn UserLookup) -> Self {
        self.users = Some(users);
        self
    }
}

/// Rewrite user and image macros below `node` in place.
pub fn rewrite(node: &Handle, context: &StorageContext<'_>) {
    for (index, child) in children(node).into_iter().enumerate() {
        match replacement(&child, context) {
            Some(new) => replace_child(node, index, new),
            None => rewrite(&child, context),
        }
    }
}

fn replacement(node: &Handle, context: &StorageContext<'_>) -> Option<Handle> {
    if is_element(node, "ac:link") {
        let user = find_descendant(node, "ri:user")?;
        let text = match UserRef::from_element(&user) {
            Some(user) => mention(&user, context),
            None => {
                log::debug!("user link without an id");
                MALFORMED_PROFILE.to_string()
            }
        };
        return Some(create_text(&text));
    }

    if is_element(node, "ac:structured-macro") {
        return match attr(node, "ac:name").as_deref() {
            Some("profile") => Some(create_text(&profile(node, context))),
            _ => None,
        };
    }

    if is_element(node, "ac:image") {
        return Some(image(node, context));
    }

    None
}

fn profile(node: &Handle, context: &StorageContext<'_>) -> String {
    let user = children(node)
        .into_iter()
        .find(|child| {
            is_element(child, "ac:parameter") && attr(child, "ac:name").as_deref() == Some("user")
        })
        .and_then(|param| find_descendant(&param, "ri:user"))
        .and_then(|user| UserRef::from_element(&user));

    match user {
        Some(user) => mention(&user, context),
        None => {
            log::warn!("profile macro without a user reference");
            MALFORMED_PROFILE.to_string()
        }
    }
}

fn mention(user: &UserRef, context: &StorageContext<'_>) -> String {
    let name = context
        .users
        .and_then(|users| users.display_name(user))
        .filter(|name| !name.trim().is_empty());
    match name {
        Some(name) => format!("@{} {}", name.trim(), user.id()),
        None => format!("[User Profile: {}]", user.id()),
    }
}

fn image(node: &Handle, context: &StorageContext<'_>) -> Handle {
    let alt = attr(node, "ac:alt");
    let (src, alt) = if let Some(attachment) = find_child(node, "ri:attachment") {
        let filename = attr(&attachment, "ri:filename").unwrap_or_default();
        let src = attachment_source(&attachment, &filename, context);
        (src, alt.unwrap_or(filename))
    } else if let Some(url) = find_child(node, "ri:url") {
        (attr(&url, "ri:value").unwrap_or_default(), alt.unwrap_or_default())
    } else {
        log::warn!("image macro with unsupported content");
        return create_text(UNSUPPORTED_IMAGE);
    };

    let width = attr(node, "ac:width");
    let height = attr(node, "ac:height");
    let title = attr(node, "ac:title");
    let mut attrs = vec![("src", src.as_str()), ("alt", alt.as_str())];
    if let Some(width) = width.as_deref() {
        attrs.push(("width", width));
    }
    if let Some(height) = height.as_deref() {
        attrs.push(("height", height));
    }
    if let Some(title) = title.as_deref() {
        attrs.push(("title", title));
    }
    create_element("img", attrs)
}

fn attachment_source(attachment: &Handle, filename: &str, context: &StorageContext<'_>) -> String {
    // Attachments of another page or post can't be resolved against this one
    let elsewhere = find_descendant(attachment, "ri:page").is_some()
        || find_descendant(attachment, "ri:blog-post").is_some();
    if elsewhere {
        return encode_filename(filename);
    }

    if let Some(known) = context.attachments.iter().find(|a| a.title == filename) {
        return absolutize(&context.base_url, &known.download_url);
    }
    match context.content_id.as_deref() {
        Some(id) if !id.is_empty() => attachment_url(&context.base_url, id, filename),
        _ => encode_filename(filename),
    }
}
