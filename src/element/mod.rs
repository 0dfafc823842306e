//! In-memory element tree.
//!
//! An [`Element`] is whatever a page or template produces: a tag, text, a
//! number, nothing at all, or a list of more elements. Trees are built with
//! [`tag`] and [`component`] (or the [`Tag`] builder) and serialized by
//! [`crate::render`].
//!
//! # Example
//!
//! ```ignore
//! let page = tag("html", None, vec![
//!     tag("div", Some(attrs), vec!["hi".into()])?.into(),
//! ])?;
//! ```

mod attributes;
mod create;
mod template;

pub use attributes::{AttrValue, Attributes};
pub use create::{component, flatten, tag};
pub use template::{Fragment, Props, Template};

use thiserror::Error;

/// Tag name of a fragment, which renders only its children.
pub const FRAGMENT: &str = "#fragment";

/// Attribute key carrying raw, unescaped inner HTML.
pub const INNER_HTML_KEY: &str = "dangerouslySetInnerHTML";

/// A renderable value.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Tag(Tag),
    /// Text content, escaped on output.
    Text(String),
    Number(f64),
    /// null, undefined or a boolean: renders to nothing.
    Empty,
    Collection(Vec<Element>),
}

impl Element {
    /// Short description for error messages.
    pub fn describe(&self) -> String {
        match self {
            Self::Tag(tag) => format!("<{}>", tag.name),
            Self::Text(text) => serde_json::Value::String(text.clone()).to_string(),
            Self::Number(n) => crate::render::format_number(*n),
            Self::Empty => "null".to_string(),
            Self::Collection(items) => format!("array of {} elements", items.len()),
        }
    }
}

impl From<Tag> for Element {
    fn from(tag: Tag) -> Self {
        Self::Tag(tag)
    }
}

impl From<&str> for Element {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for Element {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<f64> for Element {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i64> for Element {
    #[allow(clippy::cast_precision_loss)]
    fn from(n: i64) -> Self {
        Self::Number(n as f64)
    }
}

impl From<i32> for Element {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

/// Booleans render to nothing, so `cond && <tag>` idioms work.
impl From<bool> for Element {
    fn from(_: bool) -> Self {
        Self::Empty
    }
}

impl From<Vec<Element>> for Element {
    fn from(items: Vec<Element>) -> Self {
        Self::Collection(items)
    }
}

impl<T: Into<Element>> From<Option<T>> for Element {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Empty, Into::into)
    }
}

/// An HTML tag (or fragment) with attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct Tag {
    pub name: String,
    pub attributes: Attributes,
    pub children: Vec<Element>,
    /// Raw HTML replacing `children` on output.
    pub inner_html: Option<String>,
}

impl Tag {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Attributes::new(),
            children: Vec::new(),
            inner_html: None,
        }
    }

    /// A `#fragment` wrapping `children`.
    pub fn fragment(children: Vec<Element>) -> Self {
        Self {
            children,
            ..Self::new(FRAGMENT)
        }
    }

    pub fn is_fragment(&self) -> bool {
        self.name == FRAGMENT
    }

    /// Builder: set an attribute.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Builder: append a child.
    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }
}

/// Errors raised while constructing an element tree.
#[derive(Debug, Error)]
pub enum ElementError {
    #[error("<{tag}> cannot have both `dangerouslySetInnerHTML` and children")]
    InnerHtmlWithChildren { tag: String },

    #[error("`dangerouslySetInnerHTML` on <{tag}> must be a string or {{\"__html\": string}}")]
    InvalidInnerHtml { tag: String },

    #[error("template `{name}` failed")]
    Template {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
