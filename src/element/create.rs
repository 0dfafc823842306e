//! The two element construction entrypoints.

use serde_json::{Map, Value};

use super::{AttrValue, Attributes, Element, ElementError, INNER_HTML_KEY, Props, Tag, Template};
use crate::log;

/// Build a tag from a name, its attributes and children.
///
/// Children are flattened. Attribute values without a scalar form are
/// dropped with a warning, as are tag names that are not lower-case.
pub fn tag(
    name: impl Into<String>,
    attrs: Option<Map<String, Value>>,
    children: Vec<Element>,
) -> Result<Tag, ElementError> {
    let name = name.into();
    if name != name.to_lowercase() {
        log!("warn"; "constructed HTML5 tag with non-lowercase name {}", name);
    }

    let children = flatten(children);
    let mut attributes = Attributes::new();
    let mut inner_html = None;

    for (key, value) in attrs.into_iter().flatten() {
        if key == INNER_HTML_KEY {
            inner_html = Some(inner_html_of(&name, &value)?);
            continue;
        }
        match AttrValue::from_json(&value) {
            Some(value) => attributes.insert(key, value),
            None => log!("warn"; "dropped attribute `{}` on <{}>: {} has no attribute form", key, name, value),
        }
    }

    if inner_html.is_some() && !children.is_empty() {
        return Err(ElementError::InnerHtmlWithChildren { tag: name });
    }

    Ok(Tag {
        name,
        attributes,
        children,
        inner_html,
    })
}

/// Build a tag by calling a template with `props` and the flattened children.
///
/// The template runs immediately; its tag is returned as is.
pub fn component<T>(
    template: &T,
    props: Option<Map<String, Value>>,
    children: Vec<Element>,
) -> Result<Tag, ElementError>
where
    T: Template + ?Sized,
{
    template.render(Props::new(props.unwrap_or_default(), flatten(children)))
}

/// Flatten nested collections into one ordered list.
///
/// `Empty` entries are kept; they render to nothing anyway.
pub fn flatten(children: Vec<Element>) -> Vec<Element> {
    if !children.iter().any(|c| matches!(c, Element::Collection(_))) {
        return children;
    }

    let mut out = Vec::with_capacity(children.len());
    let mut stack: Vec<std::vec::IntoIter<Element>> = vec![children.into_iter()];
    while let Some(iter) = stack.last_mut() {
        match iter.next() {
            Some(Element::Collection(items)) => stack.push(items.into_iter()),
            Some(other) => out.push(other),
            None => {
                stack.pop();
            }
        }
    }
    out
}

fn inner_html_of(tag: &str, value: &Value) -> Result<String, ElementError> {
    let html = match value {
        Value::String(s) => Some(s.as_str()),
        Value::Object(obj) => obj.get("__html").and_then(Value::as_str),
        _ => None,
    };
    html.map(str::to_string)
        .ok_or_else(|| ElementError::InvalidInnerHtml {
            tag: tag.to_string(),
        })
}
