//! Templates (components): functions from props to a single tag.

use serde_json::{Map, Value};

use super::{Element, ElementError, Tag};

/// Properties passed to a template, plus its flattened children.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    values: Map<String, Value>,
    pub children: Vec<Element>,
}

impl Props {
    pub fn new(values: Map<String, Value>, children: Vec<Element>) -> Self {
        Self { values, children }
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.values.get(name)
    }

    /// String prop, if present and a string.
    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    /// Builder: set a prop.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(name.into(), value.into());
        self
    }
}

/// Something that turns props into exactly one tag.
///
/// Any `Fn(Props) -> Tag` closure is a template. Templates loaded from page
/// modules implement the trait directly, since evaluating them can fail.
pub trait Template {
    /// Name used in error messages.
    fn name(&self) -> &str {
        "anonymous"
    }

    fn render(&self, props: Props) -> Result<Tag, ElementError>;
}

impl<F> Template for F
where
    F: Fn(Props) -> Tag,
{
    fn render(&self, props: Props) -> Result<Tag, ElementError> {
        Ok(self(props))
    }
}

/// Built-in template grouping its children without a wrapping tag.
#[derive(Debug, Clone, Copy, Default)]
pub struct Fragment;

impl Template for Fragment {
    fn name(&self) -> &str {
        "Fragment"
    }

    fn render(&self, props: Props) -> Result<Tag, ElementError> {
        Ok(Tag::fragment(props.children))
    }
}
