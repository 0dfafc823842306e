//! Evaluate export bodies into element trees.
//!
//! Component names resolve, in order, to an export of the same module, an
//! import binding, or the built-in `Fragment`.

use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

use super::source::{Node, PropValue};
use super::{ModuleError, ModuleRegistry};
use crate::element::{self, Element, ElementError, Fragment, Props, Tag, Template};

/// Template nesting limit, guards against self-referencing components.
const MAX_DEPTH: usize = 64;

/// Evaluate `export` of a loaded module with empty props.
pub(super) fn entry(registry: &ModuleRegistry, module: &Path, export: &str) -> Result<Element, ModuleError> {
    let props = Props::default();
    let scope = Scope {
        registry,
        module,
        props: &props,
        depth: 0,
    };
    let body = scope.export_body(module, export)?;
    scope.eval(body)
}

struct Scope<'a> {
    registry: &'a ModuleRegistry,
    module: &'a Path,
    props: &'a Props,
    depth: usize,
}

impl Scope<'_> {
    fn eval(&self, node: &Node) -> Result<Element, ModuleError> {
        Ok(match node {
            Node::Empty => Element::Empty,
            Node::Number(n) => Element::Number(*n),
            Node::Text(s) => Element::Text(s.clone()),
            Node::List(items) => Element::Collection(self.eval_all(items)?),
            Node::Tag {
                name,
                props,
                children,
            } => {
                let attrs = self.resolve_props(props);
                element::tag(name.as_str(), Some(attrs), self.eval_all(children)?)?.into()
            }
            Node::Component {
                name,
                props,
                children,
            } => {
                let attrs = self.resolve_props(props);
                let children = self.eval_all(children)?;
                let tag = match self.lookup(name)? {
                    Resolved::Fragment => element::component(&Fragment, Some(attrs), children)?,
                    Resolved::Export { module, export } => {
                        let template = ExportTemplate {
                            registry: self.registry,
                            module,
                            export,
                            depth: self.depth + 1,
                        };
                        element::component(&template, Some(attrs), children)
                            .map_err(unwrap_template_error)?
                    }
                };
                tag.into()
            }
            Node::Prop(name) if name == "children" => Element::Collection(self.props.children.clone()),
            Node::Prop(name) => value_to_element(self.props.get(name).unwrap_or(&Value::Null)),
            Node::If {
                cond,
                then,
                otherwise,
            } => {
                if self.truthy(cond) {
                    self.eval(then)?
                } else {
                    self.eval(otherwise)?
                }
            }
        })
    }

    fn eval_all(&self, nodes: &[Node]) -> Result<Vec<Element>, ModuleError> {
        nodes.iter().map(|n| self.eval(n)).collect()
    }

    fn resolve_props(&self, props: &[(String, PropValue)]) -> Map<String, Value> {
        props
            .iter()
            .map(|(name, value)| (name.clone(), self.resolve_value(value)))
            .collect()
    }

    fn resolve_value(&self, value: &PropValue) -> Value {
        match value {
            PropValue::Literal(v) => v.clone(),
            PropValue::Ref(name) => self.props.get(name).cloned().unwrap_or(Value::Null),
        }
    }

    fn truthy(&self, cond: &PropValue) -> bool {
        if let PropValue::Ref(name) = cond
            && name == "children"
        {
            return !self.props.children.is_empty();
        }
        match self.resolve_value(cond) {
            Value::Null => false,
            Value::Bool(b) => b,
            Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
            Value::String(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    fn lookup(&self, name: &str) -> Result<Resolved, ModuleError> {
        let record = self
            .registry
            .get(self.module)
            .ok_or_else(|| ModuleError::NotLoaded(self.module.to_path_buf()))?;

        if record.source.exports.contains_key(name) {
            return Ok(Resolved::Export {
                module: self.module.to_path_buf(),
                export: name.to_string(),
            });
        }
        if let Some(target) = record.imports.get(name) {
            return Ok(Resolved::Export {
                module: target.clone(),
                export: name.to_string(),
            });
        }
        if name == Fragment.name() {
            return Ok(Resolved::Fragment);
        }
        Err(ModuleError::UnknownTemplate {
            name: name.to_string(),
            module: self.module.to_path_buf(),
        })
    }

    fn export_body<'r>(&'r self, module: &Path, export: &str) -> Result<&'r Node, ModuleError> {
        let record = self
            .registry
            .get(module)
            .ok_or_else(|| ModuleError::NotLoaded(module.to_path_buf()))?;
        record
            .source
            .exports
            .get(export)
            .ok_or_else(|| ModuleError::UnknownTemplate {
                name: export.to_string(),
                module: module.to_path_buf(),
            })
    }
}

enum Resolved {
    Fragment,
    Export { module: PathBuf, export: String },
}

/// An export used as a template.
struct ExportTemplate<'a> {
    registry: &'a ModuleRegistry,
    module: PathBuf,
    export: String,
    depth: usize,
}

impl ExportTemplate<'_> {
    fn evaluate(&self, props: &Props) -> Result<Tag, ModuleError> {
        if self.depth > MAX_DEPTH {
            return Err(ModuleError::TooDeep {
                module: self.module.clone(),
                limit: MAX_DEPTH,
            });
        }
        let scope = Scope {
            registry: self.registry,
            module: &self.module,
            props,
            depth: self.depth,
        };
        match scope.eval(scope.export_body(&self.module, &self.export)?)? {
            Element::Tag(tag) => Ok(tag),
            other => Err(ModuleError::NotATag {
                name: self.export.clone(),
                module: self.module.clone(),
                got: other.describe(),
            }),
        }
    }
}

impl Template for ExportTemplate<'_> {
    fn name(&self) -> &str {
        &self.export
    }

    fn render(&self, props: Props) -> Result<Tag, ElementError> {
        self.evaluate(&props).map_err(|err| ElementError::Template {
            name: self.export.clone(),
            source: Box::new(err),
        })
    }
}

/// Surface the module error behind a template failure.
fn unwrap_template_error(err: ElementError) -> ModuleError {
    match err {
        ElementError::Template { name, source } => match source.downcast::<ModuleError>() {
            Ok(inner) => *inner,
            Err(source) => ModuleError::Element(ElementError::Template { name, source }),
        },
        other => ModuleError::Element(other),
    }
}

fn value_to_element(value: &Value) -> Element {
    match value {
        Value::Null | Value::Bool(_) | Value::Object(_) => Element::Empty,
        Value::Number(n) => Element::Number(n.as_f64().unwrap_or(f64::NAN)),
        Value::String(s) => Element::Text(s.clone()),
        Value::Array(items) => Element::Collection(items.iter().map(value_to_element).collect()),
    }
}
