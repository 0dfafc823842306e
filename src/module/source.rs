//! Compiled page module format.
//!
//! A module is a JSON document emitted by the template compiler:
//!
//! ```json
//! {
//!   "imports": { "Layout": "../components/layout.json" },
//!   "exports": { "page": { "body": { "component": "Layout", "children": ["Hi"] } } }
//! }
//! ```
//!
//! Node forms:
//!
//! | JSON                                          | Node          |
//! |-----------------------------------------------|---------------|
//! | `null`, `true`, `false`                       | `Empty`       |
//! | number / string / array                       | literal       |
//! | `{"tag": n, "props": {..}, "children": [..]}` | `Tag`         |
//! | `{"component": n, ...}`                       | `Component`   |
//! | `{"prop": name}`                              | `Prop`        |
//! | `{"if": v, "then": node, "else": node}`       | `If`          |

use std::collections::BTreeMap;

use rustc_hash::FxHashMap;
use serde::Deserialize;
use serde_json::{Map, Value};

/// Parsed module: import bindings and named exports.
#[derive(Debug, Clone, Default)]
pub struct ModuleSource {
    /// Local binding name → import specifier (path relative to the module).
    pub imports: BTreeMap<String, String>,
    pub exports: FxHashMap<String, Node>,
}

/// One node of an export body.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Empty,
    Number(f64),
    Text(String),
    List(Vec<Node>),
    Tag {
        name: String,
        props: Vec<(String, PropValue)>,
        children: Vec<Node>,
    },
    Component {
        name: String,
        props: Vec<(String, PropValue)>,
        children: Vec<Node>,
    },
    /// Current template prop; `children` is the child list.
    Prop(String),
    If {
        cond: PropValue,
        then: Box<Node>,
        otherwise: Box<Node>,
    },
}

/// A prop value: literal JSON or a reference to the enclosing template's prop.
#[derive(Debug, Clone, PartialEq)]
pub enum PropValue {
    Literal(Value),
    Ref(String),
}

#[derive(Deserialize)]
struct RawModule {
    #[serde(default)]
    imports: BTreeMap<String, String>,
    #[serde(default)]
    exports: Map<String, Value>,
}

#[derive(Deserialize)]
struct RawExport {
    #[serde(default)]
    body: Value,
}

impl ModuleSource {
    pub fn parse(text: &str) -> Result<Self, String> {
        let raw: RawModule = serde_json::from_str(text).map_err(|e| e.to_string())?;

        let mut exports = FxHashMap::default();
        for (name, value) in raw.exports {
            let export: RawExport = serde_json::from_value(value)
                .map_err(|e| format!("export `{name}`: {e}"))?;
            let body = Node::from_json(&export.body).map_err(|e| format!("export `{name}`: {e}"))?;
            exports.insert(name, body);
        }

        Ok(Self {
            imports: raw.imports,
            exports,
        })
    }
}

impl Node {
    pub fn from_json(value: &Value) -> Result<Self, String> {
        Ok(match value {
            Value::Null | Value::Bool(_) => Self::Empty,
            Value::Number(n) => Self::Number(n.as_f64().unwrap_or(f64::NAN)),
            Value::String(s) => Self::Text(s.clone()),
            Value::Array(items) => Self::List(
                items
                    .iter()
                    .map(Self::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(obj) => Self::from_object(obj)?,
        })
    }

    fn from_object(obj: &Map<String, Value>) -> Result<Self, String> {
        if let Some(name) = obj.get("tag") {
            let (props, children) = props_and_children(obj)?;
            return Ok(Self::Tag {
                name: expect_str(name, "tag")?,
                props,
                children,
            });
        }
        if let Some(name) = obj.get("component") {
            let (props, children) = props_and_children(obj)?;
            return Ok(Self::Component {
                name: expect_str(name, "component")?,
                props,
                children,
            });
        }
        if let Some(name) = obj.get("prop") {
            return Ok(Self::Prop(expect_str(name, "prop")?));
        }
        if let Some(cond) = obj.get("if") {
            let branch = |key: &str| obj.get(key).map_or(Ok(Self::Empty), Self::from_json);
            return Ok(Self::If {
                cond: PropValue::from_json(cond),
                then: Box::new(branch("then")?),
                otherwise: Box::new(branch("else")?),
            });
        }

        let keys: Vec<_> = obj.keys().map(String::as_str).collect();
        Err(format!("unrecognized node with keys {keys:?}"))
    }
}

impl PropValue {
    fn from_json(value: &Value) -> Self {
        match value {
            Value::Object(obj) if obj.len() == 1 => match obj.get("prop") {
                Some(Value::String(name)) => Self::Ref(name.clone()),
                _ => Self::Literal(value.clone()),
            },
            _ => Self::Literal(value.clone()),
        }
    }
}

type PropsAndChildren = (Vec<(String, PropValue)>, Vec<Node>);

fn props_and_children(obj: &Map<String, Value>) -> Result<PropsAndChildren, String> {
    let props = match obj.get("props") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(k, v)| (k.clone(), PropValue::from_json(v)))
            .collect(),
        Some(other) => return Err(format!("`props` must be an object, got {other}")),
    };
    let children = match obj.get("children") {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .map(Node::from_json)
            .collect::<Result<_, _>>()?,
        Some(single) => vec![Node::from_json(single)?],
    };
    Ok((props, children))
}

fn expect_str(value: &Value, key: &str) -> Result<String, String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| format!("`{key}` must be a string, got {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_module() {
        let source = ModuleSource::parse(
            r#"{
                "imports": {"Layout": "./layout.json"},
                "exports": {"page": {"body": {"component": "Layout", "children": ["Hi"]}}}
            }"#,
        )
        .unwrap();
        assert_eq!(source.imports.get("Layout").map(String::as_str), Some("./layout.json"));
        assert_eq!(
            source.exports.get("page"),
            Some(&Node::Component {
                name: "Layout".into(),
                props: vec![],
                children: vec![Node::Text("Hi".into())],
            })
        );
    }

    #[test]
    fn test_parse_empty_module() {
        let source = ModuleSource::parse("{}").unwrap();
        assert!(source.imports.is_empty());
        assert!(source.exports.is_empty());
    }

    #[test]
    fn test_parse_rejects_bad_json() {
        assert!(ModuleSource::parse("{ not json").is_err());
        assert!(ModuleSource::parse(r#"{"exports": {"page": {"body": {"what": 1}}}}"#).is_err());
    }

    #[test]
    fn test_node_forms() {
        assert_eq!(Node::from_json(&json!(null)).unwrap(), Node::Empty);
        assert_eq!(Node::from_json(&json!(true)).unwrap(), Node::Empty);
        assert_eq!(Node::from_json(&json!(2)).unwrap(), Node::Number(2.0));
        assert_eq!(
            Node::from_json(&json!({"prop": "title"})).unwrap(),
            Node::Prop("title".into())
        );
        assert_eq!(
            Node::from_json(&json!({"if": {"prop": "show"}, "then": "yes"})).unwrap(),
            Node::If {
                cond: PropValue::Ref("show".into()),
                then: Box::new(Node::Text("yes".into())),
                otherwise: Box::new(Node::Empty),
            }
        );
    }

    #[test]
    fn test_tag_props_keep_order_and_refs() {
        let node = Node::from_json(&json!({
            "tag": "a",
            "props": {"href": {"prop": "to"}, "class": "nav", "data-x": {"__html": "y"}},
            "children": "text"
        }))
        .unwrap();
        let Node::Tag { name, props, children } = node else {
            panic!("expected tag");
        };
        assert_eq!(name, "a");
        assert_eq!(props[0], ("href".into(), PropValue::Ref("to".into())));
        assert_eq!(props[1], ("class".into(), PropValue::Literal(json!("nav"))));
        assert_eq!(props[2].1, PropValue::Literal(json!({"__html": "y"})));
        assert_eq!(children, vec![Node::Text("text".into())]);
    }
}
