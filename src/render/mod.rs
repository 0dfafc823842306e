//! HTML serializer.
//!
//! [`render_page`] validates the root and produces a full document;
//! [`render_element`] serializes any element tree and never fails.
//!
//! Void elements get an end tag like every other tag (`<br></br>`).

mod escape;

pub use escape::{escape_attr, escape_text};

use thiserror::Error;

use crate::element::{AttrValue, Element, Tag};

const DOCTYPE: &str = "<!DOCTYPE html>";

/// Errors for a page root that is not an `<html>` tag.
#[derive(Debug, Error, PartialEq)]
pub enum RenderError {
    #[error("root page element cannot be null")]
    NullRoot,

    #[error("root page element must be a valid HTML element, got {0}")]
    NotATag(String),

    #[error("attempted to render page with non-HTML root element {0}")]
    NonHtmlRoot(String),
}

/// Render a complete HTML document from its root element.
///
/// The root must be a tag named `html` (any case).
pub fn render_page(root: &Element) -> Result<String, RenderError> {
    let tag = match root {
        Element::Empty => return Err(RenderError::NullRoot),
        Element::Tag(tag) => tag,
        other => return Err(RenderError::NotATag(other.describe())),
    };
    if !tag.name.eq_ignore_ascii_case("html") {
        return Err(RenderError::NonHtmlRoot(tag.name.clone()));
    }

    let mut out = String::from(DOCTYPE);
    write_tag(&mut out, tag);
    Ok(out)
}

/// Serialize an element tree to HTML.
pub fn render_element(elem: &Element) -> String {
    let mut out = String::new();
    write_element(&mut out, elem);
    out
}

/// Format a number the way a browser prints it: no trailing `.0`, `-0` as
/// `0`, `NaN`/`Infinity`/`-Infinity` for non-finite values, and exponent
/// notation (`1e+21`, `1e-7`) outside `1e-7 < |n| < 1e21`.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        return "0".to_string();
    }

    // Shortest round-trip digits, e.g. `1.25e-3`.
    let sci = format!("{:e}", n.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let digits: String = mantissa.chars().filter(char::is_ascii_digit).collect();
    let k = digits.len() as i32;
    let point = exp.parse::<i32>().unwrap_or(0) + 1;

    let body = if k <= point && point <= 21 {
        format!("{digits}{}", "0".repeat((point - k) as usize))
    } else if 0 < point && point <= 21 {
        let (int, frac) = digits.split_at(point as usize);
        format!("{int}.{frac}")
    } else if -6 < point && point <= 0 {
        format!("0.{}{digits}", "0".repeat(point.unsigned_abs() as usize))
    } else {
        let e = point - 1;
        let sign = if e < 0 { '-' } else { '+' };
        let (lead, rest) = digits.split_at(1);
        if rest.is_empty() {
            format!("{lead}e{sign}{}", e.unsigned_abs())
        } else {
            format!("{lead}.{rest}e{sign}{}", e.unsigned_abs())
        }
    };

    if n < 0.0 { format!("-{body}") } else { body }
}

fn write_element(out: &mut String, elem: &Element) {
    match elem {
        Element::Empty => {}
        Element::Number(n) => out.push_str(&format_number(*n)),
        Element::Text(text) => out.push_str(&escape_text(text)),
        Element::Collection(items) => {
            for item in items {
                write_element(out, item);
            }
        }
        Element::Tag(tag) => write_tag(out, tag),
    }
}

fn write_tag(out: &mut String, tag: &Tag) {
    if !tag.is_fragment() {
        write_start_tag(out, tag);
    }

    match &tag.inner_html {
        Some(html) => out.push_str(html),
        None => {
            for child in &tag.children {
                write_element(out, child);
            }
        }
    }

    if !tag.is_fragment() {
        out.push_str("</");
        out.push_str(&escape_text(&tag.name));
        out.push('>');
    }
}

fn write_start_tag(out: &mut String, tag: &Tag) {
    out.push('<');
    out.push_str(&escape_text(&tag.name));

    for (name, value) in tag.attributes.iter() {
        if matches!(value, AttrValue::Bool(false)) {
            continue;
        }

        out.push(' ');
        out.push_str(&attribute_name(name));
        out.push_str("=\"");
        match value {
            AttrValue::Str(s) => out.push_str(&escape_attr(s)),
            AttrValue::Number(n) => out.push_str(&format_number(*n)),
            AttrValue::Bool(_) => {}
        }
        out.push('"');
    }

    out.push('>');
}

/// Lower-cased, escaped attribute name with `className` spelled `class`.
fn attribute_name(name: &str) -> String {
    let lower = escape_text(&name.to_lowercase()).into_owned();
    if lower == "classname" {
        "class".to_string()
    } else {
        lower
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{Fragment, Props, component, tag};
    use serde_json::{Map, Value, json};

    fn attrs(value: Value) -> Option<Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    fn html(children: Vec<Element>) -> Element {
        Tag {
            children,
            ..Tag::new("html")
        }
        .into()
    }

    // ------------------------------------------------------------------------
    // render_element
    // ------------------------------------------------------------------------

    #[test]
    fn test_empty_renders_nothing() {
        assert_eq!(render_element(&Element::Empty), "");
        assert_eq!(render_element(&Element::from(true)), "");
        assert_eq!(render_element(&Element::from(false)), "");
    }

    #[test]
    fn test_collection_concatenates() {
        let a: Element = "a".into();
        let b: Element = Tag::new("i").child("b").into();
        let joined = render_element(&a) + &render_element(&b);
        assert_eq!(render_element(&Element::Collection(vec![a, b])), joined);
        assert_eq!(joined, "a<i>b</i>");
    }

    #[test]
    fn test_nested_collections() {
        let tree = Element::Collection(vec![
            Element::Collection(vec![Element::Collection(vec!["x".into()])]),
            Element::Empty,
            Element::Number(1.0),
        ]);
        assert_eq!(render_element(&tree), "x1");
    }

    #[test]
    fn test_text_escaping() {
        assert_eq!(render_element(&"<b>&</b>".into()), "&lt;b&gt;&amp;&lt;/b&gt;");
        assert_eq!(render_element(&"\"quoted\"".into()), "\"quoted\"");
    }

    #[test]
    fn test_numbers() {
        assert_eq!(render_element(&Element::Number(3.0)), "3");
        assert_eq!(render_element(&Element::Number(-0.0)), "0");
        assert_eq!(render_element(&Element::Number(0.5)), "0.5");
        assert_eq!(render_element(&Element::Number(-12.25)), "-12.25");
        assert_eq!(render_element(&Element::Number(f64::NAN)), "NaN");
        assert_eq!(render_element(&Element::Number(f64::INFINITY)), "Infinity");
        assert_eq!(render_element(&Element::Number(f64::NEG_INFINITY)), "-Infinity");
    }

    #[test]
    fn test_number_exponent_thresholds() {
        assert_eq!(format_number(100.0), "100");
        assert_eq!(format_number(1.2345678901234568e20), "123456789012345680000");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(2.5e25), "2.5e+25");
        assert_eq!(format_number(-1e21), "-1e+21");
        assert_eq!(format_number(0.000001), "0.000001");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(1.5e-7), "1.5e-7");
        assert_eq!(format_number(0.1 + 0.2), "0.30000000000000004");
    }

    #[test]
    fn test_boolean_attributes() {
        let on = tag("input", attrs(json!({"disabled": true})), vec![]).unwrap();
        assert_eq!(render_element(&on.into()), "<input disabled=\"\"></input>");

        let off = tag("input", attrs(json!({"disabled": false})), vec![]).unwrap();
        assert_eq!(render_element(&off.into()), "<input></input>");
    }

    #[test]
    fn test_classname_rewrite() {
        for key in ["className", "classname", "CLASSNAME"] {
            let mut map = Map::new();
            map.insert(key.to_string(), json!("x"));
            let t = tag("div", Some(map), vec![]).unwrap();
            assert_eq!(render_element(&t.into()), "<div class=\"x\"></div>");
        }
    }

    #[test]
    fn test_attribute_names_lowercased_and_values_escaped() {
        let t = tag("a", attrs(json!({"onClick": "say(\"hi\") && <go>", "tabIndex": 2})), vec![]).unwrap();
        assert_eq!(
            render_element(&t.into()),
            "<a onclick=\"say(&quot;hi&quot;) && <go>\" tabindex=\"2\"></a>"
        );
    }

    #[test]
    fn test_tag_name_escaped() {
        let t = Tag::new("x<y");
        assert_eq!(render_element(&t.into()), "<x&lt;y></x&lt;y>");
    }

    #[test]
    fn test_fragment_renders_children_only() {
        let frag = component(&Fragment, None, vec!["a".into(), Tag::new("b").into()]).unwrap();
        let children = Element::Collection(frag.children.clone());
        assert_eq!(render_element(&frag.into()), render_element(&children));
    }

    #[test]
    fn test_fragment_ignores_attributes() {
        let frag = Tag::fragment(vec!["x".into()]).attr("id", "nope");
        assert_eq!(render_element(&frag.into()), "x");
    }

    #[test]
    fn test_void_element_gets_end_tag() {
        let img = Tag::new("img").attr("src", "/a.png");
        assert_eq!(render_element(&img.into()), "<img src=\"/a.png\"></img>");
    }

    #[test]
    fn test_inner_html_unescaped() {
        let t = tag("div", attrs(json!({"dangerouslySetInnerHTML": {"__html": "<b>&amp;</b>"}})), vec![]).unwrap();
        assert_eq!(render_element(&t.into()), "<div><b>&amp;</b></div>");
    }

    // ------------------------------------------------------------------------
    // render_page
    // ------------------------------------------------------------------------

    #[test]
    fn test_page_requires_root() {
        assert_eq!(render_page(&Element::Empty), Err(RenderError::NullRoot));
        assert_eq!(
            RenderError::NullRoot.to_string(),
            "root page element cannot be null"
        );
    }

    #[test]
    fn test_page_rejects_non_tag_root() {
        let err = render_page(&"text".into()).unwrap_err();
        assert!(matches!(err, RenderError::NotATag(_)));
        assert!(render_page(&Element::Number(1.0)).is_err());
        assert!(render_page(&Element::Collection(vec![html(vec![])])).is_err());
    }

    #[test]
    fn test_page_rejects_non_html_root() {
        let err = render_page(&Tag::new("div").into()).unwrap_err();
        assert_eq!(err, RenderError::NonHtmlRoot("div".into()));
        assert_eq!(
            err.to_string(),
            "attempted to render page with non-HTML root element div"
        );
    }

    #[test]
    fn test_page_accepts_any_case_html() {
        let page = render_page(&Tag::new("HTML").into()).unwrap();
        assert_eq!(page, "<!DOCTYPE html><HTML></HTML>");
    }

    #[test]
    fn test_page_with_attributes() {
        let div = tag("div", attrs(json!({"className": "test", "id": 1})), vec![]).unwrap();
        let page = render_page(&html(vec![div.into()])).unwrap();
        assert_eq!(
            page,
            "<!DOCTYPE html><html><div class=\"test\" id=\"1\"></div></html>"
        );
    }

    #[test]
    fn test_page_with_template_and_numbers() {
        let greeting = |props: Props| {
            Tag::new("p")
                .child("There are ")
                .child(props.get("count").and_then(Value::as_f64).unwrap_or(0.0))
                .child(" lights!")
        };
        let p = component(&greeting, attrs(json!({"count": 3})), vec![]).unwrap();
        let page = render_page(&html(vec![p.into()])).unwrap();
        assert_eq!(page, "<!DOCTYPE html><html><p>There are 3 lights!</p></html>");
    }
}
