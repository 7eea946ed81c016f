//! Element tree rendering
//!
//! Resolves component elements by calling them with their props until only
//! host elements and text remain, then serializes the result to HTML the
//! way server-side React output looks.

use std::fmt::Write;

use crate::builtins::component_props;
use crate::error::{ScriptError, ScriptResult};
use crate::interpreter::Interpreter;
use crate::value::{ElementKind, Properties, Value, format_number};

/// Rendered host tree
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<Node>,
    },
    Text(String),
}

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

const BOOLEAN_ATTRIBUTES: &[&str] = &[
    "allowfullscreen",
    "autofocus",
    "autoplay",
    "checked",
    "controls",
    "default",
    "defer",
    "disabled",
    "hidden",
    "loop",
    "multiple",
    "muted",
    "novalidate",
    "open",
    "readonly",
    "required",
    "reversed",
    "selected",
];

/// Style properties whose numeric values take no `px` suffix
const UNITLESS: &[&str] = &[
    "animationIterationCount",
    "aspectRatio",
    "columnCount",
    "flex",
    "flexGrow",
    "flexShrink",
    "fontWeight",
    "gridColumn",
    "gridRow",
    "lineClamp",
    "lineHeight",
    "opacity",
    "order",
    "orphans",
    "tabSize",
    "widows",
    "zIndex",
    "zoom",
];

/// Render a value into host nodes, calling components as needed
pub fn render(interp: &mut Interpreter, value: &Value) -> ScriptResult<Vec<Node>> {
    let mut out = Vec::new();
    render_into(interp, value, &mut out)?;
    Ok(out)
}

/// Render a value straight to an HTML string
pub fn render_to_string(interp: &mut Interpreter, value: &Value) -> ScriptResult<String> {
    Ok(to_html(&render(interp, value)?))
}

fn push_text(out: &mut Vec<Node>, text: &str) {
    if let Some(Node::Text(previous)) = out.last_mut() {
        previous.push_str(text);
    } else {
        out.push(Node::Text(text.to_string()));
    }
}

fn render_into(interp: &mut Interpreter, value: &Value, out: &mut Vec<Node>) -> ScriptResult<()> {
    match value {
        Value::Undefined | Value::Null | Value::Bool(_) => Ok(()),
        Value::Number(n) => {
            push_text(out, &format_number(*n));
            Ok(())
        }
        Value::String(s) => {
            if !s.is_empty() {
                push_text(out, s);
            }
            Ok(())
        }
        Value::Array(items) => {
            for item in items.iter() {
                render_into(interp, item, out)?;
            }
            Ok(())
        }
        // Functions as children render nothing
        Value::Function(_) | Value::Native(_) => Ok(()),
        Value::Object(properties) => Err(ScriptError::type_error(format!(
            "Objects are not valid as a React child (found: object with keys {{{}}}). If you meant to render a collection of children, use an array instead.",
            properties.keys().cloned().collect::<Vec<_>>().join(", ")
        ))),
        Value::Namespace(_) => Err(ScriptError::type_error(
            "Objects are not valid as a React child (found: [object Module])",
        )),
        Value::Element(element) => match &element.kind {
            ElementKind::Fragment => {
                for child in &element.children {
                    render_into(interp, child, out)?;
                }
                Ok(())
            }
            ElementKind::Component(component) => {
                if !component.is_callable() {
                    return Err(ScriptError::type_error(format!(
                        "Element type is invalid: expected a string (for built-in components) or a class/function (for composite components) but got: {}.",
                        component.type_of()
                    )));
                }
                let props = component_props(&element.props, &element.children);
                interp.enter()?;
                let result = interp
                    .call(component, &[Value::object(props)])
                    .and_then(|rendered| render_into(interp, &rendered, out));
                interp.leave();
                result
            }
            ElementKind::Host(tag) => {
                let attributes = host_attributes(&element.props);
                let mut children = Vec::new();
                if element.children.is_empty() {
                    if let Some(content) = element.props.get("children") {
                        render_into(interp, content, &mut children)?;
                    }
                } else {
                    for child in &element.children {
                        render_into(interp, child, &mut children)?;
                    }
                }
                out.push(Node::Element {
                    tag: tag.clone(),
                    attributes,
                    children,
                });
                Ok(())
            }
        },
    }
}

fn attribute_name(prop: &str) -> String {
    match prop {
        "className" => "class".to_string(),
        "htmlFor" => "for".to_string(),
        "tabIndex" => "tabindex".to_string(),
        "readOnly" => "readonly".to_string(),
        "autoFocus" => "autofocus".to_string(),
        "autoComplete" => "autocomplete".to_string(),
        "maxLength" => "maxlength".to_string(),
        "minLength" => "minlength".to_string(),
        "colSpan" => "colspan".to_string(),
        "rowSpan" => "rowspan".to_string(),
        "crossOrigin" => "crossorigin".to_string(),
        "srcSet" => "srcset".to_string(),
        "defaultValue" => "value".to_string(),
        "defaultChecked" => "checked".to_string(),
        // SVG presentation attributes are kebab-case in markup
        "strokeWidth" | "strokeLinecap" | "strokeLinejoin" | "strokeDasharray" | "fillRule"
        | "clipRule" | "fillOpacity" | "strokeOpacity" | "stopColor" | "textAnchor" => {
            kebab_case(prop)
        }
        other => other.to_string(),
    }
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for (index, c) in name.chars().enumerate() {
        if c.is_ascii_uppercase() {
            if index > 0 {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    if name.starts_with("Webkit") || name.starts_with("Moz") || name.starts_with("ms") {
        out.insert(0, '-');
    }
    out
}

fn style_value(key: &str, value: &Value) -> Option<String> {
    match value {
        Value::Undefined | Value::Null | Value::Bool(_) => None,
        Value::String(s) if s.is_empty() => None,
        Value::Number(n) if *n != 0.0 && !UNITLESS.contains(&key) && !key.starts_with("--") => {
            Some(format!("{}px", format_number(*n)))
        }
        other => Some(other.to_display_string().trim().to_string()),
    }
}

fn style_attribute(style: &Properties) -> String {
    style
        .iter()
        .filter_map(|(key, value)| {
            let name = if key.starts_with("--") {
                key.clone()
            } else {
                kebab_case(key)
            };
            style_value(key, value).map(|value| format!("{}:{}", name, value))
        })
        .collect::<Vec<_>>()
        .join(";")
}

fn is_event_handler(name: &str) -> bool {
    name.len() > 2
        && name.starts_with("on")
        && name[2..].starts_with(|c: char| c.is_ascii_uppercase())
}

fn host_attributes(props: &Properties) -> Vec<(String, String)> {
    let mut attributes = Vec::new();
    for (prop, value) in props {
        if matches!(
            prop.as_str(),
            "children" | "key" | "ref" | "dangerouslySetInnerHTML" | "suppressHydrationWarning"
        ) || is_event_handler(prop)
        {
            continue;
        }
        let name = attribute_name(prop);
        let data_like = name.starts_with("data-") || name.starts_with("aria-");
        let rendered = match value {
            Value::Undefined | Value::Null | Value::Function(_) | Value::Native(_) => None,
            Value::Object(style) if name == "style" => {
                let css = style_attribute(style);
                (!css.is_empty()).then_some(css)
            }
            Value::Bool(flag) if data_like => Some(flag.to_string()),
            Value::Bool(true) if BOOLEAN_ATTRIBUTES.contains(&name.to_ascii_lowercase().as_str()) => {
                Some(String::new())
            }
            Value::Bool(_) => None,
            other => Some(other.to_display_string()),
        };
        if let Some(rendered) = rendered {
            attributes.push((name, rendered));
        }
    }
    attributes
}

fn escape_into(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            other => out.push(other),
        }
    }
}

/// Serialize host nodes to HTML
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        write_node(&mut out, node);
    }
    out
}

fn write_node(out: &mut String, node: &Node) {
    match node {
        Node::Text(text) => escape_into(out, text),
        Node::Element {
            tag,
            attributes,
            children,
        } => {
            let _ = write!(out, "<{}", tag);
            for (name, value) in attributes {
                let _ = write!(out, " {}=\"", name);
                escape_into(out, value);
                out.push('"');
            }
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in children {
                write_node(out, child);
            }
            let _ = write!(out, "</{}>", tag);
        }
    }
}

/// Concatenated text content of a node list
pub fn text_content(nodes: &[Node]) -> String {
    let mut out = String::new();
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Element { children, .. } => out.push_str(&text_content(children)),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interpreter::eval_source;

    fn html(source: &str) -> ScriptResult<String> {
        let mut interp = Interpreter::new();
        let value = eval_source(&mut interp, source)?;
        render_to_string(&mut interp, &value)
    }

    #[test]
    fn test_host_attributes() {
        let out = html(
            r#"<label htmlFor="name" className="field" onClick={() => 1} data-open={false} hidden>
                 <input disabled={false} readOnly value={3} />
               </label>"#,
        )
        .unwrap();
        assert_eq!(
            out,
            r#"<label for="name" class="field" data-open="false" hidden=""><input readonly="" value="3"/></label>"#
        );
    }

    #[test]
    fn test_style_objects() {
        let out = html(r#"<div style={{ marginTop: 8, opacity: 0.5, backgroundColor: "red", zIndex: 2, padding: 0 }} />"#)
            .unwrap();
        assert_eq!(
            out,
            r#"<div style="margin-top:8px;opacity:0.5;background-color:red;z-index:2;padding:0"></div>"#
        );
    }

    #[test]
    fn test_children_and_text_merging() {
        let out = html(r#"<p>{"a"}{1}{null}{false}{[<b key="x">c</b>, "d"]} &lt;</p>"#).unwrap();
        assert_eq!(out, "<p>a1<b>c</b>d &lt;</p>");
    }

    #[test]
    fn test_components_receive_props() {
        let out = html(
            r#"((Badge) => <Badge tone="info">new</Badge>)(({ tone, children }) => <span className={`badge-${tone}`}>{children}</span>)"#,
        )
        .unwrap();
        assert_eq!(out, r#"<span class="badge-info">new</span>"#);
    }

    #[test]
    fn test_invalid_element_type() {
        let err = html("((Missing) => <Missing />)(undefined)").unwrap_err();
        assert!(err.to_string().contains("Element type is invalid"));
    }

    #[test]
    fn test_object_child_is_rejected() {
        let err = html("<div>{{ a: 1 }}</div>").unwrap_err();
        assert!(err.to_string().contains("Objects are not valid as a React child"));
    }
}
