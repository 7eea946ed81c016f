//! Component kits served by the loader-based target registries
//!
//! Components are native functions from props to host elements. They mirror
//! the markup and class names of the real libraries closely enough for a
//! static preview; state never changes and effects never run.

use std::sync::Arc;

use indexmap::IndexMap;
use mirage_script::builtins::own_entries;
use mirage_script::{ElementKind, ModuleNamespace, Properties, ScriptResult, Value};

fn props_arg(args: &[Value]) -> Properties {
    match args.first() {
        Some(Value::Object(props)) => (**props).clone(),
        _ => Properties::new(),
    }
}

fn string_prop(props: &Properties, name: &str) -> Option<String> {
    match props.get(name) {
        Some(Value::String(s)) => Some(s.to_string()),
        Some(Value::Number(_)) => props.get(name).map(Value::to_display_string),
        _ => None,
    }
}

fn flag(props: &Properties, name: &str) -> bool {
    props.get(name).is_some_and(Value::is_truthy)
}

fn host(tag: &str, props: Properties, children: Vec<Value>) -> Value {
    Value::element(ElementKind::Host(tag.to_string()), props, children)
}

fn text(s: impl Into<Arc<str>>) -> Value {
    Value::string(s)
}

/// Forward `props` to a host element, dropping `consumed` props and
/// prepending `classes` to any caller `className`.
fn forward(props: &Properties, classes: Vec<String>, consumed: &[&str]) -> Properties {
    let mut class_list = classes;
    if let Some(extra) = string_prop(props, "className") {
        class_list.push(extra);
    }
    class_list.retain(|class| !class.is_empty());

    let mut out = Properties::new();
    if !class_list.is_empty() {
        out.insert("className".to_string(), text(class_list.join(" ")));
    }
    for (key, value) in props {
        if key == "className" || key == "component" || key == "sx" || consumed.contains(&key.as_str()) {
            continue;
        }
        out.insert(key.clone(), value.clone());
    }
    out
}

fn namespace(exports: Vec<(&str, Value)>) -> Arc<ModuleNamespace> {
    let exports: IndexMap<String, Value> = exports
        .into_iter()
        .map(|(name, value)| (name.to_string(), value))
        .collect();
    Arc::new(ModuleNamespace::with_exports(exports))
}

fn kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    let mut previous_lower = false;
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            if previous_lower {
                out.push('-');
            }
            out.push(c.to_ascii_lowercase());
            previous_lower = false;
        } else {
            out.push(c);
            previous_lower = c.is_ascii_lowercase() || c.is_ascii_digit();
        }
    }
    out
}

fn is_component_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric())
}

// -------------------------------------------------------------------------
// react
// -------------------------------------------------------------------------

fn create_element(args: &[Value]) -> Value {
    let kind = match args.first() {
        Some(Value::String(tag)) => ElementKind::Host(tag.to_string()),
        Some(component) => ElementKind::Component(component.clone()),
        None => ElementKind::Component(Value::Undefined),
    };
    let props = match args.get(1) {
        Some(Value::Object(props)) => (**props).clone(),
        _ => Properties::new(),
    };
    let children = args.iter().skip(2).cloned().collect();
    Value::element(kind, props, children)
}

fn use_state(interp: &mut mirage_script::Interpreter, args: &[Value]) -> ScriptResult<Value> {
    let initial = match args.first() {
        Some(init) if init.is_callable() => interp.call(init, &[])?,
        Some(init) => init.clone(),
        None => Value::Undefined,
    };
    Ok(Value::array(vec![initial, Value::native("setState", |_, _| Ok(Value::Undefined))]))
}

/// `react` with single-pass hook semantics
pub fn react() -> Arc<ModuleNamespace> {
    let members: Vec<(&str, Value)> = vec![
        (
            "Fragment",
            Value::native("Fragment", |_, args| {
                Ok(props_arg(args).get("children").cloned().unwrap_or_default())
            }),
        ),
        (
            "createElement",
            Value::native("createElement", |_, args| Ok(create_element(args))),
        ),
        ("useState", Value::native("useState", use_state)),
        (
            "useReducer",
            Value::native("useReducer", |interp, args| {
                let initial = match (args.get(1), args.get(2)) {
                    (Some(arg), Some(init)) if init.is_callable() => {
                        interp.call(init, std::slice::from_ref(arg))?
                    }
                    (Some(arg), _) => arg.clone(),
                    (None, _) => Value::Undefined,
                };
                Ok(Value::array(vec![initial, Value::native("dispatch", |_, _| Ok(Value::Undefined))]))
            }),
        ),
        ("useEffect", Value::native("useEffect", |_, _| Ok(Value::Undefined))),
        ("useLayoutEffect", Value::native("useLayoutEffect", |_, _| Ok(Value::Undefined))),
        (
            "useMemo",
            Value::native("useMemo", |interp, args| match args.first() {
                Some(factory) => interp.call(factory, &[]),
                None => Ok(Value::Undefined),
            }),
        ),
        (
            "useCallback",
            Value::native("useCallback", |_, args| Ok(args.first().cloned().unwrap_or_default())),
        ),
        (
            "useRef",
            Value::native("useRef", |_, args| {
                let mut props = Properties::new();
                props.insert("current".to_string(), args.first().cloned().unwrap_or_default());
                Ok(Value::object(props))
            }),
        ),
        (
            "useId",
            Value::native("useId", |interp, _| Ok(text(format!(":r{}:", interp.depth())))),
        ),
    ];
    let mut exports: IndexMap<String, Value> = members
        .iter()
        .map(|(name, value)| (name.to_string(), value.clone()))
        .collect();
    let default = Value::object(exports.clone());
    exports.insert("default".to_string(), default);
    Arc::new(ModuleNamespace::with_exports(exports))
}

// -------------------------------------------------------------------------
// @mui/material
// -------------------------------------------------------------------------

/// Props a Material component interprets instead of forwarding
const MUI_PROPS: &[&str] = &[
    "variant",
    "color",
    "size",
    "elevation",
    "gutterBottom",
    "fullWidth",
    "disableElevation",
    "maxWidth",
    "position",
    "spacing",
    "direction",
    "container",
    "item",
    "xs",
    "sm",
    "md",
    "lg",
    "xl",
    "severity",
    "label",
    "primary",
    "secondary",
    "dense",
    "divider",
    "square",
    "startIcon",
    "endIcon",
    "edge",
    "alignItems",
    "justifyContent",
    "helperText",
];

fn mui_classes(name: &str, props: &Properties) -> Vec<String> {
    let mut classes = vec![format!("Mui{}-root", name)];
    for modifier in ["variant", "color", "size", "position", "severity"] {
        if let Some(value) = string_prop(props, modifier) {
            classes.push(format!("Mui{}-{}", name, value));
        }
    }
    if let Some(Value::Number(elevation)) = props.get("elevation") {
        classes.push(format!("MuiPaper-elevation{}", elevation));
    }
    if flag(props, "fullWidth") {
        classes.push(format!("Mui{}-fullWidth", name));
    }
    if flag(props, "gutterBottom") {
        classes.push(format!("Mui{}-gutterBottom", name));
    }
    classes
}

/// Material component rendered as a single host element
fn mui(name: &'static str, tag: &'static str) -> Value {
    Value::native(name, move |_, args| {
        let props = props_arg(args);
        let tag = string_prop(&props, "component").unwrap_or_else(|| tag.to_string());
        let mut forwarded = forward(&props, mui_classes(name, &props), MUI_PROPS);
        if matches!(name, "Button" | "IconButton") && !forwarded.contains_key("type") {
            forwarded.insert("type".to_string(), text("button"));
        }
        let mut children = Vec::new();
        if let Some(icon) = props.get("startIcon") {
            children.push(icon.clone());
        }
        if !children.is_empty() || props.contains_key("endIcon") {
            children.push(forwarded.shift_remove("children").unwrap_or_default());
            children.extend(props.get("endIcon").cloned());
        }
        Ok(host(&tag, forwarded, children))
    })
}

fn typography() -> Value {
    Value::native("Typography", |_, args| {
        let props = props_arg(args);
        let variant = string_prop(&props, "variant").unwrap_or_else(|| "body1".to_string());
        let tag = string_prop(&props, "component").unwrap_or_else(|| {
            match variant.as_str() {
                "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => variant.clone(),
                "subtitle1" | "subtitle2" => "h6".to_string(),
                "caption" | "overline" | "button" => "span".to_string(),
                _ => "p".to_string(),
            }
        });
        let mut classes = mui_classes("Typography", &props);
        if !props.contains_key("variant") {
            classes.push("MuiTypography-body1".to_string());
        }
        Ok(host(&tag, forward(&props, classes, MUI_PROPS), Vec::new()))
    })
}

fn stack() -> Value {
    Value::native("Stack", |_, args| {
        let props = props_arg(args);
        let mut forwarded = forward(&props, vec!["MuiStack-root".to_string()], MUI_PROPS);
        if !forwarded.contains_key("style") {
            let mut style = Properties::new();
            style.insert("display".to_string(), text("flex"));
            let direction = string_prop(&props, "direction").unwrap_or_else(|| "column".to_string());
            style.insert("flexDirection".to_string(), text(direction));
            if let Some(Value::Number(spacing)) = props.get("spacing") {
                style.insert("gap".to_string(), Value::Number(spacing * 8.0));
            }
            for key in ["alignItems", "justifyContent"] {
                if let Some(value) = props.get(key) {
                    style.insert(key.to_string(), value.clone());
                }
            }
            forwarded.insert("style".to_string(), Value::object(style));
        }
        Ok(host("div", forwarded, Vec::new()))
    })
}

fn grid() -> Value {
    Value::native("Grid", |_, args| {
        let props = props_arg(args);
        let mut classes = vec!["MuiGrid-root".to_string()];
        if flag(&props, "container") {
            classes.push("MuiGrid-container".to_string());
        }
        if flag(&props, "item") {
            classes.push("MuiGrid-item".to_string());
        }
        for breakpoint in ["xs", "sm", "md", "lg", "xl"] {
            if let Some(size) = string_prop(&props, breakpoint) {
                classes.push(format!("MuiGrid-grid-{}-{}", breakpoint, size));
            }
        }
        Ok(host("div", forward(&props, classes, MUI_PROPS), Vec::new()))
    })
}

fn text_field() -> Value {
    Value::native("TextField", |_, args| {
        let props = props_arg(args);
        let mut children = Vec::new();
        if let Some(label) = props.get("label") {
            let mut label_props = Properties::new();
            label_props.insert("className".to_string(), text("MuiInputLabel-root"));
            if let Some(id) = props.get("id") {
                label_props.insert("htmlFor".to_string(), id.clone());
            }
            children.push(host("label", label_props, vec![label.clone()]));
        }
        let mut input_props = Properties::new();
        input_props.insert("className".to_string(), text("MuiInputBase-input"));
        for (key, value) in &props {
            if matches!(
                key.as_str(),
                "id" | "name" | "type" | "value" | "defaultValue" | "placeholder" | "disabled" | "required"
            ) {
                input_props.insert(key.clone(), value.clone());
            }
        }
        let multiline = flag(&props, "multiline");
        children.push(host(if multiline { "textarea" } else { "input" }, input_props, Vec::new()));
        if let Some(helper) = props.get("helperText") {
            let mut helper_props = Properties::new();
            helper_props.insert("className".to_string(), text("MuiFormHelperText-root"));
            children.push(host("p", helper_props, vec![helper.clone()]));
        }
        let mut root = Properties::new();
        root.insert(
            "className".to_string(),
            text(
                mui_classes("TextField", &props)
                    .into_iter()
                    .chain(string_prop(&props, "className"))
                    .collect::<Vec<_>>()
                    .join(" "),
            ),
        );
        Ok(host("div", root, children))
    })
}

fn chip() -> Value {
    Value::native("Chip", |_, args| {
        let props = props_arg(args);
        let mut label_props = Properties::new();
        label_props.insert("className".to_string(), text("MuiChip-label"));
        let label = host("span", label_props, vec![props.get("label").cloned().unwrap_or_default()]);
        let mut forwarded = forward(&props, mui_classes("Chip", &props), MUI_PROPS);
        forwarded.shift_remove("children");
        let children = props.get("icon").cloned().into_iter().chain([label]).collect();
        forwarded.shift_remove("icon");
        Ok(host("div", forwarded, children))
    })
}

fn list_item_text() -> Value {
    Value::native("ListItemText", |_, args| {
        let props = props_arg(args);
        let mut children = Vec::new();
        if let Some(primary) = props.get("primary").or_else(|| props.get("children")) {
            let mut primary_props = Properties::new();
            primary_props.insert("className".to_string(), text("MuiTypography-root MuiTypography-body1"));
            children.push(host("span", primary_props, vec![primary.clone()]));
        }
        if let Some(secondary) = props.get("secondary") {
            let mut secondary_props = Properties::new();
            secondary_props.insert("className".to_string(), text("MuiTypography-root MuiTypography-body2"));
            children.push(host("p", secondary_props, vec![secondary.clone()]));
        }
        let mut forwarded = forward(&props, vec!["MuiListItemText-root".to_string()], MUI_PROPS);
        forwarded.shift_remove("children");
        Ok(host("div", forwarded, children))
    })
}

fn alert() -> Value {
    Value::native("Alert", |_, args| {
        let props = props_arg(args);
        let severity = string_prop(&props, "severity").unwrap_or_else(|| "success".to_string());
        let mut classes = mui_classes("Alert", &props);
        if !props.contains_key("severity") {
            classes.push(format!("MuiAlert-{}", severity));
        }
        let mut forwarded = forward(&props, classes, MUI_PROPS);
        forwarded.insert("role".to_string(), text("alert"));
        Ok(host("div", forwarded, Vec::new()))
    })
}

/// `@mui/material` named exports
pub fn material() -> Arc<ModuleNamespace> {
    namespace(material_components())
}

fn material_components() -> Vec<(&'static str, Value)> {
    vec![
        ("Box", mui("Box", "div")),
        ("Button", mui("Button", "button")),
        ("IconButton", mui("IconButton", "button")),
        ("Card", mui("Card", "div")),
        ("CardContent", mui("CardContent", "div")),
        ("CardActions", mui("CardActions", "div")),
        ("Paper", mui("Paper", "div")),
        ("Container", mui("Container", "div")),
        ("AppBar", mui("AppBar", "header")),
        ("Toolbar", mui("Toolbar", "div")),
        ("Avatar", mui("Avatar", "div")),
        ("Divider", mui("Divider", "hr")),
        ("List", mui("List", "ul")),
        ("ListItem", mui("ListItem", "li")),
        ("Typography", typography()),
        ("Stack", stack()),
        ("Grid", grid()),
        ("TextField", text_field()),
        ("Chip", chip()),
        ("ListItemText", list_item_text()),
        ("Alert", alert()),
    ]
}

/// `@mui/material/<Component>` sub-path modules export the component as default
pub fn material_subpath(residual: &str) -> Option<Arc<ModuleNamespace>> {
    let component = material_components()
        .into_iter()
        .find(|(name, _)| *name == residual)
        .map(|(_, value)| value)?;
    Some(namespace(vec![("default", component)]))
}

// -------------------------------------------------------------------------
// Icons
// -------------------------------------------------------------------------

fn svg_icon(name: &str, classes: String, attributes: &[(&str, &str)]) -> Value {
    let name = name.to_string();
    let attributes: Vec<(String, String)> = attributes
        .iter()
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Value::native(name.clone(), move |_, args| {
        let props = props_arg(args);
        let mut svg = Properties::new();
        for (key, value) in &attributes {
            svg.insert(key.clone(), text(value.as_str()));
        }
        if let Some(size) = props.get("size").or_else(|| props.get("fontSize"))
            && matches!(size, Value::Number(_))
        {
            svg.insert("width".to_string(), size.clone());
            svg.insert("height".to_string(), size.clone());
        }
        let forwarded = forward(&props, vec![classes.clone()], &["size", "fontSize", "strokeWidth"]);
        svg.extend(forwarded);
        if let Some(stroke) = props.get("strokeWidth") {
            svg.insert("strokeWidth".to_string(), stroke.clone());
        }
        svg.insert("data-icon".to_string(), text(name.as_str()));
        Ok(host("svg", svg, Vec::new()))
    })
}

fn mui_icon(export: &str) -> Option<Value> {
    if !is_component_name(export) {
        return None;
    }
    Some(svg_icon(
        export,
        "MuiSvgIcon-root".to_string(),
        &[("viewBox", "0 0 24 24"), ("focusable", "false"), ("aria-hidden", "true")],
    ))
}

/// `@mui/icons-material`: every PascalCase name is an icon
pub fn material_icons() -> Arc<ModuleNamespace> {
    Arc::new(ModuleNamespace::with_fallback(IndexMap::new(), Arc::new(mui_icon)))
}

/// `@mui/icons-material/<Icon>`
pub fn material_icon_subpath(residual: &str) -> Option<Arc<ModuleNamespace>> {
    Some(namespace(vec![("default", mui_icon(residual)?)]))
}

fn lucide_icon(export: &str) -> Option<Value> {
    if !is_component_name(export) {
        return None;
    }
    let base = export.strip_suffix("Icon").filter(|base| !base.is_empty()).unwrap_or(export);
    Some(svg_icon(
        export,
        format!("lucide lucide-{}", kebab_case(base)),
        &[
            ("xmlns", "http://www.w3.org/2000/svg"),
            ("width", "24"),
            ("height", "24"),
            ("viewBox", "0 0 24 24"),
            ("fill", "none"),
            ("stroke", "currentColor"),
            ("strokeWidth", "2"),
            ("strokeLinecap", "round"),
            ("strokeLinejoin", "round"),
        ],
    ))
}

/// `lucide-react`: every PascalCase name is an icon
pub fn lucide() -> Arc<ModuleNamespace> {
    Arc::new(ModuleNamespace::with_fallback(IndexMap::new(), Arc::new(lucide_icon)))
}

// -------------------------------------------------------------------------
// Tailwind (shadcn/ui)
// -------------------------------------------------------------------------

fn collect_classes(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) if !s.is_empty() => out.push(s.to_string()),
        Value::Number(n) if *n != 0.0 && !n.is_nan() => out.push(value.to_display_string()),
        Value::Array(items) => {
            for item in items.iter() {
                collect_classes(item, out);
            }
        }
        Value::Object(_) => {
            for (key, enabled) in own_entries(value) {
                if enabled.is_truthy() {
                    out.push(key);
                }
            }
        }
        _ => {}
    }
}

/// `clsx`-style class joining
fn class_names() -> Value {
    Value::native("cn", |_, args| {
        let mut classes = Vec::new();
        for arg in args {
            collect_classes(arg, &mut classes);
        }
        Ok(text(classes.join(" ")))
    })
}

/// `@/lib/utils`
pub fn utils() -> Arc<ModuleNamespace> {
    namespace(vec![("cn", class_names())])
}

/// `clsx`
pub fn clsx() -> Arc<ModuleNamespace> {
    let function = class_names();
    namespace(vec![("clsx", function.clone()), ("default", function)])
}

fn variant_class(props: &Properties, name: &str, table: &[(&str, &str)]) -> String {
    let selected = string_prop(props, name);
    let default = table.first().map(|(_, class)| *class).unwrap_or_default();
    selected
        .and_then(|selected| {
            table
                .iter()
                .find(|(variant, _)| *variant == selected)
                .map(|(_, class)| *class)
        })
        .unwrap_or(default)
        .to_string()
}

/// shadcn/ui component rendered as one element with a fixed class list
fn ui(name: &'static str, tag: &'static str, base: &'static str) -> Value {
    Value::native(name, move |_, args| {
        let props = props_arg(args);
        Ok(host(tag, forward(&props, vec![base.to_string()], &[]), Vec::new()))
    })
}

const BUTTON_VARIANTS: &[(&str, &str)] = &[
    ("default", "bg-primary text-primary-foreground hover:bg-primary/90"),
    ("destructive", "bg-destructive text-destructive-foreground hover:bg-destructive/90"),
    ("outline", "border border-input bg-background hover:bg-accent hover:text-accent-foreground"),
    ("secondary", "bg-secondary text-secondary-foreground hover:bg-secondary/80"),
    ("ghost", "hover:bg-accent hover:text-accent-foreground"),
    ("link", "text-primary underline-offset-4 hover:underline"),
];

const BUTTON_SIZES: &[(&str, &str)] = &[
    ("default", "h-10 px-4 py-2"),
    ("sm", "h-9 rounded-md px-3"),
    ("lg", "h-11 rounded-md px-8"),
    ("icon", "h-10 w-10"),
];

const BADGE_VARIANTS: &[(&str, &str)] = &[
    ("default", "border-transparent bg-primary text-primary-foreground"),
    ("secondary", "border-transparent bg-secondary text-secondary-foreground"),
    ("destructive", "border-transparent bg-destructive text-destructive-foreground"),
    ("outline", "text-foreground"),
];

fn ui_button() -> Value {
    Value::native("Button", |_, args| {
        let props = props_arg(args);
        let classes = vec![
            "inline-flex items-center justify-center gap-2 rounded-md text-sm font-medium".to_string(),
            variant_class(&props, "variant", BUTTON_VARIANTS),
            variant_class(&props, "size", BUTTON_SIZES),
        ];
        let mut forwarded = forward(&props, classes, &["variant", "size", "asChild"]);
        if !forwarded.contains_key("type") {
            forwarded.insert("type".to_string(), text("button"));
        }
        Ok(host("button", forwarded, Vec::new()))
    })
}

fn ui_badge() -> Value {
    Value::native("Badge", |_, args| {
        let props = props_arg(args);
        let classes = vec![
            "inline-flex items-center rounded-full border px-2.5 py-0.5 text-xs font-semibold".to_string(),
            variant_class(&props, "variant", BADGE_VARIANTS),
        ];
        Ok(host("div", forward(&props, classes, &["variant"]), Vec::new()))
    })
}

fn ui_separator() -> Value {
    Value::native("Separator", |_, args| {
        let props = props_arg(args);
        let vertical = string_prop(&props, "orientation").as_deref() == Some("vertical");
        let class = if vertical { "h-full w-[1px]" } else { "h-[1px] w-full" };
        let mut forwarded = forward(
            &props,
            vec!["shrink-0 bg-border".to_string(), class.to_string()],
            &["orientation", "decorative"],
        );
        forwarded.insert("role".to_string(), text("none"));
        Ok(host("div", forwarded, Vec::new()))
    })
}

/// `@/components/ui/<name>` modules
pub fn shadcn(residual: &str) -> Option<Arc<ModuleNamespace>> {
    let exports = match residual {
        "button" => vec![("Button", ui_button())],
        "card" => vec![
            ("Card", ui("Card", "div", "rounded-lg border bg-card text-card-foreground shadow-sm")),
            ("CardHeader", ui("CardHeader", "div", "flex flex-col space-y-1.5 p-6")),
            ("CardTitle", ui("CardTitle", "h3", "text-2xl font-semibold leading-none tracking-tight")),
            ("CardDescription", ui("CardDescription", "p", "text-sm text-muted-foreground")),
            ("CardContent", ui("CardContent", "div", "p-6 pt-0")),
            ("CardFooter", ui("CardFooter", "div", "flex items-center p-6 pt-0")),
        ],
        "input" => vec![(
            "Input",
            ui(
                "Input",
                "input",
                "flex h-10 w-full rounded-md border border-input bg-background px-3 py-2 text-sm",
            ),
        )],
        "badge" => vec![("Badge", ui_badge())],
        "label" => vec![(
            "Label",
            ui("Label", "label", "text-sm font-medium leading-none"),
        )],
        "separator" => vec![("Separator", ui_separator())],
        _ => return None,
    };
    Some(namespace(exports))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kebab_case() {
        assert_eq!(kebab_case("ArrowRight"), "arrow-right");
        assert_eq!(kebab_case("Building2"), "building2");
        assert_eq!(kebab_case("CircleHelp"), "circle-help");
    }

    #[test]
    fn test_icon_names() {
        assert!(lucide_icon("Search").is_some());
        assert!(lucide_icon("SearchIcon").is_some());
        assert!(lucide_icon("search").is_none());
        assert!(lucide_icon("Foo-Bar").is_none());
        assert!(material_icon_subpath("Delete").is_some());
        assert!(material_icon_subpath("index.js").is_none());
    }

    #[test]
    fn test_shadcn_modules() {
        assert!(shadcn("card").unwrap().has("CardTitle"));
        assert!(shadcn("dialog").is_none());
    }

    #[test]
    fn test_material_subpath() {
        assert!(material_subpath("Button").unwrap().has("default"));
        assert!(material_subpath("NotAComponent").is_none());
    }
}
