//! Bootstrap documents for native-ESM targets
//!
//! Each target is described by a [`BootstrapDescriptor`]; [`render_bootstrap`]
//! turns a descriptor, an import map and an artifact into a standalone HTML
//! page. The page links sibling files through blob URLs, mounts the entry's
//! default export and reports `mirage:ready` or `mirage:error` to its parent
//! window.

use std::fmt::Write;

use crate::import_map::{ImportMap, PackageManifestEntry, escape_script};
use crate::share::ShareState;
use crate::targets::Target;
use crate::vfs::VirtualFileSet;

/// Stands for the CDN origin in asset paths until a document is rendered
pub const CDN_ORIGIN_PLACEHOLDER: &str = "__MIRAGE_CDN_ORIGIN__";

/// `import <clause> from "<specifier>"`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleBinding {
    pub clause: String,
    pub specifier: String,
}

impl ModuleBinding {
    pub fn new(clause: impl Into<String>, specifier: impl Into<String>) -> Self {
        Self {
            clause: clause.into(),
            specifier: specifier.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapDescriptor {
    pub target: Target,
    /// Specifier of the framework module providing `create_app`
    pub framework: String,
    pub create_app: String,
    /// Extra modules the plugin and globals need
    pub imports: Vec<ModuleBinding>,
    /// Expression passed to `app.use`
    pub plugin: Option<String>,
    /// Imported objects whose entries are registered as global components
    pub components: Vec<String>,
    /// `window` properties assigned before the entry runs
    pub globals: Vec<(String, String)>,
    /// Stylesheet URLs, usually relative to [`CDN_ORIGIN_PLACEHOLDER`]
    pub styles: Vec<String>,
    pub mount_selector: String,
    /// Packages the import map must provide
    pub packages: Vec<PackageManifestEntry>,
}

const VUE: &str = "vue@3.4.21/dist/vue.esm-browser.prod.js";

impl BootstrapDescriptor {
    /// Descriptor of a native-ESM target
    pub fn for_target(target: Target) -> Option<Self> {
        match target {
            Target::Vuetify => Some(Self::vuetify()),
            Target::ElementPlus => Some(Self::element_plus()),
            Target::Material | Target::Tailwind | Target::Html => None,
        }
    }

    pub fn vuetify() -> Self {
        Self {
            target: Target::Vuetify,
            framework: "vue".into(),
            create_app: "createApp".into(),
            imports: vec![
                ModuleBinding::new("* as Vue", "vue"),
                ModuleBinding::new("{ createVuetify }", "vuetify"),
                ModuleBinding::new("* as components", "vuetify/components"),
                ModuleBinding::new("* as directives", "vuetify/directives"),
            ],
            plugin: Some("createVuetify({ components, directives })".into()),
            components: Vec::new(),
            globals: vec![("Vue".into(), "Vue".into())],
            styles: vec![
                format!("{}/vuetify@3.5.8/dist/vuetify.min.css", CDN_ORIGIN_PLACEHOLDER),
                format!(
                    "{}/@mdi/font@7.4.47/css/materialdesignicons.min.css",
                    CDN_ORIGIN_PLACEHOLDER
                ),
            ],
            mount_selector: "#app".into(),
            packages: vec![
                PackageManifestEntry::new("vue", VUE),
                PackageManifestEntry::new("vuetify", "vuetify@3.5.8/dist/vuetify.esm.js"),
                PackageManifestEntry::new(
                    "vuetify/components",
                    "vuetify@3.5.8/lib/components/index.mjs",
                ),
                PackageManifestEntry::new(
                    "vuetify/directives",
                    "vuetify@3.5.8/lib/directives/index.mjs",
                ),
            ],
        }
    }

    pub fn element_plus() -> Self {
        Self {
            target: Target::ElementPlus,
            framework: "vue".into(),
            create_app: "createApp".into(),
            imports: vec![
                ModuleBinding::new("* as Vue", "vue"),
                ModuleBinding::new("ElementPlus", "element-plus"),
                ModuleBinding::new("* as ElementPlusIconsVue", "@element-plus/icons-vue"),
            ],
            plugin: Some("ElementPlus".into()),
            components: vec!["ElementPlusIconsVue".into()],
            globals: vec![("Vue".into(), "Vue".into())],
            styles: vec![format!(
                "{}/element-plus@2.6.1/dist/index.css",
                CDN_ORIGIN_PLACEHOLDER
            )],
            mount_selector: "#app".into(),
            packages: vec![
                PackageManifestEntry::new("vue", VUE),
                PackageManifestEntry::new("element-plus", "element-plus@2.6.1/dist/index.full.min.mjs"),
                PackageManifestEntry::new(
                    "@element-plus/icons-vue",
                    "@element-plus/icons-vue@2.3.1/dist/index.js",
                ),
            ],
        }
    }
}

/// Replace [`CDN_ORIGIN_PLACEHOLDER`] with `origin` (one trailing `/` dropped)
pub fn substitute_origin(template: &str, origin: &str) -> String {
    template.replace(
        CDN_ORIGIN_PLACEHOLDER,
        origin.strip_suffix('/').unwrap_or(origin),
    )
}

fn escape_attribute(value: &str) -> String {
    value
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;")
}

/// Links sibling files into blob URLs and reports failures to the parent
const RUNTIME_JS: &str = r#"const artifact = JSON.parse(document.getElementById("mirage-files").textContent);
const report = (type, detail) => window.parent.postMessage({ source: "mirage", type, ...detail }, "*");
const fail = (error) => report("mirage:error", { message: String((error && error.message) || error) });
window.addEventListener("error", (event) => fail(event.error || event.message));
window.addEventListener("unhandledrejection", (event) => fail(event.reason));
const EXTENSIONS = [".js", ".mjs", ".jsx", ".ts", ".tsx"];
const locate = (from, specifier) => {
  const parts = from.split("/").slice(0, -1);
  for (const segment of specifier.split("/")) {
    if (segment === "..") parts.pop();
    else if (segment !== "." && segment !== "") parts.push(segment);
  }
  const base = parts.join("/");
  const candidates = [base, ...EXTENSIONS.map((ext) => base + ext), ...EXTENSIONS.map((ext) => base + "/index" + ext)];
  return candidates.find((path) => Object.hasOwn(artifact.files, path));
};
const urls = new Map();
const link = (path, stack) => {
  if (urls.has(path)) return urls.get(path);
  if (stack.includes(path)) throw new Error("Import cycle through '" + path + "' is not supported in browser previews");
  const source = artifact.files[path].replace(/(\bfrom\s*|\bimport\s*\(?\s*)(["'])(\.{1,2}\/[^"']+)\2/g, (match, head, quote, specifier) => {
    const target = locate(path, specifier);
    if (!target) throw new Error("Cannot find module '" + specifier + "' imported from '" + path + "'");
    return head + quote + link(target, [...stack, path]) + quote;
  });
  const url = URL.createObjectURL(new Blob([source], { type: "text/javascript" }));
  urls.set(path, url);
  return url;
};
"#;

/// Render the bootstrap HTML document for `files`
pub fn render_bootstrap(
    descriptor: &BootstrapDescriptor,
    import_map: &ImportMap,
    files: &VirtualFileSet,
    origin: &str,
) -> serde_json::Result<String> {
    let state = ShareState::from_files(Some(descriptor.target), files);
    let artifact = escape_script(&serde_json::to_string(&state)?);
    let selector = serde_json::to_string(&descriptor.mount_selector)?;

    let mut html = String::new();
    html.push_str("<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str("<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n");
    for style in &descriptor.styles {
        let _ = writeln!(
            html,
            "<link rel=\"stylesheet\" href=\"{}\">",
            escape_attribute(&substitute_origin(style, origin))
        );
    }
    html.push_str(&import_map.to_script_tag()?);
    html.push('\n');
    let _ = writeln!(
        html,
        "<script type=\"application/json\" id=\"mirage-files\">{}</script>",
        artifact
    );
    html.push_str("</head>\n<body>\n");
    let id = descriptor.mount_selector.trim_start_matches('#');
    let _ = writeln!(html, "<div id=\"{}\"></div>", escape_attribute(id));

    html.push_str("<script type=\"module\">\n");
    let _ = writeln!(
        html,
        "import {{ {} }} from {};",
        descriptor.create_app,
        serde_json::to_string(&descriptor.framework)?
    );
    for binding in &descriptor.imports {
        let _ = writeln!(
            html,
            "import {} from {};",
            binding.clause,
            serde_json::to_string(&binding.specifier)?
        );
    }
    html.push_str(RUNTIME_JS);
    html.push_str("try {\n");
    for (name, expression) in &descriptor.globals {
        let _ = writeln!(html, "  window[{}] = {};", serde_json::to_string(name)?, expression);
    }
    html.push_str("  const { default: Root } = await import(link(artifact.entry, []));\n");
    let _ = writeln!(html, "  const app = {}(Root);", descriptor.create_app);
    html.push_str("  app.config.errorHandler = (error) => fail(error);\n");
    if let Some(plugin) = &descriptor.plugin {
        let _ = writeln!(html, "  app.use({});", plugin);
    }
    for registry in &descriptor.components {
        let _ = writeln!(
            html,
            "  for (const [name, component] of Object.entries({})) app.component(name, component);",
            registry
        );
    }
    let _ = writeln!(html, "  app.mount({});", selector);
    html.push_str("  report(\"mirage:ready\", {});\n");
    html.push_str("} catch (error) {\n  fail(error);\n}\n</script>\n</body>\n</html>\n");
    Ok(html)
}
