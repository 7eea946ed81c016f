use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn mirage(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_mirage"))
        .current_dir(dir)
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run mirage")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

#[test]
fn test_render_directory_with_config() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("mirage.toml"), "[preview]\ntarget = \"tailwind\"\n").unwrap();
    let app = dir.path().join("app");
    fs::create_dir_all(app.join("components")).unwrap();
    fs::write(
        app.join("App.tsx"),
        "import { Badge } from '@/components/ui/badge';\n\
         import Title from './components/Title';\n\
         export default () => <div><Title /><Badge>new</Badge></div>;",
    )
    .unwrap();
    fs::write(
        app.join("components/Title.tsx"),
        "export default () => <h1>Inbox</h1>;",
    )
    .unwrap();

    let output = mirage(dir.path(), &["render", "app"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let html = stdout(&output);
    assert!(html.starts_with("<div><h1>Inbox</h1>"), "{}", html);
    assert!(html.contains("rounded-full"), "{}", html);
}

#[test]
fn test_render_failure_exits_nonzero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("App.jsx"),
        "import Chart from 'chart.js'; export default () => <Chart />;",
    )
    .unwrap();

    let output = mirage(dir.path(), &["render", "App.jsx", "--target", "html"]);
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Cannot find module 'chart.js' imported from 'App.jsx'"), "{}", stderr);

    let output = mirage(dir.path(), &["render", "App.jsx", "--target", "html", "--fallback"]);
    assert!(!output.status.success());
    assert!(stdout(&output).contains("class=\"mirage-error\""));
}

#[test]
fn test_check_reports_unresolved() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("App.tsx"),
        "import { Button } from '@mui/material';\nimport dayjs from 'dayjs';",
    )
    .unwrap();

    let output = mirage(dir.path(), &["check", "App.tsx", "--target", "material"]);
    assert!(!output.status.success());
    let report = stdout(&output);
    assert!(report.contains("App.tsx: @mui/material -> registry"), "{}", report);
    assert!(report.contains("App.tsx: dayjs -> UNRESOLVED"), "{}", report);
}

#[test]
fn test_share_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("App.tsx"), "export default () => <p>héllo 🚀</p>;").unwrap();

    let encoded = mirage(dir.path(), &["share", "encode", "App.tsx", "--target", "html"]);
    assert!(encoded.status.success());
    let token = stdout(&encoded).trim().to_string();

    let decoded = mirage(dir.path(), &["share", "decode", "--", &token]);
    assert!(decoded.status.success());
    let state: serde_json::Value = serde_json::from_str(&stdout(&decoded)).unwrap();
    assert_eq!(state["target"], "html");
    assert_eq!(state["entry"], "App.tsx");
    assert_eq!(state["files"]["App.tsx"], "export default () => <p>héllo 🚀</p>;");
}

#[test]
fn test_import_map_from_manifest() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("packages.json"),
        r#"[{"name":"vue","path":"/vue@3.4.21/dist/vue.esm-browser.js"},{"name":"element-plus","path":"element-plus@2.6.1/dist/index.full.mjs"}]"#,
    )
    .unwrap();

    let output = mirage(dir.path(), &["import-map", "packages.json", "--origin", "https://cdn.test/"]);
    assert!(output.status.success());
    let map: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(map["imports"]["vue"], "https://cdn.test/vue@3.4.21/dist/vue.esm-browser.js");
    assert_eq!(
        map["imports"]["element-plus"],
        "https://cdn.test/element-plus@2.6.1/dist/index.full.mjs"
    );
}

#[test]
fn test_render_vue_target_emits_bootstrap() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("main.js"), "export default { template: '<v-btn>Go</v-btn>' };").unwrap();

    let output = mirage(dir.path(), &["render", "main.js", "--target", "vuetify"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    let html = stdout(&output);
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("https://cdn.jsdelivr.net/npm/vuetify@3.5.8/dist/vuetify.min.css"));
}
