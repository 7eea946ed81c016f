use mirage_engine::{
    FailureKind, LoadError, LoaderConfig, Previewer, Target, VirtualFileSet,
};

fn render(target: Target, files: &[(&str, &str)], entry: &str) -> Result<String, mirage_engine::RenderFailure> {
    let files = VirtualFileSet::new(files.iter().copied(), entry).expect("valid file set");
    Previewer::new(target, LoaderConfig::default()).render(&files)
}

#[test]
fn test_material_dashboard() {
    let result = render(
        Target::Material,
        &[
            (
                "App.tsx",
                r#"
                import { Button, Typography } from "@mui/material";
                import DeleteIcon from "@mui/icons-material/Delete";
                import StatCard from "./components/StatCard";

                export default function App() {
                    return (
                        <main>
                            <Typography variant="h4">Overview</Typography>
                            <StatCard label="Users" value={42} />
                            <Button variant="contained" startIcon={<DeleteIcon />}>Remove</Button>
                        </main>
                    );
                }
                "#,
            ),
            (
                "components/StatCard.tsx",
                r#"
                import { Card } from "@mui/material";
                export default function StatCard({ label, value }) {
                    return <Card className="stat"><span>{label}: {value}</span></Card>;
                }
                "#,
            ),
        ],
        "App.tsx",
    );

    match result {
        Ok(html) => {
            assert!(html.starts_with("<main>"), "{}", html);
            assert!(html.contains("<h4 class=\"MuiTypography-root MuiTypography-h4\">Overview</h4>"), "{}", html);
            assert!(html.contains("MuiCard-root stat"), "{}", html);
            assert!(html.contains("<span>Users: 42</span>"), "{}", html);
            assert!(html.contains("MuiButton-contained"), "{}", html);
            assert!(html.contains("MuiSvgIcon-root"), "{}", html);
            assert!(html.contains("Remove</button>"), "{}", html);
        }
        Err(e) => panic!("Failed: {:?}", e),
    }
}

#[test]
fn test_tailwind_card() {
    let result = render(
        Target::Tailwind,
        &[(
            "App.tsx",
            r#"
            import { Button } from "@/components/ui/button";
            import { Card, CardHeader, CardTitle } from "@/components/ui/card";
            import { cn } from "@/lib/utils";
            import { Search } from "lucide-react";

            export default function App() {
                const active = true;
                return (
                    <Card className={cn("w-80", active && "ring-2", false && "hidden")}>
                        <CardHeader><CardTitle>Find</CardTitle></CardHeader>
                        <Button variant="outline"><Search size={16} /> Go</Button>
                    </Card>
                );
            }
            "#,
        )],
        "App.tsx",
    );

    match result {
        Ok(html) => {
            assert!(html.contains("w-80 ring-2"), "{}", html);
            assert!(!html.contains("hidden"), "{}", html);
            assert!(html.contains(">Find</h3>"), "{}", html);
            assert!(html.contains("border border-input"), "{}", html);
            assert!(html.contains("lucide lucide-search"), "{}", html);
        }
        Err(e) => panic!("Failed: {:?}", e),
    }
}

#[test]
fn test_unknown_package_names_importer() {
    let files = VirtualFileSet::new(
        [
            ("App.tsx", "import Chart from './Chart'; export default () => <Chart />;"),
            ("Chart.tsx", "import { Line } from 'unknown-pkg'; export default () => <Line />;"),
        ],
        "App.tsx",
    )
    .unwrap();
    let previewer = Previewer::new(Target::Html, LoaderConfig::default());

    match previewer.load(&files) {
        Err(LoadError::ModuleNotFound { specifier, importer }) => {
            assert_eq!(specifier, "unknown-pkg");
            assert_eq!(importer, "Chart.tsx");
        }
        other => panic!("Expected module-not-found, got {:?}", other),
    }

    let failure = previewer.render(&files).unwrap_err();
    assert_eq!(failure.kind(), Some(FailureKind::Load));
    let detail = failure.detail.unwrap();
    assert_eq!(detail.specifier.as_deref(), Some("unknown-pkg"));
    assert_eq!(detail.path.as_deref(), Some("Chart.tsx"));
}

#[test]
fn test_html_target_only_has_react() {
    let result = render(
        Target::Html,
        &[(
            "App.jsx",
            r#"
            import { useState } from "react";
            import { Button } from "@mui/material";
            export default () => <Button />;
            "#,
        )],
        "App.jsx",
    );
    let failure = result.unwrap_err();
    assert_eq!(
        failure.message,
        "Cannot find module '@mui/material' imported from 'App.jsx'"
    );
}

#[test]
fn test_cyclic_components_render() {
    let result = render(
        Target::Html,
        &[
            (
                "App.tsx",
                r#"
                import { Tree } from "./Tree";
                export const depthLimit = 2;
                export default () => <Tree depth={0} />;
                "#,
            ),
            (
                "Tree.tsx",
                r#"
                import { depthLimit } from "./App";
                export function Tree({ depth }) {
                    if (depth >= depthLimit) return <i>leaf</i>;
                    return <b><Tree depth={depth + 1} /></b>;
                }
                "#,
            ),
        ],
        "App.tsx",
    );

    match result {
        Ok(html) => assert_eq!(html, "<b><b><i>leaf</i></b></b>"),
        Err(e) => panic!("Failed: {:?}", e),
    }
}

#[test]
fn test_render_error_is_attributed_to_entry() {
    let failure = render(
        Target::Material,
        &[(
            "App.tsx",
            "export default function App() { throw new Error(\"boom\"); }",
        )],
        "App.tsx",
    )
    .unwrap_err();
    assert_eq!(failure.message, "Error: boom");
    assert_eq!(failure.kind(), Some(FailureKind::Render));
    assert_eq!(failure.detail.unwrap().path.as_deref(), Some("App.tsx"));
}

#[test]
fn test_native_targets_need_bootstrap() {
    let files = VirtualFileSet::single("main.js", "export default {};").unwrap();
    let previewer = Previewer::new(Target::Vuetify, LoaderConfig::default());
    assert!(previewer.loader().is_none());
    assert!(matches!(previewer.load(&files), Err(LoadError::Unsupported(_))));
}
