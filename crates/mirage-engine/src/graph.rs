//! Import graph inspection
//!
//! A lightweight, regex-based view of what each artifact file imports and
//! where those imports would resolve. Works on sources that do not parse,
//! which makes it useful for diagnosing a failed load.

use std::sync::OnceLock;

use regex::Regex;

use crate::loader::AssetKind;
use crate::registry::ModuleRegistry;
use crate::vfs::VirtualFileSet;

/// Parse import specifiers from source
///
/// Extracts static imports, dynamic `import()` calls and `export ... from`
/// re-exports, in order of first appearance without duplicates.
pub fn scan_imports(source: &str) -> Vec<String> {
    static PATTERNS: OnceLock<Regex> = OnceLock::new();

    let pattern = PATTERNS.get_or_init(|| {
        Regex::new(concat!(
            r#"(?m)(?:^\s*import\s+(?:type\s+)?(?:[^'";]*?\s+from\s+)?['"]([^'"]+)['"])"#,
            r#"|(?:\bimport\s*\(\s*['"]([^'"]+)['"]\s*\))"#,
            r#"|(?:^\s*export\s+[^'";]*?\s+from\s+['"]([^'"]+)['"])"#,
        ))
        .expect("valid regex")
    });

    let mut imports: Vec<String> = Vec::new();
    for cap in pattern.captures_iter(source) {
        let Some(specifier) = cap.get(1).or_else(|| cap.get(2)).or_else(|| cap.get(3)) else {
            continue;
        };
        if !imports.iter().any(|seen| seen == specifier.as_str()) {
            imports.push(specifier.as_str().to_string());
        }
    }
    imports
}

/// Where an import resolves
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Another file of the artifact
    Sibling(String),
    Registry,
    Unresolved,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportReport {
    pub importer: String,
    pub specifier: String,
    pub resolution: Resolution,
}

/// Classify every import of every file, sibling files first, then the
/// registry. Without a registry (native-ESM targets) bare specifiers count
/// as resolved through the import map.
pub fn check_imports(
    files: &VirtualFileSet,
    registry: Option<&ModuleRegistry>,
    extensions: &[String],
) -> Vec<ImportReport> {
    let mut reports = Vec::new();
    for (path, source) in files.iter() {
        if AssetKind::of(path).is_some() {
            continue;
        }
        for specifier in scan_imports(source) {
            let resolution = if let Some(sibling) = files.resolve(&specifier, path, extensions) {
                Resolution::Sibling(sibling.to_string())
            } else {
                match registry {
                    Some(registry) if registry.contains(&specifier) => Resolution::Registry,
                    Some(_) => Resolution::Unresolved,
                    None if is_bare(&specifier) => Resolution::Registry,
                    None => Resolution::Unresolved,
                }
            };
            reports.push(ImportReport {
                importer: path.to_string(),
                specifier,
                resolution,
            });
        }
    }
    reports
}

fn is_bare(specifier: &str) -> bool {
    !(specifier.starts_with("./") || specifier.starts_with("../") || specifier.starts_with('/'))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vfs::DEFAULT_EXTENSIONS;

    #[test]
    fn test_scan_imports_static() {
        let source = r#"
            import { useState } from 'react';
            import Card from "./Card";
            import * as Icons from '@mui/icons-material';
            import type { Props } from './types';
            import './styles.css';
        "#;

        let imports = scan_imports(source);
        assert_eq!(
            imports,
            vec!["react", "./Card", "@mui/icons-material", "./types", "./styles.css"]
        );
    }

    #[test]
    fn test_scan_imports_multiline_and_reexports() {
        let source = r#"
            import {
                Button,
                Typography,
            } from '@mui/material';
            export { default as Chart } from './Chart';
            export * from './hooks';
            const Lazy = () => import('./Lazy');
        "#;

        let imports = scan_imports(source);
        assert_eq!(imports, vec!["@mui/material", "./Chart", "./hooks", "./Lazy"]);
    }

    #[test]
    fn test_scan_imports_no_duplicates() {
        let source = r#"
            import { a } from './mod';
            import { b } from './mod';
        "#;
        assert_eq!(scan_imports(source), vec!["./mod"]);
    }

    #[test]
    fn test_check_imports() {
        let files = VirtualFileSet::new(
            [
                ("App.tsx", "import { Button } from '@mui/material';\nimport Card from './Card';\nimport x from 'unknown-pkg';"),
                ("Card.tsx", "import React from 'react';"),
            ],
            "App.tsx",
        )
        .unwrap();
        let registry = ModuleRegistry::builder()
            .exports("react", Vec::<(String, mirage_script::Value)>::new())
            .exports("@mui/material", Vec::<(String, mirage_script::Value)>::new())
            .build();
        let extensions: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();

        let reports = check_imports(&files, Some(&registry), &extensions);
        let summary: Vec<_> = reports
            .iter()
            .map(|r| (r.importer.as_str(), r.specifier.as_str(), r.resolution.clone()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("App.tsx", "@mui/material", Resolution::Registry),
                ("App.tsx", "./Card", Resolution::Sibling("Card.tsx".into())),
                ("App.tsx", "unknown-pkg", Resolution::Unresolved),
                ("Card.tsx", "react", Resolution::Registry),
            ]
        );

        let native = check_imports(&files, None, &extensions);
        assert_eq!(native[2].resolution, Resolution::Registry);
    }

    #[test]
    fn test_check_imports_skips_assets() {
        let files = VirtualFileSet::new(
            [
                ("App.tsx", "import './App.css';\nimport data from './data.json';"),
                ("App.css", "import 'not-a-module';"),
                ("data.json", r#"{"note": "import x from 'y'"}"#),
            ],
            "App.tsx",
        )
        .unwrap();
        let extensions: Vec<String> = DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect();
        let reports = check_imports(&files, None, &extensions);
        assert_eq!(reports.len(), 2);
        assert!(reports.iter().all(|report| report.importer == "App.tsx"));
        assert_eq!(reports[0].resolution, Resolution::Sibling("App.css".into()));
    }
}
