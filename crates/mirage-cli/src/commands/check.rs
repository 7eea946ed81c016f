//! Check command - report where each import of an artifact resolves.

use anyhow::Result;
use clap::Args;
use mirage_engine::{ImportReport, Resolution, Target, check_imports, registry_for};
use std::path::PathBuf;

use super::pick_target;
use crate::config::Config;
use crate::input::read_artifact;

#[derive(Args)]
pub struct CheckCommand {
    /// Artifact directory, share-state JSON, or single source file
    pub input: PathBuf,

    /// Preview target whose registry is checked
    #[arg(long, short)]
    pub target: Option<Target>,

    /// Entry file, relative to the artifact
    #[arg(long)]
    pub entry: Option<String>,
}

impl CheckCommand {
    pub fn run(&self, config: &Config) -> Result<()> {
        let entry = self.entry.as_deref().or(config.preview.entry.as_deref());
        let artifact = read_artifact(&self.input, entry)?;
        let target = pick_target(self.target, artifact.target, config);
        let registry = registry_for(target);
        let loader = config.loader_config();

        let reports = check_imports(&artifact.files, registry.as_ref(), &loader.extensions);
        for report in &reports {
            println!("{}", format_report(report));
        }

        let unresolved = reports
            .iter()
            .filter(|report| report.resolution == Resolution::Unresolved)
            .count();
        if unresolved > 0 {
            anyhow::bail!("{} unresolved import(s) for target '{}'", unresolved, target);
        }
        Ok(())
    }
}

fn format_report(report: &ImportReport) -> String {
    let resolution = match &report.resolution {
        Resolution::Sibling(path) => format!("sibling {}", path),
        Resolution::Registry => "registry".to_string(),
        Resolution::Unresolved => "UNRESOLVED".to_string(),
    };
    format!("{}: {} -> {}", report.importer, report.specifier, resolution)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_report() {
        let report = ImportReport {
            importer: "App.tsx".into(),
            specifier: "./Card".into(),
            resolution: Resolution::Sibling("Card.tsx".into()),
        };
        assert_eq!(format_report(&report), "App.tsx: ./Card -> sibling Card.tsx");
    }
}
