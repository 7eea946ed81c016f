//! Preview targets
//!
//! Loader targets run in-process against a [`ModuleRegistry`]; native-ESM
//! targets are handed to the browser with an import map and a bootstrap
//! document.

pub mod components;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::bootstrap::BootstrapDescriptor;
use crate::error::UnknownTargetError;
use crate::registry::ModuleRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Target {
    /// Material UI
    Material,
    /// Tailwind with shadcn/ui components
    Tailwind,
    /// Plain React markup
    Html,
    Vuetify,
    ElementPlus,
}

/// How a target's artifacts execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Runtime {
    /// In-process loader over a module registry
    Loader,
    /// Browser-native modules resolved through an import map
    NativeEsm,
}

impl Target {
    pub const ALL: [Target; 5] = [
        Target::Material,
        Target::Tailwind,
        Target::Html,
        Target::Vuetify,
        Target::ElementPlus,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Target::Material => "material",
            Target::Tailwind => "tailwind",
            Target::Html => "html",
            Target::Vuetify => "vuetify",
            Target::ElementPlus => "element-plus",
        }
    }

    pub fn runtime(&self) -> Runtime {
        match self {
            Target::Material | Target::Tailwind | Target::Html => Runtime::Loader,
            Target::Vuetify | Target::ElementPlus => Runtime::NativeEsm,
        }
    }

    /// Registry for loader targets
    pub fn registry(&self) -> Option<ModuleRegistry> {
        registry_for(*self)
    }

    /// Bootstrap descriptor for native-ESM targets
    pub fn bootstrap(&self) -> Option<BootstrapDescriptor> {
        BootstrapDescriptor::for_target(*self)
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Target {
    type Err = UnknownTargetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "material" | "mui" => Ok(Target::Material),
            "tailwind" | "shadcn" => Ok(Target::Tailwind),
            "html" | "react" => Ok(Target::Html),
            "vuetify" => Ok(Target::Vuetify),
            "element-plus" | "elementplus" | "element" => Ok(Target::ElementPlus),
            _ => Err(UnknownTargetError(s.to_string())),
        }
    }
}

/// Build the module registry of a loader target; `None` for native-ESM
/// targets.
pub fn registry_for(target: Target) -> Option<ModuleRegistry> {
    let builder = ModuleRegistry::builder().module("react", components::react());
    let builder = match target {
        Target::Material => builder
            .module("@mui/material", components::material())
            .prefix("@mui/material/", components::material_subpath)
            .module("@mui/icons-material", components::material_icons())
            .prefix("@mui/icons-material/", components::material_icon_subpath),
        Target::Tailwind => builder
            .prefix("@/components/ui/", components::shadcn)
            .module("@/lib/utils", components::utils())
            .module("clsx", components::clsx())
            .module("lucide-react", components::lucide()),
        Target::Html => builder,
        Target::Vuetify | Target::ElementPlus => return None,
    };
    Some(builder.build())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for target in Target::ALL {
            assert_eq!(target.name().parse::<Target>().unwrap(), target);
        }
        assert_eq!("MUI".parse::<Target>().unwrap(), Target::Material);
        let err = "svelte".parse::<Target>().unwrap_err();
        assert_eq!(err.0, "svelte");
    }

    #[test]
    fn test_serde_names() {
        assert_eq!(serde_json::to_string(&Target::ElementPlus).unwrap(), "\"element-plus\"");
        let target: Target = serde_json::from_str("\"tailwind\"").unwrap();
        assert_eq!(target, Target::Tailwind);
    }

    #[test]
    fn test_runtime_split() {
        for target in Target::ALL {
            match target.runtime() {
                Runtime::Loader => {
                    assert!(target.registry().is_some());
                    assert!(target.bootstrap().is_none());
                }
                Runtime::NativeEsm => {
                    assert!(target.registry().is_none());
                    assert!(target.bootstrap().is_some());
                }
            }
        }
    }

    #[test]
    fn test_material_registry() {
        let registry = registry_for(Target::Material).unwrap();
        assert!(registry.resolve("@mui/material").unwrap().has("Button"));
        assert!(registry.resolve("@mui/material/Card").unwrap().has("default"));
        assert!(registry.resolve("@mui/icons-material").unwrap().has("DeleteOutline"));
        assert!(registry.resolve("@mui/icons-material/Add").is_ok());
        assert!(registry.resolve("@mui/lab").is_err());
    }

    #[test]
    fn test_tailwind_registry() {
        let registry = registry_for(Target::Tailwind).unwrap();
        assert!(registry.resolve("@/components/ui/button").unwrap().has("Button"));
        assert!(registry.resolve("@/components/ui/carousel").is_err());
        assert!(registry.resolve("lucide-react").unwrap().has("ArrowRight"));
        assert!(registry.resolve("@mui/material").is_err());
    }
}
