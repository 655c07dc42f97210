//! Shared JSON fixtures for the reveal crates, indexed by `fixtures/manifest.json`.

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use serde::de::DeserializeOwned;
use serde::Deserialize;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    serde_json::from_str(include_str!("../../../../fixtures/manifest.json"))
        .expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    pages: BTreeMap<String, String>,
    configs: BTreeMap<String, String>,
}

#[derive(Copy, Clone, Debug)]
enum Section {
    Page,
    Config,
}

impl Section {
    fn entries(self) -> &'static BTreeMap<String, String> {
        match self {
            Section::Page => &MANIFEST.pages,
            Section::Config => &MANIFEST.configs,
        }
    }

    fn locate(self, name: &str) -> Result<PathBuf> {
        let rel = self
            .entries()
            .get(name)
            .with_context(|| format!("no {self:?} fixture named '{name}'"))?;
        Ok(PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("../../../fixtures")
            .join(rel))
    }

    fn read(self, name: &str) -> Result<String> {
        let path = self.locate(name)?;
        std::fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))
    }

    fn parse<T: DeserializeOwned>(self, name: &str) -> Result<T> {
        serde_json::from_str(&self.read(name)?)
            .with_context(|| format!("{self:?} fixture '{name}' is not valid JSON for this type"))
    }
}

/// Page descriptions (groups and members) in the registry JSON format.
pub mod pages {
    use super::*;

    /// Fixture names in sorted order.
    pub fn keys() -> Vec<String> {
        Section::Page.entries().keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        Section::Page.read(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Section::Page.parse(name)
    }
}

/// Reveal config overrides.
pub mod configs {
    use super::*;

    pub fn keys() -> Vec<String> {
        Section::Config.entries().keys().cloned().collect()
    }

    pub fn json(name: &str) -> Result<String> {
        Section::Config.read(name)
    }

    pub fn load<T: DeserializeOwned>(name: &str) -> Result<T> {
        Section::Config.parse(name)
    }
}
