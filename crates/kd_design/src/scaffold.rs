//! Scaffold catalog: named target structures and their kissing topology.
//!
//! The catalog is a plain value owned by the caller. `ScaffoldCatalog::builtin()`
//! holds the built-in scaffolds; others can be loaded from JSON:
//!
//! ```json
//! { "scaffolds": [
//!     { "name": "dimer", "structure": "((((....))))..((((....))))", "topology": "random-pairing" }
//! ] }
//! ```
//!
//! Without a `topology` field, built-in scaffold names keep their own
//! topology and any other name gets tetraloops.

use std::fs;
use std::path::Path;
use ahash::AHashMap;
use serde::Deserialize;
use serde::Serialize;

use crate::DesignError;

/// Rule that decides which loops of a scaffold kiss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Topology {
    /// Exactly four loops, one of three perfect matchings drawn at random.
    RandomPairing,
    /// At least four loops, fixed `0-2`, `1-3`.
    OppositePairing,
    /// At least six loops, first half pairs position-wise with second half.
    HalfPairing,
    /// No kissing loops.
    #[default]
    Tetraloops,
}

impl Topology {
    /// Topology of the built-in scaffold names; anything else gets tetraloops.
    pub fn for_scaffold(name: &str) -> Topology {
        match name {
            "z_tile_tetramer" => Topology::RandomPairing,
            "tetrahedron_wireframe" => Topology::OppositePairing,
            "triangular_prism" => Topology::HalfPairing,
            _ => Topology::Tetraloops,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ScaffoldEntry")]
pub struct Scaffold {
    pub name: String,
    pub structure: String,
    pub topology: Topology,
}

/// On-disk form of a scaffold; a missing topology follows the name.
#[derive(Deserialize)]
struct ScaffoldEntry {
    name: String,
    structure: String,
    topology: Option<Topology>,
}

impl From<ScaffoldEntry> for Scaffold {
    fn from(entry: ScaffoldEntry) -> Self {
        let topology = entry.topology.unwrap_or_else(|| Topology::for_scaffold(&entry.name));
        Scaffold {
            name: entry.name,
            structure: entry.structure,
            topology,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    scaffolds: Vec<Scaffold>,
}

/// Mapping from scaffold name to scaffold, remembering insertion order.
#[derive(Debug, Clone, Default)]
pub struct ScaffoldCatalog {
    order: Vec<String>,
    scaffolds: AHashMap<String, Scaffold>,
}

impl ScaffoldCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// The four built-in scaffolds.
    pub fn builtin() -> Self {
        let tetramer = "((((....))))..((((....))))..((((....))))..((((....))))";
        let prism_half = "((((....))))..((((....))))..((((....))))";
        let prism = format!("{prism_half}........{prism_half}");
        let rool = "(((....)))........(((....)))........(((....)))........(((....)))";

        let mut catalog = Self::new();
        for (name, structure) in [
            ("z_tile_tetramer", tetramer.to_string()),
            ("tetrahedron_wireframe", tetramer.to_string()),
            ("triangular_prism", prism),
            ("rool_repeat_unit", rool.to_string()),
        ] {
            catalog.insert(Scaffold {
                name: name.to_string(),
                structure,
                topology: Topology::for_scaffold(name),
            });
        }
        catalog
    }

    /// Insert or replace a scaffold.
    pub fn insert(&mut self, scaffold: Scaffold) {
        if !self.scaffolds.contains_key(&scaffold.name) {
            self.order.push(scaffold.name.clone());
        }
        self.scaffolds.insert(scaffold.name.clone(), scaffold);
    }

    pub fn get(&self, name: &str) -> Option<&Scaffold> {
        self.scaffolds.get(name)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Scaffolds in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Scaffold> + '_ {
        self.order.iter().map(|name| &self.scaffolds[name])
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        let file: CatalogFile = serde_json::from_str(json)?;
        let mut catalog = Self::new();
        for scaffold in file.scaffolds {
            catalog.insert(scaffold);
        }
        Ok(catalog)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, DesignError> {
        let text = fs::read_to_string(path).map_err(|source| DesignError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&text).map_err(|source| DesignError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}
