use serde::{Deserialize, Serialize};
use std::fs::OpenOptions;
use std::io::BufReader;
use std::path::Path;

use crate::error::Result;
use crate::step::Step;
use crate::store::Snapshot;

/// A finished recording, ready to hand to whatever runs workflows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Recipe {
    pub fn from_snapshot(name: impl Into<String>, steps: &Snapshot) -> Self {
        Self {
            name: name.into(),
            steps: steps.as_ref().clone(),
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let recipe: Recipe = serde_json::from_reader(reader)?;
        Ok(recipe)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// File name used when a recipe is saved into a directory.
    pub fn file_name(&self) -> String {
        let slug = self
            .name
            .to_lowercase()
            .chars()
            .map(|c| if c.is_alphanumeric() { c } else { '-' })
            .collect::<String>()
            .split('-')
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("-");

        if slug.is_empty() {
            "recipe.json".to_string()
        } else {
            format!("{slug}.json")
        }
    }
}
