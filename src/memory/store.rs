use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

pub type MemoryRecord = Map<String, Value>;

/// File-backed key/value memory of the user's garden.
#[derive(Debug, Clone)]
pub struct GardenMemory {
    path: PathBuf,
}

impl GardenMemory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record. A missing or unparsable file reads as empty.
    pub fn load(&self) -> Result<MemoryRecord> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Map::new()),
            Err(e) => {
                return Err(e)
                    .with_context(|| format!("Failed to read {}", self.path.display()))
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => Ok(map),
            Ok(_) | Err(_) => {
                tracing::warn!(path = %self.path.display(), "Garden memory is not a JSON object; treating as empty");
                Ok(Map::new())
            }
        }
    }

    fn write(&self, record: &MemoryRecord) -> Result<()> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        record
            .serialize(&mut ser)
            .context("Failed to serialize garden memory")?;
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&self.path, buf)
            .with_context(|| format!("Failed to write {}", self.path.display()))
    }

    /// Set one key, keeping every other key, and rewrite the file.
    pub fn save(&self, key: &str, value: Value) -> Result<String> {
        let mut record = self.load()?;
        record.insert(key.to_string(), value);
        self.write(&record)?;
        tracing::debug!(key, "Garden memory updated");
        Ok(format!("Successfully updated '{key}' in garden memory."))
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.load()?.remove(key))
    }

    pub fn clear(&self) -> Result<()> {
        self.write(&Map::new())
    }

    /// Human-readable summary of everything stored.
    pub fn summary(&self) -> Result<String> {
        let record = self.load()?;
        if record.is_empty() {
            return Ok(
                "The garden memory is currently empty. I don't have any locations or plants saved yet."
                    .to_string(),
            );
        }

        let mut lines = vec!["Here is what I remember about the garden:".to_string()];
        for (key, value) in &record {
            lines.push(format!("- {}: {}", title_case_key(key), display_value(value)));
        }
        Ok(lines.join("\n"))
    }
}

/// `hardiness_zone` → `Hardiness Zone`.
///
/// Every alphabetic run is capitalized and lower-cased after its first letter.
pub fn title_case_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut at_word_start = true;
    for c in key.replace('_', " ").chars() {
        if c.is_alphabetic() {
            if at_word_start {
                out.extend(c.to_uppercase());
            } else {
                out.extend(c.to_lowercase());
            }
            at_word_start = false;
        } else {
            out.push(c);
            at_word_start = true;
        }
    }
    out
}

fn display_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn display_value(value: &Value) -> String {
    match value {
        Value::Array(items) => items
            .iter()
            .map(display_scalar)
            .collect::<Vec<_>>()
            .join(", "),
        other => display_scalar(other),
    }
}
