//! The gardening manual: a static list of plant care records.

use super::keyword::KeywordIndex;
use super::fuzzy::closest_match;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Minimum similarity for a plant name to count as a fuzzy hit.
pub const FUZZY_CUTOFF: f64 = 0.6;
/// Number of documents the keyword fallback retrieves.
pub const KEYWORD_TOP_K: usize = 2;

#[derive(Debug, thiserror::Error)]
pub enum ManualError {
    #[error("Error: {} not found.", .0.display())]
    NotFound(PathBuf),
    #[error("Error: failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Error: {} is not a valid plant list: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("Error: keyword index failed: {0}")]
    Index(#[from] rusqlite::Error),
}

/// One plant record as stored in `plants_data.json`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PlantEntry {
    pub name: String,
    pub description: String,
    pub water_frequency: String,
    pub soil_type: String,
    pub ideal_period: String,
    pub exposition: String,
    pub curiosity: String,
}

impl PlantEntry {
    /// The text block indexed for keyword search.
    pub fn search_text(&self) -> String {
        let name = if self.name.is_empty() {
            "Unknown"
        } else {
            &self.name
        };
        format!(
            "Name: {name}. Description: {}. Details: {}, {}, {}, {}. Curiosity: {}",
            self.description,
            self.water_frequency,
            self.soil_type,
            self.ideal_period,
            self.exposition,
            self.curiosity
        )
    }

    pub fn format_entry(&self, source: &str) -> String {
        format!(
            "--- MANUAL ENTRY FOUND ({source}) ---\n\
             🌿 NAME: {}\n\
             📝 DESCRIPTION: {}\n\
             💧 WATER: {}\n\
             🌱 SOIL: {}\n\
             📅 BEST PERIOD: {}\n\
             ☀️ EXPOSITION: {}\n\
             🤔 CURIOSITY: {}\n",
            self.name,
            self.description,
            self.water_frequency,
            self.soil_type,
            self.ideal_period,
            self.exposition,
            self.curiosity
        )
    }
}

/// Outcome of a manual lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup<'a> {
    /// The query was a close spelling of a plant name.
    Fuzzy(&'a PlantEntry),
    /// Keyword search hits, best first, as `(entry, indexed text)`.
    Keyword(Vec<(&'a PlantEntry, String)>),
    NotFound,
}

#[derive(Debug)]
pub struct GardeningManual {
    entries: Vec<PlantEntry>,
    lowered_names: Vec<String>,
    index: KeywordIndex,
}

impl GardeningManual {
    pub fn from_entries(entries: Vec<PlantEntry>) -> Result<Self, ManualError> {
        let texts: Vec<String> = entries.iter().map(PlantEntry::search_text).collect();
        let lowered_names = entries.iter().map(|e| e.name.to_lowercase()).collect();
        Ok(Self {
            index: KeywordIndex::build(&texts)?,
            lowered_names,
            entries,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ManualError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(ManualError::NotFound(path.to_path_buf()))
            }
            Err(source) => {
                return Err(ManualError::Io {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let entries: Vec<PlantEntry> =
            serde_json::from_str(&raw).map_err(|source| ManualError::Parse {
                path: path.to_path_buf(),
                source,
            })?;
        tracing::info!(path = %path.display(), plants = entries.len(), "Gardening manual loaded");
        Self::from_entries(entries)
    }

    pub fn entries(&self) -> &[PlantEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fuzzy name match first, BM25 keyword search second.
    pub fn lookup(&self, query: &str) -> Result<Lookup<'_>, ManualError> {
        let clean = query.trim().to_lowercase();

        if let Some(name) = closest_match(
            &clean,
            self.lowered_names.iter().map(String::as_str),
            FUZZY_CUTOFF,
        ) {
            if let Some(pos) = self.lowered_names.iter().position(|n| n == name) {
                return Ok(Lookup::Fuzzy(&self.entries[pos]));
            }
        }

        let hits: Vec<(&PlantEntry, String)> = self
            .index
            .top_k(&clean, KEYWORD_TOP_K)?
            .into_iter()
            .filter(|(i, _)| *i < self.entries.len())
            .map(|(i, _)| (&self.entries[i], self.entries[i].search_text()))
            .collect();
        Ok(if hits.is_empty() {
            Lookup::NotFound
        } else {
            Lookup::Keyword(hits)
        })
    }

    /// Render a lookup the way the `gardening_manual` tool reports it.
    pub fn answer(&self, query: &str) -> Result<String, ManualError> {
        Ok(match self.lookup(query)? {
            Lookup::Fuzzy(entry) => entry.format_entry("Fuzzy Match"),
            Lookup::Keyword(hits) => {
                format!("Found via keyword search:\n{}", hits[0].1)
            }
            Lookup::NotFound => format!(
                "I couldn't find a manual entry for '{query}'. Try searching for the general plant family name."
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn plant(name: &str, description: &str) -> PlantEntry {
        PlantEntry {
            name: name.into(),
            description: description.into(),
            water_frequency: "Every 7 days".into(),
            soil_type: "Well-draining".into(),
            ideal_period: "Spring".into(),
            exposition: "Bright indirect light".into(),
            curiosity: "Loved by collectors".into(),
        }
    }

    fn manual() -> GardeningManual {
        GardeningManual::from_entries(vec![
            plant("Ficus Elastica", "Known as the rubber plant, with glossy leaves."),
            plant("Aloe Vera", "Succulent with medicinal gel, toxic to cats."),
            plant("Sansevieria", "Snake plant tolerant of neglect."),
        ])
        .unwrap()
    }

    #[test]
    fn near_exact_spelling_uses_fuzzy_match() {
        let m = manual();
        assert_eq!(
            m.lookup("  Ficus Elastca ").unwrap(),
            Lookup::Fuzzy(&m.entries()[0])
        );
        let answer = m.answer("aloe vera").unwrap();
        assert!(answer.starts_with("--- MANUAL ENTRY FOUND (Fuzzy Match) ---\n"));
        assert!(answer.contains("🌿 NAME: Aloe Vera\n"));
        assert!(answer.contains("💧 WATER: Every 7 days\n"));
    }

    #[test]
    fn nickname_falls_back_to_keyword_search() {
        let m = manual();
        let answer = m.answer("rubber plant").unwrap();
        assert!(answer.starts_with("Found via keyword search:\nName: Ficus Elastica."));
    }

    #[test]
    fn keyword_term_shared_by_half_the_plants_is_found() {
        let m = GardeningManual::from_entries(vec![
            plant("Ficus Elastica", "Known as the rubber plant."),
            plant("Hevea Brasiliensis", "The rubber tree, tapped for latex."),
            plant("Aloe Vera", "Succulent with medicinal gel."),
            plant("Sansevieria", "Snake plant tolerant of neglect."),
        ])
        .unwrap();
        match m.lookup("rubber").unwrap() {
            Lookup::Keyword(hits) => {
                let mut names: Vec<&str> = hits.iter().map(|(e, _)| e.name.as_str()).collect();
                names.sort_unstable();
                assert_eq!(names, vec!["Ficus Elastica", "Hevea Brasiliensis"]);
            }
            other => panic!("expected keyword hits, got {other:?}"),
        }
    }

    #[test]
    fn keyword_search_works_on_a_single_plant_manual() {
        let m = GardeningManual::from_entries(vec![plant(
            "Ficus Elastica",
            "Known as the rubber plant.",
        )])
        .unwrap();
        let answer = m.answer("rubber").unwrap();
        assert!(answer.starts_with("Found via keyword search:\nName: Ficus Elastica."));
    }

    #[test]
    fn keyword_hits_are_capped_at_top_k() {
        let m = manual();
        match m.lookup("well draining spring").unwrap() {
            Lookup::Keyword(hits) => assert_eq!(hits.len(), KEYWORD_TOP_K),
            other => panic!("expected keyword hits, got {other:?}"),
        }
    }

    #[test]
    fn unknown_query_reports_not_found() {
        let m = manual();
        assert_eq!(m.lookup("zzz").unwrap(), Lookup::NotFound);
        assert_eq!(
            m.answer("zzz").unwrap(),
            "I couldn't find a manual entry for 'zzz'. Try searching for the general plant family name."
        );
    }

    #[test]
    fn search_text_uses_unknown_for_missing_name() {
        let entry = PlantEntry::default();
        assert!(entry.search_text().starts_with("Name: Unknown. "));
    }

    #[test]
    fn load_reports_missing_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plants_data.json");
        let err = GardeningManual::load(&path).unwrap_err();
        assert!(matches!(err, ManualError::NotFound(_)));
        assert!(err.to_string().ends_with("plants_data.json not found."));
    }

    #[test]
    fn load_parses_camel_case_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plants.json");
        std::fs::write(
            &path,
            r#"[{"name":"Pothos","waterFrequency":"Weekly","soilType":"Loamy"}]"#,
        )
        .unwrap();
        let m = GardeningManual::load(&path).unwrap();
        assert_eq!(m.len(), 1);
        assert_eq!(m.entries()[0].water_frequency, "Weekly");
        assert_eq!(m.entries()[0].curiosity, "");
    }

    #[test]
    fn load_rejects_malformed_json() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("plants.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            GardeningManual::load(&path),
            Err(ManualError::Parse { .. })
        ));
    }
}
