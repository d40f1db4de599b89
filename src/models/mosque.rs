//! Mosque registry structures.
//!
//! Each mosque carries name variants grouped by writing system so a single
//! feed message can be attributed regardless of which script it was posted in.
//! The registry is built once at startup from configuration and never mutated
//! afterwards.

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// A writing system used by channel posts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Script {
    Latin,
    Cyrillic,
    Arabic,
}

impl Script {
    pub fn as_str(&self) -> &'static str {
        match self {
            Script::Latin => "latin",
            Script::Cyrillic => "cyrillic",
            Script::Arabic => "arabic",
        }
    }
}

/// A single name variant of a mosque in one script.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameVariant {
    pub script: Script,
    /// Lowercased, trimmed name used for matching.
    pub name: String,
}

/// A mosque tracked by the watcher.
#[derive(Debug, Clone)]
pub struct Mosque {
    id: String,
    display_name: String,
    variants: Vec<NameVariant>,
}

impl Mosque {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    /// Name variants in stable registry order.
    pub fn variants(&self) -> &[NameVariant] {
        &self.variants
    }
}

/// Config entry describing one mosque.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MosqueEntry {
    /// Stable identifier (e.g. "norbutabek")
    pub id: String,

    /// Human-readable name used in notifications
    pub display_name: String,

    /// Name variants grouped by script
    #[serde(default)]
    pub variants: VariantEntry,
}

/// Per-script variant lists as they appear in the config file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VariantEntry {
    #[serde(default)]
    pub latin: Vec<String>,

    #[serde(default)]
    pub cyrillic: Vec<String>,

    #[serde(default)]
    pub arabic: Vec<String>,
}

/// Immutable registry of all tracked mosques.
#[derive(Debug, Clone, Default)]
pub struct MosqueRegistry {
    mosques: Vec<Mosque>,
}

impl MosqueRegistry {
    /// Build the registry from config entries.
    ///
    /// Variant names are trimmed and lowercased here so the matcher can
    /// compare them against normalized message text directly. A mosque with
    /// no usable variant makes matching impossible, so it fails the build.
    pub fn from_entries(entries: &[MosqueEntry]) -> Result<Self> {
        let mut mosques = Vec::with_capacity(entries.len());

        for entry in entries {
            let mut variants = Vec::new();
            for (script, names) in [
                (Script::Latin, &entry.variants.latin),
                (Script::Cyrillic, &entry.variants.cyrillic),
                (Script::Arabic, &entry.variants.arabic),
            ] {
                for name in names {
                    let name = name.trim().to_lowercase();
                    if !name.is_empty() {
                        variants.push(NameVariant { script, name });
                    }
                }
            }

            if variants.is_empty() {
                return Err(AppError::validation(format!(
                    "Mosque '{}' has no usable name variants",
                    entry.id
                )));
            }

            mosques.push(Mosque {
                id: entry.id.clone(),
                display_name: entry.display_name.clone(),
                variants,
            });
        }

        if mosques.is_empty() {
            return Err(AppError::validation("No mosques defined"));
        }

        Ok(Self { mosques })
    }

    /// Mosques in stable configuration order.
    pub fn mosques(&self) -> &[Mosque] {
        &self.mosques
    }

    /// Look up a mosque by its identifier.
    pub fn get(&self, id: &str) -> Option<&Mosque> {
        self.mosques.iter().find(|m| m.id == id)
    }

    pub fn len(&self) -> usize {
        self.mosques.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mosques.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entry() -> MosqueEntry {
        MosqueEntry {
            id: "norbutabek".to_string(),
            display_name: "Norbutabek jome masjidi".to_string(),
            variants: VariantEntry {
                latin: vec!["Norbutabek Jome Masjidi ".to_string(), "norbutabek".to_string()],
                cyrillic: vec!["норбутабек".to_string()],
                arabic: vec![],
            },
        }
    }

    #[test]
    fn test_build_normalizes_variants() {
        let registry = MosqueRegistry::from_entries(&[sample_entry()]).unwrap();
        let mosque = registry.get("norbutabek").unwrap();

        assert_eq!(mosque.variants().len(), 3);
        assert_eq!(mosque.variants()[0].name, "norbutabek jome masjidi");
        assert_eq!(mosque.variants()[0].script, Script::Latin);
        assert_eq!(mosque.variants()[2].script, Script::Cyrillic);
    }

    #[test]
    fn test_rejects_empty_variants() {
        let entry = MosqueEntry {
            id: "ghost".to_string(),
            display_name: "Ghost".to_string(),
            variants: VariantEntry {
                latin: vec!["   ".to_string()],
                cyrillic: vec![],
                arabic: vec![],
            },
        };

        assert!(MosqueRegistry::from_entries(&[entry]).is_err());
    }

    #[test]
    fn test_rejects_empty_registry() {
        assert!(MosqueRegistry::from_entries(&[]).is_err());
    }
}
