//! # Catalog Ingestion
//!
//! Normalizes bulk-imported creature data into [`CreatureRecord`]s.
//!
//! The import format is a JSON array of entries shaped like:
//!
//! ```json
//! {
//!   "monster_key": "kank",
//!   "title": "Kank",
//!   "monster_data": {
//!     "setting": "Dark Sun",
//!     "fullBody": "<p>...</p>",
//!     "sources": "Dark Sun Monstrous Compendium",
//!     "statblock": { "Kank": { "No. Appearing": "2d12", "Climate/Terrain": "Desert" } },
//!     "images": ["images/kank.png"]
//!   }
//! }
//! ```
//!
//! Source data is loose: `sources` is sometimes a bare string, `statblock` is
//! sometimes one flat block rather than a map of named blocks, and individual
//! values are occasionally the wrong type. A bad field is dropped with a
//! warning; only a record with no usable key fails the load.

use super::{Catalog, CreatureRecord, NamedStatblock, StatField, Statblock};
use crate::{BestiaryError, BestiaryResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// One entry of the bulk import, before normalization.
///
/// Text fields are kept as raw JSON so a wrongly typed value degrades during
/// [`normalize`] instead of failing the whole document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawCreature {
    #[serde(default)]
    pub monster_key: Option<Value>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default, deserialize_with = "lenient_monster_data")]
    pub monster_data: RawMonsterData,
}

/// The `monster_data` payload of an import entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawMonsterData {
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub setting: Option<Value>,
    #[serde(default, rename = "fullBody")]
    pub full_body: Option<Value>,
    #[serde(default)]
    pub sources: Option<RawSources>,
    #[serde(default)]
    pub statblock: Option<Value>,
    #[serde(default)]
    pub images: Option<Value>,
}

/// Reads `monster_data`, treating null or a non-object as empty.
fn lenient_monster_data<'de, D>(deserializer: D) -> Result<RawMonsterData, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Object(_) => serde_json::from_value::<RawMonsterData>(value).or_else(|e| {
            log::warn!("Ignoring unreadable monster_data: {}", e);
            Ok(RawMonsterData::default())
        }),
        Value::Null => Ok(RawMonsterData::default()),
        other => {
            log::warn!("Ignoring malformed monster_data: {}", other);
            Ok(RawMonsterData::default())
        }
    }
}

/// Provenance labels as they appear in source data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawSources {
    One(String),
    Many(Vec<String>),
    Other(Value),
}

impl RawSources {
    /// Materializes the labels as a sequence.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary::RawSources;
    ///
    /// let sources = RawSources::One("Fiend Folio".to_string());
    /// assert_eq!(sources.into_vec(), vec!["Fiend Folio".to_string()]);
    /// ```
    pub fn into_vec(self) -> Vec<String> {
        match self {
            RawSources::One(source) => vec![source],
            RawSources::Many(sources) => sources,
            RawSources::Other(value) => strings_in(value, "sources"),
        }
    }
}

/// Turns raw entries into a [`Catalog`].
///
/// Fails only when an entry has no `monster_key`; every other defect is
/// degraded and logged.
pub fn load_catalog(raw: impl IntoIterator<Item = RawCreature>) -> BestiaryResult<Catalog> {
    let records = raw
        .into_iter()
        .enumerate()
        .map(|(position, entry)| normalize(entry, position))
        .collect::<BestiaryResult<Vec<_>>>()?;

    Ok(Catalog::new(records))
}

/// Parses a JSON import document and loads it.
///
/// The document must be an array. An element that is not an object has no
/// key and is reported as [`BestiaryError::InvalidRecord`].
pub fn load_catalog_json(json: &str) -> BestiaryResult<Catalog> {
    let entries: Vec<Value> = serde_json::from_str(json)?;
    let raw = entries
        .into_iter()
        .enumerate()
        .map(|(position, entry)| match entry {
            Value::Object(_) => Ok(serde_json::from_value(entry)?),
            other => Err(BestiaryError::InvalidRecord(format!(
                "entry {} is not an object: {}",
                position, other
            ))),
        })
        .collect::<BestiaryResult<Vec<RawCreature>>>()?;

    load_catalog(raw)
}

/// Reads and loads a JSON import file.
pub fn load_catalog_file(path: impl AsRef<Path>) -> BestiaryResult<Catalog> {
    let path = path.as_ref();
    log::info!("Loading catalog from {}", path.display());
    let contents = fs::read_to_string(path)?;
    load_catalog_json(&contents)
}

/// Normalizes a single entry. `position` is only used for error reporting.
pub fn normalize(entry: RawCreature, position: usize) -> BestiaryResult<CreatureRecord> {
    let key = entry
        .monster_key
        .and_then(|value| text_in(value, "monster_key"))
        .map(|key| key.trim().to_string())
        .filter(|key| !key.is_empty())
        .ok_or_else(|| {
            BestiaryError::InvalidRecord(format!("entry {} has no monster_key", position))
        })?;

    let data = entry.monster_data;
    let title = entry
        .title
        .and_then(|value| text_in(value, "title"))
        .or_else(|| data.title.and_then(|value| text_in(value, "title")))
        .unwrap_or_else(|| key.clone());

    let sources = data.sources.map(RawSources::into_vec).unwrap_or_default();
    let images = data
        .images
        .map(|value| strings_in(value, "images"))
        .unwrap_or_default();
    let statblocks = data
        .statblock
        .map(|value| statblocks_in(value, &title))
        .unwrap_or_default();

    Ok(CreatureRecord {
        key,
        title,
        setting: data
            .setting
            .and_then(|value| text_in(value, "setting"))
            .unwrap_or_default(),
        body: data
            .full_body
            .and_then(|value| text_in(value, "fullBody"))
            .unwrap_or_default(),
        sources,
        statblocks,
        images,
    })
}

/// Reads a value that should have been a single string. Numbers keep their
/// JSON text; anything else is dropped.
fn text_in(value: Value, what: &str) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => None,
        other => {
            log::warn!("Ignoring malformed {}: {}", what, other);
            None
        }
    }
}

/// Collects the string elements of a value that should have been a string
/// list. A lone string counts as a one-element list.
fn strings_in(value: Value, what: &str) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::String(s) => vec![s],
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s),
                other => {
                    log::warn!("Dropping non-string entry in {}: {}", what, other);
                    None
                }
            })
            .collect(),
        other => {
            log::warn!("Ignoring malformed {}: {}", what, other);
            Vec::new()
        }
    }
}

/// Reads the `statblock` payload, which is either a map of named blocks or a
/// single flat block. A flat block is filed under the creature's title.
fn statblocks_in(value: Value, title: &str) -> Vec<NamedStatblock> {
    let map = match value {
        Value::Object(map) => map,
        Value::Null => return Vec::new(),
        other => {
            log::warn!("Ignoring malformed statblock for '{}': {}", title, other);
            return Vec::new();
        }
    };

    if map.is_empty() {
        return Vec::new();
    }

    if !map.values().any(Value::is_object) {
        return vec![NamedStatblock::new(title, statblock_from(&map, title))];
    }

    map.into_iter()
        .filter_map(|(name, block)| match block {
            Value::Object(fields) => {
                let statblock = statblock_from(&fields, &name);
                Some(NamedStatblock::new(name, statblock))
            }
            other => {
                log::warn!(
                    "Dropping statblock '{}' on '{}': expected an object, found {}",
                    name,
                    title,
                    other
                );
                None
            }
        })
        .collect()
}

fn statblock_from(fields: &Map<String, Value>, name: &str) -> Statblock {
    let mut statblock = Statblock::new();

    for (label, value) in fields {
        let Some(field) = StatField::from_label(label) else {
            log::debug!("Statblock '{}': skipping unknown field '{}'", name, label);
            continue;
        };

        match value {
            Value::String(text) => statblock.insert(field, text.as_str()),
            Value::Number(n) => statblock.insert(field, n.to_string()),
            Value::Null => {}
            other => log::warn!(
                "Statblock '{}': dropping non-text value for {}: {}",
                name,
                field,
                other
            ),
        }
    }

    statblock
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn raw(value: Value) -> RawCreature {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn test_bare_string_sources_become_a_sequence() {
        let record = normalize(
            raw(json!({
                "monster_key": "imp",
                "title": "Imp",
                "monster_data": { "sources": "Fiend Folio" }
            })),
            0,
        )
        .unwrap();

        assert_eq!(record.sources, vec!["Fiend Folio".to_string()]);
    }

    #[test]
    fn test_missing_and_null_sources_are_empty() {
        let missing = normalize(raw(json!({ "monster_key": "a" })), 0).unwrap();
        let null = normalize(
            raw(json!({ "monster_key": "b", "monster_data": { "sources": null } })),
            1,
        )
        .unwrap();

        assert!(missing.sources.is_empty());
        assert!(null.sources.is_empty());
    }

    #[test]
    fn test_mixed_sources_keep_strings() {
        let record = normalize(
            raw(json!({
                "monster_key": "c",
                "monster_data": { "sources": ["MC1", 7, "MC2"] }
            })),
            0,
        )
        .unwrap();

        assert_eq!(record.sources, vec!["MC1".to_string(), "MC2".to_string()]);
    }

    #[test]
    fn test_named_statblocks_keep_document_order() {
        let record = normalize(
            raw(json!({
                "monster_key": "dragon",
                "title": "Dragon",
                "monster_data": {
                    "statblock": {
                        "Young": { "No. Appearing": "1" },
                        "Adult": { "No. Appearing": "1d2" },
                        "Ancient": { "No. Appearing": "1" }
                    }
                }
            })),
            0,
        )
        .unwrap();

        let names: Vec<_> = record.statblocks.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Young", "Adult", "Ancient"]);
    }

    #[test]
    fn test_flat_statblock_is_filed_under_title() {
        let record = normalize(
            raw(json!({
                "monster_key": "kank",
                "monster_data": {
                    "title": "Kank",
                    "statblock": { "Climate/Terrain": "Desert", "No. Appearing": "2d12" }
                }
            })),
            0,
        )
        .unwrap();

        assert_eq!(record.title, "Kank");
        assert_eq!(record.statblocks.len(), 1);
        assert_eq!(record.statblocks[0].name, "Kank");
        assert_eq!(record.climate_terrain(), Some("Desert"));
    }

    #[test]
    fn test_field_values_are_degraded_not_fatal() {
        let record = normalize(
            raw(json!({
                "monster_key": "odd",
                "monster_data": {
                    "statblock": {
                        "Odd": {
                            "THAC0": 17,
                            "Armor Class": ["5"],
                            "Hit Dice": null,
                            "Favourite Food": "Adventurers"
                        },
                        "Broken": "not a block"
                    },
                    "images": "odd.png"
                }
            })),
            0,
        )
        .unwrap();

        assert_eq!(record.statblocks.len(), 1);
        let block = record.primary_statblock().unwrap();
        assert_eq!(block.get(StatField::Thac0), Some("17"));
        assert!(!block.contains(StatField::ArmorClass));
        assert!(!block.contains(StatField::HitDice));
        assert_eq!(block.len(), 1);
        assert_eq!(record.images, vec!["odd.png".to_string()]);
    }

    #[test]
    fn test_missing_key_is_an_invalid_record() {
        let result = load_catalog(vec![raw(json!({ "title": "Nameless" }))]);
        assert!(matches!(result, Err(BestiaryError::InvalidRecord(_))));

        let blank = normalize(raw(json!({ "monster_key": "   " })), 3);
        assert!(matches!(blank, Err(BestiaryError::InvalidRecord(msg)) if msg.contains('3')));
    }

    #[test]
    fn test_title_falls_back_to_key() {
        let record = normalize(raw(json!({ "monster_key": "thri-kreen" })), 0).unwrap();
        assert_eq!(record.title, "thri-kreen");
    }

    #[test]
    fn test_wrongly_typed_text_fields_degrade() {
        let catalog = load_catalog_json(
            r#"[
                { "monster_key": "kank", "title": "Kank",
                  "monster_data": { "setting": "Dark Sun" } },
                { "monster_key": "odd", "title": ["Odd"],
                  "monster_data": { "title": "Oddity", "setting": 5, "fullBody": { "html": "" } } },
                { "monster_key": 404, "monster_data": { "setting": true } }
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.by_key("kank").unwrap().setting, "Dark Sun");

        let odd = catalog.by_key("odd").unwrap();
        assert_eq!(odd.title, "Oddity");
        assert_eq!(odd.setting, "5");
        assert_eq!(odd.body, "");

        let numbered = catalog.by_key("404").unwrap();
        assert_eq!(numbered.title, "404");
        assert_eq!(numbered.setting, "");
    }

    #[test]
    fn test_null_or_scalar_monster_data_is_empty() {
        let catalog = load_catalog_json(
            r#"[
                { "monster_key": "a", "title": "A", "monster_data": null },
                { "monster_key": "b", "title": "B", "monster_data": "nothing here" },
                { "monster_key": "c", "title": "C", "monster_data": [1, 2] }
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 3);
        for record in catalog.iter() {
            assert!(record.statblocks.is_empty());
            assert!(record.sources.is_empty());
            assert_eq!(record.setting, "");
        }
    }

    #[test]
    fn test_non_object_entry_is_an_invalid_record() {
        let result = load_catalog_json(r#"[{ "monster_key": "a" }, 17]"#);
        assert!(matches!(result, Err(BestiaryError::InvalidRecord(msg)) if msg.contains("entry 1")));
    }

    #[test]
    fn test_load_catalog_json() {
        let catalog = load_catalog_json(
            r#"[
                { "monster_key": "kank", "title": "Kank",
                  "monster_data": { "setting": "Dark Sun", "fullBody": "<b>Kank</b>" } },
                { "monster_key": "imp", "title": "Imp" }
            ]"#,
        )
        .unwrap();

        assert_eq!(catalog.len(), 2);
        let kank = catalog.by_key("kank").unwrap();
        assert_eq!(kank.setting, "Dark Sun");
        assert_eq!(kank.body, "<b>Kank</b>");
    }

    #[test]
    fn test_malformed_document_is_a_serde_error() {
        assert!(matches!(
            load_catalog_json("{ not json"),
            Err(BestiaryError::Serde(_))
        ));
    }
}
