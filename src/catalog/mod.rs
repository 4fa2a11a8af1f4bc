//! # Catalog Module
//!
//! The in-memory creature catalog.
//!
//! Records are produced once by [`ingest`] and never mutated afterwards. The
//! catalog answers read queries only: the full listing, lookup by key, title
//! search and image lookup.

pub mod ingest;
pub mod statblock;

pub use ingest::*;
pub use statblock::*;

use crate::{BestiaryError, BestiaryResult};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A single catalog entry describing one creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatureRecord {
    /// Stable identifier, unique within a catalog
    pub key: String,
    /// Display name
    pub title: String,
    /// Campaign setting tag (may be empty)
    pub setting: String,
    /// Free-text description, stored verbatim
    pub body: String,
    /// Provenance labels, in source order
    pub sources: Vec<String>,
    /// Named statblocks, in the order they were ingested
    pub statblocks: Vec<NamedStatblock>,
    /// Image references, in source order
    pub images: Vec<String>,
}

impl CreatureRecord {
    /// Creates a record with only a key and title set.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary::{CreatureRecord, StatField, Statblock};
    ///
    /// let gith = CreatureRecord::new("gith", "Gith")
    ///     .with_setting("Dark Sun")
    ///     .with_statblock("Gith", Statblock::new().with(StatField::ClimateTerrain, "Mountains"));
    /// assert_eq!(gith.climate_terrain(), Some("Mountains"));
    /// ```
    pub fn new(key: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            setting: String::new(),
            body: String::new(),
            sources: Vec::new(),
            statblocks: Vec::new(),
            images: Vec::new(),
        }
    }

    pub fn with_setting(mut self, setting: impl Into<String>) -> Self {
        self.setting = setting.into();
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.sources.push(source.into());
        self
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.images.push(image.into());
        self
    }

    /// Appends a named statblock. A name already in use is replaced in place,
    /// keeping names unique per creature.
    pub fn with_statblock(mut self, name: impl Into<String>, statblock: Statblock) -> Self {
        let name = name.into();
        match self.statblocks.iter_mut().find(|s| s.name == name) {
            Some(existing) => existing.statblock = statblock,
            None => self.statblocks.push(NamedStatblock::new(name, statblock)),
        }
        self
    }

    /// The statblock that governs filtering and quantity resolution: the
    /// first one in stored order.
    pub fn primary_statblock(&self) -> Option<&Statblock> {
        self.statblocks.first().map(|named| &named.statblock)
    }

    /// Looks up a statblock by name.
    pub fn statblock(&self, name: &str) -> Option<&Statblock> {
        self.statblocks
            .iter()
            .find(|named| named.name == name)
            .map(|named| &named.statblock)
    }

    /// Reads a field from the primary statblock.
    pub fn primary_field(&self, field: StatField) -> Option<&str> {
        self.primary_statblock().and_then(|block| block.get(field))
    }

    pub fn climate_terrain(&self) -> Option<&str> {
        self.primary_field(StatField::ClimateTerrain)
    }

    pub fn no_appearing(&self) -> Option<&str> {
        self.primary_field(StatField::NoAppearing)
    }
}

/// Read-only store of creature records.
///
/// Keeps records in load order and indexes them by key.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    records: Vec<CreatureRecord>,
    index: HashMap<String, usize>,
}

impl Catalog {
    /// Builds a catalog from already-normalized records.
    ///
    /// Keys must be unique: when a key repeats, the first record keeps it and
    /// later ones are dropped.
    pub fn new(records: impl IntoIterator<Item = CreatureRecord>) -> Self {
        let mut catalog = Self::default();

        for record in records {
            if catalog.index.contains_key(&record.key) {
                log::warn!(
                    "Duplicate creature key '{}' ({}), keeping the first record",
                    record.key,
                    record.title
                );
                continue;
            }
            catalog
                .index
                .insert(record.key.clone(), catalog.records.len());
            catalog.records.push(record);
        }

        log::debug!("Catalog built with {} creatures", catalog.records.len());
        catalog
    }

    /// All records in load order.
    pub fn all(&self) -> &[CreatureRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &CreatureRecord> {
        self.records.iter()
    }

    /// Looks up a record by key. A miss is `None`, never a failure.
    pub fn by_key(&self, key: &str) -> Option<&CreatureRecord> {
        self.index.get(key).map(|&i| &self.records[i])
    }

    /// Looks up a record by key, turning a miss into
    /// [`BestiaryError::UnknownCreatureKey`].
    pub fn get(&self, key: &str) -> BestiaryResult<&CreatureRecord> {
        self.by_key(key)
            .ok_or_else(|| BestiaryError::UnknownCreatureKey(key.to_string()))
    }

    /// Case-insensitive substring search over titles, in load order.
    ///
    /// An empty query returns every record.
    pub fn search_titles(&self, query: &str) -> Vec<&CreatureRecord> {
        let needle = query.trim().to_lowercase();
        self.records
            .iter()
            .filter(|record| record.title.to_lowercase().contains(&needle))
            .collect()
    }

    /// Image references for one creature, or `None` for an unknown key.
    pub fn images_for(&self, key: &str) -> Option<&[String]> {
        self.by_key(key).map(|record| record.images.as_slice())
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl FromIterator<CreatureRecord> for Catalog {
    fn from_iter<I: IntoIterator<Item = CreatureRecord>>(iter: I) -> Self {
        Self::new(iter)
    }
}
