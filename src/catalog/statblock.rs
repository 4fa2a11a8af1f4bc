//! # Statblocks
//!
//! Tabular creature attributes keyed by a closed set of field names.
//!
//! Values are kept as the raw text found in the source data. A field that was
//! never supplied is absent, which is a different state from a field that is
//! present but empty or unparsable.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The known statblock fields.
///
/// Each variant serializes as the label used in the source data, so a
/// [`Statblock`] round-trips through JSON with its original field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StatField {
    #[serde(rename = "Activity Cycle")]
    ActivityCycle,
    #[serde(rename = "Alignment")]
    Alignment,
    #[serde(rename = "Armor Class")]
    ArmorClass,
    #[serde(rename = "Climate/Terrain")]
    ClimateTerrain,
    #[serde(rename = "Damage/Attack")]
    DamageAttack,
    #[serde(rename = "Diet")]
    Diet,
    #[serde(rename = "Frequency")]
    Frequency,
    #[serde(rename = "Hit Dice")]
    HitDice,
    #[serde(rename = "Intelligence")]
    Intelligence,
    #[serde(rename = "Magic Resistance")]
    MagicResistance,
    #[serde(rename = "Morale")]
    Morale,
    #[serde(rename = "Movement")]
    Movement,
    #[serde(rename = "No. Appearing")]
    NoAppearing,
    #[serde(rename = "No. of Attacks")]
    NoOfAttacks,
    #[serde(rename = "Organization")]
    Organization,
    #[serde(rename = "Size")]
    Size,
    #[serde(rename = "Special Attacks")]
    SpecialAttacks,
    #[serde(rename = "Special Defenses")]
    SpecialDefenses,
    #[serde(rename = "THAC0")]
    Thac0,
    #[serde(rename = "Treasure")]
    Treasure,
    #[serde(rename = "XP Value")]
    XpValue,
}

impl StatField {
    /// Every known field, in label order.
    pub const ALL: [StatField; 21] = [
        StatField::ActivityCycle,
        StatField::Alignment,
        StatField::ArmorClass,
        StatField::ClimateTerrain,
        StatField::DamageAttack,
        StatField::Diet,
        StatField::Frequency,
        StatField::HitDice,
        StatField::Intelligence,
        StatField::MagicResistance,
        StatField::Morale,
        StatField::Movement,
        StatField::NoAppearing,
        StatField::NoOfAttacks,
        StatField::Organization,
        StatField::Size,
        StatField::SpecialAttacks,
        StatField::SpecialDefenses,
        StatField::Thac0,
        StatField::Treasure,
        StatField::XpValue,
    ];

    /// Gets the label this field carries in source data.
    pub fn label(self) -> &'static str {
        match self {
            StatField::ActivityCycle => "Activity Cycle",
            StatField::Alignment => "Alignment",
            StatField::ArmorClass => "Armor Class",
            StatField::ClimateTerrain => "Climate/Terrain",
            StatField::DamageAttack => "Damage/Attack",
            StatField::Diet => "Diet",
            StatField::Frequency => "Frequency",
            StatField::HitDice => "Hit Dice",
            StatField::Intelligence => "Intelligence",
            StatField::MagicResistance => "Magic Resistance",
            StatField::Morale => "Morale",
            StatField::Movement => "Movement",
            StatField::NoAppearing => "No. Appearing",
            StatField::NoOfAttacks => "No. of Attacks",
            StatField::Organization => "Organization",
            StatField::Size => "Size",
            StatField::SpecialAttacks => "Special Attacks",
            StatField::SpecialDefenses => "Special Defenses",
            StatField::Thac0 => "THAC0",
            StatField::Treasure => "Treasure",
            StatField::XpValue => "XP Value",
        }
    }

    /// Looks up a field by its source label.
    ///
    /// An exact match is tried first, then a case-insensitive one with
    /// surrounding whitespace ignored.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary::StatField;
    ///
    /// assert_eq!(StatField::from_label("No. Appearing"), Some(StatField::NoAppearing));
    /// assert_eq!(StatField::from_label(" thac0 "), Some(StatField::Thac0));
    /// assert_eq!(StatField::from_label("Favourite Colour"), None);
    /// ```
    pub fn from_label(label: &str) -> Option<Self> {
        if let Some(field) = Self::ALL.iter().find(|f| f.label() == label) {
            return Some(*field);
        }

        let label = label.trim();
        Self::ALL
            .iter()
            .find(|f| f.label().eq_ignore_ascii_case(label))
            .copied()
    }
}

impl fmt::Display for StatField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A set of known fields mapped to their raw text values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Statblock {
    fields: BTreeMap<StatField, String>,
}

impl Statblock {
    /// Creates an empty statblock.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns this statblock with `field` set to `value`.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary::{StatField, Statblock};
    ///
    /// let block = Statblock::new()
    ///     .with(StatField::ClimateTerrain, "Hot Desert")
    ///     .with(StatField::NoAppearing, "1d4+1");
    /// assert_eq!(block.get(StatField::NoAppearing), Some("1d4+1"));
    /// assert_eq!(block.get(StatField::Thac0), None);
    /// ```
    pub fn with(mut self, field: StatField, value: impl Into<String>) -> Self {
        self.insert(field, value);
        self
    }

    /// Sets a field, replacing any earlier value.
    pub fn insert(&mut self, field: StatField, value: impl Into<String>) {
        self.fields.insert(field, value.into());
    }

    /// Gets a field's raw text, or `None` when the field is absent.
    pub fn get(&self, field: StatField) -> Option<&str> {
        self.fields.get(&field).map(String::as_str)
    }

    /// Checks whether a field is present (possibly with empty text).
    pub fn contains(&self, field: StatField) -> bool {
        self.fields.contains_key(&field)
    }

    /// Iterates present fields in label order.
    pub fn iter(&self) -> impl Iterator<Item = (StatField, &str)> {
        self.fields.iter().map(|(field, value)| (*field, value.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A statblock together with the name it is filed under on its creature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamedStatblock {
    pub name: String,
    pub statblock: Statblock,
}

impl NamedStatblock {
    pub fn new(name: impl Into<String>, statblock: Statblock) -> Self {
        Self {
            name: name.into(),
            statblock,
        }
    }
}
