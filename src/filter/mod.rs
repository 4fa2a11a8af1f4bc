//! # Filter Module
//!
//! Environment and setting predicates over creature records.
//!
//! Filtering is pure and order-preserving: the output is always a
//! subsequence of the input. An empty result is a valid outcome.

use crate::CreatureRecord;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Criteria a creature must satisfy to be selected.
///
/// `None` (or an empty string) acts as a wildcard.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Case-insensitive substring of the primary statblock's Climate/Terrain
    #[serde(default)]
    pub environment: Option<String>,
    /// Case-insensitive exact match on the creature's setting
    #[serde(default)]
    pub setting: Option<String>,
}

/// Why a record was rejected by [`FilterCriteria::evaluate`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterRejection {
    /// An environment was requested but the creature has no statblock
    NoStatblock,
    /// The primary statblock's terrain (missing counts as empty) does not contain the environment
    EnvironmentMismatch,
    /// The creature's setting differs from the requested one
    SettingMismatch,
}

impl fmt::Display for FilterRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FilterRejection::NoStatblock => "no statblock",
            FilterRejection::EnvironmentMismatch => "environment mismatch",
            FilterRejection::SettingMismatch => "setting mismatch",
        };
        f.write_str(text)
    }
}

impl FilterCriteria {
    /// Criteria that match every record.
    pub fn any() -> Self {
        Self::default()
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_setting(mut self, setting: impl Into<String>) -> Self {
        self.setting = Some(setting.into());
        self
    }

    fn environment(&self) -> Option<&str> {
        self.environment.as_deref().filter(|e| !e.is_empty())
    }

    fn setting(&self) -> Option<&str> {
        self.setting.as_deref().filter(|s| !s.is_empty())
    }

    /// Checks a record against the criteria, reporting the first failed check.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary::{CreatureRecord, FilterCriteria, FilterRejection};
    ///
    /// let kank = CreatureRecord::new("kank", "Kank").with_setting("Dark Sun");
    /// let criteria = FilterCriteria::any().with_environment("desert");
    /// assert_eq!(criteria.evaluate(&kank), Err(FilterRejection::NoStatblock));
    /// assert_eq!(FilterCriteria::any().with_setting("DARK SUN").evaluate(&kank), Ok(()));
    /// ```
    pub fn evaluate(&self, record: &CreatureRecord) -> Result<(), FilterRejection> {
        if let Some(environment) = self.environment() {
            if record.primary_statblock().is_none() {
                return Err(FilterRejection::NoStatblock);
            }
            let terrain = record.climate_terrain().unwrap_or_default();
            if !terrain
                .to_lowercase()
                .contains(&environment.to_lowercase())
            {
                return Err(FilterRejection::EnvironmentMismatch);
            }
        }

        if let Some(setting) = self.setting() {
            if setting.to_lowercase() != record.setting.to_lowercase() {
                return Err(FilterRejection::SettingMismatch);
            }
        }

        Ok(())
    }

    pub fn matches(&self, record: &CreatureRecord) -> bool {
        match self.evaluate(record) {
            Ok(()) => true,
            Err(reason) => {
                log::trace!("Skipping '{}': {}", record.title, reason);
                false
            }
        }
    }
}

/// Keeps the records that satisfy `criteria`, in their original order.
///
/// Accepts anything that yields record references, so a filtered result can
/// be filtered again.
///
/// # Examples
///
/// ```
/// use bestiary::{filter, CreatureRecord, FilterCriteria};
///
/// let records = vec![
///     CreatureRecord::new("kank", "Kank").with_setting("Dark Sun"),
///     CreatureRecord::new("beholder", "Beholder").with_setting("Forgotten Realms"),
/// ];
/// let criteria = FilterCriteria::any().with_setting("dark sun");
/// let matched = filter(&records, &criteria);
/// assert_eq!(matched.len(), 1);
/// assert_eq!(matched[0].key, "kank");
/// ```
pub fn filter<'a, I>(records: I, criteria: &FilterCriteria) -> Vec<&'a CreatureRecord>
where
    I: IntoIterator<Item = &'a CreatureRecord>,
{
    let matched: Vec<_> = records
        .into_iter()
        .filter(|record| criteria.matches(record))
        .collect();

    log::debug!(
        "Filter {:?}/{:?} matched {} creatures",
        criteria.environment,
        criteria.setting,
        matched.len()
    );
    matched
}
