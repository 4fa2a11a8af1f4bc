//! # Encounter Generation
//!
//! Random encounters drawn from the catalog.
//!
//! An encounter is built in three steps: filter the catalog by
//! [`FilterCriteria`], sample distinct creatures without replacement, then
//! resolve each sampled creature's "No. Appearing" independently. All
//! randomness comes from the caller's RNG, so a seeded RNG reproduces an
//! encounter exactly.

use crate::config::{DEFAULT_APPEARING, DEFAULT_ENCOUNTER_SIZE};
use crate::{
    filter, resolve_quantity, BestiaryError, BestiaryResult, Catalog, CreatureRecord,
    FilterCriteria, Resolution, ResolutionPath, StatField,
};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Configuration for encounter generation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterConfig {
    /// Random seed for reproducible encounters; `None` draws from entropy
    #[serde(default)]
    pub seed: Option<u64>,
    /// Number of distinct creatures to draw
    #[serde(default = "default_creature_count")]
    pub creature_count: usize,
    /// Which creatures are eligible
    #[serde(default)]
    pub criteria: FilterCriteria,
}

fn default_creature_count() -> usize {
    DEFAULT_ENCOUNTER_SIZE
}

impl EncounterConfig {
    /// Creates a configuration with the default size and no criteria.
    ///
    /// # Examples
    ///
    /// ```
    /// use bestiary::EncounterConfig;
    ///
    /// let config = EncounterConfig::new(Some(99));
    /// assert_eq!(config.seed, Some(99));
    /// assert!(config.creature_count >= 1);
    /// ```
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            creature_count: DEFAULT_ENCOUNTER_SIZE,
            criteria: FilterCriteria::any(),
        }
    }

    /// Creates a seeded single-creature configuration for tests.
    pub fn for_testing(seed: u64) -> Self {
        Self {
            seed: Some(seed),
            creature_count: 1,
            criteria: FilterCriteria::any(),
        }
    }

    pub fn with_count(mut self, creature_count: usize) -> Self {
        self.creature_count = creature_count;
        self
    }

    pub fn with_criteria(mut self, criteria: FilterCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    /// Reads a JSON configuration file. Missing fields take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> BestiaryResult<Self> {
        let contents = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects configurations that cannot produce an encounter.
    pub fn validate(&self) -> BestiaryResult<()> {
        if self.creature_count == 0 {
            return Err(BestiaryError::InvalidConfig(
                "creature_count must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Creates the random number generator this configuration asks for.
    pub fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}

impl Default for EncounterConfig {
    fn default() -> Self {
        Self::new(None)
    }
}

/// One creature in an encounter with its resolved count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncounterEntry<'a> {
    pub creature: &'a CreatureRecord,
    pub quantity: Resolution,
}

impl<'a> EncounterEntry<'a> {
    pub fn count(&self) -> u32 {
        self.quantity.count
    }

    /// A multi-line stat summary, `N/A` where a field is absent.
    pub fn summary(&self) -> String {
        let field = |f: StatField| self.creature.primary_field(f).unwrap_or("N/A");
        let setting = if self.creature.setting.is_empty() {
            "N/A"
        } else {
            self.creature.setting.as_str()
        };

        let mut lines = vec![format!("Monster: {}", self)];
        for (label, value) in [
            ("Armor Class", field(StatField::ArmorClass)),
            ("Hit Dice", field(StatField::HitDice)),
            ("Number Appearing", field(StatField::NoAppearing)),
            ("THAC0", field(StatField::Thac0)),
            ("XP Value", field(StatField::XpValue)),
            ("Setting", setting),
            ("Environment", field(StatField::ClimateTerrain)),
        ] {
            lines.push(format!("  {}: {}", label, value));
        }
        lines.join("\n")
    }
}

impl fmt::Display for EncounterEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (x{})", self.creature.title, self.quantity.count)
    }
}

/// A generated group of distinct creatures.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Encounter<'a> {
    pub entries: Vec<EncounterEntry<'a>>,
}

impl<'a> Encounter<'a> {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &EncounterEntry<'a>> {
        self.entries.iter()
    }

    /// The encounter as `(creature, count)` pairs.
    pub fn pairs(&self) -> Vec<(&'a CreatureRecord, u32)> {
        self.entries
            .iter()
            .map(|entry| (entry.creature, entry.quantity.count))
            .collect()
    }

    /// Sum of all resolved counts.
    pub fn total_creatures(&self) -> u64 {
        self.entries.iter().map(|e| u64::from(e.quantity.count)).sum()
    }
}

/// Result of a filtered encounter request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum EncounterOutcome<'a> {
    /// Nothing in the catalog matched the criteria
    NoCandidates,
    /// An encounter was drawn from `candidates` matching creatures
    Generated {
        candidates: usize,
        encounter: Encounter<'a>,
    },
}

impl<'a> EncounterOutcome<'a> {
    /// The encounter, or an empty one when nothing matched.
    pub fn into_encounter(self) -> Encounter<'a> {
        match self {
            EncounterOutcome::NoCandidates => Encounter::default(),
            EncounterOutcome::Generated { encounter, .. } => encounter,
        }
    }
}

/// Draws `min(count, n)` distinct records uniformly at random.
///
/// # Examples
///
/// ```
/// use bestiary::{sample, CreatureRecord};
/// use rand::{rngs::StdRng, SeedableRng};
///
/// let records: Vec<_> = (0..5).map(|i| CreatureRecord::new(format!("c{}", i), "C")).collect();
/// let mut rng = StdRng::seed_from_u64(1);
/// assert_eq!(sample(&records, 3, &mut rng).len(), 3);
/// assert_eq!(sample(&records, 10, &mut rng).len(), 5);
/// ```
pub fn sample<'a, I, R>(records: I, count: usize, rng: &mut R) -> Vec<&'a CreatureRecord>
where
    I: IntoIterator<Item = &'a CreatureRecord>,
    R: Rng + ?Sized,
{
    let pool: Vec<&'a CreatureRecord> = records.into_iter().collect();
    pool.choose_multiple(rng, count).copied().collect()
}

/// Resolves how many of a creature appear, using its primary statblock.
///
/// A creature with no statblock resolves to the default count.
pub fn resolve_creature_appearing<R: Rng + ?Sized>(
    creature: &CreatureRecord,
    rng: &mut R,
) -> Resolution {
    if creature.primary_statblock().is_none() {
        log::debug!("'{}' has no statblock, appearing defaults", creature.title);
        return Resolution {
            count: DEFAULT_APPEARING,
            path: ResolutionPath::Missing,
        };
    }
    resolve_quantity(creature.no_appearing(), rng)
}

/// Samples distinct creatures and resolves a count for each.
///
/// An empty candidate set gives an empty encounter.
pub fn generate_encounter<'a, I, R>(records: I, count: usize, rng: &mut R) -> Encounter<'a>
where
    I: IntoIterator<Item = &'a CreatureRecord>,
    R: Rng + ?Sized,
{
    let entries = sample(records, count, rng)
        .into_iter()
        .map(|creature| EncounterEntry {
            creature,
            quantity: resolve_creature_appearing(creature, rng),
        })
        .collect();

    Encounter { entries }
}

/// Filters, samples and resolves according to an [`EncounterConfig`].
#[derive(Debug, Clone, Default)]
pub struct EncounterGenerator {
    pub config: EncounterConfig,
}

impl EncounterGenerator {
    pub fn new(config: EncounterConfig) -> Self {
        Self { config }
    }

    /// Generates an encounter with the caller's RNG.
    pub fn generate<'a, R: Rng + ?Sized>(
        &self,
        catalog: &'a Catalog,
        rng: &mut R,
    ) -> EncounterOutcome<'a> {
        let candidates = filter(catalog.all(), &self.config.criteria);
        if candidates.is_empty() {
            log::info!("No creatures match {:?}", self.config.criteria);
            return EncounterOutcome::NoCandidates;
        }

        let encounter = generate_encounter(
            candidates.iter().copied(),
            self.config.creature_count,
            rng,
        );
        log::info!(
            "Generated encounter of {} creature types from {} candidates",
            encounter.len(),
            candidates.len()
        );

        EncounterOutcome::Generated {
            candidates: candidates.len(),
            encounter,
        }
    }

    /// Generates an encounter with the RNG described by the configuration.
    pub fn generate_seeded<'a>(&self, catalog: &'a Catalog) -> EncounterOutcome<'a> {
        let mut rng = self.config.rng();
        self.generate(catalog, &mut rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Statblock;
    use std::collections::HashSet;

    fn creature(key: &str, terrain: &str, appearing: &str) -> CreatureRecord {
        CreatureRecord::new(key, key.to_uppercase()).with_statblock(
            key,
            Statblock::new()
                .with(StatField::ClimateTerrain, terrain)
                .with(StatField::NoAppearing, appearing),
        )
    }

    fn catalog() -> Catalog {
        Catalog::new(vec![
            creature("kank", "Desert", "2d12"),
            creature("gith", "Desert mountains", "3-12"),
            creature("yeti", "Arctic", "1d2"),
            creature("remorhaz", "Arctic", "1"),
            CreatureRecord::new("shade", "Shade"),
        ])
    }

    #[test]
    fn test_sample_without_replacement() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(3);

        for count in 0..8 {
            let picked = sample(catalog.all(), count, &mut rng);
            assert_eq!(picked.len(), count.min(catalog.len()));

            let keys: HashSet<_> = picked.iter().map(|r| r.key.as_str()).collect();
            assert_eq!(keys.len(), picked.len());
        }
    }

    #[test]
    fn test_empty_candidates_give_empty_encounter() {
        let mut rng = StdRng::seed_from_u64(3);
        let records: Vec<CreatureRecord> = Vec::new();

        assert!(sample(&records, 4, &mut rng).is_empty());
        assert!(generate_encounter(&records, 4, &mut rng).is_empty());
    }

    #[test]
    fn test_creature_without_statblock_appears_once() {
        let mut rng = StdRng::seed_from_u64(3);
        let shade = CreatureRecord::new("shade", "Shade");

        let resolution = resolve_creature_appearing(&shade, &mut rng);
        assert_eq!(resolution.count, 1);
        assert_eq!(resolution.path, ResolutionPath::Missing);
    }

    #[test]
    fn test_each_entry_is_resolved_within_its_expression() {
        let catalog = catalog();
        let mut rng = StdRng::seed_from_u64(11);
        let encounter = generate_encounter(catalog.all(), 5, &mut rng);

        assert_eq!(encounter.len(), 5);
        for entry in encounter.iter() {
            let n = entry.count();
            match entry.creature.key.as_str() {
                "kank" => assert!((2..=24).contains(&n)),
                "gith" => assert!(n == 3 || n == 12),
                "yeti" => assert!((1..=2).contains(&n)),
                _ => assert_eq!(n, 1),
            }
        }
    }

    #[test]
    fn test_generator_filters_first() {
        let catalog = catalog();
        let config = EncounterConfig::for_testing(5)
            .with_count(10)
            .with_criteria(FilterCriteria::any().with_environment("arctic"));
        let generator = EncounterGenerator::new(config);

        match generator.generate_seeded(&catalog) {
            EncounterOutcome::Generated { candidates, encounter } => {
                assert_eq!(candidates, 2);
                let keys: HashSet<_> = encounter.iter().map(|e| e.creature.key.as_str()).collect();
                assert_eq!(keys, HashSet::from(["yeti", "remorhaz"]));
            }
            EncounterOutcome::NoCandidates => panic!("arctic creatures exist"),
        }
    }

    #[test]
    fn test_generator_reports_no_candidates() {
        let catalog = catalog();
        let config = EncounterConfig::for_testing(5)
            .with_criteria(FilterCriteria::any().with_environment("underdark"));

        let outcome = EncounterGenerator::new(config).generate_seeded(&catalog);
        assert_eq!(outcome, EncounterOutcome::NoCandidates);
        assert!(outcome.into_encounter().is_empty());
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let catalog = catalog();
        let generator = EncounterGenerator::new(EncounterConfig::new(Some(2024)));

        let first = generator.generate_seeded(&catalog).into_encounter().pairs();
        let second = generator.generate_seeded(&catalog).into_encounter().pairs();
        assert_eq!(first, second);
    }

    #[test]
    fn test_config_validation() {
        assert!(EncounterConfig::default().validate().is_ok());
        assert!(matches!(
            EncounterConfig::for_testing(1).with_count(0).validate(),
            Err(BestiaryError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_config_defaults_from_partial_json() {
        let config: EncounterConfig =
            serde_json::from_str(r#"{ "criteria": { "setting": "Dark Sun" } }"#).unwrap();

        assert_eq!(config.seed, None);
        assert_eq!(config.creature_count, DEFAULT_ENCOUNTER_SIZE);
        assert_eq!(config.criteria.setting.as_deref(), Some("Dark Sun"));
        assert_eq!(config.criteria.environment, None);
    }

    #[test]
    fn test_entry_display_and_summary() {
        let kank = creature("kank", "Desert", "2d12").with_setting("Dark Sun");
        let entry = EncounterEntry {
            creature: &kank,
            quantity: Resolution {
                count: 7,
                path: ResolutionPath::ChoicePick { candidates: vec![7], picked: 7 },
            },
        };

        assert_eq!(entry.to_string(), "KANK (x7)");
        let summary = entry.summary();
        assert!(summary.starts_with("Monster: KANK (x7)"));
        assert!(summary.contains("  Armor Class: N/A"));
        assert!(summary.contains("  Number Appearing: 2d12"));
        assert!(summary.contains("  Setting: Dark Sun"));
        assert!(summary.contains("  Environment: Desert"));
    }
}
