//! # Bestiary Command Line
//!
//! Loads a creature catalog and runs listing, filtering and encounter queries
//! against it.

use bestiary::{
    filter, load_catalog_file, resolve_quantity, BestiaryError, BestiaryResult, Catalog,
    EncounterConfig, EncounterGenerator, EncounterOutcome, FilterCriteria,
};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Command line arguments for the bestiary.
#[derive(Parser, Debug)]
#[command(name = "bestiary")]
#[command(about = "A creature catalog with random encounter generation")]
#[command(version)]
struct Args {
    /// Catalog import file (JSON)
    #[arg(short, long, default_value = bestiary::config::DEFAULT_CATALOG_PATH)]
    catalog: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List creatures, optionally narrowed by a title search
    List {
        #[arg(short, long)]
        search: Option<String>,
    },

    /// Show one creature as JSON
    Show { key: String },

    /// List creatures matching environment/setting criteria
    Filter {
        #[command(flatten)]
        criteria: CriteriaArgs,
    },

    /// Generate a random encounter
    Encounter {
        /// Number of distinct creatures to draw
        #[arg(short = 'n', long)]
        count: Option<usize>,

        /// Random seed for a reproducible encounter
        #[arg(short, long)]
        seed: Option<u64>,

        /// Encounter configuration file (JSON); flags override its values
        #[arg(long)]
        config: Option<PathBuf>,

        /// Print the encounter as JSON
        #[arg(long)]
        json: bool,

        #[command(flatten)]
        criteria: CriteriaArgs,
    },

    /// Resolve a "No. Appearing" expression without a catalog
    Appearing {
        expression: String,

        #[arg(short, long)]
        seed: Option<u64>,
    },
}

#[derive(clap::Args, Debug)]
struct CriteriaArgs {
    /// Climate/terrain substring, e.g. "desert"
    #[arg(short, long)]
    environment: Option<String>,

    /// Campaign setting, e.g. "Dark Sun"
    #[arg(long)]
    setting: Option<String>,
}

impl CriteriaArgs {
    fn apply(self, mut criteria: FilterCriteria) -> FilterCriteria {
        if self.environment.is_some() {
            criteria.environment = self.environment;
        }
        if self.setting.is_some() {
            criteria.setting = self.setting;
        }
        criteria
    }
}

fn main() {
    let args = Args::parse();

    if let Err(e) = initialize_logging(&args.log_level) {
        eprintln!("Failed to initialize logging: {}", e);
    }

    log::info!("Starting bestiary v{}", bestiary::VERSION);

    if let Err(e) = run(args) {
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

/// Initializes the logging system based on the specified log level.
fn initialize_logging(log_level: &str) -> BestiaryResult<()> {
    #[cfg(feature = "dev-tools")]
    {
        use tracing::Level;

        let level = match log_level.to_lowercase().as_str() {
            "error" => Level::ERROR,
            "warn" => Level::WARN,
            "info" => Level::INFO,
            "debug" => Level::DEBUG,
            "trace" => Level::TRACE,
            _ => Level::WARN,
        };

        tracing_subscriber::fmt()
            .with_max_level(level)
            .with_target(false)
            .try_init()
            .map_err(|e| BestiaryError::InvalidConfig(e.to_string()))?;
    }

    #[cfg(not(feature = "dev-tools"))]
    {
        env_logger::Builder::new()
            .parse_filters(log_level)
            .format_target(false)
            .try_init()
            .map_err(|e| BestiaryError::InvalidConfig(e.to_string()))?;
    }

    Ok(())
}

fn run(args: Args) -> BestiaryResult<()> {
    let catalog_path = args.catalog;
    let load = || -> BestiaryResult<Catalog> {
        let catalog = load_catalog_file(&catalog_path)?;
        log::info!("Loaded {} creatures", catalog.len());
        Ok(catalog)
    };

    match args.command {
        Command::Appearing { expression, seed } => {
            let mut rng = EncounterConfig::new(seed).rng();
            let resolution = resolve_quantity(Some(expression.as_str()), &mut rng);
            println!("{}", resolution);
        }

        Command::List { search } => {
            let catalog = load()?;
            for record in catalog.search_titles(search.as_deref().unwrap_or("")) {
                println!("{}: {}", record.key, record.title);
            }
        }

        Command::Show { key } => {
            let catalog = load()?;
            let record = catalog.get(&key)?;
            println!("{}", serde_json::to_string_pretty(record)?);
        }

        Command::Filter { criteria } => {
            let catalog = load()?;
            let criteria = criteria.apply(FilterCriteria::any());
            let matched = filter(catalog.all(), &criteria);
            if matched.is_empty() {
                println!("No creatures found with the specified criteria.");
            }
            for record in matched {
                println!("{}: {}", record.key, record.title);
            }
        }

        Command::Encounter {
            count,
            seed,
            config,
            json,
            criteria,
        } => {
            let mut encounter_config = match config {
                Some(path) => EncounterConfig::from_file(path)?,
                None => EncounterConfig::default(),
            };
            if let Some(count) = count {
                encounter_config.creature_count = count;
            }
            if seed.is_some() {
                encounter_config.seed = seed;
            }
            encounter_config.criteria = criteria.apply(encounter_config.criteria);
            encounter_config.validate()?;

            let catalog = load()?;
            let outcome = EncounterGenerator::new(encounter_config).generate_seeded(&catalog);
            if json {
                println!("{}", serde_json::to_string_pretty(&outcome)?);
                return Ok(());
            }
            print_encounter(&outcome);
        }
    }

    Ok(())
}

fn print_encounter(outcome: &EncounterOutcome<'_>) {
    match outcome {
        EncounterOutcome::NoCandidates => {
            println!("No creatures found with the specified criteria.");
        }
        EncounterOutcome::Generated { encounter, .. } => {
            for entry in encounter.iter() {
                println!("\n{}", entry.summary());
            }
            println!();
        }
    }
}
