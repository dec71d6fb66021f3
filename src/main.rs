use anyhow::Context;
use clap::{Parser, Subcommand, ValueEnum};
use lexicorrect::config::{self, Config};
use lexicorrect::matcher::Corrector;
use lexicorrect::store::{self, LexiconStore, StoreError};
use lexicorrect::validation::{ValidationResult, Validator};
use std::io::Read;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "lexicorrect")]
#[command(author, version, about = "Lexicon validation and text correction", long_about = None)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file (default: platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Lexicon store file (overrides the config)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a term without storing it
    Check {
        #[arg(short, long)]
        lexicon: String,

        #[arg(short, long)]
        term: String,

        #[arg(short, long)]
        replacement: String,

        /// Validate as an update of this term id
        #[arg(long)]
        update: Option<String>,

        /// Skip substring conflict warnings
        #[arg(long)]
        no_conflicts: bool,

        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Validate and add a term
    Add {
        #[arg(short, long)]
        lexicon: String,

        #[arg(short, long)]
        term: String,

        #[arg(short, long)]
        replacement: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Validate and update an existing term
    Update {
        #[arg(long)]
        id: String,

        #[arg(short, long)]
        term: String,

        #[arg(short, long)]
        replacement: String,

        #[arg(short, long, value_enum, default_value = "text")]
        format: Format,
    },

    /// Deactivate a term
    Remove {
        #[arg(long)]
        id: String,
    },

    /// Import terms from a TOML file of [[terms]] entries
    Import {
        #[arg(short, long)]
        lexicon: String,

        /// File to import
        file: PathBuf,
    },

    /// List active terms
    List {
        #[arg(short, long)]
        lexicon: Option<String>,
    },

    /// Apply a lexicon to text (reads stdin when TEXT is omitted)
    Correct {
        #[arg(short, long)]
        lexicon: String,

        text: Option<String>,
    },

    /// Show configuration
    Config {
        /// Show current configuration
        #[arg(long)]
        show: bool,
    },
}

fn init_logging(verbose: bool, level: &str) {
    let filter = if verbose {
        EnvFilter::new("lexicorrect=debug")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("lexicorrect={}", level.to_lowercase())))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    };
    config.context("Failed to load configuration")
}

fn open_store(cli_path: Option<PathBuf>, config: &Config) -> anyhow::Result<LexiconStore> {
    let path = match cli_path {
        Some(path) => path,
        None => config.store_path()?,
    };
    let validator = Validator::new(config.validation.clone());
    LexiconStore::open(&path, validator)
        .with_context(|| format!("Failed to open lexicon store {}", path.display()))
}

/// Print a validation result; returns whether it was valid.
fn report(result: &ValidationResult, format: Format) -> anyhow::Result<bool> {
    match format {
        Format::Json => {
            let payload = result.to_error_payload();
            println!("{}", serde_json::to_string_pretty(&payload)?);
        }
        Format::Text => {
            if result.is_valid() {
                println!("OK");
            }
            for issue in result.errors.iter() {
                println!("error: {}", issue);
            }
            for issue in result.warnings.iter() {
                println!("warning: {}", issue);
            }
        }
    }
    Ok(result.is_valid())
}

/// Report a store edit. Rejections are printed, not propagated.
fn report_edit(
    outcome: Result<ValidationResult, StoreError>,
    format: Format,
) -> anyhow::Result<bool> {
    match outcome {
        Ok(result) => report(&result, format),
        Err(StoreError::Rejected(result)) => report(&result, format),
        Err(e) => Err(e.into()),
    }
}

fn require_lexicon(lexicon: &str) -> anyhow::Result<()> {
    anyhow::ensure!(!lexicon.trim().is_empty(), "lexicon id must not be empty");
    Ok(())
}

fn print_text(text: &str) {
    if text.ends_with('\n') {
        print!("{}", text);
    } else {
        println!("{}", text);
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_logging(cli.verbose, &config.logging.level);

    let ok = match cli.command {
        Commands::Check {
            lexicon,
            term,
            replacement,
            update,
            no_conflicts,
            format,
        } => {
            require_lexicon(&lexicon)?;
            let store = open_store(cli.store, &config)?;
            let validator = Validator::new(config.validation.clone())
                .with_conflict_checks(config.validation.check_conflicts && !no_conflicts);
            let result = validator.validate_term(
                store.all_terms(),
                &lexicon,
                &term,
                &replacement,
                update.as_deref(),
            );
            report(&result, format)?
        }

        Commands::Add {
            lexicon,
            term,
            replacement,
            format,
        } => {
            require_lexicon(&lexicon)?;
            let mut store = open_store(cli.store, &config)?;
            let outcome = store.add_term(&lexicon, &term, &replacement);
            if let Ok((ref added, _)) = outcome {
                if let Format::Text = format {
                    println!("Added term {}", added.id);
                }
            }
            report_edit(outcome.map(|(_, result)| result), format)?
        }

        Commands::Update {
            id,
            term,
            replacement,
            format,
        } => {
            let mut store = open_store(cli.store, &config)?;
            report_edit(store.update_term(&id, &term, &replacement), format)?
        }

        Commands::Remove { id } => {
            let mut store = open_store(cli.store, &config)?;
            store.deactivate(&id)?;
            println!("Removed term {}", id);
            true
        }

        Commands::Import { lexicon, file } => {
            require_lexicon(&lexicon)?;
            let contents = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let candidates = store::parse_import(&contents)?;

            let mut store = open_store(cli.store, &config)?;
            let results = store.import(&lexicon, &candidates)?;

            let mut accepted = 0;
            for (index, result) in &results {
                let (term, _) = &candidates[*index];
                if result.is_valid() {
                    accepted += 1;
                }
                for issue in result.errors.iter() {
                    println!("[{}] {}: error: {}", index, term, issue);
                }
                for issue in result.warnings.iter() {
                    println!("[{}] {}: warning: {}", index, term, issue);
                }
            }
            println!("Imported {} of {} terms", accepted, candidates.len());
            accepted == candidates.len()
        }

        Commands::List { lexicon } => {
            let store = open_store(cli.store, &config)?;
            let terms = store
                .all_terms()
                .iter()
                .filter(|t| t.active)
                .filter(|t| lexicon.as_deref().map_or(true, |l| t.lexicon_id == l));
            for term in terms {
                println!(
                    "{}\t{}\t{}\t{}",
                    term.id, term.lexicon_id, term.term, term.replacement
                );
            }
            true
        }

        Commands::Correct { lexicon, text } => {
            require_lexicon(&lexicon)?;
            let text = match text {
                Some(text) => text,
                None => {
                    let mut buf = String::new();
                    std::io::stdin()
                        .read_to_string(&mut buf)
                        .context("Failed to read stdin")?;
                    buf
                }
            };

            if config.correction.enabled {
                let store = open_store(cli.store, &config)?;
                let corrector = Corrector::new(&store.resolved(&lexicon));
                let correction = corrector.apply_with_stats(&text);
                info!(
                    "Applied {} replacement(s) from '{}'",
                    correction.replacements, lexicon
                );
                print_text(&correction.text);
            } else {
                debug!("Correction disabled, passing text through");
                print_text(&text);
            }
            true
        }

        Commands::Config { show } => {
            if show {
                print!("{}", config::show(&config)?);
            } else {
                println!("Use --show to print the effective configuration");
            }
            true
        }
    };

    if !ok {
        std::process::exit(1);
    }
    Ok(())
}
