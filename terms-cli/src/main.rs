//! terms - search term batch tool
//!
//! Validates term batches, checks them against the stored documents and
//! seeds or appends them. Also creates batches from comma-delimited lists
//! and inspects terms/titles list files.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use terms_cli::create::{self, Collected, CreateInput};
use terms_cli::lists::{self, ListPair};
use terms_cli::logging;
use terms_cli::workflow::{self, Outcome, WorkflowOptions, WriteMode};
use terms_cli::{AssumeYes, Prompter, StdinPrompter};
use terms_common::config::{ConfigOverrides, ResolvedConfig};
use terms_common::logger::ConsoleLogger;
use terms_common::store::SqliteDocumentStore;
use terms_common::TermsRepository;
use tracing::{debug, info};
use tracing_subscriber::util::SubscriberInitExt;

/// Command-line arguments for terms
#[derive(Parser, Debug)]
#[command(name = "terms")]
#[command(about = "Validate, seed and append search term batches")]
#[command(version)]
struct Args {
    /// Config file (default: <config dir>/terms/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database holding the term documents
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Collection the term documents live in
    #[arg(long, global = true)]
    collection: Option<String>,

    /// Directory for batch dumps written by `create`
    #[arg(long, global = true)]
    dump_dir: Option<PathBuf>,

    /// Report which validation rule failed and the offending record
    #[arg(long, global = true)]
    debug: bool,

    /// Debug-level logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Answer yes to every confirmation
    #[arg(short, long, global = true)]
    yes: bool,

    /// Validate and check conflicts, but write nothing
    #[arg(long, global = true)]
    dry_run: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create a batch from comma-delimited terms and titles
    Create {
        /// Term type, or 1 for 'front end' / 2 for 'back end'
        #[arg(short = 't', long = "type")]
        record_type: Option<String>,

        /// Comma-delimited terms
        #[arg(long)]
        terms: Option<String>,

        /// Comma-delimited titles, one per term
        #[arg(long)]
        titles: Option<String>,

        /// Overwrite-seed the created batch (asks for confirmation)
        #[arg(long, conflicts_with = "append")]
        seed: bool,

        /// Append the created batch after a conflict check
        #[arg(long)]
        append: bool,

        /// Skip writing the dump file
        #[arg(long)]
        no_dump: bool,
    },

    /// Seed a document from a batch file
    Seed {
        /// Replace the document if it already exists
        #[arg(long)]
        force: bool,

        file: PathBuf,
    },

    /// Append a batch file to its existing document
    Append { file: PathBuf },

    /// Validate a batch file and report conflicts without writing
    Check { file: PathBuf },

    /// Inspect line-delimited terms and titles files
    Lists {
        #[command(subcommand)]
        command: ListsCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ListsCommand {
    /// Show terms and their titles side by side
    #[command(visible_aliases = ["s", "view"])]
    Show { terms: PathBuf, titles: PathBuf },

    /// Check that both files have the same number of items
    #[command(visible_aliases = ["c", "report"])]
    Check { terms: PathBuf, titles: PathBuf },

    /// Print both files as comma-delimited lists
    #[command(visible_aliases = ["makelist"])]
    Convert { terms: PathBuf, titles: PathBuf },
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let (subscriber, log_filter) =
        logging::subscriber(logging::startup_filter(args.verbose), std::io::stderr);
    subscriber.init();

    info!("Starting terms v{}", env!("CARGO_PKG_VERSION"));

    let config = ResolvedConfig::resolve(&ConfigOverrides {
        config_path: args.config.clone(),
        database_path: args.database.clone(),
        collection: args.collection.clone(),
        dump_dir: args.dump_dir.clone(),
    })
    .context("Failed to load configuration")?;

    logging::apply_config_level(&log_filter, &config.log_level, logging::level_fixed(args.verbose))?;
    if let Some(path) = &config.config_file {
        debug!("Config file: {}", path.display());
    }

    let code = run(args, config).await?;
    if code != 0 {
        std::process::exit(code);
    }
    Ok(())
}

async fn run(args: Args, config: ResolvedConfig) -> Result<i32> {
    let options = WorkflowOptions {
        debug: args.debug,
        dry_run: args.dry_run,
    };
    let mut prompter: Box<dyn Prompter> = if args.yes {
        Box::new(AssumeYes)
    } else {
        Box::new(StdinPrompter::new())
    };

    match args.command {
        Command::Create {
            record_type,
            terms,
            titles,
            seed,
            append,
            no_dump,
        } => {
            let input = CreateInput {
                record_type,
                terms,
                titles,
            };
            let records = match create::collect_batch(&input, prompter.as_mut())? {
                Collected::Records(records) => records,
                Collected::Quit => {
                    println!("Program complete, goodbye.");
                    return Ok(0);
                }
            };

            println!("{}", serde_json::to_string_pretty(&records)?);
            if !no_dump {
                let path = create::write_dump(&config.dump_dir, &records, chrono::Utc::now())?;
                println!("{}", format!("The output has been written to: {}", path.display()).yellow());
            }

            let mode = if seed {
                WriteMode::OverwriteSeed
            } else if append {
                WriteMode::Append
            } else {
                return Ok(0);
            };

            let repo = open_repository(&config).await?;
            let outcome =
                workflow::run_records(&repo, &records, mode, prompter.as_mut(), &ConsoleLogger, options)
                    .await;
            Ok(finish(&outcome))
        }

        Command::Seed { force, file } => {
            let mode = if force {
                WriteMode::OverwriteSeed
            } else {
                WriteMode::Seed
            };
            run_batch_file(&config, &file, mode, prompter.as_mut(), options).await
        }

        Command::Append { file } => {
            run_batch_file(&config, &file, WriteMode::Append, prompter.as_mut(), options).await
        }

        Command::Check { file } => {
            run_batch_file(&config, &file, WriteMode::Check, prompter.as_mut(), options).await
        }

        Command::Lists { command } => {
            let code = match command {
                ListsCommand::Show { terms, titles } => lists::show(&ListPair::load(&terms, &titles)?),
                ListsCommand::Check { terms, titles } => lists::check(&ListPair::load(&terms, &titles)?),
                ListsCommand::Convert { terms, titles } => {
                    lists::convert(&ListPair::load(&terms, &titles)?)
                }
            };
            Ok(code)
        }
    }
}

async fn open_repository(config: &ResolvedConfig) -> Result<TermsRepository<SqliteDocumentStore>> {
    info!("Database path: {}", config.database_path.display());
    let store = SqliteDocumentStore::open(&config.database_path)
        .await
        .with_context(|| format!("Failed to open database: {}", config.database_path.display()))?;
    Ok(TermsRepository::new(store, config.collection.clone()))
}

async fn run_batch_file(
    config: &ResolvedConfig,
    file: &Path,
    mode: WriteMode,
    prompter: &mut dyn Prompter,
    options: WorkflowOptions,
) -> Result<i32> {
    let raw = terms_cli::batch_file::load_batch(file)?;
    let repo = open_repository(config).await?;
    let outcome = workflow::run_raw(&repo, &raw, mode, prompter, &ConsoleLogger, options).await;
    Ok(finish(&outcome))
}

/// Print the outcome and return its exit code
fn finish(outcome: &Outcome) -> i32 {
    let message = outcome.message();
    match outcome {
        Outcome::Done(_) => {
            println!("{}", message.green());
            println!("Program complete, goodbye.");
        }
        Outcome::Declined(_) => println!("{}", message.yellow()),
        _ => eprintln!("{}", message.red()),
    }
    outcome.exit_code()
}
