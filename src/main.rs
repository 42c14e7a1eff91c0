// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{anyhow, Context, Result};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn, Level, LevelFilter, Log, Metadata, Record, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use termguard::app_config::{self, Config};
use termguard::database::connection::DatabaseConnection;
use termguard::database::models::{GlossaryEntry, GlossaryRecord};
use termguard::database::Repository;
use termguard::glossary::{GlossaryService, LanguageScope};
use termguard::language_utils::supports_glossary;
use termguard::providers::DeepL;
use termguard::sync::GlossarySyncManager;

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

/// termguard - glossary enforcement for machine translation
///
/// Maintains glossaries, matches their terms in text, checks and fixes
/// translations, and mirrors glossaries onto DeepL.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CommandLineOptions {
    /// Configuration file path
    #[arg(short, long, default_value = "conf.json", global = true)]
    config_path: PathBuf,

    /// Set logging level
    #[arg(short, long, value_enum, global = true)]
    log_level: Option<CliLogLevel>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Manage glossaries
    #[command(subcommand)]
    Glossary(GlossaryCommand),

    /// Manage glossary entries
    #[command(subcommand)]
    Entry(EntryCommand),

    /// Bulk-load entries from a tab-separated file
    ImportTsv {
        /// Glossary to import into
        glossary_id: String,
        /// File with source<TAB>target[<TAB>notes] lines
        file: PathBuf,
        /// Target language of the entries (defaults to the configured one)
        #[arg(short, long)]
        target_language: Option<String>,
        /// Mark imported entries case-sensitive
        #[arg(long)]
        case_sensitive: bool,
    },

    /// Print the glossary matches found in a text
    Match {
        text: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Print the glossary prompt block for a batch of texts
    Filter {
        #[arg(required = true)]
        texts: Vec<String>,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Check a translation against the glossary
    Check {
        source: String,
        target: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Force glossary terms into a translation
    Fix {
        source: String,
        target: String,
        #[command(flatten)]
        scope: ScopeArgs,
    },

    /// Mirror glossaries onto DeepL
    Sync(SyncArgs),

    /// List all remote glossary mappings
    Mappings,

    /// Show statistics for a glossary, or store totals without one
    Stats { glossary_id: Option<String> },

    /// Generate shell completions for termguard
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Debug)]
enum GlossaryCommand {
    /// Create a glossary
    Create {
        name: String,
        #[arg(short, long)]
        description: Option<String>,
        /// Restrict the glossary to one game
        #[arg(short, long)]
        game: Option<String>,
        /// Restrict the glossary to one target language
        #[arg(short, long)]
        target_language: Option<String>,
    },
    /// List glossaries
    List,
    /// Delete a glossary and its remote copies
    Delete { glossary_id: String },
}

#[derive(Subcommand, Debug)]
enum EntryCommand {
    /// Add an entry
    Add {
        glossary_id: String,
        source: String,
        target: String,
        /// Target language (defaults to the configured one)
        #[arg(short, long)]
        target_language: Option<String>,
        #[arg(long)]
        case_sensitive: bool,
        #[arg(short, long)]
        notes: Option<String>,
        #[arg(long)]
        category: Option<String>,
    },
    /// List the entries of a glossary
    List {
        glossary_id: String,
        /// Only entries for this target language
        #[arg(short, long)]
        target_language: Option<String>,
    },
    /// Delete an entry
    Delete { entry_id: String },
}

#[derive(Args, Debug)]
struct ScopeArgs {
    /// Target language (defaults to the configured one)
    #[arg(short, long)]
    target_language: Option<String>,
    /// Include the glossaries of this game
    #[arg(short, long)]
    game: Option<String>,
}

#[derive(Args, Debug)]
struct SyncArgs {
    /// Glossaries to sync
    glossary_ids: Vec<String>,
    /// Sync every glossary
    #[arg(long, conflicts_with = "glossary_ids")]
    all: bool,
    /// Replace remote glossaries even when they are up to date
    #[arg(short, long)]
    force: bool,
    /// Source language (defaults to the configured one)
    #[arg(long)]
    source_language: Option<String>,
    /// Target language (defaults to the configured one)
    #[arg(long)]
    target_language: Option<String>,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        log::set_boxed_logger(Box::new(CustomLogger { level: LevelFilter::Trace }))?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and tag for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("1;31", "ERROR"),
            Level::Warn => ("1;33", "WARN "),
            Level::Info => ("1;32", "INFO "),
            Level::Debug => ("1;36", "DEBUG"),
            Level::Trace => ("1;35", "TRACE"),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, tag) = Self::style_for_level(record.level());
            let _ = writeln!(
                std::io::stderr(),
                "\x1B[{}m{} {} {}\x1B[0m",
                color,
                now,
                tag,
                record.args()
            );
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

/// Everything a command needs
struct AppContext {
    config: Config,
    repo: Repository,
    service: GlossaryService,
}

impl AppContext {
    fn open(config: Config) -> Result<Self> {
        let db_path = config.database_path()?;
        let repo = Repository::new(DatabaseConnection::new(&db_path)?);
        let service = GlossaryService::new(repo.clone(), config.matching.clone());
        Ok(Self { config, repo, service })
    }

    fn target_language(&self, explicit: Option<String>) -> String {
        explicit.unwrap_or_else(|| self.config.target_language.clone())
    }

    fn scope(&self, args: ScopeArgs) -> LanguageScope {
        let scope = LanguageScope::new(self.target_language(args.target_language));
        match args.game {
            Some(game) => scope.for_game(game),
            None => scope,
        }
    }

    fn sync_manager(&self) -> Result<GlossarySyncManager> {
        if !self.config.has_deepl_credentials() {
            return Err(anyhow!("DeepL API key is not configured (deepl.api_key in config)"));
        }
        let provider = DeepL::from_config(&self.config.deepl)?;
        Ok(GlossarySyncManager::new(self.repo.clone(), Arc::new(provider)))
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    if let Commands::Completions { shell } = cli.command {
        let mut cmd = CommandLineOptions::command();
        generate(shell, &mut cmd, "termguard", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = load_config(&cli.config_path)?;
    if let Some(level) = cli.log_level {
        config.log_level = level.into();
    }
    log::set_max_level(config.log_level.to_level_filter());

    let ctx = AppContext::open(config)?;
    run_command(&ctx, cli.command).await
}

fn load_config(path: &Path) -> Result<Config> {
    let config = Config::load_or_create(path)?;
    config.validate().context("Configuration validation failed")?;
    Ok(config)
}

async fn run_command(ctx: &AppContext, command: Commands) -> Result<()> {
    match command {
        Commands::Glossary(cmd) => run_glossary_command(ctx, cmd).await,
        Commands::Entry(cmd) => run_entry_command(ctx, cmd).await,
        Commands::ImportTsv { glossary_id, file, target_language, case_sensitive } => {
            let content = std::fs::read_to_string(&file)
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let language = ctx.target_language(target_language);
            let count = ctx
                .service
                .import_tsv(&glossary_id, &content, &language, case_sensitive)
                .await?;
            println!("Imported {} entries into {}", count, glossary_id);
            Ok(())
        }
        Commands::Match { text, scope } => {
            let matches = ctx.service.find_matches(&text, &ctx.scope(scope)).await?;
            for m in &matches {
                println!(
                    "{}..{}\t{}\t-> {}",
                    m.start_index, m.end_index, m.matched_text, m.entry.target_term
                );
            }
            info!("{} matches", matches.len());
            Ok(())
        }
        Commands::Filter { texts, scope } => {
            let block = ctx.service.build_prompt_block(texts.as_slice(), &ctx.scope(scope)).await?;
            if block.is_empty() {
                info!("No glossary terms occur in the given texts");
            } else {
                print!("{}", block);
            }
            Ok(())
        }
        Commands::Check { source, target, scope } => {
            let violations = ctx
                .service
                .check_consistency(&source, &target, &ctx.scope(scope))
                .await?;
            if violations.is_empty() {
                println!("No glossary violations");
                return Ok(());
            }
            for violation in &violations {
                println!("{}", violation);
            }
            Err(anyhow!("{} glossary violations", violations.len()))
        }
        Commands::Fix { source, target, scope } => {
            let fixed = ctx.service.apply_glossary(&source, &target, &ctx.scope(scope)).await?;
            println!("{}", fixed);
            Ok(())
        }
        Commands::Sync(args) => run_sync(ctx, args).await,
        Commands::Mappings => {
            for mapping in ctx.repo.get_all_deepl_mappings().await? {
                println!(
                    "{}\t{}->{}\t{}\t{} entries\t{}\t{}",
                    mapping.twmt_glossary_id,
                    mapping.source_language_code,
                    mapping.target_language_code,
                    mapping.deepl_glossary_id,
                    mapping.entry_count,
                    mapping.sync_status,
                    mapping.synced_at
                );
            }
            Ok(())
        }
        Commands::Stats { glossary_id: Some(glossary_id) } => {
            let stats = ctx.service.statistics(&glossary_id).await?;
            println!("{}", stats);
            Ok(())
        }
        Commands::Stats { glossary_id: None } => {
            println!("{}", ctx.repo.connection().stats().await?);
            Ok(())
        }
        Commands::Completions { .. } => Ok(()),
    }
}

async fn run_glossary_command(ctx: &AppContext, command: GlossaryCommand) -> Result<()> {
    match command {
        GlossaryCommand::Create { name, description, game, target_language } => {
            let mut glossary = GlossaryRecord::new(name);
            if let Some(description) = description {
                glossary = glossary.with_description(description);
            }
            if let Some(game) = game {
                glossary = glossary.for_game(game);
            }
            if let Some(language) = target_language {
                glossary = glossary.for_target_language(language);
            }
            let glossary = ctx.service.create_glossary(glossary).await?;
            println!("{}", glossary.id);
        }
        GlossaryCommand::List => {
            for glossary in ctx.repo.list_glossaries().await? {
                println!(
                    "{}\t{}\t{}\t{}",
                    glossary.id,
                    glossary.name,
                    glossary.game_code.as_deref().unwrap_or("*"),
                    glossary.target_language_code.as_deref().unwrap_or("*")
                );
            }
        }
        GlossaryCommand::Delete { glossary_id } => {
            if ctx.config.has_deepl_credentials() {
                ctx.sync_manager()?.delete_glossary(&glossary_id).await?;
            } else {
                let mappings = ctx.repo.get_deepl_mappings_for_glossary(&glossary_id).await?;
                if !mappings.is_empty() {
                    warn!(
                        "No DeepL API key configured, {} remote glossaries are left behind",
                        mappings.len()
                    );
                }
                if !ctx.repo.delete_glossary(&glossary_id).await? {
                    return Err(anyhow!("Glossary not found: {}", glossary_id));
                }
            }
            info!("Deleted glossary {}", glossary_id);
        }
    }
    Ok(())
}

async fn run_entry_command(ctx: &AppContext, command: EntryCommand) -> Result<()> {
    match command {
        EntryCommand::Add {
            glossary_id,
            source,
            target,
            target_language,
            case_sensitive,
            notes,
            category,
        } => {
            let language = ctx.target_language(target_language);
            let mut entry =
                GlossaryEntry::new(glossary_id, source, target, language).case_sensitive(case_sensitive);
            if let Some(notes) = notes {
                entry = entry.with_notes(notes);
            }
            if let Some(category) = category {
                entry = entry.with_category(category);
            }
            let entry = ctx.service.add_entry(entry).await?;
            println!("{}", entry.id);
        }
        EntryCommand::List { glossary_id, target_language } => {
            let entries = match target_language {
                Some(language) => ctx.repo.get_entries_for_language(&glossary_id, &language).await?,
                None => ctx.repo.get_entries(&glossary_id).await?,
            };
            for entry in entries {
                println!(
                    "{}\t{}\t{}\t{}{}",
                    entry.id,
                    entry.target_language_code,
                    entry.source_term,
                    entry.target_term,
                    if entry.case_sensitive { "\t[case-sensitive]" } else { "" }
                );
            }
        }
        EntryCommand::Delete { entry_id } => {
            ctx.service.delete_entry(&entry_id).await?;
            info!("Deleted entry {}", entry_id);
        }
    }
    Ok(())
}

async fn run_sync(ctx: &AppContext, args: SyncArgs) -> Result<()> {
    let source = args.source_language.unwrap_or_else(|| ctx.config.source_language.clone());
    let target = ctx.target_language(args.target_language);
    if !supports_glossary(&source, &target) {
        return Err(anyhow!("DeepL does not support glossaries for {} -> {}", source, target));
    }

    let glossary_ids: Vec<String> = if args.all {
        ctx.repo.list_glossaries().await?.into_iter().map(|g| g.id).collect()
    } else {
        args.glossary_ids
    };
    if glossary_ids.is_empty() {
        return Err(anyhow!("No glossaries to sync, pass glossary ids or --all"));
    }

    let manager = ctx.sync_manager()?;

    if !args.force {
        let mappings = manager.sync_glossaries(&glossary_ids, &source, &target).await;
        for mapping in &mappings {
            println!("{}\t{}", mapping.twmt_glossary_id, mapping.deepl_glossary_id);
        }
        info!("{} of {} glossaries available on DeepL", mappings.len(), glossary_ids.len());
        return Ok(());
    }

    let progress = ProgressBar::new(glossary_ids.len() as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} glossaries ({percent}%) {msg}")
            .context("Invalid progress bar template")?
            .progress_chars("█▓▒░"),
    );

    let mut failures = 0;
    for glossary_id in &glossary_ids {
        progress.set_message(glossary_id.clone());
        match manager.force_resync(glossary_id, &source, &target).await {
            Ok(Some(mapping)) => {
                progress.println(format!("{}\t{}", glossary_id, mapping.deepl_glossary_id));
            }
            Ok(None) => progress.println(format!("{}\tno entries", glossary_id)),
            Err(e) => {
                failures += 1;
                progress.println(format!("{}\tfailed: {}", glossary_id, e));
            }
        }
        progress.inc(1);
    }
    progress.finish_with_message("done");

    if failures > 0 {
        return Err(anyhow!("{} of {} glossaries failed to sync", failures, glossary_ids.len()));
    }
    Ok(())
}
