//! Wordwise CLI
//!
//! Command-line vocabulary trainer on top of wordwise-core.

use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use tracing_subscriber::EnvFilter;
use wordwise_core::{
    normalize_word, parse_word_list, NewWord, ReviewOutcome, SrsScheduler, Storage,
    VocabularyItem, VocabularyService, WordId, WordStatus, INTERVAL_DAYS, MASTERED_LEVEL,
};

/// Wordwise - spaced repetition vocabulary trainer
#[derive(Parser)]
#[command(name = "wordwise")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Spaced repetition vocabulary trainer")]
#[command(long_about = "Wordwise schedules vocabulary reviews on a fixed interval table (0, 1, 3, 7, 14, 30 days).\n\nA pass moves a word up one level, a fail sends it back to level 0 and makes it due again.")]
struct Cli {
    /// Directory holding wordwise.db (defaults to the platform data directory)
    #[arg(long, global = true, env = "WORDWISE_DATA_DIR")]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a word
    Add {
        /// The headword
        word: String,
        /// Translation
        #[arg(long, short)]
        meaning: Option<String>,
        /// Part of speech (noun, verb, ...)
        #[arg(long)]
        pos: Option<String>,
        /// Example sentence
        #[arg(long)]
        example: Option<String>,
        /// Translated example sentence
        #[arg(long)]
        example_translation: Option<String>,
        /// Synonyms (comma-separated)
        #[arg(long)]
        synonyms: Option<String>,
        /// Antonyms (comma-separated)
        #[arg(long)]
        antonyms: Option<String>,
        /// Explicit identifier (numeric or text); a UUID is generated otherwise
        #[arg(long)]
        id: Option<String>,
    },

    /// List words in insertion order
    List {
        /// Only words matching this term (word, meaning, part of speech, synonyms, antonyms)
        #[arg(long, short)]
        search: Option<String>,
        /// Maximum number of words to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Show one word and what each review outcome would do
    Show {
        id: String,
    },

    /// List words due for review now
    Due {
        /// Maximum number of words to show
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Record a review outcome
    Review {
        /// Word identifier
        id: String,
        /// Review outcome
        #[arg(value_enum)]
        outcome: OutcomeArg,
        /// Also update status, study progress and the unknown list
        #[arg(long)]
        track: bool,
    },

    /// Set the learning status of a word
    Status {
        /// Word identifier
        id: String,
        /// new, review, learned or mastered
        #[arg(value_parser = parse_status)]
        status: WordStatus,
    },

    /// Delete a word
    Delete {
        id: String,
    },

    /// Show vocabulary statistics
    Stats,

    /// Import words from a JSON array or JSONL file
    Import {
        file: PathBuf,
    },

    /// Export words in JSON or JSONL format
    Export {
        /// Output file path
        output: PathBuf,
        /// Export format: json or jsonl
        #[arg(long, default_value = "json")]
        format: String,
    },

    /// Manage the unknown-words list
    Unknown {
        #[command(subcommand)]
        action: UnknownAction,
    },

    /// Show the daily streak and points
    Streak,

    /// Record a study session (earns points, extends the streak)
    Study,

    /// Reset every word to level 0, due now
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Create a full backup of the SQLite database
    Backup {
        /// Output file path for the backup
        output: PathBuf,
    },
}

#[derive(Subcommand)]
enum UnknownAction {
    /// Add a word to the unknown list by identifier
    Add { id: String },
    /// Remove a headword from the unknown list
    Remove { word: String },
    /// List unknown words
    List,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    Pass,
    Fail,
}

impl From<OutcomeArg> for ReviewOutcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Pass => ReviewOutcome::Pass,
            OutcomeArg::Fail => ReviewOutcome::Fail,
        }
    }
}

fn parse_status(s: &str) -> Result<WordStatus, String> {
    s.parse()
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging goes to stderr so command output stays clean
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();

    let storage = open_storage(cli.data_dir.as_deref())?;
    let service = VocabularyService::new(Arc::new(storage));

    match cli.command {
        Commands::Add {
            word,
            meaning,
            pos,
            example,
            example_translation,
            synonyms,
            antonyms,
            id,
        } => run_add(
            &service,
            NewWord {
                id: id.as_deref().map(WordId::parse),
                word,
                part_of_speech: pos,
                meaning,
                example_source: example,
                example_target: example_translation,
                synonyms: split_list(synonyms.as_deref()),
                antonyms: split_list(antonyms.as_deref()),
            },
        ),
        Commands::List { search, limit } => run_list(&service, search, limit),
        Commands::Show { id } => run_show(&service, &resolve_id(&service, &id)?),
        Commands::Due { limit } => run_due(&service, limit),
        Commands::Review { id, outcome, track } => {
            run_review(&service, &resolve_id(&service, &id)?, outcome.into(), track)
        }
        Commands::Status { id, status } => run_status(&service, &resolve_id(&service, &id)?, status),
        Commands::Delete { id } => run_delete(&service, &resolve_id(&service, &id)?),
        Commands::Stats => run_stats(&service),
        Commands::Import { file } => run_import(&service, &file),
        Commands::Export { output, format } => run_export(&service, &output, &format),
        Commands::Unknown { action } => run_unknown(&service, action),
        Commands::Streak => run_streak(&service),
        Commands::Study => run_study(&service),
        Commands::Reset { yes } => run_reset(&service, yes),
        Commands::Backup { output } => run_backup(&service, &output),
    }
}

/// Open the database under `data_dir`, or at the default location
fn open_storage(data_dir: Option<&Path>) -> anyhow::Result<Storage> {
    let path = data_dir.map(|dir| dir.join("wordwise.db"));
    let storage = Storage::new(path)?;
    tracing::debug!("Using database at {}", storage.path().display());
    Ok(storage)
}

/// Identifier of the stored word typed as `raw`
///
/// Falls back to the plain parse so a missing word is reported by the
/// command itself.
fn resolve_id(service: &VocabularyService, raw: &str) -> anyhow::Result<WordId> {
    Ok(service
        .store()
        .resolve_id(raw)?
        .unwrap_or_else(|| WordId::parse(raw)))
}

/// Split a comma-separated list, dropping empty entries
fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(|part| part.trim().to_string())
            .filter(|part| !part.is_empty())
            .collect()
    })
    .unwrap_or_default()
}

fn format_level(level: u32) -> colored::ColoredString {
    let text = format!("L{}", level);
    if level >= MASTERED_LEVEL {
        text.green().bold()
    } else if level > 0 {
        text.yellow()
    } else {
        text.dimmed()
    }
}

fn format_next_review(item: &VocabularyItem) -> String {
    match item.next_review_at {
        Some(at) => at.format("%Y-%m-%d %H:%M").to_string(),
        None => "now".to_string(),
    }
}

fn print_word_line(item: &VocabularyItem) {
    let id = item.id.as_ref().map(ToString::to_string).unwrap_or_default();
    let meaning = item.meaning.as_deref().unwrap_or("");
    println!(
        "  {} {} {} {} {}",
        format_level(item.mastery_level),
        item.word.white().bold(),
        meaning.dimmed(),
        format!("[{}]", id).dimmed(),
        format!("next: {}", format_next_review(item)).cyan()
    );
}

/// Run add command
fn run_add(service: &VocabularyService, input: NewWord) -> anyhow::Result<()> {
    let item = service.add_word(input)?;
    let id = item.id.as_ref().map(ToString::to_string).unwrap_or_default();

    println!("{} {} ({})", "Added".green().bold(), item.word.white().bold(), id.dimmed());
    Ok(())
}

/// Run list command
fn run_list(
    service: &VocabularyService,
    search: Option<String>,
    limit: Option<usize>,
) -> anyhow::Result<()> {
    let words = match search.as_deref() {
        Some(term) => service.store().search_words(term)?,
        None => service.store().get_all_words()?,
    };
    let total = words.len();

    println!("{}", "=== Vocabulary ===".cyan().bold());
    if words.is_empty() {
        println!("{}", "No words found.".dimmed());
        return Ok(());
    }

    for item in words.iter().take(limit.unwrap_or(usize::MAX)) {
        print_word_line(item);
    }
    println!();
    println!("{}: {}", "Total".white().bold(), total);
    Ok(())
}

/// Run show command
fn run_show(service: &VocabularyService, id: &WordId) -> anyhow::Result<()> {
    let Some(item) = service.store().get_word(id)? else {
        anyhow::bail!("Word not found: {}", id);
    };

    println!("{}", format!("=== {} ===", item.word).cyan().bold());
    if let Some(pos) = &item.part_of_speech {
        println!("{}: {}", "Part of speech".white().bold(), pos);
    }
    if let Some(meaning) = &item.meaning {
        println!("{}: {}", "Meaning".white().bold(), meaning);
    }
    if let Some(example) = &item.example_source {
        println!("{}: {}", "Example".white().bold(), example);
    }
    if let Some(example) = &item.example_target {
        println!("{}: {}", "Translation".white().bold(), example);
    }
    if !item.synonyms.is_empty() {
        println!("{}: {}", "Synonyms".white().bold(), item.synonyms.join(", "));
    }
    if !item.antonyms.is_empty() {
        println!("{}: {}", "Antonyms".white().bold(), item.antonyms.join(", "));
    }
    println!("{}: {}", "Status".white().bold(), item.status);
    println!("{}: {}", "Level".white().bold(), format_level(item.mastery_level));
    println!("{}: {}", "Next review".white().bold(), format_next_review(&item));
    if let Some(last) = item.last_reviewed_at {
        println!("{}: {}", "Last review".white().bold(), last.format("%Y-%m-%d %H:%M"));
    }

    let scheduler = SrsScheduler::new(Arc::clone(service.clock()));
    let preview = scheduler.preview(&item)?;
    println!();
    println!("{}", "If reviewed now:".dimmed());
    println!(
        "  {} -> {} next {}",
        "pass".green(),
        format_level(preview.pass.mastery_level),
        format_next_review(&preview.pass)
    );
    println!(
        "  {} -> {} next {}",
        "fail".red(),
        format_level(preview.fail.mastery_level),
        format_next_review(&preview.fail)
    );
    Ok(())
}

/// Run due command
fn run_due(service: &VocabularyService, limit: Option<usize>) -> anyhow::Result<()> {
    let due = service.due_words()?;

    println!("{}", "=== Due for Review ===".cyan().bold());
    if due.is_empty() {
        println!("{}", "Nothing due. Come back later!".green());
        return Ok(());
    }

    for item in due.iter().take(limit.unwrap_or(usize::MAX)) {
        print_word_line(item);
    }
    println!();
    println!("{}: {}", "Due".white().bold(), due.len());
    Ok(())
}

/// Run review command
fn run_review(
    service: &VocabularyService,
    id: &WordId,
    outcome: ReviewOutcome,
    track: bool,
) -> anyhow::Result<()> {
    let (reviewed, tracked) = if track {
        let tracked = service.record_tracked_review(id, outcome)?;
        (tracked.item.clone(), Some(tracked))
    } else {
        (service.record_review(id, outcome)?, None)
    };

    let verdict = if outcome.is_success() {
        "Pass".green().bold()
    } else {
        "Fail".red().bold()
    };
    println!(
        "{} {} -> {} (next review {})",
        verdict,
        reviewed.word.white().bold(),
        format_level(reviewed.mastery_level),
        format_next_review(&reviewed)
    );

    if let Some(tracked) = tracked {
        println!("  {}: {}", "Status".white().bold(), tracked.item.status);
        if let Some(progress) = tracked.progress {
            println!(
                "  {}: streak {} day(s), {} points",
                "Study".white().bold(),
                progress.daily_streak,
                progress.total_points
            );
        }
        if tracked.added_to_unknown {
            println!("  {}", "Added to unknown words".yellow());
        }
    }
    Ok(())
}

/// Run status command
fn run_status(service: &VocabularyService, id: &WordId, status: WordStatus) -> anyhow::Result<()> {
    let item = service.set_status(id, status)?;
    println!("{} {} is now {}", "Updated".green().bold(), item.word.white().bold(), status);
    Ok(())
}

/// Run delete command
fn run_delete(service: &VocabularyService, id: &WordId) -> anyhow::Result<()> {
    if !service.delete_word(id)? {
        anyhow::bail!("Word not found: {}", id);
    }
    println!("{} {}", "Deleted".yellow().bold(), id);
    Ok(())
}

/// Run stats command
fn run_stats(service: &VocabularyService) -> anyhow::Result<()> {
    let stats = service.stats()?;
    let daily = service.daily_stats()?;

    println!("{}", "=== Wordwise Statistics ===".cyan().bold());
    println!();
    println!("{}: {}", "Total Words".white().bold(), stats.total_words);
    println!("{}: {}", "Learned".white().bold(), stats.learned_words);
    println!("{}: {}", "Mastered".white().bold(), stats.mastered_words);
    println!("{}: {}", "Due for Review".white().bold(), stats.words_to_review);
    println!("{}: {}", "Daily Streak".white().bold(), daily.daily_streak);
    println!("{}: {}", "Points".white().bold(), daily.total_points);

    if stats.total_words > 0 {
        println!();
        println!("{}", "=== Level Distribution ===".yellow().bold());
        let words = service.store().get_all_words()?;
        let last = INTERVAL_DAYS.len() - 1;
        for level in 0..=last {
            let count = words
                .iter()
                .filter(|w| {
                    let l = w.mastery_level as usize;
                    if level == last { l >= last } else { l == level }
                })
                .count();
            let label = if level == last {
                format!("L{}+", level)
            } else {
                format!("L{}", level)
            };
            print_distribution_bar(&label, count, words.len());
        }
    }
    Ok(())
}

/// Print a distribution bar
fn print_distribution_bar(label: &str, count: usize, total: usize) {
    let percentage = if total > 0 {
        (count as f64 / total as f64) * 100.0
    } else {
        0.0
    };

    let bar_width: usize = 30;
    let filled = ((percentage / 100.0) * bar_width as f64) as usize;
    let empty = bar_width.saturating_sub(filled);
    let bar = format!("{}{}", "#".repeat(filled), "-".repeat(empty));

    println!(
        "  {:6} [{:30}] {:>4} ({:>5.1}%)",
        label,
        bar.green(),
        count,
        percentage
    );
}

/// Read words from a JSON array or a JSONL file
fn read_word_file(file: &Path) -> anyhow::Result<Vec<VocabularyItem>> {
    let content = std::fs::read_to_string(file)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", file.display(), e))?;
    let now = chrono::Utc::now();

    if content.trim_start().starts_with('[') {
        return Ok(parse_word_list(&content, now)?);
    }

    let mut words = Vec::new();
    for (line_no, line) in content.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let value: serde_json::Value = serde_json::from_str(line)
            .map_err(|e| anyhow::anyhow!("Line {}: {}", line_no + 1, e))?;
        match normalize_word(&value, now) {
            Some(item) => words.push(item),
            None => tracing::warn!("Skipping line {}: no headword", line_no + 1),
        }
    }
    Ok(words)
}

/// Run import command
fn run_import(service: &VocabularyService, file: &Path) -> anyhow::Result<()> {
    println!("{}", "=== Wordwise Import ===".cyan().bold());
    println!();

    let words = read_word_file(file)?;
    println!("{}: {}", "Read".white().bold(), words.len());

    let imported = service.import_words(words)?;
    println!("{}", format!("Imported {} word(s)", imported).green());
    Ok(())
}

/// Run export command
fn run_export(service: &VocabularyService, output: &Path, format: &str) -> anyhow::Result<()> {
    if format != "json" && format != "jsonl" {
        anyhow::bail!("Invalid format '{}'. Must be 'json' or 'jsonl'.", format);
    }

    let words = service.store().get_all_words()?;

    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let file = std::fs::File::create(output)?;
    let mut writer = BufWriter::new(file);

    match format {
        "json" => {
            serde_json::to_writer_pretty(&mut writer, &words)?;
            writer.write_all(b"\n")?;
        }
        _ => {
            for word in &words {
                serde_json::to_writer(&mut writer, word)?;
                writer.write_all(b"\n")?;
            }
        }
    }
    writer.flush()?;

    println!(
        "{}",
        format!("Exported {} word(s) to {}", words.len(), output.display()).green()
    );
    Ok(())
}

/// Run unknown-words commands
fn run_unknown(service: &VocabularyService, action: UnknownAction) -> anyhow::Result<()> {
    match action {
        UnknownAction::Add { id } => {
            let id = resolve_id(service, &id)?;
            if service.mark_unknown(&id)? {
                println!("{} {} to unknown words", "Added".green().bold(), id);
            } else {
                println!("{}", "Already in unknown words.".dimmed());
            }
        }
        UnknownAction::Remove { word } => {
            if !service.mark_known(&word)? {
                anyhow::bail!("'{}' is not in unknown words", word);
            }
            println!("{} {}", "Removed".yellow().bold(), word);
        }
        UnknownAction::List => {
            let words = service.store().get_unknown_words()?;
            println!("{}", "=== Unknown Words ===".cyan().bold());
            if words.is_empty() {
                println!("{}", "No unknown words.".dimmed());
            }
            for item in &words {
                print_word_line(item);
            }
        }
    }
    Ok(())
}

/// Run streak command
fn run_streak(service: &VocabularyService) -> anyhow::Result<()> {
    let daily = service.daily_stats()?;

    println!("{}: {} day(s)", "Daily Streak".white().bold(), daily.daily_streak);
    println!("{}: {}", "Points".white().bold(), daily.total_points);
    if daily.studied_today {
        println!("{}", "Studied today.".green());
    } else {
        println!("{}", "Not studied yet today.".yellow());
    }
    Ok(())
}

/// Run study command
fn run_study(service: &VocabularyService) -> anyhow::Result<()> {
    let progress = service.record_study()?;
    println!(
        "{} streak {} day(s), {} points",
        "Study recorded:".green().bold(),
        progress.daily_streak,
        progress.total_points
    );
    Ok(())
}

/// Run reset command
fn run_reset(service: &VocabularyService, yes: bool) -> anyhow::Result<()> {
    if !yes {
        anyhow::bail!("Reset puts every word back to level 0. Re-run with --yes to confirm.");
    }
    let count = service.reset_progress()?;
    println!("{}", format!("Reset {} word(s)", count).yellow());
    Ok(())
}

/// Run backup command
fn run_backup(service: &VocabularyService, output: &Path) -> anyhow::Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            std::fs::create_dir_all(parent)?;
        }
    }
    if output.exists() {
        anyhow::bail!("{} already exists", output.display());
    }

    service.store().backup_to(output)?;
    println!("{}", format!("Backup written to {}", output.display()).green());
    Ok(())
}
