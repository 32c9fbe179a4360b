use std::path::PathBuf;

use anyhow::{bail, Context};
use colored::Colorize;
use serde::Serialize;
use serde_json::json;
use tlg_ingest::{candidates, seed_for, DailyOutcome, DailyRun, StaticFetcher};
use tlg_ledger::{Topic, ValidationReport};
use tlg_reconcile::{find_topic, RebuildSummary, Reconciler};
use tlg_sample::sample_without_replacement;
use tlg_store::{Collection, DocumentStore, FsDocumentStore};
use tlg_types::Day;

use crate::cli::*;
use crate::config::LedgerConfig;

/// Resolved ledger root: config plus the store over it.
struct Workspace {
    config: LedgerConfig,
    store: FsDocumentStore,
}

impl Workspace {
    fn open(root: PathBuf, config_path: Option<PathBuf>) -> anyhow::Result<Self> {
        let config = LedgerConfig::load(&root, config_path.as_deref())?;
        let store = FsDocumentStore::new(root, config.store.clone());
        Ok(Self { config, store })
    }

    fn reconciler(&self) -> Reconciler<'_, FsDocumentStore> {
        Reconciler::with_config(&self.store, self.config.store.clone())
    }
}

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    let ws = Workspace::open(cli.root, cli.config)?;
    match cli.command {
        Command::Rebuild(args) => cmd_rebuild(&ws, args, format),
        Command::Verify(_) => cmd_verify(&ws, format),
        Command::Sample(args) => cmd_sample(&ws, args, format),
        Command::Ingest(args) => cmd_ingest(&ws, args, format),
        Command::Show(args) => cmd_show(&ws, args, format),
        Command::Status(_) => cmd_status(&ws, format),
    }
}

fn today() -> Day {
    chrono::Local::now().date_naive()
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(summary: &RebuildSummary) {
    println!(
        "  Entries: {} scanned, {} replayed, {} patched",
        summary.entries_scanned,
        summary.entries_replayed.to_string().bold(),
        summary.entries_patched.to_string().yellow(),
    );
    let skipped = summary.malformed + summary.missing_identity;
    if skipped > 0 {
        println!(
            "  Skipped: {} malformed, {} without date or topic",
            summary.malformed.to_string().red(),
            summary.missing_identity.to_string().red(),
        );
    }
    if summary.invalid_change_type > 0 {
        println!(
            "  Replaced unknown change_type on {} entries",
            summary.invalid_change_type.to_string().yellow()
        );
    }
    println!(
        "  Topics: {} total, {} written, {} deleted, {} unchanged",
        summary.topics_total.to_string().bold(),
        summary.topics_written.to_string().yellow(),
        summary.topics_deleted.to_string().yellow(),
        summary.topics_unchanged,
    );
}

fn cmd_rebuild(ws: &Workspace, args: RebuildArgs, format: OutputFormat) -> anyhow::Result<()> {
    let reconciler = ws.reconciler();
    let summary = if args.dry_run {
        reconciler.plan()?.summary
    } else {
        reconciler.run()?
    };

    if format == OutputFormat::Json {
        return print_json(&json!({ "dry_run": args.dry_run, "summary": summary }));
    }
    if args.dry_run {
        println!("{} Dry run, nothing written", "•".cyan().bold());
    } else if summary.is_fixed_point() {
        println!("{} Ledger already up to date", "✓".green().bold());
    } else {
        println!("{} Rebuild complete", "✓".green().bold());
    }
    print_summary(&summary);
    Ok(())
}

fn report_json(name: &str, report: &ValidationReport) -> serde_json::Value {
    json!({
        "document": name,
        "topic": report.topic.as_str(),
        "history_len": report.history_len,
        "violations": report
            .violations
            .iter()
            .map(|v| json!({
                "index": v.index,
                "kind": format!("{:?}", v.kind),
                "description": v.description,
            }))
            .collect::<Vec<_>>(),
    })
}

fn cmd_verify(ws: &Workspace, format: OutputFormat) -> anyhow::Result<()> {
    let report = ws.reconciler().verify()?;

    if format == OutputFormat::Json {
        print_json(&json!({
            "clean": report.is_clean(),
            "topics": report
                .reports
                .iter()
                .map(|(name, r)| report_json(name, r))
                .collect::<Vec<_>>(),
            "unreadable": report
                .unreadable
                .iter()
                .map(|(name, reason)| json!({ "document": name, "reason": reason }))
                .collect::<Vec<_>>(),
            "pending": report.pending,
        }))?;
    } else {
        let valid = report.reports.iter().filter(|(_, r)| r.is_valid()).count();
        println!("Topics: {}/{} valid", valid, report.reports.len());
        for (name, r) in report.reports.iter().filter(|(_, r)| !r.is_valid()) {
            println!("  {} {} ({})", "✗".red().bold(), name, r.topic);
            for v in &r.violations {
                let at = v.index.map(|i| format!("#{i} ")).unwrap_or_default();
                println!("      {}{}", at.dimmed(), v.description);
            }
        }
        for (name, reason) in &report.unreadable {
            println!("  {} {}: {}", "✗".red().bold(), name, reason);
        }
        if report.pending.is_fixed_point() {
            println!("Rebuild: {}", "no pending writes".green());
        } else {
            println!("Rebuild: {}", "pending writes".yellow());
            print_summary(&report.pending);
        }
        if report.is_clean() {
            println!("{} Ledger verified", "✓".green().bold());
        }
    }

    if !report.is_clean() {
        bail!("ledger verification failed");
    }
    Ok(())
}

fn cmd_sample(ws: &Workspace, args: SampleArgs, format: OutputFormat) -> anyhow::Result<()> {
    let list = candidates::load(&args.candidates)
        .with_context(|| format!("loading candidates from {}", args.candidates.display()))?;
    let seed = args
        .seed
        .unwrap_or_else(|| seed_for(args.date.unwrap_or_else(today)));
    let pool = candidates::prepare(list, ws.config.ingest.candidate_limit);
    let picks = sample_without_replacement(candidates::weighted(pool), args.k, seed)?;

    if format == OutputFormat::Json {
        return print_json(&json!({ "seed": seed, "picks": picks }));
    }
    println!("Seed {}", seed.to_string().cyan());
    for (i, c) in picks.iter().enumerate() {
        println!(
            "  {:>3}. {} {}",
            i + 1,
            c.article.bold(),
            format!("(rank {}, weight {:.4})", c.rank, c.weight()).dimmed()
        );
    }
    Ok(())
}

fn cmd_ingest(ws: &Workspace, args: IngestArgs, format: OutputFormat) -> anyhow::Result<()> {
    let list = candidates::load(&args.candidates)
        .with_context(|| format!("loading candidates from {}", args.candidates.display()))?;
    let fetcher = StaticFetcher::load(&args.summaries)
        .with_context(|| format!("loading summaries from {}", args.summaries.display()))?;
    let date = args.date.unwrap_or_else(today);

    let outcome = DailyRun::new(&ws.store, &fetcher)
        .with_config(ws.config.ingest.clone())
        .with_store_config(ws.config.store.clone())
        .run(date, list)?;

    if format == OutputFormat::Json {
        return print_json(&outcome);
    }
    match outcome {
        DailyOutcome::AlreadyRan { date } => {
            println!("{} Entry for {} already exists, nothing to do", "•".cyan().bold(), date);
        }
        DailyOutcome::Written { date, seed, attempts, entries } => {
            println!(
                "{} Ingested {} for {} (seed {}, {} attempts)",
                "✓".green().bold(),
                entries.len(),
                date,
                seed,
                attempts
            );
            for e in &entries {
                println!(
                    "  {} {} [{}] seen {}x",
                    e.name.bold(),
                    e.topic_key.as_str().cyan(),
                    e.derived.change_type.as_str().yellow(),
                    e.derived.times_seen_total
                );
            }
        }
    }
    Ok(())
}

fn cmd_show(ws: &Workspace, args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let Some((name, topic)) = find_topic(&ws.store, &ws.config.store, &args.topic)? else {
        bail!("no topic matching '{}'", args.topic);
    };
    if format == OutputFormat::Json {
        return print_json(&json!({ "document": name, "topic": topic }));
    }
    print_topic(&name, &topic);
    Ok(())
}

fn print_topic(name: &str, topic: &Topic) {
    println!("{} {}", topic.title.bold(), format!("({name})").dimmed());
    println!("  Key: {}", topic.key.as_str().cyan());
    println!(
        "  Seen {} times, changed {} times",
        topic.times_seen_total.to_string().bold(),
        topic.sentence_changed_count.to_string().bold()
    );
    for item in &topic.history {
        let hash = item
            .content_hash
            .map(|h| h.short_hex())
            .unwrap_or_else(|| "-".into());
        let rank = item.rank.map(|r| format!("#{r}")).unwrap_or_else(|| "-".into());
        println!(
            "  {}  {:<10}  {:>6}  {}",
            item.date,
            item.change_type.as_str().yellow(),
            rank,
            hash.dimmed()
        );
        if let Some(text) = &item.observed_text {
            println!("      {text}");
        }
    }
}

fn cmd_status(ws: &Workspace, format: OutputFormat) -> anyhow::Result<()> {
    let entries = ws.store.list(Collection::Entries)?.len();
    let topics = ws.store.list(Collection::Topics)?.len();
    let pending = ws.reconciler().plan()?.summary;

    if format == OutputFormat::Json {
        return print_json(&json!({
            "root": ws.store.root(),
            "entries": entries,
            "topics": topics,
            "in_sync": pending.is_fixed_point(),
            "pending": pending,
        }));
    }
    println!("Ledger at {}", ws.store.root().display().to_string().bold());
    println!(
        "  {}: {} documents",
        ws.store.dir(Collection::Entries).display(),
        entries
    );
    println!(
        "  {}: {} documents",
        ws.store.dir(Collection::Topics).display(),
        topics
    );
    if pending.is_fixed_point() {
        println!("{} Topics in sync with entries", "✓".green().bold());
    } else {
        println!("{} Rebuild pending", "•".yellow().bold());
        print_summary(&pending);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use super::*;

    fn cli(root: &Path, command: Command) -> Cli {
        Cli {
            command,
            root: root.to_path_buf(),
            config: None,
            verbose: false,
            format: OutputFormat::Text,
        }
    }

    fn write_inputs(dir: &Path) -> (PathBuf, PathBuf) {
        let candidates = dir.join("candidates.json");
        fs::write(
            &candidates,
            r#"[{"article": "Main_Page", "rank": 1, "views": 900},
                {"article": "Rust_(programming_language)", "rank": 2, "views": 500}]"#,
        )
        .unwrap();
        let summaries = dir.join("summaries.json");
        fs::write(
            &summaries,
            r#"{"Rust_(programming_language)": {
                "title": "Rust (programming language)",
                "summary_text": "Rust is a general-purpose programming language. It is fast.",
                "revision_id": 42
            }}"#,
        )
        .unwrap();
        (candidates, summaries)
    }

    fn ingest(root: &Path, inputs: &(PathBuf, PathBuf), date: &str) -> anyhow::Result<()> {
        run_command(cli(
            root,
            Command::Ingest(IngestArgs {
                candidates: inputs.0.clone(),
                summaries: inputs.1.clone(),
                date: Some(tlg_types::parse_day(date).unwrap()),
            }),
        ))
    }

    #[test]
    fn rebuild_and_status_on_empty_root() {
        let dir = tempfile::tempdir().unwrap();
        run_command(cli(dir.path(), Command::Rebuild(RebuildArgs { dry_run: false }))).unwrap();
        run_command(cli(dir.path(), Command::Status(StatusArgs {}))).unwrap();
        run_command(cli(dir.path(), Command::Verify(VerifyArgs {}))).unwrap();
    }

    #[test]
    fn ingest_then_show_and_verify() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path());
        ingest(dir.path(), &inputs, "2024-01-10").unwrap();
        ingest(dir.path(), &inputs, "2024-01-12").unwrap();

        let store = FsDocumentStore::new(dir.path(), Default::default());
        assert_eq!(store.list(Collection::Entries).unwrap().len(), 2);
        assert_eq!(store.list(Collection::Topics).unwrap().len(), 1);

        run_command(cli(dir.path(), Command::Verify(VerifyArgs {}))).unwrap();
        run_command(cli(
            dir.path(),
            Command::Show(ShowArgs {
                topic: "Rust (programming language)".into(),
            }),
        ))
        .unwrap();
    }

    #[test]
    fn verify_fails_on_unreadable_topic() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("_topics")).unwrap();
        fs::write(dir.path().join("_topics/broken.md"), "no header here").unwrap();
        assert!(run_command(cli(dir.path(), Command::Verify(VerifyArgs {}))).is_err());
    }

    #[test]
    fn show_unknown_topic_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = run_command(cli(dir.path(), Command::Show(ShowArgs { topic: "Nothing".into() })));
        assert!(result.is_err());
    }

    #[test]
    fn sample_with_explicit_seed() {
        let dir = tempfile::tempdir().unwrap();
        let inputs = write_inputs(dir.path());
        let mut command = cli(
            dir.path(),
            Command::Sample(SampleArgs {
                candidates: inputs.0,
                k: 2,
                seed: Some(7),
                date: None,
            }),
        );
        command.format = OutputFormat::Json;
        run_command(command).unwrap();
    }

    #[test]
    fn config_file_moves_directories() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("ledger.toml"),
            "[store]\nentries_dir = \"entries\"\ntopics_dir = \"topics\"\n",
        )
        .unwrap();
        let inputs = write_inputs(dir.path());
        ingest(dir.path(), &inputs, "2024-01-10").unwrap();
        assert!(dir.path().join("entries").is_dir());
        assert!(dir.path().join("topics").is_dir());
        assert!(!dir.path().join("_entries").exists());
    }
}
