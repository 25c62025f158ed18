//! CLI binary for noter-replay.
//!
//! A thin shim over the library crate: reads an Org notes file, replays its
//! highlights into an in-memory viewer and prints the resulting annotations.

use anyhow::{bail, Context, Result};
use clap::Parser;
use noter_replay::pipeline::encode::{DEFAULT_TAG, FORMAT_VERSION};
use noter_replay::{
    decode, discover, encode_record, replay_all, replay_one, Annotation, EntryError,
    FailurePolicy, Location, MemoryViewer, OrgNotes, ProgressCallback, RegionDescriptor,
    ReplayConfig, ReplayProgressCallback, ReplayReport, Session,
};
use serde::Serialize;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints one line per skipped entry to stderr as the batch runs.
struct CliProgressCallback;

impl ReplayProgressCallback for CliProgressCallback {
    fn on_entry_skipped(&self, error: &EntryError) {
        eprintln!("  {} {}", red("✗"), error);
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Replay every highlight in a notes file
  noter-replay notes.org

  # Replay the highlight of the heading around line 42
  noter-replay notes.org --line 42

  # Stop at the first malformed record
  noter-replay notes.org --policy abort

  # Show what would be replayed
  noter-replay notes.org --list

  # Print a record for page 3 with one quad
  noter-replay --encode 3 0.1 0.2 0.9 0.25

  # JSON output
  noter-replay notes.org --json > annotations.json

RECORD FORMAT:
  :HIGHLIGHT: (TAG VERSION (PAGE (X1 Y1 X2 Y2 ...)))
  Coordinates are normalized to 0.0-1.0 and come in groups of four.
"#;

/// Replay highlight annotations recorded in Org notes onto their PDF.
#[derive(Parser, Debug)]
#[command(
    name = "noter-replay",
    version,
    about = "Replay highlight annotations recorded in Org notes onto their PDF",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Org notes file.
    #[arg(required_unless_present = "encode")]
    notes: Option<PathBuf>,

    /// Replay only the heading that owns this 1-based line.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    line: Option<u32>,

    /// Name of the PDF the notes belong to (default: NOTER_DOCUMENT property).
    #[arg(long, env = "NOTER_REPLAY_PDF")]
    pdf: Option<String>,

    /// What to do with a malformed entry in a batch.
    #[arg(long, env = "NOTER_REPLAY_POLICY", value_enum, default_value = "skip")]
    policy: PolicyArg,

    /// Heading property holding the highlight record.
    #[arg(long, env = "NOTER_REPLAY_PROPERTY", default_value = "HIGHLIGHT")]
    property: String,

    /// List discovered entries and how they decode, without replaying.
    #[arg(long)]
    list: bool,

    /// Print the record for PAGE and COORDS, then exit.
    #[arg(
        long,
        num_args = 1..,
        value_name = "PAGE COORD",
        allow_negative_numbers = true,
        conflicts_with_all = ["notes", "line", "list"]
    )]
    encode: Option<Vec<String>>,

    /// Tag written by --encode.
    #[arg(long, default_value = DEFAULT_TAG)]
    tag: String,

    /// Output JSON instead of text.
    #[arg(long, env = "NOTER_REPLAY_JSON")]
    json: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NOTER_REPLAY_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NOTER_REPLAY_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Debug)]
enum PolicyArg {
    Skip,
    Abort,
}

impl From<PolicyArg> for FailurePolicy {
    fn from(v: PolicyArg) -> Self {
        match v {
            PolicyArg::Skip => FailurePolicy::SkipAndContinue,
            PolicyArg::Abort => FailurePolicy::Abort,
        }
    }
}

/// `--json` output of a replay.
#[derive(Serialize)]
struct JsonOutput<'a> {
    document: &'a str,
    report: &'a ReplayReport,
    annotations: Vec<&'a Annotation>,
}

/// `--list --json` output row.
#[derive(Serialize)]
struct ListedEntry {
    location: Location,
    raw: String,
    region: Option<RegionDescriptor>,
    error: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet {
        "error"
    } else {
        "warn"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Encode mode ──────────────────────────────────────────────────────
    if let Some(ref values) = cli.encode {
        let region = parse_region(values)?;
        println!("{}", encode_record(&cli.tag, FORMAT_VERSION, &region));
        return Ok(());
    }

    let Some(ref notes_path) = cli.notes else {
        bail!("A notes file is required");
    };
    let notes = OrgNotes::from_path(notes_path).context("Failed to load notes")?;

    let progress: Option<ProgressCallback> = if cli.quiet || cli.json {
        None
    } else {
        Some(Arc::new(CliProgressCallback) as Arc<dyn ReplayProgressCallback>)
    };
    let config = build_config(&cli, progress)?;

    // ── List mode ────────────────────────────────────────────────────────
    if cli.list {
        return list_entries(&notes, &config, cli.json);
    }

    // ── Replay ───────────────────────────────────────────────────────────
    let document = cli
        .pdf
        .clone()
        .or_else(|| notes.first_property("NOTER_DOCUMENT").map(str::to_string))
        .unwrap_or_else(|| "document.pdf".to_string());

    let mut viewer = MemoryViewer::new();
    let notes_buf = viewer.create_buffer(notes_path.display().to_string());
    let pdf_buf = viewer.create_buffer(document.clone());
    viewer.display(notes_buf);
    let session = Session::new(notes_buf, pdf_buf);

    let report = match cli.line {
        Some(line) => replay_one(
            &notes,
            Some(&session),
            &mut viewer,
            Location::from_line_number(line as usize),
            &config,
        ),
        None => replay_all(&notes, Some(&session), &mut viewer, &config),
    }
    .context("Replay failed")?;

    let annotations: Vec<&Annotation> = viewer.annotations_for(pdf_buf).collect();
    if cli.json {
        let out = JsonOutput {
            document: &document,
            report: &report,
            annotations,
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&out).context("Failed to serialise output")?
        );
    } else {
        for a in &annotations {
            let coords: Vec<String> = a
                .quads
                .iter()
                .map(|q| format!("({} {} {} {})", q.x1, q.y1, q.x2, q.y2))
                .collect();
            println!("page {:>4}  {}", a.page, coords.join(" "));
        }
        if !cli.quiet {
            let mark = if report.skipped.is_empty() {
                green("✔")
            } else {
                cyan("⚠")
            };
            eprintln!("{} {}  {}", mark, report.message(), dim(&document));
        }
    }

    Ok(())
}

/// Map CLI args to `ReplayConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ReplayConfig> {
    let mut builder = ReplayConfig::builder()
        .property(cli.property.clone())
        .failure_policy(cli.policy.clone().into());
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }
    builder.build().context("Invalid configuration")
}

/// Print each discovered entry with its decoded region or decode error.
fn list_entries(notes: &OrgNotes, config: &ReplayConfig, json: bool) -> Result<()> {
    let rows: Vec<ListedEntry> = discover(notes, &config.property)
        .into_iter()
        .map(|entry| {
            let (region, error) = match decode(&entry.raw) {
                Ok(r) => (Some(r), None),
                Err(e) => (None, Some(e.to_string())),
            };
            ListedEntry {
                location: entry.location,
                raw: entry.raw,
                region,
                error,
            }
        })
        .collect();

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&rows).context("Failed to serialise entries")?
        );
        return Ok(());
    }

    for row in &rows {
        match (&row.region, &row.error) {
            (Some(r), _) => println!(
                "{:<10} page {:>4}  {} quads",
                row.location.to_string(),
                r.page(),
                r.quad_count()
            ),
            (None, Some(e)) => println!("{:<10} {}", row.location.to_string(), red(e)),
            (None, None) => {}
        }
    }
    Ok(())
}

/// Parse `--encode` values: a page followed by coordinates.
fn parse_region(values: &[String]) -> Result<RegionDescriptor> {
    let (page, coords) = values
        .split_first()
        .context("--encode needs at least a page")?;
    let page: u32 = page
        .trim()
        .parse()
        .with_context(|| format!("Invalid page: '{}'", page.trim()))?;
    let coords = coords
        .iter()
        .map(|c| {
            c.trim()
                .parse::<f64>()
                .with_context(|| format!("Invalid coordinate: '{}'", c.trim()))
        })
        .collect::<Result<Vec<_>>>()?;
    if page == 0 {
        bail!("Pages are 1-indexed, minimum is 1 (got 0)");
    }
    if let Some(c) = coords.iter().find(|c| !c.is_finite()) {
        bail!("Coordinates must be finite numbers (got {})", c);
    }
    let count = coords.len();
    RegionDescriptor::new(page, coords)
        .with_context(|| format!("Coordinate count must be a multiple of 4 (got {})", count))
}
