mod http;

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{ArgAction, ArgGroup, Args, Parser, Subcommand, ValueEnum, ValueHint};
use grade_table::upload::SubmittedFile;
use grade_table::{
    build_profile_table, build_staff_table, submission_message, ControllerConfig, GradeTable,
    GradeTableController, Gradebook, Staff, Uploader,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::http::SubmitClient;

#[derive(Parser, Debug)]
#[command(author, version, about = "Grade table sorting, what-if grades and submissions", long_about = None)]
struct Cli {
    /// Verbose logging
    #[arg(short, long, global = true, action = ArgAction::SetTrue)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render a table (JSON) as page markup after header clicks and hypothetical grades
    Render(RenderArgs),
    /// Print the aggregate grade of a table
    Grade(GradeArgs),
    /// Build a student's grade table, or staff grading progress, from assignment records
    Profile(ProfileArgs),
    /// Upload a file to a grade page's submit endpoint
    Submit(SubmitArgs),
}

#[derive(Args, Debug)]
struct ConfigArgs {
    /// JSON file with controller settings
    #[arg(long, value_hint = ValueHint::FilePath)]
    config: Option<PathBuf>,

    /// Aggregate text when no grade contributes
    #[arg(long)]
    na_label: Option<String>,

    /// Decimals in the aggregate
    #[arg(long)]
    decimals: Option<usize>,
}

impl ConfigArgs {
    fn load(&self) -> Result<ControllerConfig> {
        let mut config = match &self.config {
            Some(path) => ControllerConfig::from_json(&read_text(path)?)
                .with_context(|| format!("invalid config {}", path.display()))?,
            None => ControllerConfig::default(),
        };
        if let Some(label) = &self.na_label {
            config.na_label = label.clone();
        }
        if let Some(decimals) = self.decimals {
            config.decimals = decimals;
        }
        config.validate()?;
        Ok(config)
    }
}

#[derive(Args, Debug)]
struct TableArgs {
    /// Table JSON (`-` for stdin)
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Click a header by column number; repeat to cycle asc/desc/unsorted
    #[arg(long = "click")]
    clicks: Vec<usize>,

    /// Switch to hypothesis mode
    #[arg(long, action = ArgAction::SetTrue)]
    hypothesize: bool,

    /// Hypothetical grade as ROW:COL=VALUE (implies --hypothesize)
    #[arg(long = "guess")]
    guesses: Vec<String>,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutputFormat {
    Html,
    Json,
}

#[derive(Parser, Debug)]
struct RenderArgs {
    #[command(flatten)]
    table: TableArgs,

    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    format: OutputFormat,

    /// Output path (`-` for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,
}

#[derive(Parser, Debug)]
struct GradeArgs {
    #[command(flatten)]
    table: TableArgs,

    /// Print earned/possible points as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("viewer").required(true).args(["author", "grader", "admin"])))]
struct ProfileArgs {
    /// Gradebook JSON with `assignments` and `submissions`
    #[arg(value_hint = ValueHint::FilePath)]
    input: PathBuf,

    /// Student whose submissions are used
    #[arg(long)]
    author: Option<String>,

    /// Show grading progress over the submissions assigned to this grader
    #[arg(long)]
    grader: Option<String>,

    /// Show grading progress over every submission
    #[arg(long, action = ArgAction::SetTrue)]
    admin: bool,

    /// Reference time (RFC 3339); defaults to now
    #[arg(long)]
    now: Option<DateTime<Utc>>,

    #[arg(long, value_enum, default_value_t = OutputFormat::Json)]
    format: OutputFormat,

    /// Also log the per-assignment status line
    #[arg(long, action = ArgAction::SetTrue)]
    messages: bool,

    /// Output path (`-` for stdout)
    #[arg(short, long, default_value = "-", value_hint = ValueHint::FilePath)]
    output: PathBuf,

    #[command(flatten)]
    config: ConfigArgs,
}

#[derive(Parser, Debug)]
struct SubmitArgs {
    /// URL of the assignment page; `submit/` is appended
    #[arg(long)]
    page_url: String,

    /// Value of the page's csrfmiddlewaretoken field
    #[arg(long)]
    csrf_token: Option<String>,

    /// File to upload
    #[arg(long, value_hint = ValueHint::FilePath)]
    file: Option<PathBuf>,

    /// Content type sent for the file part
    #[arg(long)]
    content_type: Option<String>,

    /// Cookie header (session and csrftoken cookies)
    #[arg(long)]
    cookie: Option<String>,

    /// Request timeout in seconds (none by default)
    #[arg(long)]
    timeout: Option<u64>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();

    match cli.command {
        Command::Render(args) => handle_render(args),
        Command::Grade(args) => handle_grade(args),
        Command::Profile(args) => handle_profile(args),
        Command::Submit(args) => handle_submit(args),
    }
}

fn read_text(path: &Path) -> Result<String> {
    if path.as_os_str() == "-" {
        return io::read_to_string(io::stdin()).context("failed to read stdin");
    }
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

fn write_text(path: &Path, text: &str) -> Result<()> {
    if path.as_os_str() == "-" {
        let mut out = io::stdout().lock();
        out.write_all(text.as_bytes())?;
        out.flush()?;
        return Ok(());
    }
    fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
    info!("Wrote {}", path.display());
    Ok(())
}

/// `ROW:COL=VALUE`, where ROW is the row's original index.
fn parse_guess(token: &str) -> Result<(usize, usize, String)> {
    let (pos, value) = token
        .split_once('=')
        .ok_or_else(|| anyhow!("guess {token:?} is not ROW:COL=VALUE"))?;
    let (row, col) = pos
        .split_once(':')
        .ok_or_else(|| anyhow!("guess {token:?} is not ROW:COL=VALUE"))?;
    let row = row
        .trim()
        .parse()
        .with_context(|| format!("bad row in guess {token:?}"))?;
    let col = col
        .trim()
        .parse()
        .with_context(|| format!("bad column in guess {token:?}"))?;
    Ok((row, col, value.to_string()))
}

fn load_controller(args: &TableArgs) -> Result<GradeTableController> {
    let table = GradeTable::from_json(&read_text(&args.input)?)
        .with_context(|| format!("invalid table {}", args.input.display()))?;
    let mut controller = GradeTableController::new(table, args.config.load()?)?;

    for &column in &args.clicks {
        controller.click_header(column)?;
    }
    if args.hypothesize || !args.guesses.is_empty() {
        controller.toggle_mode();
    }
    for token in &args.guesses {
        let (row, col, value) = parse_guess(token)?;
        controller
            .set_hypothesis(row, col, &value)
            .with_context(|| format!("cannot apply guess {token:?}"))?;
    }
    Ok(controller)
}

fn handle_render(args: RenderArgs) -> Result<()> {
    let controller = load_controller(&args.table)?;
    let text = match args.format {
        OutputFormat::Html => controller.render_html(),
        OutputFormat::Json => controller.table().to_json()?,
    };
    write_text(&args.output, &text)
}

fn handle_grade(args: GradeArgs) -> Result<()> {
    let controller = load_controller(&args.table)?;
    let agg = controller.aggregate();
    if args.json {
        let value = serde_json::json!({
            "earned": agg.earned,
            "possible": agg.possible,
            "percent": agg.percent(),
            "display": agg.display(controller.config()),
            "mode": controller.mode(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        println!("{}", agg.display(controller.config()));
    }
    Ok(())
}

fn handle_profile(args: ProfileArgs) -> Result<()> {
    let book: Gradebook = serde_json::from_str(&read_text(&args.input)?)
        .with_context(|| format!("invalid gradebook {}", args.input.display()))?;
    let now = args.now.unwrap_or_else(Utc::now);

    let controller = match &args.author {
        Some(author) => {
            if args.messages {
                for assignment in &book.assignments {
                    let sub = book.submission_for(assignment.id, author);
                    info!("{}: {}", assignment.title, submission_message(assignment, sub, now));
                }
            }
            let table = build_profile_table(&book, author, now);
            let controller = GradeTableController::new(table, args.config.load()?)?;
            info!(
                "{} assignment(s) for {}, final grade {}",
                controller.table().rows.len(),
                author,
                controller.aggregate_display()
            );
            controller
        }
        None => {
            let staff = match &args.grader {
                Some(grader) => Staff::Grader(grader),
                None => Staff::Admin,
            };
            let table = build_staff_table(&book, staff, now);
            info!("grading progress for {staff:?} over {} assignment(s)", table.rows.len());
            GradeTableController::new(table, args.config.load()?)?
        }
    };
    let text = match args.format {
        OutputFormat::Html => controller.render_html(),
        OutputFormat::Json => controller.table().to_json()?,
    };
    write_text(&args.output, &text)
}

fn handle_submit(args: SubmitArgs) -> Result<()> {
    let file = match &args.file {
        Some(path) => {
            let bytes =
                fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "upload".to_string());
            Some(SubmittedFile {
                name,
                content_type: args.content_type.clone(),
                bytes,
            })
        }
        None => None,
    };

    let config = ControllerConfig::default();
    let mut uploader = Uploader::default();
    let req = uploader.begin(&args.page_url, args.csrf_token.as_deref(), file)?;
    let client = SubmitClient::new(args.timeout.map(Duration::from_secs))?;

    let outcome = client
        .send(&req, &args.page_url, args.cookie.as_deref())
        .map_err(|err| format!("{err:#}"));
    let failed = outcome.as_ref().err().cloned();
    uploader.finish(outcome, &config);

    match failed {
        None => {
            info!("{}", config.success_message);
            Ok(())
        }
        Some(reason) => {
            warn!("upload to {} failed", req.url);
            bail!("Error submitting: {reason}")
        }
    }
}
