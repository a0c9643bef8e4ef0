use anyhow::Result;
use clap::{Args, Parser, Subcommand, ValueEnum};
use command::{parse_cursor, Cursor, InsertTarget, Output, Session};
use ctxlog_engine::{Language, LogConfig};
use response::CommandResponse;
use std::path::PathBuf;
use std::process::ExitCode;

mod command;
mod report;
mod response;

#[derive(Parser)]
#[command(name = "ctxlog")]
#[command(about = "Context-aware debug logging for JavaScript and TypeScript", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (JSON or TOML); falls back to ./.ctxlog.json or ./.ctxlog.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Built-in configuration used when no config file is found
    #[arg(long, global = true, value_enum, default_value_t = Preset::Default)]
    preset: Preset,

    /// Force a grammar (javascript, jsx, typescript, tsx) instead of detecting it per file
    #[arg(long, global = true)]
    language: Option<String>,

    /// Print a JSON envelope on stdout instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Quiet mode: log only errors
    #[arg(long, global = true)]
    quiet: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum Preset {
    Default,
    React,
    Minimal,
}

impl Preset {
    fn config(self) -> LogConfig {
        match self {
            Preset::Default => LogConfig::default(),
            Preset::React => LogConfig::react(),
            Preset::Minimal => LogConfig::minimal(),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// List every loggable scope in a file
    Contexts(FileArgs),

    /// Show the scope enclosing a cursor, its parents and selectable names
    At(CursorArgs),

    /// Render the log statement for the scope enclosing a cursor
    Render(RenderArgs),

    /// Insert log statements for one or more cursors, or for every scope
    Insert(InsertArgs),

    /// Remove every line carrying the configured logTag
    Clean(CleanArgs),

    /// Identifiers worth logging on a line
    Suggest(SuggestArgs),

    /// Wrap an expression in a log call
    Wrap(WrapArgs),

    /// Analyze every supported file under a directory
    Scan(ScanArgs),
}

#[derive(Args)]
struct FileArgs {
    /// Source file (.js, .jsx, .ts, .tsx)
    file: PathBuf,
}

#[derive(Args)]
struct CursorArgs {
    file: PathBuf,

    /// 1-based line
    #[arg(long)]
    line: usize,

    /// 1-based column
    #[arg(long, default_value_t = 1)]
    column: usize,
}

#[derive(Args)]
struct RenderArgs {
    #[command(flatten)]
    target: CursorArgs,

    /// Log only these entries, as `bucket: name` (repeatable)
    #[arg(long = "select")]
    select: Vec<String>,
}

#[derive(Args)]
struct InsertArgs {
    file: PathBuf,

    /// Cursor as LINE or LINE:COLUMN, 1-based (repeatable)
    #[arg(
        long = "cursor",
        value_parser = parse_cursor,
        required_unless_present = "all",
        conflicts_with = "all"
    )]
    cursors: Vec<Cursor>,

    /// Log every loggable scope in the file
    #[arg(long)]
    all: bool,

    /// Log only these entries, as `bucket: name` (repeatable)
    #[arg(long = "select", conflicts_with = "all")]
    select: Vec<String>,

    /// Rewrite the file in place instead of printing the result
    #[arg(long)]
    write: bool,
}

#[derive(Args)]
struct CleanArgs {
    file: PathBuf,

    /// Rewrite the file in place instead of printing the result
    #[arg(long)]
    write: bool,
}

#[derive(Args)]
struct SuggestArgs {
    file: PathBuf,

    /// 1-based line
    #[arg(long)]
    line: usize,
}

#[derive(Args)]
struct WrapArgs {
    /// Expression to log
    text: String,
}

#[derive(Args)]
struct ScanArgs {
    /// Directory to walk (respects .gitignore)
    #[arg(default_value = ".")]
    dir: PathBuf,
}

fn main() -> ExitCode {
    let mut cli = Cli::parse();
    if cli.json {
        cli.quiet = true;
    }

    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    } else if cli.verbose {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.target(env_logger::Target::Stderr).init();

    let json = cli.json;
    match run(cli).and_then(|output| emit(&output, json)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, json);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<Output> {
    let config = command::load_config(cli.config.as_deref(), cli.preset.config())?;
    let language = cli
        .language
        .as_deref()
        .map(str::parse::<Language>)
        .transpose()?;
    log::debug!("config: {config:?}, language override: {language:?}");
    let session = Session { config, language };

    match cli.command {
        Commands::Contexts(args) => command::run_contexts(&args.file, &session),
        Commands::At(args) => {
            command::run_at(&args.file, Cursor::new(args.line, args.column), &session)
        }
        Commands::Render(args) => {
            let cursor = Cursor::new(args.target.line, args.target.column);
            command::run_render(&args.target.file, cursor, &args.select, &session)
        }
        Commands::Insert(args) => {
            let target = if args.all {
                InsertTarget::AllScopes
            } else {
                InsertTarget::Cursors(&args.cursors)
            };
            command::run_insert(&args.file, target, &args.select, args.write, &session)
        }
        Commands::Clean(args) => command::run_clean(&args.file, args.write, &session),
        Commands::Suggest(args) => command::run_suggest(&args.file, args.line, &session),
        Commands::Wrap(args) => Ok(command::run_wrap(&args.text, &session)),
        Commands::Scan(args) => command::run_scan(&args.dir, &session),
    }
}

fn emit(output: &Output, json: bool) -> Result<()> {
    if json {
        let response = CommandResponse::ok(serde_json::to_value(output)?);
        println!("{}", serde_json::to_string_pretty(&response)?);
    } else {
        print!("{}", report::render_text(output));
    }
    Ok(())
}

fn report_error(err: &anyhow::Error, json: bool) {
    let response = CommandResponse::error(err);
    if json {
        match serde_json::to_string_pretty(&response) {
            Ok(body) => println!("{body}"),
            Err(_) => eprintln!("Error: {err:#}"),
        }
        return;
    }
    eprintln!("Error: {err:#}");
    if let Some(hint) = response.error.and_then(|error| error.hint) {
        eprintln!("Hint: {hint}");
    }
}
