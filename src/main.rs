use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use sift::config::AppConfig;
use sift::index::stats::{write_dump, write_stats};
use sift::index::InvertedIndex;
use sift::output::{ColorMode, JsonSink, OutputFormat, TextSink};
use sift::server::{ResultSink, SearchServer, ServerOptions, SharedSink, TaskSummary};
use sift::utils::{STDIN_PATH, open_lines};
use std::fs::File;
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};
use termcolor::{BufferedStandardStream, NoColor};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "sift")]
#[command(about = "Concurrent in-memory keyword search over line-oriented documents")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to <config dir>/sift/config.json)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log filter when RUST_LOG is unset (e.g. "debug", "sift=trace")
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Build an index and answer query streams against it
    Search {
        /// Initial documents, one per line ("-" for stdin)
        #[arg(short, long)]
        docs: PathBuf,

        /// Query files, one query per line; each file is its own stream
        /// (defaults to stdin)
        #[arg(short, long)]
        queries: Vec<PathBuf>,

        /// Document batches to rebuild from while queries run
        #[arg(short, long)]
        update: Vec<PathBuf>,

        /// Result format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Color mode for text results
        #[arg(long, value_enum)]
        color: Option<ColorMode>,

        /// Write results to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show statistics for an index built from a document file
    Stats {
        /// Documents, one per line ("-" for stdin)
        docs: PathBuf,

        /// Print every term with its postings, then every document
        #[arg(long)]
        dump: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => AppConfig::load().context("Failed to load config")?,
    };

    init_tracing(cli.log_level.as_deref().unwrap_or(&config.log_level));

    match cli.command {
        Commands::Search {
            docs,
            queries,
            update,
            format,
            color,
            output,
        } => {
            let format = format.unwrap_or(config.output);
            let color = color.unwrap_or(config.color);
            let options = ServerOptions {
                parallel_build: config.parallel_build,
            };
            run_search(&docs, &queries, &update, format, color, output.as_deref(), options)?;
        }
        Commands::Stats { docs, dump } => {
            let source = open_lines(&docs)
                .with_context(|| format!("Failed to open {}", docs.display()))?;
            let index = InvertedIndex::from_reader(source).context("Failed to read documents")?;

            let stdout = io::stdout();
            let mut out = stdout.lock();
            if dump {
                write_dump(&mut out, &index)?;
            } else {
                write_stats(&mut out, &index)?;
            }
        }
    }

    Ok(())
}

fn init_tracing(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run_search(
    docs: &Path,
    queries: &[PathBuf],
    updates: &[PathBuf],
    format: OutputFormat,
    color: ColorMode,
    output: Option<&Path>,
    options: ServerOptions,
) -> Result<()> {
    check_stdin_readers(docs, queries, updates)?;

    let mut server = SearchServer::with_options(options);
    let source = open_lines(docs).with_context(|| format!("Failed to open {}", docs.display()))?;
    let documents = server.load(source).context("Failed to build initial index")?;
    info!(documents, path = %docs.display(), "loaded initial documents");

    let sink = SharedSink::new(make_sink(format, color, output)?);

    let stdin_queries = [PathBuf::from(STDIN_PATH)];
    let query_paths = if queries.is_empty() {
        &stdin_queries[..]
    } else {
        queries
    };

    for path in query_paths {
        let source =
            open_lines(path).with_context(|| format!("Failed to open {}", path.display()))?;
        server.submit_query_stream(source, sink.clone())?;
    }
    for path in updates {
        let source =
            open_lines(path).with_context(|| format!("Failed to open {}", path.display()))?;
        server.submit_rebuild(source)?;
    }

    let summary = wait_with_progress(&mut server)?;
    info!(
        rebuilds = summary.rebuilds,
        streams = summary.query_streams,
        queries = summary.queries,
        "all tasks finished"
    );
    Ok(())
}

/// Standard input can feed at most one reader. Queries default to stdin when
/// no `--queries` is given.
fn check_stdin_readers(docs: &Path, queries: &[PathBuf], updates: &[PathBuf]) -> Result<()> {
    let is_stdin = |path: &Path| path.as_os_str() == STDIN_PATH;
    let query_readers = if queries.is_empty() {
        1
    } else {
        queries.iter().filter(|p| is_stdin(p.as_path())).count()
    };
    let readers = usize::from(is_stdin(docs))
        + query_readers
        + updates.iter().filter(|p| is_stdin(p.as_path())).count();

    if readers > 1 {
        bail!("Standard input can be read by only one of --docs, --queries and --update");
    }
    Ok(())
}

fn make_sink(
    format: OutputFormat,
    color: ColorMode,
    output: Option<&Path>,
) -> Result<Box<dyn ResultSink + Send>> {
    let sink: Box<dyn ResultSink + Send> = match (output, format) {
        (Some(path), OutputFormat::Text) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(TextSink::new(NoColor::new(BufWriter::new(file))))
        }
        (Some(path), OutputFormat::Json) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create {}", path.display()))?;
            Box::new(JsonSink::new(BufWriter::new(file)))
        }
        (None, OutputFormat::Text) => {
            Box::new(TextSink::new(BufferedStandardStream::stdout(color.choice())))
        }
        (None, OutputFormat::Json) => Box::new(JsonSink::new(BufWriter::new(io::stdout()))),
    };
    Ok(sink)
}

#[cfg(feature = "progress")]
fn wait_with_progress(server: &mut SearchServer) -> Result<TaskSummary> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Duration;

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(Duration::from_millis(80));

    loop {
        let pending = server.pending();
        if pending == 0 {
            break;
        }
        spinner.set_message(format!("{} task(s) running...", pending));
        std::thread::sleep(Duration::from_millis(50));
    }
    spinner.finish_and_clear();

    Ok(server.wait()?)
}

#[cfg(not(feature = "progress"))]
fn wait_with_progress(server: &mut SearchServer) -> Result<TaskSummary> {
    Ok(server.wait()?)
}
