mod colors;
mod config;
mod help;
mod settings;
mod terminal;
mod viz;

use clap::{Args, Parser, Subcommand};
use config::{GlobeConfig, Overrides};
use settings::Settings;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use visitflow::output::{ChartWriter, GeoJsonWriter, SummaryPrinter};
use visitflow::{Renderer, Session, SessionOptions};

#[derive(Parser)]
#[command(name = "visitflow")]
#[command(author = "Visitflow Developers")]
#[command(version = "0.1.0")]
#[command(about = "International visitor flows into London, drawn as arcs on a terminal globe", long_about = None)]
struct Cli {
    #[command(flatten)]
    data: DataArgs,

    #[command(subcommand)]
    command: Commands,
}

/// Where the survey comes from and how many arcs it becomes
#[derive(Args)]
struct DataArgs {
    /// Dataset URL (CSV)
    #[arg(long, global = true)]
    url: Option<String>,

    /// Local CSV file, used instead of the URL
    #[arg(short, long, global = true)]
    file: Option<PathBuf>,

    /// Points sampled along each arc
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    samples: Option<u32>,

    /// Upper bound on the number of arcs per country
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    max_lines: Option<u32>,

    /// Nominal number of arcs shared out by visitor share
    #[arg(long, global = true, value_parser = clap::value_parser!(u32).range(1..))]
    line_budget: Option<u32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Interactive globe with animated arcs and a chart panel
    Globe {
        /// Animation speed (seconds per frame)
        #[arg(short, long)]
        time: Option<f32>,

        /// Random seed for reproducible arc jitter
        #[arg(short, long)]
        seed: Option<u64>,

        /// Latitude the view starts centred on
        #[arg(long, allow_negative_numbers = true)]
        tilt: Option<f64>,
    },

    /// Write arcs and country markers as a GeoJSON FeatureCollection
    Geojson {
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Random seed for reproducible arc jitter
        #[arg(short, long)]
        seed: Option<u64>,

        /// Indent the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Write the chart series as JSON
    Charts {
        /// Countries in the ranking
        #[arg(short = 'n', long, default_value = "10")]
        top: usize,

        /// Indent the JSON
        #[arg(short, long)]
        pretty: bool,
    },

    /// Print a per-country table
    Summary {
        /// Rows to print
        #[arg(short = 'n', long, default_value = "20")]
        top: usize,
    },
}

/// Log to stderr at `default_level` unless `RUST_LOG` says otherwise.
fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

/// Load once, then build the renderer and hand it the snapshot. Nothing is
/// opened for output when the load fails; the failure goes to stderr.
fn run_once<R, F>(source: visitflow::DataSource, options: SessionOptions, make_renderer: F) -> io::Result<ExitCode>
where
    R: Renderer,
    F: FnOnce() -> io::Result<R>,
{
    let mut session = match Session::init(source, options) {
        Ok(session) => session,
        Err(err) => {
            eprintln!("visitflow: {}: {}", err.headline(), err);
            return Ok(ExitCode::FAILURE);
        }
    };
    let mut renderer = make_renderer()?;
    session.drive(&mut renderer)?;
    session.teardown();
    Ok(ExitCode::SUCCESS)
}

fn output_writer(path: Option<&PathBuf>) -> io::Result<Box<dyn Write>> {
    Ok(match path {
        Some(path) => Box::new(BufWriter::new(File::create(path)?)),
        None => Box::new(BufWriter::new(io::stdout().lock())),
    })
}

fn main() -> io::Result<ExitCode> {
    let cli = Cli::parse();
    // stderr shares the screen with the globe
    let interactive = matches!(cli.command, Commands::Globe { .. });
    init_logging(if interactive { "off" } else { "warn" });

    let settings = Settings::load();
    let mut overrides = Overrides {
        url: cli.data.url,
        file: cli.data.file,
        samples: cli.data.samples.map(|n| n as usize),
        max_lines: cli.data.max_lines,
        line_budget: cli.data.line_budget,
        seed: None,
    };

    match cli.command {
        Commands::Globe { time, seed, tilt } => {
            overrides.seed = seed;
            let source = config::data_source(&settings.data, &overrides);
            let options = config::session_options(&settings.arcs, &overrides);
            let globe_config = GlobeConfig::resolve(&settings.globe, time, tilt);

            let term = terminal::Terminal::new(true)?;
            let mut globe = viz::globe::GlobeRenderer::new(term, &globe_config);
            // Load failures are shown on the globe with a retry prompt.
            let mut session = Session::new(source, options);
            session.drive(&mut globe)?;
            session.teardown();
            Ok(ExitCode::SUCCESS)
        }
        Commands::Geojson { output, seed, pretty } => {
            overrides.seed = seed;
            let source = config::data_source(&settings.data, &overrides);
            let options = config::session_options(&settings.arcs, &overrides);
            run_once(source, options, || Ok(GeoJsonWriter::new(output_writer(output.as_ref())?, pretty)))
        }
        Commands::Charts { top, pretty } => {
            let source = config::data_source(&settings.data, &overrides);
            let options = config::session_options(&settings.arcs, &overrides);
            run_once(source, options, || Ok(ChartWriter::new(io::stdout().lock(), top, pretty)))
        }
        Commands::Summary { top } => {
            let source = config::data_source(&settings.data, &overrides);
            let options = config::session_options(&settings.arcs, &overrides);
            run_once(source, options, || Ok(SummaryPrinter::new(io::stdout().lock(), top)))
        }
    }
}
