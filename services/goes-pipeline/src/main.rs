//! GOES scene pipeline.
//!
//! Fetches GOES files, cuts them to a latitude/longitude window and renders
//! map figures:
//! - `fetch`: download URLs (or a base URL plus filenames)
//! - `inspect`: list the dimensions and variables of a file
//! - `plot`: prepare and render one local file
//! - `run`: execute a YAML job end to end

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use fetcher::{build_url, FetchConfig, Fetcher};
use goes_common::{Bounds, MapExtent};
use map_renderer::{Renderer, RendererConfig};
use netcdf_scene::open_scene;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use goes_pipeline::config::{PipelineJob, RenderSection, SceneSection};
use goes_pipeline::pipeline;

#[derive(Parser, Debug)]
#[command(name = "goes-pipeline")]
#[command(about = "Fetch, subset and render GOES satellite scenes")]
struct Args {
    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "info")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    log_json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Download files into a local directory, skipping ones already present
    Fetch {
        /// Full URLs, or filenames when --base-url is given
        #[arg(required = true)]
        items: Vec<String>,

        /// Joined with each item
        #[arg(long, env = "GOES_BASE_URL")]
        base_url: Option<String>,

        #[arg(short, long, env = "GOES_DATA_DIR", default_value = "data/raw")]
        out_dir: PathBuf,
    },

    /// List dimensions, variables and global attributes of a file
    Inspect { path: PathBuf },

    /// Prepare and render one local file
    Plot(PlotArgs),

    /// Execute a YAML pipeline job
    Run {
        #[arg(env = "GOES_JOB_FILE")]
        job: PathBuf,
    },
}

#[derive(ClapArgs, Debug)]
struct PlotArgs {
    path: PathBuf,

    #[arg(long, default_value = "CMI")]
    variable: String,

    /// Latitude window as MIN MAX
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_hyphen_values = true, default_values_t = [-5.0, 5.0])]
    lat: Vec<f64>,

    /// Longitude window as MIN MAX
    #[arg(long, num_args = 2, value_names = ["MIN", "MAX"], allow_hyphen_values = true, default_values_t = [-85.0, -75.0])]
    lon: Vec<f64>,

    #[arg(long, default_value = "y")]
    lat_name: String,

    #[arg(long, default_value = "x")]
    lon_name: String,

    /// Map extent as LON_MIN LON_MAX LAT_MIN LAT_MAX
    #[arg(long, num_args = 4, allow_hyphen_values = true)]
    extent: Option<Vec<f64>>,

    #[arg(long, default_value = "turbo")]
    colormap: String,

    #[arg(long)]
    title: Option<String>,

    /// GeoJSON LineString to overlay
    #[arg(long)]
    track: Option<PathBuf>,

    /// Output image; the extension picks the format
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Open the figure in the system viewer
    #[arg(long)]
    show: bool,
}

fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let builder = fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn main() -> Result<()> {
    // Load environment from .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();
    init_tracing(&args.log_level, args.log_json);

    match args.command {
        Command::Fetch {
            items,
            base_url,
            out_dir,
        } => fetch(items, base_url, out_dir),
        Command::Inspect { path } => inspect(path),
        Command::Plot(plot_args) => plot(plot_args),
        Command::Run { job } => run(job),
    }
}

fn fetch(items: Vec<String>, base_url: Option<String>, out_dir: PathBuf) -> Result<()> {
    let urls: Vec<String> = match &base_url {
        Some(base) => items.iter().map(|f| build_url(base, f)).collect(),
        None => items,
    };

    let fetcher = Fetcher::new(FetchConfig::from_env())?;
    let report = fetcher.download_many_report(&urls, &out_dir)?;
    for path in &report.downloaded {
        println!("{}", path.display());
    }
    if !report.is_complete() {
        bail!("{} of {} downloads failed", report.failures.len(), urls.len());
    }
    Ok(())
}

fn inspect(path: PathBuf) -> Result<()> {
    let scene = open_scene(&path)?;

    println!("{}", path.display());
    println!("Dimensions:");
    for dim in scene.dimensions() {
        println!("  {} = {}", dim.name, dim.len);
    }
    println!("Variables:");
    for var in scene.variables() {
        let units = var.units.as_deref().unwrap_or("-");
        println!("  {}({}) [{}]", var.name, var.dims.join(", "), units);
    }
    for attr in ["title", "platform_ID", "time_coverage_start"] {
        if let Some(value) = scene.global_attribute(attr) {
            println!("{}: {}", attr, value);
        }
    }
    Ok(())
}

fn plot(args: PlotArgs) -> Result<()> {
    let scene = SceneSection {
        variable: args.variable,
        lat_bounds: Bounds::new(args.lat[0], args.lat[1]),
        lon_bounds: Bounds::new(args.lon[0], args.lon[1]),
        lat_name: args.lat_name,
        lon_name: args.lon_name,
    };
    let extent = match args.extent.as_deref() {
        Some(&[lon_min, lon_max, lat_min, lat_max]) => {
            Some(MapExtent::new(lon_min, lon_max, lat_min, lat_max).context("Invalid --extent")?)
        }
        Some(_) => bail!("--extent takes four values"),
        None => None,
    };
    let render = RenderSection {
        colormap: args.colormap,
        title: args.title,
        extent,
        flight_track: None,
        flight_track_file: args.track,
        show: args.show,
        ..RenderSection::default()
    };
    if args.output.is_none() && !args.show {
        info!("No --output or --show given, the figure will be discarded");
    }

    let renderer = Renderer::new(RendererConfig::from_env())?;
    pipeline::plot_file(&renderer, &args.path, &scene, &render, args.output)?;
    Ok(())
}

fn run(job_path: PathBuf) -> Result<()> {
    let job = PipelineJob::load(&job_path)?;
    let fetcher = Fetcher::new(FetchConfig::from_env())?;
    let renderer = Renderer::new(RendererConfig::from_env())?;

    let summary = pipeline::run_job(&job, &fetcher, &renderer)?;
    println!(
        "Rendered {} scene(s), {} failure(s)",
        summary.rendered(),
        summary.failed()
    );
    if !summary.is_success() {
        bail!("{} item(s) failed", summary.failed());
    }
    Ok(())
}
