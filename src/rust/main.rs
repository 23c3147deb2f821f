use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use clap::{Args as ClapArgs, Parser, Subcommand};
use log::info;
use quake_damage::artifacts::HOME_ENV;
use quake_damage::features::{DEFAULT_DISTANCE, DEFAULT_MAGNITUDE, DEFAULT_NO_STORIES, DEFAULT_YEAR_BUILT};
use quake_damage::report::{render_json, render_text};
use quake_damage::{ArtifactStore, CategoryCatalog, DamageQuery, PredictionContext, RuntimeConfig};

#[derive(Parser)]
#[command(author, version, about = "Predict earthquake damage to a building", long_about = None)]
struct Args {
    /// Artifact directory (defaults to $QUAKE_DAMAGE_HOME or the platform data dir)
    #[arg(long, global = true)]
    artifacts: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Predict the damage class and mean damage index of a building
    Predict(PredictArgs),
    /// List the structural and occupancy choices
    Categories,
    /// Fit encoders from the dataset and pin them next to the models
    Pin {
        /// Dataset to fit from instead of the one in the artifact directory
        #[arg(long)]
        dataset: Option<PathBuf>,
    },
    /// Check model and dataset hashes against the pinned vocabulary
    Verify,
    /// Show where artifacts are expected
    Info,
}

#[derive(ClapArgs)]
struct PredictArgs {
    /// Structural type, e.g. "Wooden Frame (W1)"
    #[arg(long)]
    structural_type: String,
    /// Occupancy type, e.g. "Residential"
    #[arg(long)]
    occupancy: String,
    #[arg(long, default_value_t = DEFAULT_YEAR_BUILT)]
    year_built: i64,
    /// Number of stories
    #[arg(long, default_value_t = DEFAULT_NO_STORIES)]
    stories: i64,
    /// Earthquake magnitude
    #[arg(long, default_value_t = DEFAULT_MAGNITUDE, allow_negative_numbers = true)]
    magnitude: f64,
    /// Distance from the epicenter in km
    #[arg(long, default_value_t = DEFAULT_DISTANCE, allow_negative_numbers = true)]
    distance: f64,
    /// Output machine-readable JSON
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let store = match args.artifacts {
        Some(root) => ArtifactStore::new(root),
        None => ArtifactStore::new_default(),
    };
    info!("Artifact root: {:?}", store.root());

    match args.command {
        Command::Predict(predict) => run_predict(&store, predict),
        Command::Categories => {
            print_categories();
            Ok(())
        }
        Command::Pin { dataset } => run_pin(&store, dataset.as_deref()),
        Command::Verify => run_verify(&store),
        Command::Info => {
            print_info(&store);
            Ok(())
        }
    }
}

fn run_predict(store: &ArtifactStore, args: PredictArgs) -> Result<()> {
    if !store.is_ready() {
        bail!(
            "Artifacts not found under {:?}. Set {} or pass --artifacts.",
            store.root(),
            HOME_ENV
        );
    }

    let start_time = Instant::now();
    let context = PredictionContext::from_store(store, &RuntimeConfig::default())
        .context("Failed to load prediction context")?;
    info!("Context loaded (took {:.2?})", start_time.elapsed());

    let query = DamageQuery::new(args.structural_type, args.occupancy)
        .with_year_built(args.year_built)
        .with_stories(args.stories)
        .with_magnitude(args.magnitude)
        .with_distance(args.distance);

    let result = context.predict(&query).context("Prediction failed")?;

    if args.json {
        println!("{}", render_json(&result)?);
    } else {
        print!("{}", render_text(&result));
    }
    Ok(())
}

fn print_categories() {
    for catalog in [CategoryCatalog::structural(), CategoryCatalog::occupancy()] {
        println!("{} ({}):", catalog.name(), catalog.column());
        for group in catalog.groups() {
            println!("  {:<40} -> {}", group.display, group.primary_code());
        }
    }
}

fn run_pin(store: &ArtifactStore, dataset: Option<&Path>) -> Result<()> {
    let vocabulary = store
        .pin_vocabulary(dataset)
        .context("Failed to pin vocabulary")?;
    println!("Wrote {:?}", store.vocabulary_path());
    for (column, values) in &vocabulary.columns {
        println!("  {}: {} value(s)", column, values.len());
    }
    Ok(())
}

fn run_verify(store: &ArtifactStore) -> Result<()> {
    let checks = store.check_artifacts().context("Failed to read pinned vocabulary")?;
    let mut failed = 0;
    for check in &checks {
        let status = match (&check.actual, check.is_ok()) {
            (_, true) => "ok",
            (None, _) => "missing",
            (Some(_), false) => "hash mismatch",
        };
        println!("  {:<28} {}", check.file, status);
        if !check.is_ok() {
            failed += 1;
        }
    }
    if failed > 0 {
        bail!("{} artifact(s) failed verification", failed);
    }
    println!("All {} artifact(s) verified", checks.len());
    Ok(())
}

fn print_info(store: &ArtifactStore) {
    println!("Artifact root: {}", store.root().display());
    for (label, path) in [
        ("Classifier", store.classifier_path()),
        ("Regressor", store.regressor_path()),
        ("Vocabulary", store.vocabulary_path()),
        ("Dataset", store.dataset_path()),
        ("Performance chart", store.performance_chart_path()),
    ] {
        let state = if path.exists() { "found" } else { "missing" };
        println!("  {:<18} {} ({})", label, path.display(), state);
    }
}
