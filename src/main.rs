use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::Parser;
use ehr_cohort::config::{CohortConfigFile, ConceptSet, DEFAULT_DATASET_NAME, parse_date};
use ehr_cohort::{CohortConfig, HeartFailurePipeline, PipelineConfig};

#[cfg(feature = "snmalloc")]
#[global_allocator]
static ALLOC: snmalloc_rs::SnMalloc = snmalloc_rs::SnMalloc;

/// Build a labeled heart-failure event-sequence dataset from OMOP Parquet tables
#[derive(Parser, Debug)]
#[command(name = "ehr-cohort", version, about)]
struct Args {
    /// Folder with one sub-folder or .parquet file per OMOP table
    #[arg(short = 'i', long = "input-folder", value_name = "DIR")]
    input_folder: PathBuf,

    /// Folder receiving the dataset
    #[arg(short = 'o', long = "output-folder", value_name = "DIR")]
    output_folder: PathBuf,

    /// First eligible index date (YYYY-MM-DD); may come from --config instead
    #[arg(
        short = 'f',
        long = "date-filter",
        value_name = "DATE",
        value_parser = parse_date_arg,
        required_unless_present = "config"
    )]
    date_filter: Option<NaiveDate>,

    /// JSON configuration file; command line flags take precedence
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum age at the index date
    #[arg(long, value_name = "YEARS")]
    age_lower_bound: Option<i32>,

    /// Maximum age at the index date
    #[arg(long, value_name = "YEARS")]
    age_upper_bound: Option<i32>,

    /// Days between the last admissible event and the index date
    #[arg(long, value_name = "DAYS")]
    buffer_period_days: Option<u32>,

    /// JSON file with qualifying visit concept ids
    #[arg(long, value_name = "FILE")]
    visit_concepts: Option<PathBuf>,

    /// JSON file with heart-failure diagnosis concept ids
    #[arg(long, value_name = "FILE")]
    heart_failure_concepts: Option<PathBuf>,

    /// Also drop history events dated before the date filter
    #[arg(long)]
    clip_history_to_date_filter: bool,

    /// Name of the dataset folder under the output folder
    #[arg(long, value_name = "NAME")]
    dataset_name: Option<String>,

    /// Worker threads (defaults to the number of CPUs)
    #[arg(long, env = "EHR_COHORT_THREADS")]
    threads: Option<usize>,

    /// Disable progress spinners
    #[arg(short, long)]
    quiet: bool,
}

fn parse_date_arg(value: &str) -> std::result::Result<NaiveDate, String> {
    parse_date(value).map_err(|e| e.to_string())
}

fn build_config(args: &Args) -> Result<PipelineConfig> {
    let file = match &args.config {
        Some(path) => CohortConfigFile::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => CohortConfigFile::default(),
    };

    let date_filter = file.resolve_date_filter(args.date_filter)?;
    let mut cohort = file.apply(CohortConfig::new(date_filter))?;

    if let Some(lower) = args.age_lower_bound {
        cohort.age_lower_bound = lower;
    }
    if let Some(upper) = args.age_upper_bound {
        cohort.age_upper_bound = upper;
    }
    if let Some(days) = args.buffer_period_days {
        cohort = cohort.with_buffer_period_days(days);
    }
    if let Some(path) = &args.visit_concepts {
        let concepts = ConceptSet::from_json_file(path)
            .with_context(|| format!("Failed to load visit concepts {}", path.display()))?;
        cohort = cohort.with_visit_concepts(concepts);
    }
    if let Some(path) = &args.heart_failure_concepts {
        let concepts = ConceptSet::from_json_file(path).with_context(|| {
            format!("Failed to load heart-failure concepts {}", path.display())
        })?;
        cohort = cohort.with_heart_failure_concepts(concepts);
    }
    if args.clip_history_to_date_filter {
        cohort = cohort.with_clipped_history(true);
    }

    let dataset_name = args
        .dataset_name
        .clone()
        .or_else(|| file.dataset_name.clone())
        .unwrap_or_else(|| DEFAULT_DATASET_NAME.to_string());

    let config = PipelineConfig::new(&args.input_folder, &args.output_folder, cohort)
        .with_dataset_name(dataset_name)
        .with_progress(!args.quiet);
    Ok(config)
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let threads = args.threads.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to configure the rayon thread pool")?;
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(threads)
        .enable_all()
        .build()
        .context("Failed to start the tokio runtime")?;

    let pipeline = HeartFailurePipeline::new(config);
    let summary = runtime
        .block_on(pipeline.run())
        .context("Heart-failure dataset pipeline failed")?;

    log::info!(
        "Done: {} rows written to {}",
        summary.rows_written,
        pipeline.config().dataset_path().display()
    );
    Ok(())
}
