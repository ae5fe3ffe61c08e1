use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "fabric-map")]
#[command(
    about = "Fabric catalog cleanup: metadata extraction and fabric-type reconciliation",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Print per-label resolution details
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a scraped batch: extract structured metadata per fabric
    Clean {
        /// Scrape export (.json array, or .csv/.xlsx with a Description column)
        #[arg(required = true)]
        input: PathBuf,

        /// Output file (default: <model>_<input stem>.json next to input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also generate shopper Q&A pairs (one extra model call each)
        #[arg(long)]
        qa: bool,

        /// Clean only the first N records (smoke test on a new site)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Auto-map fabric type labels and write the review sheet
    Propose {
        /// Record batch to reconcile (JSON array)
        #[arg(required = true)]
        input: PathBuf,

        /// Review workbook path (default: mapping_<input stem>.xlsx)
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// Variant library file (default from config: mainlib.json)
        #[arg(long)]
        library: Option<PathBuf>,

        /// Category catalog file (default from config: mappingLib.json)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Fold a reviewed sheet into the libraries and rewrite the batch
    Apply {
        /// Record batch to reconcile (JSON array)
        #[arg(required = true)]
        input: PathBuf,

        /// Reviewed workbook (default: mapping_<input stem>.xlsx)
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// Variant library file (default from config: mainlib.json)
        #[arg(long)]
        library: Option<PathBuf>,

        /// Category catalog file (default from config: mappingLib.json)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Rewritten batch destination (default: Cleaned<input stem>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Propose, pause for review, then apply in one sitting
    Run {
        /// Record batch to reconcile (JSON array)
        #[arg(required = true)]
        input: PathBuf,

        /// Review workbook path (default: mapping_<input stem>.xlsx)
        #[arg(short, long)]
        workbook: Option<PathBuf>,

        /// Variant library file (default from config: mainlib.json)
        #[arg(long)]
        library: Option<PathBuf>,

        /// Category catalog file (default from config: mappingLib.json)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Rewritten batch destination (default: Cleaned<input stem>.json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the confirmation prompt and apply immediately
        #[arg(short, long)]
        yes: bool,
    },

    /// Show or edit settings
    Config {
        /// Set the chat model (e.g. qwen3:14b)
        #[arg(long)]
        set_model: Option<String>,

        /// Set the OpenAI-compatible endpoint base URL
        #[arg(long)]
        set_endpoint: Option<String>,

        /// Set the API key for hosted endpoints
        #[arg(long)]
        set_api_key: Option<String>,

        /// Show current settings
        #[arg(long)]
        show: bool,
    },
}
