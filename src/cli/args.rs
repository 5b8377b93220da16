use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "lineage-plot",
    version,
    about = "Composite edit plots for CRISPR lineage tracing data"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write one chart for a fixed view as SVG or PDF.
    Render(RenderArgs),
    /// Write an HTML report with scale and top-N controls.
    Report(ReportArgs),
}

#[derive(Args, Clone)]
pub struct SourceArgs {
    /// Per-base histogram (index, deletion, insertion, scar, uncovered).
    #[arg(long)]
    pub per_base: PathBuf,

    /// Cut sites (position, cutPos).
    #[arg(long)]
    pub cut_sites: PathBuf,

    /// Optional highlight intervals (start, end, color, region).
    #[arg(long)]
    pub intervals: Option<PathBuf>,

    /// HMID occurrences (array, rawCount, WT[, highlightMembership]).
    #[arg(long)]
    pub occurrences: PathBuf,

    /// Read blocks per HMID (array, start, end, event).
    #[arg(long)]
    pub read_blocks: PathBuf,
}

#[derive(Parser)]
pub struct RenderArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output file; the extension selects .svg or .pdf.
    #[arg(long)]
    pub out: PathBuf,

    #[arg(long, default_value_t = crate::core::view::DEFAULT_TOP_N)]
    pub top_n: usize,

    /// Log scale for the editing-rate plot.
    #[arg(long, default_value_t = false)]
    pub top_log: bool,

    /// Linear scale for the abundance histogram (log by default).
    #[arg(long, default_value_t = false)]
    pub right_linear: bool,

    /// Top of the editing-rate axis at 100% instead of the observed max.
    #[arg(long, default_value_t = false)]
    pub fixed_top: bool,
}

#[derive(Parser)]
pub struct ReportArgs {
    #[command(flatten)]
    pub sources: SourceArgs,

    /// Output directory.
    #[arg(long)]
    pub out: PathBuf,

    /// Sample name used in the page title and output names.
    #[arg(long)]
    pub title: Option<String>,

    /// Top-N values offered by the selector, comma separated.
    /// Defaults to the built-in menu.
    #[arg(long)]
    pub top_n_menu: Option<String>,

    /// Initially selected top-N; must be in the menu.
    #[arg(long, default_value_t = crate::core::view::DEFAULT_TOP_N)]
    pub top_n: usize,

    #[arg(long, default_value_t = false)]
    pub no_zip: bool,
}
