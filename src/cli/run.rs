use crate::cli::args::{Cli, Commands, RenderArgs, ReportArgs, SourceArgs};
use crate::core::engine::{self, SourcePaths};
use crate::core::panels::Session;
use crate::core::stats::{log_stage, stats_enabled};
use crate::core::view::{
    DEFAULT_TOP_N_MENU, ScaleMode, TopNormalization, ViewState, parse_menu,
};
use crate::report;
use anyhow::{Context, Result, bail};
use clap::Parser;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

const REPORT_HTML: &str = "lineage_report.html";
const REPORT_SVG: &str = "lineage_plot.svg";

pub fn entry() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Render(args) => render_chart(args),
        Commands::Report(args) => write_report(args),
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum OutputKind {
    Svg,
    Pdf,
}

fn output_kind(path: &Path) -> Result<OutputKind> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());
    match ext.as_deref() {
        Some("svg") => Ok(OutputKind::Svg),
        Some("pdf") => Ok(OutputKind::Pdf),
        _ => bail!(
            "unsupported output extension for {} (expected .svg or .pdf)",
            path.display()
        ),
    }
}

fn source_paths(args: &SourceArgs) -> SourcePaths {
    SourcePaths {
        per_base: args.per_base.clone(),
        cut_sites: args.cut_sites.clone(),
        intervals: args.intervals.clone(),
        occurrences: args.occurrences.clone(),
        read_blocks: args.read_blocks.clone(),
    }
}

fn render_chart(args: RenderArgs) -> Result<()> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    let paths = source_paths(&args.sources);
    let kind = output_kind(&args.out)?;
    paths.preflight()?;
    if args.top_n == 0 {
        bail!("--top-n must be >= 1");
    }
    log_stage(stats, "preflight", t0);

    let t_load = Instant::now();
    let data = engine::load(&paths)?;
    log_stage(stats, "load", t_load);

    let view = ViewState {
        top_scale: if args.top_log {
            ScaleMode::Log
        } else {
            ScaleMode::Linear
        },
        right_scale: if args.right_linear {
            ScaleMode::Linear
        } else {
            ScaleMode::Log
        },
        normalization: if args.fixed_top {
            TopNormalization::Fixed100
        } else {
            TopNormalization::ObservedMax
        },
        top_n: args.top_n,
    };
    let session = Session::new(Arc::new(data), view, vec![args.top_n])?;

    let t_draw = Instant::now();
    let scene = session.redraw();
    log_stage(stats, "redraw", t_draw);

    if let Some(parent) = args.out.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create output dir {}", parent.display()))?;
    }
    let t_write = Instant::now();
    match kind {
        OutputKind::Svg => report::svg::write(&args.out, &scene)?,
        OutputKind::Pdf => report::pdf::write(&args.out, &scene)?,
    }
    log_stage(stats, "write", t_write);
    if stats {
        eprintln!(
            "LINEAGE_STATS output={} elements={}",
            args.out.display(),
            scene.element_count()
        );
    }
    log_stage(stats, "total", t0);
    Ok(())
}

fn write_report(args: ReportArgs) -> Result<()> {
    let stats = stats_enabled();
    let t0 = Instant::now();

    let paths = source_paths(&args.sources);
    paths.preflight()?;
    let menu = match &args.top_n_menu {
        Some(text) => parse_menu(text)?,
        None => DEFAULT_TOP_N_MENU.to_vec(),
    };
    let title = match args.title {
        Some(t) => t,
        None => args
            .sources
            .occurrences
            .file_stem()
            .and_then(|s| s.to_str())
            .map(|s| s.to_string())
            .context("failed to determine sample name from occurrence file")?,
    };
    log_stage(stats, "preflight", t0);

    let t_load = Instant::now();
    let data = engine::load(&paths)?;
    log_stage(stats, "load", t_load);

    let initial = ViewState {
        top_n: args.top_n,
        ..ViewState::default()
    };
    let session = Session::new(Arc::new(data), initial, menu)?;

    let out_dir = args.out.join(format!("{}_lineage", title));
    fs::create_dir_all(&out_dir)
        .with_context(|| format!("failed to create output dir {}", out_dir.display()))?;

    let t_svg = Instant::now();
    let svg_path = out_dir.join(REPORT_SVG);
    report::svg::write(&svg_path, &session.redraw())?;
    log_stage(stats, "svg", t_svg);

    let t_html = Instant::now();
    let html_path = out_dir.join(REPORT_HTML);
    report::html::write(&html_path, &session, &title)
        .with_context(|| format!("failed to write {}", html_path.display()))?;
    log_stage(stats, "html", t_html);
    if stats {
        let html_size = fs::metadata(&html_path).map(|m| m.len()).unwrap_or(0);
        eprintln!(
            "LINEAGE_STATS output html={} bytes={}",
            html_path.display(),
            html_size
        );
    }

    if !args.no_zip {
        let t_zip = Instant::now();
        report::zip::write_zip(&args.out, &out_dir, &title, &[REPORT_HTML, REPORT_SVG])
            .with_context(|| "failed to create zip output")?;
        log_stage(stats, "zip", t_zip);
    }

    if stats {
        eprintln!("LINEAGE_STATS output_dir={}", out_dir.display());
    }
    log_stage(stats, "total", t0);
    Ok(())
}
