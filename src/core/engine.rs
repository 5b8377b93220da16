use crate::core::io::{InputKind, InputSource};
use crate::core::model::{CutSite, Interval, LoadedData, Occurrence, PerBaseRow, ReadBlock};
use crate::core::scene::Panel;
use crate::core::stats::{fmt_dur, log_stage, stats_enabled};
use crate::core::tsv;
use anyhow::{Context, Result, anyhow, bail};
use crossbeam_channel as channel;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

/// Locations of the input tables.
#[derive(Clone, Debug)]
pub struct SourcePaths {
    pub per_base: PathBuf,
    pub cut_sites: PathBuf,
    pub intervals: Option<PathBuf>,
    pub occurrences: PathBuf,
    pub read_blocks: PathBuf,
}

impl SourcePaths {
    fn jobs(&self) -> Vec<(Source, PathBuf)> {
        let mut jobs = vec![
            (Source::PerBase, self.per_base.clone()),
            (Source::CutSites, self.cut_sites.clone()),
            (Source::Occurrences, self.occurrences.clone()),
            (Source::ReadBlocks, self.read_blocks.clone()),
        ];
        if let Some(p) = &self.intervals {
            jobs.push((Source::Intervals, p.clone()));
        }
        jobs
    }

    pub fn preflight(&self) -> Result<()> {
        for (source, path) in self.jobs() {
            if !path.is_file() {
                bail!("{} file not found: {}", source.as_str(), path.display());
            }
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Source {
    PerBase,
    CutSites,
    Intervals,
    Occurrences,
    ReadBlocks,
}

impl Source {
    pub fn as_str(self) -> &'static str {
        match self {
            Source::PerBase => "per-base histogram",
            Source::CutSites => "cut-site",
            Source::Intervals => "interval",
            Source::Occurrences => "occurrence",
            Source::ReadBlocks => "read-block",
        }
    }
}

enum Loaded {
    PerBase(Vec<PerBaseRow>),
    CutSites(Vec<CutSite>),
    Intervals(Vec<Interval>),
    Occurrences(Vec<Occurrence>),
    ReadBlocks(Vec<ReadBlock>),
}

impl Loaded {
    fn rows(&self) -> usize {
        match self {
            Loaded::PerBase(v) => v.len(),
            Loaded::CutSites(v) => v.len(),
            Loaded::Intervals(v) => v.len(),
            Loaded::Occurrences(v) => v.len(),
            Loaded::ReadBlocks(v) => v.len(),
        }
    }
}

#[derive(Clone, Debug)]
struct SourceStats {
    source: Source,
    kind: InputKind,
    bytes: Option<usize>,
    parse: Duration,
}

/// Tables received so far. Panels check readiness against it.
#[derive(Debug, Default)]
pub struct LoadState {
    expects_intervals: bool,
    per_base: Option<Vec<PerBaseRow>>,
    cut_sites: Option<Vec<CutSite>>,
    intervals: Option<Vec<Interval>>,
    occurrences: Option<Vec<Occurrence>>,
    read_blocks: Option<Vec<ReadBlock>>,
}

impl LoadState {
    pub fn new(expects_intervals: bool) -> Self {
        Self {
            expects_intervals,
            ..Default::default()
        }
    }

    fn apply(&mut self, loaded: Loaded) {
        match loaded {
            Loaded::PerBase(v) => self.per_base = Some(v),
            Loaded::CutSites(v) => self.cut_sites = Some(v),
            Loaded::Intervals(v) => self.intervals = Some(v),
            Loaded::Occurrences(v) => self.occurrences = Some(v),
            Loaded::ReadBlocks(v) => self.read_blocks = Some(v),
        }
    }

    fn intervals_settled(&self) -> bool {
        !self.expects_intervals || self.intervals.is_some()
    }

    pub fn is_ready(&self, panel: Panel) -> bool {
        match panel {
            Panel::TopHistogram => {
                self.per_base.is_some() && self.cut_sites.is_some() && self.intervals_settled()
            }
            Panel::SetMembership => self.intervals.is_some() && self.occurrences.is_some(),
            Panel::Abundance => self.occurrences.is_some(),
            Panel::ReadHeatmap => self.read_blocks.is_some(),
        }
    }

    fn ready_panels(&self) -> Vec<Panel> {
        [
            Panel::SetMembership,
            Panel::TopHistogram,
            Panel::ReadHeatmap,
            Panel::Abundance,
        ]
        .into_iter()
        .filter(|p| self.is_ready(*p))
        .collect()
    }

    /// Converts into the immutable data set; fails naming any missing table.
    pub fn finish(self) -> Result<LoadedData> {
        let missing = |s: Source| anyhow!("{} data was never loaded", s.as_str());
        if self.expects_intervals && self.intervals.is_none() {
            return Err(missing(Source::Intervals));
        }
        Ok(LoadedData {
            per_base: self.per_base.ok_or_else(|| missing(Source::PerBase))?,
            cut_sites: self.cut_sites.ok_or_else(|| missing(Source::CutSites))?,
            intervals: self.intervals,
            occurrences: self.occurrences.ok_or_else(|| missing(Source::Occurrences))?,
            read_blocks: self.read_blocks.ok_or_else(|| missing(Source::ReadBlocks))?,
        })
    }
}

fn load_source(source: Source, path: &Path) -> Result<(Loaded, SourceStats)> {
    let mut input = InputSource::open(path)?;
    let t_parse = Instant::now();
    let kind = input.kind();
    let bytes = input.mapped_len();
    let reader = input.reader();
    let loaded = match source {
        Source::PerBase => Loaded::PerBase(tsv::parse_per_base(reader)?),
        Source::CutSites => Loaded::CutSites(tsv::parse_cut_sites(reader)?),
        Source::Intervals => Loaded::Intervals(tsv::parse_intervals(reader)?),
        Source::Occurrences => Loaded::Occurrences(tsv::parse_occurrences(reader)?),
        Source::ReadBlocks => Loaded::ReadBlocks(tsv::parse_read_blocks(reader)?),
    };
    Ok((
        loaded,
        SourceStats {
            source,
            kind,
            bytes,
            parse: t_parse.elapsed(),
        },
    ))
}

/// Loads every configured table on its own thread and joins the results.
///
/// The first failing source aborts the load with its name and path attached.
pub fn load(paths: &SourcePaths) -> Result<LoadedData> {
    let stats = stats_enabled();
    let t_total = Instant::now();
    let jobs = paths.jobs();
    let total = jobs.len();

    let (result_tx, result_rx) = channel::unbounded::<(Loaded, SourceStats)>();
    let (err_tx, err_rx) = channel::bounded::<anyhow::Error>(total);

    let mut workers = Vec::with_capacity(total);
    for (source, path) in jobs {
        let tx = result_tx.clone();
        let err = err_tx.clone();
        workers.push(thread::spawn(move || {
            let res = load_source(source, &path).with_context(|| {
                format!("failed to load {} data from {}", source.as_str(), path.display())
            });
            match res {
                Ok(msg) => {
                    let _ = tx.send(msg);
                }
                Err(e) => {
                    let _ = err.send(e);
                }
            }
        }));
    }
    drop(result_tx);
    drop(err_tx);

    let mut state = LoadState::new(paths.intervals.is_some());
    let mut announced: Vec<Panel> = Vec::new();
    let mut err_open = true;
    let mut received = 0usize;
    while received < total {
        let (loaded, src_stats) = if err_open {
            channel::select! {
                recv(err_rx) -> err => {
                    match err {
                        Ok(err) => return Err(err),
                        Err(_) => {
                            err_open = false;
                            continue;
                        }
                    }
                }
                recv(result_rx) -> msg => msg.context("loader worker exited without a result")?,
            }
        } else {
            result_rx
                .recv()
                .context("loader worker exited without a result")?
        };
        received += 1;
        if stats {
            eprintln!(
                "LINEAGE_STATS source={} kind={:?} bytes={} rows={} parse={}",
                src_stats.source.as_str(),
                src_stats.kind,
                src_stats
                    .bytes
                    .map(|b| b.to_string())
                    .unwrap_or_else(|| "stream".to_string()),
                loaded.rows(),
                fmt_dur(src_stats.parse)
            );
        }
        state.apply(loaded);
        for panel in state.ready_panels() {
            if !announced.contains(&panel) {
                if stats {
                    eprintln!("LINEAGE_STATS ready={}", panel.as_str());
                }
                announced.push(panel);
            }
        }
    }

    for worker in workers {
        let _ = worker.join();
    }

    let data = state.finish()?;
    for key in unknown_membership_keys(&data) {
        eprintln!("warning: membership key '{}' matches no interval", key);
    }
    log_stage(stats, "load.total", t_total);
    Ok(data)
}

/// Membership keys that reference no interval, in first-seen order.
pub fn unknown_membership_keys(data: &LoadedData) -> Vec<String> {
    let Some(intervals) = &data.intervals else {
        return Vec::new();
    };
    let known: HashSet<String> = intervals.iter().map(|iv| iv.key()).collect();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for key in data.occurrences.iter().flat_map(|o| o.membership.iter()) {
        if !known.contains(key) && seen.insert(key.clone()) {
            out.push(key.clone());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::Compression;
    use flate2::write::GzEncoder;
    use std::fs;
    use std::io::Write;
    use tempfile::TempDir;

    const PER_BASE: &str = "index\tdeletion\tinsertion\tscar\tuncovered\n\
                            0\t0.0\t0.0\t0.0\t0.0\n\
                            1\t0.1\t0.02\t0.0\t0.01\n\
                            2\t0.05\t0.0\t0.01\t0.0\n";
    const CUTS: &str = "position\tcutpos\n1\t2\n";
    const INTERVALS: &str = "start\tend\tcolor\tregion\n0\t1\t#ff0000\tsite1\n";
    const OCCURRENCES: &str = "array\trawCount\tWT\thighlightMembership\n\
                               0\t40\t#112233\t0-1_#ff0000\n\
                               1\t3\t#445566\tmissing-key\n";
    const BLOCKS: &str = "array\tstart\tend\tevent\n0\t0\t1\t0\n0\t1\t2\t1\n1\t0\t2\t0\n";

    fn write(dir: &TempDir, name: &str, body: &str) -> PathBuf {
        let p = dir.path().join(name);
        fs::write(&p, body).unwrap();
        p
    }

    fn paths(dir: &TempDir, with_intervals: bool) -> SourcePaths {
        SourcePaths {
            per_base: write(dir, "per_base.tsv", PER_BASE),
            cut_sites: write(dir, "cuts.tsv", CUTS),
            intervals: with_intervals.then(|| write(dir, "intervals.tsv", INTERVALS)),
            occurrences: write(dir, "occ.tsv", OCCURRENCES),
            read_blocks: write(dir, "blocks.tsv", BLOCKS),
        }
    }

    #[test]
    fn loads_all_sources() {
        let dir = TempDir::new().unwrap();
        let data = load(&paths(&dir, true)).unwrap();
        assert_eq!(data.per_base.len(), 3);
        assert_eq!(data.cut_sites[0].cut_pos, 2);
        assert_eq!(data.interval_count(), 1);
        assert_eq!(data.occurrences.len(), 2);
        assert_eq!(data.read_blocks.len(), 3);
        assert_eq!(unknown_membership_keys(&data), vec!["missing-key"]);
    }

    #[test]
    fn intervals_are_optional() {
        let dir = TempDir::new().unwrap();
        let data = load(&paths(&dir, false)).unwrap();
        assert!(data.intervals.is_none());
        assert!(unknown_membership_keys(&data).is_empty());
    }

    #[test]
    fn gzip_sources_are_accepted() {
        let dir = TempDir::new().unwrap();
        let mut p = paths(&dir, false);
        let gz = dir.path().join("blocks.tsv.gz");
        let mut enc = GzEncoder::new(Vec::new(), Compression::default());
        enc.write_all(BLOCKS.as_bytes()).unwrap();
        fs::write(&gz, enc.finish().unwrap()).unwrap();
        p.read_blocks = gz;
        let data = load(&p).unwrap();
        assert_eq!(data.read_blocks.len(), 3);
    }

    #[test]
    fn failing_source_is_reported_by_name() {
        let dir = TempDir::new().unwrap();
        let mut p = paths(&dir, false);
        p.occurrences = write(&dir, "bad_occ.tsv", "array\trawCount\tWT\nx\t1\t#000000\n");
        let err = load(&p).unwrap_err();
        let msg = format!("{:#}", err);
        assert!(msg.contains("occurrence"), "{}", msg);
        assert!(msg.contains("bad_occ.tsv"), "{}", msg);
    }

    #[test]
    fn preflight_rejects_missing_files() {
        let dir = TempDir::new().unwrap();
        let mut p = paths(&dir, false);
        p.cut_sites = dir.path().join("nope.tsv");
        assert!(p.preflight().is_err());
        assert!(paths(&dir, true).preflight().is_ok());
    }

    #[test]
    fn readiness_follows_dependencies() {
        let mut state = LoadState::new(true);
        state.apply(Loaded::PerBase(Vec::new()));
        state.apply(Loaded::CutSites(Vec::new()));
        assert!(!state.is_ready(Panel::TopHistogram));
        state.apply(Loaded::Occurrences(Vec::new()));
        assert!(state.is_ready(Panel::Abundance));
        assert!(!state.is_ready(Panel::SetMembership));
        state.apply(Loaded::Intervals(Vec::new()));
        assert!(state.is_ready(Panel::TopHistogram));
        assert!(state.is_ready(Panel::SetMembership));
        assert!(!state.is_ready(Panel::ReadHeatmap));
        let err = state.finish().unwrap_err();
        assert!(err.to_string().contains("read-block"));
    }

    #[test]
    fn top_histogram_ready_without_configured_intervals() {
        let mut state = LoadState::new(false);
        state.apply(Loaded::PerBase(Vec::new()));
        state.apply(Loaded::CutSites(Vec::new()));
        assert!(state.is_ready(Panel::TopHistogram));
    }
}
