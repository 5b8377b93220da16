use crate::core::model::{CutSite, Interval, PerBaseRow};
use crate::core::palette::{GRID_STROKE, Series};
use crate::core::scale::{LinearScale, LogScale, format_percent, log_ticks, round_to};
use crate::core::scene::{Anchor, Element, Layer, Panel, Rect, text};
use crate::core::view::{MARGIN_LEFT, ScaleMode, TOP_HEIGHT, TOP_WIDTH, TopNormalization};

const TARGET_WIDTH: f64 = 20.0;
const CUT_MARK_WIDTH: f64 = 4.0;
const CUT_MARK_SHIFT: i64 = 4;
const CUT_FAR_THRESHOLD: i64 = 10;
const LINEAR_TICKS: usize = 4;
const LOG_KEEP_TICKS: usize = 3;

/// One point of a stacked series: `y0` is the baseline, `y1` the stacked top.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct StackedPoint {
    pub x: i64,
    pub y0: f64,
    pub y1: f64,
}

/// Stacks deletion, insertion, scar and uncovered rates per position.
pub fn stack(rows: &[PerBaseRow]) -> Vec<(Series, Vec<StackedPoint>)> {
    let mut base = vec![0.0f64; rows.len()];
    Series::ALL
        .iter()
        .map(|&series| {
            let points = rows
                .iter()
                .zip(base.iter_mut())
                .map(|(row, y0)| {
                    let v = match series {
                        Series::Deletion => row.deletion,
                        Series::Insertion => row.insertion,
                        Series::Scar => row.scar,
                        Series::Uncovered => row.uncovered,
                    };
                    let p = StackedPoint {
                        x: row.index,
                        y0: *y0,
                        y1: *y0 + v,
                    };
                    *y0 = p.y1;
                    p
                })
                .collect();
            (series, points)
        })
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tick {
    pub value: f64,
    pub label: String,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum YScale {
    Linear(LinearScale),
    Log { scale: LogScale, factor: f64 },
}

/// Value axis of the top histogram for one scale mode.
#[derive(Clone, Debug, PartialEq)]
pub struct RateAxis {
    scale: YScale,
    pub ticks: Vec<Tick>,
    pub legend: &'static str,
}

impl RateAxis {
    pub fn new(y_max: f64, mode: ScaleMode) -> Self {
        match mode {
            ScaleMode::Linear => {
                let scale = LinearScale::new((0.0, y_max), (TOP_HEIGHT, 0.0));
                let decimals = if y_max < 0.001 { 2 } else { 1 };
                let ticks = scale
                    .ticks(LINEAR_TICKS)
                    .into_iter()
                    .map(|v| Tick {
                        value: v,
                        label: format_percent(v, decimals),
                    })
                    .collect();
                Self {
                    scale: YScale::Linear(scale),
                    ticks,
                    legend: "Editing (%)",
                }
            }
            ScaleMode::Log => {
                // small rates get a larger factor so the log domain keeps a few decades
                let (factor, places) = if y_max < 0.001 {
                    (10000.0, 6)
                } else if y_max < 0.01 {
                    (1000.0, 4)
                } else {
                    (100.0, 2)
                };
                let hi = y_max * factor;
                let scale = LogScale::new((1.0, hi), (TOP_HEIGHT, 0.0));
                let all = log_ticks(1.0, hi);
                let every = all.len().div_ceil(LOG_KEEP_TICKS).max(1);
                let last = all.len().saturating_sub(1);
                let ticks = all
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| i % every == 0 || *i == last)
                    .map(|(_, &v)| Tick {
                        value: v,
                        label: format!("{}%", round_to(v / (factor / 100.0), places)),
                    })
                    .collect();
                Self {
                    scale: YScale::Log { scale, factor },
                    ticks,
                    legend: "Editing percent (log)",
                }
            }
        }
    }

    /// Pixel row for a rate in 0..1.
    pub fn rate_y(&self, rate: f64) -> f64 {
        match self.scale {
            YScale::Linear(s) => s.map(rate),
            YScale::Log { scale, factor } => scale.map((factor * rate).max(1.0)),
        }
    }

    /// Pixel row for a tick value, which lives in the scaled domain.
    pub fn tick_y(&self, value: f64) -> f64 {
        match self.scale {
            YScale::Linear(s) => s.map(value),
            YScale::Log { scale, .. } => scale.map(value),
        }
    }
}

/// Largest stacked top over the edit series; uncovered reads are not counted.
pub fn observed_max(stacked: &[(Series, Vec<StackedPoint>)]) -> f64 {
    stacked
        .iter()
        .filter(|(s, _)| *s != Series::Uncovered)
        .flat_map(|(_, pts)| pts.iter().map(|p| p.y1))
        .fold(0.0, f64::max)
}

pub fn draw(
    rows: &[PerBaseRow],
    cut_sites: &[CutSite],
    intervals: Option<&[Interval]>,
    mode: ScaleMode,
    normalization: TopNormalization,
) -> Layer {
    let mut layer = Layer::new(Panel::TopHistogram);
    let (Some(min_x), Some(max_x)) = (
        rows.iter().map(|r| r.index).min(),
        rows.iter().map(|r| r.index).max(),
    ) else {
        return layer;
    };
    let stacked = stack(rows);
    let x = LinearScale::new((min_x as f64, max_x as f64), (MARGIN_LEFT, TOP_WIDTH));
    let y_max = match normalization {
        TopNormalization::ObservedMax => observed_max(&stacked),
        TopNormalization::Fixed100 => 1.0,
    };
    let axis = RateAxis::new(y_max, mode);

    let offset_width = |w: f64| x.map(w) - x.map(0.0);
    for site in cut_sites {
        layer.rect(Rect {
            x: x.map(site.position as f64),
            y: 0.0,
            width: offset_width(TARGET_WIDTH),
            height: TOP_HEIGHT,
            fill: "black".to_string(),
            fill_opacity: Some(0.1),
            stroke: Some(GRID_STROKE.to_string()),
        });
    }
    for site in cut_sites {
        let mark = if site.cut_pos - site.position > CUT_FAR_THRESHOLD {
            site.cut_pos + CUT_MARK_SHIFT
        } else {
            site.position - CUT_MARK_SHIFT
        };
        layer.rect(Rect {
            x: x.map(mark as f64),
            y: 0.0,
            width: offset_width(CUT_MARK_WIDTH),
            height: TOP_HEIGHT,
            fill: "gray".to_string(),
            fill_opacity: Some(0.6),
            stroke: Some(GRID_STROKE.to_string()),
        });
    }

    for (series, points) in &stacked {
        let pts = points
            .iter()
            .map(|p| (x.map(p.x as f64), axis.rate_y(p.y1).clamp(0.0, TOP_HEIGHT)))
            .collect();
        layer.elements.push(Element::Polyline {
            points: pts,
            stroke: series.color().to_string(),
            stroke_width: 3.0,
        });
    }

    let axis_x = MARGIN_LEFT - 5.0;
    layer.line(axis_x, 0.0, axis_x, TOP_HEIGHT, "#000");
    for tick in &axis.ticks {
        let y = axis.tick_y(tick.value);
        layer.line(axis_x - 6.0, y, axis_x, y, "#000");
        layer.text(text(axis_x - 9.0, y + 3.0, tick.label.clone(), 10.0, Anchor::End));
    }
    let mut legend = text(0.0, TOP_HEIGHT, axis.legend, 20.0, Anchor::Start);
    legend.rotate = Some(-90.0);
    layer.text(legend);

    if let Some(intervals) = intervals {
        for iv in intervals {
            layer.rect(Rect {
                x: x.map(iv.start as f64),
                y: 0.0,
                width: x.map((iv.end - iv.start) as f64) - x.map(min_x as f64),
                height: TOP_HEIGHT,
                fill: iv.color.clone(),
                fill_opacity: Some(0.5),
                stroke: None,
            });
        }
    }
    layer
}
