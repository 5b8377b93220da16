use crate::core::model::Occurrence;
use crate::core::palette::{FALLBACK_STROKE, shade_color};
use crate::core::scale::{
    BandScale, LinearScale, LogScale, fmt_tick, format_power_of_ten, is_power_of_ten, log_ticks,
};
use crate::core::scene::{Anchor, Layer, Panel, Rect, text};
use crate::core::view::{
    CROP_HEIGHT_PROP, Layout, RIGHT_HISTO_LOG_WIDTH, RIGHT_HISTO_WIDTH, ScaleMode, TOP_HEIGHT,
    TOP_WIDTH,
};

use super::row_grid;

const MIN_BAR_WIDTH: f64 = 0.5;
const LINEAR_TICKS: usize = 10;

#[derive(Clone, Copy, Debug)]
enum CountScale {
    Linear(LinearScale),
    Log(LogScale),
}

impl CountScale {
    fn map(&self, v: f64) -> f64 {
        match self {
            CountScale::Linear(s) => s.map(v),
            CountScale::Log(s) => s.map(v),
        }
    }
}

/// Ticks shown on the count axis.
///
/// Log mode keeps only exact powers of ten inside the observed count range;
/// linear mode drops every other tick, starting with the first.
pub fn count_ticks(counts: &[f64], mode: ScaleMode) -> Vec<(f64, String)> {
    match mode {
        ScaleMode::Log => {
            let (lo, hi) = positive_extent(counts);
            log_ticks(lo, hi)
                .into_iter()
                .filter(|v| is_power_of_ten(*v))
                .map(|v| (v, format_power_of_ten(v)))
                .collect()
        }
        ScaleMode::Linear => {
            let max = counts.iter().copied().fold(0.0, f64::max);
            LinearScale::new((0.0, max), (0.0, RIGHT_HISTO_WIDTH))
                .nice(LINEAR_TICKS)
                .ticks(LINEAR_TICKS)
                .into_iter()
                .enumerate()
                .filter(|(i, _)| i % 2 == 1)
                .map(|(_, v)| (v, fmt_tick(v)))
                .collect()
        }
    }
}

fn positive_extent(counts: &[f64]) -> (f64, f64) {
    let mut lo = f64::INFINITY;
    let mut hi = 0.0f64;
    for &c in counts.iter().filter(|c| **c > 0.0) {
        lo = lo.min(c);
        hi = hi.max(c);
    }
    if lo.is_finite() { (lo, hi) } else { (1.0, 1.0) }
}

fn count_scale(counts: &[f64], mode: ScaleMode) -> CountScale {
    match mode {
        ScaleMode::Linear => {
            let max = counts.iter().copied().fold(0.0, f64::max);
            CountScale::Linear(
                LinearScale::new((0.0, max), (0.0, RIGHT_HISTO_WIDTH)).nice(LINEAR_TICKS),
            )
        }
        ScaleMode::Log => {
            let (lo, hi) = positive_extent(counts);
            CountScale::Log(LogScale::new((lo, hi), (0.0, RIGHT_HISTO_LOG_WIDTH)).nice())
        }
    }
}

pub fn draw(occurrences: &[Occurrence], top_n: usize, mode: ScaleMode, layout: &Layout) -> Layer {
    let mut layer = Layer::new(Panel::Abundance);
    let visible: Vec<&Occurrence> = occurrences.iter().filter(|o| o.array < top_n).collect();
    let Some(grid) = row_grid(visible.iter().map(|o| o.array), layout.right_histo_height) else {
        return layer;
    };
    let rows = BandScale::new(visible.iter().map(|o| o.array), grid.total_height);
    let counts: Vec<f64> = visible.iter().map(|o| o.raw_count).collect();
    let scale = count_scale(&counts, mode);
    let origin_x = TOP_WIDTH + layout.right_histo_buffer_x;

    for occ in &visible {
        let Some(band) = rows.band(occ.array) else {
            continue;
        };
        let width = scale.map(occ.raw_count);
        // NaN and -inf from log(0) collapse to the minimum width
        let width = if width.is_finite() { width.max(MIN_BAR_WIDTH) } else { MIN_BAR_WIDTH };
        layer.rect(Rect {
            x: origin_x,
            y: TOP_HEIGHT + band + (1.0 - CROP_HEIGHT_PROP) * grid.row_height,
            width,
            height: grid.row_height * CROP_HEIGHT_PROP,
            fill: occ.color.clone(),
            fill_opacity: None,
            stroke: Some(
                shade_color(&occ.color, -0.5).unwrap_or_else(|| FALLBACK_STROKE.to_string()),
            ),
        });
    }

    let axis_y = TOP_HEIGHT - 5.0;
    let axis_len = match mode {
        ScaleMode::Linear => RIGHT_HISTO_WIDTH,
        ScaleMode::Log => RIGHT_HISTO_LOG_WIDTH,
    };
    let tick_len = match mode {
        ScaleMode::Linear => 6.0,
        ScaleMode::Log => 10.0,
    };
    layer.line(origin_x, axis_y, origin_x + axis_len, axis_y, "#000");
    for (v, label) in count_ticks(&counts, mode) {
        let tx = origin_x + scale.map(v);
        layer.line(tx, axis_y - tick_len, tx, axis_y, "#000");
        let mut t = text(tx, axis_y - tick_len - 2.0, label, 10.0, Anchor::End);
        t.rotate = Some(90.0);
        layer.text(t);
    }
    let legend_y = match mode {
        ScaleMode::Log => TOP_HEIGHT - 70.0,
        ScaleMode::Linear => TOP_HEIGHT - 100.0,
    };
    layer.text(text(origin_x, legend_y, "Number of cells", 20.0, Anchor::Start));
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::view::ViewState;

    fn occ(array: usize, raw_count: f64, color: &str) -> Occurrence {
        Occurrence {
            array,
            raw_count,
            color: color.to_string(),
            membership: Vec::new(),
        }
    }

    #[test]
    fn log_ticks_keep_only_powers_of_ten_in_range() {
        let ticks = count_ticks(&[5.0, 50.0, 500.0], ScaleMode::Log);
        let values: Vec<f64> = ticks.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![10.0, 100.0]);
        assert_eq!(ticks[0].1, "10¹");
        assert_eq!(ticks[1].1, "10²");
    }

    #[test]
    fn linear_ticks_drop_every_other() {
        // nice domain [0, 500], ticks 0, 50, ..., 500
        let ticks = count_ticks(&[5.0, 50.0, 487.0], ScaleMode::Linear);
        let values: Vec<f64> = ticks.iter().map(|(v, _)| *v).collect();
        assert_eq!(values, vec![50.0, 150.0, 250.0, 350.0, 450.0]);
    }

    #[test]
    fn bars_follow_top_n_and_row_layout() {
        let occurrences = vec![
            occ(0, 500.0, "#ff0000"),
            occ(1, 50.0, "#00ff00"),
            occ(2, 5.0, "#0000ff"),
        ];
        let layout = Layout::for_view(&ViewState::default(), 0);
        let layer = draw(&occurrences, 2, ScaleMode::Log, &layout);
        let bars: Vec<&Rect> = layer.rects().collect();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].x, TOP_WIDTH + layout.right_histo_buffer_x);
        assert_eq!(bars[0].stroke.as_deref(), Some("#800000"));
        assert!(bars[0].width > bars[1].width);
        assert!((bars[1].y - bars[0].y - 15.0).abs() < 1e-9);
        assert!(layer.texts().any(|t| t.text == "Number of cells"));
    }

    #[test]
    fn zero_counts_still_get_a_sliver() {
        let occurrences = vec![occ(0, 0.0, "blue"), occ(1, 10.0, "#000000")];
        let layout = Layout::for_view(&ViewState::default(), 0);
        for mode in [ScaleMode::Linear, ScaleMode::Log] {
            let layer = draw(&occurrences, 10, mode, &layout);
            let bar = layer.rects().next().unwrap();
            assert_eq!(bar.width, MIN_BAR_WIDTH);
            assert_eq!(bar.stroke.as_deref(), Some(FALLBACK_STROKE));
        }
    }
}
