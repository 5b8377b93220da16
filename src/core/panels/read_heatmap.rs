use crate::core::model::ReadBlock;
use crate::core::palette::event_color;
use crate::core::scale::{BandScale, LinearScale};
use crate::core::scene::{Layer, Panel, Rect};
use crate::core::view::{CROP_HEIGHT_PROP, HEAT_WIDTH, MARGIN_LEFT, TOP_HEIGHT};

use super::row_grid;

/// Draws one rectangle per read block of the HMIDs below `top_n`.
///
/// `domain` is the amplicon extent shared with the top histogram; without it
/// the extent of the visible blocks is used. Blocks are clipped to it, and
/// every visible HMID keeps its row even when nothing of it is in view.
pub fn draw(
    blocks: &[ReadBlock],
    top_n: usize,
    domain: Option<(i64, i64)>,
    heat_height: f64,
) -> Layer {
    let mut layer = Layer::new(Panel::ReadHeatmap);
    let visible: Vec<&ReadBlock> = blocks.iter().filter(|b| b.array < top_n).collect();
    let Some(grid) = row_grid(visible.iter().map(|b| b.array), heat_height) else {
        return layer;
    };
    let (min_x, max_x) = match domain {
        Some(d) => d,
        None => (
            visible.iter().map(|b| b.start).min().unwrap_or(0),
            visible.iter().map(|b| b.end).max().unwrap_or(0),
        ),
    };
    let x = LinearScale::new((min_x as f64, max_x as f64), (MARGIN_LEFT, HEAT_WIDTH));
    let rows = BandScale::new(visible.iter().map(|b| b.array), grid.total_height);

    for block in visible {
        let Some(band) = rows.band(block.array) else {
            continue;
        };
        // clipped to the domain; a block outside it collapses to zero width at
        // the nearest edge so its row is still laid out
        let lo = block.start.max(min_x).min(max_x);
        let hi = block.end.min(max_x).max(lo);
        let width = (x.map(hi as f64) - x.map(lo as f64)).max(0.0);
        layer.rect(Rect {
            x: x.map(lo as f64),
            y: TOP_HEIGHT + band + (1.0 - CROP_HEIGHT_PROP) * grid.row_height,
            width,
            height: grid.row_height * CROP_HEIGHT_PROP,
            fill: event_color(block.event).to_string(),
            fill_opacity: None,
            stroke: None,
        });
    }
    layer
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::EventKind;
    use std::collections::BTreeSet;

    fn block(array: usize, start: i64, end: i64, event: EventKind) -> ReadBlock {
        ReadBlock {
            array,
            start,
            end,
            event,
        }
    }

    fn blocks() -> Vec<ReadBlock> {
        let mut out = Vec::new();
        for array in 0..12 {
            out.push(block(array, 0, 40, EventKind::Match));
            out.push(block(array, 40, 45, EventKind::Deletion));
            out.push(block(array, 45, 100, EventKind::Match));
        }
        out
    }

    fn distinct_rows(layer: &Layer) -> usize {
        layer
            .rects()
            .map(|r| (r.y * 1000.0).round() as i64)
            .collect::<BTreeSet<_>>()
            .len()
    }

    #[test]
    fn one_row_per_visible_hmid() {
        for top_n in [1, 5, 10, 12, 100] {
            let layer = draw(&blocks(), top_n, Some((0, 100)), 400.0);
            let expected = blocks()
                .iter()
                .filter(|b| b.array < top_n)
                .map(|b| b.array)
                .collect::<BTreeSet<_>>()
                .len();
            assert_eq!(distinct_rows(&layer), expected, "top_n={}", top_n);
        }
    }

    #[test]
    fn row_height_is_capped_and_cropped() {
        let layer = draw(&blocks(), 100, Some((0, 100)), 400.0);
        let first = layer.rects().next().unwrap();
        assert!((first.height - 15.0 * CROP_HEIGHT_PROP).abs() < 1e-9);
        assert!((first.y - (TOP_HEIGHT + 3.0)).abs() < 1e-9);
        // many rows share the available height
        let many: Vec<ReadBlock> = (0..200).map(|a| block(a, 0, 10, EventKind::Scar)).collect();
        let layer = draw(&many, 200, None, 400.0);
        let r = layer.rects().next().unwrap();
        assert!((r.height - 2.0 * CROP_HEIGHT_PROP).abs() < 1e-9);
    }

    #[test]
    fn block_past_domain_is_clipped_at_right_edge() {
        let input = vec![
            block(0, 10, 60, EventKind::Match),
            block(0, 60, 150, EventKind::Insertion),
        ];
        let layer = draw(&input, 10, Some((0, 100)), 400.0);
        let rects: Vec<&Rect> = layer.rects().collect();
        let last = rects[1];
        assert!((last.x + last.width - HEAT_WIDTH).abs() < 1e-9);
        assert_eq!(last.fill, event_color(EventKind::Insertion));
    }

    #[test]
    fn blocks_outside_domain_keep_their_row() {
        let input = vec![block(0, 120, 150, EventKind::Match)];
        let layer = draw(&input, 10, Some((0, 100)), 400.0);
        let rects: Vec<&Rect> = layer.rects().collect();
        assert_eq!(rects.len(), 1);
        assert_eq!(rects[0].width, 0.0);
        assert!((rects[0].x - HEAT_WIDTH).abs() < 1e-9);
    }

    #[test]
    fn every_visible_hmid_gets_a_row_after_clipping() {
        let input = vec![
            block(0, 0, 50, EventKind::Match),
            block(1, 60, 80, EventKind::Deletion),
            block(2, 10, 10, EventKind::Scar),
        ];
        let layer = draw(&input, 10, Some((0, 50)), 400.0);
        assert_eq!(distinct_rows(&layer), 3);
        let widths: Vec<f64> = layer.rects().map(|r| r.width).collect();
        assert!(widths[0] > 0.0);
        assert_eq!(widths[1], 0.0);
        assert_eq!(widths[2], 0.0);
    }

    #[test]
    fn nothing_visible_draws_nothing() {
        let layer = draw(&blocks(), 0, None, 400.0);
        assert!(layer.elements.is_empty());
    }
}
