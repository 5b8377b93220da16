use crate::core::model::{Interval, Occurrence};
use crate::core::palette::WHITE;
use crate::core::scale::BandScale;
use crate::core::scene::{Anchor, Layer, Panel, Rect, text};
use crate::core::view::{SET_MEMBER_WIDTH, TOP_HEIGHT, TOP_WIDTH};
use std::collections::HashMap;

use super::row_grid;

const CELL_PADDING: f64 = 0.8;
const LABEL_SHIFT: f64 = 0.7;

/// Rows are the given occurrences in order, columns the intervals.
/// Keys that match no interval are ignored.
pub fn membership_matrix(occurrences: &[&Occurrence], intervals: &[Interval]) -> Vec<Vec<bool>> {
    let columns: HashMap<String, usize> = intervals
        .iter()
        .enumerate()
        .map(|(i, iv)| (iv.key(), i))
        .collect();
    occurrences
        .iter()
        .map(|occ| {
            let mut row = vec![false; intervals.len()];
            for key in &occ.membership {
                if let Some(&col) = columns.get(key) {
                    row[col] = true;
                }
            }
            row
        })
        .collect()
}

pub fn draw(
    occurrences: &[Occurrence],
    intervals: &[Interval],
    top_n: usize,
    right_histo_height: f64,
) -> Layer {
    let mut layer = Layer::new(Panel::SetMembership);
    let visible: Vec<&Occurrence> = occurrences.iter().filter(|o| o.array < top_n).collect();
    let Some(grid) = row_grid(visible.iter().map(|o| o.array), right_histo_height) else {
        return layer;
    };
    if intervals.is_empty() {
        return layer;
    }
    let matrix = membership_matrix(&visible, intervals);
    let rows = BandScale::new(0..matrix.len(), grid.total_height);
    let cell_h = grid.total_height / matrix.len() as f64;
    let shift = (1.0 - CELL_PADDING) / 2.0;
    let origin = (TOP_WIDTH + 5.0, TOP_HEIGHT + 1.0);

    // column-major, matching the per-interval stacking of the grid
    for (col, iv) in intervals.iter().enumerate() {
        for (row, cells) in matrix.iter().enumerate() {
            let Some(band) = rows.band(row) else {
                continue;
            };
            layer.rect(Rect {
                x: origin.0 + col as f64 * SET_MEMBER_WIDTH + SET_MEMBER_WIDTH * shift,
                y: origin.1 + band + cell_h * shift,
                width: SET_MEMBER_WIDTH * CELL_PADDING,
                height: cell_h * CELL_PADDING,
                fill: if cells[col] {
                    iv.color.clone()
                } else {
                    WHITE.to_string()
                },
                fill_opacity: None,
                stroke: Some("#FFF".to_string()),
            });
        }
    }

    for (col, iv) in intervals.iter().enumerate() {
        let mut label = text(
            origin.0 + col as f64 * SET_MEMBER_WIDTH + SET_MEMBER_WIDTH * LABEL_SHIFT,
            TOP_HEIGHT - 10.0,
            iv.region.clone(),
            12.0,
            Anchor::Start,
        );
        label.rotate = Some(-90.0);
        layer.text(label);
    }
    layer
}
