pub mod abundance;
pub mod read_heatmap;
pub mod set_membership;
pub mod top_histogram;

use crate::core::model::LoadedData;
use crate::core::scene::Scene;
use crate::core::view::{Layout, MAX_READ_HEIGHT, ROOT_OFFSET, ViewState};
use anyhow::{Result, bail};
use std::sync::Arc;

/// Row geometry shared by the heatmap, abundance and membership panels.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RowGrid {
    pub read_count: usize,
    pub row_height: f64,
    pub total_height: f64,
}

/// Rows are sized from the largest visible HMID, not the number of distinct
/// ones, so every panel lines up on the same row pitch.
pub fn row_grid<I: IntoIterator<Item = usize>>(arrays: I, available: f64) -> Option<RowGrid> {
    let read_count = arrays.into_iter().max()? + 1;
    let row_height = MAX_READ_HEIGHT.min((available / read_count as f64).floor());
    Some(RowGrid {
        read_count,
        row_height,
        total_height: row_height * read_count as f64,
    })
}

/// Builds the whole chart from scratch for one view state.
pub fn redraw_all(data: &LoadedData, view: &ViewState) -> Scene {
    let layout = Layout::for_view(view, data.interval_count());
    let mut layers = Vec::with_capacity(4);

    if let Some(intervals) = &data.intervals {
        layers.push(set_membership::draw(
            &data.occurrences,
            intervals,
            view.top_n,
            layout.right_histo_height,
        ));
    }
    layers.push(top_histogram::draw(
        &data.per_base,
        &data.cut_sites,
        data.intervals.as_deref(),
        view.top_scale,
        view.normalization,
    ));
    layers.push(read_heatmap::draw(
        &data.read_blocks,
        view.top_n,
        data.position_extent(),
        layout.heat_height,
    ));
    layers.push(abundance::draw(
        &data.occurrences,
        view.top_n,
        view.right_scale,
        &layout,
    ));

    Scene {
        width: layout.global_width,
        height: layout.global_height,
        offset: ROOT_OFFSET,
        layers,
    }
}

/// Loaded data plus the mutable view controls.
#[derive(Clone)]
pub struct Session {
    data: Arc<LoadedData>,
    view: ViewState,
    menu: Vec<usize>,
}

impl Session {
    pub fn new(data: Arc<LoadedData>, view: ViewState, menu: Vec<usize>) -> Result<Self> {
        if !menu.contains(&view.top_n) {
            bail!("top-N {} is not one of {:?}", view.top_n, menu);
        }
        Ok(Self { data, view, menu })
    }

    pub fn data(&self) -> &LoadedData {
        &self.data
    }

    pub fn view(&self) -> ViewState {
        self.view
    }

    pub fn menu(&self) -> &[usize] {
        &self.menu
    }

    pub fn redraw(&self) -> Scene {
        redraw_all(&self.data, &self.view)
    }

    pub fn toggle_top_scale(&mut self) -> Scene {
        self.view.top_scale = self.view.top_scale.toggled();
        self.redraw()
    }

    pub fn toggle_right_scale(&mut self) -> Scene {
        self.view.right_scale = self.view.right_scale.toggled();
        self.redraw()
    }

    pub fn toggle_normalization(&mut self) -> Scene {
        self.view.normalization = self.view.normalization.toggled();
        self.redraw()
    }

    pub fn select_top_n(&mut self, top_n: usize) -> Result<Scene> {
        if !self.menu.contains(&top_n) {
            bail!("top-N {} is not one of {:?}", top_n, self.menu);
        }
        self.view.top_n = top_n;
        Ok(self.redraw())
    }
}
