use anyhow::{Result, bail};

pub const DEFAULT_TOP_N: usize = 100;
pub const DEFAULT_TOP_N_MENU: [usize; 6] = [10, 25, 50, 100, 200, 500];

/// Above this many rows the tall layout preset is used.
pub const TALL_LAYOUT_THRESHOLD: usize = 100;

pub const DEFAULT_GLOBAL_WIDTH: f64 = 1200.0;
pub const MARGIN_LEFT: f64 = 80.0;
pub const ROOT_OFFSET: (f64, f64) = (40.0, 40.0);
pub const TOP_WIDTH: f64 = 800.0;
pub const TOP_HEIGHT: f64 = 100.0;
pub const HEAT_WIDTH: f64 = 800.0;
pub const RIGHT_HISTO_WIDTH: f64 = 200.0;
pub const RIGHT_HISTO_LOG_WIDTH: f64 = 150.0;
pub const RIGHT_HISTO_BUFFER_X: f64 = 10.0;
pub const SET_MEMBER_WIDTH: f64 = 25.0;
pub const MAX_READ_HEIGHT: f64 = 15.0;
pub const CROP_HEIGHT_PROP: f64 = 0.8;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum ScaleMode {
    Linear,
    Log,
}

impl ScaleMode {
    pub fn toggled(self) -> Self {
        match self {
            ScaleMode::Linear => ScaleMode::Log,
            ScaleMode::Log => ScaleMode::Linear,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ScaleMode::Linear => "linear",
            ScaleMode::Log => "log",
        }
    }
}

/// What the top of the editing-rate axis represents.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum TopNormalization {
    ObservedMax,
    Fixed100,
}

impl TopNormalization {
    pub fn toggled(self) -> Self {
        match self {
            TopNormalization::ObservedMax => TopNormalization::Fixed100,
            TopNormalization::Fixed100 => TopNormalization::ObservedMax,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TopNormalization::ObservedMax => "max",
            TopNormalization::Fixed100 => "fixed",
        }
    }
}

/// Everything besides the loaded data that determines the rendered chart.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ViewState {
    pub top_scale: ScaleMode,
    pub right_scale: ScaleMode,
    pub normalization: TopNormalization,
    pub top_n: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            top_scale: ScaleMode::Linear,
            right_scale: ScaleMode::Log,
            normalization: TopNormalization::ObservedMax,
            top_n: DEFAULT_TOP_N,
        }
    }
}

impl ViewState {
    /// Stable identifier used for report element ids.
    pub fn slug(&self) -> String {
        format!(
            "top-{}_right-{}_{}_n{}",
            self.top_scale.as_str(),
            self.right_scale.as_str(),
            self.normalization.as_str(),
            self.top_n
        )
    }
}

/// Canvas geometry for one redraw.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Layout {
    pub global_width: f64,
    pub global_height: f64,
    pub heat_height: f64,
    pub right_histo_height: f64,
    pub right_histo_buffer_x: f64,
}

impl Layout {
    pub fn for_view(view: &ViewState, interval_count: usize) -> Self {
        let extra = SET_MEMBER_WIDTH * interval_count as f64;
        let (global_height, heat_height, right_histo_height) =
            if view.top_n > TALL_LAYOUT_THRESHOLD {
                (1400.0, 1100.0, 1100.0)
            } else {
                (700.0, 400.0, 400.0)
            };
        Self {
            global_width: DEFAULT_GLOBAL_WIDTH + extra,
            global_height,
            heat_height,
            right_histo_height,
            right_histo_buffer_x: RIGHT_HISTO_BUFFER_X + extra,
        }
    }
}

/// Parses a comma separated top-N menu such as `10,50,100`.
pub fn parse_menu(text: &str) -> Result<Vec<usize>> {
    let mut menu = Vec::new();
    for part in text.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let n: usize = part
            .parse()
            .map_err(|_| anyhow::anyhow!("invalid top-N value '{}'", part))?;
        if n == 0 {
            bail!("top-N values must be >= 1");
        }
        if !menu.contains(&n) {
            menu.push(n);
        }
    }
    if menu.is_empty() {
        bail!("top-N menu is empty");
    }
    Ok(menu)
}
