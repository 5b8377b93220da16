use crate::core::model::EventKind;

/// rgba fill for heatmap cells and top histogram lines, indexed by event code.
pub const HEATMAP_COLORS: [&str; 6] = [
    "rgba(255,255,255,1.0)",
    "rgba(255,0,0,1.0)",
    "rgba(26,99,255,1.0)",
    "rgba(0,255,0,1.0)",
    "rgba(0,0,0,1.0)",
    "rgba(255,116,0,0.5)",
];

pub const WHITE: &str = "#FFFFFF";
pub const GRID_STROKE: &str = "#888888";
pub const FALLBACK_STROKE: &str = "gray";

/// Series drawn in the top histogram, in stacking order.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Series {
    Deletion,
    Insertion,
    Scar,
    Uncovered,
}

impl Series {
    pub const ALL: [Series; 4] = [
        Series::Deletion,
        Series::Insertion,
        Series::Scar,
        Series::Uncovered,
    ];

    pub fn color(self) -> &'static str {
        match self {
            Series::Deletion => HEATMAP_COLORS[1],
            Series::Insertion => HEATMAP_COLORS[2],
            Series::Scar => HEATMAP_COLORS[4],
            Series::Uncovered => HEATMAP_COLORS[5],
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Series::Deletion => "deletion",
            Series::Insertion => "insertion",
            Series::Scar => "scar",
            Series::Uncovered => "uncovered",
        }
    }
}

pub fn event_color(event: EventKind) -> &'static str {
    HEATMAP_COLORS[event.code() as usize]
}

/// Lighten (`percent > 0`) or darken (`percent < 0`) a `#rrggbb` color.
pub fn shade_color(color: &str, percent: f64) -> Option<String> {
    let hex = color.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let f = u32::from_str_radix(hex, 16).ok()?;
    let target = if percent < 0.0 { 0.0 } else { 255.0 };
    let p = percent.abs();
    let channel = |c: u32| -> u32 {
        let c = c as f64;
        // half rounds up, also for negative offsets
        (((target - c) * p + 0.5).floor() + c).clamp(0.0, 255.0) as u32
    };
    let r = channel(f >> 16);
    let g = channel((f >> 8) & 0xff);
    let b = channel(f & 0xff);
    Some(format!("#{:02x}{:02x}{:02x}", r, g, b))
}
