use anyhow::{Result, bail};
use serde::Deserialize;

/// Edit outcome recorded for one segment of a read pattern.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum EventKind {
    Match,
    Deletion,
    Insertion,
    Mismatch,
    Scar,
}

impl EventKind {
    pub fn from_code(code: u8) -> Result<Self> {
        Ok(match code {
            0 => EventKind::Match,
            1 => EventKind::Deletion,
            2 => EventKind::Insertion,
            3 => EventKind::Mismatch,
            4 => EventKind::Scar,
            other => bail!("unknown event code {}", other),
        })
    }

    pub fn code(self) -> u8 {
        match self {
            EventKind::Match => 0,
            EventKind::Deletion => 1,
            EventKind::Insertion => 2,
            EventKind::Mismatch => 3,
            EventKind::Scar => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::Match => "match",
            EventKind::Deletion => "deletion",
            EventKind::Insertion => "insertion",
            EventKind::Mismatch => "mismatch",
            EventKind::Scar => "scar",
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct PerBaseRow {
    pub index: i64,
    #[serde(default)]
    pub reference: Option<f64>,
    pub deletion: f64,
    pub insertion: f64,
    pub scar: f64,
    pub uncovered: f64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct CutSite {
    pub position: i64,
    #[serde(rename = "cutPos", alias = "cutpos")]
    pub cut_pos: i64,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct Interval {
    pub start: i64,
    pub end: i64,
    pub color: String,
    pub region: String,
}

impl Interval {
    /// Key used by occurrence membership lists.
    pub fn key(&self) -> String {
        format!("{}-{}_{}", self.start, self.end, self.color)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Occurrence {
    pub array: usize,
    pub raw_count: f64,
    pub color: String,
    pub membership: Vec<String>,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ReadBlock {
    pub array: usize,
    pub start: i64,
    pub end: i64,
    pub event: EventKind,
}

/// Every table the plot needs, fully loaded. Immutable once built.
#[derive(Clone, Debug, Default)]
pub struct LoadedData {
    pub per_base: Vec<PerBaseRow>,
    pub cut_sites: Vec<CutSite>,
    pub intervals: Option<Vec<Interval>>,
    pub occurrences: Vec<Occurrence>,
    pub read_blocks: Vec<ReadBlock>,
}

impl LoadedData {
    pub fn interval_count(&self) -> usize {
        self.intervals.as_ref().map(|v| v.len()).unwrap_or(0)
    }

    /// Observed amplicon extent from the per-base table.
    pub fn position_extent(&self) -> Option<(i64, i64)> {
        let min = self.per_base.iter().map(|r| r.index).min()?;
        let max = self.per_base.iter().map(|r| r.index).max()?;
        Some((min, max))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_codes_round_trip_through_kind() {
        for code in 0..=4u8 {
            assert_eq!(EventKind::from_code(code).unwrap().code(), code);
        }
        assert!(EventKind::from_code(5).is_err());
    }

    #[test]
    fn interval_key_matches_membership_format() {
        let iv = Interval {
            start: 10,
            end: 30,
            color: "#ff0000".to_string(),
            region: "target1".to_string(),
        };
        assert_eq!(iv.key(), "10-30_#ff0000");
    }

    #[test]
    fn position_extent_uses_per_base_indices() {
        let row = |index| PerBaseRow {
            index,
            reference: None,
            deletion: 0.0,
            insertion: 0.0,
            scar: 0.0,
            uncovered: 0.0,
        };
        let data = LoadedData {
            per_base: vec![row(5), row(1), row(9)],
            ..Default::default()
        };
        assert_eq!(data.position_extent(), Some((1, 9)));
        assert_eq!(LoadedData::default().position_extent(), None);
    }
}
