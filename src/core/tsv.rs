use crate::core::model::{CutSite, EventKind, Interval, Occurrence, PerBaseRow, ReadBlock};
use anyhow::{Context, Result};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::io::Read;

#[derive(Deserialize)]
struct OccurrenceRecord {
    array: usize,
    #[serde(rename = "rawCount")]
    raw_count: f64,
    #[serde(rename = "WT")]
    wt: String,
    #[serde(rename = "highlightMembership", default)]
    highlight_membership: Option<String>,
}

#[derive(Deserialize)]
struct ReadBlockRecord {
    array: usize,
    start: i64,
    end: i64,
    event: u8,
}

fn read_records<T, R>(reader: R) -> Result<Vec<T>>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(b'\t')
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut out = Vec::new();
    for (i, rec) in rdr.deserialize::<T>().enumerate() {
        // +2: header line plus 1-based numbering
        out.push(rec.with_context(|| format!("malformed row at line {}", i + 2))?);
    }
    Ok(out)
}

pub fn parse_per_base<R: Read>(reader: R) -> Result<Vec<PerBaseRow>> {
    read_records(reader)
}

/// Accepts either `cutPos` or `cutpos` for the cut position column.
pub fn parse_cut_sites<R: Read>(reader: R) -> Result<Vec<CutSite>> {
    read_records(reader)
}

pub fn parse_intervals<R: Read>(reader: R) -> Result<Vec<Interval>> {
    read_records(reader)
}

pub fn parse_occurrences<R: Read>(reader: R) -> Result<Vec<Occurrence>> {
    let records: Vec<OccurrenceRecord> = read_records(reader)?;
    Ok(records
        .into_iter()
        .map(|r| Occurrence {
            array: r.array,
            raw_count: r.raw_count,
            color: r.wt,
            membership: r
                .highlight_membership
                .map(|m| split_membership(&m))
                .unwrap_or_default(),
        })
        .collect())
}

pub fn parse_read_blocks<R: Read>(reader: R) -> Result<Vec<ReadBlock>> {
    let records: Vec<ReadBlockRecord> = read_records(reader)?;
    records
        .into_iter()
        .enumerate()
        .map(|(i, r)| {
            let event = EventKind::from_code(r.event)
                .with_context(|| format!("bad event at line {}", i + 2))?;
            Ok(ReadBlock {
                array: r.array,
                start: r.start,
                end: r.end,
                event,
            })
        })
        .collect()
}

fn split_membership(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
