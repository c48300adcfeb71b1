//! Call-request ingestion: a csv table of `{time, id, source, dest}` rows,
//! validated as a batch before the engine starts.

use std::collections::HashSet;
use std::io;
use std::path::Path;

use serde::Deserialize;

use crate::core::request::{CallRequest, Floor, Tick};
use crate::errors::CallRequestError;

/// One row of the inbound table, as it appears on disk.
#[derive(Debug, Clone, Deserialize)]
pub struct CallRequestRow {
    pub time: Tick,
    pub id: String,
    pub source: Floor,
    pub dest: Floor,
}

pub fn load_call_requests(
    path: &Path,
    top_floor: Floor,
) -> Result<Vec<CallRequest>, CallRequestError> {
    let rows = collect_rows(csv::Reader::from_path(path)?)?;
    into_call_requests(rows, top_floor)
}

pub fn call_requests_from_reader<R: io::Read>(
    reader: R,
    top_floor: Floor,
) -> Result<Vec<CallRequest>, CallRequestError> {
    let rows = collect_rows(csv::Reader::from_reader(reader))?;
    into_call_requests(rows, top_floor)
}

fn collect_rows<R: io::Read>(
    mut reader: csv::Reader<R>,
) -> Result<Vec<CallRequestRow>, CallRequestError> {
    let mut rows = Vec::new();
    for row in reader.deserialize() {
        rows.push(row?);
    }
    Ok(rows)
}

fn into_call_requests(
    rows: Vec<CallRequestRow>,
    top_floor: Floor,
) -> Result<Vec<CallRequest>, CallRequestError> {
    validate_call_requests(&rows, top_floor)?;
    Ok(rows
        .into_iter()
        .map(|row| CallRequest::new(row.id, row.time, row.source, row.dest))
        .collect())
}

pub fn validate_call_requests(
    rows: &[CallRequestRow],
    top_floor: Floor,
) -> Result<(), CallRequestError> {
    if rows.is_empty() {
        return Err(CallRequestError::Empty);
    }
    let mut seen = HashSet::new();
    for row in rows {
        if !seen.insert(row.id.as_str()) {
            return Err(CallRequestError::DuplicateId(row.id.clone()));
        }
        if row.time < 0 {
            return Err(CallRequestError::NegativeTime { id: row.id.clone(), time: row.time });
        }
        for floor in [row.source, row.dest] {
            if floor <= 0 {
                return Err(CallRequestError::NonPositiveFloor { id: row.id.clone(), floor });
            }
            if floor > top_floor {
                return Err(CallRequestError::FloorAboveBuilding {
                    id: row.id.clone(),
                    floor,
                    top: top_floor,
                });
            }
        }
        if row.source == row.dest {
            return Err(CallRequestError::SameSourceAndTarget { id: row.id.clone() });
        }
    }
    Ok(())
}
