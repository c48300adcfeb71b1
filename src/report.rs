//! Output surfaces: the per-tick elevator state table, the per-request
//! timing table and the summary metrics, each renderable as an aligned
//! text table or a csv section.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::core::elevator::{Elevator, ElevatorState};
use crate::core::request::{Floor, RequestId, SharedRequest, Tick};

#[derive(Debug, Clone)]
pub struct ElevatorSnapshot {
    pub floor: Floor,
    pub state: ElevatorState,
    pub passengers: Vec<RequestId>,
}

#[derive(Debug, Clone)]
pub struct ElevatorLogRow {
    pub time: Tick,
    pub snapshots: Vec<ElevatorSnapshot>,
}

/// Elevator state over time: one row per tick, one snapshot per elevator.
#[derive(Debug)]
pub struct ElevatorLog {
    names: Vec<String>,
    rows: Vec<ElevatorLogRow>,
}

impl ElevatorLog {
    pub fn new(elevators: &[Elevator]) -> Self {
        Self {
            names: elevators.iter().map(|elevator| elevator.name.clone()).collect(),
            rows: Vec::new(),
        }
    }

    /// Snapshot the fleet after the movement phase of `time`.
    pub fn record(&mut self, time: Tick, elevators: &[Elevator]) {
        let snapshots = elevators
            .iter()
            .map(|elevator| ElevatorSnapshot {
                floor: elevator.current_floor,
                state: elevator.state,
                passengers: elevator.passengers.clone(),
            })
            .collect();
        self.rows.push(ElevatorLogRow { time, snapshots });
    }

    pub fn elevator_names(&self) -> &[String] {
        &self.names
    }

    pub fn rows(&self) -> &[ElevatorLogRow] {
        &self.rows
    }

    fn header(&self) -> Vec<String> {
        let mut header = vec!["time".to_string()];
        for name in &self.names {
            header.push(format!("{name} floor"));
            header.push(format!("{name} state"));
            header.push(format!("{name} passengers"));
        }
        header
    }

    fn table_rows(&self) -> Vec<Vec<String>> {
        self.rows
            .iter()
            .map(|row| {
                let mut cells = vec![row.time.to_string()];
                for snapshot in &row.snapshots {
                    cells.push(snapshot.floor.to_string());
                    cells.push(snapshot.state.label().to_string());
                    cells.push(snapshot.passengers.join(","));
                }
                cells
            })
            .collect()
    }

    pub fn render(&self) -> String {
        render_table(&self.header(), &self.table_rows())
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        write_csv_table(writer, &self.header(), &self.table_rows())
    }
}

/// One finished (or in-flight) request as it appears in the timing table.
#[derive(Debug, Clone)]
pub struct RequestRecord {
    pub id: RequestId,
    pub call_time: Tick,
    pub route: String,
    pub pickup_time: Option<Tick>,
    pub dropoff_time: Option<Tick>,
    pub elevator: String,
}

impl RequestRecord {
    pub fn wait_time(&self) -> Option<Tick> {
        self.pickup_time.map(|pickup| pickup - self.call_time)
    }

    pub fn total_time(&self) -> Option<Tick> {
        self.dropoff_time.map(|dropoff| dropoff - self.call_time)
    }
}

#[derive(Debug)]
pub struct RequestLog {
    records: Vec<RequestRecord>,
}

impl RequestLog {
    pub fn from_requests(requests: &[SharedRequest]) -> Self {
        let records = requests
            .iter()
            .map(|request| {
                let request = request.borrow();
                RequestRecord {
                    id: request.id.clone(),
                    call_time: request.call_time,
                    route: format!("{} -> {}", request.source_floor, request.target_floor),
                    pickup_time: request.pickup_time,
                    dropoff_time: request.dropoff_time,
                    elevator: request
                        .assigned_elevator
                        .clone()
                        .unwrap_or_else(|| "-".to_string()),
                }
            })
            .collect();
        Self { records }
    }

    pub fn records(&self) -> &[RequestRecord] {
        &self.records
    }

    fn header(&self) -> Vec<String> {
        [
            "id",
            "call_time",
            "route",
            "pickup_time",
            "dropoff_time",
            "wait_time",
            "total_time",
            "elevator",
        ]
        .map(str::to_string)
        .to_vec()
    }

    fn table_rows(&self) -> Vec<Vec<String>> {
        self.records
            .iter()
            .map(|record| {
                vec![
                    record.id.clone(),
                    record.call_time.to_string(),
                    record.route.clone(),
                    optional_tick(record.pickup_time),
                    optional_tick(record.dropoff_time),
                    optional_tick(record.wait_time()),
                    optional_tick(record.total_time()),
                    record.elevator.clone(),
                ]
            })
            .collect()
    }

    pub fn render(&self) -> String {
        render_table(&self.header(), &self.table_rows())
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        write_csv_table(writer, &self.header(), &self.table_rows())
    }
}

fn optional_tick(value: Option<Tick>) -> String {
    value.map_or_else(|| "-".to_string(), |tick| tick.to_string())
}

/// Min / max / mean of wait and total times across all completed requests.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Metrics {
    pub min_wait: Tick,
    pub max_wait: Tick,
    pub mean_wait: f64,
    pub min_total: Tick,
    pub max_total: Tick,
    pub mean_total: f64,
}

impl Metrics {
    /// `None` when no request has completed.
    pub fn from_request_log(log: &RequestLog) -> Option<Self> {
        let waits: Vec<Tick> =
            log.records().iter().filter_map(RequestRecord::wait_time).collect();
        let totals: Vec<Tick> =
            log.records().iter().filter_map(RequestRecord::total_time).collect();
        if waits.is_empty() || totals.is_empty() {
            return None;
        }
        Some(Self {
            min_wait: waits.iter().copied().min()?,
            max_wait: waits.iter().copied().max()?,
            mean_wait: mean(&waits),
            min_total: totals.iter().copied().min()?,
            max_total: totals.iter().copied().max()?,
            mean_total: mean(&totals),
        })
    }

    fn header(&self) -> Vec<String> {
        ["metric", "wait_time", "total_time"].map(str::to_string).to_vec()
    }

    fn table_rows(&self) -> Vec<Vec<String>> {
        vec![
            vec!["min".to_string(), self.min_wait.to_string(), self.min_total.to_string()],
            vec!["max".to_string(), self.max_wait.to_string(), self.max_total.to_string()],
            vec![
                "mean".to_string(),
                format!("{:.2}", self.mean_wait),
                format!("{:.2}", self.mean_total),
            ],
        ]
    }

    pub fn render(&self) -> String {
        render_table(&self.header(), &self.table_rows())
    }

    pub fn write_csv<W: io::Write>(&self, writer: W) -> csv::Result<()> {
        write_csv_table(writer, &self.header(), &self.table_rows())
    }
}

fn mean(values: &[Tick]) -> f64 {
    values.iter().sum::<Tick>() as f64 / values.len() as f64
}

/// All three surfaces into one file, as blank-line-separated csv sections.
pub fn write_combined_csv(
    path: &Path,
    elevator_log: &ElevatorLog,
    request_log: &RequestLog,
    metrics: Option<&Metrics>,
) -> io::Result<()> {
    let mut file = File::create(path)?;
    elevator_log.write_csv(&mut file).map_err(csv_to_io)?;
    writeln!(file)?;
    request_log.write_csv(&mut file).map_err(csv_to_io)?;
    if let Some(metrics) = metrics {
        writeln!(file)?;
        metrics.write_csv(&mut file).map_err(csv_to_io)?;
    }
    Ok(())
}

fn csv_to_io(error: csv::Error) -> io::Error {
    io::Error::other(error)
}

fn write_csv_table<W: io::Write>(
    writer: W,
    header: &[String],
    rows: &[Vec<String>],
) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    writer.write_record(header)?;
    for row in rows {
        writer.write_record(row)?;
    }
    writer.flush()?;
    Ok(())
}

fn render_table(header: &[String], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = header.iter().map(String::len).collect();
    for row in rows {
        for (index, cell) in row.iter().enumerate() {
            if cell.len() > widths[index] {
                widths[index] = cell.len();
            }
        }
    }

    let mut out = String::new();
    let push_row = |cells: &[String], out: &mut String| {
        let line: Vec<String> = cells
            .iter()
            .zip(&widths)
            .map(|(cell, &width)| format!("{cell:>width$}"))
            .collect();
        out.push_str(&line.join("  "));
        out.push('\n');
    };

    push_row(header, &mut out);
    for row in rows {
        push_row(row, &mut out);
    }
    out
}
