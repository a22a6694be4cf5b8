//! CSV exchange with the simulation side: per-simplex molecule counts in, scattered
//! points out.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io::{Read, Write};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum OccupancyError {
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Negative molecule count {count} on row {row}")]
    NegativeCount { row: usize, count: i64 },
}

/// One row of a simulation occupancy table: `structure,molecule,simplex,count`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OccupancyRecord {
    pub structure: String,
    pub molecule: String,
    /// Tetrahedron index for compartments, triangle index for membranes.
    pub simplex: usize,
    pub count: i64,
}

/// Molecule counts of one simulation time point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialSample {
    pub records: Vec<OccupancyRecord>,
}

impl SpatialSample {
    pub fn total_count(&self) -> u64 {
        self.records.iter().map(|r| r.count.max(0) as u64).sum()
    }

    /// Records grouped by structure name, preserving row order inside each group.
    pub fn by_structure(&self) -> BTreeMap<&str, Vec<&OccupancyRecord>> {
        let mut groups: BTreeMap<&str, Vec<&OccupancyRecord>> = BTreeMap::new();
        for record in &self.records {
            groups.entry(record.structure.as_str()).or_default().push(record);
        }
        groups
    }
}

pub fn read_spatial_sample(reader: impl Read) -> Result<SpatialSample, OccupancyError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(reader);

    let mut records = Vec::new();
    for (idx, result) in csv_reader.deserialize::<OccupancyRecord>().enumerate() {
        let record = result?;
        if record.count < 0 {
            return Err(OccupancyError::NegativeCount {
                row: idx + 1,
                count: record.count,
            });
        }
        records.push(record);
    }
    Ok(SpatialSample { records })
}

/// A renderable point produced by scattering a molecule count over its simplex.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatteredPoint {
    pub structure: String,
    pub molecule: String,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

pub fn write_points(writer: impl Write, points: &[ScatteredPoint]) -> Result<(), OccupancyError> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for point in points {
        csv_writer.serialize(point)?;
    }
    csv_writer.flush().map_err(csv::Error::from)?;
    Ok(())
}
