//! Ingestion of TetGen node, face and element tables.
//!
//! Each table starts with a header line (record count first) followed by one record per
//! line: `id x y z` for nodes, `id v1 v2 v3 [marker]` for faces and
//! `id v1 v2 v3 v4 [attributes]` for elements. External node numbers may be 0- or
//! 1-based or sparse; they are remapped to dense local indices in appearance order.

use crate::core::io::records::{strip_comment, tokenize};
use crate::core::models::mesh::VolumeMesh;
use nalgebra::Point3;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

static NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[-+]?(\d+\.?\d*|\.\d+)([eE][-+]?\d+)?$").expect("number pattern is valid")
});

#[derive(Debug, Error)]
pub enum MeshError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Malformed record in {file} on line {line}: {reason}")]
    MalformedRecord {
        file: String,
        line: usize,
        reason: String,
    },
    #[error("Dangling reference in {file} on line {line}: node {vertex} is not defined")]
    DanglingReference {
        file: String,
        line: usize,
        vertex: i64,
    },
    #[error("Index {index} of '{structure}' is out of range (length {len})")]
    IndexOutOfRange {
        structure: String,
        index: usize,
        len: usize,
    },
}

struct Table<'a> {
    file: &'a str,
    rows: Vec<Row>,
}

struct Row {
    line: usize,
    values: Vec<f64>,
}

impl Table<'_> {
    fn malformed(&self, line: usize, reason: impl Into<String>) -> MeshError {
        MeshError::MalformedRecord {
            file: self.file.to_string(),
            line,
            reason: reason.into(),
        }
    }
}

fn parse_table<'a>(file: &'a str, text: &str, columns: usize) -> Result<Table<'a>, MeshError> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, raw)| (idx + 1, strip_comment(raw).0))
        .filter(|(_, content)| !content.is_empty());

    let declared = lines
        .next()
        .and_then(|(_, header)| tokenize(header).first().and_then(|t| t.parse::<usize>().ok()));

    let mut rows = Vec::new();
    for (line, content) in lines {
        let tokens = tokenize(content);
        if tokens.len() < columns {
            return Err(MeshError::MalformedRecord {
                file: file.to_string(),
                line,
                reason: format!("expected {} columns, found {}", columns, tokens.len()),
            });
        }
        let values = tokens[..columns]
            .iter()
            .map(|token| {
                let value = NUMBER
                    .is_match(token)
                    .then(|| token.parse::<f64>().ok())
                    .flatten();
                value.ok_or_else(|| MeshError::MalformedRecord {
                    file: file.to_string(),
                    line,
                    reason: format!("'{}' is not a number", token),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        rows.push(Row { line, values });
    }

    match declared {
        Some(count) if count != rows.len() => warn!(
            file,
            declared = count,
            found = rows.len(),
            "Record count in header does not match the table"
        ),
        None => debug!(file, "Table header has no record count"),
        _ => {}
    }

    Ok(Table { file, rows })
}

fn as_id(table: &Table<'_>, line: usize, value: f64) -> Result<i64, MeshError> {
    if value.fract() != 0.0 || value.abs() > i64::MAX as f64 {
        return Err(table.malformed(line, format!("'{}' is not an integer id", value)));
    }
    Ok(value as i64)
}

/// Dense node registry: external id to local index, and back.
#[derive(Debug, Default)]
struct NodeRegistry {
    local: HashMap<i64, usize>,
    external: Vec<i64>,
}

impl NodeRegistry {
    fn insert(&mut self, external: i64) -> Option<usize> {
        if self.local.contains_key(&external) {
            return None;
        }
        let idx = self.external.len();
        self.local.insert(external, idx);
        self.external.push(external);
        Some(idx)
    }

    fn resolve<const N: usize>(&self, table: &Table<'_>, row: &Row) -> Result<[usize; N], MeshError> {
        let mut out = [0usize; N];
        for (slot, &value) in out.iter_mut().zip(&row.values[1..]) {
            let vertex = as_id(table, row.line, value)?;
            *slot = *self
                .local
                .get(&vertex)
                .ok_or_else(|| MeshError::DanglingReference {
                    file: table.file.to_string(),
                    line: row.line,
                    vertex,
                })?;
        }
        Ok(out)
    }
}

pub struct TetGenMesh;

impl TetGenMesh {
    /// Parses the three tables into a [`VolumeMesh`]. Nothing is returned unless every
    /// record is well-formed and every vertex reference resolves.
    #[instrument(level = "debug", skip_all)]
    pub fn parse_volume(nodes: &str, faces: &str, elements: &str) -> Result<VolumeMesh, MeshError> {
        Self::parse_named(("nodes", nodes), ("faces", faces), ("elements", elements))
    }

    /// Reads and parses the three tables from disk. Errors name the offending path.
    pub fn read_from_paths<P: AsRef<Path>>(
        nodes: P,
        faces: P,
        elements: P,
    ) -> Result<VolumeMesh, MeshError> {
        let (nodes, faces, elements) = (nodes.as_ref(), faces.as_ref(), elements.as_ref());
        let nodes_text = fs::read_to_string(nodes)?;
        let faces_text = fs::read_to_string(faces)?;
        let elements_text = fs::read_to_string(elements)?;
        Self::parse_named(
            (&nodes.display().to_string(), &nodes_text),
            (&faces.display().to_string(), &faces_text),
            (&elements.display().to_string(), &elements_text),
        )
    }

    fn parse_named(
        nodes: (&str, &str),
        faces: (&str, &str),
        elements: (&str, &str),
    ) -> Result<VolumeMesh, MeshError> {
        let node_table = parse_table(nodes.0, nodes.1, 4)?;
        let face_table = parse_table(faces.0, faces.1, 4)?;
        let element_table = parse_table(elements.0, elements.1, 5)?;

        let mut registry = NodeRegistry::default();
        let mut coords = Vec::with_capacity(node_table.rows.len());
        for row in &node_table.rows {
            let external = as_id(&node_table, row.line, row.values[0])?;
            if registry.insert(external).is_none() {
                return Err(node_table.malformed(row.line, format!("duplicate node id {}", external)));
            }
            coords.push(Point3::new(row.values[1], row.values[2], row.values[3]));
        }

        let faces = face_table
            .rows
            .iter()
            .map(|row| registry.resolve::<3>(&face_table, row))
            .collect::<Result<Vec<_>, _>>()?;
        let elements = element_table
            .rows
            .iter()
            .map(|row| registry.resolve::<4>(&element_table, row))
            .collect::<Result<Vec<_>, _>>()?;

        info!(
            nodes = coords.len(),
            faces = faces.len(),
            elements = elements.len(),
            "Volume mesh ingested"
        );

        Ok(VolumeMesh {
            nodes: coords,
            faces,
            elements,
            external_node_ids: registry.external,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    const NODES: &str = "\
# Node count, 3 dim, no attribute, no boundary marker
5  3  0  0
   1    0.0  0.0  0.0
   2    1.0  0.0  0.0
   3    0.0  1.0  0.0
   4    0.0  0.0  1.0
   5    1.0  1.0  1.0
# Generated by tetgen
";

    const FACES: &str = "\
2  1
   1    1 2 3   -1
   2    2 3 5   -1
";

    const ELEMENTS: &str = "\
2  4  1
   1    1 2 3 4   1
   2    2 3 4 5   1
";

    #[test]
    fn parses_dense_zero_based_arrays() {
        let mesh = TetGenMesh::parse_volume(NODES, FACES, ELEMENTS).unwrap();
        assert_eq!(mesh.nodes.len(), 5);
        assert_eq!(mesh.nodes[4], Point3::new(1.0, 1.0, 1.0));
        assert_eq!(mesh.faces, vec![[0, 1, 2], [1, 2, 4]]);
        assert_eq!(mesh.elements, vec![[0, 1, 2, 3], [1, 2, 3, 4]]);
        assert_eq!(mesh.external_node_ids, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn sparse_external_ids_are_remapped_in_appearance_order() {
        let nodes = "4 3 0 0\n10 0 0 0\n7 1 0 0\n42 0 1 0\n3 0 0 1\n";
        let elements = "1 4 0\n0 42 3 10 7\n";
        let mesh = TetGenMesh::parse_volume(nodes, "0 1\n", elements).unwrap();
        assert_eq!(mesh.elements, vec![[2, 3, 0, 1]]);
        assert_eq!(mesh.external_node_ids, vec![10, 7, 42, 3]);
    }

    #[test]
    fn scientific_notation_and_signs_are_accepted() {
        let nodes = "2 3 0 0\n1 -1.5e-3 +2 .5\n2 1E2 0. -0\n";
        let mesh = TetGenMesh::parse_volume(nodes, "0 1\n", "0 4 0\n").unwrap();
        assert_eq!(mesh.nodes[0], Point3::new(-1.5e-3, 2.0, 0.5));
        assert_eq!(mesh.nodes[1].x, 100.0);
    }

    #[test]
    fn non_numeric_required_column_is_malformed() {
        let nodes = "1 3 0 0\n1 0.0 abc 0.0\n";
        match TetGenMesh::parse_volume(nodes, "", "").unwrap_err() {
            MeshError::MalformedRecord { file, line, reason } => {
                assert_eq!(file, "nodes");
                assert_eq!(line, 2);
                assert!(reason.contains("abc"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn short_record_is_malformed() {
        let err = TetGenMesh::parse_volume(NODES, FACES, "1 4 0\n1 1 2 3\n").unwrap_err();
        assert!(matches!(
            err,
            MeshError::MalformedRecord { ref file, line: 2, .. } if file == "elements"
        ));
    }

    #[test]
    fn unknown_vertex_is_dangling_reference() {
        let faces = "1 1\n1 1 2 99\n";
        match TetGenMesh::parse_volume(NODES, faces, ELEMENTS).unwrap_err() {
            MeshError::DanglingReference { file, line, vertex } => {
                assert_eq!(file, "faces");
                assert_eq!(line, 2);
                assert_eq!(vertex, 99);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn duplicate_node_id_breaks_bijection() {
        let nodes = "2 3 0 0\n1 0 0 0\n1 1 1 1\n";
        let err = TetGenMesh::parse_volume(nodes, "", "").unwrap_err();
        assert!(matches!(err, MeshError::MalformedRecord { line: 3, .. }));
    }

    #[test]
    fn fractional_vertex_reference_is_malformed() {
        let faces = "1 1\n1 1 2.5 3\n";
        let err = TetGenMesh::parse_volume(NODES, faces, ELEMENTS).unwrap_err();
        assert!(matches!(err, MeshError::MalformedRecord { line: 2, .. }));
    }

    #[test]
    fn read_from_paths_names_the_file() {
        let dir = tempdir().unwrap();
        let nodes = dir.path().join("cell.node");
        let faces = dir.path().join("cell.face");
        let elements = dir.path().join("cell.ele");
        fs::write(&nodes, NODES).unwrap();
        fs::write(&faces, "1 1\n1 1 2 x\n").unwrap();
        fs::write(&elements, ELEMENTS).unwrap();

        match TetGenMesh::read_from_paths(&nodes, &faces, &elements).unwrap_err() {
            MeshError::MalformedRecord { file, .. } => assert!(file.ends_with("cell.face")),
            other => panic!("unexpected error: {other:?}"),
        }

        fs::write(&faces, FACES).unwrap();
        let mesh = TetGenMesh::read_from_paths(&nodes, &faces, &elements).unwrap();
        assert_eq!(mesh.elements.len(), 2);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let absent = dir.path().join("absent.node");
        let err = TetGenMesh::read_from_paths(&absent, &absent, &absent).unwrap_err();
        assert!(matches!(err, MeshError::Io(_)));
    }
}
