use super::entities::StructureKind;
use crate::core::io::tetgen::MeshError;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Dense, zero-based volume arrays produced by mesh ingestion.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VolumeMesh {
    pub nodes: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
    pub elements: Vec<[usize; 4]>,
    /// External node number for each local node index.
    #[serde(skip)]
    pub external_node_ids: Vec<i64>,
}

impl VolumeMesh {
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn tetrahedron(&self, idx: usize) -> Option<[Point3<f64>; 4]> {
        let [a, b, c, d] = *self.elements.get(idx)?;
        Some([
            *self.nodes.get(a)?,
            *self.nodes.get(b)?,
            *self.nodes.get(c)?,
            *self.nodes.get(d)?,
        ])
    }

    pub fn triangle(&self, idx: usize) -> Option<[Point3<f64>; 3]> {
        let [a, b, c] = *self.faces.get(idx)?;
        Some([*self.nodes.get(a)?, *self.nodes.get(b)?, *self.nodes.get(c)?])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SurfaceMesh {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<[usize; 3]>,
}

impl SurfaceMesh {
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshStructure {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: StructureKind,
    #[serde(default)]
    pub tet_idxs: Vec<usize>,
    #[serde(default)]
    pub tri_idxs: Vec<usize>,
    /// Volume or area in model units, filled in by the import workflow.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<f64>,
}

impl MeshStructure {
    /// Simplex indices relevant for this structure's kind.
    pub fn simplex_idxs(&self) -> &[usize] {
        match self.kind {
            StructureKind::Compartment => &self.tet_idxs,
            StructureKind::Membrane => &self.tri_idxs,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FreeDiffusionBoundary {
    pub name: String,
    #[serde(default)]
    pub tri_idxs: Vec<usize>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeshMeta {
    pub scale: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mesh_name_root: Option<String>,
    #[serde(default)]
    pub structures: Vec<MeshStructure>,
    #[serde(default)]
    pub free_diffusion_boundaries: Vec<FreeDiffusionBoundary>,
}

impl Default for MeshMeta {
    fn default() -> Self {
        Self {
            scale: 1.0,
            mesh_name_root: None,
            structures: Vec::new(),
            free_diffusion_boundaries: Vec::new(),
        }
    }
}

impl MeshMeta {
    /// Case-insensitive structure lookup.
    pub fn structure(&self, name: &str) -> Option<&MeshStructure> {
        self.structures
            .iter()
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MeshData {
    pub volume: VolumeMesh,
    /// Generated surface per structure name.
    #[serde(default)]
    pub surface: BTreeMap<String, SurfaceMesh>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Mesh {
    pub meta: MeshMeta,
    pub mesh: MeshData,
}

impl Mesh {
    pub fn new(meta: MeshMeta, volume: VolumeMesh) -> Self {
        Self {
            meta,
            mesh: MeshData {
                volume,
                surface: BTreeMap::new(),
            },
        }
    }

    pub fn volume(&self) -> &VolumeMesh {
        &self.mesh.volume
    }

    /// Verifies that every index held by the meta block points into the volume arrays.
    ///
    /// Volume faces and elements are checked against the node count as well, so a mesh
    /// assembled by hand (rather than through ingestion) gets the same guarantee.
    pub fn check_indices(&self) -> Result<(), MeshError> {
        let volume = &self.mesh.volume;
        let nodes = volume.nodes.len();

        for (i, face) in volume.faces.iter().enumerate() {
            check_all("volume.faces", face, nodes, i)?;
        }
        for (i, element) in volume.elements.iter().enumerate() {
            check_all("volume.elements", element, nodes, i)?;
        }

        for structure in &self.meta.structures {
            check_list(&structure.name, &structure.tet_idxs, volume.elements.len())?;
            check_list(&structure.name, &structure.tri_idxs, volume.faces.len())?;
        }
        for boundary in &self.meta.free_diffusion_boundaries {
            check_list(&boundary.name, &boundary.tri_idxs, volume.faces.len())?;
        }
        Ok(())
    }
}

fn check_list(owner: &str, idxs: &[usize], len: usize) -> Result<(), MeshError> {
    match idxs.iter().find(|&&idx| idx >= len) {
        Some(&index) => Err(MeshError::IndexOutOfRange {
            structure: owner.to_string(),
            index,
            len,
        }),
        None => Ok(()),
    }
}

fn check_all(owner: &str, vertices: &[usize], len: usize, row: usize) -> Result<(), MeshError> {
    check_list(&format!("{}[{}]", owner, row), vertices, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_tet() -> VolumeMesh {
        VolumeMesh {
            nodes: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            faces: vec![[0, 1, 2]],
            elements: vec![[0, 1, 2, 3]],
            external_node_ids: vec![1, 2, 3, 4],
        }
    }

    fn structure(name: &str, kind: StructureKind, tets: Vec<usize>, tris: Vec<usize>) -> MeshStructure {
        MeshStructure {
            name: name.into(),
            kind,
            tet_idxs: tets,
            tri_idxs: tris,
            size: None,
        }
    }

    #[test]
    fn check_indices_accepts_consistent_mesh() {
        let meta = MeshMeta {
            structures: vec![
                structure("cyt", StructureKind::Compartment, vec![0], vec![]),
                structure("pm", StructureKind::Membrane, vec![], vec![0]),
            ],
            ..MeshMeta::default()
        };
        assert!(Mesh::new(meta, unit_tet()).check_indices().is_ok());
    }

    #[test]
    fn check_indices_reports_structure_and_index() {
        let meta = MeshMeta {
            structures: vec![structure("cyt", StructureKind::Compartment, vec![0, 3], vec![])],
            ..MeshMeta::default()
        };
        match Mesh::new(meta, unit_tet()).check_indices() {
            Err(MeshError::IndexOutOfRange {
                structure,
                index,
                len,
            }) => {
                assert_eq!(structure, "cyt");
                assert_eq!(index, 3);
                assert_eq!(len, 1);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn meta_lookup_ignores_case() {
        let meta = MeshMeta {
            structures: vec![structure("Cyt", StructureKind::Compartment, vec![0], vec![])],
            ..MeshMeta::default()
        };
        assert!(meta.structure("cyt").is_some());
        assert!(meta.structure("ec").is_none());
    }

    #[test]
    fn serialized_tree_uses_collaborator_names() {
        let meta = MeshMeta {
            structures: vec![structure("pm", StructureKind::Membrane, vec![], vec![0])],
            ..MeshMeta::default()
        };
        let json = serde_json::to_value(Mesh::new(meta, unit_tet())).unwrap();
        assert_eq!(json["meta"]["structures"][0]["type"], "membrane");
        assert_eq!(json["meta"]["structures"][0]["triIdxs"][0], 0);
        assert_eq!(json["mesh"]["volume"]["elements"][0][3], 3);
        assert!(json["mesh"]["volume"].get("external_node_ids").is_none());
        assert!(json["meta"]["freeDiffusionBoundaries"].is_array());
    }

    #[test]
    fn tetrahedron_lookup_returns_none_out_of_range() {
        let volume = unit_tet();
        assert!(volume.tetrahedron(0).is_some());
        assert!(volume.tetrahedron(1).is_none());
        assert!(volume.triangle(5).is_none());
    }
}
