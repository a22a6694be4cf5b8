use super::config::ExtractionConfig;
use super::error::GeometryError;
use super::progress::{Progress, ProgressReporter};
use crate::core::models::entities::StructureKind;
use crate::core::models::mesh::{Mesh, MeshStructure, SurfaceMesh, VolumeMesh};
use crate::core::utils::geometry::{tetrahedron_volume, triangle_area};
use std::collections::{BTreeMap, HashMap};
use tracing::{debug, info, instrument};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outward-facing triangles of a tetrahedron `[v0, v1, v2, v3]`.
const FACE_TEMPLATES: [[usize; 3]; 4] = [[0, 2, 1], [1, 2, 3], [0, 1, 3], [0, 3, 2]];

fn sorted_key(face: [usize; 3]) -> [usize; 3] {
    let mut key = face;
    key.sort_unstable();
    key
}

fn element(volume: &VolumeMesh, idx: usize) -> Result<[usize; 4], GeometryError> {
    volume
        .elements
        .get(idx)
        .copied()
        .ok_or(GeometryError::IndexOutOfRange {
            kind: "tetrahedron",
            index: idx,
            len: volume.elements.len(),
        })
}

fn face(volume: &VolumeMesh, idx: usize) -> Result<[usize; 3], GeometryError> {
    volume
        .faces
        .get(idx)
        .copied()
        .ok_or(GeometryError::IndexOutOfRange {
            kind: "triangle",
            index: idx,
            len: volume.faces.len(),
        })
}

/// Renumbers the vertices referenced by `faces` densely in first-appearance order.
fn reindex(
    volume: &VolumeMesh,
    faces: impl IntoIterator<Item = [usize; 3]>,
) -> Result<SurfaceMesh, GeometryError> {
    let mut local: HashMap<usize, usize> = HashMap::new();
    let mut surface = SurfaceMesh::default();

    for tri in faces {
        let mut out = [0usize; 3];
        for (slot, &node) in out.iter_mut().zip(&tri) {
            *slot = match local.get(&node) {
                Some(&idx) => idx,
                None => {
                    let point = volume.nodes.get(node).copied().ok_or(
                        GeometryError::IndexOutOfRange {
                            kind: "node",
                            index: node,
                            len: volume.nodes.len(),
                        },
                    )?;
                    let idx = surface.vertices.len();
                    surface.vertices.push(point);
                    local.insert(node, idx);
                    idx
                }
            };
        }
        surface.faces.push(out);
    }
    Ok(surface)
}

/// Boundary surface of the compartment made of the tetrahedra `tet_idxs`.
///
/// Every tetrahedron contributes four faces; a face seen twice (in any orientation) is
/// interior and cancels. Remaining faces keep their first-seen orientation and order.
pub fn compartment_surface(
    volume: &VolumeMesh,
    tet_idxs: &[usize],
) -> Result<SurfaceMesh, GeometryError> {
    let mut slots: Vec<Option<[usize; 3]>> = Vec::with_capacity(tet_idxs.len() * 4);
    let mut open: HashMap<[usize; 3], usize> = HashMap::with_capacity(tet_idxs.len() * 4);

    for &tet_idx in tet_idxs {
        let tet = element(volume, tet_idx)?;
        for template in FACE_TEMPLATES {
            let tri = template.map(|i| tet[i]);
            let key = sorted_key(tri);
            match open.remove(&key) {
                Some(slot) => slots[slot] = None,
                None => {
                    open.insert(key, slots.len());
                    slots.push(Some(tri));
                }
            }
        }
    }

    reindex(volume, slots.into_iter().flatten())
}

/// Surface of a membrane given by its triangle list.
pub fn membrane_surface(
    volume: &VolumeMesh,
    tri_idxs: &[usize],
) -> Result<SurfaceMesh, GeometryError> {
    let faces = tri_idxs
        .iter()
        .map(|&idx| face(volume, idx))
        .collect::<Result<Vec<_>, _>>()?;
    reindex(volume, faces)
}

pub fn structure_surface(
    volume: &VolumeMesh,
    structure: &MeshStructure,
) -> Result<SurfaceMesh, GeometryError> {
    let idxs = structure.simplex_idxs();
    match structure.kind {
        StructureKind::Compartment => compartment_surface(volume, idxs),
        StructureKind::Membrane => membrane_surface(volume, idxs),
    }
}

/// Volume (compartments) or area (membranes) of a structure, in model units.
pub fn structure_size(
    volume: &VolumeMesh,
    structure: &MeshStructure,
    scale: f64,
) -> Result<f64, GeometryError> {
    match structure.kind {
        StructureKind::Compartment => {
            let mut total = 0.0;
            for &idx in &structure.tet_idxs {
                let tet = volume.tetrahedron(idx).ok_or(GeometryError::IndexOutOfRange {
                    kind: "tetrahedron",
                    index: idx,
                    len: volume.elements.len(),
                })?;
                total += tetrahedron_volume(&tet);
            }
            Ok(total * scale.powi(3))
        }
        StructureKind::Membrane => {
            let mut total = 0.0;
            for &idx in &structure.tri_idxs {
                let tri = volume.triangle(idx).ok_or(GeometryError::IndexOutOfRange {
                    kind: "triangle",
                    index: idx,
                    len: volume.faces.len(),
                })?;
                total += triangle_area(&tri);
            }
            Ok(total * scale.powi(2))
        }
    }
}

pub struct SurfaceExtractor;

impl SurfaceExtractor {
    /// Extracts the surface of every structure in the mesh meta, keyed by structure name.
    #[instrument(skip_all, name = "surface_extraction", fields(structures = mesh.meta.structures.len()))]
    pub fn extract_all(
        mesh: &Mesh,
        config: &ExtractionConfig,
        reporter: &ProgressReporter,
    ) -> Result<BTreeMap<String, SurfaceMesh>, GeometryError> {
        let structures = &mesh.meta.structures;
        let volume = mesh.volume();
        reporter.report(Progress::TaskStart {
            total: structures.len() as u64,
        });

        let job = |s: &MeshStructure| {
            let surface = structure_surface(volume, s)?;
            debug!(
                structure = %s.name,
                faces = surface.faces.len(),
                vertices = surface.vertices.len(),
                "Surface extracted"
            );
            reporter.report(Progress::TaskIncrement { amount: 1 });
            Ok::<_, GeometryError>((s.name.clone(), surface))
        };

        #[cfg(feature = "parallel")]
        let results: Vec<_> = if structures.len() >= config.parallel_threshold {
            structures.par_iter().map(job).collect()
        } else {
            structures.iter().map(job).collect()
        };

        #[cfg(not(feature = "parallel"))]
        let results: Vec<_> = {
            let _ = config;
            structures.iter().map(job).collect()
        };

        reporter.report(Progress::TaskFinish);

        let surfaces = results
            .into_iter()
            .collect::<Result<BTreeMap<_, _>, _>>()?;
        info!(surfaces = surfaces.len(), "Surface extraction complete");
        Ok(surfaces)
    }
}
