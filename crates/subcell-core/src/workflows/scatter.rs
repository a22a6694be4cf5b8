use crate::core::io::occupancy::{ScatteredPoint, SpatialSample};
use crate::core::models::entities::StructureKind;
use crate::core::models::mesh::Mesh;
use crate::engine::config::SamplingConfig;
use crate::engine::error::EngineError;
use crate::engine::sampling::SpatialSampler;
use rand::Rng;
use std::collections::BTreeSet;
use tracing::{info, instrument, warn};

/// Places one random point per counted molecule inside the simplex it was counted in.
///
/// Rows are processed in order; structures are matched against the mesh meta ignoring
/// case, and rows naming an unknown structure are skipped. Output stops at
/// `config.max_points`. Coordinates are multiplied by the mesh scale.
#[instrument(skip_all, name = "scatter_workflow", fields(rows = sample.records.len()))]
pub fn run(
    mesh: &Mesh,
    sample: &SpatialSample,
    config: &SamplingConfig,
    rng: &mut impl Rng,
) -> Result<Vec<ScatteredPoint>, EngineError> {
    let sampler = SpatialSampler::new(mesh.volume()).with_scale(mesh.meta.scale);
    let capacity = (sample.total_count() as usize).min(config.max_points);
    let mut points = Vec::with_capacity(capacity);
    let mut unknown: BTreeSet<&str> = BTreeSet::new();

    'rows: for record in &sample.records {
        let Some(structure) = mesh.meta.structure(&record.structure) else {
            if unknown.insert(record.structure.as_str()) {
                warn!(structure = %record.structure, "Skipping counts for unknown structure");
            }
            continue;
        };

        for _ in 0..record.count {
            if points.len() == config.max_points {
                warn!(
                    max_points = config.max_points,
                    total = sample.total_count(),
                    "Point limit reached, remaining molecules are not scattered"
                );
                break 'rows;
            }
            let p = match structure.kind {
                StructureKind::Compartment => sampler.sample_tetrahedron(record.simplex, rng)?,
                StructureKind::Membrane => sampler.sample_triangle(record.simplex, rng)?,
            };
            points.push(ScatteredPoint {
                structure: structure.name.clone(),
                molecule: record.molecule.clone(),
                x: p.x,
                y: p.y,
                z: p.z,
            });
        }
    }

    info!(points = points.len(), "Scatter complete");
    Ok(points)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::io::occupancy::OccupancyRecord;
    use crate::core::models::mesh::{MeshMeta, MeshStructure, VolumeMesh};
    use nalgebra::Point3;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn mesh() -> Mesh {
        Mesh::new(
            MeshMeta {
                scale: 3.0,
                structures: vec![
                    MeshStructure {
                        name: "Cyt".into(),
                        kind: StructureKind::Compartment,
                        tet_idxs: vec![0],
                        tri_idxs: vec![],
                        size: None,
                    },
                    MeshStructure {
                        name: "pm".into(),
                        kind: StructureKind::Membrane,
                        tet_idxs: vec![],
                        tri_idxs: vec![0],
                        size: None,
                    },
                ],
                ..MeshMeta::default()
            },
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
            },
        )
    }

    fn record(structure: &str, molecule: &str, simplex: usize, count: i64) -> OccupancyRecord {
        OccupancyRecord {
            structure: structure.into(),
            molecule: molecule.into(),
            simplex,
            count,
        }
    }

    #[test]
    fn one_point_per_molecule_with_case_insensitive_structures() {
        let sample = SpatialSample {
            records: vec![
                record("cyt", "A", 0, 3),
                record("PM", "R", 0, 2),
                record("nucleus", "A", 0, 5),
            ],
        };
        let mut rng = StdRng::seed_from_u64(11);
        let points = run(&mesh(), &sample, &SamplingConfig::default(), &mut rng).unwrap();

        assert_eq!(points.len(), 5);
        assert!(points[..3].iter().all(|p| p.structure == "Cyt" && p.molecule == "A"));
        assert!(points[3..].iter().all(|p| p.structure == "pm" && p.z == 0.0));
        // Scale 3 stretches the unit tetrahedron.
        assert!(points.iter().all(|p| p.x + p.y + p.z <= 3.0 + 1e-9));
    }

    #[test]
    fn output_is_bounded_by_max_points() {
        let sample = SpatialSample {
            records: vec![record("cyt", "A", 0, 100), record("pm", "R", 0, 100)],
        };
        let config = SamplingConfig {
            max_points: 42,
            seed: None,
        };
        let points = run(&mesh(), &sample, &config, &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(points.len(), 42);
        assert!(points.iter().all(|p| p.molecule == "A"));
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let sample = SpatialSample {
            records: vec![record("cyt", "A", 0, 10)],
        };
        let config = SamplingConfig::default();
        let a = run(&mesh(), &sample, &config, &mut StdRng::seed_from_u64(5)).unwrap();
        let b = run(&mesh(), &sample, &config, &mut StdRng::seed_from_u64(5)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn simplex_outside_mesh_is_an_error() {
        let sample = SpatialSample {
            records: vec![record("cyt", "A", 9, 1)],
        };
        let err = run(
            &mesh(),
            &sample,
            &SamplingConfig::default(),
            &mut StdRng::seed_from_u64(0),
        )
        .unwrap_err();
        assert!(matches!(err, EngineError::Geometry { .. }));
    }
}
