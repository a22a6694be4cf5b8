//! Uniform random points inside mesh simplices.
//!
//! Used to scatter a simulated molecule count over the tetrahedra or triangles it was
//! counted in, without storing per-molecule positions. The caller owns the random number
//! generator, so seeding is explicit.

use super::error::GeometryError;
use crate::core::models::mesh::VolumeMesh;
use crate::core::utils::geometry::barycentric_point;
use nalgebra::Point3;
use rand::Rng;

pub use crate::core::utils::geometry::{tetrahedron_weights, triangle_weights};

pub struct SpatialSampler<'m> {
    volume: &'m VolumeMesh,
    scale: f64,
}

impl<'m> SpatialSampler<'m> {
    pub fn new(volume: &'m VolumeMesh) -> Self {
        Self { volume, scale: 1.0 }
    }

    /// Multiplies every returned coordinate by `scale`.
    pub fn with_scale(mut self, scale: f64) -> Self {
        self.scale = scale;
        self
    }

    pub fn sample_tetrahedron(
        &self,
        tet_idx: usize,
        rng: &mut impl Rng,
    ) -> Result<Point3<f64>, GeometryError> {
        let vertices = self
            .volume
            .tetrahedron(tet_idx)
            .ok_or(GeometryError::IndexOutOfRange {
                kind: "tetrahedron",
                index: tet_idx,
                len: self.volume.elements.len(),
            })?;
        let weights = tetrahedron_weights(
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
            rng.gen_range(0.0..1.0),
        );
        Ok(barycentric_point(&vertices, &weights) * self.scale)
    }

    pub fn sample_triangle(
        &self,
        tri_idx: usize,
        rng: &mut impl Rng,
    ) -> Result<Point3<f64>, GeometryError> {
        let vertices = self
            .volume
            .triangle(tri_idx)
            .ok_or(GeometryError::IndexOutOfRange {
                kind: "triangle",
                index: tri_idx,
                len: self.volume.faces.len(),
            })?;
        let weights = triangle_weights(rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0));
        Ok(barycentric_point(&vertices, &weights) * self.scale)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn volume() -> VolumeMesh {
        VolumeMesh {
            nodes: vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            faces: vec![[0, 1, 2]],
            elements: vec![[0, 1, 2, 3]],
            external_node_ids: vec![],
        }
    }

    #[test]
    fn tetrahedron_samples_stay_inside() {
        let volume = volume();
        let sampler = SpatialSampler::new(&volume);
        let mut rng = StdRng::seed_from_u64(42);
        for _ in 0..1000 {
            let p = sampler.sample_tetrahedron(0, &mut rng).unwrap();
            assert!(p.x >= -1e-12 && p.y >= -1e-12 && p.z >= -1e-12);
            assert!(p.x + p.y + p.z <= 1.0 + 1e-12);
        }
    }

    #[test]
    fn tetrahedron_samples_are_not_biased_toward_a_vertex() {
        let volume = volume();
        let sampler = SpatialSampler::new(&volume);
        let mut rng = StdRng::seed_from_u64(7);
        let n = 20_000;
        let mean_x: f64 = (0..n)
            .map(|_| sampler.sample_tetrahedron(0, &mut rng).unwrap().x)
            .sum::<f64>()
            / n as f64;
        // Centroid of the unit tetrahedron is at 1/4.
        assert!((mean_x - 0.25).abs() < 0.01, "mean x = {mean_x}");
    }

    #[test]
    fn triangle_samples_lie_in_plane_and_scale() {
        let volume = volume();
        let sampler = SpatialSampler::new(&volume).with_scale(10.0);
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..500 {
            let p = sampler.sample_triangle(0, &mut rng).unwrap();
            assert_eq!(p.z, 0.0);
            assert!(p.x >= 0.0 && p.y >= 0.0 && p.x + p.y <= 10.0 + 1e-9);
        }
    }

    #[test]
    fn same_seed_gives_same_points() {
        let volume = volume();
        let sampler = SpatialSampler::new(&volume);
        let a = sampler
            .sample_tetrahedron(0, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let b = sampler
            .sample_tetrahedron(0, &mut StdRng::seed_from_u64(3))
            .unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn unknown_simplex_is_an_error() {
        let volume = volume();
        let sampler = SpatialSampler::new(&volume);
        let mut rng = StdRng::seed_from_u64(0);
        assert_eq!(
            sampler.sample_triangle(4, &mut rng),
            Err(GeometryError::IndexOutOfRange {
                kind: "triangle",
                index: 4,
                len: 1
            })
        );
        assert!(sampler.sample_tetrahedron(1, &mut rng).is_err());
    }
}
