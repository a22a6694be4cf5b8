use nalgebra::{Point3, Vector3};

pub fn tetrahedron_volume(vertices: &[Point3<f64>; 4]) -> f64 {
    let [a, b, c, d] = vertices;
    (b - a).dot(&(c - a).cross(&(d - a))).abs() / 6.0
}

pub fn triangle_area(vertices: &[Point3<f64>; 3]) -> f64 {
    let [a, b, c] = vertices;
    (b - a).cross(&(c - a)).norm() / 2.0
}

/// Folds three uniform variates from the unit cube into barycentric weights that are
/// uniformly distributed over a tetrahedron.
///
/// The cube is cut into a prism by reflecting across `s + t = 1`, and the prism into
/// the tetrahedron by folding `u` against the remaining diagonals. The returned weights
/// are `[a, s, t, u]` for vertices `v0..v3`, each in `[0, 1]`, summing to 1.
pub fn tetrahedron_weights(s: f64, t: f64, u: f64) -> [f64; 4] {
    let (mut s, mut t, mut u) = (s, t, u);

    if s + t > 1.0 {
        s = 1.0 - s;
        t = 1.0 - t;
    }

    if t + u > 1.0 {
        let tmp = u;
        u = 1.0 - s - t;
        t = 1.0 - tmp;
    } else if s + t + u > 1.0 {
        let tmp = u;
        u = s + t + u - 1.0;
        s = 1.0 - t - tmp;
    }

    let a = 1.0 - s - t - u;
    [a, s, t, u]
}

/// Area-uniform barycentric weights for a triangle from two uniform variates.
pub fn triangle_weights(s: f64, t: f64) -> [f64; 3] {
    let u = s.sqrt();
    [1.0 - u, u * (1.0 - t), u * t]
}

/// Weighted sum of vertex positions.
pub fn barycentric_point<const N: usize>(vertices: &[Point3<f64>; N], weights: &[f64; N]) -> Point3<f64> {
    let sum = vertices
        .iter()
        .zip(weights)
        .fold(Vector3::zeros(), |acc, (p, w)| acc + p.coords * *w);
    Point3::from(sum)
}
