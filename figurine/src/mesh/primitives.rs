//! Closed primitive generators for the model synthesizer.
//!
//! Both generators emit watertight meshes centered at the origin with CCW
//! outward winding, so `TriMesh::signed_volume` is positive for each.

use std::f64::consts::TAU;

use nalgebra::Point3;

use super::types::TriMesh;

/// Generate a UV sphere centered at the origin.
///
/// `segments` is the number of longitudinal slices, `rings` the number of
/// latitudinal bands between the poles. Both are clamped to a minimum of 3
/// so the result is always a closed solid.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn uv_sphere(radius: f64, segments: u32, rings: u32) -> TriMesh {
    let segments = segments.max(3);
    let rings = rings.max(3);

    let vertex_count = (rings - 1) * segments + 2;
    let face_count = 2 * segments + (rings - 2) * segments * 2;
    let mut mesh = TriMesh::with_capacity(vertex_count as usize, face_count as usize);

    // Top pole, interior rings from top to bottom, bottom pole.
    mesh.positions.push(Point3::new(0.0, radius, 0.0));
    for ring in 1..rings {
        let theta = std::f64::consts::PI * f64::from(ring) / f64::from(rings);
        let y = radius * theta.cos();
        let ring_radius = radius * theta.sin();
        for segment in 0..segments {
            let phi = TAU * f64::from(segment) / f64::from(segments);
            mesh.positions
                .push(Point3::new(ring_radius * phi.cos(), y, ring_radius * phi.sin()));
        }
    }
    mesh.positions.push(Point3::new(0.0, -radius, 0.0));

    let top = 0u32;
    let bottom = (mesh.positions.len() - 1) as u32;
    // Index of column `segment` on interior ring `ring` (0-based from the top).
    let at = |ring: u32, segment: u32| 1 + ring * segments + (segment % segments);

    // Top cap.
    for segment in 0..segments {
        mesh.faces.push([top, at(0, segment + 1), at(0, segment)]);
    }

    // Bands between interior rings.
    for ring in 0..rings - 2 {
        for segment in 0..segments {
            let u0 = at(ring, segment);
            let u1 = at(ring, segment + 1);
            let l0 = at(ring + 1, segment);
            let l1 = at(ring + 1, segment + 1);
            mesh.faces.push([u0, u1, l1]);
            mesh.faces.push([u0, l1, l0]);
        }
    }

    // Bottom cap.
    for segment in 0..segments {
        mesh.faces
            .push([bottom, at(rings - 2, segment), at(rings - 2, segment + 1)]);
    }

    mesh
}

/// Generate a capped cylinder centered at the origin with its axis along +Y.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn cylinder(radius: f64, height: f64, segments: u32) -> TriMesh {
    let segments = segments.max(3);
    let half = height / 2.0;

    let mut mesh = TriMesh::with_capacity(2 * segments as usize + 2, 4 * segments as usize);

    // Top ring, bottom ring, then the two cap centers.
    for segment in 0..segments {
        let phi = TAU * f64::from(segment) / f64::from(segments);
        mesh.positions
            .push(Point3::new(radius * phi.cos(), half, radius * phi.sin()));
    }
    for segment in 0..segments {
        let phi = TAU * f64::from(segment) / f64::from(segments);
        mesh.positions
            .push(Point3::new(radius * phi.cos(), -half, radius * phi.sin()));
    }
    mesh.positions.push(Point3::new(0.0, half, 0.0));
    mesh.positions.push(Point3::new(0.0, -half, 0.0));

    let top_center = 2 * segments;
    let bottom_center = 2 * segments + 1;
    let top = |segment: u32| segment % segments;
    let bottom = |segment: u32| segments + segment % segments;

    for segment in 0..segments {
        // Side quad.
        let t0 = top(segment);
        let t1 = top(segment + 1);
        let b0 = bottom(segment);
        let b1 = bottom(segment + 1);
        mesh.faces.push([t0, t1, b1]);
        mesh.faces.push([t0, b1, b0]);

        // Caps.
        mesh.faces.push([top_center, t1, t0]);
        mesh.faces.push([bottom_center, b0, b1]);
    }

    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn sphere_is_closed_and_outward() {
        let sphere = uv_sphere(1.0, 24, 16);
        let expected = 4.0 / 3.0 * PI;
        let volume = sphere.signed_volume();

        // Tessellated volume slightly undershoots the analytic one.
        assert!(volume > 0.0, "winding must be outward, got {volume}");
        assert!(
            (volume - expected).abs() / expected < 0.05,
            "volume {volume} too far from {expected}"
        );
    }

    #[test]
    fn sphere_vertex_and_face_counts() {
        let sphere = uv_sphere(1.0, 8, 4);
        assert_eq!(sphere.vertex_count(), 3 * 8 + 2);
        assert_eq!(sphere.face_count(), 2 * 8 + 2 * 8 * 2);
    }

    #[test]
    fn cylinder_is_closed_and_outward() {
        let cyl = cylinder(0.5, 2.0, 24);
        let expected = PI * 0.5 * 0.5 * 2.0;
        let volume = cyl.signed_volume();

        assert!(volume > 0.0, "winding must be outward, got {volume}");
        assert!(
            (volume - expected).abs() / expected < 0.05,
            "volume {volume} too far from {expected}"
        );
    }

    #[test]
    fn cylinder_indices_in_range() {
        let cyl = cylinder(1.0, 1.0, 6);
        let n = cyl.vertex_count() as u32;
        assert!(cyl.faces.iter().flatten().all(|&i| i < n));
    }

    #[test]
    fn degenerate_segment_counts_are_clamped() {
        assert!(uv_sphere(1.0, 0, 0).signed_volume() > 0.0);
        assert!(cylinder(1.0, 1.0, 1).signed_volume() > 0.0);
    }
}
