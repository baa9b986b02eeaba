//! Fixed humanoid figure assembly.
//!
//! The generated figure is a deliberate placeholder: five rigid primitives
//! merged into one mesh with hardcoded transforms. Nothing about it depends
//! on the uploaded image, so every invocation produces an identical mesh.

use std::f64::consts::FRAC_PI_2;

use nalgebra::{Rotation3, Vector3};

use super::primitives::{cylinder, uv_sphere};
use super::types::TriMesh;

/// Longitudinal slices for the head sphere and all cylinders.
const SEGMENTS: u32 = 24;
/// Latitudinal bands for the head sphere.
const RINGS: u32 = 16;

/// Assemble the placeholder humanoid figure.
///
/// Parts, in merge order:
/// 1. Head: sphere r=0.25 at (0, 1.65, 0)
/// 2. Torso: cylinder r=0.25, h=0.8 at (0, 1.0, 0)
/// 3. Arms: one crossbar cylinder r=0.08, l=1.1 along X at (0, 1.3, 0)
/// 4. Left leg: cylinder r=0.10, h=0.6 at (-0.12, 0.3, 0)
/// 5. Right leg: cylinder r=0.10, h=0.6 at (0.12, 0.3, 0)
#[must_use]
pub fn humanoid_figure() -> TriMesh {
    let mut figure = TriMesh::new();

    let mut head = uv_sphere(0.25, SEGMENTS, RINGS);
    head.translate(Vector3::new(0.0, 1.65, 0.0));
    figure.merge(&head);

    let mut torso = cylinder(0.25, 0.8, SEGMENTS);
    torso.translate(Vector3::new(0.0, 1.0, 0.0));
    figure.merge(&torso);

    // Both arms are one cylinder laid across the shoulders, rotated from the
    // generator's +Y axis onto +X. A proper rotation keeps the winding CCW.
    let mut arms = cylinder(0.08, 1.1, SEGMENTS);
    let onto_x = Rotation3::from_axis_angle(&Vector3::z_axis(), -FRAC_PI_2);
    for position in &mut arms.positions {
        *position = onto_x * *position;
    }
    arms.translate(Vector3::new(0.0, 1.3, 0.0));
    figure.merge(&arms);

    for side in [-1.0, 1.0] {
        let mut leg = cylinder(0.10, 0.6, SEGMENTS);
        leg.translate(Vector3::new(side * 0.12, 0.3, 0.0));
        figure.merge(&leg);
    }

    figure
}
