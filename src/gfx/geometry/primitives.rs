//! # Primitive Shape Generation
//!
//! All shapes come out with outward normals and counter-clockwise winding
//! when viewed from outside.

use super::GeometryData;

/// Outward normal plus the two in-plane axes of each box face, with
/// `u x v == normal`. Order is +X, -X, +Y, -Y, +Z, -Z.
const BOX_FACES: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
    ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
    ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
    ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
    ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
    ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
];

/// Generate a box centered at the origin
///
/// Each face gets its own four vertices so normals stay flat across the face.
///
/// # Arguments
/// * `width` - Extent along X
/// * `height` - Extent along Y
/// * `depth` - Extent along Z
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = GeometryData::new();
    let half = [width * 0.5, height * 0.5, depth * 0.5];

    for (normal, u, v) in BOX_FACES {
        let base = data.vertices.len() as u32;

        for (su, sv, uv) in [
            (-1.0, -1.0, [0.0, 0.0]),
            (1.0, -1.0, [1.0, 0.0]),
            (1.0, 1.0, [1.0, 1.0]),
            (-1.0, 1.0, [0.0, 1.0]),
        ] {
            let position =
                std::array::from_fn(|axis| (normal[axis] + su * u[axis] + sv * v[axis]) * half[axis]);
            data.vertices.push(position);
            data.normals.push(normal);
            data.tex_coords.push(uv);
        }

        data.indices
            .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a unit cube centered at the origin
pub fn generate_cube() -> GeometryData {
    generate_box(1.0, 1.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_eq!(cube.normals.len(), cube.tex_coords.len());
    }

    #[test]
    fn test_box_extents() {
        let data = generate_box(2.0, 4.0, 6.0);
        for axis in 0..3 {
            let max = data
                .vertices
                .iter()
                .map(|v| v[axis])
                .fold(f32::MIN, f32::max);
            assert_eq!(max, [1.0, 2.0, 3.0][axis]);
        }
    }

    #[test]
    fn test_winding_faces_outward() {
        let data = generate_cube();
        for triangle in data.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|i| data.vertices[triangle[i] as usize]);
            let face_normal = cross(sub(b, a), sub(c, a));
            let stored = data.normals[triangle[0] as usize];
            assert!(dot(face_normal, stored) > 0.0);
            // Outward: the normal points away from the center
            assert!(dot(a, stored) > 0.0);
        }
    }
}
