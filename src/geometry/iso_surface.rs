//! Iso-surface extraction over a scalar volume.
//!
//! Each cube of eight neighbouring cell centres is split into six tetrahedra
//! around its main diagonal and every tetrahedron is triangulated on its own
//! (marching tetrahedra). Triangles are oriented so that their normal points
//! from the region above the iso level towards the region below it.

use super::{Domain, VoxelGeometry};
use crate::prelude_crate::*;

pub type Vertex = [Float; 3];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [Vertex; 3],
}

impl Triangle {
    /// Unit normal, or zero for a degenerate triangle.
    pub fn get_normal(&self) -> Vertex {
        let [a, b, c] = self.vertices;
        let normal = cross(&sub(&b, &a), &sub(&c, &a));
        let norm = dot(&normal, &normal).sqrt();
        if norm > 0.0 {
            normal.map(|n_x| n_x / norm)
        } else {
            [0.0; 3]
        }
    }
}

const CORNERS: [[usize; 3]; 8] = [
    [0, 0, 0],
    [1, 0, 0],
    [1, 1, 0],
    [0, 1, 0],
    [0, 0, 1],
    [1, 0, 1],
    [1, 1, 1],
    [0, 1, 1],
];

const TETRAHEDRA: [[usize; 4]; 6] = [
    [0, 5, 1, 6],
    [0, 1, 2, 6],
    [0, 2, 3, 6],
    [0, 3, 7, 6],
    [0, 7, 4, 6],
    [0, 4, 5, 6],
];

/// Iso-surface of the tag field at level 0.5 over the interior of the grid:
/// one cell is dropped on every face, and one more on both X faces.
///
/// # Examples
/// ```
/// # use lbperm::geometry::{iso_surface, VoxelGeometry};
/// # use lbperm::NodeType;
/// let geometry = VoxelGeometry::from_fn([10, 8, 8], |x, y, z| {
///     if (4..6).contains(&x) && (3..5).contains(&y) && (3..5).contains(&z) {
///         NodeType::Solid
///     } else {
///         NodeType::Fluid
///     }
/// })
/// .unwrap();
///
/// let triangles = iso_surface::extract_interior(&geometry);
/// assert!(!triangles.is_empty());
/// ```
pub fn extract_interior(geometry: &VoxelGeometry) -> Vec<Triangle> {
    match geometry
        .get_bounding_box()
        .shrink(1)
        .and_then(|domain| domain.shrink_x(1))
    {
        Some(domain) => extract(&geometry.get_tag_field(), geometry.get_n(), ISO_LEVEL, &domain),
        None => Vec::new(),
    }
}

/// Triangulates the `iso_level` surface of `field` using only the cell
/// centres inside `domain`.
pub fn extract(field: &[Float], n: [usize; 3], iso_level: Float, domain: &Domain) -> Vec<Triangle> {
    let index = |x: usize, y: usize, z: usize| (x * n[1] + y) * n[2] + z;
    (domain.x0..domain.x1)
        .into_par_iter()
        .flat_map_iter(|x| {
            let mut triangles = Vec::new();
            for y in domain.y0..domain.y1 {
                for z in domain.z0..domain.z1 {
                    let positions = CORNERS.map(|[dx, dy, dz]| {
                        [(x + dx) as Float, (y + dy) as Float, (z + dz) as Float]
                    });
                    let values = CORNERS.map(|[dx, dy, dz]| field[index(x + dx, y + dy, z + dz)]);
                    let above = values.iter().filter(|&&v| v > iso_level).count();
                    if above == 0 || above == CORNERS.len() {
                        continue;
                    }
                    TETRAHEDRA.iter().for_each(|&tetrahedron| {
                        let positions = tetrahedron.map(|corner| positions[corner]);
                        let values = tetrahedron.map(|corner| values[corner]);
                        triangulate_tetrahedron(&positions, &values, iso_level, &mut triangles);
                    });
                }
            }
            triangles
        })
        .collect()
}

fn triangulate_tetrahedron(
    positions: &[Vertex; 4],
    values: &[Float; 4],
    iso_level: Float,
    triangles: &mut Vec<Triangle>,
) {
    let (inside, outside): (Vec<usize>, Vec<usize>) =
        (0..4).partition(|&i| values[i] > iso_level);
    let crossing = |a: usize, b: usize| {
        let t = (iso_level - values[a]) / (values[b] - values[a]);
        let [pa, pb] = [positions[a], positions[b]];
        [
            pa[0] + t * (pb[0] - pa[0]),
            pa[1] + t * (pb[1] - pa[1]),
            pa[2] + t * (pb[2] - pa[2]),
        ]
    };
    let reference = positions[inside.first().copied().unwrap_or(0)];
    match (inside.as_slice(), outside.as_slice()) {
        ([a], [b, c, d]) | ([b, c, d], [a]) => {
            let triangle = [crossing(*a, *b), crossing(*a, *c), crossing(*a, *d)];
            triangles.push(oriented(triangle, &reference));
        }
        ([a, b], [c, d]) => {
            let quad = [
                crossing(*a, *c),
                crossing(*a, *d),
                crossing(*b, *d),
                crossing(*b, *c),
            ];
            triangles.push(oriented([quad[0], quad[1], quad[2]], &reference));
            triangles.push(oriented([quad[0], quad[2], quad[3]], &reference));
        }
        _ => {}
    }
}

fn oriented(vertices: [Vertex; 3], inside: &Vertex) -> Triangle {
    let [a, b, c] = vertices;
    let normal = cross(&sub(&b, &a), &sub(&c, &a));
    let centroid = [
        (a[0] + b[0] + c[0]) / 3.0,
        (a[1] + b[1] + c[1]) / 3.0,
        (a[2] + b[2] + c[2]) / 3.0,
    ];
    if dot(&normal, &sub(&centroid, inside)) < 0.0 {
        Triangle {
            vertices: [a, c, b],
        }
    } else {
        Triangle { vertices }
    }
}

fn sub(a: &Vertex, b: &Vertex) -> Vertex {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

fn cross(a: &Vertex, b: &Vertex) -> Vertex {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

fn dot(a: &Vertex, b: &Vertex) -> Float {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block_geometry(n: [usize; 3], solid: Domain) -> VoxelGeometry {
        VoxelGeometry::from_fn(n, |x, y, z| {
            if solid.contains(x, y, z) { Solid } else { Fluid }
        })
        .unwrap()
    }

    #[test]
    fn test_uniform_field_has_no_surface() {
        let geometry = VoxelGeometry::only_fluid([8, 8, 8]).unwrap();

        assert!(extract_interior(&geometry).is_empty());
    }

    #[test]
    fn test_surface_stays_inside_interior_margin() {
        let geometry = block_geometry([12, 10, 10], Domain::new(5, 6, 4, 5, 4, 5));

        let triangles = extract_interior(&geometry);

        assert!(!triangles.is_empty());
        triangles.iter().flat_map(|t| t.vertices).for_each(|v| {
            assert!((2.0..=9.0).contains(&v[0]));
            assert!((1.0..=8.0).contains(&v[1]));
            assert!((1.0..=8.0).contains(&v[2]));
        });
    }

    #[test]
    fn test_solid_on_x_margin_is_ignored() {
        let geometry = block_geometry([10, 8, 8], Domain::new(0, 1, 0, 7, 0, 7));

        assert!(extract_interior(&geometry).is_empty());
    }

    #[test]
    fn test_vertices_lie_on_iso_level() {
        let geometry = block_geometry([10, 8, 8], Domain::new(4, 5, 3, 4, 3, 4));

        let triangles = extract_interior(&geometry);

        // Crossings are midway between a solid (1) and a fluid (0) centre.
        triangles.iter().flat_map(|t| t.vertices).for_each(|v| {
            let on_half = v.iter().any(|c| (c - c.floor() - 0.5).abs() < 1e-12);
            assert!(on_half, "vertex {v:?} is not on a half-cell crossing");
        });
    }

    #[test]
    fn test_normals_point_away_from_solid() {
        let geometry = block_geometry([10, 8, 8], Domain::new(4, 5, 3, 4, 3, 4));

        let triangles = extract_interior(&geometry);

        // Outward normals on a closed surface enclose a positive volume.
        let volume = triangles
            .iter()
            .map(|t| {
                let [a, b, c] = t.vertices;
                dot(&a, &cross(&b, &c)) / 6.0
            })
            .sum::<Float>();
        assert!(volume > 1.0, "enclosed volume {volume}");
    }
}
