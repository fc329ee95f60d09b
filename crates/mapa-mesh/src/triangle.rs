//! Triangle soup types and mesh assembly.

use serde::Serialize;

/// A vertex `[x, y, z]` in model millimetres.
pub type Vertex = [f64; 3];

/// A single facet of the output mesh.
///
/// No normal is stored; mesh writers either leave it zeroed or derive it from
/// the vertex winding.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle(pub [Vertex; 3]);

impl Triangle {
    /// Placeholder used to pre-fill scratch buffers before every slot is written.
    pub(crate) const SENTINEL: Triangle = Triangle([[-1.0; 3]; 3]);

    /// Create a triangle from three vertices.
    pub fn new(a: Vertex, b: Vertex, c: Vertex) -> Self {
        Triangle([a, b, c])
    }

    /// The three vertices.
    pub fn vertices(&self) -> &[Vertex; 3] {
        &self.0
    }

    /// True if any coordinate is NaN or infinite.
    pub fn has_non_finite(&self) -> bool {
        self.0.iter().flatten().any(|v| !v.is_finite())
    }
}

/// Axis-aligned bounds of a mesh.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BoundingBox {
    /// Minimum `[x, y, z]`.
    pub min: Vertex,
    /// Maximum `[x, y, z]`.
    pub max: Vertex,
}

impl BoundingBox {
    /// Extent along each axis (`max - min`).
    pub fn dimensions(&self) -> Vertex {
        [
            self.max[0] - self.min[0],
            self.max[1] - self.min[1],
            self.max[2] - self.min[2],
        ]
    }
}

/// An ordered, append-only list of triangles.
///
/// Order carries no geometric meaning but is kept stable so repeated runs
/// produce byte-identical output.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleBatch {
    triangles: Vec<Triangle>,
}

impl TriangleBatch {
    /// Create an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty batch with room for `capacity` triangles.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            triangles: Vec::with_capacity(capacity),
        }
    }

    /// Append one triangle.
    pub fn push(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    /// Append every triangle of `other`, keeping its order.
    pub fn append(&mut self, mut other: TriangleBatch) {
        self.triangles.append(&mut other.triangles);
    }

    /// Number of triangles.
    pub fn len(&self) -> usize {
        self.triangles.len()
    }

    /// True if the batch holds no triangles.
    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Iterate over triangles in order.
    pub fn iter(&self) -> std::slice::Iter<'_, Triangle> {
        self.triangles.iter()
    }

    /// Triangles as a slice.
    pub fn as_slice(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Consume the batch, returning the triangles.
    pub fn into_vec(self) -> Vec<Triangle> {
        self.triangles
    }

    /// Iterate over every vertex of every triangle.
    pub fn vertices(&self) -> impl Iterator<Item = &Vertex> + '_ {
        self.triangles.iter().flat_map(|t| t.0.iter())
    }

    /// Axis-aligned bounds, or `None` for an empty batch.
    pub fn bounding_box(&self) -> Option<BoundingBox> {
        let mut vertices = self.vertices();
        let first = *vertices.next()?;
        let mut bounds = BoundingBox {
            min: first,
            max: first,
        };
        for v in vertices {
            for axis in 0..3 {
                bounds.min[axis] = bounds.min[axis].min(v[axis]);
                bounds.max[axis] = bounds.max[axis].max(v[axis]);
            }
        }
        Some(bounds)
    }

    /// Extent of the mesh along x, y and z. Zero for an empty batch.
    pub fn dimensions(&self) -> Vertex {
        self.bounding_box()
            .map(|b| b.dimensions())
            .unwrap_or([0.0; 3])
    }
}

impl From<Vec<Triangle>> for TriangleBatch {
    fn from(triangles: Vec<Triangle>) -> Self {
        Self { triangles }
    }
}

impl<'a> IntoIterator for &'a TriangleBatch {
    type Item = &'a Triangle;
    type IntoIter = std::slice::Iter<'a, Triangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.triangles.iter()
    }
}

impl IntoIterator for TriangleBatch {
    type Item = Triangle;
    type IntoIter = std::vec::IntoIter<Triangle>;

    fn into_iter(self) -> Self::IntoIter {
        self.triangles.into_iter()
    }
}

/// Concatenate the surface, wall and base batches into one closed mesh.
///
/// Output order is surface first, then walls, then base. Vertices are not
/// welded; adjacent triangles share bit-identical coordinates instead.
pub fn assemble(surface: TriangleBatch, walls: TriangleBatch, base: TriangleBatch) -> TriangleBatch {
    let mut mesh = surface;
    mesh.triangles.reserve(walls.len() + base.len());
    mesh.append(walls);
    mesh.append(base);
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assemble_keeps_order() {
        let a = Triangle::new([0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]);
        let b = Triangle::new([0.0; 3], [2.0, 0.0, 0.0], [0.0, 2.0, 0.0]);
        let c = Triangle::new([0.0; 3], [3.0, 0.0, 0.0], [0.0, 3.0, 0.0]);

        let mesh = assemble(vec![a].into(), vec![b].into(), vec![c].into());
        assert_eq!(mesh.as_slice(), &[a, b, c]);
    }

    #[test]
    fn test_bounding_box() {
        assert!(TriangleBatch::new().bounding_box().is_none());
        assert_eq!(TriangleBatch::new().dimensions(), [0.0; 3]);

        let batch: TriangleBatch = vec![
            Triangle::new([0.0, 0.0, 0.0], [4.0, 0.0, 1.0], [0.0, 2.0, 0.5]),
            Triangle::new([1.0, -1.0, 3.0], [2.0, 2.0, 0.0], [0.0, 0.0, 0.0]),
        ]
        .into();
        let bounds = batch.bounding_box().unwrap();
        assert_eq!(bounds.min, [0.0, -1.0, 0.0]);
        assert_eq!(bounds.max, [4.0, 2.0, 3.0]);
        assert_eq!(batch.dimensions(), [4.0, 3.0, 3.0]);
    }

    #[test]
    fn test_sentinel_is_finite_placeholder() {
        assert!(!Triangle::SENTINEL.has_non_finite());
        assert!(Triangle::new([f64::NAN, 0.0, 0.0], [0.0; 3], [0.0; 3]).has_non_finite());
    }
}
