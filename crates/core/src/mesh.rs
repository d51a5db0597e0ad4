use thiserror::Error;

use crate::Point;

/// Discretization of the variable space used by the outer direct search.
///
/// The mesh size `δ` sets the granularity of points, and the frame size `Δ`
/// bounds how far trial points may be from the frame center.
pub trait Mesh {
    /// Returns the frame size `Δ` per dimension.
    fn frame_size(&self) -> &[f64];

    /// Returns the mesh size `δ` per dimension.
    fn mesh_size(&self) -> &[f64];

    /// Projects `value`, a displacement along dimension `i`, onto the mesh.
    fn scale_and_project(&self, i: usize, value: f64) -> f64 {
        match self.mesh_size().get(i) {
            Some(&delta) if delta > 0.0 => (value / delta).round() * delta,
            _ => value,
        }
    }

    /// Projects `x` onto the mesh anchored at `center`.
    ///
    /// Components undefined in either point stay undefined.
    fn project(&self, center: &Point, x: &Point) -> Point {
        let coords = (0..x.dim())
            .map(|i| {
                let (c, v) = (center.get(i)?, x.get(i)?);
                Some(c + self.scale_and_project(i, v - c))
            })
            .collect();
        Point::new(coords)
    }
}

/// A mesh with fixed mesh and frame sizes.
#[derive(Debug, Clone, PartialEq)]
pub struct FixedMesh {
    mesh_size: Vec<f64>,
    frame_size: Vec<f64>,
}

/// Errors that can occur when building a [`FixedMesh`].
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MeshError {
    #[error("mesh and frame sizes have different dimensions")]
    Dimension,

    #[error("mesh sizes must be finite and non-negative")]
    MeshSize,

    #[error("frame sizes must be finite and positive")]
    FrameSize,
}

impl FixedMesh {
    /// Creates a mesh from per-dimension mesh and frame sizes.
    ///
    /// A zero mesh size leaves that dimension continuous.
    ///
    /// # Errors
    ///
    /// Returns an error if the dimensions differ or a size is invalid.
    pub fn new(mesh_size: Vec<f64>, frame_size: Vec<f64>) -> Result<Self, MeshError> {
        if mesh_size.len() != frame_size.len() {
            return Err(MeshError::Dimension);
        }
        if mesh_size.iter().any(|d| !d.is_finite() || *d < 0.0) {
            return Err(MeshError::MeshSize);
        }
        if frame_size.iter().any(|d| !d.is_finite() || *d <= 0.0) {
            return Err(MeshError::FrameSize);
        }
        Ok(Self {
            mesh_size,
            frame_size,
        })
    }

    /// A mesh with the same sizes in every one of `n` dimensions.
    ///
    /// # Errors
    ///
    /// Returns an error if a size is invalid.
    pub fn uniform(n: usize, mesh_size: f64, frame_size: f64) -> Result<Self, MeshError> {
        Self::new(vec![mesh_size; n], vec![frame_size; n])
    }
}

impl Mesh for FixedMesh {
    fn frame_size(&self) -> &[f64] {
        &self.frame_size
    }

    fn mesh_size(&self) -> &[f64] {
        &self.mesh_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    #[test]
    fn projects_relative_to_center() {
        let mesh = FixedMesh::new(vec![0.25, 0.0], vec![1.0, 1.0]).unwrap();
        let center = Point::from([0.1, 0.0]);
        let projected = mesh.project(&center, &Point::from([0.5, 0.333]));

        assert_relative_eq!(projected.get(0).unwrap(), 0.6);
        assert_relative_eq!(projected.get(1).unwrap(), 0.333);
    }

    #[test]
    fn validates_sizes() {
        assert_eq!(
            FixedMesh::new(vec![0.1], vec![1.0, 1.0]),
            Err(MeshError::Dimension)
        );
        assert_eq!(FixedMesh::uniform(2, -1.0, 1.0), Err(MeshError::MeshSize));
        assert_eq!(FixedMesh::uniform(2, 0.1, 0.0), Err(MeshError::FrameSize));
    }
}
