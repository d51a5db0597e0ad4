use mads_core::{Domain, EvalPoint, Mesh, Point};

/// Where a Nelder-Mead pass takes place: the frame center, the optional mesh
/// of the enclosing search, and the variable domain.
pub struct Frame<'a> {
    center: EvalPoint,
    mesh: Option<&'a dyn Mesh>,
    domain: &'a Domain,
}

impl<'a> Frame<'a> {
    #[must_use]
    pub fn new(center: EvalPoint, domain: &'a Domain) -> Self {
        Self {
            center,
            mesh: None,
            domain,
        }
    }

    /// Attaches the mesh that trial points are projected on.
    #[must_use]
    pub fn with_mesh(mut self, mesh: &'a dyn Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    #[must_use]
    pub fn center(&self) -> &EvalPoint {
        &self.center
    }

    pub(super) fn set_center(&mut self, center: EvalPoint) {
        self.center = center;
    }

    #[must_use]
    pub fn domain(&self) -> &Domain {
        self.domain
    }

    #[must_use]
    pub fn dim(&self) -> usize {
        self.domain.dim()
    }

    /// The frame size per dimension, if there is a mesh.
    #[must_use]
    pub fn frame_size(&self) -> Option<&[f64]> {
        self.mesh.map(|mesh| mesh.frame_size())
    }

    /// Snaps `x` to the domain and, with a mesh, projects it on the mesh
    /// around the frame center before snapping again.
    #[must_use]
    pub fn snap_and_project(&self, x: &Point) -> Point {
        let snapped = self.domain.snap(x);
        match self.mesh {
            Some(mesh) => self.domain.snap(&mesh.project(self.center.x(), &snapped)),
            None => snapped,
        }
    }

    /// Wraps `x` as a trial point generated from the frame center.
    pub(super) fn trial_point(&self, x: Point) -> EvalPoint {
        let mut point = EvalPoint::new(x);
        point.set_point_from(self.center.x().clone());
        point
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use mads_core::FixedMesh;

    #[test]
    fn projects_then_snaps() {
        let domain = Domain::bounded(vec![0.0, 0.0], vec![1.0, 1.0]).unwrap();
        let mesh = FixedMesh::uniform(2, 0.25, 1.0).unwrap();
        let frame =
            Frame::new(EvalPoint::new(Point::from([0.5, 0.5])), &domain).with_mesh(&mesh);

        let x = frame.snap_and_project(&Point::from([0.6, 1.7]));
        assert_eq!(x, Point::from([0.5, 1.0]));
        assert_eq!(frame.frame_size(), Some(&[1.0, 1.0][..]));
    }

    #[test]
    fn trial_points_remember_the_center() {
        let domain = Domain::continuous(1);
        let frame = Frame::new(EvalPoint::new(Point::from([2.0])), &domain);
        let point = frame.trial_point(Point::from([3.0]));
        assert_eq!(point.point_from(), Some(&Point::from([2.0])));
    }
}
