//! Closed set of primitive shapes and their triangle geometry.

/// Vertex with position and face normal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshVertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<MeshVertex>,
    pub indices: Vec<u16>,
}

impl Mesh {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeKind {
    Cube,
    Plane,
}

impl ShapeKind {
    pub const ALL: [ShapeKind; 2] = [ShapeKind::Cube, ShapeKind::Plane];
}

/// Primitive shape centred on its local origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned cube with edge length `size`.
    Cube { size: f32 },
    /// Square in the XY plane facing +Z with edge length `size`.
    Plane { size: f32 },
}

impl Shape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Shape::Cube { .. } => ShapeKind::Cube,
            Shape::Plane { .. } => ShapeKind::Plane,
        }
    }

    pub fn size(&self) -> f32 {
        match *self {
            Shape::Cube { size } | Shape::Plane { size } => size,
        }
    }

    /// Unit-size shape of the same kind.
    pub fn unit(kind: ShapeKind) -> Self {
        match kind {
            ShapeKind::Cube => Shape::Cube { size: 1.0 },
            ShapeKind::Plane => Shape::Plane { size: 1.0 },
        }
    }

    /// Counter-clockwise triangles seen from outside.
    pub fn mesh(&self) -> Mesh {
        match *self {
            Shape::Cube { size } => cube_mesh(size * 0.5),
            Shape::Plane { size } => plane_mesh(size * 0.5),
        }
    }
}

fn quad(mesh: &mut Mesh, corners: [[f32; 3]; 4], normal: [f32; 3]) {
    let base = mesh.vertices.len() as u16;
    mesh.vertices
        .extend(corners.map(|position| MeshVertex { position, normal }));
    mesh.indices
        .extend_from_slice(&[base, base + 1, base + 2, base + 2, base + 3, base]);
}

fn cube_mesh(h: f32) -> Mesh {
    let mut mesh = Mesh::default();
    #[rustfmt::skip]
    let faces: [([[f32; 3]; 4], [f32; 3]); 6] = [
        ([[-h, -h,  h], [ h, -h,  h], [ h,  h,  h], [-h,  h,  h]], [0.0, 0.0, 1.0]),
        ([[ h, -h, -h], [-h, -h, -h], [-h,  h, -h], [ h,  h, -h]], [0.0, 0.0, -1.0]),
        ([[ h, -h,  h], [ h, -h, -h], [ h,  h, -h], [ h,  h,  h]], [1.0, 0.0, 0.0]),
        ([[-h, -h, -h], [-h, -h,  h], [-h,  h,  h], [-h,  h, -h]], [-1.0, 0.0, 0.0]),
        ([[-h,  h,  h], [ h,  h,  h], [ h,  h, -h], [-h,  h, -h]], [0.0, 1.0, 0.0]),
        ([[-h, -h, -h], [ h, -h, -h], [ h, -h,  h], [-h, -h,  h]], [0.0, -1.0, 0.0]),
    ];
    for (corners, normal) in faces {
        quad(&mut mesh, corners, normal);
    }
    mesh
}

fn plane_mesh(h: f32) -> Mesh {
    let mut mesh = Mesh::default();
    quad(
        &mut mesh,
        [[-h, -h, 0.0], [h, -h, 0.0], [h, h, 0.0], [-h, h, 0.0]],
        [0.0, 0.0, 1.0],
    );
    mesh
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    /// Every triangle winds counter-clockwise around its vertex normal.
    fn assert_outward_winding(mesh: &Mesh) {
        for tri in mesh.indices.chunks(3) {
            let v = |i: u16| Vec3::from(mesh.vertices[i as usize].position);
            let n = Vec3::from(mesh.vertices[tri[0] as usize].normal);
            let face = (v(tri[1]) - v(tri[0])).cross(v(tri[2]) - v(tri[0]));
            assert!(face.dot(n) > 0.0, "triangle {tri:?} winds inward");
        }
    }

    #[test]
    fn cube_has_six_faces() {
        let mesh = Shape::Cube { size: 0.2 }.mesh();
        assert_eq!(mesh.vertices.len(), 24);
        assert_eq!(mesh.triangle_count(), 12);
        assert!(mesh
            .vertices
            .iter()
            .all(|v| v.position.iter().all(|c| (c.abs() - 0.1).abs() < 1e-6)));
        assert_outward_winding(&mesh);
    }

    #[test]
    fn plane_faces_up() {
        let mesh = Shape::Plane { size: 5.0 }.mesh();
        assert_eq!(mesh.triangle_count(), 2);
        assert!(mesh.vertices.iter().all(|v| v.position[2] == 0.0));
        assert_outward_winding(&mesh);
    }

    #[test]
    fn unit_shapes_keep_kind() {
        for kind in [ShapeKind::Cube, ShapeKind::Plane] {
            let s = Shape::unit(kind);
            assert_eq!(s.kind(), kind);
            assert_eq!(s.size(), 1.0);
        }
    }
}
