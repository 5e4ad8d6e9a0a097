//! # Mesh Data Structures
//!
//! Scene, shape and face records using index-based references. The engine
//! never walks adjacency; it only needs every face of every shape, each with
//! three camera-space vertices, a normal, and stable identity for the
//! self-occlusion test.

use glam::DVec3;

/// Unique identifier for shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ShapeId(pub u32);

/// Unique identifier for faces, global across the scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FaceId(pub u32);

/// A triangle face with a precomputed normal.
#[derive(Debug, Clone, PartialEq)]
pub struct Face {
    /// Camera-space vertex positions.
    pub vertices: [DVec3; 3],
    /// Face normal (unit length, supplied by the host).
    pub normal: DVec3,
    /// Shape this face belongs to.
    pub shape: ShapeId,
}

/// A shape: one connected surface contributing faces and curves.
#[derive(Debug, Clone, Default)]
pub struct Shape {
    /// Faces owned by this shape, as indices into the scene face arena.
    faces: Vec<FaceId>,
}

impl Shape {
    /// Returns the ids of the faces owned by this shape.
    #[inline]
    pub fn faces(&self) -> &[FaceId] {
        &self.faces
    }
}

/// The static scene: shapes and a flat face arena.
///
/// Faces live in a single arena so a `FaceId` is a direct index; shapes hold
/// non-owning id lists.
///
/// # Example
///
/// ```rust
/// use inkline_scene::Scene;
/// use glam::DVec3;
///
/// let mut scene = Scene::new();
/// let shape = scene.add_shape();
/// let face = scene.add_face(
///     shape,
///     [DVec3::ZERO, DVec3::X, DVec3::Y],
///     DVec3::Z,
/// );
/// assert_eq!(scene.face(face).shape, shape);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Scene {
    shapes: Vec<Shape>,
    faces: Vec<Face>,
}

impl Scene {
    /// Creates an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a shape and returns its id.
    pub fn add_shape(&mut self) -> ShapeId {
        let id = ShapeId(self.shapes.len() as u32);
        self.shapes.push(Shape::default());
        id
    }

    /// Adds a face to a shape and returns its id.
    ///
    /// The normal is taken as supplied; the engine does not re-derive it.
    pub fn add_face(&mut self, shape: ShapeId, vertices: [DVec3; 3], normal: DVec3) -> FaceId {
        let id = FaceId(self.faces.len() as u32);
        self.faces.push(Face {
            vertices,
            normal,
            shape,
        });
        self.shapes[shape.0 as usize].faces.push(id);
        id
    }

    /// Returns the number of shapes.
    #[inline]
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    /// Returns the number of faces across all shapes.
    #[inline]
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Returns true if the scene has no faces.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    /// Returns the shape with the given id.
    #[inline]
    pub fn shape(&self, id: ShapeId) -> &Shape {
        &self.shapes[id.0 as usize]
    }

    /// Returns the face with the given id.
    #[inline]
    pub fn face(&self, id: FaceId) -> &Face {
        &self.faces[id.0 as usize]
    }

    /// Iterates every face of every shape in arena order.
    #[inline]
    pub fn faces(&self) -> impl Iterator<Item = (FaceId, &Face)> {
        self.faces
            .iter()
            .enumerate()
            .map(|(i, f)| (FaceId(i as u32), f))
    }
}
