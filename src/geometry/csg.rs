// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG (Constructive Solid Geometry) operations using BSP trees
//!
//! A [`Solid`] is a BSP tree whose polygons bound a closed volume with
//! outward-facing normals. Subtraction clips each operand's boundary
//! against the other's tree and merges the survivors, which is exact for
//! closed, non-self-intersecting operands. Nothing here checks that
//! precondition: malformed operands produce cracked output, not an error.
//!
//! The splitting plane of every node is taken from the first polygon that
//! reaches it, with no balancing. One operand is always a six-faced sweep,
//! so the trees stay shallow enough in practice.

use super::{BoundingBox, Mesh, Vertex};
use nalgebra::{Point3, Vector3};

/// Distance below which a vertex is considered on a plane
pub const EPSILON: f64 = 1e-5;

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

/// Oriented plane `normal · p = w`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    pub normal: Vector3<f64>,
    pub w: f64,
}

/// Outcome of classifying one polygon against a plane
enum Split {
    CoplanarFront(Polygon),
    CoplanarBack(Polygon),
    Front(Polygon),
    Back(Polygon),
    Spanning {
        front: Option<Polygon>,
        back: Option<Polygon>,
    },
}

impl Plane {
    /// Plane through three points, wound counter-clockwise when seen from
    /// the front. Returns `None` for collinear or non-finite input.
    pub fn from_points(a: &Point3<f64>, b: &Point3<f64>, c: &Point3<f64>) -> Option<Self> {
        let cross = (b - a).cross(&(c - a));
        let length = cross.norm();
        if !(length > 1e-12) || !length.is_finite() {
            return None;
        }
        let normal = cross / length;
        Some(Self {
            normal,
            w: normal.dot(&a.coords),
        })
    }

    pub fn signed_distance(&self, point: &Point3<f64>) -> f64 {
        self.normal.dot(&point.coords) - self.w
    }

    pub fn flip(&mut self) {
        self.normal = -self.normal;
        self.w = -self.w;
    }

    fn classify(&self, point: &Point3<f64>) -> u8 {
        let distance = self.signed_distance(point);
        if distance < -EPSILON {
            BACK
        } else if distance > EPSILON {
            FRONT
        } else {
            COPLANAR
        }
    }

    fn split_polygon(&self, polygon: Polygon) -> Split {
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|v| self.classify(&v.position))
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, t| acc | t);

        match polygon_type {
            COPLANAR => {
                if self.normal.dot(&polygon.plane.normal) > 0.0 {
                    Split::CoplanarFront(polygon)
                } else {
                    Split::CoplanarBack(polygon)
                }
            }
            FRONT => Split::Front(polygon),
            BACK => Split::Back(polygon),
            _ => {
                let count = polygon.vertices.len();
                let mut front = Vec::with_capacity(count + 1);
                let mut back = Vec::with_capacity(count + 1);

                for i in 0..count {
                    let j = (i + 1) % count;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (&polygon.vertices[i], &polygon.vertices[j]);

                    if ti != BACK {
                        front.push(*vi);
                    }
                    if ti != FRONT {
                        back.push(*vi);
                    }
                    if (ti | tj) == SPANNING {
                        let t = (self.w - self.normal.dot(&vi.position.coords))
                            / self.normal.dot(&(vj.position - vi.position));
                        let v = vi.interpolate(vj, t);
                        front.push(v);
                        back.push(v);
                    }
                }

                // Fragments lie in the parent's plane; re-deriving it from
                // three possibly collinear vertices would lose precision.
                let plane = polygon.plane;
                Split::Spanning {
                    front: (front.len() >= 3).then(|| Polygon::with_plane(front, plane)),
                    back: (back.len() >= 3).then(|| Polygon::with_plane(back, plane)),
                }
            }
        }
    }
}

/// Convex planar polygon with at least three vertices
#[derive(Debug, Clone, PartialEq)]
pub struct Polygon {
    vertices: Vec<Vertex>,
    plane: Plane,
}

impl Polygon {
    /// Polygon whose plane comes from its first three vertices
    ///
    /// Returns `None` when there are fewer than three vertices or the first
    /// three are collinear.
    pub fn new(vertices: Vec<Vertex>) -> Option<Self> {
        if vertices.len() < 3 {
            return None;
        }
        let plane = Plane::from_points(
            &vertices[0].position,
            &vertices[1].position,
            &vertices[2].position,
        )?;
        Some(Self { vertices, plane })
    }

    /// Polygon from bare positions, flat-shaded with the plane normal
    pub fn from_points(points: &[Point3<f64>]) -> Option<Self> {
        if points.len() < 3 {
            return None;
        }
        let plane = Plane::from_points(&points[0], &points[1], &points[2])?;
        let vertices = points
            .iter()
            .map(|p| Vertex::new(*p, plane.normal))
            .collect();
        Some(Self { vertices, plane })
    }

    fn with_plane(vertices: Vec<Vertex>, plane: Plane) -> Self {
        Self { vertices, plane }
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn plane(&self) -> &Plane {
        &self.plane
    }

    pub fn normal(&self) -> Vector3<f64> {
        self.plane.normal
    }

    /// Reverse winding and orientation
    pub fn flip(&mut self) {
        self.vertices.reverse();
        for vertex in &mut self.vertices {
            vertex.flip();
        }
        self.plane.flip();
    }

    pub fn area(&self) -> f64 {
        let origin = self.vertices[0].position;
        let mut sum = Vector3::zeros();
        for pair in self.vertices[1..].windows(2) {
            sum += (pair[0].position - origin).cross(&(pair[1].position - origin));
        }
        sum.norm() / 2.0
    }

    /// Contribution of this face to the enclosed volume (divergence theorem)
    fn signed_volume(&self) -> f64 {
        let origin = self.vertices[0].position.coords;
        self.vertices[1..]
            .windows(2)
            .map(|pair| origin.dot(&pair[0].position.coords.cross(&pair[1].position.coords)))
            .sum::<f64>()
            / 6.0
    }
}

/// BSP tree node
///
/// Holds the polygons lying in its splitting plane and owns its front and
/// back subtrees. A missing back child is solid interior, a missing front
/// child is open space.
#[derive(Debug, Clone, Default)]
pub struct Node {
    plane: Option<Plane>,
    polygons: Vec<Polygon>,
    front: Option<Box<Node>>,
    back: Option<Box<Node>>,
}

impl Node {
    pub fn new(polygons: Vec<Polygon>) -> Self {
        let mut node = Self::default();
        node.build(polygons);
        node
    }

    /// Insert polygons, splitting them at each plane on the way down
    pub fn build(&mut self, polygons: Vec<Polygon>) {
        let Some(first) = polygons.first() else {
            return;
        };
        let plane = *self.plane.get_or_insert(first.plane);

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            match plane.split_polygon(polygon) {
                Split::CoplanarFront(p) | Split::CoplanarBack(p) => self.polygons.push(p),
                Split::Front(p) => front.push(p),
                Split::Back(p) => back.push(p),
                Split::Spanning { front: f, back: b } => {
                    front.extend(f);
                    back.extend(b);
                }
            }
        }

        if !front.is_empty() {
            self.front.get_or_insert_with(Default::default).build(front);
        }
        if !back.is_empty() {
            self.back.get_or_insert_with(Default::default).build(back);
        }
    }

    /// Turn the solid inside out
    pub fn invert(&mut self) {
        for polygon in &mut self.polygons {
            polygon.flip();
        }
        if let Some(plane) = self.plane.as_mut() {
            plane.flip();
        }
        if let Some(front) = self.front.as_mut() {
            front.invert();
        }
        if let Some(back) = self.back.as_mut() {
            back.invert();
        }
        std::mem::swap(&mut self.front, &mut self.back);
    }

    /// Remove the parts of `polygons` that lie inside this tree's solid
    pub fn clip_polygons(&self, polygons: Vec<Polygon>) -> Vec<Polygon> {
        let Some(plane) = self.plane else {
            return polygons;
        };

        let mut front = Vec::new();
        let mut back = Vec::new();
        for polygon in polygons {
            match plane.split_polygon(polygon) {
                Split::CoplanarFront(p) | Split::Front(p) => front.push(p),
                Split::CoplanarBack(p) | Split::Back(p) => back.push(p),
                Split::Spanning { front: f, back: b } => {
                    front.extend(f);
                    back.extend(b);
                }
            }
        }

        let mut kept = match &self.front {
            Some(node) => node.clip_polygons(front),
            None => front,
        };
        if let Some(node) = &self.back {
            kept.extend(node.clip_polygons(back));
        }
        kept
    }

    /// Clip every polygon in this tree against `other`
    pub fn clip_to(&mut self, other: &Node) {
        self.polygons = other.clip_polygons(std::mem::take(&mut self.polygons));
        if let Some(front) = self.front.as_mut() {
            front.clip_to(other);
        }
        if let Some(back) = self.back.as_mut() {
            back.clip_to(other);
        }
    }

    /// Pre-order flattening of the tree's polygons
    pub fn all_polygons(&self) -> Vec<Polygon> {
        let mut result = Vec::with_capacity(self.polygon_count());
        self.collect_polygons(&mut result);
        result
    }

    fn collect_polygons(&self, out: &mut Vec<Polygon>) {
        out.extend(self.polygons.iter().cloned());
        if let Some(front) = &self.front {
            front.collect_polygons(out);
        }
        if let Some(back) = &self.back {
            back.collect_polygons(out);
        }
    }

    pub fn polygon_count(&self) -> usize {
        self.polygons.len()
            + self.front.as_ref().map_or(0, |n| n.polygon_count())
            + self.back.as_ref().map_or(0, |n| n.polygon_count())
    }

    pub fn depth(&self) -> usize {
        if self.plane.is_none() {
            return 0;
        }
        1 + self
            .front
            .as_ref()
            .map_or(0, |n| n.depth())
            .max(self.back.as_ref().map_or(0, |n| n.depth()))
    }

    /// Point classification for a tree built directly from a closed boundary.
    /// Points on a splitting plane are treated as in front of it.
    fn contains_point(&self, point: &Point3<f64>) -> bool {
        let Some(plane) = self.plane else {
            return false;
        };
        if plane.signed_distance(point) >= 0.0 {
            self.front.as_ref().is_some_and(|n| n.contains_point(point))
        } else {
            self.back.as_ref().map_or(true, |n| n.contains_point(point))
        }
    }
}

/// Closed polyhedral solid stored as a BSP tree
#[derive(Debug, Clone, Default)]
pub struct Solid {
    tree: Node,
}

impl Solid {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn from_polygons(polygons: Vec<Polygon>) -> Self {
        Self {
            tree: Node::new(polygons),
        }
    }

    pub fn tree(&self) -> &Node {
        &self.tree
    }

    pub fn is_empty(&self) -> bool {
        self.tree.polygon_count() == 0
    }

    pub fn polygon_count(&self) -> usize {
        self.tree.polygon_count()
    }

    /// Boundary polygons in tree pre-order
    pub fn polygons(&self) -> Vec<Polygon> {
        self.tree.all_polygons()
    }

    /// `self \ other`
    ///
    /// Computed as the complement of `!self ∪ other`. `other`'s surviving
    /// polygons keep its outward orientation through the union, so after the
    /// final inversion they face into the removed cavity.
    pub fn subtract(self, other: &Solid) -> Solid {
        if self.is_empty() || other.is_empty() {
            return self;
        }

        let mut a = self.tree;
        let mut b = other.tree.clone();

        a.invert();
        a.clip_to(&b);
        b.clip_to(&a);
        b.invert();
        b.clip_to(&a);
        b.invert();
        a.build(b.all_polygons());
        a.invert();

        Solid { tree: a }
    }

    /// Fan-triangulated render surface
    pub fn to_mesh(&self) -> Mesh {
        Mesh::from_polygons(&self.polygons())
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let polygons = self.polygons();
        BoundingBox::from_points(
            polygons
                .iter()
                .flat_map(|p| p.vertices.iter().map(|v| &v.position)),
        )
    }

    /// Enclosed volume; exact for closed boundaries with outward normals
    pub fn volume(&self) -> f64 {
        self.polygons().iter().map(Polygon::signed_volume).sum()
    }

    /// Whether `point` lies strictly inside the solid
    ///
    /// Builds a fresh tree from the current boundary so the answer does not
    /// depend on how earlier operations shaped this solid's tree.
    pub fn contains_point(&self, point: &Point3<f64>) -> bool {
        Node::new(self.polygons()).contains_point(point)
    }
}
