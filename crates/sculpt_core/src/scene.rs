//! CSG scene graph.
//!
//! A scene is an ordered list of nodes, each wrapping one primitive and an
//! action that says how it joins the combined distance field. The scene is
//! the only long-lived mutable state of the modeler; every successful edit
//! bumps its revision so renderers know their accumulated image is stale.

use std::fmt;

use sculpt_math::{Aabb, Vec3};

use crate::error::{ConfigError, ConfigResult};
use crate::primitive::Primitive;

/// Stable handle to a node. Handles are never reused within a scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub fn raw(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// How a node joins the combined field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Action {
    /// Disabled: the node is skipped and never evaluated.
    None,
    /// Union with the field accumulated so far.
    #[default]
    Add,
}

impl Action {
    /// Shader-side code (`Modeler_None` / `Modeler_Add`).
    pub fn code(&self) -> i32 {
        match self {
            Action::None => 0,
            Action::Add => 1,
        }
    }
}

/// Surface response of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    /// Diffuse reflectance (RGB, 0-1)
    pub albedo: Vec3,

    /// Emitted radiance (RGB, >= 0)
    pub emission: Vec3,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            albedo: Vec3::new(0.5, 0.5, 0.5), // Grey default
            emission: Vec3::ZERO,
        }
    }
}

impl Material {
    /// Create a non-emissive diffuse material.
    pub fn diffuse(albedo: Vec3) -> Self {
        Self {
            albedo,
            ..Default::default()
        }
    }

    /// Check if this material emits light.
    pub fn is_emissive(&self) -> bool {
        self.emission.length_squared() > 0.0
    }

    fn validate(&self) -> ConfigResult<()> {
        if !self.albedo.is_finite() {
            return Err(ConfigError::NonFinite("material albedo"));
        }
        if !self.emission.is_finite() {
            return Err(ConfigError::NonFinite("material emission"));
        }
        Ok(())
    }

    /// Albedo clamped to [0, 1] and emission clamped to >= 0.
    fn sanitized(self) -> Self {
        Self {
            albedo: self.albedo.clamp(Vec3::ZERO, Vec3::ONE),
            emission: self.emission.max(Vec3::ZERO),
        }
    }
}

/// One primitive in the scene together with its action and material.
#[derive(Debug, Clone, PartialEq)]
pub struct CsgNode {
    pub name: String,
    pub action: Action,
    pub primitive: Primitive,
    pub material: Material,
}

impl CsgNode {
    /// Create an `Add` node with the default material.
    pub fn new(name: impl Into<String>, primitive: Primitive) -> Self {
        Self {
            name: name.into(),
            action: Action::Add,
            primitive,
            material: Material::default(),
        }
    }

    /// Set the action.
    pub fn with_action(mut self, action: Action) -> Self {
        self.action = action;
        self
    }

    /// Set the material.
    pub fn with_material(mut self, material: Material) -> Self {
        self.material = material;
        self
    }

    /// True when the node takes part in the fold.
    #[inline]
    pub fn is_active(&self) -> bool {
        self.action != Action::None
    }

    fn validate(&self) -> ConfigResult<()> {
        self.primitive.validate()?;
        self.material.validate()
    }
}

/// An ordered sequence of CSG nodes.
#[derive(Clone, Debug, Default)]
pub struct Scene {
    nodes: Vec<(NodeId, CsgNode)>,
    next_id: u32,
    revision: u64,
}

impl Scene {
    /// Create an empty scene.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starter scene: the default base box with a sphere resting on it.
    pub fn demo() -> ConfigResult<Self> {
        let mut scene = Self::new();
        scene.add(CsgNode::new(
            "Base Box",
            Primitive::rounded_box(Vec3::new(0.0, -0.9, 0.0), Vec3::ZERO, Vec3::splat(0.5), 0.05)?,
        ))?;
        scene.add(
            CsgNode::new("Sphere", Primitive::sphere(Vec3::new(0.0, -0.1, 0.0), 0.3)?)
                .with_material(Material::diffuse(Vec3::new(0.8, 0.3, 0.2))),
        )?;
        Ok(scene)
    }

    /// Validate and append a node, returning its handle.
    pub fn add(&mut self, node: CsgNode) -> ConfigResult<NodeId> {
        node.validate()?;
        let id = NodeId(self.next_id);
        self.next_id += 1;
        log::debug!("Adding node {} '{}' ({:?})", id, node.name, node.action);
        self.nodes.push((id, Self::sanitize(node)));
        self.touch();
        Ok(id)
    }

    /// Remove a node, returning it.
    pub fn remove(&mut self, id: NodeId) -> ConfigResult<CsgNode> {
        let index = self.index_of(id)?;
        let (_, node) = self.nodes.remove(index);
        self.touch();
        Ok(node)
    }

    /// Replace a node in place. A rejected edit leaves the scene unchanged.
    pub fn update(&mut self, id: NodeId, node: CsgNode) -> ConfigResult<()> {
        let index = self.index_of(id)?;
        node.validate()?;
        self.nodes[index].1 = Self::sanitize(node);
        self.touch();
        Ok(())
    }

    /// Change only the action of a node (e.g. to disable it).
    pub fn set_action(&mut self, id: NodeId, action: Action) -> ConfigResult<()> {
        let index = self.index_of(id)?;
        if self.nodes[index].1.action != action {
            self.nodes[index].1.action = action;
            self.touch();
        }
        Ok(())
    }

    /// Get a node by handle.
    pub fn get(&self, id: NodeId) -> Option<&CsgNode> {
        self.nodes.iter().find(|(nid, _)| *nid == id).map(|(_, node)| node)
    }

    /// Iterate nodes in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &CsgNode)> {
        self.nodes.iter().map(|(id, node)| (*id, node))
    }

    /// Get node count (active or not).
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Check if the scene has no nodes.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of nodes that take part in the fold.
    pub fn active_count(&self) -> usize {
        self.nodes.iter().filter(|(_, node)| node.is_active()).count()
    }

    /// Monotonic counter bumped by every successful edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Evaluate the combined signed distance field at `p`.
    ///
    /// Folds active nodes in declaration order starting from `+inf`, so an
    /// empty scene is infinitely far away everywhere.
    #[inline]
    pub fn evaluate(&self, p: Vec3) -> f32 {
        let mut field = f32::INFINITY;
        for (_, node) in &self.nodes {
            match node.action {
                Action::None => continue,
                Action::Add => field = field.min(node.primitive.distance(p)),
            }
        }
        field
    }

    /// Nearest active node to `p` and its distance.
    pub fn closest(&self, p: Vec3) -> Option<(NodeId, f32)> {
        let mut best: Option<(NodeId, f32)> = None;
        for (id, node) in &self.nodes {
            if !node.is_active() {
                continue;
            }
            let d = node.primitive.distance(p);
            if best.map_or(true, |(_, best_d)| d < best_d) {
                best = Some((*id, d));
            }
        }
        best
    }

    /// Material of the nearest active node, or the default material.
    pub fn material_at(&self, p: Vec3) -> Material {
        self.closest(p)
            .and_then(|(id, _)| self.get(id))
            .map(|node| node.material)
            .unwrap_or_default()
    }

    /// Union of the bounds of all active nodes; empty if none.
    pub fn bounds(&self) -> Aabb {
        self.nodes
            .iter()
            .filter(|(_, node)| node.is_active())
            .fold(Aabb::EMPTY, |acc, (_, node)| {
                Aabb::surrounding(&acc, &node.primitive.bounds())
            })
    }

    fn index_of(&self, id: NodeId) -> ConfigResult<usize> {
        self.nodes
            .iter()
            .position(|(nid, _)| *nid == id)
            .ok_or(ConfigError::UnknownNode(id))
    }

    fn sanitize(mut node: CsgNode) -> CsgNode {
        node.material = node.material.sanitized();
        node
    }

    fn touch(&mut self) {
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn sample_points(seed: u64, count: usize) -> Vec<Vec3> {
        let mut rng = StdRng::seed_from_u64(seed);
        (0..count)
            .map(|_| {
                Vec3::new(
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(-4.0..4.0),
                    rng.gen_range(-4.0..4.0),
                )
            })
            .collect()
    }

    fn three_nodes() -> Vec<CsgNode> {
        vec![
            CsgNode::new("a", Primitive::sphere(Vec3::new(1.0, 0.0, 0.0), 0.75).unwrap()),
            CsgNode::new(
                "b",
                Primitive::rounded_box(Vec3::new(-1.0, 0.5, 0.0), Vec3::new(0.2, 0.4, 0.0), Vec3::new(0.6, 0.3, 0.9), 0.1)
                    .unwrap(),
            ),
            CsgNode::new("c", Primitive::sphere(Vec3::new(0.0, -1.0, 1.0), 0.5).unwrap()),
        ]
    }

    fn scene_of(nodes: impl IntoIterator<Item = CsgNode>) -> Scene {
        let mut scene = Scene::new();
        for node in nodes {
            scene.add(node).unwrap();
        }
        scene
    }

    #[test]
    fn test_empty_scene_is_infinitely_far() {
        let scene = Scene::new();
        for p in sample_points(1, 20) {
            assert_eq!(scene.evaluate(p), f32::INFINITY);
        }
        assert!(scene.bounds().is_empty());
        assert!(scene.closest(Vec3::ZERO).is_none());
    }

    #[test]
    fn test_union_is_commutative() {
        let forward = scene_of(three_nodes());
        let reversed = scene_of(three_nodes().into_iter().rev());

        for p in sample_points(2, 500) {
            let a = forward.evaluate(p);
            let b = reversed.evaluate(p);
            assert!((a - b).abs() <= 1e-6, "p={p:?} {a} != {b}");
        }
    }

    #[test]
    fn test_union_is_min_of_members() {
        let nodes = three_nodes();
        let scene = scene_of(nodes.clone());
        for p in sample_points(3, 100) {
            let expected = nodes
                .iter()
                .map(|n| n.primitive.distance(p))
                .fold(f32::INFINITY, f32::min);
            assert_eq!(scene.evaluate(p), expected);
        }
    }

    #[test]
    fn test_disabled_node_matches_scene_without_it() {
        let mut with_disabled = scene_of(three_nodes());
        let middle = with_disabled.iter().nth(1).map(|(id, _)| id).unwrap();
        with_disabled.set_action(middle, Action::None).unwrap();

        let mut nodes = three_nodes();
        nodes.remove(1);
        let without = scene_of(nodes);

        assert_eq!(with_disabled.active_count(), 2);
        for p in sample_points(4, 500) {
            assert_eq!(with_disabled.evaluate(p), without.evaluate(p));
        }
        assert_eq!(with_disabled.bounds(), without.bounds());
    }

    #[test]
    fn test_invalid_edit_rejected() {
        let mut scene = scene_of(three_nodes());
        let revision = scene.revision();
        let id = scene.iter().next().map(|(id, _)| id).unwrap();
        let before = scene.get(id).cloned();

        let bad = CsgNode::new("bad", Primitive::Sphere(crate::Sphere::new(Vec3::ZERO, -2.0)));
        assert_eq!(scene.update(id, bad.clone()), Err(ConfigError::InvalidRadius(-2.0)));
        assert!(scene.add(bad).is_err());

        assert_eq!(scene.revision(), revision);
        assert_eq!(scene.get(id).cloned(), before);
        assert_eq!(scene.len(), 3);
    }

    #[test]
    fn test_handles_are_stable() {
        let mut scene = scene_of(three_nodes());
        let ids: Vec<NodeId> = scene.iter().map(|(id, _)| id).collect();

        let removed = scene.remove(ids[0]).unwrap();
        assert_eq!(removed.name, "a");
        assert_eq!(scene.get(ids[1]).map(|n| n.name.as_str()), Some("b"));
        assert_eq!(scene.remove(ids[0]), Err(ConfigError::UnknownNode(ids[0])));

        // New handles never reuse removed ones
        let new_id = scene
            .add(CsgNode::new("d", Primitive::sphere(Vec3::ZERO, 1.0).unwrap()))
            .unwrap();
        assert!(!ids.contains(&new_id));
    }

    #[test]
    fn test_revision_tracks_edits() {
        let mut scene = Scene::new();
        assert_eq!(scene.revision(), 0);

        let id = scene
            .add(CsgNode::new("s", Primitive::sphere(Vec3::ZERO, 1.0).unwrap()))
            .unwrap();
        assert_eq!(scene.revision(), 1);

        scene.set_action(id, Action::Add).unwrap();
        assert_eq!(scene.revision(), 1, "no-op action change keeps revision");

        scene.set_action(id, Action::None).unwrap();
        assert_eq!(scene.revision(), 2);
    }

    #[test]
    fn test_closest_and_material() {
        let red = Material::diffuse(Vec3::new(1.0, 0.0, 0.0));
        let mut scene = Scene::new();
        scene
            .add(CsgNode::new("left", Primitive::sphere(Vec3::new(-2.0, 0.0, 0.0), 1.0).unwrap()))
            .unwrap();
        let right = scene
            .add(
                CsgNode::new("right", Primitive::sphere(Vec3::new(2.0, 0.0, 0.0), 1.0).unwrap())
                    .with_material(red),
            )
            .unwrap();

        let (id, d) = scene.closest(Vec3::new(3.0, 0.0, 0.0)).unwrap();
        assert_eq!(id, right);
        assert_eq!(d, 0.0);
        assert_eq!(scene.material_at(Vec3::new(3.0, 0.0, 0.0)), red);
    }

    #[test]
    fn test_material_is_sanitized() {
        let mut scene = Scene::new();
        let id = scene
            .add(
                CsgNode::new("s", Primitive::sphere(Vec3::ZERO, 1.0).unwrap()).with_material(Material {
                    albedo: Vec3::new(2.0, -1.0, 0.5),
                    emission: Vec3::new(-1.0, 3.0, 0.0),
                }),
            )
            .unwrap();
        let material = scene.get(id).unwrap().material;
        assert_eq!(material.albedo, Vec3::new(1.0, 0.0, 0.5));
        assert_eq!(material.emission, Vec3::new(0.0, 3.0, 0.0));
        assert!(material.is_emissive());
    }

    #[test]
    fn test_demo_scene() {
        let scene = Scene::demo().unwrap();
        assert_eq!(scene.len(), 2);
        // Top face of the base box
        assert!(scene.evaluate(Vec3::new(0.3, -0.4, 0.3)).abs() < 1e-4);
    }
}
