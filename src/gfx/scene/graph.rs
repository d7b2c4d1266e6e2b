//! Scene graph storage and render handles
//!
//! Nodes live in a generational arena. A [`NodeId`] stays valid only while
//! the node it was issued for is alive; once removed, the slot's generation
//! is bumped and old ids stop resolving.
//!
//! [`NodeRef`] is the nullable handle animation callbacks hold. It is empty
//! until the owning component mounts its node and attaches the id, so any
//! access has to go through [`SceneGraph::resolve_mut`] and handle `None`.

use std::{cell::Cell, rc::Rc};

use cgmath::Matrix4;

use super::transform::Transform;

/// Generational index of a node in a [`SceneGraph`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

/// What a node draws, if anything
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    Group,
    Mesh {
        /// Index into the scene's mesh list
        mesh: usize,
        material: String,
    },
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub transform: Transform,
    pub kind: NodeKind,
    pub visible: bool,
    parent: Option<NodeId>,
}

impl Node {
    pub fn group(name: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            kind: NodeKind::Group,
            visible: true,
            parent: None,
        }
    }

    pub fn mesh(name: &str, mesh: usize, material: &str) -> Self {
        Self {
            name: name.to_string(),
            transform: Transform::default(),
            kind: NodeKind::Mesh {
                mesh,
                material: material.to_string(),
            },
            visible: true,
            parent: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn with_parent(mut self, parent: NodeId) -> Self {
        self.parent = Some(parent);
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }
}

struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Arena of scene nodes with parent links
#[derive(Default)]
pub struct SceneGraph {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl SceneGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a node and returns its id
    ///
    /// A parent id that no longer resolves is dropped and the node becomes a root.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        if let Some(parent) = node.parent {
            if self.get(parent).is_none() {
                log::warn!(
                    "Parent of '{}' is no longer in the graph, inserting as root",
                    node.name
                );
                node.parent = None;
            }
        }

        match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeId {
                    index,
                    generation: 0,
                }
            }
        }
    }

    /// Removes a node and all of its descendants
    ///
    /// Returns the number of nodes removed.
    pub fn remove(&mut self, id: NodeId) -> usize {
        if self.get(id).is_none() {
            return 0;
        }

        let mut doomed = vec![id];
        let mut cursor = 0;
        while cursor < doomed.len() {
            let current = doomed[cursor];
            doomed.extend(self.children(current));
            cursor += 1;
        }

        for id in &doomed {
            let slot = &mut self.slots[id.index as usize];
            slot.node = None;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(id.index);
        }

        doomed.len()
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.slots
            .get(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_ref())
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.slots
            .get_mut(id.index as usize)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.node.as_mut())
    }

    /// Follows a render handle, `None` while detached or if the node is gone
    pub fn resolve(&self, node_ref: &NodeRef) -> Option<&Node> {
        node_ref.get().and_then(|id| self.get(id))
    }

    /// Mutable variant of [`SceneGraph::resolve`]
    pub fn resolve_mut(&mut self, node_ref: &NodeRef) -> Option<&mut Node> {
        node_ref.get().and_then(move |id| self.get_mut(id))
    }

    /// Direct children of `id`
    pub fn children(&self, id: NodeId) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, node)| node.parent == Some(id))
            .map(|(child, _)| child)
            .collect()
    }

    /// Product of the local matrices from the root down to `id`
    pub fn world_matrix(&self, id: NodeId) -> Option<Matrix4<f32>> {
        let mut node = self.get(id)?;
        let mut matrix = node.transform.matrix();

        while let Some(parent) = node.parent.and_then(|p| self.get(p)) {
            matrix = parent.transform.matrix() * matrix;
            node = parent;
        }

        Some(matrix)
    }

    /// Whether the node and all of its ancestors are visible
    pub fn is_visible(&self, id: NodeId) -> bool {
        let mut current = self.get(id);
        while let Some(node) = current {
            if !node.visible {
                return false;
            }
            current = node.parent.and_then(|p| self.get(p));
        }
        true
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.node.as_ref().map(|node| {
                (
                    NodeId {
                        index: index as u32,
                        generation: slot.generation,
                    },
                    node,
                )
            })
        })
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&mut self) {
        let ids: Vec<NodeId> = self.iter().map(|(id, _)| id).collect();
        for id in ids {
            self.remove(id);
        }
    }
}

/// Shared, nullable handle to a mounted node
///
/// Clones observe the same attachment, so a callback registered before mount
/// sees the node as soon as the owner attaches it.
#[derive(Debug, Clone, Default)]
pub struct NodeRef(Rc<Cell<Option<NodeId>>>);

impl NodeRef {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, id: NodeId) {
        self.0.set(Some(id));
    }

    /// Clears the handle, returning the id it pointed to
    pub fn detach(&self) -> Option<NodeId> {
        self.0.take()
    }

    pub fn get(&self) -> Option<NodeId> {
        self.0.get()
    }

    pub fn is_attached(&self) -> bool {
        self.0.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::transform::Orientation;
    use approx::assert_relative_eq;
    use cgmath::{Vector3, Vector4};

    #[test]
    fn test_insert_and_get() {
        let mut graph = SceneGraph::new();
        let id = graph.insert(Node::group("float"));
        assert_eq!(graph.get(id).map(|n| n.name.as_str()), Some("float"));
        assert_eq!(graph.len(), 1);
    }

    #[test]
    fn test_stale_id_does_not_resolve_after_slot_reuse() {
        let mut graph = SceneGraph::new();
        let old = graph.insert(Node::group("a"));
        assert_eq!(graph.remove(old), 1);

        let new = graph.insert(Node::group("b"));
        assert!(graph.get(old).is_none());
        assert_eq!(graph.get(new).map(|n| n.name.as_str()), Some("b"));
    }

    #[test]
    fn test_remove_takes_subtree() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Node::group("root"));
        let child = graph.insert(Node::group("child").with_parent(root));
        let grandchild = graph.insert(Node::mesh("cube", 0, "default").with_parent(child));
        let other = graph.insert(Node::group("other"));

        assert_eq!(graph.remove(root), 3);
        assert!(graph.get(child).is_none());
        assert!(graph.get(grandchild).is_none());
        assert!(graph.get(other).is_some());
        assert_eq!(graph.remove(root), 0);
    }

    #[test]
    fn test_detached_ref_resolves_to_none() {
        let mut graph = SceneGraph::new();
        let node_ref = NodeRef::new();
        assert!(graph.resolve_mut(&node_ref).is_none());

        let id = graph.insert(Node::group("g"));
        node_ref.attach(id);
        assert!(graph.resolve(&node_ref).is_some());

        assert_eq!(node_ref.detach(), Some(id));
        assert!(graph.resolve(&node_ref).is_none());
    }

    #[test]
    fn test_ref_to_removed_node_resolves_to_none() {
        let mut graph = SceneGraph::new();
        let node_ref = NodeRef::new();
        let id = graph.insert(Node::group("g"));
        node_ref.attach(id);
        graph.remove(id);

        assert!(node_ref.is_attached());
        assert!(graph.resolve_mut(&node_ref).is_none());
    }

    #[test]
    fn test_clones_share_attachment() {
        let a = NodeRef::new();
        let b = a.clone();
        let mut graph = SceneGraph::new();
        a.attach(graph.insert(Node::group("g")));
        assert!(b.is_attached());
        assert!(graph.resolve_mut(&b).is_some());
    }

    #[test]
    fn test_world_matrix_composes_parents() {
        let mut graph = SceneGraph::new();
        let mut group = Node::group("float");
        group.transform.position = Vector3::new(0.0, 1.0, 0.0);
        let group = graph.insert(group);

        let cube = graph.insert(
            Node::mesh("cube", 0, "default")
                .with_transform(Transform::from_scale(2.0))
                .with_parent(group),
        );

        let world = graph.world_matrix(cube).unwrap();
        let p = world * Vector4::new(0.5, 0.0, 0.0, 1.0);
        assert_relative_eq!(p.x, 1.0);
        assert_relative_eq!(p.y, 1.0);
    }

    #[test]
    fn test_invisible_parent_hides_child() {
        let mut graph = SceneGraph::new();
        let group = graph.insert(Node::group("g"));
        let child = graph.insert(Node::group("c").with_parent(group));
        assert!(graph.is_visible(child));

        graph.get_mut(group).unwrap().visible = false;
        assert!(!graph.is_visible(child));
    }

    #[test]
    fn test_insert_with_dead_parent_becomes_root() {
        let mut graph = SceneGraph::new();
        let parent = graph.insert(Node::group("p"));
        graph.remove(parent);

        let mut child = Node::group("c").with_parent(parent);
        child.transform.rotation = Orientation::new(0.1, 0.0, 0.0);
        let child = graph.insert(child);
        assert_eq!(graph.get(child).unwrap().parent(), None);
    }

    #[test]
    fn test_clear_empties_graph() {
        let mut graph = SceneGraph::new();
        let root = graph.insert(Node::group("root"));
        graph.insert(Node::group("child").with_parent(root));
        graph.insert(Node::group("other"));
        graph.clear();
        assert!(graph.is_empty());
    }
}
