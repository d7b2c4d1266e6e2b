//! # Scene Management Module
//!
//! Node hierarchy, meshes, lights and the per-object GPU state needed to
//! draw them.
//!
//! ## Key Components
//!
//! - [`Scene`] - camera, lights, graph, meshes and materials
//! - [`SceneGraph`] - generational arena of [`Node`]s with parent links
//! - [`NodeRef`] - nullable handle to a node, filled in when it is mounted
//! - [`Transform`] - position, Euler rotation and scale of a node
//!
//! ```
//! use metalcube::gfx::scene::{Node, NodeRef, SceneGraph};
//!
//! let mut graph = SceneGraph::new();
//! let handle = NodeRef::new();
//! assert!(graph.resolve(&handle).is_none());
//!
//! handle.attach(graph.insert(Node::group("float")));
//! assert_eq!(graph.resolve(&handle).map(|n| n.name.as_str()), Some("float"));
//! ```

pub mod graph;
pub mod lights;
pub mod mesh;
pub mod scene;
pub mod transform;
pub mod vertex;

// Re-export main types
pub use graph::{Node, NodeId, NodeKind, NodeRef, SceneGraph};
pub use lights::{AmbientLight, DirectionalLight, Lighting};
pub use mesh::{DrawMesh, Mesh, ObjectGpuResources};
pub use scene::{DrawItem, Scene, SceneLayouts, VisibleMesh};
pub use transform::{Orientation, Transform};
pub use vertex::Vertex3D;
