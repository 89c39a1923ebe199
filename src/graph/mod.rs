pub mod knowledge_graph;
pub mod vertex;

pub use knowledge_graph::{KnowledgeGraph, Neighbors};
pub use vertex::{Vertex, VertexRole};
