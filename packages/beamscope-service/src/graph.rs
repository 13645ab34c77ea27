use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use beamscope_domain::{END_OF_SEQUENCE_ID, PathKey, TokenPath};

pub type EdgeId = usize;

#[derive(Clone, Debug, PartialEq)]
pub struct Vertex {
	pub key: PathKey,
	pub in_edges: Vec<EdgeId>,
	pub out_edges: Vec<EdgeId>,
}
impl Vertex {
	fn new(key: PathKey) -> Self {
		Self { key, in_edges: Vec::new(), out_edges: Vec::new() }
	}
}

/// Annotations of one decoding step.
///
/// The three score fields carry the same value. They stay absent until an aligned score batch
/// reaches the edge.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeData {
	pub label: String,
	pub label_id: u32,
	pub completed: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub score: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub log_probability: Option<f64>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub total_log_probability: Option<f64>,
}
impl EdgeData {
	pub fn new(label: String, label_id: u32) -> Self {
		Self {
			label,
			label_id,
			completed: label_id == END_OF_SEQUENCE_ID,
			score: None,
			log_probability: None,
			total_log_probability: None,
		}
	}

	pub fn set_score(&mut self, score: f64) {
		self.score = Some(score);
		self.log_probability = Some(score);
		self.total_log_probability = Some(score);
	}

	pub fn is_scored(&self) -> bool {
		self.score.is_some()
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct Edge {
	pub id: EdgeId,
	pub from: PathKey,
	pub to: PathKey,
	pub data: EdgeData,
}

/// Search tree of one reconstruction, keyed by path identity.
///
/// Vertices and edges are kept in creation order, which is also the serialization order.
#[derive(Clone, Debug)]
pub struct Graph {
	vertices: Vec<Vertex>,
	index: AHashMap<PathKey, usize>,
	edges: Vec<Edge>,
	root: PathKey,
}
impl Graph {
	pub fn new() -> Self {
		let root = TokenPath::root().key();
		let mut graph =
			Self { vertices: Vec::new(), index: AHashMap::new(), edges: Vec::new(), root };

		graph.vertex_or_insert(graph.root.clone());

		graph
	}

	pub fn root(&self) -> &PathKey {
		&self.root
	}

	pub fn vertex(&self, key: &PathKey) -> Option<&Vertex> {
		self.index.get(key).map(|idx| &self.vertices[*idx])
	}

	pub fn contains(&self, key: &PathKey) -> bool {
		self.index.contains_key(key)
	}

	pub fn vertices(&self) -> &[Vertex] {
		&self.vertices
	}

	pub fn edge(&self, id: EdgeId) -> Option<&Edge> {
		self.edges.get(id)
	}

	pub fn edges(&self) -> &[Edge] {
		&self.edges
	}

	/// The unique edge leading into `key`, absent for the root and unknown keys.
	pub fn incoming_edge(&self, key: &PathKey) -> Option<EdgeId> {
		self.vertex(key).and_then(|vertex| vertex.in_edges.first().copied())
	}

	/// Index of the vertex for `key`, created on first reference.
	pub(crate) fn vertex_or_insert(&mut self, key: PathKey) -> usize {
		if let Some(idx) = self.index.get(&key) {
			return *idx;
		}

		let idx = self.vertices.len();

		self.index.insert(key.clone(), idx);
		self.vertices.push(Vertex::new(key));

		idx
	}

	/// Links `parent -> child` unless `child` already has its incoming edge.
	pub(crate) fn link(&mut self, parent: usize, child: usize, data: EdgeData) -> EdgeId {
		if let Some(existing) = self.vertices[child].in_edges.first() {
			return *existing;
		}

		let id = self.edges.len();

		self.edges.push(Edge {
			id,
			from: self.vertices[parent].key.clone(),
			to: self.vertices[child].key.clone(),
			data,
		});
		self.vertices[parent].out_edges.push(id);
		self.vertices[child].in_edges.push(id);

		id
	}

	pub(crate) fn set_score(&mut self, id: EdgeId, score: f64) {
		if let Some(edge) = self.edges.get_mut(id) {
			edge.data.set_score(score);
		}
	}

	pub fn to_search_graph(&self) -> SearchGraph {
		SearchGraph {
			vertex: self
				.vertices
				.iter()
				.map(|vertex| VertexRecord { id: vertex.key.as_str().to_string() })
				.collect(),
			edge: self
				.edges
				.iter()
				.map(|edge| EdgeRecord {
					from: edge.from.as_str().to_string(),
					to: edge.to.as_str().to_string(),
					data: edge.data.clone(),
				})
				.collect(),
		}
	}
}

impl Default for Graph {
	fn default() -> Self {
		Self::new()
	}
}

/// Plain, acyclic form of a [`Graph`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SearchGraph {
	pub vertex: Vec<VertexRecord>,
	pub edge: Vec<EdgeRecord>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VertexRecord {
	pub id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
	pub from: String,
	pub to: String,
	pub data: EdgeData,
}
