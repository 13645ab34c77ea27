use serde::{Deserialize, Serialize};

use crate::{Error, Result, graph::Graph};

/// Fixed-width score vector a similarity index stores next to the query.
///
/// Scores pass through unchanged. A zero score is a valid component, nothing is divided by it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GraphStateVector {
	pub query: String,
	pub scores: Vec<f64>,
}

/// Scores of the first `top_k` scored edges, in edge creation order.
pub fn state_vector(graph: &Graph, query: &str, top_k: usize) -> Result<GraphStateVector> {
	let scores: Vec<f64> =
		graph.edges().iter().filter_map(|edge| edge.data.score).take(top_k).collect();

	if scores.len() < top_k {
		return Err(Error::InsufficientScores { wanted: top_k, found: scores.len() });
	}

	Ok(GraphStateVector { query: query.to_string(), scores })
}
