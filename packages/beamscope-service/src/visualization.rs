use serde::Serialize;

use crate::{graph::SearchGraph, nbest::NBestData, processing::QueryProcessing};

/// Response of one query: processing summary, graph and n-best list, in that order.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct InsightResponse {
	pub result: Vec<Visualization>,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Visualization {
	Processing(ProcessingVisualization),
	Graph(GraphVisualization),
	NBest(NBestVisualization),
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProcessingVisualization {
	pub visualization_name: &'static str,
	pub title: &'static str,
	pub name: &'static str,
	pub query_processing: QueryProcessing,
}
impl ProcessingVisualization {
	pub fn new(query_processing: QueryProcessing) -> Self {
		Self {
			visualization_name: "processing",
			title: "Processing",
			name: "processing",
			query_processing,
		}
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct GraphVisualization {
	pub visualization_name: &'static str,
	pub title: &'static str,
	pub name: &'static str,
	pub search_graph: SearchGraph,
}
impl GraphVisualization {
	pub fn new(search_graph: SearchGraph) -> Self {
		Self { visualization_name: "graph", title: "Graph", name: "graph", search_graph }
	}
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct NBestVisualization {
	pub visualization_name: &'static str,
	pub title: &'static str,
	pub name: &'static str,
	pub nbest_data: NBestData,
}
impl NBestVisualization {
	pub fn new(nbest_data: NBestData) -> Self {
		Self { visualization_name: "nbest", title: "NBest", name: "nbest", nbest_data }
	}
}
