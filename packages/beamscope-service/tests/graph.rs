use beamscope_domain::{Partition, TokenPath};
use beamscope_service::{Error, Graph, build};
use beamscope_testkit::fixture_vocabulary;
use beamscope_trace::{DumpRecord, RunDumps, ScoreDump, SequenceDump};

fn sequences(run_index: u32, partition: Partition, paths: &[&[u32]]) -> SequenceDump {
	DumpRecord {
		run_index,
		partition,
		node_name: format!("grow_{partition}_topk_seq"),
		timestamp: 0,
		payload: paths.iter().map(|ids| TokenPath::new(ids.to_vec())).collect(),
	}
}

fn scores(run_index: u32, partition: Partition, values: &[f64]) -> ScoreDump {
	DumpRecord {
		run_index,
		partition,
		node_name: format!("grow_{partition}_topk_scores"),
		timestamp: 0,
		payload: values.to_vec(),
	}
}

fn run(run_index: u32, sequences: Vec<SequenceDump>, scores: Vec<ScoreDump>) -> RunDumps {
	RunDumps { run_index, name: format!("run_{run_index}"), sequences, scores }
}

fn keys(graph: &Graph) -> Vec<&str> {
	graph.vertices().iter().map(|vertex| vertex.key.as_str()).collect()
}

fn score_of(graph: &Graph, ids: &[u32]) -> Option<f64> {
	let edge = graph.incoming_edge(&TokenPath::new(ids.to_vec()).key())?;

	graph.edge(edge).and_then(|edge| edge.data.score)
}

#[test]
fn padded_path_is_dropped_and_scores_follow_array_order() {
	let runs = vec![run(
		0,
		vec![sequences(0, Partition::Alive, &[&[1, 5, 0], &[1, 5, 7]])],
		vec![scores(0, Partition::Alive, &[0.9, 0.4])],
	)];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");

	assert_eq!(keys(&graph), vec!["0", "1", "1:5", "1:5:7"]);
	assert_eq!(score_of(&graph, &[1, 5, 7]), Some(0.4));

	let edge = graph.incoming_edge(&TokenPath::new(vec![1, 5, 7]).key()).expect("Edge exists.");
	let edge = graph.edge(edge).expect("Edge exists.");

	assert_eq!(edge.from.as_str(), "1:5");
	assert_eq!(edge.data.label, "mat");
	assert_eq!(edge.data.label_id, 7);
	assert!(!edge.data.completed);
	assert_eq!(edge.data.log_probability, Some(0.4));
	assert_eq!(edge.data.total_log_probability, Some(0.4));
}

#[test]
fn trace_without_matching_dumps_is_just_the_root() {
	let runs = vec![run(0, Vec::new(), Vec::new()), run(1, Vec::new(), Vec::new())];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");

	assert_eq!(keys(&graph), vec!["0"]);
	assert!(graph.edges().is_empty());
}

#[test]
fn extra_score_dump_is_an_alignment_underflow() {
	let runs = vec![run(
		0,
		vec![sequences(0, Partition::Alive, &[&[0, 3]])],
		vec![scores(0, Partition::Alive, &[-0.1]), scores(0, Partition::Alive, &[-0.2])],
	)];
	let err = build(&runs, &fixture_vocabulary()).expect_err("Expected underflow.");

	assert!(
		matches!(
			err,
			Error::AlignmentUnderflow { run_index: 0, partition: Partition::Alive, score_index: 1 }
		),
		"Unexpected error: {err:?}"
	);
}

#[test]
fn score_dump_never_aligns_with_the_other_partition() {
	let runs = vec![run(
		0,
		vec![sequences(0, Partition::Finished, &[&[0, 3, 1]])],
		vec![scores(0, Partition::Alive, &[-0.1])],
	)];
	let err = build(&runs, &fixture_vocabulary()).expect_err("Expected underflow.");

	assert!(matches!(err, Error::AlignmentUnderflow { partition: Partition::Alive, .. }));
}

#[test]
fn runs_never_align_across_each_other() {
	let runs = vec![
		run(0, vec![sequences(0, Partition::Alive, &[&[0, 3]])], Vec::new()),
		run(1, Vec::new(), vec![scores(1, Partition::Alive, &[-0.1])]),
	];
	let err = build(&runs, &fixture_vocabulary()).expect_err("Expected underflow.");

	assert!(matches!(err, Error::AlignmentUnderflow { run_index: 1, .. }));
}

#[test]
fn same_path_from_two_runs_is_one_vertex() {
	let runs = vec![
		run(0, vec![sequences(0, Partition::Alive, &[&[1, 5, 7]])], Vec::new()),
		run(1, vec![sequences(1, Partition::Alive, &[&[0, 2], &[1, 5, 7]])], Vec::new()),
	];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");
	let matching = graph.vertices().iter().filter(|vertex| vertex.key.as_str() == "1:5:7").count();

	assert_eq!(matching, 1);
	assert_eq!(keys(&graph), vec!["0", "1", "1:5", "1:5:7", "0:2"]);
	assert_eq!(graph.edges().len(), 4);
}

#[test]
fn rebuilding_yields_identical_ids() {
	let runs = vec![run(
		0,
		vec![
			sequences(0, Partition::Alive, &[&[0, 3], &[0, 8]]),
			sequences(0, Partition::Alive, &[&[0, 3, 4], &[0, 8, 9]]),
			sequences(0, Partition::Finished, &[&[0, 3, 4, 1], &[0, 0, 0, 0]]),
		],
		vec![
			scores(0, Partition::Alive, &[-0.3, -0.9]),
			scores(0, Partition::Alive, &[-0.7, -1.1]),
			scores(0, Partition::Finished, &[-0.8, f64::NEG_INFINITY]),
		],
	)];
	let vocab = fixture_vocabulary();
	let first = build(&runs, &vocab).expect("Build failed.");
	let second = build(&runs, &vocab).expect("Build failed.");

	assert_eq!(keys(&first), keys(&second));
	assert_eq!(first.edges(), second.edges());
}

#[test]
fn every_vertex_but_the_root_has_one_incoming_edge() {
	let runs = vec![run(
		0,
		vec![
			sequences(0, Partition::Alive, &[&[0, 3, 4], &[0, 3, 5], &[2, 6]]),
			sequences(0, Partition::Finished, &[&[0, 3, 4, 1]]),
		],
		Vec::new(),
	)];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");

	for vertex in graph.vertices() {
		let expected = if &vertex.key == graph.root() { 0 } else { 1 };

		assert_eq!(vertex.in_edges.len(), expected, "Vertex {} breaks the tree.", vertex.key);
	}
}

#[test]
fn padding_never_ends_a_vertex_key() {
	let runs = vec![run(
		0,
		vec![sequences(0, Partition::Alive, &[&[0, 0, 0], &[0, 4, 0], &[0, 4, 6], &[0, 0, 6]])],
		Vec::new(),
	)];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");

	assert_eq!(keys(&graph), vec!["0", "0:4", "0:4:6"]);

	for vertex in graph.vertices().iter().skip(1) {
		assert!(!vertex.key.as_str().ends_with(":0"), "Padding vertex {}.", vertex.key);
	}
}

#[test]
fn interleaved_partitions_align_by_their_own_order() {
	let runs = vec![run(
		0,
		vec![
			sequences(0, Partition::Alive, &[&[0, 3], &[0, 8]]),
			sequences(0, Partition::Finished, &[&[0, 1]]),
			sequences(0, Partition::Alive, &[&[0, 3, 4], &[0, 8, 9]]),
		],
		vec![
			scores(0, Partition::Finished, &[-2.0]),
			scores(0, Partition::Alive, &[-0.3, -0.9]),
			scores(0, Partition::Alive, &[-0.7, -1.1]),
		],
	)];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");

	assert_eq!(score_of(&graph, &[0, 1]), Some(-2.0));
	assert_eq!(score_of(&graph, &[0, 3]), Some(-0.3));
	assert_eq!(score_of(&graph, &[0, 8]), Some(-0.9));
	assert_eq!(score_of(&graph, &[0, 3, 4]), Some(-0.7));
	assert_eq!(score_of(&graph, &[0, 8, 9]), Some(-1.1));

	let end = graph.incoming_edge(&TokenPath::new(vec![0, 1]).key()).expect("Edge exists.");

	assert!(graph.edge(end).expect("Edge exists.").data.completed);
}

#[test]
fn later_score_batches_overwrite_and_labels_keep_first_values() {
	let runs = vec![run(
		0,
		vec![
			sequences(0, Partition::Alive, &[&[0, 3]]),
			sequences(0, Partition::Finished, &[&[0, 3]]),
		],
		vec![scores(0, Partition::Alive, &[-0.3]), scores(0, Partition::Finished, &[-0.6])],
	)];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");

	assert_eq!(graph.edges().len(), 1);
	assert_eq!(score_of(&graph, &[0, 3]), Some(-0.6));
	assert_eq!(graph.edges()[0].data.label, "the");
}

#[test]
fn unequal_aligned_batches_are_rejected() {
	let runs = vec![run(
		2,
		vec![sequences(2, Partition::Alive, &[&[0, 3], &[0, 4]])],
		vec![scores(2, Partition::Alive, &[-0.3])],
	)];
	let err = build(&runs, &fixture_vocabulary()).expect_err("Expected mismatch.");

	assert!(matches!(err, Error::BatchSizeMismatch { run_index: 2, paths: 2, scores: 1, .. }));
}

#[test]
fn unscored_sequence_batches_are_kept_without_scores() {
	let runs = vec![run(0, vec![sequences(0, Partition::Alive, &[&[0, 3]])], Vec::new())];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");

	assert_eq!(graph.edges().len(), 1);
	assert!(!graph.edges()[0].data.is_scored());
}

#[test]
fn unknown_token_id_fails_the_build() {
	let runs = vec![run(0, vec![sequences(0, Partition::Alive, &[&[0, 4_000]])], Vec::new())];
	let err = build(&runs, &fixture_vocabulary()).expect_err("Expected vocabulary error.");

	assert!(matches!(err, Error::Vocabulary(beamscope_vocab::Error::UnknownId { id: 4_000, .. })));
}

#[test]
fn serialized_graph_is_plain_and_ordered() {
	let runs = vec![run(
		0,
		vec![sequences(0, Partition::Alive, &[&[0, 3]])],
		vec![scores(0, Partition::Alive, &[-0.5])],
	)];
	let graph = build(&runs, &fixture_vocabulary()).expect("Build failed.");
	let value = serde_json::to_value(graph.to_search_graph()).expect("Serialize failed.");

	assert_eq!(
		value,
		serde_json::json!({
			"vertex": [{ "id": "0" }, { "id": "0:3" }],
			"edge": [{
				"from": "0",
				"to": "0:3",
				"data": {
					"label": "the",
					"label_id": 3,
					"completed": false,
					"score": -0.5,
					"log_probability": -0.5,
					"total_log_probability": -0.5
				}
			}]
		})
	);
}
