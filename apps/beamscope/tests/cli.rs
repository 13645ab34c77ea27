use std::{fs, path::Path};

use clap::Parser;

use beamscope::{Args, Command, execute};
use beamscope_config::{Config, Scratch, Service, State, Trace, Vocabulary};
use beamscope_service::InsightService;
use beamscope_testkit::{
	ALIVE_SCORES, ALIVE_SEQ, FINISHED_SCORES, FINISHED_SEQ, TraceFixture, fixture_tokenizer,
	fixture_vocabulary,
};

fn write_trace(fixture: &mut TraceFixture) {
	fixture.sequences("run_0", ALIVE_SEQ, &[&[0, 3], &[0, 0]]).expect("Write failed.");
	fixture.scores("run_0", ALIVE_SCORES, &[-0.3, -9.0]).expect("Write failed.");
	fixture.sequences("run_0", FINISHED_SEQ, &[&[0, 3, 1]]).expect("Write failed.");
	fixture.scores("run_0", FINISHED_SCORES, &[-0.6]).expect("Write failed.");
}

fn service(base_dir: &Path, top_k: u32) -> InsightService {
	let cfg = Config {
		service: Service { log_level: "info".to_string() },
		trace: Trace::default(),
		vocabulary: Vocabulary { tokenizer_file: None, tokenizer_repo: None },
		scratch: Scratch { base_dir: base_dir.to_path_buf() },
		state: State { top_k },
	};

	InsightService::new(&cfg, Box::new(fixture_vocabulary())).expect("Failed to build service.")
}

fn command(argv: &[&str]) -> Command {
	Args::try_parse_from(argv.iter().copied()).expect("Arguments must parse.").command
}

#[test]
fn render_arguments_parse() {
	let args = Args::try_parse_from([
		"beamscope",
		"--config",
		"beamscope.toml",
		"render",
		"--trace-dir",
		"/tmp/trace",
		"--query",
		"le chat",
		"--output-ids",
		"5,7,1",
		"--pretty",
	])
	.expect("Arguments must parse.");

	assert_eq!(args.config, Path::new("beamscope.toml"));

	let Command::Render(render) = args.command else {
		panic!("Expected the render command.");
	};

	assert_eq!(render.trace.trace_dir, Path::new("/tmp/trace"));
	assert_eq!(render.query, "le chat");
	assert_eq!(render.output_ids, vec![5, 7, 1]);
	assert!(render.trace.pretty);
}

#[test]
fn state_requires_a_query() {
	let err = Args::try_parse_from(["beamscope", "-c", "b.toml", "state", "--trace-dir", "t"])
		.expect_err("Expected missing query.");

	assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);
}

#[test]
fn graph_command_prints_the_graph_visualization() {
	let mut fixture = TraceFixture::new().expect("Failed to create fixture.");

	write_trace(&mut fixture);

	let root = fixture.root().display().to_string();
	let service = service(&fixture.root().join("scratch"), 2);
	let graph = command(&["beamscope", "-c", "x", "graph", "--trace-dir", &root]);
	let output = execute(&service, &graph).expect("Graph failed.");
	let value: serde_json::Value = serde_json::from_str(&output).expect("Output must be JSON.");

	assert_eq!(value["visualization_name"], "graph");
	assert_eq!(
		value["search_graph"]["vertex"],
		serde_json::json!([{ "id": "0" }, { "id": "0:3" }, { "id": "0:3:1" }])
	);
	assert_eq!(value["search_graph"]["edge"][1]["data"]["score"], -0.6);
}

#[test]
fn nbest_and_state_commands_read_the_same_trace() {
	let mut fixture = TraceFixture::new().expect("Failed to create fixture.");

	write_trace(&mut fixture);

	let root = fixture.root().display().to_string();
	let service = service(&fixture.root().join("scratch"), 2);
	let nbest = command(&["beamscope", "-c", "x", "nbest", "--trace-dir", &root]);
	let nbest = execute(&service, &nbest).expect("NBest failed.");
	let nbest: serde_json::Value = serde_json::from_str(&nbest).expect("Output must be JSON.");

	assert_eq!(nbest["nbest_data"]["sentence"][0]["text"], "the <EOS>");

	let state = execute(
		&service,
		&command(&["beamscope", "-c", "x", "state", "--trace-dir", &root, "--query", "q"]),
	)
	.expect("State failed.");
	let state: serde_json::Value = serde_json::from_str(&state).expect("Output must be JSON.");

	assert_eq!(state, serde_json::json!({ "query": "q", "scores": [-0.3, -0.6] }));
}

#[test]
fn run_loads_config_and_tokenizer_from_disk() {
	let mut fixture = TraceFixture::new().expect("Failed to create fixture.");

	write_trace(&mut fixture);

	let dir = fixture.root().join("config");

	fs::create_dir_all(&dir).expect("Failed to create config directory.");

	let tokenizer = dir.join("tokenizer.json");

	fixture_tokenizer().save(&tokenizer, false).expect("Failed to save tokenizer.");

	let config = dir.join("beamscope.toml");
	let payload = format!(
		"[service]\nlog_level = \"warn\"\n\n[vocabulary]\ntokenizer_file = {:?}\n\n[scratch]\nbase_dir = {:?}\n",
		tokenizer.display().to_string(),
		dir.join("scratch").display().to_string(),
	);

	fs::write(&config, payload).expect("Failed to write config.");

	let args = Args::try_parse_from([
		"beamscope".to_string(),
		"--config".to_string(),
		config.display().to_string(),
		"render".to_string(),
		"--trace-dir".to_string(),
		fixture.root().display().to_string(),
	])
	.expect("Arguments must parse.");

	beamscope::run(args).expect("Run failed.");
}
