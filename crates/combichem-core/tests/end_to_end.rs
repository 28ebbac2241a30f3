mod common;

use combichem::core::chem::template::{TemplateResult, template};
use combichem::core::executor::Executor;
use combichem::core::models::item::Item;
use combichem::core::models::structure::Structure;
use combichem::core::models::synthon::Synthon;
use combichem::engine::config::AssemblyConfig;
use combichem::engine::error::EngineError;
use combichem::engine::fragment::FragmentTreeBuilder;
use combichem::engine::progress::{Progress, ProgressReporter};
use combichem::engine::provenance::NodeSummary;
use combichem::engine::synthon::SynthonGraphBuilder;
use combichem::workflows::enumerate;
use common::{Coupling, LabelToolkit, reactive, rules, structures, synthons};
use serde::Serialize;
use std::sync::{Arc, Mutex};

fn config(chunk_size: usize, max_per_node: usize) -> AssemblyConfig {
    AssemblyConfig::builder()
        .chunk_size(chunk_size)
        .max_per_node(max_per_node)
        .build()
        .unwrap()
}

fn executor() -> Executor {
    Executor::with_threads(2).unwrap()
}

#[test]
fn fragment_pair_fuses_on_shared_label() {
    common::init_tracing();
    let toolkit = Arc::new(LabelToolkit::default());
    let mut builder = FragmentTreeBuilder::new(toolkit.clone());
    let a = builder.leaf("A", &[1], None);
    let b = builder.leaf("B", &[1], None);
    let root = builder.node("root", &[a, b], None).unwrap();
    let tree = builder.build(root).unwrap();
    let pools = structures(&[("A", &["C[*:1]"]), ("B", &["N[*:1]"])]);

    let result = enumerate::run(
        &tree,
        &pools,
        &config(16, 1_000),
        &executor(),
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(result.pool.keys(), vec!["CN"]);
    let product = &result.pool.items()[0];
    let sources: Vec<String> = product
        .annotations()
        .source_items()
        .iter()
        .map(|s| s.key().to_string())
        .collect();
    assert_eq!(sources, vec!["C[*:1]", "N[*:1]"]);
    assert_eq!(product.annotations().source_node().as_deref(), Some("root"));
    assert_eq!(
        product.annotations().input_representation().as_deref(),
        Some("C[*:1].N[*:1]")
    );
    assert_eq!(toolkit.calls(), 1);
}

#[test]
fn three_fragment_library_respects_templates_and_order() {
    common::init_tracing();
    let toolkit = Arc::new(LabelToolkit::default());
    let mut builder = FragmentTreeBuilder::new(toolkit.clone());
    let acid = builder.leaf("acids", &[1], None);
    let linker = builder.leaf("linkers", &[1, 2], None);
    let amine = builder.leaf("amines", &[2], None);
    let short = template(|s: &Structure| {
        if s.key().len() <= 5 {
            TemplateResult::pass()
        } else {
            TemplateResult::fail("too long")
        }
    });
    let core = builder.node("core", &[acid, linker], None).unwrap();
    let root = builder.node("product", &[core, amine], Some(short)).unwrap();
    let tree = builder.build(root).unwrap();
    assert_eq!(tree.leaf_names(), vec!["acids", "linkers", "amines"]);

    let pools = structures(&[
        ("acids", &["C[*:1]", "O[*:1]"]),
        ("linkers", &["[*:1]C[*:2]", "[*:1]CCCC[*:2]"]),
        ("amines", &["N[*:2]", "S[*:2]"]),
    ]);

    let result = enumerate::run(
        &tree,
        &pools,
        &config(3, 1_000),
        &executor(),
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(result.pool.keys(), vec!["CCN", "CCS", "OCN", "OCS"]);
    assert_eq!(toolkit.calls(), 2 * 2 + 4 * 2);
    let log = result.log.unwrap();
    let core_record = log.get("core").unwrap();
    assert_eq!(core_record.outputs.keys()[0], "CC[*:2]");
    assert_eq!(log.get("product").unwrap().outputs.len(), 4);
    let long_core = &log.get("core").unwrap().outputs.items()[1];
    assert_eq!(long_core.key(), "CCCCC[*:2]");
}

#[test]
fn cap_of_one_stops_within_one_chunk() {
    let toolkit = Arc::new(LabelToolkit::default());
    let mut builder = FragmentTreeBuilder::new(toolkit);
    let a = builder.leaf("A", &[1], None);
    let b = builder.leaf("B", &[1], None);
    let root = builder.node("root", &[a, b], None).unwrap();
    let tree = builder.build(root).unwrap();
    let pools = structures(&[("A", &["C[*:1]"]), ("B", &["N[*:1]", "O[*:1]", "S[*:1]"])]);

    for chunk_size in 1..=3 {
        let result = enumerate::run(
            &tree,
            &pools,
            &config(chunk_size, 1),
            &Executor::sequential(),
            &ProgressReporter::new(),
        )
        .unwrap();

        let accepted = result.pool.len();
        assert!(accepted >= 1);
        assert!(accepted <= 1 + chunk_size - 1);
        if chunk_size == 1 {
            assert_eq!(accepted, 1);
        }
    }
}

#[test]
fn synthon_pair_reacts_through_single_rule() {
    common::init_tracing();
    let mut builder = SynthonGraphBuilder::new();
    let incoming = builder.leaf("incoming", [], None);
    let next = builder.leaf("next", [], None);
    let product = builder
        .node(
            "product",
            incoming,
            next,
            rules(vec![Coupling::new("R", "X", "~")]),
            [],
            None,
        )
        .unwrap();
    let graph = builder.build(product).unwrap();
    let pools = synthons(vec![
        ("incoming", vec![reactive("s1", "X")]),
        ("next", vec![reactive("s2", "X")]),
    ]);

    let result = enumerate::run(
        &graph,
        &pools,
        &config(8, 100),
        &executor(),
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(result.pool.keys(), vec!["s1~s2"]);
    assert_eq!(result.pool.items()[0].annotations().reaction_tags(), vec!["R"]);
}

#[derive(Serialize)]
struct RunReport {
    nodes: Vec<NodeSummary>,
}

#[test]
fn two_step_synthon_library_with_shared_leaf() {
    common::init_tracing();
    let universe = rules(vec![
        Coupling::new("amide", "X", "-"),
        Coupling::new("ester", "X", "-"),
    ]);
    let mut builder = SynthonGraphBuilder::new();
    let core = builder.leaf("core", [], None);
    let cap = builder.leaf("cap", [], None);
    let first = builder
        .node("first", core, cap, Arc::clone(&universe), [1], None)
        .unwrap();
    let second = builder
        .node("second", first, core, universe, [0], None)
        .unwrap();
    let graph = builder.build(second).unwrap();
    assert!(graph.render().starts_with("Synthon Product: second"));

    let pools = synthons(vec![
        (
            "core",
            vec![
                reactive("a", "X").with_functional_groups(2),
                reactive("b", "X").with_functional_groups(1),
            ],
        ),
        ("cap", vec![reactive("c", "X").with_functional_groups(1)]),
    ]);

    let events = Mutex::new(Vec::new());
    let reporter = ProgressReporter::with_callback(Box::new(|event| {
        if let Progress::NodeStart { name } = event {
            events.lock().unwrap().push(name);
        }
    }));
    let result = enumerate::run(&graph, &pools, &config(2, 100), &executor(), &reporter).unwrap();
    drop(reporter);

    // first: a-c (fg 1) survives, b-c (fg 0) does not; second: a-c-a (fg 1) fails {0},
    // a-c-b (fg 0) passes.
    assert_eq!(result.pool.keys(), vec!["a-c-b"]);
    let product: &Synthon = &result.pool.items()[0];
    assert_eq!(product.annotations().reaction_tags(), vec!["amide", "ester"]);
    assert_eq!(
        events.into_inner().unwrap(),
        vec!["core", "cap", "first", "second"]
    );

    let report = RunReport {
        nodes: result.log.unwrap().summary(),
    };
    assert_eq!(
        report.nodes.iter().map(|n| n.node.as_str()).collect::<Vec<_>>(),
        vec!["core", "cap", "first", "second"]
    );
    let rendered = toml::to_string(&report).unwrap();
    assert!(rendered.contains("[[nodes]]"));
    assert!(rendered.contains("node = \"second\""));
}

#[test]
fn missing_synthon_pool_aborts_run() {
    let mut builder = SynthonGraphBuilder::new();
    let incoming = builder.leaf("incoming", [], None);
    let next = builder.leaf("next", [], None);
    let product = builder
        .node("product", incoming, next, rules(vec![]), [], None)
        .unwrap();
    let graph = builder.build(product).unwrap();
    let pools = synthons(vec![("incoming", vec![reactive("s1", "X")])]);

    let err = enumerate::run(
        &graph,
        &pools,
        &config(8, 100),
        &Executor::sequential(),
        &ProgressReporter::new(),
    )
    .unwrap_err();

    assert!(matches!(err, EngineError::MissingPool { name } if name == "next"));
}

#[test]
fn config_loaded_from_toml_drives_a_run() {
    let config: AssemblyConfig = toml::from_str(
        r#"
        chunk-size = 1
        max-per-node = 1
        log-provenance = false
        "#,
    )
    .unwrap();
    let toolkit = Arc::new(LabelToolkit::default());
    let mut builder = FragmentTreeBuilder::new(toolkit.clone());
    let a = builder.leaf("A", &[1], None);
    let b = builder.leaf("B", &[1], None);
    let root = builder.node("root", &[a, b], None).unwrap();
    let tree = builder.build(root).unwrap();
    let pools = structures(&[("A", &["C[*:1]", "O[*:1]"]), ("B", &["N[*:1]"])]);

    let result = enumerate::run(
        &tree,
        &pools,
        &config,
        &Executor::sequential(),
        &ProgressReporter::new(),
    )
    .unwrap();

    assert_eq!(result.pool.keys(), vec!["CN"]);
    assert!(result.log.is_none());
    assert_eq!(toolkit.calls(), 1);
}
