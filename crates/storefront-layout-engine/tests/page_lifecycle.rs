//! End-to-end exercises of the persist/load/optimize pipeline: a page is
//! built as a block list, serialized to the graph document, canonicalized,
//! and read back for rendering.

use pretty_assertions::assert_eq;
use rstest::rstest;
use serde_json::{Value, json};
use storefront_layout_engine::{
    Block, Cmd, EditSession, RegistryError, deserialize, optimize, serialize, stats,
};

fn block(tag: &str, order: i64, props: Value) -> Block {
    Block {
        order: Some(order),
        props: props.as_object().cloned().unwrap_or_default(),
        ..Block::new(tag)
    }
}

#[test]
fn example_page_round_trips_without_the_disabled_banner() {
    let blocks = vec![
        block("hero", 0, json!({"title": "A"})),
        Block {
            enabled: Some(false),
            ..block("banner", 1, json!({"image": "x.png"}))
        },
        block("text", 2, json!({"body": "hi"})),
    ];

    let document = serialize(&blocks).unwrap();
    let graph: Value = serde_json::from_str(&document).unwrap();
    assert_eq!(graph["ROOT"]["nodes"], json!(["canvas"]));
    assert_eq!(graph["canvas"]["nodes"], json!(["hero-0", "text-1"]));

    let rendered = deserialize(&document);
    assert_eq!(
        rendered,
        vec![
            Block {
                enabled: Some(true),
                ..block("hero", 0, json!({"title": "A"}))
            },
            Block {
                enabled: Some(true),
                ..block("text", 1, json!({"body": "hi"}))
            },
        ]
    );
}

#[test]
fn round_trip_normalizes_order_to_array_position() {
    let blocks = vec![
        block("text", 10, json!({"body": "second"})),
        block("hero", -5, json!({})),
        block("image", 10, json!({"src": "a.png"})),
    ];

    let rendered = deserialize(&serialize(&blocks).unwrap());
    let tags: Vec<&str> = rendered.iter().map(|b| b.block_type.as_str()).collect();
    // hero first (order -5), then the two order-10 blocks in input order.
    assert_eq!(tags, vec!["hero", "text", "image"]);
    let orders: Vec<Option<i64>> = rendered.iter().map(|b| b.order).collect();
    assert_eq!(orders, vec![Some(0), Some(1), Some(2)]);
}

#[test]
fn unknown_type_blocks_the_save() {
    let blocks = vec![Block::new("no-such-kind")];
    assert_eq!(
        serialize(&blocks),
        Err(RegistryError::UnknownBlockType("no-such-kind".to_string()))
    );
}

#[rstest]
#[case::empty_list(vec![])]
#[case::single(vec![block("hero", 0, json!({"title": "T"}))])]
#[case::full_page(vec![
    block("hero", 0, json!({"title": "T"})),
    block("categories", 1, json!({"limit": 8})),
    block("products", 2, json!({"collection": "featured"})),
    block("menu", 3, json!({})),
])]
fn optimizing_the_persisted_document_is_invisible_to_the_renderer(#[case] blocks: Vec<Block>) {
    let document = serialize(&blocks).unwrap();
    let raw: Value = serde_json::from_str(&document).unwrap();

    let optimized = optimize(&raw);
    assert_eq!(optimize(&optimized), optimized, "optimizer must be idempotent");

    let report = stats(&raw);
    assert!(report.optimized_len <= report.original_len);

    assert_eq!(
        deserialize(&optimized.to_string()),
        deserialize(&document),
        "optimization must not change what renders"
    );
}

#[test]
fn editor_session_output_survives_the_full_pipeline() {
    let mut session = EditSession::new();
    for (tag, title) in [("hero", "Welcome"), ("text", "About us")] {
        let patch = session
            .apply(Cmd::InsertBlock {
                block_type: tag.to_string(),
                parent: None,
                at: usize::MAX,
            })
            .unwrap();
        session
            .apply(Cmd::SetProp {
                id: patch.changed[0].clone(),
                key: "title".to_string(),
                value: json!(title),
            })
            .unwrap();
    }

    let persisted = session.to_persisted_json().unwrap();
    let rendered = deserialize(&persisted);
    assert_eq!(rendered, session.blocks());

    // Saving what the renderer saw reproduces an equivalent document.
    let resaved = serialize(&rendered).unwrap();
    assert_eq!(deserialize(&resaved), rendered);
}

#[test]
fn newer_documents_render_what_this_version_understands() {
    let document = json!({
        "ROOT": {"type": {"resolvedName": "div"}, "props": {}, "nodes": ["canvas"]},
        "canvas": {
            "type": {"resolvedName": "div"},
            "props": {},
            "nodes": ["hero-0", "ar-viewer-1", "text-2"],
            "parent": "ROOT"
        },
        "hero-0": {"type": {"resolvedName": "Hero"}, "props": {}, "nodes": [], "parent": "canvas"},
        "ar-viewer-1": {"type": {"resolvedName": "ArViewer"}, "props": {"model": "shoe.glb"}, "nodes": [], "parent": "canvas"},
        "text-2": {"type": {"resolvedName": "Text"}, "props": {}, "nodes": [], "parent": "canvas"}
    })
    .to_string();

    let tags: Vec<String> = deserialize(&document)
        .into_iter()
        .map(|b| b.block_type)
        .collect();
    assert_eq!(tags, vec!["hero".to_string(), "text".to_string()]);
}

#[rstest]
#[case("{not valid json")]
#[case("{}")]
#[case("null")]
#[case("[]")]
#[case(r#"{"canvas": {"type": {"resolvedName": "div"}, "props": {}, "nodes": []}}"#)]
fn corrupt_documents_render_as_empty_pages(#[case] document: &str) {
    assert_eq!(deserialize(document), Vec::<Block>::new());
}
