//! JSON schema builders for MCP tools.

use crate::config::get_config;
use crate::keywords::DEFAULT_TOP_TERMS;
use serde_json::{Map, Value, json};

/// Build the schema describing the `summarize` tool input.
pub(crate) fn summarize_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "text".into(),
        string_schema("Raw document contents to summarize"),
    );
    append_option_properties(&mut properties);

    let mut schema = finalize_object_schema(properties, &["text"]);
    schema.insert(
        "examples".into(),
        Value::Array(vec![json!({
            "text": "First finding. Second finding. Third finding.",
            "compressionRatio": 0.3
        })]),
    );
    schema
}

/// Build the schema describing the `summarize-source` tool input.
pub(crate) fn summarize_source_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "uri".into(),
        string_schema("URL (http/https), JSON file path, or plain-text file path"),
    );
    append_option_properties(&mut properties);

    finalize_object_schema(properties, &["uri"])
}

/// Build the schema describing the `keywords` tool input.
pub(crate) fn keywords_input_schema() -> Map<String, Value> {
    let mut properties = Map::new();
    properties.insert(
        "text".into(),
        string_schema("Document to rank TF-IDF terms for"),
    );

    let mut top_n_schema = Map::new();
    top_n_schema.insert("type".into(), Value::String("integer".into()));
    top_n_schema.insert(
        "description".into(),
        Value::String("Number of terms to return".into()),
    );
    top_n_schema.insert("minimum".into(), Value::Number(1.into()));
    top_n_schema.insert(
        "default".into(),
        Value::Number(serde_json::Number::from(DEFAULT_TOP_TERMS as u64)),
    );
    properties.insert("topN".into(), Value::Object(top_n_schema));

    finalize_object_schema(properties, &["text"])
}

/// Schema representing an empty object (used for parameterless tools).
pub(crate) fn empty_object_schema() -> Map<String, Value> {
    finalize_object_schema(Map::new(), &[])
}

/// Add the shared summarization option properties with configured defaults.
fn append_option_properties(properties: &mut Map<String, Value>) {
    let config = get_config();

    let mut ratio_schema = Map::new();
    ratio_schema.insert("type".into(), Value::String("number".into()));
    ratio_schema.insert(
        "description".into(),
        Value::String("Fraction of sentences kept per chunk, in (0, 1]".into()),
    );
    ratio_schema.insert(
        "exclusiveMinimum".into(),
        Value::Number(serde_json::Number::from_f64(0.0).expect("zero")),
    );
    ratio_schema.insert(
        "maximum".into(),
        Value::Number(serde_json::Number::from_f64(1.0).expect("one")),
    );
    ratio_schema.insert(
        "default".into(),
        Value::Number(
            serde_json::Number::from_f64(config.summary_compression_ratio)
                .expect("valid compression ratio"),
        ),
    );
    properties.insert("compressionRatio".into(), Value::Object(ratio_schema));

    let mut min_schema = Map::new();
    min_schema.insert("type".into(), Value::String("integer".into()));
    min_schema.insert(
        "description".into(),
        Value::String("Lower word bound passed to the compression model".into()),
    );
    min_schema.insert(
        "default".into(),
        Value::Number(serde_json::Number::from(config.summary_min_length as u64)),
    );
    properties.insert("minLength".into(), Value::Object(min_schema));

    let mut max_schema = Map::new();
    max_schema.insert("type".into(), Value::String("integer".into()));
    max_schema.insert(
        "description".into(),
        Value::String("Upper word bound passed to the compression model".into()),
    );
    max_schema.insert(
        "default".into(),
        Value::Number(serde_json::Number::from(config.summary_max_length as u64)),
    );
    properties.insert("maxLength".into(), Value::Object(max_schema));

    let mut chunk_schema = Map::new();
    chunk_schema.insert("type".into(), Value::String("integer".into()));
    chunk_schema.insert(
        "description".into(),
        Value::String("Character budget per chunk (must be > 0)".into()),
    );
    chunk_schema.insert("minimum".into(), Value::Number(1.into()));
    chunk_schema.insert(
        "default".into(),
        Value::Number(serde_json::Number::from(
            config.summary_max_chunk_size as u64,
        )),
    );
    properties.insert("maxChunkSize".into(), Value::Object(chunk_schema));

    let mut seed_schema = Map::new();
    seed_schema.insert("type".into(), Value::String("integer".into()));
    seed_schema.insert(
        "description".into(),
        Value::String("Seed for the clustering stage; identical seeds reproduce selections".into()),
    );
    seed_schema.insert("minimum".into(), Value::Number(0.into()));
    seed_schema.insert(
        "default".into(),
        Value::Number(serde_json::Number::from(config.summary_clustering_seed)),
    );
    properties.insert("clusteringSeed".into(), Value::Object(seed_schema));
}

fn string_schema(description: &str) -> Value {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("string".into()));
    schema.insert("description".into(), Value::String(description.into()));
    Value::Object(schema)
}

fn finalize_object_schema(properties: Map<String, Value>, required: &[&str]) -> Map<String, Value> {
    let mut schema = Map::new();
    schema.insert("type".into(), Value::String("object".into()));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert(
            "required".into(),
            Value::Array(
                required
                    .iter()
                    .map(|&key| Value::String(key.into()))
                    .collect(),
            ),
        );
    }
    schema.insert("additionalProperties".into(), Value::Bool(false));
    schema
}
