//! Content fingerprints.
//!
//! The canonical hash covers a skill's identity fields, its body, and the
//! content hash of every dependent file. Metadata is serialized as JSON with
//! keys sorted at every level and dependent files are sorted by path, so
//! enumeration order never changes the result. Every component is length
//! prefixed before it is fed to the digest.

use serde_json::{Map, Number};
use serde_yaml::{Mapping, Value};
use sha2::{Digest, Sha256};

use super::dependent::DependentFile;

/// Compute the canonical fingerprint of a skill.
#[must_use]
pub fn compute_hash(
    core_metadata: &Mapping,
    body: &str,
    dependent_files: &[DependentFile],
) -> String {
    let mut files: Vec<&DependentFile> = dependent_files.iter().collect();
    files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

    let mut hasher = Sha256::new();
    update_component(&mut hasher, canonical_mapping_json(core_metadata).as_bytes());
    update_component(&mut hasher, body.as_bytes());
    for file in files {
        update_component(&mut hasher, file.relative_path.as_bytes());
        update_component(&mut hasher, file.hash.as_bytes());
    }
    hex::encode(hasher.finalize())
}

#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

fn update_component(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

/// Deep equality that ignores mapping key order.
#[must_use]
pub fn values_equal(left: &Value, right: &Value) -> bool {
    to_json(left) == to_json(right)
}

#[must_use]
pub fn mappings_equal(left: &Mapping, right: &Mapping) -> bool {
    mapping_to_json(left) == mapping_to_json(right)
}

/// JSON rendering with recursively sorted keys.
#[must_use]
pub fn canonical_json(value: &Value) -> String {
    to_json(value).to_string()
}

#[must_use]
pub fn canonical_mapping_json(mapping: &Mapping) -> String {
    mapping_to_json(mapping).to_string()
}

/// Convert YAML to JSON. `serde_json::Map` is ordered by key, which gives the
/// sorted form. Non-string keys become their JSON text and tagged values
/// become a single-entry object keyed by the tag, so every YAML document has
/// a JSON rendering.
fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(flag) => serde_json::Value::Bool(*flag),
        Value::Number(number) => number_to_json(number),
        Value::String(text) => serde_json::Value::String(text.clone()),
        Value::Sequence(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Mapping(mapping) => mapping_to_json(mapping),
        Value::Tagged(tagged) => {
            let mut object = Map::new();
            object.insert(tagged.tag.to_string(), to_json(&tagged.value));
            serde_json::Value::Object(object)
        }
    }
}

fn mapping_to_json(mapping: &Mapping) -> serde_json::Value {
    let object: Map<String, serde_json::Value> = mapping
        .iter()
        .map(|(key, value)| (key_string(key), to_json(value)))
        .collect();
    serde_json::Value::Object(object)
}

fn key_string(key: &Value) -> String {
    key.as_str()
        .map_or_else(|| to_json(key).to_string(), ToString::to_string)
}

fn number_to_json(number: &serde_yaml::Number) -> serde_json::Value {
    if let Some(int) = number.as_i64() {
        return serde_json::Value::from(int);
    }
    if let Some(int) = number.as_u64() {
        return serde_json::Value::from(int);
    }
    number
        .as_f64()
        .and_then(Number::from_f64)
        .map_or_else(
            || serde_json::Value::String(number.to_string()),
            serde_json::Value::Number,
        )
}
