use proptest::prelude::*;
use serde_yaml::{Mapping, Value};

use skillsync::core::{DependentFile, compute_hash};

fn metadata(entries: &[(String, String)]) -> Mapping {
    let mut mapping = Mapping::new();
    for (key, value) in entries {
        mapping.insert(Value::from(key.as_str()), Value::from(value.as_str()));
    }
    mapping
}

fn dependents(entries: &[(String, String)]) -> Vec<DependentFile> {
    entries
        .iter()
        .map(|(path, hash)| DependentFile::new(path.as_str(), hash.as_str()))
        .collect()
}

proptest! {
    #[test]
    fn test_hash_deterministic(body in ".*", desc in "[a-z ]{0,20}") {
        let meta = metadata(&[("name".into(), "x".into()), ("description".into(), desc)]);
        prop_assert_eq!(compute_hash(&meta, &body, &[]), compute_hash(&meta, &body, &[]));
    }

    #[test]
    fn test_hash_ignores_key_order(
        fields in prop::collection::btree_map("[a-z]{1,8}", "[a-z0-9]{0,8}", 1..6)
    ) {
        let entries: Vec<(String, String)> = fields.into_iter().collect();
        let mut reversed = entries.clone();
        reversed.reverse();
        prop_assert_eq!(
            compute_hash(&metadata(&entries), "body", &[]),
            compute_hash(&metadata(&reversed), "body", &[])
        );
    }

    #[test]
    fn test_hash_ignores_dependent_order(
        files in prop::collection::btree_map("[a-z]{1,6}(/[a-z]{1,6})?", "[0-9a-f]{8}", 0..6)
    ) {
        let entries: Vec<(String, String)> = files.into_iter().collect();
        let mut reversed = entries.clone();
        reversed.reverse();
        let meta = metadata(&[("name".into(), "x".into())]);
        prop_assert_eq!(
            compute_hash(&meta, "body", &dependents(&entries)),
            compute_hash(&meta, "body", &dependents(&reversed))
        );
    }

    #[test]
    fn test_hash_sensitive_to_body(a in ".*", b in ".*") {
        prop_assume!(a != b);
        let meta = metadata(&[("name".into(), "x".into())]);
        prop_assert_ne!(compute_hash(&meta, &a, &[]), compute_hash(&meta, &b, &[]));
    }

    #[test]
    fn test_hash_sensitive_to_dependent_content(h1 in "[0-9a-f]{8}", h2 in "[0-9a-f]{8}") {
        prop_assume!(h1 != h2);
        let meta = metadata(&[("name".into(), "x".into())]);
        let first = dependents(&[("ref.md".into(), h1)]);
        let second = dependents(&[("ref.md".into(), h2)]);
        prop_assert_ne!(
            compute_hash(&meta, "body", &first),
            compute_hash(&meta, "body", &second)
        );
    }

    #[test]
    fn test_hash_sensitive_to_metadata(a in "[a-z]{1,12}", b in "[a-z]{1,12}") {
        prop_assume!(a != b);
        prop_assert_ne!(
            compute_hash(&metadata(&[("description".into(), a)]), "body", &[]),
            compute_hash(&metadata(&[("description".into(), b)]), "body", &[])
        );
    }
}
