use json_kv::{Document, JsonKv};
use proptest::prelude::*;
use serde_json::Value;
use tempfile::TempDir;

fn json_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::from),
        // eighths are exact in binary, so text round-trips don't lose bits
        (-10_000i32..10_000).prop_map(|n| Value::from(f64::from(n) / 8.0)),
        "[a-zA-Z0-9 _\\-]{0,12}".prop_map(Value::String),
    ];
    leaf.prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::vec(("[a-z]{1,6}", inner), 0..4)
                .prop_map(|pairs| Value::Object(pairs.into_iter().collect())),
        ]
    })
}

fn document() -> impl Strategy<Value = Document> {
    prop::collection::vec(("[a-z][a-z0-9_]{0,7}", json_value()), 0..8)
        .prop_map(|pairs| pairs.into_iter().collect())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn set_then_fetch_all_returns_same_document(doc in document()) {
        let dir = TempDir::new().unwrap();
        let db = JsonKv::builder("prop").dir(dir.path()).build().unwrap();
        for (k, v) in &doc {
            db.set(k, v).unwrap();
        }
        prop_assert_eq!(db.fetch_all().unwrap(), doc.clone());
        prop_assert_eq!(db.keys().unwrap(), doc.keys().cloned().collect::<Vec<_>>());

        // a second store on the same file reads the same thing
        let reopened = JsonKv::builder("prop").dir(dir.path()).build().unwrap();
        prop_assert_eq!(reopened.fetch_all().unwrap(), doc);
    }
}
