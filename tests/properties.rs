//! Property tests: the list cache agrees with the directory.

mod common;

use common::{bar, bar_key, Bar};
use dirstore::{JsonCodec, ListCache, RecordStore, StoreConfig};
use proptest::prelude::*;
use std::collections::BTreeMap;
use tempfile::TempDir;

const KEYS: [&str; 4] = ["A", "B", "C", "D"];

#[derive(Clone, Debug)]
enum Op {
    Add(usize, i32),
    Remove(usize),
    Replace(usize, i32),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..KEYS.len(), any::<i32>()).prop_map(|(k, i)| Op::Add(k, i)),
        (0..KEYS.len()).prop_map(Op::Remove),
        (0..KEYS.len(), any::<i32>()).prop_map(|(k, i)| Op::Replace(k, i)),
    ]
}

fn open(dir: &TempDir) -> ListCache<Bar> {
    ListCache::open(
        &StoreConfig::new(dir.path(), &["model"]),
        JsonCodec::new(),
        bar_key,
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn cache_matches_fresh_load(ops in prop::collection::vec(op(), 0..40)) {
        let dir = TempDir::new().unwrap();
        let cache = open(&dir);
        cache.list().unwrap();

        // Current record per key, as the directory should hold it.
        let mut model: BTreeMap<&str, Bar> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Add(k, i) => {
                    // Adding over a live key would list it twice.
                    if model.contains_key(KEYS[k]) {
                        continue;
                    }
                    cache.add([bar(i, KEYS[k])]).unwrap();
                    model.insert(KEYS[k], bar(i, KEYS[k]));
                }
                Op::Remove(k) => {
                    let record = model.remove(KEYS[k]).unwrap_or_else(|| bar(0, KEYS[k]));
                    cache.remove([record]).unwrap();
                }
                Op::Replace(k, i) => {
                    cache.replace(bar(i, KEYS[k])).unwrap();
                    model.insert(KEYS[k], bar(i, KEYS[k]));
                }
            }
        }

        let mut cached = cache.list().unwrap();
        cached.sort();
        let mut expected: Vec<Bar> = model.into_values().collect();
        expected.sort();
        prop_assert_eq!(&cached, &expected);

        let mut fresh = open(&dir).list().unwrap();
        fresh.sort();
        prop_assert_eq!(&fresh, &expected);

        let store: RecordStore<Bar> =
            RecordStore::open(&StoreConfig::new(dir.path(), &["model"]), JsonCodec::new()).unwrap();
        prop_assert_eq!(store.keys().unwrap().len(), expected.len());
    }
}
