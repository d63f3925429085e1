#![cfg(test)]

// Property tests for TableEngine kept inside the crate so they do not
// require feature gates to access internal modules.

use crate::adapter::CloneAdapter;
use crate::table::{TableEngine, Upsert};
use proptest::prelude::*;
use std::collections::HashMap;

// Pool-indexed operations to improve shrinking: indices shrink to earlier
// keys, pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Upsert(usize, i32),
    Remove(usize),
    Lookup(usize),
    Scan,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Upsert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Lookup),
            1 => Just(OpI::Scan),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: state-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - Upsert is insert-or-overwrite; duplicate pool entries collapse to one key.
// - Remove parity: present/absent outcomes and len match the model.
// - Lookup parity via copied-out values.
// - Scan yields exactly the model's pairs with no duplicate keys.
// - Clear empties both and the table stays usable.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: TableEngine<CloneAdapter<String>> =
            TableEngine::new(CloneAdapter::new(), None);
        let mut model: HashMap<String, i32> = HashMap::new();

        for op in ops {
            match op {
                OpI::Upsert(i, v) => {
                    let key = pool[i].clone();
                    let outcome = sut.upsert(&key, &v.to_string()).unwrap();
                    let expected = if model.insert(key, v).is_some() {
                        Upsert::Updated
                    } else {
                        Upsert::Inserted
                    };
                    prop_assert_eq!(outcome, expected);
                }
                OpI::Remove(i) => {
                    let key = pool[i].clone();
                    let removed = sut.remove(&key);
                    prop_assert_eq!(removed, model.remove(&key).is_some());
                }
                OpI::Lookup(i) => {
                    let key = pool[i].clone();
                    let got = sut.copy_value(&key).unwrap();
                    prop_assert_eq!(got, model.get(&key).map(|v| v.to_string()));
                }
                OpI::Scan => {
                    let snap = sut.scan().unwrap();
                    prop_assert_eq!(snap.len(), model.len());
                    let as_map: HashMap<String, String> = snap.into_iter().collect();
                    prop_assert_eq!(as_map.len(), model.len());
                    for (k, v) in &model {
                        prop_assert_eq!(as_map.get(k), Some(&v.to_string()));
                    }
                }
                OpI::Clear => {
                    sut.clear();
                    model.clear();
                }
            }
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}
