// Property tests for the Store operation surface, model-checked against
// std::collections::HashMap through random operation sequences.
use proptest::prelude::*;
use shmap::{CloneAdapter, Lookup, Removal, Store, StoreOptions};
use std::collections::HashMap;

#[derive(Clone, Debug)]
enum Op {
    Put(usize, i64),
    Del(usize),
    Lookup(usize),
    Get(usize, i64),
    ToList,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<Op>)> {
    proptest::collection::vec("[a-z]{1,4}", 1..=6).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let op = prop_oneof![
            4 => (idx.clone(), any::<i64>()).prop_map(|(i, v)| Op::Put(i, v)),
            2 => idx.clone().prop_map(Op::Del),
            2 => idx.clone().prop_map(Op::Lookup),
            2 => (idx.clone(), any::<i64>()).prop_map(|(i, d)| Op::Get(i, d)),
            1 => Just(Op::ToList),
            1 => Just(Op::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: request/response equivalence with a reference map.
// - put is always-overwrite and reports ok.
// - del reports Removed/NotFound in parity with model membership.
// - lookup returns found(copy)/not_found; get substitutes the default.
// - to_list is a complete snapshot; size tracks the model after each op.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_store_matches_model((pool, ops) in arb_scenario()) {
        let sut: Store<CloneAdapter<String>> =
            Store::new(CloneAdapter::new(), StoreOptions::shared());
        let mut model: HashMap<String, i64> = HashMap::new();

        for op in ops {
            match op {
                Op::Put(i, v) => {
                    sut.put(&pool[i], &v.to_string()).unwrap();
                    model.insert(pool[i].clone(), v);
                }
                Op::Del(i) => {
                    let outcome = sut.del(&pool[i]).unwrap();
                    let expected = if model.remove(&pool[i]).is_some() {
                        Removal::Removed
                    } else {
                        Removal::NotFound
                    };
                    prop_assert_eq!(outcome, expected);
                }
                Op::Lookup(i) => {
                    let outcome = sut.lookup(&pool[i]).unwrap();
                    let expected = match model.get(&pool[i]) {
                        Some(v) => Lookup::Found(v.to_string()),
                        None => Lookup::NotFound,
                    };
                    prop_assert_eq!(outcome, expected);
                }
                Op::Get(i, d) => {
                    let outcome = sut.get(&pool[i], d.to_string()).unwrap();
                    let expected = model
                        .get(&pool[i])
                        .map(|v| v.to_string())
                        .unwrap_or_else(|| d.to_string());
                    prop_assert_eq!(outcome, expected);
                }
                Op::ToList => {
                    let snap = sut.to_list().unwrap();
                    prop_assert_eq!(snap.len(), model.len());
                    let as_map: HashMap<String, String> = snap.into_iter().collect();
                    prop_assert_eq!(as_map.len(), model.len());
                    for (k, v) in &model {
                        prop_assert_eq!(as_map.get(k), Some(&v.to_string()));
                    }
                }
                Op::Clear => {
                    sut.clear().unwrap();
                    model.clear();
                }
            }
            prop_assert_eq!(sut.size().unwrap(), model.len());
        }
    }
}
