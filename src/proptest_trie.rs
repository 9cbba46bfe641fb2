use super::*;
use crate::byte_trie::tests::assert_well_formed;
use proptest::prelude::*;
use std::collections::HashMap;

fn short_key() -> impl Strategy<Value = Vec<u8>> {
    // A small alphabet keeps shared prefixes and prefix-of-prefix keys common.
    proptest::collection::vec(0u8..4, 0..6)
}

fn any_value() -> impl Strategy<Value = Vec<u8>> {
    proptest::collection::vec(any::<u8>(), 0..8)
}

#[derive(Debug, Clone)]
enum Operation {
    Insert(Vec<u8>, Vec<u8>),
    Remove(Vec<u8>),
    Get(Vec<u8>),
}

fn operation() -> impl Strategy<Value = Operation> {
    prop_oneof![
        3 => (short_key(), any_value()).prop_map(|(k, v)| Operation::Insert(k, v)),
        2 => short_key().prop_map(Operation::Remove),
        1 => short_key().prop_map(Operation::Get),
    ]
}

fn run_against_model<C: Children>(ops: &[Operation]) -> Result<(), TestCaseError> {
    let mut trie = ByteTrie::<C>::new();
    let mut model: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();

    for op in ops {
        match op {
            Operation::Insert(key, value) => {
                let result = trie.insert(key, value.clone());
                if key.is_empty() {
                    prop_assert_eq!(result, Err(Error::EmptyKey));
                } else {
                    prop_assert_eq!(result, Ok(()));
                    model.insert(key.clone(), value.clone());
                }
            }
            Operation::Remove(key) => {
                prop_assert_eq!(trie.remove(key), model.remove(key));
            }
            Operation::Get(key) => {
                prop_assert_eq!(trie.get(key), model.get(key).map(Vec::as_slice));
            }
        }
        prop_assert_eq!(trie.len(), model.len());
    }

    assert_well_formed(&trie);

    let mut pairs: Vec<(Vec<u8>, Vec<u8>)> =
        trie.iter().map(|(k, v)| (k, v.to_vec())).collect();
    pairs.sort();
    let mut expected: Vec<(Vec<u8>, Vec<u8>)> = model.into_iter().collect();
    expected.sort();
    prop_assert_eq!(pairs, expected);

    Ok(())
}

proptest! {
    #[test]
    fn prop_hash_trie_matches_hashmap(ops in proptest::collection::vec(operation(), 0..64)) {
        run_against_model::<HashChildren>(&ops)?;
    }

    #[test]
    fn prop_array_trie_matches_hashmap(ops in proptest::collection::vec(operation(), 0..64)) {
        run_against_model::<ArrayChildren>(&ops)?;
    }

    #[test]
    fn prop_insert_then_get(key in proptest::collection::vec(any::<u8>(), 1..32), value in any_value()) {
        let mut trie = HashTrie::new();
        trie.insert(&key, value.clone()).unwrap();
        prop_assert_eq!(trie.get(&key), Some(value.as_slice()));
    }

    #[test]
    fn prop_reinsert_keeps_node_count(
        keys in proptest::collection::vec(proptest::collection::vec(any::<u8>(), 1..12), 1..20),
    ) {
        let mut trie = ArrayTrie::new();
        for key in &keys {
            trie.insert(key, "v").unwrap();
        }
        let nodes = trie.node_count();
        let len = trie.len();

        for key in &keys {
            trie.insert(key, "v").unwrap();
        }
        prop_assert_eq!(trie.node_count(), nodes);
        prop_assert_eq!(trie.len(), len);
    }

    #[test]
    fn prop_removing_everything_frees_all_nodes(
        keys in proptest::collection::hash_set(proptest::collection::vec(0u8..8, 1..10), 1..40),
    ) {
        let mut trie = HashTrie::new();
        for key in &keys {
            trie.insert(key, key.clone()).unwrap();
        }
        for key in &keys {
            prop_assert_eq!(trie.remove(key), Some(key.clone()));
            assert_well_formed(&trie);
        }
        prop_assert!(trie.is_empty());
        prop_assert_eq!(trie.node_count(), 0);
    }

    #[test]
    fn prop_independent_keys_do_not_interfere(
        k1 in proptest::collection::vec(any::<u8>(), 1..8),
        k2 in proptest::collection::vec(any::<u8>(), 1..8),
    ) {
        prop_assume!(!k1.starts_with(&k2) && !k2.starts_with(&k1));

        let mut trie = HashTrie::new();
        trie.insert(&k2, "second").unwrap();

        trie.insert(&k1, "first").unwrap();
        prop_assert_eq!(trie.get(&k2), Some(&b"second"[..]));

        prop_assert_eq!(trie.remove(&k1), Some(b"first".to_vec()));
        prop_assert_eq!(trie.get(&k2), Some(&b"second"[..]));
        prop_assert_eq!(trie.node_count(), k2.len());
    }

    #[test]
    fn prop_prefix_iter_matches_filter(
        keys in proptest::collection::vec(proptest::collection::vec(0u8..3, 1..6), 0..30),
        prefix in proptest::collection::vec(0u8..3, 0..3),
    ) {
        let mut trie = ArrayTrie::new();
        for key in &keys {
            trie.insert(key, "v").unwrap();
        }

        let mut found: Vec<Vec<u8>> = trie.prefix_iter(&prefix).map(|(k, _)| k).collect();
        found.sort();
        let mut expected: Vec<Vec<u8>> = keys.iter().filter(|k| k.starts_with(&prefix)).cloned().collect();
        expected.sort();
        expected.dedup();

        prop_assert_eq!(trie.starts_with(&prefix), !expected.is_empty());
        prop_assert_eq!(found, expected);
    }
}
