use super::*;

use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, HashMap};
use std::convert::Infallible;

fn validate_tree<V>(t: &Trie<V>) {
    let issues = t.check_integrity();
    assert!(issues.is_empty(), "integrity issues: {:#?}", issues);
}

#[derive(Clone, Debug)]
enum Op {
    Insert(Vec<u8>, u64),
    Set(Vec<u8>, u64),
    Delete(Vec<u8>),
    DeleteSubtree(Vec<u8>),
    Get(Vec<u8>),
}

fn key_strategy() -> impl Strategy<Value = Vec<u8>> + Clone {
    // A small alphabet with both cases and a non-alphabet byte forces shared
    // prefixes, splits and merges.
    let byte = prop::sample::select(vec![b'a', b'b', b'A', b'B', b'0', b'.', b' ']);
    prop::collection::vec(byte, 0..=8)
}

fn ops_strategy() -> impl Strategy<Value = Vec<Op>> {
    let key = key_strategy();
    let op = prop_oneof![
        40 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Insert(k, v)),
        10 => (key.clone(), any::<u64>()).prop_map(|(k, v)| Op::Set(k, v)),
        30 => key.clone().prop_map(Op::Delete),
        2 => key.clone().prop_map(Op::DeleteSubtree),
        18 => key.clone().prop_map(Op::Get),
    ];
    prop::collection::vec(op, 0..=300)
}

fn sparse_limit_strategy() -> impl Strategy<Value = usize> {
    prop_oneof![Just(1usize), Just(2), Just(8), Just(256)]
}

fn fold(bytes: &[u8], ci: bool) -> Vec<u8> {
    if ci {
        bytes.to_ascii_lowercase()
    } else {
        bytes.to_vec()
    }
}

fn naive_substring(key: &[u8], query: &[u8], ci: bool) -> bool {
    let (key, query) = (fold(key, ci), fold(query, ci));
    query.is_empty() || key.windows(query.len()).any(|w| w == query.as_slice())
}

fn naive_fuzzy(key: &[u8], query: &[u8], ci: bool) -> Option<usize> {
    let (key, query) = (fold(key, ci), fold(query, ci));
    let mut pos = 0;
    let mut last: Option<usize> = None;
    let mut skipped = 0;
    for &q in &query {
        let offset = key[pos..].iter().position(|&b| b == q)?;
        let at = pos + offset;
        if let Some(last) = last {
            skipped += at - last - 1;
        }
        last = Some(at);
        pos = at + 1;
    }
    Some(skipped)
}

fn naive_prefix(key: &[u8], query: &[u8], ci: bool) -> bool {
    query.len() >= key.len() && fold(&query[..key.len()], ci) == fold(key, ci)
}

fn build(limit: usize, keys: &[Vec<u8>]) -> (Trie<u64>, BTreeMap<Vec<u8>, u64>) {
    let cfg = TrieConfig {
        max_children_per_sparse_node: limit,
    };
    let mut t = Trie::with_config(cfg).expect("valid config");
    let mut m = BTreeMap::new();
    for (i, k) in keys.iter().enumerate() {
        assert_eq!(t.insert(k, i as u64), !m.contains_key(k));
        m.entry(k.clone()).or_insert(i as u64);
    }
    (t, m)
}

fn get_and_delete(t: &mut Trie<Vec<u8>>, k: &[u8], v: &[u8]) {
    assert_eq!(t.get(k).map(Vec::as_slice), Some(v), "item not found, key={:?}", k);
    assert!(t.delete(k), "delete failed, key={:?}", k);
    assert_eq!(t.get(k), None);
    assert!(!t.delete(k), "extra delete succeeded, key={:?}", k);
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        max_shrink_iters: 50_000,
        .. ProptestConfig::default()
    })]

    #[test]
    fn prop_equivalence(limit in sparse_limit_strategy(), ops in ops_strategy()) {
        let cfg = TrieConfig { max_children_per_sparse_node: limit };
        let mut t: Trie<u64> = Trie::with_config(cfg).expect("valid config");
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let expected = !m.contains_key(&key);
                    prop_assert_eq!(t.insert(&key, value), expected);
                    m.entry(key).or_insert(value);
                }
                Op::Set(key, value) => {
                    let old_t = t.set(&key, value);
                    let old_m = m.insert(key, value);
                    prop_assert_eq!(old_t, old_m);
                }
                Op::Delete(key) => {
                    let expected = m.remove(&key).is_some();
                    prop_assert_eq!(t.delete(&key), expected);
                    prop_assert_eq!(t.get(&key), None);
                    prop_assert!(!t.delete(&key));
                }
                Op::DeleteSubtree(prefix) => {
                    let doomed: Vec<Vec<u8>> =
                        m.keys().filter(|k| k.starts_with(&prefix)).cloned().collect();
                    for k in &doomed {
                        m.remove(k);
                    }
                    prop_assert_eq!(t.delete_subtree(&prefix), !doomed.is_empty());
                }
                Op::Get(key) => {
                    prop_assert_eq!(t.get(&key).copied(), m.get(&key).copied());
                }
            }

            prop_assert_eq!(t.len(), m.len());
            validate_tree(&t);
        }

        let mut got: Vec<(Vec<u8>, u64)> = Vec::new();
        t.visit(|k, v| {
            got.push((k.to_vec(), *v));
            Ok::<_, Infallible>(Walk::Continue)
        }).unwrap();
        let expected: Vec<(Vec<u8>, u64)> = m.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_searches_match_naive_scan(
        limit in sparse_limit_strategy(),
        keys in prop::collection::vec(key_strategy(), 0..=60),
        query in key_strategy(),
        ci in any::<bool>(),
    ) {
        let (t, m) = build(limit, &keys);

        let mut substring: Vec<Vec<u8>> = Vec::new();
        t.visit_substring(&query, ci, |k, v| {
            assert_eq!(m.get(k), Some(v));
            substring.push(k.to_vec());
            Ok::<_, Infallible>(())
        }).unwrap();
        substring.sort();
        let expected: Vec<Vec<u8>> =
            m.keys().filter(|k| naive_substring(k, &query, ci)).cloned().collect();
        prop_assert_eq!(substring, expected);

        let mut fuzzy: BTreeMap<Vec<u8>, usize> = BTreeMap::new();
        t.visit_fuzzy(&query, ci, |k, _, skipped| {
            assert!(fuzzy.insert(k.to_vec(), skipped).is_none());
            Ok::<_, Infallible>(())
        }).unwrap();
        let expected: BTreeMap<Vec<u8>, usize> = m
            .keys()
            .filter_map(|k| naive_fuzzy(k, &query, ci).map(|s| (k.clone(), s)))
            .collect();
        prop_assert_eq!(fuzzy, expected);

        let mut prefixes: Vec<Vec<u8>> = Vec::new();
        t.visit_prefixes(&query, ci, |k, _| {
            prefixes.push(k.to_vec());
            Ok::<_, Infallible>(())
        }).unwrap();
        // Along any single path keys come shortest first.
        if !ci {
            prop_assert!(prefixes.windows(2).all(|w| w[0].len() < w[1].len()));
        }
        prefixes.sort();
        let expected: Vec<Vec<u8>> =
            m.keys().filter(|k| naive_prefix(k, &query, ci)).cloned().collect();
        prop_assert_eq!(prefixes, expected);
    }
}

fn for_each_permutation<T: Clone>(items: &[T], mut f: impl FnMut(Vec<T>)) {
    fn rec<T: Clone>(items: &[T], used: &mut [bool], out: &mut Vec<T>, f: &mut impl FnMut(Vec<T>)) {
        if out.len() == items.len() {
            f(out.clone());
            return;
        }
        for i in 0..items.len() {
            if used[i] {
                continue;
            }
            used[i] = true;
            out.push(items[i].clone());
            rec(items, used, out, f);
            out.pop();
            used[i] = false;
        }
    }

    let mut used = vec![false; items.len()];
    let mut out = Vec::with_capacity(items.len());
    rec(items, &mut used, &mut out, &mut f);
}

fn small_keys() -> Vec<Vec<u8>> {
    vec![
        b"a".to_vec(),
        b"b".to_vec(),
        b"".to_vec(),
        b"aa".to_vec(),
        b"ab".to_vec(),
        b"aab".to_vec(),
    ]
}

#[test]
fn exhaustive_insert_order_small_set() {
    let keys = small_keys();

    for_each_permutation(&keys, |perm| {
        let mut t: Trie<u64> = Trie::new();
        let mut m: BTreeMap<Vec<u8>, u64> = BTreeMap::new();

        for (i, k) in perm.into_iter().enumerate() {
            let v = i as u64;
            assert!(t.insert(&k, v));
            m.insert(k, v);
        }

        validate_tree(&t);
        for (k, v) in &m {
            assert_eq!(t.get(k), Some(v));
        }
        assert_eq!(t.stats().nodes, 6);
    });
}

#[test]
fn exhaustive_delete_order_small_set() {
    let keys = small_keys();

    // Insert in a fixed order, then delete in all permutations.
    let mut base: Trie<u64> = Trie::new();
    for (i, k) in keys.iter().enumerate() {
        assert!(base.insert(k, i as u64));
    }

    for_each_permutation(&keys, |perm| {
        let mut t = base.clone();
        let mut remaining = keys.len();

        for k in perm {
            assert!(t.delete(&k));
            assert!(!t.delete(&k));
            assert_eq!(t.get(&k), None);
            remaining -= 1;
            assert_eq!(t.len(), remaining);
            validate_tree(&t);
        }
        assert!(t.is_empty());
        assert_eq!(t.stats().nodes, 1);
        assert_eq!(t.root.mask, 0);
    });
}

#[test]
fn random_kitchen_sink() {
    let _ = env_logger::builder().is_test(true).try_init();

    const COUNT: usize = 20_000;
    const SIZE: usize = 16;
    let mut rng = StdRng::seed_from_u64(0x9a7c_1c1a);
    let bytes: Vec<u8> = (0..COUNT + SIZE + 1).map(|_| rng.gen()).collect();

    let mut m: HashMap<Vec<u8>, Vec<u8>> = HashMap::new();
    for i in 0..COUNT {
        m.insert(bytes[i..i + SIZE].to_vec(), bytes[i + 1..i + SIZE + 1].to_vec());
    }

    let mut t: Trie<Vec<u8>> = Trie::new();

    let mut kept = Vec::new();
    for (k, v) in &m {
        assert!(t.insert(k, v.clone()), "insert failed, key={:?}", k);
        if k[SIZE / 2] < 128 {
            get_and_delete(&mut t, k, v);
        } else {
            kept.push((k, v));
        }
    }
    validate_tree(&t);
    assert_eq!(t.len(), kept.len());

    for (k, v) in kept {
        get_and_delete(&mut t, k, v);
    }
    assert!(t.is_empty());
    validate_tree(&t);
}
