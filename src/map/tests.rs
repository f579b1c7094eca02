use std::collections::BTreeMap;

use proptest::prelude::*;
use rand::RngCore;

use super::*;
use crate::{height::tests::Scripted, Ascend, Descend};

/// Checks that every level is a sorted sub-chain of level 0 and that the
/// height matches the tallest node.
fn check<K, V, C, R>(m: &SkipMap<K, V, C, R>)
where
  C: Comparator<K>,
{
  let mut level0 = vec![];
  let mut cur = m.head[0];
  while let Some(id) = cur {
    level0.push(id);
    cur = m.nodes[id].forward[0];
  }
  assert_eq!(level0.len(), m.len);
  assert_eq!(m.nodes.len(), m.len);
  for w in level0.windows(2) {
    assert!(m.cmp.compare(&m.nodes[w[0]].key, &m.nodes[w[1]].key).is_lt());
  }

  let tallest = level0
    .iter()
    .map(|id| m.nodes[*id].forward.len())
    .max()
    .unwrap_or(1);
  assert_eq!(m.height, tallest);

  for lvl in 1..MAX_HEIGHT {
    let expected: Vec<_> = level0
      .iter()
      .copied()
      .filter(|id| m.nodes[*id].forward.len() > lvl)
      .collect();
    let mut got = vec![];
    let mut cur = m.head[lvl];
    while let Some(id) = cur {
      got.push(id);
      cur = m.nodes[id].forward[lvl];
    }
    assert_eq!(got, expected, "level {lvl}");
  }
}

fn seeded<K, V>() -> SkipMap<K, V, Ascend> {
  SkipMap::with_options(Options::new().with_seed(42), Ascend)
}

fn empty_in<R: RngCore>(m: SkipMap<&'static str, i32, Ascend, R>) {
  assert!(m.is_empty());
  assert!(m.first().is_none());
  assert!(m.last().is_none());
  assert!(m.get(&"apple").is_none());
  assert!(!m.contains_key(&"apple"));
  assert_eq!(m.iter().count(), 0);
  check(&m);
}

#[test]
fn test_empty() {
  empty_in(seeded());
  empty_in(SkipMap::with_rng(Ascend, Scripted::heights(&[1])));
}

#[test]
fn test_fruits() {
  let mut m = seeded();
  assert_eq!(m.put("apple", 1), None);
  assert_eq!(m.put("banana", 2), None);
  assert_eq!(m.put("cherry", 3), None);
  check(&m);
  assert_eq!(m.get(&"banana"), Some(&2));

  assert_eq!(m.put("banana", 4), Some(2));
  assert_eq!(m.get(&"banana"), Some(&4));
  assert_eq!(m.len(), 3);

  assert_eq!(m.remove(&"apple"), Some(1));
  assert!(m.get(&"apple").is_none());
  assert_eq!(m.len(), 2);
  check(&m);

  assert_eq!(m.remove(&"apple"), None);
  assert_eq!(m.len(), 2);
}

#[test]
fn test_first_last() {
  let mut m = seeded();
  for i in [5, 3, 8, 1, 9, 7] {
    m.put(i, i * 10);
  }
  assert_eq!(m.first(), Some((&1, &10)));
  assert_eq!(m.last(), Some((&9, &90)));

  m.remove(&9);
  m.remove(&1);
  assert_eq!(m.first(), Some((&3, &30)));
  assert_eq!(m.last(), Some((&8, &80)));
}

#[test]
fn test_get_mut() {
  let mut m = seeded();
  m.put("k".to_string(), vec![1]);
  m.get_mut(&"k".to_string()).unwrap().push(2);
  assert_eq!(m.get(&"k".to_string()), Some(&vec![1, 2]));
  assert!(m.get_mut(&"missing".to_string()).is_none());
}

#[test]
fn test_scripted_heights() {
  let mut m = SkipMap::with_rng(Ascend, Scripted::heights(&[1, 6, 2, 1]));
  for i in 0..4 {
    m.put(i, ());
  }
  assert_eq!(m.height(), 6);
  check(&m);

  m.remove(&1);
  assert_eq!(m.height(), 2);
  check(&m);

  // Overwrites do not draw a height.
  m.put(0, ());
  m.put(10, ());
  assert_eq!(m.nodes[m.find_node(&10).unwrap()].forward.len(), 1);
  check(&m);
}

#[test]
fn test_descend_iter() {
  let mut m = SkipMap::with_options(Options::new().with_seed(3), Descend);
  for i in 0..10u32 {
    m.put(i, i.to_string());
  }
  check(&m);
  let keys: Vec<_> = m.iter().map(|(k, _)| *k).collect();
  assert_eq!(keys, (0..10).rev().collect::<Vec<_>>());
  assert_eq!(m.iter().len(), 10);
  assert_eq!(m.first().map(|(k, _)| *k), Some(9));
  assert_eq!(m.last().map(|(k, _)| *k), Some(0));
}

#[test]
fn test_put_after_remove_reuses_keys() {
  let mut m = seeded();
  for i in 0..16u32 {
    m.put(i, i);
  }
  for i in (0..16).step_by(2) {
    assert_eq!(m.remove(&i), Some(i));
  }
  for i in 100..108u32 {
    m.put(i, i);
  }
  check(&m);
  assert_eq!(m.len(), 16);
  assert!(m.nodes.iter().all(|(key, _)| key < 16));
  for (k, v) in &m {
    assert_eq!(m.get(k), Some(v));
  }
}

#[test]
fn test_clear_and_debug() {
  let mut m = seeded();
  m.put(2, "b");
  m.put(1, "a");
  assert_eq!(format!("{m:?}"), r#"{1: "a", 2: "b"}"#);

  m.clear();
  check(&m);
  assert!(m.is_empty());
  assert_eq!(format!("{m:?}"), "{}");

  m.put(3, "c");
  assert_eq!((&m).into_iter().count(), 1);
}

#[derive(Debug, Clone)]
enum Op {
  Put(u8, u32),
  Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
  prop_oneof![
    3 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
    2 => any::<u8>().prop_map(Op::Remove),
  ]
}

proptest! {
  #[test]
  fn test_matches_btreemap(seed in any::<u64>(), ops in proptest::collection::vec(op(), 1..300)) {
    let mut m = SkipMap::with_options(Options::new().with_seed(seed), Ascend);
    let mut model = BTreeMap::new();

    for op in ops {
      match op {
        Op::Put(k, v) => prop_assert_eq!(m.put(k, v), model.insert(k, v)),
        Op::Remove(k) => prop_assert_eq!(m.remove(&k), model.remove(&k)),
      }
    }

    check(&m);
    prop_assert_eq!(m.len(), model.len());
    prop_assert!(m.iter().eq(model.iter()));
    prop_assert_eq!(m.first(), model.first_key_value());
    prop_assert_eq!(m.last(), model.last_key_value());
  }
}
