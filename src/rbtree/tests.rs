use std::collections::BTreeMap;

use proptest::prelude::*;

use super::*;
use crate::{Ascend, Descend};

/// Validates parent links, search order and the red-black colouring, and
/// returns the black height of the tree.
fn check<K, V, C>(t: &RbTreeMap<K, V, C>) -> usize
where
  K: fmt::Debug,
  C: Comparator<K>,
{
  fn walk<K: fmt::Debug, V, C: Comparator<K>>(
    t: &RbTreeMap<K, V, C>,
    id: Option<NodeId>,
    parent: Option<NodeId>,
    count: &mut usize,
  ) -> usize {
    let Some(id) = id else {
      return 1;
    };
    *count += 1;
    let node = &t.nodes[id];
    assert_eq!(node.parent, parent, "parent link of {:?}", node.key);
    if node.color == Color::Red {
      assert!(!t.is_red(node.left), "red {:?} has a red left child", node.key);
      assert!(!t.is_red(node.right), "red {:?} has a red right child", node.key);
    }
    if let Some(l) = node.left {
      assert!(t.cmp.compare(&t.nodes[l].key, &node.key).is_lt());
    }
    if let Some(r) = node.right {
      assert!(t.cmp.compare(&t.nodes[r].key, &node.key).is_gt());
    }

    let lh = walk(t, node.left, Some(id), count);
    let rh = walk(t, node.right, Some(id), count);
    assert_eq!(lh, rh, "black height differs under {:?}", node.key);
    lh + (node.color == Color::Black) as usize
  }

  assert!(!t.is_red(t.root), "red root");
  let mut count = 0;
  let bh = walk(t, t.root, None, &mut count);
  assert_eq!(count, t.len);
  assert_eq!(t.nodes.len(), t.len);

  let keys: Vec<_> = t.iter().map(|(k, _)| k).collect();
  for w in keys.windows(2) {
    assert!(t.cmp.compare(w[0], w[1]).is_lt());
  }
  bh
}

#[test]
fn test_empty() {
  let mut t = RbTreeMap::<i32, i32, _>::new(Ascend);
  assert!(t.is_empty());
  assert!(t.first().is_none());
  assert!(t.last().is_none());
  assert!(t.get(&1).is_none());
  assert!(t.remove(&1).is_none());
  assert_eq!(t.iter().next(), None);
  assert_eq!(t.iter().next_back(), None);
  assert_eq!(check(&t), 1);
}

#[test]
fn test_put_get() {
  let mut t = RbTreeMap::new(Ascend);
  for i in 0..100 {
    assert_eq!(t.put(i, i * 2), None);
    check(&t);
  }
  assert_eq!(t.len(), 100);
  for i in 0..100 {
    assert_eq!(t.get(&i), Some(&(i * 2)));
  }
  assert_eq!(t.put(50, 0), Some(100));
  assert_eq!(t.len(), 100);
  assert!(!t.contains_key(&100));
}

#[test]
fn test_sequential_insert_is_balanced() {
  let mut t = RbTreeMap::new(Ascend);
  for i in 0..1024 {
    t.put(i, ());
  }
  // A red-black tree of n nodes is at most 2 * log2(n + 1) high.
  fn depth<K, V, C>(t: &RbTreeMap<K, V, C>, id: Option<NodeId>) -> usize {
    id.map_or(0, |id| {
      1 + depth(t, t.nodes[id].left).max(depth(t, t.nodes[id].right))
    })
  }
  assert!(depth(&t, t.root) <= 20);
  check(&t);
}

#[test]
fn test_try_insert_update() {
  let mut t = RbTreeMap::new(Ascend);
  *t.try_insert("a", 1).unwrap() += 10;
  assert_eq!(t.get(&"a"), Some(&11));
  assert_eq!(t.try_insert("a", 2).unwrap_err(), Error::Duplicated);
  assert_eq!(t.get(&"a"), Some(&11));
  assert_eq!(t.len(), 1);

  assert_eq!(t.update(&"a", 3), Ok(11));
  assert_eq!(t.update(&"b", 3), Err(Error::NotFound));
  assert_eq!(t.len(), 1);
  check(&t);
}

#[test]
fn test_remove() {
  let mut t = RbTreeMap::new(Ascend);
  for i in [50, 20, 80, 10, 30, 70, 90, 25, 35, 75] {
    t.put(i, i.to_string());
  }
  check(&t);

  // Leaf, single child, two children and the root.
  for k in [10, 70, 20, 50] {
    assert_eq!(t.remove(&k), Some(k.to_string()));
    assert!(!t.contains_key(&k));
    check(&t);
  }
  assert_eq!(t.remove(&50), None);
  let keys: Vec<_> = t.iter().map(|(k, _)| *k).collect();
  assert_eq!(keys, [25, 30, 35, 75, 80, 90]);

  for k in keys {
    t.remove(&k);
    check(&t);
  }
  assert!(t.is_empty());
  assert!(t.root.is_none());
}

#[test]
fn test_removed_nodes_free_their_keys() {
  let mut t = RbTreeMap::with_capacity(32, Ascend);
  for round in 0..4 {
    for i in 0..32 {
      t.put(i, round);
    }
    check(&t);
    for i in (0..32).rev() {
      assert_eq!(t.remove(&i), Some(round));
    }
    assert!(t.nodes.is_empty());
  }
  // Four rounds of 32 entries never need more than 32 keys.
  t.put(0, 0);
  assert!(t.nodes.iter().all(|(key, _)| key < 32));
}

#[test]
fn test_first_last_iter() {
  let mut t = RbTreeMap::new(Descend);
  for i in [3, 9, 1, 7, 5] {
    t.put(i, ());
  }
  assert_eq!(t.first().map(|(k, _)| *k), Some(9));
  assert_eq!(t.last().map(|(k, _)| *k), Some(1));

  let mut iter = t.iter();
  assert_eq!(iter.len(), 5);
  assert_eq!(iter.next().map(|(k, _)| *k), Some(9));
  assert_eq!(iter.next_back().map(|(k, _)| *k), Some(1));
  let rest: Vec<_> = iter.map(|(k, _)| *k).collect();
  assert_eq!(rest, [7, 5, 3]);

  let rev: Vec<_> = t.iter().rev().map(|(k, _)| *k).collect();
  assert_eq!(rev, [1, 3, 5, 7, 9]);
}

#[test]
fn test_get_mut_clear_debug() {
  let mut t = RbTreeMap::new(Ascend);
  t.put(2, "b".to_string());
  t.put(1, "a".to_string());
  t.get_mut(&1).unwrap().push('!');
  assert_eq!(format!("{t:?}"), r#"{1: "a!", 2: "b"}"#);

  t.clear();
  assert!(t.is_empty());
  assert_eq!(format!("{t:?}"), "{}");
  t.put(3, "c".to_string());
  assert_eq!((&t).into_iter().count(), 1);
  check(&t);
}

#[derive(Debug, Clone)]
enum Op {
  Put(u8, u32),
  TryInsert(u8, u32),
  Update(u8, u32),
  Remove(u8),
}

fn op() -> impl Strategy<Value = Op> {
  prop_oneof![
    3 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| Op::Put(k, v)),
    1 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| Op::TryInsert(k, v)),
    1 => (any::<u8>(), any::<u32>()).prop_map(|(k, v)| Op::Update(k, v)),
    3 => any::<u8>().prop_map(Op::Remove),
  ]
}

proptest! {
  #[test]
  fn test_matches_btreemap(ops in proptest::collection::vec(op(), 1..300)) {
    let mut t = RbTreeMap::new(Ascend);
    let mut model = BTreeMap::new();

    for op in ops {
      match op {
        Op::Put(k, v) => prop_assert_eq!(t.put(k, v), model.insert(k, v)),
        Op::TryInsert(k, v) => {
          let expected = if model.contains_key(&k) {
            Err(Error::Duplicated)
          } else {
            model.insert(k, v);
            Ok(v)
          };
          prop_assert_eq!(t.try_insert(k, v).map(|v| *v), expected);
        }
        Op::Update(k, v) => {
          let expected = model.get_mut(&k).map(|old| mem::replace(old, v)).ok_or(Error::NotFound);
          prop_assert_eq!(t.update(&k, v), expected);
        }
        Op::Remove(k) => prop_assert_eq!(t.remove(&k), model.remove(&k)),
      }
      check(&t);
    }

    prop_assert_eq!(t.len(), model.len());
    prop_assert!(t.iter().eq(model.iter()));
    prop_assert!(t.iter().rev().eq(model.iter().rev()));
    prop_assert_eq!(t.first(), model.first_key_value());
    prop_assert_eq!(t.last(), model.last_key_value());
  }
}
