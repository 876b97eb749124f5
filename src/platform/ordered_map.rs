//! Ordered-map capability used by the range index

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::ops::Bound;

/// A map whose iteration is in ascending key order and which supports
/// bounded range scans.
///
/// Implementations must never panic on an empty or inverted range; callers
/// validate bounds before scanning, but an implementation may also simply
/// return nothing.
pub trait OrderedMap<K: Ord, V>: Default + Debug + Send + Sync {
    fn get(&self, key: &K) -> Option<&V>;

    fn get_mut(&mut self, key: &K) -> Option<&mut V>;

    /// Value under `key`, inserting `V::default()` first when absent
    fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default;

    fn remove(&mut self, key: &K) -> Option<V>;

    fn range<'a>(
        &'a self,
        lower: Bound<&K>,
        upper: Bound<&K>,
    ) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>;

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a>;

    fn first(&self) -> Option<(&K, &V)>;

    fn last(&self) -> Option<(&K, &V)>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&mut self);
}

impl<K, V> OrderedMap<K, V> for BTreeMap<K, V>
where
    K: Ord + Debug + Send + Sync,
    V: Debug + Send + Sync,
{
    fn get(&self, key: &K) -> Option<&V> {
        BTreeMap::get(self, key)
    }

    fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        BTreeMap::get_mut(self, key)
    }

    fn get_or_insert_default(&mut self, key: K) -> &mut V
    where
        V: Default,
    {
        self.entry(key).or_default()
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        BTreeMap::remove(self, key)
    }

    fn range<'a>(
        &'a self,
        lower: Bound<&K>,
        upper: Bound<&K>,
    ) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        if is_empty_range(&lower, &upper) {
            return Box::new(std::iter::empty());
        }
        Box::new(BTreeMap::range::<K, _>(self, (lower, upper)))
    }

    fn iter<'a>(&'a self) -> Box<dyn Iterator<Item = (&'a K, &'a V)> + 'a> {
        Box::new(BTreeMap::iter(self))
    }

    fn first(&self) -> Option<(&K, &V)> {
        self.first_key_value()
    }

    fn last(&self) -> Option<(&K, &V)> {
        self.last_key_value()
    }

    fn len(&self) -> usize {
        BTreeMap::len(self)
    }

    fn clear(&mut self) {
        BTreeMap::clear(self)
    }
}

/// Ranges `BTreeMap::range` would panic on: start above end, or a single
/// point excluded on both sides.
fn is_empty_range<K: Ord>(lower: &Bound<&K>, upper: &Bound<&K>) -> bool {
    match (lower, upper) {
        (Bound::Included(lo) | Bound::Excluded(lo), Bound::Included(hi) | Bound::Excluded(hi)) => {
            match lo.cmp(hi) {
                std::cmp::Ordering::Greater => true,
                std::cmp::Ordering::Equal => {
                    matches!((lower, upper), (Bound::Excluded(_), Bound::Excluded(_)))
                }
                std::cmp::Ordering::Less => false,
            }
        }
        _ => false,
    }
}
