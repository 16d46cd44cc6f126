pub mod broadcast;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::Result;

pub use broadcast::Broadcast;

/// Partitioned collection
/// An ordered list of partitions, each one an ordered list of items.
/// Partitions are processed independently on the rayon pool; the only way
/// results meet is through `aggregate` (reduce) and `collect`.
///
/// Partition boundaries carry no meaning: every operation here keeps the
/// global item order, so concatenating the partitions always yields the
/// original sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Partitioned<T> {
    partitions: Vec<Vec<T>>,
}

/// Construction and inspection
impl<T> Partitioned<T> {
    /// Wrap partitions as they are
    pub fn from_partitions(partitions: Vec<Vec<T>>) -> Self {
        Self { partitions }
    }

    /// Whole collection as one partition (the single-node case)
    pub fn single(items: Vec<T>) -> Self {
        Self { partitions: vec![items] }
    }

    /// Split items into `num_partitions` contiguous partitions.
    /// Sizes differ by at most one, the first `len % num_partitions`
    /// partitions take the extra item. Asking for more partitions than
    /// items produces empty trailing partitions.
    ///
    /// # Arguments
    /// * `items` - items in global order
    /// * `num_partitions` - partition count, 0 is treated as 1
    pub fn split(items: Vec<T>, num_partitions: usize) -> Self {
        let num_partitions = num_partitions.max(1);
        let base = items.len() / num_partitions;
        let extra = items.len() % num_partitions;
        let mut rest = items.into_iter();
        let partitions = (0..num_partitions)
            .map(|i| {
                let size = base + usize::from(i < extra);
                rest.by_ref().take(size).collect()
            })
            .collect();
        Self { partitions }
    }

    #[inline]
    pub fn num_partitions(&self) -> usize {
        self.partitions.len()
    }

    /// Total item count over all partitions
    #[inline]
    pub fn count(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    #[inline]
    pub fn partitions(&self) -> &[Vec<T>] {
        &self.partitions
    }

    pub fn into_partitions(self) -> Vec<Vec<T>> {
        self.partitions
    }

    /// Items in global order
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.partitions.iter().flatten()
    }
}

/// Data-parallel operations
impl<T> Partitioned<T>
where
    T: Sync,
{
    /// Run `f` on every partition independently.
    /// Output partition `i` is `f(partition i)`.
    pub fn map_partitions<U, F>(&self, f: F) -> Partitioned<U>
    where
        U: Send,
        F: Fn(&[T]) -> Vec<U> + Sync + Send,
    {
        let partitions = self.partitions.par_iter().map(|p| f(p)).collect();
        Partitioned { partitions }
    }

    /// Fallible `map_partitions`.
    /// The first failing partition aborts the whole operation.
    pub fn try_map_partitions<U, F>(&self, f: F) -> Result<Partitioned<U>>
    where
        U: Send,
        F: Fn(&[T]) -> Result<Vec<U>> + Sync + Send,
    {
        let partitions = self
            .partitions
            .par_iter()
            .map(|p| f(p))
            .collect::<Result<Vec<_>>>()?;
        Ok(Partitioned { partitions })
    }

    /// Item-wise map that keeps the partition layout
    pub fn map<U, F>(&self, f: F) -> Partitioned<U>
    where
        U: Send,
        F: Fn(&T) -> U + Sync + Send,
    {
        self.map_partitions(|items| items.iter().map(&f).collect())
    }

    /// Fold every partition with `seq`, then combine the partials with `comb`.
    ///
    /// The combination tree is chosen by rayon and differs from run to run,
    /// so `comb` must be associative and commutative with `zero()` as its
    /// identity. Under that contract the result does not depend on the
    /// partitioning or on execution order.
    pub fn aggregate<A, Z, S, C>(&self, zero: Z, seq: S, comb: C) -> A
    where
        A: Send,
        Z: Fn() -> A + Sync + Send,
        S: Fn(&[T]) -> A + Sync + Send,
        C: Fn(A, A) -> A + Sync + Send,
    {
        self.partitions.par_iter().map(|p| seq(p)).reduce(zero, comb)
    }

    /// Fallible `aggregate`
    pub fn try_aggregate<A, Z, S, C>(&self, zero: Z, seq: S, comb: C) -> Result<A>
    where
        A: Send,
        Z: Fn() -> A + Sync + Send,
        S: Fn(&[T]) -> Result<A> + Sync + Send,
        C: Fn(A, A) -> Result<A> + Sync + Send,
    {
        self.partitions
            .par_iter()
            .map(|p| seq(p))
            .try_reduce(zero, comb)
    }
}

impl<T> Partitioned<T>
where
    T: Clone,
{
    /// Materialize every partition into one sequence, in global order
    pub fn collect(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}

impl<T> From<Vec<T>> for Partitioned<T> {
    fn from(items: Vec<T>) -> Self {
        Self::single(items)
    }
}
