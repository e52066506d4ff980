//! Cache of field tables, one per struct type.
//!
//! Tables are built on first use and kept for the life of the cache. Lookups
//! take a shared lock; a miss builds the table without holding any lock and
//! then inserts it unless another thread got there first, in which case the
//! table already published is returned and the fresh one discarded.

use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

use parking_lot::RwLock;
use urldecode_core::{ConstTypeId, Shape};

use crate::{FieldTable, TypeError};

/// Field tables keyed by the identity of the struct they describe.
#[derive(Debug, Default)]
pub struct FieldCache {
    tables: RwLock<HashMap<ConstTypeId, Arc<FieldTable>>>,
}

static GLOBAL: LazyLock<FieldCache> = LazyLock::new(FieldCache::new);

impl FieldCache {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide cache, used unless a decoder is given its own.
    pub fn global() -> &'static FieldCache {
        &GLOBAL
    }

    /// Returns the table for `shape`, building it if needed.
    ///
    /// Fails if `shape` is not a struct; nothing is cached in that case.
    pub fn table_for(&self, shape: &'static Shape) -> Result<Arc<FieldTable>, TypeError> {
        // Fast path: shared lock only
        if let Some(table) = self.tables.read().get(&shape.id) {
            return Ok(Arc::clone(table));
        }

        trace!(shape = shape.type_name(), "field table cache miss");
        let built = Arc::new(FieldTable::build(shape)?);

        let mut tables = self.tables.write();
        Ok(Arc::clone(tables.entry(shape.id).or_insert(built)))
    }

    /// Number of tables built so far.
    pub fn len(&self) -> usize {
        self.tables.read().len()
    }

    /// Returns true if no table was built yet.
    pub fn is_empty(&self) -> bool {
        self.tables.read().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Shaped;

    #[derive(Shaped)]
    struct Point {
        pub x: i32,
        pub y: i32,
    }

    #[test]
    fn repeated_lookups_share_the_table() {
        let cache = FieldCache::new();
        assert!(cache.is_empty());
        let first = cache.table_for(Point::SHAPE).unwrap();
        let second = cache.table_for(Point::SHAPE).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn non_structs_are_not_cached() {
        let cache = FieldCache::new();
        assert!(cache.table_for(u8::SHAPE).is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn concurrent_builds_publish_one_table() {
        let cache = FieldCache::new();
        let tables: Vec<Arc<FieldTable>> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| cache.table_for(Point::SHAPE).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });
        let published = cache.table_for(Point::SHAPE).unwrap();
        assert_eq!(cache.len(), 1);
        for table in &tables {
            assert!(Arc::ptr_eq(table, &published));
        }
    }
}
