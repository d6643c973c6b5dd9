use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

use crate::error::MapError;
use crate::mapping::{Entity, EntityDescriptor};

type Erased = Arc<dyn Any + Send + Sync>;

/// Cache of entity descriptors keyed by entity type.
///
/// Append-only: an entry is never replaced once stored. Descriptors are
/// built outside the lock; if two threads race on a miss, the first insert
/// wins and the other build is dropped.
#[derive(Debug)]
pub struct DescriptorCache {
    entries: RwLock<HashMap<TypeId, Erased>>,
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }
}

impl DescriptorCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached descriptor for `E`, building it on first use.
    ///
    /// A failed build is returned to the caller and not cached.
    pub fn get_or_describe<E: Entity>(&self) -> Result<Arc<EntityDescriptor<E>>, MapError> {
        if let Some(hit) = self.lookup::<E>() {
            return Ok(hit);
        }

        let built = Arc::new(E::describe()?);

        let mut guard = match self.entries.write() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("descriptor cache write lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        let id = TypeId::of::<E>();
        if let Some(existing) = guard.get(&id).cloned().and_then(downcast::<E>) {
            return Ok(existing);
        }
        guard.insert(id, built.clone());
        tracing::debug!(
            entity = built.entity_name(),
            fields = built.len(),
            "entity descriptor cached"
        );
        Ok(built)
    }

    pub fn contains<E: Entity>(&self) -> bool {
        self.lookup::<E>().is_some()
    }

    pub fn len(&self) -> usize {
        let guard = match self.entries.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("descriptor cache read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lookup<E: Entity>(&self) -> Option<Arc<EntityDescriptor<E>>> {
        let guard = match self.entries.read() {
            Ok(g) => g,
            Err(poisoned) => {
                tracing::warn!("descriptor cache read lock was poisoned, recovering");
                poisoned.into_inner()
            }
        };
        guard.get(&TypeId::of::<E>()).cloned().and_then(downcast::<E>)
    }
}

fn downcast<E: 'static>(entry: Erased) -> Option<Arc<EntityDescriptor<E>>> {
    entry.downcast::<EntityDescriptor<E>>().ok()
}

/// Process-wide descriptor cache.
pub fn global() -> &'static DescriptorCache {
    static CACHE: OnceLock<DescriptorCache> = OnceLock::new();
    CACHE.get_or_init(DescriptorCache::new)
}

/// Descriptor for `E` from the process-wide cache.
pub fn descriptor<E: Entity>() -> Result<Arc<EntityDescriptor<E>>, MapError> {
    global().get_or_describe::<E>()
}
