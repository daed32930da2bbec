//! Weak-reference object cache
//!
//! Objects are grouped by their cache ID. The cache only holds weak
//! references: once the last strong reference to an object is dropped it
//! disappears from lookups, and its slot is pruned on the next lookup of
//! that ID.

use std::any::Any;
use std::sync::{Arc, LazyLock, Weak};

use dashmap::DashMap;
use serde_json::{Map, Value};

use crate::error::CacheError;

/// Upcast an `Arc` to `Arc<dyn Any>` for downcasting cached objects.
pub trait AsAnyArc {
    /// Convert into an `Arc<dyn Any>`.
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync>;
}

impl<T: Any + Send + Sync> AsAnyArc for T {
    fn as_any_arc(self: Arc<Self>) -> Arc<dyn Any + Send + Sync> {
        self
    }
}

/// Objects that can be stored in an [`ObjectCache`].
pub trait Cached: AsAnyArc + Send + Sync {
    /// The ID the object is cached under. Objects without one are not cached.
    fn cache_id(&self) -> Option<String>;

    /// The value of a named attribute, used to filter lookups.
    fn cache_attribute(&self, name: &str) -> Option<Value>;
}

/// Lookup criteria: attribute name and expected value pairs
pub type Criteria<'a> = [(&'a str, Value)];

fn render_criteria(criteria: &Criteria<'_>) -> String {
    let map: Map<String, Value> = criteria
        .iter()
        .map(|(k, v)| (k.to_string(), v.clone()))
        .collect();
    Value::Object(map).to_string()
}

fn matches(obj: &dyn Cached, criteria: &Criteria<'_>) -> bool {
    criteria
        .iter()
        .all(|(name, expected)| obj.cache_attribute(name).as_ref() == Some(expected))
}

/// A cache of weakly held objects grouped by ID.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use mixbox::cache::{Cached, ObjectCache};
///
/// struct Doc(String);
///
/// impl Cached for Doc {
///     fn cache_id(&self) -> Option<String> {
///         Some(self.0.clone())
///     }
///     fn cache_attribute(&self, _name: &str) -> Option<serde_json::Value> {
///         None
///     }
/// }
///
/// let cache = ObjectCache::new();
/// let doc = Arc::new(Doc("example:doc-1".into()));
/// cache.insert(&doc);
/// assert_eq!(cache.count("example:doc-1"), 1);
///
/// drop(doc);
/// assert_eq!(cache.count("example:doc-1"), 0);
/// ```
#[derive(Default)]
pub struct ObjectCache {
    groups: DashMap<String, Vec<Weak<dyn Cached>>>,
}

impl ObjectCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object under its cache ID. Objects without an ID are ignored.
    pub fn insert<T: Cached + 'static>(&self, obj: &Arc<T>) {
        let Some(id) = obj.cache_id() else {
            return;
        };
        let obj: Arc<dyn Cached> = obj.clone();
        self.groups.entry(id).or_default().push(Arc::downgrade(&obj));
    }

    /// Remove an object from the cache.
    pub fn remove<T: Cached + 'static>(&self, obj: &Arc<T>) {
        let Some(id) = obj.cache_id() else {
            return;
        };
        self.remove_from(&id, obj);
    }

    fn remove_from<T: Cached + 'static>(&self, id: &str, obj: &Arc<T>) {
        let target = Arc::as_ptr(obj) as *const ();
        let mut now_empty = false;
        if let Some(mut group) = self.groups.get_mut(id) {
            group.retain(|weak| weak.as_ptr() as *const () != target);
            now_empty = group.is_empty();
        }
        if now_empty {
            self.groups.remove(id);
        }
    }

    /// Move an object whose ID changed from `old_id` to its current ID.
    pub fn update<T: Cached + 'static>(&self, obj: &Arc<T>, old_id: Option<&str>) {
        if let Some(old_id) = old_id {
            self.remove_from(old_id, obj);
        }
        self.insert(obj);
    }

    /// Every live object cached under `id` matching all `criteria`.
    ///
    /// Dead references found along the way are pruned.
    pub fn get_all(&self, id: &str, criteria: &Criteria<'_>) -> Vec<Arc<dyn Cached>> {
        let mut found = Vec::new();
        let mut now_empty = false;

        if let Some(mut group) = self.groups.get_mut(id) {
            let before = group.len();
            group.retain(|weak| weak.strong_count() > 0);
            if group.len() != before {
                tracing::debug!(id, pruned = before - group.len(), "pruned dead cache entries");
            }
            now_empty = group.is_empty();

            found.extend(
                group
                    .iter()
                    .filter_map(Weak::upgrade)
                    .filter(|obj| matches(obj.as_ref(), criteria)),
            );
        }
        if now_empty {
            self.groups.remove(id);
        }
        found
    }

    /// The single live object cached under `id` matching `criteria`.
    ///
    /// # Errors
    ///
    /// - `Miss` if nothing matches
    /// - `MultipleCached` if more than one object matches
    pub fn get(&self, id: &str, criteria: &Criteria<'_>) -> Result<Arc<dyn Cached>, CacheError> {
        let mut found = self.get_all(id, criteria);
        match found.len() {
            0 => Err(CacheError::Miss {
                id: id.to_string(),
                criteria: render_criteria(criteria),
            }),
            1 => Ok(found.remove(0)),
            _ => Err(CacheError::MultipleCached {
                id: id.to_string(),
                criteria: render_criteria(criteria),
            }),
        }
    }

    /// Like [`get_all`](Self::get_all), keeping only objects of type `T`.
    pub fn get_all_of<T: Cached + 'static>(&self, id: &str, criteria: &Criteria<'_>) -> Vec<Arc<T>> {
        self.get_all(id, criteria)
            .into_iter()
            .filter_map(|obj| obj.as_any_arc().downcast::<T>().ok())
            .collect()
    }

    /// Like [`get`](Self::get), keeping only objects of type `T`.
    pub fn get_of<T: Cached + 'static>(
        &self,
        id: &str,
        criteria: &Criteria<'_>,
    ) -> Result<Arc<T>, CacheError> {
        let mut found = self.get_all_of::<T>(id, criteria);
        match found.len() {
            0 => Err(CacheError::Miss {
                id: id.to_string(),
                criteria: render_criteria(criteria),
            }),
            1 => Ok(found.remove(0)),
            _ => Err(CacheError::MultipleCached {
                id: id.to_string(),
                criteria: render_criteria(criteria),
            }),
        }
    }

    /// Like [`get_of`](Self::get_of), with a miss giving `None`.
    pub fn try_get_of<T: Cached + 'static>(
        &self,
        id: &str,
        criteria: &Criteria<'_>,
    ) -> Result<Option<Arc<T>>, CacheError> {
        match self.get_of(id, criteria) {
            Ok(obj) => Ok(Some(obj)),
            Err(CacheError::Miss { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Number of live objects cached under `id`
    pub fn count(&self, id: &str) -> usize {
        self.get_all(id, &[]).len()
    }

    /// Whether a live object is cached under `id`
    pub fn contains(&self, id: &str) -> bool {
        self.count(id) > 0
    }

    /// Drop every entry.
    pub fn clear(&self) {
        self.groups.clear();
    }
}

impl std::fmt::Debug for ObjectCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCache")
            .field("ids", &self.groups.len())
            .finish()
    }
}

// ═══════════════════════════════════════════════════════════════════════
// Process-wide Cache
// ═══════════════════════════════════════════════════════════════════════

static GLOBAL_CACHE: LazyLock<ObjectCache> = LazyLock::new(ObjectCache::new);

/// The process-wide cache
pub fn global() -> &'static ObjectCache {
    &GLOBAL_CACHE
}

/// Add an object to the process-wide cache.
pub fn insert<T: Cached + 'static>(obj: &Arc<T>) {
    GLOBAL_CACHE.insert(obj);
}

/// Remove an object from the process-wide cache.
pub fn remove<T: Cached + 'static>(obj: &Arc<T>) {
    GLOBAL_CACHE.remove(obj);
}

/// Re-file an object in the process-wide cache after its ID changed.
pub fn update<T: Cached + 'static>(obj: &Arc<T>, old_id: Option<&str>) {
    GLOBAL_CACHE.update(obj, old_id);
}

/// Look up one object of type `T` in the process-wide cache.
pub fn get<T: Cached + 'static>(id: &str, criteria: &Criteria<'_>) -> Result<Arc<T>, CacheError> {
    GLOBAL_CACHE.get_of(id, criteria)
}

/// Look up every object of type `T` in the process-wide cache.
pub fn get_all<T: Cached + 'static>(id: &str, criteria: &Criteria<'_>) -> Vec<Arc<T>> {
    GLOBAL_CACHE.get_all_of(id, criteria)
}

/// Whether the process-wide cache has a live object under `id`
pub fn contains(id: &str) -> bool {
    GLOBAL_CACHE.contains(id)
}
