use std::cmp::Ordering;
use std::fmt::{Display, Formatter};
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use ahash::{AHashMap, RandomState};
use serde::{Serialize, Serializer};

/// A typed, interned id. It carries the dense internal index, which is used for all
/// lookups inside the engines, and the external id as it appeared in the dataset.
///
/// Cloning an id clones an `Arc` pointer to the shared external string. Ids from
/// different [IdStore]s must not be mixed, as equality, ordering and hashing only
/// rely on the internal index.
#[derive(Debug)]
pub struct Id<T> {
    _type_marker: PhantomData<fn() -> T>,
    id: Arc<UntypedId>,
}

impl<T> Id<T> {
    fn new(untyped_id: Arc<UntypedId>) -> Self {
        Self {
            _type_marker: PhantomData,
            id: untyped_id,
        }
    }

    pub fn internal(&self) -> usize {
        self.id.internal
    }

    pub fn external(&self) -> &str {
        &self.id.external
    }
}

/// Mark Id as enabled for the nohash_hasher::NoHashHasher trait
impl<T> nohash_hasher::IsEnabled for Id<T> {}

impl<T> nohash_hasher::IsEnabled for &Id<T> {}

impl<T> PartialEq for Id<T> {
    fn eq(&self, other: &Self) -> bool {
        self.internal().eq(&other.internal())
    }
}

impl<T> Eq for Id<T> {}

impl<T> Hash for Id<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        // use write u64 directly, so that we can use NoHashHasher with ids
        state.write_u64(self.internal() as u64);
    }
}

impl<T> Ord for Id<T> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.internal().cmp(&other.internal())
    }
}

impl<T> PartialOrd for Id<T> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Clone for Id<T> {
    fn clone(&self) -> Self {
        Self::new(self.id.clone())
    }
}

impl<T> Display for Id<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.external())
    }
}

/// Ids are written with their external representation, so that results can be
/// matched against the dataset they were computed from.
impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.external())
    }
}

#[derive(Debug)]
struct UntypedId {
    internal: usize,
    external: String,
}

/// Owned store which interns external ids of one type into dense indices `0..len`.
#[derive(Debug)]
pub struct IdStore<T> {
    ids: Vec<Id<T>>,
    // use ahasher algorithm with fixed random state, to get predictable
    mapping: AHashMap<String, usize>,
}

impl<T> Default for IdStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> IdStore<T> {
    pub fn new() -> Self {
        Self {
            ids: Vec::new(),
            mapping: AHashMap::with_hasher(RandomState::with_seed(42)),
        }
    }

    /// Creates a new id for `external`, or returns the existing one if the external id
    /// was interned before.
    pub fn create_id(&mut self, external: &str) -> Id<T> {
        if let Some(existing) = self.get_from_ext(external) {
            return existing;
        }

        let next_internal = self.ids.len();
        let id = Id::new(Arc::new(UntypedId {
            internal: next_internal,
            external: String::from(external),
        }));
        self.ids.push(id.clone());
        self.mapping.insert(String::from(external), next_internal);
        id
    }

    pub fn get(&self, internal: usize) -> Option<Id<T>> {
        self.ids.get(internal).cloned()
    }

    pub fn get_from_ext(&self, external: &str) -> Option<Id<T>> {
        self.mapping
            .get(external)
            .and_then(|&internal| self.get(internal))
    }

    pub fn contains(&self, external: &str) -> bool {
        self.mapping.contains_key(external)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Id<T>> {
        self.ids.iter()
    }
}
