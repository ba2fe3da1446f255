//! The type-system interface the registry is generic over.
//!
//! A kind implements [`Resource`] to expose its identity and metadata, and
//! names a [`ResourceList`] container that the registry fills when listing.
//! The registry never inspects a resource beyond these accessors.

use std::fmt;

use crate::identity::{ResourceIdentity, ResourceKey};
use crate::meta::ObjectMeta;

/// A typed, named, optionally namespaced record managed by the registry.
pub trait Resource: Clone + fmt::Debug + Send + Sync + 'static {
    /// Collection type returned by list-style operations.
    type List: ResourceList<Self>;

    /// Group, kind, and scope of this resource type.
    fn identity() -> ResourceIdentity;

    fn metadata(&self) -> &ObjectMeta;

    fn metadata_mut(&mut self) -> &mut ObjectMeta;

    /// An empty collection for this kind.
    fn new_list() -> Self::List {
        Self::List::default()
    }

    /// The key addressed by this object's metadata.
    fn key(&self) -> ResourceKey {
        self.metadata().key()
    }
}

/// Ordered container of resources of one kind.
pub trait ResourceList<R>: Default + Send {
    /// Append an item, preserving insertion order.
    fn push(&mut self, item: R);

    fn items(&self) -> &[R];

    fn into_items(self) -> Vec<R>;

    fn len(&self) -> usize {
        self.items().len()
    }

    fn is_empty(&self) -> bool {
        self.items().is_empty()
    }
}

impl<R: Send> ResourceList<R> for Vec<R> {
    fn push(&mut self, item: R) {
        Vec::push(self, item);
    }

    fn items(&self) -> &[R] {
        self.as_slice()
    }

    fn into_items(self) -> Vec<R> {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vec_is_a_resource_list() {
        let mut list: Vec<u32> = Vec::new();
        ResourceList::push(&mut list, 1);
        ResourceList::push(&mut list, 2);
        assert_eq!(ResourceList::items(&list), &[1, 2]);
        assert_eq!(ResourceList::len(&list), 2);
        assert!(!ResourceList::is_empty(&list));
        assert_eq!(ResourceList::into_items(list), vec![1, 2]);
    }
}
