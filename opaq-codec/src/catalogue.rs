//! Kind catalogue for the synchronized and unmodifiable view families
//!
//! Each family has the same seven kinds. A kind's tag is its position in
//! [`WrapperKind::ALL`] and is written on the wire, so the order is frozen.

use opaq_format::{OpaqError, Result};
use opaq_graph::collections;
use opaq_graph::{Class, ObjRef, ViewFamily, ViewShape};

/// One recognized wrapper shape
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WrapperKind {
    /// Collection view
    Collection,
    /// List view over a random-access list
    RandomAccessList,
    /// List view over a sequential list
    List,
    /// Set view
    Set,
    /// Sorted set view
    SortedSet,
    /// Map view
    Map,
    /// Sorted map view
    SortedMap,
}

impl WrapperKind {
    /// Every kind, in tag order
    pub const ALL: [WrapperKind; 7] = [
        WrapperKind::Collection,
        WrapperKind::RandomAccessList,
        WrapperKind::List,
        WrapperKind::Set,
        WrapperKind::SortedSet,
        WrapperKind::Map,
        WrapperKind::SortedMap,
    ];

    /// Wire tag
    pub fn tag(self) -> u64 {
        self as u64
    }

    /// Kind for a wire tag
    pub fn from_tag(tag: u64) -> Result<WrapperKind> {
        usize::try_from(tag)
            .ok()
            .and_then(|idx| Self::ALL.get(idx).copied())
            .ok_or(OpaqError::UnknownTag {
                tag,
                registered: Self::ALL.len(),
            })
    }

    /// View shape this kind stands for
    pub fn shape(self) -> ViewShape {
        match self {
            WrapperKind::Collection => ViewShape::Collection,
            WrapperKind::RandomAccessList => ViewShape::RandomAccessList,
            WrapperKind::List => ViewShape::List,
            WrapperKind::Set => ViewShape::Set,
            WrapperKind::SortedSet => ViewShape::SortedSet,
            WrapperKind::Map => ViewShape::Map,
            WrapperKind::SortedMap => ViewShape::SortedMap,
        }
    }

    /// Concrete class of this kind in `family`
    pub fn class(self, family: ViewFamily) -> Class {
        Class::view(family, self.shape())
    }

    /// Exact class match; views of other families or shapes never match
    pub fn matches(self, family: ViewFamily, class: &Class) -> bool {
        class.view_parts() == Some((family, self.shape()))
    }

    /// Re-wrap `delegate` with the family's factory for this kind
    pub fn construct(self, family: ViewFamily, delegate: &ObjRef) -> Result<ObjRef> {
        match (family, self) {
            (ViewFamily::Synchronized, WrapperKind::Collection) => {
                collections::synchronized_collection(delegate)
            }
            (ViewFamily::Synchronized, WrapperKind::RandomAccessList | WrapperKind::List) => {
                collections::synchronized_list(delegate)
            }
            (ViewFamily::Synchronized, WrapperKind::Set) => collections::synchronized_set(delegate),
            (ViewFamily::Synchronized, WrapperKind::SortedSet) => {
                collections::synchronized_sorted_set(delegate)
            }
            (ViewFamily::Synchronized, WrapperKind::Map) => collections::synchronized_map(delegate),
            (ViewFamily::Synchronized, WrapperKind::SortedMap) => {
                collections::synchronized_sorted_map(delegate)
            }
            (ViewFamily::Unmodifiable, WrapperKind::Collection) => {
                collections::unmodifiable_collection(delegate)
            }
            (ViewFamily::Unmodifiable, WrapperKind::RandomAccessList | WrapperKind::List) => {
                collections::unmodifiable_list(delegate)
            }
            (ViewFamily::Unmodifiable, WrapperKind::Set) => collections::unmodifiable_set(delegate),
            (ViewFamily::Unmodifiable, WrapperKind::SortedSet) => {
                collections::unmodifiable_sorted_set(delegate)
            }
            (ViewFamily::Unmodifiable, WrapperKind::Map) => collections::unmodifiable_map(delegate),
            (ViewFamily::Unmodifiable, WrapperKind::SortedMap) => {
                collections::unmodifiable_sorted_map(delegate)
            }
        }
    }

    /// Name used when wrapping errors
    pub fn name(self) -> &'static str {
        self.shape().name()
    }
}

/// The kinds of one view family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Catalogue {
    family: ViewFamily,
}

impl Catalogue {
    /// Synchronized family
    pub const SYNCHRONIZED: Catalogue = Catalogue {
        family: ViewFamily::Synchronized,
    };

    /// Unmodifiable family
    pub const UNMODIFIABLE: Catalogue = Catalogue {
        family: ViewFamily::Unmodifiable,
    };

    /// Catalogue of `family`
    pub fn of(family: ViewFamily) -> Catalogue {
        Catalogue { family }
    }

    /// Family covered by this catalogue
    pub fn family(&self) -> ViewFamily {
        self.family
    }

    /// Concrete classes of every kind, in tag order
    pub fn classes(&self) -> Vec<Class> {
        WrapperKind::ALL
            .iter()
            .map(|kind| kind.class(self.family))
            .collect()
    }

    /// Kind whose class is exactly `class`
    pub fn classify(&self, class: &Class) -> Result<WrapperKind> {
        WrapperKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.matches(self.family, class))
            .ok_or_else(|| OpaqError::UnsupportedType(class.to_string()))
    }

    /// Kind for a wire tag
    pub fn by_tag(&self, tag: u64) -> Result<WrapperKind> {
        WrapperKind::from_tag(tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use opaq_graph::Value;

    #[test]
    fn test_tags_follow_declaration_order() {
        for (idx, kind) in WrapperKind::ALL.iter().enumerate() {
            assert_eq!(kind.tag(), idx as u64);
            assert_eq!(WrapperKind::from_tag(idx as u64).unwrap(), *kind);
        }
        assert!(matches!(
            WrapperKind::from_tag(7),
            Err(OpaqError::UnknownTag { tag: 7, registered: 7 })
        ));
        assert!(WrapperKind::from_tag(u64::MAX).is_err());
    }

    #[test]
    fn test_classify_is_exact() {
        let sync = Catalogue::SYNCHRONIZED;
        let class = Class::view(ViewFamily::Synchronized, ViewShape::SortedMap);
        assert_eq!(sync.classify(&class).unwrap(), WrapperKind::SortedMap);

        let other_family = Class::view(ViewFamily::Unmodifiable, ViewShape::SortedMap);
        assert!(matches!(
            sync.classify(&other_family),
            Err(OpaqError::UnsupportedType(name)) if name == "Collections$UnmodifiableSortedMap"
        ));
        assert!(sync.classify(&Class::TreeMap).is_err());
    }

    #[test]
    fn test_construct_recovers_the_classified_kind() {
        let delegates = [
            collections::hash_set(vec![]),
            collections::array_list(vec![]),
            collections::linked_list(vec![]),
            collections::hash_set(vec![]),
            collections::tree_set(vec![]),
            collections::hash_map(vec![]),
            collections::tree_map(vec![]),
        ];
        for catalogue in [Catalogue::SYNCHRONIZED, Catalogue::UNMODIFIABLE] {
            for (kind, delegate) in WrapperKind::ALL.iter().zip(&delegates) {
                let wrapper = kind.construct(catalogue.family(), delegate).unwrap();
                assert_eq!(catalogue.classify(wrapper.class()).unwrap(), *kind);
            }
        }
    }

    #[test]
    fn test_construct_rejects_wrong_delegate() {
        let list = collections::array_list(vec![Value::Int(1)]);
        assert!(WrapperKind::Map
            .construct(ViewFamily::Unmodifiable, &list)
            .is_err());
    }
}
