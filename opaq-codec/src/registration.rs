//! Binding wrapper classes to their codecs
//!
//! Each entry point binds every concrete class of one catalogue to a single
//! shared codec instance. Field handles are resolved before the first class
//! is bound, so an `AccessorInit` failure leaves the target untouched.

use std::sync::Arc;

use opaq_format::Result;
use opaq_graph::{Class, LibraryClass, RegistrationTarget, Serializer, ViewFamily};

use crate::as_list::ArraysAsListSerializer;
use crate::enum_map::EnumMapSerializer;
use crate::wrappers::WrapperCollectionsSerializer;

fn register_family<T>(target: &mut T, codec: WrapperCollectionsSerializer) -> Result<()>
where
    T: RegistrationTarget + ?Sized,
{
    let classes = codec.catalogue().classes();
    let family = codec.catalogue().family();
    let codec: Arc<dyn Serializer> = Arc::new(codec);
    for class in classes {
        target.register(class, Arc::clone(&codec))?;
    }
    tracing::debug!(family = family.name(), "registered wrapper family");
    Ok(())
}

/// Bind every synchronized view class
pub fn register_synchronized<T>(target: &mut T) -> Result<()>
where
    T: RegistrationTarget + ?Sized,
{
    register_family(target, WrapperCollectionsSerializer::new(ViewFamily::Synchronized)?)
}

/// Bind every unmodifiable view class
pub fn register_unmodifiable<T>(target: &mut T) -> Result<()>
where
    T: RegistrationTarget + ?Sized,
{
    register_family(target, WrapperCollectionsSerializer::new(ViewFamily::Unmodifiable)?)
}

/// Bind the enum-keyed map class
pub fn register_enum_map<T>(target: &mut T) -> Result<()>
where
    T: RegistrationTarget + ?Sized,
{
    target.register(Class::EnumMap, Arc::new(EnumMapSerializer))?;
    tracing::debug!("registered enum map codec");
    Ok(())
}

/// Bind the array-backed list class
pub fn register_arrays_as_list<T>(target: &mut T) -> Result<()>
where
    T: RegistrationTarget + ?Sized,
{
    target.register(
        Class::Library(LibraryClass::ArraysAsList),
        Arc::new(ArraysAsListSerializer),
    )?;
    tracing::debug!("registered array-backed list codec");
    Ok(())
}

/// Bind all four catalogues: synchronized, unmodifiable, enum map, array-backed list
pub fn register_all<T>(target: &mut T) -> Result<()>
where
    T: RegistrationTarget + ?Sized,
{
    let synchronized = WrapperCollectionsSerializer::new(ViewFamily::Synchronized)?;
    let unmodifiable = WrapperCollectionsSerializer::new(ViewFamily::Unmodifiable)?;
    register_family(target, synchronized)?;
    register_family(target, unmodifiable)?;
    register_enum_map(target)?;
    register_arrays_as_list(target)
}

/// Target that records registrations without binding anything
#[derive(Default)]
pub struct RecordingTarget {
    entries: Vec<(Class, Arc<dyn Serializer>)>,
}

impl RecordingTarget {
    /// Empty recorder
    pub fn new() -> Self {
        Self::default()
    }

    /// Recorded classes, in registration order
    pub fn classes(&self) -> Vec<Class> {
        self.entries.iter().map(|(class, _)| class.clone()).collect()
    }

    /// Recorded class/codec pairs
    pub fn entries(&self) -> &[(Class, Arc<dyn Serializer>)] {
        &self.entries
    }

    /// Number of recorded registrations
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RegistrationTarget for RecordingTarget {
    fn register(&mut self, class: Class, serializer: Arc<dyn Serializer>) -> Result<()> {
        self.entries.push((class, serializer));
        Ok(())
    }
}
