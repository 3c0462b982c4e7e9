//! Tagged codec shared by every class of one view family
//!
//! Record layout: `[tag varint][delegate class-and-object]`. Synchronized
//! views are read and copied while holding their own monitor, so a concurrent
//! writer holding the view cannot interleave with extraction.

use opaq_format::{OpaqError, Result};
use opaq_graph::{
    Class, CopyContext, ObjRef, ReadContext, Serializer, Value, ViewFamily, WriteContext,
};

use crate::accessor::{self, DelegateAccessor};
use crate::catalogue::{Catalogue, WrapperKind};

/// Codec for the synchronized or unmodifiable view family
#[derive(Debug)]
pub struct WrapperCollectionsSerializer {
    catalogue: Catalogue,
    accessor: &'static DelegateAccessor,
}

impl WrapperCollectionsSerializer {
    /// Codec for `family`, resolving the family's delegate accessor up front
    pub fn new(family: ViewFamily) -> Result<Self> {
        let accessor = accessor::accessor(family);
        accessor.handle()?;
        Ok(Self {
            catalogue: Catalogue::of(family),
            accessor,
        })
    }

    /// Codec for synchronized views
    pub fn synchronized() -> Result<Self> {
        Self::new(ViewFamily::Synchronized)
    }

    /// Codec for unmodifiable views
    pub fn unmodifiable() -> Result<Self> {
        Self::new(ViewFamily::Unmodifiable)
    }

    /// Catalogue this codec dispatches on
    pub fn catalogue(&self) -> &Catalogue {
        &self.catalogue
    }

    fn extract(&self, kind: WrapperKind, instance: &ObjRef) -> Result<ObjRef> {
        self.accessor
            .extract(instance)
            .map_err(|e| OpaqError::delegate(kind.name(), e))
    }

    fn construct(&self, kind: WrapperKind, delegate: &ObjRef) -> Result<ObjRef> {
        kind.construct(self.catalogue.family(), delegate)
            .map_err(|e| OpaqError::delegate(kind.name(), e))
    }

    fn guarded<R>(&self, instance: &ObjRef, f: impl FnOnce() -> R) -> R {
        match self.catalogue.family() {
            ViewFamily::Synchronized => instance.synchronized(f),
            ViewFamily::Unmodifiable => f(),
        }
    }
}

impl Serializer for WrapperCollectionsSerializer {
    fn write(&self, ctx: &mut WriteContext<'_>, obj: &ObjRef) -> Result<()> {
        let kind = self.catalogue.classify(obj.class())?;
        tracing::trace!(class = %obj.class(), tag = kind.tag(), "writing wrapper");
        ctx.write_varint(kind.tag());
        self.guarded(obj, || {
            let delegate = self.extract(kind, obj)?;
            ctx.write_class_and_object(&Value::Ref(delegate))
        })
    }

    fn read(&self, ctx: &mut ReadContext<'_>, class: &Class) -> Result<ObjRef> {
        let tag = ctx.read_varint()?;
        let kind = self.catalogue.by_tag(tag)?;
        tracing::trace!(class = %class, tag, "reading wrapper");
        let delegate = match ctx.read_class_and_object()? {
            Value::Ref(delegate) => delegate,
            other => {
                return Err(OpaqError::delegate(
                    kind.name(),
                    OpaqError::TypeMismatch {
                        expected: "collection or map".to_string(),
                        found: other.class_name(),
                    },
                ))
            }
        };
        self.construct(kind, &delegate)
    }

    fn copy(&self, ctx: &mut CopyContext<'_>, original: &ObjRef) -> Result<ObjRef> {
        let kind = self.catalogue.classify(original.class())?;
        tracing::trace!(class = %original.class(), "copying wrapper");
        let delegate = self.guarded(original, || {
            let delegate = self.extract(kind, original)?;
            ctx.copy_object(&delegate)
        })?;
        self.construct(kind, &delegate)
    }
}
