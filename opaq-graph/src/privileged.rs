//! Privileged access to library-internal fields
//!
//! Views keep their delegate in a field the public API never exposes. A
//! [`FieldHandle`] grants read access to that field for one view family. Handles
//! are meant to be resolved once and reused; resolution fails after the process
//! has called [`seal`].

use std::sync::atomic::{AtomicBool, Ordering};

use opaq_format::{OpaqError, Result};

use crate::class::ViewFamily;
use crate::object::ObjRef;

static SEALED: AtomicBool = AtomicBool::new(false);

/// Deny every later [`FieldHandle::resolve`] in this process
pub fn seal() {
    SEALED.store(true, Ordering::SeqCst);
}

/// True once [`seal`] has been called
pub fn is_sealed() -> bool {
    SEALED.load(Ordering::SeqCst)
}

/// Resolved read access to the delegate field of one view family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldHandle {
    family: ViewFamily,
}

impl FieldHandle {
    /// Resolve the delegate field of `family` views
    pub fn resolve(family: ViewFamily) -> Result<FieldHandle> {
        if is_sealed() {
            return Err(OpaqError::UnsupportedOperation(format!(
                "privileged access to Collections${}* delegate field is sealed",
                family.name()
            )));
        }
        tracing::debug!(family = family.name(), "resolved delegate field handle");
        Ok(FieldHandle { family })
    }

    /// View family this handle reads
    pub fn family(&self) -> ViewFamily {
        self.family
    }

    /// Delegate of `instance`, which must be a view of this handle's family
    pub fn get(&self, instance: &ObjRef) -> Result<ObjRef> {
        match (instance.class().view_parts(), instance.view_delegate()) {
            (Some((family, _)), Some(delegate)) if family == self.family => Ok(delegate.clone()),
            _ => Err(OpaqError::TypeMismatch {
                expected: format!("Collections${} view", self.family.name()),
                found: instance.class().to_string(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections;

    #[test]
    fn test_handle_reads_delegate_of_its_family() {
        let inner = collections::array_list(vec![]);
        let sync = collections::synchronized_list(&inner).unwrap();
        let handle = FieldHandle::resolve(ViewFamily::Synchronized).unwrap();
        assert!(handle.get(&sync).unwrap().ptr_eq(&inner));

        let unmod = collections::unmodifiable_list(&inner).unwrap();
        assert!(handle.get(&unmod).is_err());
        assert!(handle.get(&inner).is_err());
    }
}
