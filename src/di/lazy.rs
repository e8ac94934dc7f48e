use crate::di::container::ContainerState;
use crate::di::{Container, type_key};
use crate::error::{AutowireError, Result};
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

/// A deferred dependency, resolved on first access.
///
/// `Lazy<T>` keeps a weak handle to the container plus an identifier and
/// does not touch the resolution stack until [`get`](Lazy::get) is called.
/// Holding a `Lazy` instead of an `Arc` is how a type breaks a dependency
/// cycle: construction completes first, the other side is resolved later.
///
/// The handle is weak so a lazy field inside a cached singleton does not
/// keep its own container alive.
pub struct Lazy<T: Send + Sync + 'static> {
    container: Weak<ContainerState>,
    identifier: String,
    instance: OnceLock<Arc<T>>,
}

impl<T: Send + Sync + 'static> Lazy<T> {
    /// Defer resolution of `T` under its own type key.
    pub fn new(container: &Container) -> Self {
        Self::named(container, type_key::<T>())
    }

    /// Defer resolution of an arbitrary identifier producing a `T`.
    pub fn named(container: &Container, identifier: impl Into<String>) -> Self {
        Self {
            container: container.downgrade(),
            identifier: identifier.into(),
            instance: OnceLock::new(),
        }
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn is_resolved(&self) -> bool {
        self.instance.get().is_some()
    }

    /// Resolve on first call, then hand out the memoized instance.
    pub fn get(&self) -> Result<Arc<T>> {
        if let Some(instance) = self.instance.get() {
            return Ok(Arc::clone(instance));
        }

        let state = self
            .container
            .upgrade()
            .ok_or_else(|| AutowireError::ContainerDropped {
                identifier: self.identifier.clone(),
            })?;
        let resolved = Container::from_state(state).resolve_key::<T>(&self.identifier)?;

        // A concurrent first access may have won; keep whichever landed.
        Ok(Arc::clone(self.instance.get_or_init(|| resolved)))
    }
}

impl<T: Send + Sync + 'static> Clone for Lazy<T> {
    fn clone(&self) -> Self {
        Self {
            container: Weak::clone(&self.container),
            identifier: self.identifier.clone(),
            instance: self
                .instance
                .get()
                .map(|resolved| OnceLock::from(Arc::clone(resolved)))
                .unwrap_or_default(),
        }
    }
}

impl<T: Send + Sync + 'static> fmt::Debug for Lazy<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Lazy")
            .field("identifier", &self.identifier)
            .field("resolved", &self.is_resolved())
            .finish()
    }
}
