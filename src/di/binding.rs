use crate::di::{Container, Instance};
use crate::error::{AutowireError, Result};
use std::fmt;
use std::sync::Arc;
use strum_macros::{Display, EnumString};

/// A factory receives the container and returns a type-erased instance.
pub type FactoryFn = Arc<dyn Fn(&Container) -> Result<Instance> + Send + Sync>;

/// Whether a resolved instance is cached and reused.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Lifetime {
    /// A fresh instance on every resolution.
    #[default]
    Transient,
    /// Built once, then served from the instance cache.
    #[strum(to_string = "shared", serialize = "singleton")]
    Shared,
}

/// The recipe a binding points at
#[derive(Clone)]
pub enum Concrete {
    /// Another identifier, resolved in turn.
    Type(String),
    /// A closure invoked with the container.
    Factory(FactoryFn),
}

impl Concrete {
    /// Wrap a typed factory.
    pub fn factory<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(move |container| {
            let value = factory(container)?;
            Ok(Arc::new(value) as Instance)
        }))
    }

    /// A factory that resolves `Impl` and hands it out as `Arc<Trait>`.
    ///
    /// The result is stored as `Arc<Arc<Trait>>`, which is what
    /// [`Container::resolve_trait`] and `Arguments::get_trait` expect.
    pub fn trait_impl<Trait, Impl, F>(caster: F) -> Self
    where
        Trait: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Trait> + Send + Sync + 'static,
    {
        Concrete::Factory(Arc::new(move |container| {
            let concrete = container.resolve::<Impl>()?;
            let trait_obj: Arc<Trait> = caster(concrete);
            Ok(Arc::new(trait_obj) as Instance)
        }))
    }

    pub fn is_factory(&self) -> bool {
        matches!(self, Concrete::Factory(_))
    }
}

impl From<&str> for Concrete {
    fn from(identifier: &str) -> Self {
        Concrete::Type(identifier.to_string())
    }
}

impl From<String> for Concrete {
    fn from(identifier: String) -> Self {
        Concrete::Type(identifier)
    }
}

impl From<FactoryFn> for Concrete {
    fn from(factory: FactoryFn) -> Self {
        Concrete::Factory(factory)
    }
}

impl fmt::Debug for Concrete {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Concrete::Type(identifier) => f.debug_tuple("Type").field(identifier).finish(),
            Concrete::Factory(_) => f.write_str("Factory(..)"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Binding {
    pub concrete: Concrete,
    pub lifetime: Lifetime,
}

impl Binding {
    pub fn new(concrete: Concrete, lifetime: Lifetime) -> Self {
        Self { concrete, lifetime }
    }

    pub fn is_shared(&self) -> bool {
        self.lifetime == Lifetime::Shared
    }
}

/// Downcast an erased instance, naming `identifier` on failure.
pub(crate) fn downcast<T: Send + Sync + 'static>(identifier: &str, instance: Instance) -> Result<Arc<T>> {
    instance
        .downcast::<T>()
        .map_err(|_| AutowireError::downcast_failed::<T>(identifier))
}

/// Downcast an instance stored as `Arc<Arc<Trait>>`.
pub(crate) fn downcast_trait<T: ?Sized + Send + Sync + 'static>(
    identifier: &str,
    instance: Instance,
) -> Result<Arc<T>> {
    let wrapper = instance
        .downcast::<Arc<T>>()
        .map_err(|_| AutowireError::downcast_failed::<Arc<T>>(identifier))?;
    Ok(wrapper.as_ref().clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_lifetime_parsing() {
        assert_eq!(Lifetime::from_str("shared").unwrap(), Lifetime::Shared);
        assert_eq!(Lifetime::from_str("Singleton").unwrap(), Lifetime::Shared);
        assert_eq!(Lifetime::from_str("transient").unwrap(), Lifetime::Transient);
        assert!(Lifetime::from_str("scoped").is_err());
        assert_eq!(Lifetime::Transient.to_string(), "transient");
    }

    #[test]
    fn test_concrete_from_identifier() {
        let concrete = Concrete::from("App\\Mailer");
        assert!(!concrete.is_factory());
        assert_eq!(format!("{:?}", concrete), "Type(\"App\\\\Mailer\")");
    }

    #[test]
    fn test_downcast_mismatch_names_identifier() {
        let instance: Instance = Arc::new(7u8);
        let err = downcast::<String>("answer", instance).unwrap_err();
        assert_eq!(err.identifier(), Some("answer"));
    }
}
