use crate::config::ContainerConfig;
use crate::di::{Concrete, Container, Injectable, Lifetime, TypeDescriptor};
use std::sync::Arc;

/// Builder for constructing a dependency injection container
///
/// Use this to configure and register services before handing the container
/// to the rest of the application.
///
/// # Example
/// ```
/// use autowire::{ContainerBuilder, TypeDescriptor};
///
/// struct Database;
///
/// let container = ContainerBuilder::new()
///     .register_type(TypeDescriptor::of::<Database>().construct(|_| Ok(Database)))
///     .singleton_self(autowire::type_key::<Database>())
///     .instance("app.name", "inventory".to_string())
///     .build();
///
/// assert!(container.resolve::<Database>().is_ok());
/// ```
pub struct ContainerBuilder {
    container: Container,
}

impl ContainerBuilder {
    /// Create a new container builder
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            container: Container::with_config(config),
        }
    }

    /// Register a service instance under its own type
    pub fn register<T: Send + Sync + 'static>(self, instance: T) -> Self {
        self.container.register(instance);
        self
    }

    pub fn instance<T: Send + Sync + 'static>(self, id: impl Into<String>, instance: T) -> Self {
        self.container.register_instance(id, instance);
        self
    }

    pub fn bind(self, id: impl Into<String>, concrete: impl Into<Concrete>) -> Self {
        self.container.bind(id, concrete);
        self
    }

    pub fn bind_with(self, id: impl Into<String>, concrete: impl Into<Concrete>, lifetime: Lifetime) -> Self {
        self.container.bind_with(id, concrete, lifetime);
        self
    }

    pub fn singleton(self, id: impl Into<String>, concrete: impl Into<Concrete>) -> Self {
        self.container.singleton(id, concrete);
        self
    }

    pub fn singleton_self(self, id: impl Into<String>) -> Self {
        self.container.singleton_self(id);
        self
    }

    /// Bind a trait to a concrete implementation
    ///
    /// This enables resolving `Arc<dyn Trait>` to the registered implementation.
    pub fn bind_trait<Trait, Impl, F>(self, caster: F) -> Self
    where
        Trait: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.container.bind_trait::<Trait, Impl, F>(caster);
        self
    }

    pub fn singleton_trait<Trait, Impl, F>(self, caster: F) -> Self
    where
        Trait: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.container.singleton_trait::<Trait, Impl, F>(caster);
        self
    }

    pub fn register_type(self, descriptor: TypeDescriptor) -> Self {
        self.container.register_type(descriptor);
        self
    }

    pub fn injectable<T: Injectable>(self) -> Self {
        self.container.register_injectable::<T>();
        self
    }

    /// Build the container
    pub fn build(self) -> Container {
        self.container
    }
}

impl Default for ContainerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::di::type_key;
    use std::num::NonZeroUsize;

    trait Repository: Send + Sync {
        fn table(&self) -> &'static str;
    }

    struct UserRepository;

    impl Repository for UserRepository {
        fn table(&self) -> &'static str {
            "users"
        }
    }

    #[test]
    fn test_builder_registers_everything() {
        let container = ContainerBuilder::with_config(ContainerConfig {
            max_depth: NonZeroUsize::new(16).unwrap(),
            ..ContainerConfig::default()
        })
        .register(7u16)
        .instance("app.name", "inventory".to_string())
        .register_type(TypeDescriptor::of::<UserRepository>().construct(|_| Ok(UserRepository)))
        .singleton_trait::<dyn Repository, UserRepository, _>(|r| r as Arc<dyn Repository>)
        .bind("repo", type_key::<dyn Repository>())
        .build();

        assert_eq!(container.config().max_depth.get(), 16);
        assert_eq!(*container.resolve::<u16>().unwrap(), 7);
        assert_eq!(
            container.resolve_key::<String>("app.name").unwrap().as_str(),
            "inventory"
        );
        assert_eq!(container.resolve_trait::<dyn Repository>().unwrap().table(), "users");
        assert!(container.make("repo").is_ok());
        assert_eq!(container.lifetime_of("repo"), Some(Lifetime::Transient));
    }
}
