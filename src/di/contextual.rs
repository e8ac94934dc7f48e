use crate::di::{Concrete, Container, type_key};
use crate::error::Result;
use std::sync::Arc;

/// `when(consumer)` half of a contextual binding
///
/// A contextual binding is keyed by the consuming type and the dependency it
/// asks for; it only applies while that consumer is being auto-resolved.
pub struct ContextualBindingBuilder<'a> {
    container: &'a Container,
    consumer: String,
}

impl<'a> ContextualBindingBuilder<'a> {
    pub(crate) fn new(container: &'a Container, consumer: String) -> Self {
        Self {
            container,
            consumer,
        }
    }

    pub fn needs(self, dependency: impl Into<String>) -> ContextualNeeds<'a> {
        ContextualNeeds {
            container: self.container,
            consumer: self.consumer,
            dependency: dependency.into(),
        }
    }

    pub fn needs_type<T: ?Sized + 'static>(self) -> ContextualNeeds<'a> {
        self.needs(type_key::<T>())
    }
}

/// `needs(dependency)` half of a contextual binding
pub struct ContextualNeeds<'a> {
    container: &'a Container,
    consumer: String,
    dependency: String,
}

impl<'a> ContextualNeeds<'a> {
    /// Supply an identifier or a raw factory.
    pub fn give(self, concrete: impl Into<Concrete>) -> &'a Container {
        self.container
            .add_contextual_binding(self.consumer, self.dependency, concrete.into());
        self.container
    }

    pub fn give_factory<T, F>(self, factory: F) -> &'a Container
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.give(Concrete::factory(factory))
    }

    /// Supply `Impl` for a trait-object dependency.
    pub fn give_impl<Trait, Impl, F>(self, caster: F) -> &'a Container
    where
        Trait: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.give(Concrete::trait_impl::<Trait, Impl, F>(caster))
    }
}
