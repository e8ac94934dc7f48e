mod binding;
mod builder;
mod container;
mod contextual;
mod descriptor;
mod injectable;
mod lazy;
mod stack;

pub use binding::{Binding, Concrete, FactoryFn, Lifetime};
pub use builder::ContainerBuilder;
pub use container::{Container, same_instance};
pub use contextual::{ContextualBindingBuilder, ContextualNeeds};
pub use descriptor::{Arguments, Constructor, ConstructorFn, Parameter, TypeDescriptor};
pub use injectable::Injectable;
pub use lazy::Lazy;

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A type-erased, shareable service instance.
pub type Instance = Arc<dyn Any + Send + Sync>;

/// The identifier typed helpers use for `T`.
///
/// Works for unsized types, so `dyn Trait` gets a key of its own.
pub fn type_key<T: ?Sized + 'static>() -> String {
    std::any::type_name::<T>().to_string()
}

/// Per-call constructor overrides, keyed by parameter name
#[derive(Clone, Default)]
pub struct Parameters {
    values: HashMap<String, Instance>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with<V: Send + Sync + 'static>(self, name: impl Into<String>, value: V) -> Self {
        self.with_instance(name, Arc::new(value))
    }

    pub fn with_instance(mut self, name: impl Into<String>, value: Instance) -> Self {
        self.values.insert(name.into(), value);
        self
    }

    pub fn insert<V: Send + Sync + 'static>(&mut self, name: impl Into<String>, value: V) {
        self.values.insert(name.into(), Arc::new(value));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub(crate) fn take(&mut self, name: &str) -> Option<Instance> {
        self.values.remove(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl std::fmt::Debug for Parameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.values.keys()).finish()
    }
}
