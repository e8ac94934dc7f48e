use crate::config::ContainerConfig;
use crate::di::binding::{Binding, Concrete, FactoryFn, Lifetime, downcast, downcast_trait};
use crate::di::contextual::ContextualBindingBuilder;
use crate::di::descriptor::{Arguments, Constructor, TypeDescriptor};
use crate::di::stack::ResolutionStacks;
use crate::di::{Injectable, Instance, Parameters, type_key};
use crate::error::{AutowireError, Result};
use dashmap::DashMap;
use std::sync::{Arc, Weak};

/// Thread-safe dependency injection container.
///
/// Cloning a `Container` yields another handle to the same bindings and
/// instance cache.
#[derive(Clone)]
pub struct Container {
    state: Arc<ContainerState>,
}

pub(crate) struct ContainerState {
    bindings: DashMap<String, Binding>,
    instances: DashMap<String, Instance>,
    descriptors: DashMap<String, TypeDescriptor>,
    contextual: DashMap<(String, String), Concrete>,
    stacks: ResolutionStacks,
    config: ContainerConfig,
}

impl Container {
    pub fn new() -> Self {
        Self::with_config(ContainerConfig::default())
    }

    pub fn with_config(config: ContainerConfig) -> Self {
        Self {
            state: Arc::new(ContainerState {
                bindings: DashMap::new(),
                instances: DashMap::new(),
                descriptors: DashMap::new(),
                contextual: DashMap::new(),
                stacks: ResolutionStacks::default(),
                config,
            }),
        }
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.state.config
    }

    pub(crate) fn downgrade(&self) -> Weak<ContainerState> {
        Arc::downgrade(&self.state)
    }

    pub(crate) fn from_state(state: Arc<ContainerState>) -> Self {
        Self { state }
    }

    // ---------------------------------------------------------------
    // Registration
    // ---------------------------------------------------------------

    /// Register a transient binding.
    ///
    /// Nothing is validated here; a bad recipe surfaces at `make` time.
    pub fn bind(&self, id: impl Into<String>, concrete: impl Into<Concrete>) -> &Self {
        self.bind_with(id, concrete, Lifetime::Transient)
    }

    /// Bind an identifier to itself so it auto-resolves.
    pub fn bind_self(&self, id: impl Into<String>) -> &Self {
        let id = id.into();
        self.bind_with(id.clone(), id, Lifetime::Transient)
    }

    pub fn singleton(&self, id: impl Into<String>, concrete: impl Into<Concrete>) -> &Self {
        self.bind_with(id, concrete, Lifetime::Shared)
    }

    pub fn singleton_self(&self, id: impl Into<String>) -> &Self {
        let id = id.into();
        self.bind_with(id.clone(), id, Lifetime::Shared)
    }

    pub fn bind_with(
        &self,
        id: impl Into<String>,
        concrete: impl Into<Concrete>,
        lifetime: Lifetime,
    ) -> &Self {
        let id = id.into();
        let concrete = concrete.into();
        tracing::debug!(identifier = %id, ?concrete, %lifetime, "Binding registered");

        // A rebound identifier must not keep serving the old instance.
        self.state.instances.remove(&id);
        self.state.bindings.insert(id, Binding::new(concrete, lifetime));
        self
    }

    /// Bind `id` to a typed factory.
    pub fn bind_factory<T, F>(&self, id: impl Into<String>, factory: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.bind(id, Concrete::factory(factory))
    }

    pub fn singleton_factory<T, F>(&self, id: impl Into<String>, factory: F) -> &Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Container) -> Result<T> + Send + Sync + 'static,
    {
        self.singleton(id, Concrete::factory(factory))
    }

    /// Bind a trait to a concrete implementation.
    ///
    /// `Impl` is resolved through the container, so it may be bound or
    /// auto-resolved itself.
    pub fn bind_trait<Trait, Impl, F>(&self, caster: F) -> &Self
    where
        Trait: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.bind(type_key::<Trait>(), Concrete::trait_impl::<Trait, Impl, F>(caster))
    }

    pub fn singleton_trait<Trait, Impl, F>(&self, caster: F) -> &Self
    where
        Trait: ?Sized + Send + Sync + 'static,
        Impl: Send + Sync + 'static,
        F: Fn(Arc<Impl>) -> Arc<Trait> + Send + Sync + 'static,
    {
        self.singleton(type_key::<Trait>(), Concrete::trait_impl::<Trait, Impl, F>(caster))
    }

    /// Place a pre-built object in the instance cache.
    pub fn register_instance<T: Send + Sync + 'static>(&self, id: impl Into<String>, instance: T) -> &Self {
        self.register_shared_instance(id, Arc::new(instance))
    }

    pub fn register_shared_instance(&self, id: impl Into<String>, instance: Instance) -> &Self {
        let id = id.into();
        tracing::debug!(identifier = %id, "Instance registered");
        self.state.instances.insert(id, instance);
        self
    }

    /// Register an instance under its own type.
    pub fn register<T: Send + Sync + 'static>(&self, instance: T) -> &Self {
        self.register_instance(type_key::<T>(), instance)
    }

    /// Record how to construct an identifier.
    pub fn register_type(&self, descriptor: TypeDescriptor) -> &Self {
        tracing::trace!(identifier = descriptor.identifier(), "Descriptor registered");
        self.state
            .descriptors
            .insert(descriptor.identifier().to_string(), descriptor);
        self
    }

    pub fn register_injectable<T: Injectable>(&self) -> &Self {
        self.register_type(T::descriptor())
    }

    /// Start a contextual binding for `consumer`.
    ///
    /// ```
    /// use autowire::Container;
    ///
    /// let container = Container::new();
    /// container.when("ReportController").needs("Filesystem").give("S3Filesystem");
    /// ```
    pub fn when(&self, consumer: impl Into<String>) -> ContextualBindingBuilder<'_> {
        ContextualBindingBuilder::new(self, consumer.into())
    }

    pub fn when_type<T: ?Sized + 'static>(&self) -> ContextualBindingBuilder<'_> {
        self.when(type_key::<T>())
    }

    pub(crate) fn add_contextual_binding(&self, consumer: String, dependency: String, concrete: Concrete) {
        tracing::debug!(%consumer, %dependency, ?concrete, "Contextual binding registered");
        self.state.contextual.insert((consumer, dependency), concrete);
    }

    // ---------------------------------------------------------------
    // Introspection
    // ---------------------------------------------------------------

    /// Whether `id` has a binding or a cached instance.
    pub fn bound(&self, id: &str) -> bool {
        self.state.bindings.contains_key(id) || self.state.instances.contains_key(id)
    }

    pub fn has_instance(&self, id: &str) -> bool {
        self.state.instances.contains_key(id)
    }

    pub fn lifetime_of(&self, id: &str) -> Option<Lifetime> {
        self.state.bindings.get(id).map(|binding| binding.lifetime)
    }

    pub fn is_shared(&self, id: &str) -> bool {
        self.has_instance(id) || self.lifetime_of(id) == Some(Lifetime::Shared)
    }

    pub fn contains<T: ?Sized + 'static>(&self) -> bool {
        self.bound(&type_key::<T>())
    }

    /// Whether the current thread is in the middle of a resolution.
    pub fn is_resolving(&self) -> bool {
        self.state.stacks.depth() > 0
    }

    /// Identifiers being resolved on the current thread, outermost first.
    pub fn resolution_stack(&self) -> Vec<String> {
        self.state.stacks.snapshot()
    }

    pub fn forget_instance(&self, id: &str) -> Option<Instance> {
        self.state.instances.remove(id).map(|(_, instance)| instance)
    }

    /// Drop every binding, instance, descriptor and contextual binding.
    pub fn flush(&self) {
        self.state.bindings.clear();
        self.state.instances.clear();
        self.state.descriptors.clear();
        self.state.contextual.clear();
    }

    /// Number of identifiers with a binding or a cached instance.
    pub fn len(&self) -> usize {
        let unbound_instances = self
            .state
            .instances
            .iter()
            .filter(|instance| !self.state.bindings.contains_key(instance.key()))
            .count();
        self.state.bindings.len() + unbound_instances
    }

    pub fn is_empty(&self) -> bool {
        self.state.bindings.is_empty() && self.state.instances.is_empty()
    }

    // ---------------------------------------------------------------
    // Resolution
    // ---------------------------------------------------------------

    pub fn make(&self, id: &str) -> Result<Instance> {
        self.make_with(id, Parameters::new())
    }

    /// Resolve `id`, substituting `overrides` for the named constructor
    /// parameters of the type that gets built.
    ///
    /// A call with overrides neither reads nor fills the singleton cache.
    pub fn make_with(&self, id: &str, overrides: Parameters) -> Result<Instance> {
        let _guard = self.state.stacks.enter(id, self.state.config.max_depth.get())?;
        let with_overrides = !overrides.is_empty();

        if !with_overrides {
            if let Some(instance) = self.cached(id) {
                tracing::trace!(identifier = id, "Resolved from instance cache");
                return Ok(instance);
            }
        }

        let binding = self.binding(id);
        let instance = match &binding {
            Some(binding) => match &binding.concrete {
                Concrete::Factory(factory) => self.invoke_factory(id, factory)?,
                Concrete::Type(concrete) if concrete == id => self.build(id, overrides)?,
                Concrete::Type(concrete) => {
                    tracing::trace!(identifier = id, %concrete, "Following alias");
                    self.make_with(concrete, overrides)?
                }
            },
            None if self.state.config.auto_resolve => self.build(id, overrides)?,
            None => {
                return Err(AutowireError::not_instantiable(
                    id,
                    "no binding registered and auto-resolution is disabled",
                ));
            }
        };

        let shared = binding.as_ref().is_some_and(Binding::is_shared);
        if shared && !with_overrides {
            let cached = self.state.instances.entry(id.to_string()).or_insert(instance);
            tracing::debug!(identifier = id, "Shared instance cached");
            return Ok(Arc::clone(cached.value()));
        }

        Ok(instance)
    }

    /// Resolve the identifier of `T` and downcast.
    pub fn resolve<T: Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        self.resolve_key::<T>(&type_key::<T>())
    }

    pub fn resolve_with<T: Send + Sync + 'static>(&self, overrides: Parameters) -> Result<Arc<T>> {
        let id = type_key::<T>();
        downcast::<T>(&id, self.make_with(&id, overrides)?)
    }

    /// Resolve an arbitrary identifier that is known to produce a `T`.
    pub fn resolve_key<T: Send + Sync + 'static>(&self, id: &str) -> Result<Arc<T>> {
        downcast::<T>(id, self.make(id)?)
    }

    /// Resolve a trait object bound through [`bind_trait`](Self::bind_trait).
    pub fn resolve_trait<T: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<T>> {
        let id = type_key::<T>();
        downcast_trait::<T>(&id, self.make(&id)?)
    }

    fn cached(&self, id: &str) -> Option<Instance> {
        self.state
            .instances
            .get(id)
            .map(|instance| Arc::clone(instance.value()))
    }

    fn binding(&self, id: &str) -> Option<Binding> {
        self.state.bindings.get(id).map(|binding| binding.value().clone())
    }

    fn descriptor(&self, id: &str) -> Option<TypeDescriptor> {
        self.state
            .descriptors
            .get(id)
            .map(|descriptor| descriptor.value().clone())
    }

    fn contextual_concrete(&self, consumer: &str, dependency: &str) -> Option<Concrete> {
        self.state
            .contextual
            .get(&(consumer.to_string(), dependency.to_string()))
            .map(|concrete| concrete.value().clone())
    }

    fn invoke_factory(&self, id: &str, factory: &FactoryFn) -> Result<Instance> {
        tracing::trace!(identifier = id, "Invoking factory");
        factory(self)
    }

    /// Whether `make(id)` has a recipe to work from.
    fn is_resolvable(&self, id: &str) -> bool {
        if self.bound(id) {
            return true;
        }
        self.state.config.auto_resolve
            && self
                .state
                .descriptors
                .get(id)
                .is_some_and(|descriptor| descriptor.is_instantiable())
    }

    /// Auto-resolve: build `id` from its descriptor.
    fn build(&self, id: &str, mut overrides: Parameters) -> Result<Instance> {
        let descriptor = self.descriptor(id).ok_or_else(|| {
            AutowireError::not_instantiable(id, "no binding or constructor registered")
        })?;
        let constructor = match descriptor.constructor() {
            Constructor::Concrete(constructor) => Arc::clone(constructor),
            Constructor::Abstract => {
                return Err(AutowireError::not_instantiable(
                    id,
                    "abstract type with no binding",
                ));
            }
        };

        // Fail on unsatisfiable primitives before building any dependency.
        if let Some(parameter) = descriptor.parameters().iter().find(|parameter| {
            parameter.dependency_identifier().is_none()
                && parameter.default_value().is_none()
                && !overrides.contains(parameter.name())
        }) {
            return Err(AutowireError::unresolvable(id, parameter.name()));
        }

        let mut values = Vec::with_capacity(descriptor.parameters().len());
        for parameter in descriptor.parameters() {
            let name = parameter.name();
            let value = if let Some(value) = overrides.take(name) {
                value
            } else if let Some(dependency) = parameter.dependency_identifier() {
                match self.contextual_concrete(id, dependency) {
                    Some(Concrete::Factory(factory)) => self.invoke_factory(dependency, &factory)?,
                    Some(Concrete::Type(concrete)) => self.make(&concrete)?,
                    None => match parameter.default_value() {
                        Some(default) if !self.is_resolvable(dependency) => Arc::clone(default),
                        _ => self.make(dependency)?,
                    },
                }
            } else if let Some(default) = parameter.default_value() {
                Arc::clone(default)
            } else {
                return Err(AutowireError::unresolvable(id, name));
            };
            values.push((name.to_string(), value));
        }

        if !overrides.is_empty() {
            tracing::trace!(
                identifier = id,
                unused = ?overrides.names().collect::<Vec<_>>(),
                "Overrides did not match any parameter"
            );
        }

        tracing::trace!(identifier = id, arguments = values.len(), "Constructing");
        constructor(&Arguments::new(id, values, self.clone()))
    }
}

impl Default for Container {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("bindings", &self.state.bindings.len())
            .field("instances", &self.state.instances.len())
            .field("descriptors", &self.state.descriptors.len())
            .field("config", &self.state.config)
            .finish()
    }
}

/// Identity check on two erased instances.
pub fn same_instance(a: &Instance, b: &Instance) -> bool {
    Arc::ptr_eq(a, b)
}
