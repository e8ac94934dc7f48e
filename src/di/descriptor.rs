use crate::di::binding::{downcast, downcast_trait};
use crate::di::{Container, Instance, type_key};
use crate::error::{AutowireError, Result};
use std::fmt;
use std::sync::Arc;

/// A constructor receives the resolved arguments in declaration order.
pub type ConstructorFn = Arc<dyn Fn(&Arguments) -> Result<Instance> + Send + Sync>;

/// One constructor parameter
///
/// A parameter with a dependency identifier is resolved through the
/// container; one without carries no type information and needs either an
/// override or a default.
#[derive(Clone)]
pub struct Parameter {
    name: String,
    dependency: Option<String>,
    default: Option<Instance>,
}

impl Parameter {
    /// A parameter resolved as the type `T`.
    pub fn dependency<T: ?Sized + 'static>(name: impl Into<String>) -> Self {
        Self::dependency_on(name, type_key::<T>())
    }

    /// A parameter resolved under an arbitrary identifier.
    pub fn dependency_on(name: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependency: Some(identifier.into()),
            default: None,
        }
    }

    /// A parameter with no type information.
    pub fn value(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dependency: None,
            default: None,
        }
    }

    /// Attach a default, used when nothing else can supply the parameter.
    pub fn or_default<V: Send + Sync + 'static>(self, value: V) -> Self {
        self.or_default_instance(Arc::new(value))
    }

    pub fn or_default_instance(mut self, value: Instance) -> Self {
        self.default = Some(value);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dependency_identifier(&self) -> Option<&str> {
        self.dependency.as_deref()
    }

    pub fn default_value(&self) -> Option<&Instance> {
        self.default.as_ref()
    }
}

impl fmt::Debug for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Parameter")
            .field("name", &self.name)
            .field("dependency", &self.dependency)
            .field("has_default", &self.default.is_some())
            .finish()
    }
}

#[derive(Clone)]
pub enum Constructor {
    Concrete(ConstructorFn),
    /// Interfaces and other types that only resolve through a binding.
    Abstract,
}

/// Registered constructor metadata for one identifier
///
/// This is the explicit stand-in for constructor reflection: the ordered
/// parameter list plus the closure that assembles the value.
///
/// ```
/// use autowire::{Container, TypeDescriptor};
/// use std::sync::Arc;
///
/// struct Clock;
/// struct Scheduler {
///     clock: Arc<Clock>,
///     workers: u8,
/// }
///
/// let container = Container::new();
/// container.register_type(TypeDescriptor::of::<Clock>().construct(|_| Ok(Clock)));
/// container.register_type(
///     TypeDescriptor::of::<Scheduler>()
///         .dependency::<Clock>("clock")
///         .value_or("workers", 4u8)
///         .construct(|args| {
///             Ok(Scheduler {
///                 clock: args.get::<Clock>("clock")?,
///                 workers: args.value::<u8>("workers")?,
///             })
///         }),
/// );
///
/// let scheduler = container.resolve::<Scheduler>().unwrap();
/// assert_eq!(scheduler.workers, 4);
/// ```
#[derive(Clone)]
pub struct TypeDescriptor {
    identifier: String,
    parameters: Vec<Parameter>,
    constructor: Constructor,
}

impl TypeDescriptor {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self::named(type_key::<T>())
    }

    /// Starts out abstract until [`construct`](Self::construct) is called.
    pub fn named(identifier: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            parameters: Vec::new(),
            constructor: Constructor::Abstract,
        }
    }

    pub fn interface<T: ?Sized + 'static>() -> Self {
        Self::of::<T>()
    }

    pub fn default_constructible<T: Default + Send + Sync + 'static>() -> Self {
        Self::of::<T>().construct(|_| Ok(T::default()))
    }

    pub fn param(mut self, parameter: Parameter) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn dependency<T: ?Sized + 'static>(self, name: impl Into<String>) -> Self {
        self.param(Parameter::dependency::<T>(name))
    }

    pub fn dependency_on(self, name: impl Into<String>, identifier: impl Into<String>) -> Self {
        self.param(Parameter::dependency_on(name, identifier))
    }

    pub fn value(self, name: impl Into<String>) -> Self {
        self.param(Parameter::value(name))
    }

    pub fn value_or<V: Send + Sync + 'static>(self, name: impl Into<String>, default: V) -> Self {
        self.param(Parameter::value(name).or_default(default))
    }

    pub fn construct<T, F>(mut self, constructor: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&Arguments) -> Result<T> + Send + Sync + 'static,
    {
        self.constructor = Constructor::Concrete(Arc::new(move |args| {
            let value = constructor(args)?;
            Ok(Arc::new(value) as Instance)
        }));
        self
    }

    /// Like [`construct`](Self::construct), for constructors that already
    /// produce an erased instance (trait objects, shared handles).
    pub fn construct_instance<F>(mut self, constructor: F) -> Self
    where
        F: Fn(&Arguments) -> Result<Instance> + Send + Sync + 'static,
    {
        self.constructor = Constructor::Concrete(Arc::new(constructor));
        self
    }

    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn constructor(&self) -> &Constructor {
        &self.constructor
    }

    pub fn is_instantiable(&self) -> bool {
        matches!(self.constructor, Constructor::Concrete(_))
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("identifier", &self.identifier)
            .field("parameters", &self.parameters)
            .field("instantiable", &self.is_instantiable())
            .finish()
    }
}

/// Resolved constructor arguments, keyed by parameter name
pub struct Arguments {
    owner: String,
    values: Vec<(String, Instance)>,
    container: Container,
}

impl Arguments {
    pub(crate) fn new(owner: impl Into<String>, values: Vec<(String, Instance)>, container: Container) -> Self {
        Self {
            owner: owner.into(),
            values,
            container,
        }
    }

    /// The identifier being constructed.
    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn container(&self) -> &Container {
        &self.container
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    pub fn raw(&self, name: &str) -> Result<Instance> {
        self.values
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, value)| Arc::clone(value))
            .ok_or_else(|| AutowireError::unresolvable(&self.owner, name))
    }

    pub fn get<T: Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        downcast::<T>(&self.qualified(name), self.raw(name)?)
    }

    /// Fetch a trait-object dependency stored as `Arc<Arc<T>>`.
    pub fn get_trait<T: ?Sized + Send + Sync + 'static>(&self, name: &str) -> Result<Arc<T>> {
        downcast_trait::<T>(&self.qualified(name), self.raw(name)?)
    }

    pub fn value<T: Clone + Send + Sync + 'static>(&self, name: &str) -> Result<T> {
        self.get::<T>(name).map(|value| value.as_ref().clone())
    }

    fn qualified(&self, name: &str) -> String {
        format!("{}::{}", self.owner, name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_named_descriptor_starts_abstract() {
        let descriptor = TypeDescriptor::named("Contracts\\Cache");
        assert!(!descriptor.is_instantiable());
        assert!(descriptor.parameters().is_empty());

        let descriptor = descriptor.construct(|_| Ok(()));
        assert!(descriptor.is_instantiable());
    }

    #[test]
    fn test_parameters_keep_declaration_order() {
        let descriptor = TypeDescriptor::named("Mailer")
            .dependency_on("transport", "Transport")
            .value("host")
            .value_or("port", 25u16);

        let names: Vec<_> = descriptor.parameters().iter().map(Parameter::name).collect();
        assert_eq!(names, ["transport", "host", "port"]);
        assert_eq!(
            descriptor.parameters()[0].dependency_identifier(),
            Some("Transport")
        );
        assert!(descriptor.parameters()[1].default_value().is_none());
        assert!(descriptor.parameters()[2].default_value().is_some());
    }

    #[test]
    fn test_arguments_accessors() {
        let args = Arguments::new(
            "Mailer",
            vec![
                ("host".to_string(), Arc::new("smtp.local".to_string()) as Instance),
                ("port".to_string(), Arc::new(2525u16) as Instance),
            ],
            Container::new(),
        );

        assert_eq!(args.len(), 2);
        assert_eq!(args.value::<String>("host").unwrap(), "smtp.local");
        assert_eq!(*args.get::<u16>("port").unwrap(), 2525);
        assert_eq!(args.names().collect::<Vec<_>>(), ["host", "port"]);

        let err = args.get::<u32>("port").unwrap_err();
        assert!(matches!(err, AutowireError::DowncastFailed { .. }));
        assert_eq!(err.identifier(), Some("Mailer::port"));

        let err = args.raw("timeout").unwrap_err();
        assert!(matches!(
            err,
            AutowireError::UnresolvableDependency { ref parameter, .. } if parameter == "timeout"
        ));
    }
}
