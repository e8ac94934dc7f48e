use crate::di::TypeDescriptor;

/// Trait for types that describe their own constructor to the container
///
/// This trait is typically implemented automatically via the
/// `#[derive(Injectable)]` macro.
///
/// # Example
/// ```
/// use autowire::{Container, Injectable};
/// use std::sync::Arc;
///
/// #[derive(Injectable)]
/// pub struct Clock;
///
/// #[derive(Injectable)]
/// pub struct Scheduler {
///     // Resolved from the container
///     clock: Arc<Clock>,
///     // No type information: needs a default or an override
///     #[inject(default = 4u8)]
///     workers: u8,
/// }
///
/// let container = Container::new();
/// container.register_injectable::<Clock>();
/// container.register_injectable::<Scheduler>();
///
/// let scheduler = container.resolve::<Scheduler>().unwrap();
/// assert_eq!(scheduler.workers, 4);
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// The constructor metadata registered for `Self`.
    fn descriptor() -> TypeDescriptor;
}
