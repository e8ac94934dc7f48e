use proc_macro::TokenStream;

mod injectable;

/// Derive macro recording a struct's constructor for the container
///
/// Each named field becomes one constructor parameter, in declaration order:
///
/// - `Arc<T>` is a dependency on `T`
/// - `Arc<dyn Trait>` is a dependency on the trait binding
/// - `Lazy<T>` is a deferred handle and not a parameter at all
/// - anything else is a value with no type information, which must come
///   from a default or a per-call override
///
/// Field attributes:
///
/// - `#[inject(key = "mailer.smtp")]` resolves the field under that
///   identifier instead of its type
/// - `#[inject(default = expr)]` is used when nothing else supplies the field
///
/// # Example
/// ```ignore
/// use autowire::Injectable;
///
/// #[derive(Injectable)]
/// pub struct UserService {
///     repository: Arc<dyn UserRepository>,
///     #[inject(default = 3u32)]
///     retries: u32,
/// }
/// ```
#[proc_macro_derive(Injectable, attributes(inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    injectable::derive_injectable(input)
}
