//! # Autowire
//!
//! A dependency injection container with recursive auto-wiring for Rust.
//!
//! The container keeps a binding table and a singleton cache. Asked for an
//! identifier it returns a cached instance, else follows a binding (a
//! factory or another identifier), else builds the type from its registered
//! constructor descriptor, resolving each dependency in declaration order.
//!
//! ## Features
//!
//! - **Auto-wiring**: `#[derive(Injectable)]` records each constructor
//!   parameter; dependencies are built recursively on demand
//! - **Singletons**: shared bindings are built once and cached
//! - **Trait Object Support**: bind `dyn Trait` to an implementation and
//!   inject `Arc<dyn Trait>`
//! - **Contextual Bindings**: give one consumer a different implementation
//! - **Cycle Detection**: re-entering an identifier fails with
//!   [`AutowireError::CircularDependency`] instead of overflowing the stack
//!
//! ## Quick Start
//!
//! ```rust
//! use autowire::{Container, Injectable, Parameters};
//! use std::sync::Arc;
//!
//! pub trait Mailer: Send + Sync {
//!     fn send(&self, to: &str) -> String;
//! }
//!
//! #[derive(Injectable)]
//! pub struct SmtpMailer {
//!     #[inject(default = "localhost")]
//!     host: String,
//! }
//!
//! impl Mailer for SmtpMailer {
//!     fn send(&self, to: &str) -> String {
//!         format!("{} via {}", to, self.host)
//!     }
//! }
//!
//! #[derive(Injectable)]
//! pub struct Signup {
//!     mailer: Arc<dyn Mailer>,
//! }
//!
//! let container = Container::new();
//! container.register_injectable::<SmtpMailer>();
//! container.register_injectable::<Signup>();
//! container.singleton_trait::<dyn Mailer, SmtpMailer, _>(|m| m as Arc<dyn Mailer>);
//!
//! let signup = container.resolve::<Signup>().unwrap();
//! assert_eq!(signup.mailer.send("ada@example.com"), "ada@example.com via localhost");
//!
//! let custom = container
//!     .resolve_with::<SmtpMailer>(Parameters::new().with("host", "smtp.example.com".to_string()))
//!     .unwrap();
//! assert_eq!(custom.send("ada@example.com"), "ada@example.com via smtp.example.com");
//! ```

pub mod config;
pub mod di;
pub mod error;

// Re-export core types
pub use config::ContainerConfig;
pub use di::{
    Arguments, Binding, Concrete, Container, ContainerBuilder, Injectable, Instance, Lazy,
    Lifetime, Parameter, Parameters, TypeDescriptor, same_instance, type_key,
};
pub use error::{AutowireError, Result};

// Re-export the derive macro; it lives in the macro namespace next to the trait
pub use autowire_macro::Injectable;

/// Prelude module for convenient imports
///
/// ```
/// use autowire::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::ContainerConfig;
    pub use crate::di::{
        Arguments, Concrete, Container, ContainerBuilder, Injectable, Lazy, Lifetime, Parameter,
        Parameters, TypeDescriptor, type_key,
    };
    pub use crate::error::{AutowireError, Result};
    pub use autowire_macro::Injectable;
    pub use std::sync::Arc;
}
