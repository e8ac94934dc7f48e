use thiserror::Error;

pub type Result<T> = std::result::Result<T, AutowireError>;

#[derive(Debug, Error)]
pub enum AutowireError {
    #[error("Circular dependency detected while resolving [{identifier}]: {}", .chain.join(" -> "))]
    CircularDependency {
        identifier: String,
        chain: Vec<String>,
    },

    #[error("Target [{identifier}] is not instantiable: {reason}")]
    NotInstantiable { identifier: String, reason: String },

    #[error("Unresolvable dependency resolving parameter [{parameter}] of [{owner}]")]
    UnresolvableDependency { owner: String, parameter: String },

    #[error("Failed to downcast [{identifier}] to {type_name}")]
    DowncastFailed {
        identifier: String,
        type_name: String,
    },

    #[error("Resolution of [{identifier}] exceeded the maximum depth of {max_depth}")]
    ResolutionTooDeep { identifier: String, max_depth: usize },

    #[error("Lazy dependency [{identifier}] outlived its container")]
    ContainerDropped { identifier: String },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Factory(#[from] anyhow::Error),
}

impl AutowireError {
    pub(crate) fn not_instantiable(identifier: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::NotInstantiable {
            identifier: identifier.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn unresolvable(owner: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self::UnresolvableDependency {
            owner: owner.into(),
            parameter: parameter.into(),
        }
    }

    pub(crate) fn downcast_failed<T: ?Sized>(identifier: impl Into<String>) -> Self {
        Self::DowncastFailed {
            identifier: identifier.into(),
            type_name: std::any::type_name::<T>().to_string(),
        }
    }

    /// The identifier the error is about, when it names one.
    pub fn identifier(&self) -> Option<&str> {
        match self {
            Self::CircularDependency { identifier, .. }
            | Self::NotInstantiable { identifier, .. }
            | Self::DowncastFailed { identifier, .. }
            | Self::ResolutionTooDeep { identifier, .. }
            | Self::ContainerDropped { identifier } => Some(identifier),
            Self::UnresolvableDependency { owner, .. } => Some(owner),
            Self::Config(_) | Self::Factory(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_circular_message_names_chain() {
        let err = AutowireError::CircularDependency {
            identifier: "A".to_string(),
            chain: vec!["A".to_string(), "B".to_string(), "A".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Circular dependency detected while resolving [A]: A -> B -> A"
        );
        assert_eq!(err.identifier(), Some("A"));
    }

    #[test]
    fn test_unresolvable_message_names_parameter() {
        let err = AutowireError::unresolvable("Mailer", "port");
        assert!(err.to_string().contains("[port]"));
        assert!(err.to_string().contains("[Mailer]"));
    }

    #[test]
    fn test_factory_error_is_transparent() {
        let err: AutowireError = anyhow::anyhow!("database offline").into();
        assert_eq!(err.to_string(), "database offline");
        assert_eq!(err.identifier(), None);
    }
}
