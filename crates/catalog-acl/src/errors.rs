use crate::validator::ValidationErrors;
use thiserror::Error;

/// Failure of an external collaborator (store, search index, token service).
#[derive(Debug, Error)]
pub enum DependencyError {
    #[error("{service} unavailable: {message}")]
    Unavailable {
        service: &'static str,
        message: String,
    },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type LookupResult<T> = Result<T, DependencyError>;

#[derive(Debug, Error)]
pub enum AclError {
    /// The proposed entity was rejected; every collected message is included.
    #[error("validation failed: {0}")]
    Validation(ValidationErrors),
    /// The caller lacks a permission required for the mutation.
    #[error("permission denied: {0}")]
    PermissionDenied(String),
    #[error(transparent)]
    Dependency(#[from] DependencyError),
}

impl From<ValidationErrors> for AclError {
    fn from(errors: ValidationErrors) -> Self {
        AclError::Validation(errors)
    }
}

pub type AclResult<T> = Result<T, AclError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validator::FieldPath;

    #[test]
    fn error_display_variants() {
        let errors = vec![
            AclError::Validation(ValidationErrors::single(
                FieldPath::new(["group_permissions"]),
                "bad",
            )),
            AclError::PermissionDenied("nope".to_string()),
            AclError::Dependency(DependencyError::Unavailable {
                service: "search",
                message: "timeout".to_string(),
            }),
            AclError::Dependency(DependencyError::Unexpected(anyhow::anyhow!("boom"))),
        ];

        for error in errors {
            let rendered = error.to_string();
            assert!(!rendered.is_empty());
        }
    }

    #[test]
    fn validation_display_includes_path() {
        let error = AclError::from(ValidationErrors::single(
            FieldPath::new(["catalog_item_identity"]),
            "broken",
        ));
        assert_eq!(
            error.to_string(),
            "validation failed: catalog_item_identity: broken"
        );
    }
}
