/// Error type for copy operations.
///
/// After `Failed` the destination is in an unspecified state and must be
/// discarded.
#[derive(Debug, thiserror::Error)]
pub enum CopyError {
    /// Source and destination are not the same concrete type.
    #[error("types not equal: cannot copy {found} into {expected}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
    /// The traversal hit a fault it could not recover from.
    #[error("can't copy: {0}")]
    Failed(String),
}

impl CopyError {
    pub(crate) fn failed(message: impl Into<String>) -> Self {
        CopyError::Failed(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages() {
        let mismatch = CopyError::TypeMismatch {
            expected: "u8",
            found: "String",
        };
        assert!(mismatch.to_string().starts_with("types not equal"));
        assert!(mismatch.to_string().contains("String"));

        let failed = CopyError::failed("cell already borrowed");
        assert_eq!(failed.to_string(), "can't copy: cell already borrowed");
    }
}
