//! Registry errors.

use std::path::PathBuf;

use thiserror::Error;

/// Registry error types, one per failure category.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// The environment variable supplying the backing-file path is not set.
    #[error("{0} environment variable is not defined")]
    EnvNotSet(String),

    /// The configured path exists but is a directory.
    #[error("registry path `{0}` points to a directory. It should be a file.")]
    IsDirectory(PathBuf),

    /// The backing file exists but cannot be read.
    #[error("cannot read registry file `{path}`: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A missing or empty backing file could not be initialised.
    #[error("cannot initialise registry file `{path}`: {source}")]
    Init {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The backing file does not contain a valid JSON object of strings.
    #[error("registry file `{path}` does not contain valid JSON: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The mapping could not be serialized to JSON.
    #[error("cannot marshal registry to valid JSON: {0}")]
    Marshal(#[source] serde_json::Error),

    /// The backing file could not be replaced.
    #[error("cannot write registry file `{path}`: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_env_not_set_display() {
        let err = RegistryError::EnvNotSet("BROCADE_REGISTRY".to_string());
        assert_eq!(
            err.to_string(),
            "BROCADE_REGISTRY environment variable is not defined"
        );
    }

    #[test]
    fn test_is_directory_display() {
        let err = RegistryError::IsDirectory(PathBuf::from("/tmp/registry"));
        assert!(err.to_string().contains("/tmp/registry"));
        assert!(err.to_string().contains("directory"));
    }

    #[test]
    fn test_read_display_carries_path_and_cause() {
        let err = RegistryError::Read {
            path: PathBuf::from("/tmp/registry.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let display = err.to_string();
        assert!(display.contains("/tmp/registry.json"));
        assert!(display.contains("denied"));
    }

    #[test]
    fn test_parse_display() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = RegistryError::Parse {
            path: PathBuf::from("/tmp/registry.json"),
            source,
        };
        assert!(err.to_string().contains("valid JSON"));
        assert!(err.to_string().contains("/tmp/registry.json"));
    }

    #[test]
    fn test_error_debug_names_variant() {
        let err = RegistryError::EnvNotSet("VAR".to_string());
        assert!(format!("{:?}", err).contains("EnvNotSet"));
    }
}
