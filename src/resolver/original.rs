//! Discovery of the toolchain version the project originally configured.

use std::sync::{Mutex, PoisonError};

/// The greatest toolchain version declared by any plugin request so far.
///
/// Several sub-projects may each apply a toolchain plugin; the
/// lexicographically greatest declared version wins.
#[derive(Debug, Default)]
pub struct OriginalVersion {
    max: Mutex<Option<String>>,
}

impl OriginalVersion {
    pub fn new() -> Self {
        OriginalVersion::default()
    }

    /// Start from a known version.
    pub fn with_version(version: impl Into<String>) -> Self {
        OriginalVersion {
            max: Mutex::new(Some(version.into())),
        }
    }

    /// Record a declared version. Returns true if it became the new maximum.
    pub fn observe(&self, version: &str) -> bool {
        let mut max = self.max.lock().unwrap_or_else(PoisonError::into_inner);
        match max.as_deref() {
            Some(current) if current >= version => false,
            _ => {
                tracing::info!("Found original Kotlin version {}", version);
                *max = Some(version.to_string());
                true
            }
        }
    }

    pub fn get(&self) -> Option<String> {
        self.max
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keeps_maximum() {
        let original = OriginalVersion::new();
        assert_eq!(original.get(), None);

        assert!(original.observe("1.5.10"));
        assert!(!original.observe("1.4.32"));
        assert!(original.observe("1.5.20"));
        assert!(!original.observe("1.5.20"));

        assert_eq!(original.get().as_deref(), Some("1.5.20"));
    }
}
