use std::fmt;

use uuid::Uuid;

/// Opaque handle to a staged input image, e.g. a staging-store path.
/// Assigned at submission time and never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceReference(String);

impl SourceReference {
    /// Reference for a freshly staged upload: `<upload_id>/<filename>`.
    pub fn staged(upload_id: Uuid, filename: &str) -> Self {
        Self(format!("{}/{}", upload_id, filename))
    }

    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Display for SourceReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
