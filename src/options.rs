//! Normalization and merge options.

use crate::docx::settings::MODERN_COMPAT_VERSION;
use std::path::PathBuf;

/// Options for compatibility-mode normalization.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Directory for normalized working copies (default: system temp dir)
    pub temp_dir: Option<PathBuf>,

    /// Compatibility mode written into normalized documents
    pub compat_version: u32,
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self {
            temp_dir: None,
            compat_version: MODERN_COMPAT_VERSION,
        }
    }
}

impl NormalizeOptions {
    /// Create default normalization options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the directory for normalized working copies.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.temp_dir = Some(dir.into());
        self
    }

    /// Set the compatibility mode written into normalized documents.
    pub fn with_compat_version(mut self, version: u32) -> Self {
        self.compat_version = version;
        self
    }
}

/// Options for a merge run.
#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Abort the run on the first input that cannot be processed.
    ///
    /// When false, such inputs are skipped with a warning.
    pub fail_fast: bool,

    /// Start every appended document in a new section laid out like the
    /// first document
    pub keep_sections: bool,

    /// Normalization settings applied to every input
    pub normalize: NormalizeOptions,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            fail_fast: true,
            keep_sections: true,
            normalize: NormalizeOptions::default(),
        }
    }
}

impl MergeOptions {
    /// Create default merge options.
    pub fn new() -> Self {
        Self::default()
    }

    /// Abort on the first unusable input, or skip unusable inputs.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Set whether appended documents start new sections.
    pub fn with_keep_sections(mut self, keep: bool) -> Self {
        self.keep_sections = keep;
        self
    }

    /// Set the directory for normalized working copies.
    pub fn with_temp_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.normalize = self.normalize.with_temp_dir(dir);
        self
    }

    /// Replace the normalization settings.
    pub fn with_normalize_options(mut self, normalize: NormalizeOptions) -> Self {
        self.normalize = normalize;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = MergeOptions::default();
        assert!(options.fail_fast);
        assert!(options.keep_sections);
        assert_eq!(options.normalize.compat_version, 16);
        assert!(options.normalize.temp_dir.is_none());
    }

    #[test]
    fn test_builder() {
        let options = MergeOptions::new()
            .with_fail_fast(false)
            .with_keep_sections(false)
            .with_temp_dir("/tmp/work")
            .with_normalize_options(
                NormalizeOptions::new()
                    .with_temp_dir("/tmp/other")
                    .with_compat_version(15),
            );

        assert!(!options.fail_fast);
        assert!(!options.keep_sections);
        assert_eq!(options.normalize.temp_dir, Some(PathBuf::from("/tmp/other")));
        assert_eq!(options.normalize.compat_version, 15);
    }
}
