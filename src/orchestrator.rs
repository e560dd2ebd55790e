//! Merge orchestration.
//!
//! A run validates the request, normalizes every input in order, applies
//! the fail-fast or skip-and-continue policy to inputs that cannot be
//! processed, hands the surviving documents to the merge engine, and
//! deletes every working copy it created, whatever the outcome.

use crate::engine::{BodyMerger, MergeEngine, MergeSource};
use crate::error::{Error, Result};
use crate::normalize::normalize;
use crate::options::MergeOptions;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempPath;
use tracing::{debug, info, instrument, warn};

/// A request to merge documents.
#[derive(Debug, Clone)]
pub struct MergeRequest {
    /// Input documents, in output order.
    pub inputs: Vec<PathBuf>,
    /// Path of the merged document.
    pub output: PathBuf,
    /// Run options.
    pub options: MergeOptions,
}

impl MergeRequest {
    /// Create a request with default options.
    pub fn new<I, P>(inputs: I, output: impl Into<PathBuf>) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            inputs: inputs.into_iter().map(Into::into).collect(),
            output: output.into(),
            options: MergeOptions::default(),
        }
    }

    /// Abort on the first unusable input, or skip unusable inputs.
    pub fn with_fail_fast(mut self, fail_fast: bool) -> Self {
        self.options.fail_fast = fail_fast;
        self
    }

    /// Replace the run options.
    pub fn with_options(mut self, options: MergeOptions) -> Self {
        self.options = options;
        self
    }

    /// Whether the run aborts on the first unusable input.
    pub fn fail_fast(&self) -> bool {
        self.options.fail_fast
    }

    /// Check the request shape and that every input exists.
    ///
    /// Runs before any normalization so a doomed request creates no
    /// working copies.
    pub fn validate(&self) -> Result<()> {
        if self.inputs.is_empty() {
            return Err(Error::InvalidArgument(
                "at least one input document is required".to_string(),
            ));
        }
        if self.output.to_string_lossy().trim().is_empty() {
            return Err(Error::InvalidArgument(
                "output path must not be blank".to_string(),
            ));
        }
        if let Some(missing) = self.inputs.iter().find(|input| !input.exists()) {
            return Err(Error::NotFound(missing.clone()));
        }
        Ok(())
    }
}

/// An input left out of the output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SkippedInput {
    /// The input as given.
    pub path: PathBuf,
    /// Why it could not be processed.
    pub reason: String,
}

/// Summary of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    /// The merged document.
    pub output: PathBuf,
    /// Inputs merged into the output, in order.
    pub merged: Vec<PathBuf>,
    /// Inputs whose legacy compatibility settings were normalized.
    pub normalized: Vec<PathBuf>,
    /// Inputs skipped because they could not be processed.
    pub skipped: Vec<SkippedInput>,
}

impl MergeReport {
    /// Serialize the report as JSON.
    pub fn to_json(&self, pretty: bool) -> Result<String> {
        let json = if pretty {
            serde_json::to_string_pretty(self)?
        } else {
            serde_json::to_string(self)?
        };
        Ok(json)
    }
}

/// Working copies owned by one run; deleted when dropped.
#[derive(Default)]
struct WorkingCopies {
    files: Vec<TempPath>,
}

impl WorkingCopies {
    fn push(&mut self, file: TempPath) {
        self.files.push(file);
    }
}

impl Drop for WorkingCopies {
    fn drop(&mut self) {
        if !self.files.is_empty() {
            debug!(count = self.files.len(), "cleaning up working copies");
        }
        for file in self.files.drain(..) {
            let path = file.to_path_buf();
            if let Err(e) = file.close() {
                warn!(path = %path.display(), error = %e, "failed to delete working copy");
            }
        }
    }
}

/// Merge documents with the default engine.
///
/// # Example
///
/// ```no_run
/// use docmerge::{merge, MergeRequest};
///
/// let request = MergeRequest::new(["a.docx", "b.docx"], "merged.docx");
/// let report = merge(&request)?;
/// println!("merged {} documents", report.merged.len());
/// # Ok::<(), docmerge::Error>(())
/// ```
pub fn merge(request: &MergeRequest) -> Result<MergeReport> {
    merge_with(request, &BodyMerger::new())
}

/// Merge documents with the given engine.
#[instrument(skip_all, fields(output = %request.output.display(), inputs = request.inputs.len()))]
pub fn merge_with(request: &MergeRequest, engine: &dyn MergeEngine) -> Result<MergeReport> {
    debug!("validating request");
    request.validate()?;

    // Declared before any normalization so every exit path below drops it.
    let mut copies = WorkingCopies::default();
    let mut sources = Vec::with_capacity(request.inputs.len());
    let mut report = MergeReport {
        output: request.output.clone(),
        ..MergeReport::default()
    };

    for (index, input) in request.inputs.iter().enumerate() {
        debug!(index = index + 1, path = %input.display(), "normalizing");
        let mut outcome = normalize(input, &request.options.normalize);

        if let Some(detail) = outcome.error_detail.take() {
            if request.options.fail_fast {
                return Err(Error::Normalization {
                    path: input.clone(),
                    detail,
                });
            }
            warn!(path = %input.display(), error = %detail, "skipping input");
            report.skipped.push(SkippedInput {
                path: input.clone(),
                reason: detail,
            });
            continue;
        }

        if let Some(copy) = outcome.take_temp_file() {
            copies.push(copy);
            report.normalized.push(input.clone());
        }
        sources.push(MergeSource {
            path: outcome.resolved_location,
            keep_sections: request.options.keep_sections,
        });
        report.merged.push(input.clone());
    }

    if sources.is_empty() {
        return Err(Error::NoValidInput(request.inputs.len()));
    }

    debug!(documents = sources.len(), "merging");
    let output_existed = request.output.exists();
    if let Err(e) = engine.merge(&sources, &request.output) {
        if !output_existed && request.output.exists() {
            remove_partial_output(&request.output);
        }
        return Err(match e {
            Error::MergeEngine(_) => e,
            other => Error::MergeEngine(other.to_string()),
        });
    }

    info!(
        merged = report.merged.len(),
        normalized = report.normalized.len(),
        skipped = report.skipped.len(),
        "merge complete"
    );
    Ok(report)
}

fn remove_partial_output(path: &Path) {
    if let Err(e) = fs::remove_file(path) {
        warn!(path = %path.display(), error = %e, "failed to remove partial output");
    }
}
