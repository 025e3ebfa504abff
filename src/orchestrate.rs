//! Auto and manual merge runs
//!
//! Groups are merged one at a time. A failing group is recorded in the
//! report and the run moves on; outputs already written stay in place.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use crate::error::{Error, Result};
use crate::pairing::{
    list_pdfs, pair_documents, Convention, DocumentRef, Identifier, Pairing, PairingIssue,
};
use crate::pdf::{merge_pdfs, MergeOptions};

/// Group label used for manual merges in error messages
pub const MANUAL_GROUP: &str = "manual";

/// Name of the output folder created inside the input folder by default
pub const DEFAULT_OUTPUT_DIR: &str = "merged";

/// Where auto mode writes when no output folder is chosen
pub fn default_output_dir(folder: &Path) -> PathBuf {
    folder.join(DEFAULT_OUTPUT_DIR)
}

/// Outcome of merging one complete group
#[derive(Debug)]
pub enum MergeStatus {
    Merged { pages: usize },
    Failed(Error),
}

/// Output path and status for one complete group
#[derive(Debug)]
pub struct MergeResult {
    pub identifier: Identifier,
    pub output_path: PathBuf,
    pub status: MergeStatus,
}

impl MergeResult {
    pub fn is_success(&self) -> bool {
        matches!(self.status, MergeStatus::Merged { .. })
    }
}

/// Everything that happened during one auto run
#[derive(Debug, Default)]
pub struct MergeReport {
    /// One entry per complete group, in identifier order
    pub results: Vec<MergeResult>,
    /// Groups and documents that were skipped
    pub issues: Vec<PairingIssue>,
}

impl MergeReport {
    pub fn merged_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }

    pub fn failures(&self) -> impl Iterator<Item = &MergeResult> {
        self.results.iter().filter(|r| !r.is_success())
    }

    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }
}

/// Scan `folder`, then merge every complete group into `output_dir`
///
/// A folder without any PDF is rejected with `Error::NoPdfsFound`.
pub fn auto_merge(folder: &Path, output_dir: &Path, convention: &Convention) -> Result<MergeReport> {
    if same_location(folder, output_dir) {
        warn!(
            folder = %folder.display(),
            "writing outputs into the input folder, they will be scanned on the next run"
        );
    }

    let paths = list_pdfs(folder)?;
    if paths.is_empty() {
        return Err(Error::NoPdfsFound(folder.to_path_buf()));
    }

    let pairing = pair_documents(&paths, convention);
    merge_pairing(&pairing, output_dir, convention)
}

/// Merge every complete group of an existing pairing
///
/// Resolution pages come first, then stipulation pages. Fails only when
/// the output folder cannot be created; per-group failures land in the
/// report.
pub fn merge_pairing(pairing: &Pairing, output_dir: &Path, convention: &Convention) -> Result<MergeReport> {
    let issues = pairing.issues();
    for issue in &issues {
        warn!("skipped: {}", issue);
    }

    let mut report = MergeReport {
        results: Vec::new(),
        issues,
    };

    if pairing.complete_groups().next().is_none() {
        warn!("no complete resolution/stipulation pairs found");
        return Ok(report);
    }

    fs::create_dir_all(output_dir)?;

    for group in pairing.complete_groups() {
        if let Some((resolution, stipulation)) = group.pair() {
            let result = merge_group(&group.identifier, resolution, stipulation, output_dir, convention);
            report.results.push(result);
        }
    }

    info!(
        merged = report.merged_count(),
        failed = report.results.len() - report.merged_count(),
        skipped = report.issues.len(),
        "auto merge finished"
    );

    Ok(report)
}

fn merge_group(
    identifier: &Identifier,
    resolution: &DocumentRef,
    stipulation: &DocumentRef,
    output_dir: &Path,
    convention: &Convention,
) -> MergeResult {
    let output_path =
        output_dir.join(convention.output_name(identifier, &resolution.path, &stipulation.path));

    let outcome = if [&resolution.path, &stipulation.path]
        .iter()
        .any(|input| same_location(input, &output_path))
    {
        Err(Error::General(format!(
            "output {} would overwrite an input",
            output_path.display()
        )))
    } else {
        merge_pdfs(&MergeOptions {
            input_paths: vec![resolution.path.clone(), stipulation.path.clone()],
            output_path: output_path.clone(),
        })
    };

    let status = match outcome {
        Ok(pages) => {
            info!(group = %identifier, output = %output_path.display(), pages, "merged");
            MergeStatus::Merged { pages }
        }
        Err(source) => {
            let err = Error::Merge {
                group: identifier.to_string(),
                source: Box::new(source),
            };
            warn!("{}", err);
            MergeStatus::Failed(err)
        }
    };

    MergeResult {
        identifier: identifier.clone(),
        output_path,
        status,
    }
}

/// Merge two explicit files, `first` then `second`, into `output`
///
/// Returns the number of pages written.
pub fn manual_merge(first: &Path, second: &Path, output: &Path) -> Result<usize> {
    let is_pdf_name = output
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false);
    if !is_pdf_name {
        return Err(Error::InvalidOutputName(output.to_path_buf()));
    }

    if same_location(first, second) {
        return Err(Error::SameInput(first.to_path_buf()));
    }
    if same_location(first, output) || same_location(second, output) {
        return Err(Error::General(format!(
            "output {} would overwrite an input",
            output.display()
        )));
    }

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let pages = merge_pdfs(&MergeOptions {
        input_paths: vec![first.to_path_buf(), second.to_path_buf()],
        output_path: output.to_path_buf(),
    })
    .map_err(|source| Error::Merge {
        group: MANUAL_GROUP.to_string(),
        source: Box::new(source),
    })?;

    info!(output = %output.display(), pages, "merged");
    Ok(pages)
}

/// Compare paths after resolving them, falling back to the literal paths
fn same_location(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
