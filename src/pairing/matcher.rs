//! Pair resolutions with stipulations by filename identifier

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use glob::{glob, Pattern};
use thiserror::Error;
use tracing::{debug, warn};
use crate::error::{Error, Result};
use super::convention::Convention;
use super::document::{file_name, DocumentKind, DocumentRef, Identifier};

/// Why a document could not take part in auto-merge
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnmatchedReason {
    /// No identifier could be extracted from the file name
    NoIdentifier,
    /// The file name matches neither the resolution nor the stipulation markers
    Unclassified,
    /// No document of the other kind shares the identifier
    MissingCounterpart(DocumentKind),
    /// Several documents of the other kind share the identifier
    ConflictingCounterpart(DocumentKind),
}

impl fmt::Display for UnmatchedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnmatchedReason::NoIdentifier => f.write_str("file name has no identifier"),
            UnmatchedReason::Unclassified => {
                f.write_str("file name is neither a resolution nor a stipulation")
            }
            UnmatchedReason::MissingCounterpart(kind) => write!(f, "no matching {}", kind),
            UnmatchedReason::ConflictingCounterpart(kind) => {
                write!(f, "identifier shared by several {} documents", kind)
            }
        }
    }
}

/// A problem found while pairing, reported to the user instead of merged
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PairingIssue {
    #[error("Unmatched document {}: {reason}", .path.display())]
    UnmatchedDocument {
        path: PathBuf,
        reason: UnmatchedReason,
    },

    #[error(
        "Conflicting identifier {identifier}: {} {kind} documents ({})",
        .paths.len(),
        join_names(.paths)
    )]
    ConflictingIdentifier {
        identifier: Identifier,
        kind: DocumentKind,
        paths: Vec<PathBuf>,
    },
}

fn join_names(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| file_name(p)).collect::<Vec<_>>().join(", ")
}

/// How far a group got towards being a mergeable pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GroupState {
    /// Exactly one resolution and one stipulation
    Complete {
        resolution: DocumentRef,
        stipulation: DocumentRef,
    },
    /// One document, the other side is missing
    Incomplete {
        present: DocumentRef,
        missing: DocumentKind,
    },
    /// More than one document on at least one side
    Conflict {
        resolutions: Vec<DocumentRef>,
        stipulations: Vec<DocumentRef>,
    },
}

/// Every document sharing one identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchGroup {
    pub identifier: Identifier,
    pub state: GroupState,
}

impl MatchGroup {
    /// Build a group from the documents found for one identifier
    fn from_sides(
        identifier: Identifier,
        mut resolutions: Vec<DocumentRef>,
        mut stipulations: Vec<DocumentRef>,
    ) -> Self {
        let state = match (resolutions.len(), stipulations.len()) {
            (1, 1) => GroupState::Complete {
                resolution: resolutions.remove(0),
                stipulation: stipulations.remove(0),
            },
            (1, 0) => GroupState::Incomplete {
                present: resolutions.remove(0),
                missing: DocumentKind::Stipulation,
            },
            (0, 1) => GroupState::Incomplete {
                present: stipulations.remove(0),
                missing: DocumentKind::Resolution,
            },
            _ => GroupState::Conflict {
                resolutions,
                stipulations,
            },
        };

        Self { identifier, state }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.state, GroupState::Complete { .. })
    }

    /// The resolution and stipulation when the group is complete
    pub fn pair(&self) -> Option<(&DocumentRef, &DocumentRef)> {
        match &self.state {
            GroupState::Complete { resolution, stipulation } => Some((resolution, stipulation)),
            _ => None,
        }
    }

    /// Issues that keep this group out of auto-merge
    pub fn issues(&self) -> Vec<PairingIssue> {
        match &self.state {
            GroupState::Complete { .. } => Vec::new(),
            GroupState::Incomplete { present, missing } => vec![PairingIssue::UnmatchedDocument {
                path: present.path.clone(),
                reason: UnmatchedReason::MissingCounterpart(*missing),
            }],
            GroupState::Conflict { resolutions, stipulations } => [
                (DocumentKind::Resolution, resolutions, stipulations),
                (DocumentKind::Stipulation, stipulations, resolutions),
            ]
            .into_iter()
            .filter(|(_, docs, _)| !docs.is_empty())
            .flat_map(|(kind, docs, others)| {
                if docs.len() > 1 {
                    vec![PairingIssue::ConflictingIdentifier {
                        identifier: self.identifier.clone(),
                        kind,
                        paths: docs.iter().map(|d| d.path.clone()).collect(),
                    }]
                } else {
                    // The lone document is held back by the other side's conflict
                    docs.iter()
                        .map(|d| PairingIssue::UnmatchedDocument {
                            path: d.path.clone(),
                            reason: UnmatchedReason::ConflictingCounterpart(others[0].kind),
                        })
                        .collect()
                }
            })
            .collect(),
        }
    }
}

/// The outcome of pairing one folder
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Pairing {
    /// Groups ordered by identifier
    pub groups: Vec<MatchGroup>,
    /// Documents that could not be placed in any group, ordered by file name
    pub unplaced: Vec<(PathBuf, UnmatchedReason)>,
}

impl Pairing {
    /// Groups ready to merge
    pub fn complete_groups(&self) -> impl Iterator<Item = &MatchGroup> {
        self.groups.iter().filter(|g| g.is_complete())
    }

    /// Every reported problem: unplaced documents first, then per group
    pub fn issues(&self) -> Vec<PairingIssue> {
        let unplaced = self.unplaced.iter().map(|(path, reason)| PairingIssue::UnmatchedDocument {
            path: path.clone(),
            reason: *reason,
        });

        unplaced
            .chain(self.groups.iter().flat_map(MatchGroup::issues))
            .collect()
    }
}

/// Pair an explicit list of PDF paths
///
/// Output does not depend on the order of `paths`.
pub fn pair_documents(paths: &[PathBuf], convention: &Convention) -> Pairing {
    let mut sorted: Vec<&PathBuf> = paths.iter().collect();
    sorted.sort_by(|a, b| file_name(a).cmp(&file_name(b)).then_with(|| a.cmp(b)));
    sorted.dedup();

    let mut sides: BTreeMap<Identifier, (Vec<DocumentRef>, Vec<DocumentRef>)> = BTreeMap::new();
    let mut unplaced = Vec::new();

    for path in sorted {
        let name = file_name(path);

        let Some(identifier) = convention.identifier(&name) else {
            debug!(file = %name, "no identifier");
            unplaced.push((path.clone(), UnmatchedReason::NoIdentifier));
            continue;
        };

        let Some(kind) = convention.classify(&name) else {
            debug!(file = %name, "unclassified");
            unplaced.push((path.clone(), UnmatchedReason::Unclassified));
            continue;
        };

        debug!(file = %name, %identifier, %kind, "classified");

        let entry = sides.entry(identifier.clone()).or_default();
        let doc = DocumentRef {
            path: path.clone(),
            identifier,
            kind,
        };
        match kind {
            DocumentKind::Resolution => entry.0.push(doc),
            DocumentKind::Stipulation => entry.1.push(doc),
        }
    }

    let groups = sides
        .into_iter()
        .map(|(identifier, (resolutions, stipulations))| {
            MatchGroup::from_sides(identifier, resolutions, stipulations)
        })
        .collect();

    Pairing { groups, unplaced }
}

/// List the PDFs directly inside `folder` and pair them
pub fn scan_folder(folder: &Path, convention: &Convention) -> Result<Pairing> {
    let paths = list_pdfs(folder)?;
    debug!(folder = %folder.display(), files = paths.len(), "scanned folder");
    Ok(pair_documents(&paths, convention))
}

/// PDF files directly inside `folder`, extension compared case-insensitively
pub fn list_pdfs(folder: &Path) -> Result<Vec<PathBuf>> {
    if !folder.is_dir() {
        return Err(Error::FolderNotFound(folder.to_path_buf()));
    }

    let escaped = Pattern::escape(&folder.to_string_lossy());
    let pattern = Path::new(&escaped).join("*");
    let pattern = pattern.to_string_lossy();

    let entries = glob(&pattern).map_err(|e| Error::InvalidGlob(format!("{}: {}", pattern, e)))?;

    let mut paths = Vec::new();
    for entry in entries {
        match entry {
            Ok(path) => {
                let is_pdf = path
                    .extension()
                    .map(|ext| ext.eq_ignore_ascii_case("pdf"))
                    .unwrap_or(false);
                if is_pdf && path.is_file() {
                    paths.push(path);
                }
            }
            Err(e) => warn!("skipping unreadable entry: {}", e),
        }
    }

    paths.sort();
    Ok(paths)
}
