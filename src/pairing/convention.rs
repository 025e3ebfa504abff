//! Filename convention used to identify and classify documents
//!
//! The defaults follow the Community Board workflow: files start with the
//! resolution number, resolution files carry "resolution" or "cb3 reso" in
//! their name (`101 CB3 Reso.pdf`, `101-resolution.pdf`), and every other
//! numbered PDF in the folder is a stipulation. Markers are plain
//! substrings, so a bare "reso" would also catch "Resort" or "Resources".
//!
//! A convention can be loaded from TOML:
//!
//! ```toml
//! identifier_pattern = '^\s*(\d+)'
//! resolution_markers = ["cb3 reso"]
//! stipulation_markers = ["stip"]
//! output_template = "{resolution} wSTIPS.pdf"
//! ```

use std::path::Path;
use regex::Regex;
use serde::Deserialize;
use crate::error::{Error, Result};
use super::document::{DocumentKind, Identifier};

pub const DEFAULT_IDENTIFIER_PATTERN: &str = r"^\s*(\d+)";
pub const DEFAULT_OUTPUT_TEMPLATE: &str = "{id}-merged.pdf";

const PLACEHOLDERS: [&str; 3] = ["{id}", "{resolution}", "{stipulation}"];

/// Raw, unvalidated convention settings as they appear in a TOML file
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ConventionSettings {
    pub identifier_pattern: String,
    pub resolution_markers: Vec<String>,
    pub stipulation_markers: Vec<String>,
    pub output_template: String,
}

impl Default for ConventionSettings {
    fn default() -> Self {
        Self {
            identifier_pattern: DEFAULT_IDENTIFIER_PATTERN.to_string(),
            resolution_markers: vec!["resolution".to_string(), "cb3 reso".to_string()],
            stipulation_markers: Vec::new(),
            output_template: DEFAULT_OUTPUT_TEMPLATE.to_string(),
        }
    }
}

/// A validated naming convention
#[derive(Debug, Clone)]
pub struct Convention {
    identifier: Regex,
    resolution_markers: Vec<String>,
    stipulation_markers: Vec<String>,
    output_template: String,
}

impl Default for Convention {
    fn default() -> Self {
        let settings = ConventionSettings::default();
        Self {
            identifier: Regex::new(&settings.identifier_pattern)
                .expect("default identifier pattern is a valid regex"),
            resolution_markers: settings.resolution_markers,
            stipulation_markers: settings.stipulation_markers,
            output_template: settings.output_template,
        }
    }
}

impl Convention {
    /// Validate settings into a usable convention
    pub fn from_settings(settings: ConventionSettings) -> Result<Self> {
        let identifier = Regex::new(&settings.identifier_pattern).map_err(|e| {
            Error::InvalidConvention(format!(
                "bad identifier pattern {:?}: {}",
                settings.identifier_pattern, e
            ))
        })?;

        let resolution_markers = normalize_markers(settings.resolution_markers);
        if resolution_markers.is_empty() {
            return Err(Error::InvalidConvention(
                "at least one resolution marker is required".to_string(),
            ));
        }
        let stipulation_markers = normalize_markers(settings.stipulation_markers);

        // Without a placeholder every group would write the same file
        if !PLACEHOLDERS.iter().any(|p| settings.output_template.contains(p)) {
            return Err(Error::InvalidConvention(format!(
                "output template {:?} must contain one of {}",
                settings.output_template,
                PLACEHOLDERS.join(", ")
            )));
        }

        Ok(Self {
            identifier,
            resolution_markers,
            stipulation_markers,
            output_template: settings.output_template,
        })
    }

    /// Parse a convention from TOML text
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let settings: ConventionSettings = toml::from_str(text)
            .map_err(|e| Error::InvalidConvention(e.to_string()))?;
        Self::from_settings(settings)
    }

    /// Load a convention from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::FileNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text).map_err(|source| Error::ConventionFile {
            path: path.to_path_buf(),
            source: Box::new(source),
        })
    }

    /// Extract the matching identifier from a file name
    pub fn identifier(&self, file_name: &str) -> Option<Identifier> {
        let captures = self.identifier.captures(file_name)?;
        let token = captures.get(1).or_else(|| captures.get(0))?.as_str();
        Identifier::parse(token)
    }

    /// Decide which side a file belongs to, or None when it fits neither
    pub fn classify(&self, file_name: &str) -> Option<DocumentKind> {
        let lower = file_name.to_lowercase();

        if self.resolution_markers.iter().any(|m| lower.contains(m.as_str())) {
            Some(DocumentKind::Resolution)
        } else if self.stipulation_markers.is_empty()
            || self.stipulation_markers.iter().any(|m| lower.contains(m.as_str()))
        {
            Some(DocumentKind::Stipulation)
        } else {
            None
        }
    }

    /// Render the output file name for one pair
    ///
    /// `.pdf` is appended when the template does not already end with it.
    pub fn output_name(&self, id: &Identifier, resolution: &Path, stipulation: &Path) -> String {
        let mut name = self
            .output_template
            .replace("{id}", &id.to_string())
            .replace("{resolution}", &file_stem(resolution))
            .replace("{stipulation}", &file_stem(stipulation));

        if !name.to_lowercase().ends_with(".pdf") {
            name.push_str(".pdf");
        }
        name
    }
}

fn normalize_markers(markers: Vec<String>) -> Vec<String> {
    markers
        .into_iter()
        .map(|m| m.trim().to_lowercase())
        .filter(|m| !m.is_empty())
        .collect()
}

fn file_stem(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_identifier_is_leading_number() {
        let convention = Convention::default();

        assert_eq!(convention.identifier("101-resolution.pdf"), Some(Identifier::Number(101)));
        assert_eq!(convention.identifier("  0101 CB3 Reso.pdf"), Some(Identifier::Number(101)));
        assert_eq!(convention.identifier("resolution-101.pdf"), None);
    }

    #[test]
    fn test_default_classification() {
        let convention = Convention::default();

        assert_eq!(convention.classify("101 CB3 Reso.pdf"), Some(DocumentKind::Resolution));
        assert_eq!(convention.classify("101-resolution.pdf"), Some(DocumentKind::Resolution));
        assert_eq!(convention.classify("101-stip.pdf"), Some(DocumentKind::Stipulation));
        assert_eq!(convention.classify("101 anything.pdf"), Some(DocumentKind::Stipulation));
    }

    #[test]
    fn test_business_names_are_not_resolutions() {
        let convention = Convention::default();

        assert_eq!(
            convention.classify("101 Resort Bar stipulations.pdf"),
            Some(DocumentKind::Stipulation)
        );
        assert_eq!(
            convention.classify("102 Green Resources LLC stip.pdf"),
            Some(DocumentKind::Stipulation)
        );
    }

    #[test]
    fn test_stipulation_markers_leave_other_files_unclassified() {
        let convention = Convention::from_settings(ConventionSettings {
            stipulation_markers: vec!["Stip".to_string()],
            ..ConventionSettings::default()
        })
        .unwrap();

        assert_eq!(convention.classify("101-STIPS.pdf"), Some(DocumentKind::Stipulation));
        assert_eq!(convention.classify("101-cover-letter.pdf"), None);
    }

    #[test]
    fn test_output_name_templates() {
        let convention = Convention::default();
        let id = Identifier::Number(101);
        let reso = Path::new("/in/101 CB3 Reso.pdf");
        let stip = Path::new("/in/101 stip.pdf");

        assert_eq!(convention.output_name(&id, reso, stip), "101-merged.pdf");

        let suffixed = Convention::from_settings(ConventionSettings {
            output_template: "{resolution} wSTIPS".to_string(),
            ..ConventionSettings::default()
        })
        .unwrap();
        assert_eq!(suffixed.output_name(&id, reso, stip), "101 CB3 Reso wSTIPS.pdf");
    }

    #[test]
    fn test_rejects_bad_settings() {
        let bad_regex = ConventionSettings {
            identifier_pattern: "(".to_string(),
            ..ConventionSettings::default()
        };
        assert!(matches!(Convention::from_settings(bad_regex), Err(Error::InvalidConvention(_))));

        let no_markers = ConventionSettings {
            resolution_markers: vec!["  ".to_string()],
            ..ConventionSettings::default()
        };
        assert!(matches!(Convention::from_settings(no_markers), Err(Error::InvalidConvention(_))));

        let fixed_name = ConventionSettings {
            output_template: "merged.pdf".to_string(),
            ..ConventionSettings::default()
        };
        assert!(matches!(Convention::from_settings(fixed_name), Err(Error::InvalidConvention(_))));
    }

    #[test]
    fn test_toml_partial_settings_use_defaults() {
        let convention = Convention::from_toml_str("resolution_markers = [\"cb3 reso\"]\n")
            .expect("valid convention");

        assert_eq!(convention.classify("101-resolution.pdf"), Some(DocumentKind::Stipulation));
        assert_eq!(convention.classify("101 CB3 RESO.pdf"), Some(DocumentKind::Resolution));
        assert_eq!(convention.identifier("7 x.pdf"), Some(Identifier::Number(7)));
    }

    #[test]
    fn test_toml_unknown_key_is_rejected() {
        let result = Convention::from_toml_str("colour = \"blue\"\n");
        assert!(matches!(result, Err(Error::InvalidConvention(_))));
    }
}
