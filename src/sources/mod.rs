//! Document acquisition: turning a DOI, URL, or upload into a [`SourceDocument`].
//!
//! Acquisition is a collaborator, not part of the retrieval core. The
//! session layer consumes whatever a [`DocumentSource`] produces and never
//! cares how the text was obtained. Resolution failures are signalled with
//! `Ok(None)` and a warning, so one bad reference never takes down a batch.

pub mod biorxiv;

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::types::{DigestError, Document};

pub use biorxiv::BiorxivClient;

/// Raw material for a [`Document`], as delivered by a source.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceDocument {
    /// Stable identifier (normalized DOI or file name).
    pub id: String,
    /// Article title.
    pub title: String,
    /// Extracted text.
    pub text: String,
}

impl SourceDocument {
    /// Wrap text the user uploaded directly, keyed by its file name.
    pub fn from_upload(file_name: impl Into<String>, text: impl Into<String>) -> Self {
        let file_name = file_name.into();
        Self {
            id: file_name.clone(),
            title: file_name,
            text: text.into(),
        }
    }
}

impl From<SourceDocument> for Document {
    fn from(source: SourceDocument) -> Self {
        Document::new(source.id, source.title, source.text)
    }
}

/// Resolves an article reference (DOI, URL, …) to its text and metadata.
///
/// `Ok(None)` means the reference could not be resolved, a per-document,
/// non-fatal condition the caller reports and moves past. Errors are reserved
/// for transport-level failures where retrying might help.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    async fn resolve(&self, reference: &str) -> Result<Option<SourceDocument>, DigestError>;
}

static DOI_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?:https?://doi\.org/|doi:)").expect("DOI prefix pattern is valid")
});

/// Normalize a DOI reference: trim, lowercase, and strip `https://doi.org/`
/// or `doi:` prefixes, leaving the bare suffix used in API paths.
///
/// # Examples
///
/// ```rust
/// use paperdigest::sources::normalize_doi;
///
/// assert_eq!(
///     normalize_doi("https://doi.org/10.1101/2023.07.19.549542"),
///     "10.1101/2023.07.19.549542"
/// );
/// assert_eq!(normalize_doi("DOI:10.1000/XYZ"), "10.1000/xyz");
/// ```
pub fn normalize_doi(reference: &str) -> String {
    let lowered = reference.trim().to_lowercase();
    DOI_PREFIX.replace(&lowered, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_url_prefix() {
        assert_eq!(
            normalize_doi("https://doi.org/10.1007/s00122-022-04129-5"),
            "10.1007/s00122-022-04129-5"
        );
        assert_eq!(
            normalize_doi("http://doi.org/10.1/abc"),
            "10.1/abc"
        );
    }

    #[test]
    fn normalize_strips_doi_scheme_and_case() {
        assert_eq!(normalize_doi("  DOI:10.1000/ABC  "), "10.1000/abc");
    }

    #[test]
    fn bare_suffix_passes_through() {
        assert_eq!(normalize_doi("10.1101/2023.07.19.549542"), "10.1101/2023.07.19.549542");
    }

    #[test]
    fn upload_uses_file_name_as_identity() {
        let doc = SourceDocument::from_upload("paper.pdf", "full text");
        assert_eq!(doc.id, "paper.pdf");
        assert_eq!(doc.title, "paper.pdf");
        let document: Document = doc.into();
        assert_eq!(document.raw_text, "full text");
    }
}
