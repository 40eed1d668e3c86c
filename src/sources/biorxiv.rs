//! bioRxiv document source.
//!
//! Resolves a DOI against the bioRxiv details API
//! (`/details/biorxiv/{doi}/na/json`) and returns the latest revision's title
//! and abstract as the document text. The base URL is injectable so tests can
//! point the client at a local mock server.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use url::Url;

use super::{DocumentSource, SourceDocument, normalize_doi};
use crate::types::DigestError;

const DEFAULT_BASE_URL: &str = "https://api.biorxiv.org/";

/// Client for the bioRxiv details API.
#[derive(Clone, Debug)]
pub struct BiorxivClient {
    client: Client,
    base_url: Url,
}

impl Default for BiorxivClient {
    fn default() -> Self {
        Self::new()
    }
}

impl BiorxivClient {
    /// Client against the public bioRxiv API.
    pub fn new() -> Self {
        Self {
            client: Client::new(),
            // The constant is a valid absolute URL; parsing cannot fail.
            base_url: Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid"),
        }
    }

    /// Client against a custom endpoint (used by tests).
    pub fn with_base_url(base_url: Url) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    fn details_url(&self, doi: &str) -> Result<Url, DigestError> {
        self.base_url
            .join(&format!("details/biorxiv/{doi}/na/json"))
            .map_err(|err| DigestError::Source(format!("invalid details URL for '{doi}': {err}")))
    }
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    #[serde(default)]
    collection: Vec<CollectionEntry>,
}

#[derive(Debug, Deserialize)]
struct CollectionEntry {
    #[serde(default)]
    doi: String,
    #[serde(default)]
    title: String,
    #[serde(default, rename = "abstract")]
    summary: String,
}

#[async_trait]
impl DocumentSource for BiorxivClient {
    async fn resolve(&self, reference: &str) -> Result<Option<SourceDocument>, DigestError> {
        let doi = normalize_doi(reference);
        if doi.is_empty() {
            tracing::warn!(reference, "blank reference");
            return Ok(None);
        }

        let url = self.details_url(&doi)?;
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::warn!(%doi, status = %response.status(), "details request rejected");
            return Ok(None);
        }

        let body = response.text().await?;
        let payload: DetailsResponse = match serde_json::from_str(&body) {
            Ok(payload) => payload,
            Err(err) => {
                tracing::warn!(%doi, error = %err, "unparseable details payload");
                return Ok(None);
            }
        };

        // The collection lists one entry per revision, oldest first. The DOI
        // is taken from the first entry; title and abstract track the latest.
        let (Some(first), Some(latest)) = (payload.collection.first(), payload.collection.last())
        else {
            tracing::warn!(%doi, "empty details collection");
            return Ok(None);
        };
        if latest.summary.trim().is_empty() {
            tracing::warn!(%doi, "entry carries no abstract text");
            return Ok(None);
        }

        let id = if first.doi.is_empty() {
            doi
        } else {
            first.doi.clone()
        };
        Ok(Some(SourceDocument {
            id,
            title: latest.title.clone(),
            text: latest.summary.clone(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde_json::json;

    fn client_for(server: &MockServer) -> BiorxivClient {
        let base = Url::parse(&server.base_url()).unwrap();
        BiorxivClient::with_base_url(base)
    }

    #[tokio::test]
    async fn resolves_doi_to_latest_revision() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/details/biorxiv/10.1101/2023.07.19.549542/na/json");
                then.status(200).json_body(json!({
                    "collection": [
                        {
                            "doi": "10.1101/2023.07.19.549542",
                            "title": "Old revision title",
                            "abstract": "Old abstract.",
                            "version": "1"
                        },
                        {
                            "doi": "10.1101/2023.07.19.549542",
                            "title": "Latest revision title",
                            "abstract": "Latest abstract text.",
                            "version": "2"
                        }
                    ]
                }));
            })
            .await;

        let client = client_for(&server);
        let resolved = client
            .resolve("https://doi.org/10.1101/2023.07.19.549542")
            .await
            .unwrap()
            .unwrap();

        mock.assert_async().await;
        assert_eq!(resolved.id, "10.1101/2023.07.19.549542");
        assert_eq!(resolved.title, "Latest revision title");
        assert_eq!(resolved.text, "Latest abstract text.");
    }

    #[tokio::test]
    async fn unknown_doi_resolves_to_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/details/biorxiv/");
                then.status(404);
            })
            .await;

        let client = client_for(&server);
        let resolved = client.resolve("10.1101/does-not-exist").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn empty_collection_resolves_to_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/details/biorxiv/");
                then.status(200).json_body(json!({ "collection": [] }));
            })
            .await;

        let client = client_for(&server);
        let resolved = client.resolve("10.1101/empty").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn missing_abstract_resolves_to_none() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path_contains("/details/biorxiv/");
                then.status(200).json_body(json!({
                    "collection": [{ "doi": "10.1101/x", "title": "No text here" }]
                }));
            })
            .await;

        let client = client_for(&server);
        let resolved = client.resolve("10.1101/x").await.unwrap();
        assert!(resolved.is_none());
    }

    #[tokio::test]
    async fn blank_reference_resolves_to_none() {
        let server = MockServer::start_async().await;
        let client = client_for(&server);
        assert!(client.resolve("   ").await.unwrap().is_none());
    }
}
