//! HttpIndexClient - Nexus `data_index` search over HTTP.
//!
//! The response is an XML document of repeated artifact records:
//!
//! ```text
//! <search-results>
//!   <data>
//!     <artifact>
//!       <groupId>org.acme</groupId>
//!       <artifactId>foo-connector</artifactId>
//!       <version>1.0</version>
//!       <classifier>connector</classifier>
//!       <artifactLink>http://x/foo-1.0.jar</artifactLink>
//!     </artifact>
//!   </data>
//! </search-results>
//! ```

use std::time::Duration;

use async_trait::async_trait;
use indexmap::IndexSet;
use roxmltree::{Document, Node};
use tracing::debug;

use crate::domain::{ArtifactDescriptor, ArtifactKey, IndexFetchError};
use crate::ports::IndexClient;

pub struct HttpIndexClient {
    client: reqwest::Client,
}

impl HttpIndexClient {
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client))
    }

    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl IndexClient for HttpIndexClient {
    async fn fetch_candidates(
        &self,
        index_url: &str,
        classifier: &str,
    ) -> Result<Vec<ArtifactDescriptor>, IndexFetchError> {
        let response = self
            .client
            .get(index_url)
            .query(&[("q", classifier)])
            .send()
            .await
            .map_err(|source| IndexFetchError::Http {
                url: index_url.to_string(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexFetchError::Status {
                url: index_url.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(IndexFetchError::Body)?;
        let candidates = parse_index_document(&body, classifier)?;
        debug!(
            phase = "index_fetch",
            index_url,
            candidates = candidates.len(),
            "index response parsed"
        );
        Ok(candidates)
    }
}

/// Extract the artifacts whose `classifier` element equals `classifier`.
///
/// The sibling elements of each matching `classifier` make up the record.
/// Incomplete records are skipped, and a repeated `g:a:v` keeps its first
/// occurrence and position.
pub fn parse_index_document(
    xml: &str,
    classifier: &str,
) -> Result<Vec<ArtifactDescriptor>, IndexFetchError> {
    let document = Document::parse(xml)?;
    let mut found: IndexSet<ArtifactDescriptor> = IndexSet::new();

    let matches = document
        .descendants()
        .filter(|node| node.is_element() && node.has_tag_name("classifier"))
        .filter(|node| element_text(*node).as_deref() == Some(classifier));

    for node in matches {
        let Some(record) = node.parent_element() else {
            continue;
        };
        let (Some(group_id), Some(artifact_id), Some(version), Some(link)) = (
            child_text(record, "groupId"),
            child_text(record, "artifactId"),
            child_text(record, "version"),
            child_text(record, "artifactLink"),
        ) else {
            debug!(
                phase = "index_fetch",
                record = record.tag_name().name(),
                "skipping incomplete index record"
            );
            continue;
        };

        found.insert(ArtifactDescriptor::new(
            ArtifactKey::new(group_id, artifact_id, version),
            link,
        ));
    }

    Ok(found.into_iter().collect())
}

fn child_text(record: Node<'_, '_>, name: &str) -> Option<String> {
    record
        .children()
        .find(|child| child.is_element() && child.has_tag_name(name))
        .and_then(element_text)
}

/// Trimmed text content of all descendant text nodes, so comments or
/// processing instructions inside a value do not cut it short.
/// Whitespace-only counts as missing.
fn element_text(node: Node<'_, '_>) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(Node::is_text)
        .filter_map(|text| text.text())
        .collect();
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::serve_once;
    use rstest::rstest;

    fn record(g: &str, a: &str, v: &str, classifier: &str, link: &str) -> String {
        format!(
            "<artifact><groupId>{g}</groupId><artifactId>{a}</artifactId><version>{v}</version>\
             <classifier>{classifier}</classifier><artifactLink>{link}</artifactLink></artifact>"
        )
    }

    fn results(records: &[String]) -> String {
        format!(
            "<?xml version=\"1.0\"?><search-results><totalCount>{}</totalCount><data>{}</data></search-results>",
            records.len(),
            records.concat()
        )
    }

    #[test]
    fn extracts_matching_record() {
        let xml = results(&[record(
            "org.acme",
            "foo-connector",
            "1.0",
            "connector",
            "http://x/foo-1.0.jar",
        )]);

        let found = parse_index_document(&xml, "connector").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key(), &ArtifactKey::new("org.acme", "foo-connector", "1.0"));
        assert_eq!(found[0].download_link(), "http://x/foo-1.0.jar");
    }

    #[test]
    fn ignores_other_classifiers() {
        let xml = results(&[
            record("org.acme", "foo", "1.0", "sources", "http://x/foo-sources.jar"),
            record("org.acme", "foo", "1.0", "connector", "http://x/foo.jar"),
        ]);

        let found = parse_index_document(&xml, "connector").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].download_link(), "http://x/foo.jar");
    }

    #[rstest]
    #[case::group("<artifact><artifactId>a</artifactId><version>1</version><classifier>connector</classifier><artifactLink>l</artifactLink></artifact>")]
    #[case::artifact("<artifact><groupId>g</groupId><version>1</version><classifier>connector</classifier><artifactLink>l</artifactLink></artifact>")]
    #[case::version("<artifact><groupId>g</groupId><artifactId>a</artifactId><classifier>connector</classifier><artifactLink>l</artifactLink></artifact>")]
    #[case::link("<artifact><groupId>g</groupId><artifactId>a</artifactId><version>1</version><classifier>connector</classifier></artifact>")]
    #[case::empty_version("<artifact><groupId>g</groupId><artifactId>a</artifactId><version>  </version><classifier>connector</classifier><artifactLink>l</artifactLink></artifact>")]
    fn skips_incomplete_records(#[case] partial: &str) {
        let complete = record("org.acme", "ok", "1.0", "connector", "http://x/ok.jar");
        let xml = results(&[partial.to_string(), complete]);

        let found = parse_index_document(&xml, "connector").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].artifact_id(), "ok");
    }

    #[test]
    fn duplicates_collapse_to_first_occurrence() {
        let xml = results(&[
            record("g", "a", "1", "connector", "http://first/a.jar"),
            record("g", "b", "1", "connector", "http://x/b.jar"),
            record("g", "a", "1", "connector", "http://second/a.jar"),
        ]);

        let found = parse_index_document(&xml, "connector").unwrap();
        let ids: Vec<_> = found.iter().map(|d| d.artifact_id()).collect();
        assert_eq!(ids, vec!["a", "b"]);
        assert_eq!(found[0].download_link(), "http://first/a.jar");
    }

    #[test]
    fn surrounding_whitespace_is_ignored() {
        let xml = "<r><artifact>\n  <groupId> g </groupId>\n  <artifactId>a</artifactId>\n  \
                   <version>1</version>\n  <classifier> connector </classifier>\n  \
                   <artifactLink>http://x/a.jar</artifactLink>\n</artifact></r>";

        let found = parse_index_document(xml, "connector").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].group_id(), "g");
    }

    #[rstest]
    #[case::comment("<version>1.<!-- build -->0</version>", "1.0")]
    #[case::processing_instruction("<version>2<?pi x?>.1</version>", "2.1")]
    #[case::cdata("<version> <![CDATA[3.0]]> </version>", "3.0")]
    fn split_values_read_in_full(#[case] version: &str, #[case] expected: &str) {
        let xml = format!(
            "<r><artifact><groupId>g</groupId><artifactId>a</artifactId>{version}\
             <classifier>connector</classifier><artifactLink>http://x/a.jar</artifactLink>\
             </artifact></r>"
        );

        let found = parse_index_document(&xml, "connector").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].version(), expected);
    }

    #[test]
    fn malformed_document_is_an_error() {
        let err = parse_index_document("<search-results><data>", "connector").unwrap_err();
        assert!(matches!(err, IndexFetchError::Xml(_)));
    }

    #[test]
    fn empty_result_set() {
        let found = parse_index_document("<search-results/>", "connector").unwrap();
        assert!(found.is_empty());
    }

    #[tokio::test]
    async fn fetches_with_classifier_query() {
        let body = results(&[record("g", "a", "1", "connector", "http://x/a.jar")]);
        let (url, request) = serve_once(200, body.into_bytes()).await;

        let client = HttpIndexClient::new(Duration::from_secs(5)).unwrap();
        let found = client
            .fetch_candidates(&format!("{url}/service/local/data_index"), "connector")
            .await
            .unwrap();

        assert_eq!(found.len(), 1);
        let request_line = request.await.unwrap();
        assert!(request_line.starts_with("GET /service/local/data_index?q=connector "));
    }

    #[tokio::test]
    async fn non_success_status_is_an_error() {
        let (url, _request) = serve_once(503, b"unavailable".to_vec()).await;

        let client = HttpIndexClient::new(Duration::from_secs(5)).unwrap();
        let err = client.fetch_candidates(&url, "connector").await.unwrap_err();
        assert!(matches!(err, IndexFetchError::Status { status: 503, .. }));
    }
}
