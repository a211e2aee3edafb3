//! Document acquisition connectors for URLs, JSON files, and plain text.
//!
//! `acquire` inspects the source string, fetches or reads the document, and
//! strips it down to plain text ready for the summarization pipeline. HTML
//! pages lose their `script`, `style`, `header`, `footer`, and `nav`
//! subtrees; JSON documents contribute their string values, optionally
//! restricted to a caller-supplied set of field names.

use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Node};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// User agent presented to remote servers when fetching pages.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// HTML subtrees dropped before text extraction.
const SKIPPED_TAGS: [&str; 5] = ["script", "style", "header", "footer", "nav"];

/// The kind of source a document was acquired from.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DocumentSource {
    /// Fetched over HTTP(S) and extracted from HTML.
    Url,
    /// Read from a `.json` file.
    Json,
    /// Read from a plain-text file.
    Text,
}

impl DocumentSource {
    /// Infer the source kind from a URI or file path.
    ///
    /// `http://` and `https://` mark URLs; any other scheme is rejected.
    /// Paths ending in `.json` are JSON documents, `.pdf` is rejected, and
    /// everything else is treated as plain text.
    pub fn detect(uri: &str) -> Result<Self, AcquisitionError> {
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return Ok(Self::Url);
        }
        if let Some((scheme, _)) = uri.split_once("://") {
            return Err(AcquisitionError::UnsupportedSource(scheme.to_string()));
        }
        let extension = Path::new(uri)
            .extension()
            .and_then(|extension| extension.to_str());
        match extension {
            Some(extension) if extension.eq_ignore_ascii_case("json") => Ok(Self::Json),
            Some(extension) if extension.eq_ignore_ascii_case("pdf") => {
                Err(AcquisitionError::UnsupportedSource("pdf".to_string()))
            }
            _ => Ok(Self::Text),
        }
    }
}

impl fmt::Display for DocumentSource {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Url => "url",
            Self::Json => "json",
            Self::Text => "text",
        };
        formatter.write_str(label)
    }
}

/// A document reduced to plain text, ready for summarization.
#[derive(Debug, Clone)]
pub struct ExtractedDocument {
    /// Extracted text content.
    pub text: String,
    /// Page title, when the source carries one.
    pub title: Option<String>,
    /// Where the document came from.
    pub source: DocumentSource,
}

/// Errors raised while acquiring a document.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    /// The HTTP request to the source failed.
    #[error("Failed to fetch document: {0}")]
    Http(#[from] reqwest::Error),
    /// The source answered with a non-success status code.
    #[error("Source returned unexpected status {status}: {body}")]
    UnexpectedStatus {
        /// Status code returned by the source.
        status: StatusCode,
        /// Raw response body for diagnostics.
        body: String,
    },
    /// Reading the file failed.
    #[error("Failed to read document: {0}")]
    Io(#[from] std::io::Error),
    /// The file was not valid JSON.
    #[error("Failed to parse JSON document: {0}")]
    Json(#[from] serde_json::Error),
    /// The URI scheme or file type is not supported.
    #[error("Unsupported source type: {0}")]
    UnsupportedSource(String),
}

/// Acquire a document from a URL or file path.
pub async fn acquire(uri: &str) -> Result<ExtractedDocument, AcquisitionError> {
    acquire_filtered(uri, None).await
}

/// Acquire a document, restricting JSON extraction to the named fields.
///
/// The filter applies to object keys during descent: a key outside the set
/// is skipped together with everything nested beneath it. Other source
/// kinds ignore the filter.
pub async fn acquire_filtered(
    uri: &str,
    text_fields: Option<&[String]>,
) -> Result<ExtractedDocument, AcquisitionError> {
    match DocumentSource::detect(uri)? {
        DocumentSource::Url => fetch_url(uri).await,
        DocumentSource::Json => read_json_file(uri, text_fields).await,
        DocumentSource::Text => read_text_file(uri).await,
    }
}

async fn fetch_url(url: &str) -> Result<ExtractedDocument, AcquisitionError> {
    let client = Client::builder().user_agent(BROWSER_USER_AGENT).build()?;
    let response = client.get(url).send().await?;
    if !response.status().is_success() {
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        tracing::error!(url = %url, status = %status, "Document fetch failed");
        return Err(AcquisitionError::UnexpectedStatus { status, body });
    }
    let html = response.text().await?;
    let (text, title) = extract_html(&html);
    Ok(ExtractedDocument {
        text,
        title,
        source: DocumentSource::Url,
    })
}

/// Reduce an HTML page to its visible text and title.
fn extract_html(html: &str) -> (String, Option<String>) {
    let document = Html::parse_document(html);
    let root = document.root_element();
    let title = find_title(root);
    let mut fragments = Vec::new();
    collect_text(root, &mut fragments);
    (fragments.join(" "), title)
}

fn find_title(element: ElementRef<'_>) -> Option<String> {
    if SKIPPED_TAGS.contains(&element.value().name()) {
        return None;
    }
    if element.value().name() == "title" {
        let title = element.text().collect::<String>().trim().to_string();
        return (!title.is_empty()).then_some(title);
    }
    for child in element.children() {
        if let Some(child_element) = ElementRef::wrap(child)
            && let Some(title) = find_title(child_element)
        {
            return Some(title);
        }
    }
    None
}

fn collect_text(element: ElementRef<'_>, fragments: &mut Vec<String>) {
    if SKIPPED_TAGS.contains(&element.value().name()) {
        return;
    }
    for child in element.children() {
        match child.value() {
            Node::Text(text) => {
                let trimmed = text.trim();
                if !trimmed.is_empty() {
                    fragments.push(trimmed.to_string());
                }
            }
            Node::Element(_) => {
                if let Some(child_element) = ElementRef::wrap(child) {
                    collect_text(child_element, fragments);
                }
            }
            _ => {}
        }
    }
}

async fn read_json_file(
    path: &str,
    text_fields: Option<&[String]>,
) -> Result<ExtractedDocument, AcquisitionError> {
    let raw = tokio::fs::read_to_string(path).await?;
    let value: Value = serde_json::from_str(&raw)?;
    let mut fragments = Vec::new();
    collect_json_strings(&value, text_fields, &mut fragments);
    Ok(ExtractedDocument {
        text: fragments.join(" "),
        title: None,
        source: DocumentSource::Json,
    })
}

fn collect_json_strings(value: &Value, text_fields: Option<&[String]>, fragments: &mut Vec<String>) {
    match value {
        Value::Object(map) => {
            for (key, nested) in map {
                let follow = match text_fields {
                    Some(fields) => fields.iter().any(|field| field == key),
                    None => true,
                };
                if !follow {
                    continue;
                }
                match nested {
                    Value::String(text) => fragments.push(text.clone()),
                    Value::Object(_) | Value::Array(_) => {
                        collect_json_strings(nested, text_fields, fragments);
                    }
                    _ => {}
                }
            }
        }
        Value::Array(items) => {
            for item in items {
                collect_json_strings(item, text_fields, fragments);
            }
        }
        _ => {}
    }
}

async fn read_text_file(path: &str) -> Result<ExtractedDocument, AcquisitionError> {
    let text = tokio::fs::read_to_string(path).await?;
    Ok(ExtractedDocument {
        text,
        title: None,
        source: DocumentSource::Text,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use std::path::PathBuf;

    fn fixture_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("rusty-summ-acquisition-{name}"))
    }

    #[test]
    fn detects_sources_from_uri_shape() {
        assert_eq!(
            DocumentSource::detect("https://example.com/post").expect("url"),
            DocumentSource::Url
        );
        assert_eq!(
            DocumentSource::detect("notes/corpus.json").expect("json"),
            DocumentSource::Json
        );
        assert_eq!(
            DocumentSource::detect("notes/report.txt").expect("text"),
            DocumentSource::Text
        );
        assert_eq!(
            DocumentSource::detect("README").expect("bare path"),
            DocumentSource::Text
        );
        assert!(matches!(
            DocumentSource::detect("report.pdf"),
            Err(AcquisitionError::UnsupportedSource(kind)) if kind == "pdf"
        ));
        assert!(matches!(
            DocumentSource::detect("ftp://host/file.txt"),
            Err(AcquisitionError::UnsupportedSource(scheme)) if scheme == "ftp"
        ));
    }

    #[tokio::test]
    async fn fetches_and_extracts_html() {
        let server = MockServer::start_async().await;
        let page = concat!(
            "<html><head><title>Crate News</title><style>p {}</style></head>",
            "<body><nav>Menu</nav><h1>Release</h1>",
            "<p> The parser got faster. </p>",
            "<script>var x = 1;</script><footer>Legal</footer></body></html>"
        );
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/article")
                    .header("user-agent", BROWSER_USER_AGENT);
                then.status(200).body(page);
            })
            .await;

        let document = acquire(&server.url("/article")).await.expect("document");

        mock.assert_async().await;
        assert_eq!(document.source, DocumentSource::Url);
        assert_eq!(document.title.as_deref(), Some("Crate News"));
        assert_eq!(document.text, "Crate News Release The parser got faster.");
    }

    #[tokio::test]
    async fn rejects_error_statuses() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404).body("not here");
            })
            .await;

        let error = acquire(&server.url("/gone")).await.unwrap_err();

        match error {
            AcquisitionError::UnexpectedStatus { status, body } => {
                assert_eq!(status, StatusCode::NOT_FOUND);
                assert_eq!(body, "not here");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn reads_text_files() {
        let path = fixture_path("plain.txt");
        tokio::fs::write(&path, "Plain text body.")
            .await
            .expect("write fixture");

        let document = acquire(path.to_str().expect("path")).await.expect("document");

        assert_eq!(document.source, DocumentSource::Text);
        assert_eq!(document.text, "Plain text body.");
        assert!(document.title.is_none());
        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn collects_all_json_strings_without_filter() {
        let path = fixture_path("all.json");
        let body = r#"{"alpha": "First.", "beta": {"text": "Second.", "count": 3}, "gamma": [{"text": "Third."}]}"#;
        tokio::fs::write(&path, body).await.expect("write fixture");

        let document = acquire(path.to_str().expect("path")).await.expect("document");

        assert_eq!(document.source, DocumentSource::Json);
        assert_eq!(document.text, "First. Second. Third.");
        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn json_filter_gates_descent_by_key() {
        let path = fixture_path("filtered.json");
        let body = r#"{"alpha": "First.", "beta": {"text": "Second.", "count": 3}, "gamma": [{"text": "Third."}]}"#;
        tokio::fs::write(&path, body).await.expect("write fixture");
        let fields = vec!["beta".to_string(), "text".to_string()];

        let document = acquire_filtered(path.to_str().expect("path"), Some(&fields))
            .await
            .expect("document");

        assert_eq!(document.text, "Second.");
        tokio::fs::remove_file(&path).await.ok();
    }

    #[tokio::test]
    async fn missing_files_surface_io_errors() {
        let error = acquire("definitely-not-here.txt").await.unwrap_err();
        assert!(matches!(error, AcquisitionError::Io(_)));
    }

    #[tokio::test]
    async fn malformed_json_surfaces_parse_errors() {
        let path = fixture_path("broken.json");
        tokio::fs::write(&path, "{not json").await.expect("write fixture");

        let error = acquire(path.to_str().expect("path")).await.unwrap_err();

        assert!(matches!(error, AcquisitionError::Json(_)));
        tokio::fs::remove_file(&path).await.ok();
    }
}
