//! 语雀站点网络访问与清单提取。
//!
//! 落地页把知识库清单以百分号编码 JSON 嵌在
//! `decodeURIComponent("...")); ` 里，这里负责取页、抽取、解码、解析；
//! 正文走文档 API，Markdown 原文在 `data.sourcecode` 字段。

use std::time::Duration;

use percent_encoding::percent_decode_str;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue, USER_AGENT};
use serde_json::Value;
use tracing::debug;

use crate::download::models::{BookManifest, BookSource, DownloadError, TocEntry};

#[derive(Debug, Clone)]
pub struct YuqueWebConfig {
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for YuqueWebConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(15),
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36".to_string(),
        }
    }
}

pub struct YuqueNetwork {
    client: Client,
    config: YuqueWebConfig,
}

impl YuqueNetwork {
    pub fn new(config: YuqueWebConfig) -> anyhow::Result<Self> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self { client, config })
    }

    fn get_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .unwrap_or(HeaderValue::from_static("Mozilla/5.0")),
        );
        headers
    }

    fn get_json_headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&self.config.user_agent)
                .unwrap_or(HeaderValue::from_static("Mozilla/5.0")),
        );
        headers
    }
}

impl BookSource for YuqueNetwork {
    fn fetch_manifest(&self, url: &str) -> Result<BookManifest, DownloadError> {
        debug!("开始获取知识库页面: {}", url);
        let resp = self
            .client
            .get(url)
            .headers(self.get_headers())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|err| DownloadError::ManifestFetch {
                url: url.to_string(),
                reason: err.to_string(),
            })?;

        let html = resp.text().map_err(|err| DownloadError::ManifestFetch {
            url: url.to_string(),
            reason: err.to_string(),
        })?;

        parse_embedded_manifest(&html, url)
    }

    fn fetch_doc(&self, slug: &str, book_id: &str) -> Result<String, DownloadError> {
        let api_url = format!(
            "https://www.yuque.com/api/docs/{slug}?book_id={book_id}&merge_dynamic_data=false&mode=markdown"
        );
        debug!("开始获取文档: {}", api_url);

        let resp = self
            .client
            .get(&api_url)
            .headers(self.get_json_headers())
            .send()
            .and_then(|r| r.error_for_status())
            .map_err(|err| DownloadError::PageFetch {
                slug: slug.to_string(),
                reason: err.to_string(),
            })?;

        let value: Value = resp.json().map_err(|err| DownloadError::PageFetch {
            slug: slug.to_string(),
            reason: err.to_string(),
        })?;

        value
            .get("data")
            .and_then(|d| d.get("sourcecode"))
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| DownloadError::PageFetch {
                slug: slug.to_string(),
                reason: "response missing data.sourcecode".to_string(),
            })
    }
}

/// 从落地页 HTML 中抽取嵌入的百分号编码 JSON 清单并解析。
pub fn parse_embedded_manifest(html: &str, url: &str) -> Result<BookManifest, DownloadError> {
    let parse_err = |reason: String| DownloadError::ManifestParse {
        url: url.to_string(),
        reason,
    };

    let re = regex::Regex::new(r#"decodeURIComponent\("(.+)"\)\);"#)
        .map_err(|err| parse_err(err.to_string()))?;
    let payload = re
        .captures(html)
        .and_then(|caps| caps.get(1))
        .ok_or_else(|| parse_err("embedding marker not found".to_string()))?
        .as_str();

    let decoded = percent_decode_str(payload)
        .decode_utf8()
        .map_err(|err| parse_err(err.to_string()))?;

    let value: Value =
        serde_json::from_str(&decoded).map_err(|err| parse_err(err.to_string()))?;
    let book = value
        .get("book")
        .ok_or_else(|| parse_err("payload missing book object".to_string()))?;

    // id 字段可能是数字也可能是字符串，两种都接受。
    let book_id = match book.get("id") {
        Some(Value::String(s)) if !s.trim().is_empty() => s.trim().to_string(),
        Some(Value::Number(n)) => n.to_string(),
        _ => return Err(parse_err("payload missing book.id".to_string())),
    };

    let toc_value = book
        .get("toc")
        .cloned()
        .ok_or_else(|| parse_err("payload missing book.toc".to_string()))?;
    let toc: Vec<TocEntry> =
        serde_json::from_value(toc_value).map_err(|err| parse_err(err.to_string()))?;

    Ok(BookManifest { book_id, toc })
}

#[cfg(test)]
mod tests {
    use percent_encoding::{NON_ALPHANUMERIC, utf8_percent_encode};

    use super::*;
    use crate::download::models::EntryKind;

    fn landing_page(json: &str) -> String {
        let encoded = utf8_percent_encode(json, NON_ALPHANUMERIC).to_string();
        format!(
            "<html><script>window.appData = JSON.parse(decodeURIComponent(\"{encoded}\"));</script></html>"
        )
    }

    #[test]
    fn extracts_and_decodes_embedded_manifest() {
        let html = landing_page(
            r#"{"book":{"id":114514,"toc":[
                {"type":"TITLE","uuid":"c1","title":"第一章","parent_uuid":"","url":""},
                {"type":"DOC","uuid":"d1","title":"入门","parent_uuid":"c1","url":"intro"}
            ]}}"#,
        );

        let manifest = parse_embedded_manifest(&html, "http://example").unwrap();
        assert_eq!(manifest.book_id, "114514");
        assert_eq!(manifest.toc.len(), 2);
        assert_eq!(manifest.toc[0].kind, EntryKind::Title);
        assert_eq!(manifest.toc[1].kind, EntryKind::Doc);
        assert_eq!(manifest.toc[1].url, "intro");
        assert_eq!(manifest.toc[1].parent_uuid, "c1");
    }

    #[test]
    fn string_book_id_is_accepted() {
        let html = landing_page(r#"{"book":{"id":"abc-book","toc":[]}}"#);
        let manifest = parse_embedded_manifest(&html, "http://example").unwrap();
        assert_eq!(manifest.book_id, "abc-book");
        assert!(manifest.toc.is_empty());
    }

    #[test]
    fn unknown_entry_kind_falls_back_to_doc() {
        let html = landing_page(
            r#"{"book":{"id":1,"toc":[{"type":"LINK","uuid":"x","title":"外链","parent_uuid":"","url":""}]}}"#,
        );
        let manifest = parse_embedded_manifest(&html, "http://example").unwrap();
        assert_eq!(manifest.toc[0].kind, EntryKind::Doc);
    }

    #[test]
    fn missing_marker_is_a_parse_error() {
        let err = parse_embedded_manifest("<html>no payload here</html>", "http://example")
            .unwrap_err();
        assert!(matches!(err, DownloadError::ManifestParse { .. }));
    }

    #[test]
    fn invalid_payload_json_is_a_parse_error() {
        let html = landing_page("{not json");
        let err = parse_embedded_manifest(&html, "http://example").unwrap_err();
        assert!(matches!(err, DownloadError::ManifestParse { .. }));
    }
}
