//! 下载相关的数据模型定义。
//!
//! 包含知识库清单（manifest）、目录条目、错误分类与下载结果等核心数据结构。

use std::io;
use std::path::PathBuf;

use serde::{Deserialize, Deserializer};
use thiserror::Error;

/// 目录条目类型：`TITLE` 为分组标题（可建目录），其余均视为文档节点。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Title,
    Doc,
}

fn entry_kind<'de, D: Deserializer<'de>>(deserializer: D) -> Result<EntryKind, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(if raw == "TITLE" {
        EntryKind::Title
    } else {
        EntryKind::Doc
    })
}

/// 知识库目录中的一个条目，按站点下发的扁平顺序出现（父节点先于子节点）。
#[derive(Debug, Clone, Deserialize)]
pub struct TocEntry {
    #[serde(rename = "type", deserialize_with = "entry_kind")]
    pub kind: EntryKind,
    pub uuid: String,
    pub title: String,
    #[serde(default)]
    pub parent_uuid: String,
    /// 文档 slug；为空表示纯标签（无正文可下载）。
    #[serde(default)]
    pub url: String,
}

impl TocEntry {
    pub fn is_title(&self) -> bool {
        self.kind == EntryKind::Title
    }

    pub fn has_doc(&self) -> bool {
        !self.url.is_empty()
    }
}

/// 从落地页提取出的知识库清单。
#[derive(Debug, Clone)]
pub struct BookManifest {
    pub book_id: String,
    pub toc: Vec<TocEntry>,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DownloadResult {
    pub success: u32,
    pub failed: u32,
}

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("manifest fetch failed for {url}: {reason}")]
    ManifestFetch { url: String, reason: String },

    #[error("manifest payload missing or invalid at {url}: {reason}")]
    ManifestParse { url: String, reason: String },

    #[error("toc entry {uuid} references unknown parent {parent_uuid}")]
    MalformedTree { uuid: String, parent_uuid: String },

    #[error("doc fetch failed for {slug}: {reason}")]
    PageFetch { slug: String, reason: String },

    #[error("write failed at {path}: {source}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// 知识库数据来源：落地页清单与单篇文档正文。
///
/// 网络实现见 `network_parser::network::YuqueNetwork`；测试用内存实现替换。
pub trait BookSource {
    fn fetch_manifest(&self, url: &str) -> Result<BookManifest, DownloadError>;

    /// 获取一篇文档的 Markdown 原文。
    fn fetch_doc(&self, slug: &str, book_id: &str) -> Result<String, DownloadError>;
}
