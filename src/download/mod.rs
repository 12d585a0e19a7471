//! 下载流程模块入口。
//!
//! 子模块：
//! - `models`     — 数据模型（TocEntry / BookManifest / DownloadError 等）
//! - `toc_paths`  — 标题净化与目录路径解析（带缓存）
//! - `summary`    — SUMMARY.md 目录行缓冲
//! - `downloader` — 下载主流程编排

pub mod downloader;
pub mod models;
pub mod summary;
pub mod toc_paths;
