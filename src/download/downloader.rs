//! 下载主流程编排。
//!
//! 单线程顺序执行：取清单 → 建书籍目录 → 按下发顺序单趟遍历目录条目
//! （建目录、追加目录行、逐篇拉正文落盘）→ 最后写 SUMMARY.md。
//! 单篇失败只记录不中断，尽量保住部分产出。

use std::fs;
use std::time::Instant;

use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, error, info};

use crate::base_system::context::Config;

use super::models::{BookSource, DownloadError, DownloadResult, TocEntry};
use super::summary::SummaryBuilder;
use super::toc_paths::{TocPathResolver, sanitize_title};

pub struct BookDownloader<'a, S: BookSource> {
    config: &'a Config,
    source: &'a S,
}

/// 一次下载运行的共享状态：路径缓存与目录缓冲都是单一所有者、单写者。
struct WalkState {
    book_id: String,
    book_dir: std::path::PathBuf,
    resolver: TocPathResolver,
    summary: SummaryBuilder,
    result: DownloadResult,
}

impl<'a, S: BookSource> BookDownloader<'a, S> {
    pub fn new(config: &'a Config, source: &'a S) -> Self {
        Self { config, source }
    }

    /// 下载整个知识库。清单获取/解析失败与父链损坏为致命错误；
    /// 单篇拉取或写盘失败计入 `failed` 后继续。
    pub fn run(&self, url: &str) -> Result<DownloadResult, DownloadError> {
        let start = Instant::now();
        let manifest = self.source.fetch_manifest(url)?;
        info!(
            "已获取清单: book_id={} 共 {} 个条目",
            manifest.book_id,
            manifest.toc.len()
        );

        let book_dir = self.config.default_save_dir().join(&manifest.book_id);
        fs::create_dir_all(&book_dir).map_err(|source| DownloadError::FileWrite {
            path: book_dir.clone(),
            source,
        })?;

        let mut state = WalkState {
            book_id: manifest.book_id,
            book_dir,
            resolver: TocPathResolver::default(),
            summary: SummaryBuilder::default(),
            result: DownloadResult::default(),
        };

        let bar = ProgressBar::new(manifest.toc.len() as u64);
        if let Ok(style) =
            ProgressStyle::with_template("{prefix} [{elapsed_precise}] {wide_bar} {pos}/{len}")
        {
            bar.set_style(style.progress_chars("##-"));
        }
        bar.set_prefix("文档下载");

        for entry in &manifest.toc {
            self.process_entry(entry, &mut state)?;
            bar.inc(1);
        }
        bar.finish_and_clear();

        let summary_path = state.book_dir.join("SUMMARY.md");
        if let Err(err) = fs::write(&summary_path, state.summary.build()) {
            error!("写入目录失败: {}: {}", summary_path.display(), err);
        }

        info!(
            "下载完成: 成功 {} 篇, 失败 {} 篇, 耗时 {:.1}s",
            state.result.success,
            state.result.failed,
            start.elapsed().as_secs_f64()
        );
        Ok(state.result)
    }

    fn process_entry(&self, entry: &TocEntry, state: &mut WalkState) -> Result<(), DownloadError> {
        if entry.is_title() {
            self.process_title(entry, state)?;
        }
        if entry.has_doc() {
            self.process_doc(entry, state)?;
        } else if !entry.is_title() {
            // 纯标签：不取正文、不落盘，但目录里仍占一行。
            let depth = self.link_depth(entry, state)?;
            state.summary.append_label(&entry.title, depth);
        }
        Ok(())
    }

    fn process_title(&self, entry: &TocEntry, state: &mut WalkState) -> Result<(), DownloadError> {
        state.resolver.register(entry);
        let path = state.resolver.resolve(&entry.uuid)?;
        let dir = state.book_dir.join(&path);
        if let Err(err) = fs::create_dir_all(&dir) {
            error!("创建目录失败: {}: {}", dir.display(), err);
        }
        state.summary.append_heading(&path);
        Ok(())
    }

    fn process_doc(&self, entry: &TocEntry, state: &mut WalkState) -> Result<(), DownloadError> {
        let file_name = format!("{}.md", sanitize_title(&entry.title));
        let (target, depth) = if entry.parent_uuid.is_empty() {
            (file_name, 0)
        } else {
            let parent_path = state.resolver.resolve(&entry.parent_uuid)?;
            let depth = parent_path.matches('/').count();
            (format!("{parent_path}/{file_name}"), depth)
        };

        // 即使正文拉取失败，目录行也照常写入（与源站行为一致，
        // 可能留下指向不存在文件的链接，见 DESIGN.md）。
        state.summary.append_link(&entry.title, &target, depth);

        let body = match self.source.fetch_doc(&entry.url, &state.book_id) {
            Ok(body) => body,
            Err(err) => {
                error!("下载文档失败: uuid={} slug={}: {}", entry.uuid, entry.url, err);
                state.result.failed += 1;
                return Ok(());
            }
        };

        let path = state.book_dir.join(&target);
        match fs::write(&path, body) {
            Ok(()) => {
                debug!("已保存: {}", path.display());
                state.result.success += 1;
            }
            Err(err) => {
                error!("写入文档失败: {}: {}", path.display(), err);
                state.result.failed += 1;
            }
        }
        Ok(())
    }

    fn link_depth(&self, entry: &TocEntry, state: &mut WalkState) -> Result<usize, DownloadError> {
        if entry.parent_uuid.is_empty() {
            Ok(0)
        } else {
            let parent_path = state.resolver.resolve(&entry.parent_uuid)?;
            Ok(parent_path.matches('/').count())
        }
    }
}
