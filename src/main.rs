//! 语雀知识库下载器。
//!
//! 把一个语雀知识库镜像为本地 Markdown 目录树，并生成 SUMMARY.md 目录。
//!
//! 代码结构（读代码入口）：
//! - `base_system`：配置/日志等基础设施
//! - `network_parser`：落地页清单提取与文档 API 访问
//! - `download`：路径解析、目录构建与下载主流程

use anyhow::Result;
use clap::Parser;
use std::time::Duration;
use tracing::error;

mod base_system;
mod download;
mod network_parser;

use base_system::config::load_or_create;
use base_system::context::Config;
use base_system::logging::{LogOptions, LogSystem};
use download::downloader::BookDownloader;
use network_parser::network::{YuqueNetwork, YuqueWebConfig};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Parser)]
#[command(name = "yuque-book-downloader")]
#[command(about = "Yuque knowledge base downloader")]
struct Cli {
    /// 知识库地址，缺省时使用配置文件中的 book_url
    url: Option<String>,

    /// 启用调试日志输出
    #[arg(long, default_value_t = false)]
    debug: bool,

    /// 显示版本信息后退出
    #[arg(long, default_value_t = false)]
    version: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.version {
        println!("yuque-book-downloader v{}", VERSION);
        return Ok(());
    }

    let _log = LogSystem::init(LogOptions {
        debug: cli.debug,
        use_color: true,
    })?;

    let config = load_or_create::<Config>(None)?;
    let url = cli.url.unwrap_or_else(|| config.book_url.clone());

    let network = YuqueNetwork::new(YuqueWebConfig {
        request_timeout: Duration::from_secs(config.request_timeout),
        user_agent: config.user_agent.clone(),
    })?;

    let downloader = BookDownloader::new(&config, &network);
    match downloader.run(&url) {
        Ok(_) => Ok(()),
        Err(err) => {
            error!("下载失败: {}", err);
            Err(err.into())
        }
    }
}
