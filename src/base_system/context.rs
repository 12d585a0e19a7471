//! 全局配置结构（Config）与默认值。

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::config::{ConfigSpec, FieldMeta};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// 不带命令行参数时使用的知识库地址。
    #[serde(default = "default_book_url")]
    pub book_url: String,

    // 网络配置
    #[serde(default = "default_request_timeout")]
    pub request_timeout: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    // 保存配置
    #[serde(default = "default_save_path")]
    pub save_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            book_url: default_book_url(),
            request_timeout: default_request_timeout(),
            user_agent: default_user_agent(),
            save_path: default_save_path(),
        }
    }
}

impl ConfigSpec for Config {
    const FILE_NAME: &'static str = "config.yml";

    fn fields() -> &'static [FieldMeta] {
        static FIELDS: [FieldMeta; 4] = [
            FieldMeta {
                name: "book_url",
                description: "知识库地址（可被命令行参数覆盖）",
            },
            FieldMeta {
                name: "request_timeout",
                description: "请求超时时间（秒）",
            },
            FieldMeta {
                name: "user_agent",
                description: "请求使用的 User-Agent",
            },
            FieldMeta {
                name: "save_path",
                description: "保存根目录，书籍目录按知识库 id 建在其下",
            },
        ];
        &FIELDS
    }
}

impl Config {
    pub fn default_save_dir(&self) -> PathBuf {
        if self.save_path.trim().is_empty() {
            PathBuf::from(default_save_path())
        } else {
            PathBuf::from(&self.save_path)
        }
    }
}

fn default_book_url() -> String {
    "https://www.yuque.com/burpheart/phpaudit".to_string()
}

fn default_request_timeout() -> u64 {
    15
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120 Safari/537.36".to_string()
}

fn default_save_path() -> String {
    "download".to_string()
}
