//! SUMMARY.md 目录构建。
//!
//! 逐行追加、保持插入顺序的行缓冲；遍历结束后一次性 `build` 写盘。
//! 链接目标按 Python `urllib.parse.quote` 的默认 safe 集合做百分号编码
//! （字母数字与 `/ _ . - ~` 保留，其余字节含 UTF-8 全部编码）。

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

const LINK_TARGET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'/')
    .remove(b'_')
    .remove(b'.')
    .remove(b'-')
    .remove(b'~');

const INDENT_UNIT: &str = "  ";

#[derive(Debug, Default)]
pub struct SummaryBuilder {
    lines: Vec<String>,
}

impl SummaryBuilder {
    /// 为一个标题条目追加行：单段路径渲染为二级标题，
    /// 更深的路径渲染为缩进列表项（缩进 = 段数 - 1，文本取末段）。
    pub fn append_heading(&mut self, path: &str) {
        let segments: Vec<&str> = path.split('/').collect();
        if segments.len() == 1 {
            self.lines.push(format!("## {path}"));
        } else {
            let indent = INDENT_UNIT.repeat(segments.len() - 1);
            let last = segments[segments.len() - 1];
            self.lines.push(format!("{indent}* {last}"));
        }
    }

    /// 为一篇文档追加链接行，`depth` 为两空格缩进单位数。
    pub fn append_link(&mut self, title: &str, target: &str, depth: usize) {
        let indent = INDENT_UNIT.repeat(depth);
        let encoded = utf8_percent_encode(target, LINK_TARGET);
        self.lines.push(format!("{indent}* [{title}]({encoded})"));
    }

    /// 纯标签（无正文的文档条目）：只有列表项文本，没有链接。
    pub fn append_label(&mut self, title: &str, depth: usize) {
        let indent = INDENT_UNIT.repeat(depth);
        self.lines.push(format!("{indent}* {title}"));
    }

    /// 按插入顺序拼接全部行，每行以换行结尾。
    pub fn build(&self) -> String {
        let mut out = String::new();
        for line in &self.lines {
            out.push_str(line);
            out.push('\n');
        }
        out
    }
}
