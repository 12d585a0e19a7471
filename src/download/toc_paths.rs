//! 标题净化与目录路径解析。
//!
//! 每个 `TITLE` 条目对应一条规范相对路径：从根到该节点的净化标题以 `/`
//! 连接。路径按 uuid 记忆化，遍历中父节点会被所有后代反复查询，
//! 不允许重复走链重算。

use std::collections::HashMap;

use super::models::{DownloadError, TocEntry};

/// 把任意展示标题映射为合法的路径段：逐字符替换非法字符为下划线，
/// 长度保持不变，不做折叠。
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|ch| match ch {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' | '\n' | '\r' => '_',
            other => other,
        })
        .collect()
}

#[derive(Debug)]
struct TitleRecord {
    title: String,
    parent_uuid: String,
    resolved: Option<String>,
}

/// 目录路径解析器：按遍历顺序增量注册 `TITLE` 条目，
/// 解析时沿父链回溯拼接，结果只缓存在发起解析的节点上。
#[derive(Debug, Default)]
pub struct TocPathResolver {
    records: HashMap<String, TitleRecord>,
}

impl TocPathResolver {
    /// 注册一个 `TITLE` 条目。清单保证父节点先于子节点出现，
    /// 因此注册顺序即遍历顺序。
    pub fn register(&mut self, entry: &TocEntry) {
        self.records
            .entry(entry.uuid.clone())
            .or_insert_with(|| TitleRecord {
                title: entry.title.clone(),
                parent_uuid: entry.parent_uuid.clone(),
                resolved: None,
            });
    }

    /// 解析一个已注册 `TITLE` 的规范相对路径（无尾部分隔符）。
    ///
    /// 命中缓存直接返回；否则向根回溯，把途经祖先的净化标题依次前插，
    /// 最终展开值作为该节点的缓存。父链中任何未注册的 uuid 都视为
    /// 清单损坏，立即失败而不是猜一条路径。
    pub fn resolve(&mut self, uuid: &str) -> Result<String, DownloadError> {
        if let Some(path) = self
            .records
            .get(uuid)
            .and_then(|rec| rec.resolved.as_ref())
        {
            return Ok(path.clone());
        }

        let mut path = String::new();
        let mut current = uuid;
        loop {
            let record =
                self.records
                    .get(current)
                    .ok_or_else(|| DownloadError::MalformedTree {
                        uuid: uuid.to_string(),
                        parent_uuid: current.to_string(),
                    })?;
            let segment = sanitize_title(&record.title);
            if path.is_empty() {
                path = segment;
            } else {
                path = format!("{}/{}", segment, path);
            }
            if record.parent_uuid.is_empty() {
                break;
            }
            current = &record.parent_uuid;
        }

        if let Some(record) = self.records.get_mut(uuid) {
            record.resolved = Some(path.clone());
        }
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::download::models::EntryKind;

    fn title(uuid: &str, title: &str, parent: &str) -> TocEntry {
        TocEntry {
            kind: EntryKind::Title,
            uuid: uuid.to_string(),
            title: title.to_string(),
            parent_uuid: parent.to_string(),
            url: String::new(),
        }
    }

    #[test]
    fn sanitize_replaces_each_forbidden_char_in_place() {
        assert_eq!(sanitize_title("A/B:C"), "A_B_C");
        assert_eq!(sanitize_title("a\\b*c?d\"e<f>g|h"), "a_b_c_d_e_f_g_h");
        assert_eq!(sanitize_title("line\nbreak\rend"), "line_break_end");
    }

    #[test]
    fn sanitize_preserves_length_and_clean_titles() {
        let dirty = "x/y\\z:*?\"<>|\n\r";
        assert_eq!(sanitize_title(dirty).chars().count(), dirty.chars().count());
        assert_eq!(sanitize_title("普通标题 plain"), "普通标题 plain");
    }

    #[test]
    fn resolve_walks_to_root() {
        let mut resolver = TocPathResolver::default();
        resolver.register(&title("r", "Root", ""));
        resolver.register(&title("m", "Mid/塊", "r"));
        resolver.register(&title("l", "Leafy", "m"));

        assert_eq!(resolver.resolve("r").unwrap(), "Root");
        assert_eq!(resolver.resolve("m").unwrap(), "Root/Mid_塊");
        assert_eq!(resolver.resolve("l").unwrap(), "Root/Mid_塊/Leafy");
    }

    #[test]
    fn depth_d_path_has_d_minus_one_separators() {
        let mut resolver = TocPathResolver::default();
        resolver.register(&title("a", "一", ""));
        resolver.register(&title("b", "二", "a"));
        resolver.register(&title("c", "三", "b"));
        resolver.register(&title("d", "四", "c"));

        for (uuid, depth) in [("a", 1usize), ("b", 2), ("c", 3), ("d", 4)] {
            let path = resolver.resolve(uuid).unwrap();
            assert_eq!(path.matches('/').count(), depth - 1, "uuid={uuid}");
        }
    }

    #[test]
    fn resolve_is_idempotent_and_served_from_cache() {
        let mut resolver = TocPathResolver::default();
        resolver.register(&title("r", "Root", ""));
        resolver.register(&title("c", "Child", "r"));

        let first = resolver.resolve("c").unwrap();
        // 删掉父记录后再次解析仍成功，说明第二次命中缓存、没有重走父链。
        resolver.records.remove("r");
        let second = resolver.resolve("c").unwrap();
        assert_eq!(first, second);
        assert_eq!(second, "Root/Child");
    }

    #[test]
    fn unknown_parent_is_malformed_tree() {
        let mut resolver = TocPathResolver::default();
        resolver.register(&title("c", "Child", "ghost"));

        match resolver.resolve("c") {
            Err(DownloadError::MalformedTree { uuid, parent_uuid }) => {
                assert_eq!(uuid, "c");
                assert_eq!(parent_uuid, "ghost");
            }
            other => panic!("expected MalformedTree, got {other:?}"),
        }
    }
}
