//! 歌词文档。

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::model::{line::LyricLine, metadata::MetadataMap};

/// 演唱者标签声明。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocalTag {
    /// 标签 ID，被 [`LyricLine::vocal`] 引用
    pub id: String,
    /// 显示名称
    pub name: String,
}

/// 歌词文档，所有行与音节的唯一所有者。
///
/// 行以 `Arc` 保存，修改时只复制被改动的那一行，其余行在快照之间共享。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LyricDocument {
    /// 元数据
    pub metadata: Arc<MetadataMap>,
    /// 演唱者标签，保持声明顺序
    pub vocal_tags: Arc<Vec<VocalTag>>,
    /// 歌词行
    pub lines: Vec<Arc<LyricLine>>,
}

impl LyricDocument {
    pub fn new(metadata: MetadataMap, vocal_tags: Vec<VocalTag>, lines: Vec<LyricLine>) -> Self {
        Self {
            metadata: Arc::new(metadata),
            vocal_tags: Arc::new(vocal_tags),
            lines: lines.into_iter().map(Arc::new).collect(),
        }
    }

    /// 按 ID 查找行的位置。
    pub fn line_index(&self, line_id: &str) -> Option<usize> {
        self.lines.iter().position(|line| line.id == line_id)
    }

    /// 按 ID 查找行。
    pub fn line(&self, line_id: &str) -> Option<&LyricLine> {
        self.lines
            .iter()
            .find(|line| line.id == line_id)
            .map(AsRef::as_ref)
    }

    /// 写时复制地修改一行。只有这一行会被复制。
    pub fn update_line(&mut self, index: usize, f: impl FnOnce(&mut LyricLine)) -> bool {
        let Some(line) = self.lines.get_mut(index) else {
            return false;
        };
        f(Arc::make_mut(line));
        true
    }

    /// 所有行中最大的结束时间。
    pub fn duration(&self) -> u64 {
        self.lines.iter().map(|line| line.end_time).max().unwrap_or(0)
    }

    /// 忽略行和音节 ID 的结构比较。
    pub fn eq_ignoring_ids(&self, other: &Self) -> bool {
        self.metadata == other.metadata
            && self.vocal_tags == other.vocal_tags
            && self.lines.len() == other.lines.len()
            && self
                .lines
                .iter()
                .zip(&other.lines)
                .all(|(a, b)| a.eq_ignoring_ids(b))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::line::LyricWord;

    fn sample_document() -> LyricDocument {
        let mut first = LyricLine::new();
        first.words.push(LyricWord::new("a", 0, 500));
        first.end_time = 500;
        let mut second = LyricLine::new();
        second.words.push(LyricWord::new("b", 500, 900));
        second.start_time = 500;
        second.end_time = 900;
        LyricDocument::new(MetadataMap::new(), Vec::new(), vec![first, second])
    }

    #[test]
    fn test_update_line_shares_untouched_lines() {
        let original = sample_document();
        let mut next = original.clone();
        assert!(next.update_line(0, |line| line.words[0].end_time = 600));

        assert_eq!(original.lines[0].words[0].end_time, 500);
        assert_eq!(next.lines[0].words[0].end_time, 600);
        assert!(!Arc::ptr_eq(&original.lines[0], &next.lines[0]));
        assert!(Arc::ptr_eq(&original.lines[1], &next.lines[1]));
        assert!(!next.update_line(9, |_| {}));
    }

    #[test]
    fn test_lookup_and_duration() {
        let doc = sample_document();
        let id = doc.lines[1].id.clone();
        assert_eq!(doc.line_index(&id), Some(1));
        assert_eq!(doc.line(&id).map(|l| l.start_time), Some(500));
        assert_eq!(doc.line_index("missing"), None);
        assert_eq!(doc.duration(), 900);
        assert_eq!(LyricDocument::default().duration(), 0);
    }
}
