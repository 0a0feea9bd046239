//! 文档的写时复制存储。

use lyric_core::LyricDocument;

/// 引擎通过它读取和提交文档。
///
/// 每次 [`set`](DocumentStore::set) 都是一次完整的提交：更新函数拿到当前快照，
/// 返回新的快照，旧快照保持不变，外部的撤销历史可以直接保存它。
pub trait DocumentStore {
    fn get(&self) -> &LyricDocument;
    fn set<F>(&mut self, updater: F)
    where
        F: FnOnce(&LyricDocument) -> LyricDocument;
}

/// 内存中的文档存储，每次提交递增修订号。
#[derive(Debug, Clone, Default)]
pub struct MemoryDocumentStore {
    document: LyricDocument,
    revision: u64,
}

impl MemoryDocumentStore {
    pub const fn new(document: LyricDocument) -> Self {
        Self {
            document,
            revision: 0,
        }
    }

    /// 已提交的修改次数
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    pub fn into_document(self) -> LyricDocument {
        self.document
    }
}

impl DocumentStore for MemoryDocumentStore {
    fn get(&self) -> &LyricDocument {
        &self.document
    }

    fn set<F>(&mut self, updater: F)
    where
        F: FnOnce(&LyricDocument) -> LyricDocument,
    {
        self.document = updater(&self.document);
        self.revision += 1;
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use lyric_core::{LyricLine, MetadataMap, TimeBoundary};

    use super::*;

    #[test]
    fn test_set_bumps_revision_and_shares_untouched_lines() {
        let document = LyricDocument::new(
            MetadataMap::new(),
            Vec::new(),
            vec![LyricLine::new(), LyricLine::new()],
        );
        let mut store = MemoryDocumentStore::new(document);
        let before = store.get().clone();

        store.set(|document| {
            let mut next = document.clone();
            next.update_line(0, |line| line.set_time(TimeBoundary::End, 500));
            next
        });

        assert_eq!(store.revision(), 1);
        assert_eq!(store.get().lines[0].end_time, 500);
        assert_eq!(before.lines[0].end_time, 0);
        assert!(Arc::ptr_eq(&before.lines[1], &store.get().lines[1]));
        assert!(!Arc::ptr_eq(&before.lines[0], &store.get().lines[0]));
    }
}
