//! 打轴会话状态。

use serde::{Deserialize, Serialize};

/// 光标：选中的行，以及行内选中的可同步单元。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncCursor {
    pub line_id: String,
    /// 行内没有可同步单元时为 `None`
    pub unit_id: Option<String>,
}

impl SyncCursor {
    pub fn new(line_id: impl Into<String>, unit_id: Option<String>) -> Self {
        Self {
            line_id: line_id.into(),
            unit_id,
        }
    }
}

/// 一次打轴会话的全部可变状态。
///
/// 会话开始时创建，结束时丢弃；可以序列化保存，之后用
/// [`SyncEngine::resume`](super::SyncEngine::resume) 继续。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncSession {
    pub cursor: Option<SyncCursor>,
    /// 当前单元已经吸收的空拍次数
    pub empty_beat_count: u32,
    /// 最近一次按智能行首规则打上开始时间的单元
    pub smart_first_word_active_id: Option<String>,
}
