//! 可同步单元解析。
//!
//! 把一行展开成打轴时逐个赋予时间戳的单元：通常一个音节一个单元，
//! 带注音的音节则由它的每个注音各自成为一个单元，音节本身不再出现。

use serde::{Deserialize, Serialize};

use crate::model::line::LyricLine;

/// 一个可被赋予时间戳的单元。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncUnit {
    /// 音节 ID，注音单元为 `音节ID-ruby-序号`
    pub id: String,
    /// 所属音节在行内的位置
    pub word_index: usize,
    /// 注音在音节内的位置，普通音节单元为 `None`
    pub ruby_index: Option<usize>,
    /// 单元文本
    pub text: String,
    /// 开始时间（毫秒）
    pub start_time: u64,
    /// 结束时间（毫秒）
    pub end_time: u64,
}

impl SyncUnit {
    pub fn is_blank(&self) -> bool {
        self.text.trim().is_empty()
    }

    pub const fn is_ruby(&self) -> bool {
        self.ruby_index.is_some()
    }
}

/// 注音单元的 ID。
pub fn ruby_unit_id(word_id: &str, ruby_index: usize) -> String {
    format!("{word_id}-ruby-{ruby_index}")
}

/// 行内的所有单元，包括空白单元。
pub fn units(line: &LyricLine) -> Vec<SyncUnit> {
    let mut result = Vec::with_capacity(line.words.len());
    for (word_index, word) in line.words.iter().enumerate() {
        match word.ruby.as_deref() {
            Some(ruby) if !ruby.is_empty() => {
                result.extend(ruby.iter().enumerate().map(|(ruby_index, r)| SyncUnit {
                    id: ruby_unit_id(&word.id, ruby_index),
                    word_index,
                    ruby_index: Some(ruby_index),
                    text: r.word.clone(),
                    start_time: r.start_time,
                    end_time: r.end_time,
                }));
            }
            _ => result.push(SyncUnit {
                id: word.id.clone(),
                word_index,
                ruby_index: None,
                text: word.word.clone(),
                start_time: word.start_time,
                end_time: word.end_time,
            }),
        }
    }
    result
}

/// 行是否参与打轴。
pub const fn is_line_synchronizable(line: &LyricLine) -> bool {
    !line.ignore_sync
}

/// 打轴时可以选中的单元：跳过空白单元；行被标记为忽略时为空。
pub fn synchronizable_units(line: &LyricLine) -> Vec<SyncUnit> {
    if !is_line_synchronizable(line) {
        return Vec::new();
    }
    units(line).into_iter().filter(|u| !u.is_blank()).collect()
}

/// 按 ID 在行内查找单元。
pub fn find_unit(line: &LyricLine, unit_id: &str) -> Option<SyncUnit> {
    units(line).into_iter().find(|u| u.id == unit_id)
}
