//! 多值元数据容器。

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// 歌词文档的元数据。
///
/// 每个键对应一个有序的值列表，重复出现的键会把值追加到同一个列表里。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MetadataMap {
    data: BTreeMap<String, Vec<String>>,
}

impl MetadataMap {
    /// 创建一个新的、空的 `MetadataMap` 实例。
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// 添加一个元数据键值对。
    ///
    /// 键和值都会去除首尾空白，任意一个为空时忽略。
    pub fn add(&mut self, key: &str, value: &str) {
        let key = key.trim();
        let value = value.trim();
        if key.is_empty() || value.is_empty() {
            return;
        }
        self.data
            .entry(key.to_string())
            .or_default()
            .push(value.to_string());
    }

    /// 设置或覆盖一个单值元数据。
    pub fn set_single(&mut self, key: &str, value: &str) {
        self.data
            .insert(key.trim().to_string(), vec![value.trim().to_string()]);
    }

    /// 设置或覆盖一个多值元数据，空值会被过滤掉。
    pub fn set_multiple(&mut self, key: &str, values: Vec<String>) {
        let values: Vec<String> = values
            .into_iter()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .collect();
        if values.is_empty() {
            self.data.remove(key.trim());
        } else {
            self.data.insert(key.trim().to_string(), values);
        }
    }

    /// 获取指定键的第一个值。
    pub fn get_single_value(&self, key: &str) -> Option<&String> {
        self.data.get(key).and_then(|values| values.first())
    }

    /// 获取指定键的所有值。
    pub fn get_multiple_values(&self, key: &str) -> Option<&Vec<String>> {
        self.data.get(key)
    }

    /// 移除一个键，返回它原有的值。
    pub fn remove(&mut self, key: &str) -> Option<Vec<String>> {
        self.data.remove(key)
    }

    /// 把另一个容器中的值追加进来。
    pub fn merge(&mut self, other: &Self) {
        for (key, values) in other.iter() {
            for value in values {
                self.add(key, value);
            }
        }
    }

    /// 按键的字典序遍历所有条目。
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.data.iter()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// 清空所有元数据。
    pub fn clear(&mut self) {
        self.data.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_keys_merge_values() {
        let mut map = MetadataMap::new();
        map.add("artist", "A");
        map.add("title", "Song");
        map.add("artist", " B ");
        map.add("artist", "   ");

        assert_eq!(
            map.get_multiple_values("artist"),
            Some(&vec!["A".to_string(), "B".to_string()])
        );
        assert_eq!(map.get_single_value("title").map(String::as_str), Some("Song"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn test_set_and_merge() {
        let mut map = MetadataMap::new();
        map.add("artist", "A");
        map.set_single("artist", "C");
        assert_eq!(map.get_multiple_values("artist"), Some(&vec!["C".to_string()]));

        let mut other = MetadataMap::new();
        other.set_multiple("artist", vec!["D".into(), String::new()]);
        other.add("album", "X");
        map.merge(&other);

        assert_eq!(
            map.get_multiple_values("artist"),
            Some(&vec!["C".to_string(), "D".to_string()])
        );
        let keys: Vec<&String> = map.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["album", "artist"]);

        map.set_multiple("album", Vec::new());
        assert!(map.get_multiple_values("album").is_none());
        map.clear();
        assert!(map.is_empty());
    }
}
