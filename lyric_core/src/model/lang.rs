//! 按语言标签区分的可选映射。
//!
//! `und` 只作为兜底：只要某个映射中存在任何带标签的条目，`und` 就不会再被查询。

use std::collections::BTreeMap;

/// 未确定语言的标签。
pub const UNDETERMINED_LANG: &str = "und";

/// 语言标签到值的映射。
pub type LangMap<V> = BTreeMap<String, V>;

fn has_tagged_entry<V>(map: &LangMap<V>) -> bool {
    map.keys().any(|key| key != UNDETERMINED_LANG)
}

/// 查询指定语言的值。
///
/// 找不到精确匹配时，只有在映射里完全没有带标签条目的情况下才回退到 `und`。
pub fn lookup_lang<'a, V>(map: &'a LangMap<V>, lang: &str) -> Option<&'a V> {
    if lang != UNDETERMINED_LANG
        && let Some(value) = map.get(lang)
    {
        return Some(value);
    }
    if has_tagged_entry(map) {
        None
    } else {
        map.get(UNDETERMINED_LANG)
    }
}

/// 选出作为主显示值的语言。
///
/// 优先使用 `preferred`（如果映射中存在），其次是字典序第一个非 `und` 的标签，最后才是 `und`。
pub fn primary_lang<'a, V>(map: &'a LangMap<V>, preferred: Option<&'a str>) -> Option<&'a str> {
    preferred
        .filter(|lang| map.contains_key(*lang))
        .or_else(|| {
            map.keys()
                .map(String::as_str)
                .find(|key| *key != UNDETERMINED_LANG)
        })
        .or_else(|| {
            map.contains_key(UNDETERMINED_LANG)
                .then_some(UNDETERMINED_LANG)
        })
}

/// 存在带标签条目时移除 `und` 条目。
pub fn drop_shadowed_undetermined<V>(map: &mut LangMap<V>) {
    if has_tagged_entry(map) {
        map.remove(UNDETERMINED_LANG);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn map_of(entries: &[(&str, &str)]) -> LangMap<String> {
        entries
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn test_und_is_only_a_fallback() {
        let tagged = map_of(&[("und", "兜底"), ("en", "hello")]);
        assert_eq!(lookup_lang(&tagged, "en").map(String::as_str), Some("hello"));
        assert_eq!(lookup_lang(&tagged, "ja"), None);
        assert_eq!(lookup_lang(&tagged, "und"), None);

        let untagged = map_of(&[("und", "兜底")]);
        assert_eq!(lookup_lang(&untagged, "ja").map(String::as_str), Some("兜底"));
    }

    #[test]
    fn test_primary_lang_order() {
        let map = map_of(&[("und", "?"), ("zh-Hans", "你好"), ("en", "hello")]);
        assert_eq!(primary_lang(&map, Some("zh-Hans")), Some("zh-Hans"));
        assert_eq!(primary_lang(&map, Some("fr")), Some("en"));
        assert_eq!(primary_lang(&map, None), Some("en"));

        let only_und = map_of(&[("und", "?")]);
        assert_eq!(primary_lang(&only_und, None), Some("und"));
        assert_eq!(primary_lang(&LangMap::<String>::new(), None), None);
    }

    #[test]
    fn test_drop_shadowed_undetermined() {
        let mut map = map_of(&[("und", "?"), ("en", "hello")]);
        drop_shadowed_undetermined(&mut map);
        assert_eq!(map.len(), 1);
        assert!(map.contains_key("en"));

        let mut only_und = map_of(&[("und", "?")]);
        drop_shadowed_undetermined(&mut only_und);
        assert_eq!(only_und.len(), 1);
    }
}
