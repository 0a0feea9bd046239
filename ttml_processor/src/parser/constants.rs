//! # TTML 解析器 - 常量定义
//!
//! 解析和生成 TTML 时用到的标签、属性、取值和命名空间。
//! 标签按本地名匹配，属性按带前缀的全名匹配。

pub(crate) const TAG_HEAD: &str = "head";
pub(crate) const TAG_BODY: &str = "body";
pub(crate) const TAG_P: &str = "p";
pub(crate) const TAG_SPAN: &str = "span";

pub(crate) const TAG_AGENT: &str = "agent";
pub(crate) const TAG_META: &str = "meta";
pub(crate) const TAG_VOCAL_TAG: &str = "vocal-tag";
pub(crate) const TAG_SONGWRITER: &str = "songwriter";
pub(crate) const TAG_TRANSLATION: &str = "translation";
pub(crate) const TAG_TRANSLITERATION: &str = "transliteration";
pub(crate) const TAG_TEXT: &str = "text";

pub(crate) const ATTR_BEGIN: &str = "begin";
pub(crate) const ATTR_END: &str = "end";
pub(crate) const ATTR_AGENT: &str = "ttm:agent";
pub(crate) const ATTR_AGENT_ALIAS: &str = "agent";
pub(crate) const ATTR_ITUNES_KEY: &str = "itunes:key";
pub(crate) const ATTR_ROLE: &str = "ttm:role";
pub(crate) const ATTR_ROLE_ALIAS: &str = "role";
pub(crate) const ATTR_XML_LANG: &str = "xml:lang";
pub(crate) const ATTR_XML_ID: &str = "xml:id";
pub(crate) const ATTR_ID: &str = "id";
pub(crate) const ATTR_NAME: &str = "name";
pub(crate) const ATTR_TYPE: &str = "type";
pub(crate) const ATTR_KEY: &str = "key";
pub(crate) const ATTR_VALUE: &str = "value";
pub(crate) const ATTR_FOR: &str = "for";
pub(crate) const ATTR_RUBY: &str = "tts:ruby";
pub(crate) const ATTR_EMPTY_BEAT: &str = "amll:empty-beat";
pub(crate) const ATTR_OBSCENE: &str = "amll:obscene";
pub(crate) const ATTR_VOCAL: &str = "amll:vocal";
pub(crate) const ATTR_IGNORE_SYNC: &str = "amll:ignore-sync";

pub(crate) const ROLE_TRANSLATION: &str = "x-translation";
pub(crate) const ROLE_ROMANIZATION: &str = "x-roman";
pub(crate) const ROLE_BACKGROUND: &str = "x-bg";

pub(crate) const RUBY_CONTAINER: &str = "container";
pub(crate) const RUBY_BASE: &str = "base";
pub(crate) const RUBY_TEXT_CONTAINER: &str = "textContainer";
pub(crate) const RUBY_TEXT: &str = "text";

pub(crate) const AGENT_TYPE_PERSON: &str = "person";
pub(crate) const DEFAULT_MAIN_AGENT_ID: &str = "v1";
pub(crate) const DUET_AGENT_ID: &str = "v2";

/// 歌曲作者在元数据中的键。
pub(crate) const SONGWRITER_KEY: &str = "songwriter";

pub(crate) const NS_TTML: &str = "http://www.w3.org/ns/ttml";
pub(crate) const NS_TTM: &str = "http://www.w3.org/ns/ttml#metadata";
pub(crate) const NS_TTS: &str = "http://www.w3.org/ns/ttml#styling";
pub(crate) const NS_ITUNES: &str = "http://music.apple.com/lyric-ttml-internal";
pub(crate) const NS_AMLL: &str = "http://www.example.com/ns/amll";
