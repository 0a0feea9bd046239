//! # TTML 解析器 - 头部处理
//!
//! 从 `<head>` 中收集元数据、演唱者标签、主演唱者，以及翻译和音译查找表。

use lyric_core::{MetadataMap, VocalTag};
use tracing::trace;

use super::{
    constants::{
        AGENT_TYPE_PERSON, ATTR_FOR, ATTR_ID, ATTR_KEY, ATTR_NAME, ATTR_TYPE, ATTR_VALUE,
        ATTR_XML_ID, ATTR_XML_LANG, DEFAULT_MAIN_AGENT_ID, ROLE_ROMANIZATION, ROLE_TRANSLATION,
        SONGWRITER_KEY, TAG_AGENT, TAG_HEAD, TAG_META, TAG_SONGWRITER, TAG_SPAN, TAG_TEXT,
        TAG_TRANSLATION, TAG_TRANSLITERATION, TAG_VOCAL_TAG,
    },
    state::{AuxKind, AuxTables, AuxTrack},
    tree::XmlElement,
    utils::{role_of, split_aux_text},
};

/// 头部收集到的文档级信息。
#[derive(Debug, Default)]
pub(super) struct HeadData {
    pub(super) metadata: MetadataMap,
    pub(super) vocal_tags: Vec<VocalTag>,
    /// 第一个 `type="person"` 的演唱者
    pub(super) main_agent_id: String,
}

/// 元素的 `xml:lang`，空值视为没有标签。
pub(super) fn lang_of(element: &XmlElement) -> Option<&str> {
    element
        .attr(&[ATTR_XML_LANG])
        .map(str::trim)
        .filter(|lang| !lang.is_empty())
}

fn heads(root: &XmlElement) -> impl Iterator<Item = &XmlElement> {
    root.descendants()
        .filter(|element| element.local_name() == TAG_HEAD)
}

/// 收集元数据、演唱者标签和主演唱者 ID。
pub(super) fn collect_head_data(root: &XmlElement, warnings: &mut Vec<String>) -> HeadData {
    let mut metadata = MetadataMap::new();
    let mut vocal_tags = Vec::new();
    let mut main_agent_id = None;

    for element in heads(root).flat_map(XmlElement::descendants) {
        match element.local_name() {
            TAG_META => {
                let Some(key) = element.attr(&[ATTR_KEY]) else {
                    warnings.push(format!("<{}> 缺少 key 属性，已忽略。", element.name));
                    continue;
                };
                let value = element
                    .attr(&[ATTR_VALUE])
                    .map_or_else(|| element.text_content(), str::to_string);
                metadata.add(key, &value);
            }
            TAG_VOCAL_TAG => {
                let Some(id) = element
                    .attr(&[ATTR_ID, ATTR_XML_ID])
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                else {
                    warnings.push(format!("<{}> 缺少 id 属性，已忽略。", element.name));
                    continue;
                };
                let name = element
                    .attr(&[ATTR_NAME])
                    .map_or_else(|| element.text_content(), str::to_string);
                vocal_tags.push(VocalTag {
                    id: id.to_string(),
                    name: name.trim().to_string(),
                });
            }
            TAG_SONGWRITER => metadata.add(SONGWRITER_KEY, &element.text_content()),
            TAG_AGENT => {
                let is_person = element.attr(&[ATTR_TYPE]) == Some(AGENT_TYPE_PERSON);
                if is_person
                    && main_agent_id.is_none()
                    && let Some(id) = element.attr(&[ATTR_XML_ID])
                {
                    main_agent_id = Some(id.trim().to_string());
                }
            }
            _ => {}
        }
    }

    HeadData {
        metadata,
        vocal_tags,
        main_agent_id: main_agent_id.unwrap_or_else(|| DEFAULT_MAIN_AGENT_ID.to_string()),
    }
}

/// 文档中是否有任何翻译或音译带有语言标签。
fn has_language_tagged_aux(root: &XmlElement) -> bool {
    root.descendants().any(|element| {
        let is_aux_block = match element.local_name() {
            TAG_TRANSLATION | TAG_TRANSLITERATION => true,
            TAG_SPAN => matches!(role_of(element), Some(ROLE_TRANSLATION | ROLE_ROMANIZATION)),
            _ => false,
        };
        is_aux_block && lang_of(element).is_some()
    })
}

/// 构建头部翻译与音译的查找表。
pub(super) fn collect_aux_tables(root: &XmlElement, warnings: &mut Vec<String>) -> AuxTables {
    let mut tables = AuxTables::new(has_language_tagged_aux(root));

    for block in heads(root).flat_map(XmlElement::descendants) {
        let kind = match block.local_name() {
            TAG_TRANSLATION => AuxKind::Translation,
            TAG_TRANSLITERATION => AuxKind::Romanization,
            _ => continue,
        };
        let lang = lang_of(block);

        for text in block
            .descendants()
            .filter(|element| element.local_name() == TAG_TEXT)
        {
            let Some(key) = text
                .attr(&[ATTR_FOR])
                .map(str::trim)
                .filter(|key| !key.is_empty())
            else {
                warnings.push(format!("<{}> 缺少 for 属性，已忽略。", text.name));
                continue;
            };

            let split = split_aux_text(text, warnings);
            tables
                .track_mut(key, AuxTrack::Main)
                .push(kind, lang, &split.main);
            for (index, background) in split.backgrounds.iter().enumerate() {
                tables
                    .track_mut(key, AuxTrack::Background(index))
                    .push(kind, lang, background);
            }
        }
    }

    trace!(
        language_tagged = tables.language_tagged,
        "头部翻译与音译收集完成"
    );
    tables
}
