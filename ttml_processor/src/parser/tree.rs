//! # TTML 解析器 - 宽松的 XML 树构建
//!
//! 先把输入读成一棵简单的元素树，后续各阶段都在这棵树上遍历。
//! 遇到结构错误（未闭合、错配的结束标签）时尽量修补并继续，只记录警告。

use quick_xml::{
    Reader,
    errors::{Error as QuickXmlError, IllFormedError},
    events::{BytesRef, BytesStart, Event},
};

/// 树中的节点。
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum XmlNode {
    Element(XmlElement),
    Text(String),
}

/// 一个元素及其属性和子节点。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(super) struct XmlElement {
    /// 带前缀的全名，例如 `ttm:agent`
    pub(super) name: String,
    pub(super) attributes: Vec<(String, String)>,
    pub(super) children: Vec<XmlNode>,
}

impl XmlElement {
    /// 去掉命名空间前缀后的本地名。
    pub(super) fn local_name(&self) -> &str {
        self.name
            .rsplit_once(':')
            .map_or(self.name.as_str(), |(_, local)| local)
    }

    /// 按顺序尝试多个属性名（包括别名），返回第一个存在的值。
    pub(super) fn attr(&self, names: &[&str]) -> Option<&str> {
        names.iter().find_map(|name| {
            self.attributes
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, value)| value.as_str())
        })
    }

    /// 直接子元素。
    pub(super) fn child_elements(&self) -> impl Iterator<Item = &Self> {
        self.children.iter().filter_map(|child| match child {
            XmlNode::Element(element) => Some(element),
            XmlNode::Text(_) => None,
        })
    }

    /// 先序遍历所有后代元素（不含自身）。
    pub(super) fn descendants(&self) -> Descendants<'_> {
        let mut stack: Vec<&Self> = self.child_elements().collect();
        stack.reverse();
        Descendants { stack }
    }

    /// 所有后代文本按文档顺序拼接。
    pub(super) fn text_content(&self) -> String {
        let mut output = String::new();
        self.collect_text(&mut output);
        output
    }

    fn collect_text(&self, output: &mut String) {
        for child in &self.children {
            match child {
                XmlNode::Text(text) => output.push_str(text),
                XmlNode::Element(element) => element.collect_text(output),
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(XmlNode::Text(last)) = self.children.last_mut() {
            last.push_str(text);
        } else {
            self.children.push(XmlNode::Text(text.to_string()));
        }
    }
}

/// [`XmlElement::descendants`] 的迭代器。
pub(super) struct Descendants<'a> {
    stack: Vec<&'a XmlElement>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a XmlElement;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        let start = self.stack.len();
        self.stack.extend(element.child_elements());
        self.stack[start..].reverse();
        Some(element)
    }
}

/// 判断一个文本节点是否只是排版用的空白（只含空白且包含换行）。
pub(super) fn is_formatting_whitespace(text: &str) -> bool {
    text.contains(['\n', '\r']) && text.trim().is_empty()
}

/// 把输入读成一棵树，返回一个虚拟的文档根元素。
pub(super) fn build_tree(content: &str, warnings: &mut Vec<String>) -> XmlElement {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);
    reader.config_mut().expand_empty_elements = true;

    let mut stack = vec![XmlElement::default()];
    let mut buf = Vec::new();
    let mut last_error_position = None;

    loop {
        let event = match reader.read_event_into(&mut buf) {
            Ok(event) => event,
            Err(QuickXmlError::IllFormed(err)) => {
                let position = reader.error_position();
                warnings.push(format!("TTML 格式错误，位置 {position}: {err}。尝试继续解析。"));
                // 同一位置反复出错说明读取器已无法前进
                if last_error_position == Some(position) {
                    break;
                }
                last_error_position = Some(position);
                recover_from_ill_formed(&mut stack, &err);
                buf.clear();
                continue;
            }
            Err(err) => {
                warnings.push(format!(
                    "TTML 解析错误，位置 {}: {err}。保留已解析的部分。",
                    reader.error_position()
                ));
                break;
            }
        };

        match event {
            Event::Start(e) => {
                let element = start_element(&e, &reader, warnings);
                stack.push(element);
            }
            Event::End(_) => close_top(&mut stack),
            Event::Text(e) => match e.xml_content() {
                Ok(text) => push_text(&mut stack, &text),
                Err(err) => warnings.push(format!("文本解码失败: {err}")),
            },
            Event::CData(e) => push_text(&mut stack, &String::from_utf8_lossy(&e)),
            Event::GeneralRef(e) => {
                if let Some(decoded) = decode_entity(&e, warnings) {
                    push_text(&mut stack, decoded.encode_utf8(&mut [0; 4]));
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    while stack.len() > 1 {
        close_top(&mut stack);
    }
    stack.pop().unwrap_or_default()
}

fn start_element(e: &BytesStart, reader: &Reader<&[u8]>, warnings: &mut Vec<String>) -> XmlElement {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut attributes = Vec::new();
    for attr in e.attributes() {
        match attr {
            Ok(attr) => {
                let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
                match attr.decode_and_unescape_value(reader.decoder()) {
                    Ok(value) => attributes.push((key, value.into_owned())),
                    Err(err) => warnings.push(format!("<{name}> 的属性 '{key}' 解码失败: {err}")),
                }
            }
            Err(err) => warnings.push(format!("<{name}> 的属性无效: {err}")),
        }
    }
    XmlElement {
        name,
        attributes,
        children: Vec::new(),
    }
}

fn push_text(stack: &mut [XmlElement], text: &str) {
    if let Some(top) = stack.last_mut() {
        top.push_text(text);
    }
}

fn close_top(stack: &mut Vec<XmlElement>) {
    if stack.len() <= 1 {
        return;
    }
    if let Some(element) = stack.pop()
        && let Some(parent) = stack.last_mut()
    {
        parent.children.push(XmlNode::Element(element));
    }
}

fn recover_from_ill_formed(stack: &mut Vec<XmlElement>, err: &IllFormedError) {
    // 结束标签与当前元素不匹配时，如果它能闭合某个祖先，就一并闭合中间的元素
    if let IllFormedError::MismatchedEndTag { found, .. } = err
        && let Some(depth) = stack.iter().rposition(|element| element.name == *found)
        && depth > 0
    {
        while stack.len() > depth {
            close_top(stack);
        }
    }
}

fn decode_entity(e: &BytesRef, warnings: &mut Vec<String>) -> Option<char> {
    let Ok(entity_name) = std::str::from_utf8(e.as_ref()) else {
        warnings.push("无法将实体名解码为UTF-8".to_string());
        return None;
    };

    let decoded = if let Some(num_str) = entity_name.strip_prefix('#') {
        let (radix, code_point_str) = num_str
            .strip_prefix(['x', 'X'])
            .map_or((10, num_str), |stripped| (16, stripped));
        u32::from_str_radix(code_point_str, radix)
            .ok()
            .and_then(char::from_u32)
    } else {
        match entity_name {
            "amp" => Some('&'),
            "lt" => Some('<'),
            "gt" => Some('>'),
            "quot" => Some('"'),
            "apos" => Some('\''),
            _ => None,
        }
    };

    if decoded.is_none() {
        warnings.push(format!("忽略了无法识别的XML实体 '&{entity_name};'"));
    }
    decoded
}
