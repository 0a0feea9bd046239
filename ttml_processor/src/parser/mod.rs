//! # TTML (Timed Text Markup Language) 解析器
//!
//! 该解析器设计上仅用于解析 Apple Music 和 AMLL 使用的 TTML 歌词文件，
//! 不建议用于解析通用的 TTML 字幕文件。
//!
//! 解析分为几个阶段：先把输入读成一棵宽松的元素树，然后收集头部的元数据和
//! 翻译/音译查找表，最后深度优先遍历正文构建歌词行。

mod body;
pub(crate) mod constants;
mod metadata;
mod state;
mod tree;
mod utils;

use lyric_core::{LyricDocument, TtmlParsingOptions};
use tracing::{debug, warn};

use self::body::BodyContext;

/// 解析结果。
#[derive(Debug, Clone, Default)]
pub struct ParsedTtml {
    /// 解析出的歌词文档
    pub document: LyricDocument,
    /// 解析过程中跳过的内容和遇到的问题
    pub warnings: Vec<String>,
}

/// 解析 TTML 格式的歌词文件。
///
/// 解析从不失败：无法识别或部分损坏的节点会被跳过，并记录到 [`ParsedTtml::warnings`] 中。
///
/// # 参数
///
/// * `content` - TTML 格式的歌词文件内容字符串。
/// * `options` - TTML 解析选项，决定多语言时的主翻译和主音译。
pub fn parse_ttml(content: &str, options: &TtmlParsingOptions) -> ParsedTtml {
    let mut warnings = Vec::new();

    let root = tree::build_tree(content, &mut warnings);
    let head = metadata::collect_head_data(&root, &mut warnings);
    let tables = metadata::collect_aux_tables(&root, &mut warnings);

    let ctx = BodyContext {
        tables: &tables,
        main_agent_id: &head.main_agent_id,
        options,
    };
    let lines = body::collect_lines(&root, &ctx, &mut warnings);

    if !warnings.is_empty() {
        warn!("TTML 解析完成，共有 {} 条警告", warnings.len());
        for warning in &warnings {
            debug!("{warning}");
        }
    }
    debug!(
        lines = lines.len(),
        main_agent = %head.main_agent_id,
        "TTML 解析完成"
    );

    ParsedTtml {
        document: LyricDocument::new(head.metadata, head.vocal_tags, lines),
        warnings,
    }
}
