use crate::parser::types::{Block, Directive, ParseError, ParseResult, SourceFile};

/// 块分隔符
pub const DELIMITER: &str = "###";

/// 第 3 步：按 ### 分割为块
///
/// 分隔符行之后的文字作为下一个块的标签；空块被丢弃，编号不受影响
pub fn split_blocks(mut file: SourceFile) -> ParseResult<SourceFile> {
    if file.raw_content.is_empty() {
        return Err(ParseError::EmptyFile {
            path: file.file_path,
        });
    }

    let mut blocks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut label: Option<String> = None;

    for line in file.raw_content.split('\n') {
        match line.trim_end_matches('\r').strip_prefix(DELIMITER) {
            Some(rest) => {
                push_block(&mut blocks, &current, label.take());
                current.clear();
                let rest = rest.trim();
                label = (!rest.is_empty()).then(|| rest.to_string());
            }
            None => current.push(line),
        }
    }
    push_block(&mut blocks, &current, label);

    if blocks.is_empty() {
        return Err(ParseError::NoBlocks {
            path: file.file_path,
        });
    }

    tracing::debug!(
        "Split {} into {} blocks",
        file.file_path.display(),
        blocks.len()
    );
    file.blocks = blocks;
    Ok(file)
}

fn push_block(blocks: &mut Vec<Block>, lines: &[&str], label: Option<String>) {
    let text = lines.join("\n");
    let (directives, content) = peel_directives(text.trim());
    // 只有指令的块没有内容，不占编号
    if content.is_empty() {
        return;
    }

    let mut block = Block::new(blocks.len() + 1, content, label);
    block.directives = directives;
    blocks.push(block);
}

/// 拆出块开头的指令行
fn peel_directives(text: &str) -> (Vec<Directive>, String) {
    let mut directives = Vec::new();
    let mut lines = text.split('\n').peekable();

    while let Some(line) = lines.peek() {
        if line.trim().is_empty() {
            lines.next();
            continue;
        }
        match Directive::parse(line) {
            Some(directive) => {
                directives.push(directive);
                lines.next();
            }
            None => break,
        }
    }

    let content = lines.collect::<Vec<_>>().join("\n");
    (directives, content.trim().to_string())
}

/// 第 4 步：每个块以恰好一个 CRLF 空行结尾
pub fn normalize_blocks(mut file: SourceFile) -> ParseResult<SourceFile> {
    for block in &mut file.blocks {
        if !block.content.ends_with("\r\n\r\n") || block.content.ends_with("\r\n\r\n\r\n") {
            block.content = ensure_trailing_blank_line(&block.content);
            tracing::debug!(
                "Normalized block {} in file {}",
                block.id,
                file.file_path.display()
            );
        }
    }
    Ok(file)
}

pub(crate) fn ensure_trailing_blank_line(content: &str) -> String {
    format!("{}\r\n\r\n", content.trim_end_matches(['\r', '\n']))
}
