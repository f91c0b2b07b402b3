use crate::parser::types::{Directive, ParseResult, SourceFile};

/// 第 1 步：移除 `//` 注释行，保留 `// @name` 等指令
///
/// `#` 与 `/* */` 不是注释
pub fn strip_comments(mut file: SourceFile) -> ParseResult<SourceFile> {
    file.raw_content = strip_comment_lines(&file.raw_content);
    Ok(file)
}

pub fn strip_comment_lines(content: &str) -> String {
    content
        .split('\n')
        .filter(|line| !is_removable_comment(line))
        .collect::<Vec<_>>()
        .join("\n")
}

fn is_removable_comment(line: &str) -> bool {
    line.trim_start().starts_with("//") && !Directive::is_directive_line(line)
}
