use crate::http::Method;
use crate::parser::blocks::ensure_trailing_blank_line;
use crate::parser::types::{ParseResult, SourceFile};
use regex::Regex;
use std::sync::OnceLock;

fn request_line_regex() -> &'static Regex {
    static REQUEST_REGEX: OnceLock<Regex> = OnceLock::new();
    REQUEST_REGEX.get_or_init(|| {
        Regex::new(
            r"^(GET|POST|PUT|DELETE|PATCH|HEAD|OPTIONS|TRACE|CONNECT)\s+\S+(\s+HTTP/\d+(\.\d+)?)?\s*$",
        )
        .unwrap()
    })
}

fn status_line_regex() -> &'static Regex {
    static STATUS_REGEX: OnceLock<Regex> = OnceLock::new();
    STATUS_REGEX.get_or_init(|| Regex::new(r"^HTTP/\d\.\d\s+\d{3}\b").unwrap())
}

fn version_suffix_regex() -> &'static Regex {
    static VERSION_REGEX: OnceLock<Regex> = OnceLock::new();
    VERSION_REGEX.get_or_init(|| Regex::new(r"\sHTTP/\d+(\.\d+)?$").unwrap())
}

/// `METHOD target [HTTP/x.x]`，方法必须为大写
pub fn is_request_line(line: &str) -> bool {
    request_line_regex().is_match(line.trim())
}

/// `HTTP/x.x NNN ...`
pub fn is_status_line(line: &str) -> bool {
    status_line_regex().is_match(line.trim())
}

/// 首个 token 是否为方法（不区分大小写），且其后还有内容
fn starts_with_verb(line: &str) -> bool {
    match line.split_once(char::is_whitespace) {
        Some((token, _)) => Method::from_token(token).is_some(),
        None => false,
    }
}

/// 缩进且以 `?` 或 `&` 开头的行
fn is_continuation(line: &str) -> bool {
    let trimmed = line.trim();
    let indented = line.len() > line.trim_start().len();
    indented && (trimmed.starts_with('?') || trimmed.starts_with('&'))
}

/// 第 5 步：合并多行 URL 的查询参数
pub fn fold_multiline_urls(mut file: SourceFile) -> ParseResult<SourceFile> {
    for block in &mut file.blocks {
        if let Some(folded) = fold_block(&block.content) {
            tracing::debug!("Folded multi-line URL in block {}", block.id);
            block.content = folded;
        }
    }
    Ok(file)
}

/// 没有需要合并的行时返回 None
pub fn fold_block(content: &str) -> Option<String> {
    let lines: Vec<&str> = content.split('\n').collect();
    let first = lines.first()?.trim();
    if !starts_with_verb(first) {
        return None;
    }

    let params: Vec<&str> = lines[1..]
        .iter()
        .take_while(|line| is_continuation(line))
        .map(|line| line.trim())
        .collect();
    if params.is_empty() {
        return None;
    }

    let (base, version) = match first.rfind(" HTTP/") {
        Some(pos) => first.split_at(pos),
        None => (first, ""),
    };

    let mut query = params.concat();
    if let Some(rest) = query.strip_prefix('?')
        && rest.contains('?')
    {
        query = format!("?{}", rest.replace('?', "&"));
    }

    let mut folded = format!("{}{}{}", base, query, version);
    let remaining = &lines[1 + params.len()..];
    if !remaining.is_empty() {
        folded.push('\n');
        folded.push_str(&remaining.join("\n"));
    }

    Some(ensure_trailing_blank_line(&folded))
}

/// 第 6 步：校验并修复请求行
///
/// - 小写方法转为大写
/// - 没有方法时补 `GET `
/// - 没有 ` HTTP/x.x` 时补 ` HTTP/1.1`
///
/// 状态行（期望响应块）不做修改
pub fn normalize_request_lines(mut file: SourceFile) -> ParseResult<SourceFile> {
    for block in &mut file.blocks {
        let Some(line) = normalize_request_line(block.first_line()) else {
            continue;
        };
        tracing::debug!("Validated request line of block {}: {}", block.id, line);
        block.content = replace_first_line(&block.content, &line);
    }
    Ok(file)
}

/// 返回修复后的请求行，无需修改时返回 None
pub fn normalize_request_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || is_status_line(trimmed) {
        return None;
    }

    let first_token = trimmed.split_whitespace().next()?;
    let mut normalized = match Method::from_token(first_token) {
        Some(method) => format!("{}{}", method.as_str(), &trimmed[first_token.len()..]),
        None => format!("GET {}", trimmed),
    };

    if !version_suffix_regex().is_match(&normalized) {
        normalized.push_str(" HTTP/1.1");
    }

    (normalized != line).then_some(normalized)
}

fn replace_first_line(content: &str, line: &str) -> String {
    match content.find('\n') {
        Some(pos) => {
            let cr = if content[..pos].ends_with('\r') { "\r" } else { "" };
            format!("{}{}{}", line, cr, &content[pos..])
        }
        None => line.to_string(),
    }
}
