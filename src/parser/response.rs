use crate::http::ParsedResponse;
use crate::parser::request_line::is_status_line;
use crate::parser::types::{ParseError, ParseResult, SourceFile};

/// 将请求块之后的响应块解析为期望响应，并挂到请求块上
///
/// 响应块本身保留在块序列中；它的首行不是请求行，所以不会被执行
pub struct ResponseMatcher;

impl ResponseMatcher {
    pub fn attach(mut file: SourceFile) -> ParseResult<SourceFile> {
        for j in 0..file.blocks.len().saturating_sub(1) {
            if file.blocks[j].request.is_none() {
                continue;
            }

            let next = &file.blocks[j + 1];
            let content = next.content.trim();
            let first_line = content.split('\n').next().unwrap_or_default();
            if !is_status_line(first_line) {
                continue;
            }

            let response = Self::parse(content).map_err(|message| ParseError::MalformedResponse {
                path: file.file_path.clone(),
                block: next.id,
                message,
            })?;

            tracing::debug!(
                "Attached response from block {} to request block {} with status code {}",
                next.id,
                file.blocks[j].id,
                response.status_code
            );
            file.blocks[j].expected_response = Some(response);
        }
        Ok(file)
    }

    /// 拆出请求块内空行之后的状态行及其后内容
    ///
    /// 返回 `(请求部分, 期望响应部分)`；没有内联响应时第二项为 None
    pub fn split_inline(content: &str) -> (String, Option<String>) {
        let lines: Vec<&str> = content.split('\n').collect();
        let position = (1..lines.len())
            .find(|&i| lines[i - 1].trim().is_empty() && is_status_line(lines[i]));

        match position {
            Some(i) => (lines[..i].join("\n"), Some(lines[i..].join("\n"))),
            None => (content.to_string(), None),
        }
    }

    /// 严格解析：状态行少于 3 段、状态码非数字、header 缺少冒号均为错误
    pub fn parse(content: &str) -> Result<ParsedResponse, String> {
        let normalized = content.replace("\r\n", "\n");
        let mut lines = normalized.trim().split('\n');

        let status_line = lines.next().unwrap_or_default().trim();
        let (protocol, status_code, status_text) = Self::parse_status_line(status_line)?;

        let mut headers = Vec::new();
        for line in lines.by_ref() {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            let (key, value) = line
                .split_once(':')
                .ok_or_else(|| format!("malformed header line: {:?}", line))?;
            headers.push((key.trim().to_string(), value.trim().to_string()));
        }

        let body = lines.collect::<Vec<_>>().join("\n");

        Ok(ParsedResponse {
            protocol,
            status_code,
            status_text,
            headers,
            body: body.trim_end_matches(['\r', '\n']).to_string(),
        })
    }

    fn parse_status_line(line: &str) -> Result<(String, u16, String), String> {
        let malformed = || format!("malformed status line: {:?}", line);
        let (protocol, rest) = line.split_once(char::is_whitespace).ok_or_else(malformed)?;
        let (code, text) = rest
            .trim_start()
            .split_once(char::is_whitespace)
            .ok_or_else(malformed)?;

        let status_code = code
            .parse::<u16>()
            .map_err(|_| format!("invalid status code {:?}", code))?;
        let text = text.trim();
        if text.is_empty() {
            return Err(malformed());
        }

        Ok((protocol.to_string(), status_code, text.to_string()))
    }
}
