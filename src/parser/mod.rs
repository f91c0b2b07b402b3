pub mod blocks;
pub mod comments;
pub mod request_line;
pub mod response;
pub mod types;
pub mod variables;

// Re-export commonly used types
pub use response::ResponseMatcher;
pub use types::{Block, Directive, ParseError, ParseResult, SourceFile};
pub use variables::VariableResolver;

use crate::http::RequestBuilder;

/// 解析流水线
///
/// 每个阶段接收并返回完整的 `SourceFile`，任一阶段失败则整次解析失败
pub struct DslParser;

impl DslParser {
    /// 解析所有文件，任何文件失败都不返回部分结果
    pub fn parse_all(files: Vec<SourceFile>) -> ParseResult<Vec<SourceFile>> {
        files.into_iter().map(Self::parse).collect()
    }

    /// 解析单个文件
    pub fn parse(file: SourceFile) -> ParseResult<SourceFile> {
        tracing::debug!("Parsing {}", file.file_path.display());
        let file = comments::strip_comments(file)?;
        let file = variables::resolve_variables(file)?;
        let file = blocks::split_blocks(file)?;
        let file = blocks::normalize_blocks(file)?;
        let file = request_line::fold_multiline_urls(file)?;
        let file = request_line::normalize_request_lines(file)?;
        let file = build_requests(file)?;
        ResponseMatcher::attach(file)
    }

    /// 从字符串内容解析
    pub fn parse_content(content: &str) -> ParseResult<SourceFile> {
        Self::parse(SourceFile::new("<inline>", content))
    }
}

/// 为首行是请求行的块构建请求，失败只记录在该块上
///
/// 块内空行之后的状态行及其后内容作为该块的期望响应，不进入请求体
fn build_requests(mut file: SourceFile) -> ParseResult<SourceFile> {
    for block in &mut file.blocks {
        if !request_line::is_request_line(block.first_line()) {
            continue;
        }

        let (request_text, inline_response) = ResponseMatcher::split_inline(&block.content);
        if let Some(response_text) = inline_response {
            let response =
                ResponseMatcher::parse(&response_text).map_err(|message| ParseError::MalformedResponse {
                    path: file.file_path.clone(),
                    block: block.id,
                    message,
                })?;
            block.expected_response = Some(response);
        }

        match RequestBuilder::build(&request_text) {
            Ok(mut request) => {
                request.follow_redirects = !block.has_directive(&Directive::NoRedirect);
                block.request = Some(request);
            }
            Err(e) => {
                tracing::debug!(
                    "Failed to build request in {}, block {}: {}",
                    file.file_path.display(),
                    block.id,
                    e
                );
                block.build_error = Some(e);
            }
        }
    }
    Ok(file)
}
