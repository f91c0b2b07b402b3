use crate::http::request::ParsedRequest;
use crate::http::types::Method;

/// 未指定 Content-Type 时 POST / PUT body 的默认类型
pub const DEFAULT_FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// 请求构建错误，只影响当前块
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuildError {
    #[error("empty request line")]
    EmptyRequestLine,

    #[error("invalid HTTP method '{0}'")]
    InvalidMethod(String),

    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// 将规范化后的块文本转换为 `ParsedRequest`，不发送任何内容
pub struct RequestBuilder;

impl RequestBuilder {
    pub fn build(content: &str) -> Result<ParsedRequest, BuildError> {
        let normalized = content.replace("\r\n", "\n");
        let mut lines = normalized.split('\n');

        let request_line = lines.next().unwrap_or_default().trim();
        let mut tokens = request_line.split_whitespace();

        let method_token = tokens.next().ok_or(BuildError::EmptyRequestLine)?;
        let method = Method::from_token(method_token)
            .ok_or_else(|| BuildError::InvalidMethod(method_token.to_string()))?;
        let target = tokens.next().unwrap_or("/");
        let version = tokens.next().unwrap_or("HTTP/1.1");

        // Headers 直到第一个空行
        let mut headers = Vec::new();
        for line in lines.by_ref() {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            match Self::parse_header(line) {
                Some((key, value)) => headers.push((key.to_string(), value.to_string())),
                None => tracing::debug!("Ignoring header line without colon: {}", line),
            }
        }

        let body = lines.collect::<Vec<_>>().join("\n");
        let body = body.trim_end_matches(['\r', '\n']).to_string();

        let host = headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("host"))
            .map(|(_, v)| v.as_str());
        let url = Self::resolve_url(target, host)?;

        let mut request = ParsedRequest::new(method, url);
        request.http_version = version.to_string();
        request.headers = headers;

        if !body.is_empty() {
            if !request.has_header("Content-Length") {
                request
                    .headers
                    .push(("Content-Length".to_string(), body.len().to_string()));
            }
            if method.defaults_form_content_type() && !request.has_header("Content-Type") {
                request
                    .headers
                    .push(("Content-Type".to_string(), DEFAULT_FORM_CONTENT_TYPE.to_string()));
            }
        }
        request.body = body;

        Ok(request)
    }

    /// 解析 header 行，第一个冒号为分隔点
    fn parse_header(line: &str) -> Option<(&str, &str)> {
        let (key, value) = line.split_once(':')?;
        let key = key.trim();
        if key.is_empty() {
            return None;
        }
        Some((key, value.trim()))
    }

    /// 解析请求目标
    ///
    /// - `scheme://...` 直接解析
    /// - `/path` 有 Host header 时拼接，否则保留相对路径
    /// - 其他情况视为省略了 scheme 的地址
    fn resolve_url(target: &str, host: Option<&str>) -> Result<String, BuildError> {
        if target.contains("://") {
            return Self::parse_absolute(target);
        }

        if target.starts_with('/') {
            return match host {
                Some(host) => {
                    let base = if host.contains("://") {
                        host.trim_end_matches('/').to_string()
                    } else {
                        format!("http://{}", host)
                    };
                    Self::parse_absolute(&format!("{}{}", base, target))
                }
                None => {
                    let base = url::Url::parse("http://localhost/").map_err(|e| Self::invalid(target, e))?;
                    base.join(target).map_err(|e| Self::invalid(target, e))?;
                    Ok(target.to_string())
                }
            };
        }

        Self::parse_absolute(&format!("http://{}", target))
    }

    fn parse_absolute(raw: &str) -> Result<String, BuildError> {
        let url = url::Url::parse(raw).map_err(|e| Self::invalid(raw, e))?;
        if url.host_str().is_none_or(str::is_empty) {
            return Err(BuildError::InvalidUrl {
                url: raw.to_string(),
                reason: "missing host".to_string(),
            });
        }
        Ok(url.to_string())
    }

    fn invalid(url: &str, err: url::ParseError) -> BuildError {
        BuildError::InvalidUrl {
            url: url.to_string(),
            reason: err.to_string(),
        }
    }
}
