use crate::http::types::Method;

/// 可发送的结构化请求
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedRequest {
    pub method: Method,

    /// 绝对 URL；没有 Host 可用时保留原始的相对路径
    pub url: String,

    /// 如 `HTTP/1.1`
    pub http_version: String,

    /// Headers 列表，保持原始顺序
    pub headers: Vec<(String, String)>,

    pub body: String,

    /// 遇到 3xx 时是否跟随跳转（`// @no-redirect` 关闭）
    pub follow_redirects: bool,
}

impl ParsedRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            http_version: "HTTP/1.1".to_string(),
            headers: Vec::new(),
            body: String::new(),
            follow_redirects: true,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    pub fn with_body(mut self, body: &str) -> Self {
        self.body = body.to_string();
        self
    }

    /// 按名称查找 header（不区分大小写）
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_header(&self, name: &str) -> bool {
        self.header(name).is_some()
    }

    /// 规范的请求报文文本，用于显示和调试
    pub fn to_wire(&self) -> String {
        let mut out = format!("{} {} {}\r\n", self.method, self.url, self.http_version);
        for (key, value) in &self.headers {
            out.push_str(&format!("{}: {}\r\n", key, value));
        }
        out.push_str("\r\n");
        out.push_str(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let request = ParsedRequest::new(Method::Get, "http://example.com/")
            .with_header("content-type", "application/json");
        assert_eq!(request.header("Content-Type"), Some("application/json"));
        assert!(!request.has_header("Content-Length"));
    }

    #[test]
    fn test_to_wire() {
        let request = ParsedRequest::new(Method::Post, "http://example.com/items")
            .with_header("Content-Length", "7")
            .with_body("name=a");
        assert_eq!(
            request.to_wire(),
            "POST http://example.com/items HTTP/1.1\r\nContent-Length: 7\r\n\r\nname=a"
        );
    }
}
