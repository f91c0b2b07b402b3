use crate::http::types::Status;
use reqwest::header::HeaderMap as Headers;
use std::time::Duration;

/// 文件中写出的期望响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedResponse {
    /// 如 `HTTP/1.1`
    pub protocol: String,
    pub status_code: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl ParsedResponse {
    /// `"404 Not Found"` 形式
    pub fn status(&self) -> String {
        if self.status_text.is_empty() {
            self.status_code.to_string()
        } else {
            format!("{} {}", self.status_code, self.status_text)
        }
    }
}

/// 实际收到的响应
#[derive(Debug, Clone)]
pub struct Response {
    pub status: Status,
    pub headers: Headers,
    pub body: String,
    pub duration: Duration,
}

impl Response {
    pub fn new(status: u16, headers: Headers, body: String, duration: Duration) -> Self {
        Self {
            status: Status::new(status),
            headers,
            body,
            duration,
        }
    }
}
