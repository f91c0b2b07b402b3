use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use crate::http::request::ParsedRequest;
use crate::http::response::Response;

/// 发送失败，只影响当前请求
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("request timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("{0}")]
    Network(String),

    #[error("cannot send request: {0}")]
    InvalidRequest(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_builder() {
            TransportError::InvalidRequest(err.to_string())
        } else {
            TransportError::Network(err.to_string())
        }
    }
}

/// "发送请求，在超时内得到响应或错误" 的能力
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: &ParsedRequest) -> Result<Response, TransportError>;
}

/// 基于 reqwest 的实现
#[derive(Clone)]
pub struct Client {
    follow: reqwest::Client,
    no_redirect: reqwest::Client,
}

impl Client {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let follow = reqwest::Client::builder().timeout(timeout).build()?;
        let no_redirect = reqwest::Client::builder()
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            follow,
            no_redirect,
        })
    }

    fn headers(request: &ParsedRequest) -> Result<HeaderMap, TransportError> {
        let mut headers = HeaderMap::new();
        for (key, value) in &request.headers {
            let name = HeaderName::from_bytes(key.as_bytes())
                .map_err(|e| TransportError::InvalidRequest(format!("header '{}': {}", key, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| TransportError::InvalidRequest(format!("header '{}': {}", key, e)))?;
            headers.append(name, value);
        }
        Ok(headers)
    }
}

#[async_trait]
impl Transport for Client {
    async fn send(&self, request: &ParsedRequest) -> Result<Response, TransportError> {
        let url = reqwest::Url::parse(&request.url)
            .map_err(|e| TransportError::InvalidRequest(format!("'{}': {}", request.url, e)))?;
        let method = reqwest::Method::from_bytes(request.method.as_str().as_bytes())
            .map_err(|e| TransportError::InvalidRequest(e.to_string()))?;

        let client = if request.follow_redirects {
            &self.follow
        } else {
            &self.no_redirect
        };
        let mut req = client.request(method, url).headers(Self::headers(request)?);
        if !request.body.is_empty() {
            req = req.body(request.body.clone());
        }

        let start = Instant::now();
        let response = req.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(start.elapsed())
            } else {
                TransportError::from(e)
            }
        })?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response.text().await?;
        let duration = start.elapsed();

        Ok(Response::new(status, headers, body, duration))
    }
}
