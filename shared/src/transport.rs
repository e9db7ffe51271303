use crate::error::{ApiError, ApiResult};
use crate::protocol::HttpMethod;
use serde::de::DeserializeOwned;
use std::collections::HashMap;

#[cfg(test)]
use std::{cell::RefCell, collections::VecDeque};

// =========================================================
// 核心抽象层 (HTTP Interface Abstraction)
// =========================================================

// Clone 以支持刷新后重发
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub url: String,
    pub method: HttpMethod,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(url: &str, method: HttpMethod) -> Self {
        Self {
            url: url.to_string(),
            method,
            headers: HashMap::new(),
            body: None,
        }
    }

    pub fn with_header(mut self, key: &str, value: &str) -> Self {
        self.headers.insert(key.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: &serde_json::Value) -> Self {
        self.body = Some(body.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: String,
}

impl HttpResponse {
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// 解析响应体；空响应体（如 204）按 `null` 处理，可解析为 `()`
    pub fn json<T: DeserializeOwned>(&self) -> ApiResult<T> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        serde_json::from_str(body).map_err(|e| ApiError::decode(e.to_string()))
    }
}

/// HTTP 传输层
///
/// 浏览器端由 `fetch` 实现，测试中由 `MockTransport` 实现。
#[async_trait::async_trait(?Send)]
pub trait HttpTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse>;
}

// =========================================================
// 测试工具: MockTransport
// =========================================================

#[cfg(test)]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: HashMap<String, String>,
    pub body: Option<String>,
}

#[cfg(test)]
#[derive(Default)]
pub struct MockTransport {
    // "METHOD url" -> 按顺序返回的 (Status, Body)；最后一个响应会被重复使用
    responses: RefCell<HashMap<String, VecDeque<(u16, String)>>>,
    // "METHOD url" -> 网络错误
    failures: RefCell<HashMap<String, String>>,
    pub requests: RefCell<Vec<RecordedRequest>>,
}

#[cfg(test)]
impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(method: HttpMethod, url: &str) -> String {
        format!("{} {}", method.as_str(), url)
    }

    pub fn mock_response(&self, method: HttpMethod, url: &str, status: u16, body: serde_json::Value) {
        self.mock_raw(method, url, status, &body.to_string());
    }

    pub fn mock_raw(&self, method: HttpMethod, url: &str, status: u16, body: &str) {
        self.responses
            .borrow_mut()
            .entry(Self::key(method, url))
            .or_default()
            .push_back((status, body.to_string()));
    }

    pub fn mock_network_error(&self, method: HttpMethod, url: &str, message: &str) {
        self.failures
            .borrow_mut()
            .insert(Self::key(method, url), message.to_string());
    }

    pub fn count(&self, method: HttpMethod, url: &str) -> usize {
        self.requests
            .borrow()
            .iter()
            .filter(|r| r.method == method && r.url == url)
            .count()
    }
}

#[cfg(test)]
#[async_trait::async_trait(?Send)]
impl HttpTransport for MockTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        self.requests.borrow_mut().push(RecordedRequest {
            method: req.method,
            url: req.url.clone(),
            headers: req.headers.clone(),
            body: req.body.clone(),
        });

        let key = Self::key(req.method, &req.url);
        if let Some(message) = self.failures.borrow().get(&key) {
            return Err(ApiError::network(message.clone()));
        }

        let mut responses = self.responses.borrow_mut();
        let next = match responses.get_mut(&key) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };
        let (status, body) = next.unwrap_or((404, r#"{"detail": "Not found."}"#.to_string()));
        Ok(HttpResponse { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_body_decodes_as_unit() {
        let resp = HttpResponse {
            status: 204,
            body: String::new(),
        };
        assert!(resp.ok());
        resp.json::<()>().unwrap();
    }

    #[test]
    fn test_invalid_body_is_decode_error() {
        let resp = HttpResponse {
            status: 200,
            body: "<html>".into(),
        };
        let err = resp.json::<Vec<u64>>().unwrap_err();
        assert_eq!(err.kind, crate::error::ApiErrorKind::Decode);
    }

    #[tokio::test]
    async fn test_mock_serves_queue_in_order() {
        let mock = MockTransport::new();
        let url = "http://api/health/patients/";
        mock.mock_raw(HttpMethod::Get, url, 401, "");
        mock.mock_raw(HttpMethod::Get, url, 200, "[]");

        let req = HttpRequest::new(url, HttpMethod::Get);
        assert_eq!(mock.send(req.clone()).await.unwrap().status, 401);
        assert_eq!(mock.send(req.clone()).await.unwrap().status, 200);
        // 最后一个响应保持不变
        assert_eq!(mock.send(req).await.unwrap().status, 200);
        assert_eq!(mock.count(HttpMethod::Get, url), 3);
    }
}
