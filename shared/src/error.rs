use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =========================================================
// 错误类型枚举
// =========================================================

/// 错误类型枚举
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApiErrorKind {
    /// 请求未到达服务器，或没有收到响应
    Network,
    /// 服务器返回了非 2xx 状态码
    Http,
    /// 401 在一次刷新重试后依然存在，或刷新本身失败
    AuthExpired,
    /// 响应体无法解析
    Decode,
    /// 客户端侧的请求构建或参数错误
    Invalid,
}

impl ApiErrorKind {
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiErrorKind::Network => "NETWORK_ERROR",
            ApiErrorKind::Http => "HTTP_ERROR",
            ApiErrorKind::AuthExpired => "AUTH_EXPIRED",
            ApiErrorKind::Decode => "DECODE_ERROR",
            ApiErrorKind::Invalid => "INVALID_REQUEST",
        }
    }
}

// =========================================================
// 错误上下文追踪
// =========================================================

/// 结构化的错误追踪片段
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorSpan {
    /// 操作名称，如 "patients.list", "auth.refresh"
    pub operation: String,
    /// 额外的细节信息，如 patient id
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl ErrorSpan {
    pub fn new(operation: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: None,
        }
    }

    pub fn with_detail(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            detail: Some(detail.into()),
        }
    }
}

// =========================================================
// 核心错误类型
// =========================================================

/// 客户端请求错误
///
/// - kind: 错误分类
/// - status: HTTP 状态码（仅 Http / AuthExpired）
/// - message: 错误消息
/// - payload: 服务器返回的错误体（可能包含 `detail` 或字段级错误）
/// - spans: 结构化的调用追踪栈
#[derive(Debug, Clone, PartialEq)]
pub struct ApiError {
    pub kind: ApiErrorKind,
    pub status: Option<u16>,
    pub message: String,
    pub payload: Option<Value>,
    spans: Vec<ErrorSpan>,
}

impl ApiError {
    pub fn new(kind: ApiErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: None,
            message: message.into(),
            payload: None,
            spans: Vec::new(),
        }
    }

    // --- Convenience constructors ---

    pub fn network(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Network, message)
    }

    /// 从失败响应构建；响应体若为 JSON 则保留为 payload
    pub fn http(status: u16, body: &str) -> Self {
        let payload = serde_json::from_str::<Value>(body).ok();
        let mut err = Self::new(ApiErrorKind::Http, format!("request failed with status {}", status));
        err.status = Some(status);
        err.payload = payload;
        err
    }

    pub fn auth_expired(message: impl Into<String>) -> Self {
        let mut err = Self::new(ApiErrorKind::AuthExpired, message);
        err.status = Some(401);
        err
    }

    pub fn decode(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Decode, message)
    }

    pub fn invalid(message: impl Into<String>) -> Self {
        Self::new(ApiErrorKind::Invalid, message)
    }

    // --- Context builders ---

    /// 添加操作追踪（无额外细节）
    pub fn in_op(mut self, operation: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::new(operation));
        self
    }

    /// 添加操作追踪（带额外细节）
    pub fn in_op_with(mut self, operation: impl Into<String>, detail: impl Into<String>) -> Self {
        self.spans.push(ErrorSpan::with_detail(operation, detail));
        self
    }

    // --- Accessors ---

    pub fn error_code(&self) -> &'static str {
        self.kind.error_code()
    }

    pub fn spans(&self) -> &[ErrorSpan] {
        &self.spans
    }

    pub fn is_auth_expired(&self) -> bool {
        self.kind == ApiErrorKind::AuthExpired
    }

    /// 服务器返回的 `detail` 字段
    pub fn detail(&self) -> Option<&str> {
        self.payload.as_ref()?.get("detail")?.as_str()
    }

    /// 第一个字段级错误，例如 `{"full_name": ["This field is required."]}`
    pub fn field_message(&self) -> Option<String> {
        let fields = self.payload.as_ref()?.as_object()?;
        fields.iter().find_map(|(field, value)| {
            let msg = match value {
                Value::String(s) => Some(s.as_str()),
                Value::Array(items) => items.first().and_then(Value::as_str),
                _ => None,
            }?;
            Some(format!("{}: {}", field, msg))
        })
    }

    /// 面向用户的错误信息
    ///
    /// 优先使用服务器的 `detail`，其次是字段级错误，最后回退到 `fallback`。
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(detail) = self.detail() {
            return detail.to_string();
        }
        if let Some(msg) = self.field_message() {
            return msg;
        }
        if self.is_auth_expired() {
            return "Your session has expired. Please log in again.".to_string();
        }
        fallback.to_string()
    }
}

// =========================================================
// Display & Error trait 实现
// =========================================================

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.error_code(), self.message)?;

        if !self.spans.is_empty() {
            write!(f, " | trace: ")?;
            for (i, span) in self.spans.iter().enumerate() {
                if i > 0 {
                    write!(f, " -> ")?;
                }
                write!(f, "{}", span.operation)?;
                if let Some(detail) = &span.detail {
                    write!(f, "({})", detail)?;
                }
            }
        }
        Ok(())
    }
}

impl std::error::Error for ApiError {}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::decode(e.to_string())
    }
}

pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_message_prefers_detail() {
        let err = ApiError::http(404, r#"{"detail": "Not found."}"#);
        assert_eq!(err.status, Some(404));
        assert_eq!(err.user_message("Failed to load patient"), "Not found.");
    }

    #[test]
    fn test_user_message_field_error() {
        let err = ApiError::http(400, r#"{"full_name": ["This field is required."]}"#);
        assert_eq!(
            err.user_message("Failed to create patient"),
            "full_name: This field is required."
        );
    }

    #[test]
    fn test_user_message_fallback() {
        let err = ApiError::http(500, "<html>Internal Server Error</html>");
        assert!(err.payload.is_none());
        assert_eq!(err.user_message("Failed to load patients"), "Failed to load patients");

        let err = ApiError::network("connection refused");
        assert_eq!(err.user_message("Failed to load patients"), "Failed to load patients");
    }

    #[test]
    fn test_auth_expired_message() {
        let err = ApiError::auth_expired("refresh rejected");
        assert!(err.is_auth_expired());
        assert_eq!(
            err.user_message("Failed"),
            "Your session has expired. Please log in again."
        );
    }

    #[test]
    fn test_display_with_trace() {
        let err = ApiError::network("timeout")
            .in_op("measurements.list")
            .in_op_with("dashboard.load", "patient=3");
        assert_eq!(
            err.to_string(),
            "[NETWORK_ERROR] timeout | trace: measurements.list -> dashboard.load(patient=3)"
        );
        assert_eq!(err.spans().len(), 2);
    }
}
