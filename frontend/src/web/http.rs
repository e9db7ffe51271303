//! HTTP 传输层
//!
//! 使用 `web_sys::fetch` 实现共享 crate 的 [`HttpTransport`]。

use async_trait::async_trait;
use vitalwatch_shared::error::{ApiError, ApiResult};
use vitalwatch_shared::transport::{HttpRequest, HttpResponse, HttpTransport};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Headers, Request, RequestInit, Response};

fn js_error(context: &str, err: JsValue) -> ApiError {
    ApiError::network(format!("{}: {:?}", context, err))
}

/// 浏览器 fetch 传输
#[derive(Debug, Clone, Copy, Default)]
pub struct FetchTransport;

impl FetchTransport {
    fn build(req: &HttpRequest) -> ApiResult<Request> {
        let headers = Headers::new().map_err(|e| js_error("create headers", e))?;
        for (key, value) in &req.headers {
            headers
                .set(key, value)
                .map_err(|e| ApiError::invalid(format!("header {}: {:?}", key, e)))?;
        }

        let opts = RequestInit::new();
        opts.set_method(req.method.as_str());
        opts.set_headers(&headers.into());
        if let Some(body) = &req.body {
            opts.set_body(&JsValue::from_str(body));
        }

        Request::new_with_str_and_init(&req.url, &opts)
            .map_err(|e| ApiError::invalid(format!("build request: {:?}", e)))
    }

    async fn read_text(response: &Response) -> ApiResult<String> {
        let promise = response.text().map_err(|e| js_error("read body", e))?;
        let text = JsFuture::from(promise)
            .await
            .map_err(|e| js_error("read body", e))?;
        Ok(text.as_string().unwrap_or_default())
    }
}

#[async_trait(?Send)]
impl HttpTransport for FetchTransport {
    async fn send(&self, req: HttpRequest) -> ApiResult<HttpResponse> {
        let request = Self::build(&req)?;

        let window = web_sys::window().ok_or_else(|| ApiError::network("window unavailable"))?;
        let value = JsFuture::from(window.fetch_with_request(&request))
            .await
            .map_err(|e| js_error("fetch", e))?;
        let response: Response = value
            .dyn_into()
            .map_err(|e| ApiError::decode(format!("not a Response: {:?}", e)))?;

        Ok(HttpResponse {
            status: response.status(),
            body: Self::read_text(&response).await?,
        })
    }
}
