use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::forms::MeasurementDraft;
use crate::protocol::{
    ApiRequest, CreateMeasurement, CreatePatient, DeleteMeasurement, DeletePatient, GetMeasurement,
    GetPatient, GetPrediction, HttpMethod, ListMeasurements, ListPatients, LoginRequest,
    ProfileRequest, RefreshRequest, RegisterRequest, UpdatePatient,
};
use crate::session::SessionStore;
use crate::transport::{HttpRequest, HttpResponse, HttpTransport};
use crate::{
    HEADER_AUTHORIZATION, Measurement, MeasurementId, NewMeasurement, NewPatient, Patient,
    PatientId, PatientPatch, Prediction, RefreshedToken, TokenPair, User,
};
use serde_json::Value;

/// 单次调用的 401 重试状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RetryState {
    NotRetried,
    RetriedOnce,
}

/// REST API 客户端
///
/// 已认证的调用会附带 `Authorization: Bearer <access>`。收到 401 时用 refresh
/// 凭据换取新的 access 并重发一次；刷新失败或重发后仍为 401 时清空会话并返回
/// `AuthExpired`。
#[derive(Clone)]
pub struct ApiClient<T, S> {
    config: ClientConfig,
    transport: T,
    session: S,
}

impl<T: HttpTransport, S: SessionStore> ApiClient<T, S> {
    pub fn new(config: ClientConfig, transport: T, session: S) -> Self {
        Self {
            config,
            transport,
            session,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    fn build_request(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<&Value>,
        authenticated: bool,
    ) -> HttpRequest {
        let mut req = HttpRequest::new(&self.config.endpoint(path), method)
            .with_header("Content-Type", "application/json");

        if authenticated {
            if let Some(token) = self.session.access_token() {
                req = req.with_header(HEADER_AUTHORIZATION, &format!("Bearer {}", token));
            }
        }
        if let Some(body) = body {
            req = req.with_body(body);
        }
        req
    }

    /// 发送请求并处理 401 刷新重试
    pub async fn send(
        &self,
        method: HttpMethod,
        path: &str,
        body: Option<Value>,
        authenticated: bool,
    ) -> ApiResult<HttpResponse> {
        let mut retry = RetryState::NotRetried;

        loop {
            let req = self.build_request(method, path, body.as_ref(), authenticated);
            let resp = self
                .transport
                .send(req)
                .await
                .map_err(|e| e.in_op_with("http.send", format!("{} {}", method, path)))?;

            if resp.ok() {
                return Ok(resp);
            }

            if resp.status == 401 && authenticated {
                match retry {
                    RetryState::NotRetried => {
                        self.refresh_access().await?;
                        retry = RetryState::RetriedOnce;
                        continue;
                    }
                    RetryState::RetriedOnce => {
                        log_warn!("[Auth] {} {} still unauthorized after refresh", method, path);
                        self.session.clear();
                        return Err(ApiError::auth_expired("unauthorized after token refresh")
                            .in_op_with("http.send", format!("{} {}", method, path)));
                    }
                }
            }

            return Err(ApiError::http(resp.status, &resp.body));
        }
    }

    /// 用 refresh 凭据换取新的 access；失败时清空会话
    async fn refresh_access(&self) -> ApiResult<()> {
        let Some(refresh) = self.session.refresh_token() else {
            log_warn!("[Auth] access token rejected and no refresh token stored");
            self.session.clear();
            return Err(ApiError::auth_expired("no refresh token").in_op("auth.refresh"));
        };

        log_info!("[Auth] access token rejected, refreshing");
        let request = RefreshRequest { refresh };
        let req = self.build_request(
            RefreshRequest::METHOD,
            &request.path(),
            request.body().as_ref(),
            RefreshRequest::AUTHENTICATED,
        );

        let refreshed = match self.transport.send(req).await {
            Ok(resp) if resp.ok() => resp.json::<RefreshedToken>(),
            Ok(resp) => Err(ApiError::http(resp.status, &resp.body)),
            Err(e) => Err(e),
        };

        match refreshed {
            Ok(token) => {
                self.session.set_access_token(&token.access);
                if let Some(rotated) = &token.refresh {
                    self.session.set_refresh_token(rotated);
                }
                Ok(())
            }
            Err(e) => {
                log_error!("[Auth] token refresh failed: {}", e);
                self.session.clear();
                Err(ApiError::auth_expired(e.message).in_op("auth.refresh"))
            }
        }
    }

    /// 按 [`ApiRequest`] 定义发送并解析响应
    pub async fn call<R: ApiRequest>(&self, request: &R) -> ApiResult<R::Response> {
        let resp = self
            .send(R::METHOD, &request.path(), request.body(), R::AUTHENTICATED)
            .await?;
        resp.json()
    }

    // =========================================================
    // Auth
    // =========================================================

    pub async fn login(&self, request: &LoginRequest) -> ApiResult<TokenPair> {
        let tokens = self.call(request).await.map_err(|e| e.in_op("auth.login"))?;
        self.session.set_tokens(&tokens);
        Ok(tokens)
    }

    pub async fn register(&self, request: &RegisterRequest) -> ApiResult<TokenPair> {
        let tokens = self
            .call(request)
            .await
            .map_err(|e| e.in_op("auth.register"))?;
        self.session.set_tokens(&tokens);
        Ok(tokens)
    }

    /// 拉取当前用户并写入会话
    pub async fn profile(&self) -> ApiResult<User> {
        let user = self
            .call(&ProfileRequest)
            .await
            .map_err(|e| e.in_op("auth.profile"))?;
        self.session.set_user(Some(user.clone()));
        Ok(user)
    }

    pub fn logout(&self) {
        log_info!("[Auth] logout");
        self.session.clear();
    }

    // =========================================================
    // Patients
    // =========================================================

    pub async fn list_patients(&self) -> ApiResult<Vec<Patient>> {
        self.call(&ListPatients)
            .await
            .map_err(|e| e.in_op("patients.list"))
    }

    pub async fn create_patient(&self, data: NewPatient) -> ApiResult<Patient> {
        self.call(&CreatePatient(data))
            .await
            .map_err(|e| e.in_op("patients.create"))
    }

    pub async fn get_patient(&self, id: PatientId) -> ApiResult<Patient> {
        self.call(&GetPatient { id })
            .await
            .map_err(|e| e.in_op_with("patients.get", id.to_string()))
    }

    pub async fn update_patient(&self, id: PatientId, patch: PatientPatch) -> ApiResult<Patient> {
        self.call(&UpdatePatient { id, patch })
            .await
            .map_err(|e| e.in_op_with("patients.update", id.to_string()))
    }

    pub async fn delete_patient(&self, id: PatientId) -> ApiResult<()> {
        self.call(&DeletePatient { id })
            .await
            .map_err(|e| e.in_op_with("patients.delete", id.to_string()))
    }

    // =========================================================
    // Measurements & Predictions
    // =========================================================

    pub async fn list_measurements(&self, patient: PatientId) -> ApiResult<Vec<Measurement>> {
        self.call(&ListMeasurements { patient })
            .await
            .map_err(|e| e.in_op_with("measurements.list", format!("patient={}", patient)))
    }

    pub async fn create_measurement(
        &self,
        patient: PatientId,
        data: NewMeasurement,
    ) -> ApiResult<Measurement> {
        self.call(&CreateMeasurement { patient, data })
            .await
            .map_err(|e| e.in_op_with("measurements.create", format!("patient={}", patient)))
    }

    /// 校验表单并提交测量
    ///
    /// 未指定 `patient` 时从表单的病人选择读取。返回的错误可直接显示在表单上；
    /// 校验失败时不发请求。
    pub async fn submit_measurement(
        &self,
        patient: Option<PatientId>,
        draft: &MeasurementDraft,
    ) -> Result<Measurement, String> {
        let target = match patient {
            Some(id) => id,
            None => draft.patient_id().map_err(|e| e.to_string())?,
        };
        let data = draft.to_new_measurement().map_err(|e| e.to_string())?;
        self.create_measurement(target, data)
            .await
            .map_err(|e| e.user_message("Failed to save measurement"))
    }

    pub async fn get_measurement(&self, id: MeasurementId) -> ApiResult<Measurement> {
        self.call(&GetMeasurement { id })
            .await
            .map_err(|e| e.in_op_with("measurements.get", id.to_string()))
    }

    pub async fn delete_measurement(&self, id: MeasurementId) -> ApiResult<()> {
        self.call(&DeleteMeasurement { id })
            .await
            .map_err(|e| e.in_op_with("measurements.delete", id.to_string()))
    }

    pub async fn prediction(&self, measurement: MeasurementId) -> ApiResult<Prediction> {
        self.call(&GetPrediction { measurement })
            .await
            .map_err(|e| e.in_op_with("predictions.get", measurement.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiErrorKind;
    use crate::session::MemorySession;
    use crate::format::format_vital;
    use crate::store::{MeasurementCollection, PatientCollection};
    use crate::transport::MockTransport;
    use serde_json::json;

    const BASE: &str = "http://api.test/api";

    fn client(session: MemorySession) -> ApiClient<MockTransport, MemorySession> {
        ApiClient::new(ClientConfig::new(BASE), MockTransport::new(), session)
    }

    fn url(path: &str) -> String {
        format!("{}{}", BASE, path)
    }

    fn patient_json(id: u64, name: &str) -> Value {
        json!({ "id": id, "full_name": name, "dob": null, "created_at": "2024-03-01T10:00:00Z" })
    }

    #[tokio::test]
    async fn test_bearer_header_attached() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_response(
            HttpMethod::Get,
            &url("/health/patients/"),
            200,
            json!([patient_json(1, "Ada")]),
        );

        let patients = api.list_patients().await.unwrap();
        assert_eq!(patients.len(), 1);

        let requests = api.transport().requests.borrow();
        assert_eq!(
            requests[0].headers.get(HEADER_AUTHORIZATION).map(String::as_str),
            Some("Bearer a1")
        );
        assert_eq!(
            requests[0].headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[tokio::test]
    async fn test_refresh_then_retry_succeeds() {
        let api = client(MemorySession::with_tokens("stale", "r1"));
        let patients_url = url("/health/patients/");
        api.transport().mock_raw(HttpMethod::Get, &patients_url, 401, "");
        api.transport().mock_response(HttpMethod::Get, &patients_url, 200, json!([]));
        api.transport().mock_response(
            HttpMethod::Post,
            &url("/auth/token/refresh/"),
            200,
            json!({ "access": "fresh", "refresh": "r2" }),
        );

        let patients = api.list_patients().await.unwrap();
        assert!(patients.is_empty());
        assert_eq!(api.session().access_token().as_deref(), Some("fresh"));
        assert_eq!(api.session().refresh_token().as_deref(), Some("r2"));

        let requests = api.transport().requests.borrow();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[1].body.as_deref(), Some(r#"{"refresh":"r1"}"#));
        assert_eq!(
            requests[2].headers.get(HEADER_AUTHORIZATION).map(String::as_str),
            Some("Bearer fresh")
        );
    }

    #[tokio::test]
    async fn test_second_401_clears_session_without_more_retries() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        let patients_url = url("/health/patients/");
        let refresh_url = url("/auth/token/refresh/");
        api.transport().mock_raw(HttpMethod::Get, &patients_url, 401, "");
        api.transport().mock_raw(HttpMethod::Get, &patients_url, 401, "");
        api.transport()
            .mock_response(HttpMethod::Post, &refresh_url, 200, json!({ "access": "a2" }));

        let err = api.list_patients().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::AuthExpired);
        assert_eq!(api.transport().count(HttpMethod::Get, &patients_url), 2);
        assert_eq!(api.transport().count(HttpMethod::Post, &refresh_url), 1);
        assert!(!api.session().is_authenticated());
        assert_eq!(api.session().refresh_token(), None);
    }

    #[tokio::test]
    async fn test_refresh_failure_clears_session() {
        let api = client(MemorySession::with_tokens("a1", "expired"));
        let patients_url = url("/health/patients/");
        api.transport().mock_raw(HttpMethod::Get, &patients_url, 401, "");
        api.transport().mock_response(
            HttpMethod::Post,
            &url("/auth/token/refresh/"),
            401,
            json!({ "detail": "Token is invalid or expired" }),
        );

        let err = api.list_patients().await.unwrap_err();
        assert!(err.is_auth_expired());
        assert_eq!(api.transport().count(HttpMethod::Get, &patients_url), 1);
        assert!(!api.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_missing_refresh_token_fails_without_exchange() {
        let session = MemorySession::new();
        session.set_access_token("a1");
        let api = client(session);
        api.transport()
            .mock_raw(HttpMethod::Get, &url("/auth/me/"), 401, "");

        let err = api.profile().await.unwrap_err();
        assert!(err.is_auth_expired());
        assert_eq!(api.transport().requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_login_persists_tokens() {
        let api = client(MemorySession::new());
        api.transport().mock_response(
            HttpMethod::Post,
            &url("/auth/login/"),
            200,
            json!({ "access": "a1", "refresh": "r1" }),
        );

        api.login(&LoginRequest {
            username: "nurse".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();

        assert_eq!(api.session().access_token().as_deref(), Some("a1"));
        assert_eq!(api.session().refresh_token().as_deref(), Some("r1"));
        let requests = api.transport().requests.borrow();
        assert!(!requests[0].headers.contains_key(HEADER_AUTHORIZATION));
    }

    #[tokio::test]
    async fn test_login_401_is_plain_http_error() {
        let api = client(MemorySession::with_tokens("old", "r1"));
        api.transport().mock_response(
            HttpMethod::Post,
            &url("/auth/login/"),
            401,
            json!({ "detail": "No active account found with the given credentials" }),
        );

        let err = api
            .login(&LoginRequest {
                username: "nurse".into(),
                password: "wrong".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind, ApiErrorKind::Http);
        assert_eq!(err.status, Some(401));
        assert_eq!(
            err.user_message("Login failed"),
            "No active account found with the given credentials"
        );
        // 没有触发刷新，原会话不受影响
        assert_eq!(api.transport().requests.borrow().len(), 1);
        assert!(api.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_profile_sets_session_user() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_response(
            HttpMethod::Get,
            &url("/auth/me/"),
            200,
            json!({ "id": 2, "username": "nurse", "email": "nurse@clinic.org" }),
        );

        let user = api.profile().await.unwrap();
        assert_eq!(api.session().user(), Some(user));
    }

    #[tokio::test]
    async fn test_delete_with_empty_body() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport()
            .mock_raw(HttpMethod::Delete, &url("/health/patients/5/"), 204, "");

        api.delete_patient(5).await.unwrap();
    }

    #[tokio::test]
    async fn test_error_detail_and_trace() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_response(
            HttpMethod::Get,
            &url("/health/patients/9/"),
            404,
            json!({ "detail": "Not found." }),
        );

        let err = api.get_patient(9).await.unwrap_err();
        assert_eq!(err.user_message("Failed to load patient"), "Not found.");
        assert_eq!(err.spans()[0].operation, "patients.get");
    }

    fn measurement_json(id: u64, patient: u64, ts: &str) -> Value {
        json!({
            "id": id,
            "patient": patient,
            "heart_rate": 75.0, "spo2": 98.0, "systolic": 120.0, "diastolic": 80.0,
            "respiratory_rate": null, "temperature": null, "notes": null,
            "timestamp": ts,
            "prediction": { "risk_score": 0.12, "risk_label": "low", "reason": "Vitals within normal range" }
        })
    }

    fn vitals_draft() -> MeasurementDraft {
        MeasurementDraft {
            heart_rate: "75".into(),
            spo2: "98".into(),
            systolic: "120".into(),
            diastolic: "80".into(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_created_patients_match_reloaded_list() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        let patients_url = url("/health/patients/");
        api.transport()
            .mock_response(HttpMethod::Post, &patients_url, 201, patient_json(1, "Ada"));
        api.transport()
            .mock_response(HttpMethod::Post, &patients_url, 201, patient_json(2, "Grace"));
        api.transport().mock_response(
            HttpMethod::Get,
            &patients_url,
            200,
            json!([patient_json(2, "Grace"), patient_json(1, "Ada")]),
        );

        let mut store = PatientCollection::default();
        for name in ["Ada", "Grace"] {
            let created = api
                .create_patient(NewPatient {
                    full_name: name.into(),
                    dob: None,
                })
                .await
                .unwrap();
            store.insert_front(created);
        }
        let names: Vec<_> = store.items.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(names, ["Grace", "Ada"]);

        let reloaded = api.list_patients().await.unwrap();
        let optimistic = store.items.clone();
        store.replace_all(reloaded);
        assert_eq!(store.items, optimistic);

        let requests = api.transport().requests.borrow();
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"dob":null,"full_name":"Ada"}"#));
    }

    #[tokio::test]
    async fn test_create_measurement_omits_absent_optionals() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_response(
            HttpMethod::Post,
            &url("/health/patients/1/measurements/"),
            201,
            measurement_json(9, 1, "2024-03-02T08:30:00Z"),
        );

        let data = vitals_draft().to_new_measurement().unwrap();
        let created = api.create_measurement(1, data).await.unwrap();

        let mut store = MeasurementCollection::default();
        store.insert_front(created);
        let first = &store.items[0];
        assert_eq!(first.id, 9);
        assert_eq!(format_vital(first.respiratory_rate), "-");
        assert_eq!(format_vital(first.temperature), "-");
        assert_eq!(first.risk_label(), Some(crate::RiskLabel::Low));

        let requests = api.transport().requests.borrow();
        assert_eq!(
            requests[0].body.as_deref(),
            Some(r#"{"diastolic":80.0,"heart_rate":75.0,"spo2":98.0,"systolic":120.0}"#)
        );
    }

    #[tokio::test]
    async fn test_submit_measurement_reports_server_rejection() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_response(
            HttpMethod::Post,
            &url("/health/patients/3/measurements/"),
            400,
            json!({ "spo2": ["Ensure this value is less than or equal to 100."] }),
        );

        let draft = vitals_draft();
        let err = api.submit_measurement(Some(3), &draft).await.unwrap_err();
        assert_eq!(err, "spo2: Ensure this value is less than or equal to 100.");
        // 表单内容保留，可直接修改后重试
        assert_eq!(draft, vitals_draft());
    }

    #[tokio::test]
    async fn test_submit_measurement_validates_before_sending() {
        let api = client(MemorySession::with_tokens("a1", "r1"));

        let err = api.submit_measurement(None, &vitals_draft()).await.unwrap_err();
        assert_eq!(err, "Please select a patient");

        let mut draft = vitals_draft();
        draft.heart_rate = "fast".into();
        let err = api.submit_measurement(Some(1), &draft).await.unwrap_err();
        assert_eq!(err, "Heart rate must be a number");

        assert!(api.transport().requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_submit_measurement_uses_selected_patient() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_response(
            HttpMethod::Post,
            &url("/health/patients/4/measurements/"),
            201,
            measurement_json(11, 4, "2024-03-02T09:00:00Z"),
        );

        let mut draft = vitals_draft();
        draft.patient = "4".into();
        let saved = api.submit_measurement(None, &draft).await.unwrap();
        assert_eq!(saved.patient, 4);
    }

    #[tokio::test]
    async fn test_update_patient_sends_only_changed_fields() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_response(
            HttpMethod::Patch,
            &url("/health/patients/1/"),
            200,
            patient_json(1, "Ada Lovelace"),
        );

        let mut store = PatientCollection::default();
        store.replace_all(vec![serde_json::from_value(patient_json(1, "Ada")).unwrap()]);
        let current = store.get(1).cloned();
        store.set_current(current);

        let patch = PatientPatch {
            full_name: Some("Ada Lovelace".into()),
            dob: None,
        };
        let updated = api.update_patient(1, patch.clone()).await.unwrap();
        store.update(1, &patch);

        assert_eq!(store.get(1), Some(&updated));
        assert_eq!(store.current.as_ref(), Some(&updated));
        let requests = api.transport().requests.borrow();
        assert_eq!(requests[0].body.as_deref(), Some(r#"{"full_name":"Ada Lovelace"}"#));
    }

    #[tokio::test]
    async fn test_get_measurement_and_prediction() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_response(
            HttpMethod::Get,
            &url("/health/measurements/9/"),
            200,
            measurement_json(9, 1, "2024-03-02T08:30:00Z"),
        );
        api.transport().mock_response(
            HttpMethod::Get,
            &url("/health/measurements/9/prediction/"),
            200,
            json!({ "id": 3, "risk_score": 0.81, "risk_label": "high", "reason": "Low SpO2" }),
        );

        let measurement = api.get_measurement(9).await.unwrap();
        assert_eq!(measurement.patient, 1);

        let prediction = api.prediction(9).await.unwrap();
        assert_eq!(prediction.risk_label, crate::RiskLabel::High);
        assert_eq!(prediction.reason.as_deref(), Some("Low SpO2"));
        assert_eq!(api.transport().requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_network_error_surfaces() {
        let api = client(MemorySession::with_tokens("a1", "r1"));
        api.transport().mock_network_error(
            HttpMethod::Get,
            &url("/health/patients/"),
            "connection refused",
        );

        let err = api.list_patients().await.unwrap_err();
        assert_eq!(err.kind, ApiErrorKind::Network);
        assert!(api.session().is_authenticated());
    }
}
