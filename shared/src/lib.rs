use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[macro_use]
pub mod log;

pub mod client;
pub mod config;
pub mod date;
pub mod error;
pub mod format;
pub mod forms;
pub mod loader;
pub mod protocol;
pub mod session;
pub mod store;
pub mod transport;

// =========================================================
// 常量定义 (Constants)
// =========================================================

pub const ACCESS_TOKEN_KEY: &str = "access_token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const HEADER_AUTHORIZATION: &str = "Authorization";

pub type PatientId = u64;
pub type MeasurementId = u64;

// =========================================================
// 认证模型 (Auth Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(default)]
    pub id: Option<u64>,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
}

impl User {
    /// 仅知道用户名时（例如注册后 profile 拉取失败）使用
    pub fn from_username(username: impl Into<String>) -> Self {
        Self {
            id: None,
            username: username.into(),
            email: None,
        }
    }

    /// 侧边栏显示的副标题
    pub fn subtitle(&self) -> &str {
        match self.email.as_deref() {
            Some(email) if !email.trim().is_empty() => email,
            _ => "Medical Professional",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// `/auth/token/refresh/` 的响应；启用 rotation 时后端会同时下发新的 refresh
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RefreshedToken {
    pub access: String,
    #[serde(default)]
    pub refresh: Option<String>,
}

// =========================================================
// 领域模型 (Domain Models)
// =========================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: PatientId,
    pub full_name: String,
    #[serde(default)]
    pub dob: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
}

impl Patient {
    /// 将部分更新合并到当前实体
    pub fn apply(&mut self, patch: &PatientPatch) {
        if let Some(name) = &patch.full_name {
            self.full_name = name.clone();
        }
        if let Some(dob) = patch.dob {
            self.dob = dob;
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub full_name: String,
    pub dob: Option<NaiveDate>,
}

/// PATCH 请求体：`None` 表示不修改该字段，`Some(None)` 表示清空出生日期
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatientPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dob: Option<Option<NaiveDate>>,
}

/// 风险等级
///
/// 后端模型失败时会写入 `"invalid"` 等非预期值，统一归入 `Unrecognized`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum RiskLabel {
    Low,
    Medium,
    High,
    Unrecognized,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLabel::Low => "low",
            RiskLabel::Medium => "medium",
            RiskLabel::High => "high",
            RiskLabel::Unrecognized => "unknown",
        }
    }
}

impl From<String> for RiskLabel {
    fn from(value: String) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "low" => RiskLabel::Low,
            "medium" => RiskLabel::Medium,
            "high" => RiskLabel::High,
            _ => RiskLabel::Unrecognized,
        }
    }
}

impl From<RiskLabel> for String {
    fn from(label: RiskLabel) -> Self {
        label.as_str().to_string()
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    #[serde(default)]
    pub id: Option<u64>,
    pub risk_score: f64,
    pub risk_label: RiskLabel,
    #[serde(default)]
    pub reason: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measurement {
    pub id: MeasurementId,
    pub patient: PatientId,
    pub heart_rate: f64,
    pub spo2: f64,
    pub systolic: f64,
    pub diastolic: f64,
    #[serde(default)]
    pub respiratory_rate: Option<f64>,
    #[serde(default)]
    pub temperature: Option<f64>,
    #[serde(default)]
    pub notes: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub prediction: Option<Prediction>,
}

impl Measurement {
    pub fn risk_label(&self) -> Option<RiskLabel> {
        self.prediction.as_ref().map(|p| p.risk_label)
    }

    /// 非空白的备注
    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref().filter(|n| !n.trim().is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewMeasurement {
    pub heart_rate: f64,
    pub spo2: f64,
    pub systolic: f64,
    pub diastolic: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub respiratory_rate: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_measurement_from_backend_json() {
        let m: Measurement = serde_json::from_value(json!({
            "id": 7,
            "patient": 3,
            "timestamp": "2024-05-01T08:30:00.123456Z",
            "heart_rate": 75.0,
            "spo2": 98.0,
            "systolic": 120,
            "diastolic": 80,
            "respiratory_rate": null,
            "temperature": null,
            "notes": "",
            "created_at": "2024-05-01T08:30:00.123456Z",
            "prediction": {
                "id": 1,
                "risk_score": 0.82,
                "risk_label": "high",
                "created_at": "2024-05-01T08:30:01Z",
                "measurement": 7
            }
        }))
        .unwrap();

        assert_eq!(m.patient, 3);
        assert_eq!(m.systolic, 120.0);
        assert_eq!(m.respiratory_rate, None);
        assert_eq!(m.notes(), None);
        assert_eq!(m.risk_label(), Some(RiskLabel::High));
    }

    #[test]
    fn test_unexpected_risk_label() {
        let p: Prediction =
            serde_json::from_value(json!({ "risk_score": 0.0, "risk_label": "invalid" })).unwrap();
        assert_eq!(p.risk_label, RiskLabel::Unrecognized);

        let p: Prediction =
            serde_json::from_value(json!({ "risk_score": 0.4, "risk_label": "Medium" })).unwrap();
        assert_eq!(p.risk_label, RiskLabel::Medium);
    }

    #[test]
    fn test_patient_apply_patch() {
        let mut patient: Patient = serde_json::from_value(json!({
            "id": 1,
            "full_name": "Ada Lovelace",
            "dob": "1815-12-10",
            "created_at": "2024-01-01T00:00:00Z",
            "user": 9
        }))
        .unwrap();

        patient.apply(&PatientPatch {
            full_name: Some("Ada King".into()),
            dob: None,
        });
        assert_eq!(patient.full_name, "Ada King");
        assert!(patient.dob.is_some());

        patient.apply(&PatientPatch {
            full_name: None,
            dob: Some(None),
        });
        assert_eq!(patient.full_name, "Ada King");
        assert_eq!(patient.dob, None);
    }

    #[test]
    fn test_new_measurement_omits_absent_fields() {
        let body = serde_json::to_value(NewMeasurement {
            heart_rate: 75.0,
            spo2: 98.0,
            systolic: 120.0,
            diastolic: 80.0,
            respiratory_rate: None,
            temperature: None,
            notes: None,
        })
        .unwrap();
        assert_eq!(
            body,
            json!({ "heart_rate": 75.0, "spo2": 98.0, "systolic": 120.0, "diastolic": 80.0 })
        );
    }

    #[test]
    fn test_user_subtitle() {
        assert_eq!(User::from_username("nurse").subtitle(), "Medical Professional");
        let user = User {
            id: Some(1),
            username: "nurse".into(),
            email: Some("nurse@clinic.org".into()),
        };
        assert_eq!(user.subtitle(), "nurse@clinic.org");
    }
}
