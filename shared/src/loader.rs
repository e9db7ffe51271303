//! 多病人测量数据的并发加载

use crate::client::ApiClient;
use crate::session::SessionStore;
use crate::store::sort_newest_first;
use crate::transport::HttpTransport;
use crate::{Measurement, Patient, PatientId};

/// 并发加载的汇总结果
///
/// 单个病人失败不会中止整体加载，失败的病人 id 记录在 `failed` 中。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementFanOut {
    /// 所有成功结果，按时间倒序
    pub measurements: Vec<Measurement>,
    pub failed: Vec<PatientId>,
}

impl MeasurementFanOut {
    pub fn is_partial(&self) -> bool {
        !self.failed.is_empty()
    }

    pub fn partial_failure_message(&self) -> Option<String> {
        if self.failed.is_empty() {
            return None;
        }
        Some(format!(
            "Measurements for {} patient(s) could not be loaded.",
            self.failed.len()
        ))
    }
}

impl<T: HttpTransport, S: SessionStore> ApiClient<T, S> {
    /// 为每个病人并发请求测量列表
    pub async fn measurements_for(&self, patients: &[Patient]) -> MeasurementFanOut {
        let tasks = patients.iter().map(|patient| async move {
            (patient.id, self.list_measurements(patient.id).await)
        });

        let results = futures::future::join_all(tasks).await;

        let mut fan_out = MeasurementFanOut::default();
        for (patient_id, result) in results {
            match result {
                Ok(items) => fan_out.measurements.extend(items),
                Err(e) => {
                    log_warn!("[Loader] measurements for patient {} failed: {}", patient_id, e);
                    fan_out.failed.push(patient_id);
                }
            }
        }

        sort_newest_first(&mut fan_out.measurements);
        fan_out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::protocol::HttpMethod;
    use crate::session::MemorySession;
    use crate::store::{RiskFilter, RiskStats};
    use crate::transport::MockTransport;
    use crate::RiskLabel;
    use serde_json::{Value, json};

    const BASE: &str = "http://api.test/api";

    fn patient(id: u64) -> Patient {
        serde_json::from_value(json!({
            "id": id,
            "full_name": format!("Patient {}", id),
            "dob": null,
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn measurement(id: u64, patient: u64, ts: &str, label: Option<&str>) -> Value {
        let prediction = label.map(|l| json!({ "risk_score": 0.5, "risk_label": l }));
        json!({
            "id": id,
            "patient": patient,
            "heart_rate": 80, "spo2": 97, "systolic": 120, "diastolic": 80,
            "timestamp": ts,
            "prediction": prediction
        })
    }

    fn measurements_url(patient: u64) -> String {
        format!("{}/health/patients/{}/measurements/", BASE, patient)
    }

    fn client() -> ApiClient<MockTransport, MemorySession> {
        ApiClient::new(
            ClientConfig::new(BASE),
            MockTransport::new(),
            MemorySession::with_tokens("a1", "r1"),
        )
    }

    #[tokio::test]
    async fn test_partial_failure_keeps_successes() {
        let api = client();
        api.transport().mock_response(
            HttpMethod::Get,
            &measurements_url(1),
            200,
            json!([measurement(10, 1, "2024-05-01T08:00:00Z", Some("low"))]),
        );
        api.transport()
            .mock_raw(HttpMethod::Get, &measurements_url(2), 500, "");
        api.transport().mock_response(
            HttpMethod::Get,
            &measurements_url(3),
            200,
            json!([measurement(30, 3, "2024-05-02T08:00:00Z", Some("high"))]),
        );

        let fan_out = api
            .measurements_for(&[patient(1), patient(2), patient(3)])
            .await;

        assert_eq!(fan_out.failed, vec![2]);
        let ids: Vec<u64> = fan_out.measurements.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![30, 10]);
        assert_eq!(
            fan_out.partial_failure_message().as_deref(),
            Some("Measurements for 1 patient(s) could not be loaded.")
        );
    }

    #[tokio::test]
    async fn test_dashboard_counts() {
        let api = client();
        api.transport().mock_response(
            HttpMethod::Get,
            &measurements_url(1),
            200,
            json!([
                measurement(1, 1, "2024-05-01T08:00:00Z", Some("high")),
                measurement(2, 1, "2024-05-01T09:00:00Z", Some("low")),
                measurement(3, 1, "2024-05-01T10:00:00Z", None),
            ]),
        );
        api.transport().mock_response(
            HttpMethod::Get,
            &measurements_url(2),
            200,
            json!([
                measurement(4, 2, "2024-05-02T08:00:00Z", Some("medium")),
                measurement(5, 2, "2024-05-02T09:00:00Z", Some("high")),
            ]),
        );
        api.transport().mock_response(
            HttpMethod::Get,
            &measurements_url(3),
            200,
            json!([
                measurement(6, 3, "2024-05-03T08:00:00Z", Some("low")),
                measurement(7, 3, "2024-05-03T09:00:00Z", Some("invalid")),
            ]),
        );

        let patients = vec![patient(1), patient(2), patient(3)];
        let fan_out = api.measurements_for(&patients).await;

        assert!(!fan_out.is_partial());
        assert_eq!(fan_out.measurements.len(), 7);
        assert_eq!(fan_out.measurements[0].id, 7);

        let stats = RiskStats::from_measurements(&fan_out.measurements);
        assert_eq!(stats.high, 2);
        assert_eq!(RiskFilter::High.apply(&fan_out.measurements).len(), 2);
        assert_eq!(
            fan_out.measurements[0].risk_label(),
            Some(RiskLabel::Unrecognized)
        );
    }

    #[tokio::test]
    async fn test_no_patients_issues_no_requests() {
        let api = client();
        let fan_out = api.measurements_for(&[]).await;
        assert_eq!(fan_out, MeasurementFanOut::default());
        assert!(api.transport().requests.borrow().is_empty());
    }
}
