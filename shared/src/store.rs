//! 内存中的集合状态
//!
//! 这里只做纯数据操作，不发起请求。前端把它们放进 `RwSignal` 里共享。

use crate::{Measurement, MeasurementId, Patient, PatientId, PatientPatch, RiskLabel};

// =========================================================
// Patients
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatientCollection {
    pub items: Vec<Patient>,
    pub current: Option<Patient>,
    pub loading: bool,
    pub error: Option<String>,
}

impl PatientCollection {
    /// 用服务器返回的列表整体替换
    pub fn replace_all(&mut self, items: Vec<Patient>) {
        self.items = items;
    }

    pub fn insert_front(&mut self, patient: Patient) {
        self.items.insert(0, patient);
    }

    pub fn remove_by_id(&mut self, id: PatientId) {
        self.items.retain(|p| p.id != id);
        if self.current.as_ref().is_some_and(|p| p.id == id) {
            self.current = None;
        }
    }

    /// 部分更新，同时作用于列表和 `current`
    pub fn update(&mut self, id: PatientId, patch: &PatientPatch) {
        for patient in self.items.iter_mut().filter(|p| p.id == id) {
            patient.apply(patch);
        }
        if let Some(current) = self.current.as_mut().filter(|p| p.id == id) {
            current.apply(patch);
        }
    }

    pub fn set_current(&mut self, patient: Option<Patient>) {
        self.current = patient;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn get(&self, id: PatientId) -> Option<&Patient> {
        self.items.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

// =========================================================
// Measurements
// =========================================================

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeasurementCollection {
    pub items: Vec<Measurement>,
    pub current: Option<Measurement>,
    pub loading: bool,
    pub error: Option<String>,
}

impl MeasurementCollection {
    pub fn replace_all(&mut self, items: Vec<Measurement>) {
        self.items = items;
    }

    pub fn insert_front(&mut self, measurement: Measurement) {
        self.items.insert(0, measurement);
    }

    pub fn remove_by_id(&mut self, id: MeasurementId) {
        self.items.retain(|m| m.id != id);
        if self.current.as_ref().is_some_and(|m| m.id == id) {
            self.current = None;
        }
    }

    /// 删除病人后级联清理
    pub fn remove_for_patient(&mut self, patient: PatientId) {
        self.items.retain(|m| m.patient != patient);
        if self.current.as_ref().is_some_and(|m| m.patient == patient) {
            self.current = None;
        }
    }

    pub fn set_current(&mut self, measurement: Option<Measurement>) {
        self.current = measurement;
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// 按时间倒序，时间相同时保持原顺序
pub fn sort_newest_first(items: &mut [Measurement]) {
    items.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
}

// =========================================================
// Risk filtering
// =========================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RiskFilter {
    #[default]
    All,
    High,
    Medium,
    Low,
}

impl RiskFilter {
    pub fn all() -> [RiskFilter; 4] {
        [RiskFilter::All, RiskFilter::High, RiskFilter::Medium, RiskFilter::Low]
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskFilter::All => "All",
            RiskFilter::High => "High Risk",
            RiskFilter::Medium => "Medium Risk",
            RiskFilter::Low => "Low Risk",
        }
    }

    /// `All` 匹配一切；其余只匹配对应标签，没有预测或标签无法识别的不匹配
    pub fn matches(&self, measurement: &Measurement) -> bool {
        let label = measurement.risk_label();
        match self {
            RiskFilter::All => true,
            RiskFilter::High => label == Some(RiskLabel::High),
            RiskFilter::Medium => label == Some(RiskLabel::Medium),
            RiskFilter::Low => label == Some(RiskLabel::Low),
        }
    }

    pub fn apply(&self, items: &[Measurement]) -> Vec<Measurement> {
        items.iter().filter(|m| self.matches(m)).cloned().collect()
    }

    pub fn count(&self, items: &[Measurement]) -> usize {
        items.iter().filter(|m| self.matches(m)).count()
    }
}

/// 预测统计；`total` 只计有预测的测量
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RiskStats {
    pub total: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

impl RiskStats {
    pub fn from_measurements(items: &[Measurement]) -> Self {
        items
            .iter()
            .filter_map(Measurement::risk_label)
            .fold(Self::default(), |mut stats, label| {
                stats.total += 1;
                match label {
                    RiskLabel::High => stats.high += 1,
                    RiskLabel::Medium => stats.medium += 1,
                    RiskLabel::Low => stats.low += 1,
                    RiskLabel::Unrecognized => {}
                }
                stats
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patient(id: u64, name: &str) -> Patient {
        serde_json::from_value(json!({
            "id": id,
            "full_name": name,
            "dob": "1990-04-12",
            "created_at": "2024-01-01T00:00:00Z"
        }))
        .unwrap()
    }

    fn measurement(id: u64, patient: u64, ts: &str, label: Option<&str>) -> Measurement {
        let prediction = label.map(|l| json!({ "risk_score": 0.5, "risk_label": l }));
        serde_json::from_value(json!({
            "id": id,
            "patient": patient,
            "heart_rate": 72, "spo2": 99, "systolic": 118, "diastolic": 76,
            "timestamp": ts,
            "prediction": prediction
        }))
        .unwrap()
    }

    #[test]
    fn test_replace_all_is_idempotent() {
        let list = vec![patient(1, "Ada"), patient(2, "Grace")];
        let mut store = PatientCollection::default();
        store.replace_all(list.clone());
        let first = store.clone();
        store.replace_all(list.clone());
        assert_eq!(store, first);
        assert_eq!(store.items, list);
    }

    #[test]
    fn test_insert_front_and_get() {
        let mut store = PatientCollection::default();
        store.replace_all(vec![patient(1, "Ada")]);
        store.insert_front(patient(2, "Grace"));
        assert_eq!(store.items[0].id, 2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).map(|p| p.full_name.as_str()), Some("Ada"));
        assert!(store.get(3).is_none());
    }

    #[test]
    fn test_remove_clears_current() {
        let mut store = PatientCollection::default();
        store.replace_all(vec![patient(1, "Ada"), patient(2, "Grace")]);
        store.set_current(Some(patient(1, "Ada")));

        store.remove_by_id(2);
        assert!(store.current.is_some());

        store.remove_by_id(1);
        assert!(store.current.is_none());
        assert!(store.is_empty());
    }

    #[test]
    fn test_update_merges_list_and_current() {
        let mut store = PatientCollection::default();
        store.replace_all(vec![patient(1, "Ada"), patient(2, "Grace")]);
        store.set_current(Some(patient(1, "Ada")));

        store.update(
            1,
            &PatientPatch {
                full_name: Some("Ada King".into()),
                dob: None,
            },
        );

        assert_eq!(store.items[0].full_name, "Ada King");
        assert!(store.items[0].dob.is_some());
        assert_eq!(store.items[1].full_name, "Grace");
        assert_eq!(store.current.as_ref().map(|p| p.full_name.as_str()), Some("Ada King"));
    }

    #[test]
    fn test_cascade_remove_for_patient() {
        let mut store = MeasurementCollection::default();
        store.replace_all(vec![
            measurement(1, 1, "2024-05-01T08:00:00Z", None),
            measurement(2, 2, "2024-05-01T09:00:00Z", None),
            measurement(3, 1, "2024-05-01T10:00:00Z", None),
        ]);
        store.set_current(Some(measurement(3, 1, "2024-05-01T10:00:00Z", None)));

        store.remove_for_patient(1);
        assert_eq!(store.len(), 1);
        assert_eq!(store.items[0].patient, 2);
        assert!(store.current.is_none());
    }

    #[test]
    fn test_measurement_remove_by_id() {
        let mut store = MeasurementCollection::default();
        store.replace_all(vec![
            measurement(1, 1, "2024-05-01T08:00:00Z", None),
            measurement(2, 1, "2024-05-01T09:00:00Z", None),
        ]);
        store.set_current(Some(measurement(2, 1, "2024-05-01T09:00:00Z", None)));
        store.remove_by_id(2);
        assert_eq!(store.len(), 1);
        assert!(store.current.is_none());
    }

    #[test]
    fn test_risk_filter_preserves_order() {
        let items = vec![
            measurement(1, 1, "2024-05-03T08:00:00Z", Some("high")),
            measurement(2, 1, "2024-05-02T08:00:00Z", Some("low")),
            measurement(3, 2, "2024-05-01T08:00:00Z", Some("high")),
            measurement(4, 2, "2024-04-30T08:00:00Z", None),
            measurement(5, 2, "2024-04-29T08:00:00Z", Some("invalid")),
        ];

        let high: Vec<u64> = RiskFilter::High.apply(&items).iter().map(|m| m.id).collect();
        assert_eq!(high, vec![1, 3]);
        assert_eq!(RiskFilter::All.apply(&items).len(), items.len());
        assert_eq!(RiskFilter::Medium.count(&items), 0);
        assert_eq!(RiskFilter::Low.count(&items), 1);
    }

    #[test]
    fn test_risk_stats() {
        let items = vec![
            measurement(1, 1, "2024-05-03T08:00:00Z", Some("high")),
            measurement(2, 1, "2024-05-02T08:00:00Z", Some("medium")),
            measurement(3, 1, "2024-05-01T08:00:00Z", None),
            measurement(4, 1, "2024-04-30T08:00:00Z", Some("invalid")),
        ];
        let stats = RiskStats::from_measurements(&items);
        assert_eq!(
            stats,
            RiskStats {
                total: 3,
                high: 1,
                medium: 1,
                low: 0
            }
        );
    }

    #[test]
    fn test_sort_newest_first_is_stable() {
        let mut items = vec![
            measurement(1, 1, "2024-05-01T08:00:00Z", None),
            measurement(2, 1, "2024-05-03T08:00:00Z", None),
            measurement(3, 2, "2024-05-01T08:00:00Z", None),
        ];
        sort_newest_first(&mut items);
        let ids: Vec<u64> = items.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2, 1, 3]);
    }
}
