//! 测量表单状态
//!
//! 把各输入框的 signal 收拢成 `FormState`，负责持有、重置、转换为 [`MeasurementDraft`]。

use leptos::prelude::*;
use vitalwatch_shared::forms::MeasurementDraft;

/// 使用 `RwSignal` 因为它实现了 `Copy`，适合作为 Props 在组件间传递。
#[derive(Clone, Copy)]
pub struct FormState {
    pub patient: RwSignal<String>,
    pub heart_rate: RwSignal<String>,
    pub spo2: RwSignal<String>,
    pub systolic: RwSignal<String>,
    pub diastolic: RwSignal<String>,
    pub respiratory_rate: RwSignal<String>,
    pub temperature: RwSignal<String>,
    pub notes: RwSignal<String>,
}

impl FormState {
    pub fn new() -> Self {
        Self {
            patient: RwSignal::new(String::new()),
            heart_rate: RwSignal::new(String::new()),
            spo2: RwSignal::new(String::new()),
            systolic: RwSignal::new(String::new()),
            diastolic: RwSignal::new(String::new()),
            respiratory_rate: RwSignal::new(String::new()),
            temperature: RwSignal::new(String::new()),
            notes: RwSignal::new(String::new()),
        }
    }

    /// 清空生命体征；已选病人保留
    pub fn reset(&self) {
        for field in [
            self.heart_rate,
            self.spo2,
            self.systolic,
            self.diastolic,
            self.respiratory_rate,
            self.temperature,
            self.notes,
        ] {
            field.set(String::new());
        }
    }

    pub fn to_draft(&self) -> MeasurementDraft {
        MeasurementDraft {
            patient: self.patient.get(),
            heart_rate: self.heart_rate.get(),
            spo2: self.spo2.get(),
            systolic: self.systolic.get(),
            diastolic: self.diastolic.get(),
            respiratory_rate: self.respiratory_rate.get(),
            temperature: self.temperature.get(),
            notes: self.notes.get(),
        }
    }
}

impl Default for FormState {
    fn default() -> Self {
        Self::new()
    }
}
