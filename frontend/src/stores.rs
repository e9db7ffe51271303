//! 全局集合状态
//!
//! 在 `App` 中创建一次，通过 Context 注入各页面。

use crate::api::HealthApi;
use leptos::prelude::*;
use vitalwatch_shared::error::ApiError;
use vitalwatch_shared::store::{MeasurementCollection, PatientCollection};

#[derive(Clone, Copy)]
pub struct StoreContext {
    pub patients: RwSignal<PatientCollection>,
    pub measurements: RwSignal<MeasurementCollection>,
}

impl StoreContext {
    pub fn new() -> Self {
        Self {
            patients: RwSignal::new(PatientCollection::default()),
            measurements: RwSignal::new(MeasurementCollection::default()),
        }
    }

    /// 注销时丢弃上一个用户的数据
    pub fn reset(&self) {
        self.patients.set(PatientCollection::default());
        self.measurements.set(MeasurementCollection::default());
    }
}

impl Default for StoreContext {
    fn default() -> Self {
        Self::new()
    }
}

pub fn use_stores() -> StoreContext {
    use_context::<StoreContext>().expect("StoreContext should be provided")
}

/// 先拉取病人列表，再并发拉取每个病人的测量
///
/// 返回部分失败时的提示信息。
pub async fn reload_all(api: &HealthApi, stores: StoreContext) -> Result<Option<String>, ApiError> {
    stores.patients.update(|s| {
        s.set_loading(true);
        s.set_error(None);
    });
    stores.measurements.update(|s| {
        s.set_loading(true);
        s.set_error(None);
    });

    let patients = match api.list_patients().await {
        Ok(patients) => patients,
        Err(e) => {
            let msg = e.user_message("Failed to load patients");
            stores.patients.update(|s| {
                s.set_loading(false);
                s.set_error(Some(msg));
            });
            stores.measurements.update(|s| s.set_loading(false));
            return Err(e);
        }
    };

    let fan_out = api.measurements_for(&patients).await;
    let warning = fan_out.partial_failure_message();

    stores.patients.update(|s| {
        s.replace_all(patients);
        s.set_loading(false);
    });
    stores.measurements.update(|s| {
        s.replace_all(fan_out.measurements);
        s.set_loading(false);
        s.set_error(warning.clone());
    });

    Ok(warning)
}
