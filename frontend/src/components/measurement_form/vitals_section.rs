//! 生命体征输入区
//!
//! 只负责渲染；解析在提交时统一进行。

use leptos::prelude::*;

use super::form_state::FormState;

#[component]
fn VitalInput(
    id: &'static str,
    label: &'static str,
    placeholder: &'static str,
    value: RwSignal<String>,
    #[prop(optional)] required: bool,
) -> impl IntoView {
    view! {
        <div class="form-control">
            <label for=id class="label">
                <span class="label-text">{label}</span>
                {(!required).then(|| view! { <span class="label-text-alt text-base-content/50">"optional"</span> })}
            </label>
            <input
                id=id
                type="number"
                step="any"
                placeholder=placeholder
                required=required
                on:input=move |ev| value.set(event_target_value(&ev))
                prop:value=move || value.get()
                class="input input-bordered w-full"
            />
        </div>
    }
}

#[component]
pub fn VitalsSection(state: FormState) -> impl IntoView {
    view! {
        <div class="grid grid-cols-2 gap-4">
            <VitalInput id="heart_rate" label="Heart Rate (bpm)" placeholder="75" value=state.heart_rate required=true />
            <VitalInput id="spo2" label="SpO2 (%)" placeholder="98" value=state.spo2 required=true />
            <VitalInput id="systolic" label="Systolic (mmHg)" placeholder="120" value=state.systolic required=true />
            <VitalInput id="diastolic" label="Diastolic (mmHg)" placeholder="80" value=state.diastolic required=true />
            <VitalInput id="respiratory_rate" label="Respiratory Rate" placeholder="16" value=state.respiratory_rate />
            <VitalInput id="temperature" label="Temperature (°C)" placeholder="36.8" value=state.temperature />
        </div>

        <div class="form-control">
            <label for="notes" class="label">
                <span class="label-text">"Notes"</span>
                <span class="label-text-alt text-base-content/50">"optional"</span>
            </label>
            <textarea
                id="notes"
                class="textarea textarea-bordered w-full"
                rows="2"
                on:input=move |ev| state.notes.set(event_target_value(&ev))
                prop:value=move || state.notes.get()
            ></textarea>
        </div>
    }
}
