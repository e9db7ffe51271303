mod form_state;
mod vitals_section;

use crate::api::use_api;
use crate::components::icons::Plus;
use form_state::FormState;
use leptos::prelude::*;
use leptos::task::spawn_local;
use vitals_section::VitalsSection;
use vitalwatch_shared::{Measurement, Patient, PatientId};

/// 新增测量的对话框
///
/// 指定 `patient` 时直接提交到该病人，否则显示 `patients` 选择框。
/// 服务器保存成功后才关闭并清空表单；失败时保留输入并在对话框内显示错误。
#[component]
pub fn MeasurementDialog(
    #[prop(optional)] patient: Option<PatientId>,
    #[prop(optional, into)] patients: Option<Signal<Vec<Patient>>>,
    #[prop(into)] on_saved: Callback<Measurement>,
) -> impl IntoView {
    let api = use_api();
    let (open, set_open) = signal(false);
    let form_error = RwSignal::new(Option::<String>::None);
    let submitting = RwSignal::new(false);
    let dialog_ref = NodeRef::<leptos::html::Dialog>::new();
    let state = FormState::new();

    Effect::new(move |_| {
        if let Some(dialog) = dialog_ref.get() {
            let should_open = open.get();
            if should_open && !dialog.open() {
                let _ = dialog.show_modal();
            } else if !should_open && dialog.open() {
                dialog.close();
            }
        }
    });

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        if submitting.get_untracked() {
            return;
        }
        let draft = state.to_draft();

        submitting.set(true);
        form_error.set(None);
        let api = api.get_value();
        spawn_local(async move {
            match api.submit_measurement(patient, &draft).await {
                Ok(measurement) => {
                    on_saved.run(measurement);
                    set_open.set(false);
                    state.reset();
                }
                Err(msg) => form_error.set(Some(msg)),
            }
            submitting.set(false);
        });
    };

    let patient_selector = patients.map(|patients| {
        view! {
            <div class="form-control">
                <label for="patient" class="label">
                    <span class="label-text">"Patient"</span>
                </label>
                <select
                    id="patient"
                    class="select select-bordered w-full"
                    required
                    on:change=move |ev| state.patient.set(event_target_value(&ev))
                    prop:value=move || state.patient.get()
                >
                    <option value="" disabled selected=move || state.patient.with(String::is_empty)>
                        "Select a patient"
                    </option>
                    <For
                        each=move || patients.get()
                        key=|p| p.id
                        children=move |p| {
                            view! { <option value=p.id.to_string()>{p.full_name}</option> }
                        }
                    />
                </select>
            </div>
        }
    });

    view! {
        <button class="btn btn-primary gap-2" on:click=move |_| set_open.set(true)>
            <Plus attr:class="h-4 w-4" /> "Add Measurement"
        </button>

        <dialog class="modal" node_ref=dialog_ref on:close=move |_| set_open.set(false)>
            <div class="modal-box">
                <h3 class="font-bold text-lg">"Record Measurement"</h3>
                <p class="py-2 text-base-content/70 text-sm">
                    "A risk prediction is computed by the server after saving."
                </p>

                <form on:submit=on_submit class="space-y-4">
                    <Show when=move || form_error.with(Option::is_some)>
                        <div role="alert" class="alert alert-error text-sm py-2">
                            {move || form_error.get().unwrap_or_default()}
                        </div>
                    </Show>

                    {patient_selector}
                    <VitalsSection state=state />

                    <div class="modal-action">
                        <button type="button" class="btn btn-ghost" on:click=move |_| set_open.set(false)>
                            "Cancel"
                        </button>
                        <button type="submit" class="btn btn-primary" disabled=move || submitting.get()>
                            {move || if submitting.get() {
                                view! { <span class="loading loading-spinner loading-sm"></span> "Saving..." }.into_any()
                            } else {
                                "Save".into_any()
                            }}
                        </button>
                    </div>
                </form>
            </div>
            <form method="dialog" class="modal-backdrop">
                <button>"close"</button>
            </form>
        </dialog>
    }
}
