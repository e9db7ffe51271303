use crate::components::icons::Trash2;
use crate::components::ui::RiskBadge;
use leptos::prelude::*;
use vitalwatch_shared::date::format_datetime;
use vitalwatch_shared::format::{format_blood_pressure, format_risk_score, format_vital};
use vitalwatch_shared::{Measurement, MeasurementId};

/// 测量记录卡片；可选生命体征缺失时显示 `-`
#[component]
pub fn MeasurementCard(
    measurement: Measurement,
    #[prop(optional, into)] patient_name: Option<String>,
    #[prop(optional, into)] on_delete: Option<Callback<MeasurementId>>,
) -> impl IntoView {
    let id = measurement.id;
    let label = measurement.risk_label();
    let score = measurement
        .prediction
        .as_ref()
        .map(|p| format_risk_score(p.risk_score));
    let notes = measurement.notes().map(str::to_string);

    view! {
        <div class="card bg-base-100 shadow">
            <div class="card-body p-5 gap-3">
                <div class="flex items-start justify-between gap-2">
                    <div>
                        {patient_name.map(|name| view! { <div class="font-semibold">{name}</div> })}
                        <div class="text-xs text-base-content/60">
                            {format_datetime(&measurement.timestamp)}
                        </div>
                    </div>
                    <div class="flex items-center gap-2">
                        <RiskBadge label=label />
                        {score.map(|s| view! { <span class="text-xs text-base-content/60">{s}</span> })}
                    </div>
                </div>

                <div class="grid grid-cols-3 gap-2 text-sm">
                    <div>
                        <div class="text-base-content/60 text-xs">"Heart Rate"</div>
                        <div class="font-medium">{format_vital(Some(measurement.heart_rate))} " bpm"</div>
                    </div>
                    <div>
                        <div class="text-base-content/60 text-xs">"SpO2"</div>
                        <div class="font-medium">{format_vital(Some(measurement.spo2))} "%"</div>
                    </div>
                    <div>
                        <div class="text-base-content/60 text-xs">"Blood Pressure"</div>
                        <div class="font-medium">
                            {format_blood_pressure(measurement.systolic, measurement.diastolic)}
                        </div>
                    </div>
                    <div>
                        <div class="text-base-content/60 text-xs">"Resp. Rate"</div>
                        <div class="font-medium">{format_vital(measurement.respiratory_rate)}</div>
                    </div>
                    <div>
                        <div class="text-base-content/60 text-xs">"Temperature"</div>
                        <div class="font-medium">{format_vital(measurement.temperature)}</div>
                    </div>
                </div>

                {notes.map(|n| view! { <p class="text-sm italic text-base-content/70">{n}</p> })}

                {on_delete.map(|cb| view! {
                    <div class="card-actions justify-end">
                        <button
                            class="btn btn-ghost btn-xs text-error gap-1"
                            on:click=move |_| cb.run(id)
                        >
                            <Trash2 attr:class="h-3 w-3" /> "Delete"
                        </button>
                    </div>
                })}
            </div>
        </div>
    }
}
