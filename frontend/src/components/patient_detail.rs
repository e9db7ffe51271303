use crate::api::use_api;
use crate::components::icons::*;
use crate::components::measurement_card::MeasurementCard;
use crate::components::measurement_form::MeasurementDialog;
use crate::components::ui::{Alert, Loading, RiskBadge, VitalCard};
use crate::stores::use_stores;
use crate::web::confirm;
use crate::web::route::AppRoute;
use crate::web::router::{Link, use_router};
use leptos::prelude::*;
use leptos::task::spawn_local;
use vitalwatch_shared::date::{format_datetime, format_dob};
use vitalwatch_shared::format::{format_blood_pressure, format_risk_score, format_vital};
use vitalwatch_shared::store::sort_newest_first;
use vitalwatch_shared::{Measurement, MeasurementId, PatientId};

/// 最新一次测量的生命体征
#[component]
fn LatestVitals(measurement: Measurement) -> impl IntoView {
    view! {
        <div class="grid grid-cols-2 md:grid-cols-5 gap-3">
            <VitalCard label="Heart Rate" value=format_vital(Some(measurement.heart_rate)) unit="bpm" />
            <VitalCard label="SpO2" value=format_vital(Some(measurement.spo2)) unit="%" />
            <VitalCard
                label="Blood Pressure"
                value=format_blood_pressure(measurement.systolic, measurement.diastolic)
                unit="mmHg"
            />
            <VitalCard label="Resp. Rate" value=format_vital(measurement.respiratory_rate) unit="/min" />
            <VitalCard label="Temperature" value=format_vital(measurement.temperature) unit="°C" />
        </div>
    }
}

#[component]
fn RiskAssessment(measurement: Measurement) -> impl IntoView {
    let Some(prediction) = measurement.prediction else {
        return view! {
            <p class="text-base-content/50">"No prediction available for the latest measurement."</p>
        }
        .into_any();
    };

    view! {
        <div class="flex flex-wrap items-center gap-6">
            <div>
                <div class="text-xs uppercase text-base-content/60">"Risk Score"</div>
                <div class="text-3xl font-bold">{format_risk_score(prediction.risk_score)}</div>
            </div>
            <RiskBadge label=Some(prediction.risk_label) />
            {prediction.reason.map(|r| view! { <p class="text-sm text-base-content/70 flex-1">{r}</p> })}
        </div>
    }
    .into_any()
}

#[component]
pub fn PatientDetailPage(id: PatientId) -> impl IntoView {
    let api = use_api();
    let stores = use_stores();
    let router = use_router();

    let error = RwSignal::new(Option::<String>::None);
    let not_found = RwSignal::new(Option::<String>::None);
    let loading = RwSignal::new(true);

    // 病人和测量并发请求
    {
        let api = api.get_value();
        stores.patients.update(|s| s.set_current(None));
        spawn_local(async move {
            let (patient, measurements) =
                futures::join!(api.get_patient(id), api.list_measurements(id));

            match patient {
                Ok(patient) => stores.patients.update(|s| s.set_current(Some(patient))),
                Err(e) => not_found.set(Some(e.user_message("Patient not found"))),
            }
            match measurements {
                Ok(mut list) => {
                    sort_newest_first(&mut list);
                    // 测量集合此后只含本病人的数据，其他页面挂载时会重新加载
                    stores.measurements.update(|s| s.replace_all(list));
                }
                Err(e) => error.set(Some(e.user_message("Failed to load measurements"))),
            }
            loading.set(false);
        });
    }

    let handle_saved = move |m: Measurement| stores.measurements.update(|s| s.insert_front(m));

    let handle_delete_measurement = move |measurement_id: MeasurementId| {
        if !confirm("Delete this measurement?") {
            return;
        }
        let api = api.get_value();
        spawn_local(async move {
            match api.delete_measurement(measurement_id).await {
                Ok(()) => stores.measurements.update(|s| s.remove_by_id(measurement_id)),
                Err(e) => error.set(Some(e.user_message("Failed to delete measurement"))),
            }
        });
    };

    let handle_delete_patient = move |_| {
        if !confirm("Delete this patient and all of their measurements?") {
            return;
        }
        let api = api.get_value();
        spawn_local(async move {
            match api.delete_patient(id).await {
                Ok(()) => {
                    stores.patients.update(|s| s.remove_by_id(id));
                    stores.measurements.update(|s| s.remove_for_patient(id));
                    router.navigate_to_route(AppRoute::Patients);
                }
                Err(e) => error.set(Some(e.user_message("Failed to delete patient"))),
            }
        });
    };

    let patient = move || stores.patients.with(|s| s.current.clone());
    let history = move || {
        stores
            .measurements
            .with(|s| s.items.iter().filter(|m| m.patient == id).cloned().collect::<Vec<_>>())
    };
    let latest = move || history().into_iter().next();

    view! {
        <Link route=AppRoute::Patients class="btn btn-ghost btn-sm gap-2 w-fit">
            <ArrowLeft attr:class="h-4 w-4" /> "Back to Patients"
        </Link>

        <Show when=move || !loading.get() fallback=|| view! { <Loading label="Loading patient..." /> }>
            {move || match (patient(), not_found.get()) {
                (Some(p), _) => view! {
                    <div class="space-y-6">
                        <div class="flex flex-wrap items-center justify-between gap-4">
                            <div>
                                <h1 class="text-2xl font-bold">{p.full_name.clone()}</h1>
                                <p class="text-sm text-base-content/70">
                                    "Date of birth: " {format_dob(p.dob.as_ref())}
                                    " · Registered " {format_datetime(&p.created_at)}
                                </p>
                            </div>
                            <div class="flex gap-2">
                                <MeasurementDialog patient=id on_saved=handle_saved />
                                <button class="btn btn-outline btn-error gap-2" on:click=handle_delete_patient>
                                    <Trash2 attr:class="h-4 w-4" /> "Delete Patient"
                                </button>
                            </div>
                        </div>

                        <Alert message=error />

                        {move || match latest() {
                            Some(m) => view! {
                                <div class="card bg-base-100 shadow-xl">
                                    <div class="card-body">
                                        <h3 class="card-title">"Latest Vitals"</h3>
                                        <LatestVitals measurement=m.clone() />
                                    </div>
                                </div>
                                <div class="card bg-base-100 shadow-xl">
                                    <div class="card-body">
                                        <h3 class="card-title">"Risk Assessment"</h3>
                                        <RiskAssessment measurement=m />
                                    </div>
                                </div>
                            }.into_any(),
                            None => view! {
                                <div class="card bg-base-100 shadow">
                                    <div class="card-body text-center text-base-content/50">
                                        "No measurements recorded for this patient yet."
                                    </div>
                                </div>
                            }.into_any(),
                        }}

                        <div>
                            <h3 class="text-lg font-semibold mb-3">"Measurement History"</h3>
                            <div class="grid gap-4 md:grid-cols-2">
                                <For
                                    each=history
                                    key=|m| m.id
                                    children=move |m| view! {
                                        <MeasurementCard measurement=m on_delete=Callback::new(handle_delete_measurement) />
                                    }
                                />
                            </div>
                        </div>
                    </div>
                }.into_any(),
                (None, message) => view! {
                    <div class="card bg-base-100 shadow-xl">
                        <div class="card-body items-center text-center">
                            <AlertTriangle attr:class="h-10 w-10 text-error" />
                            <h2 class="card-title">{message.unwrap_or_else(|| "Patient not found".to_string())}</h2>
                            <Link route=AppRoute::Patients class="btn btn-primary mt-4">"Back to list"</Link>
                        </div>
                    </div>
                }.into_any(),
            }}
        </Show>
    }
}
