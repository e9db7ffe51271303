use crate::api::use_api;
use crate::components::icons::*;
use crate::components::ui::{Alert, Loading, PageHeader, RiskBadge, StatCard};
use crate::stores::{reload_all, use_stores};
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use vitalwatch_shared::date::{format_datetime, format_dob};
use vitalwatch_shared::store::RiskFilter;

const RECENT_LIMIT: usize = 5;

#[component]
pub fn DashboardPage() -> impl IntoView {
    let api = use_api();
    let stores = use_stores();
    let router = use_router();

    let error = RwSignal::new(Option::<String>::None);
    let warning = RwSignal::new(Option::<String>::None);

    let load = move || {
        let api = api.get_value();
        spawn_local(async move {
            match reload_all(&api, stores).await {
                Ok(partial) => warning.set(partial),
                Err(e) => error.set(Some(e.user_message("Failed to load dashboard data"))),
            }
        });
    };
    load();

    let loading = move || stores.patients.with(|s| s.loading) || stores.measurements.with(|s| s.loading);
    let total_patients = Signal::derive(move || stores.patients.with(|s| s.len()));
    let total_measurements = Signal::derive(move || stores.measurements.with(|s| s.len()));
    let high_risk = Signal::derive(move || stores.measurements.with(|s| RiskFilter::High.count(&s.items)));

    let recent_patients = move || {
        stores
            .patients
            .with(|s| s.items.iter().take(RECENT_LIMIT).cloned().collect::<Vec<_>>())
    };
    let recent_measurements = move || {
        stores
            .measurements
            .with(|s| s.items.iter().take(RECENT_LIMIT).cloned().collect::<Vec<_>>())
    };
    let patient_name = move |id| {
        stores
            .patients
            .with(|s| s.get(id).map(|p| p.full_name.clone()))
            .unwrap_or_else(|| format!("Patient #{}", id))
    };

    view! {
        <PageHeader title="Dashboard" subtitle="Overview of your patients and their latest vitals">
            <button on:click=move |_| load() disabled=loading class="btn btn-ghost btn-circle">
                <RefreshCw attr:class=move || if loading() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
            </button>
        </PageHeader>

        <Alert message=error />
        <Alert message=warning warning=true />

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <StatCard title="Total Patients" value=total_patients>
                <Users attr:class="h-8 w-8 text-primary" />
            </StatCard>
            <StatCard title="Recent Measurements" value=total_measurements class="text-secondary">
                <HeartPulse attr:class="h-8 w-8 text-secondary" />
            </StatCard>
            <StatCard title="High Risk Cases" value=high_risk class="text-error">
                <AlertTriangle attr:class="h-8 w-8 text-error" />
            </StatCard>
        </div>

        <Show when=move || !loading() fallback=|| view! { <Loading /> }>
            <div class="grid gap-6 lg:grid-cols-2">
                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Recent Patients"</h3>
                        <Show
                            when=move || { total_patients.get() > 0 }
                            fallback=|| view! { <p class="text-base-content/50 py-4">"No patients yet."</p> }
                        >
                            <ul class="divide-y divide-base-200">
                                <For
                                    each=recent_patients
                                    key=|p| p.id
                                    children=move |patient| {
                                        let id = patient.id;
                                        view! {
                                            <li
                                                class="flex items-center justify-between py-3 cursor-pointer hover:bg-base-200 rounded px-2"
                                                on:click=move |_| router.navigate_to_route(AppRoute::PatientDetail(id))
                                            >
                                                <span class="font-medium">{patient.full_name.clone()}</span>
                                                <span class="text-sm text-base-content/60">
                                                    {format_dob(patient.dob.as_ref())}
                                                </span>
                                            </li>
                                        }
                                    }
                                />
                            </ul>
                        </Show>
                    </div>
                </div>

                <div class="card bg-base-100 shadow-xl">
                    <div class="card-body">
                        <h3 class="card-title">"Recent Measurements"</h3>
                        <Show
                            when=move || { total_measurements.get() > 0 }
                            fallback=|| view! { <p class="text-base-content/50 py-4">"No measurements recorded."</p> }
                        >
                            <ul class="divide-y divide-base-200">
                                <For
                                    each=recent_measurements
                                    key=|m| m.id
                                    children=move |m| {
                                        view! {
                                            <li class="flex items-center justify-between py-3 px-2">
                                                <div>
                                                    <div class="font-medium">{patient_name(m.patient)}</div>
                                                    <div class="text-xs text-base-content/60">
                                                        {format_datetime(&m.timestamp)}
                                                    </div>
                                                </div>
                                                <RiskBadge label=m.risk_label() />
                                            </li>
                                        }
                                    }
                                />
                            </ul>
                        </Show>
                    </div>
                </div>
            </div>
        </Show>
    }
}
