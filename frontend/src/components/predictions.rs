use crate::api::use_api;
use crate::components::icons::*;
use crate::components::measurements::RiskFilterBar;
use crate::components::ui::{Alert, Loading, PageHeader, RiskBadge, StatCard};
use crate::stores::{reload_all, use_stores};
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use vitalwatch_shared::Measurement;
use vitalwatch_shared::date::format_datetime;
use vitalwatch_shared::format::{format_blood_pressure, format_risk_score, format_vital};
use vitalwatch_shared::store::{RiskFilter, RiskStats};

#[component]
pub fn PredictionsPage() -> impl IntoView {
    let api = use_api();
    let stores = use_stores();
    let router = use_router();

    let error = RwSignal::new(Option::<String>::None);
    let warning = RwSignal::new(Option::<String>::None);
    let filter = RwSignal::new(RiskFilter::All);

    let load = move || {
        let api = api.get_value();
        spawn_local(async move {
            match reload_all(&api, stores).await {
                Ok(partial) => warning.set(partial),
                Err(e) => error.set(Some(e.user_message("Failed to load predictions"))),
            }
        });
    };
    load();

    // 只保留带预测的测量
    let predicted = Memo::new(move |_| {
        stores.measurements.with(|s| {
            s.items
                .iter()
                .filter(|m| m.prediction.is_some())
                .cloned()
                .collect::<Vec<Measurement>>()
        })
    });

    let stats = Memo::new(move |_| predicted.with(|items| RiskStats::from_measurements(items)));
    let counts = Signal::derive(move || predicted.with(|items| RiskFilter::all().map(|f| f.count(items))));
    let visible = move || predicted.with(|items| filter.get().apply(items));
    let loading = move || stores.measurements.with(|s| s.loading);
    let patient_name = move |id| {
        stores
            .patients
            .with(|s| s.get(id).map(|p| p.full_name.clone()))
            .unwrap_or_else(|| format!("Patient #{}", id))
    };

    view! {
        <PageHeader title="Predictions" subtitle="Risk assessments computed for recorded measurements">
            <button on:click=move |_| load() disabled=loading class="btn btn-ghost btn-circle">
                <RefreshCw attr:class=move || if loading() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
            </button>
        </PageHeader>

        <Alert message=error />
        <Alert message=warning warning=true />

        <div class="stats shadow w-full stats-vertical md:stats-horizontal bg-base-100">
            <StatCard title="Total Predictions" value=Signal::derive(move || stats.get().total)>
                <TrendingUp attr:class="h-8 w-8 text-primary" />
            </StatCard>
            <StatCard title="High Risk" value=Signal::derive(move || stats.get().high) class="text-error">
                <AlertTriangle attr:class="h-8 w-8 text-error" />
            </StatCard>
            <StatCard title="Medium Risk" value=Signal::derive(move || stats.get().medium) class="text-warning">
                <AlertTriangle attr:class="h-8 w-8 text-warning" />
            </StatCard>
            <StatCard title="Low Risk" value=Signal::derive(move || stats.get().low) class="text-success">
                <HeartPulse attr:class="h-8 w-8 text-success" />
            </StatCard>
        </div>

        <RiskFilterBar filter=filter counts=counts />

        <Show when=move || !loading() fallback=|| view! { <Loading label="Loading predictions..." /> }>
            <div class="card bg-base-100 shadow-xl">
                <div class="card-body p-0">
                    <div class="overflow-x-auto w-full">
                        <table class="table w-full">
                            <thead>
                                <tr>
                                    <th>"Patient"</th>
                                    <th>"Recorded"</th>
                                    <th>"Vitals"</th>
                                    <th>"Score"</th>
                                    <th>"Risk"</th>
                                    <th></th>
                                </tr>
                            </thead>
                            <tbody>
                                <Show when=move || visible().is_empty()>
                                    <tr>
                                        <td colspan="6" class="text-center py-8 text-base-content/50">
                                            "No predictions match this filter."
                                        </td>
                                    </tr>
                                </Show>
                                <For
                                    each=visible
                                    key=|m| m.id
                                    children=move |m| {
                                        let patient = m.patient;
                                        let (score, label, reason) = m
                                            .prediction
                                            .as_ref()
                                            .map(|p| (format_risk_score(p.risk_score), Some(p.risk_label), p.reason.clone()))
                                            .unwrap_or_default();
                                        view! {
                                            <tr>
                                                <td class="font-medium">{patient_name(patient)}</td>
                                                <td class="text-sm text-base-content/60">{format_datetime(&m.timestamp)}</td>
                                                <td class="text-sm">
                                                    {format_vital(Some(m.heart_rate))} " bpm · "
                                                    {format_vital(Some(m.spo2))} "% · "
                                                    {format_blood_pressure(m.systolic, m.diastolic)}
                                                </td>
                                                <td class="font-mono">{score}</td>
                                                <td>
                                                    <RiskBadge label=label />
                                                    {reason.map(|r| view! { <div class="text-xs text-base-content/60 mt-1">{r}</div> })}
                                                </td>
                                                <td class="text-right">
                                                    <button
                                                        class="btn btn-ghost btn-sm gap-1"
                                                        on:click=move |_| router.navigate_to_route(AppRoute::PatientDetail(patient))
                                                    >
                                                        <Eye attr:class="h-4 w-4" /> "View Patient"
                                                    </button>
                                                </td>
                                            </tr>
                                        }
                                    }
                                />
                            </tbody>
                        </table>
                    </div>
                </div>
            </div>
        </Show>
    }
}
