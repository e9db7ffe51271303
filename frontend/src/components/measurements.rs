use crate::api::use_api;
use crate::components::icons::RefreshCw;
use crate::components::measurement_card::MeasurementCard;
use crate::components::measurement_form::MeasurementDialog;
use crate::components::ui::{Alert, Loading, PageHeader};
use crate::stores::{reload_all, use_stores};
use crate::web::confirm;
use leptos::prelude::*;
use leptos::task::spawn_local;
use vitalwatch_shared::store::RiskFilter;
use vitalwatch_shared::{Measurement, MeasurementId, PatientId};

/// 风险筛选按钮组，带各类计数
#[component]
pub fn RiskFilterBar(
    filter: RwSignal<RiskFilter>,
    /// 参与计数的测量
    counts: Signal<[usize; 4]>,
) -> impl IntoView {
    view! {
        <div class="join">
            {RiskFilter::all()
                .into_iter()
                .enumerate()
                .map(|(i, f)| {
                    view! {
                        <button
                            class=move || if filter.get() == f { "btn btn-sm join-item btn-active" } else { "btn btn-sm join-item" }
                            on:click=move |_| filter.set(f)
                        >
                            {f.label()}
                            <span class="badge badge-sm">{move || counts.get()[i]}</span>
                        </button>
                    }
                })
                .collect_view()}
        </div>
    }
}

#[component]
pub fn MeasurementsPage() -> impl IntoView {
    let api = use_api();
    let stores = use_stores();

    let error = RwSignal::new(Option::<String>::None);
    let warning = RwSignal::new(Option::<String>::None);
    let filter = RwSignal::new(RiskFilter::All);

    let load = move || {
        let api = api.get_value();
        spawn_local(async move {
            match reload_all(&api, stores).await {
                Ok(partial) => warning.set(partial),
                Err(e) => error.set(Some(e.user_message("Failed to load measurements"))),
            }
        });
    };
    load();

    let handle_saved = move |m: Measurement| stores.measurements.update(|s| s.insert_front(m));

    let handle_delete = move |id: MeasurementId| {
        if !confirm("Delete this measurement?") {
            return;
        }
        let api = api.get_value();
        spawn_local(async move {
            match api.delete_measurement(id).await {
                Ok(()) => stores.measurements.update(|s| s.remove_by_id(id)),
                Err(e) => error.set(Some(e.user_message("Failed to delete measurement"))),
            }
        });
    };

    let patients = Signal::derive(move || stores.patients.with(|s| s.items.clone()));
    let counts = Signal::derive(move || {
        stores
            .measurements
            .with(|s| RiskFilter::all().map(|f| f.count(&s.items)))
    });
    let visible = move || stores.measurements.with(|s| filter.get().apply(&s.items));
    let loading = move || stores.measurements.with(|s| s.loading);
    let patient_name = move |id: PatientId| {
        stores
            .patients
            .with(|s| s.get(id).map(|p| p.full_name.clone()))
            .unwrap_or_else(|| format!("Patient #{}", id))
    };

    view! {
        <PageHeader title="Measurements" subtitle="Vital signs recorded across all patients">
            <button on:click=move |_| load() disabled=loading class="btn btn-ghost btn-circle">
                <RefreshCw attr:class=move || if loading() { "h-5 w-5 animate-spin" } else { "h-5 w-5" } />
            </button>
            <MeasurementDialog patients=patients on_saved=handle_saved />
        </PageHeader>

        <Alert message=error />
        <Alert message=warning warning=true />

        <RiskFilterBar filter=filter counts=counts />

        <Show when=move || !loading() fallback=|| view! { <Loading label="Loading measurements..." /> }>
            <Show
                when=move || !visible().is_empty()
                fallback=|| view! { <p class="text-center py-8 text-base-content/50">"No measurements match this filter."</p> }
            >
                <div class="grid gap-4 md:grid-cols-2 xl:grid-cols-3">
                    <For
                        each=visible
                        key=|m| m.id
                        children=move |m| {
                            let name = patient_name(m.patient);
                            view! {
                                <MeasurementCard
                                    measurement=m
                                    patient_name=name
                                    on_delete=Callback::new(handle_delete)
                                />
                            }
                        }
                    />
                </div>
            </Show>
        </Show>
    }
}
