use crate::api::use_api;
use crate::components::icons::*;
use crate::components::ui::{Alert, Loading, PageHeader};
use crate::stores::use_stores;
use crate::web::confirm;
use crate::web::route::AppRoute;
use crate::web::router::use_router;
use leptos::prelude::*;
use leptos::task::spawn_local;
use vitalwatch_shared::date::{format_day, format_dob};
use vitalwatch_shared::forms::PatientDraft;
use vitalwatch_shared::{PatientId, log_info};

#[component]
fn AddPatientForm(error: RwSignal<Option<String>>, notice: RwSignal<Option<String>>) -> impl IntoView {
    let api = use_api();
    let stores = use_stores();

    let full_name = RwSignal::new(String::new());
    let dob = RwSignal::new(String::new());
    let submitting = RwSignal::new(false);

    let on_submit = move |ev: leptos::web_sys::SubmitEvent| {
        ev.prevent_default();
        let draft = PatientDraft {
            full_name: full_name.get(),
            dob: dob.get(),
        };
        let new_patient = match draft.to_new_patient() {
            Ok(p) => p,
            Err(e) => {
                error.set(Some(e.to_string()));
                return;
            }
        };

        submitting.set(true);
        let api = api.get_value();
        spawn_local(async move {
            match api.create_patient(new_patient).await {
                Ok(patient) => {
                    log_info!("[Patients] created {}", patient.id);
                    notice.set(Some(format!("Patient {} added", patient.full_name)));
                    stores.patients.update(|s| s.insert_front(patient));
                    full_name.set(String::new());
                    dob.set(String::new());
                }
                Err(e) => error.set(Some(e.user_message("Failed to create patient"))),
            }
            submitting.set(false);
        });
    };

    view! {
        <div class="card bg-base-100 shadow-xl">
            <form class="card-body" on:submit=on_submit>
                <h3 class="card-title">"Add Patient"</h3>
                <div class="grid gap-4 md:grid-cols-[2fr_1fr_auto] items-end">
                    <div class="form-control">
                        <label for="full_name" class="label">
                            <span class="label-text">"Full Name"</span>
                        </label>
                        <input
                            id="full_name"
                            type="text"
                            required
                            placeholder="Jane Doe"
                            class="input input-bordered w-full"
                            on:input=move |ev| full_name.set(event_target_value(&ev))
                            prop:value=full_name
                        />
                    </div>
                    <div class="form-control">
                        <label for="dob" class="label">
                            <span class="label-text">"Date of Birth"</span>
                        </label>
                        <input
                            id="dob"
                            type="date"
                            class="input input-bordered w-full"
                            on:input=move |ev| dob.set(event_target_value(&ev))
                            prop:value=dob
                        />
                    </div>
                    <button type="submit" class="btn btn-primary gap-2" disabled=move || submitting.get()>
                        <Plus attr:class="h-4 w-4" /> "Add"
                    </button>
                </div>
            </form>
        </div>
    }
}

#[component]
pub fn PatientsPage() -> impl IntoView {
    let api = use_api();
    let stores = use_stores();
    let router = use_router();

    let error = RwSignal::new(Option::<String>::None);
    let notice = RwSignal::new(Option::<String>::None);

    let load = move || {
        let api = api.get_value();
        stores.patients.update(|s| s.set_loading(true));
        spawn_local(async move {
            match api.list_patients().await {
                Ok(list) => stores.patients.update(|s| {
                    s.replace_all(list);
                    s.set_error(None);
                }),
                Err(e) => {
                    let msg = e.user_message("Failed to load patients");
                    error.set(Some(msg.clone()));
                    stores.patients.update(|s| s.set_error(Some(msg)));
                }
            }
            stores.patients.update(|s| s.set_loading(false));
        });
    };
    load();

    let handle_delete = move |id: PatientId, name: String| {
        if !confirm(&format!("Delete {} and all of their measurements?", name)) {
            return;
        }
        let api = api.get_value();
        spawn_local(async move {
            match api.delete_patient(id).await {
                Ok(()) => {
                    stores.patients.update(|s| s.remove_by_id(id));
                    stores.measurements.update(|s| s.remove_for_patient(id));
                    notice.set(Some(format!("{} deleted", name)));
                }
                Err(e) => error.set(Some(e.user_message("Failed to delete patient"))),
            }
        });
    };

    // 3 秒后清除通知
    Effect::new(move |_| {
        if notice.with(Option::is_some) {
            set_timeout(move || notice.set(None), std::time::Duration::from_secs(3));
        }
    });

    let loading = move || stores.patients.with(|s| s.loading);
    let is_empty = move || stores.patients.with(|s| s.is_empty());

    view! {
        <PageHeader title="Patients" subtitle="Register and manage the patients you monitor" />

        <Show when=move || notice.with(Option::is_some)>
            <div class="toast toast-top toast-end z-50">
                <div class="alert alert-success shadow-lg">
                    <span>{move || notice.get().unwrap_or_default()}</span>
                </div>
            </div>
        </Show>

        <Alert message=error />
        <AddPatientForm error=error notice=notice />

        <div class="card bg-base-100 shadow-xl">
            <div class="card-body p-0">
                <div class="overflow-x-auto w-full">
                    <table class="table table-zebra w-full">
                        <thead>
                            <tr>
                                <th>"Name"</th>
                                <th>"Date of Birth"</th>
                                <th class="hidden md:table-cell">"Registered"</th>
                                <th></th>
                            </tr>
                        </thead>
                        <tbody>
                            <Show when=move || is_empty() && !loading()>
                                <tr>
                                    <td colspan="4" class="text-center py-8 text-base-content/50">
                                        "No patients registered yet."
                                    </td>
                                </tr>
                            </Show>
                            <Show when=move || loading() && is_empty()>
                                <tr>
                                    <td colspan="4"><Loading label="Loading patients..." /></td>
                                </tr>
                            </Show>
                            <For
                                each=move || stores.patients.with(|s| s.items.clone())
                                key=|p| p.id
                                children=move |patient| {
                                    let id = patient.id;
                                    let name = patient.full_name.clone();
                                    view! {
                                        <tr>
                                            <td class="font-medium">{patient.full_name.clone()}</td>
                                            <td>{format_dob(patient.dob.as_ref())}</td>
                                            <td class="hidden md:table-cell text-sm text-base-content/60">
                                                {format_day(&patient.created_at)}
                                            </td>
                                            <td class="text-right whitespace-nowrap">
                                                <button
                                                    class="btn btn-ghost btn-sm gap-1"
                                                    on:click=move |_| router.navigate_to_route(AppRoute::PatientDetail(id))
                                                >
                                                    <Eye attr:class="h-4 w-4" /> "View Details"
                                                </button>
                                                <button
                                                    class="btn btn-ghost btn-sm text-error"
                                                    on:click=move |_| handle_delete(id, name.clone())
                                                >
                                                    <Trash2 attr:class="h-4 w-4" />
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
    }
}
