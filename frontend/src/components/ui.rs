//! 通用展示组件

use crate::components::icons::{AlertTriangle, X};
use leptos::prelude::*;
use vitalwatch_shared::RiskLabel;

/// 可关闭的提示条；`message` 为 `None` 时不渲染
#[component]
pub fn Alert(
    message: RwSignal<Option<String>>,
    /// `true` 为警告样式，否则为错误样式
    #[prop(optional)]
    warning: bool,
) -> impl IntoView {
    let class = if warning {
        "alert alert-warning text-sm"
    } else {
        "alert alert-error text-sm"
    };

    view! {
        <Show when=move || message.with(Option::is_some)>
            <div role="alert" class=class>
                <AlertTriangle attr:class="h-5 w-5 shrink-0" />
                <span class="flex-1">{move || message.get().unwrap_or_default()}</span>
                <button
                    type="button"
                    class="btn btn-ghost btn-xs btn-square"
                    on:click=move |_| message.set(None)
                >
                    <X attr:class="h-4 w-4" />
                </button>
            </div>
        </Show>
    }
}

#[component]
pub fn Loading(#[prop(optional, into)] label: Option<String>) -> impl IntoView {
    view! {
        <div class="flex items-center justify-center gap-3 py-12 text-base-content/60">
            <span class="loading loading-spinner loading-md text-primary"></span>
            {label}
        </div>
    }
}

#[component]
pub fn PageHeader(
    #[prop(into)] title: String,
    #[prop(optional, into)] subtitle: Option<String>,
    #[prop(optional)] children: Option<Children>,
) -> impl IntoView {
    view! {
        <div class="flex flex-wrap items-center justify-between gap-4">
            <div>
                <h1 class="text-2xl font-bold">{title}</h1>
                {subtitle.map(|s| view! { <p class="text-base-content/70 text-sm">{s}</p> })}
            </div>
            <div class="flex gap-2">{children.map(|c| c())}</div>
        </div>
    }
}

pub fn risk_badge_class(label: Option<RiskLabel>) -> &'static str {
    match label {
        Some(RiskLabel::High) => "badge badge-error",
        Some(RiskLabel::Medium) => "badge badge-warning",
        Some(RiskLabel::Low) => "badge badge-success",
        Some(RiskLabel::Unrecognized) => "badge badge-ghost",
        None => "badge badge-outline",
    }
}

#[component]
pub fn RiskBadge(label: Option<RiskLabel>) -> impl IntoView {
    let text = match label {
        Some(RiskLabel::Unrecognized) => "Unknown".to_string(),
        Some(l) => format!("{} risk", capitalize(l.as_str())),
        None => "No prediction".to_string(),
    };
    view! { <span class=risk_badge_class(label)>{text}</span> }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[component]
pub fn StatCard(
    #[prop(into)] title: String,
    #[prop(into)] value: Signal<usize>,
    #[prop(optional, into)] class: Option<&'static str>,
    children: Children,
) -> impl IntoView {
    let value_class = format!("stat-value {}", class.unwrap_or("text-primary"));
    view! {
        <div class="stat">
            <div class="stat-figure">{children()}</div>
            <div class="stat-title">{title}</div>
            <div class=value_class>{move || value.get()}</div>
        </div>
    }
}

/// 单项生命体征
#[component]
pub fn VitalCard(
    #[prop(into)] label: String,
    value: String,
    #[prop(into)] unit: String,
) -> impl IntoView {
    view! {
        <div class="rounded-box bg-base-200 p-4">
            <div class="text-xs uppercase tracking-wide text-base-content/60">{label}</div>
            <div class="mt-1 text-2xl font-bold">
                {value} " " <span class="text-sm font-normal text-base-content/60">{unit}</span>
            </div>
        </div>
    }
}
