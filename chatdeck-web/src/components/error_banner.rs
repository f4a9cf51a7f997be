use yew::{Callback, Html, Properties, function_component, html};

#[derive(Properties, PartialEq)]
pub struct ErrorBannerProps {
    pub message: String,
    #[prop_or_default]
    pub on_retry: Option<Callback<()>>,
}

/// Renders the `last_error` of an async call.
#[function_component(ErrorBanner)]
pub fn error_banner(props: &ErrorBannerProps) -> Html {
    let retry = props.on_retry.clone().map(|on_retry| {
        html! {
            <button
                class="btn btn-ghost btn-xs"
                type="button"
                onclick={Callback::from(move |_| on_retry.emit(()))}
            >
                {"Retry"}
            </button>
        }
    });

    html! {
        <div class="alert alert-error text-sm flex items-center justify-between" role="alert">
            <span>{ props.message.clone() }</span>
            { retry.unwrap_or_default() }
        </div>
    }
}
