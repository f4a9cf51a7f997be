use crate::api::ChatdeckClient;
use crate::components::{ConversationSidebar, ErrorBanner, MessageComposer};
use crate::config::FrontendConfig;
use crate::hooks::{use_async_call, use_async_call_with_policy};
use shared::models::{ComposerState, ConversationList, OutgoingMessage};
use uuid::Uuid;
use yew::{
    Callback, Html, UseStateHandle, function_component, html, use_effect_with, use_memo, use_state,
};

/// Puts `draft` back into the composer when a send settles without a value.
pub(crate) fn restore_on_failure<T: 'static>(
    composer: UseStateHandle<ComposerState>,
    draft: ComposerState,
) -> Callback<Option<T>> {
    Callback::from(move |sent: Option<T>| {
        if sent.is_none() {
            composer.set(draft.clone());
        }
    })
}

#[function_component(App)]
pub fn app() -> Html {
    let config = use_memo((), |()| FrontendConfig::new());
    let conversations = use_state(ConversationList::default);
    let query = use_state(String::new);
    let composer = use_state(ComposerState::default);

    let load = use_async_call_with_policy(
        |(): ()| async { ChatdeckClient::shared().list_conversations().await },
        (),
        config.ui.completion_policy,
    );
    let send = use_async_call(
        |(conversation_id, message): (Uuid, OutgoingMessage)| async move {
            ChatdeckClient::shared()
                .send_message(conversation_id, &message)
                .await
        },
        (),
    );
    let mark_read = use_async_call(
        |conversation_id: Uuid| async move {
            ChatdeckClient::shared().mark_read(conversation_id).await
        },
        (),
    );

    {
        let load = load.clone();
        use_effect_with((), move |()| load.run(()));
    }

    {
        let conversations = conversations.clone();
        use_effect_with(load.result().cloned(), move |loaded| {
            if let Some(summaries) = loaded {
                let mut list = ConversationList::new(summaries.iter().cloned());
                if let Some(id) = conversations.selected_id() {
                    if let Err(error) = list.select(id) {
                        web_sys::console::debug_1(&format!("Dropping selection: {error}").into());
                    }
                }
                conversations.set(list);
            }
        });
    }

    {
        let conversations = conversations.clone();
        use_effect_with(send.result().cloned(), move |sent| {
            if let Some(summary) = sent {
                let mut list = (*conversations).clone();
                list.upsert(summary.clone());
                conversations.set(list);
            }
        });
    }

    let on_select = {
        let conversations = conversations.clone();
        let mark_read = mark_read.clone();
        Callback::from(move |id: Uuid| {
            let mut list = (*conversations).clone();
            if list.select(id).is_ok() && list.mark_read(id).is_ok() {
                conversations.set(list);
                mark_read.run(id);
            }
        })
    };

    let on_query_change = {
        let query = query.clone();
        Callback::from(move |text: String| query.set(text))
    };

    let on_retry = load.callback::<()>();

    let on_composer_change = {
        let composer = composer.clone();
        Callback::from(move |next: ComposerState| composer.set(next))
    };

    // The composer clears itself before emitting, so keep this render's
    // state around to put back if the message never reaches the server.
    let on_send = {
        let conversations = conversations.clone();
        let composer = composer.clone();
        let draft = (*composer).clone();
        let send = send.clone();
        Callback::from(move |message: OutgoingMessage| {
            let restore = restore_on_failure(composer.clone(), draft.clone());
            match conversations.selected_id() {
                Some(id) => send.run_then((id, message), restore),
                None => restore.emit(None),
            }
        })
    };

    let heading = match conversations.selected() {
        Some(conversation) => html! {
            <h1 class="text-lg font-semibold mb-auto">{ conversation.display_title() }</h1>
        },
        None => html! {
            <p class="text-base-content/70 mb-auto">{"Select a conversation to start chatting."}</p>
        },
    };

    let action_error = send
        .last_error()
        .or_else(|| mark_read.last_error())
        .map(|message| html! { <ErrorBanner message={message.to_string()} /> });

    html! {
        <div class="flex h-screen">
            <div class="w-80 border-r border-base-300">
                <ConversationSidebar
                    conversations={(*conversations).clone()}
                    query={(*query).clone()}
                    on_query_change={on_query_change}
                    on_select={on_select}
                    loading={load.in_flight()}
                    error={load.last_error().map(str::to_string)}
                    on_retry={Some(on_retry)}
                    preview_length={config.ui.preview_length}
                />
            </div>
            <main class="flex-1 flex flex-col gap-3 p-4">
                { heading }
                { action_error.unwrap_or_default() }
                <MessageComposer
                    state={(*composer).clone()}
                    on_change={on_composer_change}
                    on_send={on_send}
                    max_length={config.ui.max_message_length}
                    disabled={conversations.selected_id().is_none() || send.in_flight()}
                />
            </main>
        </div>
    }
}
