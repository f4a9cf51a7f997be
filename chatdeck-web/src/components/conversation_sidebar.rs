use chrono::{DateTime, Utc};
use shared::models::ConversationList;
use uuid::Uuid;
use web_sys::HtmlInputElement;
use yew::{Callback, Html, Properties, TargetCast, classes, function_component, html};

use super::{ErrorBanner, Loading};

#[derive(Properties, PartialEq)]
pub struct ConversationSidebarProps {
    pub conversations: ConversationList,
    pub on_select: Callback<Uuid>,
    #[prop_or_default]
    pub query: String,
    #[prop_or_default]
    pub on_query_change: Callback<String>,
    #[prop_or(false)]
    pub loading: bool,
    #[prop_or_default]
    pub error: Option<String>,
    #[prop_or_default]
    pub on_retry: Option<Callback<()>>,
    #[prop_or(80)]
    pub preview_length: usize,
    #[prop_or_else(Utc::now)]
    pub now: DateTime<Utc>,
}

#[function_component(ConversationSidebar)]
pub fn conversation_sidebar(props: &ConversationSidebarProps) -> Html {
    let on_search = {
        let on_query_change = props.on_query_change.clone();
        Callback::from(move |event: yew::events::InputEvent| {
            let target: HtmlInputElement = event.target_unchecked_into();
            on_query_change.emit(target.value());
        })
    };

    let total_unread = props.conversations.total_unread();
    let visible = props.conversations.filter(&props.query);
    let selected = props.conversations.selected_id();

    let body = if props.loading && props.conversations.is_empty() {
        html! { <Loading label="Loading conversations" /> }
    } else if visible.is_empty() {
        let message = if props.conversations.is_empty() {
            "No conversations yet. Start a new one to begin."
        } else {
            "No conversations match your search."
        };
        html! { <div class="p-4 text-sm text-base-content/70">{ message }</div> }
    } else {
        html! {
            <ul class="divide-y divide-base-300">
                { for visible.into_iter().map(|conversation| {
                    let id = conversation.id;
                    let on_select = props.on_select.clone();
                    let class = if selected == Some(id) {
                        classes!("conversation", "p-3", "bg-base-300", "cursor-pointer", "flex", "gap-3")
                    } else {
                        classes!("conversation", "p-3", "hover:bg-base-200", "cursor-pointer", "flex", "gap-3")
                    };
                    html! {
                        <li
                            key={id.to_string()}
                            class={class}
                            onclick={Callback::from(move |_| on_select.emit(id))}
                        >
                            <div class="avatar placeholder">{ conversation.initials() }</div>
                            <div class="flex-1 min-w-0">
                                <div class="flex justify-between text-sm font-medium text-base-content">
                                    <span class="truncate">{ conversation.display_title() }</span>
                                    <span class="text-xs text-base-content/50">
                                        { conversation.activity_label(props.now) }
                                    </span>
                                </div>
                                <div class="text-xs text-base-content/70 mt-1 flex justify-between">
                                    <span class="truncate">{ conversation.preview(props.preview_length) }</span>
                                    {
                                        match conversation.unread_badge() {
                                            Some(badge) => html! {
                                                <span class="badge badge-primary badge-sm ml-2">{ badge }</span>
                                            },
                                            None => Html::default(),
                                        }
                                    }
                                </div>
                            </div>
                        </li>
                    }
                })}
            </ul>
        }
    };

    html! {
        <aside class="conversation-sidebar flex flex-col h-full">
            <div class="p-3 flex items-center justify-between">
                <h2 class="font-semibold">{"Conversations"}</h2>
                {
                    if total_unread > 0 {
                        html! { <span class="badge badge-secondary">{ total_unread }</span> }
                    } else {
                        Html::default()
                    }
                }
            </div>
            <input
                class="input input-bordered input-sm mx-3 mb-2"
                type="search"
                placeholder="Search conversations"
                value={props.query.clone()}
                oninput={on_search}
            />
            {
                match &props.error {
                    Some(message) => html! {
                        <ErrorBanner message={message.clone()} on_retry={props.on_retry.clone()} />
                    },
                    None => Html::default(),
                }
            }
            <div class="flex-1 overflow-y-auto">{ body }</div>
        </aside>
    }
}
