use shared::models::{
    ComposerPanel, ComposerState, EMOJI_PALETTE, OutgoingMessage, Timestamp,
};
use web_sys::HtmlTextAreaElement;
use yew::{
    Callback, Html, Properties, TargetCast, classes, function_component, html, use_state,
};

#[derive(Properties, PartialEq, Clone)]
pub struct MessageComposerProps {
    pub state: ComposerState,
    pub on_change: Callback<ComposerState>,
    pub on_send: Callback<OutgoingMessage>,
    #[prop_or(4000)]
    pub max_length: usize,
    #[prop_or(false)]
    pub disabled: bool,
    #[prop_or_default]
    pub placeholder: String,
    /// GIF search panel, supplied by the caller.
    #[prop_or_default]
    pub gif_picker: Html,
    /// Voice recorder panel, supplied by the caller.
    #[prop_or_default]
    pub voice_recorder: Html,
    /// Date/time picker panel, supplied by the caller.
    #[prop_or_default]
    pub schedule_picker: Html,
}

#[function_component(MessageComposer)]
pub fn message_composer(props: &MessageComposerProps) -> Html {
    let send_error = use_state(|| None::<String>);

    // Every edit goes through a copy of the current state and dismisses the
    // previous send error.
    let update = {
        let state = props.state.clone();
        let on_change = props.on_change.clone();
        let send_error = send_error.clone();
        move |edit: &dyn Fn(&mut ComposerState)| {
            let mut next = state.clone();
            edit(&mut next);
            send_error.set(None);
            on_change.emit(next);
        }
    };

    let submit = {
        let state = props.state.clone();
        let on_change = props.on_change.clone();
        let on_send = props.on_send.clone();
        let send_error = send_error.clone();
        let max_length = props.max_length;
        let disabled = props.disabled;
        Callback::from(move |()| {
            if disabled || !state.can_send(max_length) {
                return;
            }
            let mut next = state.clone();
            match next.take_outgoing(Timestamp::now(), max_length) {
                Ok(message) => {
                    send_error.set(None);
                    on_change.emit(next);
                    on_send.emit(message);
                }
                Err(error) => send_error.set(Some(error.to_string())),
            }
        })
    };

    let on_input = {
        let update = update.clone();
        Callback::from(move |event: yew::events::InputEvent| {
            let target: HtmlTextAreaElement = event.target_unchecked_into();
            let text = target.value();
            update(&move |composer: &mut ComposerState| composer.set_draft(text.clone()));
        })
    };

    let on_keydown = {
        let submit = submit.clone();
        Callback::from(move |event: yew::events::KeyboardEvent| {
            if event.key() == "Enter" && !event.shift_key() {
                event.prevent_default();
                submit.emit(());
            }
        })
    };

    let on_submit = {
        let submit = submit.clone();
        Callback::from(move |event: yew::events::SubmitEvent| {
            event.prevent_default();
            submit.emit(());
        })
    };

    let toolbar = ComposerPanel::ALL.iter().map(|&panel| {
        let update = update.clone();
        let class = if props.state.is_open(panel) {
            classes!("btn", "btn-sm", "btn-active")
        } else {
            classes!("btn", "btn-sm", "btn-ghost")
        };
        html! {
            <button
                class={class}
                type="button"
                disabled={props.disabled}
                onclick={Callback::from(move |_| {
                    update(&|composer: &mut ComposerState| composer.toggle_panel(panel));
                })}
            >
                { panel.label() }
            </button>
        }
    });

    let panel = match props.state.open_panel() {
        Some(ComposerPanel::Emoji) => html! {
            <div class="emoji-palette flex gap-1">
                { for EMOJI_PALETTE.iter().map(|&emoji| {
                    let update = update.clone();
                    html! {
                        <button
                            class="btn btn-ghost btn-xs"
                            type="button"
                            onclick={Callback::from(move |_| {
                                update(&|composer: &mut ComposerState| composer.insert_emoji(emoji));
                            })}
                        >
                            { emoji }
                        </button>
                    }
                })}
            </div>
        },
        Some(ComposerPanel::Gif) => props.gif_picker.clone(),
        Some(ComposerPanel::Voice) => props.voice_recorder.clone(),
        Some(ComposerPanel::Schedule) => props.schedule_picker.clone(),
        None => Html::default(),
    };

    let attachments = props
        .state
        .attachments()
        .iter()
        .enumerate()
        .map(|(index, attachment)| {
            let update = update.clone();
            html! {
                <span class="badge badge-outline gap-1">
                    { attachment.label() }
                    <button
                        class="btn btn-ghost btn-xs"
                        type="button"
                        onclick={Callback::from(move |_| {
                            update(&|composer: &mut ComposerState| {
                                composer.remove_attachment(index);
                            });
                        })}
                    >
                        {"×"}
                    </button>
                </span>
            }
        });

    let schedule = props.state.scheduled_for().map(|at| {
        let update = update.clone();
        html! {
            <span class="badge badge-info gap-1">
                { format!("Scheduled for {}", at.0.format("%Y-%m-%d %H:%M")) }
                <button
                    class="btn btn-ghost btn-xs"
                    type="button"
                    onclick={Callback::from(move |_| {
                        update(&|composer: &mut ComposerState| composer.clear_schedule());
                    })}
                >
                    {"×"}
                </button>
            </span>
        }
    });

    let placeholder = if props.placeholder.is_empty() {
        String::from("Write a message")
    } else {
        props.placeholder.clone()
    };
    let remaining = props.state.remaining_chars(props.max_length);

    html! {
        <form class="message-composer space-y-2" onsubmit={on_submit}>
            <div class="flex flex-wrap gap-2">
                { for attachments }
                { schedule.unwrap_or_default() }
            </div>
            <textarea
                class={classes!("textarea", "textarea-bordered", "w-full", "min-h-[4rem]")}
                placeholder={placeholder}
                value={props.state.draft().to_string()}
                oninput={on_input}
                onkeydown={on_keydown}
                disabled={props.disabled}
            />
            { panel }
            {
                match &*send_error {
                    Some(message) => html! { <div class="text-xs text-error">{ message.clone() }</div> },
                    None => Html::default(),
                }
            }
            <div class="flex items-center justify-between">
                <div class="flex gap-1">{ for toolbar }</div>
                <span class="text-xs text-base-content/50">{ remaining }</span>
                <button
                    class="btn btn-primary"
                    type="submit"
                    disabled={props.disabled || !props.state.can_send(props.max_length)}
                >
                    {"Send"}
                </button>
            </div>
        </form>
    }
}
