use super::super::{Model, Msg};
use super::utils::{debounce, format_size};
use yew::prelude::*;

pub fn render_preview_area(model: &Model, ctx: &Context<Model>) -> Html {
    let Some(info) = &model.file_info else {
        return html! {};
    };
    let link = ctx.link().clone();
    let busy = model.busy();

    html! {
        <div id="preview-container">
            { render_selected_image_preview(model) }
            <div class="file-info">
                <span class="file-name">{ &info.name }</span>
                <span class="file-size">{ format_size(info.size) }</span>
            </div>
            { render_progress(model) }
            <div class="button-container">
                <button
                    id="clear-all-btn"
                    class="analyze-btn"
                    style="background-color: var(--clear-color);"
                    disabled={busy}
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Reset)
                    })}
                >
                    <i class="fa-solid fa-trash"></i>{" Reset"}
                </button>
                <button
                    class="analyze-btn"
                    onclick={debounce(300, {
                        let link = link.clone();
                        move || link.send_message(Msg::Analyze)
                    })}
                    disabled={!model.session.can_submit()}
                >
                    { render_analyze_button_content(model) }
                </button>
            </div>
        </div>
    }
}

fn render_selected_image_preview(model: &Model) -> Html {
    match &model.preview {
        None if model.preview_loading => html! {
            <div class="loading-preview">
                <i class="fa-solid fa-spinner fa-spin fa-2x"></i>
                <p style="margin-left: 10px;">{"Loading preview..."}</p>
            </div>
        },
        Some(handle) => html! {
            <img id="actual-image-preview"
                src={handle.to_string()}
                alt="Leaf preview" />
        },
        None => html! {
            <div class="unavailable-preview">
                <p>{"Preview unavailable"}</p>
            </div>
        },
    }
}

fn render_progress(model: &Model) -> Html {
    if !model.busy() {
        return html! {};
    }
    let progress = model.state.progress();
    html! {
        <div class="progress">
            <div class="progress-bar" style={format!("width: {}%", progress)}></div>
            <span class="progress-value">{ format!("{}%", progress) }</span>
        </div>
    }
}

fn render_analyze_button_content(model: &Model) -> Html {
    if model.busy() {
        html! { <><i class="fa-solid fa-spinner fa-spin"></i>{" Analyzing..."}</> }
    } else {
        html! { <><i class="fa-solid fa-magnifying-glass"></i>{" Analyze Leaf"}</> }
    }
}
