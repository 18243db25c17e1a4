use super::super::{Model, Msg};
use shared::{Category, DetectionResult, SubmissionState};
use yew::prelude::*;

fn category_class(category: Category) -> &'static str {
    match category {
        Category::Disease => "disease",
        Category::NutrientDeficiency => "deficiency",
        Category::Healthy => "healthy",
    }
}

fn category_icon(category: Category) -> &'static str {
    match category {
        Category::Disease => "fa-solid fa-virus",
        Category::NutrientDeficiency => "fa-solid fa-flask",
        Category::Healthy => "fa-solid fa-circle-check",
    }
}

pub fn render_results(model: &Model, ctx: &Context<Model>) -> Html {
    let SubmissionState::Succeeded(result) = &model.state else {
        return html! {};
    };

    html! {
        <div class={classes!("results-container", category_class(result.category))}>
            <div class="result-header">
                <h2>
                    <i class={category_icon(result.category)}></i>
                    { format!(" {}", result.class_name) }
                    <span class="category-badge">{ result.category.to_string() }</span>
                </h2>
                <div class="confidence-meter">
                    <div class="meter-label">{"Confidence:"}</div>
                    <div class="meter">
                        <div class="meter-fill" style={format!("width: {}%", result.confidence_percent)}></div>
                    </div>
                    <div class="meter-value">{ format!("{}%", result.confidence_percent) }</div>
                </div>
            </div>
            { render_list("Symptoms", "fa-solid fa-magnifying-glass", &result.symptoms) }
            { render_list("Recommended Treatment", "fa-solid fa-prescription-bottle", &result.treatment) }
            { render_list("Prevention Tips", "fa-solid fa-shield", &result.prevention) }
            { render_list("Nutrients", "fa-solid fa-seedling", &result.nutrients) }
            { render_top_predictions(result) }
            <div class="button-container">
                <button class="analyze-btn" onclick={ctx.link().callback(|_| Msg::CopyReport)}>
                    <i class="fa-solid fa-copy"></i>{" Copy Results"}
                </button>
                <button class="analyze-btn" onclick={ctx.link().callback(|_| Msg::Reset)}>
                    <i class="fa-solid fa-rotate-left"></i>{" Analyze Another"}
                </button>
            </div>
        </div>
    }
}

fn render_list(title: &str, icon: &'static str, items: &[String]) -> Html {
    if items.is_empty() {
        return html! {};
    }
    html! {
        <div class="result-section">
            <h3><i class={icon}></i>{ format!(" {}", title) }</h3>
            <ul>
                { for items.iter().map(|item| html! { <li>{ item }</li> }) }
            </ul>
        </div>
    }
}

fn render_top_predictions(result: &DetectionResult) -> Html {
    if result.top_predictions.is_empty() {
        return html! {};
    }
    html! {
        <div class="detailed-results">
            <h3>{"Top Predictions"}</h3>
            <div class="result-bars">
                { for result.top_predictions.iter().map(|prediction| html! {
                    <div class={classes!("result-item", category_class(prediction.category))}>
                        <div class="result-label">{ &prediction.class_name }</div>
                        <div class="result-bar-container">
                            <div class="result-bar" style={format!("width: {}%", prediction.confidence_percent)}></div>
                        </div>
                        <div class="result-value">{ format!("{}%", prediction.confidence_percent) }</div>
                    </div>
                }) }
            </div>
        </div>
    }
}
