//! Browser question form
//!
//! A single text input; submitting it reloads the page with `?question=`,
//! which runs one pipeline call and renders the answer below the form.

use crate::error::AppError;
use crate::state::AppState;
use axum::{
    extract::{Query, State},
    response::Html,
};
use faqa_core::Answer;
use serde::Deserialize;
use std::sync::Arc;

/// Page template (embedded at compile time)
const PAGE_HTML: &str = include_str!("../../static/index.html");

#[derive(Debug, Default, Deserialize)]
pub struct FormParams {
    pub question: Option<String>,
}

/// GET / - serve the form, answering when a question was submitted
pub async fn form_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<FormParams>,
) -> Html<String> {
    let question = params.question.unwrap_or_default();

    if question.trim().is_empty() {
        return Html(render_page(&question, ""));
    }

    state.increment_requests();
    let result = match state.pipeline.answer(&question).await {
        Ok(answer) => render_answer(&answer),
        Err(e) => {
            tracing::error!(error = %e, "form query failed");
            render_error(&AppError::from(e))
        }
    };

    Html(render_page(&question, &result))
}

fn render_page(question: &str, result: &str) -> String {
    let (head, tail) = PAGE_HTML
        .split_once("{{result}}")
        .unwrap_or((PAGE_HTML, ""));

    let mut page = head.replace("{{question}}", &escape_html(question));
    page.push_str(result);
    page.push_str(tail);
    page
}

fn render_answer(answer: &Answer) -> String {
    let mut html = String::new();
    html.push_str(&format!(
        "  <h2>Answer</h2>\n  <div class=\"answer\">{}</div>\n",
        escape_html(&answer.text)
    ));

    if !answer.sources.is_empty() {
        html.push_str("  <div class=\"sources\">\n    <h3>Sources</h3>\n    <ol>\n");
        for hit in &answer.sources {
            html.push_str(&format!(
                "      <li>{} <small>({:.2})</small></li>\n",
                escape_html(&hit.record.question),
                hit.score
            ));
        }
        html.push_str("    </ol>\n  </div>\n");
    }

    html
}

fn render_error(err: &AppError) -> String {
    format!(
        "  <div class=\"error\">{}</div>\n",
        escape_html(err.message())
    )
}

/// Escape text for HTML element content and quoted attributes
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}
