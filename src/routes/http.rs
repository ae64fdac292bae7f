//! HTTP endpoint handlers. These are thin wrappers that forward to `logic` and
//! render the resulting page.

use std::sync::Arc;
use axum::{
  extract::{Path, State},
  http::{HeaderMap, StatusCode},
  response::{Html, IntoResponse, Redirect, Response},
  Form, Json,
};
use tracing::{info, instrument, warn};

use crate::error::RequestError;
use crate::logic::{answer_page, home_page, riddle_page, Page};
use crate::protocol::*;
use crate::state::AppState;
use crate::views::render;

impl IntoResponse for RequestError {
  fn into_response(self) -> Response {
    let status = match &self {
      RequestError::InvalidId(_) => StatusCode::BAD_REQUEST,
      RequestError::Progression(_) => StatusCode::NOT_FOUND,
    };
    warn!(target: "riddle", error = %self, %status, "Request rejected");
    status.into_response()
  }
}

/// HTMX requests only want the fragment, not a whole page.
fn is_htmx(headers: &HeaderMap) -> bool {
  headers.get("hx-request").and_then(|v| v.to_str().ok()) == Some("true")
}

fn html(page: &Page, headers: &HeaderMap) -> Html<String> {
  Html(render(page, is_htmx(headers)))
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

pub async fn http_root() -> Redirect { Redirect::temporary("/home") }

#[instrument(level = "info", skip_all)]
pub async fn http_home(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Html<String> {
  html(&home_page(&state), &headers)
}

#[instrument(level = "info", skip(state, headers))]
pub async fn http_get_riddle(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  headers: HeaderMap,
) -> Result<Html<String>, RequestError> {
  let page = riddle_page(&state, &id)?;
  info!(target: "riddle", %id, "Riddle served");
  Ok(html(&page, &headers))
}

#[instrument(level = "info", skip(state, headers, form), fields(answer_len = form.answer.len()))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Path(id): Path<String>,
  headers: HeaderMap,
  Form(form): Form<AnswerForm>,
) -> Result<Html<String>, RequestError> {
  let page = answer_page(&state, &id, &form.answer)?;
  Ok(html(&page, &headers))
}

#[instrument(level = "info", skip_all)]
pub async fn http_get_schedule(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  let schedule = state.schedule();
  Json(to_schedule_out(&schedule, state.riddles.len()))
}
