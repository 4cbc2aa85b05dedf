//! View rendering boundary.
//!
//! Handlers decide *what* to show as a [`View`]: a named template with a context,
//! or a redirect. A [`ViewRenderer`] turns pages into response bodies; the
//! default [`JsonRenderer`] emits the context as JSON tagged with the template name.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    Json,
};
use serde_json::{Map, Value};

use crate::error::{AppError, AppResult};

/// What a handler responds with
#[derive(Debug, Clone, PartialEq)]
pub enum View {
    Page {
        template: &'static str,
        status: StatusCode,
        context: Value,
    },
    Redirect(String),
}

impl View {
    pub fn page(template: &'static str, context: Value) -> Self {
        View::Page {
            template,
            status: StatusCode::OK,
            context,
        }
    }

    /// Page with an explicit status, e.g. a form shown again after a failed write
    pub fn page_with_status(template: &'static str, status: StatusCode, context: Value) -> Self {
        View::Page {
            template,
            status,
            context,
        }
    }

    pub fn redirect(path: impl Into<String>) -> Self {
        View::Redirect(path.into())
    }
}

/// Produces response bodies for named templates
pub trait ViewRenderer: Send + Sync {
    fn render(&self, template: &str, context: Value) -> AppResult<Response>;
}

/// Renders the template context as a JSON document
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonRenderer;

impl ViewRenderer for JsonRenderer {
    fn render(&self, template: &str, context: Value) -> AppResult<Response> {
        let mut body = match context {
            Value::Object(map) => map,
            Value::Null => Map::new(),
            other => {
                return Err(AppError::Internal(format!(
                    "Template {} expects an object context, got {}",
                    template, other
                )))
            }
        };
        body.insert("template".to_string(), Value::String(template.to_string()));
        Ok(Json(Value::Object(body)).into_response())
    }
}

/// Turn a view into an HTTP response using the given renderer
pub fn respond(renderer: &dyn ViewRenderer, view: View) -> Response {
    match view {
        View::Redirect(path) => Redirect::to(&path).into_response(),
        View::Page {
            template,
            status,
            context,
        } => match renderer.render(template, context) {
            Ok(mut response) => {
                *response.status_mut() = status;
                response
            }
            Err(e) => e.into_response(),
        },
    }
}
