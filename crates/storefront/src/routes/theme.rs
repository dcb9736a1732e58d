//! Theme stylesheet route handler.
//!
//! Brand colours and fonts come from configuration, so they are served as a
//! small generated stylesheet instead of inline styles.

use axum::{
    extract::State,
    http::header,
    response::{IntoResponse, Response},
};

use crate::config::BrandConfig;
use crate::state::AppState;

/// Serve the brand theme as CSS custom properties.
pub async fn stylesheet(State(state): State<AppState>) -> Response {
    (
        [(header::CONTENT_TYPE, "text/css; charset=utf-8")],
        theme_css(&state.config().brand),
    )
        .into_response()
}

fn theme_css(brand: &BrandConfig) -> String {
    format!(
        ":root {{\n  \
         --color-primary: {primary};\n  \
         --color-secondary: {secondary};\n  \
         --font-heading: \"{heading}\", sans-serif;\n  \
         --font-body: \"{body}\", sans-serif;\n\
         }}\n",
        primary = brand.primary_color,
        secondary = brand.secondary_color,
        heading = css_string(&brand.header_font),
        body = css_string(&brand.body_font),
    )
}

/// Font names go inside a quoted CSS string.
fn css_string(value: &str) -> String {
    value
        .replace('+', " ")
        .chars()
        .filter(|c| !matches!(c, '"' | '\\' | '\n' | '\r' | '<'))
        .collect()
}
