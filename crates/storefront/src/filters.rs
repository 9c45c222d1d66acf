//! Custom Askama template filters.

#![allow(clippy::unnecessary_wraps)]

use std::fmt::Display;

/// Descriptions longer than this are cut in the product grid.
pub const DESCRIPTION_PREVIEW_CHARS: usize = 100;

/// Returns the current year.
///
/// Usage in templates: `{{ ""|current_year }}`
#[askama::filter_fn]
pub fn current_year(_value: impl Display, _env: &dyn askama::Values) -> askama::Result<i32> {
    use chrono::Datelike;
    Ok(chrono::Utc::now().year())
}

/// Prefix a preformatted amount with the currency symbol.
///
/// Usage in templates: `{{ product.price|money }}` renders `$10.00`
#[askama::filter_fn]
pub fn money(amount: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(format_money(&amount.to_string()))
}

/// Shorten a description for the product grid.
///
/// Usage in templates: `{{ product.description|preview }}`
#[askama::filter_fn]
pub fn preview(text: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(truncate_chars(&text.to_string(), DESCRIPTION_PREVIEW_CHARS))
}

/// Pluralise an item count.
///
/// Usage in templates: `{{ cart.total_items|items }}` renders `1 item` or `3 items`
#[askama::filter_fn]
pub fn items(count: impl Display, _env: &dyn askama::Values) -> askama::Result<String> {
    Ok(item_count_label(&count.to_string()))
}

fn format_money(amount: &str) -> String {
    format!("${amount}")
}

/// Keep the first `max` characters and add `...` when anything was cut.
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().nth(max).is_some() {
        format!("{}...", text.chars().take(max).collect::<String>())
    } else {
        text.to_string()
    }
}

fn item_count_label(count: &str) -> String {
    if count == "1" {
        "1 item".to_string()
    } else {
        format!("{count} items")
    }
}
