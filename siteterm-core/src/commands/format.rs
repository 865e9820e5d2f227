//! Text helpers shared by the command handlers.

use chrono::NaiveDate;
use unicode_width::UnicodeWidthStr;

use crate::content::Post;

/// Inner width of a boxed header.
pub(crate) const BOX_WIDTH: usize = 41;

const EXCERPT_LIMIT: usize = 80;

/// A three-line rounded box with `title` centered, at least [`BOX_WIDTH`] wide.
pub(crate) fn boxed(title: &str) -> Vec<String> {
    boxed_with_width(title, BOX_WIDTH)
}

pub(crate) fn boxed_with_width(title: &str, min_width: usize) -> Vec<String> {
    let title_width = UnicodeWidthStr::width(title);
    let inner = min_width.max(title_width + 4);
    let left = (inner - title_width) / 2;
    let right = inner - title_width - left;
    vec![
        format!("╭{}╮", "─".repeat(inner)),
        format!("│{}{}{}│", " ".repeat(left), title, " ".repeat(right)),
        format!("╰{}╯", "─".repeat(inner)),
    ]
}

/// "Mar 10, 2024"
pub(crate) fn long_date(date: NaiveDate) -> String {
    date.format("%b %-d, %Y").to_string()
}

/// "Mar 10"
pub(crate) fn short_date(date: NaiveDate) -> String {
    date.format("%b %-d").to_string()
}

/// First 80 characters of the excerpt, with an ellipsis when cut.
pub(crate) fn excerpt(post: &Post) -> String {
    let mut chars = post.excerpt.chars();
    let head: String = chars.by_ref().take(EXCERPT_LIMIT).collect();
    if chars.next().is_some() {
        format!("{head}...")
    } else {
        head
    }
}

/// "post" or "posts".
pub(crate) fn plural(count: usize, word: &str) -> String {
    if count == 1 {
        word.to_string()
    } else {
        format!("{word}s")
    }
}
