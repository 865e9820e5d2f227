//! Profile cards: `about`, `contact`, `projects`, `date`.

use chrono::Local;

use super::format::boxed;
use crate::config::ProfileConfig;
use crate::types::Output;

pub(super) fn about(profile: &ProfileConfig) -> Output {
    let mut lines = boxed("ABOUT ME");
    lines.push(String::new());
    lines.push(profile.headline.clone());
    lines.push(format!("Location: {}", profile.location));
    lines.push(String::new());
    lines.extend(profile.bio.iter().cloned());
    lines.push(String::new());
    lines.push("## Interests".to_string());
    lines.extend(profile.interests.iter().map(|i| format!("- {i}")));
    Output::Lines(lines)
}

pub(super) fn contact(profile: &ProfileConfig) -> Output {
    let mut lines = boxed("CONTACT INFO");
    lines.push(String::new());
    lines.extend(contact_fields(profile));
    lines.push(String::new());
    Output::Lines(lines)
}

/// The five contact lines shared by `contact` and `cat contact.txt`.
pub(super) fn contact_fields(profile: &ProfileConfig) -> Vec<String> {
    vec![
        format!("Email: {}", profile.email),
        format!("GitHub: {}", profile.github),
        format!("LinkedIn: {}", profile.linkedin),
        format!("Twitter: {}", profile.twitter),
        format!("Website: {}", profile.website),
    ]
}

pub(super) fn projects(profile: &ProfileConfig) -> Output {
    let mut lines = boxed("FEATURED PROJECTS");
    lines.push(format!(
        "No featured project added at the moment. Visit: {}",
        profile.github
    ));
    lines.push(String::new());
    lines.push(format!("🔗 More projects: {}", profile.github));
    Output::Lines(lines)
}

/// Local date and time, e.g. "Fri Mar 08 2024 14:05:09 +0530".
pub(super) fn date() -> Output {
    Output::text(Local::now().format("%a %b %d %Y %H:%M:%S %z").to_string())
}
