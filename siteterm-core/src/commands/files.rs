//! The virtual filesystem: `pwd`, `cat` and a very dangerous `rm`.

use super::format::boxed_with_width;
use super::info::contact_fields;
use super::{CommandContext, FileCommand};
use crate::config::ProfileConfig;
use crate::renderer::RAW_BLOCK_MARKER;
use crate::types::Output;

const HOME: &str = "~";

/// Pre-rendered art printed after the warning card.
const ROLL_ART: &[&str] = &[
    "⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⡿⠿⠛⠛⠛⠛⠿⢿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⣿⣿⣿⣿⣿⣿⡿⠋⠁⠀⠀⠀⠀⠀⠀⠀⠀⠈⠙⢿⣿⣿⣿⣿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⣿⣿⣿⣿⣿⠏⠀⠀⣠⣴⣶⣶⣶⣶⣦⣄⠀⠀⠀⠀⠹⣿⣿⣿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⣿⣿⣿⣿⡏⠀⠀⣼⣿⠟⠛⠛⠛⠛⠻⣿⣧⠀⠀⠀⠀⢹⣿⣿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⣿⣿⣿⣿⠁⠀⢸⣿⡇⠀⣶⠀⠀⣶⠀⢸⣿⡇⠀⠀⠀⠈⣿⣿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⣿⣿⣿⣿⠀⠀⢸⣿⣇⠀⠀⠰⠆⠀⠀⣸⣿⡇⠀⠀⠀⠀⣿⣿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⣿⣿⣿⣿⡀⠀⠈⢿⣿⣦⣀⣤⣤⣀⣴⣿⡿⠁⠀⠀⠀⢀⣿⣿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⣿⣿⣿⣿⣧⠀⠀⠀⠙⠻⢿⣿⣿⡿⠟⠋⠀⠀⠀⠀⠀⣼⣿⣿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⣿⣿⡿⠟⠋⠀⠀⠀⠀⠀⢸⣿⣿⡇⠀⠀⠀⠀⠀⠀⠀⠙⠻⢿⣿⣿⣿⣿⣿",
    "⣿⣿⣿⠟⠁⠀⠀⠀⠀⠀⣠⣶⣶⣾⣿⣿⣷⣶⣶⣄⠀⠀⠀⠀⠀⠀⠈⠻⣿⣿⣿⣿",
    "⣿⣿⠃⠀⠀⠀⠀⠀⢀⣾⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣷⡀⠀⠀⠀⠀⠀⠀⠘⣿⣿⣿",
    "⣿⡇⠀⠀⠀⠀⠀⠀⣾⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣿⣷⠀⠀⠀⠀⠀⠀⠀⢸⣿⣿",
];

pub(super) fn run(cmd: FileCommand, ctx: &CommandContext, args: &[String]) -> Output {
    match cmd {
        FileCommand::Pwd => Output::text(HOME),
        FileCommand::Cat => cat(&ctx.profile, args),
        FileCommand::SelfDestruct => self_destruct(),
    }
}

fn cat(profile: &ProfileConfig, args: &[String]) -> Output {
    let Some(filename) = args.first() else {
        return Output::text("cat: missing file operand");
    };
    match filename.as_str() {
        "about.md" => about_md(profile),
        "contact.txt" => {
            let mut lines = vec![
                "Contact Information".to_string(),
                "==================".to_string(),
                String::new(),
            ];
            lines.extend(contact_fields(profile));
            Output::Lines(lines)
        }
        other => Output::text(format!("cat: {other}: No such file or directory")),
    }
}

fn about_md(profile: &ProfileConfig) -> Output {
    let mut lines = vec![
        format!("# About {}", profile.name),
        String::new(),
        profile.headline.clone(),
        format!("Location: {}", profile.location),
        String::new(),
        "## About Me".to_string(),
    ];
    lines.extend(profile.bio.iter().cloned());
    lines.push(String::new());
    lines.push("## Interests".to_string());
    lines.extend(profile.interests.iter().map(|i| format!("- {i}")));
    Output::Lines(lines)
}

fn self_destruct() -> Output {
    let mut lines = boxed_with_width("YOU KNOW THE RULES AND SO DO I", 46);
    lines.extend(ROLL_ART.iter().map(|row| format!("{RAW_BLOCK_MARKER}{row}")));
    Output::Lines(lines)
}
