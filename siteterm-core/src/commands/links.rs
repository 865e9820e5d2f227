//! `open` and `goto`. Both acknowledge immediately and leave the page after
//! the configured navigation delay.

use tracing::info;

use super::{CommandContext, NavigationCommand};
use crate::error::Result;
use crate::navigation::DeferredAction;
use crate::types::Output;

pub(super) async fn run(
    cmd: NavigationCommand,
    ctx: &CommandContext,
    args: &[String],
) -> Result<Output> {
    match cmd {
        NavigationCommand::Open => open(ctx, args).await,
        NavigationCommand::Goto => Ok(goto(ctx, args)),
    }
}

fn defer(ctx: &CommandContext, action: DeferredAction) {
    info!(?action, "Deferring navigation");
    ctx.scheduler
        .schedule_tracked(action, ctx.navigation.delay());
}

async fn open(ctx: &CommandContext, args: &[String]) -> Result<Output> {
    let Some(target) = args.first() else {
        return Ok(Output::lines([
            "Usage: open <target>",
            "",
            "Available targets:",
            "• blog <number>  - Open specific blog post",
            "• twitter | x    - Open Twitter profile",
            "• github         - Open GitHub profile",
            "• linkedin       - Open LinkedIn profile",
            "",
            "Examples:",
            "  open blog 1",
            "  open twitter",
            "  open github",
        ]));
    };

    let profile = &ctx.profile;
    let output = match target.to_lowercase().as_str() {
        "blog" => return open_post(ctx, args.get(1)).await,
        "twitter" | "x" => {
            defer(ctx, DeferredAction::OpenExternal(profile.twitter.clone()));
            "Opening Twitter profile..."
        }
        "github" => {
            defer(ctx, DeferredAction::OpenExternal(profile.github.clone()));
            "Opening GitHub profile..."
        }
        "linkedin" => {
            defer(ctx, DeferredAction::OpenExternal(profile.linkedin.clone()));
            "Opening LinkedIn profile..."
        }
        _ => {
            return Ok(Output::text(format!(
                "Unknown target: {target}. Type 'open' for usage."
            )));
        }
    };
    Ok(Output::text(output))
}

async fn open_post(ctx: &CommandContext, number: Option<&String>) -> Result<Output> {
    let Some(number) = number else {
        return Ok(Output::text(
            "Please specify a blog post number. Use 'blog' to see available posts.",
        ));
    };
    let posts = ctx.content.list_posts().await?;
    let post = number
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|index| posts.get(index));

    match post {
        Some(post) => {
            defer(ctx, DeferredAction::Navigate(format!("/blogs/{}", post.slug)));
            Ok(Output::text(format!("Opening: {}", post.title)))
        }
        None => Ok(Output::text(format!(
            "Invalid post number. Please use a number between 1 and {}.",
            posts.len()
        ))),
    }
}

/// Site pages reachable with `goto`: (name, route, label).
const PAGES: &[(&str, &str, &str)] = &[
    ("home", "/", "homepage"),
    ("blog", "/blogs", "blog"),
    ("thoughts", "/thoughts", "thoughts"),
];

fn goto(ctx: &CommandContext, args: &[String]) -> Output {
    let Some(page) = args.first() else {
        return Output::lines([
            "Usage: goto <page>",
            "",
            "Available pages:",
            "• home      - Go to homepage",
            "• blog      - Go to blog listing",
            "• thoughts  - Go to thoughts",
            "",
            "Examples:",
            "  goto home",
            "  goto blog",
        ]);
    };

    let wanted = page.to_lowercase();
    let Some((_, route, label)) = PAGES.iter().find(|(name, _, _)| *name == wanted) else {
        return Output::text(format!(
            "Unknown page: {page}. Type 'goto' for available pages."
        ));
    };

    if ctx.current_path == *route {
        let place = if *label == "homepage" {
            "the homepage".to_string()
        } else {
            format!("the {label} page")
        };
        return Output::text(format!("You are already on {place}."));
    }

    defer(ctx, DeferredAction::Navigate(route.to_string()));
    Output::text(format!("Navigating to {label}..."))
}

#[cfg(test)]
mod tests {
    use super::super::CommandRegistry;
    use super::super::test_support::*;
    use super::*;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_open_blog_defers_navigation() {
        let harness = Harness::embedded();
        let registry = harness.registry();
        let lines = output_lines(&registry, "open blog 2").await;
        assert_eq!(lines, vec!["Opening: Understanding React Hooks"]);
        assert!(harness.navigator.visits().is_empty());

        tokio::time::sleep(Duration::from_millis(1001)).await;
        assert_eq!(
            harness.navigator.visits(),
            vec![DeferredAction::Navigate("/blogs/react-hooks".into())]
        );
    }

    #[tokio::test]
    async fn test_open_blog_argument_errors() {
        let registry = Harness::embedded().registry();
        assert_eq!(
            output_lines(&registry, "open blog").await,
            vec!["Please specify a blog post number. Use 'blog' to see available posts."]
        );
        for bad in ["0", "4", "two"] {
            assert_eq!(
                output_lines(&registry, &format!("open blog {bad}")).await,
                vec!["Invalid post number. Please use a number between 1 and 3."]
            );
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_social_profiles() {
        let harness = Harness::embedded();
        let registry = harness.registry();
        assert_eq!(
            output_lines(&registry, "open x").await,
            vec!["Opening Twitter profile..."]
        );
        assert_eq!(
            output_lines(&registry, "open github").await,
            vec!["Opening GitHub profile..."]
        );
        tokio::time::sleep(Duration::from_millis(1500)).await;
        let profile = &harness.context.profile;
        let visits = harness.navigator.visits();
        assert_eq!(visits.len(), 2);
        assert!(visits.contains(&DeferredAction::OpenExternal(profile.twitter.clone())));
        assert!(visits.contains(&DeferredAction::OpenExternal(profile.github.clone())));
    }

    #[tokio::test]
    async fn test_open_usage_and_unknown_target() {
        let registry = Harness::embedded().registry();
        let usage = output_lines(&registry, "open").await;
        assert_eq!(usage[0], "Usage: open <target>");
        assert_eq!(
            output_lines(&registry, "open myspace").await,
            vec!["Unknown target: myspace. Type 'open' for usage."]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_goto_routes() {
        let harness = Harness::embedded();
        let registry = CommandRegistry::build(harness.context.clone().with_path("/blogs/x"));
        assert_eq!(
            output_lines(&registry, "goto home").await,
            vec!["Navigating to homepage..."]
        );
        assert_eq!(
            output_lines(&registry, "goto blog").await,
            vec!["Navigating to blog..."]
        );
        assert_eq!(
            output_lines(&registry, "goto thoughts").await,
            vec!["Navigating to thoughts..."]
        );
        tokio::time::sleep(Duration::from_millis(1001)).await;
        let visits = harness.navigator.visits();
        assert_eq!(visits.len(), 3);
        for route in ["/", "/blogs", "/thoughts"] {
            assert!(visits.contains(&DeferredAction::Navigate(route.into())));
        }
    }

    #[tokio::test]
    async fn test_goto_already_there() {
        let harness = Harness::embedded();
        let home = harness.registry();
        assert_eq!(
            output_lines(&home, "goto home").await,
            vec!["You are already on the homepage."]
        );
        let blogs = CommandRegistry::build(harness.context.clone().with_path("/blogs"));
        assert_eq!(
            output_lines(&blogs, "goto blog").await,
            vec!["You are already on the blog page."]
        );
        assert_eq!(harness.context.scheduler.pending_count(), 0);
    }

    #[tokio::test]
    async fn test_goto_unknown_page() {
        let registry = Harness::embedded().registry();
        assert_eq!(
            output_lines(&registry, "goto mars").await,
            vec!["Unknown page: mars. Type 'goto' for available pages."]
        );
    }
}
