//! Content commands over the [`ContentIndex`](crate::content::ContentIndex).

use super::format::{boxed, excerpt, long_date, plural, short_date};
use super::{CommandContext, ContentCommand};
use crate::content::Post;
use crate::error::Result;
use crate::types::Output;

const BLOG_LIMIT: usize = 10;
const SEARCH_LIMIT: usize = 5;
const DEFAULT_RECENT: usize = 5;

pub(super) async fn run(
    cmd: ContentCommand,
    ctx: &CommandContext,
    args: &[String],
) -> Result<Output> {
    match cmd {
        ContentCommand::Blog => blog(ctx).await,
        ContentCommand::Search => search(ctx, args).await,
        ContentCommand::Featured => featured(ctx).await,
        ContentCommand::Recent => recent(ctx, args).await,
    }
}

async fn blog(ctx: &CommandContext) -> Result<Output> {
    if ctx.content.is_loading() {
        return Ok(Output::text("Loading blog posts..."));
    }
    let posts = ctx.content.list_posts().await?;

    if posts.is_empty() {
        let mut lines = boxed("NO POSTS FOUND");
        lines.extend(
            [
                "",
                "No blog posts available at the moment.",
                "Check back later for new content!",
            ]
            .map(String::from),
        );
        return Ok(Output::Lines(lines));
    }

    let mut lines = boxed("LATEST POSTS");
    lines.push(String::new());
    lines.push(format!(
        "Found {} blog {}:",
        posts.len(),
        plural(posts.len(), "post")
    ));
    lines.push(String::new());

    for (index, post) in posts.iter().take(BLOG_LIMIT).enumerate() {
        lines.push(format!("{}. {}", index + 1, post.title));
        lines.push(format!(
            "   📅 {} | ⏱️ {}",
            long_date(post.published_at),
            post.reading_time
        ));
        let tags: Vec<&str> = post.tags.iter().take(3).map(String::as_str).collect();
        lines.push(format!("   📂 {} | 🏷️ {}", post.category, tags.join(", ")));
        lines.push(format!("   📝 {}", excerpt(post)));
        if post.featured {
            lines.push("   ⭐ Featured Post".to_string());
        }
        lines.push(String::new());
    }

    if posts.len() > BLOG_LIMIT {
        lines.push(format!("... and {} more posts", posts.len() - BLOG_LIMIT));
        lines.push(String::new());
    }

    lines.push("💡 Use 'open blog <number>' to read a specific post".to_string());
    lines.push("🔍 Use 'search <term>' to find posts by keyword".to_string());
    lines.push("📖 Visit /blogs to see all posts".to_string());
    Ok(Output::Lines(lines))
}

async fn search(ctx: &CommandContext, args: &[String]) -> Result<Output> {
    if args.is_empty() {
        return Ok(Output::lines([
            "Usage: search <keyword>",
            "",
            "Search through blog posts by title, content, or tags.",
            "",
            "Examples:",
            "  search react",
            "  search performance",
            "  search typescript",
            "",
            "💡 Tip: Use 'blog' command first to see available posts",
        ]));
    }

    let term = args.join(" ");
    let matches = ctx.content.search_posts(&term).await?;
    if matches.is_empty() {
        return Ok(Output::lines([
            format!("No posts found matching \"{term}\""),
            String::new(),
            "💡 Try different keywords or use 'blog' to see all posts".to_string(),
        ]));
    }

    // Numbers match the `blog` listing so `open blog <n>` works on them.
    let all = ctx.content.list_posts().await?;
    let mut lines = boxed(&format!("SEARCH RESULTS ({})", matches.len()));
    lines.push(String::new());
    lines.push(format!(
        "Found {} {} matching \"{term}\":",
        matches.len(),
        plural(matches.len(), "post")
    ));
    lines.push(String::new());

    for post in matches.iter().take(SEARCH_LIMIT) {
        let number = blog_number(&all, post);
        lines.push(format!("{number}. {}", post.title));
        lines.push(format!(
            "   📅 {} | 📂 {}",
            short_date(post.published_at),
            post.category
        ));
        lines.push(format!("   📝 {}", excerpt(post)));
        lines.push(String::new());
    }

    if matches.len() > SEARCH_LIMIT {
        lines.push(format!(
            "... and {} more results",
            matches.len() - SEARCH_LIMIT
        ));
        lines.push(String::new());
    }

    lines.push("💡 Use 'open blog <number>' to read a specific post".to_string());
    Ok(Output::Lines(lines))
}

fn blog_number(all: &[Post], post: &Post) -> usize {
    all.iter()
        .position(|p| p.slug == post.slug)
        .map(|i| i + 1)
        .unwrap_or(0)
}

async fn featured(ctx: &CommandContext) -> Result<Output> {
    let posts = ctx.content.featured_posts().await?;
    if posts.is_empty() {
        return Ok(Output::text("No featured posts available."));
    }

    let mut lines = boxed("FEATURED POSTS");
    lines.push(String::new());
    for (index, post) in posts.iter().enumerate() {
        lines.push(format!("{}. ⭐ {}", index + 1, post.title));
        lines.push(format!(
            "   📅 {} | ⏱️ {}",
            long_date(post.published_at),
            post.reading_time
        ));
        lines.push(format!("   📂 {}", post.category));
        lines.push(format!("   📝 {}", excerpt(post)));
        lines.push(String::new());
    }
    Ok(Output::Lines(lines))
}

/// Requested count for `recent`; anything but a positive integer falls back.
fn recent_limit(args: &[String]) -> usize {
    args.first()
        .and_then(|arg| arg.parse::<usize>().ok())
        .filter(|n| *n > 0)
        .unwrap_or(DEFAULT_RECENT)
}

async fn recent(ctx: &CommandContext, args: &[String]) -> Result<Output> {
    let limit = recent_limit(args);
    let posts = ctx.content.recent_posts(limit).await?;
    if posts.is_empty() {
        return Ok(Output::text("No recent posts available."));
    }

    let mut lines = boxed(&format!("RECENT POSTS ({limit})"));
    lines.push(String::new());
    for (index, post) in posts.iter().enumerate() {
        lines.push(format!("{}. {}", index + 1, post.title));
        lines.push(format!(
            "   📅 {} | ⏱️ {}",
            long_date(post.published_at),
            post.reading_time
        ));
        lines.push(format!("   📂 {}", post.category));
        if post.featured {
            lines.push("   ⭐ Featured Post".to_string());
        }
        lines.push(String::new());
    }
    Ok(Output::Lines(lines))
}
