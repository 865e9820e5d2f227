//! Window-control commands, registered only for the floating terminal.

use super::{CommandContext, WindowCommand};
use crate::error::Result;
use crate::navigation::DeferredAction;
use crate::types::Output;

const OPACITY_RANGE: std::ops::RangeInclusive<u32> = 30..=100;

pub(super) fn run_window(
    cmd: WindowCommand,
    name: &str,
    ctx: &CommandContext,
    args: &[String],
) -> Result<Output> {
    let output = match cmd {
        // The session flips its own theme and the window's.
        WindowCommand::Theme => Output::ToggleTheme,
        WindowCommand::Opacity => {
            let window = ctx.window(name)?;
            let Some(arg) = args.first() else {
                let current = (window.state().opacity * 100.0).round();
                return Ok(Output::text(format!(
                    "Usage: opacity <30-100>. Current opacity: {current}%"
                )));
            };
            match arg.parse::<u32>() {
                Ok(value) if OPACITY_RANGE.contains(&value) => {
                    window.set_opacity(f64::from(value) / 100.0);
                    Output::text(format!("Terminal opacity set to {value}%"))
                }
                _ => Output::text("Invalid opacity value. Please use a number between 30 and 100."),
            }
        }
        WindowCommand::Minimize => {
            ctx.window(name)?.minimize();
            Output::text("Terminal minimized. Click the terminal icon to restore.")
        }
        WindowCommand::Close => {
            ctx.window(name)?;
            // Outlasts the typed acknowledgement below.
            ctx.scheduler
                .schedule_tracked(DeferredAction::CloseWindow, ctx.navigation.delay());
            Output::text("Closing terminal... Use Ctrl+` to reopen.")
        }
        WindowCommand::Reset => {
            ctx.window(name)?.reset();
            Output::text("Terminal position and size reset to defaults.")
        }
    };
    Ok(output)
}
