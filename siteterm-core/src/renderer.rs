//! Output rendering and the typing effect.
//!
//! [`TypingFrames`] yields the successive partial renders of a line; the
//! [`OutputRenderer`] consumes them and owns all timing. Lines starting with
//! [`RAW_BLOCK_MARKER`] are pre-rendered art and skip the effect.

use std::str::CharIndices;
use tracing::trace;

use crate::callback::TerminalCallback;
use crate::config::{TypingConfig, WindowConfig};
use crate::types::Line;

/// Prefix marking a literal block that is appended verbatim.
pub const RAW_BLOCK_MARKER: &str = "rick:";

/// Lazy sequence of growing prefixes of a line: `"a"`, `"ab"`, `"abc"`.
///
/// Finite; build a new one to replay a line from the start.
#[derive(Debug, Clone)]
pub struct TypingFrames<'a> {
    text: &'a str,
    indices: CharIndices<'a>,
}

impl<'a> TypingFrames<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            text,
            indices: text.char_indices(),
        }
    }
}

impl<'a> Iterator for TypingFrames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        let (start, ch) = self.indices.next()?;
        Some(&self.text[..start + ch.len_utf8()])
    }
}

/// How a single output line is revealed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderStep {
    /// Character-by-character reveal.
    Typed(String),
    /// Empty line, appended at once then a short pause.
    Blank,
    /// Literal block with the marker stripped, appended at once.
    Raw(String),
}

/// Classify output lines into render steps.
pub fn plan(lines: Vec<String>, raw_marker: &str) -> Vec<RenderStep> {
    lines
        .into_iter()
        .map(|line| {
            if let Some(rest) = line.strip_prefix(raw_marker) {
                RenderStep::Raw(rest.to_string())
            } else if line.is_empty() {
                RenderStep::Blank
            } else {
                RenderStep::Typed(line)
            }
        })
        .collect()
}

/// Append-only rendered lines of one session.
#[derive(Debug, Default)]
pub struct LineBuffer {
    lines: Vec<Line>,
}

impl LineBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: Line) -> &Line {
        self.lines.push(line);
        &self.lines[self.lines.len() - 1]
    }

    /// Replace the text of the last line, keeping its identity.
    pub fn update_last(&mut self, text: &str) -> Option<&Line> {
        let last = self.lines.last_mut()?;
        last.text.clear();
        last.text.push_str(text);
        Some(last)
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    pub fn lines(&self) -> &[Line] {
        &self.lines
    }

    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|l| l.text.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Reveals output lines into a [`LineBuffer`].
pub struct OutputRenderer {
    config: TypingConfig,
}

impl OutputRenderer {
    pub fn new(config: TypingConfig) -> Self {
        Self { config }
    }

    /// Render a batch in order. Line N+1 starts only once line N is complete.
    pub async fn render(
        &self,
        lines: Vec<String>,
        buffer: &mut LineBuffer,
        callback: &dyn TerminalCallback,
    ) {
        for step in plan(lines, &self.config.raw_marker) {
            match step {
                RenderStep::Raw(text) => {
                    let line = buffer.push(Line::raw(text));
                    callback.on_line_appended(line).await;
                }
                RenderStep::Blank => {
                    let line = buffer.push(Line::output(""));
                    callback.on_line_appended(line).await;
                    tokio::time::sleep(self.config.blank_line_pause()).await;
                }
                RenderStep::Typed(text) => self.type_line(&text, buffer, callback).await,
            }
        }
    }

    async fn type_line(&self, text: &str, buffer: &mut LineBuffer, callback: &dyn TerminalCallback) {
        let mut frames = TypingFrames::new(text);
        let Some(first) = frames.next() else {
            return;
        };
        let line = buffer.push(Line::output(first));
        callback.on_line_appended(line).await;
        tokio::time::sleep(self.config.char_interval()).await;

        for frame in frames {
            trace!(frame, "Typing frame");
            if let Some(line) = buffer.update_last(frame) {
                callback.on_line_updated(line).await;
            }
            tokio::time::sleep(self.config.char_interval()).await;
        }
    }
}

/// Viewport scroll measurements reported by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn is_at_bottom(&self, tolerance_px: f64) -> bool {
        (self.scroll_height - self.client_height - self.scroll_top).abs() < tolerance_px
    }
}

/// Decides whether the viewport should follow new output.
///
/// Following stops when the user scrolls away from the bottom and resumes
/// when they scroll back.
#[derive(Debug, Clone)]
pub struct ScrollFollow {
    tolerance_px: f64,
    user_scrolled: bool,
}

impl ScrollFollow {
    pub fn new(tolerance_px: f64) -> Self {
        Self {
            tolerance_px,
            user_scrolled: false,
        }
    }

    pub fn on_scroll(&mut self, metrics: ScrollMetrics) {
        self.user_scrolled = !metrics.is_at_bottom(self.tolerance_px);
    }

    /// Whether to scroll to the bottom after the line buffer changes.
    pub fn should_follow(&self) -> bool {
        !self.user_scrolled
    }
}

impl Default for ScrollFollow {
    fn default() -> Self {
        Self::new(WindowConfig::default().scroll_tolerance_px)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callback::{RecordedEvent, RecordingCallback};
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    #[test]
    fn test_frames_grow_one_char_at_a_time() {
        let frames: Vec<&str> = TypingFrames::new("abc").collect();
        assert_eq!(frames, vec!["a", "ab", "abc"]);
    }

    #[test]
    fn test_frames_respect_char_boundaries() {
        let frames: Vec<&str> = TypingFrames::new("é⭐x").collect();
        assert_eq!(frames, vec!["é", "é⭐", "é⭐x"]);
    }

    #[test]
    fn test_frames_empty_line() {
        assert_eq!(TypingFrames::new("").count(), 0);
    }

    #[test]
    fn test_plan_classifies_lines() {
        let steps = plan(
            vec!["hi".into(), "".into(), "rick:⣿⣿".into()],
            RAW_BLOCK_MARKER,
        );
        assert_eq!(
            steps,
            vec![
                RenderStep::Typed("hi".into()),
                RenderStep::Blank,
                RenderStep::Raw("⣿⣿".into()),
            ]
        );
    }

    #[test]
    fn test_line_buffer_update_keeps_identity() {
        let mut buffer = LineBuffer::new();
        let id = buffer.push(Line::output("a")).id;
        let updated = buffer.update_last("ab").unwrap();
        assert_eq!(updated.id, id);
        assert_eq!(buffer.texts(), vec!["ab"]);
        buffer.clear();
        assert!(buffer.is_empty());
        assert!(buffer.update_last("x").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_typed_line_frames_in_order() {
        let renderer = OutputRenderer::new(TypingConfig::default());
        let callback = RecordingCallback::new();
        let mut buffer = LineBuffer::new();
        renderer
            .render(vec!["abc".into()], &mut buffer, &callback)
            .await;

        assert_eq!(
            callback.events().await,
            vec![
                RecordedEvent::Appended("a".into()),
                RecordedEvent::Updated("ab".into()),
                RecordedEvent::Updated("abc".into()),
            ]
        );
        // Exactly one rendered line for the logical line
        assert_eq!(buffer.texts(), vec!["abc"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_render_timing_per_character() {
        let renderer = OutputRenderer::new(TypingConfig::default());
        let callback = RecordingCallback::new();
        let mut buffer = LineBuffer::new();
        let start = tokio::time::Instant::now();
        renderer
            .render(vec!["abcd".into(), "".into()], &mut buffer, &callback)
            .await;
        // 4 chars * 15ms + 30ms blank pause
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(90), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(100), "elapsed {elapsed:?}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_raw_block_is_instant_and_stripped() {
        let renderer = OutputRenderer::new(TypingConfig::default());
        let callback = RecordingCallback::new();
        let mut buffer = LineBuffer::new();
        let start = tokio::time::Instant::now();
        renderer
            .render(vec!["rick:⣿⣿⣿".into()], &mut buffer, &callback)
            .await;
        assert_eq!(start.elapsed(), Duration::ZERO);
        assert_eq!(buffer.texts(), vec!["⣿⣿⣿"]);
        assert!(buffer.lines()[0].raw);
    }

    #[tokio::test(start_paused = true)]
    async fn test_lines_render_in_handler_order() {
        let renderer = OutputRenderer::new(TypingConfig::default());
        let callback = RecordingCallback::new();
        let mut buffer = LineBuffer::new();
        renderer
            .render(
                vec!["one".into(), "".into(), "rick:art".into(), "two".into()],
                &mut buffer,
                &callback,
            )
            .await;
        assert_eq!(buffer.texts(), vec!["one", "", "art", "two"]);
    }

    #[test]
    fn test_scroll_follow_suspends_and_resumes() {
        let mut follow = ScrollFollow::default();
        assert!(follow.should_follow());
        follow.on_scroll(ScrollMetrics {
            scroll_top: 100.0,
            scroll_height: 1000.0,
            client_height: 400.0,
        });
        assert!(!follow.should_follow());
        follow.on_scroll(ScrollMetrics {
            scroll_top: 597.0,
            scroll_height: 1000.0,
            client_height: 400.0,
        });
        assert!(follow.should_follow());
    }

    #[test]
    fn test_scroll_follow_custom_tolerance() {
        let near_bottom = ScrollMetrics {
            scroll_top: 580.0,
            scroll_height: 1000.0,
            client_height: 400.0,
        };
        let mut strict = ScrollFollow::default();
        strict.on_scroll(near_bottom);
        assert!(!strict.should_follow());

        let mut loose = ScrollFollow::new(40.0);
        loose.on_scroll(near_bottom);
        assert!(loose.should_follow());
    }
}
