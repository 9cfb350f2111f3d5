// src/services/renderer.rs
//! Bubble rendering.
//!
//! Every bubble is appended after the previous one, so display order is
//! insertion order. Text is sanitised before it is written: a reply is data
//! and must never be able to move the cursor, clear the screen or retitle the
//! terminal.

use std::io::Write;

use tracing::warn;

use crate::message::Sender;

pub trait Renderer {
    /// Appends one bubble and brings it into view.
    fn append(&mut self, text: &str, sender: Sender);
}

impl<R: Renderer + ?Sized> Renderer for &mut R {
    fn append(&mut self, text: &str, sender: Sender) {
        (**self).append(text, sender)
    }
}

pub struct TerminalRenderer<W: Write> {
    out: W,
    rendered: usize,
}

impl TerminalRenderer<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out, rendered: 0 }
    }

    /// Number of bubbles written so far.
    pub fn rendered(&self) -> usize {
        self.rendered
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_bubble(&mut self, text: &str, sender: Sender) -> std::io::Result<()> {
        let clean = sanitize(text);
        let prefix = format!("{} {}: ", sender.avatar(), sender.label());
        // avatar is double width
        let indent = " ".repeat(prefix.chars().count() + 1);

        let mut lines = clean.split('\n');
        writeln!(self.out, "{prefix}{}", lines.next().unwrap_or_default())?;
        for line in lines {
            writeln!(self.out, "{indent}{line}")?;
        }
        // flushing keeps the newest bubble on screen
        self.out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn append(&mut self, text: &str, sender: Sender) {
        if let Err(e) = self.write_bubble(text, sender) {
            warn!(error = %e, "failed to write message to terminal");
            return;
        }
        self.rendered += 1;
    }
}

/// Strips terminal control sequences and control characters, keeping
/// newlines and tabs.
pub fn sanitize(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' | '\t' => out.push(c),
            '\u{1b}' => match chars.peek().copied() {
                // CSI: parameters then a final byte in @..~
                Some('[') => {
                    chars.next();
                    for c in chars.by_ref() {
                        if ('\u{40}'..='\u{7e}').contains(&c) {
                            break;
                        }
                    }
                }
                // OSC: terminated by BEL or ST (ESC \)
                Some(']') => {
                    chars.next();
                    while let Some(c) = chars.next() {
                        if c == '\u{07}' {
                            break;
                        }
                        if c == '\u{1b}' && chars.peek() == Some(&'\\') {
                            chars.next();
                            break;
                        }
                    }
                }
                // two-byte sequence; a following control char is handled on its own
                Some(c) if !c.is_control() => {
                    chars.next();
                }
                _ => {}
            },
            c if c.is_control() || is_bidi_control(c) => {}
            c => out.push(c),
        }
    }
    out
}

/// Embedding, override and isolate controls that can visually reorder text.
fn is_bidi_control(c: char) -> bool {
    matches!(c, '\u{200e}' | '\u{200f}' | '\u{202a}'..='\u{202e}' | '\u{2066}'..='\u{2069}')
}
