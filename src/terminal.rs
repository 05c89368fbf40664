/*
 *   Copyright (c) 2024 R3BL LLC
 *   All rights reserved.
 *
 *   Licensed under the Apache License, Version 2.0 (the "License");
 *   you may not use this file except in compliance with the License.
 *   You may obtain a copy of the License at
 *
 *   http://www.apache.org/licenses/LICENSE-2.0
 *
 *   Unless required by applicable law or agreed to in writing, software
 *   distributed under the License is distributed on an "AS IS" BASIS,
 *   WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
 *   See the License for the specific language governing permissions and
 *   limitations under the License.
 */

//! The collaborator traits the menu driver and editor trigger consume, but
//! never owns: raw-mode setup, terminal writes, and the editor's own buffer
//! all live on the other side of these traits.

use unicode_width::UnicodeWidthStr;

/// Column-width measurement, consumed rather than implemented by the menu so
/// an embedding editor can swap in its own (e.g. one that accounts for a
/// custom emoji-width table).
pub trait DisplayWidth {
    /// Width of `s` in terminal columns, not bytes.
    fn width(&self, s: &str) -> usize;
}

/// The default [`DisplayWidth`], backed by `unicode-width` the same way the
/// teacher crate's `line.rs` measures the input line directly with
/// `UnicodeWidthStr::width`.
#[derive(Debug, Default, Clone, Copy)]
pub struct UnicodeDisplayWidth;

impl DisplayWidth for UnicodeDisplayWidth {
    fn width(&self, s: &str) -> usize {
        UnicodeWidthStr::width(s)
    }
}

/// The terminal write/geometry/beep surface the menu drives through. All
/// colour/attribute changes go through SGR sequences emitted verbatim by
/// callers of this trait, never computed here.
pub trait TerminalSink {
    /// Write raw bytes (already-formatted escape sequences and text) to the
    /// terminal.
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()>;

    /// Current terminal width in columns.
    fn width(&self) -> usize;

    /// Ring the terminal bell.
    fn beep(&mut self);

    /// `(row, col)` of the cursor as of the editor's last refresh.
    fn cursor_pos(&self) -> (u16, u16);

    /// Erase whatever the editor last drew (input line plus any extra
    /// buffer rows) so the menu can redraw in its place.
    fn erase_edited_region(&mut self) -> std::io::Result<()>;
}

/// The editor's own buffer and redraw hooks, opaque to this crate beyond
/// this contract (spec data model's "Editor view context").
pub trait EditorView {
    /// Current input buffer contents.
    fn input_buffer(&self) -> &str;

    /// Current byte cursor position within [`Self::input_buffer`].
    fn pos(&self) -> usize;

    /// Mutable access to the input buffer, for applying a completion or a
    /// trigger's direct edit.
    fn input_buffer_mut(&mut self) -> &mut String;

    /// Move the cursor to a new byte position within [`Self::input_buffer`].
    fn set_pos(&mut self, pos: usize);

    /// Scratch buffer rendered below the input line (e.g. the completion
    /// menu's own grid).
    fn extra_buffer(&self) -> &str;

    /// Replace [`Self::extra_buffer`] wholesale. Rendering is purely
    /// additive to this buffer followed by a full redraw, never an
    /// in-place edit of what's already on screen, so each redraw recomputes
    /// the whole thing rather than mutating it incrementally.
    fn set_extra_buffer(&mut self, content: String);

    /// Whether the terminal's encoding is UTF-8.
    fn is_utf8(&self) -> bool;

    /// How many rows the last refresh occupied, used by show-all mode to pad
    /// trailing blank rows so prompts do not stack.
    fn cur_rows(&self) -> usize;

    /// Called before the menu starts mutating [`Self::extra_buffer`].
    fn start_modify(&mut self);

    /// Full redraw: prompt, input buffer, and extra buffer.
    fn refresh(&mut self) -> std::io::Result<()>;

    /// Erase everything this view last drew.
    fn clear(&mut self) -> std::io::Result<()>;

    /// Re-emit the prompt line.
    fn write_prompt(&mut self) -> std::io::Result<()>;

    /// Render the F1 help overlay.
    fn show_help(&mut self) -> std::io::Result<()>;
}

/// A [`TerminalSink`] writing straight to stdout via `crossterm`, the way
/// the teacher crate's `readline_async.rs` queues cursor/clear commands
/// directly against stdout rather than through a buffered writer.
///
/// Assumes the terminal is already in raw mode; this type does not toggle
/// it (raw-mode ownership belongs to the embedding editor session).
pub struct CrosstermTerminalSink {
    stdout: std::io::Stdout,
}

impl CrosstermTerminalSink {
    pub fn new() -> Self {
        Self {
            stdout: std::io::stdout(),
        }
    }
}

impl Default for CrosstermTerminalSink {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalSink for CrosstermTerminalSink {
    fn write(&mut self, bytes: &[u8]) -> std::io::Result<()> {
        use std::io::Write;
        self.stdout.write_all(bytes)?;
        self.stdout.flush()
    }

    fn width(&self) -> usize {
        crossterm::terminal::size()
            .map(|(cols, _rows)| usize::from(cols))
            .unwrap_or(80)
    }

    fn beep(&mut self) {
        let _ = self.write(b"\x07");
    }

    fn cursor_pos(&self) -> (u16, u16) {
        crossterm::cursor::position()
            .map(|(col, row)| (row, col))
            .unwrap_or((0, 0))
    }

    fn erase_edited_region(&mut self) -> std::io::Result<()> {
        use crossterm::{cursor, terminal, QueueableCommand};
        use std::io::Write;
        self.stdout
            .queue(cursor::MoveToColumn(0))?
            .queue(terminal::Clear(terminal::ClearType::FromCursorDown))?;
        self.stdout.flush()
    }
}
