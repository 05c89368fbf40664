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

//! The completion menu driver (C4): layout, selection state machine, and
//! show-all pagination, ported from `editline_completion.c`'s
//! `edit_completion_menu` (see `examples/original_source/` in this
//! workspace's reference pack).

use crate::config::MenuConfig;
use crate::error::EngineError;
use crate::key::{KeyBase, KeyCode, KeyDecoder, TtyInput};
use crate::terminal::{DisplayWidth, EditorView, TerminalSink};

use super::{CandidateList, CompletionGenerator};

/// How the menu is currently laid out; recomputed fresh on every redraw
/// from `(width, candidates, is_utf8)` rather than cached, the same way the
/// original always re-measures `Wmax` from the displayed slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    pub columns: usize,
    pub rows: usize,
    /// How far a RIGHT/LEFT press moves the selection (one column over).
    pub percolumn: usize,
    /// Column width in terminal columns, including padding. 0 for the
    /// single-column fallback, which pads nothing.
    pub stride: usize,
    /// How many of the candidates are actually shown this redraw.
    pub displayed_count: usize,
}

/// How a [`CompletionMenu::drive`] call ended.
#[derive(Debug)]
pub enum MenuOutcome {
    /// A candidate was applied; the input buffer and cursor were updated.
    Applied,
    /// ESC cancelled the menu; input buffer is unchanged.
    Cancelled,
    /// Show-all rendered the full list and the menu exited without
    /// selecting anything; input buffer is unchanged.
    ShowedAll,
    /// An unrecognised key was pushed back for the outer loop.
    Deferred(KeyCode),
}

pub struct CompletionMenu {
    cfg: MenuConfig,
}

impl CompletionMenu {
    pub fn new(cfg: MenuConfig) -> Self {
        Self { cfg }
    }

    /// Chooses 3-column, 2-column, or 1-column layout per spec.md §4.4,
    /// sampling `Wmax` from the first `min(count, 9)` candidates regardless
    /// of which layout ends up chosen.
    pub fn layout(
        &self,
        width: usize,
        list: &CandidateList,
        display_width: &dyn DisplayWidth,
    ) -> Layout {
        let n = list.count();
        let sample = n.min(9);
        let wmax = (0..sample)
            .map(|i| {
                list.get_display(i)
                    .map(|s| display_width.width(s))
                    .unwrap_or(0)
            })
            .max()
            .unwrap_or(0);

        if n > 3
            && width > usize::from(self.cfg.three_col_min_width)
            && wmax <= self.cfg.three_col_max_entry_width
        {
            let displayed_count = n.min(9);
            Layout {
                columns: 3,
                rows: 3,
                percolumn: 3,
                stride: self.cfg.three_col_stride,
                displayed_count,
            }
        } else if n > 4
            && width > usize::from(self.cfg.two_col_min_width)
            && wmax <= self.cfg.two_col_max_entry_width
        {
            let displayed_count = n.min(8);
            let rows = if displayed_count <= 6 { 3 } else { 4 };
            Layout {
                columns: 2,
                rows,
                percolumn: rows,
                stride: self.cfg.two_col_stride,
                displayed_count,
            }
        } else {
            let displayed_count = n.min(9);
            Layout {
                columns: 1,
                rows: displayed_count,
                percolumn: displayed_count.max(1),
                stride: 0,
                displayed_count,
            }
        }
    }

    /// Renders one cell: `"<marker><1-based index> <display>"`, truncated
    /// and prefixed with `"..."` if it would overflow `col_width`, then
    /// padded to `col_width` (0 means "no padding", used by the 1-column
    /// fallback).
    fn render_cell(
        &self,
        index: usize,
        list: &CandidateList,
        selected: usize,
        is_utf8: bool,
        col_width: usize,
        display_width: &dyn DisplayWidth,
    ) -> String {
        let marker = if index == selected {
            if is_utf8 {
                '\u{2192}'
            } else {
                '*'
            }
        } else {
            ' '
        };
        let label = format!("{marker}{} ", index + 1);
        let display = list.get_display(index).unwrap_or("");

        let shown = if col_width == 0 {
            display.to_string()
        } else {
            let prefix_width = display_width.width(&label);
            let avail = col_width.saturating_sub(prefix_width);
            if display_width.width(display) > avail {
                let tail = truncate_to_width_keep_tail(display, avail.saturating_sub(3), display_width);
                format!("...{tail}")
            } else {
                display.to_string()
            }
        };

        let mut cell = format!("{label}{shown}");
        if col_width > 0 {
            let cell_width = display_width.width(&cell);
            if cell_width < col_width {
                cell.push_str(&" ".repeat(col_width - cell_width));
            }
        }
        cell
    }

    /// Renders the full grid (and, if `list.count()` exceeds what's shown,
    /// a dim hint that shift-TAB reveals the rest) as the view's extra
    /// buffer.
    fn render_grid(
        &self,
        list: &CandidateList,
        selected: usize,
        is_utf8: bool,
        layout: Layout,
        display_width: &dyn DisplayWidth,
    ) -> String {
        let mut out = String::new();
        for row in 0..layout.rows {
            if row > 0 {
                out.push('\n');
            }
            for col in 0..layout.columns {
                let index = col * layout.rows + row;
                if index >= layout.displayed_count {
                    continue;
                }
                out.push_str(&self.render_cell(
                    index,
                    list,
                    selected,
                    is_utf8,
                    layout.stride,
                    display_width,
                ));
            }
        }
        if list.count() > layout.displayed_count {
            out.push_str("\r\n\x1b[90m(press shift-tab to see all ");
            out.push_str(&list.count().to_string());
            out.push_str(" candidates)\x1b[0m");
        }
        out
    }

    /// Drives the interactive menu to completion: layout → render → read a
    /// key → dispatch → loop, until the selection is applied, cancelled, or
    /// an unhandled key needs to go back to the outer loop.
    #[allow(clippy::too_many_arguments)]
    pub fn drive(
        &self,
        decoder: &KeyDecoder,
        tty: &mut impl TtyInput,
        view: &mut impl EditorView,
        sink: &mut impl TerminalSink,
        generator: &mut dyn CompletionGenerator,
        list: &mut CandidateList,
        display_width: &dyn DisplayWidth,
        mut more_available: bool,
    ) -> Result<MenuOutcome, EngineError> {
        let mut selected = 0usize;

        loop {
            let layout = self.layout(sink.width(), list, display_width);
            if selected >= layout.displayed_count {
                selected = layout.displayed_count.saturating_sub(1);
            }
            view.start_modify();
            let grid = self.render_grid(list, selected, view.is_utf8(), layout, display_width);
            view.set_extra_buffer(grid);
            view.refresh()?;

            let key = decoder.read_key(tty);
            match key.base {
                KeyBase::Char(c) if c.is_ascii_digit() && c != '0' => {
                    let idx = usize::from(c as u8 - b'1');
                    if idx < list.count() {
                        selected = idx;
                        return self.apply_and_exit(view, list, selected);
                    }
                    sink.beep();
                }
                KeyBase::Space => {
                    return self.apply_and_exit(view, list, selected);
                }
                KeyBase::Tab | KeyBase::Down => {
                    selected = (selected + 1) % layout.displayed_count;
                }
                KeyBase::Up => {
                    selected = (selected + layout.displayed_count - 1) % layout.displayed_count;
                }
                KeyBase::Right if layout.columns > 1 => {
                    if selected + layout.percolumn < layout.displayed_count {
                        selected += layout.percolumn;
                    } else {
                        sink.beep();
                    }
                }
                KeyBase::Left if layout.columns > 1 => {
                    if selected >= layout.percolumn {
                        selected -= layout.percolumn;
                    } else {
                        sink.beep();
                    }
                }
                KeyBase::Home => selected = 0,
                KeyBase::End => selected = layout.displayed_count - 1,
                KeyBase::F(1) => {
                    view.show_help()?;
                }
                KeyBase::Esc => {
                    list.clear();
                    view.refresh()?;
                    return Ok(MenuOutcome::Cancelled);
                }
                KeyBase::Enter => {
                    return self.apply_and_exit(view, list, selected);
                }
                KeyBase::ShiftTab | KeyBase::Linefeed | KeyBase::PageDown if list.count() > 9 => {
                    self.show_all(view, sink, generator, list, display_width, &mut more_available)?;
                    list.clear();
                    return Ok(MenuOutcome::ShowedAll);
                }
                _ => {
                    return Ok(MenuOutcome::Deferred(key));
                }
            }
        }
    }

    fn apply_and_exit(
        &self,
        view: &mut impl EditorView,
        list: &mut CandidateList,
        selected: usize,
    ) -> Result<MenuOutcome, EngineError> {
        let pos = view.pos();
        let new_pos = list.apply(selected, view.input_buffer_mut(), pos);
        view.set_pos(new_pos);
        list.clear();
        view.refresh()?;
        Ok(MenuOutcome::Applied)
    }

    /// Show-all mode: if the generator indicated more might be available,
    /// re-ask it with the global cap, then render every candidate on its
    /// own line (padding trailing blank rows to the previous row count so
    /// the prompt doesn't stack) rather than the paginated grid.
    fn show_all(
        &self,
        view: &mut impl EditorView,
        sink: &mut impl TerminalSink,
        generator: &mut dyn CompletionGenerator,
        list: &mut CandidateList,
        _display_width: &dyn DisplayWidth,
        more_available: &mut bool,
    ) -> Result<(), EngineError> {
        let previous_rows = view.cur_rows();
        let input = view.input_buffer().to_string();
        let pos = view.pos();

        if *more_available {
            list.clear();
            let cap = self.cfg.max_completions_to_show;
            let count = generator.generate(view, list, &input, pos, cap);
            *more_available = count == cap;
        }

        view.clear()?;
        view.write_prompt()?;

        let mut out = String::new();
        let shown = list.count().min(self.cfg.max_completions_to_show);
        let mut rendered_rows = 0usize;
        for i in 0..shown {
            let Some(display) = list.get_display(i) else {
                continue;
            };
            out.push_str(display);
            out.push_str("\r\n");
            rendered_rows += 1;
        }
        if *more_available {
            out.push_str("\x1b[90m... and more.\x1b[0m\r\n");
            rendered_rows += 1;
        }

        for _ in rendered_rows..previous_rows {
            out.push_str("\r\n");
        }

        view.start_modify();
        view.set_extra_buffer(out);
        view.refresh()?;
        let _ = sink; // show-all writes entirely through the view/refresh path
        Ok(())
    }
}

/// Keeps the trailing `target` display columns of `s`, breaking on a char
/// boundary, the way `str_skip_until_fit` skips leading characters so the
/// ellipsis elides the start of the string rather than the end.
fn truncate_to_width_keep_tail(s: &str, target: usize, display_width: &dyn DisplayWidth) -> String {
    let mut result = String::new();
    let mut width = 0usize;
    for ch in s.chars().rev() {
        let ch_width = display_width.width(&ch.to_string());
        if width + ch_width > target {
            break;
        }
        result.push(ch);
        width += ch_width;
    }
    result.chars().rev().collect()
}
