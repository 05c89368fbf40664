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

//! The completion trigger (C5): what runs when the editor receives the
//! completion key. Bridges the generator (C3's populator) and the menu
//! (C4) with the live editor buffer.

use crate::error::EngineError;
use crate::key::{KeyDecoder, TtyInput};
use crate::terminal::{DisplayWidth, EditorView, TerminalSink};

use super::{CandidateList, CompletionGenerator, CompletionMenu, MenuOutcome};

/// How many candidates to ask for on the initial trigger; matching this
/// exactly signals the generator may have more (see
/// [`super::menu::CompletionMenu::drive`]'s `more_available`).
const INITIAL_REQUEST_CAP: usize = 10;

/// Outcome of a completion-key press, for the editor main loop.
#[derive(Debug)]
pub enum TriggerOutcome {
    /// No candidates; the terminal was beeped and nothing else happened.
    NoCandidates,
    /// Exactly one candidate, applied directly.
    Applied,
    /// More than one candidate; the interactive menu ran and reports this.
    Menu(MenuOutcome),
}

/// Runs the C5 dispatch: on the completion key with `view.pos() > 0`, ask
/// the generator for candidates and either beep, auto-apply, or hand off to
/// the menu.
///
/// Callers are expected to have already checked `view.pos() > 0`; this
/// function does not re-check it; the `pos == 0` guard (nothing before the
/// cursor to complete) belongs to the editor main loop that knows why the
/// key was pressed.
#[allow(clippy::too_many_arguments)]
pub fn trigger_completion(
    menu: &CompletionMenu,
    decoder: &KeyDecoder,
    tty: &mut impl TtyInput,
    view: &mut impl EditorView,
    sink: &mut impl TerminalSink,
    generator: &mut dyn CompletionGenerator,
    display_width: &dyn DisplayWidth,
) -> Result<TriggerOutcome, EngineError> {
    let mut list = CandidateList::new();
    let input = view.input_buffer().to_string();
    let pos = view.pos();
    let count = generator.generate(view, &mut list, &input, pos, INITIAL_REQUEST_CAP);

    match count {
        0 => {
            sink.beep();
            Ok(TriggerOutcome::NoCandidates)
        }
        1 => {
            let new_pos = list.apply(0, view.input_buffer_mut(), pos);
            view.set_pos(new_pos);
            view.refresh()?;
            Ok(TriggerOutcome::Applied)
        }
        _ => {
            let more_available = count == INITIAL_REQUEST_CAP;
            let outcome = menu.drive(
                decoder,
                tty,
                view,
                sink,
                generator,
                &mut list,
                display_width,
                more_available,
            )?;
            Ok(TriggerOutcome::Menu(outcome))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::Candidate;
    use crate::config::{DecoderConfig, MenuConfig};
    use crate::key::ByteBuffer;
    use crate::terminal::UnicodeDisplayWidth;
    use std::time::Duration;

    struct FakeTty {
        incoming: std::collections::VecDeque<u8>,
        pending: ByteBuffer,
    }

    impl FakeTty {
        fn new(bytes: &[u8]) -> Self {
            Self {
                incoming: bytes.iter().copied().collect(),
                pending: ByteBuffer::new(),
            }
        }
    }

    impl TtyInput for FakeTty {
        fn read_blocking(&mut self) -> std::io::Result<u8> {
            if let Some(b) = self.pending.pop() {
                return Ok(b);
            }
            self.incoming
                .pop_front()
                .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::UnexpectedEof, "eof"))
        }
        fn read_nonblocking(&mut self, _deadline: Duration) -> std::io::Result<Option<u8>> {
            if let Some(b) = self.pending.pop() {
                return Ok(Some(b));
            }
            Ok(self.incoming.pop_front())
        }
        fn push_byte(&mut self, b: u8) {
            self.pending.push(b);
        }
        fn push_unicode(&mut self, u: char) {
            self.pending.push_unicode(u);
        }
        fn is_utf8(&self) -> bool {
            true
        }
    }

    struct FakeView {
        input: String,
        pos: usize,
        extra: String,
        refresh_count: usize,
    }

    impl EditorView for FakeView {
        fn input_buffer(&self) -> &str {
            &self.input
        }
        fn pos(&self) -> usize {
            self.pos
        }
        fn input_buffer_mut(&mut self) -> &mut String {
            &mut self.input
        }
        fn set_pos(&mut self, pos: usize) {
            self.pos = pos;
        }
        fn extra_buffer(&self) -> &str {
            &self.extra
        }
        fn set_extra_buffer(&mut self, content: String) {
            self.extra = content;
        }
        fn is_utf8(&self) -> bool {
            true
        }
        fn cur_rows(&self) -> usize {
            1
        }
        fn start_modify(&mut self) {}
        fn refresh(&mut self) -> std::io::Result<()> {
            self.refresh_count += 1;
            Ok(())
        }
        fn clear(&mut self) -> std::io::Result<()> {
            Ok(())
        }
        fn write_prompt(&mut self) -> std::io::Result<()> {
            Ok(())
        }
        fn show_help(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct FakeSink {
        width: usize,
        beeps: usize,
    }

    impl TerminalSink for FakeSink {
        fn write(&mut self, _bytes: &[u8]) -> std::io::Result<()> {
            Ok(())
        }
        fn width(&self) -> usize {
            self.width
        }
        fn beep(&mut self) {
            self.beeps += 1;
        }
        fn cursor_pos(&self) -> (u16, u16) {
            (0, 0)
        }
        fn erase_edited_region(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    /// Generator that always reports a fixed number of candidates, regardless
    /// of what the caller asks for.
    struct FixedGenerator(usize);

    impl CompletionGenerator for FixedGenerator {
        fn generate(
            &mut self,
            _view: &dyn EditorView,
            list: &mut CandidateList,
            _input: &str,
            _pos: usize,
            _cap: usize,
        ) -> usize {
            for i in 0..self.0 {
                list.push(Candidate::new(format!("cand{i}"), format!("cand{i}")));
            }
            self.0
        }
    }

    #[test]
    fn zero_candidates_beeps_and_reports_no_candidates() {
        let decoder = KeyDecoder::new(DecoderConfig::default());
        let menu = CompletionMenu::new(MenuConfig::default());
        let mut tty = FakeTty::new(b"");
        let mut view = FakeView {
            input: "fo".into(),
            pos: 2,
            extra: String::new(),
            refresh_count: 0,
        };
        let mut sink = FakeSink { width: 80, beeps: 0 };
        let mut generator = FixedGenerator(0);
        let width = UnicodeDisplayWidth;

        let outcome = trigger_completion(
            &menu, &decoder, &mut tty, &mut view, &mut sink, &mut generator, &width,
        )
        .unwrap();

        assert!(matches!(outcome, TriggerOutcome::NoCandidates));
        assert_eq!(sink.beeps, 1);
        assert_eq!(view.input, "fo");
    }

    #[test]
    fn single_candidate_is_applied_directly_without_a_menu() {
        let decoder = KeyDecoder::new(DecoderConfig::default());
        let menu = CompletionMenu::new(MenuConfig::default());
        let mut tty = FakeTty::new(b"");
        let mut view = FakeView {
            input: "fo".into(),
            pos: 2,
            extra: String::new(),
            refresh_count: 0,
        };
        let mut sink = FakeSink { width: 80, beeps: 0 };
        let mut generator = FixedGenerator(1);
        let width = UnicodeDisplayWidth;

        let outcome = trigger_completion(
            &menu, &decoder, &mut tty, &mut view, &mut sink, &mut generator, &width,
        )
        .unwrap();

        assert!(matches!(outcome, TriggerOutcome::Applied));
        assert_eq!(view.input, "focand0");
        assert_eq!(sink.beeps, 0);
        assert_eq!(view.refresh_count, 1);
    }

    #[test]
    fn multiple_candidates_hand_off_to_the_menu() {
        let decoder = KeyDecoder::new(DecoderConfig::default());
        let menu = CompletionMenu::new(MenuConfig::default());
        // Esc immediately cancels the menu.
        let mut tty = FakeTty::new(b"\x1b");
        let mut view = FakeView {
            input: "fo".into(),
            pos: 2,
            extra: String::new(),
            refresh_count: 0,
        };
        let mut sink = FakeSink { width: 80, beeps: 0 };
        let mut generator = FixedGenerator(3);
        let width = UnicodeDisplayWidth;

        let outcome = trigger_completion(
            &menu, &decoder, &mut tty, &mut view, &mut sink, &mut generator, &width,
        )
        .unwrap();

        assert!(matches!(outcome, TriggerOutcome::Menu(MenuOutcome::Cancelled)));
        assert_eq!(view.input, "fo");
    }
}
