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

//! C3 (completion store), C4 (menu driver) and C5 (trigger): the
//! interactive tab-completion UI built on top of the key decoder.

mod candidate;
mod menu;
mod trigger;

pub use candidate::{Candidate, CandidateList};
pub use menu::{CompletionMenu, Layout, MenuOutcome};
pub use trigger::trigger_completion;

use crate::terminal::EditorView;

/// The source of candidates, supplied by the embedding editor. Opaque here:
/// this crate only calls it and applies what comes back.
pub trait CompletionGenerator {
    /// Populate `list` with up to `cap` candidates for `input`/`pos`; return
    /// the actual count produced (which may be less than `cap`, or exactly
    /// `cap` to signal more are available).
    fn generate(
        &mut self,
        view: &dyn EditorView,
        list: &mut CandidateList,
        input: &str,
        pos: usize,
        cap: usize,
    ) -> usize;
}
