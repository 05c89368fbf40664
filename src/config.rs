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

//! Plain configuration structs, in the same style as the teacher crate's
//! `TracingConfig`/`WriterConfig`: a struct with documented fields and a
//! sensible `Default`, rather than a builder or DSL.

use std::time::Duration;

/// Tunables for [`crate::key::KeyDecoder`].
#[derive(Debug, Clone, Copy)]
pub struct DecoderConfig {
    /// How long [`crate::key::TtyInput::read_nonblocking`] may idle before the
    /// decoder gives up on completing an escape sequence and falls back to a
    /// lone `KEY_ESC` / `Alt+<char>`.
    ///
    /// Spec open question: values below ~50ms risk misclassifying a slow
    /// paste of a multi-byte sequence as separate keystrokes; values much
    /// higher than 100ms introduce visible lag on a lone ESC press.
    pub esc_timeout: Duration,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            esc_timeout: Duration::from_millis(100),
        }
    }
}

/// Layout thresholds for [`crate::completion::CompletionMenu`], overridable
/// but defaulting to the spec's literal constants.
#[derive(Debug, Clone, Copy)]
pub struct MenuConfig {
    /// Minimum terminal width to consider the 3-column layout.
    pub three_col_min_width: u16,
    /// Maximum display width (in columns) of any of the first 9 candidates
    /// for the 3-column layout to be used.
    pub three_col_max_entry_width: usize,
    /// Column stride (cell width including padding) in the 3-column layout.
    pub three_col_stride: usize,

    /// Minimum terminal width to consider the 2-column layout.
    pub two_col_min_width: u16,
    /// Maximum display width of any of the first 8 candidates for the
    /// 2-column layout to be used.
    pub two_col_max_entry_width: usize,
    /// Column stride in the 2-column layout.
    pub two_col_stride: usize,

    /// Absolute cap on how many candidates show-all mode will request/render.
    pub max_completions_to_show: usize,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            three_col_min_width: 79,
            three_col_max_entry_width: 22,
            three_col_stride: 25,

            two_col_min_width: 78,
            two_col_max_entry_width: 35,
            two_col_stride: 38,

            max_completions_to_show: crate::MAX_COMPLETIONS_TO_SHOW,
        }
    }
}