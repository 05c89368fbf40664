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

use std::io;

/// Errors that can escape this crate's public API.
///
/// Per the decoder and menu contracts, an unrecognised escape sequence, an
/// empty candidate list, and a truncated/timed-out sequence are all
/// observable-but-non-fatal outcomes and are reported as ordinary return
/// values ([`crate::KeyCode::NONE`], a beep, a best-effort fallback key) —
/// never as an [`EngineError`]. This type exists for the edges that really
/// can fail: terminal I/O and the caller-supplied completion generator.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// An I/O error occurred while reading from or writing to the terminal.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// The completion generator reported a failure.
    #[error("completion generator failed: {0}")]
    Generator(String),
}