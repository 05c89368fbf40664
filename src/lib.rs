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

//! `rline_core` is the interactive-input engine underneath a readline-style line
//! editor: it turns raw TTY bytes into logical key codes, and drives an
//! interactive tab-completion menu on top of them.
//!
//! # What this crate is
//!
//! 1. A terminal escape-sequence decoder ([`key`]) that reconciles a dozen
//!    incompatible terminal dialects (vt100/vt52, xterm, SS3, Linux console,
//!    Mach, Eterm/rxvt, Haiku, iTerm2, minicom) behind one [`KeyCode`] grammar.
//! 2. A completion UI ([`completion`]) that renders an interactive
//!    multi-column/selectable menu over a candidate list, drives key-based
//!    navigation, and applies the chosen completion back into the caller's
//!    input buffer.
//!
//! # What this crate is not
//!
//! Raw-mode TTY setup, terminal geometry beyond menu layout, the editor's own
//! buffer/redraw/cursor math, history search, and help overlay rendering are
//! all out of scope here; they show up only as the [`EditorView`],
//! [`TerminalSink`] and [`CompletionGenerator`] traits this crate consumes.
//!
//! # Concurrency
//!
//! Single-threaded and synchronous. There is one input stream and one output
//! stream, read and written to from the same thread that calls
//! [`key::KeyDecoder::read_key`]; the only suspension point is the blocking
//! byte read.

pub mod completion;
pub mod config;
pub mod error;
pub mod key;
pub mod terminal;

pub use completion::{Candidate, CandidateList, CompletionGenerator, CompletionMenu};
pub use config::{DecoderConfig, MenuConfig};
pub use error::EngineError;
pub use key::{ByteBuffer, KeyBase, KeyCode, KeyDecoder, Modifiers, RawFdInput, TtyInput};
pub use terminal::{CrosstermTerminalSink, DisplayWidth, EditorView, TerminalSink, UnicodeDisplayWidth};

/// Hard cap on how many candidates show-all mode will ever generate or render
/// in one pass (spec §6, bit-exact).
pub const MAX_COMPLETIONS_TO_SHOW: usize = 1000;