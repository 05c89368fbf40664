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

//! C1 (byte source) and C2 (key decoder): turning raw TTY bytes into
//! [`KeyCode`]s.

mod byte_source;
mod decoder;
mod keycode;

pub use byte_source::{ByteBuffer, RawFdInput, TtyInput};
pub use decoder::KeyDecoder;
pub use keycode::{KeyBase, KeyCode, Modifiers};