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

use std::ops::BitOr;

bitflags::bitflags! {
    /// OR-combined modifier bits that can accompany a [`KeyCode`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const SHIFT = 0b001;
        const ALT   = 0b010;
        const CTRL  = 0b100;
    }
}

/// The base of a [`KeyCode`]: either a printable/control Unicode scalar, or
/// one of the reserved sentinels that has no direct codepoint (arrow keys,
/// function keys, and the handful of named control keys the decoder must
/// distinguish from a literal character).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyBase {
    /// No key was decoded; the decoder re-pushed whatever bytes it read.
    None,
    /// A printable character, or a raw control byte with no dedicated
    /// sentinel below (e.g. `Ctrl-\``).
    Char(char),
    Up,
    Down,
    Left,
    Right,
    Home,
    End,
    Ins,
    Del,
    PageUp,
    PageDown,
    Tab,
    ShiftTab,
    Enter,
    Linefeed,
    Esc,
    Space,
    /// Function key, `1..=20`.
    F(u8),
}

/// A logical key: a [`KeyBase`] plus the [`Modifiers`] held down while it was
/// produced.
///
/// Invariant: for any [`KeyCode`] emitted by [`crate::key::KeyDecoder`],
/// either `base != KeyBase::None`, or the decoder pushed the unrecognised
/// bytes back and emitted nothing (callers never see `NONE` from a
/// successful read; it exists for internal table lookups and tests).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyCode {
    pub base: KeyBase,
    pub mods: Modifiers,
}

impl KeyCode {
    pub const NONE: KeyCode = KeyCode {
        base: KeyBase::None,
        mods: Modifiers::empty(),
    };

    pub const fn new(base: KeyBase) -> Self {
        Self {
            base,
            mods: Modifiers::empty(),
        }
    }

    pub const fn with_mods(base: KeyBase, mods: Modifiers) -> Self {
        Self { base, mods }
    }

    pub const fn char(c: char) -> Self {
        Self::new(KeyBase::Char(c))
    }

    pub fn is_none(&self) -> bool {
        self.base == KeyBase::None
    }

    #[must_use]
    pub fn with_ctrl(mut self) -> Self {
        self.mods |= Modifiers::CTRL;
        self
    }

    #[must_use]
    pub fn with_alt(mut self) -> Self {
        self.mods |= Modifiers::ALT;
        self
    }

    #[must_use]
    pub fn with_shift(mut self) -> Self {
        self.mods |= Modifiers::SHIFT;
        self
    }
}

impl From<KeyBase> for KeyCode {
    fn from(base: KeyBase) -> Self {
        KeyCode::new(base)
    }
}

impl BitOr<Modifiers> for KeyBase {
    type Output = KeyCode;
    fn bitor(self, mods: Modifiers) -> KeyCode {
        KeyCode::with_mods(self, mods)
    }
}

impl BitOr<Modifiers> for KeyCode {
    type Output = KeyCode;
    fn bitor(mut self, mods: Modifiers) -> KeyCode {
        self.mods |= mods;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keycode_none_has_no_base() {
        assert!(KeyCode::NONE.is_none());
    }

    #[test]
    fn bitor_combines_modifiers_onto_a_base() {
        let key = KeyBase::Up | Modifiers::CTRL;
        assert_eq!(key, KeyCode::with_mods(KeyBase::Up, Modifiers::CTRL));
    }

    #[test]
    fn modifiers_combine_via_bitor() {
        let m = Modifiers::SHIFT | Modifiers::CTRL;
        assert!(m.contains(Modifiers::SHIFT));
        assert!(m.contains(Modifiers::CTRL));
        assert!(!m.contains(Modifiers::ALT));
    }
}