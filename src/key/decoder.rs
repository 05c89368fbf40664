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

//! The key decoder (C2): turns a byte stream from [`TtyInput`] into a
//! stream of [`KeyCode`]s.
//!
//! The ESC sub-state-machine and its dialect-normalisation rules are ported
//! bit-for-bit from `tty_esc.c`'s `tty_read_esc`/`tty_read_csi` (see
//! `examples/original_source/src/tty_esc.c` in this workspace's reference
//! pack) rather than re-derived from the prose grammar, so the finals→key
//! tables below match the original terminal-dialect research exactly.

use super::byte_source::TtyInput;
use super::keycode::{KeyBase, KeyCode, Modifiers};
use crate::config::DecoderConfig;

/// Cap on how many decimal digits a single CSI parameter may contribute,
/// bounding how much attacker-controlled input a single sequence can make
/// the decoder read (spec §4.2.1 rule 5).
const MAX_CSI_PARAM_DIGITS: u8 = 16;

/// Decodes [`KeyCode`]s from a [`TtyInput`] byte source.
pub struct KeyDecoder {
    cfg: DecoderConfig,
}

impl KeyDecoder {
    pub fn new(cfg: DecoderConfig) -> Self {
        Self { cfg }
    }

    /// Blocks for at least one byte, then optionally reads more under
    /// `cfg.esc_timeout` to complete a sequence.
    pub fn read_key(&self, tty: &mut impl TtyInput) -> KeyCode {
        let b = match tty.read_blocking() {
            Ok(b) => b,
            Err(_) => return KeyCode::NONE,
        };
        match b {
            0x1B => self.read_esc(tty),
            0x09 => KeyCode::new(KeyBase::Tab),
            0x0A => KeyCode::new(KeyBase::Linefeed),
            0x0D => KeyCode::new(KeyBase::Enter),
            0x7F => KeyCode::char('\u{7f}'),
            0x20 => KeyCode::new(KeyBase::Space),
            1..=0x1A => KeyCode::char((b'a' + (b - 1)) as char).with_ctrl(),
            _ => self.read_utf8(b, tty),
        }
    }

    fn read_esc(&self, tty: &mut impl TtyInput) -> KeyCode {
        let peek = match tty.read_nonblocking(self.cfg.esc_timeout) {
            Ok(Some(b)) => b,
            _ => return KeyCode::new(KeyBase::Esc),
        };
        match peek {
            b'[' => self.read_csi_or_ss3(tty, b'['),
            b'O' | b'o' | b'?' => self.read_csi_or_ss3(tty, peek),
            _ => self.read_utf8(peek, tty).with_alt(),
        }
    }

    /// Having seen `ESC c1` where `c1` is one of `[`, `O`, `o`, `?` (vt52,
    /// aliased to SS3), read the byte after it and hand off to
    /// [`Self::read_csi`].
    fn read_csi_or_ss3(&self, tty: &mut impl TtyInput, c1: u8) -> KeyCode {
        let c1 = if c1 == b'?' { b'O' } else { c1 };
        match tty.read_nonblocking(self.cfg.esc_timeout) {
            Ok(Some(peek)) => self.read_csi(tty, c1, peek),
            _ => KeyCode::char(c1 as char).with_alt(),
        }
    }

    /// Parses `special? n1 (';' n2)? final` and normalises it to one of the
    /// vt/xterm/SS3 final-byte tables.
    fn read_csi(&self, tty: &mut impl TtyInput, mut c1: u8, mut peek: u8) -> KeyCode {
        let mut special = 0u8;
        if matches!(peek, b':' | b'<' | b'=' | b'>' | b'?' | b'[') {
            special = peek;
            match tty.read_nonblocking(self.cfg.esc_timeout) {
                Ok(Some(b)) => peek = b,
                _ => {
                    tty.push_byte(special);
                    return KeyCode::char(c1 as char).with_alt();
                }
            }
        }

        // xterm: `ESC [ O [P-S]` is F1-F4; treat the `O` as a special marker.
        if c1 == b'[' && peek == b'O' {
            if let Ok(Some(b)) = tty.read_nonblocking(self.cfg.esc_timeout) {
                if (b'P'..=b'S').contains(&b) {
                    special = b'O';
                    peek = b;
                } else {
                    tty.push_byte(b);
                    peek = b'O';
                }
            }
        }

        let mut num1 = 1u32;
        let mut num2 = 1u32;
        peek = self.read_csi_num(tty, peek, &mut num1);
        if peek == b';' {
            match tty.read_nonblocking(self.cfg.esc_timeout) {
                Ok(Some(b)) => peek = b,
                _ => return KeyCode::NONE,
            }
            peek = self.read_csi_num(tty, peek, &mut num2);
        }

        let mut final_byte = peek;
        let mut mods = Modifiers::empty();

        if (final_byte == b'@' || final_byte == b'9') && c1 == b'[' && num1 == 1 {
            num1 = if final_byte == b'@' { 3 } else { 2 }; // Mach DEL / INS
            final_byte = b'~';
        } else if matches!(final_byte, b'^' | b'$' | b'@') {
            // Eterm/rxvt/urxvt non-canonical modifier finals.
            if final_byte == b'^' {
                mods |= Modifiers::CTRL;
            }
            if final_byte == b'$' {
                mods |= Modifiers::SHIFT;
            }
            if final_byte == b'@' {
                mods |= Modifiers::SHIFT | Modifiers::CTRL;
            }
            final_byte = b'~';
        }

        if c1 == b'[' && special == b'[' && (b'A'..=b'E').contains(&final_byte) {
            final_byte = b'M' + (final_byte - b'A'); // Linux F1-F5
        } else if c1 == b'[' && (b'a'..=b'd').contains(&final_byte) {
            mods |= Modifiers::SHIFT; // Eterm shift+cursor
            final_byte = b'A' + (final_byte - b'a');
        } else if c1 == b'o' && (b'a'..=b'd').contains(&final_byte) {
            c1 = b'['; // Eterm ctrl+cursor
            mods |= Modifiers::CTRL;
            final_byte = b'A' + (final_byte - b'a');
        } else if c1 == b'O' && num2 == 1 && num1 > 1 && num1 <= 8 {
            // Haiku puts the modifier in the first parameter.
            num2 = num1;
            num1 = 1;
        }

        if num2 > 1 && num2 <= 9 {
            if num2 == 9 {
                num2 = 3; // iTerm2 anomaly
            }
            num2 -= 1;
            if num2 & 0x1 != 0 {
                mods |= Modifiers::SHIFT;
            }
            if num2 & 0x2 != 0 {
                mods |= Modifiers::ALT;
            }
            if num2 & 0x4 != 0 {
                mods |= Modifiers::CTRL;
            }
        }

        if final_byte == b'u' && c1 == b'[' {
            // Direct Unicode escape: push the scalar back as UTF-8 and let
            // the ordinary UTF-8 path assemble it, so a multi-byte scalar
            // drains exactly as many continuation bytes as it encoded.
            let scalar = char::from_u32(num1).unwrap_or('\u{FFFD}');
            tty.push_unicode(scalar);
            return match tty.read_blocking() {
                Ok(lead) => self.read_utf8(lead, tty),
                Err(_) => KeyCode::NONE,
            };
        }

        let base = if final_byte == b'~' {
            Self::decode_vt(num1)
        } else if c1 == b'O' && final_byte.is_ascii_alphabetic() {
            Self::decode_ss3(final_byte)
        } else if num1 == 1 && final_byte.is_ascii_uppercase() {
            Self::decode_xterm(final_byte)
        } else {
            KeyBase::None
        };

        if base == KeyBase::None {
            tracing::trace!(
                c1 = %(c1 as char),
                num1,
                num2,
                final_byte = %(final_byte as char),
                "rline_core: ignored escape sequence"
            );
            return KeyCode::NONE;
        }
        KeyCode::with_mods(base, mods)
    }

    /// Parses up to [`MAX_CSI_PARAM_DIGITS`] decimal digits starting at
    /// `peek`, advancing past them. Returns the first non-digit byte and
    /// writes the parsed value (or leaves `num` at its default of 1).
    fn read_csi_num(&self, tty: &mut impl TtyInput, mut peek: u8, num: &mut u32) -> u8 {
        let mut acc: u32 = 0;
        let mut count = 0u8;
        while peek.is_ascii_digit() && count < MAX_CSI_PARAM_DIGITS {
            let digit = u32::from(peek - b'0');
            match tty.read_nonblocking(self.cfg.esc_timeout) {
                Ok(Some(b)) => peek = b,
                _ => break,
            }
            count += 1;
            acc = 10 * acc + digit;
        }
        if count > 0 {
            *num = acc;
        }
        peek
    }

    fn decode_vt(vt_code: u32) -> KeyBase {
        match vt_code {
            1 | 7 => KeyBase::Home,
            2 => KeyBase::Ins,
            3 => KeyBase::Del,
            4 | 8 => KeyBase::End,
            5 => KeyBase::PageUp,
            6 => KeyBase::PageDown,
            10..=15 => KeyBase::F(1 + (vt_code - 10) as u8),
            16 => KeyBase::F(5), // minicom
            17..=21 => KeyBase::F(6 + (vt_code - 17) as u8),
            23..=26 => KeyBase::F(11 + (vt_code - 23) as u8),
            28..=29 => KeyBase::F(15 + (vt_code - 28) as u8),
            31..=34 => KeyBase::F(17 + (vt_code - 31) as u8),
            _ => KeyBase::None,
        }
    }

    fn decode_xterm(code: u8) -> KeyBase {
        match code {
            b'A' => KeyBase::Up,
            b'B' => KeyBase::Down,
            b'C' => KeyBase::Right,
            b'D' => KeyBase::Left,
            b'E' => KeyBase::Char('5'), // numpad 5
            b'F' => KeyBase::End,
            b'H' => KeyBase::Home,
            b'Z' => KeyBase::ShiftTab,
            b'I' => KeyBase::PageUp, // FreeBSD
            b'L' => KeyBase::Ins,
            b'M' => KeyBase::F(1),
            b'N' => KeyBase::F(2),
            b'O' => KeyBase::F(3),
            b'P' => KeyBase::F(4),
            b'Q' => KeyBase::F(5),
            b'R' => KeyBase::F(6),
            b'S' => KeyBase::F(7),
            b'T' => KeyBase::F(8),
            b'U' => KeyBase::PageDown, // Mach
            b'V' => KeyBase::PageUp,   // Mach
            b'W' => KeyBase::F(11),
            b'X' => KeyBase::F(12),
            b'Y' => KeyBase::End, // Mach
            _ => KeyBase::None,
        }
    }

    fn decode_ss3(code: u8) -> KeyBase {
        match code {
            b'A' => KeyBase::Up,
            b'B' => KeyBase::Down,
            b'C' => KeyBase::Right,
            b'D' => KeyBase::Left,
            b'E' => KeyBase::Char('5'),
            b'F' => KeyBase::End,
            b'H' => KeyBase::Home,
            b'I' => KeyBase::Tab,
            b'Z' => KeyBase::ShiftTab,
            b'M' => KeyBase::Linefeed,
            b'P' => KeyBase::F(1),
            b'Q' => KeyBase::F(2),
            b'R' => KeyBase::F(3),
            b'S' => KeyBase::F(4),
            b'T' => KeyBase::F(5), // Mach
            b'U' => KeyBase::F(6),
            b'V' => KeyBase::F(7),
            b'W' => KeyBase::F(8),
            b'X' => KeyBase::F(9),
            b'Y' => KeyBase::F(10),
            // numpad
            b'a' => KeyBase::Up,
            b'b' => KeyBase::Down,
            b'c' => KeyBase::Right,
            b'd' => KeyBase::Left,
            b'j' => KeyBase::Char('*'),
            b'k' => KeyBase::Char('+'),
            b'l' => KeyBase::Char(','),
            b'm' => KeyBase::Char('-'),
            b'n' => KeyBase::Del,
            b'o' => KeyBase::Char('/'),
            b'p' => KeyBase::Ins,
            b'q' => KeyBase::End,
            b'r' => KeyBase::Down,
            b's' => KeyBase::PageDown,
            b't' => KeyBase::Left,
            b'u' => KeyBase::Char('5'),
            b'v' => KeyBase::Right,
            b'w' => KeyBase::Home,
            b'x' => KeyBase::Up,
            b'y' => KeyBase::PageUp,
            _ => KeyBase::None,
        }
    }

    /// Reads the continuation bytes (if any) of a UTF-8 scalar whose lead
    /// byte is already in hand, under the decoder's non-blocking deadline.
    /// Malformed sequences yield the replacement character; any byte that
    /// turns out not to be a continuation byte is pushed back rather than
    /// discarded, since it is the start of the next token.
    fn read_utf8(&self, lead: u8, tty: &mut impl TtyInput) -> KeyCode {
        let len = match utf8_char_len(lead) {
            Some(len) => len,
            None => return KeyCode::char('\u{FFFD}'),
        };
        if len == 1 {
            return KeyCode::char(lead as char);
        }

        let mut bytes = [0u8; 4];
        bytes[0] = lead;
        for slot in bytes.iter_mut().take(usize::from(len)).skip(1) {
            match tty.read_nonblocking(self.cfg.esc_timeout) {
                Ok(Some(b)) if b & 0xC0 == 0x80 => *slot = b,
                Ok(Some(b)) => {
                    tty.push_byte(b);
                    return KeyCode::char('\u{FFFD}');
                }
                _ => return KeyCode::char('\u{FFFD}'),
            }
        }

        match decode_utf8_scalar(&bytes[..usize::from(len)]) {
            Some(c) => KeyCode::char(c),
            None => KeyCode::char('\u{FFFD}'),
        }
    }
}

fn utf8_char_len(byte: u8) -> Option<u8> {
    if byte >> 7 == 0b0 {
        Some(1)
    } else if byte >> 5 == 0b110 {
        Some(2)
    } else if byte >> 4 == 0b1110 {
        Some(3)
    } else if byte >> 3 == 0b1_1110 {
        Some(4)
    } else {
        None
    }
}

fn decode_utf8_scalar(bytes: &[u8]) -> Option<char> {
    let codepoint: u32 = match bytes.len() {
        1 => u32::from(bytes[0] & 0b0111_1111),
        2 => (u32::from(bytes[0] & 0b0001_1111) << 6) | u32::from(bytes[1] & 0b0011_1111),
        3 => {
            (u32::from(bytes[0] & 0b0000_1111) << 12)
                | (u32::from(bytes[1] & 0b0011_1111) << 6)
                | u32::from(bytes[2] & 0b0011_1111)
        }
        4 => {
            (u32::from(bytes[0] & 0b0000_0111) << 18)
                | (u32::from(bytes[1] & 0b0011_1111) << 12)
                | (u32::from(bytes[2] & 0b0011_1111) << 6)
                | u32::from(bytes[3] & 0b0011_1111)
        }
        _ => return None,
    };
    char::from_u32(codepoint)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;
    use std::time::Duration;

    /// An in-memory [`TtyInput`] that never actually waits: a non-blocking
    /// read that finds the queue empty returns `None` immediately, which is
    /// exactly what a real deadline elapsing looks like from the decoder's
    /// point of view.
    struct FakeTty {
        incoming: VecDeque<u8>,
        pending: super::super::byte_source::ByteBuffer,
    }

    impl FakeTty {
        fn new(bytes: &[u8]) -> Self {
            Self {
                incoming: bytes.iter().copied().collect(),
                pending: super::super::byte_source::ByteBuffer::new(),
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

    fn decoder() -> KeyDecoder {
        KeyDecoder::new(DecoderConfig::default())
    }

    #[test]
    fn lone_esc_yields_key_esc() {
        let mut tty = FakeTty::new(&[0x1B]);
        assert_eq!(decoder().read_key(&mut tty), KeyCode::new(KeyBase::Esc));
    }

    #[test]
    fn alt_a_yields_char_a_with_alt() {
        let mut tty = FakeTty::new(&[0x1B, b'a']);
        assert_eq!(decoder().read_key(&mut tty), KeyCode::char('a').with_alt());
    }

    #[test]
    fn xterm_up_with_ctrl_modifier() {
        // ESC [ 1 ; 5 A
        let mut tty = FakeTty::new(b"\x1b[1;5A");
        assert_eq!(
            decoder().read_key(&mut tty),
            KeyCode::with_mods(KeyBase::Up, Modifiers::CTRL)
        );
    }

    #[test]
    fn mach_del() {
        // ESC [ @
        let mut tty = FakeTty::new(b"\x1b[@");
        assert_eq!(decoder().read_key(&mut tty), KeyCode::new(KeyBase::Del));
    }

    #[test]
    fn mach_ins() {
        // ESC [ 9
        let mut tty = FakeTty::new(b"\x1b[9");
        assert_eq!(decoder().read_key(&mut tty), KeyCode::new(KeyBase::Ins));
    }

    #[test]
    fn direct_unicode_escape() {
        // ESC [ 233 u -> U+00E9 ('é'), a 2-byte UTF-8 scalar with 0 leftover
        // continuation bytes once the lead byte is consumed.
        let mut tty = FakeTty::new(b"\x1b[233u");
        assert_eq!(decoder().read_key(&mut tty), KeyCode::char('\u{e9}'));
        assert!(tty.pending.is_empty());
    }

    #[test]
    fn linux_f1_through_f5() {
        let mut tty = FakeTty::new(b"\x1b[[A");
        assert_eq!(decoder().read_key(&mut tty), KeyCode::new(KeyBase::F(1)));
    }

    #[test]
    fn eterm_shift_cursor() {
        let mut tty = FakeTty::new(b"\x1b[a");
        assert_eq!(
            decoder().read_key(&mut tty),
            KeyCode::with_mods(KeyBase::Up, Modifiers::SHIFT)
        );
    }

    #[test]
    fn eterm_ctrl_cursor_via_o_prefix() {
        let mut tty = FakeTty::new(b"\x1boa");
        assert_eq!(
            decoder().read_key(&mut tty),
            KeyCode::with_mods(KeyBase::Up, Modifiers::CTRL)
        );
    }

    #[test]
    fn haiku_modifier_as_first_param() {
        // ESC O 5 ; 1 A  (modifier carried in n1 instead of n2)
        let mut tty = FakeTty::new(b"\x1bO5A");
        assert_eq!(
            decoder().read_key(&mut tty),
            KeyCode::with_mods(KeyBase::Up, Modifiers::CTRL)
        );
    }

    #[test]
    fn iterm2_modifier_nine_is_treated_as_three() {
        // n2 == 9 behaves like n2 == 3 (alt)
        let mut tty = FakeTty::new(b"\x1b[1;9A");
        assert_eq!(
            decoder().read_key(&mut tty),
            KeyCode::with_mods(KeyBase::Up, Modifiers::ALT)
        );
    }

    #[test]
    fn unrecognised_final_yields_none() {
        // vt_code 99 has no entry in decode_vt's table.
        let mut tty = FakeTty::new(b"\x1b[99~");
        assert_eq!(decoder().read_key(&mut tty), KeyCode::NONE);
    }

    #[test]
    fn control_letter_is_ctrl_modified_char() {
        let mut tty = FakeTty::new(&[0x17]); // Ctrl-W
        assert_eq!(decoder().read_key(&mut tty), KeyCode::char('w').with_ctrl());
    }

    #[test]
    fn tab_and_enter_and_linefeed() {
        assert_eq!(
            decoder().read_key(&mut FakeTty::new(&[0x09])),
            KeyCode::new(KeyBase::Tab)
        );
        assert_eq!(
            decoder().read_key(&mut FakeTty::new(&[0x0D])),
            KeyCode::new(KeyBase::Enter)
        );
        assert_eq!(
            decoder().read_key(&mut FakeTty::new(&[0x0A])),
            KeyCode::new(KeyBase::Linefeed)
        );
    }

    #[test]
    fn plain_utf8_multibyte_char() {
        let mut tty = FakeTty::new("é".as_bytes());
        assert_eq!(decoder().read_key(&mut tty), KeyCode::char('é'));
    }

    #[test]
    fn malformed_utf8_yields_replacement_char() {
        // 0xC3 lead byte followed by a non-continuation byte.
        let mut tty = FakeTty::new(&[0xC3, b'x']);
        assert_eq!(decoder().read_key(&mut tty), KeyCode::char('\u{FFFD}'));
        // The non-continuation byte was pushed back, not discarded.
        assert_eq!(tty.pending.pop(), Some(b'x'));
    }
}