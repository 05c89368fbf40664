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

//! The TTY byte source (C1): a blocking/non-blocking single-byte reader with
//! a small push-back buffer.
//!
//! The rest of this crate's decoder is generic over [`TtyInput`], so a
//! production editor can supply its own raw-mode-aware stdin, and tests can
//! supply an in-memory one (see [`ByteBuffer`]'s `Read`-free use in
//! `key::decoder`'s tests).
//!
//! The teacher crate this is grounded on (`r3bl_terminal_async`) reads the
//! terminal through a `tokio` `AsyncFd` + `crossterm::event::EventStream`,
//! because it's an async multi-writer program. This crate's decoder is
//! synchronous (see the crate's top-level docs), so the concrete stdin
//! source here instead follows `term_input`'s approach in this pack: flip
//! `O_NONBLOCK` on the raw fd and use `poll(2)` to bound how long a read may
//! idle.

use std::io;
use std::os::unix::io::RawFd;
use std::time::Duration;

use nix::poll::{poll, PollFd, PollFlags, PollTimeout};

/// Bounded LIFO of bytes plus a small UTF-8 staging area, consumed by
/// [`TtyInput`] implementations to support "unread" this byte / this
/// scalar semantics.
#[derive(Debug, Default)]
pub struct ByteBuffer {
    stack: Vec<u8>,
}

impl ByteBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Prepend a byte to future reads.
    pub fn push(&mut self, b: u8) {
        self.stack.push(b);
    }

    /// Encode `u` as 1-4 UTF-8 bytes and push them so the first popped byte
    /// is the lead byte.
    pub fn push_unicode(&mut self, u: char) {
        let mut buf = [0u8; 4];
        let encoded = u.encode_utf8(&mut buf);
        for &b in encoded.as_bytes().iter().rev() {
            self.stack.push(b);
        }
    }

    /// Pop one byte without blocking; `None` if the buffer is empty.
    pub fn pop(&mut self) -> Option<u8> {
        self.stack.pop()
    }

    pub fn is_empty(&self) -> bool {
        self.stack.is_empty()
    }
}

/// The byte source contract the key decoder consumes.
pub trait TtyInput {
    /// Block until a byte is available.
    fn read_blocking(&mut self) -> io::Result<u8>;

    /// Read a byte if one arrives within the given deadline; `Ok(None)` if
    /// the deadline elapses with nothing available.
    fn read_nonblocking(&mut self, deadline: Duration) -> io::Result<Option<u8>>;

    /// Prepend a byte to future reads.
    fn push_byte(&mut self, b: u8);

    /// Encode `u` as UTF-8 and push it so the first popped byte is the lead
    /// byte.
    fn push_unicode(&mut self, u: char);

    /// Whether the terminal's encoding is UTF-8 (affects the completion
    /// menu's selection marker and column-width math).
    fn is_utf8(&self) -> bool;
}

/// A [`TtyInput`] reading directly from a raw file descriptor already placed
/// in raw mode by the caller (raw-mode ownership belongs to the outer editor
/// session, per this crate's scope).
pub struct RawFdInput {
    fd: RawFd,
    pending: ByteBuffer,
    is_utf8: bool,
}

impl RawFdInput {
    /// `fd` must already be readable in non-canonical mode; ownership of the
    /// fd is not taken.
    pub fn new(fd: RawFd, is_utf8: bool) -> Self {
        Self {
            fd,
            pending: ByteBuffer::new(),
            is_utf8,
        }
    }

    fn read_one(&self) -> io::Result<u8> {
        let mut buf = [0u8; 1];
        loop {
            match nix::unistd::read(self.fd, &mut buf) {
                Ok(0) => {
                    return Err(io::Error::new(io::ErrorKind::UnexpectedEof, "tty closed"))
                }
                Ok(_) => return Ok(buf[0]),
                Err(nix::errno::Errno::EINTR) => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }
}

impl TtyInput for RawFdInput {
    fn read_blocking(&mut self) -> io::Result<u8> {
        if let Some(b) = self.pending.pop() {
            return Ok(b);
        }
        self.read_one()
    }

    fn read_nonblocking(&mut self, deadline: Duration) -> io::Result<Option<u8>> {
        if let Some(b) = self.pending.pop() {
            return Ok(Some(b));
        }

        let mut fds = [PollFd::new(
            unsafe { std::os::fd::BorrowedFd::borrow_raw(self.fd) },
            PollFlags::POLLIN,
        )];
        let timeout = PollTimeout::try_from(deadline.as_millis().min(i32::MAX as u128) as i32)
            .unwrap_or(PollTimeout::MAX);
        let ready = poll(&mut fds, timeout).map_err(io::Error::from)?;
        if ready == 0 {
            return Ok(None);
        }
        match self.read_one() {
            Ok(b) => Ok(Some(b)),
            Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
            Err(e) => Err(e),
        }
    }

    fn push_byte(&mut self, b: u8) {
        self.pending.push(b);
    }

    fn push_unicode(&mut self, u: char) {
        self.pending.push_unicode(u);
    }

    fn is_utf8(&self) -> bool {
        self.is_utf8
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_unicode_then_pop_yields_utf8_bytes_lead_first() {
        let mut buf = ByteBuffer::new();
        buf.push_unicode('\u{e9}'); // 'é', 2-byte UTF-8: 0xC3 0xA9
        assert_eq!(buf.pop(), Some(0xC3));
        assert_eq!(buf.pop(), Some(0xA9));
        assert_eq!(buf.pop(), None);
    }

    #[test]
    fn push_byte_is_read_before_anything_else() {
        let mut buf = ByteBuffer::new();
        buf.push(b'x');
        assert_eq!(buf.pop(), Some(b'x'));
    }
}