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

//! The completion store (C3): an ordered, opaque-to-the-menu list of
//! completion proposals.

/// One completion proposal.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// String shown in the menu. `None` entries are skipped for rendering
    /// and iteration but keep their index (so `CandidateList::get` by index
    /// still works for a generator that produced a sparse list).
    pub display: Option<String>,
    /// The text that replaces the deleted span.
    pub replacement: String,
    /// Bytes to delete before the cursor position on apply.
    pub delete_before: usize,
    /// Bytes to delete after the cursor position on apply.
    pub delete_after: usize,
}

impl Candidate {
    pub fn new(display: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            display: Some(display.into()),
            replacement: replacement.into(),
            delete_before: 0,
            delete_after: 0,
        }
    }

    #[must_use]
    pub fn with_delete_before(mut self, n: usize) -> Self {
        self.delete_before = n;
        self
    }

    #[must_use]
    pub fn with_delete_after(mut self, n: usize) -> Self {
        self.delete_after = n;
        self
    }
}

/// Ordered sequence of [`Candidate`] with stable 0-based indices.
///
/// Regenerated on each completion request and cleared when the menu exits
/// for any reason; the list itself holds no reference to the input buffer
/// it was generated against.
#[derive(Debug, Default, Clone)]
pub struct CandidateList {
    items: Vec<Candidate>,
}

impl CandidateList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Candidate> {
        self.items.get(index)
    }

    pub fn get_display(&self, index: usize) -> Option<&str> {
        self.items.get(index)?.display.as_deref()
    }

    pub fn push(&mut self, candidate: Candidate) {
        self.items.push(candidate);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Splices candidate `index`'s replacement into `input` around `pos`,
    /// deleting `delete_before` bytes before and `delete_after` bytes after
    /// it, and returns the new cursor position (the end of the inserted
    /// replacement).
    ///
    /// `pos`/`delete_before`/`delete_after` are byte offsets; the generator
    /// that produced the candidate is responsible for keeping them on char
    /// boundaries.
    pub fn apply(&self, index: usize, input: &mut String, pos: usize) -> usize {
        let Some(candidate) = self.items.get(index) else {
            return pos;
        };
        let start = pos.saturating_sub(candidate.delete_before);
        let end = (pos + candidate.delete_after).min(input.len());
        input.replace_range(start..end, &candidate.replacement);
        start + candidate.replacement.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn apply_splices_replacement_and_reports_length_invariant() {
        let mut list = CandidateList::new();
        list.push(Candidate::new("println!", "println!").with_delete_before(2));

        let mut input = "pr".to_string();
        let old_len = input.len();
        let pos = input.len();
        let new_pos = list.apply(0, &mut input, pos);

        let delete_before = list.get(0).unwrap().delete_before;
        let delete_after = list.get(0).unwrap().delete_after;
        let replacement_len = list.get(0).unwrap().replacement.len();
        assert_eq!(
            input.len(),
            old_len - delete_before - delete_after + replacement_len
        );
        assert_eq!(new_pos, input.len());
        assert_eq!(input, "println!");
    }

    #[test]
    fn apply_deletes_after_cursor_too() {
        let mut list = CandidateList::new();
        list.push(Candidate::new("bar", "bar").with_delete_after(3));

        let mut input = "foo---".to_string();
        let new_pos = list.apply(0, &mut input, 3);

        assert_eq!(input, "foobar");
        assert_eq!(new_pos, 6);
    }

    #[test]
    fn get_display_skips_none_but_preserves_index() {
        let mut list = CandidateList::new();
        list.push(Candidate::new("a", "a"));
        list.push(Candidate {
            display: None,
            replacement: "b".into(),
            delete_before: 0,
            delete_after: 0,
        });
        assert_eq!(list.get_display(0), Some("a"));
        assert_eq!(list.get_display(1), None);
        assert_eq!(list.count(), 2);
    }

    #[test]
    fn clear_empties_the_list() {
        let mut list = CandidateList::new();
        list.push(Candidate::new("a", "a"));
        list.clear();
        assert_eq!(list.count(), 0);
        assert!(list.is_empty());
    }
}
