//! Bidirectional cursor over the module sequence.
//!
//! The cursor never wraps. Moving past either end parks it on a sentinel
//! ([`CursorState::BeforeFirst`] or [`CursorState::AfterLast`]); moving further
//! in the same direction is a no-op that returns `false`.

/// Position of a [`ModuleCursor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
  BeforeFirst,
  At(usize),
  AfterLast,
}

/// Cursor over a sequence of `len` modules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleCursor {
  len: usize,
  state: CursorState,
}

impl ModuleCursor {
  pub fn new(len: usize) -> Self {
    Self {
      len,
      state: CursorState::BeforeFirst,
    }
  }

  pub fn position(&self) -> CursorState {
    self.state
  }

  /// Index of the current module, or `None` at a sentinel.
  pub fn index(&self) -> Option<usize> {
    match self.state {
      CursorState::At(i) => Some(i),
      _ => None,
    }
  }

  pub fn len(&self) -> usize {
    self.len
  }

  pub fn is_empty(&self) -> bool {
    self.len == 0
  }

  /// True iff the current position has a successor.
  pub fn has_next(&self) -> bool {
    !matches!(self.state, CursorState::AfterLast)
  }

  /// True iff the current position has a predecessor.
  pub fn has_prev(&self) -> bool {
    !matches!(self.state, CursorState::BeforeFirst)
  }

  /// Step forward. Returns `false` without moving when already after the last module.
  pub fn next(&mut self) -> bool {
    self.state = match self.state {
      CursorState::AfterLast => return false,
      CursorState::BeforeFirst if self.len > 0 => CursorState::At(0),
      CursorState::BeforeFirst => CursorState::AfterLast,
      CursorState::At(i) if i + 1 < self.len => CursorState::At(i + 1),
      CursorState::At(_) => CursorState::AfterLast,
    };
    true
  }

  /// Step backward. Returns `false` without moving when already before the first module.
  pub fn prev(&mut self) -> bool {
    self.state = match self.state {
      CursorState::BeforeFirst => return false,
      CursorState::AfterLast if self.len > 0 => CursorState::At(self.len - 1),
      CursorState::AfterLast => CursorState::BeforeFirst,
      CursorState::At(0) => CursorState::BeforeFirst,
      CursorState::At(i) => CursorState::At(i - 1),
    };
    true
  }

  pub fn reset(&mut self) {
    self.state = CursorState::BeforeFirst;
  }
}

impl Default for ModuleCursor {
  fn default() -> Self {
    ModuleCursor::new(0)
  }
}
