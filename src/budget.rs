// src/budget.rs
//
// Output budget. Every visible text chunk is charged its character count and
// an estimate of the display lines it wraps to (50 columns per line, at least
// one line). The first chunk that pushes either counter over its cap is
// refused and the conversion is marked truncated for good.

/// Columns assumed per wrapped display line.
const LINE_WIDTH: usize = 50;

/// Counters for one conversion. Returned to the caller so truncation can be
/// observed without an error path.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ConversionState {
    pub lines_used: usize,
    pub chars_used: usize,
    pub truncated: bool,
}

#[derive(Debug)]
pub struct Budget {
    max_chars: usize,
    max_lines: usize,
    state: ConversionState,
}

impl Budget {
    pub fn new(max_chars: usize, max_lines: usize) -> Self {
        Self {
            max_chars,
            max_lines,
            state: ConversionState::default(),
        }
    }

    /// Charge a chunk of `len` chars. Returns false once either cap is
    /// exceeded; after that it returns false without touching the counters.
    pub fn accept(&mut self, len: usize) -> bool {
        if self.state.truncated {
            return false;
        }
        self.state.chars_used += len;
        self.state.lines_used += estimated_lines(len);
        if self.state.lines_used > self.max_lines || self.state.chars_used > self.max_chars {
            self.state.truncated = true;
            return false;
        }
        true
    }

    #[inline]
    pub fn truncated(&self) -> bool {
        self.state.truncated
    }

    pub fn state(&self) -> ConversionState {
        self.state
    }
}

/// `max(round(len / 50), 1)`, rounding halves up.
#[inline]
fn estimated_lines(len: usize) -> usize {
    ((len + LINE_WIDTH / 2) / LINE_WIDTH).max(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn line_estimate_rounds() {
        assert_eq!(estimated_lines(0), 1);
        assert_eq!(estimated_lines(24), 1);
        assert_eq!(estimated_lines(74), 1);
        assert_eq!(estimated_lines(75), 2);
        assert_eq!(estimated_lines(125), 3);
    }

    #[test]
    fn line_cap_truncates() {
        let mut b = Budget::new(2000, 10);
        for _ in 0..10 {
            assert!(b.accept(5));
        }
        assert!(!b.accept(5));
        assert!(b.truncated());
        assert_eq!(b.state().lines_used, 11);
    }

    #[test]
    fn char_cap_truncates() {
        let mut b = Budget::new(100, 10);
        assert!(b.accept(100));
        assert!(!b.accept(1));
        assert_eq!(b.state().chars_used, 101);
    }

    #[test]
    fn refusal_is_sticky() {
        let mut b = Budget::new(10, 10);
        assert!(!b.accept(11));
        let after = b.state();
        assert!(!b.accept(1));
        assert!(!b.accept(0));
        assert_eq!(b.state(), after);
    }
}
