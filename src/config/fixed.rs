use std::{fmt, ops::Deref};

/// Cut `value` to at most `capacity` bytes without splitting a UTF-8 sequence.
///
/// The result is always a prefix of `value`.
pub fn truncate_to_capacity(value: &str, capacity: usize) -> &str {
    if value.len() <= capacity {
        return value;
    }

    let mut end = capacity;
    while !value.is_char_boundary(end) {
        end -= 1;
    }

    &value[..end]
}

/// Text field with a fixed byte capacity.
///
/// `N` is the number of usable bytes, i.e. the size of the on-device buffer minus the
/// terminator. Longer input is truncated, never rejected.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct FixedStr<const N: usize>(heapless::String<N>);

impl<const N: usize> FixedStr<N> {
    pub const CAPACITY: usize = N;

    pub const fn new() -> Self {
        Self(heapless::String::new())
    }

    /// Build from `value`, truncated to the capacity.
    pub fn truncated(value: &str) -> Self {
        let mut text = Self::new();
        text.assign(value);
        text
    }

    /// Store `value` truncated to the capacity.
    ///
    /// Returns whether the stored text changed.
    pub fn assign(&mut self, value: &str) -> bool {
        let value = truncate_to_capacity(value, N);

        if self.0.as_str() == value {
            return false;
        }

        self.0.clear();
        // Cannot fail, `value` fits after truncation.
        let _ = self.0.push_str(value);
        true
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl<const N: usize> Deref for FixedStr<N> {
    type Target = str;

    fn deref(&self) -> &Self::Target {
        self.as_str()
    }
}

impl<const N: usize> fmt::Debug for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self.as_str(), f)
    }
}

impl<const N: usize> fmt::Display for FixedStr<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_untouched() {
        assert_eq!(truncate_to_capacity("gps", 31), "gps");
        assert_eq!(truncate_to_capacity("", 0), "");
    }

    #[test]
    fn cuts_on_char_boundary() {
        // 'é' is two bytes; cutting at 2 would split it.
        assert_eq!(truncate_to_capacity("aé", 2), "a");
        assert_eq!(truncate_to_capacity("aé", 3), "aé");
    }

    #[test]
    fn exact_capacity_fits() {
        let text = FixedStr::<4>::truncated("abcd");
        assert_eq!(text.as_str(), "abcd");
        assert_eq!(text.len(), FixedStr::<4>::CAPACITY);
    }

    #[test]
    fn one_byte_over_is_truncated() {
        let text = FixedStr::<4>::truncated("abcde");
        assert_eq!(text.as_str(), "abcd");
    }

    #[test]
    fn assign_reports_change() {
        let mut text = FixedStr::<8>::truncated("gps");

        assert!(!text.assign("gps"));
        assert!(text.assign("log"));
        assert_eq!(&*text, "log");
    }

    #[test]
    fn assign_detects_no_change_after_truncation() {
        let mut text = FixedStr::<3>::truncated("abc");
        assert!(!text.assign("abcdef"));
    }
}
