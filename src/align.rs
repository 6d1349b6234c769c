/// Alignment used when the caller does not ask for one: the machine word.
pub const WORD_ALIGN: usize = core::mem::size_of::<usize>();

/// Rounds `value` up to the next multiple of `align`.
///
/// Unlike the usual mask trick this works for any `align >= 1`, not only
/// powers of two.
///
/// # Examples
///
/// ```rust
/// use inplace_alloc::align_to;
///
/// assert_eq!(align_to!(13, 8), 16);
/// assert_eq!(align_to!(16, 8), 16);
/// assert_eq!(align_to!(7, 12), 12);
/// assert_eq!(align_to!(0, 4), 0);
/// ```
#[macro_export]
macro_rules! align_to {
  ($value:expr, $align:expr) => {
    (($value) + ($align) - 1) / ($align) * ($align)
  };
}

#[cfg(test)]
mod tests {
  use super::WORD_ALIGN;

  #[test]
  fn test_align_to_word() {
    let mut alignments = Vec::new();

    for i in 0..10 {
      let sizes = (WORD_ALIGN * i + 1)..=(WORD_ALIGN * (i + 1));

      let expected_alignment = WORD_ALIGN * (i + 1);

      alignments.push((sizes, expected_alignment));
    }

    for (sizes, expected) in alignments {
      for size in sizes {
        assert_eq!(expected, align_to!(size, WORD_ALIGN));
      }
    }
  }

  #[test]
  fn test_align_to_odd_granularity() {
    assert_eq!(align_to!(1usize, 3usize), 3);
    assert_eq!(align_to!(3usize, 3usize), 3);
    assert_eq!(align_to!(10usize, 3usize), 12);
    assert_eq!(align_to!(8usize, 12usize), 12);
  }

  #[test]
  fn test_align_to_one_is_identity() {
    for size in 0usize..64 {
      assert_eq!(size, align_to!(size, 1usize));
    }
  }
}
