pub const fn wrap_decrement(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    if index == 0 {
        len - 1
    } else {
        index - 1
    }
}

pub const fn wrap_increment(index: usize, len: usize) -> usize {
    if len == 0 {
        return 0;
    }

    (index + 1) % len
}

/// Moves `index` by `step` rows, clamped to `[0, len)`.
pub const fn page(index: usize, len: usize, step: isize) -> usize {
    if len == 0 {
        return 0;
    }
    let target = index.saturating_add_signed(step);
    if target >= len {
        len - 1
    } else {
        target
    }
}
