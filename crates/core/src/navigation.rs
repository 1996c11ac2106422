/// Move `delta` steps from `current` through a ring of `len` positions.
///
/// Wraps at both ends for any step size. Returns `None` when `len` is 0.
#[must_use]
pub fn wrap_index(current: usize, delta: i64, len: usize) -> Option<usize> {
    if len == 0 {
        return None;
    }
    let len = len as i128;
    let next = (current as i128 + i128::from(delta)).rem_euclid(len);
    usize::try_from(next).ok()
}
