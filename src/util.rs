/// Single bit mask for bank or element `n`.
#[inline]
pub fn bit(n: usize) -> u32 {
    1 << n
}
