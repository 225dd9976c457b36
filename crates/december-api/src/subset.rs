use rand::Rng;

/// Bounds (inclusive) on how many confessions a listing returns.
pub const SUBSET_MIN: usize = 30;
pub const SUBSET_MAX: usize = 40;

/// Unbiased in-place Fisher–Yates shuffle.
pub fn shuffle<T, R: Rng + ?Sized>(items: &mut [T], rng: &mut R) {
    for i in (1..items.len()).rev() {
        let j = rng.random_range(0..=i);
        items.swap(i, j);
    }
}

/// Shuffle everything, then keep a prefix of random length in
/// `[SUBSET_MIN, SUBSET_MAX]`, clamped to what is available.
pub fn select_random_subset<T, R: Rng + ?Sized>(mut all: Vec<T>, rng: &mut R) -> Vec<T> {
    shuffle(&mut all, rng);
    let limit = rng.random_range(SUBSET_MIN..=SUBSET_MAX);
    all.truncate(limit);
    all
}
