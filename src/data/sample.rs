//! Uniform random subsampling of point lists

use rand::Rng;

/// Draw `k` elements uniformly at random from `items`, without replacement.
///
/// Runs a partial Fisher-Yates shuffle on a copy, touching only the last
/// `min(k, items.len())` positions, and returns that tail. The caller's
/// slice is never reordered.
///
/// # Arguments
/// * `rng` - Source of randomness (seedable for reproducible draws)
/// * `items` - Pool to draw from
/// * `k` - Requested sample size; clamped to `items.len()`
pub fn sample<T: Clone, R: Rng + ?Sized>(rng: &mut R, items: &[T], k: usize) -> Vec<T> {
    let mut shuffled = items.to_vec();
    let n = shuffled.len();
    let lower_bound = n.saturating_sub(k);

    let mut i = n;
    while i > lower_bound {
        i -= 1;
        let j = rng.random_range(0..=i);
        shuffled.swap(i, j);
    }

    shuffled.split_off(lower_bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn create_test_rng(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    #[test]
    fn test_sample_returns_exactly_k_elements() {
        let items: Vec<u32> = (0..100).collect();
        let mut rng = create_test_rng(1);

        let drawn = sample(&mut rng, &items, 10);

        assert_eq!(drawn.len(), 10);
    }

    #[test]
    fn test_sample_clamps_k_to_input_length() {
        let items = vec![1, 2, 3];
        let mut rng = create_test_rng(2);

        let mut drawn = sample(&mut rng, &items, 10);
        drawn.sort_unstable();

        // Oversized requests degrade to a full permutation
        assert_eq!(drawn, items);
    }

    #[test]
    fn test_sample_k_equal_to_length_is_a_permutation() {
        let items: Vec<u32> = (0..50).collect();
        let mut rng = create_test_rng(3);

        let mut drawn = sample(&mut rng, &items, items.len());
        drawn.sort_unstable();

        assert_eq!(drawn, items);
    }

    #[test]
    fn test_sample_zero_k_returns_empty() {
        let items = vec![1, 2, 3];
        let mut rng = create_test_rng(4);

        assert!(sample(&mut rng, &items, 0).is_empty());
    }

    #[test]
    fn test_sample_empty_input_returns_empty() {
        let items: Vec<u32> = Vec::new();
        let mut rng = create_test_rng(5);

        assert!(sample(&mut rng, &items, 10).is_empty());
    }

    #[test]
    fn test_sample_elements_are_distinct_members_of_input() {
        let items: Vec<u32> = (0..1000).collect();
        let mut rng = create_test_rng(6);

        let mut drawn = sample(&mut rng, &items, 100);
        drawn.sort_unstable();

        for pair in drawn.windows(2) {
            assert_ne!(pair[0], pair[1]);
        }
        for value in &drawn {
            assert!(items.contains(value));
        }
    }

    #[test]
    fn test_sample_does_not_mutate_input() {
        let items: Vec<u32> = (0..100).collect();
        let before = items.clone();
        let mut rng = create_test_rng(7);

        let _ = sample(&mut rng, &items, 50);

        assert_eq!(items, before);
    }

    #[test]
    fn test_sample_same_seed_draws_same_subset() {
        let items: Vec<u32> = (0..500).collect();

        let first = sample(&mut create_test_rng(42), &items, 20);
        let second = sample(&mut create_test_rng(42), &items, 20);

        assert_eq!(first, second);
    }

    #[test]
    fn test_sample_is_roughly_uniform() {
        let items: Vec<usize> = (0..10).collect();
        let mut rng = create_test_rng(8);
        let trials = 2000;

        let mut counts = [0usize; 10];
        for _ in 0..trials {
            for value in sample(&mut rng, &items, 3) {
                counts[value] += 1;
            }
        }

        // Each element is expected in k/n = 30% of the trials; the bounds
        // are several standard deviations wide to keep the test stable.
        for count in counts {
            assert!((450..=750).contains(&count), "skewed count: {count}");
        }
    }
}
