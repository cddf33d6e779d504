//! Random scene subset selection.

use rand::Rng;

/// Number of scenes kept for `ratio`: `round(n * ratio)`, at least one
/// when `n > 0`, never more than `n`.
pub fn subset_size(total: usize, ratio: f64) -> usize {
    if total == 0 {
        return 0;
    }
    let wanted = (total as f64 * ratio).round();
    (wanted.max(1.0) as usize).min(total)
}

/// Random subset of `scenes` in their original order.
pub fn select_scene_subset<T, R>(scenes: Vec<T>, ratio: f64, rng: &mut R) -> Vec<T>
where
    R: Rng + ?Sized,
{
    let total = scenes.len();
    let keep = subset_size(total, ratio);
    if keep == total {
        return scenes;
    }

    let mut picked = rand::seq::index::sample(rng, total, keep).into_vec();
    picked.sort_unstable();

    let mut picked = picked.into_iter().peekable();
    scenes
        .into_iter()
        .enumerate()
        .filter_map(|(index, scene)| {
            if picked.peek() == Some(&index) {
                picked.next();
                Some(scene)
            } else {
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_subset_size() {
        assert_eq!(subset_size(0, 0.5), 0);
        assert_eq!(subset_size(10, 1.0), 10);
        assert_eq!(subset_size(10, 0.25), 3);
        assert_eq!(subset_size(10, 0.01), 1);
        assert_eq!(subset_size(3, 0.5), 2);
    }

    #[test]
    fn test_full_ratio_keeps_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let scenes: Vec<u32> = (0..5).collect();
        assert_eq!(select_scene_subset(scenes.clone(), 1.0, &mut rng), scenes);
    }

    #[test]
    fn test_subset_preserves_order() {
        let mut rng = StdRng::seed_from_u64(42);
        let scenes: Vec<u32> = (0..100).collect();
        let subset = select_scene_subset(scenes, 0.3, &mut rng);
        assert_eq!(subset.len(), 30);
        assert!(subset.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_always_samples_one_scene() {
        let mut rng = StdRng::seed_from_u64(0);
        let subset = select_scene_subset(vec!["only"], 0.001, &mut rng);
        assert_eq!(subset, vec!["only"]);
    }

    #[test]
    fn test_same_seed_same_subset() {
        let scenes: Vec<u32> = (0..50).collect();
        let a = select_scene_subset(scenes.clone(), 0.2, &mut StdRng::seed_from_u64(9));
        let b = select_scene_subset(scenes, 0.2, &mut StdRng::seed_from_u64(9));
        assert_eq!(a, b);
    }
}
