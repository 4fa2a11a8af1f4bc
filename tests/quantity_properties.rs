//! Property tests for "No. Appearing" resolution.

use bestiary::{resolve_appearing, resolve_quantity, QuantityExpr, ResolutionPath};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::SeedableRng;

proptest! {
    #[test]
    fn dice_with_modifier_stays_in_range(
        count in 1u32..=20,
        sides in 1u32..=100,
        modifier in -50i64..=50,
        seed in any::<u64>(),
    ) {
        let text = if modifier < 0 {
            format!("{}d{}{}", count, sides, modifier)
        } else {
            format!("{}d{}+{}", count, sides, modifier)
        };
        let mut rng = StdRng::seed_from_u64(seed);
        let n = i64::from(resolve_appearing(Some(text.as_str()), &mut rng));

        let low = (i64::from(count) + modifier).max(1);
        let high = (i64::from(count) * i64::from(sides) + modifier).max(1);
        prop_assert!(n >= low && n <= high, "{} gave {}", text, n);
    }

    #[test]
    fn text_without_digits_resolves_to_one(text in "[^0-9]{0,24}", seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        prop_assert_eq!(resolve_appearing(Some(text.as_str()), &mut rng), 1);
    }

    #[test]
    fn ranges_pick_an_endpoint(low in 0u32..1000, high in 0u32..1000, seed in any::<u64>()) {
        let text = format!("{}-{}", low, high);
        let mut rng = StdRng::seed_from_u64(seed);
        let resolution = resolve_quantity(Some(text.as_str()), &mut rng);

        prop_assert!(resolution.count == low.max(1) || resolution.count == high.max(1));
        let is_pick = matches!(resolution.path, ResolutionPath::ChoicePick { .. });
        prop_assert!(is_pick);
    }

    #[test]
    fn every_input_resolves_to_at_least_one(text in ".{0,40}", seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let expr = QuantityExpr::parse(Some(text.as_str()));
        let resolution = expr.resolve(&mut rng);
        let (low, high) = expr.bounds();

        prop_assert!(resolution.count >= 1);
        prop_assert!(resolution.count >= low && resolution.count <= high);
    }
}

#[test]
fn test_absent_and_empty_resolve_to_one() {
    let mut rng = StdRng::seed_from_u64(0);
    assert_eq!(resolve_appearing(None, &mut rng), 1);
    assert_eq!(resolve_appearing(Some(""), &mut rng), 1);
}

#[test]
fn test_two_to_five_only_yields_two_or_five() {
    let mut rng = StdRng::seed_from_u64(0);
    let mut seen = std::collections::HashSet::new();
    for _ in 0..500 {
        seen.insert(resolve_appearing(Some("2-5"), &mut rng));
    }
    assert_eq!(seen, [2, 5].into_iter().collect());
}
