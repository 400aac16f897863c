//! The prompt catalogue.

use attune_protocol::Prompt;
use rand::Rng;

/// Opposing concept pairs, one drawn per round.
pub const PROMPTS: [(&str, &str); 24] = [
    ("Hot", "Cold"),
    ("Old", "New"),
    ("Loud", "Quiet"),
    ("Soft", "Hard"),
    ("Fast", "Slow"),
    ("Big", "Small"),
    ("Rare", "Common"),
    ("Cheap", "Expensive"),
    ("Scary", "Comforting"),
    ("Sweet", "Savory"),
    ("Useless", "Useful"),
    ("Underrated", "Overrated"),
    ("Fantasy", "Science fiction"),
    ("Introvert", "Extrovert"),
    ("Casual", "Formal"),
    ("Round", "Pointy"),
    ("Light", "Heavy"),
    ("Clean", "Dirty"),
    ("Ancient", "Modern"),
    ("Simple", "Complicated"),
    ("Fragile", "Durable"),
    ("Ordinary", "Extraordinary"),
    ("Guilty pleasure", "Openly loved"),
    ("Bad habit", "Good habit"),
];

/// A uniformly random prompt from the catalogue.
pub fn random_prompt(rng: &mut impl Rng) -> Prompt {
    let (left, right) = PROMPTS[rng.random_range(0..PROMPTS.len())];
    Prompt::new(left, right)
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_prompts_have_two_distinct_nonempty_sides() {
        for (left, right) in PROMPTS {
            assert!(!left.is_empty());
            assert!(!right.is_empty());
            assert_ne!(left, right);
        }
    }

    #[test]
    fn test_random_prompt_draws_from_catalogue() {
        let mut rng = StdRng::seed_from_u64(23);
        for _ in 0..50 {
            let prompt = random_prompt(&mut rng);
            assert!(
                PROMPTS
                    .iter()
                    .any(|(l, r)| *l == prompt.left && *r == prompt.right)
            );
        }
    }
}
