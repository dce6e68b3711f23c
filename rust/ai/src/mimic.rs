use crate::{Advice, Advisor};
use hitstand_engine::cards::Rank;
use hitstand_engine::dealer::dealer_should_draw;

/// Plays the player hand by the dealer's rule: hit below 17, stand otherwise.
#[derive(Debug, Clone, Copy, Default)]
pub struct DealerMimic;

impl Advisor for DealerMimic {
    fn advise(&self, hand: &[Rank], _dealer_upcard: Rank) -> Advice {
        if dealer_should_draw(hand) {
            Advice::Hit
        } else {
            Advice::Stand
        }
    }

    fn name(&self) -> &str {
        "mimic"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use Rank::*;

    #[test]
    fn ignores_the_upcard() {
        for up in [Two, Ace] {
            assert_eq!(DealerMimic.advise(&[Ten, Six], up), Advice::Hit);
            assert_eq!(DealerMimic.advise(&[Ten, Seven], up), Advice::Stand);
        }
    }
}
