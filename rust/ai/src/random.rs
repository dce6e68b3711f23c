use std::sync::Mutex;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::{Advice, Advisor};
use hitstand_engine::cards::Rank;
use hitstand_engine::hand::{hand_value, BLACKJACK};

/// Hits or stands on a coin flip; never doubles. Stands on 21.
#[derive(Debug)]
pub struct RandomAdvisor {
    rng: Mutex<StdRng>,
}

impl RandomAdvisor {
    pub fn new(seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self {
            rng: Mutex::new(rng),
        }
    }
}

impl Advisor for RandomAdvisor {
    fn advise(&self, hand: &[Rank], _dealer_upcard: Rank) -> Advice {
        if hand_value(hand) >= BLACKJACK {
            return Advice::Stand;
        }
        let hit = match self.rng.lock() {
            Ok(mut rng) => rng.random_bool(0.5),
            Err(poisoned) => poisoned.into_inner().random_bool(0.5),
        };
        if hit { Advice::Hit } else { Advice::Stand }
    }

    fn name(&self) -> &str {
        "random"
    }
}
