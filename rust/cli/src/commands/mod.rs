//! Command handler modules for the hitstand CLI.
//!
//! Each command lives in its own module with the same shape:
//!
//! - Public handler function: `pub fn handle_COMMAND_command(...) -> Result<(), CliError>`
//! - Module-private helpers specific to that command
//! - Output streams (`&mut dyn Write`) passed in as parameters
//! - Errors propagated via the `CliError` enum

mod cfg;
mod deal;
mod play;
mod sim;
mod stats;
mod value;

pub use cfg::handle_cfg_command;
pub use deal::handle_deal_command;
pub use play::{PlayOptions, handle_play_command};
pub use sim::handle_sim_command;
pub use stats::handle_stats_command;
pub use value::{handle_advise_command, handle_value_command};

use hitstand_ai::{Advisor, create_advisor};
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::error::CliError;

/// Per-round deck seeds derived from one session seed, so a whole session
/// replays from a single number.
pub(crate) fn seed_stream(seed: u64) -> ChaCha20Rng {
    ChaCha20Rng::seed_from_u64(seed)
}

pub(crate) fn advisor_by_name(name: &str) -> Result<Box<dyn Advisor>, CliError> {
    create_advisor(name).ok_or_else(|| {
        CliError::InvalidInput(format!(
            "unknown advisor '{}' (expected one of: {})",
            name,
            hitstand_ai::ADVISOR_NAMES.join(", ")
        ))
    })
}

pub(crate) fn load_config() -> Result<crate::config::Config, CliError> {
    crate::config::load().map_err(|e| CliError::Config(e.to_string()))
}
