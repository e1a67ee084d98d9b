mod config_cmd;
mod data;
mod goals;
mod meal;
mod summary;
mod weight;
mod workout;

pub use config_cmd::ConfigCommand;
pub use data::DataCommand;
pub use goals::GoalsCommand;
pub use meal::MealCommand;
pub use summary::SummaryCommand;
pub use weight::WeightCommand;
pub use workout::WorkoutCommand;

use clap::ValueEnum;
use leanfit::{Clock, Journal, UserId};
use serde::Serialize;

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything a journal command needs: the journal, who it acts as and
/// what time it is.
pub struct Context {
    pub journal: Journal,
    pub user: UserId,
    pub clock: Clock,
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
