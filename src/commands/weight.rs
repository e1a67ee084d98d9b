use clap::{Args, Subcommand};

use super::{print_json, Context, OutputFormat};
use leanfit::aggregate::weight_history;
use leanfit::models::{time_format, WeightInput};

#[derive(Args)]
pub struct WeightCommand {
    #[command(subcommand)]
    pub command: WeightSubcommand,
}

#[derive(Subcommand)]
pub enum WeightSubcommand {
    /// Record a weigh-in (lb)
    Log {
        weight: f64,

        #[arg(long, short, default_value = "")]
        notes: String,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Time (HH:MM), defaults to now
        #[arg(long)]
        time: Option<String>,
    },

    /// Show weigh-ins with summary stats
    History {
        /// Only the last N days
        #[arg(long, value_parser = clap::value_parser!(u32).range(1..=366))]
        days: Option<u32>,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl WeightCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let now = ctx.clock.now();

        match &self.command {
            WeightSubcommand::Log {
                weight,
                notes,
                date,
                time,
            } => {
                let input = WeightInput {
                    weight: *weight,
                    notes: notes.clone(),
                    date: date.clone(),
                    time: time.clone(),
                };
                let entry = ctx.journal.log_weight(&ctx.user, input, now).await?;
                println!(
                    "Logged {:.1} lb on {} {}",
                    entry.weight_lb,
                    entry.date,
                    entry.time.format(time_format::TIME_FORMAT)
                );
                Ok(())
            }

            WeightSubcommand::History { days, format } => {
                let doc = ctx.journal.read(&ctx.user).await?;
                let history = weight_history(&doc, now, *days);

                match format {
                    OutputFormat::Json => print_json(&history)?,
                    OutputFormat::Text => {
                        if history.history.is_empty() {
                            println!("No weigh-ins recorded.");
                            return Ok(());
                        }
                        for entry in &history.history {
                            print!(
                                "{} {}  {:>6.1} lb",
                                entry.date,
                                entry.time.format(time_format::TIME_FORMAT),
                                entry.weight_lb
                            );
                            if !entry.notes.is_empty() {
                                print!("  {}", entry.notes);
                            }
                            println!();
                        }
                        let stats = &history.stats;
                        println!();
                        println!("Entries: {}", stats.entries);
                        if let Some(avg) = stats.average {
                            println!("Average: {:.1} lb", avg);
                        }
                        println!("Change:  {:+.1} lb", stats.change);
                    }
                }
                Ok(())
            }
        }
    }
}
