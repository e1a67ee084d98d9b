use clap::{Args, Subcommand};

use super::{print_json, Context, OutputFormat};
use leanfit::aggregate::{latest_lifts, workouts_this_week};
use leanfit::models::{LiftInput, ValidationError, WorkoutInput};

#[derive(Args)]
pub struct WorkoutCommand {
    #[command(subcommand)]
    pub command: WorkoutSubcommand,
}

#[derive(Subcommand)]
pub enum WorkoutSubcommand {
    /// Log a workout
    Log {
        /// Lift as NAME:WEIGHTxREPS, e.g. "Squat:185x5" (can be repeated)
        #[arg(long = "lift", value_name = "LIFT", required = true)]
        lifts: Vec<String>,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,
    },

    /// Show the latest performance and estimated 1RM per lift
    Lifts {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

/// Parses `NAME:WEIGHTxREPS`.
fn parse_lift(raw: &str) -> Result<LiftInput, ValidationError> {
    let invalid =
        || ValidationError::new(format!("lift '{}' must look like NAME:WEIGHTxREPS", raw));

    let (name, set) = raw.rsplit_once(':').ok_or_else(invalid)?;
    let (weight, reps) = set
        .split_once(|c: char| c == 'x' || c == 'X')
        .ok_or_else(invalid)?;

    Ok(LiftInput {
        name: name.trim().to_string(),
        weight: weight.trim().parse().map_err(|_| invalid())?,
        reps: reps.trim().parse().map_err(|_| invalid())?,
    })
}

impl WorkoutCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let now = ctx.clock.now();

        match &self.command {
            WorkoutSubcommand::Log { lifts, date } => {
                let input = WorkoutInput {
                    lifts: lifts
                        .iter()
                        .map(|l| parse_lift(l))
                        .collect::<Result<Vec<_>, _>>()?,
                    date: date.clone(),
                };
                let workout = ctx.journal.log_workout(&ctx.user, input, ctx.clock.instant()).await?;
                println!("Logged workout on {}:", workout.date);
                for lift in &workout.lifts {
                    println!(
                        "  {} {} x {} (e1RM {:.1})",
                        lift.name,
                        lift.weight,
                        lift.reps,
                        lift.estimated_1rm()
                    );
                }
                Ok(())
            }

            WorkoutSubcommand::Lifts { format } => {
                let doc = ctx.journal.read(&ctx.user).await?;
                let lifts = latest_lifts(&doc);

                match format {
                    OutputFormat::Json => print_json(&lifts)?,
                    OutputFormat::Text => {
                        if lifts.is_empty() {
                            println!("No workouts logged.");
                            return Ok(());
                        }
                        for lift in &lifts {
                            println!(
                                "{:<20} {:>7.1} x {:<3} e1RM {:>6.1}  ({})",
                                lift.name, lift.weight, lift.reps, lift.estimated_1rm, lift.date
                            );
                        }
                        println!(
                            "\nWorkouts this week: {}",
                            workouts_this_week(&doc, now).len()
                        );
                    }
                }
                Ok(())
            }
        }
    }
}
