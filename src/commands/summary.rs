use clap::{Args, Subcommand};

use super::{print_json, Context, OutputFormat};
use leanfit::aggregate::{logging_streak, today_summary, trailing_series, weekly_recap};

#[derive(Args)]
pub struct SummaryCommand {
    #[command(subcommand)]
    pub command: SummarySubcommand,
}

#[derive(Subcommand)]
pub enum SummarySubcommand {
    /// Today's totals against goals
    Today {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Daily totals for the trailing days
    Week {
        /// Number of days to show
        #[arg(
            long,
            default_value_t = 7,
            value_parser = clap::value_parser!(u32).range(1..=366)
        )]
        days: u32,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Meal logging streak
    Streak {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Weekly progress recap
    Recap {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl SummaryCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let now = ctx.clock.now();
        let doc = ctx.journal.read(&ctx.user).await?;

        match &self.command {
            SummarySubcommand::Today { format } => {
                let summary = today_summary(&doc, now);
                match format {
                    OutputFormat::Json => print_json(&summary)?,
                    OutputFormat::Text => {
                        println!("Today ({})", summary.date);
                        println!("==================\n");
                        println!(
                            "Calories: {:>5} / {} ({}%)",
                            summary.totals.calories,
                            summary.goals.daily_calorie_goal,
                            summary.progress.calories_pct
                        );
                        println!(
                            "Protein:  {:>5} / {} g ({}%)",
                            summary.totals.protein,
                            summary.goals.daily_protein_goal,
                            summary.progress.protein_pct
                        );
                        println!(
                            "Carbs:    {:>5} / {} g",
                            summary.totals.carbs, summary.goals.daily_carbs_goal
                        );
                        println!(
                            "Fat:      {:>5} / {} g",
                            summary.totals.fat, summary.goals.daily_fat_goal
                        );
                        println!("Meals:    {:>5}", summary.totals.meal_count);
                    }
                }
            }

            SummarySubcommand::Week { days, format } => {
                let series = trailing_series(&doc, now, *days);
                match format {
                    OutputFormat::Json => print_json(&series)?,
                    OutputFormat::Text => {
                        let goal = doc.settings.daily_calorie_goal;
                        for day in &series {
                            let marker = if day.meal_count == 0 {
                                "-"
                            } else if day.calories <= u64::from(goal) {
                                "✓"
                            } else {
                                "!"
                            };
                            println!(
                                "{} {} {:>5} kcal  P {:>3}g  ({} meals)",
                                day.date, marker, day.calories, day.protein, day.meal_count
                            );
                        }
                    }
                }
            }

            SummarySubcommand::Streak { format } => {
                let streak = logging_streak(&doc, now);
                match format {
                    OutputFormat::Json => print_json(&streak)?,
                    OutputFormat::Text => {
                        println!("Current streak: {} day(s)", streak.current);
                        println!("Longest streak: {} day(s)", streak.longest);
                        if !streak.logged_today && streak.current > 0 {
                            println!("Log a meal today to keep it going.");
                        }
                    }
                }
            }

            SummarySubcommand::Recap { format } => {
                let recap = weekly_recap(&doc, now);
                match format {
                    OutputFormat::Json => print_json(&recap)?,
                    OutputFormat::Text => {
                        println!("Week of {} to {}", recap.period.start, recap.period.end);
                        println!("==================\n");
                        println!("Weight lost:   {:.1} lb", recap.weight_lost);
                        println!("Streak:        {} day(s)", recap.streak);
                        println!("Meals logged:  {}", recap.meals_logged);
                        println!("Avg deficit:   {} kcal/day", recap.avg_deficit);
                    }
                }
            }
        }

        Ok(())
    }
}
