use clap::{Args, Subcommand};

use super::{print_json, Context, OutputFormat};
use leanfit::aggregate::{bmr_tdee, goal_projection, EnergyRequest};
use leanfit::models::{time_format, GoalPlan, GoalUpdate};
use leanfit::JournalError;

#[derive(Args)]
pub struct GoalsCommand {
    #[command(subcommand)]
    pub command: GoalsSubcommand,
}

#[derive(Subcommand)]
pub enum GoalsSubcommand {
    /// Set daily macro goals
    Set {
        #[arg(long)]
        calories: Option<i64>,

        #[arg(long, short)]
        protein: Option<i64>,

        #[arg(long)]
        carbs: Option<i64>,

        #[arg(long)]
        fat: Option<i64>,
    },

    /// Estimate BMR/TDEE and recommend daily targets
    Calculate {
        /// Current weight (lb)
        #[arg(long)]
        weight: f64,

        /// Goal weight (lb)
        #[arg(long)]
        goal: f64,

        /// Height in inches
        #[arg(long, conflicts_with = "height_cm", required_unless_present = "height_cm")]
        height_inches: Option<f64>,

        /// Height in centimeters
        #[arg(long)]
        height_cm: Option<f64>,

        #[arg(long)]
        age: Option<u32>,

        /// male or female
        #[arg(long)]
        sex: Option<String>,

        /// sedentary, light, moderate, active or very_active
        #[arg(long)]
        activity: Option<String>,

        /// Weeks to reach the goal
        #[arg(long, default_value_t = 12)]
        weeks: u32,

        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Save a weight goal plan and adopt its targets
    Plan {
        /// Start date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        start: Option<String>,

        /// Weight at the start (lb)
        #[arg(long)]
        weight: f64,

        /// Goal weight (lb)
        #[arg(long)]
        goal: f64,

        /// Target date (YYYY-MM-DD)
        #[arg(long)]
        target: String,

        /// Daily calorie goal
        #[arg(long)]
        calories: u32,

        /// Daily protein goal (g)
        #[arg(long, short)]
        protein: Option<u32>,
    },

    /// Show progress against the saved plan
    Projection {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl GoalsCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let now = ctx.clock.now();

        match &self.command {
            GoalsSubcommand::Set {
                calories,
                protein,
                carbs,
                fat,
            } => {
                let update = GoalUpdate {
                    calories: *calories,
                    protein: *protein,
                    carbs: *carbs,
                    fat: *fat,
                    onboarded: Some(true),
                };
                let settings = ctx.journal.update_goals(&ctx.user, update).await?;
                println!(
                    "Goals: {} kcal, P {}g / C {}g / F {}g",
                    settings.daily_calorie_goal,
                    settings.daily_protein_goal,
                    settings.daily_carbs_goal,
                    settings.daily_fat_goal
                );
                Ok(())
            }

            GoalsSubcommand::Calculate {
                weight,
                goal,
                height_inches,
                height_cm,
                age,
                sex,
                activity,
                weeks,
                format,
            } => {
                let request = EnergyRequest {
                    current_weight: *weight,
                    goal_weight: *goal,
                    height_cm: *height_cm,
                    height_inches: *height_inches,
                    age: *age,
                    sex: sex.clone(),
                    activity: activity.clone(),
                    timeline_weeks: Some(*weeks),
                };
                let estimate = bmr_tdee(&request.into_params()?)?;

                match format {
                    OutputFormat::Json => print_json(&estimate)?,
                    OutputFormat::Text => {
                        println!("BMR:                  {} kcal", estimate.bmr);
                        println!("TDEE:                 {} kcal", estimate.tdee);
                        println!("Daily adjustment:     {:+} kcal", estimate.daily_deficit);
                        println!("Recommended calories: {} kcal", estimate.recommended_calories);
                        println!("Recommended protein:  {} g", estimate.recommended_protein);
                        println!("Weekly rate:          {:+.2} lb", estimate.weekly_rate);
                        for warning in &estimate.warnings {
                            println!("Warning: {}", warning);
                        }
                    }
                }
                Ok(())
            }

            GoalsSubcommand::Plan {
                start,
                weight,
                goal,
                target,
                calories,
                protein,
            } => {
                let plan = GoalPlan {
                    started_date: match start {
                        Some(s) => time_format::parse_date(s)?,
                        None => now.date(),
                    },
                    starting_weight: *weight,
                    goal_weight: *goal,
                    target_date: time_format::parse_date(target)?,
                    daily_calorie_goal: *calories,
                    daily_protein_goal: *protein,
                };
                ctx.journal.save_goal_plan(&ctx.user, plan, now).await?;
                println!("Saved goal plan: {} lb -> {} lb by {}", weight, goal, target);
                Ok(())
            }

            GoalsSubcommand::Projection { format } => {
                let doc = ctx.journal.read(&ctx.user).await?;
                let plan = doc
                    .goal_plan
                    .as_ref()
                    .ok_or_else(|| {
                        JournalError::not_found("goal plan (run `leanfit goals plan`)")
                    })?;
                let projection = goal_projection(&doc, plan, now);

                match format {
                    OutputFormat::Json => print_json(&projection)?,
                    OutputFormat::Text => {
                        println!("Status: {}", projection.status_text);
                        println!();
                        println!("Estimated weight: {:.1} lb", projection.current_weight);
                        println!("Lost so far:      {:.1} lb", projection.lbs_lost);
                        println!(
                            "To goal:          {:.1} lb in {} days",
                            projection.lbs_to_goal, projection.days_to_goal
                        );
                        println!(
                            "Weekly loss:      {:.2} lb (need {:.2})",
                            projection.actual_weekly_loss, projection.required_weekly_loss
                        );
                        println!(
                            "Days tracked:     {} ({} under target)",
                            projection.days_tracked, projection.days_under_target
                        );
                    }
                }
                Ok(())
            }
        }
    }
}
