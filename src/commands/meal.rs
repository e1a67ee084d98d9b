use clap::{Args, Subcommand};

use super::{print_json, Context, OutputFormat};
use leanfit::aggregate::daily_totals;
use leanfit::models::{time_format, MealEntry, MealInput, TemplateInput};

#[derive(Args)]
pub struct MealCommand {
    #[command(subcommand)]
    pub command: MealSubcommand,
}

#[derive(Subcommand)]
pub enum MealSubcommand {
    /// Log a meal
    Log {
        /// Calories
        #[arg(long, required_unless_present = "template")]
        calories: Option<i64>,

        /// What was eaten
        #[arg(long, short, default_value = "")]
        description: String,

        /// Protein in grams
        #[arg(long, short, default_value_t = 0)]
        protein: i64,

        /// Carbs in grams
        #[arg(long, default_value_t = 0)]
        carbs: i64,

        /// Fat in grams
        #[arg(long, default_value_t = 0)]
        fat: i64,

        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Time (HH:MM), defaults to now
        #[arg(long)]
        time: Option<String>,

        /// Log a copy of a saved meal template instead
        #[arg(long, conflicts_with = "calories")]
        template: Option<u32>,
    },

    /// List meals for a day
    List {
        /// Date (YYYY-MM-DD), defaults to today
        #[arg(long)]
        date: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Delete a meal by the index shown in `meal list`
    Delete {
        index: usize,
    },

    /// Save a meal template for quick logging
    SaveTemplate {
        name: String,

        #[arg(long)]
        calories: i64,

        #[arg(long, short, default_value = "")]
        description: String,

        #[arg(long, short, default_value_t = 0)]
        protein: i64,

        #[arg(long, default_value_t = 0)]
        carbs: i64,

        #[arg(long, default_value_t = 0)]
        fat: i64,
    },

    /// List saved meal templates
    Templates {
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },
}

impl MealCommand {
    pub async fn run(&self, ctx: &Context) -> Result<(), Box<dyn std::error::Error>> {
        let now = ctx.clock.now();

        match &self.command {
            MealSubcommand::Log {
                calories,
                description,
                protein,
                carbs,
                fat,
                date,
                time,
                template,
            } => {
                let meal = match (template, calories) {
                    (Some(id), _) => ctx.journal.log_from_template(&ctx.user, *id, now).await?,
                    (None, Some(calories)) => {
                        let input = MealInput {
                            description: description.clone(),
                            calories: *calories,
                            protein: *protein,
                            carbs: *carbs,
                            fat: *fat,
                            date: date.clone(),
                            time: time.clone(),
                        };
                        ctx.journal.log_meal(&ctx.user, input, now).await?
                    }
                    (None, None) => {
                        return Err("either --calories or --template is required".into())
                    }
                };
                println!("Logged: {}", meal);
                Ok(())
            }

            MealSubcommand::List { date, format } => {
                let date = match date {
                    Some(d) => time_format::parse_date(d)?,
                    None => now.date(),
                };
                let doc = ctx.journal.read(&ctx.user).await?;
                // Indices refer to the full sorted list, as `meal delete` expects.
                let meals: Vec<(usize, &MealEntry)> = doc
                    .meals
                    .iter()
                    .enumerate()
                    .filter(|(_, m)| m.date == date)
                    .collect();

                match format {
                    OutputFormat::Json => {
                        let list: Vec<&MealEntry> = meals.iter().map(|(_, m)| *m).collect();
                        print_json(&list)?;
                    }
                    OutputFormat::Text => {
                        if meals.is_empty() {
                            println!("No meals logged on {}.", date);
                            return Ok(());
                        }
                        for (index, meal) in &meals {
                            println!("[{}] {}", index, meal);
                        }
                        let totals = daily_totals(&doc, date);
                        println!(
                            "\nTotal: {} kcal (P {}g / C {}g / F {}g) of {} kcal goal",
                            totals.calories,
                            totals.protein,
                            totals.carbs,
                            totals.fat,
                            doc.settings.daily_calorie_goal
                        );
                    }
                }
                Ok(())
            }

            MealSubcommand::Delete { index } => {
                let meal = ctx.journal.delete_meal(&ctx.user, *index).await?;
                println!("Deleted: {}", meal);
                Ok(())
            }

            MealSubcommand::SaveTemplate {
                name,
                calories,
                description,
                protein,
                carbs,
                fat,
            } => {
                let input = TemplateInput {
                    name: name.clone(),
                    description: description.clone(),
                    calories: *calories,
                    protein: *protein,
                    carbs: *carbs,
                    fat: *fat,
                };
                let template = ctx.journal.add_template(&ctx.user, input).await?;
                println!("Saved template {} ({})", template.id, template.name);
                Ok(())
            }

            MealSubcommand::Templates { format } => {
                let doc = ctx.journal.read(&ctx.user).await?;
                match format {
                    OutputFormat::Json => print_json(&doc.meal_templates)?,
                    OutputFormat::Text => {
                        if doc.meal_templates.is_empty() {
                            println!("No meal templates saved.");
                        }
                        for t in &doc.meal_templates {
                            println!(
                                "{:>3}  {:<24} {:>5} kcal  P {}g / C {}g / F {}g",
                                t.id, t.name, t.calories, t.protein, t.carbs, t.fat
                            );
                        }
                    }
                }
                Ok(())
            }
        }
    }
}
