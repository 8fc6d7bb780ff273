use clap::{Args, ValueEnum};
use std::io::{self, Write};

use crate::store::{today_key, FileStore, HabitError, HabitStore};

#[derive(Clone, ValueEnum, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Args)]
pub struct AddCommand {
    /// Habit title, e.g. "Drink water"
    pub title: String,
}

impl AddCommand {
    pub async fn run(
        &self,
        store: &mut HabitStore<FileStore>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        match store.add(&self.title).await {
            Ok(habit) => {
                println!("Added '{}' (id: {})", habit.title, habit.id);
                store.notifier().notify("Habit added");
                Ok(())
            }
            Err(e @ (HabitError::EmptyTitle | HabitError::DuplicateTitle(_))) => {
                // Rejected input is a user message, not a failure
                store.notifier().notify(&e.to_string());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Args)]
pub struct DoneCommand {
    /// Habit id (UUID) or title
    pub habit: String,
}

impl DoneCommand {
    pub async fn run(
        &self,
        store: &mut HabitStore<FileStore>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(habit) = store.find(&self.habit) else {
            println!("Habit not found: '{}'", self.habit);
            return Ok(());
        };
        let id = habit.id;

        match store.toggle_today(id).await {
            Ok(true) => store.notifier().notify("Marked complete"),
            Ok(false) => store.notifier().notify("Marked incomplete"),
            // target vanished between resolve and toggle; nothing to do
            Err(HabitError::NotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
        Ok(())
    }
}

#[derive(Args)]
pub struct RemoveCommand {
    /// Habit id (UUID) or title
    pub habit: String,

    /// Skip the confirmation prompt
    #[arg(long, short)]
    pub yes: bool,
}

impl RemoveCommand {
    pub async fn run(
        &self,
        store: &mut HabitStore<FileStore>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let Some(habit) = store.find(&self.habit) else {
            println!("Habit not found: '{}'", self.habit);
            return Ok(());
        };
        let id = habit.id;
        let title = habit.title.clone();

        if !self.yes && !confirm(&format!("Delete habit '{}'?", title))? {
            println!("Cancelled.");
            return Ok(());
        }

        store.remove(id).await;
        store.notifier().notify("Habit deleted");
        Ok(())
    }
}

#[derive(Args)]
pub struct ListCommand {
    /// Output format
    #[arg(long, short, value_enum, default_value = "text")]
    pub format: OutputFormat,
}

impl ListCommand {
    pub fn run(&self, store: &HabitStore<FileStore>) -> Result<(), Box<dyn std::error::Error>> {
        if store.habits().is_empty() {
            println!("No habits yet. Run 'recate add <title>' to create your first habit.");
            return Ok(());
        }

        let rows = store.view(today_key());

        match self.format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(&rows)?);
            }
            OutputFormat::Text => {
                for row in &rows {
                    let done = if row.completed_today { "x" } else { " " };
                    println!(
                        "[{}] {:<24} streak {:>3}   created {}",
                        done,
                        row.habit.title,
                        row.streak,
                        row.habit.created_at.format("%Y-%m-%d")
                    );
                }
                println!("\nTotal: {} habit(s)", rows.len());
            }
        }

        Ok(())
    }
}

/// Yes/no prompt on stdin. Defaults to no.
fn confirm(prompt: &str) -> io::Result<bool> {
    print!("{} [y/N]: ", prompt);
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().read_line(&mut answer)?;
    let answer = answer.trim().to_lowercase();
    Ok(answer == "y" || answer == "yes")
}
