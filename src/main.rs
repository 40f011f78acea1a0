use anyhow::Result;
use clap::{Parser, ValueEnum};

use habit_sync::model::{Habit, HabitLevel};
use habit_sync::persistence::{setup_local_store, DB_PATH};
use habit_sync::sync::store::{MockRemoteStore, StoreFacade};
use habit_sync::SyncOrchestrator;

#[derive(ValueEnum, Clone, Debug)]
enum SessionMode {
    /// Guest session against the local JSON store.
    Local,
    /// Signed-in session against the in-memory simulated remote store.
    Remote,
}

#[derive(Parser)]
#[command(author, version, about)]
struct Args {
    #[arg(long, default_value = DB_PATH)]
    data_path: String,

    #[arg(long, value_enum, default_value_t = SessionMode::Local)]
    session_mode: SessionMode,

    /// Habit to track in this demo run.
    #[arg(long, default_value = "Meditation")]
    habit: String,

    /// Level to record for today (by name).
    #[arg(long, default_value = "Good")]
    level: String,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    println!("[MAIN] Session mode: {:?}", args.session_mode);

    let local = setup_local_store(&args.data_path)?;
    let facade = StoreFacade::new(local, MockRemoteStore::new());
    let mut orch = SyncOrchestrator::new(facade)
        .with_error_notifier(|err| eprintln!("[MAIN] persistence error: {err}"));

    match args.session_mode {
        SessionMode::Local => orch.start_guest()?,
        SessionMode::Remote => orch.sign_in("demo-user")?,
    }

    let existing = orch.habits().iter().find(|h| h.name == args.habit).cloned();
    let habit = match existing {
        Some(habit) => habit,
        None => {
            println!("[MAIN] creating habit \"{}\"", args.habit);
            orch.create_habit(sample_habit(&args.habit))?
        }
    };

    let level = match pick_level(&habit, &args.level) {
        Some(level) => level.clone(),
        // Possible with a hand-edited store file.
        None => anyhow::bail!("habit \"{}\" has no levels defined", habit.name),
    };

    println!("[MAIN] recording \"{}\" at level \"{}\"", habit.name, level.name);
    orch.select_level(&habit.id, &level.id)?;
    orch.pump();

    match orch.entry_for_today(&habit.id) {
        Some(entry) => println!("[MAIN] today's entry: {} -> {}", entry.date, level.name),
        None => println!("[MAIN] today's entry toggled off"),
    }

    print_summary(&orch, &habit);
    Ok(())
}

/// The named level, or the first one as a fallback.
fn pick_level<'a>(habit: &'a Habit, wanted: &str) -> Option<&'a HabitLevel> {
    habit
        .levels
        .iter()
        .find(|l| l.name == wanted)
        .or_else(|| habit.levels.first())
}

fn sample_habit(name: &str) -> Habit {
    Habit::new(
        name,
        "demo habit",
        vec![
            HabitLevel {
                id: "basic".into(),
                name: "Basic".into(),
                description: "Showed up".into(),
                value: 1,
            },
            HabitLevel {
                id: "good".into(),
                name: "Good".into(),
                description: "Solid effort".into(),
                value: 2,
            },
            HabitLevel {
                id: "great".into(),
                name: "Great".into(),
                description: "Went beyond".into(),
                value: 3,
            },
        ],
    )
}

fn print_summary<L, R>(orch: &SyncOrchestrator<L, R>, habit: &Habit)
where
    L: habit_sync::sync::store::LocalStore,
    R: habit_sync::sync::store::RemoteStore,
{
    let summary = orch.summary(&habit.id);

    println!();
    println!("==================================================");
    println!("  {}", habit.name);
    println!("==================================================");
    println!("{:<20} | {}", "Total completions", summary.total_entries);
    println!("{:<20} | {} days", "Current streak", summary.current_streak);
    println!("{:<20} | {} days", "Longest streak", summary.longest_streak);
    println!("{:<20} | {}", "This week", summary.weekly_entries);
    println!("{:<20} | {}", "This month", summary.monthly_entries);
    println!("{:<20} | {}", "This year", summary.yearly_entries);
    println!("--------------------------------------------------");
    for level in &habit.levels {
        let count = summary.level_distribution.get(&level.id).copied().unwrap_or(0);
        println!("{:<20} | {}", level.name, count);
    }
    println!("==================================================");
}
