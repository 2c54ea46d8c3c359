use chrono::Datelike;
use std::error::Error;
use std::sync::Arc;

use crate::calendar::project_month;
use crate::commands::{AddArgs, Command, EditArgs, PassageArgs, TimingArgs};
use crate::display::{render_calendar, render_reminder_line};
use crate::handlers::run_daemon;
use crate::scheduler::TimerBackend;
use crate::state::{filter_reflections, sort_reflections, AppState};
use crate::types::{Frequency, Reminder, ReminderPatch, Target, Timing};

type HandlerResult = Result<(), Box<dyn Error + Send + Sync>>;

fn passage_from_args(args: &PassageArgs) -> Option<Target> {
    match (args.juz, args.surah, args.from, args.to) {
        (Some(juz_id), ..) => Some(Target::Juz { juz_id }),
        (None, Some(surah_id), Some(start_ayah), end) => Some(Target::AyahRange {
            surah_id,
            start_ayah,
            end_ayah: end.unwrap_or(start_ayah),
        }),
        (None, Some(surah_id), ..) => Some(Target::Surah { surah_id }),
        _ => None,
    }
}

/// Merge timing flags over `current`. `None` when no flag was given and nothing existed before.
fn timing_from_args(args: &TimingArgs, current: Option<Timing>) -> Option<Timing> {
    if args.frequency.is_none() && args.time.is_none() && args.day.is_none() {
        return current;
    }
    let base = current.unwrap_or(Timing {
        frequency: Frequency::Daily,
        time: Default::default(),
        day: None,
    });
    let frequency = args.frequency.map(Frequency::from).unwrap_or(base.frequency);
    let day = match frequency {
        Frequency::Daily => None,
        Frequency::Weekly => args.day.or(base.day),
    };
    Some(Timing {
        frequency,
        time: args.time.unwrap_or(base.time),
        day,
    })
}

async fn handle_add(state: &AppState, args: AddArgs) -> HandlerResult {
    if let Some(preset_id) = args.preset {
        let Some(preset) = state.find_reminder(&preset_id).await? else {
            println!("No preset with id {}", preset_id);
            return Ok(());
        };
        state.reminders.set_active(&preset, true).await?;
        println!("✅ Activated {}", preset.name);
        return Ok(());
    }

    let (Some(name), Some(target)) = (args.name, passage_from_args(&args.passage)) else {
        println!("A custom reminder needs --name and one of --surah, --surah/--from/--to or --juz");
        return Ok(());
    };
    let timing = timing_from_args(&args.timing, None);
    let reminder = Reminder::custom(name, target, timing, state.clock.now_ms());

    if state.reminders.add(reminder.clone()).await? {
        println!("✅ Added {} ({})", reminder.name, reminder.id);
    } else {
        println!("A reminder with id {} already exists", reminder.id);
    }
    Ok(())
}

async fn handle_edit(state: &AppState, args: EditArgs) -> HandlerResult {
    let Some(current) = state.reminders.get(&args.id).await? else {
        println!("No stored reminder with id {}", args.id);
        return Ok(());
    };

    let mut patch = ReminderPatch::default();
    if let Some(name) = args.name {
        patch = patch.name(name);
    }
    if let Some(target) = passage_from_args(&args.passage) {
        patch = patch.target(target);
    }
    if args.untimed {
        patch = patch.timing(None);
    } else {
        let timing = timing_from_args(&args.timing, current.timing);
        if timing != current.timing {
            patch = patch.timing(timing);
        }
    }

    if patch == ReminderPatch::default() {
        println!("Nothing to change");
        return Ok(());
    }
    state.reminders.update(&args.id, patch).await?;
    println!("✅ Updated {}", args.id);
    Ok(())
}

pub async fn command_handler(
    cmd: Command,
    state: Arc<AppState>,
    timer: Arc<TimerBackend>,
) -> HandlerResult {
    match cmd {
        Command::List => {
            let statuses = state.active_statuses().await?;
            if statuses.is_empty() {
                println!("No active reminders. Use `wird presets` or `wird add` to create one.");
            }
            for status in &statuses {
                println!("{}", render_reminder_line(status));
            }
        }
        Command::Presets => {
            for status in &state.inactive_preset_statuses().await? {
                println!("{}", render_reminder_line(status));
            }
        }
        Command::Add(args) => handle_add(&state, args).await?,
        Command::Edit(args) => handle_edit(&state, args).await?,
        Command::Remove { id } => {
            if state.reminders.remove(&id).await? {
                println!("🗑 Removed {}", id);
            } else {
                println!("No stored reminder with id {}", id);
            }
        }
        Command::Enable { id } => match state.find_reminder(&id).await? {
            Some(reminder) => {
                state.reminders.set_active(&reminder, true).await?;
                println!("🔔 Enabled {}", reminder.name);
            }
            None => println!("No reminder or preset with id {}", id),
        },
        Command::Disable { id } => match state.reminders.get(&id).await? {
            Some(reminder) => {
                state.reminders.set_active(&reminder, false).await?;
                println!("🔕 Disabled {}", reminder.name);
            }
            None => println!("No stored reminder with id {}", id),
        },
        Command::Read { id } => {
            let Some(reminder) = state.find_reminder(&id).await? else {
                println!("No reminder or preset with id {}", id);
                return Ok(());
            };
            if reminder.timing.is_none() {
                println!("{} has no schedule to mark as read", reminder.name);
                return Ok(());
            }
            if state.history.toggle_read(&reminder).await? {
                println!("✓ {} marked as read", reminder.name);
            } else {
                println!("{} marked as unread", reminder.name);
            }
        }
        Command::Calendar { id, year, month } => {
            let Some(reminder) = state.find_reminder(&id).await? else {
                println!("No reminder or preset with id {}", id);
                return Ok(());
            };
            let now = state.clock.now();
            let history = state.history.list().await?;
            let month = project_month(
                &reminder,
                &history,
                year.unwrap_or(now.year()),
                month.unwrap_or(now.month()),
                &now,
            )?;
            println!("{}", reminder.name);
            print!("{}", render_calendar(&month));
        }
        Command::Bookmark { id, verse_key, word } => {
            match state.bookmarks.toggle(&id, &verse_key, word).await? {
                Some(bookmark) => println!(
                    "🔖 {} at {} word {}",
                    id, bookmark.verse_key, bookmark.word_position
                ),
                None => println!("Bookmark of {} cleared", id),
            }
        }
        Command::Reflect { surah, ayah, text } => {
            let reflection = state.reflections.save(surah, ayah, &text).await?;
            println!("📝 Saved reflection on {}:{}", reflection.surah, reflection.ayah);
        }
        Command::Reflections { search, sort } => {
            let all = sort_reflections(&state.reflections.all().await?, sort.into());
            for reflection in filter_reflections(&all, search.as_deref().unwrap_or("")) {
                println!(
                    "{}:{}  {}  {}",
                    reflection.surah,
                    reflection.ayah,
                    reflection.updated_at.format("%Y-%m-%d"),
                    reflection.text
                );
            }
        }
        Command::Export { output } => {
            let json = state.export_json().await?;
            match output {
                Some(path) => {
                    tokio::fs::write(&path, json).await?;
                    println!("Backup written to {}", path.display());
                }
                None => println!("{}", json),
            }
        }
        Command::Import { file } => {
            let text = tokio::fs::read_to_string(&file).await?;
            let summary = state.import_backup(&text).await?;
            println!(
                "✅ Imported {} reminders, {} read events, {} bookmarks, {} reflections; \
                 {} rescheduled",
                summary.reminders.unwrap_or(0),
                summary.history.unwrap_or(0),
                summary.bookmarks.unwrap_or(0),
                summary.reflections.unwrap_or(0),
                summary.rescheduled
            );
        }
        Command::ClearHistory => {
            state.clear_history().await?;
            println!("Read history cleared");
        }
        Command::Reset => {
            state.reset_all().await?;
            println!("All reminders, history and bookmarks deleted");
        }
        Command::Run => run_daemon(state, timer).await?,
    }
    Ok(())
}
