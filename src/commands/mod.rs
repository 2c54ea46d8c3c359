use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::state::SortBy;
use crate::types::{Frequency, TimeOfDay};

#[derive(Parser, Debug)]
#[command(name = "wird", version, about = "Daily Quran reading reminders")]
pub struct Cli {
    /// JSON document holding reminders and history (overrides WIRD_DATA_FILE).
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Show active reminders and whether this period's reading is done
    List,
    /// Show catalog presets that are not active
    Presets,
    /// Create a custom reminder, or activate a preset with --preset
    Add(AddArgs),
    /// Change a stored reminder
    Edit(EditArgs),
    /// Delete a reminder and its schedule
    Remove { id: String },
    /// Turn a reminder or preset on
    Enable { id: String },
    /// Turn a reminder off (presets are removed)
    Disable { id: String },
    /// Toggle the read mark of the current period
    Read { id: String },
    /// Month view of completed and missed days
    Calendar {
        id: String,
        /// Defaults to the current year
        #[arg(long)]
        year: Option<i32>,
        /// 1-12, defaults to the current month
        #[arg(long)]
        month: Option<u32>,
    },
    /// Bookmark a word; repeating the same word clears it
    Bookmark {
        id: String,
        /// surah:ayah
        verse_key: String,
        #[arg(default_value_t = 1)]
        word: u32,
    },
    /// Write or replace a reflection on an ayah
    Reflect { surah: u16, ayah: u16, text: String },
    /// List reflections
    Reflections {
        #[arg(long)]
        search: Option<String>,
        #[arg(long, value_enum, default_value_t = SortArg::Date)]
        sort: SortArg,
    },
    /// Print a backup document to stdout or a file
    Export {
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Replace stored data with a backup document
    Import { file: PathBuf },
    /// Forget all read marks
    ClearHistory,
    /// Delete all reminders, history and bookmarks
    Reset,
    /// Deliver notifications from this process until Ctrl-C
    Run,
}

#[derive(Args, Debug, Clone)]
pub struct PassageArgs {
    /// Whole surah, or the surah of an ayah range
    #[arg(long)]
    pub surah: Option<u16>,
    /// First ayah of a range; requires --surah
    #[arg(long, requires = "surah")]
    pub from: Option<u16>,
    /// Last ayah of a range, defaults to --from
    #[arg(long, requires = "from")]
    pub to: Option<u16>,
    #[arg(long, conflicts_with_all = ["surah", "from", "to"])]
    pub juz: Option<u8>,
}

#[derive(Args, Debug, Clone)]
pub struct TimingArgs {
    #[arg(long, value_enum)]
    pub frequency: Option<FrequencyArg>,
    /// HH:MM
    #[arg(long)]
    pub time: Option<TimeOfDay>,
    /// 0 = Sunday .. 6 = Saturday
    #[arg(long)]
    pub day: Option<u8>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Activate a catalog preset instead of creating a reminder
    #[arg(long, conflicts_with_all = ["name", "surah", "juz"])]
    pub preset: Option<String>,
    #[arg(long)]
    pub name: Option<String>,
    #[command(flatten)]
    pub passage: PassageArgs,
    #[command(flatten)]
    pub timing: TimingArgs,
}

#[derive(Args, Debug)]
pub struct EditArgs {
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[command(flatten)]
    pub passage: PassageArgs,
    #[command(flatten)]
    pub timing: TimingArgs,
    /// Drop the schedule; the reminder stays in the list
    #[arg(long, conflicts_with_all = ["frequency", "time", "day"])]
    pub untimed: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrequencyArg {
    Daily,
    Weekly,
}

impl From<FrequencyArg> for Frequency {
    fn from(arg: FrequencyArg) -> Self {
        match arg {
            FrequencyArg::Daily => Frequency::Daily,
            FrequencyArg::Weekly => Frequency::Weekly,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortArg {
    Date,
    Surah,
}

impl From<SortArg> for SortBy {
    fn from(arg: SortArg) -> Self {
        match arg {
            SortArg::Date => SortBy::Date,
            SortArg::Surah => SortBy::Surah,
        }
    }
}
