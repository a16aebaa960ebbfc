use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};
use medtrack_core::*;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "medtrack")]
#[command(about = "Medication reminder and adherence tracker", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Override data directory
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Register a medication and materialize its reminder schedule
    Add {
        /// Medication name
        name: String,

        /// Reminder time of day, HH:MM
        #[arg(long)]
        time: String,

        /// Weekdays, comma separated (mon,wed,fri), or "daily"
        #[arg(long)]
        days: String,

        /// Dosage text (e.g. "10mg")
        #[arg(long)]
        dosage: Option<String>,

        /// Frequency descriptor (daily, twice-daily, weekly, monthly, custom)
        #[arg(long, default_value = "daily")]
        frequency: String,

        /// Free-form notes
        #[arg(long)]
        notes: Option<String>,
    },

    /// List registered medications
    List,

    /// Show today's doses with their status (default)
    Today,

    /// Mark a dose taken
    Take {
        /// Occurrence id (shown by `today`)
        occurrence_id: String,

        /// Taken timestamp, YYYY-MM-DDTHH:MM (defaults to now)
        #[arg(long)]
        at: Option<String>,
    },

    /// Mark a dose missed
    Miss {
        /// Occurrence id (shown by `today`)
        occurrence_id: String,
    },

    /// Adherence report (current week through today by default)
    Adherence {
        /// Range start, YYYY-MM-DD
        #[arg(long)]
        from: Option<String>,

        /// Range end, YYYY-MM-DD
        #[arg(long)]
        to: Option<String>,
    },

    /// Export occurrence history to CSV
    Export {
        /// Output file path
        #[arg(long)]
        output: PathBuf,

        /// Range start, YYYY-MM-DD (defaults to the beginning of history)
        #[arg(long)]
        from: Option<String>,

        /// Range end, YYYY-MM-DD (defaults to the end of history)
        #[arg(long)]
        to: Option<String>,
    },

    /// Remove a medication (its dose history is retained)
    Remove {
        /// Medication id (shown by `list`)
        medication_id: String,
    },

    /// Materialize a fresh horizon batch for a medication
    Extend {
        /// Medication id (shown by `list`)
        medication_id: String,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    medtrack_core::logging::init();

    let cli = Cli::parse();

    // Determine data directory
    let config = Config::load()?;
    let data_dir = cli.data_dir.unwrap_or_else(|| config.data.data_dir.clone());
    let store_path = data_dir.join("store.json");

    match cli.command {
        Some(Commands::Add {
            name,
            time,
            days,
            dosage,
            frequency,
            notes,
        }) => cmd_add(&store_path, &config, name, time, days, dosage, frequency, notes),
        Some(Commands::List) => cmd_list(&store_path),
        Some(Commands::Today) => cmd_today(&store_path),
        Some(Commands::Take { occurrence_id, at }) => cmd_take(&store_path, occurrence_id, at),
        Some(Commands::Miss { occurrence_id }) => cmd_miss(&store_path, occurrence_id),
        Some(Commands::Adherence { from, to }) => cmd_adherence(&store_path, from, to),
        Some(Commands::Export { output, from, to }) => cmd_export(&store_path, &output, from, to),
        Some(Commands::Remove { medication_id }) => cmd_remove(&store_path, medication_id),
        Some(Commands::Extend { medication_id }) => {
            cmd_extend(&store_path, &config, medication_id)
        }
        None => {
            // Default to "today" command
            cmd_today(&store_path)
        }
    }
}

fn load_store(path: &Path) -> Result<MemoryStore> {
    Ok(MemoryStore::from_snapshot(StoreSnapshot::load(path)?))
}

fn save_store(store: &MemoryStore, path: &Path) -> Result<()> {
    store.snapshot().save(path)
}

fn now() -> NaiveDateTime {
    chrono::Local::now().naive_local()
}

#[allow(clippy::too_many_arguments)]
fn cmd_add(
    store_path: &Path,
    config: &Config,
    name: String,
    time: String,
    days: String,
    dosage: Option<String>,
    frequency: String,
    notes: Option<String>,
) -> Result<()> {
    let reminder_time = parse_time(&time)?;
    let days = parse_days(&days)?;

    let frequency = match Frequency::parse(&frequency) {
        Some(f) => f,
        None => {
            eprintln!("Unknown frequency: {}. Using daily.", frequency);
            Frequency::Daily
        }
    };

    let new = NewMedication {
        name,
        dosage,
        reminder_time,
        frequency,
        days,
        notes,
        user_id: None,
    };

    let errors = new.validate();
    if !errors.is_empty() {
        eprintln!("Invalid medication definition:");
        for error in &errors {
            eprintln!("  - {}", error);
        }
        return Err(Error::Validation(errors.join("; ")));
    }

    let mut store = load_store(store_path)?;
    let medication =
        tracker::add_medication(&mut store, new, now(), config.schedule.horizon_days)?;
    save_store(&store, store_path)?;

    println!("✓ Medication added: {}", medication.name);
    println!("  id: {}", medication.id);
    println!(
        "  schedule: {} at {}",
        format_days(&medication.days),
        medication.reminder_time.format("%H:%M")
    );
    Ok(())
}

fn cmd_list(store_path: &Path) -> Result<()> {
    let store = load_store(store_path)?;
    let medications = store.medications()?;

    if medications.is_empty() {
        println!("No medications registered.");
        return Ok(());
    }

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  MEDICATIONS");
    println!("╰─────────────────────────────────────────╯");
    println!();

    for medication in medications {
        match &medication.dosage {
            Some(dosage) => println!("  {} ({})", medication.name, dosage),
            None => println!("  {}", medication.name),
        }
        println!(
            "    {} at {}",
            format_days(&medication.days),
            medication.reminder_time.format("%H:%M")
        );
        if let Some(ref notes) = medication.notes {
            println!("    note: {}", notes);
        }
        println!("    id: {}", medication.id);
        println!();
    }

    Ok(())
}

fn cmd_today(store_path: &Path) -> Result<()> {
    let mut store = load_store(store_path)?;
    let now = now();
    let entries = tracker::today_view(&mut store, now)?;
    save_store(&store, store_path)?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  TODAY — {}", now.format("%Y-%m-%d (%a)"));
    println!("╰─────────────────────────────────────────╯");
    println!();

    if entries.is_empty() {
        println!("  Nothing scheduled today.");
        println!();
        return Ok(());
    }

    for entry in entries {
        let glyph = status_glyph(entry.status);
        match &entry.dosage {
            Some(dosage) => println!(
                "  {} {}  {} ({}) — {}",
                glyph,
                entry.scheduled_at.format("%H:%M"),
                entry.name,
                dosage,
                entry.status
            ),
            None => println!(
                "  {} {}  {} — {}",
                glyph,
                entry.scheduled_at.format("%H:%M"),
                entry.name,
                entry.status
            ),
        }
        if let Some(taken_at) = entry.taken_at {
            println!("      taken at {}", taken_at.format("%H:%M"));
        }
        println!("      id: {}", entry.occurrence_id);
    }
    println!();

    Ok(())
}

fn cmd_take(store_path: &Path, occurrence_id: String, at: Option<String>) -> Result<()> {
    let id = parse_id(&occurrence_id)?;
    let taken_at = at.as_deref().map(parse_datetime).transpose()?;

    let mut store = load_store(store_path)?;
    let occurrence = tracker::mark_taken(&mut store, id, taken_at, now())?;
    save_store(&store, store_path)?;

    println!(
        "✓ Dose marked taken at {}",
        occurrence
            .taken_at
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_default()
    );
    Ok(())
}

fn cmd_miss(store_path: &Path, occurrence_id: String) -> Result<()> {
    let id = parse_id(&occurrence_id)?;

    let mut store = load_store(store_path)?;
    tracker::mark_missed(&mut store, id)?;
    save_store(&store, store_path)?;

    println!("✓ Dose marked missed");
    Ok(())
}

fn cmd_adherence(store_path: &Path, from: Option<String>, to: Option<String>) -> Result<()> {
    let now = now();
    let start = from
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| week_start(now.date()));
    let end = to
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or_else(|| now.date());

    let mut store = load_store(store_path)?;
    let report = tracker::adherence_report(&mut store, start, end, now)?;
    save_store(&store, store_path)?;

    println!("\n╭─────────────────────────────────────────╮");
    println!("│  ADHERENCE {} — {}", start, end);
    println!("╰─────────────────────────────────────────╯");
    println!();

    for day in &report.days {
        println!(
            "  {} {}   taken {:>2}  missed {:>2}  upcoming {:>2}   {:>3}%",
            day.weekday,
            day.date,
            day.taken,
            day.missed,
            day.upcoming,
            (day.adherence_rate * 100.0).round() as u32
        );
    }
    println!();
    println!("  Overall adherence: {}%", report.overall_adherence);
    println!();

    Ok(())
}

fn cmd_export(
    store_path: &Path,
    output: &Path,
    from: Option<String>,
    to: Option<String>,
) -> Result<()> {
    let start = from
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or(NaiveDate::MIN);
    let end = to
        .as_deref()
        .map(parse_date)
        .transpose()?
        .unwrap_or(NaiveDate::MAX);

    let store = load_store(store_path)?;
    let occurrences = store.occurrences_between(start, end)?;
    let count = export_occurrences(output, &occurrences)?;

    println!("✓ Exported {} occurrences", count);
    println!("  CSV: {}", output.display());
    Ok(())
}

fn cmd_remove(store_path: &Path, medication_id: String) -> Result<()> {
    let id = parse_id(&medication_id)?;

    let mut store = load_store(store_path)?;
    let medication = store.medication(id)?;
    store.delete_medication(id)?;
    save_store(&store, store_path)?;

    println!("✓ Removed {} (dose history retained)", medication.name);
    Ok(())
}

fn cmd_extend(store_path: &Path, config: &Config, medication_id: String) -> Result<()> {
    let id = parse_id(&medication_id)?;

    let mut store = load_store(store_path)?;
    let created = tracker::extend_horizon(&mut store, id, now(), config.schedule.horizon_days)?;
    save_store(&store, store_path)?;

    println!("✓ Materialized {} new occurrences", created);
    Ok(())
}

fn status_glyph(status: OccurrenceStatus) -> &'static str {
    match status {
        OccurrenceStatus::Taken => "✓",
        OccurrenceStatus::Missed => "✗",
        OccurrenceStatus::Upcoming => "○",
    }
}

fn format_days(days: &BTreeSet<Weekday>) -> String {
    if days.len() == 7 {
        return "every day".to_string();
    }
    days.iter()
        .map(Weekday::abbrev)
        .collect::<Vec<_>>()
        .join(", ")
}

fn parse_id(input: &str) -> Result<Uuid> {
    Uuid::parse_str(input.trim())
        .map_err(|_| Error::Validation(format!("Invalid id '{}' (expected a UUID)", input)))
}

fn parse_time(input: &str) -> Result<NaiveTime> {
    NaiveTime::parse_from_str(input.trim(), "%H:%M")
        .map_err(|_| Error::Validation(format!("Invalid time of day '{}' (expected HH:MM)", input)))
}

fn parse_date(input: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(input.trim(), "%Y-%m-%d")
        .map_err(|_| Error::Validation(format!("Invalid date '{}' (expected YYYY-MM-DD)", input)))
}

fn parse_datetime(input: &str) -> Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(input.trim(), "%Y-%m-%dT%H:%M").map_err(|_| {
        Error::Validation(format!(
            "Invalid timestamp '{}' (expected YYYY-MM-DDTHH:MM)",
            input
        ))
    })
}

fn parse_days(input: &str) -> Result<BTreeSet<Weekday>> {
    let trimmed = input.trim().to_lowercase();
    if trimmed == "daily" || trimmed == "all" || trimmed == "everyday" {
        return Ok(Weekday::ALL.into_iter().collect());
    }

    let mut days = BTreeSet::new();
    for part in trimmed.split(',') {
        match Weekday::parse(part) {
            Some(day) => {
                days.insert(day);
            }
            None => {
                return Err(Error::Validation(format!(
                    "Unknown weekday '{}' (expected mon..sun or \"daily\")",
                    part.trim()
                )));
            }
        }
    }
    Ok(days)
}
