use ascension::config::Config;
use ascension::layout::{layout, timed_occurrences};
use ascension::model::{DailyLog, Goal, GoalGraph, Priority, Recurrence, ScheduledTime};
use ascension::queue::effective_priority;
use ascension::schedule::{agenda, project, AgendaOptions, CompletionFilter, Occurrence};
use ascension::store::{GoalPatch, GoalStore};
use ascension::{export, persist};
use chrono::{Local, NaiveDate};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use colored::Colorize;
use std::collections::HashSet;
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

type CliResult = Result<(), Box<dyn std::error::Error>>;

#[derive(Parser, Debug)]
#[command(name = "ascension")]
#[command(author, version, about = "Goal graph with a derived task queue and day planner")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create .ascension/ with a config and an empty state file
    Init,

    /// Add a goal
    Add {
        content: String,

        /// Parent goal id (or unique prefix)
        #[arg(short, long)]
        parent: Option<String>,

        /// P0, P1 or P2 (default from config)
        #[arg(short = 'P', long)]
        priority: Option<Priority>,
    },

    /// Show the goal tree
    List {
        /// Include completed goals
        #[arg(short, long)]
        all: bool,
    },

    /// Show one goal in detail
    Show { id: String },

    /// Change fields of a goal
    Update {
        id: String,

        #[arg(short, long)]
        content: Option<String>,

        #[arg(short = 'P', long)]
        priority: Option<Priority>,

        /// none, daily, weekly or monthly
        #[arg(short, long)]
        recurrence: Option<Recurrence>,

        /// First day of a multi-day span (YYYY-MM-DD)
        #[arg(long)]
        start: Option<NaiveDate>,

        /// Last day of a multi-day span (YYYY-MM-DD)
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Clear both span dates
        #[arg(long, conflicts_with_all = ["start", "end"])]
        clear_dates: bool,

        /// Duration in minutes
        #[arg(short, long)]
        duration: Option<u32>,
    },

    /// Add a parent edge
    Link { id: String, parent: String },

    /// Remove all parent edges of a goal
    Unlink { id: String },

    /// Delete a goal
    Rm { id: String },

    /// Mark a goal complete
    Done { id: String },

    /// Mark a goal incomplete again
    Reopen { id: String },

    /// Focus a goal (reopens it); without an id clears the focus
    Activate { id: Option<String> },

    /// Toggle the "today" flag
    Today { id: String },

    /// Set a goal's priority
    Priority { id: String, priority: Priority },

    /// Give a goal a time slot (YYYY-MM-DDTHH:MM, or HH:MM for today)
    Schedule {
        id: String,
        when: ScheduledTime,

        /// Minutes (default 60)
        #[arg(short, long)]
        duration: Option<u32>,
    },

    /// Remove a goal's time slot
    Unschedule { id: String },

    /// Manage sub-goals
    Sub {
        #[command(subcommand)]
        action: SubAction,
    },

    /// Keep a journal tied to the active goal
    Log {
        #[command(subcommand)]
        action: LogAction,
    },

    /// Show the task queue
    Queue {
        #[arg(long)]
        json: bool,
    },

    /// Pin goals to the front of the queue, in the given order
    Reorder {
        #[arg(required = true)]
        ids: Vec<String>,
    },

    /// Show one day (default today)
    Day {
        date: Option<NaiveDate>,

        #[arg(long)]
        json: bool,

        /// Include completed items
        #[arg(short, long)]
        all: bool,
    },

    /// List upcoming days
    Agenda {
        /// Number of days (default from config)
        #[arg(short, long)]
        days: Option<u32>,

        /// Leave out daily routines
        #[arg(long)]
        hide_daily: bool,

        #[arg(long)]
        json: bool,
    },

    /// Write a portable export document
    Export { path: PathBuf },

    /// Replace all goals with an export document
    Import { path: PathBuf },

    /// Print the goal graph as Graphviz DOT
    Dot {
        /// Only these roots and their descendants
        #[arg(short, long)]
        root: Vec<String>,

        /// Graph title
        #[arg(short, long)]
        title: Option<String>,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Generate shell completions
    Completion { shell: Shell },
}

#[derive(Subcommand, Debug)]
enum SubAction {
    /// Add a sub-goal
    Add { goal: String, content: String },

    /// Toggle a sub-goal's completion
    Toggle { goal: String, sub: String },

    /// Delete a sub-goal
    Rm { goal: String, sub: String },

    /// Put a sub-goal on the calendar
    Schedule {
        goal: String,
        sub: String,
        when: ScheduledTime,

        /// Minutes (default 30)
        #[arg(short, long)]
        duration: Option<u32>,
    },

    /// Take a sub-goal off the calendar
    Unschedule { goal: String, sub: String },
}

#[derive(Subcommand, Debug)]
enum LogAction {
    /// Write an entry, linked to the active goal
    Add { content: String },

    /// List entries, oldest first
    List {
        /// Only entries written for this goal
        #[arg(short, long)]
        goal: Option<String>,

        #[arg(long)]
        json: bool,
    },

    /// Replace the text of an entry
    Edit { id: String, content: String },

    /// Delete an entry
    Rm { id: String },
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli.command) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env("ASCENSION_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Loaded state plus where it came from
struct Session {
    path: PathBuf,
    store: GoalStore,
    config: Config,
}

impl Session {
    fn open() -> Result<Self, Box<dyn std::error::Error>> {
        let config = Config::load();
        let path = persist::state_path();
        let mut store = persist::load(&path)?;
        store.default_priority = config.goals.default_priority;
        Ok(Self {
            path,
            store,
            config,
        })
    }

    fn save(&self) -> CliResult {
        persist::save(&self.path, &self.store)?;
        Ok(())
    }

    fn resolve(&self, id: &str) -> Result<String, Box<dyn std::error::Error>> {
        Ok(self.store.resolve_id(id)?)
    }

    fn label(&self, id: &str) -> String {
        match self.store.get(id) {
            Some(goal) => format!("{} {}", goal.short_id().dimmed(), goal.content),
            None => id.to_string(),
        }
    }
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Undated times given on the command line mean today
fn dated(when: ScheduledTime) -> ScheduledTime {
    match when.date {
        Some(_) => when,
        None => ScheduledTime::at(today(), when.time),
    }
}

fn run(command: Command) -> CliResult {
    match command {
        Command::Init => {
            let cwd = std::env::current_dir()?;
            ascension::init::init_project(&cwd)?;
        }

        Command::Completion { shell } => {
            clap_complete::generate(shell, &mut Cli::command(), "ascension", &mut io::stdout());
        }

        Command::Add {
            content,
            parent,
            priority,
        } => {
            let mut s = Session::open()?;
            let parent = parent.map(|p| s.resolve(&p)).transpose()?;
            let id = s.store.add_goal(content, parent.as_deref())?;
            if let Some(priority) = priority {
                s.store.set_goal_priority(&id, priority)?;
            }
            s.save()?;
            println!("{} {}", "Created".green(), s.label(&id));
        }

        Command::List { all } => {
            let s = Session::open()?;
            print_tree(&s.store, all);
        }

        Command::Show { id } => {
            let s = Session::open()?;
            let id = s.resolve(&id)?;
            print_goal(&s.store, &id);
        }

        Command::Update {
            id,
            content,
            priority,
            recurrence,
            start,
            end,
            clear_dates,
            duration,
        } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            let patch = GoalPatch {
                content,
                priority,
                recurrence,
                start_date: if clear_dates { Some(None) } else { start.map(Some) },
                end_date: if clear_dates { Some(None) } else { end.map(Some) },
                duration: duration.map(Some),
                is_today: None,
            };
            if patch.is_empty() {
                return Err("nothing to update".into());
            }
            s.store.update_goal(&id, patch)?;
            s.save()?;
            println!("{} {}", "Updated".green(), s.label(&id));
        }

        Command::Link { id, parent } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            let parent = s.resolve(&parent)?;
            s.store.link_goal(&id, &parent)?;
            s.save()?;
            println!("{} {} -> {}", "Linked".green(), s.label(&parent), s.label(&id));
        }

        Command::Unlink { id } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            s.store.unlink_goal(&id)?;
            s.save()?;
            println!("{} {}", "Unlinked".green(), s.label(&id));
        }

        Command::Rm { id } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            let label = s.label(&id);
            s.store.delete_goal(&id)?;
            s.save()?;
            println!("{} {}", "Deleted".green(), label);
        }

        Command::Done { id } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            s.store.complete_goal(&id)?;
            s.save()?;
            println!("{} {}", "Completed".green(), s.label(&id));
            if let Some(active) = s.store.active_goal() {
                println!("   Focus: {}", active.content.cyan());
            }
        }

        Command::Reopen { id } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            s.store.reopen_goal(&id)?;
            s.save()?;
            println!("{} {}", "Reopened".green(), s.label(&id));
        }

        Command::Activate { id } => {
            let mut s = Session::open()?;
            let id = id.map(|i| s.resolve(&i)).transpose()?;
            s.store.set_active_goal(id.as_deref())?;
            s.save()?;
            match id {
                Some(id) => println!("{} {}", "Focused".green(), s.label(&id)),
                None => println!("{}", "Focus cleared".green()),
            }
        }

        Command::Today { id } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            let on = s.store.toggle_goal_today(&id)?;
            s.save()?;
            let state = if on { "on" } else { "off" };
            println!("{} today={} {}", "Updated".green(), state, s.label(&id));
        }

        Command::Priority { id, priority } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            s.store.set_goal_priority(&id, priority)?;
            s.save()?;
            println!("{} {} {}", "Updated".green(), priority, s.label(&id));
        }

        Command::Schedule { id, when, duration } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            let goal = s.store.get(&id).ok_or("goal vanished")?;
            // Recurring and ranged goals take a bare time of day
            let keep_undated = goal.recurrence.is_recurring() || goal.start_date.is_some();
            let when = if keep_undated { when } else { dated(when) };
            s.store.set_goal_schedule(&id, Some(when), duration)?;
            s.save()?;
            println!("{} {} at {}", "Scheduled".green(), s.label(&id), when);
        }

        Command::Unschedule { id } => {
            let mut s = Session::open()?;
            let id = s.resolve(&id)?;
            s.store.set_goal_schedule(&id, None, None)?;
            s.save()?;
            println!("{} {}", "Unscheduled".green(), s.label(&id));
        }

        Command::Sub { action } => run_sub(action)?,

        Command::Log { action } => run_log(action)?,

        Command::Queue { json } => {
            let s = Session::open()?;
            let queue = s.store.queue();
            if json {
                println!("{}", serde_json::to_string_pretty(&queue)?);
                return Ok(());
            }
            if queue.is_empty() {
                println!("Nothing to do. Add a goal with 'ascension add'.");
            }
            for (i, item) in queue.iter().enumerate() {
                let root = item
                    .root
                    .map(|r| format!(" ({})", r.content).dimmed().to_string())
                    .unwrap_or_default();
                println!(
                    "{:>3}. {} {} {}{}",
                    i + 1,
                    paint_priority(item.effective_priority),
                    item.goal.short_id().dimmed(),
                    item.goal.content,
                    root
                );
            }
        }

        Command::Reorder { ids } => {
            let mut s = Session::open()?;
            let ids = ids
                .iter()
                .map(|i| s.resolve(i))
                .collect::<Result<Vec<_>, _>>()?;
            s.store.update_order(&ids);
            s.save()?;
            println!("{} task order ({} pinned)", "Updated".green(), ids.len());
        }

        Command::Day { date, json, all } => {
            let s = Session::open()?;
            let date = date.unwrap_or_else(today);
            let filter = if all {
                CompletionFilter::IncludeCompleted
            } else {
                CompletionFilter::ExcludeCompleted
            };
            print_day(&s, date, filter, json)?;
        }

        Command::Agenda {
            days,
            hide_daily,
            json,
        } => {
            let s = Session::open()?;
            let days = days.unwrap_or(s.config.agenda.days);
            let options = AgendaOptions {
                hide_daily: hide_daily || s.config.agenda.options().hide_daily,
            };
            let listing = agenda(s.store.goals(), today(), days, options);
            if json {
                println!("{}", serde_json::to_string_pretty(&listing)?);
                return Ok(());
            }
            if listing.is_empty() {
                println!("Nothing scheduled in the next {} days.", days);
            }
            for day in &listing {
                println!("{}", day.date.format("%a %Y-%m-%d").to_string().bold());
                for item in &day.items {
                    println!("  {}", occurrence_line(item));
                }
            }
        }

        Command::Export { path } => {
            let s = Session::open()?;
            std::fs::write(&path, persist::export_json(&s.store)?)?;
            println!("{} {} goals to {}", "Exported".green(), s.store.goals.len(), path.display());
        }

        Command::Import { path } => {
            let mut s = Session::open()?;
            let contents = std::fs::read_to_string(&path)?;
            persist::import_json(&mut s.store, &contents)?;
            s.save()?;
            println!("{} {} goals from {}", "Imported".green(), s.store.goals.len(), path.display());
        }

        Command::Dot {
            root,
            title,
            output,
        } => {
            let s = Session::open()?;
            let roots = root
                .iter()
                .map(|r| s.resolve(r))
                .collect::<Result<Vec<_>, _>>()?;
            let goals = if roots.is_empty() {
                s.store.goals.clone()
            } else {
                export::filter_goals_from_roots(s.store.goals(), &roots)
            };
            let config = export::DotConfig {
                title,
                ..Default::default()
            };
            let dot = export::graph_to_dot(&goals, &config);
            match output {
                Some(path) => {
                    std::fs::write(&path, dot)?;
                    println!("{} {}", "Wrote".green(), path.display());
                }
                None => print!("{}", dot),
            }
        }
    }

    Ok(())
}

fn run_sub(action: SubAction) -> CliResult {
    let mut s = Session::open()?;

    match action {
        SubAction::Add { goal, content } => {
            let goal = s.resolve(&goal)?;
            let sub = s.store.add_sub_goal(&goal, content)?;
            s.save()?;
            println!("{} sub-goal {} on {}", "Added".green(), ascension::model::short_id(&sub), s.label(&goal));
        }
        SubAction::Toggle { goal, sub } => {
            let goal = s.resolve(&goal)?;
            let sub = s.store.resolve_sub_goal_id(&goal, &sub)?;
            let done = s.store.toggle_sub_goal(&goal, &sub)?;
            s.save()?;
            let state = if done { "done" } else { "open" };
            println!("{} sub-goal is now {}", "Updated".green(), state);
        }
        SubAction::Rm { goal, sub } => {
            let goal = s.resolve(&goal)?;
            let sub = s.store.resolve_sub_goal_id(&goal, &sub)?;
            s.store.delete_sub_goal(&goal, &sub)?;
            s.save()?;
            println!("{} sub-goal", "Deleted".green());
        }
        SubAction::Schedule {
            goal,
            sub,
            when,
            duration,
        } => {
            let goal = s.resolve(&goal)?;
            let sub = s.store.resolve_sub_goal_id(&goal, &sub)?;
            let when = dated(when);
            s.store.schedule_sub_goal(&goal, &sub, when, duration)?;
            s.save()?;
            println!("{} sub-goal at {}", "Scheduled".green(), when);
        }
        SubAction::Unschedule { goal, sub } => {
            let goal = s.resolve(&goal)?;
            let sub = s.store.resolve_sub_goal_id(&goal, &sub)?;
            s.store.unschedule_sub_goal(&goal, &sub)?;
            s.save()?;
            println!("{} sub-goal", "Unscheduled".green());
        }
    }

    Ok(())
}

fn run_log(action: LogAction) -> CliResult {
    let mut s = Session::open()?;

    match action {
        LogAction::Add { content } => {
            let id = s.store.add_daily_log(content);
            s.save()?;
            let target = s
                .store
                .active_goal()
                .map(|g| format!(" for {}", g.content.cyan()))
                .unwrap_or_default();
            println!("{} log entry {}{}", "Added".green(), ascension::model::short_id(&id), target);
        }
        LogAction::List { goal, json } => {
            let goal = goal.map(|g| s.resolve(&g)).transpose()?;
            let logs: Vec<&DailyLog> = match &goal {
                Some(goal) => s.store.logs_for_goal(goal),
                None => s.store.daily_logs().iter().collect(),
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&logs)?);
                return Ok(());
            }
            if logs.is_empty() {
                println!("No log entries yet. Write one with 'ascension log add'.");
            }
            for log in logs {
                let target = log
                    .target_goal_content
                    .as_deref()
                    .map(|c| format!(" [{}]", c).dimmed().to_string())
                    .unwrap_or_default();
                println!(
                    "{} {} {}{}",
                    log.short_id().dimmed(),
                    log.date.with_timezone(&Local).format("%Y-%m-%d %H:%M"),
                    log.content,
                    target
                );
            }
        }
        LogAction::Edit { id, content } => {
            let id = s.store.resolve_log_id(&id)?;
            s.store.update_daily_log(&id, content)?;
            s.save()?;
            println!("{} log entry {}", "Updated".green(), ascension::model::short_id(&id));
        }
        LogAction::Rm { id } => {
            let id = s.store.resolve_log_id(&id)?;
            s.store.delete_daily_log(&id)?;
            s.save()?;
            println!("{} log entry {}", "Deleted".green(), ascension::model::short_id(&id));
        }
    }

    Ok(())
}

// =============================================================================
// Output
// =============================================================================

fn paint_priority(priority: Priority) -> String {
    match priority {
        Priority::P0 => priority.as_str().red().bold().to_string(),
        Priority::P1 => priority.as_str().yellow().to_string(),
        Priority::P2 => priority.as_str().normal().to_string(),
    }
}

fn status_mark(goal: &Goal, active: Option<&str>) -> String {
    if goal.is_completed {
        "[x]".green().to_string()
    } else if active == Some(goal.id.as_str()) {
        "[*]".cyan().bold().to_string()
    } else {
        "[ ]".to_string()
    }
}

fn print_tree(store: &GoalStore, all: bool) {
    let graph = store.graph();
    let active = store.active_goal_id.as_deref();
    let mut visited = HashSet::new();

    let roots = graph.root_goals();
    if roots.is_empty() {
        println!("No goals yet. Add one with 'ascension add'.");
    }
    for root in roots {
        print_subtree(&graph, root, 0, all, active, &mut visited);
    }
}

fn print_subtree<'a>(
    graph: &GoalGraph<'a>,
    goal: &'a Goal,
    depth: usize,
    all: bool,
    active: Option<&str>,
    visited: &mut HashSet<&'a str>,
) {
    if goal.is_completed && !all {
        return;
    }
    // A goal with several parents is printed under each, but expanded once
    let first_visit = visited.insert(goal.id.as_str());
    let today = if goal.is_today { " ☀".yellow().to_string() } else { String::new() };
    println!(
        "{}{} {} {} {}{}",
        "  ".repeat(depth),
        status_mark(goal, active),
        paint_priority(goal.priority),
        goal.short_id().dimmed(),
        goal.content,
        today
    );
    if !first_visit {
        return;
    }
    for child in graph.children(&goal.id) {
        print_subtree(graph, child, depth + 1, all, active, visited);
    }
}

fn print_goal(store: &GoalStore, id: &str) {
    let graph = store.graph();
    let Some(goal) = graph.get(id) else {
        return;
    };

    println!("{}", goal.content.bold());
    println!("  id:        {}", goal.id);
    println!(
        "  status:    {}",
        if goal.is_completed { "completed".green() } else { "open".normal() }
    );
    println!(
        "  priority:  {} (effective {})",
        paint_priority(goal.priority),
        paint_priority(effective_priority(&graph, goal))
    );
    println!("  created:   {}", goal.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(done) = goal.completed_at {
        println!("  completed: {}", done.format("%Y-%m-%d %H:%M"));
    }
    if goal.recurrence.is_recurring() {
        println!("  repeats:   {}", goal.recurrence);
    }
    if let Some(start) = goal.start_date {
        let end = goal
            .end_date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "open".to_string());
        println!("  span:      {} .. {}", start, end);
    }
    if let Some(time) = goal.scheduled_time {
        println!(
            "  scheduled: {} ({} min)",
            time,
            goal.duration.unwrap_or(ascension::model::DEFAULT_GOAL_DURATION)
        );
    }
    let logs = store.logs_for_goal(&goal.id).len();
    if logs > 0 {
        println!("  log:       {} entries", logs);
    }

    let parents = graph.parents(goal);
    if !parents.is_empty() {
        println!("  parents:");
        for p in parents {
            println!("    {} {}", p.short_id().dimmed(), p.content);
        }
    }
    let children = graph.children(&goal.id);
    if !children.is_empty() {
        println!("  children:");
        for c in children {
            println!("    {} {} {}", status_mark(c, None), c.short_id().dimmed(), c.content);
        }
    }
    if !goal.sub_goals.is_empty() {
        println!("  sub-goals:");
        for sg in &goal.sub_goals {
            let mark = if sg.is_completed { "[x]".green().to_string() } else { "[ ]".to_string() };
            let when = sg
                .scheduled_time
                .map(|t| format!(" @ {}", t).dimmed().to_string())
                .unwrap_or_default();
            println!("    {} {} {}{}", mark, ascension::model::short_id(&sg.id).dimmed(), sg.content, when);
        }
    }
}

fn format_minutes(minutes: u32) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

fn occurrence_line(item: &Occurrence<'_>) -> String {
    let when = match (item.time_of_day, item.end_minute()) {
        (Some(start), Some(end)) => format!("{}-{}", format_minutes(start), format_minutes(end)),
        _ => "all day    ".to_string(),
    };
    let mark = if item.is_completed { "[x]".green().to_string() } else { "[ ]".to_string() };
    let tag = match item.tag {
        Some(ascension::schedule::OccurrenceTag::Recurring) => " ↻".dimmed().to_string(),
        Some(ascension::schedule::OccurrenceTag::MultiDay) => " ⇔".dimmed().to_string(),
        None => String::new(),
    };
    format!("{} {} {}{}", when, mark, item.content, tag)
}

fn print_day(s: &Session, date: NaiveDate, filter: CompletionFilter, json: bool) -> CliResult {
    let occurrences = project(s.store.goals(), date, filter);
    let anytime: Vec<&Occurrence<'_>> = occurrences.iter().filter(|o| !o.has_time()).collect();
    let window = s.config.timeline.window();
    let placed = layout(timed_occurrences(&occurrences), window);

    if json {
        let doc = serde_json::json!({
            "date": date,
            "window": window,
            "anytime": anytime,
            "timed": placed,
        });
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", date.format("%A %Y-%m-%d").to_string().bold());
    if anytime.is_empty() && placed.is_empty() {
        println!("  Nothing planned.");
        return Ok(());
    }
    for item in &anytime {
        println!("  {}", occurrence_line(item));
    }
    for p in &placed {
        let column = if p.column_count > 1 {
            format!(" [{}/{}]", p.column + 1, p.column_count).dimmed().to_string()
        } else {
            String::new()
        };
        println!("  {}{}", occurrence_line(p.item), column);
    }
    Ok(())
}
