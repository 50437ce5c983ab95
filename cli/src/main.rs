//! Venire CLI - jury-selection workspace from the terminal.
//!
//! Every mutating command follows the same path:
//!
//! ```text
//! Workspace::open() -> Action -> JuryStore::dispatch() -> persistence::save()
//!                                       |
//!                                       v
//!                             rejected: nothing written
//! ```
//!
//! Logs go to `~/.venire/logs/venire.log` so stdout stays clean for views
//! and CSV export.

mod render;
mod workspace;

use std::{
    fs::{self, OpenOptions},
    io::{self, Write},
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, SystemTime},
};

use anyhow::{Context, Result, anyhow};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use venire_config::VenireConfig;
use venire_core::Action;
use venire_suggest::{SuggestClient, SuggestionContext, SuggestionScheduler};
use venire_types::{
    ApprovalRole, JurorId, JurorTag, MessageKind, Party, SeatRole, StartCorner, Strike,
    StrikeKind,
};

use crate::workspace::Workspace;

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let (log_file, init_warnings) = open_log_file();

    if let Some((log_path, file)) = log_file {
        tracing_subscriber::registry()
            .with(fmt::layer().with_ansi(false).with_writer(Mutex::new(file)))
            .with(env_filter)
            .init();

        tracing::debug!(path = %log_path.display(), "Logging initialized");
        for warning in init_warnings {
            tracing::warn!("{warning}");
        }
        return;
    }

    // No log file: stay silent rather than mix logs into command output.
    tracing_subscriber::registry().with(env_filter).init();
}

fn open_log_file() -> (Option<(PathBuf, fs::File)>, Vec<String>) {
    let mut warnings = Vec::new();

    for candidate in log_file_candidates() {
        if let Some(parent) = candidate.parent()
            && let Err(e) = fs::create_dir_all(parent)
        {
            warnings.push(format!(
                "Failed to create log dir {}: {e}",
                parent.display()
            ));
            continue;
        }

        match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&candidate)
        {
            Ok(file) => return (Some((candidate, file)), warnings),
            Err(e) => {
                warnings.push(format!(
                    "Failed to open log file {}: {e}",
                    candidate.display()
                ));
            }
        }
    }

    (None, warnings)
}

fn log_file_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();

    // Primary: ~/.venire/logs/venire.log
    if let Some(config_path) = VenireConfig::path()
        && let Some(config_dir) = config_path.parent()
    {
        candidates.push(config_dir.join("logs").join("venire.log"));
    }

    // Fallback: ./.venire/logs/venire.log
    candidates.push(PathBuf::from(".venire").join("logs").join("venire.log"));

    candidates
}

#[derive(Parser)]
#[command(name = "venire")]
#[command(about = "Jury-selection workspace: seat grid, strikes, and team notes")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ~/.venire/config.toml)
    #[arg(long, global = true, env = "VENIRE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a fresh workspace with one blank juror per seat
    Init {
        /// Replace an existing workspace
        #[arg(long)]
        force: bool,
    },

    /// Show the seat grid
    Grid,

    /// Show one juror's record and messages
    Show {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
    },

    /// Select a juror, marking their messages read
    Select {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
    },

    /// Clear the selection so new messages count as unread again
    Deselect,

    /// Strike a juror
    #[command(after_help = "\
Examples:
  venire strike 7 peremptory defense
  venire strike 12 for-cause plaintiff")]
    Strike {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
        #[arg(value_parser = parse_strike_kind)]
        kind: StrikeKind,
        #[arg(value_parser = parse_party)]
        party: Party,
    },

    /// Remove a juror's strike
    Unstrike {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
    },

    /// Show strike counts per party
    Ledger,

    /// Change the grid dimensions (3-10 each)
    Resize {
        columns: u32,
        rows: u32,
        /// Drop jurors whose ids no longer fit
        #[arg(long)]
        confirm_truncate: bool,
    },

    /// Choose the corner that holds juror 1
    Corner {
        #[arg(value_parser = parse_corner)]
        corner: StartCorner,
    },

    /// Move a juror to a new number
    Renumber {
        #[arg(value_parser = parse_juror_id)]
        old: JurorId,
        #[arg(value_parser = parse_juror_id)]
        new: JurorId,
    },

    /// Exchange two jurors' numbers
    Swap {
        #[arg(value_parser = parse_juror_id)]
        a: JurorId,
        #[arg(value_parser = parse_juror_id)]
        b: JurorId,
    },

    /// Remove a juror from the grid
    Delete {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
    },

    /// Put a blank juror back at a deleted or vacant number
    Restore {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
    },

    /// Set a juror's name
    Rename {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
        name: String,
    },

    /// Post a team message about a juror
    Message {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
        text: String,
        #[arg(long, default_value = "You")]
        sender: String,
        #[arg(long, value_parser = parse_message_kind, default_value = "normal")]
        kind: MessageKind,
    },

    /// Replace the shared staff notes
    Notes { text: String },

    /// Replace one juror's private notes
    JurorNotes {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
        text: String,
    },

    /// Toggle the lead or second chair approval
    Approve {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
        #[arg(value_parser = parse_approval_role)]
        role: ApprovalRole,
    },

    /// Rate a juror 1-10
    Score {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
        #[arg(allow_negative_numbers = true)]
        score: i64,
    },

    /// Tag a juror green, yellow or red ("none" clears)
    Tag {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
        #[arg(value_parser = parse_tag)]
        tag: TagArg,
    },

    /// Seat a juror in the box
    Seat {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
        #[arg(value_parser = parse_seat_role)]
        role: SeatRole,
    },

    /// Return a seated juror to the pool
    Unseat {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
    },

    /// Change a party's peremptory allowance
    Max {
        #[arg(value_parser = parse_party)]
        party: Party,
        max: u32,
    },

    /// Show header counts
    Summary,

    /// Write juror rows as CSV (stdout when no path is given)
    Export { path: Option<PathBuf> },

    /// Suggest follow-up questions for a juror
    Suggest {
        #[arg(value_parser = parse_juror_id)]
        id: JurorId,
    },

    /// Show or edit the voir dire script
    Script {
        /// Restore the built-in script
        #[arg(long, conflicts_with = "file")]
        reset: bool,
        /// Replace the script with this file's contents
        #[arg(long)]
        file: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, Copy)]
struct TagArg(Option<JurorTag>);

fn parse_juror_id(raw: &str) -> Result<JurorId, String> {
    let digits = raw.trim().trim_start_matches('#');
    let value: u32 = digits
        .parse()
        .map_err(|_| format!("'{raw}' is not a juror number"))?;
    JurorId::new(value).map_err(|e| e.to_string())
}

fn parse_strike_kind(raw: &str) -> Result<StrikeKind, String> {
    StrikeKind::parse(raw).ok_or_else(|| format!("expected peremptory or for-cause, got '{raw}'"))
}

fn parse_party(raw: &str) -> Result<Party, String> {
    Party::parse(raw).ok_or_else(|| format!("expected plaintiff or defense, got '{raw}'"))
}

fn parse_corner(raw: &str) -> Result<StartCorner, String> {
    StartCorner::parse(raw).ok_or_else(|| {
        format!("expected top-left, top-right, bottom-left or bottom-right, got '{raw}'")
    })
}

fn parse_message_kind(raw: &str) -> Result<MessageKind, String> {
    MessageKind::parse(raw).ok_or_else(|| format!("expected normal, alert or flag, got '{raw}'"))
}

fn parse_approval_role(raw: &str) -> Result<ApprovalRole, String> {
    ApprovalRole::parse(raw).ok_or_else(|| format!("expected lead or second, got '{raw}'"))
}

fn parse_seat_role(raw: &str) -> Result<SeatRole, String> {
    SeatRole::parse(raw).ok_or_else(|| format!("expected juror or alternate, got '{raw}'"))
}

fn parse_tag(raw: &str) -> Result<TagArg, String> {
    if raw.trim().eq_ignore_ascii_case("none") {
        return Ok(TagArg(None));
    }
    JurorTag::parse(raw)
        .map(|tag| TagArg(Some(tag)))
        .ok_or_else(|| format!("expected green, yellow, red or none, got '{raw}'"))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();
    let result = run(cli).await;
    if let Err(e) = &result {
        tracing::warn!(error = %e, "Command failed");
    }
    result
}

async fn run(cli: Cli) -> Result<()> {
    let mut out = io::stdout().lock();
    let Cli { config, command } = cli;

    let action = match command {
        Commands::Init { force } => {
            let workspace = Workspace::init(config, force)?;
            writeln!(
                out,
                "Workspace ready at {}",
                workspace.settings().snapshot_path().display()
            )?;
            write!(out, "{}", render::grid(workspace.state()))?;
            return Ok(());
        }
        Commands::Grid => {
            let workspace = Workspace::open(config)?;
            write!(out, "{}", render::grid(workspace.state()))?;
            return Ok(());
        }
        Commands::Show { id } => {
            let workspace = Workspace::open(config)?;
            let record = workspace
                .state()
                .juror(id)
                .filter(|record| !record.deleted)
                .ok_or_else(|| anyhow!("no juror {}", id.badge()))?;
            write!(out, "{}", render::juror(record))?;
            return Ok(());
        }
        Commands::Ledger => {
            let workspace = Workspace::open(config)?;
            write!(out, "{}", render::ledger(workspace.state().ledger()))?;
            return Ok(());
        }
        Commands::Summary => {
            let workspace = Workspace::open(config)?;
            write!(
                out,
                "{}",
                render::summary(&workspace.settings().case, workspace.state())
            )?;
            return Ok(());
        }
        Commands::Export { path } => {
            let workspace = Workspace::open(config)?;
            return export(&workspace, path.as_deref(), &mut out);
        }
        Commands::Suggest { id } => {
            let workspace = Workspace::open(config)?;
            return suggest(&workspace, id, &mut out).await;
        }
        Commands::Script { reset, file } => match (reset, file) {
            (true, _) => Action::ResetScript,
            (false, Some(path)) => Action::SetScript(
                fs::read_to_string(&path)
                    .with_context(|| format!("reading script {}", path.display()))?,
            ),
            (false, None) => {
                let workspace = Workspace::open(config)?;
                write!(out, "{}", workspace.state().script())?;
                return Ok(());
            }
        },
        Commands::Select { id } => Action::Select(id),
        Commands::Deselect => Action::ClearSelection,
        Commands::Strike { id, kind, party } => Action::ApplyStrike {
            id,
            strike: Strike::new(kind, party),
        },
        Commands::Unstrike { id } => Action::RemoveStrike(id),
        Commands::Resize {
            columns,
            rows,
            confirm_truncate,
        } => Action::Resize {
            columns,
            rows,
            confirm_truncate,
        },
        Commands::Corner { corner } => Action::SetStartCorner(corner),
        Commands::Renumber { old, new } => Action::ReassignId { old, new },
        Commands::Swap { a, b } => Action::SwapIds { a, b },
        Commands::Delete { id } => Action::Delete(id),
        Commands::Restore { id } => Action::Restore(id),
        Commands::Rename { id, name } => Action::Rename { id, name },
        Commands::Message {
            id,
            text,
            sender,
            kind,
        } => Action::PostMessage {
            id,
            sender,
            text,
            kind,
            at: SystemTime::now(),
        },
        Commands::Notes { text } => Action::SetStaffNotes(text),
        Commands::JurorNotes { id, text } => Action::SetJurorNotes { id, notes: text },
        Commands::Approve { id, role } => Action::ToggleApproval { id, role },
        Commands::Score { id, score } => Action::SetScore { id, score },
        Commands::Tag { id, tag } => Action::SetTag { id, tag: tag.0 },
        Commands::Seat { id, role } => Action::Seat { id, role },
        Commands::Unseat { id } => Action::Unseat(id),
        Commands::Max { party, max } => Action::SetMaxPeremptory { party, max },
    };

    let shows_grid = matches!(
        action,
        Action::Resize { .. }
            | Action::SetStartCorner(_)
            | Action::ReassignId { .. }
            | Action::SwapIds { .. }
            | Action::Delete(_)
            | Action::Restore(_)
    );
    let shows_ledger = matches!(
        action,
        Action::ApplyStrike { .. } | Action::RemoveStrike(_) | Action::SetMaxPeremptory { .. }
    );
    let selected = match &action {
        Action::Select(id) => Some(*id),
        _ => None,
    };

    let mut workspace = Workspace::open(config)?;
    let state = workspace.apply(action)?;
    if shows_grid {
        write!(out, "{}", render::grid(state))?;
    } else if shows_ledger {
        write!(out, "{}", render::ledger(state.ledger()))?;
    } else if let Some(record) = selected.and_then(|id| state.juror(id)) {
        write!(out, "{}", render::juror(record))?;
    }
    Ok(())
}

fn export(workspace: &Workspace, path: Option<&Path>, out: &mut impl Write) -> Result<()> {
    match path {
        Some(path) => {
            let file = fs::File::create(path)
                .with_context(|| format!("creating {}", path.display()))?;
            venire_core::write_csv(workspace.state(), io::BufWriter::new(file))?;
            writeln!(out, "Exported to {}", path.display())?;
        }
        None => venire_core::write_csv(workspace.state(), out)?,
    }
    Ok(())
}

async fn suggest(workspace: &Workspace, id: JurorId, out: &mut impl Write) -> Result<()> {
    let state = workspace.state();
    let record = state
        .juror(id)
        .filter(|record| !record.deleted)
        .ok_or_else(|| anyhow!("no juror {}", id.badge()))?;
    let context = SuggestionContext::from_juror(record, state.staff_notes());

    let client = SuggestClient::new(workspace.settings().suggest.clone())
        .context("building suggestion client")?;
    // One-shot: no keystrokes to debounce.
    let mut scheduler = SuggestionScheduler::new(client).with_debounce(Duration::ZERO);
    scheduler.request(id, context);
    let suggestions = scheduler
        .next()
        .await
        .ok_or_else(|| anyhow!("suggestion request was cancelled"))?;
    write!(out, "{}", render::suggestions(&suggestions))?;
    Ok(())
}
