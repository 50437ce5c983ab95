//! Plain-text views of the workspace.

use std::fmt::Write;

use venire_config::CaseInfo;
use venire_core::{JuryState, SeatGrid, StrikeLedger, Summary};
use venire_suggest::{SuggestionSource, Suggestions};
use venire_types::{JurorRecord, JurorStatus, MessageKind, Party, SeatRole};

const NAME_WIDTH: usize = 10;

fn status_marker(record: &JurorRecord) -> char {
    match record.status() {
        JurorStatus::Pool => ' ',
        JurorStatus::Seated => 'J',
        JurorStatus::Alternate => 'A',
        JurorStatus::Struck => 'x',
        JurorStatus::Deleted => '-',
    }
}

fn truncate(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let mut out: String = text.chars().take(width.saturating_sub(1)).collect();
    out.push('~');
    out
}

/// The seat grid as seen from the bench: two lines per row, badge and
/// markers on the first, a short name on the second.
#[must_use]
pub fn grid(state: &JuryState) -> String {
    let seats = SeatGrid::layout_for(state);
    let layout = seats.layout();
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} x {} grid, juror 1 at {}",
        layout.columns(),
        layout.rows(),
        layout.start_corner().as_str()
    );

    for row in seats.rows() {
        let mut badges = String::new();
        let mut names = String::new();
        for cell in row {
            let record = cell.and_then(|id| state.juror(id));
            match record {
                Some(record) => {
                    let unread = if record.unread { '*' } else { ' ' };
                    let selected = if state.selected() == Some(record.id) {
                        '>'
                    } else {
                        ' '
                    };
                    let _ = write!(
                        badges,
                        "{selected}{}{}{unread}   ",
                        record.id.badge(),
                        status_marker(record)
                    );
                    let _ = write!(
                        names,
                        " {:<width$} ",
                        truncate(&record.name, NAME_WIDTH),
                        width = NAME_WIDTH
                    );
                }
                None => {
                    let _ = write!(badges, "  ---     ");
                    let _ = write!(names, " {:<width$} ", "", width = NAME_WIDTH);
                }
            }
        }
        let _ = writeln!(out, "{}", badges.trim_end());
        let _ = writeln!(out, "{}", names.trim_end());
    }
    out
}

#[must_use]
pub fn juror(record: &JurorRecord) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{} {}", record.id.badge(), record.display_name());
    let _ = writeln!(out, "  status:   {}", record.status().as_str());
    if let Some(strike) = record.strike.strike() {
        let _ = writeln!(
            out,
            "  strike:   {} by {}",
            strike.kind.display_name(),
            strike.party.display_name()
        );
    }
    if let Some(seat) = record.seat {
        let _ = writeln!(out, "  seat:     {} {}", seat.role.as_str(), seat.index + 1);
    }
    let _ = writeln!(out, "  score:    {}", record.score.value());
    if let Some(tag) = record.tag {
        let _ = writeln!(out, "  tag:      {}", tag.as_str());
    }
    let _ = writeln!(
        out,
        "  approved: lead {} / second {}",
        yes_no(record.approvals.lead),
        yes_no(record.approvals.second)
    );
    if !record.notes.trim().is_empty() {
        let _ = writeln!(out, "  notes:    {}", record.notes.trim());
    }
    if record.messages.is_empty() {
        let _ = writeln!(out, "  no messages");
    } else {
        let _ = writeln!(out, "  messages:");
        for message in &record.messages {
            let marker = match message.kind {
                MessageKind::Normal => "",
                MessageKind::Alert => "[alert] ",
                MessageKind::Flag => "[flag] ",
            };
            let _ = writeln!(out, "    {marker}{}", message.transcript_line());
        }
    }
    out
}

const fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

#[must_use]
pub fn ledger(ledger: &StrikeLedger) -> String {
    let mut out = String::new();
    for party in Party::all() {
        let tally = ledger.party(*party);
        let _ = writeln!(
            out,
            "{:<10} peremptory {}/{} ({} left), for cause {}",
            party.display_name(),
            tally.peremptory_used,
            tally.max_peremptory,
            ledger.remaining_peremptory(*party),
            tally.cause_used
        );
    }
    out
}

#[must_use]
pub fn summary(case: &CaseInfo, state: &JuryState) -> String {
    let Summary {
        jurors,
        new_messages,
        approved,
        seated,
        alternates,
        struck_peremptory,
        struck_for_cause,
        remaining_plaintiff,
        remaining_defense,
    } = state.summary();

    let mut out = String::new();
    if !case.name.is_empty() {
        let _ = write!(out, "{}", case.name);
        if !case.venue.is_empty() {
            let _ = write!(out, " ({})", case.venue);
        }
        out.push('\n');
    }
    let _ = writeln!(out, "jurors:        {jurors}");
    let _ = writeln!(out, "new messages:  {new_messages}");
    let _ = writeln!(out, "approved:      {approved}");
    let _ = writeln!(
        out,
        "seated:        {seated}/{}",
        state.seating().jury_size()
    );
    let _ = writeln!(
        out,
        "alternates:    {alternates}/{}",
        state.seating().alternates()
    );
    let _ = writeln!(out, "peremptory:    {struck_peremptory}");
    let _ = writeln!(out, "for cause:     {struck_for_cause}");
    let _ = writeln!(
        out,
        "remaining:     plaintiff {remaining_plaintiff}, defense {remaining_defense}"
    );

    for role in [SeatRole::Juror, SeatRole::Alternate] {
        let seated = state.seated(role);
        if seated.is_empty() {
            continue;
        }
        let ids: Vec<_> = seated.iter().map(|record| record.id.badge()).collect();
        let _ = writeln!(out, "{:<14} {}", format!("{}s:", role.as_str()), ids.join(" "));
    }
    out
}

#[must_use]
pub fn suggestions(suggestions: &Suggestions) -> String {
    let mut out = String::new();
    match suggestions.source {
        SuggestionSource::NoContext => {
            let _ = writeln!(out, "No messages or notes yet; nothing to suggest.");
            return out;
        }
        SuggestionSource::Fallback(_) => {
            let _ = writeln!(out, "(suggestion service unavailable, showing defaults)");
        }
        SuggestionSource::Model => {}
    }
    for (n, question) in suggestions.questions.iter().enumerate() {
        let _ = writeln!(out, "{}. {question}", n + 1);
    }
    out
}
