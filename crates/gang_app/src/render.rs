use std::fmt::Write;

use gang_core::{
    render_transcript_html, AgentRowView, AppViewModel, DebateView, Notice, NoticeLevel,
    RosterEntry, RosterStatus, UploadStatus, UploadView,
};

pub fn notice_line(notice: &Notice) -> String {
    let tag = match notice.level {
        NoticeLevel::Info => "info",
        NoticeLevel::Success => "ok",
        NoticeLevel::Error => "error",
    };
    format!("[{tag}] {}", notice.text)
}

pub fn status(view: &AppViewModel) -> String {
    let mut out = String::new();
    if !view.backend_ready {
        out.push_str("Backend: OFFLINE\n");
    }
    match &view.debate {
        Some(debate) => status_block(&mut out, debate, view.sending),
        None => out.push_str("Debate: unknown\n"),
    }
    if let Some(error) = &view.debate_error {
        let _ = writeln!(out, "Last refresh failed: {error}");
    }
    out
}

fn status_block(out: &mut String, debate: &DebateView, sending: bool) {
    let state = match (debate.is_debating, sending) {
        (_, true) => "SENDING",
        (true, false) => "DEBATING",
        (false, false) => "IDLE",
    };
    let stale = if debate.stale { " (stale)" } else { "" };
    let _ = writeln!(out, "Debate: {state}{stale}");
    if !debate.current_speaker.is_empty() {
        let _ = writeln!(out, "Speaker: {}", debate.current_speaker);
    }
    if debate.emergency_mode {
        out.push_str("EMERGENCY MODE: Skippy responds alone\n");
    }
    let _ = writeln!(out, "Transcript: {} line(s)", debate.lines.len());
}

pub fn transcript(view: &AppViewModel) -> String {
    let Some(debate) = &view.debate else {
        return String::new();
    };
    if debate.lines.is_empty() {
        return "(transcript is empty)\n".to_string();
    }
    let width = debate
        .lines
        .iter()
        .map(|line| line.speaker.len())
        .max()
        .unwrap_or(0);
    let mut out = String::new();
    for line in &debate.lines {
        let _ = writeln!(out, "{:>width$} | {}", line.speaker, line.text);
    }
    out
}

pub fn transcript_html(raw: &str) -> String {
    let mut html = render_transcript_html(raw);
    if !html.is_empty() && !html.ends_with('\n') {
        html.push('\n');
    }
    html
}

pub fn agents(rows: &[AgentRowView], error: Option<&str>) -> String {
    let mut out = String::new();
    if rows.is_empty() {
        out.push_str("No agents registered.\n");
    } else {
        let width = rows.iter().map(|row| row.name.len()).max().unwrap_or(4).max(4);
        let _ = writeln!(out, "{:>4}  {:<width$}  {:<7}  CYCLES", "ID", "NAME", "STATUS");
        for row in rows {
            let cycles = row
                .last_cycles
                .map(|cycles| cycles.to_string())
                .unwrap_or_else(|| "-".to_string());
            let marker = if row.updating { " *" } else { "" };
            let _ = writeln!(
                out,
                "{:>4}  {:<width$}  {:<7}  {cycles}{marker}",
                row.id, row.name, row.status_label
            );
        }
    }
    if let Some(error) = error {
        let _ = writeln!(out, "Last refresh failed: {error}");
    }
    out
}

pub fn roster(entries: &[RosterEntry]) -> String {
    let mut out = String::new();
    for entry in entries {
        let status = match entry.status {
            RosterStatus::Available => "available",
            RosterStatus::Exclusive => "EXCLUSIVE (emergency)",
            RosterStatus::Bypassed => "bypassed (emergency)",
        };
        let _ = writeln!(out, "{:<14} {status}", entry.name);
    }
    out
}

pub fn upload(view: &UploadView) -> String {
    let name = view.file_name.as_deref().unwrap_or("(no file)");
    let size = view
        .file_size
        .map(|size| format!(" ({size} bytes)"))
        .unwrap_or_default();
    let status = match view.status {
        UploadStatus::Idle => "idle".to_string(),
        UploadStatus::Ready => "ready".to_string(),
        UploadStatus::Uploading => format!("uploading {}%", view.progress),
        UploadStatus::Complete => match &view.routed_agent {
            Some(agent) => format!("routed to {agent}"),
            None => "complete".to_string(),
        },
        UploadStatus::Failed => "failed".to_string(),
    };
    format!("Upload: {name}{size} {status}\n")
}

/// Full screen used by `gang watch`.
pub fn dashboard(view: &AppViewModel, clock: &str) -> String {
    let mut out = format!("=== Gang boardroom  {clock} ===\n");
    out.push_str(&status(view));
    out.push('\n');
    out.push_str(&transcript(view));
    out.push('\n');
    out.push_str(&agents(&view.agents, view.agents_error.as_deref()));
    if view.upload.status != UploadStatus::Idle {
        out.push('\n');
        out.push_str(&upload(&view.upload));
    }
    out
}
