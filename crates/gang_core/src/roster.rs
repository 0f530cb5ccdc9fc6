/// External agent interfaces in display order.
pub const GANG_ROSTER: [&str; 8] = [
    "Robby",
    "Skippy",
    "The_Architect",
    "Deep_Thought",
    "GLaDOS",
    "VINCENT",
    "Janet",
    "The_Librarian",
];

/// Sole responder while emergency mode is active.
pub const EMERGENCY_AGENT: &str = "Skippy";
pub const BYPASSED_IN_EMERGENCY: [&str; 2] = ["GLaDOS", "Robby"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RosterStatus {
    Available,
    Exclusive,
    Bypassed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterEntry {
    pub name: &'static str,
    pub status: RosterStatus,
}

pub fn roster_status(name: &str, emergency_mode: bool) -> RosterStatus {
    if !emergency_mode {
        RosterStatus::Available
    } else if name == EMERGENCY_AGENT {
        RosterStatus::Exclusive
    } else if BYPASSED_IN_EMERGENCY.contains(&name) {
        RosterStatus::Bypassed
    } else {
        RosterStatus::Available
    }
}

pub fn roster(emergency_mode: bool) -> Vec<RosterEntry> {
    GANG_ROSTER
        .iter()
        .map(|&name| RosterEntry {
            name,
            status: roster_status(name, emergency_mode),
        })
        .collect()
}
