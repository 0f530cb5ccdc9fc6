use serde::{Deserialize, Serialize};

/// Backend view of the boardroom, as returned by the status query.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebateState {
    pub is_debating: bool,
    #[serde(default)]
    pub emergency_mode: bool,
    pub transcript: String,
    pub current_speaker: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AgentType {
    Internal,
    External,
    #[serde(other)]
    Unknown,
}

/// One entry of the backend agent registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Agent {
    pub id: u64,
    pub name: String,
    pub is_enabled: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_cycles: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_type: Option<AgentType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub principal_id: Option<String>,
}

impl Agent {
    pub fn status_label(&self) -> &'static str {
        if self.is_enabled {
            "ONLINE"
        } else {
            "OFFLINE"
        }
    }

    /// Diagnostics report for a single agent.
    pub fn diagnostics(&self) -> String {
        let mut report = format!(
            "DIAGNOSTICS: {}\nAgent ID: {} | Status: {}\n",
            self.name,
            self.id,
            self.status_label()
        );
        if let Some(kind) = self.agent_type {
            report.push_str(&format!("Type: {kind:?}\n"));
        }
        if let Some(principal) = &self.principal_id {
            report.push_str(&format!("Principal: {principal}\n"));
        }
        if let Some(cycles) = self.last_cycles {
            report.push_str(&format!("Last cycles: {cycles}\n"));
        }
        report.push_str("[SYS] Telemetry link established. Agent nominal. Zero traps recorded.");
        report
    }
}
