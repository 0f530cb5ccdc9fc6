use std::sync::LazyLock;

use regex::Regex;

pub const DEFAULT_SPEAKER: &str = "SYSTEM";
pub const KNOWN_SPEAKERS: [&str; 5] = ["Skippy", "GLaDOS", "Robby", "SYSTEM", "User"];

static SPEAKER_LINE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let speakers = KNOWN_SPEAKERS.join("|");
    Regex::new(&format!(r"^({speakers}):\s*(.+)$")).expect("valid speaker line regex")
});

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptLine {
    pub speaker: String,
    pub text: String,
}

/// Splits `Speaker: text` transcripts into speaker-tagged lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranscriptParser {
    default_speaker: String,
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new(DEFAULT_SPEAKER)
    }
}

impl TranscriptParser {
    pub fn new(default_speaker: impl Into<String>) -> Self {
        Self {
            default_speaker: default_speaker.into(),
        }
    }

    pub fn default_speaker(&self) -> &str {
        &self.default_speaker
    }

    pub fn parse(&self, transcript: &str) -> Vec<TranscriptLine> {
        transcript
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line))
            .filter(|line| !line.trim().is_empty())
            .map(|line| match SPEAKER_LINE_RE.captures(line) {
                Some(caps) => TranscriptLine {
                    speaker: caps[1].to_string(),
                    text: caps[2].to_string(),
                },
                None => TranscriptLine {
                    speaker: self.default_speaker.clone(),
                    text: line.to_string(),
                },
            })
            .collect()
    }
}

/// Parses with the default `SYSTEM` fallback speaker.
pub fn parse_transcript(transcript: &str) -> Vec<TranscriptLine> {
    TranscriptParser::default().parse(transcript)
}
