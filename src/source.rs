//! Media player queries.
//!
//! The poller only knows the [`TrackSource`] trait. [`CommandTrackSource`] is
//! the concrete implementation: it runs a program that prints either nothing
//! or one `title|||artist|||album|||status` line.

use crate::track::TrackSnapshot;
use crate::{LinerNotesError, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Trait for media player queries that can be mocked for testing.
///
/// When the `mock` feature is enabled, this crate provides `MockTrackSource`
/// that implements this trait using the `mockall` library.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait(?Send)]
pub trait TrackSource {
    /// What the player is doing right now. `Ok(None)` means nothing is playing.
    async fn current_track(&self) -> Result<Option<TrackSnapshot>>;
}

const APPLE_MUSIC_SCRIPT: &str = r#"
if application "Music" is running then
    tell application "Music"
        if player state is not stopped then
            try
                set t to name of current track
                set ar to artist of current track
                set al to album of current track
                if player state is playing then
                    set s to "playing"
                else
                    set s to "paused"
                end if
                return t & "|||" & ar & "|||" & al & "|||" & s
            end try
        end if
    end tell
end if
return ""
"#;

const PLAYERCTL_FORMAT: &str = "{{title}}|||{{artist}}|||{{album}}|||{{lc(status)}}";

/// Which built-in player query to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum SourceKind {
    /// Music.app through `osascript` (macOS)
    AppleMusic,
    /// Any MPRIS player through `playerctl` (Linux)
    Playerctl,
    /// A user-supplied program printing the same line format
    Command,
}

impl SourceKind {
    /// The preset that makes sense on the current platform.
    pub fn platform_default() -> Self {
        if cfg!(target_os = "macos") {
            SourceKind::AppleMusic
        } else {
            SourceKind::Playerctl
        }
    }
}

/// Runs a player query command on every poll.
#[derive(Debug, Clone)]
pub struct CommandTrackSource {
    program: String,
    args: Vec<String>,
    /// Stderr fragments that mean "no player" rather than failure.
    idle_markers: Vec<String>,
}

impl CommandTrackSource {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
            idle_markers: Vec::new(),
        }
    }

    pub fn apple_music() -> Self {
        Self::new("osascript", vec!["-e".to_string(), APPLE_MUSIC_SCRIPT.to_string()])
    }

    pub fn playerctl() -> Self {
        Self::new(
            "playerctl",
            vec![
                "metadata".to_string(),
                "--format".to_string(),
                PLAYERCTL_FORMAT.to_string(),
            ],
        )
        .with_idle_markers(vec!["No players found".to_string()])
    }

    pub fn with_idle_markers(mut self, markers: Vec<String>) -> Self {
        self.idle_markers = markers;
        self
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Interpret a finished command. Split out from [`TrackSource::current_track`] for tests.
    fn interpret(&self, success: bool, stdout: &[u8], stderr: &[u8]) -> Result<Option<TrackSnapshot>> {
        if !success {
            let stderr = String::from_utf8_lossy(stderr);
            if self
                .idle_markers
                .iter()
                .any(|marker| stderr.contains(marker.as_str()))
            {
                return Ok(None);
            }
            return Err(LinerNotesError::Source(format!(
                "{} failed: {}",
                self.program,
                stderr.trim()
            )));
        }

        TrackSnapshot::parse_delimited(&String::from_utf8_lossy(stdout))
    }
}

#[async_trait(?Send)]
impl TrackSource for CommandTrackSource {
    async fn current_track(&self) -> Result<Option<TrackSnapshot>> {
        log::debug!("Querying player with {}", self.program);

        let output = tokio::process::Command::new(&self.program)
            .args(&self.args)
            .kill_on_drop(true)
            .output()
            .await?;

        self.interpret(output.status.success(), &output.stdout, &output.stderr)
    }
}
