use std::{env, path::Path, path::PathBuf, time::Duration};

use super::schema::{Settings, SourceSettings};
use crate::source::{CommandTrackSource, SourceKind};
use crate::{LinerNotesError, Result};

/// Configuration loading helpers.
///
/// `Settings::load` reads the optional config file, lets `LINER_NOTES__`
/// environment variables override it and falls back to struct defaults.
impl Settings {
    /// Load settings from the resolved config path and the environment.
    pub fn load() -> Result<Self> {
        Self::load_from(resolve_config_path().as_deref())
    }

    /// Load settings from an explicit (optional, possibly missing) file and the environment.
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        Self::load_layers(path, false)
    }

    /// Load settings from a file that must exist, then the environment.
    ///
    /// Used for a path the user named explicitly, where a typo should fail
    /// loudly instead of silently falling back to defaults.
    pub fn load_file(path: &Path) -> Result<Self> {
        Self::load_layers(Some(path), true)
    }

    fn load_layers(path: Option<&Path>, required: bool) -> Result<Self> {
        let mut builder = ::config::Config::builder();

        if let Some(path) = path {
            log::debug!("Reading configuration from {}", path.display());
            builder = builder.add_source(::config::File::from(path).required(required));
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("LINER_NOTES")
                .separator("__")
                .try_parsing(true),
        );

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// Parse settings from TOML text alone, without the environment.
    pub fn from_toml_str(toml: &str) -> Result<Self> {
        let settings = ::config::Config::builder()
            .add_source(::config::File::from_str(toml, ::config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<()> {
        if self.poll.interval_ms == 0 {
            return Err(invalid("poll.interval_ms must be >= 1"));
        }
        if self.http.timeout_secs == 0 {
            return Err(invalid("http.timeout_secs must be >= 1"));
        }
        if self.source.kind == SourceKind::Command && self.source.program.is_none() {
            return Err(invalid("source.program is required when source.kind = \"command\""));
        }
        Ok(())
    }

    /// Whether both API keys are configured.
    pub fn has_keys(&self) -> bool {
        self.api.genius_token.is_some() && self.api.anthropic_key.is_some()
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll.interval_ms)
    }

    pub fn http_timeout(&self) -> Duration {
        Duration::from_secs(self.http.timeout_secs)
    }
}

impl SourceSettings {
    /// Build the configured player query.
    pub fn build(&self) -> Result<CommandTrackSource> {
        match self.kind {
            SourceKind::AppleMusic => Ok(CommandTrackSource::apple_music()),
            SourceKind::Playerctl => Ok(CommandTrackSource::playerctl()),
            SourceKind::Command => {
                let program = self
                    .program
                    .as_deref()
                    .ok_or_else(|| invalid("source.program is required when source.kind = \"command\""))?;
                Ok(CommandTrackSource::new(program, self.args.clone()))
            }
        }
    }
}

fn invalid(message: &str) -> LinerNotesError {
    LinerNotesError::Config(::config::ConfigError::Message(message.to_string()))
}

/// Resolve the config path from `LINER_NOTES_CONFIG_PATH` or the platform config directory.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("LINER_NOTES_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// `<config dir>/liner-notes/config.toml`, where the config dir comes from
/// [`dirs::config_dir`] (`$XDG_CONFIG_HOME` or `~/.config` on Linux).
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("liner-notes").join("config.toml"))
}
