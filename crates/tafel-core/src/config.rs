use std::fs;
use std::path::{
  Path,
  PathBuf
};

use anyhow::{
  Context,
  anyhow
};
use chrono_tz::Tz;
use serde::Deserialize;
use tracing::{
  debug,
  info,
  warn
};

use crate::clock::parse_timezone;
use crate::i18n::Language;

const CONFIG_FILE: &str = "tafel.toml";
const CONFIG_ENV_VAR: &str =
  "TAFEL_CONFIG";
const TIMEZONE_ENV_VAR: &str =
  "TAFEL_TIMEZONE";
const DEFAULT_TIMEZONE: &str =
  "Europe/Amsterdam";
const STATE_FILE_NAME: &str =
  "filter.json";

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
  /// IANA zone of the restaurant;
  /// decides which day is "today".
  pub timezone:     String,
  pub language:     Language,
  pub color:        bool,
  pub state_file:   Option<PathBuf>,
  #[serde(skip)]
  pub loaded_files: Vec<PathBuf>
}

impl Default for Config {
  fn default() -> Self {
    Self {
      timezone:     DEFAULT_TIMEZONE
        .to_string(),
      language:     Language::default(),
      color:        true,
      state_file:   None,
      loaded_files: vec![]
    }
  }
}

impl Config {
  #[tracing::instrument(skip(
    config_override
  ))]
  pub fn load(
    config_override: Option<&Path>
  ) -> anyhow::Result<Self> {
    let mut cfg =
      match resolve_config_path(
        config_override
      )? {
        | Some(path) => {
          info!(config = %path.display(), "loading config");
          Self::load_file(&path)?
        }
        | None => {
          warn!(
            "no tafel.toml found; using \
             defaults"
          );
          Config::default()
        }
      };

    if let Ok(raw) =
      std::env::var(TIMEZONE_ENV_VAR)
      && !raw.trim().is_empty()
    {
      debug!(timezone = %raw, "timezone from environment");
      cfg.timezone = raw.trim().to_string();
    }

    Ok(cfg)
  }

  #[tracing::instrument]
  pub fn load_file(
    path: &Path
  ) -> anyhow::Result<Self> {
    let path = expand_tilde(path);
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    let mut cfg: Config =
      toml::from_str(&text)
        .with_context(|| {
          format!(
            "failed to parse {}",
            path.display()
          )
        })?;
    cfg.loaded_files.push(path);
    Ok(cfg)
  }

  #[tracing::instrument(skip(
    self, overrides
  ))]
  pub fn apply_overrides<I>(
    &mut self,
    overrides: I
  ) -> anyhow::Result<()>
  where
    I: IntoIterator<
      Item = (String, String)
    >
  {
    for (k, v) in overrides {
      let key = k
        .strip_prefix("rc.")
        .unwrap_or(&k)
        .to_string();
      debug!(key = %key, value = %v, "applying override");
      match key.as_str() {
        | "timezone" => {
          self.timezone = v;
        }
        | "language" => {
          self.language = v.parse()?;
        }
        | "color" => {
          self.color = parse_bool(&v)
            .ok_or_else(|| {
              anyhow!(
                "invalid color setting: \
                 {v}"
              )
            })?;
        }
        | "state_file" | "state.file" => {
          self.state_file =
            Some(PathBuf::from(v));
        }
        | other => {
          warn!(key = %other, "ignoring unknown config override");
        }
      }
    }
    Ok(())
  }

  /// Configured zone, falling back to
  /// the default and finally UTC.
  pub fn timezone(&self) -> Tz {
    parse_timezone(
      &self.timezone,
      "config"
    )
    .or_else(|| {
      parse_timezone(
        DEFAULT_TIMEZONE,
        "default"
      )
    })
    .unwrap_or_else(|| {
      tracing::error!(
        "failed to parse fallback \
         timezone; using UTC"
      );
      chrono_tz::UTC
    })
  }

  #[tracing::instrument(skip(
    self,
    override_path
  ))]
  pub fn resolve_state_file(
    &self,
    override_path: Option<&Path>
  ) -> anyhow::Result<PathBuf> {
    if let Some(path) = override_path {
      return Ok(path.to_path_buf());
    }
    if let Some(path) =
      self.state_file.as_deref()
    {
      return Ok(expand_tilde(path));
    }
    let data = dirs::data_dir()
      .ok_or_else(|| {
        anyhow!(
          "cannot determine data \
           directory"
        )
      })?;
    Ok(
      data
        .join("tafel")
        .join(STATE_FILE_NAME)
    )
  }
}

fn resolve_config_path(
  override_path: Option<&Path>
) -> anyhow::Result<Option<PathBuf>> {
  if let Some(path) = override_path {
    return Ok(Some(path.to_path_buf()));
  }

  if let Ok(raw) =
    std::env::var(CONFIG_ENV_VAR)
  {
    let trimmed = raw.trim();
    if trimmed == "/dev/null" {
      return Ok(None);
    }
    if !trimmed.is_empty() {
      return Ok(Some(PathBuf::from(
        trimmed
      )));
    }
  }

  let local = std::env::current_dir()
    .context(
      "cannot determine current \
       directory"
    )?
    .join(CONFIG_FILE);
  if local.exists() {
    return Ok(Some(local));
  }

  if let Some(dir) = dirs::config_dir() {
    let candidate =
      dir.join("tafel").join(CONFIG_FILE);
    if candidate.exists() {
      return Ok(Some(candidate));
    }
  }

  Ok(None)
}

fn expand_tilde(
  path: &Path
) -> PathBuf {
  let text = path.to_string_lossy();
  if let Some(rest) =
    text.strip_prefix("~/")
    && let Some(home) = dirs::home_dir()
  {
    return home.join(rest);
  }
  path.to_path_buf()
}

fn parse_bool(s: &str) -> Option<bool> {
  match s
    .trim()
    .to_ascii_lowercase()
    .as_str()
  {
    | "1" | "y" | "yes" | "on"
    | "true" => Some(true),
    | "0" | "n" | "no" | "off"
    | "false" => Some(false),
    | _ => None
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::Config;
  use crate::i18n::Language;

  #[test]
  fn loads_toml_file() {
    let mut file =
      tempfile::NamedTempFile::new()
        .expect("temp file");
    writeln!(
      file,
      "timezone = \"Europe/London\"\n\
       language = \"en\"\n\
       color = false"
    )
    .expect("write config");

    let cfg = Config::load(Some(
      file.path()
    ))
    .expect("load config");
    assert_eq!(
      cfg.timezone(),
      chrono_tz::Europe::London
    );
    assert_eq!(cfg.language, Language::En);
    assert!(!cfg.color);
    assert_eq!(cfg.loaded_files.len(), 1);
  }

  #[test]
  fn overrides_replace_values() {
    let mut cfg = Config::default();
    cfg
      .apply_overrides(vec![
        (
          "rc.language".to_string(),
          "en".to_string()
        ),
        (
          "color".to_string(),
          "off".to_string()
        ),
        (
          "state.file".to_string(),
          "/tmp/filter.json".to_string()
        ),
      ])
      .expect("overrides");
    assert_eq!(cfg.language, Language::En);
    assert!(!cfg.color);
    assert_eq!(
      cfg
        .resolve_state_file(None)
        .expect("state file")
        .to_string_lossy(),
      "/tmp/filter.json"
    );
  }

  #[test]
  fn bad_override_is_an_error() {
    let mut cfg = Config::default();
    assert!(
      cfg
        .apply_overrides(vec![(
          "color".to_string(),
          "maybe".to_string()
        )])
        .is_err()
    );
  }

  #[test]
  fn invalid_timezone_falls_back_to_default()
   {
    let cfg = Config {
      timezone: "Nowhere/Special"
        .to_string(),
      ..Config::default()
    };
    assert_eq!(
      cfg.timezone(),
      chrono_tz::Europe::Amsterdam
    );
  }
}
