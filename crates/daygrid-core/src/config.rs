use std::fs;
use std::path::{
  Path,
  PathBuf
};
use std::time::Duration;

use anyhow::Context;
use chrono::NaiveDate;
use serde::{
  Deserialize,
  Serialize
};
use tracing::{
  debug,
  info,
  warn
};

use crate::binder::DEFAULT_MAX_VISIBLE_ROWS;
use crate::logging;
use crate::selection::SpilloverPolicy;
use crate::tag::FALLBACK_TAG_COLOR;
use crate::window::WeekStart;

const CONFIG_DIR_NAME: &str = "daygrid";
const CONFIG_FILE_NAME: &str =
  "calendar.toml";

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct CalendarConfig {
  #[serde(default = "default_locale")]
  pub locale:       String,
  #[serde(
    default = "default_week_start"
  )]
  pub week_start:   String,
  /// First month shown; today when
  /// absent.
  #[serde(default)]
  pub initial_date: Option<NaiveDate>,
  #[serde(default)]
  pub policies:     CalendarPolicies,
  #[serde(default)]
  pub style:        CalendarStyle,
  #[serde(default)]
  pub logging:      LoggingConfig
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct CalendarPolicies {
  #[serde(
    default = "default_max_visible_rows"
  )]
  pub max_visible_rows:    usize,
  #[serde(
    default = "default_redraw_delay_ms"
  )]
  pub redraw_delay_ms:     u64,
  #[serde(
    default = "default_spillover_selection"
  )]
  pub spillover_selection: String
}

#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct CalendarStyle {
  #[serde(default = "default_days_fg")]
  pub days_fg:            String,
  #[serde(
    default = "default_disabled_days_fg"
  )]
  pub disabled_days_fg:   String,
  #[serde(default = "default_today_fg")]
  pub today_fg:           String,
  #[serde(
    default = "default_fallback_tag_color"
  )]
  pub fallback_tag_color: String,
  #[serde(
    default = "default_selected_border"
  )]
  pub selected_border:    String,
  #[serde(default = "default_header")]
  pub header:             String
}

/// Console output for hosts that let
/// the calendar install the global
/// subscriber.
#[derive(
  Debug,
  Clone,
  PartialEq,
  Serialize,
  Deserialize,
)]
pub struct LoggingConfig {
  /// `EnvFilter` directive;
  /// `RUST_LOG` wins when set.
  #[serde(default = "default_filter")]
  pub filter:      String,
  #[serde(default = "default_true")]
  pub ansi:        bool,
  #[serde(default = "default_true")]
  pub show_target: bool
}

fn default_locale() -> String {
  "en".to_string()
}

fn default_week_start() -> String {
  "sunday".to_string()
}

fn default_max_visible_rows() -> usize
{
  DEFAULT_MAX_VISIBLE_ROWS
}

fn default_redraw_delay_ms() -> u64 {
  35
}

fn default_spillover_selection()
-> String {
  "ignore".to_string()
}

fn default_days_fg() -> String {
  "white".to_string()
}

fn default_disabled_days_fg() -> String
{
  "gray70".to_string()
}

fn default_today_fg() -> String {
  "lightblue".to_string()
}

fn default_fallback_tag_color()
-> String {
  FALLBACK_TAG_COLOR.to_string()
}

fn default_selected_border() -> String {
  "#1f6aa5".to_string()
}

fn default_header() -> String {
  "gray".to_string()
}

fn default_filter() -> String {
  "warn".to_string()
}

fn default_true() -> bool {
  true
}

impl Default for CalendarConfig {
  fn default() -> Self {
    Self {
      locale:       default_locale(),
      week_start:   default_week_start(),
      initial_date: None,
      policies:
        CalendarPolicies::default(),
      style:        CalendarStyle::default(),
      logging:      LoggingConfig::default()
    }
  }
}

impl Default for CalendarPolicies {
  fn default() -> Self {
    Self {
      max_visible_rows:
        default_max_visible_rows(),
      redraw_delay_ms:
        default_redraw_delay_ms(),
      spillover_selection:
        default_spillover_selection()
    }
  }
}

impl Default for CalendarStyle {
  fn default() -> Self {
    Self {
      days_fg:            default_days_fg(),
      disabled_days_fg:
        default_disabled_days_fg(),
      today_fg:
        default_today_fg(),
      fallback_tag_color:
        default_fallback_tag_color(),
      selected_border:
        default_selected_border(),
      header:             default_header()
    }
  }
}

impl Default for LoggingConfig {
  fn default() -> Self {
    Self {
      filter:      default_filter(),
      ansi:        true,
      show_target: true
    }
  }
}

impl CalendarConfig {
  /// Explicit path first, then the
  /// per-user config file, then
  /// defaults.
  #[tracing::instrument(skip(
    override_path
  ))]
  pub fn load(
    override_path: Option<&Path>
  ) -> anyhow::Result<Self> {
    let path = match override_path {
      | Some(path) => {
        Some(expand_tilde(path))
      }
      | None => default_config_path()
        .filter(|path| path.exists())
    };

    let Some(path) = path else {
      info!(
        "no calendar config found; \
         using defaults"
      );
      return Ok(Self::default());
    };

    info!(config = %path.display(), "loading calendar config");
    let text =
      fs::read_to_string(&path)
        .with_context(|| {
          format!(
            "failed to read {}",
            path.display()
          )
        })?;
    Self::from_toml_str(&text)
      .with_context(|| {
        format!(
          "failed to parse {}",
          path.display()
        )
      })
  }

  pub fn from_toml_str(
    text: &str
  ) -> anyhow::Result<Self> {
    let mut cfg =
      toml::from_str::<Self>(text)
        .context(
          "invalid calendar config"
        )?;
    cfg.sanitize();
    debug!(
      locale = %cfg.locale,
      week_start = %cfg.week_start,
      initial_date = ?cfg.initial_date,
      "parsed calendar config"
    );
    Ok(cfg)
  }

  pub fn week_start(&self) -> WeekStart {
    WeekStart::parse(&self.week_start)
      .unwrap_or_default()
  }

  pub fn spillover_policy(
    &self
  ) -> SpilloverPolicy {
    SpilloverPolicy::parse(
      &self.policies.spillover_selection
    )
    .unwrap_or_default()
  }

  pub fn redraw_delay(&self) -> Duration {
    Duration::from_millis(
      self.policies.redraw_delay_ms
    )
  }

  fn sanitize(&mut self) {
    if self.locale.trim().is_empty() {
      warn!(
        "empty locale; using default"
      );
      self.locale = default_locale();
    }

    if WeekStart::parse(&self.week_start)
      .is_none()
    {
      warn!(week_start = %self.week_start, "unknown week start; using default");
      self.week_start =
        default_week_start();
    }

    if self.policies.max_visible_rows
      == 0
    {
      warn!(
        "max_visible_rows must be \
         positive; using default"
      );
      self.policies.max_visible_rows =
        default_max_visible_rows();
    }

    if SpilloverPolicy::parse(
      &self.policies.spillover_selection
    )
    .is_none()
    {
      warn!(policy = %self.policies.spillover_selection, "unknown spillover selection policy; using default");
      self.policies.spillover_selection =
        default_spillover_selection();
    }

    if !logging::is_valid_directive(
      &self.logging.filter
    ) {
      warn!(filter = %self.logging.filter, "invalid log filter; using default");
      self.logging.filter =
        default_filter();
    }

    let style = &mut self.style;
    fill_empty(
      "days_fg",
      &mut style.days_fg,
      default_days_fg
    );
    fill_empty(
      "disabled_days_fg",
      &mut style.disabled_days_fg,
      default_disabled_days_fg
    );
    fill_empty(
      "today_fg",
      &mut style.today_fg,
      default_today_fg
    );
    fill_empty(
      "fallback_tag_color",
      &mut style.fallback_tag_color,
      default_fallback_tag_color
    );
    fill_empty(
      "selected_border",
      &mut style.selected_border,
      default_selected_border
    );
    fill_empty(
      "header",
      &mut style.header,
      default_header
    );
  }
}

fn fill_empty(
  field: &str,
  value: &mut String,
  fallback: fn() -> String
) {
  if value.trim().is_empty() {
    warn!(
      field,
      "empty style color; using \
       default"
    );
    *value = fallback();
  }
}

fn default_config_path()
-> Option<PathBuf> {
  dirs::config_dir().map(|dir| {
    dir
      .join(CONFIG_DIR_NAME)
      .join(CONFIG_FILE_NAME)
  })
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
