use anyhow::anyhow;
use chrono::{
  DateTime,
  LocalResult,
  NaiveDate,
  TimeZone,
  Utc
};
use chrono_tz::Tz;

/// Source of "today" for the filter.
/// Injected so tests and scripted
/// sessions can pin the date.
pub trait Clock {
  fn today(&self) -> NaiveDate;
}

/// Wall clock read in the restaurant's
/// configured timezone.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
  timezone: Tz
}

impl SystemClock {
  pub fn new(timezone: Tz) -> Self {
    Self { timezone }
  }
}

impl Clock for SystemClock {
  fn today(&self) -> NaiveDate {
    Utc::now()
      .with_timezone(&self.timezone)
      .date_naive()
  }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
  fn today(&self) -> NaiveDate {
    self.0
  }
}

pub fn parse_timezone(
  raw: &str,
  source: &str
) -> Option<Tz> {
  let trimmed = raw.trim();
  if trimmed.is_empty() {
    tracing::warn!(
      source,
      "timezone source was empty"
    );
    return None;
  }

  match trimmed.parse::<Tz>() {
    | Ok(tz) => {
      tracing::debug!(
        source,
        timezone = %trimmed,
        "parsed timezone"
      );
      Some(tz)
    }
    | Err(err) => {
      tracing::error!(
        source,
        timezone = %trimmed,
        error = %err,
        "failed to parse timezone id"
      );
      None
    }
  }
}

/// UTC instant of local midnight on
/// `date`. Ambiguous midnights take the
/// earliest instant; a skipped midnight
/// is an error.
pub fn local_midnight_to_utc(
  tz: Tz,
  date: NaiveDate,
  context: &str
) -> anyhow::Result<DateTime<Utc>> {
  let midnight = date
    .and_hms_opt(0, 0, 0)
    .ok_or_else(|| {
      anyhow!(
        "failed to construct midnight \
         for {date}"
      )
    })?;

  match tz.from_local_datetime(&midnight)
  {
    | LocalResult::Single(local_dt) => {
      Ok(local_dt.with_timezone(&Utc))
    }
    | LocalResult::Ambiguous(
      first,
      second
    ) => {
      tracing::warn!(
        context,
        first = %first,
        second = %second,
        "ambiguous local midnight; using earliest"
      );
      let chosen = if first <= second {
        first
      } else {
        second
      };
      Ok(chosen.with_timezone(&Utc))
    }
    | LocalResult::None => {
      Err(anyhow!(
        "local midnight of {date} does \
         not exist in {tz}: {context}"
      ))
    }
  }
}
