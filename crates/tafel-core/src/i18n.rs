//! Labels for the date filter in the two
//! dashboard languages.
//!
//! Keys are an enum rather than dotted
//! strings, so a missing translation is a
//! compile error instead of a silent
//! fallback.

use std::fmt;
use std::str::FromStr;

use anyhow::anyhow;
use chrono::{
  Datelike,
  NaiveDate
};
use serde::{
  Deserialize,
  Serialize
};

use crate::calendar::CalendarViewMonth;
use crate::preset::DatePreset;

#[derive(
  Debug,
  Clone,
  Copy,
  Default,
  PartialEq,
  Eq,
  Serialize,
  Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Language {
  #[default]
  Nl,
  En
}

impl Language {
  pub fn as_tag(self) -> &'static str {
    match self {
      | Language::Nl => "nl",
      | Language::En => "en"
    }
  }
}

impl fmt::Display for Language {
  fn fmt(
    &self,
    f: &mut fmt::Formatter<'_>
  ) -> fmt::Result {
    f.write_str(self.as_tag())
  }
}

impl FromStr for Language {
  type Err = anyhow::Error;

  fn from_str(
    s: &str
  ) -> Result<Self, Self::Err> {
    match s
      .trim()
      .to_ascii_lowercase()
      .as_str()
    {
      | "nl" | "nl-nl" => Ok(Language::Nl),
      | "en" | "en-us" | "en-gb" => {
        Ok(Language::En)
      }
      | other => {
        Err(anyhow!(
          "unsupported language: {other} \
           (expected nl or en)"
        ))
      }
    }
  }
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
)]
pub enum TextKey {
  Preset(DatePreset),
  FilterTitle,
  NoSelection,
  Confirm,
  Cancel,
  PreviousMonth,
  NextMonth,
  StartDate,
  EndDate
}

pub fn translate(
  language: Language,
  key: TextKey
) -> &'static str {
  match language {
    | Language::Nl => translate_nl(key),
    | Language::En => translate_en(key)
  }
}

fn translate_nl(key: TextKey) -> &'static str {
  match key {
    | TextKey::Preset(preset) => {
      match preset {
        | DatePreset::Today => "Vandaag",
        | DatePreset::Yesterday => {
          "Gisteren"
        }
        | DatePreset::LastWeek => {
          "Vorige week"
        }
        | DatePreset::LastMonth => {
          "Vorige maand"
        }
        | DatePreset::LastQuarter => {
          "Vorig kwartaal"
        }
        | DatePreset::LastYear => {
          "Vorig jaar"
        }
        | DatePreset::WeekToDate => {
          "Week tot nu"
        }
        | DatePreset::MonthToDate => {
          "Maand tot nu"
        }
        | DatePreset::QuarterToDate => {
          "Kwartaal tot nu"
        }
        | DatePreset::YearToDate => {
          "Jaar tot nu"
        }
        | DatePreset::Custom => {
          "Aangepast"
        }
      }
    }
    | TextKey::FilterTitle => "Periode",
    | TextKey::NoSelection => {
      "Selecteer periode"
    }
    | TextKey::Confirm => "Toepassen",
    | TextKey::Cancel => "Annuleren",
    | TextKey::PreviousMonth => {
      "Vorige"
    }
    | TextKey::NextMonth => "Volgende",
    | TextKey::StartDate => "Startdatum",
    | TextKey::EndDate => "Einddatum"
  }
}

fn translate_en(key: TextKey) -> &'static str {
  match key {
    | TextKey::Preset(preset) => {
      match preset {
        | DatePreset::Today => "Today",
        | DatePreset::Yesterday => {
          "Yesterday"
        }
        | DatePreset::LastWeek => {
          "Last week"
        }
        | DatePreset::LastMonth => {
          "Last month"
        }
        | DatePreset::LastQuarter => {
          "Last quarter"
        }
        | DatePreset::LastYear => {
          "Last year"
        }
        | DatePreset::WeekToDate => {
          "Week to date"
        }
        | DatePreset::MonthToDate => {
          "Month to date"
        }
        | DatePreset::QuarterToDate => {
          "Quarter to date"
        }
        | DatePreset::YearToDate => {
          "Year to date"
        }
        | DatePreset::Custom => "Custom"
      }
    }
    | TextKey::FilterTitle => {
      "Date range"
    }
    | TextKey::NoSelection => {
      "Select period"
    }
    | TextKey::Confirm => "Apply",
    | TextKey::Cancel => "Cancel",
    | TextKey::PreviousMonth => {
      "Previous"
    }
    | TextKey::NextMonth => "Next",
    | TextKey::StartDate => "Start date",
    | TextKey::EndDate => "End date"
  }
}

const MONTHS_NL: [&str; 12] = [
  "januari",
  "februari",
  "maart",
  "april",
  "mei",
  "juni",
  "juli",
  "augustus",
  "september",
  "oktober",
  "november",
  "december"
];

const MONTHS_EN: [&str; 12] = [
  "January",
  "February",
  "March",
  "April",
  "May",
  "June",
  "July",
  "August",
  "September",
  "October",
  "November",
  "December"
];

pub fn month_name(
  language: Language,
  month0: u32
) -> &'static str {
  let names = match language {
    | Language::Nl => &MONTHS_NL,
    | Language::En => &MONTHS_EN
  };
  names[(month0 as usize) % 12]
}

pub fn month_title(
  language: Language,
  view: CalendarViewMonth
) -> String {
  format!(
    "{} {}",
    month_name(language, view.month0()),
    view.year()
  )
}

/// Monday-first column headings.
pub fn weekday_labels(
  language: Language
) -> [&'static str; 7] {
  match language {
    | Language::Nl => {
      ["ma", "di", "wo", "do", "vr", "za", "zo"]
    }
    | Language::En => {
      ["Mo", "Tu", "We", "Th", "Fr", "Sa", "Su"]
    }
  }
}

/// Short locale date, matching what the
/// browser prints for `nl-NL` and
/// `en-US`.
pub fn format_date(
  language: Language,
  date: NaiveDate
) -> String {
  match language {
    | Language::Nl => {
      format!(
        "{}-{}-{}",
        date.day(),
        date.month(),
        date.year()
      )
    }
    | Language::En => {
      format!(
        "{}/{}/{}",
        date.month(),
        date.day(),
        date.year()
      )
    }
  }
}

#[cfg(test)]
mod tests {
  use chrono::NaiveDate;

  use super::{
    Language,
    TextKey,
    format_date,
    month_title,
    translate
  };
  use crate::calendar::CalendarViewMonth;
  use crate::preset::DatePreset;

  #[test]
  fn every_preset_has_a_label_in_both_languages()
   {
    for language in
      [Language::Nl, Language::En]
    {
      for preset in DatePreset::NAMED {
        assert!(
          !translate(
            language,
            TextKey::Preset(preset)
          )
          .is_empty()
        );
      }
    }
    assert_eq!(
      translate(
        Language::Nl,
        TextKey::Preset(
          DatePreset::LastQuarter
        )
      ),
      "Vorig kwartaal"
    );
  }

  #[test]
  fn locale_date_formats() {
    let date =
      NaiveDate::from_ymd_opt(2025, 6, 8)
        .expect("valid date");
    assert_eq!(
      format_date(Language::Nl, date),
      "8-6-2025"
    );
    assert_eq!(
      format_date(Language::En, date),
      "6/8/2025"
    );
  }

  #[test]
  fn month_titles() {
    let view =
      CalendarViewMonth::new(2025, 2)
        .expect("view");
    assert_eq!(
      month_title(Language::Nl, view),
      "maart 2025"
    );
    assert_eq!(
      month_title(Language::En, view),
      "March 2025"
    );
  }

  #[test]
  fn parses_language_tags() {
    assert_eq!(
      "EN".parse::<Language>()
        .expect("parse"),
      Language::En
    );
    assert!(
      "de".parse::<Language>().is_err()
    );
  }
}
