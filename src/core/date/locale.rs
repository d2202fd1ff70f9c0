//! Locale fallback for date and time strings that match none of the fixed
//! layouts.
//!
//! Locale services live outside the value layer. They are reached through
//! [`LocaleFormat`]; [`PatternLocale`] is the implementation driven by the
//! patterns in [`LocaleConfig`].

use crate::config::LocaleConfig;

/// Parses locale-specific date and time strings into raw fields.
///
/// Implementations only recognise the layout, calendar validation happens
/// afterwards. Returning `None` means the text is not in this locale's form.
pub trait LocaleFormat {
    fn parse_date(&self, text: &str) -> Option<(i32, i32, i32)>;

    fn parse_time(&self, text: &str) -> Option<(i32, i32, i32)>;
}

/// Pattern letters, a subset of the usual date format syntax:
///
/// | Letter | Field                  |
/// |--------|------------------------|
/// | `y`    | year, up to 4 digits   |
/// | `M`    | month, up to 2 digits  |
/// | `d`    | day, up to 2 digits    |
/// | `H`    | hour 0-23              |
/// | `h`    | hour 1-12, with `a`    |
/// | `m`    | minute                 |
/// | `s`    | second                 |
/// | `a`    | `AM`/`PM` marker       |
///
/// Text between single quotes is literal, `''` is a quote. Any other
/// non-letter character matches itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    Year,
    Month,
    Day,
    Hour24,
    Hour12,
    Minute,
    Second,
    Meridiem,
    Literal(char),
}

#[derive(Debug, Clone, PartialEq)]
struct Pattern {
    source: String,
    fields: Vec<Field>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternLocale {
    date_patterns: Vec<Pattern>,
    time_patterns: Vec<Pattern>,
}

#[derive(Debug, Default)]
struct Parsed {
    year: Option<i32>,
    month: Option<i32>,
    day: Option<i32>,
    hour: Option<i32>,
    hour12: Option<i32>,
    minute: Option<i32>,
    second: Option<i32>,
    pm: Option<bool>,
}

impl Field {
    const fn max_digits(self) -> usize {
        match self {
            Self::Year => 4,
            _ => 2,
        }
    }
}

impl Pattern {
    /// Compiles `source`, or `None` if it uses an unsupported letter or an
    /// unterminated quote.
    fn compile(source: &str) -> Option<Self> {
        let mut fields = Vec::new();
        let mut chars = source.chars().peekable();

        while let Some(c) = chars.next() {
            let field = match c {
                'y' => Field::Year,
                'M' => Field::Month,
                'd' => Field::Day,
                'H' => Field::Hour24,
                'h' => Field::Hour12,
                'm' => Field::Minute,
                's' => Field::Second,
                'a' => Field::Meridiem,
                '\'' if chars.peek() == Some(&'\'') => {
                    chars.next();
                    Field::Literal('\'')
                }
                '\'' => {
                    let mut closed = false;
                    for quoted in chars.by_ref() {
                        if quoted == '\'' {
                            closed = true;
                            break;
                        }
                        fields.push(Field::Literal(quoted));
                    }
                    if !closed {
                        return None;
                    }
                    continue;
                }
                c if c.is_ascii_alphabetic() => return None,
                c => Field::Literal(c),
            };

            // `yyyy` is one field
            if !matches!(field, Field::Literal(_)) {
                while chars.peek() == Some(&c) {
                    chars.next();
                }
            }
            fields.push(field);
        }

        Some(Self {
            source: source.to_string(),
            fields,
        })
    }

    fn matches(&self, text: &str) -> Option<Parsed> {
        let input: Vec<char> = text.chars().collect();
        let mut pos = 0;
        let mut parsed = Parsed::default();

        for field in &self.fields {
            match *field {
                Field::Literal(expected) => {
                    if input.get(pos) != Some(&expected) {
                        return None;
                    }
                    pos += 1;
                }
                Field::Meridiem => {
                    let marker: String = input.get(pos..pos + 2)?.iter().collect();
                    parsed.pm = match marker.to_ascii_uppercase().as_str() {
                        "AM" => Some(false),
                        "PM" => Some(true),
                        _ => return None,
                    };
                    pos += 2;
                }
                numeric => {
                    let digits = input[pos..]
                        .iter()
                        .take(numeric.max_digits())
                        .take_while(|c| c.is_ascii_digit())
                        .count();
                    if digits == 0 {
                        return None;
                    }

                    let value = input[pos..pos + digits]
                        .iter()
                        .fold(0, |acc, c| acc * 10 + (*c as i32 - '0' as i32));
                    pos += digits;

                    let slot = match numeric {
                        Field::Year => &mut parsed.year,
                        Field::Month => &mut parsed.month,
                        Field::Day => &mut parsed.day,
                        Field::Hour24 => &mut parsed.hour,
                        Field::Hour12 => &mut parsed.hour12,
                        Field::Minute => &mut parsed.minute,
                        _ => &mut parsed.second,
                    };
                    *slot = Some(value);
                }
            }
        }

        (pos == input.len()).then_some(parsed)
    }
}

impl Parsed {
    fn date(&self) -> Option<(i32, i32, i32)> {
        Some((self.year?, self.month?, self.day?))
    }

    fn time(&self) -> Option<(i32, i32, i32)> {
        let hour = match (self.hour, self.hour12, self.pm) {
            (Some(hour), None, _) => hour,
            (None, Some(hour @ 1..=12), Some(pm)) => hour % 12 + if pm { 12 } else { 0 },
            (None, Some(hour), None) => hour,
            _ => return None,
        };

        Some((hour, self.minute.unwrap_or(0), self.second.unwrap_or(0)))
    }
}

fn compile_all<I>(patterns: I) -> Vec<Pattern>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    patterns
        .into_iter()
        .filter_map(|source| {
            let source = source.as_ref();
            let pattern = Pattern::compile(source);
            if pattern.is_none() {
                tracing::warn!(pattern = source, "ignoring unsupported locale pattern");
            }
            pattern
        })
        .collect()
}

impl PatternLocale {
    pub fn new<D, T>(date_patterns: D, time_patterns: T) -> Self
    where
        D: IntoIterator,
        D::Item: AsRef<str>,
        T: IntoIterator,
        T::Item: AsRef<str>,
    {
        Self {
            date_patterns: compile_all(date_patterns),
            time_patterns: compile_all(time_patterns),
        }
    }

    pub fn from_config(config: &LocaleConfig) -> Self {
        Self::new(&config.date_patterns, &config.time_patterns)
    }

    pub fn is_empty(&self) -> bool {
        self.date_patterns.is_empty() && self.time_patterns.is_empty()
    }
}

impl LocaleFormat for PatternLocale {
    fn parse_date(&self, text: &str) -> Option<(i32, i32, i32)> {
        self.date_patterns.iter().find_map(|pattern| {
            let fields = pattern.matches(text)?.date()?;
            tracing::trace!(pattern = pattern.source, "locale date pattern matched");
            Some(fields)
        })
    }

    fn parse_time(&self, text: &str) -> Option<(i32, i32, i32)> {
        self.time_patterns.iter().find_map(|pattern| {
            let fields = pattern.matches(text)?.time()?;
            tracing::trace!(pattern = pattern.source, "locale time pattern matched");
            Some(fields)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compile_fields() {
        let pattern = Pattern::compile("dd/MM/yyyy").unwrap();
        assert_eq!(
            pattern.fields,
            vec![
                Field::Day,
                Field::Literal('/'),
                Field::Month,
                Field::Literal('/'),
                Field::Year
            ]
        );

        let pattern = Pattern::compile("HH'h'mm''").unwrap();
        assert_eq!(
            pattern.fields,
            vec![
                Field::Hour24,
                Field::Literal('h'),
                Field::Minute,
                Field::Literal('\'')
            ]
        );
    }

    #[test]
    fn unsupported_patterns_are_dropped() {
        assert!(Pattern::compile("EEE dd").is_none());
        assert!(Pattern::compile("dd 'of").is_none());

        let locale = PatternLocale::new(["EEE", "zzz"], ["Q"]);
        assert!(locale.is_empty());
    }

    #[test]
    fn day_first_dates() {
        let locale = PatternLocale::new(["dd/MM/yyyy", "yyyyMMdd"], Vec::<String>::new());
        assert_eq!(locale.parse_date("15/01/2024"), Some((2024, 1, 15)));
        assert_eq!(locale.parse_date("5/1/2024"), Some((2024, 1, 5)));
        assert_eq!(locale.parse_date("20240115"), Some((2024, 1, 15)));
        assert_eq!(locale.parse_date("15/01/2024 "), None);
        assert_eq!(locale.parse_time("15/01/2024"), None);
    }

    #[test]
    fn twelve_hour_times() {
        let locale = PatternLocale::new(Vec::<String>::new(), ["hh:mm a", "HH-mm-ss"]);
        assert_eq!(locale.parse_time("07:15 pm"), Some((19, 15, 0)));
        assert_eq!(locale.parse_time("12:00 AM"), Some((0, 0, 0)));
        assert_eq!(locale.parse_time("12:00 PM"), Some((12, 0, 0)));
        assert_eq!(locale.parse_time("13:00 PM"), None);
        assert_eq!(locale.parse_time("23-59-58"), Some((23, 59, 58)));
    }

    #[test]
    fn from_config() {
        let config = LocaleConfig {
            date_patterns: vec!["dd-MM-yyyy".into()],
            time_patterns: vec![],
        };
        let locale = PatternLocale::from_config(&config);
        assert_eq!(locale.parse_date("31-12-1999"), Some((1999, 12, 31)));
    }
}
