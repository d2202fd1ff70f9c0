//! Hand-written scanner for the fixed date and time layouts.
//!
//! The grammar is small enough that a cursor over the input bytes is all that
//! is needed: every field is a bounded digit run followed by one separator
//! from a known set, and the layout is chosen by peeking at the first
//! separator in the string.

use crate::core::date::compute_encoded_time;
use crate::{Result, TypeError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Separator {
    Char(u8),
    /// End of input, trailing blanks included.
    End,
}

use Separator::{Char, End};

const ISO_DATE: &[Separator] = &[Char(b'-')];
const USA_DATE: &[Separator] = &[Char(b'/')];
const EUR_DATE: &[Separator] = &[Char(b'.')];
const END_ONLY: &[Separator] = &[End];
/// A date may be followed by the time part of a timestamp.
const DATE_END: &[Separator] = &[End, Char(b' '), Char(b'T'), Char(b'-')];
const TIMESTAMP_DATE_END: &[Separator] = &[Char(b' '), Char(b'T'), Char(b'-')];
const TIMESTAMP_TIME: &[Separator] = &[Char(b':'), Char(b'.')];
const TIMESTAMP_SECONDS: &[Separator] = &[Char(b'.'), End];
const HOUR: &[Separator] = &[Char(b'.'), Char(b':'), Char(b' ')];
const EUR_MINUTE: &[Separator] = &[Char(b'.'), End];
const JIS_MINUTE: &[Separator] = &[Char(b':'), Char(b' '), End];

const AM_PM: [&str; 2] = ["AM", "PM"];
const AM: usize = 0;

struct DateTimeParser<'input> {
    input: &'input str,
    bytes: &'input [u8],
    cursor: usize,
    /// Separator that ended the last field.
    current: Separator,
}

impl<'input> DateTimeParser<'input> {
    fn new(input: &'input str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            cursor: 0,
            current: End,
        }
    }

    fn syntax_error(&self) -> TypeError {
        TypeError::DateTimeSyntax(self.input.to_string())
    }

    /// Reads a run of at most `max_digits` digits that must be terminated by
    /// one of `separators`. The separator is consumed.
    ///
    /// Unless `truncation_allowed`, exactly `max_digits` digits are required.
    /// A fraction is scaled up as if it had been written with all its digits.
    fn parse_int(
        &mut self,
        max_digits: usize,
        truncation_allowed: bool,
        separators: &[Separator],
        is_fraction: bool,
    ) -> Result<i32> {
        let mut number = 0i32;
        let mut digits = 0;

        while let Some(&byte) = self.bytes.get(self.cursor) {
            if !byte.is_ascii_digit() {
                break;
            }
            if digits >= max_digits {
                return Err(self.syntax_error());
            }
            number = number * 10 + (byte - b'0') as i32;
            digits += 1;
            self.cursor += 1;
        }

        let complete = match truncation_allowed {
            true => digits > 0,
            _ => digits == max_digits,
        };
        if !complete {
            return Err(self.syntax_error());
        }

        if is_fraction {
            for _ in digits..max_digits {
                number *= 10;
            }
        }

        self.update_current_separator();
        if !separators.contains(&self.current) {
            return Err(self.syntax_error());
        }
        if self.current != End {
            self.cursor += 1;
        }

        Ok(number)
    }

    fn update_current_separator(&mut self) {
        let rest = &self.bytes[self.cursor..];
        self.current = match rest.first() {
            None => End,
            Some(b' ') if rest.iter().all(|b| *b == b' ') => {
                self.cursor = self.bytes.len();
                End
            }
            Some(&byte) => Char(byte),
        };
    }

    /// Matches one of `choices` case-insensitively, returning its index.
    fn parse_choice(&mut self, choices: &[&str]) -> Result<usize> {
        let rest = &self.bytes[self.cursor..];

        for (index, choice) in choices.iter().enumerate() {
            let len = choice.len();
            if rest.len() >= len && rest[..len].eq_ignore_ascii_case(choice.as_bytes()) {
                self.cursor += len;
                return Ok(index);
            }
        }

        Err(self.syntax_error())
    }

    /// The first non-digit ahead of the cursor, without consuming anything.
    fn next_separator(&self) -> Separator {
        self.bytes[self.cursor..]
            .iter()
            .find(|b| !b.is_ascii_digit())
            .map_or(End, |b| Char(*b))
    }

    fn check_end(&mut self) -> Result<()> {
        match self.bytes[self.cursor..].iter().all(|b| *b == b' ') {
            true => {
                self.cursor = self.bytes.len();
                Ok(())
            }
            _ => Err(self.syntax_error()),
        }
    }

    /// `hh:mm:ss[.fffffffff]` or `hh.mm.ss[.fffffffff]` after a timestamp's date.
    fn parse_timestamp_time(&mut self) -> Result<(i32, i32, i32)> {
        let hour = self.parse_int(2, true, TIMESTAMP_TIME, false)?;
        let minute = self.parse_int(2, false, TIMESTAMP_TIME, false)?;
        let second = self.parse_int(2, false, TIMESTAMP_SECONDS, false)?;
        if self.current == Char(b'.') {
            self.parse_int(9, true, END_ONLY, true)?;
        }

        compute_encoded_time(hour, minute, second)?;
        Ok((hour, minute, second))
    }
}

/// Scans an ISO, USA or EUR date into `(year, month, day)`.
/// Calendar validation is left to the caller.
pub(super) fn parse_date(text: &str) -> Result<(i32, i32, i32)> {
    let mut parser = DateTimeParser::new(text.trim());

    match parser.next_separator() {
        Char(b'-') => {
            let year = parser.parse_int(4, false, ISO_DATE, false)?;
            let month = parser.parse_int(2, true, ISO_DATE, false)?;
            let day = parser.parse_int(2, true, DATE_END, false)?;
            if parser.current != End {
                parser.parse_timestamp_time()?;
            }
            Ok((year, month, day))
        }
        Char(b'/') => {
            let month = parser.parse_int(2, true, USA_DATE, false)?;
            let day = parser.parse_int(2, true, USA_DATE, false)?;
            let year = parser.parse_int(4, false, END_ONLY, false)?;
            Ok((year, month, day))
        }
        Char(b'.') => {
            let day = parser.parse_int(2, true, EUR_DATE, false)?;
            let month = parser.parse_int(2, true, EUR_DATE, false)?;
            let year = parser.parse_int(4, false, END_ONLY, false)?;
            Ok((year, month, day))
        }
        _ => Err(parser.syntax_error()),
    }
}

/// Scans a time in any of the fixed layouts into `(hour, minute, second)`,
/// with AM/PM already folded into the 24 hour clock.
pub(super) fn parse_time(text: &str) -> Result<(i32, i32, i32)> {
    let mut parser = DateTimeParser::new(text.trim());

    if parser.next_separator() == Char(b'-') {
        parser.parse_int(4, false, ISO_DATE, false)?;
        parser.parse_int(2, true, ISO_DATE, false)?;
        parser.parse_int(2, true, TIMESTAMP_DATE_END, false)?;
        let time = parser.parse_timestamp_time()?;
        parser.check_end()?;
        return Ok(time);
    }

    let hour = parser.parse_int(2, true, HOUR, false)?;
    let mut minute = 0;
    let mut second = 0;
    let mut am_pm = None;

    match parser.current {
        Char(b'.') => {
            minute = parser.parse_int(2, false, EUR_MINUTE, false)?;
            if parser.current == Char(b'.') {
                second = parser.parse_int(2, false, END_ONLY, false)?;
            }
        }
        Char(b':') => {
            minute = parser.parse_int(2, false, JIS_MINUTE, false)?;
            match parser.current {
                Char(b':') => second = parser.parse_int(2, false, END_ONLY, false)?,
                Char(b' ') => am_pm = Some(parser.parse_choice(&AM_PM)?),
                _ => {}
            }
        }
        _ => am_pm = Some(parser.parse_choice(&AM_PM)?),
    }

    parser.check_end()?;

    let hour = match am_pm {
        Some(am_pm) => twenty_four_hour(hour, minute, second, am_pm)?,
        None => hour,
    };

    Ok((hour, minute, second))
}

/// 12 AM is midnight: `24` when it is exactly 12:00:00 AM, `0` otherwise.
fn twenty_four_hour(hour: i32, minute: i32, second: i32, am_pm: usize) -> Result<i32> {
    if hour > 12 {
        return Err(TypeError::DateTimeRange);
    }

    Ok(match (am_pm == AM, hour) {
        (true, 12) if minute == 0 && second == 0 => 24,
        (true, 12) => 0,
        (true, _) => hour,
        (false, 12) => 12,
        (false, _) => hour + 12,
    })
}
