//! Cell types and per-cell type resolution

use std::borrow::Cow;

use chrono::{NaiveDate, NaiveDateTime};

use crate::column::ColumnMetadata;
use crate::style::{NumberFormat, StyleDescriptor};

/// The kind of a cell.
///
/// Column declarations may use any variant. Resolution against a raw value always yields one of
/// [`InlineString`](CellType::InlineString), [`Numeric`](CellType::Numeric),
/// [`Boolean`](CellType::Boolean) or [`Error`](CellType::Error).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CellType {
    /// Declared text; always written inline
    String,
    /// Inline string (`t="inlineStr"`)
    InlineString,
    /// Any finite number
    Numeric,
    /// Whole number, passed through as written
    Integer,
    /// Number re-rendered at the column's format precision
    Decimal,
    /// Spreadsheet serial date
    Date,
    /// `1`/`0`
    Boolean,
    /// One of the spreadsheet error literals
    Error,
}

/// Error literals accepted by [`CellType::Error`] columns.
pub const ERROR_LITERALS: [&str; 7] = [
    "#NULL!", "#DIV/0!", "#VALUE!", "#REF!", "#NAME?", "#NUM!", "#N/A",
];

impl CellType {
    /// Map [`String`](CellType::String) to [`InlineString`](CellType::InlineString).
    pub fn normalized(self) -> Self {
        match self {
            CellType::String => CellType::InlineString,
            other => other,
        }
    }

    /// Type used for a cell whose column declares nothing.
    pub fn infer(raw: &str) -> Self {
        if parse_number(raw).is_some() {
            CellType::Numeric
        } else {
            CellType::InlineString
        }
    }

    /// Effective type of `raw` in a column declared as `self`.
    pub fn resolve_type(self, raw: &str) -> Self {
        ResolvedCell::resolve(raw, Some(&ColumnMetadata::from(self))).cell_type
    }

    /// Value of the `t` attribute for an effective type (`None` means numeric).
    pub fn xlsx_type(self) -> Option<&'static str> {
        match self.normalized() {
            CellType::InlineString => Some("inlineStr"),
            CellType::Boolean => Some("b"),
            CellType::Error => Some("e"),
            _ => None,
        }
    }

    /// Effective type from a `t` attribute.
    pub fn from_xlsx_type(t: Option<&str>) -> Self {
        match t {
            Some("inlineStr") | Some("s") | Some("str") => CellType::InlineString,
            Some("b") => CellType::Boolean,
            Some("e") => CellType::Error,
            _ => CellType::Numeric,
        }
    }

    /// Format a declared type uses when no explicit format is given.
    pub fn default_number_format(self) -> NumberFormat {
        match self {
            CellType::Integer => NumberFormat::integer(),
            CellType::Decimal => NumberFormat::decimal(),
            CellType::Date => NumberFormat::date_short(),
            _ => NumberFormat::General,
        }
    }
}

/// A raw value after type resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCell<'a> {
    /// Text written into the cell's value element
    pub value: Cow<'a, str>,
    /// Effective type
    pub cell_type: CellType,
    /// Style descriptor; `None` means the built-in default style
    pub descriptor: Option<StyleDescriptor>,
}

impl<'a> ResolvedCell<'a> {
    /// Resolve `raw` against an optional column declaration.
    ///
    /// Values that don't parse under the declared type fall back to an inline string with the
    /// default style. Declarations are a per-cell hint, never an error.
    pub fn resolve(raw: &'a str, metadata: Option<&ColumnMetadata>) -> Self {
        let Some(metadata) = metadata else {
            return match parse_number(raw) {
                Some(_) => Self::numeric(Cow::Borrowed(raw), StyleDescriptor::inferred_numeric()),
                None => Self::inline(raw),
            };
        };

        let numeric = |value: Cow<'a, str>| (value, CellType::Numeric);
        let accepted = match metadata.cell_type.normalized() {
            CellType::String | CellType::InlineString => None,
            CellType::Numeric => parse_number(raw).map(|_| numeric(Cow::Borrowed(raw))),
            CellType::Integer => raw.parse::<i64>().ok().map(|_| numeric(Cow::Borrowed(raw))),
            CellType::Decimal => parse_number(raw).map(|n| {
                let places = metadata.number_format.decimal_places();
                numeric(Cow::Owned(format!("{:.*}", places, n)))
            }),
            CellType::Date => parse_date(raw).map(numeric),
            CellType::Boolean => parse_bool(raw)
                .map(|b| (Cow::Borrowed(if b { "1" } else { "0" }), CellType::Boolean)),
            CellType::Error => ERROR_LITERALS
                .contains(&raw)
                .then(|| (Cow::Borrowed(raw), CellType::Error)),
        };

        match accepted {
            Some((value, cell_type)) => Self {
                value,
                cell_type,
                descriptor: metadata.descriptor(),
            },
            None => Self::inline(raw),
        }
    }

    fn inline(raw: &'a str) -> Self {
        Self {
            value: Cow::Borrowed(raw),
            cell_type: CellType::InlineString,
            descriptor: None,
        }
    }

    fn numeric(value: Cow<'a, str>, descriptor: StyleDescriptor) -> Self {
        Self {
            value,
            cell_type: CellType::Numeric,
            descriptor: Some(descriptor),
        }
    }
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.parse::<f64>().ok().filter(|n| n.is_finite())
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw {
        "1" => Some(true),
        "0" => Some(false),
        _ if raw.eq_ignore_ascii_case("true") => Some(true),
        _ if raw.eq_ignore_ascii_case("false") => Some(false),
        _ => None,
    }
}

/// A serial number passes through; ISO dates and date-times become 1900-system serials.
fn parse_date(raw: &str) -> Option<Cow<'_, str>> {
    if parse_number(raw).is_some() {
        return Some(Cow::Borrowed(raw));
    }

    let datetime = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S%.f"))
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })?;

    serial_from_datetime(datetime).map(|serial| Cow::Owned(serial.to_string()))
}

/// Days since 1899-12-30, keeping the 1900 leap-year quirk for January and February 1900.
fn serial_from_datetime(datetime: NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?.and_hms_opt(0, 0, 0)?;
    let first = NaiveDate::from_ymd_opt(1900, 1, 1)?.and_hms_opt(0, 0, 0)?;
    let quirk_end = NaiveDate::from_ymd_opt(1900, 3, 1)?.and_hms_opt(0, 0, 0)?;
    if datetime < first {
        return None;
    }

    let elapsed = datetime - epoch;
    let mut serial = elapsed.num_seconds() as f64 / 86_400.0;
    if datetime < quirk_end {
        serial -= 1.0;
    }
    Some(serial)
}
