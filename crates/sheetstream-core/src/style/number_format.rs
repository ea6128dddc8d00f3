//! Number format types

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

impl NumberFormat {
    // Built-in format IDs
    /// 0 - General
    pub const ID_GENERAL: u32 = 0;
    /// 1 - 0
    pub const ID_NUMBER_INT: u32 = 1;
    /// 2 - 0.00
    pub const ID_NUMBER_DEC2: u32 = 2;
    /// 3 - #,##0
    pub const ID_NUMBER_SEP: u32 = 3;
    /// 4 - #,##0.00
    pub const ID_NUMBER_SEP_DEC2: u32 = 4;
    /// 9 - 0%
    pub const ID_PERCENT_INT: u32 = 9;
    /// 10 - 0.00%
    pub const ID_PERCENT_DEC2: u32 = 10;
    /// 14 - mm-dd-yy
    pub const ID_DATE_SHORT: u32 = 14;
    /// 22 - m/d/yy h:mm
    pub const ID_DATETIME: u32 = 22;
    /// 49 - @
    pub const ID_TEXT: u32 = 49;

    /// First ID available to custom format codes
    pub const FIRST_CUSTOM_ID: u32 = 164;

    /// Create a number format from a format string
    pub fn from_string<S: Into<String>>(format: S) -> Self {
        NumberFormat::Custom(format.into())
    }

    /// Create a format from a `numFmtId`, `General` for 0
    pub fn from_id(id: u32) -> Self {
        match id {
            Self::ID_GENERAL => NumberFormat::General,
            id => NumberFormat::BuiltIn(id),
        }
    }

    /// Integer format (0)
    pub fn integer() -> Self {
        NumberFormat::BuiltIn(Self::ID_NUMBER_INT)
    }

    /// Decimal format (0.00)
    pub fn decimal() -> Self {
        NumberFormat::BuiltIn(Self::ID_NUMBER_DEC2)
    }

    /// Number with thousands separator and decimals (#,##0.00)
    pub fn thousands_decimal() -> Self {
        NumberFormat::BuiltIn(Self::ID_NUMBER_SEP_DEC2)
    }

    /// Short date (mm-dd-yy)
    pub fn date_short() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATE_SHORT)
    }

    /// Date and time (m/d/yy h:mm)
    pub fn datetime() -> Self {
        NumberFormat::BuiltIn(Self::ID_DATETIME)
    }

    /// Get the format string
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => Self::builtin_format_string(*id),
            NumberFormat::Custom(s) => s,
        }
    }

    /// The `numFmtId` of a general or built-in format; custom codes get theirs in the style table
    pub fn builtin_id(&self) -> Option<u32> {
        match self {
            NumberFormat::General => Some(Self::ID_GENERAL),
            NumberFormat::BuiltIn(id) => Some(*id),
            NumberFormat::Custom(_) => None,
        }
    }

    /// Get built-in format string by ID
    fn builtin_format_string(id: u32) -> &'static str {
        match id {
            0 => "General",
            1 => "0",
            2 => "0.00",
            3 => "#,##0",
            4 => "#,##0.00",
            9 => "0%",
            10 => "0.00%",
            11 => "0.00E+00",
            12 => "# ?/?",
            13 => "# ??/??",
            14 => "mm-dd-yy",
            15 => "d-mmm-yy",
            16 => "d-mmm",
            17 => "mmm-yy",
            18 => "h:mm AM/PM",
            19 => "h:mm:ss AM/PM",
            20 => "h:mm",
            21 => "h:mm:ss",
            22 => "m/d/yy h:mm",
            37 => "#,##0 ;(#,##0)",
            38 => "#,##0 ;[Red](#,##0)",
            39 => "#,##0.00;(#,##0.00)",
            40 => "#,##0.00;[Red](#,##0.00)",
            49 => "@",
            _ => "General",
        }
    }

    /// Digits after the decimal point in the first section of the format code
    pub fn decimal_places(&self) -> usize {
        let code = self.format_string();
        let section = code.split(';').next().unwrap_or(code);
        match section.split_once('.') {
            Some((_, fraction)) => fraction
                .chars()
                .take_while(|c| matches!(c, '0' | '#'))
                .count(),
            None => 0,
        }
    }

    /// Check if this is a date/time format
    pub fn is_date_format(&self) -> bool {
        match self {
            NumberFormat::BuiltIn(id) => matches!(id, 14..=22),
            NumberFormat::Custom(s) => {
                let lower = s.to_lowercase();
                (lower.contains('y')
                    || lower.contains('m')
                    || lower.contains('d')
                    || lower.contains('h')
                    || lower.contains('s'))
                    && !lower.contains('"')
            }
            NumberFormat::General => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_places() {
        assert_eq!(NumberFormat::decimal().decimal_places(), 2);
        assert_eq!(NumberFormat::integer().decimal_places(), 0);
        assert_eq!(NumberFormat::General.decimal_places(), 0);
        assert_eq!(NumberFormat::thousands_decimal().decimal_places(), 2);
        assert_eq!(NumberFormat::from_string("0.000;[Red]-0.0").decimal_places(), 3);
        assert_eq!(NumberFormat::from_string("0.0#%").decimal_places(), 2);
    }

    #[test]
    fn test_from_id() {
        assert_eq!(NumberFormat::from_id(0), NumberFormat::General);
        assert_eq!(NumberFormat::from_id(2), NumberFormat::decimal());
        assert_eq!(NumberFormat::decimal().builtin_id(), Some(2));
        assert_eq!(NumberFormat::from_string("0.0").builtin_id(), None);
    }

    #[test]
    fn test_is_date_format() {
        assert!(NumberFormat::date_short().is_date_format());
        assert!(NumberFormat::from_string("yyyy-mm-dd").is_date_format());
        assert!(!NumberFormat::decimal().is_date_format());
    }
}
