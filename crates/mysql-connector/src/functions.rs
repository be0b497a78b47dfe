//! Catalogue of MySQL built-in function names.
//!
//! Useful when assembling statement text from parts: the enum guarantees the
//! name exists, [`SqlFunction::as_str`] gives the identifier and
//! [`SqlFunction::category`] the group it belongs to.

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Function groups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FunctionCategory {
    /// String functions
    String,
    /// Numeric functions
    Number,
    /// Date and time functions
    Date,
    /// Control flow, conversion and information functions
    Advanced,
}

impl fmt::Display for FunctionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String => write!(f, "string"),
            Self::Number => write!(f, "number"),
            Self::Date => write!(f, "date"),
            Self::Advanced => write!(f, "advanced"),
        }
    }
}

macro_rules! sql_functions {
    ($($category:ident => [$($(#[$meta:meta])* $variant:ident => $name:literal),+ $(,)?]),+ $(,)?) => {
        /// A MySQL built-in function
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        pub enum SqlFunction {
            $($($(#[$meta])* $variant,)+)+
        }

        impl SqlFunction {
            /// Every function, grouped by category
            pub const ALL: &'static [SqlFunction] = &[$($(SqlFunction::$variant,)+)+];

            /// SQL identifier, e.g. `CHAR_LENGTH`
            pub const fn as_str(self) -> &'static str {
                match self {
                    $($(Self::$variant => $name,)+)+
                }
            }

            /// Group this function belongs to
            pub const fn category(self) -> FunctionCategory {
                match self {
                    $($(Self::$variant => FunctionCategory::$category,)+)+
                }
            }
        }
    };
}

sql_functions! {
    String => [
        /// Returns the ASCII value for the specific character
        Ascii => "ASCII",
        /// Returns the length of a string (in characters)
        CharLength => "CHAR_LENGTH",
        /// Returns the length of a string (in characters)
        CharacterLength => "CHARACTER_LENGTH",
        /// Adds two or more expressions together
        Concat => "CONCAT",
        /// Adds two or more expressions together with a separator
        ConcatWs => "CONCAT_WS",
        /// Returns the index position of a value in a list of values
        Field => "FIELD",
        /// Returns the position of a string within a list of strings
        FindInSet => "FIND_IN_SET",
        /// Formats a number to a format like "#,###,###.##", rounded to a specified number of decimal places
        Format => "FORMAT",
        /// Inserts a string within a string at the specified position and for a certain number of characters
        Insert => "INSERT",
        /// Returns the position of the first occurrence of a string in another string
        Instr => "INSTR",
        /// Converts a string to lower-case
        Lcase => "LCASE",
        /// Extracts a number of characters from a string (starting from left)
        Left => "LEFT",
        /// Returns the length of a string (in bytes)
        Length => "LENGTH",
        /// Returns the position of the first occurrence of a substring in a string
        Locate => "LOCATE",
        /// Converts a string to lower-case
        Lower => "LOWER",
        /// Left-pads a string with another string, to a certain length
        Lpad => "LPAD",
        /// Removes leading spaces from a string
        Ltrim => "LTRIM",
        /// Extracts a substring from a string (starting at any position)
        Mid => "MID",
        /// Returns the position of the first occurrence of a substring in a string
        Position => "POSITION",
        /// Repeats a string as many times as specified
        Repeat => "REPEAT",
        /// Replaces all occurrences of a substring within a string, with a new substring
        Replace => "REPLACE",
        /// Reverses a string and returns the result
        Reverse => "REVERSE",
        /// Extracts a number of characters from a string (starting from right)
        Right => "RIGHT",
        /// Right-pads a string with another string, to a certain length
        Rpad => "RPAD",
        /// Removes trailing spaces from a string
        Rtrim => "RTRIM",
        /// Returns a string of the specified number of space characters
        Space => "SPACE",
        /// Compares two strings
        Strcmp => "STRCMP",
        /// Extracts a substring from a string (starting at any position)
        Substr => "SUBSTR",
        /// Extracts a substring from a string (starting at any position)
        Substring => "SUBSTRING",
        /// Returns a substring of a string before a specified number of delimiter occurs
        SubstringIndex => "SUBSTRING_INDEX",
        /// Removes leading and trailing spaces from a string
        Trim => "TRIM",
        /// Converts a string to upper-case
        Ucase => "UCASE",
        /// Converts a string to upper-case
        Upper => "UPPER",
    ],
    Number => [
        /// Returns the absolute value of a number
        Abs => "ABS",
        /// Returns the arc cosine of a number
        Acos => "ACOS",
        /// Returns the arc sine of a number
        Asin => "ASIN",
        /// Returns the arc tangent of one or two numbers
        Atan => "ATAN",
        /// Returns the arc tangent of two numbers
        Atan2 => "ATAN2",
        /// Returns the average value of an expression
        Avg => "AVG",
        /// Returns the smallest integer value that is >= to a number
        Ceil => "CEIL",
        /// Returns the smallest integer value that is >= to a number
        Ceiling => "CEILING",
        /// Returns the cosine of a number
        Cos => "COS",
        /// Returns the cotangent of a number
        Cot => "COT",
        /// Returns the number of records returned by a select query
        Count => "COUNT",
        /// Converts a value in radians to degrees
        Degrees => "DEGREES",
        /// Used for integer division
        Div => "DIV",
        /// Returns e raised to the power of a specified number
        Exp => "EXP",
        /// Returns the largest integer value that is <= to a number
        Floor => "FLOOR",
        /// Returns the greatest value of the list of arguments
        Greatest => "GREATEST",
        /// Returns the smallest value of the list of arguments
        Least => "LEAST",
        /// Returns the natural logarithm of a number
        Ln => "LN",
        /// Returns the natural logarithm of a number, or the logarithm of a number to a specified base
        Log => "LOG",
        /// Returns the natural logarithm of a number to base 10
        Log10 => "LOG10",
        /// Returns the natural logarithm of a number to base 2
        Log2 => "LOG2",
        /// Returns the maximum value in a set of values
        Max => "MAX",
        /// Returns the minimum value in a set of values
        Min => "MIN",
        /// Returns the remainder of a number divided by another number
        Mod => "MOD",
        /// Returns the value of PI
        Pi => "PI",
        /// Returns the value of a number raised to the power of another number
        Pow => "POW",
        /// Returns the value of a number raised to the power of another number
        Power => "POWER",
        /// Converts a degree value into radians
        Radians => "RADIANS",
        /// Returns a random number
        Rand => "RAND",
        /// Rounds a number to a specified number of decimal places
        Round => "ROUND",
        /// Returns the sign of a number
        Sign => "SIGN",
        /// Returns the sine of a number
        Sin => "SIN",
        /// Returns the square root of a number
        Sqrt => "SQRT",
        /// Calculates the sum of a set of values
        Sum => "SUM",
        /// Returns the tangent of a number
        Tan => "TAN",
        /// Truncates a number to the specified number of decimal places
        Truncate => "TRUNCATE",
    ],
    Date => [
        /// Adds a time/date interval to a date and then returns the date
        AddDate => "ADDDATE",
        /// Adds a time interval to a time/datetime and then returns the time/datetime
        AddTime => "ADDTIME",
        /// Returns the current date
        CurDate => "CURDATE",
        /// Returns the current date
        CurrentDate => "CURRENT_DATE",
        /// Returns the current time
        CurrentTime => "CURRENT_TIME",
        /// Returns the current date and time
        CurrentTimestamp => "CURRENT_TIMESTAMP",
        /// Returns the current time
        CurTime => "CURTIME",
        /// Extracts the date part from a datetime expression
        Date => "DATE",
        /// Returns the number of days between two date values
        DateDiff => "DATEDIFF",
        /// Adds a time/date interval to a date and then returns the date
        DateAdd => "DATE_ADD",
        /// Formats a date
        DateFormat => "DATE_FORMAT",
        /// Subtracts a time/date interval from a date and then returns the date
        DateSub => "DATE_SUB",
        /// Returns the day of the month for a given date
        Day => "DAY",
        /// Returns the weekday name for a given date
        DayName => "DAYNAME",
        /// Returns the day of the month for a given date
        DayOfMonth => "DAYOFMONTH",
        /// Returns the weekday index for a given date
        DayOfWeek => "DAYOFWEEK",
        /// Returns the day of the year for a given date
        DayOfYear => "DAYOFYEAR",
        /// Extracts a part from a given date
        Extract => "EXTRACT",
        /// Returns a date from a numeric datevalue
        FromDays => "FROM_DAYS",
        /// Returns the hour part for a given date
        Hour => "HOUR",
        /// Extracts the last day of the month for a given date
        LastDay => "LAST_DAY",
        /// Returns the current date and time
        LocalTime => "LOCALTIME",
        /// Returns the current date and time
        LocalTimestamp => "LOCALTIMESTAMP",
        /// Creates and returns a date based on a year and a number of days value
        MakeDate => "MAKEDATE",
        /// Creates and returns a time based on an hour, minute, and second value
        MakeTime => "MAKETIME",
        /// Returns the microsecond part of a time/datetime
        Microsecond => "MICROSECOND",
        /// Returns the minute part of a time/datetime
        Minute => "MINUTE",
        /// Returns the month part for a given date
        Month => "MONTH",
        /// Returns the name of the month for a given date
        MonthName => "MONTHNAME",
        /// Returns the current date and time
        Now => "NOW",
        /// Adds a specified number of months to a period
        PeriodAdd => "PERIOD_ADD",
        /// Returns the difference between two periods
        PeriodDiff => "PERIOD_DIFF",
        /// Returns the quarter of the year for a given date value
        Quarter => "QUARTER",
        /// Returns the seconds part of a time/datetime
        Second => "SECOND",
        /// Returns a time value based on the specified seconds
        SecToTime => "SEC_TO_TIME",
        /// Returns a date based on a string and a format
        StrToDate => "STR_TO_DATE",
        /// Subtracts a time/date interval from a date and then returns the date
        SubDate => "SUBDATE",
        /// Subtracts a time interval from a datetime and then returns the time/datetime
        SubTime => "SUBTIME",
        /// Returns the current date and time
        SysDate => "SYSDATE",
        /// Extracts the time part from a given time/datetime
        Time => "TIME",
        /// Formats a time by a specified format
        TimeFormat => "TIME_FORMAT",
        /// Converts a time value into seconds
        TimeToSec => "TIME_TO_SEC",
        /// Returns the difference between two time/datetime expressions
        TimeDiff => "TIMEDIFF",
        /// Returns a datetime value based on a date or datetime value
        Timestamp => "TIMESTAMP",
        /// Returns the number of days between a date and date "0000-00-00"
        ToDays => "TO_DAYS",
        /// Returns the week number for a given date
        Week => "WEEK",
        /// Returns the weekday number for a given date
        Weekday => "WEEKDAY",
        /// Returns the week number for a given date
        WeekOfYear => "WEEKOFYEAR",
        /// Returns the year part for a given date
        Year => "YEAR",
        /// Returns the year and week number for a given date
        YearWeek => "YEARWEEK",
    ],
    Advanced => [
        /// Returns a binary representation of a number
        Bin => "BIN",
        /// Converts a value to a binary string
        Binary => "BINARY",
        /// Goes through conditions and return a value when the first condition is met
        Case => "CASE",
        /// Converts a value (of any type) into a specified datatype
        Cast => "CAST",
        /// Returns the first non-null value in a list
        Coalesce => "COALESCE",
        /// Returns the unique connection ID for the current connection
        ConnectionId => "CONNECTION_ID",
        /// Converts a number from one numeric base system to another
        Conv => "CONV",
        /// Converts a value into the specified datatype or character set
        Convert => "CONVERT",
        /// Returns the username and host name for the MySQL account that the server used to authenticate the current client
        CurrentUser => "CURRENT_USER",
        /// Returns the name of the current database
        Database => "DATABASE",
        /// Returns a value if a condition is TRUE, or another value if a condition is FALSE
        If => "IF",
        /// Return a specified value if the expression is NULL, otherwise return the expression
        IfNull => "IFNULL",
        /// Returns 1 or 0 depending on whether an expression is NULL
        IsNull => "ISNULL",
        /// Returns the AUTO_INCREMENT id of the last row that has been inserted or updated in a table
        LastInsertId => "LAST_INSERT_ID",
        /// Compares two expressions and returns NULL if they are equal. Otherwise, the first expression is returned
        NullIf => "NULLIF",
        /// Returns the current MySQL username and host name
        SessionUser => "SESSION_USER",
        /// Returns the current MySQL username and host name
        SystemUser => "SYSTEM_USER",
        /// Returns the current MySQL username and host name
        User => "USER",
        /// Returns the current version of the MySQL database
        Version => "VERSION",
    ],
}

impl SqlFunction {
    /// Call expression with the given argument text, e.g. `UPPER(name)`
    pub fn call(self, args: &[&str]) -> String {
        format!("{}({})", self.as_str(), args.join(", "))
    }
}

/// Displays the name with underscores as spaces (`CHAR LENGTH`); use
/// [`SqlFunction::as_str`] for the identifier.
impl fmt::Display for SqlFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_str().replace('_', " "))
    }
}

impl FromStr for SqlFunction {
    type Err = Error;

    /// Accepts the identifier or the spaced form, in any case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_uppercase().replace(' ', "_");
        Self::ALL
            .iter()
            .copied()
            .find(|func| func.as_str() == normalized)
            .ok_or_else(|| Error::validation(format!("unknown SQL function '{}'", s)))
    }
}
