//! Library of parser functions for unit strings
//!
//! Unit strings are an optional magnitude followed by a unit symbol, e.g.
//! `"m"`, `"2.5 mm"`, or `"1e-3m"`. Surrounding whitespace is ignored.

// nom parser combinators
use nom::character::complete::{char, digit0, digit1, one_of, satisfy, space0};
use nom::combinator::{all_consuming, map_res, opt, recognize};
use nom::multi::many1_count;
use nom::sequence::{delimited, pair, terminated, tuple};
use nom::{branch::alt, IResult};

/// Decimal or scientific number, e.g. `2`, `-0.5`, `.5`, `1e-3`
///
/// Deliberately stricter than nom's `double`, which would happily read the
/// `nan` at the start of `nanometre` as a number.
pub fn magnitude(i: &str) -> IResult<&str, f64> {
    map_res(
        recognize(tuple((
            opt(one_of("+-")),
            alt((
                recognize(pair(digit1, opt(pair(char('.'), digit0)))),
                recognize(pair(char('.'), digit1)),
            )),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |s: &str| s.parse::<f64>(),
    )(i)
}

/// Alphabetic unit symbol, including `µ` and `Å`
pub fn symbol(i: &str) -> IResult<&str, &str> {
    recognize(many1_count(satisfy(char::is_alphabetic)))(i)
}

/// Complete unit string as `(magnitude, symbol)`
pub fn units(i: &str) -> IResult<&str, (Option<f64>, &str)> {
    all_consuming(delimited(
        space0,
        pair(opt(terminated(magnitude, space0)), symbol),
        space0,
    ))(i)
}

#[cfg(test)]
mod parser_tests {
    use super::*;

    #[test]
    fn magnitude_formats() {
        assert_eq!(magnitude("2"), Ok(("", 2.0)));
        assert_eq!(magnitude("-0.5m"), Ok(("m", -0.5)));
        assert_eq!(magnitude(".5"), Ok(("", 0.5)));
        assert_eq!(magnitude("1e-3m"), Ok(("m", 1e-3)));
        assert!(magnitude("nanometre").is_err());
        assert!(magnitude("m").is_err());
    }

    #[test]
    fn symbol_formats() {
        assert_eq!(symbol("mm"), Ok(("", "mm")));
        assert_eq!(symbol("µm"), Ok(("", "µm")));
        assert_eq!(symbol("Å"), Ok(("", "Å")));
        assert_eq!(symbol("m2"), Ok(("2", "m")));
        assert!(symbol("2m").is_err());
    }

    #[test]
    fn full_units() {
        assert_eq!(units("m"), Ok(("", (None, "m"))));
        assert_eq!(units(" 2.5 mm "), Ok(("", (Some(2.5), "mm"))));
        assert_eq!(units("1e-3m"), Ok(("", (Some(1e-3), "m"))));
        assert_eq!(units("nanometre"), Ok(("", (None, "nanometre"))));
        assert!(units("m m").is_err());
        assert!(units("").is_err());
        assert!(units("12").is_err());
    }
}
