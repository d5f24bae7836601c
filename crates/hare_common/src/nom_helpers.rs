//! nom helpers

use nom::branch::alt;
use nom::bytes::complete::{tag, take_while1, take_while_m_n};
use nom::character::complete::{alpha1, alphanumeric1};
use nom::combinator::recognize;
use nom::error::ParseError;
use nom::multi::many0_count;
use nom::sequence::pair;
use nom::IResult;

/// Recognizes `[a-zA-Z_][a-zA-Z0-9_]*`
pub fn recognize_identifier<'a, E: ParseError<&'a str>>(
    input: &'a str,
) -> IResult<&'a str, &'a str, E> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

/// Recognizes one or more digits valid in the given radix
pub fn recognize_digits<'a, E: ParseError<&'a str>>(
    radix: u32,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str, E> {
    move |input| take_while1(move |c: char| c.is_digit(radix))(input)
}

/// Recognizes exactly `count` hexadecimal digits
pub fn recognize_hex_digits<'a, E: ParseError<&'a str>>(
    count: usize,
) -> impl FnMut(&'a str) -> IResult<&'a str, &'a str, E> {
    move |input| take_while_m_n(count, count, |c: char| c.is_ascii_hexdigit())(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use nom::Finish;

    #[test]
    fn test_one_letter_variable() {
        let id = "i ";
        let (rest, parsed) = recognize_identifier::<nom::error::Error<_>>(id)
            .finish()
            .unwrap();
        assert_eq!(parsed, "i");
        assert_eq!(rest, " ");
    }

    #[test]
    fn test_identifier_stops_at_punctuation() {
        let (rest, parsed) = recognize_identifier::<nom::error::Error<_>>("_foo9::bar")
            .finish()
            .unwrap();
        assert_eq!(parsed, "_foo9");
        assert_eq!(rest, "::bar");
    }

    #[test]
    fn test_identifier_cannot_start_with_digit() {
        assert!(recognize_identifier::<nom::error::Error<_>>("9a").is_err());
    }

    #[test]
    fn test_digits_respect_radix() {
        let (rest, parsed) = recognize_digits::<nom::error::Error<_>>(8)("0178")
            .finish()
            .unwrap();
        assert_eq!(parsed, "017");
        assert_eq!(rest, "8");
        assert!(recognize_digits::<nom::error::Error<_>>(2)("2").is_err());
    }

    #[test]
    fn test_exact_hex_digits() {
        let (rest, parsed) = recognize_hex_digits::<nom::error::Error<_>>(2)("7fz")
            .finish()
            .unwrap();
        assert_eq!(parsed, "7f");
        assert_eq!(rest, "z");
        assert!(recognize_hex_digits::<nom::error::Error<_>>(4)("12").is_err());
    }
}
