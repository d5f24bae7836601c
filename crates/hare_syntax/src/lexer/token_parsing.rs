use std::str::FromStr;

use hare_common::nom_helpers::{recognize_digits, recognize_hex_digits, recognize_identifier};
use hare_tokens::token::{FloatSuffix, FloatValue, IntegerSuffix, IntegerValue, Radix, TokenKind};
use nom::branch::alt;
use nom::bytes::complete::{is_not, tag, take_while_m_n};
use nom::character::complete::{char, hex_digit1, multispace0, none_of, one_of, satisfy};
use nom::combinator::{
    all_consuming, consumed, cut, eof, map, map_opt, map_res, opt, recognize, value, verify,
};
use nom::error::{context, ContextError, ErrorKind, FromExternalError, ParseError};
use nom::multi::fold_many0;
use nom::sequence::{delimited, pair, preceded, tuple};
use nom::IResult;

type Result<'a, O> = IResult<&'a str, O, TokenError<'a>>;

/// Why a token could not be produced
#[derive(Debug, Clone, PartialEq)]
pub struct TokenError<'a> {
    pub input: &'a str,
    pub reason: Reason<'a>,
}

impl<'a> TokenError<'a> {
    fn new(input: &'a str, reason: Reason<'a>) -> Self {
        Self { input, reason }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Reason<'a> {
    /// No production matched
    Unmatched,
    /// A delimited literal has no closing delimiter
    Unterminated(&'static str),
    /// A canonical escape was malformed. `literal` is the entire literal containing it.
    InvalidEscape { literal: &'a str },
    /// A rune literal did not hold exactly one character
    MalformedRune { literal: &'a str },
}

impl<'a> ParseError<&'a str> for TokenError<'a> {
    fn from_error_kind(input: &'a str, _kind: ErrorKind) -> Self {
        Self::new(input, Reason::Unmatched)
    }

    fn append(_input: &'a str, _kind: ErrorKind, other: Self) -> Self {
        other
    }

    fn or(self, other: Self) -> Self {
        if self.reason == Reason::Unmatched {
            other
        } else {
            self
        }
    }
}

impl<'a> ContextError<&'a str> for TokenError<'a> {}

impl<'a, E> FromExternalError<&'a str, E> for TokenError<'a> {
    fn from_external_error(input: &'a str, _kind: ErrorKind, _e: E) -> Self {
        Self::new(input, Reason::Unmatched)
    }
}

/// Parses a single token, returning the length of the whitespace before it, the length of the
/// token itself and its kind.
pub fn parse_token(src: &str) -> Result<'_, (usize, usize, TokenKind)> {
    let mut main_parser = context(
        "token",
        map(
            pair(consumed(multispace0), consumed(_parse_token)),
            |((l, _), (consumed, token))| (l.len(), consumed.len(), token),
        ),
    );
    (main_parser)(src)
}

/// Like [`parse_token`], but numbers are never floats. After a `.`, `0.1` is the two tuple
/// indices of `t.0.1`.
pub fn parse_token_after_dot(src: &str) -> Result<'_, (usize, usize, TokenKind)> {
    context(
        "token",
        map(
            pair(
                consumed(multispace0),
                consumed(alt((map(parse_integer, TokenKind::Integer), _parse_token))),
            ),
            |((l, _), (consumed, token))| (l.len(), consumed.len(), token),
        ),
    )(src)
}

/// Whitespace separating tokens
pub fn is_whitespace(c: char) -> bool {
    matches!(c, ' ' | '\t' | '\r' | '\n')
}

fn _parse_token(src: &str) -> Result<'_, TokenKind> {
    alt((
        parse_eof,
        parse_comment,
        parse_number,
        parse_word,
        parse_attribute,
        parse_text,
        parse_punctuation,
    ))(src)
}

fn parse_eof(src: &str) -> Result<'_, TokenKind> {
    context("eof", value(TokenKind::Eof, eof))(src)
}

fn parse_word(src: &str) -> Result<'_, TokenKind> {
    context(
        "word",
        map(recognize_identifier, |word: &str| {
            TokenKind::keyword(word).unwrap_or_else(|| TokenKind::Identifier(word.to_string()))
        }),
    )(src)
}

fn parse_attribute(src: &str) -> Result<'_, TokenKind> {
    context(
        "attribute",
        preceded(
            char('@'),
            map_opt(recognize_identifier, |word: &str| {
                Some(match word {
                    "symbol" => TokenKind::AtSymbol,
                    "fini" => TokenKind::AtFini,
                    "init" => TokenKind::AtInit,
                    "test" => TokenKind::AtTest,
                    "noreturn" => TokenKind::AtNoreturn,
                    "packed" => TokenKind::AtPacked,
                    "offset" => TokenKind::AtOffset,
                    _ => return None,
                })
            }),
        ),
    )(src)
}

fn parse_comment(src: &str) -> Result<'_, TokenKind> {
    context(
        "line comment",
        map(preceded(tag("//"), recognize_comment_body), |body: &str| {
            TokenKind::Comment(body.to_string())
        }),
    )(src)
}

/// Runs to the end of the line. A backslash escapes the character after it, so a backslash right
/// before a line break continues the comment.
fn recognize_comment_body(input: &str) -> Result<'_, &str> {
    let mut chars = input.char_indices().peekable();
    let mut end = input.len();
    while let Some((idx, c)) = chars.next() {
        match c {
            '\n' => {
                end = idx;
                break;
            }
            '\\' => match chars.next() {
                Some((_, '\r')) => {
                    if let Some((_, '\n')) = chars.peek() {
                        chars.next();
                    }
                }
                Some(_) => {}
                None => {
                    end = idx;
                    break;
                }
            },
            _ => {}
        }
    }
    Ok((&input[end..], &input[..end]))
}

fn parse_punctuation(src: &str) -> Result<'_, TokenKind> {
    context(
        "punctuation",
        alt((
            alt((
                value(TokenKind::Ellipsis, tag("...")),
                value(TokenKind::DotDot, tag("..")),
                value(TokenKind::Dot, char('.')),
                value(TokenKind::DoubleColon, tag("::")),
                value(TokenKind::Colon, char(':')),
                value(TokenKind::FatArrow, tag("=>")),
                value(TokenKind::Eq, tag("==")),
                value(TokenKind::Assign, char('=')),
                value(TokenKind::Neq, tag("!=")),
                value(TokenKind::Bang, char('!')),
                value(TokenKind::Tilde, char('~')),
                value(TokenKind::QMark, char('?')),
                value(TokenKind::Comma, char(',')),
                value(TokenKind::SemiColon, char(';')),
                value(TokenKind::LParen, char('(')),
                value(TokenKind::RParen, char(')')),
                value(TokenKind::LBracket, char('[')),
                value(TokenKind::RBracket, char(']')),
                value(TokenKind::LCurly, char('{')),
                value(TokenKind::RCurly, char('}')),
            )),
            alt((
                value(TokenKind::PlusAssign, tag("+=")),
                value(TokenKind::Plus, char('+')),
                value(TokenKind::MinusAssign, tag("-=")),
                value(TokenKind::Minus, char('-')),
                value(TokenKind::MultAssign, tag("*=")),
                value(TokenKind::Star, char('*')),
                value(TokenKind::DivAssign, tag("/=")),
                value(TokenKind::Div, char('/')),
                value(TokenKind::RemAssign, tag("%=")),
                value(TokenKind::Rem, char('%')),
            )),
            alt((
                value(TokenKind::AndAssign, tag("&&=")),
                value(TokenKind::And, tag("&&")),
                value(TokenKind::BitwiseAndAssign, tag("&=")),
                value(TokenKind::BitwiseAnd, char('&')),
                value(TokenKind::OrAssign, tag("||=")),
                value(TokenKind::Or, tag("||")),
                value(TokenKind::BitwiseOrAssign, tag("|=")),
                value(TokenKind::BitwiseOr, char('|')),
                value(TokenKind::XorAssign, tag("^^=")),
                value(TokenKind::Xor, tag("^^")),
                value(TokenKind::BitwiseXorAssign, tag("^=")),
                value(TokenKind::BitwiseXor, char('^')),
            )),
            alt((
                value(TokenKind::LShiftAssign, tag("<<=")),
                value(TokenKind::LShift, tag("<<")),
                value(TokenKind::Lte, tag("<=")),
                value(TokenKind::Lt, char('<')),
                value(TokenKind::RShiftAssign, tag(">>=")),
                value(TokenKind::RShift, tag(">>")),
                value(TokenKind::Gte, tag(">=")),
                value(TokenKind::Gt, char('>')),
            )),
        )),
    )(src)
}

fn parse_number(src: &str) -> Result<'_, TokenKind> {
    context(
        "number",
        alt((
            map(parse_float, TokenKind::Float),
            map(parse_integer, TokenKind::Integer),
        )),
    )(src)
}

fn exponent(input: &str) -> Result<'_, &str> {
    recognize(tuple((one_of("eE"), opt(one_of("+-")), recognize_digits(10))))(input)
}

fn float_suffix(input: &str) -> Result<'_, FloatSuffix> {
    alt((
        value(FloatSuffix::F32, tag("f32")),
        value(FloatSuffix::F64, tag("f64")),
    ))(input)
}

fn integer_suffix(input: &str) -> Result<'_, IntegerSuffix> {
    map_res(
        alt((
            tag("i8"),
            tag("i16"),
            tag("i32"),
            tag("i64"),
            tag("u8"),
            tag("u16"),
            tag("u32"),
            tag("u64"),
            tag("i"),
            tag("u"),
            tag("z"),
        )),
        IntegerSuffix::from_str,
    )(input)
}

/// `digits . digits exponent? suffix?`, or `digits exponent? suffix` where the suffix is required
fn parse_float(input: &str) -> Result<'_, FloatValue> {
    let dotted = pair(
        recognize(tuple((
            recognize_digits(10),
            char('.'),
            recognize_digits(10),
            opt(exponent),
        ))),
        opt(float_suffix),
    );
    let suffixed = pair(
        recognize(pair(recognize_digits(10), opt(exponent))),
        map(float_suffix, Some),
    );
    map_res(
        alt((dotted, suffixed)),
        |(text, suffix): (&str, Option<FloatSuffix>)| {
            f64::from_str(text).map(|value| FloatValue { value, suffix })
        },
    )(input)
}

fn parse_integer(input: &str) -> Result<'_, IntegerValue> {
    let prefixed = alt((
        map(preceded(tag("0x"), recognize_digits(16)), |digits| {
            (Radix::Hexadecimal, digits, None::<&str>)
        }),
        map(preceded(tag("0o"), recognize_digits(8)), |digits| {
            (Radix::Octal, digits, None)
        }),
        map(preceded(tag("0b"), recognize_digits(2)), |digits| {
            (Radix::Binary, digits, None)
        }),
    ));
    let decimal = map(
        pair(
            alt((
                tag("0"),
                recognize(pair(one_of("123456789"), opt(recognize_digits(10)))),
            )),
            opt(exponent),
        ),
        |(digits, exponent)| (Radix::Decimal, digits, exponent),
    );
    map(
        pair(alt((prefixed, decimal)), opt(integer_suffix)),
        |((radix, digits, exponent), suffix)| IntegerValue {
            value: integer_value(radix, digits, exponent),
            radix,
            suffix,
        },
    )(input)
}

/// `None` if the value does not fit in 64 bits or the exponent is negative
fn integer_value(radix: Radix, digits: &str, exponent: Option<&str>) -> Option<u64> {
    let mantissa = u64::from_str_radix(digits, radix.base()).ok()?;
    match exponent {
        None => Some(mantissa),
        Some(exponent) => {
            let power = exponent[1..].trim_start_matches('+').parse::<u32>().ok()?;
            10_u64
                .checked_pow(power)
                .and_then(|scale| mantissa.checked_mul(scale))
        }
    }
}

fn parse_text(src: &str) -> Result<'_, TokenKind> {
    context(
        "literal",
        alt((
            map(parse_string_value, TokenKind::String),
            map(parse_raw_string, TokenKind::RawString),
            map(parse_rune, TokenKind::Rune),
        )),
    )(src)
}

/// Finds the length of a literal delimited by `quote`, including both delimiters
fn scan_delimited(input: &str, quote: char, escapes: bool) -> Option<usize> {
    let mut chars = input.char_indices().skip(1);
    while let Some((idx, c)) = chars.next() {
        if c == quote {
            return Some(idx + c.len_utf8());
        }
        if escapes && c == '\\' {
            chars.next();
        }
    }
    None
}

fn delimited_literal<'a>(
    quote: char,
    what: &'static str,
) -> impl FnMut(&'a str) -> Result<'a, &'a str> {
    move |input: &'a str| {
        if !input.starts_with(quote) {
            return Err(nom::Err::Error(TokenError::new(input, Reason::Unmatched)));
        }
        match scan_delimited(input, quote, quote != '`') {
            Some(len) => Ok((&input[len..], &input[..len])),
            None => Err(nom::Err::Failure(TokenError::new(
                input,
                Reason::Unterminated(what),
            ))),
        }
    }
}

/// Finds the escape an error within a string literal's `content` belongs to, as a suffix of the
/// literal's `input`
fn escape_start<'a>(input: &'a str, content: &str, rest: &str) -> &'a str {
    let pos = content.len() - rest.len();
    let start = if rest.starts_with('\\') {
        pos
    } else {
        content[..pos].rfind('\\').unwrap_or(pos)
    };
    &input[1 + start..]
}

#[derive(Debug, Clone)]
enum StringFragment<'a> {
    Literal(&'a str),
    EscapedChar(char),
}

fn parse_literal_str(input: &str) -> Result<'_, &str> {
    let not_quoted = is_not("\"\\");
    verify(not_quoted, |s: &str| !s.is_empty())(input)
}

fn hex_escape<'a>(count: usize) -> impl FnMut(&'a str) -> Result<'a, char> {
    map_opt(recognize_hex_digits(count), |hex: &str| {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    })
}

/// `u{X...}` or `uXXXX`
fn parse_unicode(input: &str) -> Result<'_, char> {
    preceded(
        char('u'),
        cut(alt((
            map_opt(delimited(char('{'), hex_digit1, char('}')), |hex: &str| {
                u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
            }),
            hex_escape(4),
        ))),
    )(input)
}

fn parse_octal(input: &str) -> Result<'_, char> {
    map_opt(
        take_while_m_n(1, 3, |c: char| c.is_digit(8)),
        |digits: &str| u32::from_str_radix(digits, 8).ok().and_then(char::from_u32),
    )(input)
}

fn parse_escaped_char(input: &str) -> Result<'_, char> {
    preceded(
        char('\\'),
        alt((
            alt((
                value('\u{07}', char('a')),
                value('\u{08}', char('b')),
                value('\u{0C}', char('f')),
                value('\n', char('n')),
                value('\r', char('r')),
                value('\t', char('t')),
                value('\u{0B}', char('v')),
                value('\\', char('\\')),
                value('\'', char('\'')),
                value('"', char('"')),
                value('?', char('?')),
            )),
            parse_octal,
            preceded(char('x'), cut(hex_escape(2))),
            parse_unicode,
            preceded(char('U'), hex_escape(8)),
            // anything else passes through as itself
            satisfy(|c: char| c.is_ascii() && !"abfnrtvxu'\"\\?01234567".contains(c)),
        )),
    )(input)
}

fn parse_string_fragment(input: &str) -> Result<'_, StringFragment> {
    alt((
        map(parse_literal_str, StringFragment::Literal),
        map(parse_escaped_char, StringFragment::EscapedChar),
    ))(input)
}

fn parse_string_value(input: &str) -> Result<'_, String> {
    let (rest, literal) = delimited_literal('"', "string")(input)?;
    let content = &literal[1..literal.len() - 1];
    let build_string = fold_many0(
        parse_string_fragment,
        String::new,
        |mut accum, next| {
            match next {
                StringFragment::Literal(l) => accum.push_str(l),
                StringFragment::EscapedChar(c) => accum.push(c),
            }
            accum
        },
    );
    match all_consuming(build_string)(content) {
        Ok((_, value)) => Ok((rest, value)),
        Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(nom::Err::Failure(TokenError::new(
            escape_start(input, content, e.input),
            Reason::InvalidEscape { literal },
        ))),
        Err(nom::Err::Incomplete(needed)) => Err(nom::Err::Incomplete(needed)),
    }
}

fn parse_raw_string(input: &str) -> Result<'_, String> {
    map(delimited_literal('`', "raw string"), |literal: &str| {
        literal[1..literal.len() - 1].to_string()
    })(input)
}

fn parse_rune(input: &str) -> Result<'_, char> {
    let (rest, literal) = delimited_literal('\'', "rune")(input)?;
    let content = &literal[1..literal.len() - 1];
    match all_consuming(alt((parse_escaped_char, none_of("'\\"))))(content) {
        Ok((_, c)) => Ok((rest, c)),
        Err(nom::Err::Incomplete(needed)) => Err(nom::Err::Incomplete(needed)),
        Err(_) if content.starts_with('\\') && parse_escaped_char(content).is_err() => {
            Err(nom::Err::Failure(TokenError::new(
                &input[1..],
                Reason::InvalidEscape { literal },
            )))
        }
        Err(_) => Err(nom::Err::Failure(TokenError::new(
            input,
            Reason::MalformedRune { literal },
        ))),
    }
}
