//! Lexical analyzer for MADX sequence files.
//!
//! The lexer converts source text into a stream of [`Token`]s for parsing.
//! It handles whitespace, the three comment styles (`//`, `!` and `/* */`),
//! quoted strings, numeric literals and all operator tokens defined in the
//! [`tokens`](super::tokens) module.
//!
//! The public entry point is [`tokenize`], which performs error-recovering
//! lexical analysis and collects all diagnostics in a single pass.

use winnow::{
    Parser as _,
    ascii::{Caseless, digit0, digit1},
    combinator::{alt, cut_err, not, opt, peek, preceded, terminated},
    error::{AddContext, ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, one_of, take_until, take_while},
};

use crate::{
    error::{Diagnostic, DiagnosticCollector, ErrorCode, ParseError},
    span::Span,
    tokens::{PositionedToken, Token},
};

/// Rich diagnostic information for lexer errors.
///
/// Attached to winnow errors via `.context()` to provide detailed error
/// messages with codes, help text, and precise span information.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LexerDiagnostic {
    pub code: ErrorCode,
    pub message: &'static str,
    pub help: Option<&'static str>,
    /// The error span covers from `start` to the error position.
    pub start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<'a, O> = ModalResult<O, ContextError<LexerDiagnostic>>;

fn is_identifier_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_' || c == '.'
}

/// Parse a quoted string. MADX strings have no escape sequences.
fn string_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let unterminated = LexerDiagnostic {
        code: ErrorCode::E001,
        message: "unterminated string literal",
        help: Some("close the string with the quote it was opened with"),
        start: input.current_token_start(),
    };

    alt((
        preceded(
            '"',
            cut_err(terminated(
                take_while(0.., |c: char| c != '"' && c != '\n'),
                '"',
            ))
            .context(unterminated.clone()),
        ),
        preceded(
            '\'',
            cut_err(terminated(
                take_while(0.., |c: char| c != '\'' && c != '\n'),
                '\'',
            ))
            .context(unterminated),
        ),
    ))
    .map(Token::StringLiteral)
    .parse_next(input)
}

/// Mantissa and optional exponent of a numeric literal.
fn number_text<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    (
        alt((
            (digit1, opt(('.', digit0))).void(),
            ('.', digit1).void(),
        )),
        opt((one_of(['e', 'E']), opt(one_of(['+', '-'])), digit1)),
    )
        .take()
        .parse_next(input)
}

fn identifier_tail<'a>(input: &mut Input<'a>) -> IResult<'a, &'a str> {
    take_while(0.., is_identifier_char).parse_next(input)
}

/// Parse a numeric literal: `1`, `2.`, `0.5`, `.25`, `1.5e-3`.
///
/// Identifier characters glued to the literal (`1.2.3`, `2e`, `3abc`) make
/// the whole word an invalid literal rather than a number followed by a name.
fn float_literal<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();

    let text = number_text.parse_next(input)?;
    let trailing = identifier_tail.parse_next(input)?;

    match text.parse::<f64>() {
        Ok(value) if trailing.is_empty() => Ok(Token::FloatLiteral(value)),
        _ => Err(ErrMode::Cut(ContextError::new().add_context(
            input,
            &input.checkpoint(),
            LexerDiagnostic {
                code: ErrorCode::E003,
                message: "invalid numeric literal",
                help: Some("numbers look like `1`, `0.5`, `.25` or `1.5e-3`"),
                start,
            },
        ))),
    }
}

/// Parse line comment starting with `//` or `!`
fn line_comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    preceded(alt(("//", "!")), take_while(0.., |c| c != '\n'))
        .map(Token::LineComment)
        .parse_next(input)
}

/// Parse a `/* ... */` comment
fn block_comment<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    let start = input.current_token_start();

    preceded(
        "/*",
        cut_err(terminated(take_until(0.., "*/"), "*/")).context(LexerDiagnostic {
            code: ErrorCode::E004,
            message: "unterminated block comment",
            help: Some("close the comment with `*/`"),
            start,
        }),
    )
    .map(Token::BlockComment)
    .parse_next(input)
}

/// Parse keywords with word boundary checking. Keywords are case-insensitive.
fn keyword<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    terminated(
        alt((
            literal(Caseless("endsequence")).value(Token::EndSequence),
            literal(Caseless("sequence")).value(Token::Sequence),
        )),
        peek(not(one_of(is_identifier_char))),
    )
    .parse_next(input)
}

/// Parse identifiers such as `QF`, `mb_1` or `bpm.3l1`
fn identifier<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    (
        one_of(|c: char| c.is_ascii_alphabetic() || c == '_'),
        take_while(0.., is_identifier_char),
    )
        .take()
        .map(Token::Identifier)
        .parse_next(input)
}

fn multi_char_operator<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    literal(":=").value(Token::ColonEquals).parse_next(input)
}

/// Parse single character tokens
fn single_char_token<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    alt((
        ':'.value(Token::Colon),
        '='.value(Token::Equals),
        '+'.value(Token::Plus),
        '-'.value(Token::Minus),
        '*'.value(Token::Star),
        '/'.value(Token::Slash),
        '^'.value(Token::Caret),
        '('.value(Token::LeftParen),
        ')'.value(Token::RightParen),
        ';'.value(Token::Semicolon),
        ','.value(Token::Comma),
    ))
    .parse_next(input)
}

/// Parse whitespace (spaces, tabs, carriage returns but not newlines)
fn whitespace<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    take_while(1.., |c: char| c.is_whitespace() && c != '\n')
        .value(Token::Whitespace)
        .parse_next(input)
}

fn newline<'a>(input: &mut Input<'a>) -> IResult<'a, Token<'a>> {
    '\n'.value(Token::Newline).parse_next(input)
}

/// Parse a single token with position tracking
fn positioned_token<'a>(input: &mut Input<'a>) -> IResult<'a, PositionedToken<'a>> {
    let start_pos = input.current_token_start();

    let token = alt((
        line_comment,        // Must come before `/` and `!`
        block_comment,       // Must come before `/`
        string_literal,      // Must come before any single char
        multi_char_operator, // Must come before `:`
        keyword,             // Must come before identifier
        float_literal,       // Must come before identifier
        identifier,          // Must come before single chars
        single_char_token,   // Single character tokens
        newline,             // Must come before whitespace
        whitespace,          // General whitespace
    ))
    .parse_next(input)?;

    let end_pos = input.current_token_start();
    let span = Span::new(start_pos..end_pos);

    Ok(PositionedToken::new(token, span))
}

/// Lexer that accumulates tokens and diagnostics during tokenization.
struct Lexer<'a> {
    tokens: Vec<PositionedToken<'a>>,
    diagnostics: DiagnosticCollector,
}

impl<'a> Lexer<'a> {
    fn new() -> Self {
        Self {
            tokens: Vec::new(),
            diagnostics: DiagnosticCollector::new(),
        }
    }

    /// Tokenize the input, collecting tokens and errors.
    fn tokenize(&mut self, mut input: Input<'a>) {
        while !input.is_empty() {
            let token_start = input.current_token_start();
            match positioned_token(&mut input) {
                Ok(token) => {
                    self.tokens.push(token);
                }
                Err(e) => {
                    let error_pos = input.current_token_start();

                    let diagnostic = Self::convert_err_mode(e, error_pos);
                    self.diagnostics.emit(diagnostic);

                    // Resume after the offending text; skip one character
                    // when nothing was consumed.
                    if error_pos == token_start && !input.is_empty() {
                        input.next_token();
                    }
                }
            }
        }
    }

    /// Finish lexing and return tokens or collected errors.
    fn finish(self) -> Result<Vec<PositionedToken<'a>>, ParseError> {
        self.diagnostics.finish().map(|()| self.tokens)
    }

    /// Convert an ErrMode and error position to a Diagnostic.
    ///
    /// Extracts `LexerDiagnostic` from the error context for rich error info
    /// with code, message, and help. Falls back to E002 (unexpected character)
    /// if no diagnostic context is found.
    fn convert_err_mode(
        err: ErrMode<ContextError<LexerDiagnostic>>,
        error_pos: usize,
    ) -> Diagnostic {
        let context_error = match err {
            ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
            ErrMode::Incomplete(_) => ContextError::new(),
        };

        if let Some(LexerDiagnostic {
            code,
            message,
            help,
            start,
        }) = context_error.context().next()
        {
            let span = Span::new(*start..error_pos);

            let mut diag = Diagnostic::error(*message)
                .with_code(*code)
                .with_label(span, code.description());
            if let Some(h) = help {
                diag = diag.with_help(*h);
            }
            return diag;
        }

        let span = Span::new(error_pos..error_pos.saturating_add(1));
        Diagnostic::error("unexpected character")
            .with_code(ErrorCode::E002)
            .with_label(span, ErrorCode::E002.description())
    }
}

/// Parse tokens from a string input, collecting multiple errors.
///
/// # Returns
///
/// - `Ok(tokens)` - All tokens successfully parsed
/// - `Err(ParseError)` - One or more errors occurred; contains all diagnostics
pub fn tokenize(input: &str) -> Result<Vec<PositionedToken<'_>>, ParseError> {
    let located_input = LocatingSlice::new(input);
    let mut lexer = Lexer::new();
    lexer.tokenize(located_input);
    lexer.finish()
}


#[cfg(test)]
mod proptest_tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_identifier_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z][A-Za-z0-9_.]{0,20}".prop_filter("avoid keywords", |s| {
            !s.eq_ignore_ascii_case("sequence") && !s.eq_ignore_ascii_case("endsequence")
        })
    }

    fn float_literal_strategy() -> impl Strategy<Value = (String, f64)> {
        (0u32..10000, 0u32..10000).prop_map(|(integer, fraction)| {
            let text = format!("{integer}.{fraction}");
            let value = text.parse::<f64>().unwrap();
            (text, value)
        })
    }

    proptest! {
        #[test]
        fn valid_identifiers_tokenize(id in valid_identifier_strategy()) {
            let source = format!("{id}: MARKER;");
            let tokens = tokenize(&source);
            prop_assert!(tokens.is_ok(), "failed to tokenize `{id}`");
            let tokens = tokens.unwrap();
            prop_assert_eq!(&tokens[0].token, &Token::Identifier(&id));
        }

        #[test]
        fn float_literals_parse((text, value) in float_literal_strategy()) {
            let source = format!("L={text};");
            let tokens = tokenize(&source).unwrap();
            prop_assert_eq!(&tokens[2].token, &Token::FloatLiteral(value));
        }
    }
}
