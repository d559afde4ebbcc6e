//! Parser for MADX source tokens.
//!
//! This module transforms a token stream from the [`lexer`](super::lexer) into
//! the statement tree defined in [`parser_types`](super::parser_types). The
//! public entry point is [`build_statements`].
//!
//! Trivia (whitespace and comments) may appear between any two tokens; every
//! primitive parser here skips it before matching.

use winnow::{
    Parser as _,
    combinator::{opt, preceded, repeat},
    error::{ContextError, ErrMode},
    stream::{Stream, TokenSlice},
    token::any,
};

use crate::{
    error::{Diagnostic, ErrorCode},
    parser_types as types,
    span::{Span, Spanned},
    tokens::{PositionedToken, Token},
};

/// Context type for parser errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Context {
    /// What the parser expected at the failure point
    Label(&'static str),
    /// Remaining token count (`eof_offset()`) where the failing construct began
    StartOffset(usize),
}

type Input<'src> = TokenSlice<'src, PositionedToken<'src>>;
type IResult<O> = std::result::Result<O, ErrMode<ContextError<Context>>>;

/// Run `f`, committing to its branch: any failure becomes a cut error that
/// remembers where the construct began.
fn cut_err<'src, O, F>(input: &mut Input<'src>, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    let start_remaining = input.eof_offset();
    cut_err_from(input, start_remaining, f)
}

/// Like [`cut_err`], for a construct that began `start_remaining` tokens
/// before the end of input, ahead of the current position.
fn cut_err_from<'src, O, F>(input: &mut Input<'src>, start_remaining: usize, f: F) -> IResult<O>
where
    F: FnOnce(&mut Input<'src>) -> IResult<O>,
{
    match f(input) {
        Ok(o) => Ok(o),
        Err(ErrMode::Backtrack(mut e)) | Err(ErrMode::Cut(mut e)) => {
            e.push(Context::StartOffset(start_remaining));
            Err(ErrMode::Cut(e))
        }
        Err(e) => Err(e),
    }
}

fn cut_error_with_label(input: &Input<'_>, label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    e.push(Context::StartOffset(input.eof_offset()));
    ErrMode::Cut(e)
}

fn backtrack_error_with_label(label: &'static str) -> ErrMode<ContextError<Context>> {
    let mut e = ContextError::new();
    e.push(Context::Label(label));
    ErrMode::Backtrack(e)
}

fn next_token<'src>(input: &mut Input<'src>) -> IResult<&'src PositionedToken<'src>> {
    any.parse_next(input)
}

/// Parse whitespace and comments
fn ws_comment<'src>(input: &mut Input<'src>) -> IResult<()> {
    any.verify(|token: &PositionedToken<'_>| token.is_trivia())
        .void()
        .parse_next(input)
}

/// Parse zero or more whitespace/comments
fn ws_comments0<'src>(input: &mut Input<'src>) -> IResult<()> {
    repeat(0.., ws_comment).parse_next(input)
}

/// Parse a specific token after optional trivia, returning its span.
fn expect<'src>(input: &mut Input<'src>, expected: Token<'static>, label: &'static str) -> IResult<Span> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| {
            (token.token == expected).then_some(token.span)
        }),
    )
    .context(Context::Label(label))
    .parse_next(input)
}

fn colon<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, Token::Colon, "`:`")
}

fn comma<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, Token::Comma, "`,`")
}

fn semicolon<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, Token::Semicolon, "`;`")
}

fn sequence_keyword<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, Token::Sequence, "`SEQUENCE`")
}

fn endsequence_keyword<'src>(input: &mut Input<'src>) -> IResult<Span> {
    expect(input, Token::EndSequence, "`ENDSEQUENCE`")
}

/// Parse an identifier with span preservation
fn raw_identifier<'src>(input: &mut Input<'src>) -> IResult<Spanned<&'src str>> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'src>| match &token.token {
            Token::Identifier(name) => Some(Spanned::new(*name, token.span)),
            _ => None,
        }),
    )
    .context(Context::Label("identifier"))
    .parse_next(input)
}

/// Parse `:=` or `=`
fn operator<'src>(input: &mut Input<'src>) -> IResult<types::Operator> {
    preceded(
        ws_comments0,
        any.verify_map(|token: &PositionedToken<'_>| match token.token {
            Token::ColonEquals => Some(types::Operator::Deferred),
            Token::Equals => Some(types::Operator::Immediate),
            _ => None,
        }),
    )
    .context(Context::Label("`=` or `:=`"))
    .parse_next(input)
}

/// Parse an attribute value: every token up to the next `,` or `;` outside
/// parentheses.
///
/// A lone number (optionally signed), word or string is recognised as such;
/// any other token run is an expression whose text is recovered from the
/// source through the value's span.
fn attribute_value<'src>(input: &mut Input<'src>) -> IResult<Spanned<types::AttributeValue<'src>>> {
    let mut depth = 0usize;
    let mut parts: Vec<&'src PositionedToken<'src>> = Vec::new();

    loop {
        let checkpoint = input.checkpoint();
        let Ok(token) = next_token(input) else {
            break;
        };

        let stop = match token.token {
            Token::Comma | Token::Semicolon => depth == 0,
            Token::LeftParen => {
                depth += 1;
                false
            }
            Token::RightParen if depth > 0 => {
                depth -= 1;
                false
            }
            Token::RightParen
            | Token::Colon
            | Token::ColonEquals
            | Token::Equals
            | Token::Sequence
            | Token::EndSequence => true,
            _ => false,
        };

        if stop {
            input.reset(&checkpoint);
            break;
        }
        if !token.is_trivia() {
            parts.push(token);
        }
    }

    let (Some(first), Some(last)) = (parts.first(), parts.last()) else {
        return Err(backtrack_error_with_label("attribute value"));
    };
    if depth != 0 {
        return Err(backtrack_error_with_label("`)`"));
    }

    let value = match parts.as_slice() {
        [single] => match &single.token {
            Token::FloatLiteral(n) => types::AttributeValue::Number(*n),
            Token::Identifier(word) => types::AttributeValue::Word(*word),
            Token::StringLiteral(text) => types::AttributeValue::String(*text),
            _ => types::AttributeValue::Expression,
        },
        [sign, number] => match (&sign.token, &number.token) {
            (Token::Minus, Token::FloatLiteral(n)) => types::AttributeValue::Number(-*n),
            (Token::Plus, Token::FloatLiteral(n)) => types::AttributeValue::Number(*n),
            _ => types::AttributeValue::Expression,
        },
        _ => types::AttributeValue::Expression,
    };

    Ok(Spanned::new(value, first.span.union(last.span)))
}

/// Parse a single `NAME (:=|=) VALUE`
fn attribute<'src>(input: &mut Input<'src>) -> IResult<types::Attribute<'src>> {
    let name = raw_identifier.parse_next(input)?;
    let operator = operator.parse_next(input)?;
    let value = attribute_value.parse_next(input)?;

    Ok(types::Attribute {
        name,
        operator,
        value,
    })
}

/// Parse `(, ATTRIBUTE)*`; an attribute must follow every comma.
fn attributes<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Attribute<'src>>> {
    repeat(
        0..,
        preceded(comma, |input: &mut Input<'src>| cut_err(input, attribute)),
    )
    .parse_next(input)
}

/// Parse the rest of a definition after `NAME :`
fn definition<'src>(
    input: &mut Input<'src>,
    name: Spanned<&'src str>,
) -> IResult<types::Definition<'src>> {
    let class = raw_identifier.parse_next(input)?;
    let attributes = attributes.parse_next(input)?;
    semicolon.parse_next(input)?;

    Ok(types::Definition {
        name,
        class,
        attributes,
    })
}

/// Parse a placement inside a sequence block
fn placement<'src>(input: &mut Input<'src>) -> IResult<types::Placement<'src>> {
    let start_remaining = input.eof_offset();
    let name = raw_identifier.parse_next(input)?;

    cut_err_from(input, start_remaining, |input| {
        let class = opt(preceded(colon, raw_identifier)).parse_next(input)?;
        let attributes = attributes.parse_next(input)?;
        semicolon.parse_next(input)?;

        Ok(types::Placement {
            name,
            class,
            attributes,
        })
    })
}

/// Parse the rest of a sequence block after `NAME : SEQUENCE`
fn sequence_block<'src>(
    input: &mut Input<'src>,
    name: Spanned<&'src str>,
) -> IResult<types::SequenceBlock<'src>> {
    let start = name.span();

    let attributes = attributes.parse_next(input)?;
    semicolon.parse_next(input)?;
    let placements: Vec<_> = repeat(0.., placement).parse_next(input)?;
    endsequence_keyword.parse_next(input)?;
    let end = semicolon.parse_next(input)?;

    Ok(types::SequenceBlock {
        name,
        attributes,
        placements,
        span: start.union(end),
    })
}

/// Skip the arguments of a command up to and including its `;`.
///
/// `SEQUENCE` may appear as an argument name (`USE, SEQUENCE = FODO;`).
fn command_arguments<'src>(input: &mut Input<'src>) -> IResult<()> {
    loop {
        let checkpoint = input.checkpoint();
        let token = next_token(input).map_err(|_| backtrack_error_with_label("`;`"))?;
        match token.token {
            Token::Semicolon => return Ok(()),
            Token::EndSequence => {
                input.reset(&checkpoint);
                return Err(backtrack_error_with_label("`;`"));
            }
            _ => {}
        }
    }
}

/// Parse one top-level statement
fn statement<'src>(input: &mut Input<'src>) -> IResult<types::Statement<'src>> {
    let start = input.eof_offset();
    let name = raw_identifier.parse_next(input)?;

    if opt(colon).parse_next(input)?.is_some() {
        if opt(sequence_keyword).parse_next(input)?.is_some() {
            return cut_err_from(input, start, |input| sequence_block(input, name))
                .map(types::Statement::Sequence);
        }
        return cut_err_from(input, start, |input| definition(input, name))
            .map(types::Statement::Definition);
    }

    if opt(operator).parse_next(input)?.is_some() {
        cut_err_from(input, start, |input| {
            attribute_value.parse_next(input)?;
            semicolon.parse_next(input)
        })?;
        return Ok(types::Statement::Assignment(name));
    }

    cut_err_from(input, start, command_arguments)?;
    Ok(types::Statement::Command(name))
}

fn statements<'src>(input: &mut Input<'src>) -> IResult<Vec<types::Statement<'src>>> {
    let statements: Vec<_> = repeat(0.., statement).parse_next(input)?;
    ws_comments0.parse_next(input)?;

    if input.eof_offset() > 0 {
        return Err(cut_error_with_label(input, "statement"));
    }
    Ok(statements)
}

fn meaningful_span(tokens: &[PositionedToken<'_>]) -> Option<Span> {
    let mut meaningful = tokens.iter().filter(|t| !t.is_trivia());
    let first = meaningful.next()?.span;
    let last = meaningful.last().map_or(first, |t| t.span);
    Some(first.union(last))
}

/// Convert a winnow error into a diagnostic pointing at the offending token.
fn convert_error(
    error: ErrMode<ContextError<Context>>,
    tokens: &[PositionedToken<'_>],
    current_remaining: usize,
) -> Diagnostic {
    let context = match error {
        ErrMode::Backtrack(e) | ErrMode::Cut(e) => e,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    let expected = context.context().find_map(|ctx| match ctx {
        Context::Label(label) => Some(*label),
        Context::StartOffset(_) => None,
    });
    let start_remaining = context.context().find_map(|ctx| match ctx {
        Context::StartOffset(n) => Some(*n),
        Context::Label(_) => None,
    });

    let end_offset = tokens.len().saturating_sub(current_remaining);
    let start_offset = start_remaining
        .map(|r| tokens.len().saturating_sub(r))
        .unwrap_or(end_offset)
        .min(end_offset);

    let help = match expected {
        Some(label) => format!("expected {label}"),
        None => "check the statement syntax".to_string(),
    };
    let statement_span = meaningful_span(&tokens[start_offset..end_offset]);

    match tokens[end_offset..].iter().find(|t| !t.is_trivia()) {
        Some(found) => {
            let mut diag = Diagnostic::error(format!("unexpected token `{}`", found.token))
                .with_code(ErrorCode::E100)
                .with_label(found.span, "unexpected token");
            if let Some(span) = statement_span {
                diag = diag.with_secondary_label(span, "while parsing this statement");
            }
            diag.with_help(help)
        }
        None => {
            let span = statement_span
                .or_else(|| meaningful_span(tokens))
                .unwrap_or_default();
            Diagnostic::error("incomplete input, more tokens expected")
                .with_code(ErrorCode::E101)
                .with_label(span, "incomplete")
                .with_help(help)
        }
    }
}

/// Build the statement list from tokens
pub fn build_statements<'src>(
    tokens: &'src [PositionedToken<'src>],
) -> Result<Vec<types::Statement<'src>>, Diagnostic> {
    let mut token_slice = TokenSlice::new(tokens);

    statements
        .parse_next(&mut token_slice)
        .map_err(|e| convert_error(e, tokens, token_slice.eof_offset()))
}
