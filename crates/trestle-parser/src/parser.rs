//! Line parser for Trestle source text.
//!
//! The source is read one line at a time. Each line is a comment, a
//! directive, a chain of nodes joined by associations, or blank. Lines that
//! fail to parse produce a [`Diagnostic`] and parsing resumes on the next
//! line, so one pass reports every syntax error in the document.

use winnow::{
    Parser as _,
    combinator::{alt, cut_err, eof, opt, peek, preceded, repeat, terminated},
    error::{ContextError, ErrMode, ModalResult},
    stream::{LocatingSlice, Location, Stream},
    token::{literal, take_while},
};

use crate::{
    diagram::{LineStyle, Marker},
    error::{Diagnostic, DiagnosticCollector, ErrorCode},
    span::{Span, Spanned},
};

/// Diagnostic details attached to winnow errors via `.context()`.
///
/// The error span runs from `start` to the position where parsing failed.
#[derive(Debug, Clone, PartialEq, Eq)]
struct ParserDiagnostic {
    code: ErrorCode,
    message: &'static str,
    label: &'static str,
    help: Option<&'static str>,
    start: usize,
}

type Input<'a> = LocatingSlice<&'a str>;
type IResult<O> = ModalResult<O, ContextError<ParserDiagnostic>>;

/// Markers and stroke of one association token, in source order.
pub(crate) type Association = (Marker, LineStyle, Marker);

/// The bracketed text of a node, before it is split into compartments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct RawNode<'a> {
    /// Text between `[` and `]`.
    pub body: &'a str,
    /// Span including both brackets.
    pub span: Span,
}

/// One meaningful line of source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Statement<'a> {
    Directive {
        key: Spanned<&'a str>,
        value: Spanned<&'a str>,
    },
    Chain {
        head: RawNode<'a>,
        links: Vec<(Spanned<Association>, RawNode<'a>)>,
    },
}

/// Spaces, tabs and carriage returns.
fn inline_space(input: &mut Input<'_>) -> IResult<()> {
    take_while(0.., [' ', '\t', '\r']).void().parse_next(input)
}

/// A newline or the end of input.
fn line_end(input: &mut Input<'_>) -> IResult<()> {
    alt(('\n'.void(), eof.void())).parse_next(input)
}

/// `// ...` up to the end of the line
fn comment(input: &mut Input<'_>) -> IResult<()> {
    preceded("//", take_while(0.., |c: char| c != '\n'))
        .void()
        .parse_next(input)
}

fn directive_name<'a>(input: &mut Input<'a>) -> IResult<(&'a str, std::ops::Range<usize>)> {
    take_while(1.., |c: char| c.is_ascii_alphanumeric() || c == '_')
        .with_span()
        .parse_next(input)
}

fn directive_separator(input: &mut Input<'_>) -> IResult<()> {
    (inline_space, ':', inline_space).void().parse_next(input)
}

fn rest_of_line<'a>(input: &mut Input<'a>) -> IResult<(&'a str, std::ops::Range<usize>)> {
    take_while(0.., |c: char| c != '\n')
        .with_span()
        .parse_next(input)
}

/// Parse a directive: `#name: value`
///
/// Trailing whitespace is not part of the value.
fn directive<'a>(input: &mut Input<'a>) -> IResult<Statement<'a>> {
    let start = input.current_token_start();
    let malformed = ParserDiagnostic {
        code: ErrorCode::E103,
        message: "malformed directive",
        label: "expected `#name: value`",
        help: Some("write directives as `#direction: right`"),
        start,
    };

    let (key, key_range) = preceded('#', cut_err(directive_name).context(malformed.clone()))
        .parse_next(input)?;
    cut_err(directive_separator)
        .context(malformed)
        .parse_next(input)?;
    let (raw_value, value_range) = rest_of_line(input)?;

    let value = raw_value.trim_end();
    let value_span = Span::new(value_range.start..value_range.start + value.len());

    Ok(Statement::Directive {
        key: Spanned::new(key, Span::new(key_range)),
        value: Spanned::new(value, value_span),
    })
}

fn node_body<'a>(input: &mut Input<'a>) -> IResult<&'a str> {
    take_while(0.., |c: char| !matches!(c, '[' | ']' | '\n')).parse_next(input)
}

/// Parse a node: `[` body `]`, all on one line.
fn node<'a>(input: &mut Input<'a>) -> IResult<RawNode<'a>> {
    let start = input.current_token_start();

    let body = preceded(
        '[',
        cut_err(terminated(node_body, ']')).context(ParserDiagnostic {
            code: ErrorCode::E101,
            message: "unterminated node",
            label: "missing `]`",
            help: Some("close the node with `]` on the same line"),
            start,
        }),
    )
    .parse_next(input)?;

    let end = input.current_token_start();
    Ok(RawNode {
        body,
        span: Span::new(start..end),
    })
}

fn start_marker(input: &mut Input<'_>) -> IResult<Marker> {
    opt(alt((
        literal("<:").value(Marker::Triangle),
        literal("<").value(Marker::Arrow),
    )))
    .map(Option::unwrap_or_default)
    .parse_next(input)
}

fn line_style(input: &mut Input<'_>) -> IResult<LineStyle> {
    alt((
        literal("--").value(LineStyle::Dashed),
        literal("-").value(LineStyle::Solid),
    ))
    .parse_next(input)
}

fn end_marker(input: &mut Input<'_>) -> IResult<Marker> {
    opt(alt((
        literal(":>").value(Marker::Triangle),
        literal(">").value(Marker::Arrow),
    )))
    .map(Option::unwrap_or_default)
    .parse_next(input)
}

/// Parse an association such as `->`, `<-`, `--` or `-:>`.
fn association(input: &mut Input<'_>) -> IResult<Spanned<Association>> {
    (start_marker, line_style, end_marker)
        .with_span()
        .map(|(association, range)| Spanned::new(association, Span::new(range)))
        .parse_next(input)
}

/// An association followed by the node it points at.
fn link<'a>(input: &mut Input<'a>) -> IResult<(Spanned<Association>, RawNode<'a>)> {
    let association = preceded(inline_space, association).parse_next(input)?;

    let target = preceded(inline_space, cut_err(node))
        .context(ParserDiagnostic {
            code: ErrorCode::E102,
            message: "association is not followed by a node",
            label: "expected `[` after this association",
            help: Some("connect two nodes, e.g. `[Alice]->[Bob]`"),
            start: association.span().start(),
        })
        .parse_next(input)?;

    Ok((association, target))
}

/// Parse a chain: `[a] -> [b] - [c]`
fn chain<'a>(input: &mut Input<'a>) -> IResult<Statement<'a>> {
    let head = node(input)?;
    let links = repeat(0.., link).parse_next(input)?;
    Ok(Statement::Chain { head, links })
}

/// Parse one line, including its terminating newline.
///
/// Returns `None` for blank and comment lines.
fn statement<'a>(input: &mut Input<'a>) -> IResult<Option<Statement<'a>>> {
    inline_space(input)?;

    let statement = alt((
        comment.map(|()| None),
        directive.map(Some),
        chain.map(Some),
        peek(line_end).map(|()| None),
    ))
    .parse_next(input)?;

    inline_space(input)?;
    let start = input.current_token_start();
    cut_err(line_end)
        .context(ParserDiagnostic {
            code: ErrorCode::E100,
            message: "unexpected input after statement",
            label: "expected an association or the end of the line",
            help: Some("put each chain on its own line"),
            start,
        })
        .parse_next(input)?;

    Ok(statement)
}

/// Skip past the next newline, or to the end of input.
fn skip_line(input: &mut Input<'_>) {
    while let Some(c) = input.next_token() {
        if c == '\n' {
            break;
        }
    }
}

/// Byte offset of the end of the line containing `pos`.
fn end_of_line(source: &str, pos: usize) -> usize {
    source
        .get(pos..)
        .and_then(|rest| rest.find('\n'))
        .map_or(source.len(), |offset| pos + offset)
}

/// Convert a winnow error into a [`Diagnostic`].
///
/// Uses the first [`ParserDiagnostic`] context when present. Errors without
/// context mean no statement form matched; they are reported as E100 over
/// the rest of the line.
fn convert_err_mode(
    err: ErrMode<ContextError<ParserDiagnostic>>,
    error_pos: usize,
    source: &str,
) -> Diagnostic {
    let context_error = match err {
        ErrMode::Backtrack(ctx) | ErrMode::Cut(ctx) => ctx,
        ErrMode::Incomplete(_) => ContextError::new(),
    };

    if let Some(ParserDiagnostic {
        code,
        message,
        label,
        help,
        start,
    }) = context_error.context().next()
    {
        let end = if error_pos > *start {
            error_pos
        } else {
            end_of_line(source, *start)
        };

        let mut diag = Diagnostic::error(*message)
            .with_code(*code)
            .with_label(Span::new(*start..end), *label);
        if let Some(help) = help {
            diag = diag.with_help(*help);
        }
        return diag;
    }

    let span = Span::new(error_pos..end_of_line(source, error_pos));
    Diagnostic::error("unexpected input")
        .with_code(ErrorCode::E100)
        .with_label(span, "expected a node, a `#` directive or a `//` comment")
        .with_help("start each line with `[`, `#` or `//`")
}

/// Split `source` into statements.
///
/// Lines that fail to parse are reported to `diagnostics` and skipped.
pub(crate) fn statements<'a>(
    source: &'a str,
    diagnostics: &mut DiagnosticCollector,
) -> Vec<Statement<'a>> {
    let mut input = LocatingSlice::new(source);
    let mut statements = Vec::new();

    while !input.is_empty() {
        match statement(&mut input) {
            Ok(Some(statement)) => statements.push(statement),
            Ok(None) => {}
            Err(err) => {
                let error_pos = input.current_token_start();
                diagnostics.emit(convert_err_mode(err, error_pos, source));
                skip_line(&mut input);
            }
        }
    }

    statements
}
