//! Expression builders
//!
//! ```text
//! expr    := IDENT "=" expr | or
//! or      := and ("||" and)*
//! and     := eq ("&&" eq)*
//! eq      := cmp (("==" | "!=") cmp)*
//! cmp     := term (("<" | "<=" | ">" | ">=") term)*
//! term    := factor (("+" | "-") factor)*
//! factor  := unary (("*" | "/" | "%") unary)*
//! unary   := ("!" | "-") unary | call
//! call    := primary ("(" args? ")")*
//! primary := INT | FLOAT | STRING | "true" | "false" | IDENT | "(" expr ")"
//! ```

use crate::grammar::ast::{make_node, make_sequence, BinaryOp, Node, NodeKind, UnaryOp};
use crate::grammar::builders::{
    check, current_kind, error_node, expect, nested, unexpected, Parser,
};
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenKind, TokenValue};
use crate::utils::{Location, Spanned};

type Rule = fn(&mut dyn Parser) -> SyntaxResult<Node>;

const OR_OPERATORS: &[TokenKind] = &[TokenKind::OrOr];
const AND_OPERATORS: &[TokenKind] = &[TokenKind::AndAnd];
const EQUALITY_OPERATORS: &[TokenKind] = &[TokenKind::EqualEqual, TokenKind::BangEqual];
const COMPARISON_OPERATORS: &[TokenKind] = &[
    TokenKind::Less,
    TokenKind::LessEqual,
    TokenKind::Greater,
    TokenKind::GreaterEqual,
];
const TERM_OPERATORS: &[TokenKind] = &[TokenKind::Plus, TokenKind::Minus];
const FACTOR_OPERATORS: &[TokenKind] = &[TokenKind::Star, TokenKind::Slash, TokenKind::Percent];

/// Tokens that can begin an expression
pub fn can_start_expression(kind: TokenKind) -> bool {
    matches!(
        kind,
        TokenKind::Identifier
            | TokenKind::Integer
            | TokenKind::Float
            | TokenKind::Str
            | TokenKind::Boolean
            | TokenKind::LeftParen
            | TokenKind::Bang
            | TokenKind::Minus
    )
}

/// Parse expr. Assignment is right-associative.
pub fn parse_expression(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    nested(parser, "expression", parse_assignment)
}

/// An expression where one is mandatory, e.g. after `=` or `return`.
/// With recovery enabled a missing expression is reported and replaced by
/// a zero-width `Error` node right after `after`.
pub fn parse_required_expression(parser: &mut dyn Parser, after: Location) -> SyntaxResult<Node> {
    let kind = current_kind(parser)?;
    if can_start_expression(kind) || !parser.recovery_enabled() {
        return parse_expression(parser);
    }

    let error = unexpected(parser, "expression");
    parser.recover(error)?;
    Ok(error_node(Location::empty_after(after)))
}

fn parse_assignment(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    let target = parse_or(parser)?;
    if !check(parser, TokenKind::Assign)? {
        return Ok(target);
    }

    let target_location = target.location();
    let name = match target.into_kind() {
        NodeKind::Identifier { name } => Spanned::new(name, target_location),
        _ => {
            return Err(SyntaxError::InvalidAssignmentTarget {
                location: target_location,
            })
        }
    };

    let assign = parser.advance();
    let value = parse_required_expression(parser, assign.location)?;
    let location = target_location.merge(value.location());

    Ok(make_node(
        NodeKind::Assign {
            target: name,
            value: Box::new(value),
        },
        location,
    ))
}

fn parse_or(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    parse_binary_level(parser, OR_OPERATORS, parse_and)
}

fn parse_and(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    parse_binary_level(parser, AND_OPERATORS, parse_equality)
}

fn parse_equality(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    parse_binary_level(parser, EQUALITY_OPERATORS, parse_comparison)
}

fn parse_comparison(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    parse_binary_level(parser, COMPARISON_OPERATORS, parse_term)
}

fn parse_term(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    parse_binary_level(parser, TERM_OPERATORS, parse_factor)
}

fn parse_factor(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    parse_binary_level(parser, FACTOR_OPERATORS, parse_unary)
}

/// Left-associative chain of `operand (op operand)*`
fn parse_binary_level(
    parser: &mut dyn Parser,
    operators: &[TokenKind],
    operand: Rule,
) -> SyntaxResult<Node> {
    chain(parser, |parser, links| {
        let mut lhs = operand(parser)?;

        loop {
            let kind = current_kind(parser)?;
            let Some(op) = BinaryOp::from_token(kind).filter(|_| operators.contains(&kind)) else {
                return Ok(lhs);
            };
            parser.enter("binary")?;
            *links += 1;
            parser.advance();

            let rhs = operand(parser)?;
            let location = lhs.location().merge(rhs.location());
            lhs = make_node(
                NodeKind::Binary {
                    op,
                    lhs: Box::new(lhs),
                    rhs: Box::new(rhs),
                },
                location,
            );
        }
    })
}

/// Run a loop that builds a left-leaning tree. Each link the loop adds is
/// one level deeper than the last, so the loop enters the parser once per
/// link and every level is released when the chain ends.
fn chain<F>(parser: &mut dyn Parser, rule: F) -> SyntaxResult<Node>
where
    F: FnOnce(&mut dyn Parser, &mut usize) -> SyntaxResult<Node>,
{
    let mut links = 0;
    let result = rule(parser, &mut links);
    if result.is_err() {
        parser.mark_failure();
    }
    for _ in 0..links {
        parser.exit();
    }
    result
}

fn parse_unary(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    let kind = current_kind(parser)?;
    let Some(op) = UnaryOp::from_token(kind) else {
        return parse_call(parser);
    };

    let operator = parser.advance();
    let operand = nested(parser, "unary", parse_unary)?;
    let location = operator.location.merge(operand.location());

    Ok(make_node(
        NodeKind::Unary {
            op,
            operand: Box::new(operand),
        },
        location,
    ))
}

fn parse_call(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    chain(parser, |parser, links| {
        let mut callee = parse_primary(parser)?;

        while check(parser, TokenKind::LeftParen)? {
            parser.enter("call")?;
            *links += 1;
            let open = parser.advance();
            let args = parse_arguments(parser)?;
            let close = expect(parser, TokenKind::RightParen, "')'")?;

            let location = callee.location().merge(close.location);
            callee = make_node(
                NodeKind::Call {
                    callee: Box::new(callee),
                    args: make_sequence(args, Location::empty_after(open.location)),
                },
                location,
            );
        }

        Ok(callee)
    })
}

/// args := expr ("," expr)*, possibly empty
fn parse_arguments(parser: &mut dyn Parser) -> SyntaxResult<Vec<Node>> {
    let mut args = Vec::new();
    if check(parser, TokenKind::RightParen)? {
        return Ok(args);
    }

    loop {
        args.push(parse_expression(parser)?);
        if !check(parser, TokenKind::Comma)? {
            return Ok(args);
        }
        parser.advance();
    }
}

fn parse_primary(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    match current_kind(parser)? {
        TokenKind::Integer
        | TokenKind::Float
        | TokenKind::Str
        | TokenKind::Boolean
        | TokenKind::Identifier => {
            let token = parser.advance();
            Ok(atom_node(token))
        }
        TokenKind::LeftParen => {
            let open = parser.advance();
            let inner = parse_expression(parser)?;
            let close = expect(parser, TokenKind::RightParen, "')'")?;
            Ok(make_node(
                NodeKind::Group {
                    inner: Box::new(inner),
                },
                open.location.merge(close.location),
            ))
        }
        _ => Err(unexpected(parser, "expression")),
    }
}

/// Literal or identifier node from a single token
fn atom_node(token: Token) -> Node {
    let kind = match (token.kind, token.value) {
        (TokenKind::Identifier, _) => NodeKind::Identifier { name: token.lexeme },
        (_, TokenValue::Integer(value)) => NodeKind::Integer { value },
        (_, TokenValue::Float(value)) => NodeKind::Float { value },
        (_, TokenValue::Str(value)) => NodeKind::String { value },
        (_, TokenValue::Boolean(value)) => NodeKind::Boolean { value },
        (_, TokenValue::None) => NodeKind::Error,
    };
    make_node(kind, token.location)
}
