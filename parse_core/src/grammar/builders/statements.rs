//! Statement and block builders
//!
//! ```text
//! program := stmt* EOF
//! stmt    := "let" IDENT ("=" expr)? ";"
//!          | "fn" IDENT "(" params? ")" block
//!          | "if" expr block ("else" (if | block))?
//!          | "while" expr block
//!          | "return" expr? ";"
//!          | block
//!          | expr ";"
//! block   := "{" stmt* "}"
//! params  := IDENT ("," IDENT)*
//! ```

use crate::grammar::ast::{make_node, make_sequence, Node, NodeKind};
use crate::grammar::builders::expressions::{parse_expression, parse_required_expression};
use crate::grammar::builders::{
    check, current_kind, error_node, expect, expect_terminator, insertion_point, nested,
    Parser,
};
use crate::grammar::keywords::Keyword;
use crate::syntax::error::{SyntaxError, SyntaxResult};
use crate::tokens::TokenKind;
use crate::utils::{Location, Position, Spanned};

/// Parse a whole program. The root spans from the start of input to the
/// end-of-input position, so leading and trailing trivia are inside it.
pub fn parse_program(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    nested(parser, "program", |parser| {
        let statements = parse_statement_list(parser, false)?;
        let end = parser.peek().location;

        let location = Location::new(Position::start(), end.end);
        let body = make_sequence(statements, Location::at(Position::start()));
        Ok(make_node(NodeKind::Program { body }, location))
    })
}

/// Statements up to end of input, or up to a `}` when `in_block`.
///
/// A failing statement is recovered from here: the error is recorded, the
/// input is skipped to the next statement boundary and an `Error` node
/// covering the consumed tokens takes the statement's place.
pub fn parse_statement_list(parser: &mut dyn Parser, in_block: bool) -> SyntaxResult<Vec<Node>> {
    let mut statements = Vec::new();

    loop {
        match current_kind(parser)? {
            TokenKind::EndOfInput => return Ok(statements),
            TokenKind::RightBrace if in_block => return Ok(statements),
            TokenKind::RightBrace => {
                let stray = parser.advance();
                parser.recover(SyntaxError::UnexpectedClosingDelimiter {
                    delimiter: '}',
                    location: stray.location,
                })?;
                continue;
            }
            _ => {}
        }

        let start_count = parser.consumed_count();
        let start = parser.peek().location;

        match parse_statement(parser) {
            Ok(statement) => statements.push(statement),
            Err(error) => {
                parser.recover(error)?;
                parser.synchronize();

                if parser.consumed_count() == start_count && !parser.peek().is_end() {
                    parser.advance();
                }

                let location = match parser.last_consumed() {
                    Some(last) if parser.consumed_count() > start_count => start.merge(last),
                    _ => Location::at(start.start),
                };
                statements.push(error_node(location));
            }
        }
    }
}

pub fn parse_statement(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    nested(parser, "statement", |parser| match current_kind(parser)? {
        TokenKind::Keyword(Keyword::Let) => parse_let(parser),
        TokenKind::Keyword(Keyword::Fn) => parse_function(parser),
        TokenKind::Keyword(Keyword::If) => parse_if(parser),
        TokenKind::Keyword(Keyword::While) => parse_while(parser),
        TokenKind::Keyword(Keyword::Return) => parse_return(parser),
        TokenKind::LeftBrace => parse_block(parser),
        _ => parse_expression_statement(parser),
    })
}

/// block := "{" stmt* "}"
pub fn parse_block(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    nested(parser, "block", |parser| {
        let open = expect(parser, TokenKind::LeftBrace, "'{'")?;
        let statements = parse_statement_list(parser, true)?;

        let close = if check(parser, TokenKind::RightBrace)? {
            parser.advance().location
        } else {
            parser.recover(SyntaxError::UnclosedDelimiter {
                delimiter: '{',
                location: open.location,
            })?;
            insertion_point(parser)
        };

        let statements = make_sequence(statements, Location::empty_after(open.location));
        Ok(make_node(
            NodeKind::Block { statements },
            open.location.merge(close),
        ))
    })
}

fn parse_let(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    let keyword = parser.advance();
    let name = expect(parser, TokenKind::Identifier, "identifier")?;

    let initializer = if check(parser, TokenKind::Assign)? {
        let assign = parser.advance();
        Some(Box::new(parse_required_expression(parser, assign.location)?))
    } else {
        None
    };

    let end = expect_terminator(parser)?;
    Ok(make_node(
        NodeKind::Let {
            name: Spanned::new(name.lexeme, name.location),
            initializer,
        },
        keyword.location.merge(end),
    ))
}

fn parse_function(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    let keyword = parser.advance();
    let name = expect(parser, TokenKind::Identifier, "function name")?;
    let open = expect(parser, TokenKind::LeftParen, "'('")?;

    let mut params = Vec::new();
    if !check(parser, TokenKind::RightParen)? {
        loop {
            let param = expect(parser, TokenKind::Identifier, "parameter name")?;
            params.push(make_node(
                NodeKind::Identifier {
                    name: param.lexeme,
                },
                param.location,
            ));
            if !check(parser, TokenKind::Comma)? {
                break;
            }
            parser.advance();
        }
    }
    expect(parser, TokenKind::RightParen, "')'")?;

    let body = parse_block(parser)?;
    let location = keyword.location.merge(body.location());

    Ok(make_node(
        NodeKind::Function {
            name: Spanned::new(name.lexeme, name.location),
            params: make_sequence(params, Location::empty_after(open.location)),
            body: Box::new(body),
        },
        location,
    ))
}

fn parse_if(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    let keyword = parser.advance();
    let condition = parse_expression(parser)?;
    let then_branch = parse_block(parser)?;

    let else_branch = if check(parser, TokenKind::Keyword(Keyword::Else))? {
        parser.advance();
        let branch = if check(parser, TokenKind::Keyword(Keyword::If))? {
            nested(parser, "else if", parse_if)?
        } else {
            parse_block(parser)?
        };
        Some(Box::new(branch))
    } else {
        None
    };

    let last = else_branch
        .as_ref()
        .map(|branch| branch.location())
        .unwrap_or_else(|| then_branch.location());

    Ok(make_node(
        NodeKind::If {
            condition: Box::new(condition),
            then_branch: Box::new(then_branch),
            else_branch,
        },
        keyword.location.merge(last),
    ))
}

fn parse_while(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    let keyword = parser.advance();
    let condition = parse_expression(parser)?;
    let body = parse_block(parser)?;
    let location = keyword.location.merge(body.location());

    Ok(make_node(
        NodeKind::While {
            condition: Box::new(condition),
            body: Box::new(body),
        },
        location,
    ))
}

fn parse_return(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    let keyword = parser.advance();

    let value = if check(parser, TokenKind::Semicolon)? {
        None
    } else {
        Some(Box::new(parse_required_expression(parser, keyword.location)?))
    };

    let end = expect_terminator(parser)?;
    Ok(make_node(NodeKind::Return { value }, keyword.location.merge(end)))
}

fn parse_expression_statement(parser: &mut dyn Parser) -> SyntaxResult<Node> {
    let expr = parse_expression(parser)?;
    let end = expect_terminator(parser)?;
    let location = expr.location().merge(end);

    Ok(make_node(
        NodeKind::ExpressionStatement {
            expr: Box::new(expr),
        },
        location,
    ))
}

#[cfg(test)]
mod tests {
    use crate::config::runtime::SyntaxPreferences;
    use crate::grammar::ast::{validate_enclosure, Node, NodeKind};
    use crate::syntax::{parse_str, parse_with_preferences};
    use crate::utils::{Location, Position};

    fn loc(sl: u32, sc: u32, el: u32, ec: u32) -> Location {
        Location::new(Position::new(sl, sc), Position::new(el, ec))
    }

    fn body(root: &Node) -> Vec<&Node> {
        match root.kind() {
            NodeKind::Program { body } => body.iter().collect(),
            other => panic!("expected program, got {}", other),
        }
    }

    fn recovering() -> SyntaxPreferences {
        SyntaxPreferences {
            enable_recovery: true,
            include_context_in_diagnostics: true,
        }
    }

    #[test]
    fn let_statement_spans_keyword_to_semicolon() {
        let output = parse_str("let x = 1 + 2;").unwrap();
        let statements = body(&output.root);

        assert_eq!(statements.len(), 1);
        assert_eq!(statements[0].location(), loc(1, 1, 1, 15));
        match statements[0].kind() {
            NodeKind::Let { name, initializer } => {
                assert_eq!(name.value, "x");
                assert_eq!(name.location, loc(1, 5, 1, 6));
                let init = initializer.as_ref().unwrap();
                assert_eq!(init.location(), loc(1, 9, 1, 14));
            }
            other => panic!("unexpected {}", other),
        }
    }

    #[test]
    fn multiline_statements_merge_across_lines() {
        let source = "let\nname\n=\n1;";
        let output = parse_str(source).unwrap();
        let statements = body(&output.root);
        assert_eq!(statements[0].location(), loc(1, 1, 4, 3));
        assert!(validate_enclosure(&output.root).is_ok());
    }

    #[test]
    fn function_if_while_return() {
        let source = "fn max(a, b) {\n  if a > b { return a; } else { return b; }\n}\nwhile x { x = x - 1; }";
        let output = parse_str(source).unwrap();
        let statements = body(&output.root);

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].kind().name(), "Function");
        assert_eq!(statements[0].location(), loc(1, 1, 3, 2));
        assert_eq!(statements[1].kind().name(), "While");
        assert_eq!(statements[1].location(), loc(4, 1, 4, 23));

        match statements[0].kind() {
            NodeKind::Function { params, .. } => {
                assert_eq!(params.len(), 2);
                assert_eq!(params.location(), loc(1, 8, 1, 12));
            }
            other => panic!("unexpected {}", other),
        }
        assert!(validate_enclosure(&output.root).is_ok());
    }

    #[test]
    fn empty_parameter_list_sits_after_paren() {
        let output = parse_str("fn f() {}").unwrap();
        match body(&output.root)[0].kind() {
            NodeKind::Function { params, body, .. } => {
                assert!(params.is_empty());
                assert_eq!(params.location(), Location::point(1, 6));
                match body.kind() {
                    NodeKind::Block { statements } => {
                        assert_eq!(statements.location(), Location::point(1, 9));
                    }
                    other => panic!("unexpected {}", other),
                }
            }
            other => panic!("unexpected {}", other),
        }
    }

    #[test]
    fn else_if_chains_nest() {
        let output = parse_str("if a { } else if b { } else { }").unwrap();
        let statements = body(&output.root);
        assert_eq!(statements[0].location(), loc(1, 1, 1, 32));
        match statements[0].kind() {
            NodeKind::If { else_branch, .. } => {
                let nested_if = else_branch.as_ref().unwrap();
                assert_eq!(nested_if.kind().name(), "If");
                assert_eq!(nested_if.location(), loc(1, 15, 1, 32));
            }
            other => panic!("unexpected {}", other),
        }
    }

    #[test]
    fn missing_semicolon_is_synthesized_at_a_point() {
        let output = parse_with_preferences(b"let a = 1\nlet b = 2;", &recovering()).unwrap();
        let statements = body(&output.root);

        assert_eq!(statements.len(), 2);
        assert_eq!(statements[0].location(), loc(1, 1, 1, 10));
        assert_eq!(output.diagnostics.len(), 1);
        assert_eq!(output.diagnostics[0].code.as_str(), "E050");
        assert_eq!(output.diagnostics[0].location, loc(2, 1, 2, 4));
    }

    #[test]
    fn missing_initializer_becomes_zero_width_error() {
        let output = parse_with_preferences(b"let a = ;", &recovering()).unwrap();
        match body(&output.root)[0].kind() {
            NodeKind::Let { initializer, .. } => {
                let init = initializer.as_ref().unwrap();
                assert!(init.is_error());
                assert_eq!(init.location(), Location::point(1, 8));
            }
            other => panic!("unexpected {}", other),
        }
        assert_eq!(output.diagnostics.len(), 1);
        assert!(validate_enclosure(&output.root).is_ok());
    }
}
