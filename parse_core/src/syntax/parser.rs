//! Parser driver
//!
//! Pulls tokens through a [`TokenStream`], runs the grammar builders and
//! turns their errors into diagnostics. With recovery disabled the first
//! error ends the parse; with recovery enabled errors are collected and the
//! tree contains `Error` nodes where input could not be parsed.

use crate::config::compile_time::syntax::*;
use crate::config::runtime::SyntaxPreferences;
use crate::grammar::ast::{self, Node};
use crate::grammar::builders::{parse_program, Parser};
use crate::grammar::keywords::Keyword;
use crate::lexical::{LexicalMetrics, Scanner};
use crate::logging::{self, codes, LogEvent};
use crate::syntax::error::{Diagnostic, ParseError, SyntaxError, SyntaxResult};
use crate::tokens::{Token, TokenKind, TokenStream};
use crate::utils::Location;
use crate::{log_debug, log_error, log_success};
use serde::Serialize;

/// Result of a successful parse
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutput {
    pub root: Node,
    /// Recovered errors; empty unless recovery was enabled
    pub diagnostics: Vec<Diagnostic>,
    /// Comment tokens, when the scanner was asked to retain them
    pub comments: Vec<Token>,
    pub metrics: LexicalMetrics,
}

impl ParseOutput {
    pub fn has_errors(&self) -> bool {
        !self.diagnostics.is_empty()
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    pub fn ast_json(&self) -> Result<String, serde_json::Error> {
        ast::to_json_pretty(&self.root)
    }
}

pub struct ParserDriver<'src> {
    tokens: TokenStream<'src>,
    preferences: SyntaxPreferences,
    context_stack: Vec<&'static str>,
    parse_depth: usize,
    diagnostics: Vec<Diagnostic>,
    /// Rule chain captured while an error unwinds
    failure_context: Option<String>,
    /// The error that stopped the parse
    fatal: Option<Diagnostic>,
}

impl<'src> ParserDriver<'src> {
    pub fn new(scanner: Scanner<'src>, preferences: SyntaxPreferences) -> Self {
        Self {
            tokens: TokenStream::new(scanner),
            preferences,
            context_stack: Vec::with_capacity(MAX_CONTEXT_STACK_DEPTH),
            parse_depth: 0,
            diagnostics: Vec::new(),
            failure_context: None,
            fatal: None,
        }
    }

    pub fn parse(mut self) -> Result<ParseOutput, ParseError> {
        log_debug!("Parse started", "recovery" => self.preferences.enable_recovery);

        let result = parse_program(&mut self);

        let Self {
            tokens,
            mut diagnostics,
            fatal,
            ..
        } = self;
        let (metrics, comments) = tokens.finish();

        match result {
            Ok(root) => {
                if diagnostics.is_empty() {
                    log_success!(
                        codes::success::AST_CONSTRUCTION_COMPLETE,
                        "AST construction complete",
                        "tokens" => metrics.total_tokens,
                        "location" => root.location()
                    );
                } else {
                    log_success!(
                        codes::success::RECOVERED_WITH_DIAGNOSTICS,
                        "AST built with recovered errors",
                        "diagnostics" => diagnostics.len(),
                        "tokens" => metrics.total_tokens
                    );
                }

                Ok(ParseOutput {
                    root,
                    diagnostics,
                    comments,
                    metrics,
                })
            }
            Err(error) => {
                let fatal = fatal.unwrap_or_else(|| Diagnostic::from_error(&error, None));
                log_error!(fatal.code, "Parse failed",
                    location = fatal.location,
                    "message" => &fatal.message,
                    "recovered" => diagnostics.len());

                diagnostics.push(fatal);
                Err(ParseError::Syntax { diagnostics })
            }
        }
    }

    fn context_chain(&self) -> Option<String> {
        if !self.preferences.include_context_in_diagnostics || self.context_stack.is_empty() {
            return None;
        }
        Some(self.context_stack.join(" > "))
    }

    fn diagnostic(&mut self, error: &SyntaxError) -> Diagnostic {
        let context = self.failure_context.take().or_else(|| self.context_chain());
        Diagnostic::from_error(error, context)
    }
}

impl Parser for ParserDriver<'_> {
    fn current(&mut self) -> SyntaxResult<&Token> {
        loop {
            let token = self.tokens.current();
            let TokenKind::Error(error) = token.kind else {
                break;
            };
            let location = token.location;
            self.tokens.advance();
            self.recover(SyntaxError::Lexical { error, location })?;
        }
        Ok(self.tokens.current())
    }

    fn peek(&mut self) -> &Token {
        self.tokens.current()
    }

    fn advance(&mut self) -> Token {
        self.tokens.advance()
    }

    fn last_consumed(&self) -> Option<Location> {
        self.tokens.last_consumed()
    }

    fn consumed_count(&self) -> usize {
        self.tokens.consumed_count()
    }

    fn enter(&mut self, context: &'static str) -> SyntaxResult<()> {
        if self.parse_depth >= MAX_PARSE_DEPTH {
            return Err(SyntaxError::MaxRecursionDepth {
                max: MAX_PARSE_DEPTH,
                location: self.tokens.current().location,
            });
        }

        self.parse_depth += 1;
        if self.context_stack.len() < MAX_CONTEXT_STACK_DEPTH {
            self.context_stack.push(context);
        }
        Ok(())
    }

    fn exit(&mut self) {
        if self.context_stack.len() == self.parse_depth {
            self.context_stack.pop();
        }
        self.parse_depth = self.parse_depth.saturating_sub(1);
    }

    fn mark_failure(&mut self) {
        if self.failure_context.is_none() {
            self.failure_context = self.context_chain();
        }
    }

    fn recovery_enabled(&self) -> bool {
        self.preferences.enable_recovery
    }

    fn recover(&mut self, error: SyntaxError) -> SyntaxResult<()> {
        let diagnostic = self.diagnostic(&error);

        if !self.preferences.enable_recovery || error.requires_halt() {
            if self.fatal.is_none() {
                self.fatal = Some(diagnostic);
            }
            return Err(error);
        }

        logging::emit(LogEvent::from(&diagnostic).with_context("recovered", "true"));
        self.diagnostics.push(diagnostic);

        if self.diagnostics.len() >= MAX_DIAGNOSTICS {
            let error = SyntaxError::TooManyErrors {
                count: self.diagnostics.len(),
                location: error.location(),
            };
            self.fatal = Some(self.diagnostic(&error));
            return Err(error);
        }
        Ok(())
    }

    fn synchronize(&mut self) {
        let mut skipped = 0;

        while skipped < MAX_RECOVERY_SCAN_TOKENS {
            let kind = self.tokens.current().kind;
            match kind {
                TokenKind::EndOfInput | TokenKind::RightBrace => break,
                TokenKind::Keyword(keyword) if Keyword::starts_statement(keyword) => break,
                TokenKind::Semicolon => {
                    self.tokens.advance();
                    break;
                }
                _ => {
                    self.tokens.advance();
                    skipped += 1;
                }
            }
        }

        log_debug!("Synchronized after error",
            "skipped" => skipped,
            "at" => self.tokens.current().location);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::runtime::LexicalPreferences;
    use crate::grammar::ast::{validate_enclosure, NodeKind};
    use crate::lexical::LexicalError;
    use crate::utils::{Location, Position};

    fn loc(sl: u32, sc: u32, el: u32, ec: u32) -> Location {
        Location::new(Position::new(sl, sc), Position::new(el, ec))
    }

    fn lexical() -> LexicalPreferences {
        LexicalPreferences {
            retain_comments: false,
            collect_detailed_metrics: true,
            trace_tokens: false,
        }
    }

    fn parse(text: &str, enable_recovery: bool) -> Result<ParseOutput, ParseError> {
        let scanner = Scanner::open_str(text, lexical()).unwrap();
        let preferences = SyntaxPreferences {
            enable_recovery,
            include_context_in_diagnostics: true,
        };
        ParserDriver::new(scanner, preferences).parse()
    }

    fn diagnostics(result: Result<ParseOutput, ParseError>) -> Vec<Diagnostic> {
        match result {
            Err(ParseError::Syntax { diagnostics }) => diagnostics,
            other => panic!("expected syntax error, got {:?}", other),
        }
    }

    fn statement_kinds(output: &ParseOutput) -> Vec<&'static str> {
        output.root.children().iter().map(|n| n.kind().name()).collect()
    }

    #[test]
    fn program_spans_whole_input() {
        let output = parse("let x = 1;\n", false).unwrap();
        assert_eq!(output.root.location(), loc(1, 1, 2, 1));
        assert!(!output.has_errors());
        assert_eq!(output.metrics.total_tokens, 5);
        assert!(validate_enclosure(&output.root).is_ok());
    }

    #[test]
    fn empty_input_gives_empty_program() {
        let output = parse("", false).unwrap();
        assert_eq!(output.root.location(), Location::point(1, 1));
        match output.root.kind() {
            NodeKind::Program { body } => {
                assert!(body.is_empty());
                assert_eq!(body.location(), Location::point(1, 1));
            }
            other => panic!("unexpected {}", other),
        }
    }

    #[test]
    fn first_error_is_fatal_without_recovery() {
        let diagnostics = diagnostics(parse("let x = 1;\nlet = 2;", false));

        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_str(), "E050");
        assert_eq!(diagnostics[0].location, loc(2, 5, 2, 6));
        assert_eq!(diagnostics[0].message, "expected identifier, found '='");
        assert_eq!(diagnostics[0].context.as_deref(), Some("program > statement"));
    }

    #[test]
    fn end_of_input_error_points_at_last_token() {
        let diagnostics = diagnostics(parse("let x = (1 + 2", false));
        assert_eq!(diagnostics[0].code.as_str(), "E040");
        assert_eq!(diagnostics[0].location, loc(1, 14, 1, 15));
    }

    #[test]
    fn lexical_error_is_fatal_without_recovery() {
        let diagnostics = diagnostics(parse("let x = 1 @ 2;", false));
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code.as_str(), "E020");
        assert_eq!(diagnostics[0].location, loc(1, 11, 1, 12));
    }

    #[test]
    fn recovery_replaces_bad_statements_with_error_nodes() {
        let source = "let = 1;\nlet y = 2;\nfoo(;\nlet z = 3;";
        let output = parse(source, true).unwrap();

        assert_eq!(statement_kinds(&output), ["Error", "Let", "Error", "Let"]);
        let statements = output.root.children();
        assert_eq!(statements[0].location(), loc(1, 1, 1, 9));
        assert_eq!(statements[2].location(), loc(3, 1, 3, 6));

        assert_eq!(output.diagnostics.len(), 2);
        assert_eq!(output.diagnostics[0].location, loc(1, 5, 1, 6));
        assert_eq!(output.diagnostics[1].location, loc(3, 5, 3, 6));
        assert!(output.has_errors());
        assert!(validate_enclosure(&output.root).is_ok());
    }

    #[test]
    fn lexical_errors_are_reported_and_skipped() {
        let output = parse("let x = 1 @ 2;", true).unwrap();

        assert_eq!(statement_kinds(&output), ["Let", "ExpressionStatement"]);
        assert_eq!(output.diagnostics.len(), 2);
        assert_eq!(output.diagnostics[0].code.as_str(), "E020");
        assert_eq!(output.diagnostics[1].code.as_str(), "E050");
        assert_eq!(output.metrics.error_tokens, 1);
    }

    #[test]
    fn stray_closing_brace_is_reported() {
        let output = parse("}\nlet a = 1;", true).unwrap();
        assert_eq!(statement_kinds(&output), ["Let"]);
        assert_eq!(output.diagnostics[0].code.as_str(), "E042");
        assert_eq!(output.diagnostics[0].location, loc(1, 1, 1, 2));
    }

    #[test]
    fn unclosed_block() {
        let source = "fn f() {\n let a = 1;";

        let diagnostics = diagnostics(parse(source, false));
        assert_eq!(diagnostics[0].code.as_str(), "E041");
        assert_eq!(diagnostics[0].location, loc(1, 8, 1, 9));

        let output = parse(source, true).unwrap();
        let function = output.root.children()[0];
        assert_eq!(function.location(), loc(1, 1, 2, 12));
        assert!(validate_enclosure(&output.root).is_ok());
    }

    #[test]
    fn invalid_assignment_target() {
        let diagnostics = diagnostics(parse("1 = 2;", false));
        assert_eq!(diagnostics[0].code.as_str(), "E043");
        assert_eq!(diagnostics[0].location, loc(1, 1, 1, 2));
    }

    #[test]
    fn nesting_limit_halts_even_with_recovery() {
        let depth = MAX_PARSE_DEPTH + 10;
        let source = format!("{}1{};", "(".repeat(depth), ")".repeat(depth));

        // Unoptimized builds use large frames; give the recursion headroom
        let result = std::thread::Builder::new()
            .stack_size(64 * 1024 * 1024)
            .spawn(move || parse(&source, true))
            .unwrap()
            .join()
            .unwrap();

        let diagnostics = diagnostics(result);
        assert_eq!(diagnostics.last().unwrap().code.as_str(), "E087");
    }

    #[test]
    fn long_operator_chains_count_against_nesting_limit() {
        let source = format!("x = 1{};", "+1".repeat(50_000));
        let diagnostics = diagnostics(parse(&source, true));

        let last = diagnostics.last().unwrap();
        assert_eq!(last.code.as_str(), "E087");
        assert_eq!(last.location.start.line, 1);
    }

    #[test]
    fn long_call_chains_count_against_nesting_limit() {
        let source = format!("f{};", "()".repeat(50_000));
        let diagnostics = diagnostics(parse(&source, false));
        assert_eq!(diagnostics.last().unwrap().code.as_str(), "E087");
    }

    #[test]
    fn chain_levels_are_released_after_each_statement() {
        let links = MAX_PARSE_DEPTH / 2;
        let statement = format!("x = 1{};\ny = f{};\n", "+1".repeat(links), "()".repeat(links));
        let output = parse(&statement.repeat(5), false).unwrap();

        assert_eq!(output.root.children().len(), 10);
        assert!(validate_enclosure(&output.root).is_ok());
    }

    #[test]
    fn token_limit_halts_even_with_recovery() {
        use crate::config::compile_time::lexical::MAX_TOKEN_COUNT;

        let source = "a;".repeat(MAX_TOKEN_COUNT / 2 + 3);
        let diagnostics = diagnostics(parse(&source, true));

        let last = diagnostics.last().unwrap();
        assert_eq!(last.code.as_str(), "E027");
        assert_eq!(last.location, Location::point(1, MAX_TOKEN_COUNT as u32 + 1));
        assert_eq!(
            diagnostics.iter().filter(|d| d.code.as_str() == "E027").count(),
            1
        );
    }

    #[test]
    fn too_many_errors_halts() {
        let source = "@".repeat(MAX_DIAGNOSTICS + 50);
        let diagnostics = diagnostics(parse(&source, true));

        assert_eq!(diagnostics.len(), MAX_DIAGNOSTICS + 1);
        assert_eq!(diagnostics.last().unwrap().code.as_str(), "E086");
    }

    #[test]
    fn recovered_trees_keep_enclosure() {
        let sources = [
            "if x { let = ; } else { y = ; }",
            "while (a { b; }",
            "fn (a) { return }",
            "let a = 1 let b = 2 let c = 3",
            "{ { { } }",
            "x = = = 1;",
        ];

        for source in sources {
            let output = parse(source, true).unwrap();
            assert!(output.has_errors(), "{source}");
            assert!(validate_enclosure(&output.root).is_ok(), "{source}");
        }
    }

    #[test]
    fn lexical_error_kinds_surface_with_locations() {
        let diagnostics = diagnostics(parse("let s = \"open", false));
        assert_eq!(
            diagnostics[0].code,
            LexicalError::UnterminatedString.error_code()
        );
        assert_eq!(diagnostics[0].location, loc(1, 9, 1, 14));
    }

    #[test]
    fn output_serializes() {
        let output = parse("print(1, \"two\");", false).unwrap();
        let json: serde_json::Value = serde_json::from_str(&output.to_json().unwrap()).unwrap();
        assert_eq!(json["root"]["kind"], "Program");
        assert_eq!(json["root"]["body"]["items"][0]["expr"]["kind"], "Call");
        assert!(output.ast_json().unwrap().contains("\"Call\""));
    }
}
