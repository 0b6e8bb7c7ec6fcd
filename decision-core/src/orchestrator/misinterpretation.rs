//! Structural check for solutions that cannot match the stated problem.
//!
//! Runs independently of the classifier. A finding overrides the ML root
//! cause with `problem_misinterpretation`.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::mechanism::Signals;
use crate::taxonomy::Subtype;

use super::input::{OutputMode, ProblemContext};

/// Python `def`, JS `function`, Rust `fn`.
static FN_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:\bdef|\bfunction|\bfn)\s+([A-Za-z_]\w*)\s*(?:<[^>]*>)?\s*\(([^)]*)\)")
        .expect("FN_DEF regex should compile")
});

/// C-family definitions: `int twoSum(vector<int>& nums, int target) {`.
static TYPED_FN_DEF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^[ \t]*(?:[\w:<>\[\],*&]+[ \t]+)+([A-Za-z_]\w*)\s*\(([^)]*)\)\s*(?:const\s*)?\{")
        .expect("TYPED_FN_DEF regex should compile")
});

static PRINTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bprint\s*\(|\bprintln!|\bprint!|console\.log|System\.out\.print|\bprintf\s*\(|\bcout\s*<<|\bputs\s*\(")
        .expect("PRINTS regex should compile")
});

static RETURNS_VALUE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\breturn[ \t]+[^\s;]").expect("RETURNS_VALUE regex should compile")
});

const KEYWORDS: &[&str] = &["if", "for", "while", "switch", "catch", "return", "else"];

/// Why the solution was judged to misread the problem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MisinterpretationReason {
    MissingFunction { expected: String },
    ParameterCount { expected: usize, found: usize },
    OutputMode { expected: OutputMode },
    Signal { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisinterpretationFinding {
    pub subtype: Subtype,
    pub reason: MisinterpretationReason,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct FunctionDef {
    name: String,
    params: usize,
}

/// Check the code against the problem's schema, then the extractor signals.
pub fn detect(
    code: &str,
    problem: Option<&ProblemContext>,
    signals: &Signals,
) -> Option<MisinterpretationFinding> {
    if let Some(problem) = problem {
        if let Some(finding) = check_schema(code, problem) {
            return Some(finding);
        }
    }
    check_signals(signals)
}

fn check_schema(code: &str, problem: &ProblemContext) -> Option<MisinterpretationFinding> {
    if code.trim().is_empty() {
        return None;
    }
    let defs = function_defs(code);

    if let Some(expected) = problem.expected_function.as_deref() {
        match defs.iter().find(|d| d.name == expected) {
            None => {
                return Some(MisinterpretationFinding {
                    subtype: Subtype::WrongInputSchema,
                    reason: MisinterpretationReason::MissingFunction {
                        expected: expected.to_string(),
                    },
                });
            }
            Some(def) => {
                if let Some(expected_params) = problem.expected_params {
                    if def.params != expected_params {
                        return Some(MisinterpretationFinding {
                            subtype: Subtype::WrongInputSchema,
                            reason: MisinterpretationReason::ParameterCount {
                                expected: expected_params,
                                found: def.params,
                            },
                        });
                    }
                }
            }
        }
    }

    let mismatch = match problem.output_mode {
        Some(OutputMode::Return) => PRINTS.is_match(code) && !RETURNS_VALUE.is_match(code),
        Some(OutputMode::Stdout) => RETURNS_VALUE.is_match(code) && !PRINTS.is_match(code),
        None => false,
    };
    if mismatch {
        return problem.output_mode.map(|expected| MisinterpretationFinding {
            subtype: Subtype::WrongOutputFormat,
            reason: MisinterpretationReason::OutputMode { expected },
        });
    }
    None
}

fn check_signals(signals: &Signals) -> Option<MisinterpretationFinding> {
    const SIGNALS: &[(&str, Subtype)] = &[
        ("input_parse_mismatch", Subtype::WrongInputSchema),
        ("output_format_mismatch", Subtype::WrongOutputFormat),
        ("problem_goal_mismatch", Subtype::MisreadProblemStatement),
    ];
    SIGNALS
        .iter()
        .find(|(name, _)| signals.is_set(name))
        .map(|(name, subtype)| MisinterpretationFinding {
            subtype: *subtype,
            reason: MisinterpretationReason::Signal {
                name: (*name).to_string(),
            },
        })
}

fn function_defs(code: &str) -> Vec<FunctionDef> {
    FN_DEF
        .captures_iter(code)
        .chain(TYPED_FN_DEF.captures_iter(code))
        .filter_map(|caps| {
            let name = caps.get(1)?.as_str();
            if KEYWORDS.contains(&name) {
                return None;
            }
            Some(FunctionDef {
                name: name.to_string(),
                params: count_params(caps.get(2).map_or("", |m| m.as_str())),
            })
        })
        .collect()
}

/// Receiver parameters (`self`, `&mut self`) are not counted.
fn count_params(params: &str) -> usize {
    split_top_level(params)
        .into_iter()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .filter(|p| {
            let bare = p.trim_start_matches('&').trim_start_matches("mut ").trim();
            bare != "self" && !bare.starts_with("self:")
        })
        .count()
}

/// Split on commas outside any `<>`, `[]`, `()` or `{}` nesting, so
/// `Dict[int, List[int]]` or `HashMap<i32, Vec<i32>>` stay one parameter.
fn split_top_level(params: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    let mut prev = '\0';
    for (i, ch) in params.char_indices() {
        match ch {
            '<' | '[' | '(' | '{' => depth += 1,
            // `->` inside a closure type is not a closing bracket.
            '>' if prev == '-' => {}
            '>' | ']' | ')' | '}' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&params[start..i]);
                start = i + 1;
            }
            _ => {}
        }
        prev = ch;
    }
    parts.push(&params[start..]);
    parts
}
