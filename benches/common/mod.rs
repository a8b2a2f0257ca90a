#![allow(dead_code)]
use std::fs;

use quill::ast::Script;
use quill::parser;

pub const WORKLOADS: [(&str, &str); 2] = [
    ("gcd", "tests/programs/bench_gcd/program.ql"),
    ("loop", "tests/programs/bench_loop/program.ql"),
];

pub fn load_source(path: &str) -> String {
    fs::read_to_string(path).unwrap_or_else(|err| panic!("read {path}: {err}"))
}

pub fn load_script(path: &str) -> Script {
    let source = load_source(path);
    let (script, errors) = parser::parse_source(&source);
    assert!(errors.is_empty(), "parse {path}: {errors:?}");
    script
}
