//! Fixture-driven end-to-end tests: every directory under `tests/programs/`
//! with a `case.yaml` is lexed, parsed, and evaluated, then checked against
//! its declared outcome class.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result, ensure};

use quill::fixtures::{Case, CaseClass, load_cases};
use quill::interpreter::Evaluator;
use quill::parser;

#[derive(Clone, Default)]
struct SharedBuffer(Rc<RefCell<Vec<u8>>>);

impl Write for SharedBuffer {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl SharedBuffer {
    fn contents(&self) -> String {
        String::from_utf8(self.0.borrow().clone()).expect("program output should be utf-8")
    }
}

fn normalize_output(output: &str) -> String {
    output.replace("\r\n", "\n").trim_end().to_string()
}

fn expected_error(case: &Case) -> Result<String> {
    let file = case
        .spec
        .expected
        .error_contains_file
        .as_deref()
        .with_context(|| format!("Missing error_contains_file in {}", case.name))?;
    Ok(case.read_text(file)?.trim().to_string())
}

fn check_case(case: &Case) -> Result<()> {
    let source = fs::read_to_string(&case.program_path)
        .with_context(|| format!("Reading {}", case.name))?;
    let (script, errors) = parser::parse_source(&source);

    match case.spec.class {
        CaseClass::RuntimeSuccess => {
            ensure!(
                case.spec.expected.exit_code == 0,
                "Case {} expected exit code must be 0 for runtime_success",
                case.name
            );
            ensure!(
                errors.is_empty(),
                "Case {} failed to compile: {errors:?}",
                case.name
            );
            let stdout_file = case
                .spec
                .expected
                .stdout_file
                .as_deref()
                .with_context(|| format!("Missing stdout_file in {}", case.name))?;
            let expected = case.read_text(stdout_file)?;

            let buffer = SharedBuffer::default();
            let mut evaluator = Evaluator::with_output(Box::new(buffer.clone()));
            evaluator
                .run(&script)
                .map_err(|exception| anyhow::anyhow!("{exception}"))
                .with_context(|| format!("Evaluating {}", case.name))?;

            let actual = normalize_output(&buffer.contents());
            let expected = normalize_output(&expected);
            ensure!(
                actual == expected,
                "Output mismatch for {}:\n--- expected ---\n{expected}\n--- actual ---\n{actual}",
                case.name
            );
        }
        CaseClass::FrontendError => {
            ensure!(
                case.spec.expected.exit_code == 1,
                "Case {} expected exit code must be 1 for frontend_error",
                case.name
            );
            ensure!(
                !errors.is_empty(),
                "Expected frontend error in {}, but parsing succeeded",
                case.name
            );
            let expected = expected_error(case)?;
            let rendered = errors
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            ensure!(
                rendered.contains(&expected),
                "Expected frontend error containing '{expected}' in {}, got '{rendered}'",
                case.name
            );
        }
        CaseClass::RuntimeError => {
            ensure!(
                case.spec.expected.exit_code == 1,
                "Case {} expected exit code must be 1 for runtime_error",
                case.name
            );
            ensure!(
                errors.is_empty(),
                "Case {} failed to compile: {errors:?}",
                case.name
            );
            let expected = expected_error(case)?;
            let mut evaluator = Evaluator::with_output(Box::new(io::sink()));
            let exception = match evaluator.run(&script) {
                Err(exception) => exception,
                Ok(()) => anyhow::bail!("Expected runtime error in {}", case.name),
            };
            ensure!(
                exception.message.contains(&expected),
                "Expected runtime error containing '{expected}' in {}, got '{}'",
                case.name,
                exception.message
            );
        }
    }

    Ok(())
}

#[test]
fn runs_fixture_programs() -> Result<()> {
    let cases = load_cases(Path::new("tests/programs"))?;
    for case in &cases {
        check_case(case)?;
    }
    Ok(())
}
