use std::{
    error::Error,
    io,
    path::Path,
    process::{Command, Output},
    str,
};

const WHY_PATH: &str = "./target/debug/why";

pub struct Expected<'a> {
    pub stdout: &'a str,
    pub stderr: &'a str,
}

impl<'a> Expected<'a> {
    fn assert_matches(self, output: &Output) -> Result<(), Box<dyn Error>> {
        assert_eq!(str::from_utf8(&output.stdout)?, self.stdout);
        assert_eq!(str::from_utf8(&output.stderr)?, self.stderr);
        Ok(())
    }
}

fn run_why(src_path: &Path) -> Result<Output, io::Error> {
    Command::new(WHY_PATH).arg(src_path).output()
}

/// Runs a `.y` script to completion and asserts its stdout/stderr match,
/// and that the process exited successfully.
pub fn check_run(src_path: &Path, expected: Expected) -> Result<(), Box<dyn Error>> {
    let output = run_why(src_path)?;

    expected.assert_matches(&output)?;
    assert!(
        output.status.success(),
        "why exited with status {:?}",
        output.status.code()
    );

    Ok(())
}

/// Runs a `.y` script expected to fail (lex/parse/interpreter error) and
/// asserts it exits non-zero.
pub fn check_failing_run(src_path: &Path) -> Result<(), Box<dyn Error>> {
    let output = run_why(src_path)?;

    println!("{output:?}");
    assert!(
        !output.status.success(),
        "why should have exited with a non-zero status"
    );

    Ok(())
}
