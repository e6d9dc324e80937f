use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

const SRC_PATH: &str = "./demos/empty.y";
const EXPECTED: Expected = Expected {
    stdout: "",
    stderr: "",
};

#[test]
fn run_empty_program() -> Result<(), Box<dyn Error>> {
    check_run(Path::new(SRC_PATH), EXPECTED)
}
