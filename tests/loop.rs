use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

const WHILE_BREAK: &str = "./demos/while_break.y";
const FOR_RANGE: &str = "./demos/for_range.y";

#[test]
fn run_while_with_break() -> Result<(), Box<dyn Error>> {
    check_run(
        Path::new(WHILE_BREAK),
        Expected {
            stdout: "5 \n",
            stderr: "",
        },
    )
}

#[test]
fn run_for_range() -> Result<(), Box<dyn Error>> {
    check_run(
        Path::new(FOR_RANGE),
        Expected {
            stdout: "10 \n",
            stderr: "",
        },
    )
}
