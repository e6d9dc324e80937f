use std::{error::Error, path::Path};

use test_utils::check_failing_run;

const SRC_PATH: &str = "./demos/return_outside_function.y";

#[test]
fn return_outside_function_fails() -> Result<(), Box<dyn Error>> {
    check_failing_run(Path::new(SRC_PATH))
}
