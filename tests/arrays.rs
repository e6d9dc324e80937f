use std::{error::Error, path::Path};

use test_utils::{check_run, Expected};

const SRC_PATH: &str = "./demos/arrays.y";
const EXPECTED: Expected = Expected {
    stdout: "1 \n42 \n3 \n",
    stderr: "",
};

#[test]
fn run_array_mutation() -> Result<(), Box<dyn Error>> {
    check_run(Path::new(SRC_PATH), EXPECTED)
}
