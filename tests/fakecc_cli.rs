use assert_cmd::Command;

#[test]
fn nop_option_exits_zero_without_invoking_the_analyzer() {
    let mut cmd = Command::cargo_bin("tuscan-cc").unwrap();
    cmd.arg("-v").assert().success();
}

#[test]
fn cxx_binary_also_handles_nop_options() {
    let mut cmd = Command::cargo_bin("tuscan-cxx").unwrap();
    cmd.arg("--version").assert().success();
}

#[test]
fn unrelated_arguments_without_inputs_exit_zero() {
    let mut cmd = Command::cargo_bin("tuscan-cc").unwrap();
    cmd.args(["-Wall", "-pthread"]).assert().success();
}
