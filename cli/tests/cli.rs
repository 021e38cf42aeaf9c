//! End-to-end checks of the chainchat binary

use assert_cmd::Command;
use predicates::prelude::*;

#[test]
fn tools_subcommand_lists_the_fixed_pair() {
    Command::cargo_bin("chainchat")
        .unwrap()
        .arg("tools")
        .assert()
        .success()
        .stdout(predicate::str::contains("get_crypto_info"))
        .stdout(predicate::str::contains("send_email"));
}

#[test]
fn missing_chat_credential_is_startup_fatal() {
    let workdir = tempfile::tempdir().unwrap();

    Command::cargo_bin("chainchat")
        .unwrap()
        .current_dir(workdir.path())
        .env_remove("OPENAI_API_KEY")
        .write_stdin("")
        .assert()
        .failure()
        .stderr(predicate::str::contains("OPENAI_API_KEY"));
}

#[test]
fn typing_exit_ends_the_session_without_a_model_call() {
    let workdir = tempfile::tempdir().unwrap();

    Command::cargo_bin("chainchat")
        .unwrap()
        .current_dir(workdir.path())
        .env("OPENAI_API_KEY", "test-key")
        .write_stdin("EXIT\n")
        .assert()
        .success()
        .stdout(predicate::str::contains("Goodbye"));
}
