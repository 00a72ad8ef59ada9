use assert_cmd::Command;
use predicates::prelude::*;

fn kit() -> Command {
    Command::cargo_bin("cleanroom-kit").unwrap()
}

fn publish_wallet_users_args(state: &str) -> Vec<String> {
    [
        "publish",
        "--state-file",
        state,
        "--project",
        "nimbus-wallet",
        "--dataset",
        "wallet_provider",
        "--table",
        "wallet_users",
        "--role",
        "aggregate-metric",
        "--rule-column",
        "hashed_email",
        "--listing",
        "wallet_users_share",
        "--subscriber",
        "analyst@acme-retail.example.com",
    ]
    .iter()
    .map(ToString::to_string)
    .collect()
}

#[test]
fn help_lists_the_lifecycle_subcommands() {
    kit()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("seed"))
        .stdout(predicate::str::contains("generate"))
        .stdout(predicate::str::contains("publish"))
        .stdout(predicate::str::contains("verify"));
}

#[test]
fn demo_lifecycle_round_trips_through_the_state_file() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let state = state.to_str().unwrap();

    kit()
        .args(["seed", "--state-file", state])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"orders\": 600"));

    kit()
        .args(["generate", "--state-file", state])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"wallet_users\""));

    let mut publish_args = publish_wallet_users_args(state);
    publish_args.push("--yes".to_string());
    kit()
        .args(&publish_args)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"listing_outcome\": \"created\""))
        .stdout(predicate::str::contains("\"grant_outcome\": \"created\""));

    // Re-publishing converges without creating anything new.
    kit()
        .args(&publish_args)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"exchange_outcome\": \"adopted\""))
        .stdout(predicate::str::contains("\"view_outcome\": \"adopted\""))
        .stdout(predicate::str::contains("\"listing_outcome\": \"adopted\""))
        .stdout(predicate::str::contains("\"grant_outcome\": \"adopted\""));

    kit()
        .args(["verify", "--state-file", state])
        .assert()
        .success()
        .stdout(predicate::str::contains("\"passed\": true"));
}

#[test]
fn egress_flip_reports_a_conflict() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let state = state.to_str().unwrap();

    kit().args(["seed", "--state-file", state]).assert().success();
    kit()
        .args(["generate", "--state-file", state])
        .assert()
        .success();

    let mut publish_args = publish_wallet_users_args(state);
    publish_args.push("--yes".to_string());
    kit().args(&publish_args).assert().success();

    publish_args.push("--allow-egress".to_string());
    kit()
        .args(&publish_args)
        .assert()
        .code(2)
        .stderr(predicate::str::contains("allow_egress"));
}

#[test]
fn publish_without_a_terminal_needs_yes() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let state = state.to_str().unwrap();

    kit().args(["seed", "--state-file", state]).assert().success();
    kit()
        .args(["generate", "--state-file", state])
        .assert()
        .success();

    // Test processes have no TTY on stdin, so the publish is described
    // but not performed.
    let publish_args = publish_wallet_users_args(state);
    kit()
        .args(&publish_args)
        .assert()
        .success()
        .stderr(predicate::str::contains("--yes"));

    // Nothing was provisioned: publishing with --yes creates, not adopts.
    let mut confirmed = publish_wallet_users_args(state);
    confirmed.push("--yes".to_string());
    kit()
        .args(&confirmed)
        .assert()
        .success()
        .stdout(predicate::str::contains("\"listing_outcome\": \"created\""));
}

#[test]
fn verify_rejects_a_salt_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let state = state.to_str().unwrap();

    kit().args(["seed", "--state-file", state]).assert().success();
    kit()
        .args(["generate", "--state-file", state])
        .assert()
        .success();

    kit()
        .args(["verify", "--state-file", state, "--salt", "some-other-salt"])
        .assert()
        .code(1)
        .stdout(predicate::str::contains("\"passed\": false"));
}

#[test]
fn generate_needs_a_seeded_source() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let state = state.to_str().unwrap();

    kit()
        .args(["generate", "--state-file", state])
        .assert()
        .failure()
        .stderr(predicate::str::contains("does not exist"));
}

#[test]
fn market_share_is_bounded() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let state = state.to_str().unwrap();

    kit().args(["seed", "--state-file", state]).assert().success();

    kit()
        .args(["generate", "--state-file", state, "--market-share", "0"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("market share"));
}
