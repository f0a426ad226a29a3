use std::process::Command;

// A cleared environment keeps ambient UCI_PROVIDER_* and LICHESS_API_TOKEN
// values from leaking into the assertions.
fn provider_cmd() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_uci-provider"));
    cmd.env_clear();
    cmd
}

#[test]
fn missing_engine_flag_is_a_usage_error() {
    let output = provider_cmd().output().expect("run uci-provider");

    assert_eq!(output.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("--engine"), "stderr was: {stderr}");
}

#[test]
fn missing_token_points_at_oauth_page_and_exits_128() {
    let output = provider_cmd()
        .args(["--engine", "stockfish"])
        .output()
        .expect("run uci-provider");

    assert_eq!(output.status.code(), Some(128));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains(
            "Need LICHESS_API_TOKEN environment variable from \
             https://lichess.org/account/oauth/token/create?scopes[]=engine:read&scopes[]=engine:write"
        ),
        "stdout was: {stdout}"
    );
}

#[test]
fn help_lists_the_flag_surface() {
    let output = provider_cmd().arg("--help").output().expect("run uci-provider");

    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    for flag in [
        "--name",
        "--engine",
        "--lichess",
        "--broker",
        "--token",
        "--max-threads",
        "--max-hash",
    ] {
        assert!(stdout.contains(flag), "help is missing {flag}");
    }
}
