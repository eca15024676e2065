use std::{env, env::VarError};

/// The server takes no real CLI arguments. Anything at all on the command line prints the help
/// text and the current environment instead of starting the server.
pub fn handle_command_line_args() -> bool {
    let has_cli_args = env::args().count() > 1;
    if has_cli_args {
        display_readme();
        display_envs();
    }
    has_cli_args
}

fn display_readme() {
    const README: &str = include_str!("./cli-help.txt");
    println!("\n{README}\n");
}

fn display_envs() {
    // Only variables on this list are ever echoed. Secrets are not on it.
    const DISPLAY_ENVS: [&str; 11] = [
        "RUST_LOG",
        "PPG_HOST",
        "PPG_PORT",
        "PPG_BASE_URL",
        "PPG_CURRENCY",
        "PPG_ALLOW_CREDIT",
        "PPG_POLL_TIMEOUT",
        "PPG_ORDER_TTL",
        "PPG_MPAY_ENDPOINT",
        "PPG_MPAY_MERCHANT",
        "PPG_MPAY_USER",
    ];

    println!("Current environment (excluding variables that hold secrets):");
    for name in DISPLAY_ENVS {
        let val = match env::var(name) {
            Ok(s) => s,
            Err(VarError::NotPresent) => "Not set".into(),
            Err(VarError::NotUnicode(s)) => format!("Invalid value: {}", s.to_string_lossy()),
        };
        println!("  {name:<22} {val}");
    }
}
