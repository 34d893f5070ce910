//!
//! bazaar CLI binary
//! -----------------
//! Thin command-line front end over the session and API core: inspect the
//! stored session, log in and out, and issue authorized requests against a
//! remote bazaar server.

use std::env;

use anyhow::Result;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use bazaar::api::{self, ApiClient};
use bazaar::config::Config;
use bazaar::session::{CredentialStore, SessionController, SessionState};

fn print_usage(program: &str) {
    eprintln!(
        "Usage:\n  {program} status                          show current session state\n  {program} whoami                          show the logged-in identity\n  {program} login --email <e> --password <p>   authenticate and store the session\n  {program} register --email <e> --password <p> create an account, then log in\n  {program} logout                          clear the stored session (remote sign-out is best-effort)\n  {program} get <path>                      authorized GET against the API, prints the JSON body\n\nEnvironment:\n  BAZAAR_API_URL      base URL of the API server (requests fail without it)\n  BAZAAR_PROFILE_DIR  credential store directory (default: .bazaar)\n  BAZAAR_ADMIN_EMAIL  bootstrap admin address (default: admin@example.com)"
    );
}

fn flag_value(args: &[String], name: &str) -> Option<String> {
    args.iter().position(|a| a == name).and_then(|i| args.get(i + 1).cloned())
}

#[tokio::main]
async fn main() -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap();
    fmt().with_env_filter(filter).init();

    let cfg = Config::from_env();
    info!(
        target: "bazaar",
        "bazaar client starting: api='{}', profile_dir='{}'",
        cfg.api_base.as_deref().unwrap_or("<unset>"),
        cfg.profile_dir.display()
    );

    let store = CredentialStore::new(&cfg.profile_dir);
    let controller = SessionController::new(store.clone(), cfg.bootstrap_admin_email.clone());
    controller.init();
    let client = ApiClient::new(cfg.api_base.as_deref(), store.clone());

    let mut args: Vec<String> = env::args().collect();
    let program = args.remove(0);
    let cmd = args.first().cloned().unwrap_or_else(|| "status".to_string());

    match cmd.as_str() {
        "status" => {
            match controller.state() {
                SessionState::Authenticated(id) => {
                    println!("authenticated as {} (admin: {})", id.email, controller.is_admin());
                }
                SessionState::Unauthenticated => println!("not signed in"),
                SessionState::Error(reason) => println!("session error: {reason}"),
                SessionState::Initializing => println!("initializing"),
            }
        }
        "whoami" => match controller.current_identity() {
            Some(id) => println!("{}", serde_json::to_string_pretty(&id)?),
            None => {
                println!("not signed in");
                std::process::exit(1);
            }
        },
        "login" | "register" => {
            let (Some(email), Some(password)) = (flag_value(&args, "--email"), flag_value(&args, "--password"))
            else {
                eprintln!("{cmd} requires --email and --password");
                print_usage(&program);
                std::process::exit(2);
            };
            let resp = if cmd == "login" {
                api::login(&client, &controller, &email, &password).await
            } else {
                api::register(&client, &controller, &email, &password).await
            };
            if resp.success {
                println!("signed in as {}", controller.display_name());
                println!("next: {}", api::post_login_destination(&store));
            } else {
                eprintln!("{}", resp.error.unwrap_or_else(|| "sign-in failed".to_string()));
                std::process::exit(1);
            }
        }
        "logout" => {
            api::sign_out(&client, &controller);
            println!("signed out");
        }
        "get" => {
            let Some(path) = args.get(1) else {
                eprintln!("get requires a path, e.g. get /api/posts");
                print_usage(&program);
                std::process::exit(2);
            };
            let resp = client.get(path).await;
            if resp.success {
                println!("{}", serde_json::to_string_pretty(&resp.data.unwrap_or_default())?);
            } else {
                eprintln!("{}", resp.error.unwrap_or_else(|| "request failed".to_string()));
                std::process::exit(1);
            }
        }
        "-h" | "--help" | "help" => print_usage(&program),
        other => {
            eprintln!("unknown command: {other}");
            print_usage(&program);
            std::process::exit(2);
        }
    }

    Ok(())
}
