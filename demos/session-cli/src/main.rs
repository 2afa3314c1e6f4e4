//! Command-line driver for a Portico session.
//!
//! The token is kept in a JSON file between runs (`PORTICO_TOKEN_FILE`,
//! default `.portico-token.json`), so `login` in one invocation carries
//! over to `status` in the next.
//!
//! ```text
//! session-cli status
//! session-cli login <username> <password>
//! session-cli register <username> <nickname> <email> <password>
//! session-cli whoami
//! session-cli refresh
//! session-cli navigate <path>
//! session-cli logout
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use portico::prelude::*;
use portico::protocol::RegisterRequest;

const DEFAULT_TOKEN_FILE: &str = ".portico-token.json";

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Status,
    Login { username: String, password: String },
    Register(RegisterRequest),
    WhoAmI,
    Refresh,
    Navigate(String),
    Logout,
}

fn parse_args(args: &[String]) -> Result<Command, String> {
    let (name, rest) = args.split_first().ok_or_else(usage)?;
    let command = match (name.as_str(), rest) {
        ("status", []) => Command::Status,
        ("login", [username, password]) => Command::Login {
            username: username.clone(),
            password: password.clone(),
        },
        ("register", [username, nickname, email, password]) => {
            Command::Register(RegisterRequest {
                username: username.clone(),
                nickname: nickname.clone(),
                email: email.clone(),
                password: password.clone(),
                avatar: None,
                permission: None,
            })
        }
        ("whoami", []) => Command::WhoAmI,
        ("refresh", []) => Command::Refresh,
        ("navigate", [path]) => Command::Navigate(path.clone()),
        ("logout", []) => Command::Logout,
        _ => return Err(usage()),
    };
    Ok(command)
}

fn usage() -> String {
    "usage: session-cli <status | login USER PASS | register USER NICK EMAIL PASS | whoami | refresh | navigate PATH | logout>".to_owned()
}

fn describe(snapshot: &SessionSnapshot) -> String {
    match snapshot.user() {
        Some(user) => format!(
            "signed in as {} \"{}\" [{}]{}",
            user.username,
            snapshot.nickname(),
            snapshot.permission(),
            if snapshot.is_admin() { " admin" } else { "" },
        ),
        None => "not signed in".to_owned(),
    }
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> ExitCode {
    portico::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = match parse_args(&args) {
        Ok(command) => command,
        Err(usage) => {
            eprintln!("{usage}");
            return ExitCode::from(2);
        }
    };

    match run(command).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(command: Command) -> Result<(), PorticoError> {
    let mut config = PorticoConfig::from_env()?;
    if config.token_file.is_none() {
        config.token_file = Some(PathBuf::from(DEFAULT_TOKEN_FILE));
    }
    // One-shot process: background refresh would never fire.
    config.refresh = None;

    let mut app = Portico::builder().config(config).build()?;

    // Login and register don't need the status round-trip first.
    if !matches!(command, Command::Login { .. } | Command::Register(_)) {
        app.start().await;
    }

    let result = execute(&app, command).await;

    if let Some(nav) = app.follow_forced_redirect().await {
        println!("session expired, now at {}", nav?.route.location);
    }
    app.shutdown().await;
    result
}

async fn execute(
    app: &Portico<portico::transport::ReqwestTransport>,
    command: Command,
) -> Result<(), PorticoError> {
    let session = app.session();
    match command {
        Command::Status => println!("{}", describe(&session.snapshot())),
        Command::Login { username, password } => {
            let user = session.login(&username, &password).await?;
            println!("welcome, {}", user.username);
        }
        Command::Register(request) => {
            let created = session.api().register(&request).await?;
            println!("registered {} as {}", created.username, created.user_id);
        }
        Command::WhoAmI => match session.fetch_user_info().await? {
            Some(user) => {
                println!("{user}");
                println!("  nickname:   {}", user.nickname);
                println!("  permission: {}", user.permission);
            }
            None => println!("not signed in"),
        },
        Command::Refresh => {
            let refreshed = session.refresh().await?;
            println!(
                "token refreshed, expires {}",
                refreshed.expires_at.as_deref().unwrap_or("unknown")
            );
        }
        Command::Navigate(path) => {
            let nav = app.navigate(&path).await?;
            match &nav.redirected_from {
                Some(from) => println!("{from} -> {} ({})", nav.route.location, nav.route.name),
                None => println!("{} ({})", nav.route.location, nav.route.name),
            }
            if !nav.route.meta.title.is_empty() {
                println!("  title: {}", nav.route.meta.title);
            }
        }
        Command::Logout => match session.logout().await {
            LogoutOutcome::Confirmed => println!("signed out"),
            LogoutOutcome::LocalOnly(e) => {
                tracing::warn!(error = %e, "server did not confirm logout");
                println!("signed out locally ({e})");
            }
        },
    }
    Ok(())
}
