//! Cookie Copier — capture, store, and re-fetch named cookie values.

use std::path::PathBuf;

use tracing::info;
use tracing_subscriber::EnvFilter;

mod host;

use host::Host;

fn resolve_data_dir() -> PathBuf {
    std::env::var("COOKIE_COPIER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| {
            let exe_dir = std::env::current_exe()
                .ok()
                .and_then(|p| p.parent().map(|p| p.to_path_buf()));
            if let Some(dir) = exe_dir {
                let parent_data = dir.join("../data");
                if parent_data.exists() {
                    return parent_data;
                }
            }
            PathBuf::from("data")
        })
}

fn print_help() {
    println!("Cookie Copier — capture and re-fetch named cookie values");
    println!();
    println!("Usage: cookie-copier <command>");
    println!();
    println!("Commands:");
    println!("  list                     Show stored watch records");
    println!("  add <label> <url> [icon] Watch the cookie <label> at <url>");
    println!("  remove <label>           Stop watching <label>");
    println!("  copy <label>             Refresh <label> and copy its value");
    println!("  refresh-all              Re-read every stored label");
    println!("  clear                    Erase all stored records");
    println!("  icon <url>               Action-icon lookup on <url>");
    println!("  help                     Show this help message");
}

fn usage_error(usage: &str) -> ! {
    eprintln!("Usage: cookie-copier {}", usage);
    std::process::exit(2);
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(String::as_str).unwrap_or("help");
    if matches!(command, "help" | "--help" | "-h") {
        print_help();
        return Ok(());
    }

    let data_dir = resolve_data_dir();
    info!("Data directory: {}", data_dir.display());
    let config = cookie_copier_core::CopierConfig::from_env(&data_dir)?;
    let host = Host::start(&config).await;
    let session = &host.session;

    match command {
        "list" => {
            println!("{}", serde_json::to_string_pretty(&session.records())?);
        }
        "add" => {
            let (Some(label), Some(url)) = (args.get(2), args.get(3)) else {
                usage_error("add <label> <url> [icon]");
            };
            let icon = args.get(4).map(String::as_str).unwrap_or("");
            let record = session.add_watch(label, url, icon).await?;
            println!("{}", serde_json::to_string_pretty(&record)?);
        }
        "remove" => {
            let Some(label) = args.get(2) else {
                usage_error("remove <label>");
            };
            if !session.remove_watch(label).await {
                eprintln!("{} was not stored", label);
            }
        }
        "copy" => {
            let Some(label) = args.get(2) else {
                usage_error("copy <label>");
            };
            let value = session.copy(label).await?;
            println!("{}", value);
        }
        "refresh-all" => {
            let refreshed = session.refresh_all().await;
            println!("{}", serde_json::to_string_pretty(&refreshed)?);
        }
        "clear" => {
            session.reset().await;
        }
        "icon" => {
            host.router.on_action_clicked(args.get(2).map(String::as_str)).await;
        }
        other => {
            eprintln!("Unknown command: {}. Use 'cookie-copier help' for usage.", other);
            std::process::exit(1);
        }
    }

    Ok(())
}
