use anyhow::Result;

use tunelift::context::AppContext;
use tunelift::conversion::{ConversionResult, Outcome};
use tunelift::logging;
use tunelift::session::SessionState;
use tunelift::settings::Settings;
use tunelift_api::GatewayClient;

#[tokio::main]
async fn main() -> Result<()> {
    let log_path = logging::init_logging()?;
    tracing::debug!(log = %log_path.display(), "Logging initialized");

    let settings = Settings::new().map_err(|e| anyhow::anyhow!("Failed to load configuration: {}", e))?;
    settings.validate().map_err(anyhow::Error::msg)?;

    let mut ctx = AppContext::new(&settings)?;

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        Some("status") | None => {
            ctx.check_status().await;
            print_session(&mut ctx);
        }
        Some("login") => {
            ctx.check_status().await;
            if ctx.session.is_logged_in() {
                print_session(&mut ctx);
                return Ok(());
            }
            ctx.login()?;
            println!("After authorizing, paste the full redirect URL here and press Enter:");
            let mut redirect = String::new();
            std::io::stdin().read_line(&mut redirect)?;
            ctx.complete_login(redirect.trim()).await?;
            print_session(&mut ctx);
        }
        Some("convert") => {
            let playlist_url = args.get(1).ok_or_else(|| {
                anyhow::anyhow!("Usage: tunelift convert <playlist_url> [playlist_name]")
            })?;
            let playlist_name = args.get(2).map(String::as_str);

            ctx.check_status().await;
            if !ctx.session.is_logged_in() {
                print_session(&mut ctx);
                anyhow::bail!("Not logged in; run `tunelift login` first");
            }

            if let Some(result) = ctx.convert(playlist_url, playlist_name).await {
                print_result(result);
            }
            print_session(&mut ctx);
        }
        Some("logout") => {
            ctx.logout()?;
            println!("Logged out.");
        }
        Some(other) => {
            anyhow::bail!(
                "Unknown command '{}'. Commands: status, login, convert, logout",
                other
            );
        }
    }

    Ok(())
}

fn print_session(ctx: &mut AppContext<GatewayClient>) {
    if let Some(notice) = ctx.session.take_notice() {
        println!("{}", notice);
    }
    match ctx.session.state() {
        SessionState::LoggedIn(user) => {
            let name = user.display_name.as_deref().unwrap_or(&user.id);
            println!("Logged in as {}.", name);
        }
        SessionState::LoggedOut => println!("Logged out."),
        SessionState::Authenticating => println!("Checking session..."),
    }
}

fn print_result(result: &ConversionResult) {
    match result.outcome {
        Outcome::Success => {
            println!("Conversion complete.");
            if let Some(name) = &result.playlist_name {
                println!("Playlist: {}", name);
            }
            if let Some(url) = &result.playlist_url {
                println!("URL: {}", url);
            }
            if let (Some(added), Some(total)) = (result.added_tracks, result.total_source_tracks) {
                println!("Added {} of {} tracks.", added, total);
            }
        }
        Outcome::Partial => {
            println!("Conversion finished with issues.");
            if let (Some(matched), Some(total)) =
                (result.matched_tracks, result.total_source_tracks)
            {
                println!("Matched {} of {} tracks.", matched, total);
            }
            if !result.unmatched_tracks.is_empty() {
                println!("Unmatched tracks:");
                for track in &result.unmatched_tracks {
                    println!("  - {}", track);
                }
            }
            for error in &result.api_errors {
                println!("API issue: {}", error);
            }
        }
        Outcome::Failure => {
            let message = result.message.as_deref().unwrap_or("Conversion failed");
            println!("{}", message);
        }
    }
}
