use clap::Subcommand;
use serde_json::json;

use crate::cli::utils::{output_success, output_warning};
use crate::cli::{config, OutputFormat};
use crate::client::{guard, Navigation, Route, User};

#[derive(Subcommand)]
pub enum AuthCommands {
    #[command(about = "Start Google sign-in and print the authorization URL")]
    Login,

    #[command(about = "Finish sign-in with the URL the browser was redirected to")]
    Callback {
        #[arg(help = "Full redirect URL, including the #access_token fragment")]
        url: String,
    },

    #[command(about = "Sign out and forget the local session")]
    Logout,

    #[command(about = "Show the signed-in user")]
    Status,
}

pub async fn handle(cmd: AuthCommands, output_format: OutputFormat) -> anyhow::Result<()> {
    let mut store = config::session_store()?;

    match cmd {
        AuthCommands::Login => {
            store.restore_session().await;
            if let Navigation::Redirect(_) = guard(&mut store, Route::Login).await {
                let user = store.user();
                return output_success(
                    &output_format,
                    &format!("Already signed in as {}", user.map_or("", |u| u.display_name.as_str())),
                    Some(json!({ "user": user })),
                );
            }

            let response = store.login_with_google().await?;
            match output_format {
                OutputFormat::Json => {
                    println!("{}", serde_json::to_string_pretty(&response)?);
                }
                OutputFormat::Text => {
                    println!("Open this URL in a browser to sign in with Google:");
                    println!();
                    println!("  {}", response.url);
                    println!();
                    println!("Then run: fintrack auth callback '<redirected URL>'");
                }
            }
            Ok(())
        }
        AuthCommands::Callback { url } => {
            let session = store.provider().exchange_redirect(&url).await?;
            let user = User::from(&session.user);
            store.set_user(user.clone());
            output_success(
                &output_format,
                &format!("Signed in as {}", user.display_name),
                Some(json!({ "user": user })),
            )
        }
        AuthCommands::Logout => {
            store.restore_session().await;
            match store.logout().await {
                Ok(()) => output_success(&output_format, "Signed out", None),
                Err(e) => output_warning(
                    &output_format,
                    &format!("Signed out locally, but the provider sign-out failed: {}", e),
                ),
            }
        }
        AuthCommands::Status => {
            store.restore_session().await;
            match (store.user(), &output_format) {
                (Some(user), OutputFormat::Json) => {
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&json!({ "authenticated": true, "user": user }))?
                    );
                }
                (Some(user), OutputFormat::Text) => {
                    println!("Signed in as {} <{}>", user.display_name, user.email);
                    println!("User ID: {}", user.id);
                }
                (None, OutputFormat::Json) => {
                    println!("{}", serde_json::to_string_pretty(&json!({ "authenticated": false }))?);
                }
                (None, OutputFormat::Text) => {
                    println!("Not signed in");
                }
            }
            Ok(())
        }
    }
}
