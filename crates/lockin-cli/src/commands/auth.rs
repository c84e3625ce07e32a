use clap::Subcommand;
use lockin_core::integrations::{canvas, keyring_store};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Store the Canvas API token in the OS keyring
    Canvas {
        /// Canvas API token
        token: String,
    },
    /// Remove the stored Canvas token
    Clear,
    /// Show whether a Canvas token is stored
    Status,
}

pub fn run(action: AuthAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        AuthAction::Canvas { token } => {
            keyring_store::set(canvas::TOKEN_KEY, &token)?;
            println!("canvas token stored");
        }
        AuthAction::Clear => {
            keyring_store::delete(canvas::TOKEN_KEY)?;
            println!("canvas token removed");
        }
        AuthAction::Status => {
            let stored = keyring_store::get(canvas::TOKEN_KEY)?.is_some();
            println!(
                "canvas: {}",
                if stored { "token stored" } else { "no token" }
            );
        }
    }
    Ok(())
}
