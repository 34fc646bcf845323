use clap::{Args, Subcommand};

use bakul_tani_core::{AccountRegistry, Action, Theme, UserPatch};

use super::OutputFormat;
use crate::session::Session;

#[derive(Args)]
pub struct ProfileCommand {
    #[command(subcommand)]
    pub command: ProfileSubcommand,
}

#[derive(Subcommand)]
pub enum ProfileSubcommand {
    /// Show the current profile
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update profile fields
    Update {
        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        email: Option<String>,

        #[arg(long)]
        position: Option<String>,

        /// Profile picture URL or data URI
        #[arg(long)]
        picture: Option<String>,
    },

    /// Set the color theme
    Theme {
        /// light or dark
        theme: Theme,
    },

    /// Sign out (inventory data stays on this device)
    Logout,
}

impl ProfileCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let state = session.state();

        match &self.command {
            ProfileSubcommand::Show { format } => {
                match format {
                    OutputFormat::Json => {
                        let value = serde_json::json!({
                            "user": state.user,
                            "isLoggedIn": state.is_logged_in,
                            "theme": state.theme,
                        });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", state.user);
                        println!(
                            "  signed in: {}",
                            if state.is_logged_in { "yes" } else { "no" }
                        );
                        println!("  theme:     {}", state.theme);
                    }
                }
                Ok(())
            }

            ProfileSubcommand::Update {
                name,
                email,
                position,
                picture,
            } => {
                let patch = UserPatch {
                    name: name.clone(),
                    email: email.clone(),
                    position: position.clone(),
                    profile_picture: picture.clone(),
                };
                if patch == UserPatch::default() {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let registry = AccountRegistry::new(session.files().clone());
                session.dispatch_all(registry.update_profile(&state.user, patch)?)?;
                println!("{}", session.state().user);
                Ok(())
            }

            ProfileSubcommand::Theme { theme } => {
                session.dispatch(Action::SetTheme(*theme))?;
                println!("Theme set to {}", theme);
                Ok(())
            }

            ProfileSubcommand::Logout => {
                if !state.is_logged_in {
                    println!("Not signed in");
                    return Ok(());
                }
                session.dispatch(Action::Logout)?;
                println!("Signed out");
                Ok(())
            }
        }
    }
}
