use std::io::{self, BufRead, Write};

use clap::{Args, Subcommand};

use bakul_tani_core::{AccountRegistry, Registration};

use crate::session::Session;

#[derive(Args)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand)]
pub enum AccountSubcommand {
    /// Create an account and sign in
    Register {
        /// Display name
        #[arg(long)]
        name: String,

        #[arg(long)]
        email: String,

        /// Job title (defaults to Staff Gudang)
        #[arg(long)]
        position: Option<String>,

        /// Password (prompted on stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Sign in to an existing account
    Login {
        #[arg(long)]
        email: String,

        /// Password (prompted on stdin when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// List registered accounts on this device
    List,
}

fn read_password(provided: &Option<String>) -> io::Result<String> {
    if let Some(password) = provided {
        return Ok(password.clone());
    }
    print!("Password: ");
    io::stdout().flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

impl AccountCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let registry = AccountRegistry::new(session.files().clone());

        match &self.command {
            AccountSubcommand::Register {
                name,
                email,
                position,
                password,
            } => {
                let registration = Registration {
                    name: name.clone(),
                    email: email.clone(),
                    position: position.clone(),
                    password: read_password(password)?,
                };
                session.dispatch_all(registry.register(registration)?)?;
                println!("Signed in as {}", session.state().user);
                Ok(())
            }

            AccountSubcommand::Login { email, password } => {
                let password = read_password(password)?;
                session.dispatch_all(registry.login(email, &password)?)?;
                println!("Signed in as {}", session.state().user);
                Ok(())
            }

            AccountSubcommand::List => {
                let accounts = registry.accounts()?;
                if accounts.is_empty() {
                    println!("No accounts found");
                    return Ok(());
                }
                for account in &accounts {
                    println!("{:<24}  {:<32}  {}", account.name, account.email, account.position);
                }
                println!("\nTotal: {} account(s)", accounts.len());
                Ok(())
            }
        }
    }
}
