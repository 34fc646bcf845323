use std::io::Read;

use clap::Args;

use bakul_tani_core::Action;

use crate::session::Session;

/// Dispatch a raw JSON action, e.g. '{"type": "SET_THEME", "payload": "light"}'
#[derive(Args)]
pub struct DispatchCommand {
    /// Action JSON, or '-' to read it from stdin
    pub action: String,
}

impl DispatchCommand {
    pub fn run(&self, session: &mut Session) -> Result<(), Box<dyn std::error::Error>> {
        let text = if self.action == "-" {
            let mut input = String::new();
            std::io::stdin().read_to_string(&mut input)?;
            input
        } else {
            self.action.clone()
        };

        let action: Action =
            serde_json::from_str(&text).map_err(|e| format!("Invalid action: {}", e))?;
        let name = action.name();
        if session.dispatch(action)? {
            println!("{}: state updated", name);
        } else {
            println!("{}: no change", name);
        }
        Ok(())
    }
}
