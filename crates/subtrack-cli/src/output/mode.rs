use crate::cli::Commands;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum OutputMode {
    Text,
    Json,
}

impl OutputMode {
    const fn from_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Text }
    }
}

pub fn mode_for_command(command: &Commands) -> OutputMode {
    match command {
        Commands::Detect { json, .. }
        | Commands::SuggestGroups { json, .. }
        | Commands::InitConfig { json, .. }
        | Commands::Sources { json } => OutputMode::from_flag(*json),
    }
}
