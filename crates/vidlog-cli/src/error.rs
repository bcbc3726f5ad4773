//! CLI argument errors that the core does not know about.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CliError {
    #[error("unknown setting '{0}' (try vim_motions, theme, api_key, backup_repo, auto_sync)")]
    UnknownSetting(String),

    #[error("unknown theme '{theme}' (expected one of: {known})")]
    UnknownTheme { theme: String, known: String },

    #[error("invalid value '{value}' for {key}: expected true or false")]
    InvalidBool { key: String, value: String },

    #[error("nothing to change: pass at least one field to edit")]
    EmptyEdit,
}
