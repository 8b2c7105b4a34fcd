use clap::{Subcommand, ValueEnum};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the stored record, populating it from the providers on first request
    Get {
        /// Repository identifier, e.g. github.com/Shopify/sarama
        identifier: String,

        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        format: OutputFormat,
    },

    /// Report whether a record is stored, without populating it
    Exists { identifier: String },
}
