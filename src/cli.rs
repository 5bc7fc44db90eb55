use clap::Parser;

#[derive(Parser)]
#[command(name = "whatsdev")]
#[command(version)]
#[command(about = "WhatsDev - WhatsApp Web in a desktop window with tray and notifications")]
pub struct Cli {
    /// Start in the tray without showing the window
    #[arg(long)]
    pub hidden: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Cli {
    /// Parse process arguments. Unknown arguments (e.g. forwarded by a second
    /// instance launcher) are ignored rather than aborting startup.
    pub fn from_env() -> Self {
        Cli::try_parse().unwrap_or_else(|e| {
            if matches!(
                e.kind(),
                clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion
            ) {
                e.exit();
            }
            eprintln!("Ignoring arguments: {}", e);
            Cli {
                hidden: false,
                verbose: false,
            }
        })
    }
}
