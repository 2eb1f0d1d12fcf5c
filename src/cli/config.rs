use crate::cli::{ConfigCommand, Result};
use crate::config::CodecConfig;

pub fn config(command: ConfigCommand) -> Result<()> {
    match command {
        ConfigCommand::Save { output, format, force } => {
            let config = CodecConfig::default().with_overrides(format, force);
            config.save_to_file(&output)?;
            println!("saved {} header config to {}", config.header_format, output.display());
            Ok(())
        }
    }
}
