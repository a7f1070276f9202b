use std::path::PathBuf;

use clap::Subcommand;
use zonetune_core::{HRZone, UserSettings};

const DEFAULT_PATH: &str = "zonetune.toml";

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Print the settings file (or the defaults if none exists)
    Show {
        #[arg(long, default_value = DEFAULT_PATH)]
        path: PathBuf,
    },
    /// Write a default settings file for a user of the given age
    Init {
        /// User age, used to estimate maximum heart rate
        #[arg(long)]
        age: u32,
        #[arg(long, default_value = DEFAULT_PATH)]
        path: PathBuf,
    },
}

pub fn run(action: ConfigAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ConfigAction::Show { path } => {
            let settings = load_or_default(&path)?;
            println!("{}", toml::to_string_pretty(&settings)?);
            if let Some(zone) = HRZone::by_id(settings.selected_zone_id) {
                let range = zone.bpm_range(settings.max_heart_rate);
                println!("# target: {}-{} bpm", range.lower_bpm, range.upper_bpm);
            }
        }
        ConfigAction::Init { age, path } => {
            let settings = UserSettings::default_for_age(age);
            std::fs::write(&path, toml::to_string_pretty(&settings)?)?;
            println!("wrote {}", path.display());
        }
    }
    Ok(())
}

pub fn load_or_default(path: &PathBuf) -> Result<UserSettings, Box<dyn std::error::Error>> {
    if path.exists() {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    } else {
        Ok(UserSettings::default_for_age(30))
    }
}
