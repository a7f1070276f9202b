use clap::Subcommand;
use zonetune_core::HRZone;

#[derive(Subcommand)]
pub enum ZonesAction {
    /// Print the zone table for a maximum heart rate
    List {
        /// Maximum heart rate in bpm
        #[arg(long, default_value = "190")]
        max_hr: u32,
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(action: ZonesAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        ZonesAction::List { max_hr, json } => {
            let zones = HRZone::default_zones();
            if json {
                let rows: Vec<serde_json::Value> = zones
                    .iter()
                    .map(|z| {
                        let range = z.bpm_range(max_hr);
                        serde_json::json!({
                            "id": z.id,
                            "name": z.name,
                            "lower_bpm": range.lower_bpm,
                            "upper_bpm": range.upper_bpm,
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&rows)?);
            } else {
                println!("Zones for max HR {max_hr} bpm:");
                for z in &zones {
                    let range = z.bpm_range(max_hr);
                    println!(
                        "  {}  {:>3.0}-{:>3.0}%  {:>3}-{:>3} bpm",
                        z.name,
                        z.lower_percentage * 100.0,
                        z.upper_percentage * 100.0,
                        range.lower_bpm,
                        range.upper_bpm
                    );
                }
            }
        }
    }
    Ok(())
}
