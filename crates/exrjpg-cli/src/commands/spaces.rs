//! OCIO config inspection command

use super::load_config;
use crate::SpacesArgs;
use anyhow::Result;
use exrjpg_core::{InputSpace, OutputSpace};
use exrjpg_ocio::Config;

pub fn run(args: SpacesArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;

    let name = if config.name().is_empty() { "(unnamed)" } else { config.name() };
    println!("Config: {} ({:?})", name, config.version());
    println!("Working dir: {}", config.working_dir().display());

    println!("\nColor spaces ({}):", config.colorspaces().len());
    for cs in config.colorspaces() {
        let mut line = format!("  {}", cs.name());
        if !cs.family().is_empty() {
            line += &format!("  [{}]", cs.family());
        }
        if !cs.aliases().is_empty() {
            line += &format!("  aliases: {}", cs.aliases().join(", "));
        }
        if cs.is_data() {
            line += "  (data)";
        }
        println!("{}", line);
    }

    if !config.roles().is_empty() {
        println!("\nRoles:");
        for (role, cs) in config.roles().iter() {
            println!("  {:<20} {}", role, cs);
        }
    }

    let displays = config.displays().displays();
    if !displays.is_empty() {
        println!("\nDisplays:");
        for display in displays {
            let views: Vec<_> = display.views().iter().map(|v| v.name()).collect();
            println!("  {}: {}", display.name(), views.join(", "));
        }
    }

    println!("\nexrjpg transforms:");
    for (output, ok) in required_spaces(&config) {
        println!("  ACEScg -> {:<8} {}", output.label(), if ok { "ok" } else { "missing" });
    }
    Ok(())
}

/// Whether the config resolves each ACEScg conversion the converter uses.
fn required_spaces(config: &Config) -> Vec<(OutputSpace, bool)> {
    let src = InputSpace::AcesCg.ocio_name().unwrap_or_default();
    OutputSpace::ALL
        .iter()
        .map(|&out| (out, config.processor(src, out.ocio_name()).is_ok()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn reports_missing_output_spaces() {
        let yaml = "ocio_profile_version: 1\ncolorspaces:\n  - !<ColorSpace>\n    name: ACES - ACEScg\n  - !<ColorSpace>\n    name: Output - sRGB\n";
        let config = Config::from_yaml_str(yaml, PathBuf::from(".")).unwrap();
        let status = required_spaces(&config);
        assert!(status.contains(&(OutputSpace::Srgb, true)));
        assert!(status.contains(&(OutputSpace::Rec709, false)));
    }
}
