use anyhow::Result;
use odev_config::{ConfigContext, MergedProfiles, load_and_merge_profiles};
use odev_core::{Profile, Reporter};

pub fn handle_profiles(reporter: &dyn Reporter) -> Result<()> {
    let ctx = ConfigContext::from_env()?;
    let merged = load_and_merge_profiles(&ctx, reporter)?;
    if merged.is_empty() {
        reporter.info("No profiles found.");
        return Ok(());
    }
    print!("{}", render_profiles(&merged));
    Ok(())
}

/// One block per profile, in merge order.
pub fn render_profiles(merged: &MergedProfiles) -> String {
    let mut out = String::new();
    for entry in merged.iter() {
        out.push_str(&format!("{}  ({})\n", entry.name, entry.source.display()));
        out.push_str(&format!("  {}\n", summary(&entry.profile)));
    }
    out
}

fn summary(profile: &Profile) -> String {
    let version = profile
        .version
        .map(|v| v.to_string())
        .unwrap_or_else(|| "-".to_string());
    let modules = profile
        .modules
        .as_ref()
        .map(|m| m.join(","))
        .unwrap_or_else(|| "-".to_string());
    let mut line = format!("version {version}, modules {modules}");
    if let Some(db) = &profile.db {
        line.push_str(&format!(", db {db}"));
    }
    if profile.enterprise == Some(true) {
        line.push_str(", enterprise");
    }
    line
}
