// mirror.rs — Diff and promote subcommands.

use sb_gateway::Gateway;
use sb_store::StateLayout;

use super::confirm;
use crate::compose_backend;

pub fn diff(layout: &StateLayout, name: &str) -> anyhow::Result<()> {
    let gateway = Gateway::from_saved_config(name, compose_backend(layout)?, layout)?;
    let report = gateway.diff()?;
    println!("{report}");
    Ok(())
}

pub fn promote(layout: &StateLayout, name: &str, force: bool) -> anyhow::Result<()> {
    let gateway = Gateway::from_saved_config(name, compose_backend(layout)?, layout)?;

    // Promote is a full overwrite of the host workspace, so always
    // show what it will apply before asking.
    let report = gateway.diff()?;
    if report.is_clean() {
        println!("No changes to promote.");
        return Ok(());
    }
    println!("{report}");
    println!();

    if !force {
        let prompt = format!(
            "Overwrite {} with these changes?",
            gateway.workspace_path().display()
        );
        if !confirm(&prompt)? {
            println!("Promotion cancelled.");
            return Ok(());
        }
    }

    let result = gateway.promote()?;
    println!("{}", result.stdout);
    Ok(())
}
