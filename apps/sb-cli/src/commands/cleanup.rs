// cleanup.rs — Remove snapshots and tokens orphaned by deleted shadows.

use std::collections::BTreeSet;

use sb_store::{ConfigStore, CredentialStore, SnapshotStore, StateLayout};

use super::confirm;

pub fn run(layout: &StateLayout, yes: bool) -> anyhow::Result<()> {
    let configs = ConfigStore::new(layout.config_dir())?;
    let credentials = CredentialStore::new(layout.tokens_dir())?;
    let snapshots = SnapshotStore::new(layout.snapshots_dir())?;

    let known: BTreeSet<String> = configs.known_shadows()?.into_iter().collect();

    let orphan_snapshots: Vec<String> = snapshots
        .known_shadows()?
        .into_iter()
        .filter(|name| !known.contains(name))
        .collect();
    let orphan_tokens: Vec<String> = credentials
        .known_shadows()?
        .into_iter()
        .filter(|name| !known.contains(name))
        .collect();

    if orphan_snapshots.is_empty() && orphan_tokens.is_empty() {
        println!("Nothing to clean up.");
        return Ok(());
    }

    for name in &orphan_snapshots {
        println!("orphaned snapshot: {name}");
    }
    for name in &orphan_tokens {
        println!("orphaned token:    {name}");
    }

    if !yes && !confirm("Remove these?")? {
        println!("Cleanup cancelled.");
        return Ok(());
    }

    for name in &orphan_snapshots {
        snapshots.discard(name)?;
    }
    for name in &orphan_tokens {
        credentials.delete(name)?;
    }
    println!(
        "Removed {} snapshot(s) and {} token(s).",
        orphan_snapshots.len(),
        orphan_tokens.len()
    );
    Ok(())
}
