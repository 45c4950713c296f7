use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use edict_db::{Lexicon, LoadMode};
use edict_types::WordClassSet;

fn main() -> Result<()> {
    let path = env::args()
        .nth(1)
        .map(PathBuf::from)
        .context("usage: cargo run -p edict-db --example stats -- <path-to-edict-file>")?;

    let lexicon = Lexicon::load(&path, LoadMode::Mmap)
        .with_context(|| format!("loading dictionary from {}", path.display()))?;

    println!("Dictionary: {}", path.display());
    println!("Entries      : {}", lexicon.entry_count());
    println!("Surface forms: {}", lexicon.surface_count());

    // Spot-check a few common words to confirm lookup.
    for surface in ["日本", "にほん", "食べる", "する"] {
        let entries = lexicon.lookup(surface);
        println!("'{}': {} entries", surface, entries.len());
        for entry in entries {
            let conjugating = entry.classes != WordClassSet::OTHER;
            println!(
                "  {:?} [{:?}] conjugating={}",
                entry.headwords, entry.readings, conjugating
            );
        }
    }

    Ok(())
}
