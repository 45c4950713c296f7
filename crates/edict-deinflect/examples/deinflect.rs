use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use edict_deinflect::RuleTable;

fn main() -> Result<()> {
    let mut args = env::args().skip(1);
    let rules_path = args.next().map(PathBuf::from).context(
        "usage: cargo run -p edict-deinflect --example deinflect -- <deinflect.dat> <word>...",
    )?;
    let words: Vec<String> = args.collect();
    if words.is_empty() {
        bail!("usage: cargo run -p edict-deinflect --example deinflect -- <deinflect.dat> <word>...");
    }

    let rules = RuleTable::load(&rules_path)
        .with_context(|| format!("loading rules from {}", rules_path.display()))?;
    println!(
        "Rules: {} ({} reasons)",
        rules.rule_count(),
        rules.reason_count()
    );

    for word in words {
        println!("\nSurface: {}", word);
        for candidate in rules.deinflect(&word) {
            if candidate.reasons.is_empty() {
                println!("  {:<12} [{:?}]", candidate.word, candidate.classes);
            } else {
                println!(
                    "  {:<12} [{:?}] via {}",
                    candidate.word,
                    candidate.classes,
                    candidate.reasons.join(" ")
                );
            }
        }
    }

    Ok(())
}
