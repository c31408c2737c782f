use crate::categorizer;
use crate::cleaner;
use crate::config::Config;
use crate::dataset;
use crate::error::Result;
use crate::loader;
use crate::merger;
use crate::rules::RuleSet;

pub enum RunOutcome {
    /// Nothing to add; the output file was not touched.
    NoNewOperations,
    Persisted {
        added: usize,
        total: usize,
        categorized: usize,
        uncategorized: usize,
    },
}

/// One pipeline run: load existing → load raw → clean → deduplicate →
/// categorize → merge → persist. Straight-line and unretried; any error
/// aborts before the output file is rewritten.
pub fn run(config: &Config) -> Result<RunOutcome> {
    let existing = dataset::load(&config.output_final, config)?;

    let raw = loader::load_folder(config)?;
    if raw.is_empty() {
        return Ok(RunOutcome::NoNewOperations);
    }

    let cleaned = cleaner::clean(raw, config)?;
    let mut fresh = merger::new_rows(cleaned, &existing, config)?;
    if fresh.is_empty() {
        return Ok(RunOutcome::NoNewOperations);
    }

    let rules = RuleSet::load(&config.rules_file)?;
    let summary = categorizer::categorize(&mut fresh, &rules);

    let added = fresh.len();
    let mut combined = existing;
    combined.extend(fresh);
    dataset::sort_by_date(&mut combined);
    dataset::write(&config.output_final, &combined, config)?;

    Ok(RunOutcome::Persisted {
        added,
        total: combined.len(),
        categorized: summary.matched,
        uncategorized: summary.unmatched,
    })
}
