use anyhow::{bail, ensure, Context};
use fnv::FnvHashSet;
use regex::Regex;

/// Read peptide sequences from the PSM table of a de novo mzTab report.
///
/// The table header is the `PSH` row and data rows start with `PSM`; only
/// the `sequence` column is consumed. Sequences are cleaned of everything
/// that is not an uppercase letter (modification masses, terminal
/// annotations) and deduplicated in first-seen order.
pub fn read_peptides<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Vec<String>> {
    let contents = std::fs::read_to_string(&path).with_context(|| {
        format!(
            "Failed to read mzTab from `{}`",
            path.as_ref().display()
        )
    })?;
    peptides_from_str(&contents)
}

pub fn peptides_from_str(contents: &str) -> anyhow::Result<Vec<String>> {
    let clean = Regex::new(r"[^A-Z]").expect("static regex");
    let mut column = None;
    let mut seen = FnvHashSet::default();
    let mut peptides = Vec::new();

    for line in contents.lines() {
        let fields: Vec<&str> = line.split('\t').collect();
        match fields.first() {
            Some(&"PSH") => {
                column = fields.iter().position(|f| *f == "sequence");
                ensure!(column.is_some(), "mzTab PSH header has no `sequence` column");
            }
            Some(&"PSM") => {
                let col = match column {
                    Some(col) => col,
                    None => bail!("mzTab PSM row found before the PSH header"),
                };
                let raw = fields.get(col).copied().unwrap_or_default();
                let cleaned = clean.replace_all(raw, "").into_owned();
                if seen.insert(cleaned.clone()) {
                    peptides.push(cleaned);
                }
            }
            _ => {}
        }
    }

    ensure!(column.is_some(), "no PSH header row found in mzTab input");
    Ok(peptides)
}
