use anyhow::Context;
use ilmap_core::query::{DatabaseReport, QueryEngine, ReferenceDatabase};
use log::info;
use std::path::PathBuf;
use std::time::Instant;

use super::input::Search;

pub struct Runner {
    pub engine: QueryEngine,
    pub parameters: Search,
    start: Instant,
}

impl Runner {
    pub fn new(parameters: Search) -> anyhow::Result<Self> {
        let start = Instant::now();

        let sequences = crate::mztab::read_peptides(&parameters.mztab)
            .with_context(|| format!("Failed to read peptides from `{}`", parameters.mztab))?;
        info!(
            "read {} distinct peptide sequences from {}",
            sequences.len(),
            parameters.mztab
        );

        let engine = parameters.engine.build(sequences)?;
        for skipped in engine.skipped() {
            log::warn!("skipping peptide `{}`: {}", skipped.sequence, skipped.error);
        }
        info!(
            "- indexed {} patterns from {} peptides in {} ms",
            engine.patterns(),
            engine.peptides().len(),
            start.elapsed().as_millis()
        );

        Ok(Runner {
            engine,
            parameters,
            start,
        })
    }

    pub fn run(self) -> anyhow::Result<()> {
        let databases = self.load_databases()?;

        let search_start = Instant::now();
        let reports: Vec<DatabaseReport> = self.engine.query(&databases);
        info!("- search:  {:8} ms", search_start.elapsed().as_millis());

        for report in &reports {
            let canonical = report.results.iter().filter(|r| !r.canonical.is_empty()).count();
            let substitution = report
                .results
                .iter()
                .filter(|r| r.canonical.is_empty() && !r.substitution.is_empty())
                .count();
            info!(
                "- {}: {} peptides matched verbatim, {} only after I/L reassignment",
                report.name, canonical, substitution
            );
        }

        let path = self.write_report(&reports)?;
        info!("wrote {}", path);

        let json_path = self.make_path("results.json");
        std::fs::write(&json_path, serde_json::to_string_pretty(&self.parameters)?)?;

        info!("finished in {}s", self.start.elapsed().as_secs());
        Ok(())
    }

    pub fn make_path(&self, filename: &str) -> PathBuf {
        self.parameters.output_directory.join(filename)
    }

    fn load_databases(&self) -> anyhow::Result<Vec<ReferenceDatabase>> {
        let io = Instant::now();
        let mut databases = Vec::new();

        let fasta = ilmap_core::read_fasta(&self.parameters.canonical_proteome)
            .with_context(|| {
                format!(
                    "Failed to read FASTA from `{}`",
                    self.parameters.canonical_proteome
                )
            })?;
        info!("- canonical_proteome: {} protein records", fasta.proteins.len());
        databases.push(ReferenceDatabase {
            name: "canonical_proteome".into(),
            fasta,
        });

        if let Some(ref path) = self.parameters.extra_fasta {
            let fasta = ilmap_core::read_fasta(path)
                .with_context(|| format!("Failed to read FASTA from `{}`", path))?;
            info!("- extra_fasta: {} protein records", fasta.proteins.len());
            databases.push(ReferenceDatabase {
                name: "extra_fasta".into(),
                fasta,
            });
        }

        info!("- file IO: {:8} ms", io.elapsed().as_millis());
        Ok(databases)
    }
}
