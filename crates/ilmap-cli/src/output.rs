use ilmap_core::query::{DatabaseReport, PeptideResult};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::Runner;

impl Runner {
    pub fn serialize_row(
        &self,
        peptide: &str,
        database: &str,
        result: &PeptideResult,
    ) -> csv::ByteRecord {
        let mut record = csv::ByteRecord::new();
        record.push_field(peptide.as_bytes());
        record.push_field(database.as_bytes());
        record.push_field(bool_field(!result.canonical.is_empty()));
        record.push_field(join_accessions(&result.canonical).as_bytes());
        record.push_field(bool_field(!result.substitution.is_empty()));
        record.push_field(join_accessions(&result.substitution).as_bytes());
        record.push_field(itoa::Buffer::new().format(result.canonical.len()).as_bytes());
        record.push_field(
            itoa::Buffer::new()
                .format(result.substitution.len())
                .as_bytes(),
        );
        record
    }

    pub fn write_report(&self, reports: &[DatabaseReport]) -> anyhow::Result<String> {
        let path = self.make_path("ilmap.csv");

        let mut wtr = csv::WriterBuilder::new().from_writer(vec![]);

        let headers = csv::ByteRecord::from(vec![
            "peptide",
            "database",
            "canonical_match",
            "canonical_proteins",
            "substitution_match",
            "substitution_proteins",
            "n_canonical",
            "n_substitution",
        ]);
        wtr.write_byte_record(&headers)?;

        for report in reports {
            let records = self
                .engine
                .peptides()
                .par_iter()
                .zip(report.results.par_iter())
                .map(|(peptide, result)| self.serialize_row(peptide.as_str(), &report.name, result))
                .collect::<Vec<_>>();

            for record in records {
                wtr.write_byte_record(&record)?;
            }
        }

        wtr.flush()?;
        let bytes = wtr.into_inner()?;
        std::fs::write(&path, bytes)?;
        Ok(path.display().to_string())
    }
}

fn bool_field(value: bool) -> &'static [u8] {
    match value {
        true => b"true",
        false => b"false",
    }
}

fn join_accessions(accessions: &BTreeSet<Arc<String>>) -> String {
    accessions
        .iter()
        .map(|a| a.as_str())
        .collect::<Vec<_>>()
        .join(";")
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn accessions_join_in_order() {
        let set: BTreeSet<Arc<String>> = ["sp|B", "sp|A"]
            .into_iter()
            .map(|a| Arc::new(a.to_string()))
            .collect();
        assert_eq!(join_accessions(&set), "sp|A;sp|B");
        assert_eq!(join_accessions(&BTreeSet::new()), "");
    }
}
