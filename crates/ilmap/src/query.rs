use fnv::{FnvHashMap, FnvHashSet};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::sync::Arc;

use crate::fasta::Fasta;
use crate::matcher::PatternIndex;
use crate::peptide::Peptide;
use crate::variant::{VariantGenerator, DEFAULT_MAX_AMBIGUOUS};
use crate::Error;

#[derive(Deserialize, Serialize, Clone, Debug)]
pub struct EngineBuilder {
    /// Maximum number of I/L positions expanded per peptide
    pub max_ambiguous: Option<usize>,
    /// Reject peptides containing non-amino-acid characters
    pub strict_alphabet: Option<bool>,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            max_ambiguous: Some(DEFAULT_MAX_AMBIGUOUS),
            strict_alphabet: Some(false),
        }
    }
}

impl EngineBuilder {
    pub fn make_parameters(self) -> Parameters {
        Parameters {
            max_ambiguous: self.max_ambiguous.unwrap_or(DEFAULT_MAX_AMBIGUOUS),
            strict_alphabet: self.strict_alphabet.unwrap_or(false),
        }
    }
}

#[derive(Serialize, Copy, Clone, Debug)]
pub struct Parameters {
    pub max_ambiguous: usize,
    pub strict_alphabet: bool,
}

impl Parameters {
    pub fn build(&self, sequences: Vec<String>) -> Result<QueryEngine, Error> {
        QueryEngine::new(
            sequences,
            &VariantGenerator::new(self.max_ambiguous),
            self.strict_alphabet,
        )
    }
}

/// A named set of protein records to search against
pub struct ReferenceDatabase {
    pub name: String,
    pub fasta: Fasta,
}

/// Where one peptide was found in one database
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PeptideResult {
    /// Accessions of proteins containing the peptide verbatim
    pub canonical: BTreeSet<Arc<String>>,
    /// Accessions of proteins containing an I/L variant but not the peptide
    pub substitution: BTreeSet<Arc<String>>,
}

/// A peptide that was dropped from the batch, and why
#[derive(Debug)]
pub struct SkippedPeptide {
    pub sequence: String,
    pub error: Error,
}

pub struct DatabaseReport {
    pub name: String,
    /// One entry per engine peptide, in peptide order
    pub results: Vec<PeptideResult>,
}

/// Batch search engine: validated peptides, their pooled variant patterns,
/// and the automaton built over the pool.
///
/// Validation and expansion failures never abort the batch - the offending
/// peptides are recorded in `skipped` and the rest proceed.
pub struct QueryEngine {
    peptides: Vec<Peptide>,
    index: PatternIndex,
    /// peptide string -> index into `peptides`
    canonical: FnvHashMap<String, usize>,
    /// variant string -> indices of every peptide that produced it
    ///
    /// Provenance is tracked here explicitly instead of re-deriving it from
    /// the string: a variant may coincide with another peptide (or another
    /// peptide's variant) without merging their results.
    provenance: FnvHashMap<String, Vec<usize>>,
    skipped: Vec<SkippedPeptide>,
}

impl QueryEngine {
    pub fn new(
        sequences: Vec<String>,
        generator: &VariantGenerator,
        strict: bool,
    ) -> Result<QueryEngine, Error> {
        let mut seen = FnvHashSet::default();
        let sequences: Vec<String> = sequences
            .into_iter()
            .filter(|s| seen.insert(s.clone()))
            .collect();

        let expanded: Vec<Result<(Peptide, FnvHashSet<String>), Error>> = sequences
            .par_iter()
            .map(|sequence| {
                let peptide = Peptide::new(sequence.clone(), strict)?;
                let variants = generator.expand(&peptide)?;
                Ok((peptide, variants))
            })
            .collect();

        let mut peptides = Vec::new();
        let mut canonical = FnvHashMap::default();
        let mut provenance: FnvHashMap<String, Vec<usize>> = FnvHashMap::default();
        let mut pool = Vec::new();
        let mut skipped = Vec::new();

        for (sequence, outcome) in sequences.into_iter().zip(expanded) {
            match outcome {
                Ok((peptide, variants)) => {
                    let idx = peptides.len();
                    canonical.insert(peptide.as_str().to_string(), idx);
                    pool.push(peptide.as_str().to_string());
                    for variant in variants {
                        pool.push(variant.clone());
                        provenance.entry(variant).or_default().push(idx);
                    }
                    peptides.push(peptide);
                }
                Err(error) => skipped.push(SkippedPeptide { sequence, error }),
            }
        }

        let index = PatternIndex::build(pool)?;

        Ok(QueryEngine {
            peptides,
            index,
            canonical,
            provenance,
            skipped,
        })
    }

    pub fn peptides(&self) -> &[Peptide] {
        &self.peptides
    }

    pub fn skipped(&self) -> &[SkippedPeptide] {
        &self.skipped
    }

    /// Number of distinct patterns in the pooled index
    pub fn patterns(&self) -> usize {
        self.index.len()
    }

    /// Scan one database, returning one result per peptide in peptide order.
    ///
    /// Protein records are partitioned across workers; each worker folds
    /// matches into its own accumulator and the partial results are merged by
    /// set union, which commutes - worker scheduling cannot change the
    /// outcome. An empty database yields empty results for every peptide.
    pub fn search(&self, fasta: &Fasta) -> Vec<PeptideResult> {
        let accumulator = fasta
            .proteins
            .par_iter()
            .fold(
                || MatchAccumulator::new(self.peptides.len()),
                |acc, (accession, sequence)| self.fold_protein(acc, accession, sequence),
            )
            .reduce(
                || MatchAccumulator::new(self.peptides.len()),
                MatchAccumulator::merge,
            );

        let mut results = accumulator.results;
        // Dedup by accession: a protein matched canonically never also
        // counts as a substitution match. Applied after the full merge so
        // partitioning cannot affect it.
        for result in &mut results {
            let PeptideResult {
                canonical,
                substitution,
            } = result;
            substitution.retain(|accession| !canonical.contains(accession));
        }
        results
    }

    fn fold_protein(
        &self,
        mut acc: MatchAccumulator,
        accession: &Arc<String>,
        sequence: &str,
    ) -> MatchAccumulator {
        for id in self.index.matches(sequence) {
            let pattern = self.index.pattern(id);
            if let Some(&idx) = self.canonical.get(pattern) {
                acc.results[idx].canonical.insert(accession.clone());
            }
            if let Some(sources) = self.provenance.get(pattern) {
                for &idx in sources {
                    acc.results[idx].substitution.insert(accession.clone());
                }
            }
        }
        acc
    }

    /// Search every database independently, in input order. Matches in one
    /// database never appear in another's report.
    pub fn query(&self, databases: &[ReferenceDatabase]) -> Vec<DatabaseReport> {
        databases
            .iter()
            .map(|database| DatabaseReport {
                name: database.name.clone(),
                results: self.search(&database.fasta),
            })
            .collect()
    }
}

struct MatchAccumulator {
    results: Vec<PeptideResult>,
}

impl MatchAccumulator {
    fn new(peptides: usize) -> Self {
        Self {
            results: vec![PeptideResult::default(); peptides],
        }
    }

    fn merge(mut self, other: Self) -> Self {
        for (into, from) in self.results.iter_mut().zip(other.results) {
            into.canonical.extend(from.canonical);
            into.substitution.extend(from.substitution);
        }
        self
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn engine(sequences: &[&str]) -> QueryEngine {
        QueryEngine::new(
            sequences.iter().map(|s| s.to_string()).collect(),
            &VariantGenerator::default(),
            false,
        )
        .unwrap()
    }

    fn fasta(proteins: &[(&str, &str)]) -> Fasta {
        Fasta {
            proteins: proteins
                .iter()
                .map(|(acc, seq)| (Arc::new(acc.to_string()), seq.to_string()))
                .collect(),
        }
    }

    fn accessions(set: &BTreeSet<Arc<String>>) -> Vec<&str> {
        set.iter().map(|a| a.as_str()).collect()
    }

    #[test]
    fn canonical_match() {
        let engine = engine(&["ILG"]);
        let results = engine.search(&fasta(&[("P1", "XILGY")]));
        assert_eq!(accessions(&results[0].canonical), vec!["P1"]);
        assert!(results[0].substitution.is_empty());
    }

    #[test]
    fn substitution_only_match() {
        let engine = engine(&["ILG"]);
        let results = engine.search(&fasta(&[("P2", "XLIGY")]));
        assert!(results[0].canonical.is_empty());
        assert_eq!(accessions(&results[0].substitution), vec!["P2"]);
    }

    #[test]
    fn unambiguous_peptide_never_substitutes() {
        let engine = engine(&["AAA"]);
        let results = engine.search(&fasta(&[
            ("P1", "XAAAY"),
            ("P2", "GAAAG"),
            ("P3", "ILGILG"),
        ]));
        assert_eq!(accessions(&results[0].canonical), vec!["P1", "P2"]);
        assert!(results[0].substitution.is_empty());
    }

    #[test]
    fn canonical_wins_over_substitution() {
        // P1 contains the peptide itself and a variant; the accession must
        // only be credited canonically
        let engine = engine(&["ILG"]);
        let results = engine.search(&fasta(&[("P1", "XILGYLIGX")]));
        assert_eq!(accessions(&results[0].canonical), vec!["P1"]);
        assert!(results[0].substitution.is_empty());
    }

    #[test]
    fn multiple_variants_dedup_by_accession() {
        // LIG and LLG both occur in P1; one substitution entry results
        let engine = engine(&["IIG"]);
        let results = engine.search(&fasta(&[("P1", "XLIGXLLGX")]));
        assert!(results[0].canonical.is_empty());
        assert_eq!(accessions(&results[0].substitution), vec!["P1"]);
    }

    #[test]
    fn variant_collision_keeps_provenance_apart() {
        // LIG is both a peptide in its own right and a variant of ILG
        let engine = engine(&["ILG", "LIG"]);
        let results = engine.search(&fasta(&[("P1", "XLIGY")]));

        let ilg = &results[0];
        assert!(ilg.canonical.is_empty());
        assert_eq!(accessions(&ilg.substitution), vec!["P1"]);

        let lig = &results[1];
        assert_eq!(accessions(&lig.canonical), vec!["P1"]);
        assert!(lig.substitution.is_empty());
    }

    #[test]
    fn databases_stay_independent() {
        let engine = engine(&["ILG"]);
        let databases = vec![
            ReferenceDatabase {
                name: "canonical_proteome".into(),
                fasta: fasta(&[("P1", "XILGY")]),
            },
            ReferenceDatabase {
                name: "extra_fasta".into(),
                fasta: fasta(&[("P2", "XLIGY")]),
            },
        ];
        let reports = engine.query(&databases);
        assert_eq!(reports.len(), 2);
        assert_eq!(accessions(&reports[0].results[0].canonical), vec!["P1"]);
        assert!(reports[0].results[0].substitution.is_empty());
        assert!(reports[1].results[0].canonical.is_empty());
        assert_eq!(accessions(&reports[1].results[0].substitution), vec!["P2"]);
    }

    #[test]
    fn empty_database_yields_empty_results() {
        let engine = engine(&["ILG", "AAA"]);
        let results = engine.search(&fasta(&[]));
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.canonical.is_empty() && r.substitution.is_empty()));
    }

    #[test]
    fn invalid_peptides_are_isolated() {
        let engine = QueryEngine::new(
            vec!["ILG".into(), "".into(), "ILILILILIL".into()],
            &VariantGenerator::new(4),
            false,
        )
        .unwrap();

        assert_eq!(engine.peptides().len(), 1);
        assert_eq!(engine.skipped().len(), 2);
        assert!(matches!(engine.skipped()[0].error, Error::EmptyPeptide));
        assert!(matches!(
            engine.skipped()[1].error,
            Error::VariantExplosion { .. }
        ));

        // the surviving peptide still searches
        let results = engine.search(&fasta(&[("P1", "XILGY")]));
        assert_eq!(accessions(&results[0].canonical), vec!["P1"]);
    }

    #[test]
    fn duplicate_input_peptides_collapse() {
        let engine = engine(&["ILG", "ILG", "AAA"]);
        assert_eq!(engine.peptides().len(), 2);
    }

    #[test]
    fn query_is_idempotent() {
        let engine = engine(&["ILG", "AAA", "KILLER"]);
        let database = fasta(&[("P1", "XILGY"), ("P2", "XLIGY"), ("P3", "AKILLERA")]);
        assert_eq!(engine.search(&database), engine.search(&database));
    }

    #[test]
    fn partitioned_search_merges_to_whole() {
        let engine = engine(&["ILG", "AAA"]);
        let whole = fasta(&[("P1", "XILGY"), ("P2", "XLIGY"), ("P3", "AAAX")]);
        let left = fasta(&[("P1", "XILGY"), ("P3", "AAAX")]);
        let right = fasta(&[("P2", "XLIGY")]);

        let mut merged = engine.search(&left);
        for (into, from) in merged.iter_mut().zip(engine.search(&right)) {
            into.canonical.extend(from.canonical);
            into.substitution.extend(from.substitution);
        }

        assert_eq!(merged, engine.search(&whole));
    }
}
