pub mod fasta;
pub mod matcher;
pub mod peptide;
pub mod query;
pub mod variant;

#[derive(Debug)]
pub enum Error {
    /// Empty peptide sequence
    EmptyPeptide,
    /// Residue outside the accepted amino acid alphabet (strict mode only)
    InvalidResidue { sequence: String, residue: char },
    /// More I/L positions than the configured expansion limit
    VariantExplosion {
        sequence: String,
        positions: usize,
        limit: usize,
    },
    PatternIndex(aho_corasick::BuildError),
    Io(std::io::Error),
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyPeptide => f.write_str("empty peptide sequence"),
            Self::InvalidResidue { sequence, residue } => {
                write!(f, "peptide `{}` contains invalid residue `{}`", sequence, residue)
            }
            Self::VariantExplosion {
                sequence,
                positions,
                limit,
            } => write!(
                f,
                "peptide `{}` has {} I/L positions, limit is {}",
                sequence, positions, limit
            ),
            Self::PatternIndex(e) => e.fmt(f),
            Self::Io(e) => e.fmt(f),
        }
    }
}

impl std::error::Error for Error {}

pub fn read_fasta<P>(path: P) -> Result<fasta::Fasta, Error>
where
    P: AsRef<std::path::Path>,
{
    let contents = std::fs::read_to_string(path).map_err(Error::Io)?;
    Ok(fasta::Fasta::parse(&contents))
}
