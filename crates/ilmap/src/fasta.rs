use std::sync::Arc;

/// A reference database of named protein sequences
pub struct Fasta {
    pub proteins: Vec<(Arc<String>, String)>,
}

impl Fasta {
    /// Parse FASTA text into protein records. The accession is the first
    /// whitespace-delimited token of the header line; sequence lines are
    /// concatenated verbatim, so any non-residue characters they carry stay
    /// in the record (they simply never match a peptide pattern).
    pub fn parse(contents: &str) -> Fasta {
        let mut proteins = Vec::new();
        let mut last_id = "";
        let mut s = String::new();

        for line in contents.lines() {
            if line.is_empty() {
                continue;
            }
            let line = line.trim();
            if let Some(id) = line.strip_prefix('>') {
                if !s.is_empty() {
                    proteins.push((Arc::new(accession(last_id)), std::mem::take(&mut s)));
                }
                last_id = id;
            } else {
                s.push_str(line);
            }
        }

        if !s.is_empty() {
            proteins.push((Arc::new(accession(last_id)), s));
        }

        Fasta { proteins }
    }
}

fn accession(header: &str) -> String {
    header
        .split_ascii_whitespace()
        .next()
        .unwrap_or_default()
        .to_string()
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn parse_multiline_records() {
        let fasta = Fasta::parse(
            r#"
        >sp|AAAAA some description here
        MEWKLEQSMREQ
        ALLKAQLTQLK
        >sp|BBBBB
        RMEWKLEQSMREQALLKAQLTQLK
        "#,
        );

        assert_eq!(
            fasta.proteins,
            vec![
                (
                    Arc::new("sp|AAAAA".to_string()),
                    "MEWKLEQSMREQALLKAQLTQLK".into()
                ),
                (
                    Arc::new("sp|BBBBB".to_string()),
                    "RMEWKLEQSMREQALLKAQLTQLK".into()
                ),
            ]
        );
    }

    #[test]
    fn empty_input() {
        assert!(Fasta::parse("").proteins.is_empty());
        assert!(Fasta::parse(">header_without_sequence").proteins.is_empty());
    }
}
