use anyhow::{ensure, Context};
use clap::ArgMatches;
use ilmap_core::query::{EngineBuilder, Parameters};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Serialize)]
/// Actual run parameters - may include overrides or default values not set by user
pub struct Search {
    pub version: String,
    pub engine: Parameters,
    pub mztab: String,
    pub canonical_proteome: String,
    pub extra_fasta: Option<String>,
    pub output_directory: PathBuf,
}

#[derive(Deserialize)]
/// Input run parameters deserialized from JSON file
pub struct Input {
    engine: Option<EngineBuilder>,
    mztab: Option<String>,
    canonical_proteome: Option<String>,
    extra_fasta: Option<String>,
    output_directory: Option<String>,
}

impl Input {
    pub fn from_arguments(matches: ArgMatches) -> anyhow::Result<Self> {
        let path = matches
            .get_one::<String>("parameters")
            .expect("required parameters");
        let mut input = Input::load(path)
            .with_context(|| format!("Failed to read parameters from `{path}`"))?;

        // Handle JSON configuration overrides
        if let Some(mztab) = matches.get_one::<String>("mztab") {
            log::trace!("overriding `mztab` parameter.");
            input.mztab = Some(mztab.into());
        }
        if let Some(fasta) = matches.get_one::<String>("fasta") {
            log::trace!("overriding `canonical_proteome` parameter.");
            input.canonical_proteome = Some(fasta.into());
        }
        if let Some(extra) = matches.get_one::<String>("extra_fasta") {
            log::trace!("overriding `extra_fasta` parameter.");
            input.extra_fasta = Some(extra.into());
        }
        if let Some(output_directory) = matches.get_one::<String>("output_directory") {
            log::trace!("overriding `output_directory` parameter.");
            input.output_directory = Some(output_directory.into());
        }

        // avoid to later panic if these parameters are not set (but doesn't check if files exist)
        ensure!(
            input.mztab.is_some(),
            "`mztab` must be set. For more information try '--help'"
        );
        ensure!(
            input.canonical_proteome.is_some(),
            "`canonical_proteome` must be set. For more information try '--help'"
        );

        Ok(input)
    }

    pub fn load<S: AsRef<std::path::Path>>(path: S) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        serde_json::from_str(&contents).map_err(anyhow::Error::from)
    }

    pub fn build(self) -> anyhow::Result<Search> {
        let engine = self.engine.unwrap_or_default().make_parameters();
        if engine.max_ambiguous > 24 {
            log::warn!(
                "engine.max_ambiguous = {} allows up to 2^{} patterns per peptide",
                engine.max_ambiguous,
                engine.max_ambiguous
            );
        }

        let output_directory = match self.output_directory {
            Some(path) => {
                let path = PathBuf::from(path);
                std::fs::create_dir_all(&path)?;
                path
            }
            None => std::env::current_dir()?,
        };

        Ok(Search {
            version: clap::crate_version!().into(),
            engine,
            mztab: self.mztab.expect("'mztab' must be provided!"),
            canonical_proteome: self
                .canonical_proteome
                .expect("'canonical_proteome' must be provided!"),
            extra_fasta: self.extra_fasta,
            output_directory,
        })
    }
}
