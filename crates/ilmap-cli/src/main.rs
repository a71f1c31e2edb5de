use clap::{Arg, Command, ValueHint};
use ilmap_cli::input::Input;
use ilmap_cli::Runner;

fn main() -> anyhow::Result<()> {
    env_logger::Builder::default()
        .filter_level(log::LevelFilter::Error)
        .parse_env(env_logger::Env::default().filter_or("ILMAP_LOG", "error,ilmap_core=info,ilmap_cli=info"))
        .init();

    let matches = Command::new("ilmap")
        .version(clap::crate_version!())
        .about("Map de novo sequenced peptides onto protein databases, leucine/isoleucine agnostic")
        .arg(
            Arg::new("parameters")
                .required(true)
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to configuration parameters (JSON file)")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("mztab")
                .long("mztab")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to the de novo mzTab report to map. Overrides the mzTab file \
                     listed in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("fasta")
                .short('f')
                .long("fasta")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path to the canonical proteome FASTA. Overrides the FASTA file \
                     specified in the configuration file.",
                )
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("extra_fasta")
                .long("extra-fasta")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help("Path to an additional FASTA to search alongside the canonical proteome.")
                .value_hint(ValueHint::FilePath),
        )
        .arg(
            Arg::new("output_directory")
                .short('o')
                .long("output_directory")
                .value_parser(clap::builder::NonEmptyStringValueParser::new())
                .help(
                    "Path where the mapping report will be written. \
                     Overrides the directory specified in the configuration file.",
                )
                .value_hint(ValueHint::DirPath),
        )
        .help_template(
            "{usage-heading} {usage}\n\n\
             {about-with-newline}\n\
             Version {version}\n\n\
             {all-args}{after-help}",
        )
        .get_matches();

    let input = Input::from_arguments(matches)?;

    let runner = input.build().and_then(Runner::new)?;
    runner.run()?;

    Ok(())
}
