//! the args for running hare-parse

use hare_cli_common::LoggingArgs;
use hare_syntax::ParseOptions;
use std::path::PathBuf;

/// The args struct
#[derive(Debug, clap::Parser)]
#[clap(author, version, about = "Parses hare source files and reports syntax errors")]
pub struct Args {
    #[command(flatten)]
    logging: LoggingArgs,

    /// Specify which source files to parse
    #[clap(required = true, value_name = "source file", value_hint = clap::ValueHint::FilePath)]
    pub files: Vec<PathBuf>,

    /// Print every token, comments included
    #[clap(long)]
    pub tokens: bool,
    /// Print the syntax tree, one node per line
    #[clap(long)]
    pub tree: bool,
    /// Print how many nodes of each kind were parsed
    #[clap(long)]
    pub kinds: bool,

    /// Stop parsing a file at its first error
    #[clap(long = "no-recover")]
    no_recover: bool,
    /// Stop parsing a file once this many errors have been found
    #[clap(long = "max-errors", value_name = "N", value_parser = clap::value_parser!(u32).range(1..))]
    max_errors: Option<u32>,
    /// Report variadic parameters that are not the last parameter
    #[clap(long = "strict-variadics")]
    strict_variadics: bool,
}

impl Args {
    /// The options every file is parsed with
    pub fn parse_options(&self) -> ParseOptions {
        let options = ParseOptions::default()
            .with_recover(!self.no_recover)
            .with_validate_variadics(self.strict_variadics);
        match self.max_errors {
            Some(max) => options.with_max_errors(max as usize),
            None => options,
        }
    }

    pub fn logging(&self) -> &LoggingArgs {
        &self.logging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use std::path::Path;

    #[test]
    fn test_args_parsing() {
        let test = "hare-parse main.ha";
        let args = Args::try_parse_from(test.split(' ')).expect("could not parse test string");
        assert_eq!(args.files[0], Path::new("main.ha"));
        assert!(!args.tokens && !args.tree && !args.kinds);
        let options = args.parse_options();
        assert!(options.recover());
        assert_eq!(options.max_errors(), None);
        assert!(!options.validate_variadics());
    }

    #[test]
    fn test_parse_option_flags() {
        let test = "hare-parse --no-recover --max-errors 3 --strict-variadics a.ha b.ha";
        let args = Args::try_parse_from(test.split(' ')).expect("could not parse test string");
        assert_eq!(args.files.len(), 2);
        let options = args.parse_options();
        assert!(!options.recover());
        assert_eq!(options.max_errors(), Some(3));
        assert!(options.validate_variadics());
    }

    #[test]
    fn test_output_modes() {
        let test = "hare-parse -v --tokens --tree --kinds main.ha";
        let args = Args::try_parse_from(test.split(' ')).expect("could not parse test string");
        assert!(args.tokens && args.tree && args.kinds);
        assert_eq!(args.logging().verbosity(), 1);
    }

    #[test]
    fn test_files_are_required() {
        assert!(Args::try_parse_from(["hare-parse", "--tree"]).is_err());
    }

    #[test]
    fn test_max_errors_must_be_positive() {
        assert!(Args::try_parse_from(["hare-parse", "--max-errors", "0", "a.ha"]).is_err());
    }
}
