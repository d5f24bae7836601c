//! Prints what was parsed from a file, and the errors found in it

use eyre::WrapErr;
use hare_syntax::lexer::tokenize;
use hare_syntax::syntax_tree::Module;
use hare_syntax::tree::{render, walk, SyntaxNode};
use hare_syntax::{parse_with, ParseOptions, ParseOutput};
use hare_tokens::spanned::Spanned;
use hare_tokens::token::TokenKind;
use itertools::Itertools;
use owo_colors::OwoColorize;
use owo_colors::Stream::Stderr;
use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

/// What to print for every parsed file
#[derive(Debug, Default, Clone, Copy)]
pub struct Outputs {
    pub tokens: bool,
    pub tree: bool,
    pub kinds: bool,
}

/// Parses the file at `path`, printing the requested outputs to `out` and any errors to `err`.
///
/// Returns how many errors were found.
pub fn check_file<O: Write, E: Write>(
    path: &Path,
    options: &ParseOptions,
    outputs: Outputs,
    out: &mut O,
    err: &mut E,
) -> eyre::Result<usize> {
    let src = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("could not read {}", path.display()))?;
    debug!("read {} bytes from {:?}", src.len(), path);
    let output = parse_with(&src, options.clone());
    let name = path.display().to_string();

    if outputs.tokens {
        write_tokens(out, &src)?;
    }
    if outputs.tree {
        write!(out, "{}", render(&output.module))?;
    }
    if outputs.kinds {
        write_kinds(out, &output.module)?;
    }
    write_errors(err, &name, &src, &output)?;
    info!("{name}: {} errors", output.errors.len());
    Ok(output.errors.len())
}

/// One line per token, comments included: `[start, end) kind "text"`
pub fn write_tokens<W: Write>(out: &mut W, src: &str) -> eyre::Result<()> {
    let (tokens, _) = tokenize(src);
    for token in tokens.iter().filter(|token| token.kind() != &TokenKind::Eof) {
        let range = token.span().range();
        writeln!(
            out,
            "[{}, {}) {} {:?}",
            range.start,
            range.end,
            token.kind(),
            token.text()
        )?;
    }
    Ok(())
}

/// How many nodes of each kind the module holds, most common first
pub fn write_kinds<W: Write>(out: &mut W, module: &Module) -> eyre::Result<()> {
    let mut kinds = vec![];
    walk(module, |node, _| kinds.push(node.kind()));
    for (kind, count) in kinds
        .into_iter()
        .counts()
        .into_iter()
        .sorted_by(|(a_kind, a), (b_kind, b)| b.cmp(a).then(a_kind.cmp(b_kind)))
    {
        writeln!(out, "{count:>6} {kind}")?;
    }
    Ok(())
}

fn write_errors<W: Write>(
    err: &mut W,
    name: &str,
    src: &str,
    output: &ParseOutput,
) -> eyre::Result<()> {
    for error in &output.errors {
        write!(
            err,
            "{}: {}",
            "error".if_supports_color(Stderr, |text| text.bright_red()),
            error.render(name, src)
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;
    use tempfile::NamedTempFile;

    fn check(src: &str, outputs: Outputs) -> (usize, String, String) {
        let mut file = NamedTempFile::new().expect("could not create temp file");
        write!(file, "{src}").expect("could not write");
        let (mut out, mut err) = (vec![], vec![]);
        let errors = check_file(
            file.path(),
            &ParseOptions::default(),
            outputs,
            &mut out,
            &mut err,
        )
        .expect("could not check file");
        (
            errors,
            String::from_utf8(out).expect("output is utf-8"),
            String::from_utf8(err).expect("errors are utf-8"),
        )
    }

    #[test]
    fn test_clean_file() {
        let (errors, out, err) = check("use fmt;\n", Outputs::default());
        assert_eq!(errors, 0);
        assert!(out.is_empty());
        assert!(err.is_empty());
    }

    #[test]
    fn test_tokens() {
        let (_, out, _) = check(
            "use fmt; // io\n",
            Outputs {
                tokens: true,
                ..Default::default()
            },
        );
        let lines = out.lines().collect::<Vec<_>>();
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0], "[0, 3) use \"use\"");
        assert!(lines[3].ends_with("\"// io\""), "{}", lines[3]);
    }

    #[test]
    fn test_tree() {
        let (_, out, _) = check(
            "use fmt;",
            Outputs {
                tree: true,
                ..Default::default()
            },
        );
        assert_eq!(out, "module [0, 8)\n  use_statement [0, 8)\n    identifier [4, 7)\n");
    }

    #[test]
    fn test_kinds() {
        let (_, out, _) = check(
            "use fmt;\nuse io;\n",
            Outputs {
                kinds: true,
                ..Default::default()
            },
        );
        let lines = out.lines().map(str::trim).collect::<Vec<_>>();
        assert_eq!(lines, ["2 identifier", "2 use_statement", "1 module"]);
    }

    #[test]
    fn test_errors_are_rendered() {
        let (errors, _, err) = check("fn f( : int) void;\n", Outputs::default());
        assert_eq!(errors, 1);
        assert!(err.starts_with("error: "), "{err}");
        assert!(err.contains(":1:7"), "{err}");
    }

    #[test]
    fn test_missing_file() {
        let (mut out, mut err) = (vec![], vec![]);
        let result = check_file(
            Path::new("does/not/exist.ha"),
            &ParseOptions::default(),
            Outputs::default(),
            &mut out,
            &mut err,
        );
        assert!(result.is_err());
    }
}
