//! Command-line parsing.
//!
//! The launcher recognizes exactly two flag pairs and forwards everything
//! else, in order, to the artifact. No help or version flags are intercepted
//! because the artifact may define its own.

use std::path::PathBuf;

pub const JAVA_PATH_FLAG: &str = "--java-path";
pub const JAR_PATH_FLAG: &str = "--jar-path";

/// Launcher arguments split from the artifact's own arguments.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliArgs {
    pub java_path: Option<PathBuf>,
    pub jar_path: Option<PathBuf>,
    pub forwarded: Vec<String>,
}

/// Split raw arguments (without the program name) into launcher flags and
/// forwarded arguments.
///
/// A flag only consumes the following token when one exists; a trailing flag
/// is forwarded verbatim. Repeated flags keep the last value.
pub fn parse_args<I>(raw: I) -> CliArgs
where
    I: IntoIterator<Item = String>,
{
    let mut out = CliArgs::default();
    let mut iter = raw.into_iter();
    while let Some(arg) = iter.next() {
        let slot = if arg == JAVA_PATH_FLAG {
            &mut out.java_path
        } else if arg == JAR_PATH_FLAG {
            &mut out.jar_path
        } else {
            out.forwarded.push(arg);
            continue;
        };
        match iter.next() {
            Some(value) => *slot = Some(PathBuf::from(value)),
            None => out.forwarded.push(arg),
        }
    }
    out
}
