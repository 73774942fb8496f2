#![warn(missing_docs)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

//! # pcpp CLI
//!
//! A command-line interface for the pcpp pseudo-C-preprocessor library.

use anyhow::{Context, Result};
use clap::Parser;
use pcpp::{Preprocessor, PreprocessorConfig};
use std::io::{BufWriter, Read, Write};
use std::path::PathBuf;

/// Exit codes for different error conditions
mod exit_code {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const IO_ERROR: i32 = 2;
    pub const PREPROCESS_ERROR: i32 = 3;
}

/// Command-line interface for the pcpp pseudo-C-preprocessor
#[derive(Parser)]
#[command(
    name = "pcpp",
    version,
    author,
    about = "A minimal pseudo-C-preprocessor for glue-code generation",
    long_about = "pcpp resolves #include directives, strips comments, expands constant \
#defines and simple parameterized macros, evaluates conditional-compilation \
directives, and re-emits the result with line markers. Constant #defines are \
preserved in the output as '# define NAME VALUE' so a downstream binding \
generator can collect them.",
    after_help = "EXAMPLES:
  # Preprocess a header to stdout
  $ pcpp gl.h -I /usr/include -I /usr/include/GL

  # Read from stdin, write to a file
  $ cat gl.h | pcpp - -o gl.i

  # Seed definitions the way a compiler driver would
  $ pcpp gl.h -D GL_GLEXT_PROTOTYPES -D GL_VERSION_1_2=1"
)]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Input header to preprocess (use '-' for stdin)
    #[arg(help = "Input header to preprocess (use '-' for stdin)")]
    input: PathBuf,

    /// Output file (default: stdout)
    #[arg(short = 'o', long, help = "Output file (default: stdout)")]
    output: Option<PathBuf>,

    /// Add include directories; each occurrence may hold a path list in the
    /// platform's PATH syntax
    #[arg(
        short = 'I',
        long = "include",
        value_name = "DIR[:DIR...]",
        help = "Add directories to the include search path"
    )]
    include_dirs: Vec<String>,

    /// Predefine a symbol, as if by '#define NAME VALUE'
    #[arg(
        short = 'D',
        long = "define",
        value_name = "NAME[=VALUE]",
        help = "Predefine NAME as VALUE (default 1)"
    )]
    defines: Vec<String>,

    /// Trace directive state through the log facade
    #[arg(long, help = "Log the preprocessor's directive state while running")]
    debug: bool,

    /// Mirror the emitted stream onto standard error
    #[arg(long = "echo-stderr", help = "Mirror emitted output onto stderr")]
    echo_stderr: bool,
}

/// Main application entry point
fn main() {
    std::process::exit(match run() {
        Ok(()) => exit_code::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e:#}");
            determine_exit_code(&e)
        }
    });
}

/// Determine the appropriate exit code based on the error
fn determine_exit_code(error: &anyhow::Error) -> i32 {
    if error.downcast_ref::<std::io::Error>().is_some() {
        exit_code::IO_ERROR
    } else if error.downcast_ref::<pcpp::PreprocessError>().is_some() {
        exit_code::PREPROCESS_ERROR
    } else {
        exit_code::GENERAL_ERROR
    }
}

/// Run the main application logic
fn run() -> Result<()> {
    let cli = Cli::parse();

    let mut builder = env_logger::Builder::from_default_env();
    if cli.debug {
        builder.filter_level(log::LevelFilter::Debug);
    }
    builder.init();

    let (input_content, logical_name) = read_input(&cli.input)?;
    let out = open_output(cli.output.as_deref())?;
    preprocess(&cli, &input_content, &logical_name, out)
}

/// Drive one preprocessing run. The sink must be attached before any -D
/// seeding: predefined constants are re-emitted immediately, and they have
/// to land in the same stream the downstream parser reads.
fn preprocess(cli: &Cli, input: &str, logical_name: &str, out: Box<dyn Write>) -> Result<()> {
    let config = create_config(cli);
    let mut preprocessor = Preprocessor::with_config(&config);
    preprocessor.set_output(out);
    for entry in &cli.defines {
        let (name, value) = split_define(entry);
        preprocessor
            .predefine(name, value)
            .with_context(|| format!("failed to predefine \"{name}\""))?;
    }
    preprocessor
        .run(input, logical_name)
        .context("preprocessing failed")
}

/// Create preprocessor configuration from CLI arguments
fn create_config(cli: &Cli) -> PreprocessorConfig {
    let mut config = PreprocessorConfig::new()
        .with_debug(cli.debug)
        .with_echo_to_stderr(cli.echo_stderr);
    for entry in &cli.include_dirs {
        for dir in std::env::split_paths(entry) {
            config = config.with_include_path(dir);
        }
    }
    config
}

/// Split a -D argument into name and value; a bare name defines to "1"
fn split_define(entry: &str) -> (&str, &str) {
    match entry.split_once('=') {
        Some((name, value)) => (name, value),
        None => (entry, "1"),
    }
}

/// Read input from file or stdin, returning content and the logical name
/// used in line markers and diagnostics
fn read_input(input_path: &PathBuf) -> Result<(String, String)> {
    if input_path == &PathBuf::from("-") {
        let mut buffer = String::new();
        std::io::stdin()
            .read_to_string(&mut buffer)
            .context("Failed to read from stdin")?;
        Ok((buffer, "<stdin>".to_string()))
    } else {
        let content = std::fs::read_to_string(input_path)
            .with_context(|| format!("Failed to read input file: {}", input_path.display()))?;
        Ok((content, input_path.to_string_lossy().into_owned()))
    }
}

/// Open the output sink: a file when -o is given, stdout otherwise
fn open_output(output: Option<&std::path::Path>) -> Result<Box<dyn Write>> {
    match output {
        Some(path) if path != std::path::Path::new("-") => {
            let file = std::fs::File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Ok(Box::new(BufWriter::new(file)))
        }
        _ => Ok(Box::new(std::io::stdout())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::ffi::OsString;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct VecSink(Rc<RefCell<Vec<u8>>>);

    impl Write for VecSink {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.borrow_mut().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    fn parse_cli(args: &[&str]) -> Cli {
        let argv: Vec<OsString> = std::iter::once(OsString::from("pcpp"))
            .chain(args.iter().map(OsString::from))
            .collect();
        Cli::parse_from(argv)
    }

    #[test]
    fn define_splitting() {
        assert_eq!(split_define("FOO=5"), ("FOO", "5"));
        assert_eq!(split_define("FOO"), ("FOO", "1"));
        assert_eq!(split_define("FOO=a=b"), ("FOO", "a=b"));
    }

    #[test]
    fn cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn include_args_split_on_the_path_separator() {
        let joined = std::env::join_paths(["dir_a", "dir_b"])
            .unwrap_or_else(|err| panic!("join_paths failed: {err}"));
        let joined = joined.to_string_lossy().into_owned();
        let cli = parse_cli(&["x.h", "-I", &joined, "-I", "dir_c"]);
        let config = create_config(&cli);
        assert_eq!(
            config.include_paths,
            vec![
                PathBuf::from("dir_a"),
                PathBuf::from("dir_b"),
                PathBuf::from("dir_c"),
            ]
        );
    }

    #[test]
    fn seeded_defines_land_in_the_output_sink() {
        let sink = VecSink::default();
        let cli = parse_cli(&["-", "-D", "GL_VERSION_1_2", "-D", "GL_GLEXT_VERSION=20260829"]);
        preprocess(&cli, "int x;\n", "<stdin>", Box::new(sink.clone()))
            .unwrap_or_else(|err| panic!("preprocess failed: {err}"));
        let out = String::from_utf8_lossy(&sink.0.borrow()).into_owned();
        assert!(out.contains("# define GL_VERSION_1_2 1"));
        assert!(out.contains("# define GL_GLEXT_VERSION 20260829"));
        assert!(out.contains("int x;"));
    }
}
