use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "slim",
    version,
    about = "List the Go package directories impacted by source-control changes",
    after_help = r#"Examples:
  slim ./...
  slim --diff origin/main...HEAD ./...
  slim --diff '' --debug ./cmd/... ./pkg/...
  go test $(slim --diff HEAD~1 ./...)
"#
)]
pub struct Args {
    /// Git comparison: '' (pending changes), '<rev>', '<rev> <rev>',
    /// '<rev>..<rev>' or '<rev>...<rev>'.
    #[arg(long, default_value = "HEAD", allow_hyphen_values = true)]
    pub diff: String,
    /// Verbose output: log the intermediate sets to stderr.
    #[arg(short = 'v', long, alias = "verbose")]
    pub debug: bool,
    /// With a single-revision diff, include staged and modified status
    /// entries, not just untracked files.
    #[arg(long)]
    pub include_staged: bool,
    /// Directory to run git and go in.
    #[arg(long, default_value = ".")]
    pub repo: PathBuf,
    /// Print a JSON report instead of one directory per line.
    #[arg(long)]
    pub json: bool,
    /// Package patterns passed to `go list`.
    pub patterns: Vec<String>,
}
