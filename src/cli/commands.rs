use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "probekit", version, about = "Bounded-concurrency HTTP probe engine")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase log verbosity (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// YAML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Try username/password pairs against a login form
    Brute(BruteArgs),
    /// Look for reachable paths under a base URL
    Dirs(DirsArgs),
    /// Look for query parameters the target reacts to
    Params(ParamsArgs),
    /// Send injection payloads through query parameters
    Inject(InjectArgs),
    /// Validate a configuration file
    Validate(ValidateArgs),
}

/// Engine, detection and output flags shared by every scan.
#[derive(Args, Clone, Debug, Default)]
pub struct CommonArgs {
    /// Max concurrent requests [default: 10]
    #[arg(long, alias = "concurrent")]
    pub concurrency: Option<usize>,

    /// Per-attempt timeout in seconds [default: 10]
    #[arg(long)]
    pub timeout: Option<f64>,

    /// Extra attempts after a network failure [default: 2]
    #[arg(long)]
    pub retries: Option<u32>,

    /// Backoff base in seconds, multiplied by the attempt number [default: 1.0]
    #[arg(long)]
    pub backoff: Option<f64>,

    /// Minimum seconds between request submissions [default: 0]
    #[arg(long)]
    pub delay: Option<f64>,

    /// Directory for result files [default: results]
    #[arg(short, long)]
    pub output: Option<String>,

    /// Comma-separated result formats: json, csv
    #[arg(long)]
    pub format: Option<String>,

    /// Do not write result files
    #[arg(long)]
    pub no_save: bool,

    /// Response keyword that marks success (repeatable)
    #[arg(long = "keyword", alias = "success-keyword")]
    pub keywords: Vec<String>,

    /// Treat redirected responses as success
    #[arg(long)]
    pub allow_redirect: bool,

    /// Baseline detection: auto (skipped when a keyword is set), on or off
    #[arg(long)]
    pub baseline: Option<String>,

    /// Skip baseline detection
    #[arg(long, conflicts_with = "baseline")]
    pub no_baseline: bool,

    /// Length change, in percent of the baseline, that marks success [default: 20]
    #[arg(long)]
    pub threshold: Option<f64>,
}

#[derive(Args, Clone, Debug)]
pub struct BruteArgs {
    /// Target login URL
    #[arg(short, long)]
    pub url: String,

    /// HTTP method: GET or POST
    #[arg(short, long, default_value = "POST")]
    pub method: String,

    /// Username form field name
    #[arg(long, default_value = "username")]
    pub user_field: String,

    /// Password form field name
    #[arg(long, default_value = "password")]
    pub pass_field: String,

    /// Extra form fields as a JSON object, e.g. '{"csrf":"token123"}'
    #[arg(long)]
    pub extra_data: Option<String>,

    /// Username wordlist
    #[arg(long)]
    pub userlist: String,

    /// Password wordlist
    #[arg(long)]
    pub passlist: String,

    /// Max usernames to try (0 = all)
    #[arg(long, default_value = "0")]
    pub max_users: usize,

    /// Max passwords to try (0 = all)
    #[arg(long, default_value = "0")]
    pub max_pass: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Clone, Debug)]
pub struct DirsArgs {
    /// Base URL
    #[arg(short, long)]
    pub url: String,

    /// Path wordlist
    #[arg(short, long, default_value = "wordlist/directory-wordlist.txt")]
    pub wordlist: String,

    /// Max paths to test (0 = all)
    #[arg(long, alias = "limit", default_value = "0")]
    pub max: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Clone, Debug)]
pub struct ParamsArgs {
    /// Target URL
    #[arg(short, long)]
    pub url: String,

    /// Parameter name wordlist
    #[arg(short, long, default_value = "wordlist/params-wordlist.txt")]
    pub wordlist: String,

    /// Max parameters to test (0 = all)
    #[arg(long, alias = "limit", default_value = "0")]
    pub max: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Clone, Debug)]
pub struct InjectArgs {
    /// Target URL, usually with the parameters to test in its query
    #[arg(short, long)]
    pub url: String,

    /// Payload family: sqli, xss, lfi
    #[arg(short, long)]
    pub kind: String,

    /// Comma-separated parameters to test (default: every query parameter of --url)
    #[arg(long)]
    pub params: Option<String>,

    /// Payload wordlist [default: wordlist/<KIND>-wordlist.txt]
    #[arg(long, alias = "wordlist")]
    pub payloads: Option<String>,

    /// Max payloads to test (0 = all)
    #[arg(long, default_value = "0")]
    pub max_payloads: usize,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Args, Clone, Debug)]
pub struct ValidateArgs {
    /// Configuration file to validate
    #[arg(value_name = "FILE")]
    pub path: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_brute_with_common_flags() {
        let cli = Cli::parse_from([
            "probekit", "-vv", "brute", "--url", "http://example.com/login",
            "--userlist", "u.txt", "--passlist", "p.txt",
            "--success-keyword", "Welcome", "--allow-redirect", "--no-baseline",
            "--concurrency", "4", "--retries", "0",
        ]);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Brute(args) => {
                assert_eq!(args.method, "POST");
                assert_eq!(args.common.keywords, vec!["Welcome".to_string()]);
                assert!(args.common.allow_redirect);
                assert!(args.common.no_baseline);
                assert_eq!(args.common.concurrency, Some(4));
                assert_eq!(args.common.retries, Some(0));
                assert_eq!(args.common.timeout, None);
            }
            _ => panic!("expected brute"),
        }
    }

    #[test]
    fn test_parse_inject_global_config_after_subcommand() {
        let cli = Cli::parse_from([
            "probekit", "inject", "--url", "http://example.com/?id=1", "--kind", "sqli",
            "--config", "probekit.yaml",
        ]);
        assert_eq!(cli.config.as_deref(), Some("probekit.yaml"));
        assert!(matches!(cli.command, Commands::Inject(ref a) if a.params.is_none()));
    }

    #[test]
    fn test_baseline_flags_conflict() {
        let result = Cli::try_parse_from([
            "probekit", "dirs", "--url", "http://example.com", "--baseline", "auto", "--no-baseline",
        ]);
        assert!(result.is_err());
    }
}
