use std::process::ExitCode;
use std::time::Duration;

use release_fetcher::{ClientConfig, GithubClient};
use tracing_subscriber::EnvFilter;

const USAGE: &str = "Usage: release_fetcher [--api-url URL] [--timeout SECS] <command>

Commands:
  file <path> [--owner OWNER] [--repo REPO]   Print the decoded contents of a file
  release <tag>                               Print the release published for a tag
  latest                                      Print the latest release";

#[derive(Debug)]
enum Command {
    File {
        path: String,
        owner: Option<String>,
        repo: Option<String>,
    },
    Release(String),
    Latest,
}

#[derive(Debug)]
struct Args {
    config: ClientConfig,
    command: Command,
}

fn parse_args(args: &[String]) -> Result<Args, String> {
    let mut config = ClientConfig::new();
    let mut owner = None;
    let mut repo = None;
    let mut positional = Vec::new();

    let mut iter = args.iter();
    while let Some(arg) = iter.next() {
        let mut value = |name: &str| {
            iter.next()
                .cloned()
                .ok_or_else(|| format!("Missing value for {}", name))
        };
        match arg.as_str() {
            "--api-url" => config = config.with_api_base_url(value("--api-url")?),
            "--timeout" => {
                let secs: f64 = value("--timeout")?
                    .parse()
                    .map_err(|_| "--timeout expects a number of seconds".to_string())?;
                if secs <= 0.0 {
                    return Err("--timeout must be positive".to_string());
                }
                let timeout = Duration::try_from_secs_f64(secs)
                    .map_err(|_| format!("--timeout {} is out of range\n\n{}", secs, USAGE))?;
                config = config.with_timeout(timeout);
            }
            "--owner" => owner = Some(value("--owner")?),
            "--repo" => repo = Some(value("--repo")?),
            _ => positional.push(arg.clone()),
        }
    }

    let is_file = positional.first().map(String::as_str) == Some("file");
    if !is_file && (owner.is_some() || repo.is_some()) {
        return Err("--owner and --repo only apply to the file command".to_string());
    }

    let command = match positional.as_slice() {
        [cmd, path] if cmd == "file" => Command::File {
            path: path.clone(),
            owner,
            repo,
        },
        [cmd, tag] if cmd == "release" => Command::Release(tag.clone()),
        [cmd] if cmd == "latest" => Command::Latest,
        _ => return Err(USAGE.to_string()),
    };

    Ok(Args { config, command })
}

async fn run(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let client = GithubClient::new(args.config)?;

    match args.command {
        Command::File { path, owner, repo } => {
            let text = client
                .get_file_contents(&path, owner.as_deref(), repo.as_deref())
                .await?;
            print!("{}", text);
        }
        Command::Release(tag) => match client.get_release_by_tag(&tag).await? {
            Some(release) => println!("{}", serde_json::to_string_pretty(&release)?),
            None => println!("Release {} not found", tag),
        },
        Command::Latest => {
            let release = client.get_latest_release().await?;
            println!("{}", serde_json::to_string_pretty(&release)?);
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&args) {
        Ok(args) => args,
        Err(message) => {
            eprintln!("{}", message);
            return ExitCode::from(2);
        }
    };

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("✗ {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_file_command_with_overrides() {
        let parsed = parse_args(&args(&[
            "--api-url",
            "http://localhost:9000",
            "file",
            "README.md",
            "--repo",
            "geany-plugins",
        ]))
        .unwrap();
        assert_eq!(parsed.config.api_base_url, "http://localhost:9000/");
        match parsed.command {
            Command::File { path, owner, repo } => {
                assert_eq!(path, "README.md");
                assert_eq!(owner, None);
                assert_eq!(repo.as_deref(), Some("geany-plugins"));
            }
            _ => panic!("expected file command"),
        }
    }

    #[test]
    fn parses_release_and_latest() {
        let parsed = parse_args(&args(&["--timeout", "2.5", "release", "2.0.0"])).unwrap();
        assert_eq!(parsed.config.timeout, Duration::from_millis(2500));
        assert!(matches!(parsed.command, Command::Release(ref t) if t == "2.0.0"));

        let parsed = parse_args(&args(&["latest"])).unwrap();
        assert!(matches!(parsed.command, Command::Latest));
    }

    #[test]
    fn rejects_bad_input() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["tags"])).is_err());
        assert!(parse_args(&args(&["latest", "--timeout"])).is_err());
        assert!(parse_args(&args(&["--timeout", "0", "latest"])).is_err());
        assert!(parse_args(&args(&["--timeout", "NaN", "latest"])).is_err());
        assert!(parse_args(&args(&["--timeout", "inf", "latest"])).is_err());
    }

    #[test]
    fn huge_timeout_is_rejected() {
        let err = parse_args(&args(&["--timeout", "1e20", "latest"])).unwrap_err();
        assert!(err.contains("out of range"));
        assert!(err.contains("Usage:"));
    }

    #[test]
    fn repository_overrides_are_file_only() {
        assert!(parse_args(&args(&["release", "2.0.0", "--owner", "someone"])).is_err());
        assert!(parse_args(&args(&["--repo", "geany-plugins", "latest"])).is_err());
        assert!(parse_args(&args(&["file", "NEWS", "--owner", "geany"])).is_ok());
    }
}
