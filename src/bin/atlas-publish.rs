//! Publishes a file of collected measurements to an Atlas endpoint.

use std::{
    io::{self, Read},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use atlas_publisher::{
    codec::JSON_CONTENT_TYPE,
    config::{compile_exclude, PublisherConfig},
    AtlasPublisher, Tags,
};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "atlas-publish")]
#[command(about = "Normalizes measurements and publishes them to Atlas")]
struct Args {
    /// URI for Atlas server
    #[arg(long, env = "ATLAS_URI")]
    uri: String,

    /// Regex on the namespace to exclude certain metrics
    #[arg(long, env = "ATLAS_EXCLUDE")]
    exclude: Option<String>,

    /// Common tag applied to every datapoint, as key=value
    #[arg(long = "tag", value_parser = parse_tag)]
    tags: Vec<(String, String)>,

    /// Content type of the input payload
    #[arg(long, default_value = JSON_CONTENT_TYPE)]
    content_type: String,

    /// Output logs in JSON format
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,

    /// Input file, `-` for stdin
    #[arg(default_value = "-")]
    input: PathBuf,
}

fn parse_tag(s: &str) -> anyhow::Result<(String, String)> {
    let (k, v) = s
        .split_once('=')
        .ok_or_else(|| anyhow!("expected key=value, got '{s}'"))?;
    Ok((k.to_owned(), v.to_owned()))
}

fn read_input(path: &Path) -> anyhow::Result<Vec<u8>> {
    let mut buf = vec![];
    if path.as_os_str() == "-" {
        io::stdin().read_to_end(&mut buf)?;
    } else {
        buf = std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    }
    Ok(buf)
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if args.log_json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }

    let content = read_input(&args.input)?;
    let common_tags: Tags = args.tags.into_iter().collect();
    let config = PublisherConfig::new(args.uri)
        .with_exclude(args.exclude.as_deref().and_then(compile_exclude))
        .with_common_tags(common_tags);

    AtlasPublisher::new().publish(&args.content_type, &content, &config)?;
    info!("publishing finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tag() {
        assert_eq!(
            parse_tag("nf.app=foo").unwrap(),
            ("nf.app".to_string(), "foo".to_string())
        );
        assert_eq!(
            parse_tag("k=a=b").unwrap(),
            ("k".to_string(), "a=b".to_string())
        );
        assert!(parse_tag("novalue").is_err());
    }

    #[test]
    fn test_args() {
        let args = Args::try_parse_from([
            "atlas-publish",
            "--uri",
            "http://localhost:7101/api/v1/publish",
            "--tag",
            "nf.app=foo",
            "--tag",
            "nf.cluster=bar",
            "metrics.json",
        ])
        .unwrap();
        assert_eq!(args.tags.len(), 2);
        assert_eq!(args.content_type, JSON_CONTENT_TYPE);
        assert_eq!(args.input, PathBuf::from("metrics.json"));
        assert!(!args.log_json);
    }
}
