//! `osdiag conf`: load the server configuration and print it.

use crate::{
    cli::args::ConfArgs,
    config::DiagConfig,
    debug,
    hsconf::{SectionKind, ServerConf, reads_logging_database},
    log,
};
use anyhow::{Context, Result};
use owo_colors::{OwoColorize, Stream};
use serde_json::{Map, Value as JsonValue};
use std::{fmt::Write as _, fs, io::Write as _};

pub fn show_server_conf(args: &ConfArgs, config: &DiagConfig) -> Result<()> {
    let path = args.path.as_ref().unwrap_or(&config.platform.server_conf);
    let version = args
        .platform_version
        .as_deref()
        .unwrap_or(&config.platform.version);

    debug!("conf"; "reading {} for platform {}", path.display(), version);
    let conf = ServerConf::load(path, version)
        .with_context(|| format!("failed to load server configuration {}", path.display()))?;
    log!("conf"; "loaded {} sections from {}", conf.sections().count(), path.display());

    let sections = selected_sections(&args.sections);
    let formatted = if args.json {
        let json = to_json(&conf, &sections)?;
        if args.pretty {
            serde_json::to_string_pretty(&json)?
        } else {
            serde_json::to_string(&json)?
        }
    } else {
        render_text(&conf, &sections, version, args.output.is_none())
    };

    // Output to file or stdout
    if let Some(ref output_path) = args.output {
        let mut file = fs::File::create(output_path)
            .with_context(|| format!("failed to create {}", output_path.display()))?;
        writeln!(file, "{}", formatted.trim_end())?;
        log!("conf"; "wrote output to {}", output_path.display());
    } else {
        println!("{}", formatted.trim_end());
    }

    Ok(())
}

/// Requested sections in model order, all of them when none were requested.
fn selected_sections(requested: &[SectionKind]) -> Vec<SectionKind> {
    SectionKind::ALL
        .into_iter()
        .filter(|kind| requested.is_empty() || requested.contains(kind))
        .collect()
}

fn to_json(conf: &ServerConf, sections: &[SectionKind]) -> Result<JsonValue> {
    if sections.len() == SectionKind::ALL.len() {
        return Ok(serde_json::to_value(conf)?);
    }
    let mut obj = Map::new();
    for kind in sections {
        let value = serde_json::to_value(conf.section(*kind))?;
        obj.insert(kind.element_name().to_string(), value);
    }
    Ok(JsonValue::Object(obj))
}

fn render_text(conf: &ServerConf, sections: &[SectionKind], version: &str, color: bool) -> String {
    let heading = |name: &str| {
        if color {
            name.if_supports_color(Stream::Stdout, |n| n.bold())
                .to_string()
        } else {
            name.to_string()
        }
    };

    let mut out = String::new();
    for kind in sections {
        let Some(section) = conf.section(*kind) else {
            if kind.is_gated() && !reads_logging_database(version) {
                let name = heading(kind.element_name());
                writeln!(out, "{name}  (not read for platform {version})").ok();
            }
            continue;
        };

        let provider = if section.provider_key().is_empty() {
            "-"
        } else {
            section.provider_key()
        };
        writeln!(out, "{}  provider: {provider}", heading(section.name())).ok();

        if section.is_empty() {
            writeln!(out, "  (no properties)").ok();
        }
        for property in section.properties() {
            let tag = if property.is_encrypted() { " (encrypted)" } else { "" };
            writeln!(out, "  {} = {}{tag}", property.name(), property.value()).ok();
        }
    }
    out
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tempfile::TempDir;

    const DOC: &str = r#"<ServerConfigurations>
  <PlatformDatabaseConfiguration ProviderKey="SqlServer"><Server>db</Server></PlatformDatabaseConfiguration>
  <LoggingDatabaseConfiguration ProviderKey="SqlServer"><Server>log</Server></LoggingDatabaseConfiguration>
  <SessionDatabaseConfiguration><Server>session</Server></SessionDatabaseConfiguration>
  <ServiceConfiguration/>
  <ServerConfiguration ProviderKey="none"><Port encrypted="true">1099</Port></ServerConfiguration>
</ServerConfigurations>"#;

    fn conf_args(argv: &[&str]) -> ConfArgs {
        let cli = Cli::try_parse_from(argv).unwrap();
        match cli.command {
            Commands::Conf { args } => args,
            _ => panic!("expected conf command"),
        }
    }

    #[test]
    fn test_selected_sections_keep_model_order() {
        let selected = selected_sections(&[
            SectionKind::ServerConfiguration,
            SectionKind::PlatformDatabase,
        ]);
        assert_eq!(
            selected,
            vec![SectionKind::PlatformDatabase, SectionKind::ServerConfiguration]
        );
        assert_eq!(selected_sections(&[]).len(), 5);
    }

    #[test]
    fn test_render_text() {
        let conf = ServerConf::parse(DOC, "10.0.1").unwrap();
        let text = render_text(&conf, &SectionKind::ALL, "10.0.1", false);

        assert!(text.contains("PlatformDatabaseConfiguration  provider: SqlServer\n  Server = db\n"));
        assert!(text.contains("LoggingDatabaseConfiguration  (not read for platform 10.0.1)"));
        assert!(text.contains("SessionDatabaseConfiguration  provider: -"));
        assert!(text.contains("ServiceConfiguration  provider: -\n  (no properties)"));
        assert!(text.contains("  Port = 1099 (encrypted)"));
    }

    #[test]
    fn test_json_filtered_sections() {
        let conf = ServerConf::parse(DOC, "11.0").unwrap();
        let json = to_json(&conf, &[SectionKind::ServerConfiguration]).unwrap();
        let obj = json.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(obj["ServerConfiguration"]["properties"][0]["isEncrypted"], true);

        let json = to_json(&conf, &SectionKind::ALL).unwrap();
        assert_eq!(json["LoggingDatabaseConfiguration"]["providerKey"], "SqlServer");
    }

    #[test]
    fn test_json_gated_section_is_null() {
        let conf = ServerConf::parse(DOC, "10.0").unwrap();
        let json = to_json(&conf, &[SectionKind::LoggingDatabase]).unwrap();
        assert!(json["LoggingDatabaseConfiguration"].is_null());
    }

    #[test]
    fn test_show_writes_output_file() {
        let dir = TempDir::new().unwrap();
        let conf_path = dir.path().join("server.hsconf");
        let out_path = dir.path().join("out.json");
        fs::write(&conf_path, DOC).unwrap();

        let args = conf_args(&[
            "osdiag",
            "conf",
            conf_path.to_str().unwrap(),
            "--json",
            "-o",
            out_path.to_str().unwrap(),
        ]);
        show_server_conf(&args, &DiagConfig::default()).unwrap();

        let written: JsonValue =
            serde_json::from_str(&fs::read_to_string(&out_path).unwrap()).unwrap();
        assert_eq!(written["LoggingDatabaseConfiguration"]["providerKey"], "SqlServer");
    }

    #[test]
    fn test_show_reports_missing_file() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("server.hsconf");
        let args = conf_args(&["osdiag", "conf", missing.to_str().unwrap()]);

        let err = show_server_conf(&args, &DiagConfig::default()).unwrap_err();
        assert!(err.to_string().contains("failed to load server configuration"));
    }
}
