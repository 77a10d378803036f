use std::path::PathBuf;

use axum::http::{header, HeaderMap, HeaderValue, Method, Uri};
use clap::{Parser, Subcommand};
use serde_json::{json, Map, Value};

use mock_responses::config::{load_mock_file, LogFormat};
use mock_responses::http::MockContext;
use mock_responses::mock::{MockResponse, Outcome};
use mock_responses::observability::init_logging;

#[derive(Parser)]
#[command(name = "mockctl")]
#[command(about = "Validate mock files and dry-run target selection", long_about = None)]
struct Cli {
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Pretty)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a mock file and list its routes
    Check { file: PathBuf },
    /// Show which mock and target would answer a request
    Resolve {
        file: PathBuf,
        method: String,
        path: String,
        /// Accept header to send
        #[arg(short, long)]
        accept: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level, cli.log_format);

    match cli.command {
        Commands::Check { file } => {
            let mocks = load_mock_file(&file)?.build()?;
            let summary: Vec<Value> = mocks
                .iter()
                .map(|mock| {
                    let targets: Vec<Value> = mock
                        .targets()
                        .iter()
                        .map(|t| {
                            json!({
                                "methods": t.request().and_then(|r| r.methods.as_ref()).map(|m| {
                                    m.iter().map(Method::to_string).collect::<Vec<_>>()
                                }),
                                "accepts": t.request().and_then(|r| r.accepts.clone()),
                                "catch_all": t.is_catch_all(),
                                "response": t.response().kind(),
                            })
                        })
                        .collect();
                    json!({
                        "route": mock.route(),
                        "regex": mock.pattern().as_regex(),
                        "targets": targets,
                    })
                })
                .collect();
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Resolve {
            file,
            method,
            path,
            accept,
        } => {
            let router = load_mock_file(&file)?.build_router()?;

            let mut headers = HeaderMap::new();
            if let Some(accept) = accept {
                headers.insert(header::ACCEPT, HeaderValue::from_str(&accept)?);
            }
            let mut ctx = MockContext::new(method.parse()?, path.parse::<Uri>()?, headers);

            let Some((index, mock)) = router.find(ctx.path()) else {
                println!("{}", serde_json::to_string_pretty(&json!({ "mock": null }))?);
                return Ok(());
            };

            let params: Map<String, Value> = mock
                .pattern()
                .captures(ctx.path())
                .unwrap_or_default()
                .into_iter()
                .map(|p| (p.name, p.value.map(Value::String).unwrap_or(Value::Null)))
                .collect();

            let mut report = json!({
                "mock": index,
                "route": mock.route(),
                "params": params,
                "target": mock.select(&ctx),
            });

            // Only static fragments are rendered; handlers are code and not run here.
            if let Some(target) = mock.select(&ctx) {
                let response = mock.targets()[target].response();
                report["kind"] = json!(response.kind());
                match response {
                    MockResponse::Fragment(_) => {
                        if let Outcome::Responded { .. } = mock.respond::<()>(&mut ctx).await? {
                            let state = &ctx.response;
                            let headers: Map<String, Value> = state
                                .headers()
                                .iter()
                                .map(|(k, v)| {
                                    (k.to_string(), json!(v.to_str().unwrap_or_default()))
                                })
                                .collect();
                            report["response"] = json!({
                                "status": state.status().as_u16(),
                                "headers": headers,
                                "body": state.body_text(),
                            });
                        }
                    }
                    MockResponse::Invalid(value) => {
                        report["error"] = json!(format!("Invalid response: {}", value));
                    }
                    MockResponse::Handler(_) => {}
                }
            }

            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(())
}
