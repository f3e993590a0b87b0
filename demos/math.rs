//! Serves a `Math` object and calls it over HTTP from the same process.

use anyhow::Result;
use clap::Parser;
use httprpc::{rpc_object, ClientError, Service};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, task};
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

#[derive(Parser, Debug)]
#[command(name = "math")]
#[command(about = "Serve and call a Math object over HTTP")]
struct Args {
    /// Port to listen on (0 = auto-assign)
    #[arg(short, long, default_value = "0")]
    port: u16,

    /// Host to bind to
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Path of the RPC endpoint
    #[arg(long, default_value = "/rpc")]
    path: String,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

pub struct Math;

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Operands {
    a: i64,
    b: i64,
}

#[derive(Serialize, Deserialize, Default)]
#[serde(rename_all = "PascalCase")]
pub struct Answer {
    x: i64,
}

impl Math {
    fn add(&self, req: Operands, res: &mut Answer) -> Result<()> {
        res.x = req.a + req.b;
        Ok(())
    }

    fn divide(&self, req: Operands, res: &mut Answer) -> Result<()> {
        anyhow::ensure!(req.b != 0, "division by zero");
        res.x = req.a / req.b;
        Ok(())
    }
}

rpc_object!(Math {
    Add => Math::add,
    Divide => Math::divide,
});

fn service() -> Result<Service> {
    let mut service = Service::new();
    service.register(Math)?;
    Ok(service)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_level = if args.debug { Level::DEBUG } else { Level::INFO };
    FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .compact()
        .init();

    let listener = TcpListener::bind((args.host.as_str(), args.port)).await?;
    let uri = format!("http://{}{}", listener.local_addr()?, args.path);
    let path = args.path.clone();
    task::spawn(async move { service()?.serve_http(listener, &path).await.map_err(anyhow::Error::from) });

    let caller = service()?;
    let client = reqwest::Client::new();

    let mut answer = Answer::default();
    caller
        .call(&client, &uri, "Math.Add", &Operands { a: 1, b: 2 }, &mut answer)
        .await?;
    info!("1 + 2 = {}", answer.x);

    match caller
        .call(&client, &uri, "Math.Divide", &Operands { a: 1, b: 0 }, &mut answer)
        .await
    {
        Err(ClientError::Remote(message)) => info!("1 / 0 failed remotely: {message}"),
        other => anyhow::bail!("expected a remote error, got {other:?}"),
    }

    Ok(())
}
