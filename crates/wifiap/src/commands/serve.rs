//! `serve`: the verb protocol over stdin/stdout JSON lines.
//!
//! Requests are handled one at a time in arrival order. Replies and event
//! pushes share one writer task, so a push may land between two replies.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use wifiap_core::{
    AccessPoint, CommandRunner, EventSource, IwEventSource, RecordingRunner, ScriptRunner,
    SimulatedEvents,
};

use crate::binding::{Binding, Reply, Request, Session};
use crate::cli::{GlobalOpts, ServeArgs};
use crate::error::CliError;

const OUTPUT_BUFFER: usize = 64;

pub async fn handle(args: ServeArgs, global: &GlobalOpts) -> Result<(), CliError> {
    let (config, runtime) = super::load(global)?.into_core()?;

    let (runner, source): (Arc<dyn CommandRunner>, Arc<dyn EventSource>) = if args.simulate {
        info!("simulation mode: system commands are logged, not run");
        (
            Arc::new(RecordingRunner::new()),
            Arc::new(SimulatedEvents::new()),
        )
    } else {
        (
            Arc::new(ScriptRunner::new(&runtime.script).with_timeout(runtime.command_timeout)),
            Arc::new(IwEventSource),
        )
    };

    let ap = AccessPoint::new(runtime, config, runner, source)?;
    let binding = Binding::new(ap);

    let (tx, rx) = mpsc::channel(OUTPUT_BUFFER);
    let writer = tokio::spawn(write_lines(rx));
    let mut session = Session::new(binding.events().clone(), tx.clone());

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    info!("serving verbs on stdin");

    loop {
        let line = tokio::select! {
            biased;
            _ = tokio::signal::ctrl_c() => {
                info!("interrupted");
                break;
            }
            line = lines.next_line() => line?,
        };
        let Some(line) = line else {
            debug!("input closed");
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let reply = match serde_json::from_str::<Request>(line) {
            Ok(request) => binding.handle(&mut session, request).await,
            Err(e) => Reply::malformed(&e),
        };
        if tx.send(reply.to_line()).await.is_err() {
            warn!("output closed, stopping");
            break;
        }
    }

    session.close().await;
    drop(tx);
    match writer.await {
        Ok(result) => result?,
        Err(e) => warn!(error = %e, "output writer ended abnormally"),
    }
    Ok(())
}

async fn write_lines(mut rx: mpsc::Receiver<String>) -> std::io::Result<()> {
    let mut stdout = tokio::io::stdout();
    while let Some(line) = rx.recv().await {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}
