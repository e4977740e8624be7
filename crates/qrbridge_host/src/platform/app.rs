use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use bridge_logging::{bridge_debug, bridge_info, bridge_warn, level_for};
use clap::Parser;
use log::LevelFilter;
use qrbridge_engine::{
    reply_channel, Background, CodecService, CodecSettings, HostError, ReplyReceiver,
    StandardQrEngine,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc;

use super::logging::{self, LogDestination};
use super::protocol::{parse_line, InboundFrame, OutboundFrame, RequestId};
use super::stdio::{spawn_writer, StdioPlatform};

const DEFAULT_LOG_FILE: &str = "./qrbridge.log";

/// Background host for the QR bridge, speaking newline-delimited JSON on stdio.
#[derive(Debug, Parser)]
#[command(name = "qrbridge_host", version)]
struct Cli {
    /// Write logs to this file [default: ./qrbridge.log]
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,
    /// Log to stderr; combined with --log-file, log to both
    #[arg(long)]
    log_stderr: bool,
    /// Include per-flow debug messages
    #[arg(long)]
    verbose: bool,
}

impl Cli {
    fn log_destination(&self) -> LogDestination {
        match (&self.log_file, self.log_stderr) {
            (Some(path), true) => LogDestination::Both(path.clone()),
            (None, true) => LogDestination::Stderr,
            (Some(path), false) => LogDestination::File(path.clone()),
            (None, false) => LogDestination::File(PathBuf::from(DEFAULT_LOG_FILE)),
        }
    }

    fn level(&self) -> LevelFilter {
        level_for(self.verbose)
    }
}

pub async fn run_host() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::initialize(&cli.log_destination(), cli.level());

    let (frame_tx, frame_rx) = mpsc::unbounded_channel();
    let writer = spawn_writer(tokio::io::stdout(), frame_rx);
    let platform = Arc::new(StdioPlatform::new(frame_tx));

    let codec = CodecService::new(
        Arc::new(StandardQrEngine::default()),
        CodecSettings::default(),
    );
    let background = Background::new(codec, platform.clone());
    background
        .initialize()
        .await
        .context("context menu initialization failed")?;
    bridge_info!("qrbridge host ready");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        if line.trim().is_empty() {
            continue;
        }
        match parse_line(&line) {
            Ok(frame) => dispatch(&background, &platform, frame),
            Err(err) => bridge_warn!("Skipping malformed frame: {}", err),
        }
    }

    bridge_info!("stdin closed, shutting down");
    platform.abandon_pending_scripts();
    drop(background);
    drop(platform);
    let _ = writer.await;
    Ok(())
}

fn dispatch(background: &Background, platform: &Arc<StdioPlatform>, frame: InboundFrame) {
    match frame {
        InboundFrame::Request { id, message } => {
            let (reply, receiver) = reply_channel();
            background.dispatch_request(message, reply);
            let platform = platform.clone();
            tokio::spawn(async move { forward_response(&platform, id, receiver).await });
        }
        InboundFrame::MenuClick { event } => {
            background.dispatch_click(event);
        }
        InboundFrame::ScriptResult { id, results } => platform.resolve_script(id, Ok(results)),
        InboundFrame::ScriptError { id, message } => {
            platform.resolve_script(id, Err(HostError::Platform(message)))
        }
    }
}

/// What became of a popup request's reply.
#[derive(Debug, PartialEq)]
enum Forwarded {
    Sent,
    /// The router declined the action; no response frame is written.
    Unanswered,
    Undelivered(HostError),
}

async fn forward_response(
    platform: &StdioPlatform,
    id: RequestId,
    receiver: ReplyReceiver,
) -> Forwarded {
    let Some(envelope) = receiver.wait().await else {
        bridge_debug!("Request {} left unanswered", id);
        return Forwarded::Unanswered;
    };
    match platform.emit(OutboundFrame::Response {
        id,
        message: envelope,
    }) {
        Ok(()) => Forwarded::Sent,
        Err(err) => {
            bridge_warn!("Response to request {} not delivered: {}", id, err);
            Forwarded::Undelivered(err)
        }
    }
}
