//! Native-messaging host: the process the browser extension talks to.
//!
//! Inbound frames are decoded on a reader task and handled on the main loop;
//! each content-analysis request runs on its own task so tabs never wait on
//! each other. Everything bound for the browser goes through one outbound
//! queue, so frames are never interleaved on stdout.

pub mod codec;
pub mod messages;

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::mpsc;

use crate::dispatcher::{BrowserPort, Notice, TabId, Warning};
use crate::pipeline::FocusService;

use codec::HostError;
use messages::{InboundMessage, OutboundMessage};

const INBOUND_QUEUE: usize = 64;

/// Browser port that queues commands for the native-messaging writer
#[derive(Clone)]
pub struct NativeMessagingPort {
    outbound: mpsc::UnboundedSender<OutboundMessage>,
}

impl NativeMessagingPort {
    /// Create a port together with the receiver the host drains
    #[must_use]
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<OutboundMessage>) {
        let (outbound, rx) = mpsc::unbounded_channel();
        (Self { outbound }, rx)
    }

    fn send(&self, message: OutboundMessage) -> Result<()> {
        self.outbound
            .send(message)
            .map_err(|_| anyhow::anyhow!("Native-messaging channel closed"))
    }
}

#[async_trait]
impl BrowserPort for NativeMessagingPort {
    async fn show_notice(&self, tab_id: TabId, notice: Notice) -> Result<()> {
        self.send(OutboundMessage::popup(tab_id, notice))
    }

    async fn show_warning(&self, tab_id: TabId, warning: Warning) -> Result<()> {
        self.send(OutboundMessage::warning(tab_id, warning))
    }

    /// Closure failures are reported back asynchronously as `tabCloseFailed`
    async fn close_tab(&self, tab_id: TabId) -> Result<()> {
        self.send(OutboundMessage::CloseTab { tab_id })
    }
}

pub struct Host {
    service: Arc<FocusService>,
    port: NativeMessagingPort,
}

impl Host {
    #[must_use]
    pub fn new(service: Arc<FocusService>, port: NativeMessagingPort) -> Self {
        Self { service, port }
    }

    /// Serve the extension until it closes the channel
    ///
    /// # Errors
    ///
    /// Returns an error if writing to the browser fails
    pub async fn run<R, W>(
        self,
        reader: R,
        mut writer: W,
        mut outbound: mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> Result<()>
    where
        R: AsyncRead + Unpin + Send + 'static,
        W: AsyncWrite + Unpin,
    {
        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE);
        let reader_task = tokio::spawn(read_loop(reader, inbound_tx));
        log::info!("Native-messaging host started");

        let served = self.serve(inbound_rx, &mut writer, &mut outbound).await;
        reader_task.abort();

        match &served {
            Ok(()) => log::info!("Browser closed the native-messaging channel, host exiting"),
            Err(e) => log::error!("Native-messaging host stopped: {e:#}"),
        }
        served
    }

    async fn serve<W>(
        &self,
        mut inbound: mpsc::Receiver<InboundMessage>,
        writer: &mut W,
        outbound: &mut mpsc::UnboundedReceiver<OutboundMessage>,
    ) -> Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        loop {
            tokio::select! {
                biased;
                Some(message) = outbound.recv() => {
                    write_message(writer, &message).await?;
                }
                message = inbound.recv() => match message {
                    Some(message) => self.handle(message),
                    None => break,
                },
            }
        }

        // Replies queued before the browser hung up still go out
        while let Ok(message) = outbound.try_recv() {
            write_message(writer, &message).await?;
        }
        Ok(())
    }

    fn handle(&self, message: InboundMessage) {
        match message {
            navigation @ InboundMessage::NavigationCompleted { .. } => {
                let Some(event) = navigation.navigation_event() else {
                    return;
                };
                if let Err(e) = self.service.on_navigation(&event) {
                    log::error!("Failed to record navigation to {}: {e:#}", event.url);
                }
            }
            InboundMessage::ContentAnalysis { tab_id, content } => {
                // Before spawning, so later messages for this tab see the page
                self.service.on_page_shown(tab_id, content.url());
                let service = self.service.clone();
                tokio::spawn(async move {
                    let outcome = service.on_content_analysis(tab_id, &content).await;
                    log::debug!("Analysis of {} in tab {tab_id}: {outcome:?}", content.url());
                });
            }
            InboundMessage::TabRemoved { tab_id } => {
                self.service.on_tab_removed(tab_id);
            }
            InboundMessage::TabCloseFailed { tab_id, error } => {
                log::warn!("Failed to close tab {tab_id}: {error}");
            }
            InboundMessage::Ping => {
                if let Err(e) = self.port.send(OutboundMessage::pong()) {
                    log::warn!("Could not answer ping: {e:#}");
                }
            }
        }
    }
}

async fn write_message<W>(writer: &mut W, message: &OutboundMessage) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    match codec::write_frame(writer, message).await {
        Ok(()) => Ok(()),
        Err(e @ HostError::FrameTooLarge { .. }) => {
            log::warn!("Dropping outbound message: {e}");
            Ok(())
        }
        Err(e) => Err(e).context("Failed to write to browser"),
    }
}

async fn read_loop<R>(mut reader: R, inbound: mpsc::Sender<InboundMessage>)
where
    R: AsyncRead + Unpin,
{
    loop {
        match codec::read_frame(&mut reader).await {
            Ok(Some(frame)) => match serde_json::from_slice::<InboundMessage>(&frame) {
                Ok(message) => {
                    if inbound.send(message).await.is_err() {
                        break;
                    }
                }
                Err(e) => log::warn!("Skipping undecodable message: {e}"),
            },
            Ok(None) => break,
            Err(e @ HostError::FrameTooLarge { .. }) => log::warn!("Skipping message: {e}"),
            Err(e) => {
                log::error!("Native-messaging read failed: {e}");
                break;
            }
        }
    }
}
