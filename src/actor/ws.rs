//! WebSocket Actor - pushes reloads to connected browsers.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::messages::WsMsg;
use crate::debug;
use crate::reload::{self, ReloadChannel};

pub struct WsActor {
    rx: mpsc::Receiver<WsMsg>,
    channel: Arc<dyn ReloadChannel>,
}

impl WsActor {
    pub fn new(rx: mpsc::Receiver<WsMsg>, channel: Arc<dyn ReloadChannel>) -> Self {
        Self { rx, channel }
    }

    /// Run the actor event loop
    pub async fn run(mut self) {
        while let Some(msg) = self.rx.recv().await {
            match msg {
                WsMsg::Reload { generation } => {
                    self.blocking(move |channel| reload::announce(channel, generation))
                        .await;
                }
                WsMsg::Shutdown => break,
            }
        }
        debug!("ws"; "closing {} client(s)", self.channel.client_count());
        self.blocking(|channel| channel.close_all()).await;
    }

    /// Socket writes block, so they run off the runtime's worker threads.
    async fn blocking<F>(&self, f: F)
    where
        F: FnOnce(&dyn ReloadChannel) + Send + 'static,
    {
        let channel = Arc::clone(&self.channel);
        if let Err(e) = tokio::task::spawn_blocking(move || f(channel.as_ref())).await {
            debug!("ws"; "broadcast task failed: {e}");
        }
    }
}
