//! WebSocket push channel on the dev server's own port.

use std::io::{Read, Write};

use anyhow::{Result, anyhow};
use parking_lot::Mutex;
use tiny_http::{Header, Request, Response};
use tungstenite::handshake::derive_accept_key;
use tungstenite::protocol::{Message, Role, WebSocket};

use super::ReloadChannel;
use crate::debug;

/// Upgraded connection handed back by `tiny_http`.
trait Stream: Read + Write + Send {}
impl<T: Read + Write + Send> Stream for T {}

type Client = WebSocket<Box<dyn Stream>>;

#[derive(Default)]
pub struct WebSocketChannel {
    clients: Mutex<Vec<Client>>,
}

impl WebSocketChannel {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ReloadChannel for WebSocketChannel {
    fn is_live(&self) -> bool {
        true
    }

    fn accept(&self, request: Request) -> Result<()> {
        let key = request
            .headers()
            .iter()
            .find(|h| h.field.equiv("Sec-WebSocket-Key"))
            .map(|h| h.value.to_string());
        let Some(key) = key else {
            request.respond(Response::from_string("missing Sec-WebSocket-Key").with_status_code(400))?;
            return Ok(());
        };

        let accept = derive_accept_key(key.trim().as_bytes());
        let response = Response::empty(101)
            .with_header(header("Sec-WebSocket-Accept", &accept)?);
        let stream: Box<dyn Stream> = Box::new(request.upgrade("websocket", response));
        let ws = WebSocket::from_raw_socket(stream, Role::Server, None);

        let mut clients = self.clients.lock();
        clients.push(ws);
        debug!("reload"; "client connected (total: {})", clients.len());
        Ok(())
    }

    fn broadcast(&self, message: &str) -> usize {
        let mut clients = self.clients.lock();
        clients.retain_mut(|ws| match ws.send(Message::text(message.to_string())) {
            Ok(()) => true,
            Err(e) => {
                debug!("reload"; "dropping client: {}", e);
                false
            }
        });
        clients.len()
    }

    fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    fn close_all(&self) {
        let mut clients = self.clients.lock();
        for ws in clients.iter_mut() {
            let _ = ws.close(None);
            let _ = ws.flush();
        }
        clients.clear();
    }
}

fn header(field: &str, value: &str) -> Result<Header> {
    Header::from_bytes(field.as_bytes(), value.as_bytes())
        .map_err(|()| anyhow!("invalid header {field}: {value}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reload::{LIVERELOAD_PATH, RELOAD_TOKEN, is_upgrade_request};
    use std::net::TcpStream;
    use std::sync::Arc;
    use tiny_http::Server;

    #[test]
    fn test_upgrade_and_broadcast() {
        let server = Server::http("127.0.0.1:0").unwrap();
        let port = server.server_addr().to_ip().unwrap().port();
        let channel = Arc::new(WebSocketChannel::new());

        let accept_side = {
            let channel = Arc::clone(&channel);
            std::thread::spawn(move || {
                let request = server.recv().unwrap();
                assert!(is_upgrade_request(&request));
                channel.accept(request).unwrap();
            })
        };

        let stream = TcpStream::connect(("127.0.0.1", port)).unwrap();
        let url = format!("ws://127.0.0.1:{port}{LIVERELOAD_PATH}");
        let (mut client, _) = tungstenite::client(url, stream).unwrap();
        accept_side.join().unwrap();

        assert_eq!(channel.client_count(), 1);
        assert_eq!(channel.broadcast(RELOAD_TOKEN), 1);
        let msg = client.read().unwrap();
        assert_eq!(msg.into_text().unwrap().as_str(), RELOAD_TOKEN);

        channel.close_all();
        assert_eq!(channel.client_count(), 0);
    }
}
