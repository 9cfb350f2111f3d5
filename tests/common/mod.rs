#![allow(dead_code)]

use std::net::SocketAddr;

use axum::Router;
use chatbot_client::{message::Sender, services::renderer::Renderer};

/// Keeps every bubble in memory instead of drawing it.
#[derive(Debug, Default)]
pub struct Recorded(pub Vec<(String, Sender)>);

impl Recorded {
    pub fn texts(&self, sender: Sender) -> Vec<&str> {
        self.0
            .iter()
            .filter(|(_, s)| *s == sender)
            .map(|(t, _)| t.as_str())
            .collect()
    }
}

impl Renderer for Recorded {
    fn append(&mut self, text: &str, sender: Sender) {
        self.0.push((text.to_string(), sender));
    }
}

/// Serves `router` on an ephemeral local port.
pub async fn spawn_stub(router: Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An address nothing is listening on.
pub async fn dead_addr() -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

pub fn chat_url(addr: SocketAddr) -> reqwest::Url {
    format!("http://{addr}/chat").parse().unwrap()
}
