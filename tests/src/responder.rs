use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;

const MAX_LATENCY_MS: u64 = 50;

#[derive(Debug, Clone, Copy)]
pub enum Behaviour {
    /// Sends an SSH identification string.
    Ssh,
    /// Answers like a web server.
    Http,
    /// Accepts and never says anything.
    Silent,
}

/// A local listener that greets every connection after a random delay.
pub struct Responder {
    pub port: u16,
    task: JoinHandle<()>,
}

impl Drop for Responder {
    fn drop(&mut self) {
        self.task.abort();
    }
}

pub async fn spawn(behaviour: Behaviour) -> anyhow::Result<Responder> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();

    let task = tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(greet(socket, behaviour));
        }
    });

    Ok(Responder { port, task })
}

async fn greet(mut socket: TcpStream, behaviour: Behaviour) {
    let latency = Duration::from_millis(rand::random_range(0..MAX_LATENCY_MS));
    tokio::time::sleep(latency).await;

    let greeting: &[u8] = match behaviour {
        Behaviour::Ssh => b"SSH-2.0-MockSSH_1.0\r\n",
        Behaviour::Http => b"HTTP/1.1 400 Bad Request\r\nConnection: close\r\n\r\n",
        Behaviour::Silent => {
            tokio::time::sleep(Duration::from_secs(30)).await;
            return;
        }
    };

    if socket.write_all(greeting).await.is_err() {
        return;
    }

    match behaviour {
        Behaviour::Ssh => {
            let mut client_ident = [0u8; 255];
            let _ = socket.read(&mut client_ident).await;
        }
        _ => {
            let _ = socket.shutdown().await;
        }
    }
}

/// A loopback port with nothing listening on it.
pub async fn closed_port() -> anyhow::Result<u16> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let port = listener.local_addr()?.port();
    drop(listener);
    Ok(port)
}
