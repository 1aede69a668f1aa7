//! Local endpoints standing in for an unavailable CoinGecko.

use tokio::net::TcpListener;

/// Base URL of a server that accepts connections and never answers.
pub(crate) async fn unresponsive_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        // Keep sockets open so the client waits until its own timeout.
        let mut held = Vec::new();

        while let Ok((socket, _)) = listener.accept().await {
            held.push(socket);
        }
    });

    format!("http://{addr}")
}

/// Base URL of a port nothing listens on.
pub(crate) async fn refused_base_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    drop(listener);

    format!("http://{addr}")
}
