use async_trait::async_trait;
use std::{fmt::Debug, time::Duration};
use tokio::net::TcpStream;
use tracing::debug;

/// Answers "can we reach the network right now?".
#[async_trait]
pub trait Reachability: Send + Sync + Debug {
    async fn is_online(&self) -> bool;
}

/// Dials a TCP address; any successful connect within the timeout counts as online.
#[derive(Debug, Clone)]
pub struct TcpProbe {
    addr: String,
    timeout: Duration,
}

impl TcpProbe {
    pub fn new(addr: impl Into<String>, timeout: Duration) -> Self {
        Self { addr: addr.into(), timeout }
    }
}

#[async_trait]
impl Reachability for TcpProbe {
    async fn is_online(&self) -> bool {
        let online = matches!(
            tokio::time::timeout(self.timeout, TcpStream::connect(self.addr.as_str())).await,
            Ok(Ok(_))
        );
        debug!(addr = %self.addr, online, "reachability probe");
        online
    }
}

/// Fixed answer, for tests and for forcing offline mode.
#[derive(Debug, Clone, Copy)]
pub struct Fixed(pub bool);

#[async_trait]
impl Reachability for Fixed {
    async fn is_online(&self) -> bool {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[tokio::test]
    async fn tcp_probe_online_when_listener_accepts() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let probe = TcpProbe::new(addr.to_string(), Duration::from_secs(1));
        assert!(probe.is_online().await);
    }

    #[tokio::test]
    async fn tcp_probe_offline_when_nothing_listens() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = TcpProbe::new(addr.to_string(), Duration::from_millis(200));
        assert!(!probe.is_online().await);
    }

    #[tokio::test]
    async fn fixed_returns_its_value() {
        assert!(Fixed(true).is_online().await);
        assert!(!Fixed(false).is_online().await);
    }
}
