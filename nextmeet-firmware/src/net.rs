//! HTTP fetcher over the CYW43 link
//!
//! Plain HTTP GET with reqwless on top of embassy-net. A fresh TCP
//! connection is opened per request; the endpoints live on the LAN and are
//! fetched a few times an hour at most.

use cyw43::Control;
use defmt::*;
use embassy_net::dns::DnsSocket;
use embassy_net::tcp::client::{TcpClient, TcpClientState};
use embassy_net::Stack;
use embassy_time::{with_timeout, Duration};
use embedded_io_async::Read;
use nextmeet_core::config::NetworkSettings;
use nextmeet_core::error::FetchError;
use nextmeet_core::traits::Fetcher;
use reqwless::client::HttpClient;
use reqwless::request::Method;

use crate::wifi;

/// TCP socket buffer sizes
const TCP_BUFFER_LEN: usize = 1024;

/// Response headers plus the start of the body
const RX_BUFFER_LEN: usize = 2048;

/// Upper bound on one request, connect to last body byte
const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

pub struct HttpFetcher {
    stack: Stack<'static>,
    control: Control<'static>,
    network: &'static NetworkSettings,
    tcp_state: TcpClientState<1, TCP_BUFFER_LEN, TCP_BUFFER_LEN>,
    rx: [u8; RX_BUFFER_LEN],
}

impl HttpFetcher {
    pub fn new(
        stack: Stack<'static>,
        control: Control<'static>,
        network: &'static NetworkSettings,
    ) -> Self {
        Self {
            stack,
            control,
            network,
            tcp_state: TcpClientState::new(),
            rx: [0; RX_BUFFER_LEN],
        }
    }

    async fn get(&mut self, url: &str, buf: &mut [u8]) -> Result<usize, FetchError> {
        let tcp = TcpClient::new(self.stack, &self.tcp_state);
        let dns = DnsSocket::new(self.stack);
        let mut client = HttpClient::new(&tcp, &dns);

        let mut request = client
            .request(Method::GET, url)
            .await
            .map_err(request_error)?;
        let response = request.send(&mut self.rx).await.map_err(request_error)?;

        let status = response.status;
        if !status.is_successful() {
            return Err(FetchError::Status(status.0));
        }

        let mut reader = response.body().reader();
        let mut len = 0;
        loop {
            if len == buf.len() {
                // Full; anything left over means the body did not fit
                let mut probe = [0u8; 1];
                return match reader.read(&mut probe).await {
                    Ok(0) => Ok(len),
                    Ok(_) => Err(FetchError::BufferTooSmall),
                    Err(_) => Err(FetchError::Request),
                };
            }
            match reader.read(&mut buf[len..]).await {
                Ok(0) => return Ok(len),
                Ok(n) => len += n,
                Err(_) => return Err(FetchError::Request),
            }
        }
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&mut self, url: &str, buf: &mut [u8]) -> Result<usize, FetchError> {
        if !self.stack.is_config_up() {
            return Err(FetchError::LinkDown);
        }

        debug!("GET {}", url);
        let len = with_timeout(FETCH_TIMEOUT, self.get(url, buf))
            .await
            .map_err(|_| FetchError::Connect)??;
        debug!("{} bytes from {}", len, url);
        Ok(len)
    }

    async fn reconnect(&mut self) -> Result<(), FetchError> {
        warn!("Reconnecting WiFi");
        self.control.leave().await;
        wifi::join(&mut self.control, self.stack, self.network).await
    }
}

fn request_error(e: reqwless::Error) -> FetchError {
    match e {
        reqwless::Error::Dns => FetchError::Dns,
        reqwless::Error::Network(_) => FetchError::Connect,
        reqwless::Error::BufferTooSmall => FetchError::BufferTooSmall,
        _ => FetchError::Request,
    }
}
