use reqwest::blocking::{Client, Response};
use std::io::{self, Read};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use log::{debug, trace};

use crate::error::OpenError;
use crate::reader::OpenOptions;

/// Sequential body of an HTTP(S) GET response
pub struct HttpStream {
    response: Response,
    transferred_bytes: Arc<AtomicU64>,
}

impl HttpStream {
    /// Send a GET request for `url` and keep the response body open for reading.
    ///
    /// Ambient proxy settings are ignored unless [`OpenOptions::use_proxy`]
    /// was enabled. Non-success statuses are reported as open errors.
    pub fn open(url: &str, options: &OpenOptions) -> Result<Self, OpenError> {
        let to_open_error = |source| OpenError::Url {
            url: url.to_string(),
            source,
        };

        let mut builder = Client::builder().timeout(options.timeout);
        if !options.use_proxy {
            builder = builder.no_proxy();
        }
        let client = builder.build().map_err(to_open_error)?;

        let response = client
            .get(url)
            .send()
            .and_then(Response::error_for_status)
            .map_err(to_open_error)?;

        debug!(
            "opened URL '{}' (status {}, content-length {:?})",
            url,
            response.status(),
            response.content_length()
        );

        Ok(Self {
            response,
            transferred_bytes: Arc::new(AtomicU64::new(0)),
        })
    }

    /// A shared handle to the transfer counter that outlives moving the stream
    pub fn transfer_counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.transferred_bytes)
    }
}

impl Read for HttpStream {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.response.read(buf)?;
        self.transferred_bytes
            .fetch_add(n as u64, Ordering::Relaxed);
        trace!("received {} bytes from {}", n, self.response.url());
        Ok(n)
    }
}
