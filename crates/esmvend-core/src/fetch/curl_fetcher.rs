//! libcurl-backed fetcher.

use crate::config::FetchConfig;
use crate::error::FetchError;

use super::Fetch;

/// Status a module response must have; anything else is an error.
const HTTP_OK: u32 = 200;

/// Blocking GET via a fresh `curl::easy::Easy` per call.
#[derive(Debug, Clone, Default)]
pub struct CurlFetcher {
    cfg: FetchConfig,
}

impl CurlFetcher {
    pub fn new(cfg: FetchConfig) -> Self {
        Self { cfg }
    }

    fn configure(&self, easy: &mut curl::easy::Easy, url: &str) -> Result<(), curl::Error> {
        easy.url(url)?;
        easy.get(true)?;
        easy.follow_location(true)?;
        easy.max_redirections(self.cfg.max_redirects)?;
        // Empty string = accept every encoding libcurl can decode.
        easy.accept_encoding("")?;
        easy.connect_timeout(self.cfg.connect_timeout())?;
        easy.timeout(self.cfg.timeout())?;
        if let Some(ua) = &self.cfg.user_agent {
            easy.useragent(ua)?;
        }
        Ok(())
    }
}

impl Fetch for CurlFetcher {
    fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let transport = |source: curl::Error| FetchError::Transport {
            url: url.to_string(),
            source,
        };

        let mut body: Vec<u8> = Vec::new();
        let mut easy = curl::easy::Easy::new();
        self.configure(&mut easy, url).map_err(transport)?;
        {
            let mut transfer = easy.transfer();
            transfer
                .write_function(|data| {
                    body.extend_from_slice(data);
                    Ok(data.len())
                })
                .map_err(transport)?;
            transfer.perform().map_err(transport)?;
        }

        let code = easy.response_code().map_err(transport)?;
        if code != HTTP_OK {
            tracing::debug!(url, code, "module fetch rejected");
            return Err(FetchError::HttpStatus {
                url: url.to_string(),
                code,
            });
        }
        tracing::debug!(url, bytes = body.len(), "module fetched");

        String::from_utf8(body).map_err(|source| FetchError::Decode {
            url: url.to_string(),
            source,
        })
    }
}
