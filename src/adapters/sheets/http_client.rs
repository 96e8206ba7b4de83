use google_sheets4::{hyper, hyper_rustls};

pub type HttpsConnector = hyper_rustls::HttpsConnector<hyper::client::HttpConnector>;

pub fn http_client() -> hyper::Client<HttpsConnector> {
    hyper::Client::builder().build(
        hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .expect("failed to load native root certificates")
            .https_only()
            .enable_http1()
            .build(),
    )
}

/// Same stack, but accepting plain `http://` endpoints for local test servers.
#[cfg(test)]
pub fn plain_http_client() -> hyper::Client<HttpsConnector> {
    hyper::Client::builder().build(
        hyper_rustls::HttpsConnectorBuilder::new()
            .with_native_roots()
            .expect("failed to load native root certificates")
            .https_or_http()
            .enable_http1()
            .build(),
    )
}
