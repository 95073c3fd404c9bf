// SPDX-License-Identifier: GPL-3.0-or-later

//! Concurrent artwork search: HTTP transport, image validation and the
//! coordinator that drives the provider parsers.

pub mod coordinator;
pub mod credentials;
pub mod downloader;
pub mod error;
pub mod image;
pub mod rate_limiter;
pub mod transport;

pub use coordinator::{
    AllDoneCallback, ArtworkSearch, ProviderDoneCallback, ResultCallback, SearchCallbacks,
    SearchPhase, SearchRequest,
};
pub use coverhunt_providers::{Endpoints, ProviderKind};
pub use credentials::{endpoints_from_config, ConfigCredentials, CredentialsProvider};
pub use downloader::ArtworkCandidate;
pub use error::TransportError;
pub use transport::{HttpTransport, ReqwestTransport, ReqwestTransportBuilder};
