//! Tradebook network interception layer.
//!
//! The service-worker equivalent of the offline stack: sits between the
//! application and the network, applies a caching strategy per route class,
//! owns the versioned cache-set lifecycle (install/activate/cleanup), and
//! relays push notifications and cross-tab messages.
//!
//! Routing policy, in priority order:
//! 1. non-GET or non-HTTP requests pass through untouched
//! 2. API paths: network-first with cache fallback, synthesizing a
//!    structured 503 on a total miss
//! 3. navigation requests: cache-first against the app shell, with a
//!    dedicated offline page as the last resort
//! 4. everything else: stale-while-revalidate

mod cache_set;
mod fetch;
mod messages;
mod push;
mod routes;
mod service;

pub use cache_set::{CacheSet, CachedAsset};
pub use fetch::{AssetFetcherTrait, FetchedAsset, ReqwestAssetFetcher};
pub use messages::{ClientMessage, CommandReply, GatewayCommand};
pub use push::{parse_push_payload, LogNotifier, NotifierTrait, PushNotification};
pub use routes::{classify, GatewayConfig, GatewayRequest, RouteClass};
pub use service::{ClientWindowsTrait, GatewayDeps, GatewayResponse, GatewayService, ServedFrom};
