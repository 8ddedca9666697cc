//! The gateway service: strategy dispatch, lifecycle, and messaging.

use std::sync::{Arc, Mutex, Weak};

use log::{debug, info, warn};
use serde_json::{json, Value};
use tokio::sync::mpsc;

use crate::cache_set::{CacheSet, CachedAsset};
use crate::fetch::{AssetFetcherTrait, FetchedAsset};
use crate::messages::{ClientMessage, CommandReply, GatewayCommand};
use crate::push::{parse_push_payload, NotifierTrait};
use crate::routes::{classify, GatewayConfig, GatewayRequest, RouteClass};
use tradebook_api_cache::ApiCache;
use tradebook_core::errors::{Error, Result};
use tradebook_core::events::{EventBus, Subscription, SyncEvent};
use tradebook_core::sync::{SyncTriggerRegistrarTrait, SyncTriggerSinkTrait};
use tradebook_core::utils::Clock;

/// Where an intercepted response came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServedFrom {
    /// Fresh from the network.
    Network,
    /// A named cache.
    Cache,
    /// The dedicated offline page.
    OfflineFallback,
    /// Synthesized by the gateway (structured 503).
    Synthesized,
}

/// Response produced by the interception layer.
#[derive(Debug, Clone)]
pub struct GatewayResponse {
    pub status: u16,
    pub content_type: String,
    pub body: Vec<u8>,
    pub served_from: ServedFrom,
}

impl GatewayResponse {
    fn from_asset(asset: FetchedAsset, served_from: ServedFrom) -> Self {
        Self {
            status: asset.status,
            content_type: asset.content_type,
            body: asset.body,
            served_from,
        }
    }

    fn from_cached(asset: CachedAsset, served_from: ServedFrom) -> Self {
        Self {
            status: asset.status,
            content_type: asset.content_type,
            body: asset.body,
            served_from,
        }
    }
}

/// Window/tab control for notification click routing.
pub trait ClientWindowsTrait: Send + Sync {
    /// Focus an already-open tab of this origin. Returns whether one existed.
    fn focus_existing(&self) -> bool;
    /// Open a new tab at `url`.
    fn open(&self, url: &str);
}

/// Collaborators injected into the gateway.
pub struct GatewayDeps {
    pub assets: Arc<dyn AssetFetcherTrait>,
    pub notifier: Arc<dyn NotifierTrait>,
    pub windows: Arc<dyn ClientWindowsTrait>,
    pub sync_sink: Arc<dyn SyncTriggerSinkTrait>,
    pub events: EventBus,
    /// When present, pruned during activation for storage hygiene.
    pub response_cache: Option<ApiCache>,
    pub clock: Arc<dyn Clock>,
}

struct GatewayInner {
    config: GatewayConfig,
    deps: GatewayDeps,
    caches: CacheSet,
    clients: Mutex<Vec<mpsc::UnboundedSender<ClientMessage>>>,
    pending_triggers: Mutex<Vec<String>>,
    online_sub: Mutex<Option<Subscription>>,
}

/// The network interception layer.
///
/// Cheap to clone; clones share the cache set and client registry.
#[derive(Clone)]
pub struct GatewayService {
    inner: Arc<GatewayInner>,
}

impl GatewayService {
    /// Create the gateway and hook deferred triggers to reconnection.
    pub fn create(config: GatewayConfig, deps: GatewayDeps) -> Self {
        let events = deps.events.clone();
        let service = Self {
            inner: Arc::new(GatewayInner {
                config,
                deps,
                caches: CacheSet::new(),
                clients: Mutex::new(Vec::new()),
                pending_triggers: Mutex::new(Vec::new()),
                online_sub: Mutex::new(None),
            }),
        };

        let weak: Weak<GatewayInner> = Arc::downgrade(&service.inner);
        let subscription = events.subscribe(move |event| {
            if matches!(event, SyncEvent::Online) {
                if let Some(inner) = weak.upgrade() {
                    let service = GatewayService { inner };
                    tokio::spawn(async move {
                        service.fire_pending_triggers().await;
                    });
                }
            }
        });
        *service.inner.online_sub.lock().unwrap() = Some(subscription);

        service
    }

    /// Install step: pre-populate the current static cache with the app
    /// shell and static assets.
    pub async fn install(&self) -> Result<()> {
        let cache_name = self.inner.config.static_cache_name();
        for url in &self.inner.config.precache {
            let asset = self.inner.deps.assets.fetch(url).await?;
            self.cache_asset(&cache_name, url, asset);
        }
        info!(
            "Installed {} precached asset(s) into {}",
            self.inner.config.precache.len(),
            cache_name
        );
        Ok(())
    }

    /// Activate step: delete every cache from older versions, tell the tabs,
    /// and prune the API response cache.
    ///
    /// Returns the deleted cache names.
    pub async fn activate(&self) -> Result<Vec<String>> {
        let keep = self.inner.config.current_cache_names();
        let deleted = self.inner.caches.retain_only(&keep);
        for name in &deleted {
            info!("Deleted stale cache {}", name);
        }

        self.broadcast(&ClientMessage::SwActivated {
            version: self.inner.config.version.clone(),
        });

        if let Some(response_cache) = &self.inner.deps.response_cache {
            let pruned = response_cache.prune().await?;
            debug!("Activation pruned {} persistent cache entries", pruned);
        }

        Ok(deleted)
    }

    /// Intercept a request.
    ///
    /// Returns `Ok(None)` when the request is not ours to handle (non-GET
    /// or non-HTTP) and the caller should hit the network directly.
    pub async fn handle_request(&self, request: &GatewayRequest) -> Result<Option<GatewayResponse>> {
        match classify(&self.inner.config, request) {
            RouteClass::Passthrough => Ok(None),
            RouteClass::Api => self.network_first(request).await.map(Some),
            RouteClass::Navigation => self.shell_first(request).await.map(Some),
            RouteClass::StaticAsset => self.stale_while_revalidate(request).await.map(Some),
        }
    }

    /// Handle an application command. `GET_VERSION` produces a reply.
    pub async fn handle_command(&self, command: GatewayCommand) -> Result<Option<CommandReply>> {
        match command {
            GatewayCommand::SkipWaiting => {
                info!("SKIP_WAITING received; activating immediately");
                self.activate().await?;
                Ok(None)
            }
            GatewayCommand::GetVersion => Ok(Some(CommandReply {
                version: self.inner.config.version.clone(),
            })),
            GatewayCommand::CacheTrade { trade } => {
                let trade_id = trade.get("id").and_then(Value::as_str).ok_or_else(|| {
                    Error::Validation("CACHE_TRADE payload has no trade id".to_string())
                })?;
                let url = format!("{}trades/{}", self.inner.config.api_prefix, trade_id);
                let body = serde_json::to_vec(&trade)?;
                self.cache_asset(
                    &self.inner.config.api_cache_name(),
                    &url,
                    FetchedAsset {
                        status: 200,
                        content_type: "application/json".to_string(),
                        body,
                    },
                );
                debug!("Opportunistically cached {}", url);
                Ok(None)
            }
        }
    }

    /// Register a tab; broadcasts are delivered on the returned channel.
    pub fn connect_client(&self) -> mpsc::UnboundedReceiver<ClientMessage> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.inner.clients.lock().unwrap().push(tx);
        rx
    }

    /// Deliver a message to every connected tab, dropping dead channels.
    pub fn broadcast(&self, message: &ClientMessage) {
        let mut clients = self.inner.clients.lock().unwrap();
        clients.retain(|client| client.send(message.clone()).is_ok());
    }

    /// Handle an inbound push payload: parse defensively and render.
    pub fn handle_push(&self, raw: Option<&str>) -> Result<()> {
        let notification = parse_push_payload(raw);
        self.inner.deps.notifier.show(&notification)
    }

    /// Route a notification click: focus an existing tab or open a new one,
    /// then always relay the action to the application.
    pub fn notification_clicked(&self, action: &str, data: Value) {
        if !self.inner.deps.windows.focus_existing() {
            self.inner.deps.windows.open(&self.inner.config.app_shell);
        }
        self.broadcast(&ClientMessage::NotificationClicked {
            action: action.to_string(),
            data,
        });
    }

    /// Fire every deferred trigger into the coordinator, then report
    /// completion to the tabs.
    async fn fire_pending_triggers(&self) {
        let tags: Vec<String> = self.inner.pending_triggers.lock().unwrap().drain(..).collect();
        for tag in tags {
            debug!("Firing deferred sync trigger '{}'", tag);
            self.inner.deps.sync_sink.trigger_sync(&tag).await;
            self.broadcast(&ClientMessage::SyncComplete {
                sync_type: tag.clone(),
            });
        }
    }

    /// Network-first strategy for API calls.
    async fn network_first(&self, request: &GatewayRequest) -> Result<GatewayResponse> {
        let cache_name = self.inner.config.api_cache_name();
        let key = request.path().to_string();

        match self.inner.deps.assets.fetch(&request.url).await {
            Ok(asset) => {
                self.cache_asset(&cache_name, &key, asset.clone());
                Ok(GatewayResponse::from_asset(asset, ServedFrom::Network))
            }
            Err(err) => {
                if let Some(cached) = self.inner.caches.get(&cache_name, &key) {
                    warn!("{}: network failed, serving cached API copy ({})", key, err);
                    return Ok(GatewayResponse::from_cached(cached, ServedFrom::Cache));
                }
                warn!("{}: network failed with no cached copy ({})", key, err);
                Ok(self.synthesize_offline_error())
            }
        }
    }

    /// Cache-first strategy for document loads, keyed to the app shell.
    async fn shell_first(&self, request: &GatewayRequest) -> Result<GatewayResponse> {
        let cache_name = self.inner.config.static_cache_name();
        let shell = self.inner.config.app_shell.clone();

        if let Some(cached) = self.inner.caches.get(&cache_name, &shell) {
            return Ok(GatewayResponse::from_cached(cached, ServedFrom::Cache));
        }

        match self.inner.deps.assets.fetch(&request.url).await {
            Ok(asset) => {
                self.cache_asset(&cache_name, &shell, asset.clone());
                Ok(GatewayResponse::from_asset(asset, ServedFrom::Network))
            }
            Err(err) => {
                warn!("Navigation fetch failed ({}); serving offline page", err);
                match self
                    .inner
                    .caches
                    .get(&cache_name, &self.inner.config.offline_page)
                {
                    Some(offline) => Ok(GatewayResponse::from_cached(
                        offline,
                        ServedFrom::OfflineFallback,
                    )),
                    None => Ok(GatewayResponse {
                        status: 503,
                        content_type: "text/html".to_string(),
                        body: b"<!doctype html><title>Offline</title><p>Tradebook is offline.</p>"
                            .to_vec(),
                        served_from: ServedFrom::Synthesized,
                    }),
                }
            }
        }
    }

    /// Stale-while-revalidate strategy for static assets.
    async fn stale_while_revalidate(&self, request: &GatewayRequest) -> Result<GatewayResponse> {
        let cache_name = self.inner.config.static_cache_name();
        let key = request.path().to_string();

        if let Some(cached) = self.inner.caches.get(&cache_name, &key) {
            // Serve immediately, refresh behind the caller's back.
            let service = self.clone();
            let url = request.url.clone();
            tokio::spawn(async move {
                match service.inner.deps.assets.fetch(&url).await {
                    Ok(asset) => service.cache_asset(&cache_name, &key, asset),
                    Err(err) => debug!("Background asset refresh of {} failed: {}", key, err),
                }
            });
            return Ok(GatewayResponse::from_cached(cached, ServedFrom::Cache));
        }

        let asset = self.inner.deps.assets.fetch(&request.url).await?;
        self.cache_asset(
            &self.inner.config.static_cache_name(),
            &key,
            asset.clone(),
        );
        Ok(GatewayResponse::from_asset(asset, ServedFrom::Network))
    }

    fn cache_asset(&self, cache_name: &str, url: &str, asset: FetchedAsset) {
        self.inner.caches.put(
            cache_name,
            url,
            CachedAsset {
                status: asset.status,
                content_type: asset.content_type,
                body: asset.body,
                stored_at: self.inner.deps.clock.now(),
            },
        );
    }

    fn synthesize_offline_error(&self) -> GatewayResponse {
        let body = json!({
            "error": "offline",
            "message": "This request needs a connection and no cached copy exists.",
        });
        GatewayResponse {
            status: 503,
            content_type: "application/json".to_string(),
            body: serde_json::to_vec(&body).unwrap_or_default(),
            served_from: ServedFrom::Synthesized,
        }
    }

    /// Names of the caches currently held (test and debugging aid).
    pub fn cache_names(&self) -> Vec<String> {
        self.inner.caches.cache_names()
    }

    /// Seed a named cache directly (used when migrating from an older
    /// version and in tests).
    pub fn seed_cache(&self, cache_name: &str, url: &str, asset: CachedAsset) {
        self.inner.caches.put(cache_name, url, asset);
    }
}

impl SyncTriggerRegistrarTrait for GatewayService {
    fn register_sync(&self, tag: &str) -> Result<()> {
        let mut pending = self.inner.pending_triggers.lock().unwrap();
        if !pending.iter().any(|existing| existing == tag) {
            debug!("Registered deferred sync trigger '{}'", tag);
            pending.push(tag.to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::time::Duration;
    use tradebook_core::connectivity::ConnectivityMonitor;
    use tradebook_core::utils::SystemClock;

    // --- Mock asset fetcher ---
    #[derive(Default)]
    struct MockAssets {
        responses: Mutex<HashMap<String, FetchedAsset>>,
        offline: AtomicBool,
        calls: AtomicUsize,
    }

    impl MockAssets {
        fn serve(&self, url: &str, body: &str) {
            self.responses.lock().unwrap().insert(
                url.to_string(),
                FetchedAsset {
                    status: 200,
                    content_type: "application/json".to_string(),
                    body: body.as_bytes().to_vec(),
                },
            );
        }

        fn go_offline(&self) {
            self.offline.store(true, Ordering::SeqCst);
        }
    }

    #[async_trait]
    impl AssetFetcherTrait for MockAssets {
        async fn fetch(&self, url: &str) -> Result<FetchedAsset> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.offline.load(Ordering::SeqCst) {
                return Err(Error::network("offline"));
            }
            self.responses
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| Error::http(404, "not found"))
        }
    }

    // --- Mock notifier ---
    #[derive(Default)]
    struct RecordingNotifier {
        shown: Mutex<Vec<crate::push::PushNotification>>,
    }

    impl NotifierTrait for RecordingNotifier {
        fn show(&self, notification: &crate::push::PushNotification) -> Result<()> {
            self.shown.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    // --- Mock windows ---
    #[derive(Default)]
    struct MockWindows {
        has_tab: AtomicBool,
        focused: AtomicUsize,
        opened: Mutex<Vec<String>>,
    }

    impl ClientWindowsTrait for MockWindows {
        fn focus_existing(&self) -> bool {
            if self.has_tab.load(Ordering::SeqCst) {
                self.focused.fetch_add(1, Ordering::SeqCst);
                true
            } else {
                false
            }
        }

        fn open(&self, url: &str) {
            self.opened.lock().unwrap().push(url.to_string());
        }
    }

    // --- Mock sync sink ---
    #[derive(Default)]
    struct RecordingSink {
        triggered: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl SyncTriggerSinkTrait for RecordingSink {
        async fn trigger_sync(&self, tag: &str) {
            self.triggered.lock().unwrap().push(tag.to_string());
        }
    }

    struct Fixture {
        gateway: GatewayService,
        assets: Arc<MockAssets>,
        notifier: Arc<RecordingNotifier>,
        windows: Arc<MockWindows>,
        sink: Arc<RecordingSink>,
        bus: EventBus,
    }

    fn fixture(version: &str) -> Fixture {
        let assets = Arc::new(MockAssets::default());
        let notifier = Arc::new(RecordingNotifier::default());
        let windows = Arc::new(MockWindows::default());
        let sink = Arc::new(RecordingSink::default());
        let bus = EventBus::new();

        let mut config = GatewayConfig::default();
        config.version = version.to_string();

        let gateway = GatewayService::create(
            config,
            GatewayDeps {
                assets: Arc::clone(&assets) as Arc<dyn AssetFetcherTrait>,
                notifier: Arc::clone(&notifier) as Arc<dyn NotifierTrait>,
                windows: Arc::clone(&windows) as Arc<dyn ClientWindowsTrait>,
                sync_sink: Arc::clone(&sink) as Arc<dyn SyncTriggerSinkTrait>,
                events: bus.clone(),
                response_cache: None,
                clock: Arc::new(SystemClock),
            },
        );

        Fixture {
            gateway,
            assets,
            notifier,
            windows,
            sink,
            bus,
        }
    }

    fn stale_asset() -> CachedAsset {
        CachedAsset {
            status: 200,
            content_type: "text/plain".to_string(),
            body: b"stale".to_vec(),
            stored_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_activate_deletes_exactly_the_stale_caches() {
        let f = fixture("v3");
        // Two stale caches from older deployments plus one current one.
        f.gateway.seed_cache("tradebook-static-v1", "/app.js", stale_asset());
        f.gateway.seed_cache("tradebook-api-v2", "/api/trades", stale_asset());
        f.gateway
            .seed_cache("tradebook-static-v3", "/app.js", stale_asset());

        let mut client = f.gateway.connect_client();
        let mut deleted = f.gateway.activate().await.unwrap();
        deleted.sort();

        assert_eq!(deleted, vec!["tradebook-api-v2", "tradebook-static-v1"]);
        assert_eq!(f.gateway.cache_names(), vec!["tradebook-static-v3"]);
        assert_eq!(
            client.recv().await.unwrap(),
            ClientMessage::SwActivated {
                version: "v3".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_install_precaches_the_manifest() {
        let f = fixture("v1");
        f.assets.serve("/index.html", "<html>shell</html>");
        f.assets.serve("/offline.html", "<html>offline</html>");
        f.assets.serve("/manifest.json", "{}");

        f.gateway.install().await.unwrap();

        let response = f
            .gateway
            .handle_request(&GatewayRequest::navigation("/journal"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.served_from, ServedFrom::Cache);
        assert_eq!(response.body, b"<html>shell</html>");
    }

    #[tokio::test]
    async fn test_api_network_first_then_cache_then_synthesized() {
        let f = fixture("v1");
        f.assets.serve("/api/trades", r#"{"trades":[1]}"#);

        // Online: network wins and the response is cached.
        let fresh = f
            .gateway
            .handle_request(&GatewayRequest::get("/api/trades"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(fresh.served_from, ServedFrom::Network);

        // Offline with a cached copy: fall back to it.
        f.assets.go_offline();
        let cached = f
            .gateway
            .handle_request(&GatewayRequest::get("/api/trades"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cached.served_from, ServedFrom::Cache);
        assert_eq!(cached.body, br#"{"trades":[1]}"#.to_vec());

        // Offline with no cached copy: structured 503.
        let synthesized = f
            .gateway
            .handle_request(&GatewayRequest::get("/api/journal"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(synthesized.served_from, ServedFrom::Synthesized);
        assert_eq!(synthesized.status, 503);
        let body: Value = serde_json::from_slice(&synthesized.body).unwrap();
        assert_eq!(body["error"], "offline");
    }

    #[tokio::test]
    async fn test_navigation_offline_falls_back_to_offline_page() {
        // Only the offline page made it into the cache before connectivity
        // was lost.
        let f = fixture("v1");
        f.assets.go_offline();
        f.gateway.seed_cache(
            "tradebook-static-v1",
            "/offline.html",
            CachedAsset {
                status: 200,
                content_type: "text/html".to_string(),
                body: b"<html>offline</html>".to_vec(),
                stored_at: Utc::now(),
            },
        );

        let response = f
            .gateway
            .handle_request(&GatewayRequest::navigation("/journal"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.served_from, ServedFrom::OfflineFallback);
        assert_eq!(response.body, b"<html>offline</html>");
    }

    #[tokio::test]
    async fn test_navigation_with_nothing_cached_synthesizes_offline_page() {
        let f = fixture("v1");
        f.assets.go_offline();

        let response = f
            .gateway
            .handle_request(&GatewayRequest::navigation("/journal"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.served_from, ServedFrom::Synthesized);
        assert_eq!(response.status, 503);
    }

    #[tokio::test]
    async fn test_static_asset_stale_while_revalidate() {
        let f = fixture("v1");
        f.assets.serve("/assets/app.js", "v1 code");

        // First request goes to the network.
        let first = f
            .gateway
            .handle_request(&GatewayRequest::get("/assets/app.js"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(first.served_from, ServedFrom::Network);

        // Update the origin; the next request still serves the cached copy
        // and refreshes in the background.
        f.assets.serve("/assets/app.js", "v2 code");
        let second = f
            .gateway
            .handle_request(&GatewayRequest::get("/assets/app.js"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(second.served_from, ServedFrom::Cache);
        assert_eq!(second.body, b"v1 code");

        tokio::time::sleep(Duration::from_millis(50)).await;
        let third = f
            .gateway
            .handle_request(&GatewayRequest::get("/assets/app.js"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(third.body, b"v2 code");
    }

    #[tokio::test]
    async fn test_non_get_is_not_intercepted() {
        let f = fixture("v1");
        let request = GatewayRequest {
            method: "POST".to_string(),
            url: "/api/trades".to_string(),
            is_navigation: false,
        };

        assert!(f.gateway.handle_request(&request).await.unwrap().is_none());
        assert_eq!(f.assets.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_get_version_and_cache_trade_commands() {
        let f = fixture("v5");

        let reply = f
            .gateway
            .handle_command(GatewayCommand::GetVersion)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(reply.version, "v5");

        // CACHE_TRADE makes the record servable while offline.
        f.gateway
            .handle_command(GatewayCommand::CacheTrade {
                trade: json!({"id": "t1", "instrument": "ES"}),
            })
            .await
            .unwrap();

        f.assets.go_offline();
        let response = f
            .gateway
            .handle_request(&GatewayRequest::get("/api/trades/t1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(response.served_from, ServedFrom::Cache);
        let body: Value = serde_json::from_slice(&response.body).unwrap();
        assert_eq!(body["instrument"], "ES");
    }

    #[tokio::test]
    async fn test_cache_trade_without_id_is_rejected() {
        let f = fixture("v1");
        let err = f
            .gateway
            .handle_command(GatewayCommand::CacheTrade {
                trade: json!({"instrument": "ES"}),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_push_renders_notification() {
        let f = fixture("v1");
        f.gateway
            .handle_push(Some(r#"{"title": "Filled", "body": "ES long filled"}"#))
            .unwrap();
        f.gateway.handle_push(Some("garbage{{{")).unwrap();

        let shown = f.notifier.shown.lock().unwrap();
        assert_eq!(shown.len(), 2);
        assert_eq!(shown[0].title, "Filled");
        assert_eq!(shown[1].title, "Tradebook"); // defensive default
    }

    #[tokio::test]
    async fn test_notification_click_opens_when_no_tab_exists() {
        let f = fixture("v1");
        let mut client = f.gateway.connect_client();

        f.gateway
            .notification_clicked("open", json!({"tradeId": "t1"}));

        assert_eq!(*f.windows.opened.lock().unwrap(), vec!["/index.html"]);
        assert_eq!(
            client.recv().await.unwrap(),
            ClientMessage::NotificationClicked {
                action: "open".to_string(),
                data: json!({"tradeId": "t1"})
            }
        );
    }

    #[tokio::test]
    async fn test_notification_click_prefers_existing_tab() {
        let f = fixture("v1");
        f.windows.has_tab.store(true, Ordering::SeqCst);

        f.gateway.notification_clicked("open", Value::Null);

        assert_eq!(f.windows.focused.load(Ordering::SeqCst), 1);
        assert!(f.windows.opened.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_deferred_trigger_fires_on_reconnect() {
        let f = fixture("v1");
        let connectivity = ConnectivityMonitor::new(f.bus.clone(), false);
        let mut client = f.gateway.connect_client();

        f.gateway.register_sync("sync-trades").unwrap();
        // Re-registration is de-duplicated.
        f.gateway.register_sync("sync-trades").unwrap();

        connectivity.set_online(true);
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(*f.sink.triggered.lock().unwrap(), vec!["sync-trades"]);
        assert_eq!(
            client.recv().await.unwrap(),
            ClientMessage::SyncComplete {
                sync_type: "sync-trades".to_string()
            }
        );
    }
}
