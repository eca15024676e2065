use std::time::Duration;

use actix_web::{dev::Server, http::KeepAlive, middleware::Logger, web, App, HttpServer};
use log::*;
use pizza_payment_engine::{
    catalog::ShopCatalog,
    events::EventProducers,
    InMemoryStore,
    OrderFlowApi,
    PaymentGatewayClient,
    TransactionStore,
};

use crate::{
    config::ServerConfig,
    errors::ServerError,
    integrations::mpay::{create_settlement_journal_handlers, MpayGateway},
    reaper::start_reaper,
    routes::{
        health,
        PaymentCallbackRoute,
        PollOrderRoute,
        ShopProductByIdRoute,
        ShopProductsRoute,
        ShortlinkCallbackRoute,
        SubmitOrderRoute,
    },
};

pub async fn run_server(config: ServerConfig) -> Result<(), ServerError> {
    let store = InMemoryStore::new();
    let catalog = ShopCatalog::new();
    let gateway = MpayGateway::new(config.mpay.clone())?;
    let handlers = create_settlement_journal_handlers();
    let producers = handlers.producers();
    handlers.start_handlers().await;
    if config.order_ttl.is_zero() {
        warn!("🚀️ The stale order reaper is disabled. Orders will accumulate until restart");
    } else {
        start_reaper(store.clone(), config.order_ttl);
    }
    let srv = create_server_instance(config, store, gateway, catalog, producers)?;
    srv.await.map_err(|e| ServerError::Unspecified(e.to_string()))
}

/// Builds the HTTP server around the given backends.
///
/// The order flow state (the store, the menu registry and the poll waiter registry inside
/// [`OrderFlowApi`]) is shared by every worker, so the api is wrapped in `web::Data` once, out
/// here, and cloned into the worker factory. Constructing it inside the factory would give each
/// worker its own waiter registry, and callbacks would only ever wake the pollers that happened to
/// land on the same worker.
pub fn create_server_instance<S, G>(
    config: ServerConfig,
    store: S,
    gateway: G,
    catalog: ShopCatalog,
    producers: EventProducers,
) -> Result<Server, ServerError>
where
    S: TransactionStore + Send + Sync + 'static,
    G: PaymentGatewayClient + Send + Sync + 'static,
{
    let settings = config.order_flow_settings();
    // A suspended poll must not outlive the socket's keep-alive.
    let keep_alive = Duration::from_secs(600).max(config.poll_timeout + Duration::from_secs(30));
    let api = web::Data::new(OrderFlowApi::new(store, gateway, catalog, settings, producers));
    let srv = HttpServer::new(move || {
        App::new()
            .wrap(Logger::new("%t (%D ms) %s %a %{Host}i %U").log_target("ppg::access_log"))
            .app_data(api.clone())
            .service(health)
            .service(
                web::scope("/api")
                    .service(SubmitOrderRoute::<S, G>::new())
                    .service(PollOrderRoute::<S, G>::new())
                    .service(ShortlinkCallbackRoute::<S, G>::new())
                    .service(PaymentCallbackRoute::<S, G>::new())
                    .service(ShopProductsRoute::<S, G>::new())
                    .service(ShopProductByIdRoute::<S, G>::new()),
            )
    })
    .keep_alive(KeepAlive::Timeout(keep_alive))
    .bind((config.host.as_str(), config.port))?
    .run();
    Ok(srv)
}
