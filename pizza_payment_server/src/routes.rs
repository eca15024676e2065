//! Request handler definitions
//!
//! Define each route and its handler here.
//! Handlers that are more than a line or two MUST go into a separate module. Keep this module neat and tidy 🙏
//!
//! A note about performance:
//! Since each worker thread processes its requests sequentially, handlers which block the current thread will cause
//! the current worker to stop processing new requests. Long waits, like the suspended status poll, must therefore be
//! expressed as futures so that the worker can serve other requests while the poll sleeps. The engine already does
//! this; keep it that way when adding routes.
use actix_web::{cookie::Cookie, get, web, HttpRequest, HttpResponse, Responder};
use bytes::Bytes;
use log::*;
use mpay_tools::MpayCallback;
use pizza_payment_engine::{
    db_types::OrderId,
    order_objects::PollOutcome,
    OrderFlowApi,
    OrderFlowError,
    PaymentGatewayClient,
    TransactionStore,
};
use uuid::Uuid;

use crate::{data_objects::PollResponse, errors::ServerError};

/// The session cookie that identifies a returning customer
pub const CUSTOMER_REF_COOKIE: &str = "customer_ref";

// Web-actix cannot handle generics in handlers, so routes are registered manually via the `route!` macro
#[macro_export]
macro_rules! route {
    ($name:ident => $method:ident $path:literal impl $($bounds:ty),+) => {
        paste::paste! { pub struct [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ >( $( core::marker::PhantomData<fn() -> [< T $bounds:camel> ] >,)+ );}
        paste::paste! { impl< $( [< T $bounds:camel> ],)+ > [<$name:camel Route>]< $( [< T $bounds:camel> ],)+ > {
            #[allow(clippy::new_without_default)]
            pub fn new() -> Self {
                Self($( core::marker::PhantomData::<fn() -> [< T $bounds:camel> ] >,)+)
            }
        }}
        paste::paste! { impl<$( [< T $bounds:camel >] , )+> actix_web::dev::HttpServiceFactory for [<$name:camel Route>]<$([<T $bounds:camel>],)+>
        where
            $([<T $bounds:camel>]: $bounds + 'static,)+
        {
            fn register(self, config: &mut actix_web::dev::AppService) {
                let res = actix_web::Resource::new($path)
                    .name(stringify!($name))
                    .guard(actix_web::guard::$method())
                    .to($name::< $( [< T $bounds:camel >], )+>);
                actix_web::dev::HttpServiceFactory::register(res, config);
            }
        }}
    };
}

// ----------------------------------------------   Health  ----------------------------------------------------
#[get("/health")]
pub async fn health() -> impl Responder {
    trace!("💻️ Received health check request");
    HttpResponse::Ok().body("👍️\n")
}

//----------------------------------------------   Orders  ----------------------------------------------------
route!(submit_order => Post "/orders/{shop_id}" impl TransactionStore, PaymentGatewayClient);
/// Route handler for order submissions.
///
/// The body is the raw JSON array of line items the storefront assembled. It is deliberately taken
/// as bytes: the same bytes feed the order key derivation, so resubmitting an unchanged basket
/// maps onto the existing order.
///
/// The customer is identified by the `customer_ref` session cookie. First-time customers get a
/// fresh random reference minted here, returned with the response.
pub async fn submit_order<TS, G>(
    req: HttpRequest,
    path: web::Path<String>,
    body: Bytes,
    api: web::Data<OrderFlowApi<TS, G>>,
) -> Result<HttpResponse, ServerError>
where
    TS: TransactionStore,
    G: PaymentGatewayClient,
{
    let shop_id = path.into_inner();
    let (customer_ref, new_session) = match req.cookie(CUSTOMER_REF_COOKIE) {
        Some(cookie) => (cookie.value().to_string(), false),
        None => (Uuid::new_v4().to_string(), true),
    };
    debug!("💻️ POST order for shop {shop_id} from customer {customer_ref}");
    let summary = api.submit_order(&shop_id, &customer_ref, &body).await?;
    info!("💻️ Order {} for shop {shop_id} is ready for payment. Total: {}", summary.id, summary.amount);
    let mut response = HttpResponse::Ok();
    if new_session {
        response.cookie(Cookie::build(CUSTOMER_REF_COOKIE, customer_ref).path("/").finish());
    }
    Ok(response.json(summary))
}

//----------------------------------------------   Polling  ----------------------------------------------------
route!(poll_order => Post "/poll/{order_id:[0-9a-f]{16,32}}" impl TransactionStore, PaymentGatewayClient);
/// Route handler for the order status poll.
///
/// The response is deferred until the order settles, or until the configured wait elapses, in
/// which case the client gets a 204 and is expected to poll again. Settled orders answer
/// immediately with `{"result": true}` for a captured payment and `{"result": false}` otherwise.
pub async fn poll_order<TS, G>(
    path: web::Path<String>,
    api: web::Data<OrderFlowApi<TS, G>>,
) -> Result<HttpResponse, ServerError>
where
    TS: TransactionStore,
    G: PaymentGatewayClient,
{
    let order_id = OrderId::from(path.into_inner());
    trace!("💻️ POST poll for order {order_id}");
    match api.poll_status(&order_id).await? {
        PollOutcome::Settled { captured } => Ok(HttpResponse::Ok().json(PollResponse { result: captured })),
        PollOutcome::TimedOut => Ok(HttpResponse::NoContent().finish()),
    }
}

//----------------------------------------------   Gateway callbacks  ------------------------------------------
route!(shortlink_callback => Post "/callback/shortlink/{order_id}" impl TransactionStore, PaymentGatewayClient);
/// Route handler for shortlink scan reports from the gateway.
///
/// The gateway appends the scan argument, which is our order id, as the final path segment.
/// Callback responses must be 200 for anything the gateway cannot fix by retrying, otherwise it
/// keeps redelivering: unknown orders and token-less bodies are logged and answered `OK`. Only an
/// unparseable body (400) and a failed outbound authorization request (502) are reported as
/// errors.
pub async fn shortlink_callback<TS, G>(
    path: web::Path<String>,
    body: Bytes,
    api: web::Data<OrderFlowApi<TS, G>>,
) -> Result<HttpResponse, ServerError>
where
    TS: TransactionStore,
    G: PaymentGatewayClient,
{
    let order_id = OrderId::from(path.into_inner());
    let callback = parse_callback(&body)?;
    if let Some((event, id)) = callback.event_notice() {
        info!("📬️ Shortlink event notice: {event} {id}");
        return Ok(HttpResponse::Ok().body("OK"));
    }
    let Some(customer_token) = callback.customer_token() else {
        warn!("📬️ A scan of order {order_id} was reported without a customer token. Ignoring it");
        return Ok(HttpResponse::Ok().body("OK"));
    };
    match api.handle_shortlink_scan(&order_id, customer_token).await {
        Ok(tx) => {
            debug!("📬️ Scan of order {order_id} processed. Status is now {}", tx.status);
            Ok(HttpResponse::Ok().body("OK"))
        },
        Err(OrderFlowError::OrderNotFound(_)) => {
            warn!("📬️ A scan was reported for unknown order {order_id}. Ignoring it");
            Ok(HttpResponse::Ok().body("OK"))
        },
        Err(e) => Err(e.into()),
    }
}

route!(payment_callback => Post "/callback/payment/{gateway_transaction_id}" impl TransactionStore, PaymentGatewayClient);
/// Route handler for authorization outcomes reported by the gateway.
///
/// The gateway appends its transaction id as the final path segment. Any status other than `fail`
/// counts as a successful authorization and triggers the capture; a failed capture still settles
/// the order and still answers 200. Unknown transaction ids and event notices are logged and
/// answered `OK`.
pub async fn payment_callback<TS, G>(
    path: web::Path<String>,
    body: Bytes,
    api: web::Data<OrderFlowApi<TS, G>>,
) -> Result<HttpResponse, ServerError>
where
    TS: TransactionStore,
    G: PaymentGatewayClient,
{
    let gateway_id = path.into_inner();
    let callback = parse_callback(&body)?;
    if let Some((event, id)) = callback.event_notice() {
        info!("📬️ Payment event notice: {event} {id}");
        return Ok(HttpResponse::Ok().body("OK"));
    }
    let Some(object) = callback.object.as_ref() else {
        warn!("📬️ A payment callback for gateway transaction {gateway_id} carried no payload. Ignoring it");
        return Ok(HttpResponse::Ok().body("OK"));
    };
    if matches!(object.tid.as_deref(), Some(tid) if tid != gateway_id) {
        warn!(
            "📬️ The callback body claims transaction {} but was delivered for {gateway_id}. Trusting the path",
            object.tid.as_deref().unwrap_or_default()
        );
    }
    match api.handle_payment_result(&gateway_id, object.is_decline()).await {
        Ok(tx) => {
            info!("📬️ Payment callback applied to order {}. Status is now {}", tx.order_id, tx.status);
            Ok(HttpResponse::Ok().body("OK"))
        },
        Err(OrderFlowError::GatewayTransactionNotFound(_)) => {
            warn!("📬️ A payment callback arrived for unknown gateway transaction {gateway_id}. Ignoring it");
            Ok(HttpResponse::Ok().body("OK"))
        },
        Err(e) => Err(e.into()),
    }
}

fn parse_callback(body: &[u8]) -> Result<MpayCallback, ServerError> {
    serde_json::from_slice(body).map_err(|e| {
        warn!("📬️ Could not parse the callback body. {e}");
        ServerError::MalformedCallback(e.to_string())
    })
}

//----------------------------------------------   Products  ----------------------------------------------------
route!(shop_products => Get "/products/{shop_id}/{category:pizzas|sizes|toppings}" impl TransactionStore, PaymentGatewayClient);
/// Route handler for per-shop product listings.
///
/// The first listing against an unknown shop id provisions a generated menu for it, which then
/// stays fixed for the life of the process.
pub async fn shop_products<TS, G>(
    path: web::Path<(String, String)>,
    api: web::Data<OrderFlowApi<TS, G>>,
) -> Result<HttpResponse, ServerError>
where
    TS: TransactionStore,
    G: PaymentGatewayClient,
{
    let (shop_id, category) = path.into_inner();
    debug!("💻️ GET {category} for shop {shop_id}");
    let menu = api.catalog().provision(&shop_id);
    let response = match category.as_str() {
        "pizzas" => HttpResponse::Ok().json(&menu.pizzas),
        "sizes" => HttpResponse::Ok().json(&menu.sizes),
        "toppings" => HttpResponse::Ok().json(&menu.toppings),
        other => return Err(ServerError::NoRecordFound(format!("No product category {other}"))),
    };
    Ok(response)
}

route!(shop_product_by_id => Get "/products/{shop_id}/{category:pizzas|sizes|toppings}/{id:\\d+}" impl TransactionStore, PaymentGatewayClient);
pub async fn shop_product_by_id<TS, G>(
    path: web::Path<(String, String, u32)>,
    api: web::Data<OrderFlowApi<TS, G>>,
) -> Result<HttpResponse, ServerError>
where
    TS: TransactionStore,
    G: PaymentGatewayClient,
{
    let (shop_id, category, id) = path.into_inner();
    debug!("💻️ GET {category} item {id} for shop {shop_id}");
    let menu = api.catalog().provision(&shop_id);
    let response = match category.as_str() {
        "pizzas" => menu.pizza(id).map(|p| HttpResponse::Ok().json(p)),
        "sizes" => menu.size(id).map(|s| HttpResponse::Ok().json(s)),
        "toppings" => menu.topping(id).map(|t| HttpResponse::Ok().json(t)),
        _ => None,
    };
    response.ok_or_else(|| ServerError::NoRecordFound(format!("No {category} item {id} at shop {shop_id}")))
}
