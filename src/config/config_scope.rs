use actix_web::web;

use crate::api::routes::{
    bitcoin_price, exchange_rates, health_check, historical_prices, root,
};

pub fn configure(conf: &mut web::ServiceConfig) {
    let scope = web::scope("/api")
        .service(bitcoin_price)
        .service(historical_prices)
        .service(exchange_rates)
        .service(root)
        .service(health_check);

    conf.service(scope);
}
