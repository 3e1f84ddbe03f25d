mod request;
mod response;

use self::request::{CreateRequest, Transformer, UpdateRequest};
use self::response::Presenter;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use application::service::{
    CreateOrderService, DeleteOrderService, GetOrderService, UpdateOrderService,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use kernel::interface::query::OrderCriteria;
use kernel::prelude::entity::OrderId;

pub trait OrderRouter {
    fn route_order(self) -> Self;
}

impl OrderRouter for Router<AppModule> {
    fn route_order(self) -> Self {
        self.route(
            "/orders",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), Presenter)
                    .bypass(|| module.get_all_orders())
                    .await
                    .map_err(ErrorStatus::from)
            })
            .post(
                |State(module): State<AppModule>, Json(req): Json<CreateRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| module.create_order(dto))
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| (StatusCode::CREATED, res))
                },
            ),
        )
        .route(
            "/orders/search",
            post(
                |State(module): State<AppModule>, Json(criteria): Json<OrderCriteria>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.search_orders(&criteria).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/orders/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<i32>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.get_order(&OrderId::new(id)).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .put(
                |State(module): State<AppModule>,
                 Path(id): Path<i32>,
                 Json(req): Json<UpdateRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake((id, req))
                        .handle(|dto| module.update_order(dto))
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>, Path(id): Path<i32>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.delete_order(&OrderId::new(id)).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
