mod request;
mod response;

use self::request::{CreateRequest, Transformer, UpdateRequest, VerifyRequest};
use self::response::Presenter;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use application::service::{
    CreateCustomerService, DeleteCustomerService, GetCustomerService, UpdateCustomerService,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use kernel::interface::query::CustomerCriteria;
use kernel::prelude::entity::CustomerId;

pub trait CustomerRouter {
    fn route_customer(self) -> Self;
}

impl CustomerRouter for Router<AppModule> {
    fn route_customer(self) -> Self {
        self.route(
            "/customers",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), Presenter)
                    .bypass(|| module.get_all_customers())
                    .await
                    .map_err(ErrorStatus::from)
            })
            .post(
                |State(module): State<AppModule>, Json(req): Json<CreateRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| module.create_customer(dto))
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| (StatusCode::CREATED, res))
                },
            ),
        )
        .route(
            "/customers/search",
            post(
                |State(module): State<AppModule>, Json(criteria): Json<CustomerCriteria>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.search_customers(&criteria).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/customers/verify",
            post(
                |State(module): State<AppModule>, Json(req): Json<VerifyRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| module.verify_customer(dto))
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/customers/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<i32>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.get_customer(&CustomerId::new(id)).await })
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
                        .handle(|dto| module.update_customer(dto))
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>, Path(id): Path<i32>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move {
                            module.delete_customer(&CustomerId::new(id)).await
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
