mod request;
mod response;

use self::request::{CreateRequest, Transformer, UpdateRequest};
use self::response::Presenter;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use application::service::{
    CreateAuthorService, DeleteAuthorService, GetAuthorService, UpdateAuthorService,
};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use kernel::interface::query::AuthorCriteria;
use kernel::prelude::entity::AuthorId;

pub trait AuthorRouter {
    fn route_author(self) -> Self;
}

impl AuthorRouter for Router<AppModule> {
    fn route_author(self) -> Self {
        self.route(
            "/authors",
            get(|State(module): State<AppModule>| async move {
                Controller::new((), Presenter)
                    .bypass(|| module.get_all_authors())
                    .await
                    .map_err(ErrorStatus::from)
            })
            .post(
                |State(module): State<AppModule>, Json(req): Json<CreateRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| module.create_author(dto))
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| (StatusCode::CREATED, res))
                },
            ),
        )
        .route(
            "/authors/search",
            post(
                |State(module): State<AppModule>, Json(criteria): Json<AuthorCriteria>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.search_authors(&criteria).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/authors/:id",
            get(
                |State(module): State<AppModule>, Path(id): Path<i32>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.get_author(&AuthorId::new(id)).await })
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
                        .handle(|dto| module.update_author(dto))
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .delete(
                |State(module): State<AppModule>, Path(id): Path<i32>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.delete_author(&AuthorId::new(id)).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
