mod request;
mod response;

use self::request::{CreateRequest, ListQuery, Transformer};
use self::response::Presenter;
use crate::controller::Controller;
use crate::error::ErrorStatus;
use crate::handler::AppModule;
use application::service::{CreateReviewService, DeleteReviewService, GetReviewService};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use kernel::interface::query::ReviewCriteria;
use kernel::prelude::entity::{BookId, ReviewId};

pub trait ReviewRouter {
    fn route_review(self) -> Self;
}

impl ReviewRouter for Router<AppModule> {
    fn route_review(self) -> Self {
        self.route(
            "/reviews",
            get(
                |State(module): State<AppModule>, Query(query): Query<ListQuery>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move {
                            match query.book_id {
                                Some(id) => module.get_reviews_by_book(&BookId::new(id)).await,
                                None => module.search_reviews(&ReviewCriteria::default()).await,
                            }
                        })
                        .await
                        .map_err(ErrorStatus::from)
                },
            )
            .post(
                |State(module): State<AppModule>, Json(req): Json<CreateRequest>| async move {
                    Controller::new(Transformer, Presenter)
                        .intake(req)
                        .handle(|dto| module.create_review(dto))
                        .await
                        .map_err(ErrorStatus::from)
                        .map(|res| (StatusCode::CREATED, res))
                },
            ),
        )
        .route(
            "/reviews/search",
            post(
                |State(module): State<AppModule>, Json(criteria): Json<ReviewCriteria>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.search_reviews(&criteria).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
        .route(
            "/reviews/:id",
            delete(
                |State(module): State<AppModule>, Path(id): Path<i32>| async move {
                    Controller::new((), Presenter)
                        .bypass(|| async move { module.delete_review(&ReviewId::new(id)).await })
                        .await
                        .map_err(ErrorStatus::from)
                },
            ),
        )
    }
}
