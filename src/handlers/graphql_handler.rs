use actix_web::{get, post, web, HttpResponse};
use async_graphql::http::GraphiQLSource;
use async_graphql_actix_web::{GraphQLRequest, GraphQLResponse};

use crate::{auth::MaybeAuthenticatedUser, graphql::Schema};

#[post("/graphql")]
pub async fn graphql(
    schema: web::Data<Schema>,
    viewer: MaybeAuthenticatedUser,
    request: GraphQLRequest,
) -> GraphQLResponse {
    let mut request = request.into_inner();
    if let Some(claims) = viewer.0 {
        request = request.data(claims);
    }
    schema.execute(request).await.into()
}

#[get("/graphiql")]
pub async fn graphiql() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("text/html; charset=utf-8")
        .body(GraphiQLSource::build().endpoint("/graphql").finish())
}
