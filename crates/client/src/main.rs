//! `movies-crud`: walks one movie through its whole lifecycle against a live API.
//!
//! create -> list -> get by id -> get by name -> update -> delete -> list

use anyhow::{Context, bail, ensure};

use movies_client::{ApiResponse, ClientConfig, MoviesClient, Payload};
use movies_core::{MovieDraft, MovieUpdate};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    movies_observability::init();

    let config = ClientConfig::from_env();
    tracing::info!(base_url = %config.base_url, "starting crud run");
    let client = MoviesClient::new(config).context("failed to build movies client")?;

    let draft = MovieDraft::new(format!("The Matrix {}", std::process::id()), 1999, 7.5)?;
    let update = MovieUpdate::new()
        .with_name(format!("{} (Updated)", draft.name))
        .with_year(2022);

    let created = client.create(&draft).await?;
    report("create", &created);
    let movie = expect_success("create", created)?;
    ensure!(movie.to_draft() == draft, "created movie does not match the draft");

    let listed = client.list().await?;
    report("list", &listed);
    let movies = expect_success("list", listed)?;
    ensure!(
        movies.iter().any(|m| m.id == movie.id),
        "new movie {} missing from list",
        movie.id
    );

    let by_id = client.get_by_id(movie.id).await?;
    report("get_by_id", &by_id);
    ensure!(
        expect_success("get_by_id", by_id)? == movie,
        "get_by_id returned a different movie"
    );

    let by_name = client.get_by_name(&movie.name).await?;
    report("get_by_name", &by_name);
    ensure!(
        expect_success("get_by_name", by_name)?.id == movie.id,
        "get_by_name returned a different movie"
    );

    let updated = client.update(movie.id, &update).await?;
    report("update", &updated);
    let mut expected = movie.clone();
    update.apply_to(&mut expected);
    ensure!(
        expect_success("update", updated)? == expected,
        "update did not apply exactly the supplied fields"
    );

    let deleted = client.delete_by_id(movie.id).await?;
    report("delete", &deleted);
    let confirmation = expect_success("delete", deleted)?;
    tracing::info!(message = %confirmation.message, "movie deleted");

    let after = expect_success("list", client.list().await?)?;
    if after.iter().any(|m| m.id == movie.id) {
        bail!("movie {} still listed after delete", movie.id);
    }

    tracing::info!(id = %movie.id, "crud run complete");
    Ok(())
}

fn report<T: Payload>(step: &str, response: &ApiResponse<T>) {
    match serde_json::to_string(response) {
        Ok(json) => tracing::info!(step, response = %json, "response"),
        Err(e) => tracing::warn!(step, error = %e, "could not serialize response"),
    }
}

fn expect_success<T>(step: &str, response: ApiResponse<T>) -> anyhow::Result<T> {
    match response.into_result() {
        Ok(success) => Ok(success.data),
        Err(err) => bail!("{step} failed with status {}: {}", err.status, err.error),
    }
}
