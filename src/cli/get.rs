//! Get command implementation

use std::io::Write;

use crate::cli::{CommandContext, GlobalOptions};
use crate::client::FetchResponse;
use crate::error::{ApiError, Error, Result};

/// Retrieve `path` through the router and write the body to stdout
pub async fn run(opts: &GlobalOptions, path: &str) -> Result<()> {
    let path = normalize_path(path);
    let ctx = CommandContext::new(opts).await?;

    let response = ctx.router.fetch(&path).await;
    ctx.router.flush().await;

    let response = check_status(&path, response?)?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&response.body)?;
    stdout.flush()?;
    Ok(())
}

fn normalize_path(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

fn check_status(path: &str, response: FetchResponse) -> Result<FetchResponse> {
    if response.is_success() {
        return Ok(response);
    }

    let err = match response.status {
        404 => ApiError::NotFound(path.to_string()),
        status if status >= 500 => ApiError::ServerError(format!("{} for {}", status, path)),
        status => ApiError::InvalidResponse(format!("Unexpected status {} for {}", status, path)),
    };
    Err(Error::Api(err))
}
