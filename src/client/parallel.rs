//! Concurrent per-ASN retrieval.
//!
//! Every ASN gets its own request through the router; all requests are in
//! flight at once and the call returns when the last one settles. Failures
//! stay attached to their ASN and never affect siblings.

use futures::future::join_all;
use log::debug;

use super::models::IpRecord;
use super::{Router, Transport};
use crate::error::{ApiError, Result};
use crate::models::AsnResult;

/// Backend path holding the records of one ASN
pub fn asn_path(asn: &str) -> String {
    format!("/api/asn/{}.json", asn)
}

/// Fetch every ASN concurrently, returning results in input order.
///
/// # Example
///
/// ```ignore
/// let asns = normalize_asns("15169, 13335");
/// let results = fetch_all(&router, &asns).await;
/// assert_eq!(results.len(), 2);
/// ```
pub async fn fetch_all<T: Transport>(router: &Router<T>, asns: &[String]) -> Vec<AsnResult> {
    if asns.is_empty() {
        return Vec::new();
    }

    debug!("Fetching {} ASNs concurrently", asns.len());

    let results = join_all(asns.iter().map(|asn| fetch_one(router, asn))).await;

    let failed = results.iter().filter(|r| r.error).count();
    debug!("Fetched {} ASNs ({} failed)", results.len(), failed);
    results
}

async fn fetch_one<T: Transport>(router: &Router<T>, asn: &str) -> AsnResult {
    match fetch_records(router, asn).await {
        Ok(records) => {
            debug!("AS{} returned {} records", asn, records.len());
            AsnResult::success(asn, records)
        }
        Err(e) => {
            debug!("AS{} failed: {}", asn, e);
            AsnResult::failed(asn)
        }
    }
}

async fn fetch_records<T: Transport>(router: &Router<T>, asn: &str) -> Result<Vec<IpRecord>> {
    let path = asn_path(asn);
    let response = router.fetch(&path).await?;

    if !response.is_success() {
        return Err(match response.status {
            404 => ApiError::NotFound(path),
            status if status >= 500 => ApiError::ServerError(format!("{} for {}", status, path)),
            status => ApiError::InvalidResponse(format!("Unexpected status {} for {}", status, path)),
        }
        .into());
    }

    let records: Vec<IpRecord> = serde_json::from_slice(&response.body).map_err(|e| {
        ApiError::InvalidResponse(format!("Failed to parse {}: {}", path, e))
    })?;
    Ok(records)
}
