//! Connection resolution.

use bf_error::{BfError, Result};
use bf_types::{Credentials, ResolvedConnection, StoreConnectionConfig};
use tracing::debug;

use crate::resolve::{EvaluationContext, resolve};

/// Resolve connection settings for one invocation.
///
/// The region must resolve to a non-empty value. Explicit keys are attached
/// only when managed identity is off and both keys resolve; with managed
/// identity on, the key sources are not even consulted.
pub fn resolve_connection(
    config: &StoreConnectionConfig,
    ctx: &EvaluationContext<'_>,
) -> Result<ResolvedConnection> {
    config.validate().map_err(BfError::Config)?;

    let region = resolve(&config.region, ctx)?
        .ok_or_else(|| BfError::config("Region is missing in S3 configuration"))?;

    let endpoint = match &config.endpoint {
        Some(source) => resolve(source, ctx)?,
        None => None,
    };

    let credentials = if config.use_managed_identity {
        Credentials::Ambient
    } else {
        let access_key_id = match &config.access_key_id {
            Some(source) => resolve(source, ctx)?,
            None => None,
        };
        let secret_access_key = match &config.secret_access_key {
            Some(source) => resolve(source, ctx)?,
            None => None,
        };
        match (access_key_id, secret_access_key) {
            (Some(access_key_id), Some(secret_access_key)) => Credentials::Static {
                access_key_id,
                secret_access_key,
            },
            _ => Credentials::Ambient,
        }
    };

    debug!(
        region = %region,
        endpoint = ?endpoint,
        static_credentials = credentials.is_static(),
        "Resolved store connection"
    );

    Ok(ResolvedConnection {
        region,
        endpoint,
        force_path_style: config.force_path_style,
        skip_tls_verify: config.skip_tls_verify,
        credentials,
        timeout_secs: config.timeout_secs,
        max_attempts: config.max_attempts,
    })
}
