//! The convergence primitive every publish step goes through.
//!
//! Each step looks the resource up first, adopts it when the existing
//! definition matches the request, creates it when absent, and refuses to
//! touch it otherwise. Conflicts never mutate.

use std::future::Future;

use cleanroom_kit_platform::PlatformResult;

use crate::error::{PublishError, PublishResult};
use crate::types::{EnsureOutcome, ResourceKind};

/// A resource that is now known to match the request, plus how it got
/// that way.
#[derive(Debug)]
pub(crate) struct Ensured<H> {
    pub(crate) handle: H,
    pub(crate) outcome: EnsureOutcome,
}

/// Converges one resource. `lookup` fetches the current definition,
/// `reconcile` decides whether an existing one satisfies the request
/// (returning the conflict reason when it does not), and `create` runs
/// only when nothing exists yet.
pub(crate) async fn ensure<E, H, L, C>(
    kind: ResourceKind,
    id: &str,
    lookup: L,
    create: C,
    reconcile: impl FnOnce(E) -> Result<H, String>,
) -> PublishResult<Ensured<H>>
where
    L: Future<Output = PlatformResult<Option<E>>>,
    C: Future<Output = PlatformResult<H>>,
{
    let existing = lookup
        .await
        .map_err(|err| PublishError::from_platform(kind, id, err))?;
    match existing {
        Some(found) => match reconcile(found) {
            Ok(handle) => {
                log::debug!("{kind} `{id}` already matches the requested definition");
                Ok(Ensured {
                    handle,
                    outcome: EnsureOutcome::Adopted,
                })
            }
            Err(reason) => Err(PublishError::Conflict {
                kind,
                id: id.to_string(),
                reason,
            }),
        },
        None => {
            let handle = create
                .await
                .map_err(|err| PublishError::from_platform(kind, id, err))?;
            log::info!("created {kind} `{id}`");
            Ok(Ensured {
                handle,
                outcome: EnsureOutcome::Created,
            })
        }
    }
}
