use crate::error::{AppResult, Error};
use crate::store::{extract_calendar_id, EventStore};
use tracing::{info, warn};

/// Matches scoring below this are treated as no match at all
const MIN_SIMILARITY: f32 = 0.25;

/// Two matches closer than this margin cannot be told apart
const AMBIGUITY_MARGIN: f32 = 0.01;

/// Resolve a free-text event description to a calendar event id
///
/// The best similarity match supplies the record; its structural
/// `calendar_id` is preferred, with the embedded token in the record text as
/// fallback. A runner-up within the ambiguity margin that points at a
/// different calendar event is surfaced as an error instead of silently
/// picking one.
pub async fn resolve_event_id(store: &EventStore, query: &str) -> AppResult<String> {
    let matches = store.query(query, 2).await?;

    let best = match matches.first() {
        Some(best) if best.score >= MIN_SIMILARITY => best,
        Some(best) => {
            warn!(
                "Best match for '{}' scored only {:.3}, treating as no match",
                query, best.score
            );
            return Err(Error::EventNotFound(format!(
                "No stored event matches '{}'",
                query
            )));
        }
        None => {
            warn!("No stored records to resolve '{}' against", query);
            return Err(Error::EventNotFound(format!(
                "No stored event matches '{}'",
                query
            )));
        }
    };

    let best_id = record_calendar_id(&best.record.description, &best.record.calendar_id);

    if let Some(runner_up) = matches.get(1) {
        if best.score - runner_up.score < AMBIGUITY_MARGIN {
            let runner_up_id =
                record_calendar_id(&runner_up.record.description, &runner_up.record.calendar_id);
            if runner_up_id != best_id {
                return Err(Error::AmbiguousMatch(format!(
                    "'{}' matches records {} and {} equally well",
                    query, best.record.id, runner_up.record.id
                )));
            }
        }
    }

    match best_id {
        Some(calendar_id) => {
            info!(
                "Resolved '{}' to record {} (calendar id {})",
                query, best.record.id, calendar_id
            );
            Ok(calendar_id)
        }
        None => {
            warn!(
                "Record {} carries no Calendar_ID token",
                best.record.id
            );
            Err(Error::EventNotFound(format!(
                "Record {} has no calendar identifier",
                best.record.id
            )))
        }
    }
}

/// Structural calendar id first, embedded token as fallback
fn record_calendar_id(description: &str, calendar_id: &Option<String>) -> Option<String> {
    calendar_id
        .clone()
        .or_else(|| extract_calendar_id(description))
}
