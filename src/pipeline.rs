use crate::aggregate::{PlayerIdentity, aggregate_value};
use crate::error::{SkipReason, TableShapeError};
use crate::reference::MatchReference;
use crate::sources::{MatchHistorySource, MatchPayloadSource};
use crate::table::{MatchStatTable, TableBuilder};
use serde_json::Value;

/// Why one input entry is missing from the table.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    /// 1-based position in the history list; `None` when the history itself
    /// could not be fetched.
    pub position: Option<usize>,
    /// Resolved match id, or the raw reference when resolution failed.
    pub reference: String,
    pub reason: SkipReason,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchTableReport {
    pub table: MatchStatTable,
    pub diagnostics: Vec<Diagnostic>,
}

/// Fetches up to `max_matches` references for `identity` and aggregates them
/// in history order. Individual failures become diagnostics; only a broken
/// table shape is returned as an error.
pub fn build_match_table<H, P>(
    history: &H,
    payloads: &P,
    identity: &PlayerIdentity,
    max_matches: usize,
) -> Result<MatchTableReport, TableShapeError>
where
    H: MatchHistorySource + ?Sized,
    P: MatchPayloadSource + ?Sized,
{
    if max_matches == 0 {
        return Ok(MatchTableReport {
            table: MatchStatTable::empty(),
            diagnostics: Vec::new(),
        });
    }

    let mut references = match history.match_references(identity, max_matches) {
        Ok(references) => references,
        Err(err) => {
            let reason = SkipReason::Source(format!("{:#}", err));
            log::warn!("Failed to fetch match history for {}: {}", identity.puuid, reason);
            return Ok(MatchTableReport {
                table: MatchStatTable::empty(),
                diagnostics: vec![Diagnostic {
                    position: None,
                    reference: identity.puuid.clone(),
                    reason,
                }],
            });
        }
    };
    references.truncate(max_matches);

    aggregate_references(&references, payloads, identity)
}

/// Runs resolve, fetch and aggregate for each reference, one at a time.
pub fn aggregate_references<P>(
    references: &[Value],
    payloads: &P,
    identity: &PlayerIdentity,
) -> Result<MatchTableReport, TableShapeError>
where
    P: MatchPayloadSource + ?Sized,
{
    let mut builder = TableBuilder::new();
    let mut diagnostics = Vec::new();
    let total = references.len();

    for (idx, raw) in references.iter().enumerate() {
        let position = idx + 1;
        let mut skip = |reference: String, reason: SkipReason| {
            log::warn!("Skipping match {}/{} ({}): {}", position, total, reference, reason);
            diagnostics.push(Diagnostic {
                position: Some(position),
                reference,
                reason,
            });
        };

        let match_id = match MatchReference::from_value(raw).resolve() {
            Ok(id) => id,
            Err(err) => {
                skip(raw.to_string(), err.into());
                continue;
            }
        };

        let payload = match payloads.match_payload(&match_id) {
            Ok(payload) => payload,
            Err(err) => {
                skip(match_id, SkipReason::Source(format!("{:#}", err)));
                continue;
            }
        };

        match aggregate_value(payload, identity, builder.row_count() + 1) {
            Ok(row) => {
                log::info!(
                    "Aggregated match {}/{}: {} ({}, {})",
                    position,
                    total,
                    match_id,
                    row.result,
                    row.game_time
                );
                builder.push_row(&row);
            }
            Err(reason) => skip(match_id, reason),
        }
    }

    Ok(MatchTableReport {
        table: builder.finish()?,
        diagnostics,
    })
}
