//! v005: self-modification-framework proposals (spec.md §3 SMF proposal,
//! §4.7).

use rusqlite::Connection;

use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn migrate(conn: &Connection) -> CkgResult<()> {
    conn.execute_batch(
        "
        CREATE TABLE smf_proposals (
            id                 TEXT PRIMARY KEY,
            trigger_type       TEXT NOT NULL,
            proposed_action    TEXT NOT NULL,
            affected_edges     TEXT NOT NULL DEFAULT '[]',
            reasoning          TEXT NOT NULL,
            approval_level     TEXT NOT NULL,
            status             TEXT NOT NULL DEFAULT 'pending',
            created_at         TEXT NOT NULL,
            resolved_at        TEXT,
            resolved_by        TEXT,
            consents           TEXT NOT NULL DEFAULT '[]'
        );

        CREATE INDEX idx_smf_proposals_status ON smf_proposals(status);

        -- Pre-execution snapshots of every affected edge, captured atomically
        -- with execution, so smf_undo can restore prior state within
        -- retention (spec.md §4.7 Undo).
        CREATE TABLE smf_edge_snapshots (
            id            INTEGER PRIMARY KEY AUTOINCREMENT,
            proposal_id   TEXT NOT NULL REFERENCES smf_proposals(id),
            edge_id       TEXT NOT NULL,
            prior_state   TEXT NOT NULL,
            captured_at   TEXT NOT NULL
        );

        CREATE INDEX idx_smf_edge_snapshots_proposal ON smf_edge_snapshots(proposal_id);
        ",
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}
