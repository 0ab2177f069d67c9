//! SMF proposal lifecycle storage and pre-execution edge snapshots used by
//! undo (spec.md §4.7).

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use ckg_core::models::{ApprovalLevel, Edge, NeutralReasoning, ProposalStatus, SmfProposal};
use ckg_core::CkgResult;

use crate::to_storage_err;

pub fn insert_proposal(conn: &Connection, proposal: &SmfProposal) -> CkgResult<()> {
    conn.execute(
        "INSERT INTO smf_proposals (
            id, trigger_type, proposed_action, affected_edges, reasoning, approval_level,
            status, created_at, resolved_at, resolved_by, consents
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            proposal.id,
            proposal.trigger_type,
            proposal.proposed_action.to_string(),
            serde_json::to_string(&proposal.affected_edges).unwrap_or_else(|_| "[]".to_string()),
            serde_json::to_string(&proposal.reasoning).unwrap_or_default(),
            approval_level_str(proposal.approval_level),
            status_str(proposal.status),
            proposal.created_at.to_rfc3339(),
            proposal.resolved_at.map(|d| d.to_rfc3339()),
            proposal.resolved_by,
            serde_json::to_string(&proposal.consents).unwrap_or_else(|_| "[]".to_string()),
        ],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

pub fn get_proposal(conn: &Connection, id: &str) -> CkgResult<Option<SmfProposal>> {
    conn.query_row(&select_sql("id = ?1"), params![id], row_to_proposal)
        .optional()
        .map_err(|e| to_storage_err(e.to_string()))
}

pub fn list_pending(conn: &Connection) -> CkgResult<Vec<SmfProposal>> {
    let mut stmt = conn
        .prepare(&select_sql("status = 'pending' ORDER BY created_at ASC"))
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt.query_map([], row_to_proposal).map_err(|e| to_storage_err(e.to_string()))?;
    rows.collect::<Result<Vec<_>, _>>().map_err(|e| to_storage_err(e.to_string()))
}

pub fn add_consent(conn: &Connection, id: &str, actor: &str) -> CkgResult<SmfProposal> {
    let mut proposal = get_proposal(conn, id)?.ok_or_else(|| {
        ckg_core::CkgError::NotFound { what: format!("smf_proposal {id}") }
    })?;
    if !proposal.consents.contains(&actor.to_string()) {
        proposal.consents.push(actor.to_string());
    }
    conn.execute(
        "UPDATE smf_proposals SET consents = ?1 WHERE id = ?2",
        params![serde_json::to_string(&proposal.consents).unwrap_or_else(|_| "[]".to_string()), id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(proposal)
}

pub fn set_status(
    conn: &Connection,
    id: &str,
    status: ProposalStatus,
    resolved_by: Option<&str>,
) -> CkgResult<()> {
    let now = Utc::now();
    conn.execute(
        "UPDATE smf_proposals SET status = ?1, resolved_at = ?2, resolved_by = ?3 WHERE id = ?4",
        params![status_str(status), now.to_rfc3339(), resolved_by, id],
    )
    .map_err(|e| to_storage_err(e.to_string()))?;
    Ok(())
}

/// Snapshots the current state of every affected edge immediately before
/// execution, so `smf_undo` can restore it later.
pub fn snapshot_edges(conn: &Connection, proposal_id: &str, edges: &[Edge]) -> CkgResult<()> {
    let now = Utc::now();
    for edge in edges {
        conn.execute(
            "INSERT INTO smf_edge_snapshots (proposal_id, edge_id, prior_state, captured_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![
                proposal_id,
                edge.id,
                serde_json::to_string(edge).unwrap_or_default(),
                now.to_rfc3339(),
            ],
        )
        .map_err(|e| to_storage_err(e.to_string()))?;
    }
    Ok(())
}

pub fn get_edge_snapshots(conn: &Connection, proposal_id: &str) -> CkgResult<Vec<Edge>> {
    let mut stmt = conn
        .prepare("SELECT prior_state FROM smf_edge_snapshots WHERE proposal_id = ?1")
        .map_err(|e| to_storage_err(e.to_string()))?;
    let rows = stmt
        .query_map(params![proposal_id], |row| {
            let state: String = row.get(0)?;
            Ok(state)
        })
        .map_err(|e| to_storage_err(e.to_string()))?;

    let mut edges = Vec::new();
    for row in rows {
        let state = row.map_err(|e| to_storage_err(e.to_string()))?;
        edges.push(serde_json::from_str(&state).map_err(|e| to_storage_err(e.to_string()))?);
    }
    Ok(edges)
}

fn approval_level_str(level: ApprovalLevel) -> &'static str {
    match level {
        ApprovalLevel::Primary => "primary",
        ApprovalLevel::Bilateral => "bilateral",
    }
}

fn status_str(status: ProposalStatus) -> &'static str {
    match status {
        ProposalStatus::Pending => "pending",
        ProposalStatus::Approved => "approved",
        ProposalStatus::Rejected => "rejected",
        ProposalStatus::Executed => "executed",
        ProposalStatus::Undone => "undone",
    }
}

fn select_sql(predicate: &str) -> String {
    format!(
        "SELECT id, trigger_type, proposed_action, affected_edges, reasoning, approval_level,
                status, created_at, resolved_at, resolved_by, consents
         FROM smf_proposals WHERE {predicate}"
    )
}

fn row_to_proposal(row: &rusqlite::Row<'_>) -> rusqlite::Result<SmfProposal> {
    let proposed_action_str: String = row.get(2)?;
    let affected_edges_str: String = row.get(3)?;
    let reasoning_str: String = row.get(4)?;
    let approval_level_str: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let created_at_str: String = row.get(7)?;
    let consents_str: String = row.get(10)?;

    Ok(SmfProposal {
        id: row.get(0)?,
        trigger_type: row.get(1)?,
        proposed_action: serde_json::from_str(&proposed_action_str).unwrap_or(serde_json::Value::Null),
        affected_edges: serde_json::from_str(&affected_edges_str).unwrap_or_default(),
        reasoning: serde_json::from_str::<NeutralReasoning>(&reasoning_str).unwrap_or(NeutralReasoning {
            detected: String::new(),
            affected: String::new(),
            if_approved: String::new(),
            if_rejected: String::new(),
            neutral_summary: true,
        }),
        approval_level: if approval_level_str == "bilateral" { ApprovalLevel::Bilateral } else { ApprovalLevel::Primary },
        status: match status_str.as_str() {
            "approved" => ProposalStatus::Approved,
            "rejected" => ProposalStatus::Rejected,
            "executed" => ProposalStatus::Executed,
            "undone" => ProposalStatus::Undone,
            _ => ProposalStatus::Pending,
        },
        created_at: parse_ts(&created_at_str),
        resolved_at: row.get::<_, Option<String>>(8)?.map(|s| parse_ts(&s)),
        resolved_by: row.get(9)?,
        consents: serde_json::from_str(&consents_str).unwrap_or_default(),
    })
}

fn parse_ts(s: &str) -> chrono::DateTime<Utc> {
    chrono::DateTime::parse_from_rfc3339(s).map(|dt| dt.with_timezone(&Utc)).unwrap_or_else(|_| Utc::now())
}
