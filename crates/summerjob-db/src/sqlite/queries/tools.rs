use rusqlite::{params, Connection, Row};

use summerjob_core::tool::{Tool, ToolGroup, ToolInput, ToolName};

use super::super::SqliteResultExt;
use crate::DbError;

fn row_to_tool(row: &Row) -> rusqlite::Result<Tool> {
    let tool_str: String = row.get("tool")?;
    Ok(Tool {
        id: row.get("id")?,
        tool: ToolName::parse_str(&tool_str).unwrap_or(ToolName::Other),
        amount: row.get("amount")?,
        proposed_job_on_site_id: row.get("proposed_job_on_site_id")?,
        proposed_job_to_take_with_id: row.get("proposed_job_to_take_with_id")?,
    })
}

pub(crate) fn load_tools(
    conn: &Connection,
    proposed_job_id: &str,
    group: ToolGroup,
) -> Result<Vec<Tool>, DbError> {
    let sql = format!(
        "SELECT * FROM tools WHERE {} = ?1 ORDER BY sort_order ASC",
        group.column()
    );
    let mut stmt = conn.prepare(&sql).to_db()?;
    let tools = stmt
        .query_map(params![proposed_job_id], row_to_tool)
        .to_db()?
        .collect::<Result<Vec<_>, _>>()
        .to_db()?;
    Ok(tools)
}

/// Delete every tool of `group` tied to the job and insert `tools` in order.
pub(crate) fn replace_tools(
    conn: &Connection,
    proposed_job_id: &str,
    group: ToolGroup,
    tools: &[ToolInput],
) -> Result<(), DbError> {
    conn.execute(
        &format!("DELETE FROM tools WHERE {} = ?1", group.column()),
        params![proposed_job_id],
    )
    .to_db()?;
    let mut stmt = conn
        .prepare(&format!(
            "INSERT INTO tools (id, tool, amount, {}, sort_order) VALUES (?1, ?2, ?3, ?4, ?5)",
            group.column()
        ))
        .to_db()?;
    for (i, tool) in tools.iter().enumerate() {
        let id = uuid::Uuid::new_v4().to_string();
        stmt.execute(params![
            id,
            tool.tool.as_str(),
            tool.amount,
            proposed_job_id,
            i as i64
        ])
        .to_db()?;
    }
    Ok(())
}
