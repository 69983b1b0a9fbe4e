use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row, Transaction};

use crate::{
    db::helpers::{decode_comments, decode_list, encode_list, to_i64, to_u32, to_u64},
    models::Segment,
};

fn row_to_segment(row: &Row) -> Result<Segment> {
    let xs: String = row.get("xs")?;
    let ys: String = row.get("ys")?;
    let status: String = row.get("status")?;
    let is_manual: i64 = row.get("is_manual")?;
    let comments: String = row.get("comments")?;

    Ok(Segment {
        id: to_u64(row.get("id")?, "id")?,
        xs: decode_list(&xs, "xs")?,
        ys: decode_list(&ys, "ys")?,
        class: to_u32(row.get("class")?, "class")?,
        frame_in: to_u64(row.get("frame_in")?, "frame_in")?,
        frame_out: to_u64(row.get("frame_out")?, "frame_out")?,
        status: status.parse()?,
        is_manual: is_manual != 0,
        comments: decode_comments(&comments)?,
    })
}

pub(crate) fn read_segments(conn: &Connection) -> Result<Vec<Segment>> {
    let mut stmt = conn.prepare(
        "SELECT id, xs, ys, class, frame_in, frame_out, status, is_manual, comments
         FROM segments
         ORDER BY id ASC",
    )?;

    let mut rows = stmt.query([])?;
    let mut segments = Vec::new();
    while let Some(row) = rows.next()? {
        segments.push(row_to_segment(row)?);
    }
    Ok(segments)
}

pub(crate) fn replace_segments(tx: &Transaction<'_>, segments: &[Segment]) -> Result<()> {
    tx.execute("DELETE FROM segments", [])
        .context("failed to clear segments")?;

    let mut stmt = tx.prepare(
        "INSERT INTO segments (
            id, xs, ys, class, frame_in, frame_out, status, is_manual, comments
        ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
    )?;
    for segment in segments {
        stmt.execute(params![
            to_i64(segment.id)?,
            encode_list(&segment.xs)?,
            encode_list(&segment.ys)?,
            segment.class,
            to_i64(segment.frame_in)?,
            to_i64(segment.frame_out)?,
            segment.status.as_str(),
            segment.is_manual,
            encode_list(&segment.comments)?,
        ])
        .with_context(|| format!("failed to insert segment {}", segment.id))?;
    }
    Ok(())
}
