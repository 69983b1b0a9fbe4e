use anyhow::{Context, Result};
use rusqlite::{params, Connection, Row, Transaction};

use crate::{
    db::helpers::{decode_list, encode_list, to_i64, to_u32, to_u64},
    models::Trajectory,
};

fn row_to_trajectory(row: &Row) -> Result<Trajectory> {
    let xs: String = row.get("xs")?;
    let ys: String = row.get("ys")?;

    Ok(Trajectory {
        id: to_u64(row.get("id")?, "id")?,
        xs: decode_list(&xs, "xs")?,
        ys: decode_list(&ys, "ys")?,
        class: to_u32(row.get("class")?, "class")?,
        frame_in: to_u64(row.get("frame_in")?, "frame_in")?,
        frame_out: to_u64(row.get("frame_out")?, "frame_out")?,
    })
}

pub(crate) fn read_trajectories(conn: &Connection) -> Result<Vec<Trajectory>> {
    let mut stmt = conn.prepare(
        "SELECT id, xs, ys, class, frame_in, frame_out
         FROM trajectories
         ORDER BY id ASC",
    )?;

    let mut rows = stmt.query([])?;
    let mut trajectories = Vec::new();
    while let Some(row) = rows.next()? {
        trajectories.push(row_to_trajectory(row)?);
    }
    Ok(trajectories)
}

pub(crate) fn replace_trajectories(
    tx: &Transaction<'_>,
    trajectories: &[Trajectory],
) -> Result<()> {
    tx.execute("DELETE FROM trajectories", [])
        .context("failed to clear trajectories")?;

    let mut stmt = tx.prepare(
        "INSERT INTO trajectories (id, xs, ys, class, frame_in, frame_out)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for trajectory in trajectories {
        stmt.execute(params![
            to_i64(trajectory.id)?,
            encode_list(&trajectory.xs)?,
            encode_list(&trajectory.ys)?,
            trajectory.class,
            to_i64(trajectory.frame_in)?,
            to_i64(trajectory.frame_out)?,
        ])
        .with_context(|| format!("failed to insert trajectory {}", trajectory.id))?;
    }
    Ok(())
}
