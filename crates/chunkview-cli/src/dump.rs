use chunkview_client::{ChunkCursor, CursorState, DocumentId};
use std::io::Write;

/// Print every chunk of `document` in order by walking the cursor forward
/// until it wraps back to the first chunk. Returns the number printed.
///
/// A failed page fetch makes the cursor wrap early, so any failure during
/// the walk is reported as an error instead of a completed dump.
pub async fn dump<W: Write>(
    cursor: &mut ChunkCursor,
    document: DocumentId,
    limit: Option<usize>,
    out: &mut W,
) -> anyhow::Result<usize> {
    let failed_before = cursor.gateway().metrics().snapshot().pages_failed;
    cursor.reset(document.clone()).await;

    let mut printed = 0;
    while cursor.state() == CursorState::Idle {
        if limit.is_some_and(|limit| printed >= limit) {
            break;
        }
        let Some(chunk) = cursor.current() else {
            break;
        };

        writeln!(out, "--- chunk {} (page {}, index {}) ---", chunk.chunk_id, cursor.page(), cursor.index())?;
        writeln!(out, "{}", chunk.content)?;
        printed += 1;

        cursor.next().await;
        if cursor.page() == 1 && cursor.index() == 0 {
            break;
        }
    }

    let failed = cursor.gateway().metrics().snapshot().pages_failed - failed_before;
    if failed > 0 {
        anyhow::bail!(
            "stopped after {} chunk(s) from {}: {} page fetch(es) failed",
            printed,
            document,
            failed
        );
    }

    match cursor.state() {
        CursorState::Empty if printed == 0 => writeln!(out, "No chunks for {}", document)?,
        _ => writeln!(out, "{} chunk(s) from {}", printed, document)?,
    }

    Ok(printed)
}
