//! Cross-Board Recency Aggregator.
//!
//! Merges the cross-board recency index into a paginated "latest posts" view
//! and exposes an administrative batch delete over selected index entries.
//! Decoration re-fetches the referenced write row; an index row whose write
//! disappeared without cleanup is rendered bare rather than treated as an
//! error (defensive read, not an invariant violation).

use std::collections::BTreeSet;

use chrono::Utc;
use domains::{Actor, BbsError, BbsResult, RecencyEntry, RecencyQuery};
use serde::Serialize;

use crate::display;
use crate::Ports;

/// Length of the content preview used for comment entries.
const COMMENT_PREVIEW_CHARS: usize = 100;

/// One decorated row of the "latest" view. The `Option` fields stay `None`
/// when the referenced write row no longer exists.
#[derive(Debug, Clone, Serialize)]
pub struct RecencyItem {
    pub entry: RecencyEntry,
    pub ordinal: i64,
    pub subject: Option<String>,
    pub link: Option<String>,
    pub author_name: Option<String>,
    /// "HH:MM" for today's rows, "yy-mm-dd" otherwise.
    pub when: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RecencyPage {
    pub items: Vec<RecencyItem>,
    pub total_count: i64,
}

pub struct RecencyFeed {
    ports: Ports,
    page_rows: i64,
    name_cut: usize,
}

impl RecencyFeed {
    pub fn new(ports: Ports, page_rows: i64, name_cut: usize) -> Self {
        Self {
            ports,
            page_rows,
            name_cut,
        }
    }

    pub async fn list_recent(
        &self,
        query: &RecencyQuery,
        page: i64,
        per_page: Option<i64>,
    ) -> BbsResult<RecencyPage> {
        let rows = per_page.unwrap_or(self.page_rows);
        let offset = (page.max(1) - 1) * rows;
        let entries = self.ports.recency.list(query, offset, rows).await?;
        let total_count = self.ports.recency.count(query).await?;

        let now = Utc::now();
        let mut items = Vec::with_capacity(entries.len());
        for (index, entry) in entries.into_iter().enumerate() {
            let ordinal = total_count - offset - index as i64;
            let write = self
                .ports
                .store
                .get_write(&entry.board, entry.write_id)
                .await?;
            let item = match write {
                Some(w) => {
                    let (subject, link) = if w.is_comment {
                        (
                            format!(
                                "[comment] {}",
                                display::content_preview(&w.content, COMMENT_PREVIEW_CHARS)
                            ),
                            format!("/board/{}/{}#c_{}", entry.board, entry.parent_id, w.id),
                        )
                    } else {
                        (w.subject.clone(), format!("/board/{}/{}", entry.board, w.id))
                    };
                    RecencyItem {
                        ordinal,
                        subject: Some(subject),
                        link: Some(link),
                        author_name: Some(display::cut_name(&w.author_name, self.name_cut)),
                        when: Some(display::short_datetime(w.created_at, now)),
                        entry,
                    }
                }
                // index row outlived its write; show it bare
                None => RecencyItem {
                    ordinal,
                    subject: None,
                    link: None,
                    author_name: None,
                    when: None,
                    entry,
                },
            };
            items.push(item);
        }

        Ok(RecencyPage { items, total_count })
    }

    /// Administrative batch delete over index entries: mirrors the bulk
    /// deletion steps for each referenced write row (ledger reversal,
    /// attachment removal, row delete), then removes the index rows and
    /// invalidates the "latest" prefix of every touched board.
    pub async fn delete_entries(&self, entry_ids: &[i64], actor: &Actor) -> BbsResult<usize> {
        if !actor.is_admin() {
            return Err(BbsError::PermissionDenied(
                "recency entry deletion is an administrator operation".into(),
            ));
        }
        let entries = self.ports.recency.entries_by_ids(entry_ids).await?;
        if entries.is_empty() {
            return Ok(0);
        }

        let mut touched_boards = BTreeSet::new();
        for entry in &entries {
            let board = self.ports.store.get_board(&entry.board).await?;
            if let Some(write) = self
                .ports
                .store
                .get_write(&entry.board, entry.write_id)
                .await?
            {
                self.ports.reverse_or_compensate(&board, &write).await?;
                self.ports
                    .files
                    .delete_board_files(&entry.board, write.id)
                    .await?;
                self.ports
                    .store
                    .delete_rows(&entry.board, &[write.id])
                    .await?;
            }
            touched_boards.insert(entry.board.clone());
        }

        let ids: Vec<i64> = entries.iter().map(|e| e.id).collect();
        self.ports.recency.delete_entries(&ids).await?;

        for board in &touched_boards {
            self.ports.invalidate_latest(board);
        }
        tracing::info!(removed = ids.len(), boards = touched_boards.len(), "recency entries deleted");
        Ok(ids.len())
    }
}
