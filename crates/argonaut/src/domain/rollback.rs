//! Transient per-app rollback session state.

use crate::domain::application::{AppKey, DeploymentRecord};

/// How many history rows get revision metadata scheduled on entry.
pub const METADATA_PREFETCH_ON_ENTRY: usize = 10;
/// How many rows past the cursor get metadata scheduled on a down-move.
pub const METADATA_PREFETCH_ON_MOVE: usize = 2;

/// Git metadata lazily attached to a history row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RevisionMetadata {
    pub author: String,
    pub date: Option<String>,
    pub message: String,
}

/// One deployment-history row in the rollback list.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RollbackRow {
    pub id: i64,
    pub revision: String,
    pub deployed_at: Option<String>,
    pub metadata: Option<RevisionMetadata>,
    pub metadata_requested: bool,
}

impl RollbackRow {
    pub fn from_record(record: DeploymentRecord) -> Self {
        Self {
            id: record.id,
            revision: record.revision,
            deployed_at: record.deployed_at,
            metadata: None,
            metadata_requested: false,
        }
    }
}

/// Sub-mode within the rollback screen.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RollbackStage {
    #[default]
    List,
    Confirm,
}

/// Everything the rollback screen needs; exists only while in Rollback
/// mode.
pub struct RollbackSession {
    pub app: AppKey,
    pub rows: Vec<RollbackRow>,
    pub current_revision: Option<String>,
    pub cursor: usize,
    pub prune: bool,
    pub watch: bool,
    pub dry_run: bool,
    pub stage: RollbackStage,
    pub loading: bool,
    pub error: Option<String>,
}

impl RollbackSession {
    /// Starts a session in loading state; rows arrive with the history
    /// result.
    pub fn new(app: AppKey) -> Self {
        Self {
            app,
            rows: Vec::new(),
            current_revision: None,
            cursor: 0,
            prune: false,
            watch: false,
            dry_run: false,
            stage: RollbackStage::List,
            loading: true,
            error: None,
        }
    }

    /// Installs the loaded history and returns the row indexes whose
    /// metadata should be fetched immediately.
    pub fn apply_history(
        &mut self,
        rows: Vec<RollbackRow>,
        current_revision: Option<String>,
    ) -> Vec<usize> {
        self.rows = rows;
        self.current_revision = current_revision;
        self.loading = false;
        self.cursor = 0;

        self.request_metadata_range(0, METADATA_PREFETCH_ON_ENTRY)
    }

    /// Moves the cursor down and returns the newly scheduled metadata rows
    /// (the new cursor row plus the next `METADATA_PREFETCH_ON_MOVE`).
    pub fn move_down(&mut self) -> Vec<usize> {
        if self.cursor + 1 >= self.rows.len() {
            return Vec::new();
        }
        self.cursor += 1;

        self.request_metadata_range(self.cursor, METADATA_PREFETCH_ON_MOVE + 1)
    }

    pub fn move_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Attaches metadata to a row; late results for removed rows are
    /// ignored.
    pub fn apply_metadata(&mut self, index: usize, metadata: RevisionMetadata) {
        if let Some(row) = self.rows.get_mut(index) {
            row.metadata = Some(metadata);
        }
    }

    pub fn selected_row(&self) -> Option<&RollbackRow> {
        self.rows.get(self.cursor)
    }

    fn request_metadata_range(&mut self, start: usize, len: usize) -> Vec<usize> {
        let end = (start + len).min(self.rows.len());
        let mut scheduled = Vec::new();
        for index in start..end {
            let row = &mut self.rows[index];
            if row.metadata_requested || row.metadata.is_some() {
                continue;
            }
            row.metadata_requested = true;
            scheduled.push(index);
        }

        scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rows(count: usize) -> Vec<RollbackRow> {
        (0..count)
            .map(|index| RollbackRow {
                id: i64::try_from(index).unwrap_or(0),
                revision: format!("rev-{index}"),
                deployed_at: None,
                metadata: None,
                metadata_requested: false,
            })
            .collect()
    }

    #[test]
    fn test_apply_history_schedules_first_ten_rows() {
        // Arrange
        let mut session = RollbackSession::new(AppKey::named("api"));

        // Act
        let scheduled = session.apply_history(rows(25), Some("rev-0".to_string()));

        // Assert
        assert_eq!(scheduled, (0..10).collect::<Vec<_>>());
        assert!(!session.loading);
    }

    #[test]
    fn test_move_down_schedules_cursor_plus_two() {
        // Arrange
        let mut session = RollbackSession::new(AppKey::named("api"));
        session.apply_history(rows(25), None);
        for _ in 0..9 {
            session.move_down();
        }

        // Act: row 9 -> row 10
        let scheduled = session.move_down();

        // Assert
        assert_eq!(session.cursor, 10);
        assert_eq!(scheduled, vec![10, 11, 12]);
    }

    #[test]
    fn test_move_down_skips_rows_already_requested() {
        // Arrange
        let mut session = RollbackSession::new(AppKey::named("api"));
        session.apply_history(rows(12), None);

        // Act: rows 0..=9 were requested on entry; moving to 1 targets 1..=3
        let scheduled = session.move_down();

        // Assert
        assert_eq!(session.cursor, 1);
        assert_eq!(scheduled, Vec::<usize>::new());
    }

    #[test]
    fn test_move_down_stops_at_last_row() {
        // Arrange
        let mut session = RollbackSession::new(AppKey::named("api"));
        session.apply_history(rows(2), None);
        session.move_down();

        // Act
        let scheduled = session.move_down();

        // Assert
        assert_eq!(session.cursor, 1);
        assert!(scheduled.is_empty());
    }

    #[test]
    fn test_apply_metadata_ignores_out_of_range_index() {
        // Arrange
        let mut session = RollbackSession::new(AppKey::named("api"));
        session.apply_history(rows(1), None);

        // Act
        session.apply_metadata(
            5,
            RevisionMetadata {
                author: "a".to_string(),
                date: None,
                message: "m".to_string(),
            },
        );

        // Assert
        assert!(session.rows[0].metadata.is_none());
    }
}
