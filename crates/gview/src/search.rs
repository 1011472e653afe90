//! In-page search: move focus between matching rows without filtering.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Match-navigation state for one scrollable list.
///
/// Continuity is kept only while focus stays on the last match with the same
/// keyword; any other focus restarts the scan from the focused row
/// inclusive. Scans stop at the ends of the list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InPageSearch {
    keyword: String,
    last_match: Option<usize>,
}

impl InPageSearch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    #[must_use]
    pub fn last_match(&self) -> Option<usize> {
        self.last_match
    }

    pub fn reset(&mut self) {
        self.keyword.clear();
        self.last_match = None;
    }

    /// Index of the next row containing `keyword`, or `None` (focus should
    /// stay where it is).
    pub fn next<S: AsRef<str>>(
        &mut self,
        keyword: &str,
        rows: &[S],
        focus: Option<usize>,
    ) -> Option<usize> {
        self.step(keyword, rows, focus, Direction::Forward)
    }

    pub fn prev<S: AsRef<str>>(
        &mut self,
        keyword: &str,
        rows: &[S],
        focus: Option<usize>,
    ) -> Option<usize> {
        self.step(keyword, rows, focus, Direction::Backward)
    }

    pub fn step<S: AsRef<str>>(
        &mut self,
        keyword: &str,
        rows: &[S],
        focus: Option<usize>,
        direction: Direction,
    ) -> Option<usize> {
        if keyword.is_empty() || rows.is_empty() {
            return None;
        }
        let continuing = keyword == self.keyword && focus.is_some() && focus == self.last_match;
        if keyword != self.keyword {
            self.keyword = keyword.to_owned();
            self.last_match = None;
        }

        let last = rows.len() - 1;
        let start = match (focus.map(|f| f.min(last)), direction) {
            (None, Direction::Forward) => Some(0),
            (None, Direction::Backward) => Some(last),
            (Some(f), Direction::Forward) if continuing => f.checked_add(1).filter(|&i| i <= last),
            (Some(f), Direction::Backward) if continuing => f.checked_sub(1),
            (Some(f), _) => Some(f),
        };
        let start = start?;

        let hit = match direction {
            Direction::Forward => (start..=last).find(|&i| rows[i].as_ref().contains(keyword)),
            Direction::Backward => (0..=start)
                .rev()
                .find(|&i| rows[i].as_ref().contains(keyword)),
        };
        if let Some(index) = hit {
            self.last_match = Some(index);
        }
        hit
    }
}
