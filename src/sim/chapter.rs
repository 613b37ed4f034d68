//! Chapter table and the chapter transition state machine

use serde::{Deserialize, Serialize};

use super::enemy::EnemyKind;
use crate::consts::CHAPTER_DEFEAT_QUOTA;

/// Static definition of one chapter
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Chapter {
    pub number: u32,
    pub background_key: &'static str,
    pub music_key: &'static str,
    pub enemies_to_defeat: u32,
    pub allowed_enemies: &'static [EnemyKind],
    pub lore_text: &'static str,
    /// Whether 1 may appear as a factor while this chapter runs
    pub allow_easy_multiplication: bool,
}

pub static CHAPTERS: [Chapter; 4] = [
    Chapter {
        number: 1,
        background_key: "background_dim",
        music_key: "gameMusic",
        enemies_to_defeat: CHAPTER_DEFEAT_QUOTA,
        allowed_enemies: &[EnemyKind::Ghost],
        lore_text: "The dark chamber is cleansed.\nIn the old library\nnew knowledge awaits!",
        allow_easy_multiplication: true,
    },
    Chapter {
        number: 2,
        background_key: "background_library",
        music_key: "homeMusic",
        enemies_to_defeat: CHAPTER_DEFEAT_QUOTA,
        allowed_enemies: &[EnemyKind::Ghost, EnemyKind::Shadow],
        lore_text: "The book curses are broken.\nNow the great hall\nawaits you!",
        allow_easy_multiplication: false,
    },
    Chapter {
        number: 3,
        background_key: "background_hall",
        music_key: "righteousSwordMusic",
        enemies_to_defeat: CHAPTER_DEFEAT_QUOTA,
        allowed_enemies: &[EnemyKind::Ghost, EnemyKind::Shadow, EnemyKind::Plant],
        lore_text: "The halls are safe!\nOut in the fields\nnew danger lurks.",
        allow_easy_multiplication: false,
    },
    Chapter {
        number: 4,
        background_key: "background_field",
        music_key: "jumpMusic",
        enemies_to_defeat: CHAPTER_DEFEAT_QUOTA,
        allowed_enemies: &[EnemyKind::Shadow, EnemyKind::Plant],
        lore_text: "The field is quiet.\nYet dark forces stir\nin the forest...",
        allow_easy_multiplication: false,
    },
];

/// Where the chapter sequence currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChapterPhase {
    /// Enemies are coming; defeats count toward the quota
    Active,
    /// Quota met, "Chapter Complete" screen waiting for the player
    CompleteScreen,
    /// Full-screen lore panel waiting for the player
    Lore,
    /// Next chapter chosen, waiting for the session to set it up
    Starting,
    /// Every chapter cleared
    Victory,
}

/// Result of leaving the lore screen
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterAdvance {
    NextChapter(usize),
    Victory,
}

#[derive(Debug, Clone)]
pub struct ChapterProgress {
    chapters: &'static [Chapter],
    index: usize,
    defeated: u32,
    phase: ChapterPhase,
}

impl Default for ChapterProgress {
    fn default() -> Self {
        Self::new(&CHAPTERS)
    }
}

impl ChapterProgress {
    pub fn new(chapters: &'static [Chapter]) -> Self {
        let phase = if chapters.is_empty() {
            ChapterPhase::Victory
        } else {
            ChapterPhase::Starting
        };
        Self {
            chapters,
            index: 0,
            defeated: 0,
            phase,
        }
    }

    pub fn phase(&self) -> ChapterPhase {
        self.phase
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn defeated(&self) -> u32 {
        self.defeated
    }

    pub fn total(&self) -> usize {
        self.chapters.len()
    }

    pub fn current(&self) -> Option<&'static Chapter> {
        self.chapters.get(self.index)
    }

    /// Enter the current chapter: reset the counter and go active
    pub fn begin(&mut self) -> Option<&'static Chapter> {
        if self.phase != ChapterPhase::Starting {
            return None;
        }
        let chapter = self.current()?;
        self.defeated = 0;
        self.phase = ChapterPhase::Active;
        Some(chapter)
    }

    /// Count a defeat; returns true exactly when this defeat meets the quota
    pub fn record_defeat(&mut self) -> bool {
        if self.phase != ChapterPhase::Active {
            return false;
        }
        let Some(chapter) = self.current() else {
            return false;
        };
        self.defeated += 1;
        if self.defeated >= chapter.enemies_to_defeat {
            self.phase = ChapterPhase::CompleteScreen;
            return true;
        }
        false
    }

    /// Leave the "Chapter Complete" screen for the lore panel.
    ///
    /// A chapter without lore skips straight to the next chapter and returns
    /// where it went.
    pub fn continue_from_complete(&mut self) -> Option<ChapterAdvance> {
        if self.phase != ChapterPhase::CompleteScreen {
            return None;
        }
        let has_lore = self.current().is_some_and(|c| !c.lore_text.is_empty());
        if has_lore {
            self.phase = ChapterPhase::Lore;
            None
        } else {
            Some(self.advance())
        }
    }

    /// Leave the lore screen and move to the next chapter (or victory)
    pub fn continue_from_lore(&mut self) -> Option<ChapterAdvance> {
        if self.phase != ChapterPhase::Lore {
            return None;
        }
        Some(self.advance())
    }

    fn advance(&mut self) -> ChapterAdvance {
        self.index += 1;
        self.defeated = 0;
        if self.index < self.chapters.len() {
            self.phase = ChapterPhase::Starting;
            ChapterAdvance::NextChapter(self.index)
        } else {
            self.phase = ChapterPhase::Victory;
            ChapterAdvance::Victory
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quota_fires_once_on_fifth_defeat() {
        let mut progress = ChapterProgress::default();
        progress.begin();
        for _ in 0..4 {
            assert!(!progress.record_defeat());
        }
        assert!(progress.record_defeat());
        assert_eq!(progress.phase(), ChapterPhase::CompleteScreen);
        // Further defeats during the transition don't count
        assert!(!progress.record_defeat());
        assert_eq!(progress.defeated(), 5);
    }

    #[test]
    fn test_full_transition_sequence() {
        let mut progress = ChapterProgress::default();
        progress.begin();
        (0..5).for_each(|_| {
            progress.record_defeat();
        });
        assert_eq!(progress.continue_from_complete(), None);
        assert_eq!(progress.phase(), ChapterPhase::Lore);
        assert_eq!(progress.continue_from_lore(), Some(ChapterAdvance::NextChapter(1)));
        assert_eq!(progress.phase(), ChapterPhase::Starting);
        let chapter = progress.begin().unwrap();
        assert_eq!(chapter.number, 2);
        assert_eq!(progress.defeated(), 0);
    }

    #[test]
    fn test_last_chapter_leads_to_victory() {
        let mut progress = ChapterProgress::default();
        for i in 0..CHAPTERS.len() {
            progress.begin();
            (0..5).for_each(|_| {
                progress.record_defeat();
            });
            progress.continue_from_complete();
            let advance = progress.continue_from_lore();
            if i + 1 < CHAPTERS.len() {
                assert_eq!(advance, Some(ChapterAdvance::NextChapter(i + 1)));
            } else {
                assert_eq!(advance, Some(ChapterAdvance::Victory));
            }
        }
        assert_eq!(progress.phase(), ChapterPhase::Victory);
        assert!(progress.current().is_none());
    }

    #[test]
    fn test_out_of_order_continues_are_ignored() {
        let mut progress = ChapterProgress::default();
        progress.begin();
        assert_eq!(progress.continue_from_lore(), None);
        assert_eq!(progress.continue_from_complete(), None);
        assert_eq!(progress.phase(), ChapterPhase::Active);
    }

    #[test]
    fn test_chapter_table_rules() {
        assert!(CHAPTERS[0].allow_easy_multiplication);
        assert!(CHAPTERS[1..].iter().all(|c| !c.allow_easy_multiplication));
        assert!(CHAPTERS.iter().all(|c| c.enemies_to_defeat == 5));
        assert_eq!(CHAPTERS[3].allowed_enemies, &[EnemyKind::Shadow, EnemyKind::Plant]);
    }
}
