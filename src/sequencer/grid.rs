use crate::error::{Error, Result};
use crate::shared::SoundId;

/// sound × step matrix of "active" flags.
///
/// Every row always has exactly `step_count` cells. Resizing builds the new
/// rows first and swaps them in, so a reader never sees mixed row lengths.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepGrid {
    rows: Vec<Vec<bool>>,
    step_count: usize,
}

impl StepGrid {
    pub fn new(sound_count: usize, step_count: usize) -> Self {
        Self {
            rows: vec![vec![false; step_count]; sound_count],
            step_count,
        }
    }

    pub fn sound_count(&self) -> usize {
        self.rows.len()
    }

    pub fn step_count(&self) -> usize {
        self.step_count
    }

    fn check(&self, sound: SoundId, step: usize) -> Result<()> {
        if sound.index() >= self.rows.len() {
            return Err(Error::IndexOutOfRange {
                what: "sound",
                index: sound.index(),
                len: self.rows.len(),
            });
        }
        if step >= self.step_count {
            return Err(Error::IndexOutOfRange {
                what: "step",
                index: step,
                len: self.step_count,
            });
        }
        Ok(())
    }

    pub fn get(&self, sound: SoundId, step: usize) -> Result<bool> {
        self.check(sound, step)?;
        Ok(self.rows[sound.index()][step])
    }

    pub fn set(&mut self, sound: SoundId, step: usize, active: bool) -> Result<()> {
        self.check(sound, step)?;
        self.rows[sound.index()][step] = active;
        Ok(())
    }

    /// Flips one cell and returns its new value.
    pub fn toggle(&mut self, sound: SoundId, step: usize) -> Result<bool> {
        self.check(sound, step)?;
        let cell = &mut self.rows[sound.index()][step];
        *cell = !*cell;
        Ok(*cell)
    }

    /// Cells below `min(old, new)` keep their value, new cells start inactive.
    pub fn resize(&mut self, step_count: usize) {
        if step_count == self.step_count {
            return;
        }
        let rows = self
            .rows
            .iter()
            .map(|old| {
                let mut row = vec![false; step_count];
                let keep = old.len().min(step_count);
                row[..keep].copy_from_slice(&old[..keep]);
                row
            })
            .collect();
        self.rows = rows;
        self.step_count = step_count;
    }

    pub fn clear(&mut self) {
        self.rows.iter_mut().for_each(|row| row.fill(false));
    }

    pub fn row(&self, sound: SoundId) -> Result<&[bool]> {
        self.rows
            .get(sound.index())
            .map(Vec::as_slice)
            .ok_or(Error::IndexOutOfRange {
                what: "sound",
                index: sound.index(),
                len: self.rows.len(),
            })
    }

    /// Sounds whose cell at `step` is active. Empty for an out-of-range step.
    pub fn active_sounds(&self, step: usize) -> impl Iterator<Item = SoundId> + '_ {
        self.rows
            .iter()
            .enumerate()
            .filter(move |(_, row)| row.get(step).copied().unwrap_or(false))
            .map(|(i, _)| SoundId(i))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row_of(grid: &StepGrid) -> Vec<bool> {
        grid.row(SoundId(0)).unwrap().to_vec()
    }

    fn tftf() -> StepGrid {
        let mut grid = StepGrid::new(2, 4);
        grid.toggle(SoundId(0), 0).unwrap();
        grid.toggle(SoundId(0), 2).unwrap();
        grid
    }

    #[test]
    fn growing_keeps_cells_and_zero_fills() {
        let mut grid = tftf();
        grid.resize(6);
        assert_eq!(row_of(&grid), [true, false, true, false, false, false]);
        assert_eq!(grid.row(SoundId(1)).unwrap().len(), 6);
    }

    #[test]
    fn shrinking_truncates() {
        let mut grid = tftf();
        grid.resize(2);
        assert_eq!(row_of(&grid), [true, false]);
        // and growing back does not resurrect the dropped cell
        grid.resize(4);
        assert_eq!(row_of(&grid), [true, false, false, false]);
    }

    #[test]
    fn every_resize_preserves_the_overlap() {
        for old in 1..=8 {
            for new in 1..=8 {
                let mut grid = StepGrid::new(1, old);
                for step in (0..old).step_by(3) {
                    grid.set(SoundId(0), step, true).unwrap();
                }
                let before = row_of(&grid);
                grid.resize(new);
                let after = row_of(&grid);
                assert_eq!(after.len(), new);
                for i in 0..new {
                    let expected = if i < old { before[i] } else { false };
                    assert_eq!(after[i], expected, "old={old} new={new} i={i}");
                }
            }
        }
    }

    #[test]
    fn clear_keeps_dimensions() {
        let mut grid = tftf();
        grid.clear();
        assert_eq!(grid.step_count(), 4);
        assert_eq!(grid.sound_count(), 2);
        assert_eq!(row_of(&grid), [false; 4]);
    }

    #[test]
    fn toggle_twice_restores() {
        let mut grid = StepGrid::new(1, 4);
        assert!(grid.toggle(SoundId(0), 3).unwrap());
        assert!(!grid.toggle(SoundId(0), 3).unwrap());
    }

    #[test]
    fn out_of_range_is_an_error() {
        let mut grid = StepGrid::new(2, 4);
        assert!(matches!(
            grid.get(SoundId(0), 4),
            Err(Error::IndexOutOfRange { what: "step", index: 4, len: 4 })
        ));
        assert!(matches!(
            grid.toggle(SoundId(2), 0),
            Err(Error::IndexOutOfRange { what: "sound", index: 2, len: 2 })
        ));
    }

    #[test]
    fn active_sounds_lists_rows_in_order() {
        let mut grid = StepGrid::new(3, 4);
        grid.set(SoundId(0), 1, true).unwrap();
        grid.set(SoundId(2), 1, true).unwrap();
        let active: Vec<_> = grid.active_sounds(1).collect();
        assert_eq!(active, [SoundId(0), SoundId(2)]);
        assert_eq!(grid.active_sounds(9).count(), 0);
    }
}
