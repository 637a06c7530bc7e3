// Copyright (c) 2024 Mike Tsao

use super::MusicalWork;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// A [MusicalWork] that several threads can edit. Any number of readers may
/// look at the work at once, but every structural edit (adding tones,
/// transforming patterns, adding or deleting patterns) happens under a single
/// writer lock, so no one observes a pattern halfway through a transform.
///
/// Clones share the same work.
#[derive(Clone, Debug, Default)]
pub struct SharedMusicalWork(Arc<RwLock<MusicalWork>>);
impl SharedMusicalWork {
    /// Wraps `work` for sharing.
    pub fn new(work: MusicalWork) -> Self {
        Self(Arc::new(RwLock::new(work)))
    }

    /// Locks the work for reading.
    pub fn read(&self) -> RwLockReadGuard<'_, MusicalWork> {
        // Edits are all-or-nothing, so a panicking writer can't have left
        // the work half-changed.
        self.0.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Locks the work for editing.
    pub fn write(&self) -> RwLockWriteGuard<'_, MusicalWork> {
        self.0.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs `f` with exclusive access to the work and returns its result.
    pub fn edit<R>(&self, f: impl FnOnce(&mut MusicalWork) -> R) -> R {
        f(&mut self.write())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::composition::Tone;
    use std::thread;

    #[test]
    fn writers_take_turns() {
        let shared = SharedMusicalWork::new(MusicalWork::new("Canon", None, 100).unwrap());
        shared.edit(|w| {
            w.add_pattern();
        });

        let handles: Vec<_> = (0..4)
            .map(|n| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..25 {
                        shared.edit(|w| {
                            let p = w.get_pattern_mut(0).unwrap();
                            p.append_tone(Tone::note(40 + n, 0.25, 0.5).unwrap());
                            p.transpose(1).unwrap();
                            p.transpose(-1).unwrap();
                        });
                    }
                })
            })
            .collect();
        handles.into_iter().for_each(|h| h.join().unwrap());

        let work = shared.read();
        let p = work.get_pattern(0).unwrap();
        assert_eq!(p.len(), 100);
        for n in 0..4 {
            assert_eq!(
                p.tones().filter(|t| t.key_no() == Some(40 + n)).count(),
                25,
                "no edit should be lost or half-applied"
            );
        }
    }
}
