/*!
 * Saving a parent together with its translations.
 *
 * | parent exists | parent dirty | action |
 * |---|---|---|
 * | no  | any | save parent, then dirty translations linked to the new key |
 * | yes | yes | save parent, then dirty translations |
 * | yes | no  | save dirty translations, then emit `Saved` and `Updated` |
 *
 * A rejected parent save aborts before any translation is attempted. A
 * rejected translation save stops the loop; translations saved before it
 * stay committed.
 */

use log::{debug, info, warn};

use super::entity::TranslatableModel;
use crate::database::Repository;
use crate::errors::TranslatableError;

/// Lifecycle notifications emitted while saving
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelEvent {
    /// A new parent row was inserted
    Created,
    /// An existing parent row was updated
    Updated,
    /// The parent is persisted
    Saved,
}

/// Observer of model saves
pub trait ModelObserver {
    /// Called before anything is written; returning false cancels the save
    fn saving(&self, _model: &TranslatableModel) -> bool {
        true
    }

    /// Called after the parent is persisted
    fn notify(&self, _event: ModelEvent, _model: &TranslatableModel) {}
}

/// Orchestrates saving a parent and its dirty translations
pub struct PersistenceCoordinator<'a, R: Repository> {
    repo: &'a R,
    observers: &'a [Box<dyn ModelObserver>],
}

impl<'a, R: Repository> PersistenceCoordinator<'a, R> {
    pub fn new(repo: &'a R, observers: &'a [Box<dyn ModelObserver>]) -> Self {
        Self { repo, observers }
    }

    fn notify(&self, event: ModelEvent, model: &TranslatableModel) {
        for observer in self.observers {
            observer.notify(event, model);
        }
    }

    /// Save `model` and its dirty translations.
    ///
    /// Returns `Ok(false)` when an observer cancels or any save is rejected.
    pub fn save(&self, model: &mut TranslatableModel) -> Result<bool, TranslatableError> {
        if !self.observers.iter().all(|o| o.saving(model)) {
            info!("Save of {} cancelled by observer", model.definition().name);
            return Ok(false);
        }

        if model.exists() && !model.is_dirty() {
            debug!("{} unchanged, saving translations only", model.definition().name);
            let saved = self.save_translations(model)?;
            if saved {
                self.notify(ModelEvent::Saved, model);
                self.notify(ModelEvent::Updated, model);
            }
            return Ok(saved);
        }

        let event = if model.exists() {
            ModelEvent::Updated
        } else {
            ModelEvent::Created
        };
        if !self.repo.save(model.record_mut())? {
            warn!(
                "Saving {} was rejected; translations not saved",
                model.definition().name
            );
            return Ok(false);
        }
        self.notify(event, model);
        self.notify(ModelEvent::Saved, model);

        self.save_translations(model)
    }

    /// Save every dirty translation, linking it to the parent key.
    ///
    /// Translations whose only modification is their locale are skipped.
    pub fn save_translations(&self, model: &mut TranslatableModel) -> Result<bool, TranslatableError> {
        let dirty: Vec<usize> = match model.translations() {
            Some(set) => (0..set.len())
                .filter(|&i| set.get(i).is_some_and(|r| set.is_dirty(r)))
                .collect(),
            None => return Ok(true),
        };
        if dirty.is_empty() {
            return Ok(true);
        }

        let name = model.definition().name.clone();
        let foreign_key = model.definition().foreign_key();
        let parent_key = model
            .key()
            .cloned()
            .ok_or_else(|| TranslatableError::MissingParentKey(name.clone()))?;

        let Some(set) = model.translations_mut() else {
            return Ok(true);
        };
        for index in dirty {
            let Some(record) = set.get_mut(index) else {
                continue;
            };
            record.set(foreign_key.as_str(), parent_key.clone());
            if !self.repo.save(record)? {
                warn!("Saving a translation of {} {} was rejected", name, parent_key);
                return Ok(false);
            }
        }

        Ok(true)
    }
}
