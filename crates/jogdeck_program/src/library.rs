use std::rc::Rc;

use jogdeck_common::{Program, ProgramIndexItem};
use tracing::{debug, info};

use crate::error::ProgramError;
use crate::identity::identify;
use crate::storage::{self, KeyValueStore};

/// Storage prefix of saved programs.
pub const DEFAULT_PREFIX: &str = "sequence";

/// Result of [`ProgramLibrary::commit`].
#[derive(Debug, Clone, PartialEq)]
pub struct Committed {
    /// The program as it should be published, with identity assigned.
    pub program: Program,
    /// Fresh index when the program was saved.
    pub index: Option<Vec<ProgramIndexItem>>,
}

/// Saved programs under one storage prefix.
#[derive(Clone)]
pub struct ProgramLibrary {
    store: Rc<dyn KeyValueStore>,
    prefix: String,
}

impl std::fmt::Debug for ProgramLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgramLibrary").field("prefix", &self.prefix).finish()
    }
}

fn reduce_program(program: &Program) -> ProgramIndexItem {
    ProgramIndexItem {
        id: program.id.clone().unwrap_or_default(),
        name: program.name.clone().unwrap_or_default(),
    }
}

fn sort_by_name(a: &ProgramIndexItem, b: &ProgramIndexItem) -> std::cmp::Ordering {
    a.name.cmp(&b.name)
}

impl ProgramLibrary {
    pub fn new(store: Rc<dyn KeyValueStore>, prefix: impl Into<String>) -> Self {
        Self { store, prefix: prefix.into() }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Upsert the full record and its index entry.
    pub fn save(&self, program: &Program) -> Result<(), ProgramError> {
        let Some(id) = program.id.as_deref() else {
            return Err(ProgramError::MissingId);
        };
        storage::set_item(self.store.as_ref(), &self.prefix, program, reduce_program, sort_by_name)?;
        info!(
            "[program] saved {} ({:?}, {} commands)",
            id,
            program.name.as_deref().unwrap_or_default(),
            program.commands.len()
        );
        Ok(())
    }

    pub fn load(&self, id: &str) -> Result<Program, ProgramError> {
        let program: Option<Program> = storage::get_item(self.store.as_ref(), &self.prefix, id)?;
        match program {
            Some(program) => {
                info!("[program] loaded {}", id);
                Ok(program)
            }
            None => Err(ProgramError::NotFound(id.to_owned())),
        }
    }

    pub fn delete(&self, id: &str) -> Result<(), ProgramError> {
        storage::remove_item::<ProgramIndexItem>(self.store.as_ref(), &self.prefix, id)?;
        info!("[program] deleted {}", id);
        Ok(())
    }

    /// Index of saved programs, sorted by name.
    pub fn list(&self) -> Result<Vec<ProgramIndexItem>, ProgramError> {
        Ok(storage::list_items(self.store.as_ref(), &self.prefix)?)
    }

    /// Assign identity to a populated program and save it.
    ///
    /// Unpopulated programs are returned as they are and nothing is written.
    pub fn commit(&self, program: Program) -> Result<Committed, ProgramError> {
        if !program.is_populated() {
            debug!("[program] not saving unpopulated program");
            return Ok(Committed { program, index: None });
        }

        let program = identify(program);
        self.save(&program)?;
        Ok(Committed { index: Some(self.list()?), program })
    }
}
