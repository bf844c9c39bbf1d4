use std::rc::Rc;

use jogdeck_common::{Command, JointPosition, Program, ProgramItem, SpeedSetting};
use jogdeck_program::{DEFAULT_PREFIX, FileStore, MemoryStore, ProgramError, ProgramLibrary};

fn sample_program(name: Option<&str>) -> Program {
    Program {
        name: name.map(str::to_owned),
        commands: vec![
            ProgramItem::new("home", Command::Joints(JointPosition::default())),
            ProgramItem::new("slow", Command::Speed(SpeedSetting { speed: 10.0 })),
        ],
        ..Default::default()
    }
}

#[test]
fn commit_then_load_round_trips() {
    let library = ProgramLibrary::new(Rc::new(MemoryStore::new()), DEFAULT_PREFIX);

    let committed = library.commit(sample_program(Some("pick"))).unwrap();
    let id = committed.program.id.clone().unwrap();
    let index = committed.index.unwrap();
    assert_eq!(index.len(), 1);
    assert_eq!(index[0].id, id);
    assert_eq!(index[0].name, "pick");

    let loaded = library.load(&id).unwrap();
    assert_eq!(loaded, committed.program);
    assert_eq!(loaded.commands, sample_program(None).commands);

    library.delete(&id).unwrap();
    assert!(library.list().unwrap().is_empty());
    assert!(matches!(library.load(&id), Err(ProgramError::NotFound(missing)) if missing == id));
}

#[test]
fn commit_assigns_identity_once() {
    let library = ProgramLibrary::new(Rc::new(MemoryStore::new()), DEFAULT_PREFIX);

    let first = library.commit(sample_program(None)).unwrap().program;
    assert!(first.id.is_some());
    assert!(first.name.as_deref().is_some_and(|name| name.ends_with('Z')));

    let mut edited = first.clone();
    edited.commands.pop();
    let second = library.commit(edited).unwrap();
    assert_eq!(second.program.id, first.id);
    assert_eq!(second.index.unwrap().len(), 1);
}

#[test]
fn unpopulated_programs_are_not_saved() {
    let store = Rc::new(MemoryStore::new());
    let library = ProgramLibrary::new(store.clone(), DEFAULT_PREFIX);

    let committed = library.commit(Program::default()).unwrap();
    assert_eq!(committed.program, Program::default());
    assert!(committed.index.is_none());
    assert!(store.is_empty());
}

#[test]
fn index_is_sorted_by_name() {
    let library = ProgramLibrary::new(Rc::new(MemoryStore::new()), DEFAULT_PREFIX);
    for name in ["weld", "Pick", "place"] {
        library.commit(sample_program(Some(name))).unwrap();
    }

    let names: Vec<_> = library.list().unwrap().into_iter().map(|entry| entry.name).collect();
    assert_eq!(names, ["Pick", "place", "weld"]);
}

#[test]
fn save_requires_an_id() {
    let library = ProgramLibrary::new(Rc::new(MemoryStore::new()), DEFAULT_PREFIX);
    assert!(matches!(library.save(&sample_program(Some("x"))), Err(ProgramError::MissingId)));
}

#[test]
fn file_store_persists_across_instances() {
    let dir = tempfile::tempdir().unwrap();

    let id = {
        let library = ProgramLibrary::new(Rc::new(FileStore::open(dir.path()).unwrap()), DEFAULT_PREFIX);
        library.commit(sample_program(Some("disk"))).unwrap().program.id.unwrap()
    };

    let library = ProgramLibrary::new(Rc::new(FileStore::open(dir.path()).unwrap()), DEFAULT_PREFIX);
    let loaded = library.load(&id).unwrap();
    assert_eq!(loaded.name.as_deref(), Some("disk"));
    assert_eq!(library.list().unwrap()[0].id, id);
    assert!(dir.path().join(format!("{DEFAULT_PREFIX}-{id}.json")).exists());
}
