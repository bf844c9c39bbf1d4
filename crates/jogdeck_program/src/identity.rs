use chrono::{SecondsFormat, Utc};
use jogdeck_common::Program;
use uuid::Uuid;

const ID_ALPHABET: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Random base-36 token.
pub fn generate_id() -> String {
    let mut value = Uuid::new_v4().as_u128();
    let mut digits = Vec::with_capacity(25);
    while value > 0 {
        digits.push(ID_ALPHABET[(value % 36) as usize]);
        value /= 36;
    }
    if digits.is_empty() {
        digits.push(b'0');
    }
    digits.iter().rev().map(|&digit| digit as char).collect()
}

/// Current UTC time, e.g. `2024-05-01T12:30:00.125Z`.
pub fn default_name() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Give a populated program without an id a fresh id, and a default name if
/// it has none. Other programs are returned unchanged.
pub fn identify(program: Program) -> Program {
    if !program.is_populated() || program.id.is_some() {
        return program;
    }

    let name = match program.name {
        Some(name) if !name.is_empty() => name,
        _ => default_name(),
    };
    Program { id: Some(generate_id()), name: Some(name), ..program }
}
